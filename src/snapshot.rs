//! Snapshot pipeline — standings discovery, picks fetching, file output
//!
//! Orchestrates the full effective-ownership build:
//! 1. Resolve the current gameweek from the bootstrap payload
//! 2. Page through the league standings to discover the manager sample
//! 3. Fetch every sampled manager's picks
//! 4. Aggregate and write the snapshot
//!
//! Phases 2 and 3 run through the task pool, so a slow or flaky endpoint
//! degrades to retries and failure markers instead of aborting the build.

use crate::aggregate;
use crate::client::FplApi;
use crate::config::Config;
use crate::error::Result;
use crate::pool::{ProgressObserver, TaskOutcome, run_pool};
use crate::types::{EntryPicks, EoSnapshot};
use std::path::Path;
use std::sync::Arc;

/// The two pool-driven fetch phases, reported to progress observers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchStage {
    /// Paging through league standings to discover manager ids
    Standings,
    /// Fetching each sampled manager's picks
    Picks,
}

impl FetchStage {
    /// Human-readable phase name for console rendering
    pub fn label(&self) -> &'static str {
        match self {
            FetchStage::Standings => "Standings",
            FetchStage::Picks => "Picks",
        }
    }
}

/// Observer for the two-phase build, invoked as `(stage, completed, total)`
pub type StageObserver<'a> = &'a mut (dyn FnMut(FetchStage, usize, usize) + Send);

/// Drives the snapshot pipeline against an [`FplApi`] implementation
pub struct SnapshotBuilder {
    api: Arc<dyn FplApi>,
    config: Arc<Config>,
}

impl SnapshotBuilder {
    /// Create a builder over an API implementation and configuration
    pub fn new(api: Arc<dyn FplApi>, config: Arc<Config>) -> Self {
        Self { api, config }
    }

    /// Resolve the currently active gameweek, if the season is in play
    pub async fn current_gameweek(&self) -> Result<Option<u32>> {
        let bootstrap = self.api.bootstrap().await?;
        Ok(bootstrap.current_event().map(|e| e.id))
    }

    /// Discover the manager sample by paging through the league standings
    ///
    /// Pages are fetched through the task pool; a page that fails all its
    /// attempts shrinks the sample rather than failing the build. Ids are
    /// collected in page order and truncated to `top_n`.
    pub async fn fetch_standings(
        &self,
        on_progress: Option<ProgressObserver<'_>>,
    ) -> Result<Vec<u64>> {
        let pages = self.config.standings_pages();
        tracing::info!(
            pages,
            league_id = self.config.league_id,
            "Fetching standings pages"
        );

        let tasks: Vec<_> = (1..=pages)
            .map(|page| {
                let api = Arc::clone(&self.api);
                let league_id = self.config.league_id;
                move || {
                    let api = Arc::clone(&api);
                    async move { api.standings_page(league_id, page).await }
                }
            })
            .collect();

        let results = run_pool(&tasks, &self.config.pool, on_progress).await?;

        let mut manager_ids = Vec::new();
        for outcome in results {
            let Some(page) = outcome.into_completed() else {
                continue;
            };
            manager_ids.extend(page.standings.results.iter().map(|r| r.entry));
        }
        manager_ids.truncate(self.config.top_n);

        tracing::info!(managers = manager_ids.len(), "Collected manager ids");
        Ok(manager_ids)
    }

    /// Fetch picks for every sampled manager
    ///
    /// Returns the positional outcome list: index `i` belongs to
    /// `manager_ids[i]`, with [`TaskOutcome::Failed`] marking managers whose
    /// picks could not be retrieved within the attempt budget.
    pub async fn fetch_picks(
        &self,
        gameweek: u32,
        manager_ids: &[u64],
        on_progress: Option<ProgressObserver<'_>>,
    ) -> Result<Vec<TaskOutcome<EntryPicks>>> {
        tracing::info!(gameweek, managers = manager_ids.len(), "Fetching picks");

        let tasks: Vec<_> = manager_ids
            .iter()
            .map(|&entry_id| {
                let api = Arc::clone(&self.api);
                move || {
                    let api = Arc::clone(&api);
                    async move { api.entry_picks(entry_id, gameweek).await }
                }
            })
            .collect();

        run_pool(&tasks, &self.config.pool, on_progress).await
    }

    /// Run the full pipeline
    ///
    /// Returns `Ok(None)` when no gameweek is active — the snapshot is
    /// simply not built, which is not an error.
    pub async fn build(&self, mut observer: Option<StageObserver<'_>>) -> Result<Option<EoSnapshot>> {
        let Some(gameweek) = self.current_gameweek().await? else {
            tracing::info!("No active gameweek, skipping snapshot");
            return Ok(None);
        };
        tracing::info!(gameweek, "Building effective-ownership snapshot");

        let manager_ids = {
            let mut forward = |done: usize, total: usize| {
                if let Some(obs) = observer.as_mut() {
                    obs(FetchStage::Standings, done, total);
                }
            };
            self.fetch_standings(Some(&mut forward)).await?
        };

        let picks = {
            let mut forward = |done: usize, total: usize| {
                if let Some(obs) = observer.as_mut() {
                    obs(FetchStage::Picks, done, total);
                }
            };
            self.fetch_picks(gameweek, &manager_ids, Some(&mut forward))
                .await?
        };

        Ok(Some(aggregate::build_snapshot(gameweek, &picks)))
    }
}

/// Write a snapshot as compact JSON, creating parent directories as needed
pub async fn write_snapshot(snapshot: &EoSnapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let json = serde_json::to_string(snapshot)?;
    tokio::fs::write(path, json).await?;

    tracing::info!(
        path = %path.display(),
        managers = snapshot.total_managers,
        players = snapshot.players.len(),
        "Snapshot written"
    );
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::error::Error;
    use crate::types::{Bootstrap, GameweekEvent, Pick, StandingEntry, StandingsBody, StandingsPage};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// In-memory [`FplApi`] fake: fixed standings pages, per-entry picks,
    /// and an optional entry whose picks always fail.
    struct FakeApi {
        current_gameweek: Option<u32>,
        pages: Vec<Vec<u64>>,
        picks: HashMap<u64, Vec<Pick>>,
        failing_entry: Option<u64>,
        picks_calls: AtomicU32,
    }

    impl FakeApi {
        fn new(current_gameweek: Option<u32>, pages: Vec<Vec<u64>>) -> Self {
            Self {
                current_gameweek,
                pages,
                picks: HashMap::new(),
                failing_entry: None,
                picks_calls: AtomicU32::new(0),
            }
        }

        fn with_picks(mut self, entry: u64, picks: Vec<(u32, u32)>) -> Self {
            self.picks.insert(
                entry,
                picks
                    .into_iter()
                    .map(|(element, multiplier)| Pick {
                        element,
                        multiplier,
                    })
                    .collect(),
            );
            self
        }

        fn with_failing_entry(mut self, entry: u64) -> Self {
            self.failing_entry = Some(entry);
            self
        }
    }

    #[async_trait::async_trait]
    impl FplApi for FakeApi {
        async fn bootstrap(&self) -> Result<Bootstrap> {
            let events = self
                .current_gameweek
                .map(|id| {
                    vec![GameweekEvent {
                        id,
                        is_current: true,
                    }]
                })
                .unwrap_or_default();
            Ok(Bootstrap { events })
        }

        async fn standings_page(&self, _league_id: u32, page: u32) -> Result<StandingsPage> {
            let entries = self
                .pages
                .get(page as usize - 1)
                .cloned()
                .unwrap_or_default();
            Ok(StandingsPage {
                standings: StandingsBody {
                    results: entries
                        .into_iter()
                        .map(|entry| StandingEntry { entry })
                        .collect(),
                },
            })
        }

        async fn entry_picks(&self, entry_id: u64, _event_id: u32) -> Result<EntryPicks> {
            self.picks_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing_entry == Some(entry_id) {
                return Err(Error::UnexpectedStatus {
                    status: 500,
                    url: format!("fake://entry/{entry_id}"),
                });
            }
            Ok(EntryPicks {
                picks: self.picks.get(&entry_id).cloned().unwrap_or_default(),
            })
        }
    }

    fn test_config(top_n: usize, entries_per_page: usize) -> Arc<Config> {
        Arc::new(Config {
            top_n,
            entries_per_page,
            pool: PoolConfig {
                concurrency: 2,
                max_attempts: 2,
                base_delay: Duration::from_millis(1),
                jitter: false,
            },
            ..Config::default()
        })
    }

    #[tokio::test]
    async fn build_produces_snapshot_and_skips_failing_manager() {
        let api = FakeApi::new(Some(9), vec![vec![1, 2], vec![3, 4]])
            .with_picks(1, vec![(7, 2), (8, 1)])
            .with_picks(2, vec![(7, 1)])
            .with_picks(3, vec![(7, 1), (9, 3)])
            .with_failing_entry(4);
        let builder = SnapshotBuilder::new(Arc::new(api), test_config(4, 2));

        let mut stages = Vec::new();
        let mut observer =
            |stage: FetchStage, done: usize, total: usize| stages.push((stage, done, total));

        let snapshot = builder.build(Some(&mut observer)).await.unwrap().unwrap();

        assert_eq!(snapshot.gameweek, 9);
        assert_eq!(snapshot.total_managers, 3, "the failing manager is skipped");
        let seven = &snapshot.players[&7];
        assert_eq!(seven.selected, 3);
        assert_eq!(seven.multiplier_sum, 4);
        assert_eq!(seven.captained, 1);

        let standings: Vec<_> = stages
            .iter()
            .filter(|(s, _, _)| *s == FetchStage::Standings)
            .map(|&(_, done, total)| (done, total))
            .collect();
        let picks: Vec<_> = stages
            .iter()
            .filter(|(s, _, _)| *s == FetchStage::Picks)
            .map(|&(_, done, total)| (done, total))
            .collect();
        assert_eq!(standings, vec![(1, 2), (2, 2)]);
        assert_eq!(picks, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
    }

    #[tokio::test]
    async fn failing_picks_use_the_full_attempt_budget() {
        let api = FakeApi::new(Some(3), vec![vec![4]]).with_failing_entry(4);
        let calls_handle = Arc::new(api);
        let builder = SnapshotBuilder::new(calls_handle.clone(), test_config(1, 1));

        let picks = builder.fetch_picks(3, &[4], None).await.unwrap();

        assert_eq!(picks.len(), 1);
        assert!(picks[0].is_failed());
        assert_eq!(
            calls_handle.picks_calls.load(Ordering::SeqCst),
            2,
            "max_attempts=2 means the failing fetch is invoked twice"
        );
    }

    #[tokio::test]
    async fn no_active_gameweek_short_circuits() {
        let api = FakeApi::new(None, vec![vec![1]]);
        let handle = Arc::new(api);
        let builder = SnapshotBuilder::new(handle.clone(), test_config(1, 1));

        let snapshot = builder.build(None).await.unwrap();

        assert!(snapshot.is_none());
        assert_eq!(
            handle.picks_calls.load(Ordering::SeqCst),
            0,
            "nothing is fetched when no gameweek is active"
        );
    }

    #[tokio::test]
    async fn manager_sample_is_truncated_to_top_n() {
        let api = FakeApi::new(Some(1), vec![vec![1, 2], vec![3, 4]]);
        let builder = SnapshotBuilder::new(Arc::new(api), test_config(3, 2));

        let ids = builder.fetch_standings(None).await.unwrap();

        assert_eq!(ids, vec![1, 2, 3], "page order is kept, excess is dropped");
    }

    #[tokio::test]
    async fn write_snapshot_creates_parent_directories() {
        let snapshot = aggregate::build_snapshot(
            5,
            &[TaskOutcome::Completed(EntryPicks {
                picks: vec![Pick {
                    element: 11,
                    multiplier: 2,
                }],
            })],
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("nested").join("eo.json");
        write_snapshot(&snapshot, &path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["gameweek"], 5);
        assert_eq!(value["totalManagers"], 1);
        assert_eq!(value["players"]["11"]["captained"], 1);
        assert!(value["updatedAt"].is_string());
    }
}
