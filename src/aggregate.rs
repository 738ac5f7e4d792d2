//! Effective-ownership aggregation
//!
//! Folds the positional picks results coming out of the task pool into
//! per-player ownership counters. Failed fetches contribute no data: the
//! manager is simply absent from the sample, and `total_managers` reflects
//! only the managers whose picks were actually retrieved.

use crate::pool::TaskOutcome;
use crate::types::{EntryPicks, EoSnapshot, PlayerOwnership};
use chrono::Utc;
use std::collections::BTreeMap;

/// Fold picks results into `(total_managers, per-player ownership)`
///
/// Effective ownership is the average pick multiplier across the sampled
/// managers, expressed as a percentage: a player captained by everyone has
/// an EO of 200.
pub fn aggregate_picks(
    results: &[TaskOutcome<EntryPicks>],
) -> (u64, BTreeMap<u32, PlayerOwnership>) {
    let mut players: BTreeMap<u32, PlayerOwnership> = BTreeMap::new();
    let mut total_managers: u64 = 0;

    for outcome in results {
        let Some(entry_picks) = outcome.as_completed() else {
            continue;
        };
        total_managers += 1;

        for pick in &entry_picks.picks {
            let ownership = players.entry(pick.element).or_default();
            ownership.selected += 1;
            ownership.multiplier_sum += u64::from(pick.multiplier);
            if pick.multiplier == 2 {
                ownership.captained += 1;
            }
            if pick.multiplier == 3 {
                ownership.tripled += 1;
            }
        }
    }

    for ownership in players.values_mut() {
        ownership.eo = if total_managers > 0 {
            ownership.multiplier_sum as f64 / total_managers as f64 * 100.0
        } else {
            0.0
        };
    }

    (total_managers, players)
}

/// Build a timestamped snapshot from picks results
pub fn build_snapshot(gameweek: u32, results: &[TaskOutcome<EntryPicks>]) -> EoSnapshot {
    let (total_managers, players) = aggregate_picks(results);
    EoSnapshot {
        gameweek,
        total_managers,
        players,
        updated_at: Utc::now(),
    }
}
