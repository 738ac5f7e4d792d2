//! Configuration types for fpl-eo

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default base URL of the Fantasy Premier League API
pub const DEFAULT_API_BASE: &str = "https://fantasy.premierleague.com/api/";

/// Task pool configuration (concurrency ceiling and retry policy)
///
/// Used by [`crate::pool::run_pool`] for every batch of fetches. The
/// defaults reproduce the production fetch schedule: 10 concurrent
/// fetches, 3 invocations per task, 500 ms linear backoff.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum number of concurrently running tasks (default: 10)
    ///
    /// The effective worker count is clamped to the number of tasks, so a
    /// large ceiling over a small batch never spawns idle workers.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Total invocations allowed per task, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff unit between retries (default: 500 ms)
    ///
    /// The delay before retry `k` (1-based) is `base_delay * k`.
    #[serde(default = "default_base_delay", with = "duration_millis_serde")]
    pub base_delay: Duration,

    /// Add random jitter to backoff delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            jitter: false,
        }
    }
}

impl PoolConfig {
    /// Validate the pool configuration
    ///
    /// A zero concurrency ceiling or a zero attempt budget can never make
    /// progress, so both are rejected before any work starts.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::Config {
                message: "concurrency must be at least 1".to_string(),
                key: Some("pool.concurrency".to_string()),
            });
        }
        if self.max_attempts == 0 {
            return Err(Error::Config {
                message: "max_attempts must be at least 1".to_string(),
                key: Some("pool.max_attempts".to_string()),
            });
        }
        Ok(())
    }
}

/// Top-level configuration for building an effective-ownership snapshot
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the FPL API (default: the official endpoint)
    #[serde(default = "default_api_base")]
    pub api_base_url: String,

    /// Classic league whose standings define the manager sample
    /// (default: 314, the overall league)
    #[serde(default = "default_league_id")]
    pub league_id: u32,

    /// Number of top-ranked managers to sample (default: 10000)
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Standings entries per page, fixed by the API (default: 50)
    #[serde(default = "default_entries_per_page")]
    pub entries_per_page: usize,

    /// Where the snapshot JSON is written (default: "data/eo-top10k.json")
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Task pool settings shared by the standings and picks fetch phases
    #[serde(default)]
    pub pool: PoolConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base(),
            league_id: default_league_id(),
            top_n: default_top_n(),
            entries_per_page: default_entries_per_page(),
            output_path: default_output_path(),
            pool: PoolConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults, so a partial file like
    /// `{"top_n": 500}` is valid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(Error::Config {
                message: "top_n must be at least 1".to_string(),
                key: Some("top_n".to_string()),
            });
        }
        if self.entries_per_page == 0 {
            return Err(Error::Config {
                message: "entries_per_page must be at least 1".to_string(),
                key: Some("entries_per_page".to_string()),
            });
        }
        self.pool.validate()
    }

    /// Number of standings pages needed to cover `top_n` managers
    pub fn standings_pages(&self) -> u32 {
        self.top_n.div_ceil(self.entries_per_page) as u32
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_league_id() -> u32 {
    314
}

fn default_top_n() -> usize {
    10_000
}

fn default_entries_per_page() -> usize {
    50
}

fn default_output_path() -> PathBuf {
    PathBuf::from("data/eo-top10k.json")
}

fn default_concurrency() -> usize {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay() -> Duration {
    Duration::from_millis(500)
}

// Duration (de)serialization as integer milliseconds
mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_schedule() {
        let config = Config::default();
        assert_eq!(config.league_id, 314);
        assert_eq!(config.top_n, 10_000);
        assert_eq!(config.entries_per_page, 50);
        assert_eq!(config.pool.concurrency, 10);
        assert_eq!(config.pool.max_attempts, 3);
        assert_eq!(config.pool.base_delay, Duration::from_millis(500));
        assert!(!config.pool.jitter);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"top_n": 500, "pool": {"base_delay": 50}}"#).unwrap();
        assert_eq!(config.top_n, 500);
        assert_eq!(config.pool.base_delay, Duration::from_millis(50));
        assert_eq!(config.pool.concurrency, 10, "untouched fields keep defaults");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config = PoolConfig {
            concurrency: 0,
            ..PoolConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config { key: Some(ref k), .. } if k == "pool.concurrency"));
    }

    #[test]
    fn zero_max_attempts_is_rejected() {
        let config = PoolConfig {
            max_attempts: 0,
            ..PoolConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_top_n_is_rejected() {
        let config = Config {
            top_n: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn standings_pages_rounds_up() {
        let config = Config {
            top_n: 101,
            entries_per_page: 50,
            ..Config::default()
        };
        assert_eq!(config.standings_pages(), 3);

        let exact = Config {
            top_n: 100,
            entries_per_page: 50,
            ..Config::default()
        };
        assert_eq!(exact.standings_pages(), 2);
    }

    #[test]
    fn load_reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"league_id": 99, "top_n": 150}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.league_id, 99);
        assert_eq!(config.top_n, 150);
    }

    #[test]
    fn load_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"pool": {"concurrency": 0}}"#).unwrap();

        assert!(Config::load(&path).is_err());
    }
}
