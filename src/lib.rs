//! # fpl-eo
//!
//! Effective-ownership snapshot builder for Fantasy Premier League.
//!
//! Samples the top managers of a classic league, fetches their squad picks
//! for the current gameweek, and aggregates per-player effective ownership
//! into a JSON snapshot. All network fetching runs through a
//! bounded-concurrency task pool with per-task retry and linear backoff, so
//! thousands of small API calls complete without hammering the endpoint and
//! without one flaky response aborting the run.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use fpl_eo::{Config, FplClient, SnapshotBuilder, write_snapshot};
//!
//! #[tokio::main]
//! async fn main() -> fpl_eo::Result<()> {
//!     let config = Arc::new(Config::default());
//!     let client = Arc::new(FplClient::new(&config.api_base_url)?);
//!     let builder = SnapshotBuilder::new(client, config.clone());
//!
//!     if let Some(snapshot) = builder.build(None).await? {
//!         write_snapshot(&snapshot, &config.output_path).await?;
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Effective-ownership aggregation
pub mod aggregate;
/// FPL API client
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Bounded-concurrency task pool with retry and backoff
pub mod pool;
/// Snapshot pipeline orchestration and file output
pub mod snapshot;
/// Wire and output data model
pub mod types;

// Re-export commonly used types
pub use aggregate::{aggregate_picks, build_snapshot};
pub use client::{FplApi, FplClient};
pub use config::{Config, DEFAULT_API_BASE, PoolConfig};
pub use error::{Error, Result};
pub use pool::{ProgressObserver, TaskOutcome, run_pool};
pub use snapshot::{FetchStage, SnapshotBuilder, StageObserver, write_snapshot};
pub use types::{Bootstrap, EntryPicks, EoSnapshot, PlayerOwnership};
