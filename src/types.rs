//! Wire and output data model for fpl-eo
//!
//! Wire types mirror the subset of the Fantasy Premier League API payloads
//! the snapshot pipeline consumes; unknown fields are ignored on
//! deserialization. Output types serialize with camelCase keys so the
//! emitted snapshot JSON matches what downstream consumers already parse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Subset of the `bootstrap-static/` payload
#[derive(Clone, Debug, Deserialize)]
pub struct Bootstrap {
    /// All gameweek events of the season
    pub events: Vec<GameweekEvent>,
}

/// One gameweek entry from the bootstrap payload
#[derive(Clone, Debug, Deserialize)]
pub struct GameweekEvent {
    /// Gameweek number (1-based)
    pub id: u32,
    /// Whether this is the currently active gameweek
    pub is_current: bool,
}

impl Bootstrap {
    /// The currently active gameweek, if the season is in play
    pub fn current_event(&self) -> Option<&GameweekEvent> {
        self.events.iter().find(|e| e.is_current)
    }
}

/// One page of classic-league standings
#[derive(Clone, Debug, Deserialize)]
pub struct StandingsPage {
    /// The standings body holding this page's entries
    pub standings: StandingsBody,
}

/// Body of a standings page
#[derive(Clone, Debug, Deserialize)]
pub struct StandingsBody {
    /// Ranked entries on this page
    pub results: Vec<StandingEntry>,
}

/// One ranked manager in a standings page
#[derive(Clone, Debug, Deserialize)]
pub struct StandingEntry {
    /// The manager's entry (team) id, used for the picks endpoint
    pub entry: u64,
}

/// A manager's squad selection for one gameweek
#[derive(Clone, Debug, Deserialize)]
pub struct EntryPicks {
    /// The fifteen picks, bench included
    pub picks: Vec<Pick>,
}

/// A single picked player
///
/// `multiplier` is 0 for a benched player, 1 for a starter, 2 for the
/// captain, and 3 when the triple-captain chip is active.
#[derive(Clone, Debug, Deserialize)]
pub struct Pick {
    /// Player (element) id
    pub element: u32,
    /// Points multiplier applied to this pick
    pub multiplier: u32,
}

/// Ownership accumulators for a single player across the sampled managers
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerOwnership {
    /// Sum of pick multipliers across all sampled managers
    pub multiplier_sum: u64,
    /// Number of managers holding the player (bench included)
    pub selected: u64,
    /// Number of managers captaining the player
    pub captained: u64,
    /// Number of managers triple-captaining the player
    pub tripled: u64,
    /// Effective ownership as a percentage of sampled managers
    pub eo: f64,
}

/// The aggregated effective-ownership snapshot written to disk
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EoSnapshot {
    /// Gameweek the snapshot was taken for
    pub gameweek: u32,
    /// Number of managers whose picks contributed to the snapshot
    pub total_managers: u64,
    /// Per-player ownership, keyed by player id
    ///
    /// A `BTreeMap` keeps the serialized output deterministic.
    pub players: BTreeMap<u32, PlayerOwnership>,
    /// When the snapshot was built (UTC)
    pub updated_at: DateTime<Utc>,
}
