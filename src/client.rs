//! Fantasy Premier League API client
//!
//! [`FplClient`] is a thin typed wrapper over the public FPL REST endpoints.
//! The [`FplApi`] trait abstracts it so the snapshot pipeline can be driven
//! against an in-memory fake in tests.

use crate::error::{Error, Result};
use crate::types::{Bootstrap, EntryPicks, StandingsPage};
use serde::de::DeserializeOwned;
use url::Url;

/// Abstraction over the FPL endpoints the snapshot pipeline consumes,
/// enabling testability.
#[async_trait::async_trait]
pub trait FplApi: Send + Sync {
    /// Fetch the season bootstrap payload (gameweek events)
    async fn bootstrap(&self) -> Result<Bootstrap>;

    /// Fetch one page of a classic league's standings (1-based page number)
    async fn standings_page(&self, league_id: u32, page: u32) -> Result<StandingsPage>;

    /// Fetch a manager's picks for one gameweek
    async fn entry_picks(&self, entry_id: u64, event_id: u32) -> Result<EntryPicks>;
}

/// Production [`FplApi`] backed by `reqwest`
#[derive(Clone, Debug)]
pub struct FplClient {
    http: reqwest::Client,
    base_url: Url,
}

impl FplClient {
    /// Create a client against the given API base URL
    ///
    /// The base is normalized to end with a slash so endpoint paths join
    /// onto it instead of replacing its final segment.
    pub fn new(base_url: &str) -> Result<Self> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(&normalized)?,
        })
    }

    /// GET a relative endpoint and deserialize its JSON body
    ///
    /// Any non-2xx status is an [`Error::UnexpectedStatus`]; the body is not
    /// inspected in that case.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path)?;
        let response = self.http.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl FplApi for FplClient {
    async fn bootstrap(&self) -> Result<Bootstrap> {
        self.get_json("bootstrap-static/").await
    }

    async fn standings_page(&self, league_id: u32, page: u32) -> Result<StandingsPage> {
        self.get_json(&format!(
            "leagues-classic/{league_id}/standings/?page_standings={page}"
        ))
        .await
    }

    async fn entry_picks(&self, entry_id: u64, event_id: u32) -> Result<EntryPicks> {
        self.get_json(&format!("entry/{entry_id}/event/{event_id}/picks/"))
            .await
    }
}
