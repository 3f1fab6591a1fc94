//! Trakt endpoint table and the typed per-operation methods.
//!
//! Each method is a fixed-shape wrapper over [`TraktClient::execute`]. List
//! endpoints coerce any non-array body to an empty list; write endpoints
//! coerce any non-object body to an empty object.

use serde_json::{Value, json};

use super::{ApiRequest, TraktClient};
use crate::error::TraktError;

/// Result size for `/search/show`.
pub const SEARCH_LIMIT: u32 = 10;

pub const DEFAULT_TRENDING_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    WatchedShows,
    Watchlist,
    AddToWatchlist { show_id: u64 },
    RemoveFromWatchlist { show_id: u64 },
    SearchShows { query: &'a str },
    TrendingShows { limit: u32 },
    ShowSeasons { show_id: u64 },
    SeasonEpisodes { show_id: u64, season: u32 },
    MarkEpisodeWatched { episode_id: u64 },
}

impl Endpoint<'_> {
    pub fn request(&self) -> ApiRequest {
        match *self {
            Endpoint::WatchedShows => {
                ApiRequest::get("/sync/watched/shows").query("extended", "full")
            }
            Endpoint::Watchlist => {
                ApiRequest::get("/sync/watchlist/shows").query("extended", "full")
            }
            Endpoint::AddToWatchlist { show_id } => {
                ApiRequest::post("/sync/watchlist").json(ids_body("shows", show_id))
            }
            Endpoint::RemoveFromWatchlist { show_id } => {
                ApiRequest::post("/sync/watchlist/remove").json(ids_body("shows", show_id))
            }
            Endpoint::SearchShows { query } => ApiRequest::get("/search/show")
                .query("query", query)
                .query("limit", SEARCH_LIMIT),
            Endpoint::TrendingShows { limit } => {
                ApiRequest::get("/shows/trending").query("limit", limit)
            }
            Endpoint::ShowSeasons { show_id } => {
                ApiRequest::get(format!("/shows/{}/seasons", show_id))
                    .query("extended", "episodes")
            }
            Endpoint::SeasonEpisodes { show_id, season } => {
                ApiRequest::get(format!("/shows/{}/seasons/{}", show_id, season))
                    .query("extended", "min")
            }
            Endpoint::MarkEpisodeWatched { episode_id } => {
                ApiRequest::post("/sync/history").json(ids_body("episodes", episode_id))
            }
        }
    }
}

/// `{"<kind>": [{"ids": {"trakt": <id>}}]}`
fn ids_body(kind: &str, id: u64) -> Value {
    json!({ kind: [ { "ids": { "trakt": id } } ] })
}

/// Parse a numeric Trakt ID.
pub fn parse_trakt_id(raw: &str) -> Result<u64, TraktError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TraktError::api(
            format!("Invalid Trakt ID '{}': expected a numeric ID", raw),
            None,
        ));
    }
    trimmed
        .parse::<u64>()
        .map_err(|e| TraktError::api(format!("Invalid Trakt ID '{}': {}", raw, e), None))
}

impl TraktClient {
    async fn fetch_list(&self, endpoint: Endpoint<'_>) -> Result<Vec<Value>, TraktError> {
        Ok(self.execute(&endpoint.request()).await?.into_list())
    }

    async fn fetch_object(&self, endpoint: Endpoint<'_>) -> Result<Value, TraktError> {
        Ok(self.execute(&endpoint.request()).await?.into_object())
    }

    // ── Watch history ───────────────────────────────────────────────────

    pub async fn get_watched_shows(&self) -> Result<Vec<Value>, TraktError> {
        tracing::info!("Fetching watched shows");
        self.fetch_list(Endpoint::WatchedShows).await
    }

    pub async fn mark_episode_as_watched(&self, episode_id: &str) -> Result<Value, TraktError> {
        let episode_id = parse_trakt_id(episode_id)?;
        tracing::info!("Marking episode {} as watched", episode_id);
        self.fetch_object(Endpoint::MarkEpisodeWatched { episode_id })
            .await
    }

    // ── Watchlist ───────────────────────────────────────────────────────

    pub async fn get_watchlist(&self) -> Result<Vec<Value>, TraktError> {
        tracing::info!("Fetching watchlist");
        self.fetch_list(Endpoint::Watchlist).await
    }

    pub async fn add_to_watchlist(&self, show_id: &str) -> Result<Value, TraktError> {
        let show_id = parse_trakt_id(show_id)?;
        tracing::info!("Adding show {} to watchlist", show_id);
        self.fetch_object(Endpoint::AddToWatchlist { show_id }).await
    }

    pub async fn remove_from_watchlist(&self, show_id: &str) -> Result<Value, TraktError> {
        let show_id = parse_trakt_id(show_id)?;
        tracing::info!("Removing show {} from watchlist", show_id);
        self.fetch_object(Endpoint::RemoveFromWatchlist { show_id })
            .await
    }

    // ── Discovery ───────────────────────────────────────────────────────

    pub async fn search_shows(&self, query: &str) -> Result<Vec<Value>, TraktError> {
        // Queries can be long; keep log lines short.
        let preview: String = query.chars().take(50).collect();
        tracing::info!("Searching shows with query: '{}'", preview);
        self.fetch_list(Endpoint::SearchShows { query }).await
    }

    pub async fn get_trending_shows(&self, limit: u32) -> Result<Vec<Value>, TraktError> {
        tracing::info!("Fetching {} trending shows", limit);
        self.fetch_list(Endpoint::TrendingShows { limit }).await
    }

    // ── Episodes ────────────────────────────────────────────────────────

    pub async fn get_show_all_episodes(&self, show_id: &str) -> Result<Vec<Value>, TraktError> {
        let show_id = parse_trakt_id(show_id)?;
        tracing::info!("Fetching all seasons overview for show {}", show_id);
        self.fetch_list(Endpoint::ShowSeasons { show_id }).await
    }

    pub async fn get_show_season_episodes(
        &self,
        show_id: &str,
        season: u32,
    ) -> Result<Vec<Value>, TraktError> {
        let show_id = parse_trakt_id(show_id)?;
        tracing::info!(
            "Fetching detailed episodes for show {}, season {}",
            show_id,
            season
        );
        self.fetch_list(Endpoint::SeasonEpisodes { show_id, season })
            .await
    }
}
