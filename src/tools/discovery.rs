use serde_json::{Value, json};

use super::{ToolError, ToolFuture, ToolRegistry, ToolSpec, args};
use crate::client::TraktClient;
use crate::client::endpoints::DEFAULT_TRENDING_LIMIT;
use crate::formatters::{
    format_search_results, format_show_all_episodes, format_show_season_episodes,
    format_trending_shows,
};

const MAX_TRENDING_LIMIT: u32 = 20;

pub fn register(registry: &mut ToolRegistry) {
    registry.register(ToolSpec::new(
        "search_shows",
        "Search the Trakt.tv TV show database by title or keywords. Returns the top 10 matches \
         with title, year, rating and the numeric Trakt ID needed by the watchlist and episode \
         tools.",
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Search query (show title or keywords)"
                }
            },
            "required": ["query"]
        }),
        search_shows,
    ));

    registry.register(ToolSpec::new(
        "get_trending_shows",
        "Get the TV shows currently trending on Trakt.tv, ranked by how many people are \
         watching right now.",
        json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_TRENDING_LIMIT,
                    "default": DEFAULT_TRENDING_LIMIT,
                    "description": "Number of shows to return (1-20)"
                }
            }
        }),
        get_trending_shows,
    ));

    registry.register(ToolSpec::new(
        "get_show_all_episodes",
        "Overview of every season of a show with its episodes: season and episode numbers, \
         titles and episode IDs (usable with mark_episode_as_watched). Season 0 holds specials.",
        json!({
            "type": "object",
            "properties": {
                "show_id": {
                    "type": "string",
                    "pattern": "^[0-9]+$",
                    "description": "Trakt show ID (numeric) obtained from search_shows"
                }
            },
            "required": ["show_id"]
        }),
        get_show_all_episodes,
    ));

    registry.register(ToolSpec::new(
        "get_show_season_episodes",
        "Detailed episode list for one season of a show: titles, air dates, ratings when \
         available and episode IDs. Use season 0 for specials.",
        json!({
            "type": "object",
            "properties": {
                "show_id": {
                    "type": "string",
                    "pattern": "^[0-9]+$",
                    "description": "Trakt show ID (numeric) obtained from search_shows"
                },
                "season": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Season number (0 = specials, 1+ = regular seasons)"
                }
            },
            "required": ["show_id", "season"]
        }),
        get_show_season_episodes,
    ));
}

fn search_shows<'a>(client: &'a TraktClient, args: &'a Value) -> ToolFuture<'a> {
    Box::pin(async move {
        let query = args::required_str(args, "query")?;
        tracing::info!("Searching for: {}", query);
        let data = client.search_shows(query).await?;
        Ok::<_, ToolError>(format_search_results(query, &data))
    })
}

fn get_trending_shows<'a>(client: &'a TraktClient, args: &'a Value) -> ToolFuture<'a> {
    Box::pin(async move {
        let limit = args::int_in_range(
            args,
            "limit",
            1,
            MAX_TRENDING_LIMIT,
            Some(DEFAULT_TRENDING_LIMIT),
        )?;
        tracing::info!("Fetching {} trending shows...", limit);
        let data = client.get_trending_shows(limit).await?;
        Ok::<_, ToolError>(format_trending_shows(&data))
    })
}

fn get_show_all_episodes<'a>(client: &'a TraktClient, args: &'a Value) -> ToolFuture<'a> {
    Box::pin(async move {
        let show_id = args::numeric_id(args, "show_id")?;
        tracing::info!("Fetching all episodes overview for show ID: {}", show_id);
        let data = client.get_show_all_episodes(&show_id).await?;
        Ok::<_, ToolError>(format_show_all_episodes(&data))
    })
}

fn get_show_season_episodes<'a>(client: &'a TraktClient, args: &'a Value) -> ToolFuture<'a> {
    Box::pin(async move {
        let show_id = args::numeric_id(args, "show_id")?;
        let season = args::int_in_range(args, "season", 0, u32::MAX, None)?;
        tracing::info!(
            "Fetching detailed episodes for show ID: {}, season {}",
            show_id,
            season
        );
        let data = client.get_show_season_episodes(&show_id, season).await?;
        Ok::<_, ToolError>(format_show_season_episodes(&data, season))
    })
}
