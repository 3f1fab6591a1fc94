use serde_json::{Value, json};

use super::{ToolError, ToolFuture, ToolRegistry, ToolSpec, args};
use crate::client::TraktClient;
use crate::formatters::{format_episode_marked, format_watched_shows};

pub fn register(registry: &mut ToolRegistry) {
    registry.register(ToolSpec::new(
        "get_watched_shows",
        "Retrieve the user's complete Trakt.tv watch history of TV shows: titles, years, \
         seasons watched and when each show was last watched. Use it before recommending \
         something, to avoid suggesting shows the user has already seen.",
        json!({ "type": "object", "properties": {} }),
        get_watched_shows,
    ));

    registry.register(ToolSpec::new(
        "mark_episode_as_watched",
        "Mark a single episode as watched in the user's Trakt.tv history. Requires the \
         numeric Trakt episode ID, as listed by get_show_all_episodes or \
         get_show_season_episodes.",
        json!({
            "type": "object",
            "properties": {
                "episode_id": {
                    "type": "string",
                    "pattern": "^[0-9]+$",
                    "description": "Trakt episode ID (numeric)"
                }
            },
            "required": ["episode_id"]
        }),
        mark_episode_as_watched,
    ));
}

fn get_watched_shows<'a>(client: &'a TraktClient, _args: &'a Value) -> ToolFuture<'a> {
    Box::pin(async move {
        tracing::info!("Fetching watched shows...");
        let data = client.get_watched_shows().await?;
        Ok::<_, ToolError>(format_watched_shows(&data))
    })
}

fn mark_episode_as_watched<'a>(client: &'a TraktClient, args: &'a Value) -> ToolFuture<'a> {
    Box::pin(async move {
        let episode_id = args::numeric_id(args, "episode_id")?;
        tracing::info!("Marking episode {} as watched...", episode_id);
        let data = client.mark_episode_as_watched(&episode_id).await?;
        Ok::<_, ToolError>(format_episode_marked(&data))
    })
}
