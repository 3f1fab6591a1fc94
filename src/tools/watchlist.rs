use serde_json::{Value, json};

use super::{ToolError, ToolFuture, ToolRegistry, ToolSpec, args};
use crate::client::TraktClient;
use crate::formatters::{format_watchlist, format_watchlist_added, format_watchlist_removed};

fn show_id_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "show_id": {
                "type": "string",
                "pattern": "^[0-9]+$",
                "description": description
            }
        },
        "required": ["show_id"]
    })
}

pub fn register(registry: &mut ToolRegistry) {
    registry.register(ToolSpec::new(
        "get_watchlist",
        "Fetch the user's personal Trakt.tv watchlist: shows they saved to watch later, with \
         year, aired episode count and the date each was added. Check this first when the \
         user asks what to watch; these are shows they already chose.",
        json!({ "type": "object", "properties": {} }),
        get_watchlist,
    ));

    registry.register(ToolSpec::new(
        "add_to_watchlist",
        "Add a TV show to the user's Trakt.tv watchlist. Needs the numeric Trakt show ID: call \
         search_shows first and take the ID from its results (not a slug or IMDb ID).",
        show_id_schema("Trakt show ID (numeric) obtained from search_shows"),
        add_to_watchlist,
    ));

    registry.register(ToolSpec::new(
        "remove_from_watchlist",
        "Remove a TV show from the user's Trakt.tv watchlist. Watch history is not affected.",
        show_id_schema("Trakt show ID (numeric) to remove"),
        remove_from_watchlist,
    ));
}

fn get_watchlist<'a>(client: &'a TraktClient, _args: &'a Value) -> ToolFuture<'a> {
    Box::pin(async move {
        tracing::info!("Fetching watchlist...");
        let data = client.get_watchlist().await?;
        Ok::<_, ToolError>(format_watchlist(&data))
    })
}

fn add_to_watchlist<'a>(client: &'a TraktClient, args: &'a Value) -> ToolFuture<'a> {
    Box::pin(async move {
        let show_id = args::numeric_id(args, "show_id")?;
        tracing::info!("Adding show {} to watchlist...", show_id);
        let data = client.add_to_watchlist(&show_id).await?;
        Ok::<_, ToolError>(format_watchlist_added(&data))
    })
}

fn remove_from_watchlist<'a>(client: &'a TraktClient, args: &'a Value) -> ToolFuture<'a> {
    Box::pin(async move {
        let show_id = args::numeric_id(args, "show_id")?;
        tracing::info!("Removing show {} from watchlist...", show_id);
        let data = client.remove_from_watchlist(&show_id).await?;
        Ok::<_, ToolError>(format_watchlist_removed(&data))
    })
}
