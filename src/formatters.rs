//! Pure display formatting for tool results.
//!
//! Every function takes the loosely-typed payload returned by the client and
//! renders a markdown-ish string for the assistant. Missing fields never
//! fail; they render as a default.

use chrono::DateTime;
use serde_json::Value;

use crate::payload::PayloadExt;

// ── Watch history ───────────────────────────────────────────────────────────

pub fn format_watched_shows(shows: &[Value]) -> String {
    if shows.is_empty() {
        return "📺 No watched shows found in your history.".to_string();
    }

    let mut lines = vec![format!("📺 **Watch History** (Total: {} shows)\n", shows.len())];
    for item in shows {
        let show = item.field("show");
        lines.push(format!(
            "• **{}** ({}) — {} seasons • Last: {}",
            show.str_or("title", "Unknown"),
            show.display_or("year", "N/A"),
            item.list("seasons").len(),
            short_date(item.str_or("last_watched_at", "")),
        ));
    }
    lines.join("\n")
}

pub fn format_episode_marked(response: &Value) -> String {
    let marked = response.field("added").u64_or("episodes", 0);
    format!("✓ Successfully marked {} episode(s) as watched.", marked)
}

// ── Watchlist ───────────────────────────────────────────────────────────────

pub fn format_watchlist(watchlist: &[Value]) -> String {
    if watchlist.is_empty() {
        return "📝 Your watchlist is empty. Add shows you want to watch later!".to_string();
    }

    let mut lines = vec![format!(
        "📝 **Your Watchlist** (Total: {} shows)\n",
        watchlist.len()
    )];
    for item in watchlist {
        let show = item.field("show");
        lines.push(format!(
            "• **{}** ({}) — {} episodes • Added: {}",
            show.str_or("title", "Unknown"),
            show.display_or("year", "N/A"),
            show.u64_or("aired_episodes", 0),
            short_date(item.str_or("listed_at", "")),
        ));
    }
    lines.join("\n")
}

pub fn format_watchlist_added(response: &Value) -> String {
    let added = response.field("added").u64_or("shows", 0);
    format!("✓ Successfully added {} show(s) to your watchlist.", added)
}

pub fn format_watchlist_removed(response: &Value) -> String {
    let deleted = response.field("deleted").u64_or("shows", 0);
    format!("✓ Successfully removed {} show(s) from your watchlist.", deleted)
}

// ── Discovery ───────────────────────────────────────────────────────────────

pub fn format_search_results(query: &str, results: &[Value]) -> String {
    if results.is_empty() {
        return format!("🔍 No shows found matching '{}'", query);
    }

    let mut lines = vec![format!(
        "🔍 **Search Results for '{}'** (Top {} matches)\n",
        query,
        results.len()
    )];
    for item in results {
        let show = item.field("show");
        lines.push(format!(
            "• **{}** ({}) — ⭐ {:.1}/10 • ID: {}",
            show.str_or("title", "Unknown"),
            show.display_or("year", "N/A"),
            show.f64_or("rating", 0.0),
            show.field("ids").display_or("trakt", "N/A"),
        ));
    }
    lines.join("\n")
}

pub fn format_trending_shows(trending: &[Value]) -> String {
    if trending.is_empty() {
        return "📈 No trending shows available at the moment.".to_string();
    }

    let mut lines = vec![format!("📈 **Trending Shows** (Top {})\n", trending.len())];
    for (idx, item) in trending.iter().enumerate() {
        let show = item.field("show");
        lines.push(format!(
            "{}. **{}** ({}) — 👥 {} watchers",
            idx + 1,
            show.str_or("title", "Unknown"),
            show.display_or("year", "N/A"),
            group_thousands(item.u64_or("watchers", 0)),
        ));
    }
    lines.join("\n")
}

// ── Episodes ────────────────────────────────────────────────────────────────

/// Overview of every season, as returned by `/shows/{id}/seasons?extended=episodes`.
pub fn format_show_all_episodes(seasons: &[Value]) -> String {
    if seasons.is_empty() {
        return "📺 No seasons found for this show.".to_string();
    }

    let total_episodes: usize = seasons.iter().map(|s| s.list("episodes").len()).sum();
    let mut lines = vec![format!(
        "📺 **Show Overview** ({} seasons, {} episodes)",
        seasons.len(),
        total_episodes
    )];

    for season in seasons {
        let number = season.u64_or("number", 0);
        let episodes = season.list("episodes");
        lines.push(String::new());
        lines.push(format!(
            "**{}** ({} episodes)",
            season_label(number),
            episodes.len()
        ));
        for ep in episodes {
            let mut parts = vec![format!(
                "  • S{:02}E{:02} — {}",
                ep.u64_or("season", number),
                ep.u64_or("number", 0),
                ep.str_or("title", "TBA"),
            )];
            if let Some(aired) = ep.get("first_aired").and_then(Value::as_str) {
                parts.push(format!("Aired: {}", short_date(aired)));
            }
            parts.push(format!("ID: {}", ep.field("ids").display_or("trakt", "N/A")));
            lines.push(parts.join(" • "));
        }
    }
    lines.join("\n")
}

/// Detail for one season, as returned by `/shows/{id}/seasons/{n}`.
pub fn format_show_season_episodes(episodes: &[Value], season: u32) -> String {
    let label = season_label(u64::from(season));
    if episodes.is_empty() {
        return format!("📺 No episodes found for {}.", label);
    }

    let mut lines = vec![format!("📺 **{}** ({} episodes)\n", label, episodes.len())];
    for ep in episodes {
        let mut parts = vec![format!(
            "• E{:02} — **{}**",
            ep.u64_or("number", 0),
            ep.str_or("title", "TBA"),
        )];
        if let Some(rating) = ep.get("rating").and_then(Value::as_f64) {
            parts.push(format!("⭐ {:.1}/10", rating));
        }
        if let Some(aired) = ep.get("first_aired").and_then(Value::as_str) {
            parts.push(format!("Aired: {}", short_date(aired)));
        }
        parts.push(format!("ID: {}", ep.field("ids").display_or("trakt", "N/A")));
        lines.push(parts.join(" • "));
    }
    lines.join("\n")
}

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Season 0 holds specials on Trakt.
fn season_label(number: u64) -> String {
    if number == 0 {
        "Specials".to_string()
    } else {
        format!("Season {}", number)
    }
}

/// `YYYY-MM-DD` from an RFC 3339 timestamp; falls back to the first ten
/// characters for anything else, `N/A` when empty.
fn short_date(raw: &str) -> String {
    if raw.is_empty() {
        return "N/A".to_string();
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.format("%Y-%m-%d").to_string(),
        Err(_) => raw.chars().take(10).collect(),
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
