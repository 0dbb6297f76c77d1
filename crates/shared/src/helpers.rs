//! Text and presentation helpers shared by the gateway and the CLI.

use crate::models::{Anime, SortBy};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

/// Cover used whenever the provider sends no usable image
pub const FALLBACK_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1578632749014-ca77efd052eb?w=400&h=600&fit=crop";

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static ESCAPED_NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\n").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Return `image_url`, or the fixed fallback cover if it is missing or
/// carries a stringified `null`/`undefined`.
pub fn image_with_fallback(image_url: Option<&str>) -> String {
    match image_url {
        Some(url) if !url.is_empty() && !url.contains("null") && !url.contains("undefined") => {
            url.to_string()
        }
        _ => FALLBACK_IMAGE_URL.to_string(),
    }
}

/// Strip markup from a provider synopsis.
///
/// Removes HTML tags, turns literal `\n` escape sequences into spaces and
/// collapses whitespace runs to a single space.
pub fn sanitize_description(description: &str) -> String {
    let without_tags = HTML_TAG.replace_all(description, "");
    let without_escapes = ESCAPED_NEWLINE.replace_all(&without_tags, " ");
    WHITESPACE_RUN
        .replace_all(&without_escapes, " ")
        .trim()
        .to_string()
}

/// Cut `text` to `max_chars` characters, appending `...` when shortened
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

/// Format a duration in seconds as `1h 5m` or `12m`
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Parse a release date that is either a full date or a bare year
pub fn parse_release_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            value
                .parse::<i32>()
                .ok()
                .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
        })
}

/// Return a sorted copy of `anime`. Sorting is stable; missing values sort last.
pub fn sort_anime(anime: &[Anime], sort_by: SortBy) -> Vec<Anime> {
    let mut sorted = anime.to_vec();

    match sort_by {
        SortBy::Popularity => {
            sorted.sort_by(|a, b| b.popularity.unwrap_or(0).cmp(&a.popularity.unwrap_or(0)))
        }
        SortBy::Rating => sorted.sort_by(|a, b| {
            b.rating
                .unwrap_or(0.0)
                .partial_cmp(&a.rating.unwrap_or(0.0))
                .unwrap_or(Ordering::Equal)
        }),
        SortBy::Latest => sorted.sort_by(|a, b| {
            parse_release_date(&b.release_date).cmp(&parse_release_date(&a.release_date))
        }),
        SortBy::Title => sorted.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase())),
    }

    sorted
}
