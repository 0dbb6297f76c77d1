//! Data models for the catalog.
//!
//! These are the canonical records every other part of the workspace works
//! with, independent of the metadata provider's JSON schema.

use serde::{Deserialize, Serialize};

/// Canonical anime record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anime {
    /// Provider id, stable across fetches
    pub id: String,
    pub title: String,
    /// Cover image URL (never empty, see `helpers::image_with_fallback`)
    pub image: String,
    /// Plain-text synopsis (see `helpers::sanitize_description`)
    pub description: String,
    pub status: AnimeStatus,
    pub genres: Vec<String>,
    pub episodes: Vec<Episode>,
    /// Release date string, or `"Unknown"`
    pub release_date: String,

    // Scores and counters
    pub rating: Option<f64>, // 0.0 to 10.0
    pub total_episodes: Option<u32>,
    pub current_episode: Option<u32>,
    pub popularity: Option<u64>,

    // Only populated by the info endpoint
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Airing status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AnimeStatus {
    Ongoing,
    Completed,
}

impl AnimeStatus {
    /// Map the provider's free-text status. Only the exact string `"Ongoing"`
    /// counts as ongoing.
    pub fn from_provider(status: Option<&str>) -> Self {
        match status {
            Some("Ongoing") => AnimeStatus::Ongoing,
            _ => AnimeStatus::Completed,
        }
    }
}

impl std::fmt::Display for AnimeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnimeStatus::Ongoing => write!(f, "ongoing"),
            AnimeStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for AnimeStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ongoing" => Ok(AnimeStatus::Ongoing),
            "completed" => Ok(AnimeStatus::Completed),
            _ => Err(anyhow::anyhow!("Invalid anime status: {}", s)),
        }
    }
}

/// Single episode of an anime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: String,
    pub number: u32, // 1-based
    pub title: String,
    pub video_url: String,
    pub duration: Option<u32>, // minutes
    pub thumbnail: Option<String>,
}

/// Default episode length in minutes when the provider omits it
pub const DEFAULT_EPISODE_MINUTES: u32 = 24;

/// Ordering applied to a result list
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Popularity,
    Rating,
    Latest,
    Title,
}

impl std::fmt::Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortBy::Popularity => write!(f, "popularity"),
            SortBy::Rating => write!(f, "rating"),
            SortBy::Latest => write!(f, "latest"),
            SortBy::Title => write!(f, "title"),
        }
    }
}

impl std::str::FromStr for SortBy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popularity" => Ok(SortBy::Popularity),
            "rating" => Ok(SortBy::Rating),
            "latest" => Ok(SortBy::Latest),
            "title" => Ok(SortBy::Title),
            _ => Err(anyhow::anyhow!("Invalid sort order: {}", s)),
        }
    }
}

/// Search refinements. Pure value object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub genre: Option<String>,
    pub status: Option<String>,
    pub year: Option<i32>,
    pub season: Option<String>,
    pub format: Option<String>,
    #[serde(default)]
    pub sort_by: SortBy,
    pub query: Option<String>,
}

impl SearchFilters {
    /// True when no field would change a request
    pub fn is_empty(&self) -> bool {
        self.genre.is_none()
            && self.status.is_none()
            && self.year.is_none()
            && self.season.is_none()
            && self.format.is_none()
            && self.query.is_none()
            && self.sort_by == SortBy::Popularity
    }
}

/// Genres offered by the search filter form
pub const ANIME_GENRES: &[&str] = &[
    "Action", "Adventure", "Comedy", "Drama", "Fantasy", "Horror",
    "Mystery", "Romance", "Sci-Fi", "Slice of Life", "Sports",
    "Supernatural", "Thriller", "Isekai", "Mecha", "Music",
    "Psychological", "Historical", "Military", "Police", "Demons",
    "Magic", "Super Power", "School", "Ecchi", "Harem",
];

/// Seasons offered by the search filter form
pub const ANIME_SEASONS: &[&str] = &["Winter", "Spring", "Summer", "Fall"];
