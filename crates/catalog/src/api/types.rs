//! Consumet (AniList meta provider) response types.
//!
//! These types mirror the provider's JSON. Every field the normalizer can
//! live without is optional; `id` is the only hard requirement.

use serde::{Deserialize, Serialize};

/// List endpoints (`trending`, `popular`, `advanced-search`, search)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub has_next_page: Option<bool>,
    pub results: Vec<RawAnime>,
}

/// Provider ids arrive as numbers from AniList and as strings elsewhere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for RawId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawId::Number(n) => write!(f, "{}", n),
            RawId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Title object, or a bare string from some endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTitle {
    Localized {
        #[serde(default)]
        romaji: Option<String>,
        #[serde(default)]
        english: Option<String>,
        #[serde(default)]
        native: Option<String>,
    },
    Plain(String),
}

/// Release date as a date string or a bare year
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDate {
    Year(i64),
    Text(String),
}

/// Anime record as returned by list and info endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnime {
    pub id: RawId,
    #[serde(default)]
    pub title: Option<RawTitle>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub release_date: Option<RawDate>,

    // Scores and counters
    #[serde(default)]
    pub rating: Option<f64>, // 0 to 100
    #[serde(default)]
    pub total_episodes: Option<u32>,
    #[serde(default)]
    pub current_episode: Option<u32>,
    #[serde(default)]
    pub popularity: Option<u64>,

    // Info endpoint only
    #[serde(default)]
    pub episodes: Option<Vec<RawEpisode>>,
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub country_of_origin: Option<String>,
}

/// Episode entry of the info endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEpisode {
    #[serde(default)]
    pub id: Option<RawId>,
    pub number: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_response() {
        let json = r#"{
            "currentPage": 1,
            "hasNextPage": true,
            "results": [
                {
                    "id": "21",
                    "title": { "romaji": "One Piece", "english": "ONE PIECE", "native": "ワンピース" },
                    "image": "https://s4.anilist.co/file/op.jpg",
                    "status": "Ongoing",
                    "rating": 87,
                    "genres": ["Action", "Adventure"],
                    "releaseDate": 1999,
                    "totalEpisodes": null
                },
                { "id": 16498, "title": "Shingeki no Kyojin" }
            ]
        }"#;

        let response: ListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.has_next_page, Some(true));

        let first = &response.results[0];
        assert_eq!(first.id, RawId::Text("21".to_string()));
        assert!(matches!(first.release_date, Some(RawDate::Year(1999))));
        assert!(matches!(
            &first.title,
            Some(RawTitle::Localized { romaji: Some(r), .. }) if r == "One Piece"
        ));
        assert_eq!(first.rating, Some(87.0));

        let second = &response.results[1];
        assert_eq!(second.id.to_string(), "16498");
        assert!(matches!(&second.title, Some(RawTitle::Plain(t)) if t == "Shingeki no Kyojin"));
        assert!(second.genres.is_none());
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let json = r#"{ "results": [ { "title": "No id" } ] }"#;
        assert!(serde_json::from_str::<ListResponse>(json).is_err());
    }

    #[test]
    fn test_parse_info_episodes() {
        let json = r#"{
            "id": "21",
            "type": "TV",
            "countryOfOrigin": "JP",
            "episodes": [
                { "id": "one-piece-episode-1", "number": 1, "title": "I'm Luffy!", "url": "https://x/1" },
                { "number": 2 }
            ]
        }"#;

        let raw: RawAnime = serde_json::from_str(json).unwrap();
        let episodes = raw.episodes.unwrap();
        assert_eq!(episodes.len(), 2);
        assert!(episodes[1].id.is_none());
        assert_eq!(raw.media_type.as_deref(), Some("TV"));
        assert_eq!(raw.country_of_origin.as_deref(), Some("JP"));
    }
}
