//! Adapter from the provider schema to canonical `Anime` records.

use crate::api::{RawAnime, RawDate, RawEpisode, RawTitle};
use shared::helpers::{image_with_fallback, sanitize_description};
use shared::{Anime, AnimeStatus, Episode, DEFAULT_EPISODE_MINUTES};

const NO_DESCRIPTION: &str = "No description available";
const UNKNOWN: &str = "Unknown";

/// Normalize a list record. Episodes are never populated here.
pub fn normalize_anime(raw: RawAnime) -> Anime {
    let title = pick_title(raw.title.as_ref());
    let description = raw
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or(NO_DESCRIPTION);

    Anime {
        id: raw.id.to_string(),
        title,
        image: image_with_fallback(raw.image.as_deref()),
        description: sanitize_description(description),
        status: AnimeStatus::from_provider(raw.status.as_deref()),
        genres: raw.genres.unwrap_or_default(),
        episodes: Vec::new(),
        release_date: match raw.release_date {
            Some(RawDate::Year(year)) => year.to_string(),
            Some(RawDate::Text(date)) if !date.is_empty() => date,
            _ => UNKNOWN.to_string(),
        },
        // Provider scores are 0-100
        rating: raw.rating.filter(|r| *r != 0.0).map(|r| r / 10.0),
        total_episodes: raw.total_episodes,
        current_episode: raw.current_episode,
        popularity: raw.popularity,
        media_type: None,
        country: None,
    }
}

/// Normalize an info record, keeping its episode list and detail fields
pub fn normalize_details(mut raw: RawAnime) -> Anime {
    let raw_episodes = raw.episodes.take().unwrap_or_default();
    let media_type = raw.media_type.take();
    let country = raw.country_of_origin.take();
    let parent_image = raw.image.clone();

    let mut anime = normalize_anime(raw);
    anime.episodes = raw_episodes
        .into_iter()
        .map(|ep| normalize_episode(ep, &anime.id, parent_image.as_deref()))
        .collect();
    anime.media_type = media_type;
    anime.country = country;
    anime
}

fn normalize_episode(raw: RawEpisode, anime_id: &str, parent_image: Option<&str>) -> Episode {
    let number = raw.number;
    Episode {
        id: raw
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| format!("{}-ep-{}", anime_id, number)),
        number,
        title: raw
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("Episode {}", number)),
        video_url: raw
            .url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| format!("#episode-{}", number)),
        duration: Some(raw.duration.filter(|d| *d > 0).unwrap_or(DEFAULT_EPISODE_MINUTES)),
        thumbnail: Some(image_with_fallback(
            raw.image.as_deref().filter(|i| !i.is_empty()).or(parent_image),
        )),
    }
}

/// First non-empty of romaji, english, plain title
fn pick_title(title: Option<&RawTitle>) -> String {
    let candidate = match title {
        Some(RawTitle::Localized { romaji, english, .. }) => romaji
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(english.as_deref().filter(|t| !t.is_empty())),
        Some(RawTitle::Plain(title)) => Some(title.as_str()).filter(|t| !t.is_empty()),
        None => None,
    };
    candidate.unwrap_or(UNKNOWN).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::helpers::FALLBACK_IMAGE_URL;

    fn raw(value: serde_json::Value) -> RawAnime {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_missing_genres_become_empty() {
        let anime = normalize_anime(raw(json!({ "id": "1", "title": "X" })));
        assert_eq!(anime.genres, Vec::<String>::new());

        let anime = normalize_anime(raw(json!({ "id": "1", "genres": null })));
        assert!(anime.genres.is_empty());
    }

    #[test]
    fn test_rating_rescaled() {
        let anime = normalize_anime(raw(json!({ "id": "1", "rating": 87 })));
        assert_eq!(anime.rating, Some(8.7));

        let anime = normalize_anime(raw(json!({ "id": "1" })));
        assert_eq!(anime.rating, None);

        // A zero score means unscored
        let anime = normalize_anime(raw(json!({ "id": "1", "rating": 0 })));
        assert_eq!(anime.rating, None);
    }

    #[test]
    fn test_status_mapping() {
        let ongoing = normalize_anime(raw(json!({ "id": "1", "status": "Ongoing" })));
        assert_eq!(ongoing.status, AnimeStatus::Ongoing);

        for status in [json!("Completed"), json!("Not yet aired"), json!("ONGOING"), json!(null)] {
            let anime = normalize_anime(raw(json!({ "id": "1", "status": status })));
            assert_eq!(anime.status, AnimeStatus::Completed);
        }
        let absent = normalize_anime(raw(json!({ "id": "1" })));
        assert_eq!(absent.status, AnimeStatus::Completed);
    }

    #[test]
    fn test_title_preference() {
        let both = normalize_anime(raw(json!({
            "id": "1",
            "title": { "romaji": "Shingeki no Kyojin", "english": "Attack on Titan" }
        })));
        assert_eq!(both.title, "Shingeki no Kyojin");

        let english_only = normalize_anime(raw(json!({
            "id": "1",
            "title": { "romaji": "", "english": "Attack on Titan" }
        })));
        assert_eq!(english_only.title, "Attack on Titan");

        let plain = normalize_anime(raw(json!({ "id": "1", "title": "Naruto" })));
        assert_eq!(plain.title, "Naruto");

        let native_only = normalize_anime(raw(json!({ "id": "1", "title": { "native": "ナルト" } })));
        assert_eq!(native_only.title, "Unknown");
    }

    #[test]
    fn test_text_fields() {
        let anime = normalize_anime(raw(json!({
            "id": 21,
            "image": "null",
            "description": "<i>Gold Roger</i> was known as\\nthe Pirate King.<br>",
            "releaseDate": 1999
        })));

        assert_eq!(anime.id, "21");
        assert_eq!(anime.image, FALLBACK_IMAGE_URL);
        assert_eq!(anime.description, "Gold Roger was known as the Pirate King.");
        assert_eq!(anime.release_date, "1999");

        let bare = normalize_anime(raw(json!({ "id": "2" })));
        assert_eq!(bare.description, "No description available");
        assert_eq!(bare.release_date, "Unknown");
    }

    #[test]
    fn test_details_episodes() {
        let anime = normalize_details(raw(json!({
            "id": "21",
            "title": { "romaji": "One Piece" },
            "image": "https://img.example/op.jpg",
            "type": "TV",
            "countryOfOrigin": "JP",
            "episodes": [
                {
                    "id": "one-piece-episode-1",
                    "number": 1,
                    "title": "I'm Luffy!",
                    "url": "https://watch.example/1",
                    "duration": 25,
                    "image": "https://img.example/ep1.jpg"
                },
                { "number": 2 }
            ]
        })));

        assert_eq!(anime.media_type.as_deref(), Some("TV"));
        assert_eq!(anime.country.as_deref(), Some("JP"));
        assert_eq!(anime.episodes.len(), 2);

        let first = &anime.episodes[0];
        assert_eq!(first.id, "one-piece-episode-1");
        assert_eq!(first.duration, Some(25));
        assert_eq!(first.thumbnail.as_deref(), Some("https://img.example/ep1.jpg"));

        let second = &anime.episodes[1];
        assert_eq!(second.id, "21-ep-2");
        assert_eq!(second.title, "Episode 2");
        assert_eq!(second.video_url, "#episode-2");
        assert_eq!(second.duration, Some(DEFAULT_EPISODE_MINUTES));
        assert_eq!(second.thumbnail.as_deref(), Some("https://img.example/op.jpg"));
    }
}
