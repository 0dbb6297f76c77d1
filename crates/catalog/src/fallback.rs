//! Static catalog served whenever the metadata API is unavailable.

use once_cell::sync::Lazy;
use shared::{Anime, AnimeStatus};

static FALLBACK_ANIME: Lazy<Vec<Anime>> = Lazy::new(|| {
    vec![
        entry(
            "1",
            "One Piece",
            "https://images.unsplash.com/photo-1634017839464-5c339ebe3cb4?w=400&h=600&fit=crop",
            "Monkey D. Luffy and his pirate crew sail the Grand Line in search of the legendary treasure, the One Piece.",
            AnimeStatus::Ongoing,
            &["Action", "Adventure", "Comedy", "Fantasy"],
            "1999-10-20",
            8.7,
            (1100, 1100),
            1_000_000,
        ),
        entry(
            "2",
            "Attack on Titan",
            "https://images.unsplash.com/photo-1620641788421-7a1c342ea42e?w=400&h=600&fit=crop",
            "Humanity lives inside cities surrounded by enormous walls that protect them from the Titans.",
            AnimeStatus::Completed,
            &["Action", "Drama", "Fantasy", "Horror"],
            "2013-04-07",
            9.0,
            (75, 75),
            950_000,
        ),
        entry(
            "3",
            "Demon Slayer",
            "https://images.unsplash.com/photo-1578632749014-ca77efd052eb?w=400&h=600&fit=crop",
            "Tanjiro Kamado sets out to cure his sister, who has been turned into a demon, and to avenge his family.",
            AnimeStatus::Completed,
            &["Action", "Fantasy", "Supernatural"],
            "2019-04-06",
            8.8,
            (26, 26),
            900_000,
        ),
    ]
});

#[allow(clippy::too_many_arguments)]
fn entry(
    id: &str,
    title: &str,
    image: &str,
    description: &str,
    status: AnimeStatus,
    genres: &[&str],
    release_date: &str,
    rating: f64,
    (total_episodes, current_episode): (u32, u32),
    popularity: u64,
) -> Anime {
    Anime {
        id: id.to_string(),
        title: title.to_string(),
        image: image.to_string(),
        description: description.to_string(),
        status,
        genres: genres.iter().map(|g| g.to_string()).collect(),
        episodes: Vec::new(),
        release_date: release_date.to_string(),
        rating: Some(rating),
        total_episodes: Some(total_episodes),
        current_episode: Some(current_episode),
        popularity: Some(popularity),
        media_type: None,
        country: None,
    }
}

/// The whole fallback catalog (trending)
pub fn all() -> Vec<Anime> {
    FALLBACK_ANIME.clone()
}

/// Leading slice used for popular
pub fn popular() -> Vec<Anime> {
    FALLBACK_ANIME.iter().take(2).cloned().collect()
}

pub fn with_status(status: AnimeStatus) -> Vec<Anime> {
    FALLBACK_ANIME
        .iter()
        .filter(|anime| anime.status == status)
        .cloned()
        .collect()
}

/// Entries whose title or any genre contains `query`, ignoring case
pub fn matching(query: &str) -> Vec<Anime> {
    let needle = query.to_lowercase();
    FALLBACK_ANIME
        .iter()
        .filter(|anime| {
            anime.title.to_lowercase().contains(&needle)
                || anime.genres.iter().any(|g| g.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Entries tagged with exactly `genre`
pub fn with_genre(genre: &str) -> Vec<Anime> {
    FALLBACK_ANIME
        .iter()
        .filter(|anime| anime.genres.iter().any(|g| g == genre))
        .cloned()
        .collect()
}

pub fn by_id(id: &str) -> Option<Anime> {
    FALLBACK_ANIME.iter().find(|anime| anime.id == id).cloned()
}
