//! Favorites and recently viewed anime, kept in the local store.

use crate::models::Anime;
use crate::storage::{keys, LocalStore};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One entry of the recently viewed list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEntry {
    pub anime_id: String,
    pub title: String,
    pub image: String,
    pub viewed_at: DateTime<Utc>,
}

/// Per-user favorites and viewing history
pub struct Library {
    store: LocalStore,
    max_recent: usize,
}

impl Library {
    pub fn new(store: LocalStore, max_recent: usize) -> Self {
        Self { store, max_recent }
    }

    /// Favorite anime ids, in the order they were added
    pub fn favorites(&self) -> Result<Vec<String>> {
        self.store.get_or_default(keys::FAVORITES)
    }

    pub fn is_favorite(&self, anime_id: &str) -> Result<bool> {
        Ok(self.favorites()?.iter().any(|id| id == anime_id))
    }

    /// Add or remove `anime_id` from favorites. Returns the new membership.
    pub fn toggle_favorite(&self, anime_id: &str) -> Result<bool> {
        let mut favorites = self.favorites()?;
        let now_favorite = if let Some(pos) = favorites.iter().position(|id| id == anime_id) {
            favorites.remove(pos);
            false
        } else {
            favorites.push(anime_id.to_string());
            true
        };

        self.store.set(keys::FAVORITES, &favorites)?;
        debug!(anime_id = anime_id, favorite = now_favorite, "Favorite toggled");
        Ok(now_favorite)
    }

    /// Recently viewed anime, newest first
    pub fn recent(&self) -> Result<Vec<RecentEntry>> {
        self.store.get_or_default(keys::WATCH_HISTORY)
    }

    /// Move `anime` to the front of the recently viewed list
    pub fn record_view(&self, anime: &Anime) -> Result<()> {
        self.record_view_at(anime, Utc::now())
    }

    fn record_view_at(&self, anime: &Anime, viewed_at: DateTime<Utc>) -> Result<()> {
        let mut recent = self.recent()?;
        recent.retain(|entry| entry.anime_id != anime.id);
        recent.insert(
            0,
            RecentEntry {
                anime_id: anime.id.clone(),
                title: anime.title.clone(),
                image: anime.image.clone(),
                viewed_at,
            },
        );
        recent.truncate(self.max_recent);

        self.store.set(keys::WATCH_HISTORY, &recent)
    }

    /// Forget the viewing history. Returns whether there was any.
    pub fn clear_recent(&self) -> Result<bool> {
        let had_history = self.store.exists(keys::WATCH_HISTORY);
        self.store.remove(keys::WATCH_HISTORY)?;
        debug!(had_history = had_history, "Recently viewed cleared");
        Ok(had_history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnimeStatus;
    use chrono::Duration;
    use tempfile::TempDir;

    fn anime(id: &str) -> Anime {
        Anime {
            id: id.to_string(),
            title: format!("Anime {}", id),
            image: format!("https://img.example/{}.jpg", id),
            description: String::new(),
            status: AnimeStatus::Ongoing,
            genres: Vec::new(),
            episodes: Vec::new(),
            release_date: "Unknown".to_string(),
            rating: None,
            total_episodes: None,
            current_episode: None,
            popularity: None,
            media_type: None,
            country: None,
        }
    }

    fn library(dir: &TempDir, max_recent: usize) -> Result<Library> {
        Ok(Library::new(LocalStore::open(dir.path(), true)?, max_recent))
    }

    #[test]
    fn test_toggle_favorite() -> Result<()> {
        let dir = TempDir::new()?;
        let library = library(&dir, 10)?;

        assert!(library.toggle_favorite("21")?);
        assert!(library.toggle_favorite("113415")?);
        assert!(library.is_favorite("21")?);
        assert_eq!(library.favorites()?, vec!["21", "113415"]);

        assert!(!library.toggle_favorite("21")?);
        assert!(!library.is_favorite("21")?);
        assert_eq!(library.favorites()?, vec!["113415"]);

        Ok(())
    }

    #[test]
    fn test_recent_is_newest_first_and_unique() -> Result<()> {
        let dir = TempDir::new()?;
        let library = library(&dir, 10)?;
        let start = Utc::now();

        library.record_view_at(&anime("1"), start)?;
        library.record_view_at(&anime("2"), start + Duration::seconds(1))?;
        library.record_view_at(&anime("1"), start + Duration::seconds(2))?;

        let recent = library.recent()?;
        let ids: Vec<&str> = recent.iter().map(|e| e.anime_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(recent[0].viewed_at, start + Duration::seconds(2));

        Ok(())
    }

    #[test]
    fn test_recent_is_capped() -> Result<()> {
        let dir = TempDir::new()?;
        let library = library(&dir, 3)?;

        for id in ["1", "2", "3", "4"] {
            library.record_view(&anime(id))?;
        }

        let ids: Vec<String> = library.recent()?.into_iter().map(|e| e.anime_id).collect();
        assert_eq!(ids, vec!["4", "3", "2"]);

        assert!(library.clear_recent()?);
        assert!(library.recent()?.is_empty());
        assert!(!library.clear_recent()?);

        Ok(())
    }
}
