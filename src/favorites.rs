//! Favorites store
//!
//! Session-scoped set of starred coin ids. Ids are never checked against
//! fetched records, so a favorite survives page changes and stays inert until
//! its coin shows up again.

use std::collections::HashSet;
use std::sync::RwLock;

/// Injectable favorites abstraction
///
/// All operations are total over any id. Implementations backed by durable
/// storage can replace `InMemoryFavorites` without touching the engine.
pub trait FavoritesStore: Send + Sync {
    /// Flips membership of `id`, returning whether it is now a favorite
    fn toggle(&self, id: &str) -> bool;

    /// Checks membership
    fn is_favorite(&self, id: &str) -> bool;

    /// Number of favorites
    fn count(&self) -> usize;

    /// Snapshot of the favorite ids
    fn ids(&self) -> Vec<String>;
}

/// In-memory favorites, empty at start and never persisted
#[derive(Debug, Default)]
pub struct InMemoryFavorites {
    ids: RwLock<HashSet<String>>,
}

impl InMemoryFavorites {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FavoritesStore for InMemoryFavorites {
    fn toggle(&self, id: &str) -> bool {
        // A poisoned lock only means another toggle panicked; the set is still valid.
        let mut ids = self.ids.write().unwrap_or_else(|e| e.into_inner());
        let now_favorite = if ids.remove(id) {
            false
        } else {
            ids.insert(id.to_string());
            true
        };
        log::debug!("Favorite {} -> {}", id, now_favorite);
        now_favorite
    }

    fn is_favorite(&self, id: &str) -> bool {
        self.ids
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(id)
    }

    fn count(&self) -> usize {
        self.ids.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .ids
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let favorites = InMemoryFavorites::new();
        assert_eq!(favorites.count(), 0);
        assert!(!favorites.is_favorite("bitcoin"));
        assert!(favorites.ids().is_empty());
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let favorites = InMemoryFavorites::new();
        favorites.toggle("ethereum");
        let before_ids = favorites.ids();
        let before_count = favorites.count();

        assert!(favorites.toggle("bitcoin"));
        assert!(favorites.is_favorite("bitcoin"));
        assert_eq!(favorites.count(), before_count + 1);

        assert!(!favorites.toggle("bitcoin"));
        assert_eq!(favorites.ids(), before_ids);
        assert_eq!(favorites.count(), before_count);
    }

    #[test]
    fn test_accepts_unknown_ids() {
        let favorites = InMemoryFavorites::new();
        assert!(favorites.toggle("not-a-listed-coin"));
        assert!(favorites.toggle(""));
        assert_eq!(favorites.count(), 2);
        assert_eq!(favorites.ids(), vec!["".to_string(), "not-a-listed-coin".to_string()]);
    }
}
