use crate::core::merge_favorites;
use crate::models::ServiceRecord;
use crate::services::catalog::Catalog;
use crate::services::storage::{KeyValueStore, FAVORITES_KEY};
use std::sync::Arc;

/// Favorite program names, persisted through a `KeyValueStore`
///
/// The in-memory list is authoritative for the session; storage is written
/// after every change on a best-effort basis.
pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
    ids: Vec<String>,
}

impl FavoritesStore {
    /// Open the store, reading whatever was persisted before
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let ids = read_ids(store.as_ref());
        Self { store, ids }
    }

    /// Favorite identifiers in the order they were added
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_favorite(&self, record: &ServiceRecord) -> bool {
        record
            .id()
            .map(|id| self.ids.iter().any(|fav| fav == id))
            .unwrap_or(false)
    }

    /// Add the record if absent, remove it if present
    ///
    /// Returns whether the record is a favorite afterwards. Records without a
    /// program name cannot be pinned.
    pub fn toggle(&mut self, record: &ServiceRecord) -> bool {
        let Some(id) = record.id() else {
            tracing::debug!("Ignoring favorite toggle for record without a program name");
            return false;
        };

        let now_favorite = match self.ids.iter().position(|fav| fav == id) {
            Some(index) => {
                self.ids.remove(index);
                false
            }
            None => {
                self.ids.push(id.to_string());
                true
            }
        };

        self.persist();
        now_favorite
    }

    /// Favorites resolved against the catalog; stale names are skipped
    pub fn records(&self, catalog: &Catalog) -> Vec<ServiceRecord> {
        catalog.resolve(self.ids.iter().map(String::as_str))
    }

    /// `results` followed by the favorites they do not already contain
    pub fn merge(&self, results: &[ServiceRecord], catalog: &Catalog) -> Vec<ServiceRecord> {
        merge_favorites(results, &self.records(catalog))
    }

    fn persist(&self) {
        let json = match serde_json::to_string(&self.ids) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize favorites: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.set(FAVORITES_KEY, &json) {
            tracing::warn!("Failed to persist favorites, keeping them in memory: {}", e);
        }
    }
}

/// Missing, unreadable, or corrupt state all read as "no favorites"
fn read_ids(store: &dyn KeyValueStore) -> Vec<String> {
    let raw = match store.get(FAVORITES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!("Favorites storage unavailable: {}", e);
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(ids) => {
            let mut unique: Vec<String> = Vec::with_capacity(ids.len());
            for id in ids {
                let id = id.trim().to_string();
                if !id.is_empty() && !unique.contains(&id) {
                    unique.push(id);
                }
            }
            unique
        }
        Err(e) => {
            tracing::warn!("Discarding corrupt favorites: {}", e);
            Vec::new()
        }
    }
}
