//! Persisted set of user-saved articles
//!
//! Favorites map an article identifier to the full article, so a saved story
//! stays readable after it drops out of the live feed. The whole set is
//! rewritten to the store after every change.

use std::collections::BTreeMap;
use tracing::warn;

use crate::data::Article;
use crate::store::{self, KeyValueStore, FAVORITES_KEY};

/// Article identifier → article
pub type FavoritesSet = BTreeMap<String, Article>;

/// Owns the in-memory favorites set and keeps the store in step with it
#[derive(Debug)]
pub struct FavoritesLedger<S> {
    store: S,
    set: FavoritesSet,
}

impl<S: KeyValueStore> FavoritesLedger<S> {
    /// Loads the persisted set; a missing or unreadable value starts empty
    pub async fn load(store: S) -> Self {
        let set = store::read_json(&store, FAVORITES_KEY).await.unwrap_or_default();
        Self { store, set }
    }

    pub fn is_favorite(&self, article_id: &str) -> bool {
        self.set.contains_key(article_id)
    }

    /// Removes the article if present, otherwise adds it, then persists the whole set
    ///
    /// A failed write is logged; the in-memory change is kept.
    pub async fn toggle(&mut self, article: &Article) -> &FavoritesSet {
        let id = article.id().to_string();
        if self.set.remove(&id).is_none() {
            self.set.insert(id, article.clone());
        }

        if let Err(err) = store::write_json(&self.store, FAVORITES_KEY, &self.set).await {
            warn!(error = %err, "failed to persist favorites");
        }
        &self.set
    }

    pub fn count(&self) -> usize {
        self.set.len()
    }

    pub fn get(&self, article_id: &str) -> Option<&Article> {
        self.set.get(article_id)
    }

    pub fn set(&self) -> &FavoritesSet {
        &self.set
    }

    /// Saved articles in identifier order
    pub fn articles(&self) -> impl Iterator<Item = &Article> {
        self.set.values()
    }
}
