//! Per-version memoization of catalog lookups.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::api::{Catalog, Mod, SearchParams};
use crate::error::{Error, Result};

/// Memoizes "all mods for a game version" and a derived slug index.
///
/// Populated at most once per version per cache lifetime under normal use.
/// Two tasks racing the first access for the same version may both hit the
/// network; the first insert wins and the loser's result is dropped, so the
/// cache always ends up with exactly one consistent entry per version.
/// Locks are never held across an await.
pub struct CatalogCache {
    catalog: Arc<dyn Catalog>,
    mods: Mutex<HashMap<String, Arc<Vec<Mod>>>>,
    by_slug: Mutex<HashMap<String, Arc<HashMap<String, Mod>>>>,
}

impl CatalogCache {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            catalog,
            mods: Mutex::new(HashMap::new()),
            by_slug: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying catalog client, for calls that bypass the cache.
    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.catalog
    }

    /// All mods for a game version (empty string = unconstrained).
    pub async fn all_mods(&self, version: &str) -> Result<Arc<Vec<Mod>>> {
        if let Some(mods) = self.mods.lock().unwrap().get(version) {
            return Ok(Arc::clone(mods));
        }

        let fetched = self
            .catalog
            .search(&SearchParams::for_version(version))
            .await?;
        tracing::debug!(version, count = fetched.len(), "cached mod list");

        let mut map = self.mods.lock().unwrap();
        let entry = map
            .entry(version.to_string())
            .or_insert_with(|| Arc::new(fetched));
        Ok(Arc::clone(entry))
    }

    /// Look up a mod by its slug within a game version.
    pub async fn mod_by_slug(&self, slug: &str, version: &str) -> Result<Mod> {
        let index = self.slug_index(version).await?;
        index
            .get(slug)
            .cloned()
            .ok_or_else(|| Error::SlugNotFound(slug.to_string()))
    }

    /// Slug → mod index for a version, built lazily from [`Self::all_mods`]
    /// on the first slug lookup; repeated lookups are O(1).
    async fn slug_index(&self, version: &str) -> Result<Arc<HashMap<String, Mod>>> {
        if let Some(index) = self.by_slug.lock().unwrap().get(version) {
            return Ok(Arc::clone(index));
        }

        let mods = self.all_mods(version).await?;
        let built: HashMap<String, Mod> = mods
            .iter()
            .map(|m| (m.slug.clone(), m.clone()))
            .collect();

        let mut map = self.by_slug.lock().unwrap();
        let entry = map
            .entry(version.to_string())
            .or_insert_with(|| Arc::new(built));
        Ok(Arc::clone(entry))
    }
}
