//! Data model for catalog records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SortType;

/// A catalog entry for one distributable mod.
///
/// Immutable once fetched; cached per game version by
/// [`CatalogCache`](crate::catalog::CatalogCache).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mod {
    pub id: u64,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub website_url: String,
    #[serde(default)]
    pub primary_language: String,
    #[serde(default)]
    pub download_count: f64,
    #[serde(default)]
    pub popularity_score: f64,
    #[serde(default)]
    pub game_popularity_rank: u64,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub date_released: DateTime<Utc>,
    /// One pre-selected latest file per supported game branch.
    #[serde(default)]
    pub latest_files: Vec<ModFile>,
}

/// One downloadable artifact belonging to a mod.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModFile {
    #[serde(rename = "fileName")]
    pub name: String,
    #[serde(rename = "downloadUrl")]
    pub url: String,
    #[serde(rename = "fileDate")]
    pub uploaded: DateTime<Utc>,
    #[serde(rename = "fileLength")]
    pub size: u64,
    /// Game version strings this file supports.
    #[serde(rename = "gameVersion", default)]
    pub versions: Vec<String>,
}

impl ModFile {
    /// Whether this file supports the given game version.
    pub fn supports(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }
}

/// Parameters for a catalog search.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    /// Free-text search filter.
    pub search: String,
    /// Game version to constrain results to; empty means unconstrained.
    pub version: String,
    /// Maximum number of results; 0 lets the service pick.
    pub page_size: u32,
    pub sort: SortType,
}

impl SearchParams {
    /// Search constrained to a game version only.
    pub fn for_version(version: &str) -> Self {
        Self {
            version: version.to_string(),
            ..Self::default()
        }
    }
}
