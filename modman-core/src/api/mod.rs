//! CurseForge addon API client.
//!
//! The catalog service is consumed as a black box: it can search mods for a
//! game version, fetch many mods by ID in one call, and list the files of a
//! single mod. Everything behind the [`Catalog`] trait so the rest of the
//! crate can be exercised against an in-memory catalog in tests.

mod sort;
mod types;

pub use sort::SortType;
pub use types::{Mod, ModFile, SearchParams};

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Base URL of the addon API.
pub const DEFAULT_API_BASE: &str = "https://addons-ecs.forgesvc.net/api/v2";

/// Minecraft's game ID on CurseForge.
const GAME_ID: &str = "432";

/// The "Mods" section of the Minecraft catalog.
const SECTION_ID: &str = "6";

/// Read-only view of the remote mod catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Search mods matching the given parameters.
    async fn search(&self, params: &SearchParams) -> Result<Vec<Mod>>;

    /// Fetch many mods by numeric ID in a single call.
    async fn get_many(&self, ids: &[u64]) -> Result<Vec<Mod>>;

    /// Fetch the full file list for a mod.
    async fn files(&self, id: u64) -> Result<Vec<ModFile>>;
}

/// HTTP implementation of [`Catalog`] against the CurseForge addon API.
pub struct CurseClient {
    client: reqwest::Client,
    base: String,
}

impl CurseClient {
    /// Create a client against the default API base.
    pub fn new() -> Result<Self> {
        Self::with_base(DEFAULT_API_BASE)
    }

    /// Create a client against a custom API base (used by tests).
    pub fn with_base(base: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("modman/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base: base.into(),
        })
    }

    fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Error::Status {
                url: response.url().to_string(),
                status: response.status().to_string(),
            })
        }
    }
}

#[async_trait]
impl Catalog for CurseClient {
    async fn search(&self, params: &SearchParams) -> Result<Vec<Mod>> {
        let url = format!("{}/addon/search", self.base);
        tracing::debug!(%url, version = %params.version, "searching catalog");

        let page_size = params.page_size.to_string();
        let sort = (params.sort as u8).to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("gameId", GAME_ID),
                ("sectionId", SECTION_ID),
                ("searchFilter", params.search.as_str()),
                ("gameVersion", params.version.as_str()),
                ("pageSize", page_size.as_str()),
                ("sort", sort.as_str()),
            ])
            .send()
            .await?;

        Ok(Self::check(response)?.json().await?)
    }

    async fn get_many(&self, ids: &[u64]) -> Result<Vec<Mod>> {
        let url = format!("{}/addon", self.base);
        tracing::debug!(%url, count = ids.len(), "fetching mods by id");

        let response = self.client.post(&url).json(ids).send().await?;

        Ok(Self::check(response)?.json().await?)
    }

    async fn files(&self, id: u64) -> Result<Vec<ModFile>> {
        let url = format!("{}/addon/{}/files", self.base, id);
        tracing::debug!(%url, "fetching mod files");

        let response = self.client.get(&url).send().await?;

        Ok(Self::check(response)?.json().await?)
    }
}
