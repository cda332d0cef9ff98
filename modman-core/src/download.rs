//! Raw byte transfer: fetch a URL into a local file.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Seam for the byte-transfer routine, so the reconciler can be exercised
/// without a network.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Download `url` into the target directory under `name`.
    async fn fetch(&self, name: &str, url: &str) -> Result<()>;
}

/// HTTP downloader writing into a fixed directory.
pub struct Downloader {
    client: reqwest::Client,
    dir: PathBuf,
}

impl Downloader {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("modman/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            dir: dir.into(),
        })
    }
}

#[async_trait]
impl Fetch for Downloader {
    async fn fetch(&self, name: &str, url: &str) -> Result<()> {
        tracing::info!(name, url, "downloading");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: response.status().to_string(),
            });
        }

        let bytes = response.bytes().await?;
        let path = self.dir.join(name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| Error::io(path.clone(), e))?;

        // 0755 so server launch scripts can exec downloaded jars directly.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .await
                .map_err(|e| Error::io(path, e))?;
        }

        Ok(())
    }
}
