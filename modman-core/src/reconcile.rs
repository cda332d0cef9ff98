//! Reconciles selected files against what the manifest already tracks.
//!
//! Per mod, per run, one of three things happens:
//! - not tracked yet → download and record,
//! - tracked and fingerprint matches → skip entirely,
//! - tracked and fingerprint differs → remove the superseded file, then
//!   download and record the replacement.
//!
//! Removal of the old file is a hard failure, not best-effort: a stale jar
//! left next to its replacement would be loaded by the game. A crash
//! between removal and the manifest write is detectable afterwards as
//! "file missing, manifest stale"; it is not auto-healed.

use std::path::PathBuf;
use std::sync::Arc;

use crate::api::ModFile;
use crate::download::Fetch;
use crate::error::{Error, Result};
use crate::manifest::Dependency;

/// What the reconciler did for one mod.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// First-time install.
    Installed,
    /// Superseded file removed, replacement downloaded.
    Replaced,
    /// Already current; nothing downloaded or removed.
    Skipped,
}

/// Applies per-mod decisions inside a working directory.
pub struct Reconciler {
    fetch: Arc<dyn Fetch>,
    dir: PathBuf,
}

impl Reconciler {
    pub fn new(fetch: Arc<dyn Fetch>, dir: impl Into<PathBuf>) -> Self {
        Self {
            fetch,
            dir: dir.into(),
        }
    }

    /// Add `dep` to the tree, honoring whatever `prev` already recorded.
    ///
    /// A previous entry with a different fingerprint loses its file first.
    /// The download is skipped when the target file is already on disk
    /// with the expected size, which makes repeated adds idempotent.
    pub async fn add(&self, prev: Option<&Dependency>, dep: &Dependency) -> Result<Outcome> {
        let mut replaced = false;

        if let Some(prev) = prev {
            if !prev.same_dep(dep) {
                tracing::info!(file = %prev.file, "removing superseded file");
                self.remove_local(prev)?;
                replaced = true;
            }
            if dep.downloaded(&self.dir) {
                return Ok(Outcome::Skipped);
            }
        }

        self.fetch.fetch(&dep.file, &dep.url).await?;

        Ok(if replaced {
            Outcome::Replaced
        } else {
            Outcome::Installed
        })
    }

    /// Update a tracked mod to `latest`, returning the new entry.
    ///
    /// The old file is removed before the new one is fetched; only after a
    /// successful fetch should the caller persist the returned entry.
    pub async fn update(&self, dep: &Dependency, latest: &ModFile) -> Result<(Dependency, Outcome)> {
        if dep.same_file(latest) {
            return Ok((dep.clone(), Outcome::Skipped));
        }

        tracing::info!(file = %dep.file, "removing superseded file");
        self.remove_local(dep)?;

        let updated = dep.with_file(latest);
        self.fetch.fetch(&updated.file, &updated.url).await?;

        Ok((updated, Outcome::Replaced))
    }

    /// Re-download a tracked mod's file if it is missing or size-mismatched.
    pub async fn install(&self, dep: &Dependency, force: bool) -> Result<Outcome> {
        if !force && dep.downloaded(&self.dir) {
            return Ok(Outcome::Skipped);
        }

        self.fetch.fetch(&dep.file, &dep.url).await?;
        Ok(Outcome::Installed)
    }

    /// Delete a tracked mod's local file. No fingerprinting involved.
    pub fn remove_local(&self, dep: &Dependency) -> Result<()> {
        let path = self.dir.join(&dep.file);
        std::fs::remove_file(&path).map_err(|e| Error::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use super::*;

    /// Writes `name` into the directory and records every fetch.
    struct FakeFetch {
        dir: PathBuf,
        log: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    impl FakeFetch {
        fn new(dir: &TempDir) -> Self {
            Self {
                dir: dir.path().to_path_buf(),
                log: Mutex::new(Vec::new()),
                fail_on: None,
            }
        }

        fn failing_on(dir: &TempDir, name: &str) -> Self {
            Self {
                fail_on: Some(name.to_string()),
                ..Self::new(dir)
            }
        }

        fn fetched(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetch for FakeFetch {
        async fn fetch(&self, name: &str, url: &str) -> Result<()> {
            if self.fail_on.as_deref() == Some(name) {
                return Err(Error::Status {
                    url: url.to_string(),
                    status: "503 Service Unavailable".to_string(),
                });
            }
            self.log.lock().unwrap().push(name.to_string());
            std::fs::write(self.dir.join(name), vec![0u8; 100]).unwrap();
            Ok(())
        }
    }

    fn make_dep(file: &str, hour: u32) -> Dependency {
        Dependency {
            id: 238222,
            name: "Just Enough Items".to_string(),
            url: format!("https://files.example/{file}"),
            file: file.to_string(),
            uploaded: Utc.with_ymd_and_hms(2021, 6, 1, hour, 0, 0).unwrap(),
            size: 100,
        }
    }

    fn make_file(name: &str, hour: u32) -> ModFile {
        ModFile {
            name: name.to_string(),
            url: format!("https://files.example/{name}"),
            uploaded: Utc.with_ymd_and_hms(2021, 6, 1, hour, 0, 0).unwrap(),
            size: 100,
            versions: vec!["1.16".to_string()],
        }
    }

    fn reconciler(dir: &TempDir, fetch: FakeFetch) -> Reconciler {
        Reconciler::new(Arc::new(fetch), dir.path())
    }

    #[tokio::test]
    async fn first_add_downloads_and_installs() {
        let dir = TempDir::new().unwrap();
        let r = reconciler(&dir, FakeFetch::new(&dir));

        let outcome = r.add(None, &make_dep("jei-7.7.jar", 3)).await.unwrap();
        assert_eq!(outcome, Outcome::Installed);
        assert!(dir.path().join("jei-7.7.jar").exists());
    }

    #[tokio::test]
    async fn second_add_with_same_fingerprint_skips() {
        let dir = TempDir::new().unwrap();
        let fetch = FakeFetch::new(&dir);
        let dep = make_dep("jei-7.7.jar", 3);
        let r = reconciler(&dir, fetch);

        r.add(None, &dep).await.unwrap();
        let outcome = r.add(Some(&dep), &dep).await.unwrap();

        assert_eq!(outcome, Outcome::Skipped);
    }

    #[tokio::test]
    async fn changed_fingerprint_removes_old_file_then_downloads() {
        let dir = TempDir::new().unwrap();
        let r = reconciler(&dir, FakeFetch::new(&dir));

        let old = make_dep("jei-7.6.jar", 1);
        r.add(None, &old).await.unwrap();

        let new = make_dep("jei-7.7.jar", 3);
        let outcome = r.add(Some(&old), &new).await.unwrap();

        assert_eq!(outcome, Outcome::Replaced);
        assert!(!dir.path().join("jei-7.6.jar").exists());
        assert!(dir.path().join("jei-7.7.jar").exists());
    }

    #[tokio::test]
    async fn update_skips_when_fingerprint_matches() {
        let dir = TempDir::new().unwrap();
        let r = reconciler(&dir, FakeFetch::new(&dir));
        let dep = make_dep("jei-7.7.jar", 3);

        let (updated, outcome) = r.update(&dep, &make_file("jei-7.7.jar", 3)).await.unwrap();
        assert_eq!(outcome, Outcome::Skipped);
        assert_eq!(updated, dep);
    }

    #[tokio::test]
    async fn update_removes_old_before_fetching_new() {
        let dir = TempDir::new().unwrap();
        let r = reconciler(&dir, FakeFetch::new(&dir));
        let dep = make_dep("jei-7.6.jar", 1);
        r.add(None, &dep).await.unwrap();

        let (updated, outcome) = r.update(&dep, &make_file("jei-7.7.jar", 3)).await.unwrap();

        assert_eq!(outcome, Outcome::Replaced);
        assert_eq!(updated.file, "jei-7.7.jar");
        assert!(!dir.path().join("jei-7.6.jar").exists());
        assert!(dir.path().join("jei-7.7.jar").exists());
    }

    #[tokio::test]
    async fn failed_update_fetch_leaves_old_file_removed() {
        // The documented gap: removal happens before the fetch, so a fetch
        // failure leaves neither file. The manifest entry is only persisted
        // by the caller on success, which makes the state detectable.
        let dir = TempDir::new().unwrap();
        let r = reconciler(&dir, FakeFetch::failing_on(&dir, "jei-7.7.jar"));
        let dep = make_dep("jei-7.6.jar", 1);
        std::fs::write(dir.path().join("jei-7.6.jar"), vec![0u8; 100]).unwrap();

        let result = r.update(&dep, &make_file("jei-7.7.jar", 3)).await;

        assert!(result.is_err());
        assert!(!dir.path().join("jei-7.6.jar").exists());
        assert!(!dir.path().join("jei-7.7.jar").exists());
    }

    #[tokio::test]
    async fn update_fails_loudly_when_old_file_is_gone() {
        let dir = TempDir::new().unwrap();
        let r = reconciler(&dir, FakeFetch::new(&dir));
        let dep = make_dep("jei-7.6.jar", 1);

        let result = r.update(&dep, &make_file("jei-7.7.jar", 3)).await;
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[tokio::test]
    async fn install_skips_present_file_unless_forced() {
        let dir = TempDir::new().unwrap();
        let fetch = FakeFetch::new(&dir);
        let dep = make_dep("jei-7.7.jar", 3);
        std::fs::write(dir.path().join("jei-7.7.jar"), vec![0u8; 100]).unwrap();
        let r = reconciler(&dir, fetch);

        assert_eq!(r.install(&dep, false).await.unwrap(), Outcome::Skipped);
        assert_eq!(r.install(&dep, true).await.unwrap(), Outcome::Installed);
    }
}
