//! Dependency manifest (modman.yml).
//!
//! Tracks the game version and one entry per managed mod, keyed by slug.
//! The whole document is rewritten on every save; the underlying storage
//! is not concurrency-safe, so all access goes through the store's lock.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{Mod, ModFile};
use crate::error::{Error, Result};

/// Manifest file name, looked up in the working directory.
pub const MANIFEST_FILE: &str = "modman.yml";

/// The persisted record of a tracked mod's selected file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub file: String,
    pub uploaded: DateTime<Utc>,
    pub size: u64,
}

impl Dependency {
    pub fn new(mod_: &Mod, file: &ModFile) -> Self {
        Self {
            id: mod_.id,
            name: mod_.name.clone(),
            url: file.url.clone(),
            file: file.name.clone(),
            uploaded: file.uploaded,
            size: file.size,
        }
    }

    /// Whether this entry already points at the given mod file.
    ///
    /// The staleness fingerprint is (file name, upload timestamp, byte
    /// size) and nothing else — deliberately no content checksum, trading
    /// integrity for not re-hashing large files on every run.
    pub fn same_file(&self, file: &ModFile) -> bool {
        file.name == self.file && file.uploaded == self.uploaded && file.size == self.size
    }

    /// Fingerprint comparison against another entry.
    pub fn same_dep(&self, other: &Dependency) -> bool {
        other.file == self.file && other.uploaded == self.uploaded && other.size == self.size
    }

    /// A copy of this entry pointing at a different mod file.
    pub fn with_file(&self, file: &ModFile) -> Self {
        Self {
            url: file.url.clone(),
            file: file.name.clone(),
            uploaded: file.uploaded,
            size: file.size,
            ..self.clone()
        }
    }

    /// Whether the file is already on disk with the expected byte size.
    pub fn downloaded(&self, dir: &Path) -> bool {
        std::fs::metadata(dir.join(&self.file))
            .map(|info| info.len() == self.size)
            .unwrap_or(false)
    }
}

/// The whole manifest document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Game version the managed mods target.
    pub version: String,
    /// Managed mods keyed by slug.
    #[serde(default)]
    pub mods: BTreeMap<String, Dependency>,
}

/// Serialized access to the manifest file.
///
/// Holds the parsed document in memory behind a mutex; every mutation
/// rewrites the whole file. Safe for concurrent in-process callers; the
/// lock is never held across an await. Cross-process safety is out of
/// scope.
pub struct ManifestStore {
    path: PathBuf,
    inner: Mutex<Manifest>,
}

impl ManifestStore {
    /// Create a fresh manifest in `dir`; refuses to clobber an existing one.
    pub fn init(dir: &Path, version: &str) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        if path.exists() {
            return Err(Error::ManifestExists(path));
        }

        let store = Self {
            path,
            inner: Mutex::new(Manifest {
                version: version.to_string(),
                mods: BTreeMap::new(),
            }),
        };
        store.save(&store.inner.lock().unwrap())?;
        Ok(store)
    }

    /// Load the manifest from `dir`, failing if there is none.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Err(Error::ManifestNotFound);
        }

        let content =
            std::fs::read_to_string(&path).map_err(|e| Error::io(path.clone(), e))?;
        let manifest: Manifest = serde_yaml_ng::from_str(&content)?;

        Ok(Self {
            path,
            inner: Mutex::new(manifest),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> String {
        self.inner.lock().unwrap().version.clone()
    }

    /// The entry for a slug, if the mod is tracked.
    pub fn dep(&self, slug: &str) -> Option<Dependency> {
        self.inner.lock().unwrap().mods.get(slug).cloned()
    }

    /// Snapshot of all entries; fails when nothing is managed yet.
    pub fn deps(&self) -> Result<BTreeMap<String, Dependency>> {
        let mods = self.inner.lock().unwrap().mods.clone();
        if mods.is_empty() {
            return Err(Error::NoMods);
        }
        Ok(mods)
    }

    /// Write one entry and persist immediately.
    pub fn set_dep(&self, slug: &str, dep: Dependency) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.mods.insert(slug.to_string(), dep);
        self.save(&inner)
    }

    /// Start a staged mutation; nothing touches disk until `commit`.
    pub fn begin(&self) -> Transaction<'_> {
        Transaction {
            store: self,
            staged: self.inner.lock().unwrap().clone(),
        }
    }

    fn save(&self, manifest: &Manifest) -> Result<()> {
        let content = serde_yaml_ng::to_string(manifest)?;
        std::fs::write(&self.path, content).map_err(|e| Error::io(self.path.clone(), e))
    }
}

/// A staged batch of manifest mutations.
///
/// Mutations apply to a private copy; `commit` swaps it in and persists
/// once. Dropping the transaction discards everything, leaving the on-disk
/// manifest byte-identical to what it was before the batch started.
pub struct Transaction<'a> {
    store: &'a ManifestStore,
    staged: Manifest,
}

impl Transaction<'_> {
    pub fn dep(&self, slug: &str) -> Option<&Dependency> {
        self.staged.mods.get(slug)
    }

    pub fn set_dep(&mut self, slug: &str, dep: Dependency) {
        self.staged.mods.insert(slug.to_string(), dep);
    }

    pub fn remove_dep(&mut self, slug: &str) {
        self.staged.mods.remove(slug);
    }

    pub fn set_version(&mut self, version: &str) {
        self.staged.version = version.to_string();
    }

    pub fn commit(self) -> Result<()> {
        let mut inner = self.store.inner.lock().unwrap();
        *inner = self.staged;
        self.store.save(&inner)
    }
}
