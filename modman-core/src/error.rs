//! Central error type for the modman core library.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every fallible operation in this crate returns `Result<T, Error>`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("could not find mod with slug, {0}")]
    SlugNotFound(String),

    #[error("no files for {0}")]
    NoFiles(String),

    #[error("no files for {name} support version {version}")]
    VersionUnsupported { name: String, version: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url}: {status}")]
    Status { url: String, status: String },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dependency manifest not found; run `modman init` first")]
    ManifestNotFound,

    #[error("dependency manifest already exists: {}", .0.display())]
    ManifestExists(PathBuf),

    #[error("no mods being managed")]
    NoMods,

    #[error("manifest error: {0}")]
    Manifest(#[from] serde_yaml_ng::Error),

    /// Wraps a per-mod failure with the slug it belongs to, so batch
    /// operations can report which mod broke.
    #[error("{slug}: {source}")]
    ForMod {
        slug: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attach a mod slug to an error produced while processing that mod.
    pub fn for_mod(slug: impl Into<String>, source: Error) -> Self {
        Error::ForMod {
            slug: slug.into(),
            source: Box::new(source),
        }
    }

    /// Build an IO error carrying the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
