//! Picks the single file to use for a mod and a target game version.

use crate::api::{Catalog, Mod, ModFile};
use crate::error::{Error, Result};

/// The file to use for `mod_` under an optional version constraint.
///
/// With no version constraint the catalog has already picked a latest file
/// per game branch, so the first pre-supplied entry wins. With a
/// constraint, the full file list is fetched and scanned.
pub async fn latest_file(catalog: &dyn Catalog, version: &str, mod_: &Mod) -> Result<ModFile> {
    if version.is_empty() {
        return mod_
            .latest_files
            .first()
            .cloned()
            .ok_or_else(|| Error::NoFiles(mod_.name.clone()));
    }

    latest_file_by_id(catalog, version, mod_.id).await
}

/// The most recently uploaded file of mod `id` that supports `version`.
///
/// A full scan over every file: selection is strictly by max upload
/// timestamp among qualifying files, never by list order.
pub async fn latest_file_by_id(catalog: &dyn Catalog, version: &str, id: u64) -> Result<ModFile> {
    let files = catalog.files(id).await?;
    if files.is_empty() {
        return Err(Error::NoFiles(format!("mod {id}")));
    }

    files
        .into_iter()
        .filter(|file| file.supports(version))
        .max_by_key(|file| file.uploaded)
        .ok_or_else(|| Error::VersionUnsupported {
            name: format!("mod {id}"),
            version: version.to_string(),
        })
}
