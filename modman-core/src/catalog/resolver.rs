//! Turns raw `id | slug` arguments into mod records.

use crate::api::Mod;
use crate::error::{Error, Result};

use super::CatalogCache;

/// Resolve a mixed list of numeric IDs and slugs into mod records.
///
/// An argument that parses as a non-negative integer is an ID; anything
/// else is a slug. IDs go through one bulk lookup, slugs through the
/// cache's slug index. When a run contains both kinds, the output is all
/// slug-resolved mods followed by all ID-resolved mods regardless of input
/// order; callers rely on that ordering.
pub async fn mods_by_args(cache: &CatalogCache, args: &[String], version: &str) -> Result<Vec<Mod>> {
    if args.is_empty() {
        return Err(Error::InvalidArgument("no mod ids or slugs given".into()));
    }

    let mut ids = Vec::new();
    let mut slugs = Vec::new();
    for arg in args {
        match arg.parse::<u64>() {
            Ok(id) => ids.push(id),
            Err(_) => slugs.push(arg.as_str()),
        }
    }

    let mut mods = mods_by_slug(cache, &slugs, version).await?;
    if !ids.is_empty() {
        mods.extend(cache.catalog().get_many(&ids).await?);
    }

    Ok(mods)
}

/// Resolve each slug through the cache, failing on the first unknown one.
async fn mods_by_slug(cache: &CatalogCache, slugs: &[&str], version: &str) -> Result<Vec<Mod>> {
    let mut mods = Vec::with_capacity(slugs.len());
    for slug in slugs {
        mods.push(cache.mod_by_slug(slug, version).await?);
    }
    Ok(mods)
}
