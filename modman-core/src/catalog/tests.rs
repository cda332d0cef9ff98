//! Tests for the cache, resolver and selector against an in-memory catalog.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;

use crate::api::{Catalog, Mod, ModFile, SearchParams};
use crate::error::{Error, Result};

use super::{resolver, selector, CatalogCache};

struct FakeCatalog {
    mods: Vec<Mod>,
    files: HashMap<u64, Vec<ModFile>>,
    searches: AtomicUsize,
}

impl FakeCatalog {
    fn new(mods: Vec<Mod>) -> Self {
        Self {
            mods,
            files: HashMap::new(),
            searches: AtomicUsize::new(0),
        }
    }

    fn with_files(mut self, id: u64, files: Vec<ModFile>) -> Self {
        self.files.insert(id, files);
        self
    }

    fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn search(&self, _params: &SearchParams) -> Result<Vec<Mod>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        Ok(self.mods.clone())
    }

    async fn get_many(&self, ids: &[u64]) -> Result<Vec<Mod>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.mods.iter().find(|m| m.id == *id).cloned())
            .collect())
    }

    async fn files(&self, id: u64) -> Result<Vec<ModFile>> {
        Ok(self.files.get(&id).cloned().unwrap_or_default())
    }
}

fn when(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 6, 1, hour, 0, 0).unwrap()
}

fn make_file(name: &str, hour: u32, versions: &[&str]) -> ModFile {
    ModFile {
        name: name.to_string(),
        url: format!("https://files.example/{name}"),
        uploaded: when(hour),
        size: 100,
        versions: versions.iter().map(|v| v.to_string()).collect(),
    }
}

fn make_mod(id: u64, slug: &str, latest: Vec<ModFile>) -> Mod {
    Mod {
        id,
        slug: slug.to_string(),
        name: slug.to_string(),
        summary: String::new(),
        website_url: String::new(),
        primary_language: "enUS".to_string(),
        download_count: 0.0,
        popularity_score: 0.0,
        game_popularity_rank: 0,
        date_created: when(0),
        date_modified: when(0),
        date_released: when(0),
        latest_files: latest,
    }
}

#[tokio::test]
async fn all_mods_hits_network_once_per_version() {
    let catalog = Arc::new(FakeCatalog::new(vec![make_mod(1, "jei", vec![])]));
    let cache = CatalogCache::new(catalog.clone());

    let first = cache.all_mods("1.16").await.unwrap();
    let second = cache.all_mods("1.16").await.unwrap();

    assert_eq!(first.len(), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(catalog.search_count(), 1);

    cache.all_mods("1.17").await.unwrap();
    assert_eq!(catalog.search_count(), 2);
}

#[tokio::test]
async fn concurrent_first_access_leaves_one_consistent_entry() {
    let catalog = Arc::new(FakeCatalog::new(vec![make_mod(1, "jei", vec![])]));
    let cache = Arc::new(CatalogCache::new(catalog.clone()));

    let a = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.all_mods("1.16").await })
    };
    let b = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.all_mods("1.16").await })
    };
    let (a, b) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());
    assert_eq!(*a, *b);

    // At most one redundant fetch from the race, and none afterwards.
    let racing = catalog.search_count();
    assert!(racing <= 2);
    let again = cache.all_mods("1.16").await.unwrap();
    assert!(Arc::ptr_eq(&a, &again) || Arc::ptr_eq(&b, &again));
    assert_eq!(catalog.search_count(), racing);
}

#[tokio::test]
async fn mod_by_slug_finds_and_fails() {
    let catalog = Arc::new(FakeCatalog::new(vec![
        make_mod(1, "jei", vec![]),
        make_mod(2, "hwyla", vec![]),
    ]));
    let cache = CatalogCache::new(catalog.clone());

    let found = cache.mod_by_slug("hwyla", "1.16").await.unwrap();
    assert_eq!(found.id, 2);

    let missing = cache.mod_by_slug("missing", "1.16").await;
    assert!(matches!(missing, Err(Error::SlugNotFound(slug)) if slug == "missing"));

    // Slug lookups share the version's single mod list fetch.
    assert_eq!(catalog.search_count(), 1);
}

#[tokio::test]
async fn args_resolve_slugs_before_ids_regardless_of_input_order() {
    let catalog = Arc::new(FakeCatalog::new(vec![
        make_mod(123, "some-mod", vec![]),
        make_mod(7, "slug-x", vec![]),
    ]));
    let cache = CatalogCache::new(catalog);

    for args in [["123", "slug-x"], ["slug-x", "123"]] {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mods = resolver::mods_by_args(&cache, &args, "1.16").await.unwrap();
        let slugs: Vec<&str> = mods.iter().map(|m| m.slug.as_str()).collect();
        assert_eq!(slugs, ["slug-x", "some-mod"]);
    }
}

#[tokio::test]
async fn empty_args_are_invalid() {
    let catalog = Arc::new(FakeCatalog::new(vec![]));
    let cache = CatalogCache::new(catalog);

    let result = resolver::mods_by_args(&cache, &[], "1.16").await;
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[tokio::test]
async fn unknown_slug_names_the_argument() {
    let catalog = Arc::new(FakeCatalog::new(vec![make_mod(1, "jei", vec![])]));
    let cache = CatalogCache::new(catalog);

    let args = vec!["jei".to_string(), "nope".to_string()];
    let result = resolver::mods_by_args(&cache, &args, "1.16").await;
    assert!(matches!(result, Err(Error::SlugNotFound(slug)) if slug == "nope"));
}

#[tokio::test]
async fn selector_picks_max_upload_among_version_matches() {
    let files = vec![
        make_file("a.jar", 1, &["1.16"]),
        make_file("b.jar", 2, &["1.16", "1.17"]),
        make_file("c.jar", 3, &["1.17"]),
    ];
    let catalog = FakeCatalog::new(vec![]).with_files(9, files);

    let latest = selector::latest_file_by_id(&catalog, "1.16", 9).await.unwrap();
    assert_eq!(latest.name, "b.jar");
}

#[tokio::test]
async fn selector_fails_when_no_file_supports_version() {
    let files = vec![make_file("a.jar", 1, &["1.12"])];
    let catalog = FakeCatalog::new(vec![]).with_files(9, files);

    let result = selector::latest_file_by_id(&catalog, "1.16", 9).await;
    assert!(matches!(
        result,
        Err(Error::VersionUnsupported { version, .. }) if version == "1.16"
    ));
}

#[tokio::test]
async fn selector_fails_on_empty_file_list() {
    let catalog = FakeCatalog::new(vec![]).with_files(9, vec![]);

    let result = selector::latest_file_by_id(&catalog, "1.16", 9).await;
    assert!(matches!(result, Err(Error::NoFiles(_))));
}

#[tokio::test]
async fn empty_version_takes_first_latest_file_unconditionally() {
    // The second pre-supplied file is newer; first still wins without a
    // version constraint.
    let latest = vec![
        make_file("old.jar", 1, &["1.16"]),
        make_file("new.jar", 5, &["1.17"]),
    ];
    let mod_ = make_mod(9, "jei", latest);
    let catalog = FakeCatalog::new(vec![]);

    let picked = selector::latest_file(&catalog, "", &mod_).await.unwrap();
    assert_eq!(picked.name, "old.jar");
}

#[tokio::test]
async fn empty_version_with_no_latest_files_fails() {
    let mod_ = make_mod(9, "jei", vec![]);
    let catalog = FakeCatalog::new(vec![]);

    let result = selector::latest_file(&catalog, "", &mod_).await;
    assert!(matches!(result, Err(Error::NoFiles(name)) if name == "jei"));
}
