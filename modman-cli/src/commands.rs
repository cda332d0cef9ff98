//! One executor per subcommand; each composes the core pieces the same
//! way: resolve → select → reconcile → persist, fanned out per mod.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use modman_core::api::{Catalog, CurseClient, SearchParams, SortType};
use modman_core::catalog::{resolver, selector, CatalogCache};
use modman_core::download::{Downloader, Fetch};
use modman_core::exec::Batch;
use modman_core::manifest::{Dependency, ManifestStore, MANIFEST_FILE};
use modman_core::reconcile::{Outcome, Reconciler};
use modman_core::Error;

use crate::table;
use crate::Command;

pub async fn run(command: Command) -> Result<()> {
    match command {
        Command::Init { version } => execute_init(&version),
        Command::Add { args } => execute_add(args).await,
        Command::Get { args, version } => execute_get(args, version).await,
        Command::Install { force } => execute_install(force).await,
        Command::Remove { slugs } => execute_remove(slugs).await,
        Command::Update { version } => execute_update(version).await,
        Command::Search {
            terms,
            version,
            sort,
            limit,
            format,
            json,
        } => execute_search(terms, version, sort, limit, &format, json).await,
    }
}

/// The working directory; `--cwd` has already been applied.
fn cwd() -> &'static Path {
    Path::new(".")
}

fn catalog() -> Result<Arc<dyn Catalog>> {
    Ok(Arc::new(
        CurseClient::new().context("failed to create catalog client")?,
    ))
}

fn reconciler() -> Result<Arc<Reconciler>> {
    let downloader: Arc<dyn Fetch> = Arc::new(Downloader::new(cwd())?);
    Ok(Arc::new(Reconciler::new(downloader, cwd())))
}

fn execute_init(version: &str) -> Result<()> {
    ManifestStore::init(cwd(), version)?;
    println!("created {MANIFEST_FILE} for Minecraft version {version}");
    Ok(())
}

async fn execute_add(args: Vec<String>) -> Result<()> {
    let store = Arc::new(ManifestStore::load(cwd())?);
    let version = store.version();
    println!("using Minecraft version {version}");

    let catalog = catalog()?;
    let cache = CatalogCache::new(Arc::clone(&catalog));
    let mods = resolver::mods_by_args(&cache, &args, &version).await?;
    tracing::debug!(count = mods.len(), "resolved arguments to mods");
    let reconciler = reconciler()?;

    let tasks: Vec<_> = mods
        .into_iter()
        .map(|m| {
            let catalog = Arc::clone(&catalog);
            let store = Arc::clone(&store);
            let reconciler = Arc::clone(&reconciler);
            let version = version.clone();
            async move {
                let latest = selector::latest_file(catalog.as_ref(), &version, &m)
                    .await
                    .map_err(|e| Error::for_mod(&m.slug, e))?;
                let dep = Dependency::new(&m, &latest);
                let prev = store.dep(&m.slug);
                let outcome = reconciler
                    .add(prev.as_ref(), &dep)
                    .await
                    .map_err(|e| Error::for_mod(&m.slug, e))?;
                if outcome != Outcome::Skipped {
                    store.set_dep(&m.slug, dep)?;
                }
                Ok::<_, Error>((m.name, outcome))
            }
        })
        .collect();

    Batch::spawn(tasks)
        .wait(|result| {
            let (name, outcome) = result?;
            match outcome {
                Outcome::Skipped => println!("skipping {name}"),
                _ => println!("added {name}"),
            }
            Ok::<(), Error>(())
        })
        .await?;

    println!("done");
    Ok(())
}

async fn execute_get(args: Vec<String>, version: Option<String>) -> Result<()> {
    // Fall back to the manifest's version when one exists nearby.
    let version = version
        .or_else(|| ManifestStore::load(cwd()).ok().map(|s| s.version()))
        .unwrap_or_default();
    if !version.is_empty() {
        println!("using Minecraft version {version}");
    }

    let catalog = catalog()?;
    let cache = CatalogCache::new(Arc::clone(&catalog));
    let mods = resolver::mods_by_args(&cache, &args, &version).await?;
    tracing::debug!(count = mods.len(), "resolved arguments to mods");
    let downloader: Arc<dyn Fetch> = Arc::new(Downloader::new(cwd())?);

    let tasks: Vec<_> = mods
        .into_iter()
        .map(|m| {
            let catalog = Arc::clone(&catalog);
            let downloader = Arc::clone(&downloader);
            let version = version.clone();
            async move {
                let latest = selector::latest_file(catalog.as_ref(), &version, &m)
                    .await
                    .map_err(|e| Error::for_mod(&m.slug, e))?;
                downloader
                    .fetch(&latest.name, &latest.url)
                    .await
                    .map_err(|e| Error::for_mod(&m.slug, e))?;
                Ok::<_, Error>(latest.name)
            }
        })
        .collect();

    Batch::spawn(tasks)
        .wait(|result| {
            println!("downloaded {}", result?);
            Ok::<(), Error>(())
        })
        .await?;

    println!("done");
    Ok(())
}

async fn execute_install(force: bool) -> Result<()> {
    let store = Arc::new(ManifestStore::load(cwd())?);
    let deps = store.deps()?;
    let reconciler = reconciler()?;

    let tasks: Vec<_> = deps
        .into_values()
        .map(|dep| {
            let reconciler = Arc::clone(&reconciler);
            async move {
                let outcome = reconciler.install(&dep, force).await?;
                Ok::<_, Error>((dep.name, outcome))
            }
        })
        .collect();

    Batch::spawn(tasks)
        .wait(|result| {
            let (name, outcome) = result?;
            match outcome {
                Outcome::Skipped => println!("{name} already installed"),
                _ => println!("installed {name}"),
            }
            Ok::<(), Error>(())
        })
        .await?;

    println!("done");
    Ok(())
}

async fn execute_remove(slugs: Vec<String>) -> Result<()> {
    if slugs.is_empty() {
        anyhow::bail!("at least 1 slug is required");
    }

    let store = Arc::new(ManifestStore::load(cwd())?);
    let reconciler = reconciler()?;

    let tasks: Vec<_> = slugs
        .into_iter()
        .map(|slug| {
            let store = Arc::clone(&store);
            let reconciler = Arc::clone(&reconciler);
            async move {
                let Some(dep) = store.dep(&slug) else {
                    println!("slug, {slug}, not found");
                    return Ok(None);
                };
                reconciler
                    .remove_local(&dep)
                    .map_err(|e| Error::for_mod(&slug, e))?;
                println!("removed {}", dep.file);
                Ok::<_, Error>(Some(slug))
            }
        })
        .collect();

    // Collect-and-continue: per-slug failures are reported, the rest of
    // the batch still runs, and the manifest keeps the failed entries.
    let mut removed = Vec::new();
    Batch::spawn(tasks)
        .wait(|result| {
            match result {
                Ok(Some(slug)) => removed.push(slug),
                Ok(None) => {}
                Err(err) => eprintln!("{err}"),
            }
            Ok::<(), std::convert::Infallible>(())
        })
        .await
        .unwrap();

    let mut txn = store.begin();
    for slug in &removed {
        txn.remove_dep(slug);
    }
    txn.commit()?;

    println!("done");
    Ok(())
}

async fn execute_update(version: Option<String>) -> Result<()> {
    let store = Arc::new(ManifestStore::load(cwd())?);
    let manifest_version = store.version();

    // A different target version switches to batch mode: the manifest's
    // version field moves with the mods.
    let (version, crossing_versions) = match version {
        Some(v) if v != manifest_version => {
            println!("updating mods from {manifest_version} to {v} ...");
            (v, true)
        }
        _ => {
            println!("updating mods to use latest {manifest_version} files ...");
            (manifest_version, false)
        }
    };

    let deps = store.deps()?;
    tracing::debug!(count = deps.len(), "checking tracked mods for updates");
    let catalog = catalog()?;
    let reconciler = reconciler()?;

    let tasks: Vec<_> = deps
        .into_iter()
        .map(|(slug, dep)| {
            let catalog = Arc::clone(&catalog);
            let reconciler = Arc::clone(&reconciler);
            let version = version.clone();
            async move {
                let latest = selector::latest_file_by_id(catalog.as_ref(), &version, dep.id)
                    .await
                    .map_err(|e| Error::for_mod(&slug, e))?;
                let (updated, outcome) = reconciler
                    .update(&dep, &latest)
                    .await
                    .map_err(|e| Error::for_mod(&slug, e))?;
                Ok::<_, Error>((slug, updated, outcome))
            }
        })
        .collect();

    // All-or-nothing: every update stages into one transaction, committed
    // only when the whole batch succeeded. On failure the transaction is
    // dropped and the on-disk manifest is left exactly as it was, though
    // replacement files already downloaded stay on disk.
    let mut txn = store.begin();
    Batch::spawn(tasks)
        .wait(|result| {
            let (slug, updated, outcome) = result?;
            match outcome {
                Outcome::Skipped => println!("{} up to date", updated.name),
                _ => println!("updated {}", updated.name),
            }
            txn.set_dep(&slug, updated);
            Ok::<(), Error>(())
        })
        .await
        .context("update aborted; manifest left unchanged")?;

    if crossing_versions {
        txn.set_version(&version);
    }
    txn.commit()?;

    println!("done");
    Ok(())
}

async fn execute_search(
    terms: Vec<String>,
    version: Option<String>,
    sort: SortType,
    limit: u32,
    format: &str,
    json: bool,
) -> Result<()> {
    let version = version
        .or_else(|| ManifestStore::load(cwd()).ok().map(|s| s.version()))
        .unwrap_or_default();

    let catalog = catalog()?;
    let mods = catalog
        .search(&SearchParams {
            search: terms.join(" "),
            version,
            page_size: limit,
            sort,
        })
        .await?;
    tracing::debug!(count = mods.len(), "search returned");

    if mods.is_empty() {
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&mods)?);
    } else {
        println!("{}", table::render(format, &mods));
    }

    Ok(())
}
