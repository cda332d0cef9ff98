//! Core library for modman, a Minecraft CurseForge mod dependency manager.
//!
//! The pieces fit together like this:
//!
//! ```text
//! CurseForge addon API (api::CurseClient)
//!        │
//!        ▼
//! catalog::CatalogCache   ← per-version mod lists, slug index
//!        │
//!        ▼
//! catalog::resolver       ← ids and slugs → Mod records
//! catalog::selector       ← Mod → the one ModFile for a game version
//!        │
//!        ▼
//! reconcile::Reconciler   ← skip / install / replace against the manifest
//! exec::Batch             ← fan-out across mods
//!        │
//!        ▼
//! manifest::ManifestStore ← modman.yml (slug → Dependency)
//! ```

pub mod api;
pub mod catalog;
pub mod download;
pub mod error;
pub mod exec;
pub mod manifest;
pub mod reconcile;

pub use error::{Error, Result};
