//! Resolution of user-supplied identifiers against the mod catalog.
//!
//! A run constructs one [`CatalogCache`] around the API client and threads
//! it through; all per-version memoization lives there rather than in
//! process globals, so concurrency discipline is explicit and tests don't
//! contaminate each other.

mod cache;
pub mod resolver;
pub mod selector;

pub use cache::CatalogCache;

#[cfg(test)]
mod tests;
