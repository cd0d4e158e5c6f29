//! Cache Module
//!
//! Provides the in-process cache with per-entry TTL expiration and
//! self-updating values.

pub(crate) mod entry;
mod facade;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{EntrySnapshot, ScheduleKind};
pub use facade::Cache;
pub(crate) use store::{CacheStore, SharedStore, WeakStore};
