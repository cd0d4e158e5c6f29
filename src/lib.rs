//! Expiring Cache - An in-process key/value cache
//!
//! Provides per-entry TTL expiration and self-updating values, with
//! generation fencing so replaced entries never see stale background work.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, EntrySnapshot, ScheduleKind};
pub use config::Config;
pub use error::{
    is_already_exists, is_does_not_exist, is_nil_update_func, is_non_positive_period, CacheError,
    Result,
};
pub use tasks::{update_fn, UpdateFn};
