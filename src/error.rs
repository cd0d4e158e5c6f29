//! Error types for the cache
//!
//! Provides unified error handling using thiserror. Callers classify failures
//! through the predicate helpers rather than by matching on messages.

use std::time::Duration;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A create operation found a live entry under the key
    #[error("Key already exists: {0}")]
    KeyExists(String),

    /// An operation on an existing entry found no live entry under the key
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// A TTL or update interval was zero
    #[error("Period must be positive, got {0:?}")]
    NonPositivePeriod(Duration),

    /// An update operation was called without an update function
    #[error("Update function must be provided")]
    NilUpdateFunc,
}

impl CacheError {
    pub(crate) fn key_exists<K: std::fmt::Debug>(key: &K) -> Self {
        CacheError::KeyExists(format!("{:?}", key))
    }

    pub(crate) fn key_not_found<K: std::fmt::Debug>(key: &K) -> Self {
        CacheError::KeyNotFound(format!("{:?}", key))
    }

    // == Classification ==
    /// True if the error reports a key that is already present.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, CacheError::KeyExists(_))
    }

    /// True if the error reports a key that is absent.
    pub fn is_does_not_exist(&self) -> bool {
        matches!(self, CacheError::KeyNotFound(_))
    }

    /// True if the error reports a zero duration.
    pub fn is_non_positive_period(&self) -> bool {
        matches!(self, CacheError::NonPositivePeriod(_))
    }

    /// True if the error reports a missing update function.
    pub fn is_nil_update_func(&self) -> bool {
        matches!(self, CacheError::NilUpdateFunc)
    }
}

// == Result Classification ==
/// Returns true if `result` failed because the key already exists.
pub fn is_already_exists<T>(result: &Result<T>) -> bool {
    matches!(result, Err(e) if e.is_already_exists())
}

/// Returns true if `result` failed because the key does not exist.
pub fn is_does_not_exist<T>(result: &Result<T>) -> bool {
    matches!(result, Err(e) if e.is_does_not_exist())
}

/// Returns true if `result` failed because a duration was not positive.
pub fn is_non_positive_period<T>(result: &Result<T>) -> bool {
    matches!(result, Err(e) if e.is_non_positive_period())
}

/// Returns true if `result` failed because no update function was supplied.
pub fn is_nil_update_func<T>(result: &Result<T>) -> bool {
    matches!(result, Err(e) if e.is_nil_update_func())
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
