//! Cache Entry Module
//!
//! Defines the stored state for one key: its value, generation and schedule.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use crate::tasks::ScheduledWork;

// == Schedule ==
/// Background work attached to an entry. An entry carries at most one.
#[derive(Debug)]
pub(crate) enum Schedule {
    /// No background work
    Permanent,
    /// Removed once `ttl` has elapsed since `scheduled_at`
    Expiring {
        ttl: Duration,
        scheduled_at: Instant,
        work: ScheduledWork,
    },
    /// Value recomputed every `interval`
    Updating {
        interval: Duration,
        work: ScheduledWork,
    },
}

impl Schedule {
    fn work(&self) -> Option<&ScheduledWork> {
        match self {
            Schedule::Permanent => None,
            Schedule::Expiring { work, .. } | Schedule::Updating { work, .. } => Some(work),
        }
    }
}

// == Cache Entry ==
/// A single live entry.
#[derive(Debug)]
pub(crate) struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Fencing token; scheduled callbacks act only while it matches
    pub generation: u64,
    /// Attached background work
    pub schedule: Schedule,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, generation: u64, schedule: Schedule) -> Self {
        Self {
            value,
            generation,
            schedule,
        }
    }

    // == Cancel ==
    /// Stops the entry's background work, if any.
    pub fn cancel(&self) {
        if let Some(work) = self.schedule.work() {
            work.cancel();
        }
    }

    // == Snapshot ==
    /// Captures the entry's metadata without its value.
    pub fn snapshot(&self) -> EntrySnapshot {
        let schedule = match &self.schedule {
            Schedule::Permanent => ScheduleKind::Permanent,
            Schedule::Expiring {
                ttl, scheduled_at, ..
            } => {
                let remaining = ttl.saturating_sub(scheduled_at.elapsed());
                let remaining_ms = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX);
                ScheduleKind::Expiring {
                    remaining_ms,
                    expires_at: expires_at(remaining_ms),
                }
            }
            Schedule::Updating { interval, .. } => ScheduleKind::Updating {
                interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            },
        };

        EntrySnapshot {
            generation: self.generation,
            schedule,
        }
    }
}

/// Wall-clock deadline `remaining_ms` from now, if representable.
fn expires_at(remaining_ms: u64) -> Option<DateTime<Utc>> {
    let delta = chrono::Duration::try_milliseconds(i64::try_from(remaining_ms).ok()?)?;
    Utc::now().checked_add_signed(delta)
}

// == Entry Snapshot ==
/// Read-only metadata describing a live entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySnapshot {
    /// Generation of the entry's current incarnation
    pub generation: u64,
    /// Kind of background work attached to the entry
    pub schedule: ScheduleKind,
}

/// Kind of background work attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleKind {
    /// Never expires, never updates
    Permanent,
    /// Removed when the TTL elapses
    Expiring {
        /// Time left before removal, in milliseconds
        remaining_ms: u64,
        /// Wall-clock removal time
        expires_at: Option<DateTime<Utc>>,
    },
    /// Recomputed on a fixed interval
    Updating {
        /// Update interval in milliseconds
        interval_ms: u64,
    },
}
