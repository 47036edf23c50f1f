//! Time source for time-relative rules.
//!
//! Specifications never read ambient wall time. They hold a [`Clock`] and ask
//! it for "now" each time they build an expression. Injecting a
//! [`FixedClock`] pins "now" for the lifetime of the specification.

use chrono::{DateTime, Utc};

/// Source of the current instant.
pub trait Clock: Send + Sync + core::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system wall clock on every call.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the instant it was created with.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(now)
    }

    /// Capture the current wall-clock time once.
    pub fn capture() -> Self {
        Self(Utc::now())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
