//! Time and identifier sources
//!
//! Builders never read the system clock or generate ids directly; they take a
//! [`Clock`] and an [`IdGenerator`] so a whole batch can be reproduced in tests.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Source of unique task identifiers
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Taskcluster slug ids
///
/// A random v4 UUID encoded as 22 characters of URL-safe base64. The first
/// bit is cleared so an id never starts with `-`, which would read as a
/// command-line flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlugIds;

impl IdGenerator for SlugIds {
    fn next_id(&self) -> String {
        let mut bytes = *Uuid::new_v4().as_bytes();
        bytes[0] &= 0x7f;
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

/// Predictable ids: `{prefix}1`, `{prefix}2`, ...
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", self.prefix, n)
    }
}
