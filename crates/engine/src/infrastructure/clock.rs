//! Clock and ID generator implementations.

use crate::infrastructure::ports::{ClockPort, IdGenerator};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Random v4 UUIDs.
pub struct RandomIds;

impl RandomIds {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for RandomIds {
    fn new_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl FixedClock {
    pub fn at_epoch(seconds: i64) -> Self {
        use chrono::TimeZone;
        Self(Utc.timestamp_opt(seconds, 0).single().unwrap_or_default())
    }
}

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Deterministic IDs for testing: 1, 2, 3, ... as u128.
#[cfg(test)]
pub struct SequentialIds(std::sync::atomic::AtomicU64);

#[cfg(test)]
impl SequentialIds {
    pub fn starting_at(first: u64) -> Self {
        Self(std::sync::atomic::AtomicU64::new(first))
    }
}

#[cfg(test)]
impl IdGenerator for SequentialIds {
    fn new_uuid(&self) -> Uuid {
        let next = self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Uuid::from_u128(u128::from(next))
    }
}
