//! Wall-clock abstraction so issuance and expiry checks can be tested.

use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// Source of the current time.
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current time as Unix seconds.
    fn timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Freeze the clock at the given Unix timestamp.
    pub fn at(timestamp: i64) -> Self {
        Self(DateTime::from_timestamp(timestamp, 0).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::at(1_700_000_000);
        assert_eq!(clock.timestamp(), 1_700_000_000);
    }
}
