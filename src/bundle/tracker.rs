//! Per-bundle failure bookkeeping (in memory only; a restart forgets it).

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Failure state of one bundle, keyed by manifest file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureRecord {
    first_fail_time: DateTime<Utc>,
    retry_eligible: bool,
}

impl FailureRecord {
    pub fn first_fail_time(&self) -> DateTime<Utc> {
        self.first_fail_time
    }

    pub fn retry_eligible(&self) -> bool {
        self.retry_eligible
    }
}

/// What the scheduler should do with a bundle this pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// No record, or still inside the retry window.
    Proceed,
    /// Already given up on; skip silently.
    Skip,
    /// The retry window just ran out. Reported once, then `Skip` forever.
    Expired,
}

#[derive(Debug)]
pub struct FailureTracker {
    records: HashMap<String, FailureRecord>,
    retry_window: TimeDelta,
}

impl Default for FailureTracker {
    fn default() -> Self {
        Self::new(super::RETRY_WINDOW)
    }
}

impl FailureTracker {
    pub fn new(retry_window: TimeDelta) -> Self {
        Self {
            records: HashMap::new(),
            retry_window,
        }
    }

    /// Record a failure. The first one fixes `first_fail_time`; a permanent
    /// failure always clears retry eligibility and nothing restores it.
    pub fn record_failure(&mut self, key: &str, permanent: bool, now: DateTime<Utc>) {
        match self.records.get_mut(key) {
            Some(record) => record.retry_eligible &= !permanent,
            None => {
                self.records.insert(
                    key.to_string(),
                    FailureRecord {
                        first_fail_time: now,
                        retry_eligible: !permanent,
                    },
                );
            }
        }
        debug!(bundle = key, permanent, "failure recorded");
    }

    /// Decide whether to attempt `key` now, expiring its retry window if due.
    pub fn should_attempt(&mut self, key: &str, now: DateTime<Utc>) -> Attempt {
        let Some(record) = self.records.get_mut(key) else {
            return Attempt::Proceed;
        };
        if !record.retry_eligible {
            return Attempt::Skip;
        }
        if now - record.first_fail_time > self.retry_window {
            record.retry_eligible = false;
            return Attempt::Expired;
        }
        Attempt::Proceed
    }

    /// Forget a bundle after it moved successfully.
    pub fn clear(&mut self, key: &str) {
        self.records.remove(key);
    }

    pub fn get(&self, key: &str) -> Option<&FailureRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
