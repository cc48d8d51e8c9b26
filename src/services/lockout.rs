//! Keyed login-attempt counter store with a lockout window.
//!
//! Replaces the front end's browser-local attempt counters with explicit
//! check / `record_failure` / clear operations. Not authoritative access
//! control, just a brake on credential guessing.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    pub max_attempts: u32,
    pub lockout_hours: i64,
}

#[derive(Debug, Default, Clone)]
struct AttemptState {
    attempts: u32,
    locked_until: Option<DateTime<Utc>>,
}

pub struct LockoutTracker {
    policy: LockoutPolicy,
    entries: Mutex<HashMap<String, AttemptState>>,
}

impl LockoutTracker {
    #[must_use]
    pub fn new(policy: LockoutPolicy) -> Self {
        Self {
            policy,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the lockout deadline if the key is currently locked out.
    /// An expired lockout resets the counter.
    pub fn check(&self, key: &str) -> Option<DateTime<Utc>> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let state = entries.get(key)?;
        match state.locked_until {
            Some(until) if until > Utc::now() => Some(until),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Records a failed attempt; returns the lockout deadline if this failure
    /// tripped the limit.
    pub fn record_failure(&self, key: &str) -> Option<DateTime<Utc>> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let state = entries.entry(key.to_string()).or_default();
        state.attempts += 1;
        if state.attempts >= self.policy.max_attempts {
            let until = Utc::now() + Duration::hours(self.policy.lockout_hours);
            state.locked_until = Some(until);
            return Some(until);
        }
        None
    }

    /// Clears the counter after a successful login.
    pub fn clear(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }
}
