//! Roster core: the `const USERS = [...]` block embedded in the managed
//! script file, and the operations over its records.
//!
//! The stored format is executable-looking JavaScript rather than a pure data
//! format, so this module owns the full extract → evaluate → mutate → render
//! cycle and keeps the grammar deliberately narrow.

mod block;
mod eval;
mod mutate;
mod render;

pub use block::{BlockSpan, find_block, splice_block};
pub use eval::parse_block;
pub use mutate::{CreatePayload, DeletePayload, EditPayload, create, delete, edit, ensure_admin, list};
pub use render::render_block;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The privileged account. It authorizes mutations and is itself immune to them.
pub const ADMIN_USERNAME: &str = "admin";

/// A single roster entry. Credentials are stored and compared in plaintext,
/// exactly as the managed script file does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: NaiveDate,
}

impl UserRecord {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.username == ADMIN_USERNAME
    }

    /// Expiry check at day granularity: an account is valid through the whole
    /// of its `expires_at` date.
    #[must_use]
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expires_at < today
    }
}

/// Errors specific to roster parsing and mutation.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("roster block not found in source file")]
    BlockNotFound,

    #[error("failed to parse roster block: {0}")]
    Parse(String),

    #[error("operation not permitted on the admin account")]
    Forbidden,

    #[error("user '{0}' already exists")]
    Conflict(String),

    #[error("user '{0}' not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),
}

/// Parses a calendar date from an ISO `YYYY-MM-DD` literal, or an RFC 3339
/// timestamp whose time-of-day is dropped.
#[must_use]
pub fn parse_day(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(day) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(day);
    }
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Normalizes a date string to day precision. An unparsable date falls back
/// to the current date, matching the legacy block serializer.
#[must_use]
pub fn normalize_day(input: &str) -> NaiveDate {
    parse_day(input).unwrap_or_else(|| Utc::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_day_iso() {
        assert_eq!(
            parse_day("2030-01-01"),
            NaiveDate::from_ymd_opt(2030, 1, 1)
        );
    }

    #[test]
    fn test_parse_day_rfc3339_drops_time() {
        assert_eq!(
            parse_day("2030-01-01T18:30:00Z"),
            NaiveDate::from_ymd_opt(2030, 1, 1)
        );
    }

    #[test]
    fn test_normalize_day_falls_back_to_today() {
        assert_eq!(normalize_day("not-a-date"), Utc::now().date_naive());
    }

    #[test]
    fn test_expiry_is_day_granular() {
        let user = UserRecord {
            username: "u".to_string(),
            password: "p".to_string(),
            expires_at: NaiveDate::from_ymd_opt(2030, 6, 15).unwrap(),
        };
        assert!(!user.is_expired(NaiveDate::from_ymd_opt(2030, 6, 15).unwrap()));
        assert!(user.is_expired(NaiveDate::from_ymd_opt(2030, 6, 16).unwrap()));
    }
}
