//! window.rs
//!
//! The trailing date range used for the "yearly" counter. The range is a
//! fixed 365 days ending at the moment the run started, not a calendar year,
//! so leap days shift the start by one day rather than the span.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

pub const TRAILING_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl DateWindow {
    /// `[now - 365 days, now]`
    pub fn trailing_year(now: DateTime<Utc>) -> Self {
        Self {
            since: now - Duration::days(TRAILING_DAYS),
            until: now,
        }
    }

    /// ISO 8601 bounds as the commits endpoint expects them.
    pub fn query_bounds(&self) -> (String, String) {
        (
            self.since.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.until.to_rfc3339_opts(SecondsFormat::Secs, true),
        )
    }
}
