// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `start + minutes`, or `None` if that is not representable.
pub fn end_time_after(start: DateTime<Utc>, minutes: i64) -> Option<DateTime<Utc>> {
    let duration = Duration::try_minutes(minutes)?;
    start.checked_add_signed(duration)
}
