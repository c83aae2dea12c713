/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Pure time-of-day helpers: parsing, checked addition and formatting.
//!
//! These are free functions rather than methods so they can be used and tested
//! independently of the [`SlotCatalog`](super::SlotCatalog).

use chrono::{NaiveTime, Timelike};

use super::CatalogError;

/// Parse a wall-clock time written as `"HH:MM"` (seconds are not allowed).
pub fn parse_hhmm(s: &str) -> Result<NaiveTime, CatalogError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|_| CatalogError::InvalidTime {
        value: s.to_string(),
    })
}

/// Format a time as `"HH:MM"`.
pub fn format_hhmm(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// Minutes elapsed since midnight.
pub fn minutes_since_midnight(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// Checked `start + minutes`.
///
/// Returns `None` when the result would reach or pass midnight; a school day
/// never wraps into the next calendar day.  `NaiveTime + Duration` silently
/// wraps, so the bound is checked on plain minute counts first.
pub fn checked_add_minutes(start: NaiveTime, minutes: u32) -> Option<NaiveTime> {
    let end = minutes_since_midnight(start).checked_add(minutes)?;
    if end >= 24 * 60 {
        return None;
    }
    NaiveTime::from_hms_opt(end / 60, end % 60, 0)
}

/// Whole minutes between `start` and `end`, or `None` if `end <= start`.
pub fn minutes_between(start: NaiveTime, end: NaiveTime) -> Option<u32> {
    let (s, e) = (minutes_since_midnight(start), minutes_since_midnight(end));
    if e > s {
        Some(e - s)
    } else {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
