/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Weekly time-slot catalog.
//!
//! A school day is described by a [`DayTemplate`]: a start time plus an
//! ordered list of periods (lesson, break or ceremony) with their durations.
//! [`SlotCatalog`] expands every template into concrete [`Slot`]s by
//! accumulating durations, so each slot starts exactly where the previous one
//! ended.
//!
//! ```text
//! DayTemplate { start: 07:00, [Ceremony 45, Lesson 45, Break 15, ...] }
//!        │
//!        ▼
//! Slot #0 07:00–07:45 Ceremony
//! Slot #1 07:45–08:30 Lesson
//! Slot #2 08:30–08:45 Break
//! ```
//!
//! Every catalog is validated when it is built.  A malformed day (no periods,
//! zero-length period, gaps, overlaps, running past midnight) is a
//! configuration error rejected before any allocation run starts.

pub mod clock;

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use clock::{checked_add_minutes, minutes_between};

// ── WeekDay ───────────────────────────────────────────────────────────────────

/// A school weekday.  Ordering follows the calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl WeekDay {
    /// All weekdays in calendar order.
    pub const ALL: [WeekDay; 6] = [
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
        WeekDay::Saturday,
    ];

    /// Lower-case name, matching the YAML key.
    pub fn as_str(self) -> &'static str {
        match self {
            WeekDay::Monday => "monday",
            WeekDay::Tuesday => "tuesday",
            WeekDay::Wednesday => "wednesday",
            WeekDay::Thursday => "thursday",
            WeekDay::Friday => "friday",
            WeekDay::Saturday => "saturday",
        }
    }
}

impl fmt::Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── SlotKind ──────────────────────────────────────────────────────────────────

/// What happens during a slot.  Only [`SlotKind::Lesson`] slots are ever
/// allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Lesson,
    Break,
    Ceremony,
}

// ── Slot ──────────────────────────────────────────────────────────────────────

/// One concrete time slot of one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub day: WeekDay,
    /// Zero-based position within the day.
    pub index: usize,
    pub kind: SlotKind,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub duration_minutes: u32,
}

impl Slot {
    pub fn is_lesson(&self) -> bool {
        self.kind == SlotKind::Lesson
    }
}

// ── DayTemplate ───────────────────────────────────────────────────────────────

/// A single period inside a [`DayTemplate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSpec {
    pub kind: SlotKind,
    pub minutes: u32,
}

impl PeriodSpec {
    pub const fn new(kind: SlotKind, minutes: u32) -> Self {
        Self { kind, minutes }
    }
}

/// Static configuration of one school day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTemplate {
    pub day: WeekDay,
    pub start: NaiveTime,
    pub periods: Vec<PeriodSpec>,
}

const LESSON: PeriodSpec = PeriodSpec::new(SlotKind::Lesson, 45);
const SHORT_BREAK: PeriodSpec = PeriodSpec::new(SlotKind::Break, 15);
const LONG_BREAK: PeriodSpec = PeriodSpec::new(SlotKind::Break, 30);
const CEREMONY: PeriodSpec = PeriodSpec::new(SlotKind::Ceremony, 45);

impl DayTemplate {
    /// Built-in default for `day`, used when the configuration carries no
    /// timetable section.
    ///
    /// * Monday opens with the flag ceremony.
    /// * Tuesday–Thursday run nine lessons with a short and a long break.
    /// * Friday finishes after six lessons.
    /// * Saturday is not a school day (`None`).
    pub fn standard(day: WeekDay) -> Option<Self> {
        let periods = match day {
            WeekDay::Monday => vec![
                CEREMONY, LESSON, LESSON, LESSON, SHORT_BREAK, LESSON, LESSON, LESSON,
                LONG_BREAK, LESSON, LESSON,
            ],
            WeekDay::Tuesday | WeekDay::Wednesday | WeekDay::Thursday => vec![
                LESSON, LESSON, LESSON, LESSON, SHORT_BREAK, LESSON, LESSON, LESSON,
                LONG_BREAK, LESSON, LESSON,
            ],
            WeekDay::Friday => vec![LESSON, LESSON, LESSON, LESSON, SHORT_BREAK, LESSON, LESSON],
            WeekDay::Saturday => return None,
        };
        Some(Self {
            day,
            start: NaiveTime::from_hms_opt(7, 0, 0)?,
            periods,
        })
    }

    /// The standard template for every weekday that has one.
    pub fn standard_week() -> Vec<Self> {
        WeekDay::ALL.into_iter().filter_map(Self::standard).collect()
    }

    /// Expand the template into contiguous slots.
    ///
    /// # Errors
    /// * [`CatalogError::EmptyDay`] – no periods.
    /// * [`CatalogError::ZeroDuration`] – a period lasts zero minutes.
    /// * [`CatalogError::PastMidnight`] – the day would run into the next one.
    pub fn build_slots(&self) -> Result<Vec<Slot>, CatalogError> {
        if self.periods.is_empty() {
            return Err(CatalogError::EmptyDay { day: self.day });
        }

        let mut slots = Vec::with_capacity(self.periods.len());
        let mut cursor = self.start;

        for (index, period) in self.periods.iter().enumerate() {
            if period.minutes == 0 {
                return Err(CatalogError::ZeroDuration {
                    day: self.day,
                    index,
                });
            }
            let end = checked_add_minutes(cursor, period.minutes).ok_or(
                CatalogError::PastMidnight {
                    day: self.day,
                    index,
                },
            )?;
            slots.push(Slot {
                day: self.day,
                index,
                kind: period.kind,
                start: cursor,
                end,
                duration_minutes: period.minutes,
            });
            cursor = end;
        }

        Ok(slots)
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Configuration errors detected while building a [`SlotCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("invalid time of day '{value}' (expected HH:MM)")]
    InvalidTime { value: String },

    #[error("{day} has no slots")]
    EmptyDay { day: WeekDay },

    #[error("{day} is configured more than once")]
    DuplicateDay { day: WeekDay },

    #[error("{day} slot #{index} has zero duration")]
    ZeroDuration { day: WeekDay, index: usize },

    #[error("{day} slot #{index} runs past midnight")]
    PastMidnight { day: WeekDay, index: usize },

    #[error("{day} slot #{index} belongs to {found}")]
    WrongDay {
        day: WeekDay,
        index: usize,
        found: WeekDay,
    },

    #[error("{day} slot at position {expected} carries index {found}")]
    IndexOutOfOrder {
        day: WeekDay,
        expected: usize,
        found: usize,
    },

    #[error("{day} slot #{index} ends at or before it starts")]
    InvertedSlot { day: WeekDay, index: usize },

    #[error("{day} slot #{index} declares {declared} min but spans {actual} min")]
    DurationMismatch {
        day: WeekDay,
        index: usize,
        declared: u32,
        actual: u32,
    },

    /// Slot *i* does not start where slot *i-1* ended (a gap or an overlap).
    #[error("{day} slot #{index} starts at {found} but the previous slot ends at {expected}")]
    NonContiguous {
        day: WeekDay,
        index: usize,
        expected: NaiveTime,
        found: NaiveTime,
    },
}

// ── SlotCatalog ───────────────────────────────────────────────────────────────

/// Validated, immutable per-weekday slot lists.
///
/// `BTreeMap` keeps days in calendar order so every iteration is
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct SlotCatalog {
    days: BTreeMap<WeekDay, Vec<Slot>>,
}

impl SlotCatalog {
    /// Build a catalog from day templates.
    pub fn from_templates(
        templates: impl IntoIterator<Item = DayTemplate>,
    ) -> Result<Self, CatalogError> {
        let mut days = BTreeMap::new();
        for template in templates {
            if days.contains_key(&template.day) {
                return Err(CatalogError::DuplicateDay { day: template.day });
            }
            let slots = template.build_slots()?;
            days.insert(template.day, slots);
        }
        let catalog = Self { days };
        catalog.log_summary();
        Ok(catalog)
    }

    /// Build a catalog from explicit slot lists, validating every day.
    pub fn from_slots(
        days: impl IntoIterator<Item = (WeekDay, Vec<Slot>)>,
    ) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for (day, slots) in days {
            if map.contains_key(&day) {
                return Err(CatalogError::DuplicateDay { day });
            }
            Self::validate_day(day, &slots)?;
            map.insert(day, slots);
        }
        let catalog = Self { days: map };
        catalog.log_summary();
        Ok(catalog)
    }

    /// Check the contiguity invariants of one day's slots.
    pub fn validate_day(day: WeekDay, slots: &[Slot]) -> Result<(), CatalogError> {
        if slots.is_empty() {
            return Err(CatalogError::EmptyDay { day });
        }

        let mut prev_end: Option<NaiveTime> = None;
        for (position, slot) in slots.iter().enumerate() {
            if slot.day != day {
                return Err(CatalogError::WrongDay {
                    day,
                    index: slot.index,
                    found: slot.day,
                });
            }
            if slot.index != position {
                return Err(CatalogError::IndexOutOfOrder {
                    day,
                    expected: position,
                    found: slot.index,
                });
            }
            let actual = minutes_between(slot.start, slot.end).ok_or(
                CatalogError::InvertedSlot {
                    day,
                    index: slot.index,
                },
            )?;
            if actual != slot.duration_minutes {
                return Err(CatalogError::DurationMismatch {
                    day,
                    index: slot.index,
                    declared: slot.duration_minutes,
                    actual,
                });
            }
            if let Some(expected) = prev_end {
                if slot.start != expected {
                    return Err(CatalogError::NonContiguous {
                        day,
                        index: slot.index,
                        expected,
                        found: slot.start,
                    });
                }
            }
            prev_end = Some(slot.end);
        }
        Ok(())
    }

    /// Ordered slots of `day`.  Empty when `day` is not a school day.
    pub fn slots_for_day(&self, day: WeekDay) -> &[Slot] {
        self.days.get(&day).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Lesson slots of `day`, in index order.
    pub fn lesson_slots(&self, day: WeekDay) -> impl Iterator<Item = &Slot> + '_ {
        self.slots_for_day(day).iter().filter(|s| s.is_lesson())
    }

    /// Configured school days in calendar order.
    pub fn days(&self) -> impl Iterator<Item = WeekDay> + '_ {
        self.days.keys().copied()
    }

    pub fn slot(&self, day: WeekDay, index: usize) -> Option<&Slot> {
        self.slots_for_day(day).get(index)
    }

    /// Number of lesson slots across the whole week.
    pub fn lesson_count(&self) -> usize {
        self.days
            .values()
            .map(|slots| slots.iter().filter(|s| s.is_lesson()).count())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    fn log_summary(&self) {
        info!(
            days = self.days.len(),
            lessons_per_week = self.lesson_count(),
            "slot catalog built"
        );
        for (day, slots) in &self.days {
            debug!(
                day = %day,
                slots = slots.len(),
                lessons = slots.iter().filter(|s| s.is_lesson()).count(),
                first = ?slots.first().map(|s| s.start),
                last = ?slots.last().map(|s| s.end),
                "  day"
            );
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
