/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the timetable allocator.
//!
//! Two types model the two outcome layers:
//!
//! * [`FreePeriodReason`]: why one (class, day, slot) triple was left empty.
//!   This is a normal outcome, reported but never raised.
//! * [`AllocError`]: top-level failure returned from
//!   [`Allocator::run()`](super::Allocator::run).
//!
//! Every variant carries the ids needed to emit a fully-qualified `tracing`
//! event without further lookups.

use thiserror::Error;

use crate::assignment::AssignmentKey;
use crate::catalog::{CatalogError, SlotKind};

// ── Resource exhaustion ───────────────────────────────────────────────────────

/// Why a lesson slot stayed a free period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreePeriodReason {
    /// Neither a specialist nor any substitute teacher was free.
    NoTeacher,

    /// A teacher was free but every room was taken.
    NoRoom,
}

impl std::fmt::Display for FreePeriodReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FreePeriodReason::NoTeacher => write!(f, "no free teacher (specialist or substitute)"),
            FreePeriodReason::NoRoom => write!(f, "no free room"),
        }
    }
}

// ── Stored assignments vs. current configuration ─────────────────────────────

/// Why an assignment loaded from the store does not fit the current pools and
/// slot catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    /// The day has no slot with that index (or is no longer a school day).
    NoSuchSlot,
    /// The slot still exists but is no longer a lesson.
    NotALesson(SlotKind),
    /// The slot moved: its start or end time differs from the stored one.
    TimeMismatch,
    UnknownClassSection,
    UnknownSubject,
    UnknownTeacher,
    UnknownRoom,
    /// Another stored assignment already uses this teacher at this slot.
    TeacherDoubleBooked,
    /// Another stored assignment already uses this room at this slot.
    RoomDoubleBooked,
}

impl std::fmt::Display for StaleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StaleReason::NoSuchSlot => write!(f, "slot does not exist"),
            StaleReason::NotALesson(kind) => write!(f, "slot is now a {kind:?} slot"),
            StaleReason::TimeMismatch => write!(f, "slot times changed"),
            StaleReason::UnknownClassSection => write!(f, "class section no longer exists"),
            StaleReason::UnknownSubject => write!(f, "subject no longer exists"),
            StaleReason::UnknownTeacher => write!(f, "teacher no longer exists"),
            StaleReason::UnknownRoom => write!(f, "room no longer exists"),
            StaleReason::TeacherDoubleBooked => write!(f, "teacher is double-booked"),
            StaleReason::RoomDoubleBooked => write!(f, "room is double-booked"),
        }
    }
}

// ── Top-level allocator errors ────────────────────────────────────────────────

/// Top-level error type returned by
/// [`Allocator::run()`](super::Allocator::run).
///
/// | Variant | Class |
/// |---|---|
/// | `Load` / `Catalog` | configuration, raised by [`Allocator::load()`](super::Allocator::load) |
/// | `StaleAssignment` | configuration, raised by [`super::Allocator::seed_tracker`] |
/// | `NoSubjects` | configuration, raised before the run starts |
/// | `Persistence` / `Flush` | persistence failure, the run stops |
#[derive(Debug, Error)]
pub enum AllocError {
    /// The subject pool is empty so there is nothing to schedule.
    #[error("no subjects configured, nothing to schedule")]
    NoSubjects,

    /// The resource loader failed, or the pools it returned are invalid.
    #[error("failed to load school resources: {cause:#}")]
    Load { cause: anyhow::Error },

    /// The slot catalog failed validation.
    #[error("invalid slot catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// An assignment already in the store does not fit the current
    /// configuration.
    #[error(
        "stored assignment for class {} on {} slot #{} is stale: {reason}",
        .key.class_section, .key.day, .key.slot_index
    )]
    StaleAssignment {
        key: AssignmentKey,
        reason: StaleReason,
    },

    /// The store rejected an assignment.  Assignments committed before this
    /// one remain stored; the week is incomplete.
    #[error(
        "failed to persist assignment for class {} on {} slot #{}: {cause:#}",
        .key.class_section, .key.day, .key.slot_index
    )]
    Persistence {
        key: AssignmentKey,
        cause: anyhow::Error,
    },

    /// Buffered writes could not be flushed at the end of the run.
    #[error("failed to flush assignment store: {cause:#}")]
    Flush { cause: anyhow::Error },
}

// ── Tests ─────────────────────────────────────────────────────────────────────
