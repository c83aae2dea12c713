/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Subject selection policies.
//!
//! The allocator asks a [`SubjectPicker`] which subject to try for each lesson
//! slot.  The default policy is a uniform random choice; tests swap in a
//! [`SequencePicker`] to get a reproducible run without touching the
//! allocator's control flow.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::resources::{Subject, SubjectId};

/// Chooses the subject for the next lesson slot.
pub trait SubjectPicker: Send {
    /// Pick one of `subjects`.  Returns `None` only when `subjects` is empty.
    fn pick<'a>(&mut self, subjects: &'a [Subject]) -> Option<&'a Subject>;

    /// Short policy name for logging.
    fn name(&self) -> &'static str;
}

// ── RandomPicker ──────────────────────────────────────────────────────────────

/// Uniform random choice among all subjects.
#[derive(Debug, Clone)]
pub struct RandomPicker {
    rng: StdRng,
}

impl RandomPicker {
    /// Seeded from the operating system; every run differs.
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl SubjectPicker for RandomPicker {
    fn pick<'a>(&mut self, subjects: &'a [Subject]) -> Option<&'a Subject> {
        if subjects.is_empty() {
            return None;
        }
        subjects.get(self.rng.random_range(0..subjects.len()))
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

// ── RoundRobinPicker ──────────────────────────────────────────────────────────

/// Cycles through the subjects in pool order, so every subject is reached
/// once every `subjects.len()` picks.
#[derive(Debug, Clone, Default)]
pub struct RoundRobinPicker {
    next: usize,
}

impl RoundRobinPicker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubjectPicker for RoundRobinPicker {
    fn pick<'a>(&mut self, subjects: &'a [Subject]) -> Option<&'a Subject> {
        if subjects.is_empty() {
            return None;
        }
        let subject = subjects.get(self.next % subjects.len());
        self.next = self.next.wrapping_add(1);
        subject
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}

// ── SequencePicker ────────────────────────────────────────────────────────────

/// Replays a fixed list of subject ids, wrapping around at the end.
///
/// An id that is not in the pool falls back to the first subject.
#[derive(Debug, Clone)]
pub struct SequencePicker {
    ids: Vec<SubjectId>,
    pos: usize,
}

impl SequencePicker {
    pub fn new(ids: impl Into<Vec<SubjectId>>) -> Self {
        Self {
            ids: ids.into(),
            pos: 0,
        }
    }
}

impl SubjectPicker for SequencePicker {
    fn pick<'a>(&mut self, subjects: &'a [Subject]) -> Option<&'a Subject> {
        let first = subjects.first()?;
        if self.ids.is_empty() {
            return Some(first);
        }
        let want = self.ids[self.pos % self.ids.len()];
        self.pos = self.pos.wrapping_add(1);
        Some(subjects.iter().find(|s| s.id == want).unwrap_or(first))
    }

    fn name(&self) -> &'static str {
        "sequence"
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
