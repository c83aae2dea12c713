/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Per-run busy-set bookkeeping.
//!
//! [`ConflictTracker`] records, for every (day, slot index), which teachers,
//! rooms and class sections are already committed.  Marks are monotonic:
//! nothing is ever un-marked, so the invariants hold for any prefix of the
//! allocator's iteration order.
//!
//! The tracker is an explicit value owned by one run and borrowed `&mut` by the
//! allocator.  Two runs never share one.

use std::collections::{BTreeMap, BTreeSet};

use crate::assignment::Assignment;
use crate::catalog::WeekDay;
use crate::resources::{ClassSectionId, RoomId, TeacherId};

/// (day, slot index) → set of busy ids.
///
/// `BTreeMap`/`BTreeSet` keep `Debug` output and iteration deterministic.
type BusyMap<Id> = BTreeMap<(WeekDay, usize), BTreeSet<Id>>;

#[derive(Debug, Clone, Default)]
pub struct ConflictTracker {
    teachers: BusyMap<TeacherId>,
    rooms: BusyMap<RoomId>,
    classes: BusyMap<ClassSectionId>,
}

impl ConflictTracker {
    /// An empty tracker for a fresh run.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_teacher_busy(&self, day: WeekDay, slot_index: usize, teacher: TeacherId) -> bool {
        is_busy(&self.teachers, day, slot_index, teacher)
    }

    pub fn mark_teacher_busy(&mut self, day: WeekDay, slot_index: usize, teacher: TeacherId) {
        mark(&mut self.teachers, day, slot_index, teacher);
    }

    pub fn is_room_busy(&self, day: WeekDay, slot_index: usize, room: RoomId) -> bool {
        is_busy(&self.rooms, day, slot_index, room)
    }

    pub fn mark_room_busy(&mut self, day: WeekDay, slot_index: usize, room: RoomId) {
        mark(&mut self.rooms, day, slot_index, room);
    }

    pub fn is_class_busy(&self, day: WeekDay, slot_index: usize, class: ClassSectionId) -> bool {
        is_busy(&self.classes, day, slot_index, class)
    }

    pub fn mark_class_busy(&mut self, day: WeekDay, slot_index: usize, class: ClassSectionId) {
        mark(&mut self.classes, day, slot_index, class);
    }

    /// Mark the teacher, room and class section of `assignment` busy.
    pub fn record(&mut self, assignment: &Assignment) {
        let (day, slot) = (assignment.day, assignment.slot_index);
        self.mark_teacher_busy(day, slot, assignment.teacher);
        self.mark_room_busy(day, slot, assignment.room);
        self.mark_class_busy(day, slot, assignment.class_section);
    }
}

fn is_busy<Id: Ord>(map: &BusyMap<Id>, day: WeekDay, slot_index: usize, id: Id) -> bool {
    map.get(&(day, slot_index))
        .is_some_and(|set| set.contains(&id))
}

fn mark<Id: Ord>(map: &mut BusyMap<Id>, day: WeekDay, slot_index: usize, id: Id) {
    map.entry((day, slot_index)).or_default().insert(id);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
