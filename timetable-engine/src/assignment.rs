/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Committed lesson assignments and the read-side timetable grid.
//!
//! ```text
//! Allocator ──(Assignment)──► AssignmentStore ──(load)──► Timetable
//!                               keyed by AssignmentKey      free periods made explicit
//! ```
//!
//! A free period is never stored.  "No assignment for this class, day and
//! slot" is the free period; [`Timetable`] turns that absence into an explicit
//! [`Cell::FreePeriod`] for display.

use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::catalog::{Slot, SlotCatalog, SlotKind, WeekDay};
use crate::resources::{ClassSectionId, RoomId, SubjectId, TeacherId};

// ── Assignment ────────────────────────────────────────────────────────────────

/// One lesson: a class section meets a teacher for a subject in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub class_section: ClassSectionId,
    pub subject: SubjectId,
    pub teacher: TeacherId,
    pub room: RoomId,
    pub day: WeekDay,
    pub slot_index: usize,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Assignment {
    /// Upsert key of this assignment.
    pub fn key(&self) -> AssignmentKey {
        AssignmentKey {
            class_section: self.class_section,
            day: self.day,
            slot_index: self.slot_index,
        }
    }
}

/// Identity of an assignment: at most one per (class section, day, slot).
///
/// Ordering is class → day → slot, which is also the allocator's iteration
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssignmentKey {
    pub class_section: ClassSectionId,
    pub day: WeekDay,
    pub slot_index: usize,
}

// ── Timetable view ────────────────────────────────────────────────────────────

/// One cell of a class section's day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell<'a> {
    Lesson(&'a Assignment),
    /// Lesson slot with no assignment.
    FreePeriod,
    /// Non-teaching slot (break or ceremony).
    Closed(SlotKind),
}

/// A row of the grid: the slot and what fills it.
#[derive(Debug, Clone)]
pub struct Row<'a> {
    pub slot: &'a Slot,
    pub cell: Cell<'a>,
}

/// Read-only timetable of committed assignments laid over the slot catalog.
#[derive(Debug)]
pub struct Timetable<'a> {
    catalog: &'a SlotCatalog,
    by_key: BTreeMap<AssignmentKey, &'a Assignment>,
}

impl<'a> Timetable<'a> {
    pub fn new(catalog: &'a SlotCatalog, assignments: &'a [Assignment]) -> Self {
        let by_key = assignments.iter().map(|a| (a.key(), a)).collect();
        Self { catalog, by_key }
    }

    /// Every slot of `day` for `class_section`, in index order.
    pub fn day(&self, class_section: ClassSectionId, day: WeekDay) -> Vec<Row<'a>> {
        self.catalog
            .slots_for_day(day)
            .iter()
            .map(|slot| {
                let cell = if !slot.is_lesson() {
                    Cell::Closed(slot.kind)
                } else {
                    let key = AssignmentKey {
                        class_section,
                        day,
                        slot_index: slot.index,
                    };
                    match self.by_key.get(&key) {
                        Some(a) => Cell::Lesson(a),
                        None => Cell::FreePeriod,
                    }
                };
                Row { slot, cell }
            })
            .collect()
    }

    /// Number of lesson slots across the week with no assignment for
    /// `class_section`.
    pub fn free_periods(&self, class_section: ClassSectionId) -> usize {
        self.catalog
            .days()
            .flat_map(|day| self.day(class_section, day))
            .filter(|row| row.cell == Cell::FreePeriod)
            .count()
    }

    /// Assignments of `class_section`, in day/slot order.
    pub fn lessons(
        &self,
        class_section: ClassSectionId,
    ) -> impl Iterator<Item = &'a Assignment> + '_ {
        self.by_key
            .range(
                AssignmentKey {
                    class_section,
                    day: WeekDay::Monday,
                    slot_index: 0,
                }..=AssignmentKey {
                    class_section,
                    day: WeekDay::Saturday,
                    slot_index: usize::MAX,
                },
            )
            .map(|(_, a)| *a)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DayTemplate, PeriodSpec};

    fn catalog() -> SlotCatalog {
        SlotCatalog::from_templates([DayTemplate {
            day: WeekDay::Monday,
            start: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            periods: vec![
                PeriodSpec::new(SlotKind::Ceremony, 30),
                PeriodSpec::new(SlotKind::Lesson, 45),
                PeriodSpec::new(SlotKind::Break, 15),
                PeriodSpec::new(SlotKind::Lesson, 45),
            ],
        }])
        .unwrap()
    }

    fn lesson(class_section: ClassSectionId, slot: &Slot) -> Assignment {
        Assignment {
            class_section,
            subject: 1,
            teacher: 1,
            room: 1,
            day: slot.day,
            slot_index: slot.index,
            start: slot.start,
            end: slot.end,
        }
    }

    #[test]
    fn key_uses_class_day_and_slot() {
        let cat = catalog();
        let a = lesson(7, cat.slot(WeekDay::Monday, 1).unwrap());
        assert_eq!(
            a.key(),
            AssignmentKey {
                class_section: 7,
                day: WeekDay::Monday,
                slot_index: 1
            }
        );
    }

    #[test]
    fn missing_assignment_renders_as_free_period() {
        let cat = catalog();
        let assignments = vec![lesson(1, cat.slot(WeekDay::Monday, 1).unwrap())];
        let tt = Timetable::new(&cat, &assignments);

        let rows = tt.day(1, WeekDay::Monday);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].cell, Cell::Closed(SlotKind::Ceremony));
        assert!(matches!(rows[1].cell, Cell::Lesson(a) if a.slot_index == 1));
        assert_eq!(rows[2].cell, Cell::Closed(SlotKind::Break));
        assert_eq!(rows[3].cell, Cell::FreePeriod);
        assert_eq!(tt.free_periods(1), 1);
    }

    #[test]
    fn other_class_sees_only_free_periods() {
        let cat = catalog();
        let assignments = vec![lesson(1, cat.slot(WeekDay::Monday, 1).unwrap())];
        let tt = Timetable::new(&cat, &assignments);
        assert_eq!(tt.free_periods(2), 2);
        assert_eq!(tt.lessons(2).count(), 0);
        assert_eq!(tt.lessons(1).count(), 1);
    }

    #[test]
    fn assignment_yaml_round_trip_keeps_times() {
        let cat = catalog();
        let a = lesson(3, cat.slot(WeekDay::Monday, 3).unwrap());
        let yaml = serde_yaml::to_string(&a).unwrap();
        assert!(yaml.contains("day: monday"), "{yaml}");
        let back: Assignment = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, a);
    }
}
