/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Read-only resource pools consumed by the allocator.
//!
//! ```text
//! ResourceLoader ──(load_*)──►  ResourcePools  ──(borrowed)──►  Allocator
//!   persistence                  sorted by id, loaded once per run
//! ```
//!
//! # Ownership model
//! The pools are built once at the start of a run and never mutated.  The
//! allocator only borrows them, so the same `ResourcePools` can back several
//! sequential runs (each with its own
//! [`ConflictTracker`](crate::allocator::ConflictTracker)).

use std::collections::{BTreeMap, HashSet};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::store::ResourceLoader;

// ── Identifiers ───────────────────────────────────────────────────────────────

pub type SubjectId = u32;
pub type TeacherId = u32;
pub type RoomId = u32;
pub type ClassSectionId = u32;

// ── Entities ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
}

/// A teacher and the single subject they specialise in.
///
/// Eligibility for a lesson is an exact match on `primary_subject`; any
/// teacher may still be picked as a substitute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    pub primary_subject: SubjectId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub code: String,
}

/// A class section (e.g. "X-A") that needs a lesson in every lesson slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSection {
    pub id: ClassSectionId,
    pub name: String,
    pub level: u8,
}

// ── ResourcePools ─────────────────────────────────────────────────────────────

/// Closed, id-ordered sets of subjects, teachers, rooms and class sections.
#[derive(Debug, Clone, Default)]
pub struct ResourcePools {
    subjects: Vec<Subject>,
    teachers: Vec<Teacher>,
    rooms: Vec<Room>,
    class_sections: Vec<ClassSection>,
    /// subject id → positions in `teachers` of its specialists.
    specialists: BTreeMap<SubjectId, Vec<usize>>,
}

impl ResourcePools {
    /// Build pools from already-loaded entities.
    ///
    /// Every list is sorted by id.  Teachers whose primary subject is not in
    /// `subjects` are kept; they can still cover lessons as substitutes.
    ///
    /// # Errors
    /// Returns an error if any list contains the same id twice.
    pub fn new(
        mut subjects: Vec<Subject>,
        mut teachers: Vec<Teacher>,
        mut rooms: Vec<Room>,
        mut class_sections: Vec<ClassSection>,
    ) -> Result<Self> {
        subjects.sort_by_key(|s| s.id);
        teachers.sort_by_key(|t| t.id);
        rooms.sort_by_key(|r| r.id);
        class_sections.sort_by_key(|c| c.id);

        ensure_unique("subject", subjects.iter().map(|s| s.id))?;
        ensure_unique("teacher", teachers.iter().map(|t| t.id))?;
        ensure_unique("room", rooms.iter().map(|r| r.id))?;
        ensure_unique("class section", class_sections.iter().map(|c| c.id))?;

        let known: HashSet<SubjectId> = subjects.iter().map(|s| s.id).collect();
        let mut specialists: BTreeMap<SubjectId, Vec<usize>> = BTreeMap::new();
        for (pos, teacher) in teachers.iter().enumerate() {
            if !known.contains(&teacher.primary_subject) {
                warn!(
                    teacher = teacher.id,
                    name = %teacher.name,
                    subject = teacher.primary_subject,
                    "teacher's primary subject is unknown, usable only as a substitute"
                );
            }
            specialists
                .entry(teacher.primary_subject)
                .or_default()
                .push(pos);
        }

        info!(
            subjects = subjects.len(),
            teachers = teachers.len(),
            rooms = rooms.len(),
            class_sections = class_sections.len(),
            "resource pools loaded"
        );

        Ok(Self {
            subjects,
            teachers,
            rooms,
            class_sections,
            specialists,
        })
    }

    /// Load every pool through the persistence read contract.
    pub async fn load<L: ResourceLoader + ?Sized>(loader: &L) -> Result<Self> {
        let subjects = loader.load_subjects().await.context("loading subjects")?;
        let teachers = loader.load_teachers().await.context("loading teachers")?;
        let rooms = loader.load_rooms().await.context("loading rooms")?;
        let class_sections = loader
            .load_class_sections()
            .await
            .context("loading class sections")?;
        Self::new(subjects, teachers, rooms, class_sections)
    }

    pub fn all_subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Specialists for `subject`, in pool order.  Possibly empty.
    pub fn teachers_for(&self, subject: SubjectId) -> impl Iterator<Item = &Teacher> + '_ {
        self.specialists
            .get(&subject)
            .into_iter()
            .flatten()
            .map(|&pos| &self.teachers[pos])
    }

    pub fn all_teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub fn all_rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn all_class_sections(&self) -> &[ClassSection] {
        &self.class_sections
    }

    /// Default room of a class section: `rooms[id mod room_count]`.
    ///
    /// Returns `None` when there are no rooms at all.
    pub fn home_room(&self, class_section: &ClassSection) -> Option<&Room> {
        if self.rooms.is_empty() {
            return None;
        }
        let pos = class_section.id as usize % self.rooms.len();
        self.rooms.get(pos)
    }

    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|pos| &self.subjects[pos])
    }

    pub fn teacher(&self, id: TeacherId) -> Option<&Teacher> {
        self.teachers
            .binary_search_by_key(&id, |t| t.id)
            .ok()
            .map(|pos| &self.teachers[pos])
    }

    pub fn class_section(&self, id: ClassSectionId) -> Option<&ClassSection> {
        self.class_sections
            .binary_search_by_key(&id, |c| c.id)
            .ok()
            .map(|pos| &self.class_sections[pos])
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|pos| &self.rooms[pos])
    }
}

fn ensure_unique(what: &str, ids: impl Iterator<Item = u32>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            bail!("duplicate {what} id {id}");
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(id: SubjectId, name: &str) -> Subject {
        Subject {
            id,
            name: name.into(),
        }
    }

    fn teacher(id: TeacherId, subject: SubjectId) -> Teacher {
        Teacher {
            id,
            name: format!("teacher-{id}"),
            primary_subject: subject,
        }
    }

    fn room(id: RoomId) -> Room {
        Room {
            id,
            code: format!("R-{id}"),
        }
    }

    fn class(id: ClassSectionId) -> ClassSection {
        ClassSection {
            id,
            name: format!("X-{id}"),
            level: 10,
        }
    }

    fn pools() -> ResourcePools {
        ResourcePools::new(
            vec![subject(2, "Physics"), subject(1, "Mathematics")],
            vec![teacher(30, 1), teacher(10, 2), teacher(20, 1)],
            vec![room(3), room(1), room(2)],
            vec![class(5), class(4)],
        )
        .unwrap()
    }

    #[test]
    fn pools_are_sorted_by_id() {
        let p = pools();
        let ids: Vec<_> = p.all_teachers().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
        let rooms: Vec<_> = p.all_rooms().iter().map(|r| r.id).collect();
        assert_eq!(rooms, vec![1, 2, 3]);
        assert_eq!(p.all_subjects()[0].name, "Mathematics");
        assert_eq!(p.all_class_sections()[0].id, 4);
    }

    #[test]
    fn teachers_for_returns_specialists_in_pool_order() {
        let p = pools();
        let maths: Vec<_> = p.teachers_for(1).map(|t| t.id).collect();
        assert_eq!(maths, vec![20, 30]);
        let physics: Vec<_> = p.teachers_for(2).map(|t| t.id).collect();
        assert_eq!(physics, vec![10]);
    }

    #[test]
    fn teachers_for_unknown_subject_is_empty() {
        assert_eq!(pools().teachers_for(99).count(), 0);
    }

    #[test]
    fn home_room_is_id_modulo_room_count() {
        let p = pools();
        // rooms sorted: [1, 2, 3]; class 4 → 4 % 3 = 1 → room 2
        assert_eq!(p.home_room(&class(4)).unwrap().id, 2);
        // class 5 → 5 % 3 = 2 → room 3
        assert_eq!(p.home_room(&class(5)).unwrap().id, 3);
        assert_eq!(p.home_room(&class(6)).unwrap().id, 1);
    }

    #[test]
    fn home_room_without_rooms_is_none() {
        let p = ResourcePools::new(vec![subject(1, "Art")], vec![], vec![], vec![class(1)])
            .unwrap();
        assert!(p.home_room(&class(1)).is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = ResourcePools::new(vec![], vec![], vec![room(1), room(1)], vec![])
            .unwrap_err()
            .to_string();
        assert!(err.contains("duplicate room id 1"), "{err}");
    }

    #[test]
    fn teacher_with_unknown_subject_is_kept() {
        let p = ResourcePools::new(vec![subject(1, "Art")], vec![teacher(1, 42)], vec![], vec![])
            .unwrap();
        assert_eq!(p.all_teachers().len(), 1);
        assert_eq!(p.teachers_for(1).count(), 0);
    }

    #[test]
    fn lookups_by_id() {
        let p = pools();
        assert_eq!(p.subject(2).unwrap().name, "Physics");
        assert_eq!(p.teacher(20).unwrap().primary_subject, 1);
        assert_eq!(p.room(3).unwrap().code, "R-3");
        assert!(p.room(9).is_none());
        assert_eq!(p.class_section(5).unwrap().name, "X-5");
        assert!(p.class_section(1).is_none());
    }
}
