/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Persistence boundary.
//!
//! The engine never talks to a database directly.  It consumes two
//! interfaces:
//!
//! * [`ResourceLoader`] – read side: pools and per-day slot templates.
//! * [`AssignmentStore`] – write side: committed assignments, upserted by
//!   (class section, day, slot) so repeated runs stay idempotent.
//!
//! [`MemoryStore`] and [`file::YamlFileStore`] are the in-tree
//! implementations.  Retry policy, if any, belongs to the implementation, not
//! to the allocator.

pub mod file;

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::assignment::{Assignment, AssignmentKey};
use crate::catalog::{DayTemplate, WeekDay};
use crate::resources::{ClassSection, Room, Subject, Teacher};

pub use file::YamlFileStore;

/// Read side of the persistence collaborator.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    async fn load_subjects(&self) -> Result<Vec<Subject>>;

    async fn load_teachers(&self) -> Result<Vec<Teacher>>;

    async fn load_rooms(&self) -> Result<Vec<Room>>;

    async fn load_class_sections(&self) -> Result<Vec<ClassSection>>;

    /// Template of `day`, or `None` if `day` is not a school day.
    async fn load_slot_catalog(&self, day: WeekDay) -> Result<Option<DayTemplate>>;
}

/// Write side of the persistence collaborator.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Record `assignment`, replacing any previous assignment with the same
    /// [`AssignmentKey`].
    async fn save_assignment(&mut self, assignment: &Assignment) -> Result<()>;

    /// All assignments committed so far, in key order.
    async fn load_assignments(&self) -> Result<Vec<Assignment>>;

    /// Make buffered writes durable.  No-op for stores that write through.
    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

// ── MemoryStore ───────────────────────────────────────────────────────────────

/// In-memory upsert store.
///
/// Can be switched into a failing mode to exercise persistence-failure
/// handling.
#[derive(Debug, Default)]
pub struct MemoryStore {
    assignments: BTreeMap<AssignmentKey, Assignment>,
    /// Reject every write once this many saves have succeeded.
    fail_after: Option<usize>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with `assignments`.
    pub fn with_assignments(assignments: impl IntoIterator<Item = Assignment>) -> Self {
        Self {
            assignments: assignments.into_iter().map(|a| (a.key(), a)).collect(),
            ..Self::default()
        }
    }

    /// A store whose writes start failing after `n` successful saves.
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn get(&self, key: &AssignmentKey) -> Option<&Assignment> {
        self.assignments.get(key)
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn save_assignment(&mut self, assignment: &Assignment) -> Result<()> {
        if let Some(limit) = self.fail_after {
            if self.saves >= limit {
                bail!("memory store rejected write #{}", self.saves + 1);
            }
        }
        self.saves += 1;
        let replaced = self
            .assignments
            .insert(assignment.key(), assignment.clone())
            .is_some();
        debug!(key = ?assignment.key(), replaced, "assignment stored");
        Ok(())
    }

    async fn load_assignments(&self) -> Result<Vec<Assignment>> {
        Ok(self.assignments.values().cloned().collect())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn assignment(class_section: u32, teacher: u32) -> Assignment {
        Assignment {
            class_section,
            subject: 1,
            teacher,
            room: 1,
            day: WeekDay::Tuesday,
            slot_index: 2,
            start: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            end: NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn save_is_an_upsert_by_key() {
        let mut store = MemoryStore::new();
        store.save_assignment(&assignment(1, 10)).await.unwrap();
        store.save_assignment(&assignment(1, 11)).await.unwrap();

        assert_eq!(store.len(), 1);
        let stored = store.get(&assignment(1, 0).key()).unwrap();
        assert_eq!(stored.teacher, 11, "last write wins");
    }

    #[tokio::test]
    async fn load_returns_key_order() {
        let mut store = MemoryStore::new();
        store.save_assignment(&assignment(3, 1)).await.unwrap();
        store.save_assignment(&assignment(1, 2)).await.unwrap();
        let loaded = store.load_assignments().await.unwrap();
        let classes: Vec<_> = loaded.iter().map(|a| a.class_section).collect();
        assert_eq!(classes, vec![1, 3]);
    }

    #[tokio::test]
    async fn failing_store_rejects_after_limit() {
        let mut store = MemoryStore::failing_after(1);
        store.save_assignment(&assignment(1, 1)).await.unwrap();
        assert!(store.save_assignment(&assignment(2, 2)).await.is_err());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn with_assignments_prefills() {
        let store = MemoryStore::with_assignments([assignment(4, 1), assignment(5, 2)]);
        assert_eq!(store.load_assignments().await.unwrap().len(), 2);
        assert!(!store.is_empty());
    }
}
