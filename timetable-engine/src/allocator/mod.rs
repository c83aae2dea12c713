/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Weekly lesson allocator.
//!
//! [`Allocator`] walks every (class section × school day × lesson slot)
//! triple once, in a fixed order, and tries to staff it with a subject, a
//! teacher and a room that are all free at that slot.  It is a single greedy
//! forward pass: nothing is revisited and nothing is un-marked.
//!
//! Per triple, first success wins:
//!
//! 1. skip if the class section already has a lesson there (re-runs);
//! 2. pick a subject through the [`SubjectPicker`];
//! 3. first free specialist of that subject, else first free teacher of any
//!    subject (a substitute, still recorded against the picked subject);
//! 4. the class section's home room, else the first free room;
//! 5. commit: mark teacher, room and class busy, then persist.
//!
//! Running out of teachers or rooms leaves a free period and is reported, not
//! raised.  A failed write stops the run with [`AllocError::Persistence`].
//!
//! # Example
//! ```rust,ignore
//! let mut allocator = Allocator::new(pools, catalog, Box::new(RoundRobinPicker::new()));
//! let mut tracker = ConflictTracker::new();
//! let report = allocator.run(&mut tracker, &mut store).await?;
//! ```

pub mod error;
pub mod picker;
pub mod tracker;

pub use error::{AllocError, FreePeriodReason, StaleReason};
pub use picker::{RandomPicker, RoundRobinPicker, SequencePicker, SubjectPicker};
pub use tracker::ConflictTracker;

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::assignment::{Assignment, AssignmentKey};
use crate::catalog::{Slot, SlotCatalog, WeekDay};
use crate::resources::{ClassSection, ResourcePools, Room, Subject, SubjectId, Teacher};
use crate::store::{AssignmentStore, ResourceLoader};

// ── Run outcome types ─────────────────────────────────────────────────────────

/// A lesson slot that stayed empty, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreePeriod {
    pub key: AssignmentKey,
    /// Subject that was picked for the slot before resources ran out.
    pub subject: SubjectId,
    pub reason: FreePeriodReason,
}

/// Summary of one allocation run.
#[derive(Debug, Clone, Default)]
pub struct AllocationReport {
    /// Assignments committed by this run, in commit order.
    pub assignments: Vec<Assignment>,
    /// How many of `assignments` went to a non-specialist teacher.
    pub substitutes: usize,
    /// Triples skipped because the class section already had a lesson.
    pub already_filled: usize,
    pub free_periods: Vec<FreePeriod>,
    /// `true` if the run stopped at a cancellation checkpoint.
    pub cancelled: bool,
}

impl AllocationReport {
    pub fn assigned(&self) -> usize {
        self.assignments.len()
    }

    fn record(&mut self, key: AssignmentKey, subject: Option<SubjectId>, outcome: SlotOutcome) {
        match outcome {
            SlotOutcome::Committed {
                assignment,
                substitute,
            } => {
                if substitute {
                    self.substitutes += 1;
                }
                self.assignments.push(assignment);
            }
            SlotOutcome::AlreadyFilled => self.already_filled += 1,
            SlotOutcome::Free(reason) => self.free_periods.push(FreePeriod {
                key,
                subject: subject.unwrap_or_default(),
                reason,
            }),
        }
    }
}

/// Teacher chosen for a slot.
#[derive(Debug, Clone, Copy)]
pub struct TeacherChoice<'a> {
    pub teacher: &'a Teacher,
    /// `true` if `teacher` does not specialise in the picked subject.
    pub substitute: bool,
}

/// What happened to one triple.
#[derive(Debug)]
enum SlotOutcome {
    Committed {
        assignment: Assignment,
        substitute: bool,
    },
    AlreadyFilled,
    Free(FreePeriodReason),
}

// ── Allocator ─────────────────────────────────────────────────────────────────

/// The timetable allocator.
///
/// Holds shared, read-only references to the pools and the slot catalog.  All
/// per-run mutable state lives in the [`ConflictTracker`] the caller passes to
/// [`run`](Self::run), so one `Allocator` can serve repeated runs without
/// leaking state between them.
pub struct Allocator {
    pools: Arc<ResourcePools>,
    catalog: Arc<SlotCatalog>,
    picker: Box<dyn SubjectPicker>,
    cancel: CancellationToken,
}

impl Allocator {
    pub fn new(
        pools: Arc<ResourcePools>,
        catalog: Arc<SlotCatalog>,
        picker: Box<dyn SubjectPicker>,
    ) -> Self {
        Self {
            pools,
            catalog,
            picker,
            cancel: CancellationToken::new(),
        }
    }

    /// Load pools and the slot catalog through `loader` and build an
    /// allocator over them.
    ///
    /// # Errors
    /// * [`AllocError::Load`] – the loader failed or the pools are invalid.
    /// * [`AllocError::Catalog`] – a day template does not validate.
    pub async fn load<L: ResourceLoader + ?Sized>(
        loader: &L,
        picker: Box<dyn SubjectPicker>,
    ) -> Result<Self, AllocError> {
        let pools = ResourcePools::load(loader)
            .await
            .map_err(|cause| AllocError::Load { cause })?;

        let mut templates = Vec::new();
        for day in WeekDay::ALL {
            let template = loader
                .load_slot_catalog(day)
                .await
                .with_context(|| format!("loading slot template for {day}"))
                .map_err(|cause| AllocError::Load { cause })?;
            templates.extend(template);
        }
        let catalog = SlotCatalog::from_templates(templates)?;

        Ok(Self::new(Arc::new(pools), Arc::new(catalog), picker))
    }

    /// Build a tracker reflecting `existing`, typically what the store already
    /// holds, after checking that every assignment still fits the current
    /// pools and slot catalog.
    ///
    /// # Errors
    /// [`AllocError::StaleAssignment`] for the first assignment that sits in a
    /// slot that is gone, no longer a lesson or has moved, that names a
    /// resource no longer in the pools, or that double-books a teacher or room.
    pub fn seed_tracker(&self, existing: &[Assignment]) -> Result<ConflictTracker, AllocError> {
        let mut tracker = ConflictTracker::new();
        for assignment in existing {
            if let Some(reason) = self.stale_reason(assignment, &tracker) {
                warn!(key = ?assignment.key(), "stored assignment is stale: {reason}");
                return Err(AllocError::StaleAssignment {
                    key: assignment.key(),
                    reason,
                });
            }
            tracker.record(assignment);
        }
        debug!(assignments = existing.len(), "tracker seeded from stored assignments");
        Ok(tracker)
    }

    fn stale_reason(&self, a: &Assignment, tracker: &ConflictTracker) -> Option<StaleReason> {
        let Some(slot) = self.catalog.slot(a.day, a.slot_index) else {
            return Some(StaleReason::NoSuchSlot);
        };
        if !slot.is_lesson() {
            return Some(StaleReason::NotALesson(slot.kind));
        }
        if (slot.start, slot.end) != (a.start, a.end) {
            return Some(StaleReason::TimeMismatch);
        }
        if self.pools.class_section(a.class_section).is_none() {
            return Some(StaleReason::UnknownClassSection);
        }
        if self.pools.subject(a.subject).is_none() {
            return Some(StaleReason::UnknownSubject);
        }
        if self.pools.teacher(a.teacher).is_none() {
            return Some(StaleReason::UnknownTeacher);
        }
        if self.pools.room(a.room).is_none() {
            return Some(StaleReason::UnknownRoom);
        }
        if tracker.is_teacher_busy(a.day, a.slot_index, a.teacher) {
            return Some(StaleReason::TeacherDoubleBooked);
        }
        if tracker.is_room_busy(a.day, a.slot_index, a.room) {
            return Some(StaleReason::RoomDoubleBooked);
        }
        None
    }

    /// Stop between class sections once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn pools(&self) -> &ResourcePools {
        &self.pools
    }

    pub fn catalog(&self) -> &SlotCatalog {
        &self.catalog
    }

    // ── Public entry point ────────────────────────────────────────────────────

    /// Allocate every lesson slot of every class section for the week.
    ///
    /// `tracker` may already reflect earlier commitments (see
    /// [`seed_tracker`](Self::seed_tracker)); occupied triples are then left
    /// alone and the run is additive-only.
    ///
    /// # Errors
    /// * [`AllocError::NoSubjects`] – the subject pool is empty.
    /// * [`AllocError::Persistence`] – the store rejected a write.  Earlier
    ///   assignments remain committed (a best-effort flush is attempted).
    /// * [`AllocError::Flush`] – the final flush failed.
    pub async fn run<S>(
        &mut self,
        tracker: &mut ConflictTracker,
        store: &mut S,
    ) -> Result<AllocationReport, AllocError>
    where
        S: AssignmentStore + ?Sized,
    {
        // ── Preconditions ─────────────────────────────────────────────────────
        let pools = Arc::clone(&self.pools);
        let catalog = Arc::clone(&self.catalog);

        if pools.all_subjects().is_empty() {
            return Err(AllocError::NoSubjects);
        }
        if catalog.is_empty() {
            warn!("slot catalog has no school days, nothing to allocate");
        }

        info!(
            policy = self.picker.name(),
            class_sections = pools.all_class_sections().len(),
            days = catalog.days().count(),
            lessons_per_week = catalog.lesson_count(),
            "=== Allocator::run() ==="
        );

        let mut report = AllocationReport::default();

        // ── Class × day × lesson slot ─────────────────────────────────────────
        for class in pools.all_class_sections() {
            if self.cancel.is_cancelled() {
                warn!(next_class = class.id, "allocation cancelled between class sections");
                report.cancelled = true;
                break;
            }

            for day in catalog.days() {
                for slot in catalog.lesson_slots(day) {
                    let key = AssignmentKey {
                        class_section: class.id,
                        day,
                        slot_index: slot.index,
                    };
                    let mut picked = None;
                    let outcome = self
                        .allocate_slot(&pools, tracker, store, class, slot, &mut picked)
                        .await;
                    match outcome {
                        Ok(outcome) => report.record(key, picked, outcome),
                        Err(err) => {
                            if let Err(flush_err) = store.flush().await {
                                warn!(
                                    error = %format!("{flush_err:#}"),
                                    "flush after failed write also failed"
                                );
                            }
                            return Err(err);
                        }
                    }
                }
            }

            debug!(class = class.id, name = %class.name, "class section done");
        }

        store
            .flush()
            .await
            .map_err(|cause| AllocError::Flush { cause })?;

        info!(
            assigned = report.assigned(),
            substitutes = report.substitutes,
            free_periods = report.free_periods.len(),
            already_filled = report.already_filled,
            cancelled = report.cancelled,
            "=== Allocation complete ==="
        );

        Ok(report)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // One triple
    // ─────────────────────────────────────────────────────────────────────────

    async fn allocate_slot<S>(
        &mut self,
        pools: &ResourcePools,
        tracker: &mut ConflictTracker,
        store: &mut S,
        class: &ClassSection,
        slot: &Slot,
        picked: &mut Option<SubjectId>,
    ) -> Result<SlotOutcome, AllocError>
    where
        S: AssignmentStore + ?Sized,
    {
        debug_assert!(slot.is_lesson(), "allocator only visits lesson slots");
        let (day, index) = (slot.day, slot.index);

        if tracker.is_class_busy(day, index, class.id) {
            debug!(class = class.id, day = %day, slot = index, "already filled, skipping");
            return Ok(SlotOutcome::AlreadyFilled);
        }

        let subject = self
            .pick_subject(pools.all_subjects())
            .ok_or(AllocError::NoSubjects)?;
        *picked = Some(subject.id);

        let Some(choice) = Self::pick_teacher(pools, tracker, subject.id, day, index) else {
            debug!(
                class = class.id,
                day = %day,
                slot = index,
                subject = %subject.name,
                "✗ free period: {}",
                FreePeriodReason::NoTeacher
            );
            return Ok(SlotOutcome::Free(FreePeriodReason::NoTeacher));
        };

        let Some(room) = Self::pick_room(pools, tracker, class, day, index) else {
            debug!(
                class = class.id,
                day = %day,
                slot = index,
                subject = %subject.name,
                teacher = choice.teacher.id,
                "✗ free period: {}",
                FreePeriodReason::NoRoom
            );
            return Ok(SlotOutcome::Free(FreePeriodReason::NoRoom));
        };

        let assignment =
            Self::try_commit(tracker, store, class, subject, choice.teacher, room, slot).await?;

        debug!(
            class = class.id,
            day = %day,
            slot = index,
            subject = %subject.name,
            teacher = choice.teacher.id,
            room = %room.code,
            substitute = choice.substitute,
            "✓ assigned"
        );

        Ok(SlotOutcome::Committed {
            assignment,
            substitute: choice.substitute,
        })
    }

    /// Ask the configured policy for the next subject.
    fn pick_subject<'a>(&mut self, subjects: &'a [Subject]) -> Option<&'a Subject> {
        self.picker.pick(subjects)
    }

    /// First free specialist of `subject`, else first free teacher of any
    /// subject.  `None` if every teacher is busy at (day, slot).
    pub fn pick_teacher<'a>(
        pools: &'a ResourcePools,
        tracker: &ConflictTracker,
        subject: SubjectId,
        day: WeekDay,
        slot_index: usize,
    ) -> Option<TeacherChoice<'a>> {
        let free = |t: &&Teacher| !tracker.is_teacher_busy(day, slot_index, t.id);

        if let Some(teacher) = pools.teachers_for(subject).find(free) {
            return Some(TeacherChoice {
                teacher,
                substitute: false,
            });
        }

        pools.all_teachers().iter().find(free).map(|teacher| TeacherChoice {
            teacher,
            substitute: teacher.primary_subject != subject,
        })
    }

    /// The class section's home room if free, else the first free room.
    /// `None` if every room is busy at (day, slot).
    pub fn pick_room<'a>(
        pools: &'a ResourcePools,
        tracker: &ConflictTracker,
        class: &ClassSection,
        day: WeekDay,
        slot_index: usize,
    ) -> Option<&'a Room> {
        let free = |r: &&Room| !tracker.is_room_busy(day, slot_index, r.id);

        if let Some(home) = pools.home_room(class).filter(free) {
            return Some(home);
        }

        pools.all_rooms().iter().find(free)
    }

    /// Build the assignment, mark it in `tracker`, then persist it.
    ///
    /// The tracker is updated before the write is awaited so it never lags
    /// behind what has been decided, even if the write later fails.
    async fn try_commit<S>(
        tracker: &mut ConflictTracker,
        store: &mut S,
        class: &ClassSection,
        subject: &Subject,
        teacher: &Teacher,
        room: &Room,
        slot: &Slot,
    ) -> Result<Assignment, AllocError>
    where
        S: AssignmentStore + ?Sized,
    {
        let assignment = Assignment {
            class_section: class.id,
            subject: subject.id,
            teacher: teacher.id,
            room: room.id,
            day: slot.day,
            slot_index: slot.index,
            start: slot.start,
            end: slot.end,
        };

        tracker.record(&assignment);

        store
            .save_assignment(&assignment)
            .await
            .map_err(|cause| AllocError::Persistence {
                key: assignment.key(),
                cause,
            })?;

        Ok(assignment)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
