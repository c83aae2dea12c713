/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! School configuration loading and management.
//!
//! The expected YAML structure is:
//! ```yaml
//! subjects:
//!   - { id: 1, name: Mathematics }
//! teachers:
//!   - { id: 1, name: Budi, primary_subject: 1 }
//! rooms:
//!   - { id: 1, code: R-101 }
//! class_sections:
//!   - { id: 1, name: X-A, level: 10 }
//! timetable:              # optional
//!   monday:
//!     start: "07:00"
//!     periods:
//!       - { kind: ceremony, minutes: 45 }
//!       - { kind: lesson, minutes: 45 }
//!       - { kind: break, minutes: 15 }
//! ```
//!
//! When `timetable` is absent the standard week
//! ([`DayTemplate::standard_week`]) is used.  When it is present, only the
//! days it lists are school days.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::catalog::clock::{format_hhmm, parse_hhmm};
use crate::catalog::{DayTemplate, PeriodSpec, WeekDay};
use crate::resources::{ClassSection, Room, Subject, Teacher};
use crate::store::ResourceLoader;

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Deserialize)]
struct SchoolConfigFile {
    #[serde(default)]
    subjects: Vec<Subject>,
    #[serde(default)]
    teachers: Vec<Teacher>,
    #[serde(default)]
    rooms: Vec<Room>,
    #[serde(default)]
    class_sections: Vec<ClassSection>,
    timetable: Option<BTreeMap<WeekDay, DayEntry>>,
}

/// One day of the `timetable` section.  `start` stays a string until it is
/// parsed so a bad value is reported with the day it belongs to.
#[derive(Debug, Deserialize)]
struct DayEntry {
    start: String,
    #[serde(default)]
    periods: Vec<PeriodSpec>,
}

// ── SchoolConfigManager ───────────────────────────────────────────────────────

/// Loads the resource pools and the weekly timetable from a YAML file.
#[derive(Debug, Default)]
pub struct SchoolConfigManager {
    subjects: Vec<Subject>,
    teachers: Vec<Teacher>,
    rooms: Vec<Room>,
    class_sections: Vec<ClassSection>,
    /// School days only.
    templates: BTreeMap<WeekDay, DayTemplate>,

    /// Set to `true` after a successful [`load_from_file`](Self::load_from_file).
    loaded: bool,
}

impl SchoolConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `path` and replaces everything previously loaded.
    ///
    /// Every day template is expanded once here, so an impossible day (no
    /// periods, zero-length period, past midnight) fails the load instead of
    /// the later allocation run.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, the YAML is structurally
    /// invalid, or a day template is malformed.
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        info!("Loading school configuration from: {}", path.display());

        // Reset state before (re-)loading
        *self = Self::default();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let file: SchoolConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        let templates = match file.timetable {
            Some(days) => Self::parse_timetable(days)?,
            None => {
                warn!("No timetable section in configuration, using the standard week");
                DayTemplate::standard_week()
                    .into_iter()
                    .map(|t| (t.day, t))
                    .collect()
            }
        };

        for template in templates.values() {
            template
                .build_slots()
                .with_context(|| format!("Invalid timetable for {}", template.day))?;
        }

        *self = Self {
            subjects: file.subjects,
            teachers: file.teachers,
            rooms: file.rooms,
            class_sections: file.class_sections,
            templates,
            loaded: true,
        };

        info!(
            subjects = self.subjects.len(),
            teachers = self.teachers.len(),
            rooms = self.rooms.len(),
            class_sections = self.class_sections.len(),
            school_days = self.templates.len(),
            "Successfully loaded school configuration"
        );
        for template in self.templates.values() {
            debug!(
                "  {}: starts {} | {} period(s)",
                template.day,
                format_hhmm(template.start),
                template.periods.len(),
            );
        }

        Ok(())
    }

    fn parse_timetable(
        days: BTreeMap<WeekDay, DayEntry>,
    ) -> Result<BTreeMap<WeekDay, DayTemplate>> {
        days.into_iter()
            .map(|(day, entry)| {
                let start = parse_hhmm(&entry.start)
                    .with_context(|| format!("Invalid start time for {day}"))?;
                Ok((
                    day,
                    DayTemplate {
                        day,
                        start,
                        periods: entry.periods,
                    },
                ))
            })
            .collect()
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn class_sections(&self) -> &[ClassSection] {
        &self.class_sections
    }

    /// Template of `day`, or `None` if `day` is not a school day.
    pub fn day_template(&self, day: WeekDay) -> Option<&DayTemplate> {
        self.templates.get(&day)
    }

    /// Returns `true` after a successful call to [`load_from_file`](Self::load_from_file).
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn ensure_loaded(&self) -> Result<()> {
        if !self.loaded {
            bail!("school configuration has not been loaded");
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceLoader for SchoolConfigManager {
    async fn load_subjects(&self) -> Result<Vec<Subject>> {
        self.ensure_loaded()?;
        Ok(self.subjects.clone())
    }

    async fn load_teachers(&self) -> Result<Vec<Teacher>> {
        self.ensure_loaded()?;
        Ok(self.teachers.clone())
    }

    async fn load_rooms(&self) -> Result<Vec<Room>> {
        self.ensure_loaded()?;
        Ok(self.rooms.clone())
    }

    async fn load_class_sections(&self) -> Result<Vec<ClassSection>> {
        self.ensure_loaded()?;
        Ok(self.class_sections.clone())
    }

    async fn load_slot_catalog(&self, day: WeekDay) -> Result<Option<DayTemplate>> {
        self.ensure_loaded()?;
        Ok(self.templates.get(&day).cloned())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
