/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! YAML file-backed assignment store.
//!
//! Saves are upserted into memory; [`flush`](AssignmentStore::flush) writes
//! the whole document atomically (write to a temp file, then rename).  A crash
//! between flushes loses only the unflushed tail, never corrupts the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::AssignmentStore;
use crate::assignment::{Assignment, AssignmentKey};

/// Persisted file format version.
const FILE_VERSION: u32 = 1;

/// On-disk document.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedTimetable {
    version: u32,
    #[serde(default)]
    assignments: Vec<Assignment>,
}

/// Assignment store backed by a single YAML document.
#[derive(Debug)]
pub struct YamlFileStore {
    path: PathBuf,
    assignments: BTreeMap<AssignmentKey, Assignment>,
    dirty: bool,
}

impl YamlFileStore {
    /// Open `path`, loading any assignments it already holds.
    ///
    /// A missing file is an empty store.  A file written by a different format
    /// version is ignored with a warning.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut store = Self {
            path,
            assignments: BTreeMap::new(),
            dirty: false,
        };

        if !tokio::fs::try_exists(&store.path).await.unwrap_or(false) {
            debug!(path = %store.path.display(), "no timetable file, starting empty");
            return Ok(store);
        }

        let content = tokio::fs::read_to_string(&store.path)
            .await
            .with_context(|| format!("Failed to read timetable file: {}", store.path.display()))?;

        let doc: PersistedTimetable = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse timetable file: {}", store.path.display()))?;

        if doc.version != FILE_VERSION {
            warn!(
                file_version = doc.version,
                current_version = FILE_VERSION,
                "timetable file version mismatch, starting empty"
            );
            return Ok(store);
        }

        store.assignments = doc
            .assignments
            .into_iter()
            .map(|a| (a.key(), a))
            .collect();

        info!(
            path = %store.path.display(),
            assignments = store.assignments.len(),
            "loaded timetable file"
        );
        Ok(store)
    }

    /// Open `path` discarding whatever it holds.  The file is only replaced on
    /// the next flush.
    pub fn fresh(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            assignments: BTreeMap::new(),
            dirty: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    async fn write_atomically(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        let doc = PersistedTimetable {
            version: FILE_VERSION,
            assignments: self.assignments.values().cloned().collect(),
        };
        let content = serde_yaml::to_string(&doc).context("Failed to serialize timetable")?;

        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, &content)
            .await
            .with_context(|| format!("Failed to write temp file: {}", tmp_path.display()))?;

        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| {
                format!(
                    "Failed to rename {} -> {}",
                    tmp_path.display(),
                    self.path.display()
                )
            })?;

        Ok(())
    }
}

#[async_trait]
impl AssignmentStore for YamlFileStore {
    async fn save_assignment(&mut self, assignment: &Assignment) -> Result<()> {
        self.assignments.insert(assignment.key(), assignment.clone());
        self.dirty = true;
        Ok(())
    }

    async fn load_assignments(&self) -> Result<Vec<Assignment>> {
        Ok(self.assignments.values().cloned().collect())
    }

    async fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.write_atomically().await?;
        self.dirty = false;
        info!(
            path = %self.path.display(),
            assignments = self.assignments.len(),
            "timetable file written"
        );
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::WeekDay;
    use chrono::NaiveTime;
    use tempfile::tempdir;

    fn assignment(class_section: u32, slot_index: usize) -> Assignment {
        Assignment {
            class_section,
            subject: 2,
            teacher: 5,
            room: 9,
            day: WeekDay::Thursday,
            slot_index,
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(9, 45, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn missing_file_opens_empty() {
        let dir = tempdir().unwrap();
        let store = YamlFileStore::open(dir.path().join("tt.yaml")).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn flush_then_reopen_restores_assignments() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("tt.yaml");

        let mut store = YamlFileStore::open(&path).await.unwrap();
        store.save_assignment(&assignment(1, 1)).await.unwrap();
        store.save_assignment(&assignment(2, 1)).await.unwrap();
        store.flush().await.unwrap();
        assert!(!path.with_extension("tmp").exists(), "temp file renamed away");

        let reopened = YamlFileStore::open(&path).await.unwrap();
        let loaded = reopened.load_assignments().await.unwrap();
        assert_eq!(loaded, vec![assignment(1, 1), assignment(2, 1)]);
    }

    #[tokio::test]
    async fn unflushed_saves_are_not_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tt.yaml");
        let mut store = YamlFileStore::open(&path).await.unwrap();
        store.save_assignment(&assignment(1, 1)).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn fresh_discards_previous_content_on_flush() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tt.yaml");

        let mut first = YamlFileStore::open(&path).await.unwrap();
        first.save_assignment(&assignment(1, 1)).await.unwrap();
        first.flush().await.unwrap();

        let mut fresh = YamlFileStore::fresh(&path);
        assert!(fresh.load_assignments().await.unwrap().is_empty());
        fresh.flush().await.unwrap();

        let reopened = YamlFileStore::open(&path).await.unwrap();
        assert!(reopened.is_empty());
    }

    #[tokio::test]
    async fn version_mismatch_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tt.yaml");
        std::fs::write(&path, "version: 99\nassignments: []\n").unwrap();
        let store = YamlFileStore::open(&path).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tt.yaml");
        std::fs::write(&path, "this is: not: valid: yaml:::").unwrap();
        assert!(YamlFileStore::open(&path).await.is_err());
    }
}
