/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Timetable engine – weekly lesson slot allocator
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── catalog/        – weekdays, day templates, validated slot catalog
//! ├── resources       – subject / teacher / room / class-section pools
//! ├── assignment      – committed lessons and the timetable grid view
//! ├── allocator/      – greedy allocation pass, conflict tracker, pickers
//! ├── store/          – loader / store traits, memory and YAML file stores
//! └── config/         – YAML school configuration
//! ```

pub mod allocator;
pub mod assignment;
pub mod catalog;
pub mod config;
pub mod resources;
pub mod store;
