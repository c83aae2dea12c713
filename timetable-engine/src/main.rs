/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, error, info, warn};

use tokio_util::sync::CancellationToken;

use timetable_engine::allocator::{Allocator, RandomPicker, RoundRobinPicker, SubjectPicker};
use timetable_engine::assignment::{Cell, Timetable};
use timetable_engine::catalog::clock::format_hhmm;
use timetable_engine::catalog::{SlotCatalog, SlotKind};
use timetable_engine::config::SchoolConfigManager;
use timetable_engine::resources::ResourcePools;
use timetable_engine::store::{AssignmentStore, MemoryStore, YamlFileStore};

// ── CLI argument definition ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// Uniform random subject per lesson slot.
    Random,
    /// Cycle through the subjects in id order.
    RoundRobin,
}

/// Weekly school timetable allocator.
///
/// Example:
///   timetable-engine --config school.yaml --output timetable.yaml --seed 7
#[derive(Debug, Parser)]
#[command(
    name = "timetable-engine",
    about = "Allocate a week of lessons to teachers and rooms",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML school configuration file.
    #[arg(short = 'c', long = "config")]
    config: PathBuf,

    /// Timetable file to extend.  Without it the result is kept in memory and
    /// only logged.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Discard whatever the output file already holds.
    #[arg(long = "fresh", default_value_t = false, requires = "output")]
    fresh: bool,

    /// Subject selection policy.
    #[arg(short = 'p', long = "policy", value_enum, default_value_t = Policy::Random)]
    policy: Policy,

    /// Seed for the random policy (reproducible runs).
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,
}

impl Cli {
    fn picker(&self) -> Box<dyn SubjectPicker> {
        match (self.policy, self.seed) {
            (Policy::RoundRobin, seed) => {
                if seed.is_some() {
                    warn!("--seed has no effect with the round-robin policy");
                }
                Box::new(RoundRobinPicker::new())
            }
            (Policy::Random, Some(seed)) => Box::new(RandomPicker::seeded(seed)),
            (Policy::Random, None) => Box::new(RandomPicker::from_os_rng()),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Timetable engine starting up...");

    let cli = Cli::parse();

    info!(
        config = %cli.config.display(),
        output = ?cli.output,
        fresh  = cli.fresh,
        policy = ?cli.policy,
        seed   = ?cli.seed,
        "Configuration"
    );

    if let Err(e) = run(cli).await {
        error!("Allocation failed: {:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // ── Load school configuration ─────────────────────────────────────────────
    let mut config = SchoolConfigManager::new();
    config.load_from_file(&cli.config)?;

    // Ctrl-C stops the run after the class section in progress
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping after the current class section");
                cancel.cancel();
            }
        }
    });

    let mut allocator = Allocator::load(&config, cli.picker())
        .await?
        .with_cancellation(cancel);

    // ── Open the assignment store ─────────────────────────────────────────────
    let mut store: Box<dyn AssignmentStore> = match &cli.output {
        Some(path) if cli.fresh => Box::new(YamlFileStore::fresh(path)),
        Some(path) => Box::new(YamlFileStore::open(path).await?),
        None => {
            warn!("No output file given, the timetable will not be saved");
            Box::new(MemoryStore::new())
        }
    };

    let existing = store
        .load_assignments()
        .await
        .context("reading existing assignments")?;
    if !existing.is_empty() {
        info!(
            assignments = existing.len(),
            "extending existing timetable, occupied slots are kept"
        );
    }
    let mut tracker = allocator.seed_tracker(&existing).context(
        "existing timetable no longer matches the configuration (rerun with --fresh to start over)",
    )?;

    // ── Allocate ──────────────────────────────────────────────────────────────
    let report = allocator.run(&mut tracker, store.as_mut()).await?;
    if report.cancelled {
        warn!(
            assigned = report.assigned(),
            "Run cancelled, remaining class sections were not allocated"
        );
    }

    for free in &report.free_periods {
        debug!(
            class = free.key.class_section,
            day = %free.key.day,
            slot = free.key.slot_index,
            subject = free.subject,
            "free period: {}",
            free.reason
        );
    }

    // ── Print the resulting timetable ─────────────────────────────────────────
    let all = store.load_assignments().await?;
    let timetable = Timetable::new(allocator.catalog(), &all);
    print_timetable(allocator.pools(), allocator.catalog(), &timetable);

    info!(
        assigned = report.assigned(),
        substitutes = report.substitutes,
        free_periods = report.free_periods.len(),
        total_stored = all.len(),
        "Done"
    );
    Ok(())
}

fn print_timetable(pools: &ResourcePools, catalog: &SlotCatalog, timetable: &Timetable<'_>) {
    for class in pools.all_class_sections() {
        info!(
            "[{}] level {} | {} lesson(s), {} free period(s)",
            class.name,
            class.level,
            timetable.lessons(class.id).count(),
            timetable.free_periods(class.id),
        );
        for day in catalog.days() {
            for row in timetable.day(class.id, day) {
                let what = match row.cell {
                    Cell::Lesson(a) => format!(
                        "{} | {} | {}",
                        pools.subject(a.subject).map_or("?", |s| s.name.as_str()),
                        pools.teacher(a.teacher).map_or("?", |t| t.name.as_str()),
                        pools.room(a.room).map_or("?", |r| r.code.as_str()),
                    ),
                    Cell::FreePeriod => "(free period)".to_string(),
                    Cell::Closed(SlotKind::Break) => "-- break --".to_string(),
                    Cell::Closed(SlotKind::Ceremony) => "-- ceremony --".to_string(),
                    Cell::Closed(SlotKind::Lesson) => String::new(),
                };
                debug!(
                    "  {:<9} #{:<2} {}-{}  {}",
                    day.as_str(),
                    row.slot.index,
                    format_hhmm(row.slot.start),
                    format_hhmm(row.slot.end),
                    what,
                );
            }
        }
    }
}
