//! Playlist timeline scheduler.
//!
//! One run takes a clip catalog through five stages, each a plain function
//! over the previous stage's output:
//!
//! 1. [`classify`] splits fillers, flexible and fixed-window clips and
//!    computes the filler rate.
//! 2. [`build_filler_pool`] cycles fillers to cover the free time.
//! 3. [`pack_flexible`] lays out flexible occurrences from midnight.
//! 4. [`insert_windows`] splices fixed-window occurrences at their targets.
//! 5. [`interleave_fillers`] spreads the filler pool through the result.

use crate::classifier::classify;
use crate::clip::{ClipSpec, Window};
use crate::clock::{self, SECONDS_PER_DAY};
use crate::config::SchedulerConfig;
use crate::error::{ScheduleError, ScheduleResult};
use crate::filler_pool::build_filler_pool;
use crate::interleaver::interleave_fillers;
use crate::packer::pack_flexible;
use crate::timeline::TimelineEntry;
use crate::window_inserter::insert_windows;
use serde::Serialize;
use std::thread;

/// Runs the scheduling pipeline. Holds only configuration, so one instance
/// can serve independent runs from several threads.
#[derive(Debug, Clone)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> ScheduleResult<Self> {
        config.validate()?;
        Ok(Scheduler { config })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Build the day's timeline for `catalog`.
    pub fn run(&self, catalog: &[ClipSpec]) -> ScheduleResult<Schedule> {
        let total = self.config.total_duration_secs;

        let classified = classify(catalog, total)?;
        let pool = build_filler_pool(&classified.fillers, classified.committed_secs, total)?;
        let mut timeline = pack_flexible(&classified.flexible, self.config.batch_size);
        insert_windows(&mut timeline, &classified.fixed);
        let stats = interleave_fillers(&mut timeline, pool, classified.filler_rate);

        let end = timeline.end();
        if end > SECONDS_PER_DAY {
            return Err(ScheduleError::DayOverflow {
                end: u64::from(end),
            });
        }

        let schedule = Schedule {
            entries: timeline.into_entries(),
            committed_secs: classified.committed_secs,
            filler_rate: classified.filler_rate,
            fillers_inserted: stats.inserted,
            fillers_discarded: stats.discarded,
        };

        let misses = schedule.window_misses();
        for miss in &misses {
            log::warn!(
                "'{}' airs at {}, outside its window {}",
                miss.clip,
                clock::to_clock_string(miss.start),
                miss.window
            );
        }
        if self.config.strict_windows
            && let Some(miss) = misses.into_iter().next()
        {
            return Err(ScheduleError::WindowMissed {
                clip: miss.clip,
                start: clock::to_clock_string(miss.start),
                window: miss.window.to_string(),
            });
        }

        log::info!(
            "Scheduled {} entries ending at {} ({} filler(s), rate {})",
            schedule.len(),
            clock::to_clock_string(schedule.end_secs()),
            schedule.fillers_inserted,
            schedule.filler_rate
        );
        Ok(schedule)
    }

    /// Schedule several independent catalogs in parallel, one thread each.
    pub fn run_many(&self, catalogs: &[Vec<ClipSpec>]) -> Vec<ScheduleResult<Schedule>> {
        thread::scope(|scope| {
            let handles: Vec<_> = catalogs
                .iter()
                .map(|catalog| scope.spawn(move || self.run(catalog)))
                .collect();
            handles
                .into_iter()
                .map(|h| match h.join() {
                    Ok(result) => result,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }
}

/// A finished day: the timeline plus the figures that shaped it.
#[derive(Debug, Clone)]
pub struct Schedule {
    entries: Vec<TimelineEntry>,
    pub committed_secs: u64,
    pub filler_rate: usize,
    pub fillers_inserted: usize,
    pub fillers_discarded: usize,
}

/// One output row, keyed by its "HH:MM:SS-HH:MM:SS" window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleRow {
    pub window: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub duration: u32,
}

/// Per-clip totals across the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub occurrences: usize,
    pub airtime_secs: u32,
}

/// A fixed-window occurrence that did not start inside its window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowMiss {
    pub clip: String,
    pub start: u32,
    pub window: Window,
}

/// Type label used for dead-air rows.
pub const SILENCE_TYPE: &str = "Silence";

impl Schedule {
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn end_secs(&self) -> u32 {
        self.entries.last().map(|e| e.end).unwrap_or(0)
    }

    pub fn silence_secs(&self) -> u32 {
        self.entries
            .iter()
            .filter(|e| e.is_silence())
            .map(|e| e.duration())
            .sum()
    }

    /// Number of entries airing the clip called `name`.
    pub fn count_of(&self, name: &str) -> usize {
        self.entries
            .iter()
            .filter(|e| e.clip().is_some_and(|c| c.name == name))
            .count()
    }

    pub fn rows(&self) -> Vec<ScheduleRow> {
        self.entries
            .iter()
            .map(|e| match e.clip() {
                Some(clip) => ScheduleRow {
                    window: e.window_key(),
                    name: clip.name.clone(),
                    kind: clip.type_label().to_string(),
                    duration: clip.duration,
                },
                None => ScheduleRow {
                    window: e.window_key(),
                    name: String::new(),
                    kind: SILENCE_TYPE.to_string(),
                    duration: e.duration(),
                },
            })
            .collect()
    }

    /// Totals per clip, in order of first airing.
    pub fn summary(&self) -> Vec<ClipSummary> {
        let mut out: Vec<ClipSummary> = Vec::new();
        for clip in self.entries.iter().filter_map(TimelineEntry::clip) {
            match out.iter_mut().find(|s| s.name == clip.name) {
                Some(s) => {
                    s.occurrences += 1;
                    s.airtime_secs += clip.duration;
                }
                None => out.push(ClipSummary {
                    name: clip.name.clone(),
                    kind: clip.type_label().to_string(),
                    occurrences: 1,
                    airtime_secs: clip.duration,
                }),
            }
        }
        out
    }

    pub fn window_misses(&self) -> Vec<WindowMiss> {
        self.entries
            .iter()
            .filter_map(|e| {
                let occ = e.occurrence()?;
                let window = occ.clip.window?;
                (!window.contains(e.start)).then(|| WindowMiss {
                    clip: occ.clip.name.clone(),
                    start: e.start,
                    window,
                })
            })
            .collect()
    }
}
