//! storecast: playlist timeline scheduler for retail-store audio broadcasts.
//!
//! Turns a catalog of clips (repeat counts, durations, optional broadcast
//! windows) into one contiguous timeline for the broadcast day.
//! The CLI consumes this crate.

pub mod classifier;
pub mod clip;
pub mod clock;
pub mod config;
pub mod error;
pub mod filler_pool;
pub mod interleaver;
pub mod packer;
pub mod scheduler;
pub mod timeline;
pub mod window_inserter;

pub use clip::{ClipDescriptor, ClipKind, ClipSpec, Window, parse_catalog};
pub use config::SchedulerConfig;
pub use error::{ScheduleError, ScheduleResult};
pub use scheduler::{Schedule, ScheduleRow, Scheduler};
pub use timeline::{Occurrence, Slot, Timeline, TimelineEntry};
