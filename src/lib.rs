#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_possible_truncation)]

//! # Graphsmith
//!
//! Paint your contribution calendar.
//!
//! Graphsmith plans a day-by-day commit schedule over a date range and then
//! replays it against a Git repository, back-dating every commit so the
//! hosting service's contribution graph shows the intended picture.
//!
//! ## Features
//!
//! - **Organic activity**: weekday-weighted, bursty schedules that look lived in
//! - **Random activity**: independent uniform draws per day
//! - **Patterns**: named pixel-art templates tiled across the calendar
//! - **Text**: a 5x7 glyph font spells words into the grid
//! - **Previews**: a terminal rendering of the calendar before anything is written
//! - **Abortable runs**: Ctrl+C stops between commits and still reports statistics
//!
//! ## Quick Start
//!
//! ```bash
//! # Preview a year of organic activity
//! graphsmith preview --start 2024-01-01 --end 2024-12-31
//!
//! # Spell a word into the current repository, without pushing
//! graphsmith run --text HI --no-push
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod core;
pub mod patterns;

#[cfg(feature = "git")]
pub mod git;

#[cfg(feature = "git")]
pub use git::GitBackend;

// Re-export commonly used types
pub use core::{
    AbortToken, Config, DateRange, ExecutionDriver, ExecutionStats, RepositoryBackend, Schedule,
    ScheduleGenerator, ScheduleSource,
};
pub use patterns::{ContributionLevel, PatternMatrix};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "graphsmith";
