//! Core types and functionality for Graphsmith.
//!
//! This module contains the calendar model, the schedule generators, the
//! preview renderer, configuration, and the execution driver that replays a
//! schedule against a repository backend.

mod backend;
pub mod calendar;
mod config;
mod driver;
mod error;
mod generator;
mod preview;
mod retry;
mod schedule;

pub use backend::{ChangeRequest, CommitPayload, RepoState, RepositoryBackend};
pub use calendar::{is_weekend, parse_date, weekday_index, DateRange, DATE_FORMAT};
pub use config::{
    Config, ConfigOverrides, GenerationMode, GitConfig, RunConfig, ScheduleConfig,
    ValidatedConfig, LOCAL_CONFIG_FILE,
};
pub use driver::{
    commit_timestamp, AbortToken, DriverOptions, DriverState, ExecutionDriver, ExecutionEvent,
    ExecutionStats, PublishOutcome,
};
pub use error::{ConfigError, ExecutionError, RepositoryError, ScheduleError};
pub use generator::{
    generate_burst_periods, weekday_multiplier, BurstPeriod, GeneratedSchedule,
    GenerationConfig, ScheduleGenerator, ScheduleSource,
};
pub use preview::{preview_schedule, render_grid, render_stats};
pub use retry::{retry, RetryPolicy, RetryResult};
pub use schedule::{Schedule, ScheduleEntry, ScheduleStats};
