//! Plan execution.
//!
//! The [`ExecutionDriver`] walks a [`Schedule`] in chronological order and
//! asks a [`RepositoryBackend`] to record one dated change per planned
//! commit. Exactly one backend operation is in flight at a time.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use rand::Rng;
use tracing::{debug, error, info, warn};

use super::{
    ChangeRequest, CommitPayload, ExecutionError, GeneratedSchedule, RepositoryBackend, Schedule,
    ScheduleGenerator, ScheduleSource,
};

/// Verbs used to vary commit messages.
const MESSAGE_VERBS: [&str; 10] = [
    "Update", "Refactor", "Improve", "Add", "Enhance", "Optimize", "Fix", "Revise", "Modify",
    "Polish",
];

/// Commits are placed between 08:00 and 21:59:59 local time.
const COMMIT_HOURS: std::ops::Range<u32> = 8..22;

/// Cooperative, set-once cancellation flag.
///
/// Cloning shares the flag, so a clone can be handed to a signal handler
/// while the driver keeps polling its own copy.
#[derive(Debug, Clone, Default)]
pub struct AbortToken {
    flag: Arc<AtomicBool>,
}

impl AbortToken {
    /// Create an unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Lifecycle of a driver. `Aborted` and `Completed` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Nothing has happened yet
    Idle,
    /// A plan is being (or has been) generated
    Planning,
    /// Commits are being recorded
    Running,
    /// Stopped early by the abort token
    Aborted,
    /// Every planned day was processed
    Completed,
}

impl DriverState {
    /// Whether the driver can no longer run.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Aborted | Self::Completed)
    }
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Planning => "planning",
            Self::Running => "running",
            Self::Aborted => "aborted",
            Self::Completed => "completed",
        };
        write!(f, "{}", name)
    }
}

/// What happened to the post-run push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Push was not configured
    NotRequested,
    /// Push was configured but the run was aborted
    Skipped,
    /// Push succeeded
    Published,
    /// Push failed after all retries; the run still counts as completed
    Failed(String),
}

/// Run counters. Only the driver mutates them; callers receive copies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    /// Days processed (active + skipped)
    pub total_days: usize,
    /// Processed days with at least one planned commit
    pub active_days: usize,
    /// Processed days with nothing planned
    pub skipped_days: usize,
    /// Commits successfully recorded
    pub total_commits: u64,
    /// Days whose processing failed
    pub errors: usize,
    /// When the run started
    pub start_time: Option<DateTime<Utc>>,
    /// When the run ended
    pub end_time: Option<DateTime<Utc>>,
}

impl ExecutionStats {
    /// Wall-clock duration of the run, once finished.
    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.end_time? - self.start_time?)
    }
}

/// Progress notifications emitted while running.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    /// The run began
    Started { total_days: usize, planned_commits: u64 },
    /// A day with nothing planned was passed over
    DaySkipped { date: NaiveDate },
    /// A change was recorded
    CommitRecorded { date: NaiveDate, index: u32, total: u32, committed: u64 },
    /// A day failed and was abandoned
    DayFailed { date: NaiveDate, error: String },
    /// The abort token stopped the run
    Aborted,
    /// Push started
    Publishing,
    /// Push finished
    Published,
    /// Push failed
    PublishFailed { error: String },
    /// The run reached a terminal state
    Finished(ExecutionStats),
}

/// Tunables for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOptions {
    /// Push after a run that was not aborted
    pub push_on_complete: bool,
    /// Pause between days
    pub inter_day_delay: Duration,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self { push_on_complete: true, inter_day_delay: Duration::from_millis(10) }
    }
}

/// Serial executor of a commit plan.
pub struct ExecutionDriver<R: Rng> {
    rng: R,
    options: DriverOptions,
    abort: AbortToken,
    events: Option<Sender<ExecutionEvent>>,
    state: DriverState,
    stats: ExecutionStats,
    publish: PublishOutcome,
}

impl<R: Rng> ExecutionDriver<R> {
    /// Create an idle driver.
    pub fn new(rng: R, options: DriverOptions) -> Self {
        Self {
            rng,
            options,
            abort: AbortToken::new(),
            events: None,
            state: DriverState::Idle,
            stats: ExecutionStats::default(),
            publish: PublishOutcome::NotRequested,
        }
    }

    /// Use an externally owned abort token.
    pub fn with_abort_token(mut self, token: AbortToken) -> Self {
        self.abort = token;
        self
    }

    /// Send progress events to `sender`.
    pub fn with_events(mut self, sender: Sender<ExecutionEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// A handle that aborts this driver.
    pub fn abort_token(&self) -> AbortToken {
        self.abort.clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> ExecutionStats {
        self.stats.clone()
    }

    /// Result of the post-run push.
    pub fn publish_outcome(&self) -> &PublishOutcome {
        &self.publish
    }

    /// Generate the plan to execute, using the driver's random source.
    pub fn plan(
        &mut self,
        generator: &ScheduleGenerator,
        source: &ScheduleSource,
    ) -> Result<GeneratedSchedule, ExecutionError> {
        self.ensure_ready("plan")?;
        self.state = DriverState::Planning;
        debug!("Planning {} schedule for {}", source, generator.range());

        match generator.generate(source, &mut self.rng) {
            Ok(generated) => Ok(generated),
            Err(err) => {
                self.state = DriverState::Idle;
                Err(err.into())
            }
        }
    }

    /// Record every planned commit through `backend`.
    ///
    /// Failures of a single day are counted and logged, then the run moves on.
    /// An abort returns the counters accumulated so far; that is a normal
    /// outcome, not an error.
    pub fn execute<B: RepositoryBackend>(
        &mut self,
        plan: &Schedule,
        mut backend: B,
    ) -> Result<ExecutionStats, ExecutionError> {
        self.ensure_ready("execute")?;
        self.state = DriverState::Running;
        self.stats = ExecutionStats { start_time: Some(Utc::now()), ..ExecutionStats::default() };

        let planned = plan.stats();
        info!(
            "Executing plan for {}: {} days, {} commits",
            plan.range(),
            planned.total_days,
            planned.total_commits
        );
        self.emit(ExecutionEvent::Started {
            total_days: planned.total_days,
            planned_commits: planned.total_commits,
        });

        for entry in plan {
            if self.abort.is_aborted() {
                break;
            }

            self.stats.total_days += 1;
            if entry.commits == 0 {
                self.stats.skipped_days += 1;
                self.emit(ExecutionEvent::DaySkipped { date: entry.date });
                continue;
            }
            self.stats.active_days += 1;

            self.process_day(entry.date, entry.commits, &mut backend);

            if !self.options.inter_day_delay.is_zero() && !self.abort.is_aborted() {
                std::thread::sleep(self.options.inter_day_delay);
            }
        }

        if self.abort.is_aborted() {
            warn!("Operation aborted after {} days", self.stats.total_days);
            self.state = DriverState::Aborted;
            self.publish = if self.options.push_on_complete {
                PublishOutcome::Skipped
            } else {
                PublishOutcome::NotRequested
            };
            self.emit(ExecutionEvent::Aborted);
        } else {
            self.state = DriverState::Completed;
            if self.options.push_on_complete {
                self.publish(&mut backend);
            }
        }

        self.stats.end_time = Some(Utc::now());
        self.emit(ExecutionEvent::Finished(self.stats.clone()));
        Ok(self.stats.clone())
    }

    fn process_day<B: RepositoryBackend>(&mut self, date: NaiveDate, total: u32, backend: &mut B) {
        for index in 1..=total {
            if self.abort.is_aborted() {
                return;
            }

            let change = self.build_change(date, index, total);
            match backend.record_change(&change) {
                Ok(()) => {
                    self.stats.total_commits += 1;
                    self.emit(ExecutionEvent::CommitRecorded {
                        date,
                        index,
                        total,
                        committed: self.stats.total_commits,
                    });
                }
                Err(err) => {
                    self.stats.errors += 1;
                    error!("Failed to process {}: {}", date, err);
                    self.emit(ExecutionEvent::DayFailed { date, error: err.to_string() });
                    return;
                }
            }
        }
    }

    fn publish<B: RepositoryBackend>(&mut self, backend: &mut B) {
        self.emit(ExecutionEvent::Publishing);
        match backend.publish() {
            Ok(()) => {
                info!("Push completed successfully");
                self.publish = PublishOutcome::Published;
                self.emit(ExecutionEvent::Published);
            }
            Err(err) => {
                error!("Push failed: {}", err);
                info!("You can push manually with: git push");
                self.publish = PublishOutcome::Failed(err.to_string());
                self.emit(ExecutionEvent::PublishFailed { error: err.to_string() });
            }
        }
    }

    fn build_change(&mut self, date: NaiveDate, index: u32, total: u32) -> ChangeRequest {
        let timestamp = commit_timestamp(date, &mut self.rng);
        let id = uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid();
        let verb = MESSAGE_VERBS[self.rng.gen_range(0..MESSAGE_VERBS.len())];

        ChangeRequest {
            payload: CommitPayload {
                date,
                commit_index: index,
                total_commits: total,
                timestamp: timestamp.to_rfc3339(),
                id: id.to_string(),
            },
            message: format!("{} contribution [{}] ({}/{})", verb, date, index, total),
            timestamp,
        }
    }

    fn ensure_ready(&self, action: &'static str) -> Result<(), ExecutionError> {
        if self.state.is_terminal() || self.state == DriverState::Running {
            return Err(ExecutionError::InvalidState { state: self.state, action });
        }
        Ok(())
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(sender) = &self.events {
            // A dropped receiver only means nobody is watching.
            let _ = sender.send(event);
        }
    }
}

/// Random local time on `date` within working hours.
pub fn commit_timestamp<R: Rng>(date: NaiveDate, rng: &mut R) -> DateTime<FixedOffset> {
    let hour = rng.gen_range(COMMIT_HOURS);
    let minute = rng.gen_range(0..60);
    let second = rng.gen_range(0..60);

    let naive = date
        .and_hms_opt(hour, minute, second)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN));

    // Local times inside a DST gap do not exist; pin those to UTC.
    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => local.into(),
        None => Utc.from_utc_datetime(&naive).into(),
    }
}
