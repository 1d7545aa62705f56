//! The repository backend seam.
//!
//! The execution driver never touches a repository directly; it talks to a
//! [`RepositoryBackend`], which owns staging, committing, pushing and the
//! retry policy for each of those operations.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use super::RepositoryError;

/// Repository status reported by [`RepositoryBackend::initialize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoState {
    /// Path to the working tree root
    pub root: PathBuf,

    /// Current branch name (None if detached or unborn without a name)
    pub branch: Option<String>,

    /// Whether the working directory is clean
    pub is_clean: bool,

    /// Commits ahead of upstream
    pub ahead: usize,

    /// Commits behind upstream
    pub behind: usize,

    /// Whether the configured remote exists
    pub has_remote: bool,

    /// URL of the configured remote, when present
    pub remote_url: Option<String>,
}

impl RepoState {
    /// Get a display string for the branch (or "HEAD" if detached).
    pub fn branch_display(&self) -> &str {
        self.branch.as_deref().unwrap_or("HEAD")
    }
}

/// Content written to the data file for each commit.
///
/// It only exists so consecutive commits differ; nothing reads it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitPayload {
    /// Logical calendar date of the commit
    pub date: NaiveDate,

    /// 1-based position within the day
    pub commit_index: u32,

    /// Commits planned for the day
    pub total_commits: u32,

    /// Commit timestamp (RFC 3339)
    pub timestamp: String,

    /// Random identifier
    pub id: String,
}

/// One change for the backend to record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRequest {
    /// Data file content
    pub payload: CommitPayload,

    /// Commit message
    pub message: String,

    /// Author and committer time, overriding the wall clock
    pub timestamp: DateTime<FixedOffset>,
}

/// Stage/commit/push operations consumed by the execution driver.
///
/// Implementations retry each mutating operation according to their own
/// policy and only return an error once that policy is exhausted.
pub trait RepositoryBackend {
    /// Validate the repository and report its state. Fails if the target is
    /// not a repository; a missing remote is only a warning.
    fn initialize(&mut self) -> Result<RepoState, RepositoryError>;

    /// Write the payload, stage it and commit with the request's message and
    /// timestamp. Must succeed even when the content did not change.
    fn record_change(&mut self, change: &ChangeRequest) -> Result<(), RepositoryError>;

    /// Push the active branch, setting upstream tracking if absent.
    fn publish(&mut self) -> Result<(), RepositoryError>;
}

impl<B: RepositoryBackend + ?Sized> RepositoryBackend for &mut B {
    fn initialize(&mut self) -> Result<RepoState, RepositoryError> {
        (**self).initialize()
    }

    fn record_change(&mut self, change: &ChangeRequest) -> Result<(), RepositoryError> {
        (**self).record_change(change)
    }

    fn publish(&mut self) -> Result<(), RepositoryError> {
        (**self).publish()
    }
}
