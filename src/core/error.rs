//! Error types for configuration, scheduling, repository and execution.

use std::path::PathBuf;

use thiserror::Error;

use super::DriverState;

/// Invalid or unreadable configuration. Always fatal, raised before any
/// repository interaction.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more validation failures.
    #[error("Configuration errors:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),

    /// A date that is not `YYYY-MM-DD`.
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Start date after end date.
    #[error("Start date {start} must be before or equal to end date {end}")]
    InvertedRange { start: String, end: String },

    /// Config file could not be read.
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema.
    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors raised while building a schedule.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Requested template does not exist. Callers usually fall back to
    /// organic generation.
    #[error("Pattern \"{name}\" not found. Available patterns: {}", .available.join(", "))]
    PatternNotFound { name: String, available: Vec<String> },

    /// A pattern matrix that cannot be applied.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

impl ScheduleError {
    /// Whether the caller can recover by generating a different schedule.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::PatternNotFound { .. })
    }
}

/// Repository backend failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The working directory is not inside a repository.
    #[error("Not a Git repository: {}. Please run \"git init\" first.", .0.display())]
    NotARepository(PathBuf),

    /// Repository has no working tree (bare repository).
    #[error("Repository at {} has no working directory", .0.display())]
    Bare(PathBuf),

    /// No author identity could be determined.
    #[error("No commit author configured: set user.name/user.email or [git] author_name/author_email")]
    MissingSignature,

    /// Underlying libgit2 error.
    #[cfg(feature = "git")]
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// I/O error while writing the payload or spawning git.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload serialization failed.
    #[error("Failed to serialize payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// `git push` exited unsuccessfully.
    #[error("Push to {remote}/{branch} failed: {message}")]
    Push { remote: String, branch: String, message: String },

    /// Any other backend-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Errors from the execution driver itself.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The driver was asked to do something its current state forbids.
    #[error("Execution driver is {state}; cannot {action}")]
    InvalidState { state: DriverState, action: &'static str },

    /// Planning failed.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}
