//! Git repository backend.
//!
//! Implements [`RepositoryBackend`] on top of libgit2 for status, staging and
//! committing. Pushing shells out to the `git` binary so the user's
//! credential helpers and SSH configuration apply unchanged.

use std::path::{Path, PathBuf};
use std::process::Command;

use git2::{BranchType, ErrorCode, Oid, Repository, Signature, StatusOptions, Time};
use tracing::{debug, info, warn};

use crate::core::{
    retry, ChangeRequest, GitConfig, RepoState, RepositoryBackend, RepositoryError, RetryPolicy,
};

/// A repository that dated changes are written into.
pub struct GitBackend {
    repo: Repository,
    root: PathBuf,
    remote: String,
    branch: String,
    data_file: PathBuf,
    author_name: Option<String>,
    author_email: Option<String>,
    identity: Option<(String, String)>,
    commit_policy: RetryPolicy,
    push_policy: RetryPolicy,
}

impl std::fmt::Debug for GitBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitBackend")
            .field("root", &self.root)
            .field("remote", &self.remote)
            .field("branch", &self.branch)
            .field("data_file", &self.data_file)
            .finish_non_exhaustive()
    }
}

impl GitBackend {
    /// Open the repository containing `path`.
    ///
    /// This will search up the directory tree to find a Git repository.
    pub fn discover(path: impl AsRef<Path>, config: &GitConfig) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        let repo = Repository::discover(path)
            .map_err(|_| RepositoryError::NotARepository(path.to_path_buf()))?;
        let root = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| RepositoryError::Bare(repo.path().to_path_buf()))?;

        Ok(Self {
            repo,
            root,
            remote: config.remote.clone(),
            branch: config.branch.clone(),
            data_file: config.data_file.clone(),
            author_name: config.author_name.clone(),
            author_email: config.author_email.clone(),
            identity: None,
            commit_policy: RetryPolicy::commit(),
            push_policy: RetryPolicy::push(),
        })
    }

    /// Replace the retry policies for commits and pushes.
    pub fn with_retry_policies(mut self, commit: RetryPolicy, push: RetryPolicy) -> Self {
        self.commit_policy = commit;
        self.push_policy = push;
        self
    }

    /// Get the repository root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the data file.
    pub fn data_path(&self) -> PathBuf {
        self.root.join(&self.data_file)
    }

    /// Get the current branch name (None if detached).
    pub fn current_branch(&self) -> Option<String> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => head.shorthand().map(String::from),
            Ok(_) => None,
            // Unborn branch: HEAD points at a ref that has no commits yet
            Err(_) => self
                .repo
                .find_reference("HEAD")
                .ok()
                .and_then(|r| r.symbolic_target().map(String::from))
                .map(|target| target.trim_start_matches("refs/heads/").to_string()),
        }
    }

    /// Get the URL of the configured remote.
    pub fn remote_url(&self) -> Option<String> {
        self.repo.find_remote(&self.remote).ok().and_then(|r| r.url().map(String::from))
    }

    /// Get the number of commits ahead/behind the upstream.
    pub fn ahead_behind(&self) -> (usize, usize) {
        let Ok(head) = self.repo.head() else {
            return (0, 0);
        };

        let Some(local_oid) = head.target() else {
            return (0, 0);
        };

        let Some(branch_name) = head.shorthand() else {
            return (0, 0);
        };

        let Ok(branch) = self.repo.find_branch(branch_name, BranchType::Local) else {
            return (0, 0);
        };

        let Ok(upstream) = branch.upstream() else {
            return (0, 0);
        };

        let Some(upstream_oid) = upstream.get().target() else {
            return (0, 0);
        };

        self.repo.graph_ahead_behind(local_oid, upstream_oid).unwrap_or((0, 0))
    }

    /// Whether the working tree has no staged, modified or untracked files.
    pub fn is_clean(&self) -> bool {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(false)
            .include_ignored(false)
            .include_unmodified(false);

        self.repo.statuses(Some(&mut opts)).map(|s| s.is_empty()).unwrap_or(false)
    }

    /// Author name and email, from the overrides or the repository config.
    ///
    /// Blank values count as unset. The answer is cached after the first
    /// successful lookup.
    fn identity(&mut self) -> Result<(String, String), RepositoryError> {
        if let Some(identity) = &self.identity {
            return Ok(identity.clone());
        }

        let config = self.repo.config()?;
        let lookup = |preset: &Option<String>, key: &str| {
            preset
                .clone()
                .or_else(|| config.get_string(key).ok())
                .filter(|value| !value.trim().is_empty())
                .ok_or(RepositoryError::MissingSignature)
        };
        let name = lookup(&self.author_name, "user.name")?;
        let email = lookup(&self.author_email, "user.email")?;

        self.identity = Some((name.clone(), email.clone()));
        Ok((name, email))
    }

    /// Write, stage and commit once.
    fn commit_once(
        &self,
        change: &ChangeRequest,
        name: &str,
        email: &str,
    ) -> Result<Oid, RepositoryError> {
        let path = self.data_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_string_pretty(&change.payload)?)?;

        let mut index = self.repo.index()?;
        index.add_path(&self.data_file)?;
        index.write()?;
        let tree = self.repo.find_tree(index.write_tree()?)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<_> = parent.iter().collect();

        let ts = change.timestamp;
        let time = Time::new(ts.timestamp(), ts.offset().local_minus_utc() / 60);
        let signature = Signature::new(name, email, &time)?;
        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &change.message,
            &tree,
            &parents,
        )?;
        Ok(oid)
    }

    /// Run `git push --set-upstream <remote> <branch>` once.
    fn push_once(&self) -> Result<(), RepositoryError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(["push", "--set-upstream", &self.remote, &self.branch])
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()?;

        if output.status.success() {
            Ok(())
        } else {
            Err(RepositoryError::Push {
                remote: self.remote.clone(),
                branch: self.branch.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl RepositoryBackend for GitBackend {
    fn initialize(&mut self) -> Result<RepoState, RepositoryError> {
        let (name, email) = self.identity()?;
        debug!("Committing as {} <{}>", name, email);

        let branch = self.current_branch();
        let remote_url = self.remote_url();
        let (ahead, behind) = self.ahead_behind();

        if remote_url.is_none() {
            warn!("Remote '{}' is not configured; pushing will fail", self.remote);
        }
        match &branch {
            Some(current) if current != &self.branch => warn!(
                "Current branch '{}' differs from configured branch '{}'",
                current, self.branch
            ),
            None => warn!("HEAD is detached"),
            _ => {}
        }

        let state = RepoState {
            root: self.root.clone(),
            branch,
            is_clean: self.is_clean(),
            ahead,
            behind,
            has_remote: remote_url.is_some(),
            remote_url,
        };
        info!("Repository at {} on {}", state.root.display(), state.branch_display());
        Ok(state)
    }

    fn record_change(&mut self, change: &ChangeRequest) -> Result<(), RepositoryError> {
        let (name, email) = self.identity()?;
        let outcome =
            retry(&self.commit_policy, "commit", || self.commit_once(change, &name, &email));
        if outcome.was_retried() {
            debug!("Commit at {} needed {} attempts", change.timestamp, outcome.attempts);
        }
        let oid = outcome.into_result()?;
        debug!("Committed {} at {}", oid, change.timestamp);
        Ok(())
    }

    fn publish(&mut self) -> Result<(), RepositoryError> {
        retry(&self.push_policy, "push", || self.push_once()).into_result()?;
        info!("Pushed {} to {}", self.branch, self.remote);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CommitPayload;
    use chrono::{DateTime, NaiveDate};

    fn init_repo(dir: &Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
        repo
    }

    fn change(date: &str, time: &str, index: u32) -> ChangeRequest {
        let timestamp = DateTime::parse_from_rfc3339(&format!("{}T{}+02:00", date, time)).unwrap();
        ChangeRequest {
            payload: CommitPayload {
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                commit_index: index,
                total_commits: 2,
                timestamp: timestamp.to_rfc3339(),
                id: format!("id-{}", index),
            },
            message: format!("Update contribution [{}] ({}/2)", date, index),
            timestamp,
        }
    }

    #[test]
    fn test_discover_outside_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = GitBackend::discover(dir.path(), &GitConfig::default()).unwrap_err();
        assert!(matches!(err, RepositoryError::NotARepository(_)));
    }

    #[test]
    fn test_record_change_uses_request_time() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        let mut backend = GitBackend::discover(dir.path(), &GitConfig::default())
            .unwrap()
            .with_retry_policies(RetryPolicy::no_retry(), RetryPolicy::no_retry());

        let request = change("2024-03-05", "10:15:00", 1);
        backend.record_change(&request).unwrap();

        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.time().seconds(), request.timestamp.timestamp());
        assert_eq!(head.time().offset_minutes(), 120);
        assert_eq!(head.author().when().seconds(), request.timestamp.timestamp());
        assert_eq!(head.message(), Some(request.message.as_str()));
        assert!(backend.data_path().exists());
    }

    #[test]
    fn test_commits_chain_on_head() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        let mut backend = GitBackend::discover(dir.path(), &GitConfig::default()).unwrap();

        backend.record_change(&change("2024-03-05", "10:15:00", 1)).unwrap();
        backend.record_change(&change("2024-03-05", "11:00:00", 2)).unwrap();

        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.parent_count(), 1);
    }

    #[test]
    fn test_identical_content_still_commits() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        let mut backend = GitBackend::discover(dir.path(), &GitConfig::default()).unwrap();

        let request = change("2024-03-05", "10:15:00", 1);
        backend.record_change(&request).unwrap();
        let first = repo.head().unwrap().target().unwrap();
        backend.record_change(&request).unwrap();
        let second = repo.head().unwrap().target().unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_initialize_reports_missing_remote() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        let mut backend = GitBackend::discover(dir.path(), &GitConfig::default()).unwrap();

        let state = backend.initialize().unwrap();
        assert!(!state.has_remote);
        assert!(state.remote_url.is_none());
        assert!(state.is_clean);
    }

    #[test]
    fn test_author_override() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        let config = GitConfig {
            author_name: Some("Painter".into()),
            author_email: Some("painter@example.com".into()),
            ..GitConfig::default()
        };
        let mut backend = GitBackend::discover(dir.path(), &config).unwrap();

        backend.record_change(&change("2024-03-05", "10:15:00", 1)).unwrap();

        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.author().name(), Some("Painter"));
    }

    #[test]
    fn test_blank_identity_fails_without_retrying() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "").unwrap();
        config.set_str("user.email", "").unwrap();
        let mut backend = GitBackend::discover(dir.path(), &GitConfig::default()).unwrap();

        let err = backend.initialize().unwrap_err();
        assert!(matches!(err, RepositoryError::MissingSignature));

        let started = std::time::Instant::now();
        let err = backend.record_change(&change("2024-03-05", "10:15:00", 1)).unwrap_err();
        assert!(matches!(err, RepositoryError::MissingSignature));
        assert!(started.elapsed() < std::time::Duration::from_millis(400));
        assert!(repo.head().is_err());
    }
}
