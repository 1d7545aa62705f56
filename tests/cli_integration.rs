//! CLI Integration Tests
//!
//! Tests the command-line interface end-to-end.

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Environment variables that would otherwise leak into the config layer.
const CONFIG_ENV: [&str; 10] = [
    "START_DATE",
    "END_DATE",
    "MIN_COMMITS_PER_DAY",
    "MAX_COMMITS_PER_DAY",
    "SKIP_PROBABILITY",
    "GIT_REMOTE",
    "GIT_BRANCH",
    "PATTERN_NAME",
    "DRY_RUN",
    "PUSH_ON_COMPLETE",
];

/// Get the binary to test, isolated in `dir` with an explicit config file.
fn graphsmith(dir: &assert_fs::TempDir) -> Command {
    let config = dir.child("graphsmith.toml");
    if !config.path().exists() {
        config.write_str("[run]\ninter_day_delay_ms = 0\n").unwrap();
    }

    let mut cmd = Command::cargo_bin("graphsmith").unwrap();
    cmd.current_dir(dir.path()).arg("--config").arg(config.path());
    for key in CONFIG_ENV {
        cmd.env_remove(key);
    }
    cmd
}

// ============================================================================
// Help & Version Tests
// ============================================================================

#[test]
fn test_help_flag() {
    Command::cargo_bin("graphsmith")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("contribution calendar"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("graphsmith")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_run_help_lists_schedule_flags() {
    Command::cargo_bin("graphsmith")
        .unwrap()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--no-push"))
        .stdout(predicate::str::contains("--pattern"));
}

// ============================================================================
// Patterns, Config & Completions
// ============================================================================

#[test]
fn test_patterns_lists_templates() {
    let dir = assert_fs::TempDir::new().unwrap();
    graphsmith(&dir)
        .arg("patterns")
        .assert()
        .success()
        .stdout(predicate::str::contains("heart"))
        .stdout(predicate::str::contains("wave"));
}

#[test]
fn test_patterns_show_draws_grids() {
    let dir = assert_fs::TempDir::new().unwrap();
    graphsmith(&dir)
        .args(["patterns", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("checkerboard"))
        .stdout(predicate::str::contains("      █\n       █\n      █\n"));
}

#[test]
fn test_config_prints_effective_toml() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("graphsmith.toml").write_str("[git]\nbranch = \"trunk\"\n").unwrap();

    graphsmith(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[schedule]"))
        .stdout(predicate::str::contains("branch = \"trunk\""));
}

#[test]
fn test_config_path() {
    let dir = assert_fs::TempDir::new().unwrap();
    graphsmith(&dir)
        .args(["config", "--path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("graphsmith"));
}

#[test]
fn test_completions_bash() {
    Command::cargo_bin("graphsmith")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("graphsmith"));
}

// ============================================================================
// Preview
// ============================================================================

#[test]
fn test_preview_prints_calendar_and_stats() {
    let dir = assert_fs::TempDir::new().unwrap();
    graphsmith(&dir)
        .args(["preview", "--start", "2024-01-01", "--end", "2024-01-14", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Contribution Preview (2024-01-01 to 2024-01-14)"))
        .stdout(predicate::str::contains("Schedule Statistics"))
        .stdout(predicate::str::contains("Total Days:      14"));
}

#[test]
fn test_preview_is_reproducible_with_seed() {
    let dir = assert_fs::TempDir::new().unwrap();
    let args = ["preview", "--start", "2024-03-01", "--end", "2024-05-31", "--seed", "42"];

    let first = graphsmith(&dir).args(args).output().unwrap();
    let second = graphsmith(&dir).args(args).output().unwrap();

    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_preview_unknown_pattern_falls_back() {
    let dir = assert_fs::TempDir::new().unwrap();
    graphsmith(&dir)
        .args(["preview", "--pattern", "no-such-pattern", "--seed", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("falling back to organic"));
}

#[test]
fn test_preview_text() {
    let dir = assert_fs::TempDir::new().unwrap();
    graphsmith(&dir)
        .args(["preview", "--text", "HI", "--start", "2024-01-07", "--end", "2024-03-30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sun:"));
}

// ============================================================================
// Configuration Errors
// ============================================================================

#[test]
fn test_inverted_range_exits_with_config_error() {
    let dir = assert_fs::TempDir::new().unwrap();
    graphsmith(&dir)
        .args(["preview", "--start", "2024-02-01", "--end", "2024-01-01"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("startDate must be before or equal to endDate"));
}

#[test]
fn test_all_config_errors_reported_together() {
    let dir = assert_fs::TempDir::new().unwrap();
    graphsmith(&dir)
        .args(["preview", "--start", "bogus", "--min", "9", "--max", "3", "--skip", "2"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("startDate must be in YYYY-MM-DD format"))
        .stderr(predicate::str::contains("minCommits cannot be greater than maxCommits"))
        .stderr(predicate::str::contains("skipProbability must be between 0 and 1"));
}

#[test]
fn test_unreadable_config_file_exits_with_config_error() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("graphsmith.toml").write_str("[schedule\nbroken").unwrap();

    graphsmith(&dir).arg("preview").assert().code(2);
}

#[test]
fn test_env_overrides_config_file() {
    let dir = assert_fs::TempDir::new().unwrap();
    graphsmith(&dir)
        .env("START_DATE", "2024-06-01")
        .env("END_DATE", "2024-06-10")
        .arg("preview")
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-06-01 to 2024-06-10"));
}

// ============================================================================
// Run
// ============================================================================

#[test]
fn test_dry_run_makes_no_commits() {
    let dir = assert_fs::TempDir::new().unwrap();
    graphsmith(&dir)
        .args(["run", "--dry-run", "--start", "2024-01-01", "--end", "2024-01-31"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run: no commits were made"))
        .stdout(predicate::str::contains("Schedule Statistics"));

    assert!(!dir.child("data").path().exists());
}

#[cfg(feature = "git")]
#[test]
fn test_run_outside_repository_exits_with_repository_error() {
    let dir = assert_fs::TempDir::new().unwrap();
    let target = dir.child("not-a-repo");
    target.create_dir_all().unwrap();

    graphsmith(&dir)
        .args(["run", "--no-push", "--start", "2024-01-01", "--end", "2024-01-02", "--repo"])
        .arg(target.path())
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Not a Git repository"));
}

#[cfg(feature = "git")]
#[test]
fn test_run_commits_into_repository() {
    let dir = assert_fs::TempDir::new().unwrap();
    let repo_dir = dir.child("repo");
    repo_dir.create_dir_all().unwrap();

    let repo = git2::Repository::init(repo_dir.path()).unwrap();
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();

    graphsmith(&dir)
        .args([
            "run", "--no-push", "--mode", "random", "--start", "2024-01-01", "--end",
            "2024-01-07", "--min", "1", "--max", "1", "--skip", "0", "--seed", "9", "--repo",
        ])
        .arg(repo_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Commits Created:"))
        .stdout(predicate::str::contains("Errors:          0"));

    let mut walk = repo.revwalk().unwrap();
    walk.push_head().unwrap();
    let commits = walk.count();
    assert!((7..=14).contains(&commits), "unexpected commit count {commits}");

    repo_dir.child("data/contribution.json").assert(predicate::path::exists());
}
