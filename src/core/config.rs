//! Configuration management for Graphsmith.
//!
//! Settings are layered: built-in defaults, then a TOML file, then
//! environment variables (optionally from `.env`), then command-line flags.
//! [`Config::validate`] checks the merged result in one pass and reports
//! every problem at once.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ConfigError, DateRange, DriverOptions, GenerationConfig, ScheduleSource};

/// Name of the per-project config file.
pub const LOCAL_CONFIG_FILE: &str = ".graphsmith.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// What to generate
    pub schedule: ScheduleConfig,

    /// Repository settings
    pub git: GitConfig,

    /// Run behavior
    pub run: RunConfig,
}

/// Schedule generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// First day (YYYY-MM-DD)
    pub start_date: String,

    /// Last day, inclusive (YYYY-MM-DD)
    pub end_date: String,

    /// Minimum commits on an active day
    pub min_commits: u32,

    /// Maximum commits on an active day
    pub max_commits: u32,

    /// Chance of leaving a day empty (0.0 - 1.0)
    pub skip_probability: f64,

    /// Generator used when neither a pattern nor text is given
    pub mode: GenerationMode,

    /// Named template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Text to spell; takes precedence over `pattern`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Density-based generators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Bursty, weekday-weighted activity
    #[default]
    Organic,
    /// Independent uniform draws per day
    Random,
}

/// Repository settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Remote to push to
    pub remote: String,

    /// Branch to push
    pub branch: String,

    /// Data file rewritten for every commit, relative to the repository root
    pub data_file: PathBuf,

    /// Author name override (defaults to `user.name`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,

    /// Author email override (defaults to `user.email`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
}

/// Run behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Only preview; never touch the repository
    pub dry_run: bool,

    /// Push once every day has been processed
    pub push_on_complete: bool,

    /// Pause between days, in milliseconds
    pub inter_day_delay_ms: u64,

    /// Seed for reproducible schedules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Command-line overrides. `None` leaves the lower layer untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_commits: Option<u32>,
    pub max_commits: Option<u32>,
    pub skip_probability: Option<f64>,
    pub mode: Option<GenerationMode>,
    pub pattern: Option<String>,
    pub text: Option<String>,
    pub seed: Option<u64>,
    pub dry_run: Option<bool>,
    pub push_on_complete: Option<bool>,
}

/// A configuration that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    /// Days to cover
    pub range: DateRange,
    /// Density settings
    pub generation: GenerationConfig,
    /// Requested schedule shape
    pub source: ScheduleSource,
    /// Repository settings
    pub git: GitConfig,
    /// Preview only
    pub dry_run: bool,
    /// Push after the run
    pub push_on_complete: bool,
    /// Pause between days
    pub inter_day_delay: Duration,
    /// Seed for the random source
    pub seed: Option<u64>,
}

impl ValidatedConfig {
    /// Driver settings derived from this configuration.
    pub fn driver_options(&self) -> DriverOptions {
        DriverOptions {
            push_on_complete: self.push_on_complete,
            inter_day_delay: self.inter_day_delay,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            start_date: "2024-01-01".to_string(),
            end_date: "2024-12-31".to_string(),
            min_commits: 1,
            max_commits: 15,
            skip_probability: 0.15,
            mode: GenerationMode::Organic,
            pattern: None,
            text: None,
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            branch: "main".to_string(),
            data_file: PathBuf::from("data").join("contribution.json"),
            author_name: None,
            author_email: None,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { dry_run: false, push_on_complete: true, inter_day_delay_ms: 10, seed: None }
    }
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// Looks for config in:
    /// 1. `explicit`, when given (must exist)
    /// 2. `.graphsmith.toml` in current directory
    /// 3. `~/.config/graphsmith/config.toml`
    /// 4. Falls back to defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(global_config) = Self::config_dir().map(|d| d.join("config.toml")) {
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        toml::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("graphsmith"))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Recognized: `START_DATE`, `END_DATE`, `MIN_COMMITS_PER_DAY`,
    /// `MAX_COMMITS_PER_DAY`, `SKIP_PROBABILITY`, `GIT_REMOTE`, `GIT_BRANCH`,
    /// `PATTERN_NAME`, `DRY_RUN`, `PUSH_ON_COMPLETE`. Empty values are
    /// ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut errors = Vec::new();

        if let Some(v) = get("START_DATE") {
            self.schedule.start_date = v;
        }
        if let Some(v) = get("END_DATE") {
            self.schedule.end_date = v;
        }
        if let Some(v) = get("MIN_COMMITS_PER_DAY") {
            parse_into(&mut self.schedule.min_commits, "MIN_COMMITS_PER_DAY", &v, &mut errors);
        }
        if let Some(v) = get("MAX_COMMITS_PER_DAY") {
            parse_into(&mut self.schedule.max_commits, "MAX_COMMITS_PER_DAY", &v, &mut errors);
        }
        if let Some(v) = get("SKIP_PROBABILITY") {
            parse_into(&mut self.schedule.skip_probability, "SKIP_PROBABILITY", &v, &mut errors);
        }
        if let Some(v) = get("GIT_REMOTE") {
            self.git.remote = v;
        }
        if let Some(v) = get("GIT_BRANCH") {
            self.git.branch = v;
        }
        if let Some(v) = get("PATTERN_NAME") {
            self.schedule.pattern = Some(v);
        }
        if let Some(v) = get("DRY_RUN") {
            self.run.dry_run = v.trim() == "true";
        }
        if let Some(v) = get("PUSH_ON_COMPLETE") {
            self.run.push_on_complete = v.trim() != "false";
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Apply command-line overrides.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        let o = overrides.clone();
        if let Some(v) = o.start_date {
            self.schedule.start_date = v;
        }
        if let Some(v) = o.end_date {
            self.schedule.end_date = v;
        }
        if let Some(v) = o.min_commits {
            self.schedule.min_commits = v;
        }
        if let Some(v) = o.max_commits {
            self.schedule.max_commits = v;
        }
        if let Some(v) = o.skip_probability {
            self.schedule.skip_probability = v;
        }
        if let Some(v) = o.mode {
            self.schedule.mode = v;
        }
        if o.pattern.is_some() {
            self.schedule.pattern = o.pattern;
        }
        if o.text.is_some() {
            self.schedule.text = o.text;
        }
        if o.seed.is_some() {
            self.run.seed = o.seed;
        }
        if let Some(v) = o.dry_run {
            self.run.dry_run = v;
        }
        if let Some(v) = o.push_on_complete {
            self.run.push_on_complete = v;
        }
    }

    /// Check every setting and build the validated form.
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        let mut errors = Vec::new();
        let s = &self.schedule;

        let start = super::calendar::parse_date(&s.start_date)
            .map_err(|_| errors.push("startDate must be in YYYY-MM-DD format".to_string()))
            .ok();
        let end = super::calendar::parse_date(&s.end_date)
            .map_err(|_| errors.push("endDate must be in YYYY-MM-DD format".to_string()))
            .ok();
        let range = match (start, end) {
            (Some(start), Some(end)) => DateRange::new(start, end)
                .map_err(|_| {
                    errors.push("startDate must be before or equal to endDate".to_string())
                })
                .ok(),
            _ => None,
        };

        if s.max_commits < 1 {
            errors.push("maxCommits must be at least 1".to_string());
        }
        if s.min_commits > s.max_commits {
            errors.push("minCommits cannot be greater than maxCommits".to_string());
        }
        if !(0.0..=1.0).contains(&s.skip_probability) {
            errors.push("skipProbability must be between 0 and 1".to_string());
        }
        if matches!(&s.text, Some(t) if t.trim().is_empty()) {
            errors.push("text must not be empty".to_string());
        }
        if self.git.remote.trim().is_empty() {
            errors.push("gitRemote is required".to_string());
        }
        if self.git.branch.trim().is_empty() {
            errors.push("gitBranch is required".to_string());
        }
        if self.git.data_file.as_os_str().is_empty() || self.git.data_file.is_absolute() {
            errors.push("dataFile must be a path relative to the repository root".to_string());
        }

        match range {
            Some(range) if errors.is_empty() => Ok(ValidatedConfig {
                range,
                generation: GenerationConfig {
                    min_commits: s.min_commits,
                    max_commits: s.max_commits,
                    skip_probability: s.skip_probability,
                },
                source: self.schedule_source(),
                git: self.git.clone(),
                dry_run: self.run.dry_run,
                push_on_complete: self.run.push_on_complete,
                inter_day_delay: Duration::from_millis(self.run.inter_day_delay_ms),
                seed: self.run.seed,
            }),
            _ => Err(ConfigError::Invalid(errors)),
        }
    }

    /// Requested schedule shape: text, then pattern, then the density mode.
    pub fn schedule_source(&self) -> ScheduleSource {
        if let Some(text) = &self.schedule.text {
            return ScheduleSource::Text(text.clone());
        }
        if let Some(pattern) = &self.schedule.pattern {
            return ScheduleSource::Pattern(pattern.clone());
        }
        match self.schedule.mode {
            GenerationMode::Organic => ScheduleSource::Organic,
            GenerationMode::Random => ScheduleSource::Random,
        }
    }
}

fn parse_into<T: std::str::FromStr>(slot: &mut T, key: &str, value: &str, errors: &mut Vec<String>) {
    match value.trim().parse() {
        Ok(parsed) => *slot = parsed,
        Err(_) => errors.push(format!("{} has an invalid value '{}'", key, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let validated = Config::default().validate().unwrap();
        assert_eq!(validated.range.num_days(), 366);
        assert_eq!(validated.source, ScheduleSource::Organic);
        assert!(validated.push_on_complete);
        assert_eq!(validated.generation, GenerationConfig::default());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[schedule]"));
        assert!(toml_str.contains("[git]"));
        assert!(toml_str.contains("[run]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [schedule]
            start_date = "2023-06-01"
            max_commits = 8
            mode = "random"

            [git]
            branch = "trunk"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.schedule.start_date, "2023-06-01");
        assert_eq!(config.schedule.end_date, "2024-12-31");
        assert_eq!(config.schedule.max_commits, 8);
        assert_eq!(config.schedule.mode, GenerationMode::Random);
        assert_eq!(config.git.branch, "trunk");
        assert_eq!(config.git.remote, "origin");
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = Config::default();
        config.schedule.start_date = "not-a-date".into();
        config.schedule.min_commits = 10;
        config.schedule.max_commits = 5;
        config.schedule.skip_probability = 1.5;
        config.git.remote = String::new();

        let err = config.validate().unwrap_err();
        let ConfigError::Invalid(errors) = err else { panic!("expected Invalid") };
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let mut config = Config::default();
        config.schedule.start_date = "2024-05-01".into();
        config.schedule.end_date = "2024-04-01".into();
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("before or equal"));
    }

    #[test]
    fn test_zero_max_commits_rejected() {
        let mut config = Config::default();
        config.schedule.min_commits = 0;
        config.schedule.max_commits = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_from(env(&[
                ("START_DATE", "2023-01-01"),
                ("MAX_COMMITS_PER_DAY", "4"),
                ("SKIP_PROBABILITY", "0.5"),
                ("PATTERN_NAME", "heart"),
                ("PUSH_ON_COMPLETE", "false"),
                ("GIT_BRANCH", ""),
            ]))
            .unwrap();

        assert_eq!(config.schedule.start_date, "2023-01-01");
        assert_eq!(config.schedule.max_commits, 4);
        assert!((config.schedule.skip_probability - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.schedule.pattern.as_deref(), Some("heart"));
        assert!(!config.run.push_on_complete);
        assert_eq!(config.git.branch, "main");
    }

    #[test]
    fn test_env_rejects_bad_numbers() {
        let mut config = Config::default();
        let err = config.apply_env_from(env(&[("MIN_COMMITS_PER_DAY", "lots")])).unwrap_err();
        assert!(err.to_string().contains("MIN_COMMITS_PER_DAY"));
    }

    #[test]
    fn test_overrides_win_and_select_source() {
        let mut config = Config::default();
        config.schedule.pattern = Some("wave".into());

        config.apply_overrides(&ConfigOverrides {
            text: Some("hi".into()),
            dry_run: Some(true),
            seed: Some(7),
            ..ConfigOverrides::default()
        });

        let validated = config.validate().unwrap();
        assert_eq!(validated.source, ScheduleSource::Text("hi".into()));
        assert!(validated.dry_run);
        assert_eq!(validated.seed, Some(7));
    }

    #[test]
    fn test_absolute_data_file_rejected() {
        let mut config = Config::default();
        config.git.data_file = std::env::temp_dir().join("x.json");
        assert!(config.validate().is_err());
    }
}
