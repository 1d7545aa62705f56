//! Graphsmith - paint your contribution calendar.
//!
//! Plans a commit schedule over a date range and replays it as back-dated
//! commits in a Git repository.

#![allow(clippy::single_match_else)]

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use graphsmith::core::{
    preview_schedule, render_stats, Config, ConfigError, ConfigOverrides, DriverState,
    ExecutionEvent, ExecutionStats, GenerationMode, PublishOutcome, RepositoryError, Schedule,
    ScheduleGenerator, ValidatedConfig,
};
use graphsmith::patterns::templates;
use graphsmith::APP_NAME;

const EXIT_ERRORS: u8 = 1;
const EXIT_CONFIG: u8 = 2;
const EXIT_REPOSITORY: u8 = 4;
const EXIT_ABORTED: u8 = 130;

/// Paint your contribution calendar
#[derive(Parser)]
#[command(name = "graphsmith")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file to use instead of the default locations
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a schedule and commit it (default)
    Run {
        #[command(flatten)]
        schedule: ScheduleArgs,

        /// Repository to write into
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Dry run - print the plan without touching the repository
        #[arg(short, long)]
        dry_run: bool,

        /// Don't push when the run completes
        #[arg(long)]
        no_push: bool,
    },

    /// Print a preview of the schedule and its statistics
    Preview {
        #[command(flatten)]
        schedule: ScheduleArgs,
    },

    /// List the built-in pattern templates
    Patterns {
        /// Draw each template as a 7-row grid
        #[arg(short, long)]
        show: bool,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Flags shared by every command that builds a schedule.
#[derive(Args, Debug, Clone, Default)]
struct ScheduleArgs {
    /// First day (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE")]
    start: Option<String>,

    /// Last day, inclusive (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE")]
    end: Option<String>,

    /// Named pattern template
    #[arg(short, long, conflicts_with = "text")]
    pattern: Option<String>,

    /// Text to spell into the calendar
    #[arg(short, long)]
    text: Option<String>,

    /// Density generator when no pattern or text is given
    #[arg(long, value_enum)]
    mode: Option<GenerationMode>,

    /// Minimum commits on an active day
    #[arg(long)]
    min: Option<u32>,

    /// Maximum commits on an active day
    #[arg(long)]
    max: Option<u32>,

    /// Chance of leaving a day empty (0.0 - 1.0)
    #[arg(long)]
    skip: Option<f64>,

    /// Seed for a reproducible schedule
    #[arg(long)]
    seed: Option<u64>,
}

impl ScheduleArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            start_date: self.start.clone(),
            end_date: self.end.clone(),
            min_commits: self.min,
            max_commits: self.max,
            skip_probability: self.skip,
            mode: self.mode,
            pattern: self.pattern.clone(),
            text: self.text.clone(),
            seed: self.seed,
            ..ConfigOverrides::default()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else if cli.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        None => cmd_run(config_path, &ScheduleArgs::default(), Path::new("."), false, false),
        Some(Commands::Run { schedule, repo, dry_run, no_push }) => {
            cmd_run(config_path, &schedule, &repo, dry_run, no_push)
        }
        Some(Commands::Preview { schedule }) => cmd_preview(config_path, &schedule),
        Some(Commands::Patterns { show }) => {
            cmd_patterns(show);
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Config { path }) => cmd_config(config_path, path),
        Some(Commands::Completions { shell }) => {
            cmd_completions(shell);
            Ok(ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

/// Map a failure to the process exit code.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<ConfigError>().is_some() {
        EXIT_CONFIG
    } else if err.downcast_ref::<RepositoryError>().is_some() {
        EXIT_REPOSITORY
    } else {
        EXIT_ERRORS
    }
}

/// Merge defaults, config file, environment and flags, then validate.
fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<ValidatedConfig> {
    dotenvy::dotenv().ok();

    let mut config = Config::load(path)?;
    config.apply_env()?;
    config.apply_overrides(overrides);
    Ok(config.validate()?)
}

fn make_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

/// Print preview and statistics for a plan.
fn print_plan(schedule: &Schedule, max_commits: u32) {
    print!("{}", preview_schedule(schedule, max_commits.max(schedule.max_commits())));
    println!();
    print!("{}", render_stats(&schedule.stats()));
}

/// Handle the preview command.
fn cmd_preview(config_path: Option<&Path>, args: &ScheduleArgs) -> Result<ExitCode> {
    let config = load_config(config_path, &args.overrides())?;
    let generator = ScheduleGenerator::new(config.range, config.generation);
    let mut rng = make_rng(config.seed);

    let generated = generator.generate(&config.source, &mut rng)?;
    if generated.fell_back {
        println!("Note: falling back to organic activity");
    }
    print_plan(&generated.schedule, config.generation.max_commits);

    Ok(ExitCode::SUCCESS)
}

/// Handle the run command.
fn cmd_run(
    config_path: Option<&Path>,
    args: &ScheduleArgs,
    repo: &Path,
    dry_run: bool,
    no_push: bool,
) -> Result<ExitCode> {
    let mut overrides = args.overrides();
    if dry_run {
        overrides.dry_run = Some(true);
    }
    if no_push {
        overrides.push_on_complete = Some(false);
    }
    let config = load_config(config_path, &overrides)?;

    println!("Graphsmith");
    println!("  Range:   {}", config.range);
    println!("  Source:  {}", config.source);
    println!(
        "  Commits: {}-{} per day, skip {:.0}%",
        config.generation.min_commits,
        config.generation.max_commits,
        config.generation.skip_probability * 100.0
    );
    println!();

    if config.dry_run {
        let generator = ScheduleGenerator::new(config.range, config.generation);
        let generated = generator.generate(&config.source, &mut make_rng(config.seed))?;
        print_plan(&generated.schedule, config.generation.max_commits);
        println!();
        println!("Dry run: no commits were made");
        return Ok(ExitCode::SUCCESS);
    }

    execute_plan(&config, repo)
}

#[cfg(feature = "git")]
fn execute_plan(config: &ValidatedConfig, repo: &Path) -> Result<ExitCode> {
    use graphsmith::core::{AbortToken, ExecutionDriver, RepositoryBackend};
    use graphsmith::GitBackend;

    let mut backend = GitBackend::discover(repo, &config.git)?;
    let state = backend.initialize()?;
    println!("Repository: {} ({})", state.root.display(), state.branch_display());
    if !state.is_clean {
        println!("  Working tree has uncommitted changes");
    }

    let abort = AbortToken::new();
    let handler_token = abort.clone();
    ctrlc::set_handler(move || handler_token.abort())
        .context("Failed to install Ctrl+C handler")?;

    let (tx, rx) = mpsc::channel();
    let printer = spawn_progress_printer(rx);

    let mut driver = ExecutionDriver::new(make_rng(config.seed), config.driver_options())
        .with_abort_token(abort)
        .with_events(tx);

    let generator = ScheduleGenerator::new(config.range, config.generation);
    let generated = driver.plan(&generator, &config.source)?;
    if generated.fell_back {
        println!("Note: falling back to organic activity");
    }

    let stats = driver.execute(&generated.schedule, &mut backend)?;
    let state = driver.state();
    let publish = driver.publish_outcome().clone();
    drop(driver);
    let _ = printer.join();

    print_summary(&stats);

    let code = if state == DriverState::Aborted {
        EXIT_ABORTED
    } else if stats.errors > 0 || matches!(publish, PublishOutcome::Failed(_)) {
        EXIT_ERRORS
    } else {
        0
    };
    Ok(ExitCode::from(code))
}

#[cfg(not(feature = "git"))]
fn execute_plan(_config: &ValidatedConfig, _repo: &Path) -> Result<ExitCode> {
    anyhow::bail!("Git support is not enabled in this build; use --dry-run")
}

/// Print progress events until the driver drops its sender.
fn spawn_progress_printer(rx: Receiver<ExecutionEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for event in rx {
            match event {
                ExecutionEvent::Started { total_days, planned_commits } => {
                    println!("Processing {} days ({} commits planned)", total_days, planned_commits);
                }
                ExecutionEvent::CommitRecorded { date, index, total, committed } => {
                    if index == total {
                        println!("  {}  {:>3} commits  ({} total)", date, total, committed);
                    }
                }
                ExecutionEvent::DayFailed { date, error } => {
                    eprintln!("  {}  failed: {}", date, error);
                }
                ExecutionEvent::Aborted => println!("\nAborted by user"),
                ExecutionEvent::Publishing => println!("Pushing..."),
                ExecutionEvent::Published => println!("Pushed"),
                ExecutionEvent::PublishFailed { error } => eprintln!("Push failed: {}", error),
                ExecutionEvent::DaySkipped { .. } | ExecutionEvent::Finished(_) => {}
            }
        }
    })
}

fn print_summary(stats: &ExecutionStats) {
    println!();
    println!("  Execution Summary:");
    println!("     Days Processed:  {}", stats.total_days);
    println!("     Active Days:     {}", stats.active_days);
    println!("     Skipped Days:    {}", stats.skipped_days);
    println!("     Commits Created: {}", stats.total_commits);
    println!("     Errors:          {}", stats.errors);
    if let Some(duration) = stats.duration() {
        println!("     Duration:        {:.1}s", duration.num_milliseconds() as f64 / 1000.0);
    }
}

/// Handle the patterns command.
fn cmd_patterns(show: bool) {
    println!("Available patterns:");
    for template in templates() {
        println!("  {:<14} {}", template.name, template.description);
        if show {
            for line in template.matrix.render().lines() {
                println!("      {line}");
            }
            println!();
        }
    }
}

/// Handle the config command.
fn cmd_config(config_path: Option<&Path>, show_path: bool) -> Result<ExitCode> {
    if show_path {
        if let Some(path) = Config::config_dir() {
            println!("{}", path.display());
        }
        return Ok(ExitCode::SUCCESS);
    }

    dotenvy::dotenv().ok();
    let mut config = Config::load(config_path)?;
    config.apply_env()?;
    let toml = toml::to_string_pretty(&config)?;
    println!("{toml}");

    Ok(ExitCode::SUCCESS)
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, APP_NAME, &mut io::stdout());
}
