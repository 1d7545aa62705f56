//! Schedule synthesis.
//!
//! Turns a [`DateRange`] and density settings into a [`Schedule`]. Every
//! generation call takes the random source explicitly so that a seeded
//! generator reproduces the same plan.

use std::fmt;

use rand::Rng;
use tracing::{debug, info, warn};

use super::calendar::{is_weekend, weekday_index};
use super::{DateRange, Schedule, ScheduleError};
use crate::patterns::{get_pattern, list_patterns, GlyphLibrary, PatternMatrix, DAYS_PER_WEEK};

/// Activity multiplier per weekday, Sunday first. Peaks midweek.
pub const WEEKDAY_MULTIPLIERS: [f64; 7] = [0.4, 1.0, 1.1, 1.2, 1.1, 0.9, 0.5];

/// Weekend days scale the configured skip probability by this factor.
pub const WEEKEND_SKIP_FACTOR: f64 = 1.5;

/// Organic generation: first burst starts within this many days.
pub const FIRST_BURST_WINDOW: usize = 14;
/// Organic generation: inclusive burst length bounds in days.
pub const BURST_LENGTH_DAYS: (usize, usize) = (7, 21);
/// Organic generation: inclusive gap bounds between bursts in days.
pub const BURST_GAP_DAYS: (usize, usize) = (14, 35);
/// Organic generation: multiplier applied inside a burst.
pub const BURST_MULTIPLIER: f64 = 2.0;
/// Organic generation: half-width of the symmetric multiplier noise.
pub const ORGANIC_NOISE: f64 = 0.25;

/// Density settings shared by the random and organic generators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    /// Lower bound of commits on an active day (before weekday scaling)
    pub min_commits: u32,
    /// Upper bound of commits on an active day (before weekday scaling)
    pub max_commits: u32,
    /// Chance in `[0, 1]` that a weekday is left empty
    pub skip_probability: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { min_commits: 1, max_commits: 15, skip_probability: 0.15 }
    }
}

/// What shape a schedule should take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleSource {
    /// Independent uniform draws per day
    Random,
    /// Bursty, weekday-weighted activity
    Organic,
    /// A named built-in template
    Pattern(String),
    /// Text rendered with the built-in font
    Text(String),
}

impl fmt::Display for ScheduleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => write!(f, "random"),
            Self::Organic => write!(f, "organic"),
            Self::Pattern(name) => write!(f, "pattern '{}'", name),
            Self::Text(text) => write!(f, "text \"{}\"", text),
        }
    }
}

/// A generated plan together with how it was produced.
#[derive(Debug, Clone)]
pub struct GeneratedSchedule {
    /// The plan
    pub schedule: Schedule,
    /// Source that actually produced the plan
    pub source: ScheduleSource,
    /// Whether the requested source failed and organic generation was used
    pub fell_back: bool,
}

/// Window of elevated activity, as day offsets `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstPeriod {
    pub start: usize,
    pub end: usize,
}

impl BurstPeriod {
    /// Whether the day offset lies inside the burst.
    pub fn contains(&self, day: usize) -> bool {
        (self.start..self.end).contains(&day)
    }
}

/// Weekday activity multiplier (Sunday = 0).
pub fn weekday_multiplier(weekday: usize) -> f64 {
    WEEKDAY_MULTIPLIERS.get(weekday).copied().unwrap_or(1.0)
}

/// Lay out burst periods over `total_days` with a renewal process.
///
/// Bursts never overlap and are clipped to the range.
pub fn generate_burst_periods<R: Rng>(total_days: usize, rng: &mut R) -> Vec<BurstPeriod> {
    let mut bursts = Vec::new();
    let mut current = rng.gen_range(0..FIRST_BURST_WINDOW);

    while current < total_days {
        let length = rng.gen_range(BURST_LENGTH_DAYS.0..=BURST_LENGTH_DAYS.1);
        let end = (current + length).min(total_days);
        bursts.push(BurstPeriod { start: current, end });

        current = end + rng.gen_range(BURST_GAP_DAYS.0..=BURST_GAP_DAYS.1);
    }

    bursts
}

/// Builds schedules for one date range and density configuration.
#[derive(Debug, Clone)]
pub struct ScheduleGenerator {
    range: DateRange,
    config: GenerationConfig,
}

impl ScheduleGenerator {
    /// Create a generator.
    pub fn new(range: DateRange, config: GenerationConfig) -> Self {
        Self { range, config }
    }

    /// The range every schedule covers.
    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Density configuration.
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Produce a schedule for `source`.
    ///
    /// An unknown pattern name is not fatal: it is logged and organic
    /// generation is used instead.
    pub fn generate<R: Rng>(
        &self,
        source: &ScheduleSource,
        rng: &mut R,
    ) -> Result<GeneratedSchedule, ScheduleError> {
        let schedule = match source {
            ScheduleSource::Random => self.generate_random_schedule(rng),
            ScheduleSource::Organic => self.generate_organic_schedule(rng),
            ScheduleSource::Text(text) => self.generate_text_schedule(text, rng)?,
            ScheduleSource::Pattern(name) => match self.generate_pattern_schedule(name, rng) {
                Ok(schedule) => schedule,
                Err(err) if err.is_recoverable() => {
                    warn!("Pattern error: {}", err);
                    info!("Falling back to organic schedule");
                    return Ok(GeneratedSchedule {
                        schedule: self.generate_organic_schedule(rng),
                        source: ScheduleSource::Organic,
                        fell_back: true,
                    });
                }
                Err(err) => return Err(err),
            },
        };

        Ok(GeneratedSchedule { schedule, source: source.clone(), fell_back: false })
    }

    /// Uniform random counts scaled by the weekday multiplier.
    pub fn generate_random_schedule<R: Rng>(&self, rng: &mut R) -> Schedule {
        let GenerationConfig { min_commits, max_commits, skip_probability } = self.config;
        debug!("Generating random schedule for {} days", self.range.num_days());

        let counts = self
            .range
            .days()
            .map(|date| {
                let skip_chance = if is_weekend(date) {
                    skip_probability * WEEKEND_SKIP_FACTOR
                } else {
                    skip_probability
                };
                if rng.gen::<f64>() < skip_chance {
                    return 0;
                }

                let multiplier = weekday_multiplier(weekday_index(date));
                let low = ((f64::from(min_commits) * multiplier).floor() as u32).max(1);
                let high = ((f64::from(max_commits) * multiplier).ceil() as u32).max(low);
                rng.gen_range(low..=high)
            })
            .collect();

        Schedule::from_counts(self.range, counts)
    }

    /// Bursty counts that mimic project-driven activity.
    pub fn generate_organic_schedule<R: Rng>(&self, rng: &mut R) -> Schedule {
        let GenerationConfig { max_commits, skip_probability, .. } = self.config;
        let bursts = generate_burst_periods(self.range.num_days(), rng);
        debug!("Generated {} activity bursts", bursts.len());

        let counts = self
            .range
            .days()
            .enumerate()
            .map(|(offset, date)| {
                let mut activity = weekday_multiplier(weekday_index(date));
                if bursts.iter().any(|b| b.contains(offset)) {
                    activity *= BURST_MULTIPLIER;
                }
                activity = (activity + rng.gen_range(-ORGANIC_NOISE..=ORGANIC_NOISE)).max(0.0);

                if rng.gen::<f64>() < skip_probability {
                    return 0;
                }
                let ceiling = ((f64::from(max_commits) * activity).ceil() as u32).max(1);
                rng.gen_range(1..=ceiling)
            })
            .collect();

        Schedule::from_counts(self.range, counts)
    }

    /// Counts shaped by a named template.
    pub fn generate_pattern_schedule<R: Rng>(
        &self,
        name: &str,
        rng: &mut R,
    ) -> Result<Schedule, ScheduleError> {
        let pattern = get_pattern(name).ok_or_else(|| ScheduleError::PatternNotFound {
            name: name.to_string(),
            available: list_patterns().into_iter().map(String::from).collect(),
        })?;
        debug!("Applying pattern '{}' ({} columns)", name, pattern.width());
        Ok(self.apply_pattern(pattern, rng))
    }

    /// Counts that spell `text` in the built-in font.
    pub fn generate_text_schedule<R: Rng>(
        &self,
        text: &str,
        rng: &mut R,
    ) -> Result<Schedule, ScheduleError> {
        let pattern = GlyphLibrary::builtin().render_text(text)?;
        debug!("Rendered text \"{}\" into {} columns", text, pattern.width());
        Ok(self.apply_pattern(&pattern, rng))
    }

    /// Tile `pattern` over the range, sampling each cell's commit count from
    /// its level's range.
    ///
    /// The row is the day of week; the column is the number of whole weeks
    /// since the first day of the range, wrapped at the pattern width.
    pub fn apply_pattern<R: Rng>(&self, pattern: &PatternMatrix, rng: &mut R) -> Schedule {
        let counts = self
            .range
            .days()
            .enumerate()
            .map(|(offset, date)| {
                let level = pattern.level_for_week(weekday_index(date), offset / DAYS_PER_WEEK);
                level.sample_commits(rng)
            })
            .collect();

        Schedule::from_counts(self.range, counts)
    }
}
