//! The per-day commit plan and its aggregate statistics.

use chrono::NaiveDate;

use super::{DateRange, ScheduleError};

/// One planned calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Calendar day
    pub date: NaiveDate,

    /// Commits to create on that day (0 = skipped)
    pub commits: u32,
}

/// Chronological, immutable plan with exactly one entry per day of its range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    range: DateRange,
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    /// Build a plan from per-day counts given in range order.
    pub(crate) fn from_counts(range: DateRange, counts: Vec<u32>) -> Self {
        debug_assert_eq!(counts.len(), range.num_days());
        let entries = range
            .days()
            .zip(counts)
            .map(|(date, commits)| ScheduleEntry { date, commits })
            .collect();
        Self { range, entries }
    }

    /// Build a plan from explicit entries, checking that they cover the
    /// range day by day with no gaps or reordering.
    pub fn from_entries(range: DateRange, entries: Vec<ScheduleEntry>) -> Result<Self, ScheduleError> {
        if entries.len() != range.num_days() {
            return Err(ScheduleError::InvalidPattern(format!(
                "plan has {} entries but {} covers {} days",
                entries.len(),
                range,
                range.num_days()
            )));
        }
        if let Some((entry, expected)) =
            entries.iter().zip(range.days()).find(|(entry, day)| entry.date != *day)
        {
            return Err(ScheduleError::InvalidPattern(format!(
                "plan entry {} is out of order (expected {})",
                entry.date, expected
            )));
        }
        Ok(Self { range, entries })
    }

    /// Range this plan covers.
    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Entries in chronological order.
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Number of planned days.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the plan has no days. Never true for a plan built from a
    /// valid range.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Largest single-day count.
    pub fn max_commits(&self) -> u32 {
        self.entries.iter().map(|e| e.commits).max().unwrap_or(0)
    }

    /// Aggregate statistics for this plan.
    pub fn stats(&self) -> ScheduleStats {
        ScheduleStats::from_schedule(self)
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a ScheduleEntry;
    type IntoIter = std::slice::Iter<'a, ScheduleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Summary of a plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleStats {
    /// Days in the plan
    pub total_days: usize,
    /// Sum of all planned commits
    pub total_commits: u64,
    /// Days with at least one commit
    pub active_days: usize,
    /// Days with no commits
    pub skipped_days: usize,
    /// Active days as a percentage of all days (0.0 - 100.0)
    pub active_percentage: f64,
    /// Mean commits per active day (0.0 when nothing is active)
    pub avg_commits_per_active_day: f64,
}

impl ScheduleStats {
    /// Compute statistics. Pure: the same plan always yields the same value.
    pub fn from_schedule(schedule: &Schedule) -> Self {
        let total_days = schedule.len();
        let total_commits: u64 = schedule.entries.iter().map(|e| u64::from(e.commits)).sum();
        let active_days = schedule.entries.iter().filter(|e| e.commits > 0).count();
        let skipped_days = total_days - active_days;

        let active_percentage = if total_days > 0 {
            active_days as f64 / total_days as f64 * 100.0
        } else {
            0.0
        };
        let avg_commits_per_active_day = if active_days > 0 {
            total_commits as f64 / active_days as f64
        } else {
            0.0
        };

        Self {
            total_days,
            total_commits,
            active_days,
            skipped_days,
            active_percentage,
            avg_commits_per_active_day,
        }
    }
}
