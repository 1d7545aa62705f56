//! Weekday x week grid of contribution levels.

use super::ContributionLevel;
use crate::core::ScheduleError;

/// Number of rows in every pattern: one per weekday, Sunday first.
pub const DAYS_PER_WEEK: usize = 7;

/// A 7-row grid of intensity levels, one column per calendar week.
///
/// Rows are indexed by day of week (Sunday = 0). Rows shorter than the
/// widest row are treated as padded with [`ContributionLevel::None`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatrix {
    rows: [Vec<ContributionLevel>; DAYS_PER_WEEK],
    width: usize,
}

impl PatternMatrix {
    /// Build a matrix from explicit rows.
    ///
    /// Fails when every row is empty.
    pub fn new(rows: [Vec<ContributionLevel>; DAYS_PER_WEEK]) -> Result<Self, ScheduleError> {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return Err(ScheduleError::InvalidPattern("pattern has no columns".to_string()));
        }
        Ok(Self { rows, width })
    }

    /// Parse a matrix from seven strings of digits `0`-`4`.
    ///
    /// Spaces and dots are read as level 0, which keeps the built-in
    /// templates legible in source.
    pub fn parse(rows: &[&str]) -> Result<Self, ScheduleError> {
        if rows.len() != DAYS_PER_WEEK {
            return Err(ScheduleError::InvalidPattern(format!(
                "expected {} rows, found {}",
                DAYS_PER_WEEK,
                rows.len()
            )));
        }

        let mut parsed: [Vec<ContributionLevel>; DAYS_PER_WEEK] = Default::default();
        for (row, line) in parsed.iter_mut().zip(rows) {
            for ch in line.chars() {
                let level = match ch {
                    ' ' | '.' => ContributionLevel::None,
                    '0'..='4' => ContributionLevel::from_u8(ch as u8 - b'0')
                        .unwrap_or(ContributionLevel::None),
                    other => {
                        return Err(ScheduleError::InvalidPattern(format!(
                            "invalid level character '{}'",
                            other
                        )))
                    }
                };
                row.push(level);
            }
        }

        Self::new(parsed)
    }

    /// Number of distinct columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Level at `(weekday, column)`; out-of-range cells read as none.
    pub fn level_at(&self, weekday: usize, column: usize) -> ContributionLevel {
        self.rows
            .get(weekday)
            .and_then(|row| row.get(column))
            .copied()
            .unwrap_or_default()
    }

    /// Level for a weekday in the given calendar week, wrapping around the
    /// matrix width when the range spans more weeks than the pattern.
    pub fn level_for_week(&self, weekday: usize, week_index: usize) -> ContributionLevel {
        self.level_at(weekday, week_index % self.width)
    }

    /// Append `other` to the right of this matrix, separated by `spacer`
    /// blank columns.
    pub fn append(&mut self, other: &Self, spacer: usize) {
        for (row, other_row) in self.rows.iter_mut().zip(&other.rows) {
            row.resize(self.width + spacer, ContributionLevel::None);
            row.extend(other_row.iter().copied());
            row.resize(self.width + spacer + other.width, ContributionLevel::None);
        }
        self.width += spacer + other.width;
    }

    /// Render the matrix with preview glyphs, one line per weekday.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for weekday in 0..DAYS_PER_WEEK {
            let line: String =
                (0..self.width).map(|col| self.level_at(weekday, col).glyph()).collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}
