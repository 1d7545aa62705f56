//! Contribution intensity levels.

use std::fmt;
use std::ops::RangeInclusive;

use rand::Rng;

/// Discrete intensity bucket of a single calendar cell.
///
/// Each level owns a fixed, non-overlapping commit-count range. Ranges grow
/// monotonically with the level so that a rendered calendar shows the
/// intended shade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ContributionLevel {
    /// No contributions.
    #[default]
    None,
    /// 1-3 contributions.
    Low,
    /// 4-8 contributions.
    Medium,
    /// 9-15 contributions.
    High,
    /// 16-25 contributions.
    Extreme,
}

impl ContributionLevel {
    /// All levels in ascending order.
    pub const ALL: [Self; 5] = [Self::None, Self::Low, Self::Medium, Self::High, Self::Extreme];

    /// Convert a raw 0-4 value into a level.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Inclusive commit-count range for this level.
    pub fn commit_range(self) -> RangeInclusive<u32> {
        match self {
            Self::None => 0..=0,
            Self::Low => 1..=3,
            Self::Medium => 4..=8,
            Self::High => 9..=15,
            Self::Extreme => 16..=25,
        }
    }

    /// Draw a commit count uniformly from this level's range.
    pub fn sample_commits<R: Rng>(self, rng: &mut R) -> u32 {
        match self {
            Self::None => 0,
            level => rng.gen_range(level.commit_range()),
        }
    }

    /// Bucket a commit count by its ratio to `max_commits`.
    ///
    /// Used by the preview, where the day's share of the configured maximum
    /// decides the shade: `<= 25%` low, `<= 50%` medium, `<= 75%` high,
    /// anything above is extreme.
    pub fn from_ratio(commits: u32, max_commits: u32) -> Self {
        if commits == 0 {
            return Self::None;
        }
        let ratio = f64::from(commits) / f64::from(max_commits.max(1));
        if ratio <= 0.25 {
            Self::Low
        } else if ratio <= 0.5 {
            Self::Medium
        } else if ratio <= 0.75 {
            Self::High
        } else {
            Self::Extreme
        }
    }

    /// Block glyph used by the ASCII preview.
    pub fn glyph(self) -> char {
        match self {
            Self::None => ' ',
            Self::Low => '░',
            Self::Medium => '▒',
            Self::High => '▓',
            Self::Extreme => '█',
        }
    }
}

impl fmt::Display for ContributionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Extreme => "extreme",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_ranges_are_monotonic_and_disjoint() {
        let ranges: Vec<_> = ContributionLevel::ALL.iter().map(|l| l.commit_range()).collect();
        for pair in ranges.windows(2) {
            assert!(pair[0].end() < pair[1].start());
        }
        assert_eq!(ranges[0], 0..=0);
        assert_eq!(ranges[4], 16..=25);
    }

    #[test]
    fn test_sampling_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for level in ContributionLevel::ALL {
            for _ in 0..200 {
                let n = level.sample_commits(&mut rng);
                assert!(level.commit_range().contains(&n), "{level}: {n}");
            }
        }
    }

    #[test]
    fn test_level_zero_always_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!((0..100).all(|_| ContributionLevel::None.sample_commits(&mut rng) == 0));
    }

    #[test]
    fn test_from_ratio_thresholds() {
        assert_eq!(ContributionLevel::from_ratio(0, 20), ContributionLevel::None);
        assert_eq!(ContributionLevel::from_ratio(5, 20), ContributionLevel::Low);
        assert_eq!(ContributionLevel::from_ratio(10, 20), ContributionLevel::Medium);
        assert_eq!(ContributionLevel::from_ratio(15, 20), ContributionLevel::High);
        assert_eq!(ContributionLevel::from_ratio(16, 20), ContributionLevel::Extreme);
        assert_eq!(ContributionLevel::from_ratio(40, 20), ContributionLevel::Extreme);
    }

    #[test]
    fn test_from_u8() {
        assert_eq!(ContributionLevel::from_u8(3), Some(ContributionLevel::High));
        assert_eq!(ContributionLevel::from_u8(5), None);
    }
}
