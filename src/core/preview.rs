//! ASCII rendering of a schedule for dry runs.

use super::calendar::weekday_index;
use super::{Schedule, ScheduleStats};
use crate::patterns::{ContributionLevel, DAYS_PER_WEEK};

/// Weekday labels, Sunday first.
pub const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const RULE_WIDTH: usize = 40;

/// Render the calendar grid: one line per weekday, one column per week.
///
/// Each day is shaded by its share of `max_commits`. Days before the first
/// planned date in the opening week are left blank so that columns line up
/// with calendar weeks.
pub fn render_grid(schedule: &Schedule, max_commits: u32) -> [String; DAYS_PER_WEEK] {
    let mut rows: [String; DAYS_PER_WEEK] = Default::default();

    let lead = schedule.entries().first().map(|e| weekday_index(e.date)).unwrap_or(0);
    for row in rows.iter_mut().take(lead) {
        row.push(' ');
    }

    for entry in schedule {
        let level = ContributionLevel::from_ratio(entry.commits, max_commits);
        rows[weekday_index(entry.date)].push(level.glyph());
    }

    rows
}

/// Render the full preview block with title, weekday labels and legend.
pub fn preview_schedule(schedule: &Schedule, max_commits: u32) -> String {
    let rule = format!("  {}", "─".repeat(RULE_WIDTH));
    let legend: Vec<String> = ContributionLevel::ALL
        .iter()
        .map(|level| format!("[{}] {}", level.glyph(), level))
        .collect();

    let mut lines = vec![
        String::new(),
        format!("  Contribution Preview ({})", schedule.range()),
        rule.clone(),
        String::new(),
    ];
    lines.extend(
        DAY_NAMES
            .iter()
            .zip(render_grid(schedule, max_commits))
            .map(|(name, row)| format!("  {}: {}", name, row.trim_end())),
    );
    lines.push(String::new());
    lines.push(format!("  Legend: {}", legend.join("  ")));
    lines.push(rule);

    lines.join("\n") + "\n"
}

/// Render aggregate statistics as an aligned block.
pub fn render_stats(stats: &ScheduleStats) -> String {
    let lines = [
        "  Schedule Statistics:".to_string(),
        format!("     Total Days:      {}", stats.total_days),
        format!("     Active Days:     {} ({:.1}%)", stats.active_days, stats.active_percentage),
        format!("     Skipped Days:    {}", stats.skipped_days),
        format!("     Total Commits:   {}", stats.total_commits),
        format!("     Avg per Day:     {:.1}", stats.avg_commits_per_active_day),
    ];
    lines.join("\n") + "\n"
}
