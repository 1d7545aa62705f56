//! Contribution levels, pattern grids, templates and the text font.
//!
//! A pattern is a 7-row grid (one row per weekday) of [`ContributionLevel`]s
//! that the schedule generator tiles across the requested date range.

mod glyphs;
mod level;
mod matrix;
mod templates;

pub use glyphs::{GlyphLibrary, GLYPH_SPACING};
pub use level::ContributionLevel;
pub use matrix::{PatternMatrix, DAYS_PER_WEEK};
pub use templates::{get_pattern, list_patterns, templates, PatternTemplate};
