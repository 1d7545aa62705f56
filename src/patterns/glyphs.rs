//! Seven-row bitmap font used to spell text on the calendar.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::{ContributionLevel, PatternMatrix, DAYS_PER_WEEK};
use crate::core::ScheduleError;

/// Blank columns inserted between two rendered characters.
pub const GLYPH_SPACING: usize = 1;

// `#` is a lit cell, `.` an empty one.
const GLYPH_SOURCES: &[(char, [&str; 7])] = &[
    ('A', [".###.", "#...#", "#...#", "#####", "#...#", "#...#", "#...#"]),
    ('B', ["####.", "#...#", "#...#", "####.", "#...#", "#...#", "####."]),
    ('C', [".###.", "#...#", "#....", "#....", "#....", "#...#", ".###."]),
    ('D', ["####.", "#...#", "#...#", "#...#", "#...#", "#...#", "####."]),
    ('E', ["#####", "#....", "#....", "####.", "#....", "#....", "#####"]),
    ('F', ["#####", "#....", "#....", "####.", "#....", "#....", "#...."]),
    ('G', [".###.", "#...#", "#....", "#.###", "#...#", "#...#", ".###."]),
    ('H', ["#...#", "#...#", "#...#", "#####", "#...#", "#...#", "#...#"]),
    ('I', ["###", ".#.", ".#.", ".#.", ".#.", ".#.", "###"]),
    ('J', ["..###", "...#.", "...#.", "...#.", "#..#.", "#..#.", ".##.."]),
    ('K', ["#...#", "#..#.", "#.#..", "##...", "#.#..", "#..#.", "#...#"]),
    ('L', ["#....", "#....", "#....", "#....", "#....", "#....", "#####"]),
    ('M', ["#...#", "##.##", "#.#.#", "#.#.#", "#...#", "#...#", "#...#"]),
    ('N', ["#...#", "##..#", "#.#.#", "#..##", "#...#", "#...#", "#...#"]),
    ('O', [".###.", "#...#", "#...#", "#...#", "#...#", "#...#", ".###."]),
    ('P', ["####.", "#...#", "#...#", "####.", "#....", "#....", "#...."]),
    ('Q', [".###.", "#...#", "#...#", "#...#", "#.#.#", "#..#.", ".##.#"]),
    ('R', ["####.", "#...#", "#...#", "####.", "#.#..", "#..#.", "#...#"]),
    ('S', [".####", "#....", "#....", ".###.", "....#", "....#", "####."]),
    ('T', ["#####", "..#..", "..#..", "..#..", "..#..", "..#..", "..#.."]),
    ('U', ["#...#", "#...#", "#...#", "#...#", "#...#", "#...#", ".###."]),
    ('V', ["#...#", "#...#", "#...#", "#...#", "#...#", ".#.#.", "..#.."]),
    ('W', ["#...#", "#...#", "#...#", "#.#.#", "#.#.#", "##.##", "#...#"]),
    ('X', ["#...#", "#...#", ".#.#.", "..#..", ".#.#.", "#...#", "#...#"]),
    ('Y', ["#...#", "#...#", ".#.#.", "..#..", "..#..", "..#..", "..#.."]),
    ('Z', ["#####", "....#", "...#.", "..#..", ".#...", "#....", "#####"]),
    ('0', [".###.", "#...#", "#..##", "#.#.#", "##..#", "#...#", ".###."]),
    ('1', ["..#..", ".##..", "..#..", "..#..", "..#..", "..#..", ".###."]),
    ('2', [".###.", "#...#", "....#", "...#.", "..#..", ".#...", "#####"]),
    ('3', ["####.", "....#", "....#", ".###.", "....#", "....#", "####."]),
    ('4', ["...#.", "..##.", ".#.#.", "#..#.", "#####", "...#.", "...#."]),
    ('5', ["#####", "#....", "####.", "....#", "....#", "#...#", ".###."]),
    ('6', [".###.", "#....", "#....", "####.", "#...#", "#...#", ".###."]),
    ('7', ["#####", "....#", "...#.", "..#..", ".#...", ".#...", ".#..."]),
    ('8', [".###.", "#...#", "#...#", ".###.", "#...#", "#...#", ".###."]),
    ('9', [".###.", "#...#", "#...#", ".####", "....#", "....#", ".###."]),
    (' ', ["...", "...", "...", "...", "...", "...", "..."]),
    ('!', ["#", "#", "#", "#", "#", ".", "#"]),
    ('.', [".", ".", ".", ".", ".", ".", "#"]),
    ('-', ["...", "...", "...", "###", "...", "...", "..."]),
    ('?', [".###.", "#...#", "....#", "...#.", "..#..", ".....", "..#.."]),
];

/// Character to pattern fragment mapping.
#[derive(Debug, Clone)]
pub struct GlyphLibrary {
    glyphs: HashMap<char, PatternMatrix>,
}

static BUILTIN: Lazy<GlyphLibrary> = Lazy::new(|| {
    let glyphs = GLYPH_SOURCES
        .iter()
        .map(|&(ch, rows)| {
            let mut parsed: [Vec<ContributionLevel>; DAYS_PER_WEEK] = Default::default();
            for (row, line) in parsed.iter_mut().zip(rows) {
                *row = line
                    .chars()
                    .map(|c| {
                        if c == '#' {
                            ContributionLevel::Extreme
                        } else {
                            ContributionLevel::None
                        }
                    })
                    .collect();
            }
            (ch, parsed)
        })
        .filter_map(|(ch, rows)| PatternMatrix::new(rows).ok().map(|m| (ch, m)))
        .collect();
    GlyphLibrary { glyphs }
});

impl GlyphLibrary {
    /// The built-in font.
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Glyph for a character, if the font has one. Lookup is case-insensitive.
    pub fn glyph(&self, ch: char) -> Option<&PatternMatrix> {
        self.glyphs.get(&ch.to_ascii_uppercase())
    }

    /// Render `text` into one composite matrix.
    ///
    /// Characters are joined left to right with [`GLYPH_SPACING`] blank
    /// columns between neighbours. Unknown characters render as a space.
    pub fn render_text(&self, text: &str) -> Result<PatternMatrix, ScheduleError> {
        let upper = text.to_uppercase();
        let mut composite: Option<PatternMatrix> = None;

        for ch in upper.chars() {
            let glyph = if let Some(glyph) = self.glyph(ch) {
                glyph
            } else {
                tracing::warn!("No glyph for '{}', rendering it as a space", ch);
                match self.glyph(' ') {
                    Some(blank) => blank,
                    None => continue,
                }
            };

            match composite.as_mut() {
                Some(matrix) => matrix.append(glyph, GLYPH_SPACING),
                None => composite = Some(glyph.clone()),
            }
        }

        composite.ok_or_else(|| ScheduleError::InvalidPattern("text is empty".to_string()))
    }
}
