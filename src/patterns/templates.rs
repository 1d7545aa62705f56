//! Built-in named pattern templates.
//!
//! Rows run Sunday to Saturday. Digits are contribution levels and `.` is an
//! empty cell.

use once_cell::sync::Lazy;

use super::PatternMatrix;

/// A named, described template.
#[derive(Debug, Clone)]
pub struct PatternTemplate {
    /// Lookup name (lowercase)
    pub name: &'static str,

    /// One-line description shown by `graphsmith patterns`
    pub description: &'static str,

    /// The parsed grid
    pub matrix: PatternMatrix,
}

const TEMPLATE_SOURCES: &[(&str, &str, [&str; 7])] = &[
    (
        "heart",
        "A solid heart",
        [".44.44.", "4444444", "4444444", ".44444.", "..444..", "...4...", "......."],
    ),
    (
        "smile",
        "A smiling face",
        [
            "..3333..",
            ".3....3.",
            "3.4..4.3",
            "3......3",
            "3.4..4.3",
            ".3.44.3.",
            "..3333..",
        ],
    ),
    (
        "invader",
        "A retro space invader",
        [
            "..4.....4..",
            "...4...4...",
            "..4444444..",
            ".44.444.44.",
            "44444444444",
            "4.4444444.4",
            "4.4.....4.4",
        ],
    ),
    (
        "wave",
        "A rolling sine wave",
        [
            "4321.....1234",
            "34321...12343",
            "234321.123432",
            "1234321234321",
            ".123432343210",
            "..1234343210.",
            "...12343210..",
        ],
    ),
    (
        "checkerboard",
        "Alternating full and empty cells",
        ["4.", ".4", "4.", ".4", "4.", ".4", "4."],
    ),
    (
        "diagonal",
        "Stripes running down to the right",
        ["4......", ".4.....", "..4....", "...4...", "....4..", ".....4.", "......4"],
    ),
    (
        "gradient",
        "Columns fading from empty to full",
        ["01234", "01234", "01234", "01234", "01234", "01234", "01234"],
    ),
    ("full", "Every day at the highest level", ["4", "4", "4", "4", "4", "4", "4"]),
];

static TEMPLATES: Lazy<Vec<PatternTemplate>> = Lazy::new(|| {
    TEMPLATE_SOURCES
        .iter()
        .filter_map(|&(name, description, rows)| {
            PatternMatrix::parse(&rows)
                .ok()
                .map(|matrix| PatternTemplate { name, description, matrix })
        })
        .collect()
});

/// All built-in templates.
pub fn templates() -> &'static [PatternTemplate] {
    &TEMPLATES
}

/// Look up a template by name, ignoring case and surrounding whitespace.
pub fn get_pattern(name: &str) -> Option<&'static PatternMatrix> {
    let wanted = name.trim().to_lowercase();
    TEMPLATES.iter().find(|t| t.name == wanted).map(|t| &t.matrix)
}

/// Names of every built-in template.
pub fn list_patterns() -> Vec<&'static str> {
    TEMPLATES.iter().map(|t| t.name).collect()
}
