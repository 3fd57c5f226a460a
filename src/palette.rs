//! Category Palette
//!
//! Badge and accent colors keyed by the uppercase category name.

/// Color used for categories missing from the table.
pub const DEFAULT_CATEGORY_COLOR: &str = "#3b82f6";

/// Label used when a request carries no category.
pub const DEFAULT_CATEGORY: &str = "GENERALE";

static CATEGORY_COLORS: [(&str, &str); 9] = [
    ("AMBIENTE", "#10b981"),
    ("DIRITTO", "#8b5cf6"),
    ("ENERGIA", "#f59e0b"),
    ("ISTRUZIONE E COMUNICAZIONE", "#6366f1"),
    ("OCCUPAZIONE E LAVORO", "#14b8a6"),
    ("QUESTIONI SOCIALI", "#ec4899"),
    ("TRASPORTO", "#84cc16"),
    ("UNIONE EUROPEA", "#3b82f6"),
    ("VITA POLITICA", "#ef4444"),
];

/// Exact, case-insensitive table lookup. No trimming.
pub fn lookup(category: &str) -> Option<&'static str> {
    let key = category.to_uppercase();
    CATEGORY_COLORS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, color)| *color)
}

/// Color for a category, falling back to [`DEFAULT_CATEGORY_COLOR`].
pub fn color_for(category: &str) -> &'static str {
    lookup(category).unwrap_or(DEFAULT_CATEGORY_COLOR)
}

/// All known categories with their colors.
pub fn categories() -> &'static [(&'static str, &'static str)] {
    &CATEGORY_COLORS
}
