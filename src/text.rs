//! Text Layout - Character-Budget Wrapping
//!
//! There are no font metrics here. Every glyph is assumed to be
//! `AVG_CHAR_WIDTH_EM` of the font size wide.

use std::borrow::Cow;

/// Estimated average glyph width, in em.
pub const AVG_CHAR_WIDTH_EM: f64 = 0.6;

/// Marker appended to the last visible line when a title is cut.
pub const ELLIPSIS: &str = "...";

/// Number of characters that fit on a line of `max_width_px` at `font_size_px`.
pub fn char_budget(max_width_px: f64, font_size_px: f64) -> usize {
    let avg_char_width = font_size_px * AVG_CHAR_WIDTH_EM;
    if avg_char_width <= 0.0 {
        return 0;
    }
    (max_width_px / avg_char_width).floor().max(0.0) as usize
}

/// Greedy word wrap against the character budget.
///
/// Words longer than the budget are hard-split into fragments of
/// `budget - 1` characters, each followed by a hyphen. The hyphen itself is
/// not counted against the pixel width.
pub fn wrap_text(text: &str, max_width_px: f64, font_size_px: f64) -> Vec<String> {
    let budget = char_budget(max_width_px, font_size_px);
    // budget - 1 would be zero for tiny budgets and never make progress.
    let split_step = budget.saturating_sub(1).max(1);

    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        let word_len = word.chars().count();

        if word_len > budget {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            let mut remaining: Vec<char> = word.chars().collect();
            while remaining.len() > budget {
                let mut fragment: String = remaining[..split_step].iter().collect();
                fragment.push('-');
                lines.push(fragment);
                remaining.drain(..split_step);
            }
            current = remaining.into_iter().collect();
            continue;
        }

        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if candidate.chars().count() <= budget {
            current = candidate;
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current = word.to_string();
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Keep at most `max_lines` lines. When lines are dropped, the last kept
/// line loses its final three characters to the ellipsis.
pub fn truncate_lines(mut lines: Vec<String>, max_lines: usize) -> Vec<String> {
    if lines.len() <= max_lines {
        return lines;
    }
    lines.truncate(max_lines);

    if let Some(last) = lines.last_mut() {
        let keep = last.chars().count().saturating_sub(ELLIPSIS.len());
        let mut cut: String = last.chars().take(keep).collect();
        cut.push_str(ELLIPSIS);
        *last = cut;
    }

    lines
}

/// Escape the three characters that would break SVG text content.
///
/// Quotes are left alone; text never lands inside an attribute value.
pub fn escape_text(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
