//! Markup Assembly - SVG Banner Templates
//!
//! Three layouts: the home banner, the numbers page banner and the
//! per-entity card. Sizes and offsets are coupled to the character-count
//! heuristics in [`crate::text`], not to measured glyphs.

use serde::{Deserialize, Serialize};

use crate::options::RenderOptions;
use crate::palette::{self, DEFAULT_CATEGORY};
use crate::request::RenderRequest;
use crate::text::{escape_text, truncate_lines, wrap_text};

pub const DEFAULT_TITLE: &str = "Iniziativa Popolare";
pub const DEFAULT_STATUS: &str = "IN RACCOLTA FIRME";
pub const BRAND_TEXT: &str = "Un'idea di onData";
pub const SITE_TITLE: &str = "Referendum e Iniziative Popolari";

pub const TITLE_FONT_SIZE: f64 = 56.0;
pub const TITLE_SIDE_MARGINS: f64 = 120.0;
pub const MAX_TITLE_LINES: usize = 3;

const FONT_FAMILY: &str = "system-ui, -apple-system, sans-serif";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    Home,
    Numbers,
    Card,
}

/// Resolved card text, with fallbacks applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardContent {
    pub title: String,
    pub category: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    Home,
    Numbers,
    Card(CardContent),
}

impl Layout {
    /// Home banner for the sentinel id, a card for everything else.
    pub fn for_request(request: &RenderRequest) -> Self {
        if request.is_home() {
            return Layout::Home;
        }

        Layout::Card(CardContent {
            title: or_fallback(&request.title, DEFAULT_TITLE),
            category: or_fallback(&request.category, DEFAULT_CATEGORY),
            status: or_fallback(&request.status, DEFAULT_STATUS),
        })
    }

    pub fn kind(&self) -> LayoutKind {
        match self {
            Layout::Home => LayoutKind::Home,
            Layout::Numbers => LayoutKind::Numbers,
            Layout::Card(_) => LayoutKind::Card,
        }
    }
}

fn or_fallback(value: &Option<String>, fallback: &str) -> String {
    match value.as_deref() {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

pub fn category_badge_width(category: &str) -> usize {
    (category.chars().count() * 11 + 40).max(120)
}

pub fn status_badge_width(status: &str) -> usize {
    (status.chars().count() * 9 + 30).max(100)
}

/// Baseline of the `index`-th title line.
pub fn title_line_y(index: usize) -> usize {
    180 + index * 65
}

/// Title lines as they will appear on the card.
pub fn display_title_lines(title: &str, opts: &RenderOptions) -> Vec<String> {
    let max_width = opts.width as f64 - TITLE_SIDE_MARGINS;
    truncate_lines(wrap_text(title, max_width, TITLE_FONT_SIZE), MAX_TITLE_LINES)
}

pub fn render_markup(layout: &Layout, opts: &RenderOptions) -> String {
    match layout {
        Layout::Home => home_markup(opts),
        Layout::Numbers => numbers_markup(opts),
        Layout::Card(content) => card_markup(content, opts),
    }
}

fn background_defs(opts: &RenderOptions) -> String {
    format!(
        r#"  <defs>
    <linearGradient id="bg" x1="0%" y1="0%" x2="100%" y2="100%">
      <stop offset="0%" style="stop-color:{bg};stop-opacity:1" />
      <stop offset="100%" style="stop-color:#1e3a8a;stop-opacity:1" />
    </linearGradient>
    <pattern id="dots" x="0" y="0" width="40" height="40" patternUnits="userSpaceOnUse">
      <circle cx="20" cy="20" r="2" fill="rgba(255,255,255,0.1)" />
    </pattern>
  </defs>
  <rect width="100%" height="100%" fill="url(#bg)" />
  <rect width="100%" height="100%" fill="url(#dots)" />
"#,
        bg = opts.background_color,
    )
}

fn brand_markup(opts: &RenderOptions, text: &str) -> String {
    format!(
        r#"  <text x="{x}" y="{y}" text-anchor="end" font-family="{FONT_FAMILY}" font-size="20" font-weight="500" fill="rgba(255,255,255,0.7)">{text}</text>
"#,
        x = opts.width as f64 - 60.0,
        y = opts.height as f64 - 40.0,
        text = escape_text(text),
    )
}

fn corner_circles(opts: &RenderOptions) -> String {
    let cx = opts.width as f64 - 100.0;
    format!(
        r#"  <circle cx="{cx}" cy="100" r="80" fill="rgba(255,255,255,0.05)" />
  <circle cx="{cx}" cy="100" r="50" fill="rgba(255,255,255,0.1)" />
"#
    )
}

fn svg_open(opts: &RenderOptions) -> String {
    format!(
        r#"<svg width="{}" height="{}" xmlns="http://www.w3.org/2000/svg">
"#,
        opts.width, opts.height
    )
}

fn home_markup(opts: &RenderOptions) -> String {
    let h = opts.height as f64;
    let mut svg = svg_open(opts);
    svg.push_str(&background_defs(opts));

    svg.push_str(&format!(
        r#"  <text x="50%" y="{title_y}" text-anchor="middle" font-family="{FONT_FAMILY}" font-size="60" font-weight="700" fill="{fill}">{title}</text>
  <text x="50%" y="{subtitle_y}" text-anchor="middle" font-family="{FONT_FAMILY}" font-size="36" font-weight="400" fill="rgba(255,255,255,0.85)">{subtitle}</text>
"#,
        title_y = h / 2.0 - 30.0,
        subtitle_y = h / 2.0 + 40.0,
        fill = opts.text_color,
        title = SITE_TITLE,
        subtitle = "Scopri e partecipa alle iniziative democratiche",
    ));

    svg.push_str(&brand_markup(opts, BRAND_TEXT));
    svg.push_str(&corner_circles(opts));
    svg.push_str("</svg>\n");
    svg
}

fn numbers_markup(opts: &RenderOptions) -> String {
    let w = opts.width as f64;
    let h = opts.height as f64;
    let mut svg = svg_open(opts);

    svg.push_str(
        r#"  <defs>
    <linearGradient id="numericBg" x1="0%" y1="0%" x2="100%" y2="100%">
      <stop offset="0%" style="stop-color:#1e3a8a;stop-opacity:1" />
      <stop offset="100%" style="stop-color:#3730a3;stop-opacity:1" />
    </linearGradient>
  </defs>
  <rect width="100%" height="100%" fill="url(#numericBg)" />
"#,
    );

    // Histogram bars
    for (y, width, fill) in [
        (120, 200, "rgba(16, 185, 129, 0.6)"),
        (160, 300, "rgba(59, 130, 246, 0.6)"),
        (200, 150, "rgba(139, 92, 246, 0.6)"),
    ] {
        svg.push_str(&format!(
            r#"  <rect x="80" y="{y}" width="{width}" height="20" rx="10" fill="{fill}" />
"#
        ));
    }

    // Lollipops
    for (y, end, fill) in [(400, 1100, "#10b981"), (450, 1050, "#3b82f6"), (500, 980, "#8b5cf6")] {
        svg.push_str(&format!(
            r#"  <line x1="900" y1="{y}" x2="{end}" y2="{y}" stroke="rgba(255,255,255,0.3)" stroke-width="2"/>
  <circle cx="{end}" cy="{y}" r="12" fill="{fill}" opacity="0.8"/>
"#
        ));
    }

    svg.push_str(&format!(
        r#"  <text x="900" y="180" font-family="{FONT_FAMILY}" font-size="72" font-weight="bold" fill="rgba(255,255,255,0.2)">123</text>
  <text x="950" y="250" font-family="{FONT_FAMILY}" font-size="48" font-weight="bold" fill="rgba(255,255,255,0.15)">45%</text>
  <text x="60" y="{title_y}" font-family="{FONT_FAMILY}" font-size="80" font-weight="900" fill="{fill}">Numeri</text>
  <text x="60" y="{subtitle_y}" font-family="{FONT_FAMILY}" font-size="36" font-weight="400" fill="rgba(255,255,255,0.9)">Statistiche e analisi delle iniziative referendarie</text>
"#,
        title_y = h / 2.0 - 50.0,
        subtitle_y = h / 2.0 + 20.0,
        fill = opts.text_color,
    ));

    svg.push_str(&brand_markup(opts, BRAND_TEXT));

    svg.push_str(&format!(
        r#"  <polygon points="0,0 100,0 0,100" fill="rgba(255,255,255,0.05)" />
  <polygon points="{w},{h} {w_in},{h} {w},{h_in}" fill="rgba(255,255,255,0.05)" />
</svg>
"#,
        w_in = w - 100.0,
        h_in = h - 100.0,
    ));
    svg
}

fn card_markup(content: &CardContent, opts: &RenderOptions) -> String {
    let h = opts.height as f64;
    let title_max_width = opts.width as f64 - TITLE_SIDE_MARGINS;
    let lines = display_title_lines(&content.title, opts);

    let accent = palette::lookup(&content.category).unwrap_or(opts.category_color.as_str());
    let category_width = category_badge_width(&content.category) as f64;
    let status_width = status_badge_width(&content.status) as f64;

    tracing::debug!(
        category = %content.category,
        lines = lines.len(),
        category_width,
        status_width,
        "Assembling card markup"
    );

    let mut svg = svg_open(opts);
    svg.push_str(&background_defs(opts));

    svg.push_str(&format!(
        r#"  <rect x="0" y="0" width="100%" height="8" fill="{accent}" />
  <rect x="60" y="60" width="{category_width}" height="40" rx="20" fill="{accent}" />
  <text x="{category_x}" y="85" text-anchor="middle" font-family="{FONT_FAMILY}" font-size="18" font-weight="600" fill="white">{category}</text>
"#,
        category_x = 60.0 + category_width / 2.0,
        category = escape_text(&content.category),
    ));

    for (index, line) in lines.iter().enumerate() {
        let text_length = (line.chars().count() as f64 * 33.0).min(title_max_width);
        svg.push_str(&format!(
            r#"  <text x="60" y="{y}" font-family="{FONT_FAMILY}" font-size="56" font-weight="700" fill="{fill}" textLength="{text_length}" lengthAdjust="spacingAndGlyphs">{line}</text>
"#,
            y = title_line_y(index),
            fill = opts.text_color,
            line = escape_text(line),
        ));
    }

    svg.push_str(&format!(
        r#"  <rect x="60" y="{badge_y}" width="{status_width}" height="35" rx="17" fill="rgba(255,255,255,0.2)" />
  <text x="{status_x}" y="{status_y}" text-anchor="middle" font-family="{FONT_FAMILY}" font-size="16" font-weight="500" fill="{fill}">{status}</text>
"#,
        badge_y = h - 120.0,
        status_x = 60.0 + status_width / 2.0,
        status_y = h - 97.0,
        fill = opts.text_color,
        status = escape_text(&content.status),
    ));

    svg.push_str(&brand_markup(opts, SITE_TITLE));
    svg.push_str(&corner_circles(opts));
    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(title: &str, category: &str) -> Layout {
        Layout::for_request(&RenderRequest::new(42, title).with_category(category))
    }

    #[test]
    fn test_layout_selection() {
        assert_eq!(Layout::for_request(&RenderRequest::home()), Layout::Home);
        assert_eq!(card("x", "ENERGIA").kind(), LayoutKind::Card);
    }

    #[test]
    fn test_card_fallbacks() {
        let request = RenderRequest {
            entity_id: 7,
            title: Some(String::new()),
            category: None,
            status: None,
        };
        match Layout::for_request(&request) {
            Layout::Card(content) => {
                assert_eq!(content.title, DEFAULT_TITLE);
                assert_eq!(content.category, "GENERALE");
                assert_eq!(content.status, DEFAULT_STATUS);
            }
            other => panic!("expected card, got {:?}", other),
        }
    }

    #[test]
    fn test_badge_widths() {
        assert_eq!(category_badge_width("ENERGIA"), 120); // 7*11+40 = 117
        assert_eq!(category_badge_width("VITA POLITICA"), 13 * 11 + 40);
        assert_eq!(category_badge_width(""), 120);
        assert_eq!(status_badge_width("ATTIVE"), 100); // 6*9+30 = 84
        assert_eq!(status_badge_width(DEFAULT_STATUS), 17 * 9 + 30);
    }

    #[test]
    fn test_badge_width_in_markup() {
        let svg = render_markup(&card("T", "OCCUPAZIONE E LAVORO"), &RenderOptions::default());
        let width = category_badge_width("OCCUPAZIONE E LAVORO");
        assert_eq!(width, 260);
        assert!(svg.contains(r##"width="260" height="40" rx="20" fill="#14b8a6""##));
        assert!(svg.contains(r#"<text x="190" y="85""#));
    }

    #[test]
    fn test_title_lines_offsets() {
        let title = "A Very Long Title That Certainly Exceeds One Line Of Available Width";
        let opts = RenderOptions::default();
        let lines = display_title_lines(title, &opts);
        assert_eq!(lines.len(), 3);

        let svg = render_markup(&card(title, "ENERGIA"), &opts);
        for index in 0..lines.len() {
            assert!(svg.contains(&format!(r#"<text x="60" y="{}""#, title_line_y(index))));
        }
        assert!(!svg.contains(r#"y="375""#));
    }

    #[test]
    fn test_long_title_truncated_with_ellipsis() {
        let title = "parola ".repeat(30);
        let lines = display_title_lines(title.trim_end(), &RenderOptions::default());
        assert_eq!(lines.len(), MAX_TITLE_LINES);
        assert!(lines[2].ends_with("..."));
    }

    #[test]
    fn test_text_is_escaped() {
        let svg = render_markup(&card("<script>&</script>", "A&B"), &RenderOptions::default());
        assert!(svg.contains("&lt;script&gt;&amp;&lt;/script&gt;"));
        assert!(svg.contains(">A&amp;B</text>"));
        assert!(!svg.contains("<script>"));
        assert!(!svg.contains("</script>"));
    }

    #[test]
    fn test_category_color_applied() {
        let svg = render_markup(&card("T", "ambiente"), &RenderOptions::default());
        assert!(svg.contains(r##"height="8" fill="#10b981""##));
    }

    #[test]
    fn test_unknown_category_uses_option_color() {
        let opts = RenderOptions {
            category_color: "#123456".to_string(),
            ..Default::default()
        };
        let svg = render_markup(&card("T", "SPORT"), &opts);
        assert!(svg.contains(r##"height="8" fill="#123456""##));
    }

    #[test]
    fn test_home_and_numbers_fixed_text() {
        let opts = RenderOptions::default();
        let home = render_markup(&Layout::Home, &opts);
        assert!(home.contains(SITE_TITLE));
        assert!(home.contains(r#"y="285""#));
        assert!(home.contains("Un'idea di onData"));

        let numbers = render_markup(&Layout::Numbers, &opts);
        assert!(numbers.contains(">Numeri</text>"));
        assert!(numbers.contains(r#"y="265""#));
        assert!(numbers.contains("1200,630 1100,630 1200,530"));
    }

    #[test]
    fn test_markup_uses_dimensions() {
        let opts = RenderOptions {
            width: 800,
            height: 400,
            ..Default::default()
        };
        let svg = render_markup(&Layout::Home, &opts);
        assert!(svg.starts_with(r#"<svg width="800" height="400""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_repeated_elements_one_per_line() {
        let numbers = render_markup(&Layout::Numbers, &RenderOptions::default());
        let bars = numbers.lines().filter(|l| l.starts_with(r#"  <rect x="80""#)).count();
        let dots = numbers.lines().filter(|l| l.starts_with("  <circle cx=")).count();
        assert_eq!(bars, 3);
        assert_eq!(dots, 3);

        let title = "A Very Long Title That Certainly Exceeds One Line Of Available Width";
        let card = render_markup(&card(title, "ENERGIA"), &RenderOptions::default());
        let title_lines = card.lines().filter(|l| l.starts_with(r#"  <text x="60" y="#)).count();
        assert_eq!(title_lines, 3);
    }
}
