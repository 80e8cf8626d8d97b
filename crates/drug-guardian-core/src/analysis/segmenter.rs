//! Turns free-text predictions into display segments.
//!
//! Handles the small markdown subset the prediction service emits:
//! `#` headings, `**bold**`/`*italic*` emphasis and `-`/`•`/`*` bullets.
//! Lines with a short `Label: text` prefix are promoted to headings; short
//! fragments that are neither headings nor bullets are dropped.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::DisplaySegment;

/// Paragraphs must be longer than this many characters.
const MIN_PARAGRAPH_CHARS: usize = 20;

/// A colon prefix makes a heading when its length is strictly inside these bounds.
const HEADING_PREFIX_MIN: usize = 3;
const HEADING_PREFIX_MAX: usize = 60;

fn heading_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#{1,6}\s+").unwrap())
}

fn bold_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").unwrap())
}

fn italic_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*(.+?)\*").unwrap())
}

fn bullet_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-•*]\s+").unwrap())
}

/// Strip heading, emphasis and bullet markup from a single line.
pub fn clean_line(line: &str) -> String {
    let without_heading = heading_marker().replace(line, "");
    let without_bold = bold_marker().replace_all(&without_heading, "$1");
    let without_italic = italic_marker().replace_all(&without_bold, "$1");
    let without_bullet = bullet_marker().replace(without_italic.trim_start(), "");
    without_bullet.trim().to_string()
}

/// Split `text` into display segments, preserving line order.
pub fn segment(text: &str) -> Vec<DisplaySegment> {
    text.lines().filter_map(segment_line).collect()
}

fn segment_line(line: &str) -> Option<DisplaySegment> {
    if line.trim().is_empty() {
        return None;
    }

    let clean = clean_line(line);
    if clean.is_empty() {
        return None;
    }

    if heading_marker().is_match(line) || has_heading_prefix(&clean) {
        let (title, body) = clean.split_once(':').unwrap_or((clean.as_str(), ""));
        return Some(DisplaySegment::Heading {
            title: title.trim().to_string(),
            body: body.trim().to_string(),
        });
    }

    if bullet_marker().is_match(line.trim()) {
        return Some(DisplaySegment::Bullet { text: clean });
    }

    if clean.chars().count() > MIN_PARAGRAPH_CHARS {
        return Some(DisplaySegment::Paragraph { text: clean });
    }

    None
}

fn has_heading_prefix(clean: &str) -> bool {
    match clean.split_once(':') {
        Some((prefix, _)) => {
            let len = prefix.chars().count();
            len > HEADING_PREFIX_MIN && len < HEADING_PREFIX_MAX
        }
        None => false,
    }
}
