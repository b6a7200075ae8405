//! Font-agnostic text budgeting: character truncation, greedy word wrap,
//! post-wrap line capping, and markup cleanup for catalog descriptions.
//!
//! Widths come from a [`TextMeasure`] implementation so the algorithms can
//! run against real glyph metrics or a fixed-advance stand-in.

use serde::{Deserialize, Serialize};

/// The ellipsis appended by every truncation in this crate.
pub const ELLIPSIS: &str = "...";

/// Anything that can report the pixel extent of a single line of text.
pub trait TextMeasure {
    /// `(width, height)` of `text` in pixels.
    fn measure(&self, text: &str) -> (f32, f32);

    /// Width of `text` in pixels.
    fn width(&self, text: &str) -> f32 {
        self.measure(text).0
    }
}

impl<M: TextMeasure + ?Sized> TextMeasure for &M {
    fn measure(&self, text: &str) -> (f32, f32) {
        (**self).measure(text)
    }
}

/// Policy for the ellipsis after a word-limited description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionEllipsis {
    /// Append only when words were dropped.
    #[default]
    WhenTruncated,
    /// Append to every non-empty description.
    Always,
}

/// Cut `text` to at most `max_chars` characters, ending in `...` when cut.
///
/// Keeps the first `max_chars - 3` characters, trims trailing whitespace,
/// then appends the ellipsis. Budgets below 3 yield only dots.
pub fn truncate_to_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars < ELLIPSIS.len() {
        return ".".repeat(max_chars);
    }
    let kept: String = text.chars().take(max_chars - ELLIPSIS.len()).collect();
    format!("{}{}", kept.trim_end(), ELLIPSIS)
}

/// Force an ellipsis onto `line` while staying within `max_chars`.
fn ellipsize(line: &str, max_chars: usize) -> String {
    if line.ends_with(ELLIPSIS) {
        return line.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let kept: String = line.chars().take(keep).collect();
    format!("{}{}", kept.trim_end(), ELLIPSIS)
}

/// Greedy word wrap against a pixel budget.
///
/// Words are appended to the current line while the measured width of the
/// line plus the next word stays within `max_width`. A word wider than the
/// budget on its own gets a line to itself and is never split.
pub fn wrap_to_width<M: TextMeasure + ?Sized>(text: &str, measure: &M, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", current, word);
        if measure.width(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Keep at most `max_lines` wrapped lines.
///
/// When lines are dropped the last kept line is re-cut to `max_chars` and
/// always ends with an ellipsis, so the overflow is visible.
pub fn cap_lines(mut lines: Vec<String>, max_lines: usize, max_chars: usize) -> Vec<String> {
    if lines.len() <= max_lines {
        return lines;
    }
    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        *last = ellipsize(last, max_chars);
    }
    lines
}

/// Tags that separate words when removed.
const BREAKING_TAGS: &[&str] = &["br", "p", "div", "li", "ul", "ol", "hr"];

/// Strip `<tag>`, `</tag>` and `<tag/>` markup and decode common entities.
///
/// Block-level and line-break tags become a space; inline tags such as
/// `<i>` vanish so the words they wrap stay intact. A `<` that does not
/// open a tag is kept literally.
pub fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('>') {
            Some(close) if is_tag_body(&after[..close]) => {
                let name = tag_name(&after[..close]);
                if BREAKING_TAGS.contains(&name.as_str()) {
                    out.push(' ');
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('<');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    decode_entities(&out)
}

fn is_tag_body(body: &str) -> bool {
    let body = body.trim_start_matches('/');
    body.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && !body.contains('<')
}

fn tag_name(body: &str) -> String {
    body.trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&mdash;", "-")
        .replace("&amp;", "&")
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep the first `max_words` whitespace-delimited words.
pub fn limit_words(text: &str, max_words: usize, policy: DescriptionEllipsis) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return String::new();
    }
    let truncated = words.len() > max_words;
    let mut out = words[..words.len().min(max_words)].join(" ");
    let wants_ellipsis = match policy {
        DescriptionEllipsis::WhenTruncated => truncated,
        DescriptionEllipsis::Always => true,
    };
    if wants_ellipsis && !out.ends_with(ELLIPSIS) {
        out.push_str(ELLIPSIS);
    }
    out
}
