//! Talent text markup.
//!
//! Talent descriptions from the detail API wrap highlighted phrases in
//! `<color=#RRGGBB>...</color>` tags and may HTML-escape the angle
//! brackets. The text is split into spans so it can be rendered or flattened,
//! never shown raw.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// A run of text with an optional highlight color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSpan {
    pub text: String,
    /// The color exactly as written in the tag, e.g. `#FFFFFF`.
    pub color: Option<String>,
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"<color=([^>]*)>|</color>").expect("color tag pattern is a valid regex")
    })
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Split marked-up text into spans.
///
/// Tags do not nest: a new `<color=...>` replaces the current color and
/// `</color>` resets it. Empty runs are dropped.
///
/// # Examples
///
/// ```rust
/// use zzplan::markup::parse_markup;
///
/// let spans = parse_markup("ATK +<color=#2BAD00>12%</color>.");
/// assert_eq!(spans.len(), 3);
/// assert_eq!(spans[1].text, "12%");
/// assert_eq!(spans[1].color.as_deref(), Some("#2BAD00"));
/// ```
pub fn parse_markup(text: &str) -> Vec<TextSpan> {
    let text = unescape(text);
    let mut spans = Vec::new();
    let mut color: Option<String> = None;
    let mut cursor = 0;

    let mut push = |run: &str, color: &Option<String>| {
        if !run.is_empty() {
            spans.push(TextSpan {
                text: run.to_string(),
                color: color.clone(),
            });
        }
    };

    for captures in tag_pattern().captures_iter(&text) {
        let Some(tag) = captures.get(0) else { continue };
        push(&text[cursor..tag.start()], &color);
        color = captures.get(1).map(|c| c.as_str().to_string());
        cursor = tag.end();
    }
    push(&text[cursor..], &color);

    spans
}

/// Flatten marked-up text to plain text.
pub fn strip_markup(text: &str) -> String {
    parse_markup(text).into_iter().map(|span| span.text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_one_span() {
        let spans = parse_markup("Increases ATK.");
        assert_eq!(
            spans,
            vec![TextSpan {
                text: "Increases ATK.".to_string(),
                color: None
            }]
        );
    }

    #[test]
    fn test_escaped_tags_are_parsed() {
        let text = "Gain &lt;color=#FFAF2A&gt;Energy&lt;/color&gt; &amp; more";
        assert_eq!(strip_markup(text), "Gain Energy & more");
        let spans = parse_markup(text);
        assert_eq!(spans[1].color.as_deref(), Some("#FFAF2A"));
        assert_eq!(spans[2].color, None);
    }

    #[test]
    fn test_adjacent_tags_leave_no_empty_spans() {
        let spans = parse_markup("<color=#111111>a</color><color=#222222>b</color>");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].color.as_deref(), Some("#111111"));
        assert_eq!(spans[1].text, "b");
    }

    #[test]
    fn test_unclosed_tag_colors_the_rest() {
        let spans = parse_markup("x<color=#ABCDEF>rest");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].color.as_deref(), Some("#ABCDEF"));
    }
}
