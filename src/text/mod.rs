//! # Text Layout
//!
//! Line breaking for plain text runs. Breaks happen at whitespace only;
//! scripts without spaces are handled by the character fallback in
//! [`rich`], and plain text relies on the caller enabling `wrap` with a
//! sensible width.
//!
//! All widths come from the injected [`TextMeasurer`].

pub mod rich;

use crate::error::MeasureError;
use crate::font::TextMeasurer;
use crate::style::FontProps;

/// Appended by [`truncate_text`] and [`ellipsize`].
pub const DEFAULT_ELLIPSIS: &str = "...";

/// Break `text` into lines no wider than `max_width`.
///
/// Newlines always break. Each paragraph is filled greedily token by token,
/// where a token is a word or a run of whitespace. Committed lines are
/// trimmed. An empty paragraph yields an empty line. A single word wider
/// than `max_width` stays whole on its own line.
///
/// `max_width <= 0` disables wrapping.
pub fn wrap_text(
    measurer: &dyn TextMeasurer,
    text: &str,
    max_width: f64,
    font: &FontProps,
) -> Result<Vec<String>, MeasureError> {
    if max_width <= 0.0 {
        return Ok(vec![text.to_string()]);
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for token in split_keep_whitespace(paragraph) {
            let candidate = format!("{current}{token}");
            if !current.is_empty() && measurer.text_width(&candidate, font)? > max_width {
                lines.push(current.trim().to_string());
                current = token.trim_start().to_string();
            } else {
                current = candidate;
            }
        }
        if !current.is_empty() {
            lines.push(current.trim().to_string());
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    Ok(lines)
}

/// Shorten `text` to fit `max_width`, ending it with `ellipsis`.
///
/// Text that already fits is returned unchanged. If not even the ellipsis
/// fits, the bare ellipsis is returned.
pub fn truncate_text(
    measurer: &dyn TextMeasurer,
    text: &str,
    max_width: f64,
    font: &FontProps,
    ellipsis: &str,
) -> Result<String, MeasureError> {
    if measurer.text_width(text, font)? <= max_width {
        return Ok(text.to_string());
    }
    ellipsize(measurer, text, max_width, font, ellipsis)
}

/// Longest prefix of `text` that fits `max_width` together with `ellipsis`,
/// with the ellipsis always appended.
///
/// Used when trailing content was dropped, so the ellipsis must show even if
/// the kept text would fit on its own.
pub fn ellipsize(
    measurer: &dyn TextMeasurer,
    text: &str,
    max_width: f64,
    font: &FontProps,
    ellipsis: &str,
) -> Result<String, MeasureError> {
    let available = max_width - measurer.text_width(ellipsis, font)?;
    if available <= 0.0 {
        return Ok(ellipsis.to_string());
    }

    let keep = longest_fitting_prefix(measurer, text, available, font)?;
    Ok(format!("{}{}", char_prefix(text, keep), ellipsis))
}

/// Largest `n` such that the first `n` characters of `text` fit `available`.
///
/// Binary search; assumes width grows with length.
pub(crate) fn longest_fitting_prefix(
    measurer: &dyn TextMeasurer,
    text: &str,
    available: f64,
    font: &FontProps,
) -> Result<usize, MeasureError> {
    let mut left = 0;
    let mut right = text.chars().count();
    while left < right {
        let mid = (left + right + 1) / 2;
        if measurer.text_width(char_prefix(text, mid), font)? <= available {
            left = mid;
        } else {
            right = mid - 1;
        }
    }
    Ok(left)
}

/// The first `n` characters of `s`.
pub(crate) fn char_prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((byte, _)) => &s[..byte],
        None => s,
    }
}

/// Split into alternating word and whitespace tokens, keeping every byte.
pub(crate) fn split_keep_whitespace(s: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;
    for (i, ch) in s.char_indices() {
        let space = ch.is_whitespace();
        match in_space {
            Some(prev) if prev != space => {
                tokens.push(&s[start..i]);
                start = i;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if start < s.len() {
        tokens.push(&s[start..]);
    }
    tokens
}
