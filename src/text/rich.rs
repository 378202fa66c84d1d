//! Multi-style line breaking.
//!
//! Spans are resolved against the element's default style, cut into word
//! and whitespace tokens, and packed into lines. A token wider than a whole
//! line is split character by character, which is how CJK text (no spaces
//! to break at) ends up wrapping.
//!
//! Whitespace is dropped at wrap breaks. A whitespace token that would
//! overflow is dropped at the break rather than opening the next line, and
//! whitespace segments left at the end of a committed line are removed, so
//! wrapped line widths end at the last word.
//!
//! Each committed line gets one shared baseline. Segments of different
//! sizes are placed so their ink boxes sit on that baseline instead of the
//! tallest segment's own baseline.

use super::{char_prefix, longest_fitting_prefix, split_keep_whitespace};
use crate::error::MeasureError;
use crate::font::{TextMeasurer, TextMetrics};
use crate::model::Span;
use crate::style::{SpanStyle, TextStyle};
use serde::Serialize;

/// A fully styled, measured piece of one span on one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RichTextSegment {
    pub text: String,
    pub style: TextStyle,
    pub width: f64,
    /// `font size × line height` of the segment's span.
    pub height: f64,
    pub ascent: f64,
    pub descent: f64,
    pub offset: f64,
}

impl RichTextSegment {
    /// Distance from the ink top to the middle baseline.
    pub fn top_distance(&self) -> f64 {
        self.ascent - self.offset
    }

    /// Distance from the middle baseline to the ink bottom.
    pub fn bottom_distance(&self) -> f64 {
        self.descent + self.offset
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RichTextLine {
    /// Left to right, no gaps.
    pub segments: Vec<RichTextSegment>,
    pub width: f64,
    pub height: f64,
    /// Shared baseline, measured from the top of the line.
    pub baseline: f64,
}

impl RichTextLine {
    /// The plain text of the line.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

#[derive(Default)]
struct LineBuilder {
    segments: Vec<RichTextSegment>,
    width: f64,
}

impl LineBuilder {
    fn push(&mut self, segment: RichTextSegment) {
        self.width += segment.width;
        self.segments.push(segment);
    }

    fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Commit the pending segments as a line. No-op when empty.
    fn commit(&mut self, lines: &mut Vec<RichTextLine>) {
        if self.segments.is_empty() {
            return;
        }
        let mut segments = std::mem::take(&mut self.segments);
        self.width = 0.0;
        // Trailing whitespace hangs past the line end.
        while segments.len() > 1 && segments.last().is_some_and(|s| s.text.chars().all(char::is_whitespace)) {
            segments.pop();
        }
        let width = segments.iter().map(|s| s.width).sum();

        let max_top = segments.iter().map(RichTextSegment::top_distance).fold(f64::NEG_INFINITY, f64::max);
        let max_bottom = segments
            .iter()
            .map(RichTextSegment::bottom_distance)
            .fold(f64::NEG_INFINITY, f64::max);
        let max_segment = segments.iter().map(|s| s.height).fold(0.0, f64::max);

        let content_height = max_top + max_bottom;
        let height = content_height.max(max_segment);
        lines.push(RichTextLine {
            segments,
            width,
            height,
            baseline: max_top + (height - content_height) / 2.0,
        });
    }
}

/// Break `spans` into lines no wider than `max_width`.
///
/// `line_height` is the scale applied to each span's font size. Whitespace
/// at a break is dropped from both lines (see the module docs).
/// `max_width <= 0` keeps everything on one line. Never returns an empty
/// vector: no text yields one empty line.
pub fn wrap_rich_text(
    measurer: &dyn TextMeasurer,
    spans: &[Span],
    max_width: f64,
    line_height: f64,
    defaults: &SpanStyle,
) -> Result<Vec<RichTextLine>, MeasureError> {
    let wrapping = max_width > 0.0 && max_width.is_finite();
    let mut lines = Vec::new();
    let mut line = LineBuilder::default();

    for span in spans {
        let style = span.style.resolve(defaults);
        let segment_height = style.font.size_or_default() * line_height;
        let segment = |text: &str, m: TextMetrics| RichTextSegment {
            text: text.to_string(),
            style: style.clone(),
            width: m.width,
            height: segment_height,
            ascent: m.ascent,
            descent: m.descent,
            offset: m.offset,
        };

        for token in split_keep_whitespace(&span.text) {
            let metrics = measurer.measure_text(token, &style.font)?;
            if !wrapping || line.width + metrics.width <= max_width {
                line.push(segment(token, metrics));
                continue;
            }

            if token.chars().all(char::is_whitespace) {
                line.commit(&mut lines);
                continue;
            }

            if metrics.width <= max_width {
                line.commit(&mut lines);
                line.push(segment(token, metrics));
                continue;
            }

            // Wider than a whole line: fill remaining space character-wise.
            let mut rest = token;
            while !rest.is_empty() {
                let room = max_width - line.width;
                let mut take = longest_fitting_prefix(measurer, rest, room, &style.font)?;
                if take == 0 {
                    if !line.is_empty() {
                        line.commit(&mut lines);
                        continue;
                    }
                    take = 1;
                }
                let piece = char_prefix(rest, take);
                let metrics = measurer.measure_text(piece, &style.font)?;
                line.push(segment(piece, metrics));
                rest = &rest[piece.len()..];
                if !rest.is_empty() {
                    line.commit(&mut lines);
                }
            }
        }
    }
    line.commit(&mut lines);

    if lines.is_empty() {
        lines.push(RichTextLine::default());
    }
    Ok(lines)
}
