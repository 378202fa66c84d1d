//! Structured error types for the layout engine.
//!
//! Layout itself never fails on odd input: missing fields default and
//! negative space clamps to zero. What can fail is the measurement service,
//! the depth guard, and parsing JSON input.

use thiserror::Error;

/// Failure reported by a [`TextMeasurer`](crate::font::TextMeasurer).
///
/// The engine passes these through untouched.
#[derive(Debug, Error)]
pub enum MeasureError {
    #[error("invalid metrics for {text:?}: {reason}")]
    InvalidMetrics { text: String, reason: String },
    #[error("font unavailable: {0}")]
    FontUnavailable(String),
    #[error("failed to parse font data: {0}")]
    FontParse(String),
}

/// The error type returned by every public layout entry point.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error(transparent)]
    Measure(#[from] MeasureError),
    #[error("element tree is deeper than the configured limit of {limit}")]
    DepthLimitExceeded { limit: usize },
    #[error("failed to parse document: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {hint}")
    }
}

impl From<serde_json::Error> for LayoutError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but is not an element tree. Every element needs a \"type\" of box, text, richtext, image, svg, stack, transform or customdraw.".to_string()
            }
            serde_json::error::Category::Eof => "Unexpected end of input. Is the JSON truncated?".to_string(),
            serde_json::error::Category::Io => String::new(),
        };
        LayoutError::Parse { source: e, hint }
    }
}

/// Failure while probing an image source for its pixel dimensions.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("invalid data URI: missing comma")]
    InvalidDataUri,
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image data too short")]
    TooShort,
    #[error("format detection failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("unreadable image: {0}")]
    Decode(#[from] image::ImageError),
}
