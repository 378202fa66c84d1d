//! # Style System
//!
//! Sizing values, alignment keywords and typography attributes shared by
//! every element kind. Values arrive in the same shape a JSON author writes
//! them (`"50%"`, `"fill"`, `{ "size": 14 }`) and are resolved here into
//! plain pixel numbers.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Font size used when neither a span nor its element specifies one.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Line height scale used when an element does not specify one.
pub const DEFAULT_LINE_HEIGHT: f64 = 1.2;

/// CSS color string. Interpreted by the renderer, never by layout.
pub type Color = String;

/// A width or height as declared on an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SizeRepr", into = "SizeRepr")]
pub enum Size {
    /// Absolute size in pixels.
    Px(f64),
    /// Percentage of the space the parent offers.
    Percent(f64),
    /// Size determined by content.
    Auto,
    /// All of the space the parent offers.
    Fill,
}

impl Size {
    pub fn percent(p: f64) -> Self {
        Size::Percent(p)
    }

    /// Resolve against the space on offer and the content-derived size.
    pub fn resolve(self, available: f64, intrinsic: f64) -> f64 {
        match self {
            Size::Px(v) => v,
            Size::Percent(p) => available * p / 100.0,
            Size::Auto => intrinsic,
            Size::Fill => available,
        }
    }

    /// True for sizes that cannot be known without the parent's allocation.
    pub fn needs_parent(self) -> bool {
        matches!(self, Size::Percent(_) | Size::Fill)
    }

    /// The pixel value of an absolute size.
    pub fn fixed(self) -> Option<f64> {
        match self {
            Size::Px(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for Size {
    fn from(v: f64) -> Self {
        Size::Px(v)
    }
}

impl FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "auto" => Ok(Size::Auto),
            "fill" => Ok(Size::Fill),
            _ => {
                if let Some(pct) = s.strip_suffix('%') {
                    pct.trim()
                        .parse::<f64>()
                        .map(Size::Percent)
                        .map_err(|_| format!("invalid percentage size {s:?}"))
                } else {
                    s.parse::<f64>()
                        .map(Size::Px)
                        .map_err(|_| format!("invalid size {s:?}, expected a number, \"<n>%\", \"auto\" or \"fill\""))
                }
            }
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Size::Px(v) => write!(f, "{v}"),
            Size::Percent(p) => write!(f, "{p}%"),
            Size::Auto => f.write_str("auto"),
            Size::Fill => f.write_str("fill"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SizeRepr {
    Number(f64),
    Keyword(String),
}

impl TryFrom<SizeRepr> for Size {
    type Error = String;

    fn try_from(repr: SizeRepr) -> Result<Self, Self::Error> {
        match repr {
            SizeRepr::Number(v) => Ok(Size::Px(v)),
            SizeRepr::Keyword(s) => s.parse(),
        }
    }
}

impl From<Size> for SizeRepr {
    fn from(size: Size) -> Self {
        match size {
            Size::Px(v) => SizeRepr::Number(v),
            other => SizeRepr::Keyword(other.to_string()),
        }
    }
}

/// Resolve an optional declared size. Undeclared behaves like `auto`.
pub fn resolve_size(size: Option<Size>, available: f64, intrinsic: f64) -> f64 {
    size.unwrap_or(Size::Auto).resolve(available, intrinsic)
}

pub fn size_needs_parent(size: Option<Size>) -> bool {
    size.is_some_and(Size::needs_parent)
}

/// Apply min then max. A max below the min wins.
pub fn clamp(value: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    let mut v = value;
    if let Some(min) = min {
        v = v.max(min);
    }
    if let Some(max) = max {
        v = v.min(max);
    }
    v
}

// ── Flex container keywords ────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlexDirection {
    #[default]
    Row,
    Column,
    RowReverse,
    ColumnReverse,
}

impl FlexDirection {
    pub fn is_row(self) -> bool {
        matches!(self, FlexDirection::Row | FlexDirection::RowReverse)
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, FlexDirection::RowReverse | FlexDirection::ColumnReverse)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Justify {
    #[default]
    Start,
    End,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Cross-axis alignment of a box's children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Start,
    End,
    Center,
    Stretch,
    Baseline,
}

/// Per-child override of the container's [`Align`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignSelf {
    #[default]
    Auto,
    Start,
    End,
    Center,
    Stretch,
    Baseline,
}

impl AlignSelf {
    pub fn resolve(self, container: Align) -> Align {
        match self {
            AlignSelf::Auto => container,
            AlignSelf::Start => Align::Start,
            AlignSelf::End => Align::End,
            AlignSelf::Center => Align::Center,
            AlignSelf::Stretch => Align::Stretch,
            AlignSelf::Baseline => Align::Baseline,
        }
    }
}

/// Placement of a stacked child along one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackAlign {
    #[default]
    Start,
    Center,
    End,
}

impl StackAlign {
    /// Offset of a child given the leftover space on this axis.
    pub fn offset(self, free: f64) -> f64 {
        match self {
            StackAlign::Start => 0.0,
            StackAlign::Center => free / 2.0,
            StackAlign::End => free,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

// ── Typography ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

/// Font attributes handed to the measurement service.
///
/// Every field is optional so that a rich-text span can override a single
/// attribute and inherit the rest from its element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    /// Numeric weight. `"normal"` and `"bold"` are accepted as 400 and 700.
    #[serde(default, deserialize_with = "de_font_weight", skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<FontStyle>,
}

impl FontProps {
    pub fn sized(size: f64) -> Self {
        FontProps {
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn size_or_default(&self) -> f64 {
        self.size.unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// Fill every unset attribute from `fallback`.
    pub fn merged_over(&self, fallback: &FontProps) -> FontProps {
        FontProps {
            family: self.family.clone().or_else(|| fallback.family.clone()),
            size: self.size.or(fallback.size),
            weight: self.weight.or(fallback.weight),
            style: self.style.or(fallback.style),
        }
    }

    /// CSS shorthand, e.g. `italic 700 14px Georgia`.
    pub fn css(&self) -> String {
        let style = match self.style.unwrap_or_default() {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
            FontStyle::Oblique => "oblique",
        };
        format!(
            "{} {} {}px {}",
            style,
            self.weight.unwrap_or(400),
            self.size_or_default(),
            self.family.as_deref().unwrap_or("sans-serif")
        )
    }
}

fn de_font_weight<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u16),
        Name(String),
    }

    match Option::<Repr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Repr::Number(n)) => Ok(Some(n)),
        Some(Repr::Name(name)) => match name.as_str() {
            "normal" => Ok(Some(400)),
            "bold" => Ok(Some(700)),
            other => other
                .parse::<u16>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("unknown font weight {other:?}"))),
        },
    }
}

/// Optional text styling carried by a span or by a rich-text element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontProps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
}

/// Fully resolved style of one rich-text segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font: FontProps,
    pub color: Option<Color>,
    pub background: Option<Color>,
    pub underline: bool,
    pub strikethrough: bool,
}

impl SpanStyle {
    /// Resolve field by field: own value, then `defaults`, then the fallback.
    /// Font attributes merge individually.
    pub fn resolve(&self, defaults: &SpanStyle) -> TextStyle {
        let font = match (&self.font, &defaults.font) {
            (Some(own), Some(inherited)) => own.merged_over(inherited),
            (Some(own), None) => own.clone(),
            (None, Some(inherited)) => inherited.clone(),
            (None, None) => FontProps::default(),
        };
        TextStyle {
            font,
            color: self.color.clone().or_else(|| defaults.color.clone()),
            background: self.background.clone().or_else(|| defaults.background.clone()),
            underline: self.underline.or(defaults.underline).unwrap_or(false),
            strikethrough: self.strikethrough.or(defaults.strikethrough).unwrap_or(false),
        }
    }
}
