//! # Element Model
//!
//! The input representation for the layout engine. A drawing is a tree of
//! elements, each a kind-specific payload plus the layout properties every
//! kind shares. The tree owns its children by value, so it is built bottom-up
//! and can never contain a cycle.
//!
//! The JSON shape is flat, the way a hand-written scene reads:
//!
//! ```json
//! { "type": "box", "width": 300, "direction": "row", "gap": 8,
//!   "children": [{ "type": "text", "content": "Hello", "flex": 1 }] }
//! ```

use crate::layout::{ComputedLayout, LayoutConfig};
use crate::style::{
    AlignSelf, Color, FlexDirection, FontProps, Justify, Align, Size, SpanStyle, StackAlign,
    TextAlign, VerticalAlign,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A complete layout request read from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Outer box the root element is laid out in.
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub config: LayoutConfig,
    pub root: Element,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Edge values (top, right, bottom, left) used for margin and padding.
///
/// Deserializes from a single number or from an object with any subset of
/// the four sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "EdgesRepr")]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

impl From<f64> for Edges {
    fn from(v: f64) -> Self {
        Edges::uniform(v)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EdgesRepr {
    Uniform(f64),
    Sides {
        #[serde(default)]
        top: f64,
        #[serde(default)]
        right: f64,
        #[serde(default)]
        bottom: f64,
        #[serde(default)]
        left: f64,
    },
}

impl From<EdgesRepr> for Edges {
    fn from(repr: EdgesRepr) -> Self {
        match repr {
            EdgesRepr::Uniform(v) => Edges::uniform(v),
            EdgesRepr::Sides {
                top,
                right,
                bottom,
                left,
            } => Edges::new(top, right, bottom, left),
        }
    }
}

/// Layout properties shared by every element kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<f64>,
    pub margin: Edges,
    pub padding: Edges,
    /// Share of the leftover main-axis space. Zero means fixed size.
    pub flex: f64,
    pub align_self: AlignSelf,
}

/// A node of the drawing tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    #[serde(flatten)]
    pub kind: ElementKind,
    #[serde(flatten)]
    pub props: LayoutProps,
}

/// The kind-specific payload of an element.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    /// Flex container.
    Box(BoxProps),
    Text(TextProps),
    RichText(RichTextProps),
    Image(ImageProps),
    Svg(SvgProps),
    /// Children overlap, aligned inside the content box.
    Stack(StackProps),
    /// Paint-time transform around a single child. Never affects layout.
    Transform(TransformProps),
    /// Escape hatch for caller-drawn content.
    CustomDraw(CustomDrawProps),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Border {
    #[serde(default)]
    pub width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default)]
    pub radius: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoxProps {
    pub direction: FlexDirection,
    pub justify: Justify,
    pub align: Align,
    pub gap: f64,
    pub wrap: bool,
    pub children: Vec<Element>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    pub clip: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextProps {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<FontProps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    pub align: TextAlign,
    pub vertical_align: VerticalAlign,
    /// Multiple of the font size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<usize>,
    pub ellipsis: bool,
    pub wrap: bool,
}

/// A run of text with optional style overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    #[serde(flatten)]
    pub style: SpanStyle,
}

impl Span {
    pub fn new(text: impl Into<String>) -> Self {
        Span {
            text: text.into(),
            style: SpanStyle::default(),
        }
    }

    pub fn styled(text: impl Into<String>, style: SpanStyle) -> Self {
        Span {
            text: text.into(),
            style,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RichTextProps {
    pub spans: Vec<Span>,
    /// Styling inherited by every span that does not override it.
    #[serde(flatten)]
    pub defaults: SpanStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    pub align: TextAlign,
    pub vertical_align: VerticalAlign,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageFit {
    Contain,
    Cover,
    #[default]
    Fill,
    None,
    ScaleDown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageProps {
    /// Data URI or raw base64 image data. Other sources are resolved by the
    /// renderer and need `naturalWidth`/`naturalHeight` for auto sizing.
    pub src: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub natural_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub natural_height: Option<f64>,
    pub fit: ImageFit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SvgProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_box: Option<ViewBox>,
    /// Markup handed to the renderer as-is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markup: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StackProps {
    pub children: Vec<Element>,
    /// Horizontal placement.
    pub align: StackAlign,
    /// Vertical placement.
    pub justify: StackAlign,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    pub clip: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformProps {
    #[serde(rename = "children")]
    pub child: std::boxed::Box<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<(f64, f64)>,
    /// Degrees, clockwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<(f64, f64)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skew: Option<(f64, f64)>,
    /// Pivot as fractions of the element box. Defaults to the centre.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDrawProps {
    #[serde(skip)]
    pub draw: Option<DrawHook>,
    #[serde(default, rename = "children", skip_serializing_if = "Option::is_none")]
    pub child: Option<std::boxed::Box<Element>>,
}

/// Caller-supplied paint callback. Receives the renderer's drawing context
/// and the element's resolved layout.
#[derive(Clone)]
pub struct DrawHook(Arc<dyn Fn(&mut dyn Any, &ComputedLayout) + Send + Sync>);

impl DrawHook {
    pub fn new(f: impl Fn(&mut dyn Any, &ComputedLayout) + Send + Sync + 'static) -> Self {
        DrawHook(Arc::new(f))
    }

    pub fn call(&self, ctx: &mut dyn Any, layout: &ComputedLayout) {
        (self.0)(ctx, layout)
    }
}

impl fmt::Debug for DrawHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DrawHook(..)")
    }
}

// ── Construction ───────────────────────────────────────────────

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Element {
            kind,
            props: LayoutProps::default(),
        }
    }

    pub fn container(props: BoxProps) -> Self {
        Element::new(ElementKind::Box(props))
    }

    pub fn text(content: impl Into<String>) -> Self {
        Element::new(ElementKind::Text(TextProps {
            content: content.into(),
            ..Default::default()
        }))
    }

    pub fn text_with(props: TextProps) -> Self {
        Element::new(ElementKind::Text(props))
    }

    pub fn rich_text(props: RichTextProps) -> Self {
        Element::new(ElementKind::RichText(props))
    }

    pub fn image(props: ImageProps) -> Self {
        Element::new(ElementKind::Image(props))
    }

    pub fn svg(props: SvgProps) -> Self {
        Element::new(ElementKind::Svg(props))
    }

    pub fn stack(props: StackProps) -> Self {
        Element::new(ElementKind::Stack(props))
    }

    pub fn transform(child: Element) -> Self {
        Element::new(ElementKind::Transform(TransformProps {
            child: std::boxed::Box::new(child),
            translate: None,
            rotate: None,
            scale: None,
            skew: None,
            origin: None,
        }))
    }

    pub fn custom_draw(draw: Option<DrawHook>, child: Option<Element>) -> Self {
        Element::new(ElementKind::CustomDraw(CustomDrawProps {
            draw,
            child: child.map(std::boxed::Box::new),
        }))
    }

    pub fn width(mut self, width: impl Into<Size>) -> Self {
        self.props.width = Some(width.into());
        self
    }

    pub fn height(mut self, height: impl Into<Size>) -> Self {
        self.props.height = Some(height.into());
        self
    }

    pub fn size(self, width: impl Into<Size>, height: impl Into<Size>) -> Self {
        self.width(width).height(height)
    }

    pub fn min_width(mut self, v: f64) -> Self {
        self.props.min_width = Some(v);
        self
    }

    pub fn max_width(mut self, v: f64) -> Self {
        self.props.max_width = Some(v);
        self
    }

    pub fn min_height(mut self, v: f64) -> Self {
        self.props.min_height = Some(v);
        self
    }

    pub fn max_height(mut self, v: f64) -> Self {
        self.props.max_height = Some(v);
        self
    }

    pub fn margin(mut self, margin: impl Into<Edges>) -> Self {
        self.props.margin = margin.into();
        self
    }

    pub fn padding(mut self, padding: impl Into<Edges>) -> Self {
        self.props.padding = padding.into();
        self
    }

    pub fn flex(mut self, factor: f64) -> Self {
        self.props.flex = factor;
        self
    }

    pub fn align_self(mut self, align: AlignSelf) -> Self {
        self.props.align_self = align;
        self
    }

    /// The JSON `type` tag.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ElementKind::Box(_) => "box",
            ElementKind::Text(_) => "text",
            ElementKind::RichText(_) => "richtext",
            ElementKind::Image(_) => "image",
            ElementKind::Svg(_) => "svg",
            ElementKind::Stack(_) => "stack",
            ElementKind::Transform(_) => "transform",
            ElementKind::CustomDraw(_) => "customdraw",
        }
    }

    /// Direct children, in declaration order.
    pub fn children(&self) -> Vec<&Element> {
        match &self.kind {
            ElementKind::Box(b) => b.children.iter().collect(),
            ElementKind::Stack(s) => s.children.iter().collect(),
            ElementKind::Transform(t) => vec![&*t.child],
            ElementKind::CustomDraw(c) => c.child.iter().map(|c| &**c).collect(),
            ElementKind::Text(_) | ElementKind::RichText(_) | ElementKind::Image(_) | ElementKind::Svg(_) => {
                vec![]
            }
        }
    }
}
