//! # Drawcall
//!
//! A layout engine for declarative drawing trees.
//!
//! A drawing is described as a tree of elements (boxes, text, rich text,
//! images, SVGs, stacks, transforms and custom-draw hooks). The engine
//! resolves every element to an absolute position and size, wraps its text,
//! and hands the result to whatever renderer sits downstream. It never draws
//! anything itself and never measures glyphs itself: text metrics come from
//! a [`TextMeasurer`] supplied by the caller, so the same tree lays out the
//! same way against a canvas, a PDF backend or a test double.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    — Element tree: kinds, payloads, layout props
//!       ↓
//!   [style]    — Sizes, keywords, span style inheritance
//!       ↓
//!   [layout]   — Intrinsic sizing, flex and stack algorithms
//!       ↓         ↳ [text] wrapping, truncation, rich-text lines
//!       ↓         ↳ [font] TextMeasurer implementations
//!   LayoutNode tree (absolute coordinates) → renderer
//! ```
//!
//! ## Example
//!
//! ```
//! use drawcall::{compute_layout, BoxProps, Constraints, Element, MonospaceMeasurer};
//!
//! let tree = Element::container(BoxProps {
//!     gap: 10.0,
//!     children: vec![Element::text("Hello"), Element::text("world").flex(1.0)],
//!     ..Default::default()
//! })
//! .width(300.0);
//!
//! let layout = compute_layout(&tree, &MonospaceMeasurer::default(), Constraints::loose(800.0, 600.0)).unwrap();
//! assert_eq!(layout.children[1].layout.x, 50.0);
//! ```

pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod style;
pub mod text;

pub use error::{ImageError, LayoutError, MeasureError};
pub use font::{CachedMeasurer, FontFaceMeasurer, MonospaceMeasurer, TextMeasurer, TextMetrics};
pub use layout::{
    compute_layout, layout_to_string, print_layout, ComputedLayout, Constraints, IntrinsicSize, LayoutConfig,
    LayoutEngine, LayoutNode,
};
pub use model::{
    BoxProps, CustomDrawProps, Document, DrawHook, Edges, Element, ElementKind, ImageProps, RichTextProps, Span,
    StackProps, SvgProps, TextProps, TransformProps, Viewport,
};
pub use style::{Align, AlignSelf, FlexDirection, FontProps, Justify, Size, SpanStyle, StackAlign};

/// Parse a JSON document.
pub fn parse_document(json: &str) -> Result<Document, LayoutError> {
    Ok(serde_json::from_str(json)?)
}

/// Lay out a parsed document's root inside its viewport, using the
/// document's own engine settings.
pub fn layout_document<'a>(
    document: &'a Document,
    measurer: &dyn TextMeasurer,
) -> Result<LayoutNode<'a>, LayoutError> {
    let engine = LayoutEngine::with_config(document.config.clone());
    let constraints = Constraints::loose(document.viewport.width, document.viewport.height);
    engine.layout(&document.root, measurer, constraints)
}
