//! # Layout Engine
//!
//! Turns an [`Element`] tree into a [`LayoutNode`] tree where every node has
//! an absolute position, a resolved size and, for text, its wrapped lines.
//! Nothing is painted here; the renderer consumes the result.
//!
//! ## How a pass works
//!
//! 1. The parent hands a child a [`Constraints`] box. An axis with
//!    `min == max` is *forced*: the parent already decided that size (flex
//!    share, stretch, percentage or `fill`).
//! 2. Unforced axes resolve from the element's declared size, falling back
//!    to its intrinsic size (see [`intrinsic`]).
//! 3. Containers place their children ([`box_layout`], [`stack`]) and
//!    recurse with a constraint box per child.
//! 4. Text nodes get their wrapped lines against the final content width.
//!
//! Every pass starts from scratch. The only state is the pass-local image
//! dimension cache and, when enabled, a pass-local measurement cache.

pub mod box_layout;
pub mod flex;
pub mod intrinsic;
pub mod print;
pub mod stack;

use std::cell::RefCell;
use std::collections::HashMap;

use log::{debug, trace};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{LayoutError, MeasureError};
use crate::font::{CachedMeasurer, TextMeasurer};
use crate::model::{Edges, Element, ElementKind, TextProps};
use crate::style::{clamp, resolve_size, Size, DEFAULT_LINE_HEIGHT};
use crate::text::rich::{wrap_rich_text, RichTextLine};
use crate::text::{ellipsize, truncate_text, wrap_text, DEFAULT_ELLIPSIS};

pub use intrinsic::IntrinsicSize;
pub use print::{layout_to_string, print_layout};

/// Engine settings. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Deepest element tree the engine will descend into.
    pub max_depth: usize,
    /// Memoise text measurements for the duration of one pass.
    pub cache_measurements: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            max_depth: 256,
            cache_measurements: false,
        }
    }
}

/// The size envelope a parent imposes on a child's margin box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    pub min_width: f64,
    pub max_width: f64,
    pub min_height: f64,
    pub max_height: f64,
}

impl Constraints {
    /// Anything from zero up to the given size.
    pub fn loose(max_width: f64, max_height: f64) -> Self {
        Constraints {
            min_width: 0.0,
            max_width,
            min_height: 0.0,
            max_height,
        }
    }

    /// Exactly the given size on both axes.
    pub fn tight(width: f64, height: f64) -> Self {
        Constraints {
            min_width: width,
            max_width: width,
            min_height: height,
            max_height: height,
        }
    }

    pub fn width_forced(&self) -> bool {
        self.min_width == self.max_width
    }

    pub fn height_forced(&self) -> bool {
        self.min_height == self.max_height
    }
}

/// Resolved geometry of one node, in absolute pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedLayout {
    /// Border-box origin (margin already applied).
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub content_x: f64,
    pub content_y: f64,
    pub content_width: f64,
    pub content_height: f64,
}

impl ComputedLayout {
    fn new(x: f64, y: f64, width: f64, height: f64, padding: Edges) -> Self {
        ComputedLayout {
            x,
            y,
            width,
            height,
            content_x: x + padding.left,
            content_y: y + padding.top,
            content_width: (width - padding.horizontal()).max(0.0),
            content_height: (height - padding.vertical()).max(0.0),
        }
    }
}

/// One positioned element of the output tree.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode<'a> {
    #[serde(rename = "type", serialize_with = "serialize_kind")]
    pub element: &'a Element,
    pub layout: ComputedLayout,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayoutNode<'a>>,
    /// Wrapped lines of a `text` element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<String>>,
    /// Middle-baseline correction per line of a `text` element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_offsets: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rich_lines: Option<Vec<RichTextLine>>,
}

fn serialize_kind<S: Serializer>(element: &&Element, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(element.kind_name())
}

impl LayoutNode<'_> {
    /// Move this node and its whole subtree.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        stack::apply_offset(self, dx, dy);
    }
}

/// Entry point for layout passes.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        LayoutEngine { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out `root` with its margin box at the origin.
    pub fn layout<'a>(
        &self,
        root: &'a Element,
        measurer: &dyn TextMeasurer,
        constraints: Constraints,
    ) -> Result<LayoutNode<'a>, LayoutError> {
        self.layout_at(root, measurer, constraints, 0.0, 0.0)
    }

    /// Lay out `root` with its margin box at `(x, y)`.
    pub fn layout_at<'a>(
        &self,
        root: &'a Element,
        measurer: &dyn TextMeasurer,
        constraints: Constraints,
        x: f64,
        y: f64,
    ) -> Result<LayoutNode<'a>, LayoutError> {
        if self.config.cache_measurements {
            let cached = CachedMeasurer::new(measurer);
            let result = LayoutPass::new(&cached, &self.config).layout_node(root, constraints, x, y, 0);
            let (hits, misses) = cached.stats();
            debug!("measurement cache: {hits} hits, {misses} misses");
            result
        } else {
            LayoutPass::new(measurer, &self.config).layout_node(root, constraints, x, y, 0)
        }
    }

    /// Natural size of `element` given the border-box width on offer.
    pub fn intrinsic_size(
        &self,
        element: &Element,
        measurer: &dyn TextMeasurer,
        available_width: f64,
    ) -> Result<IntrinsicSize, LayoutError> {
        LayoutPass::new(measurer, &self.config).measure_intrinsic(element, available_width, 0)
    }
}

/// Lay out `element` at the origin with a default engine.
pub fn compute_layout<'a>(
    element: &'a Element,
    measurer: &dyn TextMeasurer,
    constraints: Constraints,
) -> Result<LayoutNode<'a>, LayoutError> {
    LayoutEngine::new().layout(element, measurer, constraints)
}

/// State of a single layout pass.
pub(crate) struct LayoutPass<'p> {
    measurer: &'p dyn TextMeasurer,
    config: &'p LayoutConfig,
    image_dims: RefCell<HashMap<String, Option<(u32, u32)>>>,
}

impl<'p> LayoutPass<'p> {
    fn new(measurer: &'p dyn TextMeasurer, config: &'p LayoutConfig) -> Self {
        LayoutPass {
            measurer,
            config,
            image_dims: RefCell::new(HashMap::new()),
        }
    }

    fn check_depth(&self, depth: usize) -> Result<(), LayoutError> {
        if depth >= self.config.max_depth {
            return Err(LayoutError::DepthLimitExceeded {
                limit: self.config.max_depth,
            });
        }
        Ok(())
    }

    /// Resolve `element` inside `constraints` with its margin box at `(x, y)`.
    pub(crate) fn layout_node<'a>(
        &self,
        element: &'a Element,
        constraints: Constraints,
        x: f64,
        y: f64,
        depth: usize,
    ) -> Result<LayoutNode<'a>, LayoutError> {
        self.check_depth(depth)?;
        let props = &element.props;
        let margin = props.margin;

        let avail_w = (constraints.max_width - margin.horizontal()).max(0.0);
        let avail_h = (constraints.max_height - margin.vertical()).max(0.0);
        let forced_w = constraints.width_forced();
        let forced_h = constraints.height_forced();

        let needs_intrinsic = (!forced_w && is_auto(props.width)) || (!forced_h && is_auto(props.height));
        let intrinsic = if needs_intrinsic {
            if forced_w {
                self.measure_intrinsic_at(element, avail_w, depth)?
            } else {
                self.measure_intrinsic(element, measure_width(element, avail_w), depth)?
            }
        } else {
            IntrinsicSize::default()
        };

        let width = if forced_w {
            avail_w
        } else {
            clamp(resolve_size(props.width, avail_w, intrinsic.width), props.min_width, props.max_width)
        };
        let height = if forced_h {
            avail_h
        } else {
            clamp(resolve_size(props.height, avail_h, intrinsic.height), props.min_height, props.max_height)
        };

        let layout = ComputedLayout::new(x + margin.left, y + margin.top, width, height, props.padding);
        trace!(
            "{} @({:.1},{:.1}) {:.1}x{:.1}",
            element.kind_name(),
            layout.x,
            layout.y,
            layout.width,
            layout.height
        );

        let mut node = LayoutNode {
            element,
            layout,
            children: Vec::new(),
            lines: None,
            line_offsets: None,
            rich_lines: None,
        };

        match &element.kind {
            ElementKind::Box(b) => node.children = self.layout_box_children(b, &layout, depth)?,
            ElementKind::Stack(s) => node.children = self.layout_stack_children(s, &layout, depth)?,
            ElementKind::Transform(t) => node.children = vec![self.layout_overlay_child(&t.child, &layout, depth)?],
            ElementKind::CustomDraw(c) => {
                if let Some(child) = &c.child {
                    node.children = vec![self.layout_overlay_child(child, &layout, depth)?];
                }
            }
            ElementKind::Text(t) => {
                let (lines, offsets) = self.text_lines(t, layout.content_width)?;
                node.lines = Some(lines);
                node.line_offsets = Some(offsets);
            }
            ElementKind::RichText(r) => {
                let lines = wrap_rich_text(
                    self.measurer,
                    &r.spans,
                    layout.content_width,
                    r.line_height.unwrap_or(DEFAULT_LINE_HEIGHT),
                    &r.defaults,
                )?;
                node.rich_lines = Some(lines);
            }
            ElementKind::Image(_) | ElementKind::Svg(_) => {}
        }

        Ok(node)
    }

    /// Lines of a text element and the baseline correction of each.
    fn text_lines(&self, text: &TextProps, content_width: f64) -> Result<(Vec<String>, Vec<f64>), LayoutError> {
        let font = text.font.clone().unwrap_or_default();
        let lines = if text.wrap && content_width > 0.0 {
            let mut lines = wrap_text(self.measurer, &text.content, content_width, &font)?;
            if let Some(max) = text.max_lines.filter(|&m| m > 0) {
                if lines.len() > max {
                    lines.truncate(max);
                    if text.ellipsis {
                        if let Some(last) = lines.last_mut() {
                            let shortened = ellipsize(self.measurer, last.as_str(), content_width, &font, DEFAULT_ELLIPSIS)?;
                            *last = shortened;
                        }
                    }
                }
            }
            lines
        } else if text.ellipsis && content_width > 0.0 {
            vec![truncate_text(self.measurer, &text.content, content_width, &font, DEFAULT_ELLIPSIS)?]
        } else {
            vec![text.content.clone()]
        };

        let offsets = lines
            .iter()
            .map(|line| Ok(self.measurer.measure_text(line, &font)?.offset))
            .collect::<Result<Vec<f64>, MeasureError>>()?;
        Ok((lines, offsets))
    }
}

fn is_auto(size: Option<Size>) -> bool {
    matches!(size, None | Some(Size::Auto))
}

/// Border-box width to measure `element` at when `available` is on offer:
/// its own width when that is known without content, clamped to its limits.
pub(crate) fn measure_width(element: &Element, available: f64) -> f64 {
    let props = &element.props;
    let width = match props.width {
        Some(Size::Px(v)) => v,
        Some(size @ (Size::Percent(_) | Size::Fill)) if available.is_finite() => size.resolve(available, 0.0),
        _ => available,
    };
    clamp(width, props.min_width, props.max_width)
}
