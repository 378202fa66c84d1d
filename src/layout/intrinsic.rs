//! # Intrinsic Sizing
//!
//! The natural size of an element before any parent stretches or squeezes
//! it. One strategy per element kind; the `match` in
//! [`LayoutPass::measure_intrinsic`] is exhaustive so a new kind cannot be
//! forgotten here.
//!
//! `available_width` is always the border-box width on offer. Content wraps
//! at that width minus padding. It may be infinite when nothing bounds the
//! element horizontally.

use log::debug;
use serde::Serialize;

use super::{flex, measure_width, LayoutPass};
use crate::error::LayoutError;
use crate::image_loader;
use crate::model::{BoxProps, Element, ElementKind, ImageProps, StackProps, SvgProps, TextProps};
use crate::style::{clamp, size_needs_parent, Size, DEFAULT_LINE_HEIGHT};
use crate::text::rich::{wrap_rich_text, RichTextLine, RichTextSegment};
use crate::text::wrap_text;

/// Natural border-box size of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct IntrinsicSize {
    pub width: f64,
    pub height: f64,
}

impl IntrinsicSize {
    pub fn new(width: f64, height: f64) -> Self {
        IntrinsicSize { width, height }
    }
}

impl LayoutPass<'_> {
    /// Natural size of `element`. Absolute declared sizes win over content,
    /// and min/max limits apply last.
    pub(crate) fn measure_intrinsic(
        &self,
        element: &Element,
        available_width: f64,
        depth: usize,
    ) -> Result<IntrinsicSize, LayoutError> {
        // An absolute width governs wrapping unless the caller already knows
        // the final width.
        let available_width = match element.props.width {
            Some(Size::Px(w)) => w,
            _ => available_width,
        };
        self.measure_intrinsic_at(element, available_width, depth)
    }

    /// Natural size of `element` wrapped at exactly `width`, for callers that
    /// have already settled the border-box width (forced or flex-resolved).
    /// The declared height and min/max limits still apply.
    pub(crate) fn measure_intrinsic_at(
        &self,
        element: &Element,
        width: f64,
        depth: usize,
    ) -> Result<IntrinsicSize, LayoutError> {
        self.check_depth(depth)?;
        let props = &element.props;
        let available_width = width;

        let size = match &element.kind {
            ElementKind::Box(b) => self.measure_box(element, b, available_width, depth)?,
            ElementKind::Stack(s) => self.measure_stack(element, s, available_width, depth)?,
            ElementKind::Text(t) => self.measure_text_element(element, t, available_width)?,
            ElementKind::RichText(r) => {
                let inner = available_width - props.padding.horizontal();
                let lines = wrap_rich_text(
                    self.measurer,
                    &r.spans,
                    inner,
                    r.line_height.unwrap_or(DEFAULT_LINE_HEIGHT),
                    &r.defaults,
                )?;
                IntrinsicSize::new(
                    lines.iter().map(|l| l.width).fold(0.0, f64::max) + props.padding.horizontal(),
                    lines.iter().map(|l| l.height).sum::<f64>() + props.padding.vertical(),
                )
            }
            ElementKind::Image(img) => self.measure_image(element, img),
            ElementKind::Svg(svg) => measure_svg(element, svg),
            ElementKind::Transform(t) => self.measure_intrinsic(&t.child, available_width, depth + 1)?,
            ElementKind::CustomDraw(c) => match (props.width.and_then(|w| w.fixed()), props.height.and_then(|h| h.fixed()), &c.child) {
                (Some(w), Some(h), _) => IntrinsicSize::new(w, h),
                (_, _, Some(child)) => self.measure_intrinsic(child, available_width, depth + 1)?,
                _ => IntrinsicSize::default(),
            },
        };

        Ok(IntrinsicSize {
            width: clamp(
                props.width.and_then(|w| w.fixed()).unwrap_or(size.width),
                props.min_width,
                props.max_width,
            ),
            height: clamp(
                props.height.and_then(|h| h.fixed()).unwrap_or(size.height),
                props.min_height,
                props.max_height,
            ),
        })
    }

    fn measure_text_element(
        &self,
        element: &Element,
        text: &TextProps,
        available_width: f64,
    ) -> Result<IntrinsicSize, LayoutError> {
        let padding = element.props.padding;
        let font = text.font.clone().unwrap_or_default();
        let line_height = font.size_or_default() * text.line_height.unwrap_or(DEFAULT_LINE_HEIGHT);
        let inner = available_width - padding.horizontal();

        let (width, height) = if text.wrap && inner > 0.0 && inner.is_finite() {
            let mut lines = wrap_text(self.measurer, &text.content, inner, &font)?;
            if let Some(max) = text.max_lines.filter(|&m| m > 0) {
                lines.truncate(max);
            }
            let mut widest: f64 = 0.0;
            for line in &lines {
                widest = widest.max(self.measurer.text_width(line, &font)?);
            }
            (widest, lines.len() as f64 * line_height)
        } else {
            let m = self.measurer.measure_text(&text.content, &font)?;
            (m.width, m.height.max(line_height))
        };

        Ok(IntrinsicSize::new(width + padding.horizontal(), height + padding.vertical()))
    }

    fn remeasure_flex_line(
        &self,
        b: &BoxProps,
        line: &flex::WrapLine,
        inner: f64,
        mains: &[f64],
        crosses: &mut [f64],
        depth: usize,
    ) -> Result<(), LayoutError> {
        let children = &b.children[line.start..line.end];
        if children.iter().all(|c| c.props.flex <= 0.0) {
            return Ok(());
        }
        let gaps = b.gap * line.len().saturating_sub(1) as f64;
        let mut fixed = 0.0;
        for (child, &main) in children.iter().zip(&mains[line.start..line.end]) {
            fixed += if child.props.flex > 0.0 {
                child.props.margin.horizontal()
            } else {
                main
            };
        }
        let factors: Vec<f64> = children.iter().map(|c| c.props.flex).collect();
        let shares = flex::distribute_flex(&factors, inner - fixed - gaps);
        for (i, (child, share)) in children.iter().zip(shares).enumerate() {
            if child.props.flex > 0.0 {
                let width = clamp(share, child.props.min_width, child.props.max_width);
                let size = self.measure_intrinsic_at(child, width, depth + 1)?;
                crosses[line.start + i] = size.height + child.props.margin.vertical();
            }
        }
        Ok(())
    }

    fn measure_box(
        &self,
        element: &Element,
        b: &BoxProps,
        available_width: f64,
        depth: usize,
    ) -> Result<IntrinsicSize, LayoutError> {
        let padding = element.props.padding;
        let inner = (available_width - padding.horizontal()).max(0.0);
        let row = b.direction.is_row();

        let mut mains = Vec::with_capacity(b.children.len());
        let mut crosses = Vec::with_capacity(b.children.len());
        for child in &b.children {
            let margin = child.props.margin;
            let child_avail = (inner - margin.horizontal()).max(0.0);
            let child_width = measure_width(child, child_avail);
            let size = self.measure_intrinsic(child, child_width, depth + 1)?;
            // Percentage and fill widths resolve against a bounded row here
            // exactly as they will during layout.
            let width = if size_needs_parent(child.props.width) && inner.is_finite() {
                child_width
            } else {
                size.width
            };
            let outer_w = width + margin.horizontal();
            let outer_h = size.height + margin.vertical();
            if row {
                mains.push(outer_w);
                crosses.push(outer_h);
            } else {
                mains.push(outer_h);
                crosses.push(outer_w);
            }
        }

        // Wrapping needs a bound on the main axis: the row's width on offer,
        // or a column's declared height.
        let bound = if !b.wrap {
            None
        } else if row {
            Some(inner)
        } else {
            element
                .props
                .height
                .and_then(|h| h.fixed())
                .map(|h| (h - padding.vertical()).max(0.0))
        };

        let lines = match bound {
            Some(bound) if bound.is_finite() => flex::partition_into_lines(&mains, b.gap, bound),
            _ if mains.is_empty() => vec![],
            _ => vec![flex::WrapLine {
                start: 0,
                end: mains.len(),
            }],
        };

        // Flex children in a bounded row wrap at their share, so their height
        // comes from the share rather than the hypothetical width.
        if row && inner.is_finite() {
            for line in &lines {
                self.remeasure_flex_line(b, line, inner, &mains, &mut crosses, depth)?;
            }
        }

        let mut content_main: f64 = 0.0;
        let mut content_cross = 0.0;
        for line in &lines {
            content_main = content_main.max(flex::line_main_size(&mains[line.start..line.end], b.gap));
            content_cross += crosses[line.start..line.end].iter().copied().fold(0.0, f64::max);
        }
        content_cross += b.gap * lines.len().saturating_sub(1) as f64;

        let (content_w, content_h) = if row {
            (content_main, content_cross)
        } else {
            (content_cross, content_main)
        };
        Ok(IntrinsicSize::new(
            content_w + padding.horizontal(),
            content_h + padding.vertical(),
        ))
    }

    fn measure_stack(
        &self,
        element: &Element,
        s: &StackProps,
        available_width: f64,
        depth: usize,
    ) -> Result<IntrinsicSize, LayoutError> {
        let padding = element.props.padding;
        let inner = (available_width - padding.horizontal()).max(0.0);
        let mut width: f64 = 0.0;
        let mut height: f64 = 0.0;
        for child in &s.children {
            let margin = child.props.margin;
            let child_avail = (inner - margin.horizontal()).max(0.0);
            let size = self.measure_intrinsic(child, measure_width(child, child_avail), depth + 1)?;
            width = width.max(size.width + margin.horizontal());
            height = height.max(size.height + margin.vertical());
        }
        Ok(IntrinsicSize::new(width + padding.horizontal(), height + padding.vertical()))
    }

    fn measure_image(&self, element: &Element, img: &ImageProps) -> IntrinsicSize {
        let natural = match (img.natural_width, img.natural_height) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => self.image_dimensions(&img.src).map(|(w, h)| (f64::from(w), f64::from(h))),
        };
        size_from_natural(element, natural)
    }

    /// Pixel size of an image source, probed once per pass.
    fn image_dimensions(&self, src: &str) -> Option<(u32, u32)> {
        if src.is_empty() {
            return None;
        }
        if let Some(dims) = self.image_dims.borrow().get(src) {
            return *dims;
        }
        let dims = match image_loader::probe_dimensions(src) {
            Ok(dims) => Some(dims),
            Err(e) => {
                debug!("no natural size for image source ({e}); falling back to 0x0");
                None
            }
        };
        self.image_dims.borrow_mut().insert(src.to_string(), dims);
        dims
    }

    /// Baseline of `element` laid out `width` wide, from its border-box top.
    ///
    /// `None` for elements without text; callers align those by their
    /// bottom edge.
    pub(crate) fn first_baseline(&self, element: &Element, width: f64, depth: usize) -> Result<Option<f64>, LayoutError> {
        self.check_depth(depth)?;
        let padding = element.props.padding;
        let inner = width - padding.horizontal();
        let baseline = match &element.kind {
            ElementKind::Text(t) => {
                let font = t.font.clone().unwrap_or_default();
                let first = if t.wrap && inner > 0.0 {
                    wrap_text(self.measurer, &t.content, inner, &font)?.into_iter().next().unwrap_or_default()
                } else {
                    t.content.clone()
                };
                let m = self.measurer.measure_text(&first, &font)?;
                let segment = RichTextSegment {
                    text: first,
                    style: Default::default(),
                    width: m.width,
                    height: font.size_or_default() * t.line_height.unwrap_or(DEFAULT_LINE_HEIGHT),
                    ascent: m.ascent,
                    descent: m.descent,
                    offset: m.offset,
                };
                let top = segment.top_distance();
                let content = top + segment.bottom_distance();
                Some(top + (content.max(segment.height) - content) / 2.0)
            }
            ElementKind::RichText(r) => {
                let lines = wrap_rich_text(
                    self.measurer,
                    &r.spans,
                    inner,
                    r.line_height.unwrap_or(DEFAULT_LINE_HEIGHT),
                    &r.defaults,
                )?;
                lines.first().filter(|l| !l.segments.is_empty()).map(|l: &RichTextLine| l.baseline)
            }
            ElementKind::Box(b) => self.child_baseline(b.children.first(), inner, depth)?,
            ElementKind::Stack(s) => self.child_baseline(s.children.first(), inner, depth)?,
            ElementKind::Transform(t) => self.child_baseline(Some(&t.child), inner, depth)?,
            ElementKind::CustomDraw(c) => self.child_baseline(c.child.as_deref(), inner, depth)?,
            ElementKind::Image(_) | ElementKind::Svg(_) => None,
        };
        Ok(baseline.map(|b| b + padding.top))
    }

    fn child_baseline(&self, child: Option<&Element>, inner: f64, depth: usize) -> Result<Option<f64>, LayoutError> {
        let Some(child) = child else {
            return Ok(None);
        };
        let margin = child.props.margin;
        let width = measure_width(child, (inner - margin.horizontal()).max(0.0));
        Ok(self
            .first_baseline(child, width, depth + 1)?
            .map(|b| b + margin.top))
    }
}

fn measure_svg(element: &Element, svg: &SvgProps) -> IntrinsicSize {
    size_from_natural(element, svg.view_box.map(|vb| (vb.width, vb.height)))
}

/// Replaced-content sizing shared by images and SVGs: explicit sizes, then
/// the natural aspect ratio when one axis is given, then the natural size.
fn size_from_natural(element: &Element, natural: Option<(f64, f64)>) -> IntrinsicSize {
    let width = element.props.width.and_then(|w| w.fixed());
    let height = element.props.height.and_then(|h| h.fixed());
    match (width, height, natural) {
        (Some(w), Some(h), _) => IntrinsicSize::new(w, h),
        (w, h, Some((nw, nh))) if nw > 0.0 && nh > 0.0 => match (w, h) {
            (Some(w), None) => IntrinsicSize::new(w, w * nh / nw),
            (None, Some(h)) => IntrinsicSize::new(h * nw / nh, h),
            _ => IntrinsicSize::new(nw, nh),
        },
        (w, h, _) => IntrinsicSize::new(w.unwrap_or(0.0), h.unwrap_or(0.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::MonospaceMeasurer;
    use crate::layout::{LayoutConfig, LayoutEngine};
    use crate::model::{RichTextProps, Span, ViewBox};
    use crate::style::{FlexDirection, FontProps, SpanStyle};

    fn measure(el: &Element, available: f64) -> IntrinsicSize {
        LayoutEngine::new()
            .intrinsic_size(el, &MonospaceMeasurer::fixed(8.0), available)
            .unwrap()
    }

    fn fixed(w: f64, h: f64) -> Element {
        Element::container(BoxProps::default()).size(w, h)
    }

    #[test]
    fn test_text_single_line() {
        let size = measure(&Element::text("Hello"), 500.0);
        assert_eq!(size.width, 40.0);
        assert!((size.height - 19.2).abs() < 1e-9);
    }

    #[test]
    fn test_text_wraps_within_available_width() {
        let el = Element::text_with(TextProps {
            content: "aaaa bbbb cccc".into(),
            wrap: true,
            line_height: Some(1.5),
            ..Default::default()
        })
        .padding(4.0);
        // content box 80 wide: two words per line
        let size = measure(&el, 88.0);
        assert_eq!(size.width, 72.0 + 8.0);
        assert_eq!(size.height, 2.0 * 24.0 + 8.0);
    }

    #[test]
    fn test_text_unbounded_does_not_wrap() {
        let el = Element::text_with(TextProps {
            content: "aaaa bbbb".into(),
            wrap: true,
            ..Default::default()
        });
        let size = measure(&el, f64::INFINITY);
        assert_eq!(size.width, 72.0);
    }

    #[test]
    fn test_text_max_lines_caps_height() {
        let el = Element::text_with(TextProps {
            content: "a b c d e".into(),
            wrap: true,
            max_lines: Some(2),
            font: Some(FontProps::sized(10.0)),
            ..Default::default()
        });
        let size = measure(&el, 8.0);
        assert_eq!(size.height, 24.0);
    }

    #[test]
    fn test_rich_text_sums_lines() {
        let el = Element::rich_text(RichTextProps {
            spans: vec![Span::new("Hello world")],
            ..Default::default()
        });
        let size = measure(&el, 50.0);
        assert_eq!(size.width, 40.0);
        assert!((size.height - 38.4).abs() < 1e-9);
    }

    #[test]
    fn test_row_sums_main_axis_with_gap() {
        let el = Element::container(BoxProps {
            gap: 10.0,
            children: vec![fixed(50.0, 20.0), fixed(30.0, 40.0).margin(5.0)],
            ..Default::default()
        })
        .padding(2.0);
        let size = measure(&el, 1000.0);
        assert_eq!(size.width, 50.0 + 10.0 + 40.0 + 4.0);
        assert_eq!(size.height, 50.0 + 4.0);
    }

    #[test]
    fn test_column_takes_max_width() {
        let el = Element::container(BoxProps {
            direction: FlexDirection::Column,
            gap: 5.0,
            children: vec![fixed(50.0, 20.0), fixed(80.0, 10.0)],
            ..Default::default()
        });
        let size = measure(&el, 1000.0);
        assert_eq!(size.width, 80.0);
        assert_eq!(size.height, 35.0);
    }

    #[test]
    fn test_row_measures_flex_child_at_its_share() {
        let text = Element::text_with(TextProps {
            content: "aa bb cc".into(),
            wrap: true,
            ..Default::default()
        })
        .width(0.0)
        .flex(2.0);
        let el = Element::container(BoxProps {
            gap: 10.0,
            children: vec![text, fixed(40.0, 10.0)],
            ..Default::default()
        });
        // share is 100 - 40 - 10 = 50: "aa bb" / "cc"
        let size = measure(&el, 100.0);
        assert!((size.height - 38.4).abs() < 1e-9);
    }

    #[test]
    fn test_declared_size_wins() {
        let el = Element::container(BoxProps {
            children: vec![fixed(500.0, 500.0)],
            ..Default::default()
        })
        .width(100.0);
        let size = measure(&el, 1000.0);
        assert_eq!(size.width, 100.0);
        assert_eq!(size.height, 500.0);
    }

    #[test]
    fn test_row_wrap_simulation() {
        let el = Element::container(BoxProps {
            wrap: true,
            children: (0..4).map(|_| fixed(80.0, 50.0)).collect(),
            ..Default::default()
        })
        .width(200.0);
        let size = measure(&el, 1000.0);
        assert_eq!(size.width, 200.0);
        assert_eq!(size.height, 100.0);
    }

    #[test]
    fn test_row_wrap_uses_available_width_when_undeclared() {
        let el = Element::container(BoxProps {
            wrap: true,
            gap: 10.0,
            children: (0..4).map(|_| fixed(50.0, 20.0)).collect(),
            ..Default::default()
        })
        .padding(5.0);
        // 180 content: 3 per line (170), then 1
        let size = measure(&el, 190.0);
        assert_eq!(size.width, 170.0 + 10.0);
        assert_eq!(size.height, 20.0 + 10.0 + 20.0 + 10.0);
    }

    #[test]
    fn test_column_wrap_needs_declared_height() {
        let children: Vec<Element> = (0..4).map(|_| fixed(40.0, 30.0)).collect();
        let bounded = Element::container(BoxProps {
            direction: FlexDirection::Column,
            wrap: true,
            gap: 10.0,
            children: children.clone(),
            ..Default::default()
        })
        .height(70.0);
        let size = measure(&bounded, 1000.0);
        assert_eq!(size.width, 90.0);

        let unbounded = Element::container(BoxProps {
            direction: FlexDirection::Column,
            wrap: true,
            children,
            ..Default::default()
        });
        let size = measure(&unbounded, 1000.0);
        assert_eq!(size.width, 40.0);
        assert_eq!(size.height, 120.0);
    }

    #[test]
    fn test_stack_takes_max_plus_margin() {
        let el = Element::stack(StackProps {
            children: vec![fixed(50.0, 10.0).margin(5.0), fixed(20.0, 80.0)],
            ..Default::default()
        })
        .padding(1.0);
        let size = measure(&el, 1000.0);
        assert_eq!(size, IntrinsicSize::new(62.0, 82.0));
    }

    #[test]
    fn test_image_aspect_ratio() {
        let img = ImageProps {
            natural_width: Some(200.0),
            natural_height: Some(100.0),
            ..Default::default()
        };
        assert_eq!(measure(&Element::image(img.clone()), 1000.0), IntrinsicSize::new(200.0, 100.0));
        assert_eq!(measure(&Element::image(img.clone()).width(50.0), 1000.0), IntrinsicSize::new(50.0, 25.0));
        assert_eq!(measure(&Element::image(img).height(50.0), 1000.0), IntrinsicSize::new(100.0, 50.0));
        assert_eq!(measure(&Element::image(ImageProps::default()), 1000.0), IntrinsicSize::default());
    }

    #[test]
    fn test_svg_view_box_ratio() {
        let svg = SvgProps {
            view_box: Some(ViewBox {
                x: 0.0,
                y: 0.0,
                width: 24.0,
                height: 12.0,
            }),
            ..Default::default()
        };
        assert_eq!(measure(&Element::svg(svg.clone()), 1000.0), IntrinsicSize::new(24.0, 12.0));
        assert_eq!(measure(&Element::svg(svg).height(6.0), 1000.0), IntrinsicSize::new(12.0, 6.0));
    }

    #[test]
    fn test_transform_passes_child_through() {
        let el = Element::transform(fixed(33.0, 44.0));
        assert_eq!(measure(&el, 1000.0), IntrinsicSize::new(33.0, 44.0));
    }

    #[test]
    fn test_custom_draw_sizes() {
        assert_eq!(measure(&Element::custom_draw(None, None).size(10.0, 20.0), 1000.0), IntrinsicSize::new(10.0, 20.0));
        assert_eq!(
            measure(&Element::custom_draw(None, Some(fixed(5.0, 6.0))), 1000.0),
            IntrinsicSize::new(5.0, 6.0)
        );
        assert_eq!(measure(&Element::custom_draw(None, None), 1000.0), IntrinsicSize::default());
    }

    #[test]
    fn test_min_max_apply_to_intrinsic() {
        let el = Element::text("Hi").min_width(100.0).max_height(5.0);
        assert_eq!(measure(&el, 1000.0), IntrinsicSize::new(100.0, 5.0));
    }

    #[test]
    fn test_intrinsic_respects_depth_limit() {
        let el = Element::transform(Element::transform(Element::text("deep")));
        let engine = LayoutEngine::with_config(LayoutConfig {
            max_depth: 2,
            ..Default::default()
        });
        assert!(engine
            .intrinsic_size(&el, &MonospaceMeasurer::default(), 100.0)
            .is_err());
    }

    #[test]
    fn test_rich_text_defaults_flow_into_measurement() {
        let el = Element::rich_text(RichTextProps {
            spans: vec![Span::new("abc")],
            defaults: SpanStyle {
                font: Some(FontProps::sized(20.0)),
                ..Default::default()
            },
            line_height: Some(1.0),
            ..Default::default()
        });
        let size = measure(&el, 1000.0);
        // ascent 18, descent 6, offset 2.4 at 24px glyph height
        assert!((size.height - 24.0).abs() < 1e-9);
    }
}
