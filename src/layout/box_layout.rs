//! # Box Layout
//!
//! The flexbox-style solver for `box` elements. Each pass is a pipeline of
//! fresh records rather than one record mutated in place:
//!
//! 1. **measure**: every child gets a hypothetical border-box size from its
//!    declared size or intrinsic size, resolved against the content box.
//! 2. **group**: children are split into wrap lines (one line without
//!    `wrap`) by [`flex::partition_into_lines`].
//! 3. **flex-resolve**: per line, leftover main-axis space is divided among
//!    flex children by factor, then their cross size is measured at the
//!    resolved main size. Stretch fills undeclared cross axes.
//! 4. **position**: justify spacing along the main axis, per-line cross
//!    offsets, then recursion with one constraint box per child.

use log::debug;

use super::{flex, measure_width, Constraints, ComputedLayout, LayoutNode, LayoutPass};
use crate::error::LayoutError;
use crate::model::{BoxProps, Edges, Element};
use crate::style::{clamp, resolve_size, size_needs_parent, Align, Size};

/// Working record for one child of a box.
#[derive(Debug, Clone, Copy)]
struct FlexItem<'a> {
    element: &'a Element,
    margin: Edges,
    flex: f64,
    align: Align,
    /// Border-box size.
    width: f64,
    height: f64,
    /// Axes the child must take exactly as given.
    forced_width: bool,
    forced_height: bool,
}

impl FlexItem<'_> {
    fn main(&self, row: bool) -> f64 {
        if row {
            self.width
        } else {
            self.height
        }
    }

    fn outer_main(&self, row: bool) -> f64 {
        if row {
            self.width + self.margin.horizontal()
        } else {
            self.height + self.margin.vertical()
        }
    }

    fn outer_cross(&self, row: bool) -> f64 {
        if row {
            self.height + self.margin.vertical()
        } else {
            self.width + self.margin.horizontal()
        }
    }

    fn margin_main(&self, row: bool) -> f64 {
        if row {
            self.margin.horizontal()
        } else {
            self.margin.vertical()
        }
    }

    /// Fill `extent` on the cross axis if aligned `stretch` and the child
    /// left that axis undeclared.
    fn stretched(self, row: bool, extent: f64) -> Self {
        if self.align != Align::Stretch {
            return self;
        }
        let props = &self.element.props;
        if row && matches!(props.height, None | Some(Size::Auto)) {
            let height = clamp(
                (extent - self.margin.vertical()).max(0.0),
                props.min_height,
                props.max_height,
            );
            FlexItem {
                height,
                forced_height: true,
                ..self
            }
        } else if !row && matches!(props.width, None | Some(Size::Auto)) {
            let width = clamp(
                (extent - self.margin.horizontal()).max(0.0),
                props.min_width,
                props.max_width,
            );
            FlexItem {
                width,
                forced_width: true,
                ..self
            }
        } else {
            self
        }
    }

    /// Constraint box for the recursive layout of this child.
    fn constraints(&self) -> Constraints {
        let outer_w = self.width + self.margin.horizontal();
        let outer_h = self.height + self.margin.vertical();
        Constraints {
            min_width: if self.forced_width { outer_w } else { 0.0 },
            max_width: outer_w,
            min_height: if self.forced_height { outer_h } else { 0.0 },
            max_height: outer_h,
        }
    }
}

impl LayoutPass<'_> {
    /// Lay out the children of a box whose own geometry is `layout`.
    ///
    /// Children come back in declaration order. The `-reverse` directions
    /// only mirror their positions within each line.
    pub(crate) fn layout_box_children<'a>(
        &self,
        props: &'a BoxProps,
        layout: &ComputedLayout,
        depth: usize,
    ) -> Result<Vec<LayoutNode<'a>>, LayoutError> {
        if props.children.is_empty() {
            return Ok(Vec::new());
        }
        let row = props.direction.is_row();
        let (main_size, cross_size) = if row {
            (layout.content_width, layout.content_height)
        } else {
            (layout.content_height, layout.content_width)
        };

        let items = props
            .children
            .iter()
            .map(|child| self.measure_item(child, props, layout, depth))
            .collect::<Result<Vec<_>, _>>()?;

        let lines = if props.wrap {
            let mains: Vec<f64> = items.iter().map(|item| item.outer_main(row)).collect();
            flex::partition_into_lines(&mains, props.gap, main_size)
        } else {
            vec![flex::WrapLine {
                start: 0,
                end: items.len(),
            }]
        };
        if props.wrap {
            debug!(
                "box wrap: {} children in {} lines over {:.1}px",
                items.len(),
                lines.len(),
                main_size
            );
        }

        let mut nodes = Vec::with_capacity(items.len());
        let mut line_cross = 0.0;
        for line in &lines {
            let resolved = self.resolve_line(&items[line.start..line.end], props, main_size, layout, depth)?;

            let extent = if props.wrap {
                resolved.iter().map(|item| item.outer_cross(row)).fold(0.0, f64::max)
            } else {
                cross_size
            };
            let resolved: Vec<FlexItem<'a>> = resolved.into_iter().map(|item| item.stretched(row, extent)).collect();

            let cross_offsets = self.cross_offsets(&resolved, row, extent, depth)?;

            let outer_mains: Vec<f64> = resolved.iter().map(|item| item.outer_main(row)).collect();
            let free = main_size - flex::line_main_size(&outer_mains, props.gap);
            let spacing = flex::justify_spacing(props.justify, free, resolved.len());

            let order: Vec<usize> = if props.direction.is_reverse() {
                (0..resolved.len()).rev().collect()
            } else {
                (0..resolved.len()).collect()
            };

            let line_start = nodes.len();
            let mut cursor = spacing.leading;
            for i in order {
                let item = &resolved[i];
                let (dx, dy) = if row {
                    (cursor, line_cross + cross_offsets[i])
                } else {
                    (line_cross + cross_offsets[i], cursor)
                };
                nodes.push(self.layout_node(
                    item.element,
                    item.constraints(),
                    layout.content_x + dx,
                    layout.content_y + dy,
                    depth + 1,
                )?);
                cursor += outer_mains[i] + props.gap + spacing.between;
            }
            if props.direction.is_reverse() {
                nodes[line_start..].reverse();
            }

            line_cross += extent + props.gap;
        }

        Ok(nodes)
    }

    /// Hypothetical size of a child before flex resolution.
    fn measure_item<'a>(
        &self,
        child: &'a Element,
        props: &BoxProps,
        layout: &ComputedLayout,
        depth: usize,
    ) -> Result<FlexItem<'a>, LayoutError> {
        let cp = &child.props;
        let margin = cp.margin;
        let avail_w = (layout.content_width - margin.horizontal()).max(0.0);
        let avail_h = (layout.content_height - margin.vertical()).max(0.0);

        let intrinsic = self.measure_intrinsic(child, measure_width(child, avail_w), depth + 1)?;
        Ok(FlexItem {
            element: child,
            margin,
            flex: cp.flex.max(0.0),
            align: cp.align_self.resolve(props.align),
            width: clamp(resolve_size(cp.width, avail_w, intrinsic.width), cp.min_width, cp.max_width),
            height: clamp(resolve_size(cp.height, avail_h, intrinsic.height), cp.min_height, cp.max_height),
            forced_width: size_needs_parent(cp.width),
            forced_height: size_needs_parent(cp.height),
        })
    }

    /// Give flex children their share of one line's leftover space.
    fn resolve_line<'a>(
        &self,
        items: &[FlexItem<'a>],
        props: &BoxProps,
        main_size: f64,
        layout: &ComputedLayout,
        depth: usize,
    ) -> Result<Vec<FlexItem<'a>>, LayoutError> {
        let row = props.direction.is_row();
        let gaps = props.gap * items.len().saturating_sub(1) as f64;
        let fixed: f64 = items
            .iter()
            .filter(|item| item.flex == 0.0)
            .map(|item| item.outer_main(row))
            .sum();
        let flex_margins: f64 = items
            .iter()
            .filter(|item| item.flex > 0.0)
            .map(|item| item.margin_main(row))
            .sum();
        let factors: Vec<f64> = items.iter().map(|item| item.flex).collect();
        let shares = flex::distribute_flex(&factors, main_size - fixed - gaps - flex_margins);

        items
            .iter()
            .zip(shares)
            .map(|(item, share)| {
                if item.flex > 0.0 {
                    self.resolve_flex_item(item, share, row, layout, depth)
                } else {
                    Ok(*item)
                }
            })
            .collect()
    }

    fn resolve_flex_item<'a>(
        &self,
        item: &FlexItem<'a>,
        share: f64,
        row: bool,
        layout: &ComputedLayout,
        depth: usize,
    ) -> Result<FlexItem<'a>, LayoutError> {
        let cp = &item.element.props;
        if row {
            let width = clamp(share, cp.min_width, cp.max_width);
            let avail_h = (layout.content_height - item.margin.vertical()).max(0.0);
            let intrinsic = self.measure_intrinsic_at(item.element, width, depth + 1)?;
            Ok(FlexItem {
                width,
                height: clamp(resolve_size(cp.height, avail_h, intrinsic.height), cp.min_height, cp.max_height),
                forced_width: true,
                ..*item
            })
        } else {
            // The width measured earlier does not depend on the height.
            Ok(FlexItem {
                height: clamp(share, cp.min_height, cp.max_height),
                forced_height: true,
                ..*item
            })
        }
    }

    /// Offset of each item's margin box inside a line of `extent` cross size.
    fn cross_offsets(
        &self,
        items: &[FlexItem<'_>],
        row: bool,
        extent: f64,
        depth: usize,
    ) -> Result<Vec<f64>, LayoutError> {
        // Baselines only mean something across a row.
        let mut baselines = vec![None; items.len()];
        if row {
            for (slot, item) in baselines.iter_mut().zip(items) {
                if item.align == Align::Baseline {
                    let own = self.first_baseline(item.element, item.main(row), depth + 1)?;
                    *slot = Some(item.margin.top + own.unwrap_or(item.height));
                }
            }
        }
        let max_baseline = baselines.iter().flatten().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(items
            .iter()
            .zip(&baselines)
            .map(|(item, baseline)| {
                let free = extent - item.outer_cross(row);
                match item.align {
                    Align::Start | Align::Stretch => 0.0,
                    Align::End => free,
                    Align::Center => free / 2.0,
                    Align::Baseline => baseline.map_or(0.0, |b| max_baseline - b),
                }
            })
            .collect())
    }
}
