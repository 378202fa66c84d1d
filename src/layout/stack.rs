//! # Stack Layout
//!
//! Children of a stack overlap. Each one is laid out at the content-box
//! origin inside a loose `0..content` box, then shifted into place once its
//! size is known. The shift moves the whole subtree, because the child's
//! descendants were already positioned absolutely.

use super::{ComputedLayout, Constraints, LayoutNode, LayoutPass};
use crate::error::LayoutError;
use crate::model::{Element, StackProps};

impl LayoutPass<'_> {
    pub(crate) fn layout_stack_children<'a>(
        &self,
        props: &'a StackProps,
        layout: &ComputedLayout,
        depth: usize,
    ) -> Result<Vec<LayoutNode<'a>>, LayoutError> {
        let mut nodes = Vec::with_capacity(props.children.len());
        for child in &props.children {
            let mut node = self.layout_overlay_child(child, layout, depth)?;
            let margin = child.props.margin;
            let free_x = layout.content_width - (node.layout.width + margin.horizontal());
            let free_y = layout.content_height - (node.layout.height + margin.vertical());
            let (dx, dy) = (props.align.offset(free_x), props.justify.offset(free_y));
            if dx != 0.0 || dy != 0.0 {
                apply_offset(&mut node, dx, dy);
            }
            nodes.push(node);
        }
        Ok(nodes)
    }

    /// Lay out a single child at the content origin of `layout`.
    ///
    /// Used directly by `transform` and `customdraw`, whose child is never
    /// aligned; the renderer applies their effects around the child's box.
    pub(crate) fn layout_overlay_child<'a>(
        &self,
        child: &'a Element,
        layout: &ComputedLayout,
        depth: usize,
    ) -> Result<LayoutNode<'a>, LayoutError> {
        self.layout_node(
            child,
            Constraints::loose(layout.content_width, layout.content_height),
            layout.content_x,
            layout.content_y,
            depth + 1,
        )
    }
}

/// Shift `node` and every descendant by `(dx, dy)`.
pub fn apply_offset(node: &mut LayoutNode<'_>, dx: f64, dy: f64) {
    node.layout.x += dx;
    node.layout.y += dy;
    node.layout.content_x += dx;
    node.layout.content_y += dy;
    for child in &mut node.children {
        apply_offset(child, dx, dy);
    }
}
