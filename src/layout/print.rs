//! ASCII rendering of a layout tree, for debugging and golden tests.
//!
//! ```text
//! └─ Box @(0,0) size:300x100
//!     ├─ Text "Hello" @(0,0) size:40x19
//!     │   └─ "Hello"
//!     └─ Image @(40,0) size:20x20
//! ```

use std::fmt;

use super::LayoutNode;
use crate::model::ElementKind;

const LABEL_TEXT_CHARS: usize = 20;

/// Render `node` as an indented tree, one line per node and per text line.
pub fn layout_to_string(node: &LayoutNode<'_>) -> String {
    let mut lines = Vec::new();
    write_node(node, "", true, &mut lines);
    lines.join("\n")
}

/// Print [`layout_to_string`] to stdout.
pub fn print_layout(node: &LayoutNode<'_>) {
    println!("{}", layout_to_string(node));
}

impl fmt::Display for LayoutNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&layout_to_string(self))
    }
}

fn write_node(node: &LayoutNode<'_>, prefix: &str, last: bool, out: &mut Vec<String>) {
    let connector = if last { "└─ " } else { "├─ " };
    let l = &node.layout;
    out.push(format!(
        "{prefix}{connector}{} @({},{}) size:{}x{}",
        label(node),
        round(l.x),
        round(l.y),
        round(l.width),
        round(l.height)
    ));

    let inner = format!("{prefix}{}", if last { "    " } else { "│   " });
    if let (ElementKind::Text(_), Some(lines)) = (&node.element.kind, &node.lines) {
        for (i, line) in lines.iter().enumerate() {
            let is_last = i + 1 == lines.len() && node.children.is_empty();
            let quoted = serde_json::to_string(line).unwrap_or_else(|_| format!("{line:?}"));
            out.push(format!("{inner}{}{quoted}", if is_last { "└─ " } else { "├─ " }));
        }
    }

    for (i, child) in node.children.iter().enumerate() {
        write_node(child, &inner, i + 1 == node.children.len(), out);
    }
}

fn label(node: &LayoutNode<'_>) -> String {
    match &node.element.kind {
        ElementKind::Box(_) => "Box".to_string(),
        ElementKind::Text(t) => {
            let head: String = t.content.chars().take(LABEL_TEXT_CHARS).collect();
            let more = if t.content.chars().count() > LABEL_TEXT_CHARS { "..." } else { "" };
            format!("Text \"{head}{more}\"")
        }
        ElementKind::RichText(_) => "RichText".to_string(),
        ElementKind::Image(_) => "Image".to_string(),
        ElementKind::Svg(_) => "Svg".to_string(),
        ElementKind::Stack(_) => "Stack".to_string(),
        ElementKind::Transform(_) => "Transform".to_string(),
        ElementKind::CustomDraw(_) => "CustomDraw".to_string(),
    }
}

/// Half-up rounding, so `-0.5` becomes `0` rather than `-1`.
fn round(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}
