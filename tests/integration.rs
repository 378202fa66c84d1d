//! Integration tests for the drawcall layout pipeline.
//!
//! These tests exercise the public API end to end, from element trees and
//! JSON documents to positioned layout nodes. They verify:
//! - Flex placement (sequence, justify, align, gap, wrap, reverse)
//! - Stack alignment and subtree offsets
//! - Text wrapping, truncation and rich-text line building
//! - JSON documents, including error reporting
//! - Measurement errors reach the caller untouched

use std::sync::{Arc, Mutex};

use drawcall::error::{LayoutError, MeasureError};
use drawcall::font::{CachedMeasurer, MonospaceMeasurer, TextMeasurer, TextMetrics};
use drawcall::layout::*;
use drawcall::model::*;
use drawcall::style::*;
use drawcall::text::rich::wrap_rich_text;
use drawcall::text::{truncate_text, wrap_text};
use drawcall::{layout_document, parse_document};

// ─── Helpers ────────────────────────────────────────────────────

fn mono() -> MonospaceMeasurer {
    MonospaceMeasurer::fixed(8.0)
}

fn fixed_box(width: f64, height: f64) -> Element {
    Element::container(BoxProps::default()).size(width, height)
}

fn row(props: BoxProps, children: Vec<Element>) -> Element {
    Element::container(BoxProps {
        direction: FlexDirection::Row,
        children,
        ..props
    })
}

fn layout(el: &Element) -> LayoutNode<'_> {
    compute_layout(el, &mono(), Constraints::loose(1000.0, 1000.0)).unwrap()
}

fn child_xs(node: &LayoutNode<'_>) -> Vec<f64> {
    node.children.iter().map(|c| c.layout.x).collect()
}

fn child_ys(node: &LayoutNode<'_>) -> Vec<f64> {
    node.children.iter().map(|c| c.layout.y).collect()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// ─── Box / Flex ─────────────────────────────────────────────────

#[test]
fn test_row_children_follow_each_other() {
    let widths = [30.0, 70.0, 45.0, 10.0];
    let el = row(
        BoxProps::default(),
        widths.iter().map(|&w| fixed_box(w, 20.0)).collect(),
    )
    .size(400.0, 50.0);
    let node = layout(&el);
    let mut expected = 0.0;
    for (child, w) in node.children.iter().zip(widths) {
        assert_eq!(child.layout.x, expected, "child x should be the sum of preceding widths");
        expected += w;
    }
}

#[test]
fn test_space_between_scenario() {
    let el = row(
        BoxProps {
            justify: Justify::SpaceBetween,
            ..Default::default()
        },
        vec![fixed_box(50.0, 50.0), fixed_box(50.0, 50.0), fixed_box(50.0, 50.0)],
    )
    .size(300.0, 100.0);
    let node = layout(&el);
    assert_eq!(child_xs(&node), vec![0.0, 125.0, 250.0]);
    let last = &node.children[2].layout;
    assert_eq!(last.x + last.width, 300.0, "last child should end at the main-axis edge");
}

#[test]
fn test_stretch_fills_content_height() {
    let el = row(
        BoxProps {
            align: Align::Stretch,
            ..Default::default()
        },
        vec![
            Element::text("a"),
            Element::container(BoxProps::default()).width(40.0),
            fixed_box(10.0, 10.0),
        ],
    )
    .size(300.0, 120.0)
    .padding(10.0);
    let node = layout(&el);
    assert_eq!(node.children[0].layout.height, 100.0);
    assert_eq!(node.children[1].layout.height, 100.0);
    assert_eq!(node.children[2].layout.height, 10.0, "declared heights are not stretched");
}

#[test]
fn test_gap_adds_exactly_between_children() {
    let children = || vec![fixed_box(20.0, 10.0), fixed_box(20.0, 10.0), fixed_box(20.0, 10.0)];
    let plain = row(BoxProps::default(), children());
    let gapped = row(
        BoxProps {
            gap: 7.0,
            ..Default::default()
        },
        children(),
    );
    let plain_w = layout(&plain).layout.width;
    let gapped_w = layout(&gapped).layout.width;
    assert_eq!(gapped_w - plain_w, 7.0 * 2.0);
}

#[test]
fn test_wrap_scenario() {
    let el = row(
        BoxProps {
            wrap: true,
            gap: 10.0,
            ..Default::default()
        },
        vec![fixed_box(50.0, 50.0), fixed_box(50.0, 50.0), fixed_box(50.0, 50.0)],
    )
    .size(160.0, 200.0);
    let node = layout(&el);
    assert_eq!(child_ys(&node), vec![0.0, 0.0, 60.0]);
    assert_eq!(child_xs(&node), vec![0.0, 60.0, 0.0]);
}

#[test]
fn test_wrap_line_capacity() {
    // k*w + (k-1)*g <= W  →  k = 4 for w=30, g=5, W=140
    let el = row(
        BoxProps {
            wrap: true,
            gap: 5.0,
            ..Default::default()
        },
        (0..9).map(|_| fixed_box(30.0, 12.0)).collect(),
    )
    .width(140.0);
    let node = layout(&el);
    let ys = child_ys(&node);
    assert_eq!(&ys[..4], &[0.0; 4]);
    assert_eq!(&ys[4..8], &[17.0; 4]);
    assert_eq!(ys[8], 34.0);
}

#[test]
fn test_auto_height_parent_sums_wrap_lines() {
    let el = row(
        BoxProps {
            wrap: true,
            gap: 4.0,
            ..Default::default()
        },
        vec![
            fixed_box(60.0, 10.0),
            fixed_box(60.0, 25.0),
            fixed_box(60.0, 15.0),
            fixed_box(60.0, 5.0),
            fixed_box(60.0, 30.0),
        ],
    )
    .width(130.0);
    let node = layout(&el);
    // lines: [10, 25], [15, 5], [30]
    assert_eq!(node.layout.height, 25.0 + 15.0 + 30.0 + 2.0 * 4.0);
}

#[test]
fn test_flex_share_with_padding_and_gap() {
    let el = row(
        BoxProps {
            gap: 10.0,
            ..Default::default()
        },
        vec![
            Element::text("a").flex(1.0),
            Element::text("b").flex(3.0),
            fixed_box(30.0, 10.0),
        ],
    )
    .size(250.0, 40.0)
    .padding(Edges::new(0.0, 5.0, 0.0, 5.0));
    let node = layout(&el);
    // 240 content - 30 fixed - 20 gaps = 190 → 47.5 / 142.5
    assert_eq!(node.children[0].layout.width, 47.5);
    assert_eq!(node.children[1].layout.width, 142.5);
    assert_eq!(node.children[2].layout.x, 5.0 + 47.5 + 10.0 + 142.5 + 10.0);
}

#[test]
fn test_reverse_mirrors_positions_in_declaration_order() {
    let el = Element::container(BoxProps {
        direction: FlexDirection::RowReverse,
        children: vec![fixed_box(10.0, 10.0), fixed_box(20.0, 10.0), fixed_box(30.0, 10.0)],
        ..Default::default()
    })
    .size(100.0, 10.0);
    let node = layout(&el);
    let widths: Vec<f64> = node.children.iter().map(|c| c.layout.width).collect();
    assert_eq!(widths, vec![10.0, 20.0, 30.0]);
    assert_eq!(child_xs(&node), vec![50.0, 30.0, 0.0]);
}

#[test]
fn test_nested_absolute_coordinates() {
    let inner = row(BoxProps::default(), vec![fixed_box(10.0, 10.0), fixed_box(10.0, 10.0)])
        .padding(3.0)
        .margin(2.0);
    let el = Element::container(BoxProps {
        direction: FlexDirection::Column,
        children: vec![fixed_box(50.0, 20.0), inner],
        ..Default::default()
    })
    .padding(10.0);
    let node = compute_layout(&el, &mono(), Constraints::loose(500.0, 500.0)).unwrap();
    let inner = &node.children[1];
    assert_eq!((inner.layout.x, inner.layout.y), (12.0, 32.0));
    assert_eq!(child_xs(inner), vec![15.0, 25.0]);
    assert_eq!(child_ys(inner), vec![35.0, 35.0]);
}

#[test]
fn test_percent_children_resolve_once() {
    let inner = Element::container(BoxProps::default()).size(Size::percent(50.0), Size::percent(50.0));
    let el = row(BoxProps::default(), vec![inner]).size(200.0, 100.0).padding(10.0);
    let node = layout(&el);
    let child = &node.children[0].layout;
    assert_eq!((child.width, child.height), (90.0, 40.0));
}

// ─── Stack ──────────────────────────────────────────────────────

#[test]
fn test_stack_overlay_with_alignment() {
    let card = row(BoxProps::default(), vec![Element::text("OK")]).padding(4.0);
    let el = Element::stack(StackProps {
        align: StackAlign::End,
        justify: StackAlign::Center,
        children: vec![Element::container(BoxProps::default()).size(Size::Fill, Size::Fill), card],
        ..Default::default()
    })
    .size(200.0, 100.0);
    let node = layout(&el);
    let card = &node.children[1];
    // "OK" is 16x19.2, card 24x27.2
    assert_eq!(card.layout.x, 176.0);
    assert_close(card.layout.y, (100.0 - 27.2) / 2.0);
    assert_eq!(card.children[0].layout.x, 180.0);
    assert_close(card.children[0].layout.y, (100.0 - 27.2) / 2.0 + 4.0);
}

// ─── Text ───────────────────────────────────────────────────────

#[test]
fn test_wrap_text_round_trip() {
    let text = "the quick  brown fox jumps over the lazy dog";
    let font = FontProps::default();
    let lines = wrap_text(&mono(), text, 90.0, &font).unwrap();
    assert!(lines.len() > 1);
    for line in &lines {
        assert!(mono().text_width(line, &font).unwrap() <= 90.0, "{line:?} overflows");
    }
    let normalized: Vec<&str> = text.split_whitespace().collect();
    assert_eq!(lines.join(" ").split_whitespace().collect::<Vec<_>>(), normalized);
}

#[test]
fn test_truncate_scenario_and_idempotence() {
    let font = FontProps::default();
    let max = mono().text_width("Hello W...", &font).unwrap();
    let once = truncate_text(&mono(), "Hello World", max, &font, "...").unwrap();
    assert_eq!(once, "Hello W...");
    assert!(mono().text_width(&once, &font).unwrap() <= max);
    let twice = truncate_text(&mono(), &once, max, &font, "...").unwrap();
    assert_eq!(twice, once);
}

#[test]
fn test_text_node_in_flex_share_wraps() {
    let paragraph = Element::text_with(TextProps {
        content: "one two three four".into(),
        wrap: true,
        ..Default::default()
    })
    .flex(1.0);
    let el = row(BoxProps::default(), vec![fixed_box(20.0, 10.0), paragraph]).width(100.0);
    let node = layout(&el);
    let text = &node.children[1];
    assert_eq!(text.lines.as_ref().unwrap(), &vec!["one two".to_string(), "three four".to_string()]);
    assert_eq!(text.line_offsets.as_ref().map(Vec::len), Some(2));
}

#[test]
fn test_rich_text_mixed_sizes_share_a_baseline() {
    let spans = vec![
        Span::new("tiny "),
        Span::styled(
            "HUGE",
            SpanStyle {
                font: Some(FontProps::sized(40.0)),
                ..Default::default()
            },
        ),
        Span::styled(
            " mid",
            SpanStyle {
                font: Some(FontProps::sized(24.0)),
                ..Default::default()
            },
        ),
    ];
    let lines = wrap_rich_text(&mono(), &spans, 1000.0, 1.2, &SpanStyle::default()).unwrap();
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    for seg in &line.segments {
        let glyph_top = line.baseline - seg.top_distance();
        let glyph_bottom = line.baseline + seg.bottom_distance();
        assert!(glyph_top >= -1e-9, "{:?} starts above the line", seg.text);
        assert!(glyph_bottom <= line.height + 1e-9, "{:?} ends below the line", seg.text);
    }
}

#[test]
fn test_rich_text_node_gets_lines() {
    let el = Element::rich_text(RichTextProps {
        spans: vec![Span::new("Hello "), Span::new("there world")],
        defaults: SpanStyle {
            color: Some("#333".into()),
            ..Default::default()
        },
        ..Default::default()
    })
    .width(100.0);
    let node = layout(&el);
    let lines = node.rich_lines.as_ref().unwrap();
    let texts: Vec<String> = lines.iter().map(|l| l.text()).collect();
    assert_eq!(texts, vec!["Hello there", "world"]);
    assert_eq!(lines[0].segments[0].style.color.as_deref(), Some("#333"));
    assert_close(node.layout.height, 2.0 * 19.2);
}

// ─── JSON documents ─────────────────────────────────────────────

#[test]
fn test_json_document_layout() {
    let json = r##"{
        "viewport": { "width": 300, "height": 200 },
        "root": {
            "type": "box",
            "width": "fill",
            "direction": "row",
            "justify": "space-between",
            "padding": { "left": 10, "right": 10 },
            "children": [
                { "type": "text", "content": "Left" },
                { "type": "image", "naturalWidth": 40, "naturalHeight": 20, "height": 10 },
                { "type": "box", "width": "25%", "height": 5 }
            ]
        }
    }"##;
    let doc = parse_document(json).unwrap();
    let node = layout_document(&doc, &mono()).unwrap();
    assert_eq!(node.layout.width, 300.0);
    let widths: Vec<f64> = node.children.iter().map(|c| c.layout.width).collect();
    assert_eq!(widths, vec![32.0, 20.0, 70.0]);
    assert_eq!(node.children[0].layout.x, 10.0);
    assert_eq!(node.children[2].layout.x + 70.0, 290.0);
}

#[test]
fn test_json_layout_output() {
    let doc = parse_document(r#"{ "root": { "type": "stack", "children": [{ "type": "text", "content": "hi" }] } }"#).unwrap();
    let node = layout_document(&doc, &mono()).unwrap();
    let value = serde_json::to_value(&node).unwrap();
    assert_eq!(value["type"], "stack");
    assert_eq!(value["children"][0]["type"], "text");
    assert_eq!(value["children"][0]["lines"][0], "hi");
    assert_eq!(value["children"][0]["layout"]["width"], 16.0);
}

#[test]
fn test_json_config_depth_limit() {
    let json = r#"{
        "config": { "maxDepth": 2 },
        "root": { "type": "box", "children": [{ "type": "box", "children": [{ "type": "text", "content": "deep" }] }] }
    }"#;
    let doc = parse_document(json).unwrap();
    let err = layout_document(&doc, &mono()).unwrap_err();
    assert!(matches!(err, LayoutError::DepthLimitExceeded { limit: 2 }));
}

#[test]
fn test_json_parse_errors() {
    let err = parse_document(r#"{ "root": { "type": "hexagon" } }"#).unwrap_err();
    assert!(matches!(err, LayoutError::Parse { .. }), "unknown kind should be a parse error");

    let err = parse_document(r#"{ "root": { "type": "box", "width": "wide" } }"#).unwrap_err();
    assert!(err.to_string().contains("wide"), "bad size should be named: {err}");
}

#[test]
fn test_debug_print_matches_display() {
    let el = row(BoxProps::default(), vec![Element::text("Hi"), fixed_box(5.0, 5.0)]).width(50.0);
    let node = layout(&el);
    let printed = layout_to_string(&node);
    assert_eq!(printed, node.to_string());
    assert!(printed.starts_with("└─ Box @(0,0) size:50x19"));
    assert!(printed.contains("├─ Text \"Hi\" @(0,0) size:16x19"));
    assert!(printed.contains("└─ Box @(16,0) size:5x5"));
}

// ─── Measurement ────────────────────────────────────────────────

#[test]
fn test_measure_failures_propagate_unmodified() {
    struct Rejecting;
    impl TextMeasurer for Rejecting {
        fn measure_text(&self, text: &str, _font: &FontProps) -> Result<TextMetrics, MeasureError> {
            Err(MeasureError::InvalidMetrics {
                text: text.to_string(),
                reason: "negative ascent".into(),
            })
        }
    }
    let el = Element::stack(StackProps {
        children: vec![row(BoxProps::default(), vec![Element::text("x")])],
        ..Default::default()
    });
    let err = compute_layout(&el, &Rejecting, Constraints::loose(100.0, 100.0)).unwrap_err();
    match err {
        LayoutError::Measure(MeasureError::InvalidMetrics { text, reason }) => {
            assert_eq!(text, "x");
            assert_eq!(reason, "negative ascent");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_cached_measurer_reuses_results() {
    let el = Element::container(BoxProps {
        wrap: true,
        children: (0..6).map(|_| Element::text("repeat")).collect(),
        ..Default::default()
    })
    .width(120.0);
    let inner = mono();
    let cached = CachedMeasurer::new(&inner);
    let plain = compute_layout(&el, &inner, Constraints::loose(500.0, 500.0)).unwrap();
    let memo = compute_layout(&el, &cached, Constraints::loose(500.0, 500.0)).unwrap();
    assert_eq!(layout_to_string(&plain), layout_to_string(&memo));
    let (hits, misses) = cached.stats();
    assert_eq!(misses, 1, "one distinct (text, font) pair");
    assert!(hits > 0);
}

#[test]
fn test_custom_draw_hook_receives_layout() {
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    let hook = DrawHook::new(move |ctx, layout| {
        if let Some(log) = ctx.downcast_mut::<Vec<String>>() {
            log.push("drawn".into());
        }
        *sink.lock().unwrap() = Some(*layout);
    });
    let el = row(
        BoxProps::default(),
        vec![fixed_box(10.0, 10.0), Element::custom_draw(Some(hook), None).size(30.0, 20.0)],
    );
    let node = layout(&el);
    let custom = &node.children[1];
    let ElementKind::CustomDraw(props) = &custom.element.kind else {
        panic!("expected a customdraw node");
    };
    let mut log: Vec<String> = Vec::new();
    props.draw.as_ref().unwrap().call(&mut log, &custom.layout);
    assert_eq!(log, vec!["drawn"]);
    let layout = seen.lock().unwrap().unwrap();
    assert_eq!((layout.x, layout.width, layout.height), (10.0, 30.0, 20.0));
}
