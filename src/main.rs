//! # Drawcall CLI
//!
//! Usage:
//!   drawcall scene.json
//!   echo '{ ... }' | drawcall --json
//!   drawcall scene.json --font Inter-Regular.ttf
//!   drawcall --example > scene.json
//!
//! Prints the laid-out tree as ASCII (default) or as JSON (`--json`). Text is
//! measured with a fixed-advance measurer unless `--font` supplies a face.
//! Set `RUST_LOG=drawcall=debug` for engine diagnostics.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use drawcall::{layout_document, parse_document, FontFaceMeasurer, MonospaceMeasurer, TextMeasurer};

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_scene_json());
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("✗ {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<String, String> {
    let as_json = args.iter().any(|a| a == "--json");
    let font_path = args.windows(2).find(|w| w[0] == "--font").map(|w| w[1].as_str());
    let input_path = args
        .iter()
        .enumerate()
        .find(|(i, a)| !a.starts_with('-') && (*i == 0 || args[i - 1] != "--font"))
        .map(|(_, a)| a.as_str());

    let input = match input_path {
        Some(path) => fs::read_to_string(path).map_err(|e| format!("Failed to read {path}: {e}"))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("Failed to read stdin: {e}"))?;
            buf
        }
    };

    let measurer: Box<dyn TextMeasurer> = match font_path {
        Some(path) => {
            let data = fs::read(path).map_err(|e| format!("Failed to read font {path}: {e}"))?;
            Box::new(FontFaceMeasurer::from_font_data(&data).map_err(|e| format!("{path}: {e}"))?)
        }
        None => Box::new(MonospaceMeasurer::default()),
    };

    let document = parse_document(&input).map_err(|e| e.to_string())?;
    let layout = layout_document(&document, measurer.as_ref()).map_err(|e| format!("Layout failed: {e}"))?;

    if as_json {
        serde_json::to_string_pretty(&layout).map_err(|e| format!("Failed to serialize layout: {e}"))
    } else {
        Ok(layout.to_string())
    }
}

fn example_scene_json() -> &'static str {
    r##"{
  "viewport": { "width": 400, "height": 300 },
  "root": {
    "type": "box",
    "width": "fill",
    "height": "fill",
    "direction": "column",
    "padding": 16,
    "gap": 12,
    "children": [
      {
        "type": "box",
        "direction": "row",
        "justify": "space-between",
        "align": "baseline",
        "children": [
          { "type": "text", "content": "Weekly report", "font": { "size": 24, "weight": "bold" } },
          { "type": "text", "content": "Oct 2026", "font": { "size": 12 }, "color": "#666" }
        ]
      },
      {
        "type": "richtext",
        "font": { "size": 14 },
        "spans": [
          { "text": "Throughput rose " },
          { "text": "12%", "font": { "weight": 700 }, "color": "#0a7" },
          { "text": " while error rates held steady across every region." }
        ]
      },
      {
        "type": "box",
        "direction": "row",
        "wrap": true,
        "gap": 8,
        "children": [
          { "type": "box", "width": 80, "height": 40, "background": "#eef" },
          { "type": "box", "width": 80, "height": 40, "background": "#efe" },
          { "type": "box", "width": 80, "height": 40, "background": "#fee" },
          { "type": "box", "width": 80, "height": 40, "background": "#ffe" },
          { "type": "box", "width": 80, "height": 40, "background": "#eff" }
        ]
      },
      {
        "type": "stack",
        "height": 48,
        "width": "fill",
        "align": "end",
        "justify": "center",
        "children": [
          { "type": "box", "width": "fill", "height": "fill", "background": "#f5f5f5" },
          { "type": "text", "content": "page 1 of 3", "margin": { "right": 8 } }
        ]
      }
    ]
  }
}
"##
}
