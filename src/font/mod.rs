//! # Text Measurement
//!
//! The layout engine never computes glyph metrics itself. Every width and
//! height it needs comes from a [`TextMeasurer`] passed in by the caller.
//!
//! Three implementations ship with the crate:
//! - [`MonospaceMeasurer`]: deterministic fixed-advance metrics, for tests
//!   and for terminals.
//! - [`FontFaceMeasurer`]: real metrics from registered TrueType/OpenType
//!   faces, parsed with ttf-parser.
//! - [`CachedMeasurer`]: memoises another measurer for one layout pass.

use crate::error::MeasureError;
use crate::style::{FontProps, FontStyle};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Metrics of one measured run of text, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    /// Distance from the middle baseline to the top of the glyphs.
    pub ascent: f64,
    /// Distance from the middle baseline to the bottom of the glyphs.
    pub descent: f64,
    /// Signed distance from the glyphs' true vertical centre to the font's
    /// middle baseline.
    pub offset: f64,
}

/// The measurement service consumed by layout.
///
/// Must be a pure function of `(text, font)` for a given measurer state.
pub trait TextMeasurer {
    fn measure_text(&self, text: &str, font: &FontProps) -> Result<TextMetrics, MeasureError>;

    /// Width only. Layout calls this from its inner loops.
    fn text_width(&self, text: &str, font: &FontProps) -> Result<f64, MeasureError> {
        Ok(self.measure_text(text, font)?.width)
    }
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure_text(&self, text: &str, font: &FontProps) -> Result<TextMetrics, MeasureError> {
        (**self).measure_text(text, font)
    }
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for Box<T> {
    fn measure_text(&self, text: &str, font: &FontProps) -> Result<TextMetrics, MeasureError> {
        (**self).measure_text(text, font)
    }
}

// ── Monospace ──────────────────────────────────────────────────

/// Every character has the same advance.
///
/// Height is `1.2 × font size`; ascent, descent and offset are fixed
/// fractions of the height. Numbers come out exact, which makes layout
/// results easy to assert on.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasurer {
    advance: Advance,
}

#[derive(Debug, Clone, Copy)]
enum Advance {
    /// Pixels per character, whatever the font size.
    Fixed(f64),
    /// Fraction of the font size per character.
    Em(f64),
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self::fixed(8.0)
    }
}

impl MonospaceMeasurer {
    pub fn fixed(char_width: f64) -> Self {
        MonospaceMeasurer {
            advance: Advance::Fixed(char_width),
        }
    }

    /// Advance scales with the font size, e.g. `0.6` for a typical mono face.
    pub fn em(ratio: f64) -> Self {
        MonospaceMeasurer {
            advance: Advance::Em(ratio),
        }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure_text(&self, text: &str, font: &FontProps) -> Result<TextMetrics, MeasureError> {
        let size = font.size_or_default();
        let per_char = match self.advance {
            Advance::Fixed(w) => w,
            Advance::Em(ratio) => size * ratio,
        };
        let height = size * 1.2;
        Ok(TextMetrics {
            width: text.chars().count() as f64 * per_char,
            height,
            ascent: height * 0.75,
            descent: height * 0.25,
            offset: height * 0.1,
        })
    }
}

// ── Font faces ─────────────────────────────────────────────────

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub weight: u16,
    pub italic: bool,
}

/// Metrics parsed from one TrueType/OpenType face.
#[derive(Debug, Clone)]
pub struct FaceMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
    pub descender: i16,
    /// Vertical glyph extents `(y_min, y_max)` in font units.
    pub glyph_extents: HashMap<char, (i16, i16)>,
}

impl FaceMetrics {
    pub fn from_font_data(data: &[u8]) -> Result<Self, MeasureError> {
        let face = ttf_parser::Face::parse(data, 0).map_err(|e| MeasureError::FontParse(e.to_string()))?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut glyph_extents = HashMap::new();
        let mut default_advance = 0u16;

        for code in 32u32..=0xFFFF {
            let Some(ch) = char::from_u32(code) else {
                continue;
            };
            let Some(glyph_id) = face.glyph_index(ch) else {
                continue;
            };
            let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
            advance_widths.insert(ch, advance);
            if let Some(bbox) = face.glyph_bounding_box(glyph_id) {
                glyph_extents.insert(ch, (bbox.y_min, bbox.y_max));
            }
            if ch == ' ' {
                default_advance = advance;
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Ok(FaceMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            ascender: face.ascender(),
            descender: face.descender(),
            glyph_extents,
        })
    }

    pub fn measure(&self, text: &str, font_size: f64) -> TextMetrics {
        let scale = font_size / f64::from(self.units_per_em.max(1));
        let units: u32 = text
            .chars()
            .map(|ch| u32::from(self.advance_widths.get(&ch).copied().unwrap_or(self.default_advance)))
            .sum();

        let font_top = f64::from(self.ascender) * scale;
        let font_bottom = -f64::from(self.descender) * scale;

        // Ink extents of the run; blank runs fall back to the font box.
        let ink = text
            .chars()
            .filter_map(|ch| self.glyph_extents.get(&ch))
            .fold(None, |acc: Option<(i16, i16)>, &(lo, hi)| match acc {
                None => Some((lo, hi)),
                Some((a, b)) => Some((a.min(lo), b.max(hi))),
            });
        let (ascent, descent) = match ink {
            Some((lo, hi)) => (f64::from(hi) * scale, -f64::from(lo) * scale),
            None => (font_top, font_bottom),
        };

        TextMetrics {
            width: f64::from(units) * scale,
            height: ascent + descent,
            ascent,
            descent,
            offset: (ascent - descent) / 2.0 - (font_top - font_bottom) / 2.0,
        }
    }
}

/// Measures with real font faces registered by family, weight and style.
///
/// Resolution order: exact match, then the closest weight of the same family
/// and style, then the same family in any style, then the first registered
/// face. With nothing registered every measurement fails.
#[derive(Debug, Default)]
pub struct FontFaceMeasurer {
    faces: HashMap<FontKey, FaceMetrics>,
    fallback: Option<FontKey>,
}

impl FontFaceMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A measurer where `data` answers for every font request.
    pub fn from_font_data(data: &[u8]) -> Result<Self, MeasureError> {
        let mut measurer = Self::new();
        measurer.register("default", 400, false, data)?;
        Ok(measurer)
    }

    pub fn register(&mut self, family: &str, weight: u16, italic: bool, data: &[u8]) -> Result<(), MeasureError> {
        let metrics = FaceMetrics::from_font_data(data)?;
        let key = FontKey {
            family: family.to_string(),
            weight,
            italic,
        };
        if self.fallback.is_none() {
            self.fallback = Some(key.clone());
        }
        self.faces.insert(key, metrics);
        Ok(())
    }

    pub fn resolve(&self, font: &FontProps) -> Result<&FaceMetrics, MeasureError> {
        let family = font.family.as_deref().unwrap_or("");
        let weight = font.weight.unwrap_or(400);
        let italic = matches!(font.style, Some(FontStyle::Italic | FontStyle::Oblique));

        let exact = FontKey {
            family: family.to_string(),
            weight,
            italic,
        };
        if let Some(m) = self.faces.get(&exact) {
            return Ok(m);
        }

        let same_family = |want_italic: Option<bool>| {
            self.faces
                .iter()
                .filter(|(k, _)| k.family.eq_ignore_ascii_case(family))
                .filter(|(k, _)| want_italic.map_or(true, |i| k.italic == i))
                .min_by_key(|(k, _)| k.weight.abs_diff(weight))
                .map(|(_, m)| m)
        };
        if let Some(m) = same_family(Some(italic)).or_else(|| same_family(None)) {
            return Ok(m);
        }

        self.fallback
            .as_ref()
            .and_then(|k| self.faces.get(k))
            .ok_or_else(|| MeasureError::FontUnavailable(font.css()))
    }
}

impl TextMeasurer for FontFaceMeasurer {
    fn measure_text(&self, text: &str, font: &FontProps) -> Result<TextMetrics, MeasureError> {
        Ok(self.resolve(font)?.measure(text, font.size_or_default()))
    }
}

// ── Caching ────────────────────────────────────────────────────

/// Memoises an inner measurer by `(text, font)`.
///
/// Not `Sync`; one cache serves one layout pass.
pub struct CachedMeasurer<'m> {
    inner: &'m dyn TextMeasurer,
    entries: RefCell<HashMap<(String, String), TextMetrics>>,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl<'m> CachedMeasurer<'m> {
    pub fn new(inner: &'m dyn TextMeasurer) -> Self {
        CachedMeasurer {
            inner,
            entries: RefCell::new(HashMap::new()),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    /// `(hits, misses)` so far.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.get(), self.misses.get())
    }
}

impl TextMeasurer for CachedMeasurer<'_> {
    fn measure_text(&self, text: &str, font: &FontProps) -> Result<TextMetrics, MeasureError> {
        let key = (text.to_string(), font.css());
        if let Some(m) = self.entries.borrow().get(&key) {
            self.hits.set(self.hits.get() + 1);
            return Ok(*m);
        }
        let metrics = self.inner.measure_text(text, font)?;
        self.misses.set(self.misses.get() + 1);
        self.entries.borrow_mut().insert(key, metrics);
        Ok(metrics)
    }
}
