//! Fonts
//!
//! CSS font shorthand parsing, the font handle/provider seam, a per-context
//! font cache and the system font provider (fontdb + rustybuzz + ttf-parser).

use std::cell::OnceCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::path::OutlineSink;
use crate::{CanvasError, Result};

/// Font used when a frame never had `font` set
pub const DEFAULT_FONT: &str = "10px sans-serif";

/// Font style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl From<FontStyle> for fontdb::Style {
    fn from(style: FontStyle) -> Self {
        match style {
            FontStyle::Normal => fontdb::Style::Normal,
            FontStyle::Italic => fontdb::Style::Italic,
            FontStyle::Oblique => fontdb::Style::Oblique,
        }
    }
}

/// Parsed CSS font shorthand
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    pub style: FontStyle,
    /// 100-900
    pub weight: u16,
    /// Size in CSS pixels
    pub size: f64,
    /// Family names in preference order; generic names are kept lowercase
    pub families: Vec<String>,
}

impl FontDescriptor {
    /// Parse `[style] [variant] [weight] size[/line-height] family[, family]*`.
    /// Sizes may be given in `px` or `pt`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut style = FontStyle::Normal;
        let mut weight = 400;
        let mut rest = s.trim();

        let size = loop {
            let (token, tail) = rest.split_once(char::is_whitespace)?;
            rest = tail.trim_start();
            match token {
                "normal" | "small-caps" => {}
                "italic" => style = FontStyle::Italic,
                "oblique" => style = FontStyle::Oblique,
                "bold" | "bolder" => weight = 700,
                "lighter" => weight = 300,
                t if t.len() == 3 && t.ends_with("00") => {
                    weight = t.parse::<u16>().ok().filter(|w| (100..=900).contains(w))?;
                }
                t => break parse_font_size(t)?,
            }
        };

        let families: Vec<String> = rest
            .split(',')
            .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|f| !f.is_empty())
            .map(|f| match f.to_ascii_lowercase().as_str() {
                g @ ("serif" | "sans-serif" | "monospace" | "cursive" | "fantasy" | "system-ui") => g.to_string(),
                _ => f.to_string(),
            })
            .collect();
        if families.is_empty() {
            return None;
        }

        Some(Self { style, weight, size, families })
    }
}

/// `12px`, `9pt` or `12px/1.5`
fn parse_font_size(token: &str) -> Option<f64> {
    let token = token.split('/').next()?;
    let (number, scale) = if let Some(n) = token.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = token.strip_suffix("pt") {
        (n, 4.0 / 3.0)
    } else {
        return None;
    };
    let value: f64 = number.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value * scale)
}

/// How a font's glyphs are drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FontKind {
    /// Vector outlines, filled or stroked as paths
    #[default]
    Outline,
    /// Pre-rasterized coverage cells, blitted directly
    Bitmap,
}

/// Pre-rasterized glyph. Row 0 is the top of the em box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphCell {
    pub width: u32,
    pub height: u32,
    /// One coverage byte per pixel
    pub coverage: Vec<u8>,
}

/// A resolved font
pub trait FontHandle: fmt::Debug {
    /// Advance width of `text` in pixels
    fn width(&self, text: &str) -> f64;

    /// Em size in pixels
    fn pixel_size(&self) -> f64;

    /// Distance from the top of the em box down to the baseline
    fn baseline(&self) -> f64;

    /// Distance from the baseline down to the bottom of the glyph box
    fn descent(&self) -> f64 {
        (self.pixel_size() - self.baseline()).max(0.0)
    }

    fn kind(&self) -> FontKind {
        FontKind::Outline
    }

    /// Emit the outline of one grapheme cluster in pixel units, y down,
    /// origin on the baseline at the pen position
    fn outline(&self, _cluster: &str, _sink: &mut dyn OutlineSink) {}

    /// Coverage cell for one grapheme cluster (bitmap fonts)
    fn glyph_cell(&self, _cluster: &str) -> Option<GlyphCell> {
        None
    }
}

/// Resolves font descriptors to handles
pub trait FontProvider {
    fn resolve(&self, descriptor: &FontDescriptor) -> Result<Rc<dyn FontHandle>>;
}

/// Per-context font cache keyed by the shorthand string. Holds at most
/// `capacity` fonts; the oldest entry is dropped first.
pub struct FontCache {
    provider: Box<dyn FontProvider>,
    fonts: HashMap<String, Rc<dyn FontHandle>>,
    order: VecDeque<String>,
    capacity: usize,
}

impl FontCache {
    pub fn new(provider: Box<dyn FontProvider>, capacity: usize) -> Self {
        Self { provider, fonts: HashMap::new(), order: VecDeque::new(), capacity: capacity.max(1) }
    }

    /// Look up or load the font for a shorthand. Failures are logged and
    /// not cached, so a later call may succeed.
    pub fn resolve(&mut self, shorthand: &str) -> Option<Rc<dyn FontHandle>> {
        if let Some(font) = self.fonts.get(shorthand) {
            return Some(font.clone());
        }
        let Some(descriptor) = FontDescriptor::parse(shorthand) else {
            tracing::warn!("Unparsable font {:?}", shorthand);
            return None;
        };
        match self.provider.resolve(&descriptor) {
            Ok(font) => {
                while self.order.len() >= self.capacity {
                    let Some(oldest) = self.order.pop_front() else {
                        break;
                    };
                    tracing::trace!("Evicting font {:?}", oldest);
                    self.fonts.remove(&oldest);
                }
                self.order.push_back(shorthand.to_string());
                self.fonts.insert(shorthand.to_string(), font.clone());
                Some(font)
            }
            Err(err) => {
                tracing::warn!("Font {:?} unavailable: {}", shorthand, err);
                None
            }
        }
    }

    /// Number of cached fonts
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

impl fmt::Debug for FontCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontCache").field("fonts", &self.fonts.keys().collect::<Vec<_>>()).finish()
    }
}

/// Fonts installed on the system, found through fontdb. The database is
/// loaded on first use.
#[derive(Default)]
pub struct SystemFontProvider {
    db: OnceCell<fontdb::Database>,
}

impl SystemFontProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider over an already populated database
    pub fn with_database(db: fontdb::Database) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(db);
        Self { db: cell }
    }

    fn database(&self) -> &fontdb::Database {
        self.db.get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!("Loaded {} system font faces", db.len());
            db
        })
    }
}

impl fmt::Debug for SystemFontProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemFontProvider").field("loaded", &self.db.get().is_some()).finish()
    }
}

impl FontProvider for SystemFontProvider {
    fn resolve(&self, descriptor: &FontDescriptor) -> Result<Rc<dyn FontHandle>> {
        let db = self.database();
        let families: Vec<fontdb::Family<'_>> = descriptor
            .families
            .iter()
            .map(|name| match name.as_str() {
                "serif" => fontdb::Family::Serif,
                "sans-serif" | "system-ui" => fontdb::Family::SansSerif,
                "monospace" => fontdb::Family::Monospace,
                "cursive" => fontdb::Family::Cursive,
                "fantasy" => fontdb::Family::Fantasy,
                other => fontdb::Family::Name(other),
            })
            .collect();
        let query = fontdb::Query {
            families: &families,
            weight: fontdb::Weight(descriptor.weight),
            stretch: fontdb::Stretch::Normal,
            style: descriptor.style.into(),
        };

        let id = db
            .query(&query)
            .ok_or_else(|| CanvasError::Font(format!("no face matches {:?}", descriptor.families)))?;
        let (data, index) = db
            .with_face_data(id, |data, index| (Arc::<[u8]>::from(data), index))
            .ok_or_else(|| CanvasError::Font("face data unavailable".into()))?;

        let font = SfntFont::new(data, index, descriptor.size)?;
        Ok(Rc::new(font))
    }
}

/// TrueType/OpenType face at a pixel size
pub struct SfntFont {
    data: Arc<[u8]>,
    index: u32,
    size: f64,
    /// Pixels per font unit
    scale: f64,
    ascent: f64,
    descent: f64,
}

impl SfntFont {
    pub fn new(data: Arc<[u8]>, index: u32, size: f64) -> Result<Self> {
        let face = ttf_parser::Face::parse(&data, index)
            .map_err(|e| CanvasError::Font(format!("failed to parse face: {e}")))?;
        let scale = size / face.units_per_em() as f64;
        let ascent = face.ascender() as f64 * scale;
        let descent = -(face.descender() as f64) * scale;
        Ok(Self { data, index, size, scale, ascent, descent })
    }

    /// Glyph ids and pen positions (font units) for a run of text
    fn shape(&self, text: &str) -> Vec<(u16, i32, i32)> {
        let Some(face) = rustybuzz::Face::from_slice(&self.data, self.index) else {
            return Vec::new();
        };
        let mut buffer = rustybuzz::UnicodeBuffer::new();
        buffer.push_str(text);
        let output = rustybuzz::shape(&face, &[], buffer);

        let mut pen = 0;
        output
            .glyph_infos()
            .iter()
            .zip(output.glyph_positions())
            .map(|(info, pos)| {
                let placed = (info.glyph_id as u16, pen + pos.x_offset, pos.y_offset);
                pen += pos.x_advance;
                placed
            })
            .collect()
    }
}

impl fmt::Debug for SfntFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SfntFont").field("index", &self.index).field("size", &self.size).finish()
    }
}

impl FontHandle for SfntFont {
    fn width(&self, text: &str) -> f64 {
        let Some(face) = rustybuzz::Face::from_slice(&self.data, self.index) else {
            return 0.0;
        };
        let mut buffer = rustybuzz::UnicodeBuffer::new();
        buffer.push_str(text);
        let output = rustybuzz::shape(&face, &[], buffer);
        let units: i32 = output.glyph_positions().iter().map(|p| p.x_advance).sum();
        units as f64 * self.scale
    }

    fn pixel_size(&self) -> f64 {
        self.size
    }

    fn baseline(&self) -> f64 {
        self.ascent
    }

    fn descent(&self) -> f64 {
        self.descent
    }

    fn outline(&self, cluster: &str, sink: &mut dyn OutlineSink) {
        let Ok(face) = ttf_parser::Face::parse(&self.data, self.index) else {
            return;
        };
        for (glyph_id, x, y) in self.shape(cluster) {
            let mut builder = UnitsToPixels { sink: &mut *sink, scale: self.scale, dx: x as f64, dy: y as f64 };
            face.outline_glyph(ttf_parser::GlyphId(glyph_id), &mut builder);
        }
    }
}

/// Converts ttf-parser outlines (font units, y up) to pixels (y down)
struct UnitsToPixels<'s> {
    sink: &'s mut dyn OutlineSink,
    scale: f64,
    dx: f64,
    dy: f64,
}

impl UnitsToPixels<'_> {
    fn x(&self, x: f32) -> f64 {
        (x as f64 + self.dx) * self.scale
    }

    fn y(&self, y: f32) -> f64 {
        -(y as f64 + self.dy) * self.scale
    }
}

impl ttf_parser::OutlineBuilder for UnitsToPixels<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.x(x), self.y(y));
        self.sink.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.x(x), self.y(y));
        self.sink.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1, x, y) = (self.x(x1), self.y(y1), self.x(x), self.y(y));
        self.sink.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1, x2, y2, x, y) = (self.x(x1), self.y(y1), self.x(x2), self.y(y2), self.x(x), self.y(y));
        self.sink.curve_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.sink.close();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Fixed-advance font: every non-space char is a solid box
    /// `advance` wide from the top of the em box to the baseline.
    #[derive(Debug)]
    pub struct BoxFont {
        pub size: f64,
        pub advance: f64,
        pub kind: FontKind,
    }

    impl FontHandle for BoxFont {
        fn width(&self, text: &str) -> f64 {
            text.chars().count() as f64 * self.advance
        }

        fn pixel_size(&self) -> f64 {
            self.size
        }

        fn baseline(&self) -> f64 {
            self.size * 0.8
        }

        fn kind(&self) -> FontKind {
            self.kind
        }

        fn outline(&self, cluster: &str, sink: &mut dyn OutlineSink) {
            let mut x = 0.0;
            for ch in cluster.chars() {
                if ch != ' ' {
                    let top = -self.baseline();
                    sink.move_to(x, top);
                    sink.line_to(x + self.advance, top);
                    sink.line_to(x + self.advance, 0.0);
                    sink.line_to(x, 0.0);
                    sink.close();
                }
                x += self.advance;
            }
        }

        fn glyph_cell(&self, cluster: &str) -> Option<GlyphCell> {
            let width = self.width(cluster) as u32;
            let height = self.baseline() as u32;
            let fill = if cluster.trim().is_empty() { 0 } else { 255 };
            Some(GlyphCell { width, height, coverage: vec![fill; (width * height) as usize] })
        }
    }

    /// Serves `BoxFont`s at the requested size
    #[derive(Debug, Default)]
    pub struct BoxFontProvider {
        pub kind: FontKind,
    }

    impl FontProvider for BoxFontProvider {
        fn resolve(&self, descriptor: &FontDescriptor) -> Result<Rc<dyn FontHandle>> {
            if descriptor.families.iter().any(|f| f == "missing") {
                return Err(CanvasError::Font("missing".into()));
            }
            Ok(Rc::new(BoxFont { size: descriptor.size, advance: descriptor.size / 2.0, kind: self.kind }))
        }
    }

    /// System font database plus the family of the first face with an
    /// outlined 'H', or `None` on machines without usable fonts.
    pub fn system_face() -> Option<(fontdb::Database, String)> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let family = db.faces().find_map(|info| {
            let has_outline = db.with_face_data(info.id, |data, index| {
                ttf_parser::Face::parse(data, index)
                    .ok()
                    .and_then(|face| face.glyph_index('H').and_then(|glyph| face.glyph_bounding_box(glyph)))
                    .is_some()
            })?;
            if !has_outline {
                return None;
            }
            info.families.first().map(|(name, _)| name.clone())
        })?;
        Some((db, family))
    }
}

#[cfg(test)]
mod tests {
    use super::testing::BoxFontProvider;
    use super::*;

    #[test]
    fn test_parse_shorthand() {
        let d = FontDescriptor::parse("italic bold 12px/1.5 \"Open Sans\", serif").unwrap();
        assert_eq!(d.style, FontStyle::Italic);
        assert_eq!(d.weight, 700);
        assert_eq!(d.size, 12.0);
        assert_eq!(d.families, vec!["Open Sans".to_string(), "serif".to_string()]);
    }

    #[test]
    fn test_parse_default_and_points() {
        let d = FontDescriptor::parse(DEFAULT_FONT).unwrap();
        assert_eq!(d.size, 10.0);
        assert_eq!(d.families, vec!["sans-serif".to_string()]);

        let d = FontDescriptor::parse("600 9pt Monospace").unwrap();
        assert_eq!(d.weight, 600);
        assert_eq!(d.size, 12.0);
        assert_eq!(d.families, vec!["monospace".to_string()]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(FontDescriptor::parse("").is_none());
        assert!(FontDescriptor::parse("12px").is_none());
        assert!(FontDescriptor::parse("huge serif").is_none());
        assert!(FontDescriptor::parse("-3px serif").is_none());
    }

    #[test]
    fn test_cache_reuses_handles() {
        let mut cache = FontCache::new(Box::new(BoxFontProvider::default()), 4);
        let a = cache.resolve("10px sans-serif").unwrap();
        let b = cache.resolve("10px sans-serif").unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_evicts_oldest() {
        let mut cache = FontCache::new(Box::new(BoxFontProvider::default()), 2);
        let first = cache.resolve("10px a").unwrap();
        cache.resolve("11px a").unwrap();
        cache.resolve("12px a").unwrap();
        assert_eq!(cache.len(), 2);

        // the first font was dropped and loads again as a new handle
        let again = cache.resolve("10px a").unwrap();
        assert!(!Rc::ptr_eq(&first, &again));
        assert_eq!(cache.len(), 2);
        let latest = cache.resolve("10px a").unwrap();
        assert!(Rc::ptr_eq(&again, &latest));
    }

    #[test]
    fn test_cache_does_not_keep_failures() {
        let mut cache = FontCache::new(Box::new(BoxFontProvider::default()), 4);
        assert!(cache.resolve("10px missing").is_none());
        assert!(cache.resolve("nonsense").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_empty_database_has_no_faces() {
        let provider = SystemFontProvider::with_database(fontdb::Database::new());
        let descriptor = FontDescriptor::parse("16px sans-serif").unwrap();
        assert!(matches!(provider.resolve(&descriptor), Err(CanvasError::Font(_))));
    }

    #[test]
    fn test_system_font_metrics_and_outline() {
        use super::testing::system_face;
        use crate::path::Path;
        use crate::transform::AffineTransform;

        let Some((db, family)) = system_face() else {
            eprintln!("no outline font installed, skipping");
            return;
        };
        let provider = SystemFontProvider::with_database(db);
        let small = provider.resolve(&FontDescriptor::parse(&format!("16px \"{family}\"")).unwrap()).unwrap();
        let large = provider.resolve(&FontDescriptor::parse(&format!("32px \"{family}\"")).unwrap()).unwrap();

        assert_eq!(small.pixel_size(), 16.0);
        assert!(small.baseline() > 0.0);
        let width = small.width("H");
        assert!(width > 0.0);
        assert!((large.width("H") - 2.0 * width).abs() < 1e-9);

        // glyph sits above the baseline inside its advance
        let mut path = Path::new();
        path.append_text(["H"], &*small, &AffineTransform::identity());
        let bounds = path.bounding_box();
        assert!(!bounds.is_empty());
        assert!(bounds.y < 0.0);
        assert!(bounds.bottom() <= 1.0);
        assert!(bounds.x >= -1.0 && bounds.right() <= width + 1.0);
    }
}
