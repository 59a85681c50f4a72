//! Text preparation
//!
//! Turns a string plus the current font, alignment and baseline into a
//! positioned run of grapheme clusters. Both render strategies (outline
//! paths and bitmap glyph cells) consume the same [`PreparedText`], so the
//! anchor math is shared.

use icu_segmenter::GraphemeClusterSegmenter;

use crate::font::FontHandle;
use crate::geometry::Rect;
use crate::state::{TextAlign, TextBaseline};

/// Grapheme cluster boundaries over a string
pub trait GraphemeSegmenter {
    /// Byte offsets of every boundary, including 0 and `text.len()`
    fn boundaries(&self, text: &str) -> Vec<usize>;
}

/// Unicode grapheme clusters via ICU4X
#[derive(Debug, Clone, Copy, Default)]
pub struct IcuGraphemeSegmenter;

impl GraphemeSegmenter for IcuGraphemeSegmenter {
    fn boundaries(&self, text: &str) -> Vec<usize> {
        if text.is_empty() {
            return vec![0];
        }
        GraphemeClusterSegmenter::new().segment_str(text).collect()
    }
}

/// Physical alignment after resolving start/end (left-to-right only)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PhysicalAlignment {
    #[default]
    Left,
    Center,
    Right,
}

impl From<TextAlign> for PhysicalAlignment {
    fn from(align: TextAlign) -> Self {
        match align {
            TextAlign::Start | TextAlign::Left => Self::Left,
            TextAlign::End | TextAlign::Right => Self::Right,
            TextAlign::Center => Self::Center,
        }
    }
}

/// One grapheme cluster and where it goes
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedGlyph {
    pub cluster: String,
    /// Byte offset of the cluster in the normalized text
    pub byte_offset: usize,
    /// Pen x relative to the anchor, after alignment and condensing
    pub x: f64,
}

/// Extents around the anchor point; all positive in their direction
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextExtents {
    pub left: f64,
    pub right: f64,
    pub ascent: f64,
    pub descent: f64,
}

/// Output of [`prepare_text`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedText {
    pub glyphs: Vec<PlacedGlyph>,
    pub alignment: PhysicalAlignment,
    /// Box around the run, relative to the anchor
    pub bounds: Rect,
    pub extents: TextExtents,
    /// Baseline y relative to the anchor
    pub baseline_y: f64,
    /// Horizontal condensing factor, 1.0 unless max width was exceeded
    pub horizontal_scale: f64,
    /// Advance width of the normalized text before condensing
    pub measured_width: f64,
}

impl PreparedText {
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Text metrics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub actual_bounding_box_left: f64,
    pub actual_bounding_box_right: f64,
    pub font_bounding_box_ascent: f64,
    pub font_bounding_box_descent: f64,
    pub actual_bounding_box_ascent: f64,
    pub actual_bounding_box_descent: f64,
    pub em_height_ascent: f64,
    pub em_height_descent: f64,
}

impl TextMetrics {
    pub fn new(prepared: &PreparedText, font: &dyn FontHandle) -> Self {
        Self {
            width: prepared.measured_width,
            actual_bounding_box_left: prepared.extents.left,
            actual_bounding_box_right: prepared.extents.right,
            font_bounding_box_ascent: font.baseline(),
            font_bounding_box_descent: font.descent(),
            actual_bounding_box_ascent: prepared.extents.ascent,
            actual_bounding_box_descent: prepared.extents.descent,
            em_height_ascent: font.baseline(),
            em_height_descent: font.descent(),
        }
    }
}

/// `maxWidth` that allows drawing: absent, or finite-or-infinite and > 0
pub fn max_width_allows_drawing(max_width: Option<f64>) -> bool {
    match max_width {
        None => true,
        Some(w) => !w.is_nan() && w > 0.0,
    }
}

/// Replace ASCII whitespace with U+0020
pub fn normalize_whitespace(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_whitespace() { ' ' } else { c })
        .collect()
}

/// Lay out one line of text around an anchor at the origin.
///
/// Vertical placement approximates baselines: hanging behaves like top,
/// alphabetic and ideographic behave like bottom.
pub fn prepare_text(
    text: &str,
    max_width: Option<f64>,
    font: &dyn FontHandle,
    align: TextAlign,
    baseline: TextBaseline,
    segmenter: &dyn GraphemeSegmenter,
) -> PreparedText {
    if !max_width_allows_drawing(max_width) {
        return PreparedText::default();
    }

    let text = normalize_whitespace(text);
    let measured_width = font.width(&text);
    let size = font.pixel_size();

    let horizontal_scale = match max_width {
        Some(max) if measured_width > max => max / measured_width,
        _ => 1.0,
    };
    let width = measured_width * horizontal_scale;

    let alignment = PhysicalAlignment::from(align);
    let offset_x = match alignment {
        PhysicalAlignment::Left => 0.0,
        PhysicalAlignment::Center => -width / 2.0,
        PhysicalAlignment::Right => -width,
    };
    let top = match baseline {
        TextBaseline::Top | TextBaseline::Hanging => 0.0,
        TextBaseline::Middle => -size / 2.0,
        TextBaseline::Alphabetic | TextBaseline::Ideographic | TextBaseline::Bottom => -size,
    };
    let height = font.baseline() + font.descent();

    let boundaries = segmenter.boundaries(&text);
    let mut pen = 0.0;
    let glyphs = boundaries
        .windows(2)
        .map(|pair| {
            let cluster = &text[pair[0]..pair[1]];
            let glyph = PlacedGlyph {
                cluster: cluster.to_string(),
                byte_offset: pair[0],
                x: offset_x + pen * horizontal_scale,
            };
            pen += font.width(cluster);
            glyph
        })
        .collect();

    PreparedText {
        glyphs,
        alignment,
        bounds: Rect::new(offset_x, top, width, height),
        extents: TextExtents {
            left: -offset_x,
            right: offset_x + width,
            ascent: -top,
            descent: top + height,
        },
        baseline_y: top + font.baseline(),
        horizontal_scale,
        measured_width,
    }
}
