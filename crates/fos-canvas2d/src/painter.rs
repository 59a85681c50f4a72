//! Painter interface
//!
//! The rasterizer contract the context draws through. Geometry handed to a
//! painter is already in device space; the context decides what to draw and
//! the painter only scan-converts it.

use std::ops::{Deref, DerefMut};

use crate::geometry::{IntRect, Rect};
use crate::paint::{Color, ResolvedPaint};
use crate::path::Path;
use crate::raster::Bitmap;
use crate::state::{Clip, DrawingState, ImageSmoothingQuality, LineCap, LineJoin};
use crate::transform::AffineTransform;

/// Fill rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WindingRule {
    #[default]
    NonZero,
    EvenOdd,
}

impl WindingRule {
    /// Parse an exact fill-rule token
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "nonzero" => Some(Self::NonZero),
            "evenodd" => Some(Self::EvenOdd),
            _ => None,
        }
    }

    /// Parse a caller-supplied token. Anything but `"nonzero"` or
    /// `"evenodd"` is logged and treated as nonzero; the draw still happens.
    pub fn from_token(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| {
            tracing::warn!("Unknown fill rule {:?}, using nonzero", s);
            Self::NonZero
        })
    }

    pub fn to_tiny_skia(self) -> tiny_skia::FillRule {
        match self {
            Self::NonZero => tiny_skia::FillRule::Winding,
            Self::EvenOdd => tiny_skia::FillRule::EvenOdd,
        }
    }
}

/// Stroke parameters captured from a drawing state
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub thickness: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f64,
    pub dash: Vec<f64>,
    pub dash_offset: f64,
    /// User-to-device transform when the stroke was issued. Thickness and
    /// dashes are user-space lengths and scale with it.
    pub transform: AffineTransform,
}

impl StrokeStyle {
    pub fn from_state(state: &DrawingState) -> Self {
        Self {
            thickness: state.line_width,
            cap: state.line_cap,
            join: state.line_join,
            miter_limit: state.miter_limit,
            dash: state.line_dash.clone(),
            dash_offset: state.line_dash_offset,
            transform: state.transform,
        }
    }
}

/// Bitmap scaling filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScalingMode {
    NearestNeighbor,
    #[default]
    Bilinear,
    Bicubic,
}

impl ScalingMode {
    /// Filter for the smoothing settings. Quality is only a hint.
    pub fn for_smoothing(enabled: bool, quality: ImageSmoothingQuality) -> Self {
        match (enabled, quality) {
            (false, _) => Self::NearestNeighbor,
            (true, ImageSmoothingQuality::High) => Self::Bicubic,
            (true, _) => Self::Bilinear,
        }
    }
}

/// Rasterizer primitives
pub trait Painter {
    /// Fill a path with the given rule
    fn fill_path(&mut self, path: &Path, paint: &ResolvedPaint, rule: WindingRule);

    /// Stroke a path as given (open sub-paths stay open)
    fn stroke_path(&mut self, path: &Path, paint: &ResolvedPaint, style: &StrokeStyle);

    /// Set every pixel of `rect` inside the active clip to `color`, no
    /// blending with what was there
    fn clear_rect(&mut self, rect: Rect, color: Color);

    /// Copy `source` out of `bitmap` to `(x, y)` unblended, limited to the
    /// target bounds
    fn blit(&mut self, x: i32, y: i32, bitmap: &Bitmap, source: IntRect);

    /// Draw `source` out of `bitmap` scaled into `dest`; `dest` is in user
    /// space and is placed by `transform`
    fn draw_scaled_bitmap(
        &mut self,
        dest: Rect,
        bitmap: &Bitmap,
        source: Rect,
        transform: &AffineTransform,
        opacity: f64,
        scaling: ScalingMode,
    );

    /// Intersect the active clip with a path
    fn clip_to(&mut self, path: &Path, rule: WindingRule);

    /// Drop any clip set with [`Painter::clip_to`]
    fn reset_clip(&mut self);
}

/// Painter with a drawing state's clip applied for its lifetime
pub struct ClippedPainter<'a> {
    painter: &'a mut dyn Painter,
}

impl<'a> ClippedPainter<'a> {
    pub fn new(painter: &'a mut dyn Painter, clip: Option<&Clip>) -> Self {
        painter.reset_clip();
        if let Some(clip) = clip {
            for (path, rule) in clip.entries() {
                painter.clip_to(path, *rule);
            }
        }
        Self { painter }
    }
}

impl<'a> Deref for ClippedPainter<'a> {
    type Target = dyn Painter + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.painter
    }
}

impl DerefMut for ClippedPainter<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.painter
    }
}

impl Drop for ClippedPainter<'_> {
    fn drop(&mut self) {
        self.painter.reset_clip();
    }
}
