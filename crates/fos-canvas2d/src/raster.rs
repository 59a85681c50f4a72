//! Rasterizer
//!
//! Default [`Painter`] backed by a tiny-skia `Pixmap`.

use std::fmt;

use tiny_skia::{
    FillRule, FilterQuality, GradientStop, LinearGradient, Mask, Paint, Pixmap,
    PremultipliedColorU8, RadialGradient, Shader, SpreadMode, Stroke, StrokeDash,
};

use crate::geometry::{IntRect, Rect};
use crate::paint::{Color, Gradient, GradientKind, PaintStyle, Pattern, PatternRepetition, ResolvedPaint};
use crate::painter::{Painter, ScalingMode, StrokeStyle, WindingRule};
use crate::path::Path;
use crate::state::{LineCap, LineJoin};
use crate::transform::AffineTransform;

/// Extent used for the unbounded axis of repeat-x / repeat-y patterns
const PATTERN_FAR: f64 = 1.0e7;

/// RGBA bitmap, stored premultiplied
#[derive(Clone)]
pub struct Bitmap {
    pixmap: Pixmap,
}

impl Bitmap {
    /// Transparent black bitmap; `None` for a zero or oversized dimension
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Pixmap::new(width, height).map(|pixmap| Self { pixmap })
    }

    /// Bitmap from straight (non-premultiplied) RGBA bytes
    pub fn from_rgba8(width: u32, height: u32, data: &[u8]) -> Option<Self> {
        let len = (width as usize).checked_mul(height as usize)?.checked_mul(4)?;
        if data.len() != len {
            return None;
        }
        let mut bitmap = Self::new(width, height)?;
        for (dst, src) in bitmap.pixmap.pixels_mut().iter_mut().zip(data.chunks_exact(4)) {
            *dst = premultiply(Color::rgba(src[0], src[1], src[2], src[3]));
        }
        Some(bitmap)
    }

    /// Bitmap filled with one color
    pub fn filled(width: u32, height: u32, color: Color) -> Option<Self> {
        let mut bitmap = Self::new(width, height)?;
        bitmap.pixmap.pixels_mut().fill(premultiply(color));
        Some(bitmap)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn bounds(&self) -> IntRect {
        IntRect::new(0, 0, self.width(), self.height())
    }

    /// Straight-alpha color at `(x, y)`, `None` outside the bitmap
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let p = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::rgba(p.red(), p.green(), p.blue(), p.alpha()))
    }

    /// Overwrite the pixel at `(x, y)`, no blending
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width() && y < self.height() {
            let idx = (y * self.width() + x) as usize;
            self.pixmap.pixels_mut()[idx] = premultiply(color);
        }
    }

    /// Straight RGBA bytes of the whole bitmap
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }

    /// Copy of the region, clipped to the bitmap bounds
    pub fn crop(&self, region: IntRect) -> Option<Bitmap> {
        let region = region.intersection(&self.bounds());
        if region.is_empty() {
            return None;
        }
        let rect = tiny_skia::IntRect::from_xywh(region.x, region.y, region.width, region.height)?;
        self.pixmap.clone_rect(rect).map(|pixmap| Self { pixmap })
    }

    pub(crate) fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

impl PartialEq for Bitmap {
    fn eq(&self, other: &Self) -> bool {
        self.width() == other.width() && self.height() == other.height() && self.pixmap.data() == other.pixmap.data()
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

fn premultiply(c: Color) -> PremultipliedColorU8 {
    tiny_skia::ColorU8::from_rgba(c.r, c.g, c.b, c.a).premultiply()
}

/// Backing bitmap plus the painter that draws into it
pub struct SkiaPainter {
    target: Bitmap,
    clip: Option<Mask>,
    anti_alias: bool,
}

impl SkiaPainter {
    /// New transparent surface
    pub fn new(width: u32, height: u32, anti_alias: bool) -> Option<Self> {
        Some(Self { target: Bitmap::new(width, height)?, clip: None, anti_alias })
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.target
    }

    /// Build a tiny-skia paint. `space` maps device space into the space
    /// the path is drawn in, so the shader lands where the paint wants it.
    fn make_paint<'p>(&self, paint: &'p ResolvedPaint, space: &AffineTransform) -> Option<Paint<'p>> {
        let shader_ts = space.multiply(&paint.transform).to_tiny_skia();
        let shader = match &paint.style {
            PaintStyle::Color(color) => Shader::SolidColor(color.to_tiny_skia()),
            PaintStyle::Gradient(gradient) => {
                let mut shader = gradient_shader(gradient, shader_ts)?;
                shader.apply_opacity(paint.opacity as f32);
                shader
            }
            PaintStyle::Pattern(pattern) => tiny_skia::Pattern::new(
                pattern.bitmap.pixmap().as_ref(),
                SpreadMode::Repeat,
                filter_quality(paint.scaling),
                paint.opacity as f32,
                shader_ts,
            ),
        };
        Some(Paint { shader, anti_alias: self.anti_alias, ..Paint::default() })
    }

    /// The clip mask, further limited to a non-repeating pattern's tile
    fn mask_for(&self, paint: &ResolvedPaint) -> Option<Mask> {
        let PaintStyle::Pattern(pattern) = &paint.style else {
            return self.clip.clone();
        };
        let Some(tile) = pattern_tile(pattern) else {
            return self.clip.clone();
        };
        let mut path = Path::new();
        path.rect(tile, &paint.transform);
        let tile = path.to_tiny_skia()?;

        let mut mask = match self.clip.clone() {
            Some(mask) => mask,
            None => self.full_mask()?,
        };
        mask.intersect_path(&tile, FillRule::Winding, self.anti_alias, tiny_skia::Transform::identity());
        Some(mask)
    }

    fn full_mask(&self) -> Option<Mask> {
        let mut mask = Mask::new(self.target.width(), self.target.height())?;
        mask.data_mut().fill(255);
        Some(mask)
    }
}

impl fmt::Debug for SkiaPainter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkiaPainter")
            .field("target", &self.target)
            .field("clipped", &self.clip.is_some())
            .finish()
    }
}

impl Painter for SkiaPainter {
    fn fill_path(&mut self, path: &Path, paint: &ResolvedPaint, rule: WindingRule) {
        let Some(sk_path) = path.to_tiny_skia() else {
            return;
        };
        let Some(sk_paint) = self.make_paint(paint, &AffineTransform::identity()) else {
            return;
        };
        let mask = self.mask_for(paint);
        self.target.pixmap.fill_path(
            &sk_path,
            &sk_paint,
            rule.to_tiny_skia(),
            tiny_skia::Transform::identity(),
            mask.as_ref(),
        );
    }

    fn stroke_path(&mut self, path: &Path, paint: &ResolvedPaint, style: &StrokeStyle) {
        // Width and dashes are user-space lengths. Under a uniform scale they
        // are scaled and the device path stroked directly; otherwise the path
        // goes back to user space and the stroke is transformed as a whole.
        let (sk_path, sk_paint, lengths, ts) = match style.transform.uniform_scale() {
            Some(scale) => {
                let Some(sk_path) = path.to_tiny_skia() else {
                    return;
                };
                let Some(sk_paint) = self.make_paint(paint, &AffineTransform::identity()) else {
                    return;
                };
                (sk_path, sk_paint, scale, tiny_skia::Transform::identity())
            }
            None => {
                let Some(to_user) = style.transform.inverse() else {
                    return;
                };
                let Some(sk_path) = path.copy_transformed(&to_user).to_tiny_skia() else {
                    return;
                };
                let Some(sk_paint) = self.make_paint(paint, &to_user) else {
                    return;
                };
                (sk_path, sk_paint, 1.0, style.transform.to_tiny_skia())
            }
        };

        let dash = if style.dash.is_empty() {
            None
        } else {
            StrokeDash::new(
                style.dash.iter().map(|d| (d * lengths) as f32).collect(),
                (style.dash_offset * lengths) as f32,
            )
        };
        let stroke = Stroke {
            width: (style.thickness * lengths) as f32,
            miter_limit: style.miter_limit as f32,
            line_cap: match style.cap {
                LineCap::Butt => tiny_skia::LineCap::Butt,
                LineCap::Round => tiny_skia::LineCap::Round,
                LineCap::Square => tiny_skia::LineCap::Square,
            },
            line_join: match style.join {
                LineJoin::Miter => tiny_skia::LineJoin::Miter,
                LineJoin::Round => tiny_skia::LineJoin::Round,
                LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
            },
            dash,
        };

        let mask = self.mask_for(paint);
        self.target.pixmap.stroke_path(&sk_path, &sk_paint, &stroke, ts, mask.as_ref());
    }

    fn clear_rect(&mut self, rect: Rect, color: Color) {
        let Some(sk_rect) = rect.to_tiny_skia() else {
            return;
        };
        let area = tiny_skia::PathBuilder::from_rect(sk_rect);
        let ts = tiny_skia::Transform::identity();
        let mask = self.clip.clone();

        // An opaque source under DestinationOut erases in proportion to the
        // clip coverage, so pixels outside the clip keep their contents
        let mut erase = Paint::default();
        erase.set_color(tiny_skia::Color::BLACK);
        erase.blend_mode = tiny_skia::BlendMode::DestinationOut;
        erase.anti_alias = false;
        self.target.pixmap.fill_path(&area, &erase, FillRule::Winding, ts, mask.as_ref());

        if color.a > 0 {
            let mut paint = Paint::default();
            paint.set_color(color.to_tiny_skia());
            paint.anti_alias = false;
            self.target.pixmap.fill_path(&area, &paint, FillRule::Winding, ts, mask.as_ref());
        }
    }

    fn blit(&mut self, x: i32, y: i32, bitmap: &Bitmap, source: IntRect) {
        let source = source.intersection(&bitmap.bounds());
        let dest = IntRect::new(x, y, source.width, source.height).intersection(&self.target.bounds());
        if dest.is_empty() {
            return;
        }

        let src_width = bitmap.width() as usize;
        let dst_width = self.target.width() as usize;
        let src_pixels = bitmap.pixmap.pixels();
        let dst_pixels = self.target.pixmap.pixels_mut();
        for row in 0..dest.height as i64 {
            let dy = dest.y as i64 + row;
            let sy = source.y as i64 + (dy - y as i64);
            let sx = source.x as i64 + (dest.x as i64 - x as i64);
            let src_start = sy as usize * src_width + sx as usize;
            let dst_start = dy as usize * dst_width + dest.x as usize;
            let len = dest.width as usize;
            dst_pixels[dst_start..dst_start + len].copy_from_slice(&src_pixels[src_start..src_start + len]);
        }
    }

    fn draw_scaled_bitmap(
        &mut self,
        dest: Rect,
        bitmap: &Bitmap,
        source: Rect,
        transform: &AffineTransform,
        opacity: f64,
        scaling: ScalingMode,
    ) {
        if source.is_empty() || dest.is_empty() {
            return;
        }
        let Some(crop) = bitmap.crop(source.round_out()) else {
            return;
        };
        let Some(sk_rect) = dest.to_tiny_skia() else {
            return;
        };

        // cropped pixel space -> destination rect
        let sx = dest.width / source.width;
        let sy = dest.height / source.height;
        let (crop_x, crop_y) = (source.round_out().x.max(0) as f64, source.round_out().y.max(0) as f64);
        let pattern_ts = AffineTransform::translation(
            dest.x + (crop_x - source.x) * sx,
            dest.y + (crop_y - source.y) * sy,
        )
        .multiply(&AffineTransform::scaling(sx, sy));

        let paint = Paint {
            shader: tiny_skia::Pattern::new(
                crop.pixmap.as_ref(),
                SpreadMode::Pad,
                filter_quality(scaling),
                opacity as f32,
                pattern_ts.to_tiny_skia(),
            ),
            anti_alias: self.anti_alias,
            ..Paint::default()
        };
        let mask = self.clip.clone();
        self.target.pixmap.fill_rect(sk_rect, &paint, transform.to_tiny_skia(), mask.as_ref());
    }

    fn clip_to(&mut self, path: &Path, rule: WindingRule) {
        let (w, h) = (self.target.width(), self.target.height());
        let Some(sk_path) = path.to_tiny_skia() else {
            // nothing survives an empty clip
            self.clip = Mask::new(w, h);
            return;
        };
        let ts = tiny_skia::Transform::identity();
        match &mut self.clip {
            Some(mask) => mask.intersect_path(&sk_path, rule.to_tiny_skia(), self.anti_alias, ts),
            None => {
                let mut mask = Mask::new(w, h);
                if let Some(mask) = mask.as_mut() {
                    mask.fill_path(&sk_path, rule.to_tiny_skia(), self.anti_alias, ts);
                }
                self.clip = mask;
            }
        }
    }

    fn reset_clip(&mut self) {
        self.clip = None;
    }
}

fn filter_quality(scaling: ScalingMode) -> FilterQuality {
    match scaling {
        ScalingMode::NearestNeighbor => FilterQuality::Nearest,
        ScalingMode::Bilinear => FilterQuality::Bilinear,
        ScalingMode::Bicubic => FilterQuality::Bicubic,
    }
}

fn gradient_shader(gradient: &Gradient, transform: tiny_skia::Transform) -> Option<Shader<'static>> {
    let stops: Vec<GradientStop> = gradient
        .stops()
        .iter()
        .map(|s| GradientStop::new(s.offset as f32, s.color.to_tiny_skia()))
        .collect();
    if stops.is_empty() {
        // no stops paints nothing
        return None;
    }
    let point = |p: crate::geometry::Point| tiny_skia::Point::from_xy(p.x as f32, p.y as f32);
    match gradient.kind {
        GradientKind::Linear { start, end } => {
            LinearGradient::new(point(start), point(end), stops, SpreadMode::Pad, transform)
        }
        // tiny-skia only models a focal start point, so the start radius is dropped
        GradientKind::Radial { start, end, end_radius, .. } => RadialGradient::new(
            point(start),
            point(end),
            end_radius as f32,
            stops,
            SpreadMode::Pad,
            transform,
        ),
    }
}

/// Region a pattern may cover in pattern space; `None` when it tiles the plane
fn pattern_tile(pattern: &Pattern) -> Option<Rect> {
    let (w, h) = (pattern.bitmap.width() as f64, pattern.bitmap.height() as f64);
    match pattern.repetition {
        PatternRepetition::Repeat => None,
        PatternRepetition::RepeatX => Some(Rect::new(-PATTERN_FAR, 0.0, 2.0 * PATTERN_FAR, h)),
        PatternRepetition::RepeatY => Some(Rect::new(0.0, -PATTERN_FAR, w, 2.0 * PATTERN_FAR)),
        PatternRepetition::NoRepeat => Some(Rect::new(0.0, 0.0, w, h)),
    }
}
