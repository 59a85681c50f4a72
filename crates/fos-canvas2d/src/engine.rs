//! Fill/Stroke/Clip Engine
//!
//! Decides what a drawing command hands to the painter. Every function
//! takes device-space geometry plus the drawing state, runs the painter
//! with the state's clip applied, and returns the damaged rect (device
//! space) or `None` when nothing was drawn.

use crate::font::{FontHandle, FontKind};
use crate::geometry::{Point, Rect};
use crate::paint::{Color, PaintStyle, ResolvedPaint};
use crate::painter::{ClippedPainter, Painter, ScalingMode, StrokeStyle, WindingRule};
use crate::path::Path;
use crate::raster::Bitmap;
use crate::state::{Clip, DrawingState, LineJoin};
use crate::text::PreparedText;
use crate::transform::AffineTransform;

/// Whether text glyphs are filled or stroked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    Fill,
    Stroke,
}

fn clipped_out(state: &DrawingState) -> bool {
    state.clip.as_ref().is_some_and(Clip::is_degenerate)
}

fn scaling(state: &DrawingState) -> ScalingMode {
    ScalingMode::for_smoothing(state.image_smoothing_enabled, state.image_smoothing_quality)
}

/// Fill `path` with its open sub-paths implicitly closed. The caller's
/// path is left as is.
pub fn fill(painter: &mut dyn Painter, state: &DrawingState, path: &Path, rule: WindingRule) -> Option<Rect> {
    if path.is_empty() {
        tracing::debug!("fill of empty path skipped");
        return None;
    }
    if clipped_out(state) {
        return None;
    }

    let to_fill = path.close_all_subpaths();
    let bounds = to_fill.bounding_box();
    if bounds.is_empty() {
        // lines and points enclose no area
        return None;
    }
    let paint = ResolvedPaint::resolve(&state.fill_style, state.global_alpha, state.transform)
        .with_scaling(scaling(state));
    let mut painter = ClippedPainter::new(painter, state.clip.as_ref());
    painter.fill_path(&to_fill, &paint, rule);
    Some(bounds)
}

/// Stroke `path` as given; open sub-paths keep their free ends
pub fn stroke(painter: &mut dyn Painter, state: &DrawingState, path: &Path) -> Option<Rect> {
    if path.is_empty() {
        tracing::debug!("stroke of empty path skipped");
        return None;
    }
    if clipped_out(state) {
        return None;
    }
    if state.transform.inverse().is_none() {
        tracing::debug!("stroke under a singular transform skipped");
        return None;
    }

    let style = StrokeStyle::from_state(state);
    let paint = ResolvedPaint::resolve(&state.stroke_style, state.global_alpha, state.transform)
        .with_scaling(scaling(state));
    let mut painter = ClippedPainter::new(painter, state.clip.as_ref());
    painter.stroke_path(path, &paint, &style);
    Some(stroke_bounds(path, state))
}

/// Device-space box covering the stroke outline
fn stroke_bounds(path: &Path, state: &DrawingState) -> Rect {
    let t = &state.transform;
    let scale = (t.a.abs() + t.c.abs()).max(t.b.abs() + t.d.abs());
    let mut reach = state.line_width / 2.0;
    if state.line_join == LineJoin::Miter {
        reach *= state.miter_limit.max(1.0);
    }
    path.bounding_box().inflated(reach * scale)
}

/// Narrow the state's clip to `path` (device space)
pub fn clip(state: &mut DrawingState, path: &Path, rule: WindingRule) {
    let path = path.close_all_subpaths();
    state.clip.get_or_insert_with(Clip::default).intersect(path, rule);
}

/// Paint `rect` (user space) transparent black, honoring transform and clip
pub fn clear_rect(painter: &mut dyn Painter, state: &DrawingState, rect: Rect) -> Option<Rect> {
    if rect.is_empty() || clipped_out(state) {
        return None;
    }

    let device = state.transform.map_rect(&rect);
    let mut painter = ClippedPainter::new(painter, state.clip.as_ref());
    if !state.transform.is_axis_aligned() {
        let mut outline = Path::new();
        outline.rect(rect, &state.transform);
        painter.clip_to(&outline, WindingRule::NonZero);
    }
    painter.clear_rect(device, Color::TRANSPARENT);
    Some(device)
}

/// Draw `source` (bitmap pixels) of `bitmap` into `dest` (user space)
pub fn draw_image(
    painter: &mut dyn Painter,
    state: &DrawingState,
    bitmap: &Bitmap,
    source: Rect,
    dest: Rect,
) -> Option<Rect> {
    if source.is_empty() || dest.is_empty() || clipped_out(state) {
        return None;
    }

    let mut painter = ClippedPainter::new(painter, state.clip.as_ref());
    painter.draw_scaled_bitmap(dest, bitmap, source, &state.transform, state.global_alpha, scaling(state));
    Some(state.transform.map_rect(&dest))
}

/// Render prepared text with its anchor at `anchor` (user space).
///
/// Outline fonts become a path that is filled or stroked; bitmap fonts have
/// their glyph cells drawn directly. Both place glyph `i` at
/// `anchor + (glyph.x, bounds.y)`.
pub fn draw_text(
    painter: &mut dyn Painter,
    state: &DrawingState,
    font: &dyn FontHandle,
    prepared: &PreparedText,
    anchor: Point,
    mode: TextMode,
) -> Option<Rect> {
    if prepared.is_empty() || clipped_out(state) {
        return None;
    }

    let damage = state.transform.map_rect(&prepared.bounds.translated(anchor.x, anchor.y));
    match font.kind() {
        FontKind::Outline => {
            let placement = state
                .transform
                .multiply(&AffineTransform::translation(
                    anchor.x + prepared.bounds.x,
                    anchor.y + prepared.baseline_y,
                ))
                .multiply(&AffineTransform::scaling(prepared.horizontal_scale, 1.0));
            let mut path = Path::new();
            path.append_text(prepared.glyphs.iter().map(|g| g.cluster.as_str()), font, &placement);
            match mode {
                TextMode::Fill => fill(painter, state, &path, WindingRule::NonZero)?,
                TextMode::Stroke => stroke(painter, state, &path)?,
            };
        }
        FontKind::Bitmap => {
            let style = match mode {
                TextMode::Fill => &state.fill_style,
                TextMode::Stroke => &state.stroke_style,
            };
            let (color, opacity) = cell_color(style, state.global_alpha);
            let scaling = scaling(state);
            let mut painter = ClippedPainter::new(painter, state.clip.as_ref());
            let mut drawn = false;
            for glyph in &prepared.glyphs {
                let Some(cell) = font.glyph_cell(&glyph.cluster) else {
                    continue;
                };
                let Some(bitmap) = tint_cell(&cell.coverage, cell.width, cell.height, color) else {
                    continue;
                };
                let (w, h) = (cell.width as f64, cell.height as f64);
                let dest = Rect::new(
                    anchor.x + glyph.x,
                    anchor.y + prepared.bounds.y,
                    w * prepared.horizontal_scale,
                    h,
                );
                painter.draw_scaled_bitmap(dest, &bitmap, Rect::new(0.0, 0.0, w, h), &state.transform, opacity, scaling);
                drawn = true;
            }
            if !drawn {
                return None;
            }
        }
    }
    Some(damage)
}

/// Solid color for bitmap glyph cells. Cells cannot carry a shader, so
/// gradients and patterns draw in black at the global alpha.
fn cell_color(style: &PaintStyle, global_alpha: f64) -> (Color, f64) {
    match style {
        PaintStyle::Color(color) => (color.with_opacity(global_alpha), 1.0),
        PaintStyle::Gradient(_) | PaintStyle::Pattern(_) => (Color::BLACK, global_alpha),
    }
}

fn tint_cell(coverage: &[u8], width: u32, height: u32, color: Color) -> Option<Bitmap> {
    let rgba: Vec<u8> = coverage
        .iter()
        .flat_map(|&c| {
            let a = (color.a as u32 * c as u32 + 127) / 255;
            [color.r, color.g, color.b, a as u8]
        })
        .collect();
    Bitmap::from_rgba8(width, height, &rgba)
}
