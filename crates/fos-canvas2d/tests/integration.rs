//! Integration tests for fos-canvas2d
//!
//! End-to-end drawing scenarios through the public context API, plus
//! engine-level checks against a recording painter.

use std::rc::Rc;
use std::sync::Arc;

use fos_canvas2d::{
    AffineTransform, Bitmap, CanvasElement, CanvasError, CanvasImageSource, CanvasRenderingContext2D, Color,
    ContextSettings, DrawingState, FontDescriptor, FontHandle, FontProvider, ImageBitmap, ImageElement,
    ImageSmoothingQuality, IntRect, LineCap, LineJoin, Painter, Path, Point, Rect, ResolvedPaint, ScalingMode,
    StrokeStyle, TextAlign, TextBaseline, WindingRule, engine,
};
use proptest::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// TEST DOUBLES
// ============================================================================

/// Fixed-advance font: every char is `size * 0.6` wide, baseline at 80%
#[derive(Debug)]
struct FixedFont {
    size: f64,
}

impl FontHandle for FixedFont {
    fn width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.size * 0.6
    }

    fn pixel_size(&self) -> f64 {
        self.size
    }

    fn baseline(&self) -> f64 {
        self.size * 0.8
    }
}

#[derive(Debug, Default)]
struct FixedFonts;

impl FontProvider for FixedFonts {
    fn resolve(&self, descriptor: &FontDescriptor) -> fos_canvas2d::Result<Rc<dyn FontHandle>> {
        Ok(Rc::new(FixedFont { size: descriptor.size }))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Fill(Path, WindingRule),
    Stroke(Path),
    Clear(Rect),
    Blit(i32, i32),
    DrawBitmap(Rect, Rect),
    ClipTo(WindingRule),
    ResetClip,
}

#[derive(Debug, Default)]
struct RecordingPainter {
    calls: Vec<Call>,
}

impl Painter for RecordingPainter {
    fn fill_path(&mut self, path: &Path, _paint: &ResolvedPaint, rule: WindingRule) {
        self.calls.push(Call::Fill(path.clone(), rule));
    }

    fn stroke_path(&mut self, path: &Path, _paint: &ResolvedPaint, _style: &StrokeStyle) {
        self.calls.push(Call::Stroke(path.clone()));
    }

    fn clear_rect(&mut self, rect: Rect, _color: Color) {
        self.calls.push(Call::Clear(rect));
    }

    fn blit(&mut self, x: i32, y: i32, _bitmap: &Bitmap, _source: IntRect) {
        self.calls.push(Call::Blit(x, y));
    }

    fn draw_scaled_bitmap(
        &mut self,
        dest: Rect,
        _bitmap: &Bitmap,
        source: Rect,
        _transform: &AffineTransform,
        _opacity: f64,
        _scaling: ScalingMode,
    ) {
        self.calls.push(Call::DrawBitmap(dest, source));
    }

    fn clip_to(&mut self, _path: &Path, rule: WindingRule) {
        self.calls.push(Call::ClipTo(rule));
    }

    fn reset_clip(&mut self) {
        self.calls.push(Call::ResetClip);
    }
}

fn context(width: u32, height: u32) -> CanvasRenderingContext2D<CanvasElement> {
    init_tracing();
    let settings = ContextSettings::default().with_anti_alias(false);
    CanvasRenderingContext2D::with_settings(CanvasElement::new(width, height), settings, Box::new(FixedFonts))
}

fn pixel(ctx: &CanvasRenderingContext2D<CanvasElement>, x: u32, y: u32) -> Color {
    ctx.bitmap().and_then(|b| b.pixel(x, y)).unwrap_or_default()
}

fn open_polyline(points: &[(f64, f64)]) -> Path {
    let mut path = Path::new();
    for &(x, y) in points {
        path.line_to(Point::new(x, y));
    }
    path
}

// ============================================================================
// FILL / GETIMAGEDATA
// ============================================================================

#[test]
fn test_fill_rect_then_read_back() {
    let mut ctx = context(20, 20);
    ctx.set_fill_color("rgb(10, 200, 30)");
    ctx.fill_rect(4.0, 6.0, 8.0, 5.0);

    let data = ctx.get_image_data(0, 0, 20, 20).unwrap();
    for y in 0..20 {
        for x in 0..20 {
            let inside = (4..12).contains(&x) && (6..11).contains(&y);
            let expected = if inside { Color::rgb(10, 200, 30) } else { Color::TRANSPARENT };
            assert_eq!(data.get_pixel(x, y), Some(expected), "pixel ({x}, {y})");
        }
    }
}

#[test]
fn test_translate_then_fill_rect() {
    let mut ctx = context(20, 20);
    ctx.translate(10.0, 10.0);
    ctx.fill_rect(0.0, 0.0, 5.0, 5.0);

    assert_eq!(pixel(&ctx, 10, 10), Color::BLACK);
    assert_eq!(pixel(&ctx, 14, 14), Color::BLACK);
    assert_eq!(pixel(&ctx, 9, 9), Color::TRANSPARENT);
    assert_eq!(pixel(&ctx, 15, 15), Color::TRANSPARENT);
}

#[test]
fn test_scaled_fill_reverted_by_restore() {
    let mut ctx = context(8, 8);
    ctx.save();
    ctx.set_transform(AffineTransform::scaling(2.0, 2.0));
    ctx.set_fill_color("red");
    ctx.fill_rect(0.0, 0.0, 1.0, 1.0);
    ctx.restore();
    ctx.set_fill_color("blue");
    ctx.fill_rect(0.0, 0.0, 1.0, 1.0);

    assert_eq!(pixel(&ctx, 0, 0), Color::rgb(0, 0, 255));
    assert_eq!(pixel(&ctx, 1, 0), Color::rgb(255, 0, 0));
    assert_eq!(pixel(&ctx, 1, 1), Color::rgb(255, 0, 0));
    assert_eq!(pixel(&ctx, 2, 2), Color::TRANSPARENT);
    assert!(ctx.get_transform().is_identity());
}

#[test]
fn test_get_image_data_errors() {
    let mut ctx = context(10, 10);
    assert_eq!(ctx.get_image_data(0, 0, 0, 3).unwrap_err(), CanvasError::IndexSize);
    assert_eq!(ctx.get_image_data(0, 0, 3, 0).unwrap_err(), CanvasError::IndexSize);

    let foreign = ImageElement {
        bitmap: Some(Arc::new(Bitmap::filled(1, 1, Color::WHITE).unwrap())),
        cross_origin: true,
    };
    ctx.draw_image(&foreign.into(), 0.0, 0.0).unwrap();
    assert_eq!(ctx.get_image_data(0, 0, 1, 1).unwrap_err(), CanvasError::Security);
    assert_eq!(ctx.get_image_data(50, 50, -3, 7).unwrap_err(), CanvasError::Security);

    // never becomes clean again
    ctx.reset();
    assert!(!ctx.origin_clean());
}

#[test]
fn test_created_image_data_is_transparent() {
    let ctx = context(4, 4);
    let a = ctx.create_image_data(5, -3).unwrap();
    let b = ctx.create_image_data_from(&a).unwrap();
    for data in [&a, &b] {
        assert_eq!((data.width(), data.height()), (5, 3));
        assert!(data.data().iter().all(|&v| v == 0));
    }
    assert_eq!(ctx.create_image_data(0, 3).unwrap_err(), CanvasError::IndexSize);
}

// ============================================================================
// STATE STACK
// ============================================================================

#[test]
fn test_save_mutate_restore_is_identity() {
    let mut ctx = context(4, 4);
    ctx.set_font("12px serif");
    let before = ctx.state().clone();

    ctx.save();
    ctx.rotate(0.3);
    ctx.scale(2.0, 3.0);
    ctx.set_fill_color("#abc");
    ctx.set_stroke_color("rgba(1, 2, 3, 0.5)");
    ctx.set_line_width(7.0);
    ctx.set_line_cap(LineCap::Round);
    ctx.set_line_join(LineJoin::Bevel);
    ctx.set_miter_limit(3.0);
    ctx.set_line_dash(&[1.0, 2.0]);
    ctx.set_line_dash_offset(4.0);
    ctx.set_global_alpha(0.25);
    ctx.set_image_smoothing_enabled(false);
    ctx.set_image_smoothing_quality(ImageSmoothingQuality::High);
    ctx.set_text_align(TextAlign::Right);
    ctx.set_text_baseline(TextBaseline::Middle);
    ctx.set_font("bold 30px monospace");
    ctx.rect(0.0, 0.0, 2.0, 2.0);
    ctx.clip("evenodd");
    ctx.restore();

    assert_eq!(ctx.state(), &before);
}

#[test]
fn test_restore_without_save_is_noop() {
    let mut ctx = context(4, 4);
    ctx.set_line_width(3.0);
    ctx.translate(1.0, 2.0);
    let before = ctx.state().clone();
    ctx.restore();
    ctx.restore();
    assert_eq!(ctx.state(), &before);
}

// ============================================================================
// PATHS
// ============================================================================

proptest! {
    #[test]
    fn prop_transformed_bounding_box(
        x in -500.0f64..500.0,
        y in -500.0f64..500.0,
        w in -300.0f64..300.0,
        h in -300.0f64..300.0,
        m in prop::array::uniform6(-5.0f64..5.0),
    ) {
        let t = AffineTransform::new(m[0], m[1], m[2], m[3], m[4] * 100.0, m[5] * 100.0);
        let mut path = Path::new();
        path.rect(Rect::new(x, y, w, h), &AffineTransform::identity());

        let actual = path.copy_transformed(&t).bounding_box();
        let expected = t.map_rect(&path.bounding_box());
        let tolerance = 1e-9 * (1.0 + expected.width.abs() + expected.height.abs() + expected.x.abs() + expected.y.abs());
        prop_assert!((actual.x - expected.x).abs() <= tolerance);
        prop_assert!((actual.y - expected.y).abs() <= tolerance);
        prop_assert!((actual.width - expected.width).abs() <= tolerance);
        prop_assert!((actual.height - expected.height).abs() <= tolerance);
    }
}

#[test]
fn test_fill_does_not_close_live_path() {
    let mut painter = RecordingPainter::default();
    let state = DrawingState::default();
    let path = open_polyline(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);

    engine::fill(&mut painter, &state, &path, WindingRule::NonZero);
    engine::stroke(&mut painter, &state, &path);

    let filled = painter.calls.iter().find_map(|c| match c {
        Call::Fill(p, _) => Some(p.clone()),
        _ => None,
    });
    let stroked = painter.calls.iter().find_map(|c| match c {
        Call::Stroke(p) => Some(p.clone()),
        _ => None,
    });
    assert!(filled.unwrap().subpaths().all(|s| s.is_closed()));
    let stroked = stroked.unwrap();
    assert_eq!(stroked, path);
    assert!(!stroked.subpaths().any(|s| s.is_closed()));
}

#[test]
fn test_unknown_fill_rule_falls_back() {
    init_tracing();
    assert_eq!(WindingRule::from_token("evenodd"), WindingRule::EvenOdd);
    assert_eq!(WindingRule::from_token("even-odd"), WindingRule::NonZero);
}

#[test]
fn test_clip_wraps_every_draw() {
    let mut painter = RecordingPainter::default();
    let mut state = DrawingState::default();
    let mut clip = Path::new();
    clip.rect(Rect::new(0.0, 0.0, 5.0, 5.0), &AffineTransform::identity());
    engine::clip(&mut state, &clip, WindingRule::EvenOdd);

    let mut square = Path::new();
    square.rect(Rect::new(1.0, 1.0, 2.0, 2.0), &AffineTransform::identity());
    let damage = engine::fill(&mut painter, &state, &square, WindingRule::NonZero);

    assert_eq!(damage, Some(Rect::new(1.0, 1.0, 2.0, 2.0)));
    assert_eq!(
        painter.calls,
        vec![
            Call::ResetClip,
            Call::ClipTo(WindingRule::EvenOdd),
            Call::Fill(square.clone(), WindingRule::NonZero),
            Call::ResetClip,
        ]
    );
}

#[test]
fn test_clip_is_intersection_not_replacement() {
    let mut ctx = context(20, 20);
    ctx.rect(0.0, 0.0, 10.0, 10.0);
    ctx.clip("nonzero");
    ctx.begin_path();
    ctx.rect(5.0, 5.0, 10.0, 10.0);
    ctx.clip("nonzero");
    ctx.fill_rect(0.0, 0.0, 20.0, 20.0);

    assert_eq!(pixel(&ctx, 7, 7), Color::BLACK);
    // inside the second clip only: a replacing clip would paint here
    assert_eq!(pixel(&ctx, 12, 12), Color::TRANSPARENT);
    // inside the first clip only
    assert_eq!(pixel(&ctx, 2, 2), Color::TRANSPARENT);
}

#[test]
fn test_clear_rect_maps_through_transform() {
    let mut painter = RecordingPainter::default();
    let mut state = DrawingState::default();
    state.transform = AffineTransform::translation(3.0, 4.0);
    engine::clear_rect(&mut painter, &state, Rect::new(0.0, 0.0, 2.0, 2.0));
    assert!(painter.calls.contains(&Call::Clear(Rect::new(3.0, 4.0, 2.0, 2.0))));
}

#[test]
fn test_stroke_keeps_open_ends() {
    let mut ctx = context(20, 20);
    ctx.set_line_width(2.0);
    ctx.move_to(2.0, 10.0);
    ctx.line_to(18.0, 10.0);
    ctx.line_to(18.0, 18.0);
    ctx.stroke();
    // butt caps, no closing edge back to (2, 10)
    assert_eq!(pixel(&ctx, 10, 10), Color::BLACK);
    assert_eq!(pixel(&ctx, 10, 14), Color::TRANSPARENT);
    assert_eq!(pixel(&ctx, 0, 10), Color::TRANSPARENT);
}

// ============================================================================
// IMAGES
// ============================================================================

fn red_source(size: u32) -> CanvasImageSource {
    ImageElement::decoded(Bitmap::filled(size, size, Color::rgb(255, 0, 0)).unwrap()).into()
}

#[test]
fn test_draw_image_downscale() {
    let mut ctx = context(8, 8);
    ctx.set_image_smoothing_enabled(false);
    ctx.draw_image_subrect(&red_source(4), 0.0, 0.0, 4.0, 4.0, 0.0, 0.0, 2.0, 2.0).unwrap();

    for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        assert_eq!(pixel(&ctx, x, y), Color::rgb(255, 0, 0));
    }
    assert_eq!(pixel(&ctx, 2, 2), Color::TRANSPARENT);
    assert_eq!(ctx.canvas_element().damage(), &[Rect::new(0.0, 0.0, 2.0, 2.0)]);
}

#[test]
fn test_draw_image_source_clipped_proportionally() {
    let mut ctx = context(8, 8);
    ctx.set_image_smoothing_enabled(false);
    // only the top-left 2x2 of the 4x4 request exists in the source
    ctx.draw_image_subrect(&red_source(4), 2.0, 2.0, 4.0, 4.0, 0.0, 0.0, 4.0, 4.0).unwrap();

    assert_eq!(pixel(&ctx, 1, 1), Color::rgb(255, 0, 0));
    assert_eq!(pixel(&ctx, 3, 3), Color::TRANSPARENT);
    assert_eq!(ctx.canvas_element().damage(), &[Rect::new(0.0, 0.0, 2.0, 2.0)]);
}

#[test]
fn test_draw_image_maps_destination() {
    let mut painter = RecordingPainter::default();
    let mut state = DrawingState::default();
    state.transform = AffineTransform::scaling(3.0, 3.0);
    let bitmap = Bitmap::filled(2, 2, Color::WHITE).unwrap();

    let damage = engine::draw_image(
        &mut painter,
        &state,
        &bitmap,
        Rect::new(0.0, 0.0, 2.0, 2.0),
        Rect::new(1.0, 1.0, 2.0, 2.0),
    );
    assert_eq!(damage, Some(Rect::new(3.0, 3.0, 6.0, 6.0)));
    assert!(painter.calls.contains(&Call::DrawBitmap(Rect::new(1.0, 1.0, 2.0, 2.0), Rect::new(0.0, 0.0, 2.0, 2.0))));
}

#[test]
fn test_detached_bitmap_is_state_error() {
    let mut ctx = context(4, 4);
    let mut bitmap = ImageBitmap::new(Bitmap::filled(1, 1, Color::WHITE).unwrap());
    bitmap.close();
    let err = ctx.draw_image(&bitmap.into(), 0.0, 0.0).unwrap_err();
    assert!(matches!(err, CanvasError::InvalidState(_)));
}

#[test]
fn test_tainted_canvas_propagates() {
    let mut foreign = context(2, 2);
    let image = ImageElement {
        bitmap: Some(Arc::new(Bitmap::filled(1, 1, Color::WHITE).unwrap())),
        cross_origin: true,
    };
    foreign.draw_image(&image.into(), 0.0, 0.0).unwrap();

    let mut ctx = context(4, 4);
    ctx.draw_image(&foreign.to_image_source(), 0.0, 0.0).unwrap();
    assert!(!ctx.origin_clean());
}

#[test]
fn test_put_image_data_round_trip() {
    let mut ctx = context(6, 6);
    let mut data = ctx.create_image_data(2, 2).unwrap();
    data.set_pixel(1, 0, Color::rgb(9, 8, 7));
    ctx.put_image_data(&data, 3, 3);

    let back = ctx.get_image_data(3, 3, 2, 2).unwrap();
    assert_eq!(back, data);
}

// ============================================================================
// TEXT
// ============================================================================

#[test]
fn test_measure_text() {
    let mut ctx = context(10, 10);
    let metrics = ctx.measure_text("Hi");
    assert!((metrics.width - 12.0).abs() < 1e-9);
    assert!((metrics.font_bounding_box_ascent - 8.0).abs() < 1e-9);
    assert!((metrics.font_bounding_box_descent - 2.0).abs() < 1e-9);
}

#[test]
fn test_measure_text_alignment() {
    let mut ctx = context(10, 10);
    ctx.set_font("20px sans-serif");
    ctx.set_text_align(TextAlign::Center);
    let metrics = ctx.measure_text("abcd");
    assert!((metrics.width - 48.0).abs() < 1e-9);
    assert!((metrics.actual_bounding_box_left - 24.0).abs() < 1e-9);
    assert!((metrics.actual_bounding_box_right - 24.0).abs() < 1e-9);
}

#[test]
fn test_text_without_outlines_paints_nothing() {
    let mut ctx = context(100, 40);
    ctx.set_text_baseline(TextBaseline::Top);
    ctx.fill_text("abcdef", 0.0, 0.0, Some(18.0));
    assert!(ctx.canvas_element().damage().is_empty());
    assert!(ctx.state().resolved_font.is_some());
}
