//! Canvas 2D Rendering Context
//!
//! CanvasRenderingContext2D: the drawing-state stack, the current path and
//! the lazily allocated backing surface, wired to a [`CanvasHost`].
//!
//! Caller coordinates are mapped through the current transform when a
//! command is issued. Bad geometry (NaN, infinities) and unusable sources
//! are silently ignored; only the pixel-buffer and image-source lifecycle
//! errors reach the caller.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::element::CanvasHost;
use crate::engine::{self, TextMode};
use crate::font::{FontCache, FontDescriptor, FontHandle, FontProvider, SystemFontProvider};
use crate::geometry::{IntRect, Point, Rect};
use crate::image::{CanvasImageSource, CanvasSnapshot, Usability, compute_draw_rects};
use crate::image_data::ImageData;
use crate::paint::{Color, Gradient, PaintStyle, Pattern, PatternRepetition};
use crate::painter::{Painter, WindingRule};
use crate::path::Path;
use crate::raster::{Bitmap, SkiaPainter};
use crate::settings::ContextSettings;
use crate::state::{
    DrawingState, ImageSmoothingQuality, LineCap, LineJoin, ResolvedFont, StateStack, TextAlign, TextBaseline,
};
use crate::text::{GraphemeSegmenter, IcuGraphemeSegmenter, TextMetrics, max_width_allows_drawing, prepare_text};
use crate::transform::AffineTransform;
use crate::{CanvasError, Result};

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// Canvas 2D rendering context
pub struct CanvasRenderingContext2D<H: CanvasHost> {
    host: H,
    /// Backing bitmap and its painter, created on first draw
    surface: Option<SkiaPainter>,
    states: StateStack,
    path: Path,
    /// Cleared for good once a cross-origin source is drawn
    origin_clean: bool,
    fonts: FontCache,
    segmenter: Box<dyn GraphemeSegmenter>,
    settings: ContextSettings,
}

impl<H: CanvasHost> CanvasRenderingContext2D<H> {
    /// Context with default settings and system fonts
    pub fn new(host: H) -> Self {
        Self::with_settings(host, ContextSettings::default(), Box::new(SystemFontProvider::new()))
    }

    pub fn with_settings(host: H, settings: ContextSettings, fonts: Box<dyn FontProvider>) -> Self {
        Self {
            host,
            surface: None,
            states: StateStack::new(Self::initial_state(&settings)),
            path: Path::new(),
            origin_clean: true,
            fonts: FontCache::new(fonts, settings.font_cache_capacity),
            segmenter: Box::new(IcuGraphemeSegmenter),
            settings,
        }
    }

    /// Replace the grapheme segmenter used for text
    pub fn with_segmenter(mut self, segmenter: Box<dyn GraphemeSegmenter>) -> Self {
        self.segmenter = segmenter;
        self
    }

    fn initial_state(settings: &ContextSettings) -> DrawingState {
        DrawingState {
            image_smoothing_enabled: settings.image_smoothing_enabled,
            ..DrawingState::default()
        }
    }

    /// Get the owning element
    pub fn canvas_element(&self) -> &H {
        &self.host
    }

    pub fn canvas_element_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn settings(&self) -> &ContextSettings {
        &self.settings
    }

    /// Backing painter, allocated on first use. `None` when the host size
    /// is zero or over the configured limit.
    pub fn painter(&mut self) -> Option<&mut SkiaPainter> {
        if self.surface.is_none() {
            let (width, height) = (self.host.width(), self.host.height());
            if !self.settings.allows_surface(width, height) {
                tracing::debug!(width, height, "canvas surface not allocated");
                return None;
            }
            self.surface = SkiaPainter::new(width, height, self.settings.anti_alias);
            tracing::debug!(width, height, "created canvas surface");
        }
        self.surface.as_mut()
    }

    /// Backing bitmap, if anything was drawn yet
    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.surface.as_ref().map(SkiaPainter::bitmap)
    }

    /// False once cross-origin content was drawn
    pub fn origin_clean(&self) -> bool {
        self.origin_clean
    }

    fn taint(&mut self) {
        if self.origin_clean {
            tracing::debug!("canvas is no longer origin-clean");
        }
        self.origin_clean = false;
    }

    /// Painter, current state and current path, borrowed together
    fn parts(&mut self) -> Option<(&mut dyn Painter, &DrawingState, &Path)> {
        self.painter()?;
        let surface: &mut dyn Painter = self.surface.as_mut()?;
        Some((surface, self.states.current(), &self.path))
    }

    fn did_draw(&mut self, damage: Option<Rect>) {
        if let Some(rect) = damage {
            self.host.did_draw(rect);
        }
    }

    /// Map a user-space point to device space; `None` for NaN or infinite input
    fn transform_point(&self, x: f64, y: f64) -> Option<Point> {
        let p = Point::new(x, y);
        p.is_finite().then(|| self.states.current().transform.map_point(p))
    }

    // State management

    /// Save current state
    pub fn save(&mut self) {
        self.states.save();
    }

    /// Restore previous state
    pub fn restore(&mut self) {
        self.states.restore();
    }

    /// Drop saved states and the current path; the current state goes back
    /// to its initial values
    pub fn reset(&mut self) {
        self.states.reset(Self::initial_state(&self.settings));
        self.path = Path::new();
    }

    /// Get current state
    pub fn state(&self) -> &DrawingState {
        self.states.current()
    }

    // Transforms

    pub fn scale(&mut self, sx: f64, sy: f64) {
        if all_finite(&[sx, sy]) {
            self.states.current_mut().transform.scale(sx, sy);
        }
    }

    pub fn rotate(&mut self, angle: f64) {
        if angle.is_finite() {
            self.states.current_mut().transform.rotate(angle);
        }
    }

    pub fn translate(&mut self, tx: f64, ty: f64) {
        if all_finite(&[tx, ty]) {
            self.states.current_mut().transform.translate(tx, ty);
        }
    }

    /// Post-multiply an arbitrary matrix
    pub fn transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        if all_finite(&[a, b, c, d, e, f]) {
            self.states.current_mut().transform.append(&AffineTransform::new(a, b, c, d, e, f));
        }
    }

    /// Replace the current transform
    pub fn set_transform(&mut self, transform: AffineTransform) {
        if transform.is_finite() {
            self.states.current_mut().transform = transform;
        }
    }

    pub fn get_transform(&self) -> AffineTransform {
        self.states.current().transform
    }

    pub fn reset_transform(&mut self) {
        self.states.current_mut().transform = AffineTransform::identity();
    }

    // Styles

    pub fn set_fill_style(&mut self, style: impl Into<PaintStyle>) {
        self.states.current_mut().fill_style = style.into();
    }

    pub fn set_stroke_style(&mut self, style: impl Into<PaintStyle>) {
        self.states.current_mut().stroke_style = style.into();
    }

    /// Set the fill to a CSS color; unparsable strings are ignored
    pub fn set_fill_color(&mut self, css: &str) {
        match Color::parse(css) {
            Some(color) => self.set_fill_style(color),
            None => tracing::warn!("Ignoring invalid fill color {:?}", css),
        }
    }

    /// Set the stroke to a CSS color; unparsable strings are ignored
    pub fn set_stroke_color(&mut self, css: &str) {
        match Color::parse(css) {
            Some(color) => self.set_stroke_style(color),
            None => tracing::warn!("Ignoring invalid stroke color {:?}", css),
        }
    }

    pub fn fill_style(&self) -> &PaintStyle {
        &self.states.current().fill_style
    }

    pub fn stroke_style(&self) -> &PaintStyle {
        &self.states.current().stroke_style
    }

    pub fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.states.current_mut().line_width = width;
        }
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.states.current_mut().line_cap = cap;
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.states.current_mut().line_join = join;
    }

    pub fn set_miter_limit(&mut self, limit: f64) {
        if limit.is_finite() && limit > 0.0 {
            self.states.current_mut().miter_limit = limit;
        }
    }

    /// Set the dash pattern. Negative or non-finite entries reject the
    /// whole list; an odd-length list is repeated to make it even.
    pub fn set_line_dash(&mut self, segments: &[f64]) {
        if segments.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return;
        }
        let mut dash = segments.to_vec();
        if dash.len() % 2 == 1 {
            dash.extend_from_slice(segments);
        }
        self.states.current_mut().line_dash = dash;
    }

    pub fn line_dash(&self) -> &[f64] {
        &self.states.current().line_dash
    }

    pub fn set_line_dash_offset(&mut self, offset: f64) {
        if offset.is_finite() {
            self.states.current_mut().line_dash_offset = offset;
        }
    }

    /// Ignored outside 0..=1
    pub fn set_global_alpha(&mut self, alpha: f64) {
        if (0.0..=1.0).contains(&alpha) {
            self.states.current_mut().global_alpha = alpha;
        }
    }

    pub fn set_image_smoothing_enabled(&mut self, enabled: bool) {
        self.states.current_mut().image_smoothing_enabled = enabled;
    }

    pub fn set_image_smoothing_quality(&mut self, quality: ImageSmoothingQuality) {
        self.states.current_mut().image_smoothing_quality = quality;
    }

    pub fn set_text_align(&mut self, align: TextAlign) {
        self.states.current_mut().text_align = align;
    }

    pub fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.states.current_mut().text_baseline = baseline;
    }

    /// Set the CSS font shorthand. Unparsable values are ignored; the font
    /// itself is resolved on first use.
    pub fn set_font(&mut self, shorthand: &str) {
        if FontDescriptor::parse(shorthand).is_none() {
            tracing::warn!("Ignoring invalid font {:?}", shorthand);
            return;
        }
        let state = self.states.current_mut();
        state.font = Some(shorthand.to_string());
        state.resolved_font = None;
    }

    /// Current font shorthand, or the default if none was set
    pub fn font(&self) -> &str {
        self.states
            .current()
            .font
            .as_deref()
            .unwrap_or(&self.settings.default_font)
    }

    /// Resolve the current font, caching the handle in the current state.
    /// Falls back to the default font when the requested one is missing.
    fn current_font(&mut self) -> Option<Rc<dyn FontHandle>> {
        if let Some(ResolvedFont(font)) = &self.states.current().resolved_font {
            return Some(font.clone());
        }
        let font = match self.states.current().font.clone() {
            Some(shorthand) => self
                .fonts
                .resolve(&shorthand)
                .or_else(|| self.fonts.resolve(&self.settings.default_font)),
            None => self.fonts.resolve(&self.settings.default_font),
        }?;
        self.states.current_mut().resolved_font = Some(ResolvedFont(font.clone()));
        Some(font)
    }

    // Gradients and patterns

    pub fn create_linear_gradient(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> Gradient {
        Gradient::linear(x0, y0, x1, y1)
    }

    pub fn create_radial_gradient(&self, x0: f64, y0: f64, r0: f64, x1: f64, y1: f64, r1: f64) -> Result<Gradient> {
        Gradient::radial(x0, y0, r0, x1, y1, r1)
    }

    /// Pattern over an image source; `Ok(None)` when the source is not
    /// usable yet. A tainted source taints this canvas.
    pub fn create_pattern(
        &mut self,
        source: &CanvasImageSource,
        repetition: PatternRepetition,
    ) -> Result<Option<Pattern>> {
        if source.check_usability()? == Usability::Bad {
            return Ok(None);
        }
        let bitmap = match source.bitmap() {
            Some(bitmap) => bitmap.clone(),
            None => {
                let (width, height) = source.size();
                let blank = Bitmap::new(width, height)
                    .ok_or_else(|| CanvasError::InvalidState("pattern source too large".into()))?;
                Arc::new(blank)
            }
        };
        if source.is_cross_origin_tainted() {
            self.taint();
        }
        Ok(Some(Pattern { bitmap, repetition }))
    }

    // Path methods

    /// Begin a new path
    pub fn begin_path(&mut self) {
        self.path = Path::new();
    }

    /// Close the current path
    pub fn close_path(&mut self) {
        self.path.close_path();
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        if let Some(p) = self.transform_point(x, y) {
            self.path.move_to(p);
        }
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        if let Some(p) = self.transform_point(x, y) {
            self.path.line_to(p);
        }
    }

    pub fn quadratic_curve_to(&mut self, cpx: f64, cpy: f64, x: f64, y: f64) {
        if let (Some(control), Some(to)) = (self.transform_point(cpx, cpy), self.transform_point(x, y)) {
            self.path.quadratic_curve_to(control, to);
        }
    }

    pub fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) {
        let points = (
            self.transform_point(cp1x, cp1y),
            self.transform_point(cp2x, cp2y),
            self.transform_point(x, y),
        );
        if let (Some(control1), Some(control2), Some(to)) = points {
            self.path.bezier_curve_to(control1, control2, to);
        }
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if all_finite(&[x, y, width, height]) {
            let transform = self.get_transform();
            self.path.rect(Rect::new(x, y, width, height), &transform);
        }
    }

    /// Negative radius is an index-size error
    pub fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, counterclockwise: bool) -> Result<()> {
        self.ellipse(x, y, radius, radius, 0.0, start, end, counterclockwise)
    }

    /// Negative radii are an index-size error
    #[allow(clippy::too_many_arguments)]
    pub fn ellipse(
        &mut self,
        x: f64,
        y: f64,
        radius_x: f64,
        radius_y: f64,
        rotation: f64,
        start: f64,
        end: f64,
        counterclockwise: bool,
    ) -> Result<()> {
        if !all_finite(&[x, y, radius_x, radius_y, rotation, start, end]) {
            return Ok(());
        }
        if radius_x < 0.0 || radius_y < 0.0 {
            return Err(CanvasError::IndexSize);
        }
        let transform = self.get_transform();
        self.path.ellipse(
            Point::new(x, y),
            radius_x,
            radius_y,
            rotation,
            start,
            end,
            counterclockwise,
            &transform,
        );
        Ok(())
    }

    /// Current path in device space
    pub fn current_path(&self) -> &Path {
        &self.path
    }

    // Fill, stroke, clip

    /// Fill the current path; `rule` is `"nonzero"` or `"evenodd"`
    pub fn fill(&mut self, rule: &str) {
        let rule = WindingRule::from_token(rule);
        let Some((painter, state, path)) = self.parts() else {
            return;
        };
        let damage = engine::fill(painter, state, path, rule);
        self.did_draw(damage);
    }

    /// Fill a user-space path under the current transform
    pub fn fill_path(&mut self, path: &Path, rule: &str) {
        let rule = WindingRule::from_token(rule);
        let path = path.copy_transformed(&self.get_transform());
        let Some((painter, state, _)) = self.parts() else {
            return;
        };
        let damage = engine::fill(painter, state, &path, rule);
        self.did_draw(damage);
    }

    /// Stroke the current path
    pub fn stroke(&mut self) {
        let Some((painter, state, path)) = self.parts() else {
            return;
        };
        let damage = engine::stroke(painter, state, path);
        self.did_draw(damage);
    }

    /// Stroke a user-space path under the current transform
    pub fn stroke_path(&mut self, path: &Path) {
        let path = path.copy_transformed(&self.get_transform());
        let Some((painter, state, _)) = self.parts() else {
            return;
        };
        let damage = engine::stroke(painter, state, &path);
        self.did_draw(damage);
    }

    /// Intersect the clip with the current path
    pub fn clip(&mut self, rule: &str) {
        let rule = WindingRule::from_token(rule);
        engine::clip(self.states.current_mut(), &self.path, rule);
    }

    /// Intersect the clip with a user-space path
    pub fn clip_path(&mut self, path: &Path, rule: &str) {
        let rule = WindingRule::from_token(rule);
        let path = path.copy_transformed(&self.get_transform());
        engine::clip(self.states.current_mut(), &path, rule);
    }

    // Rectangles

    /// Fill a rectangle without touching the current path
    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if !all_finite(&[x, y, width, height]) || width == 0.0 || height == 0.0 {
            return;
        }
        let mut rect = Path::new();
        rect.rect(Rect::new(x, y, width, height), &self.get_transform());
        let Some((painter, state, _)) = self.parts() else {
            return;
        };
        let damage = engine::fill(painter, state, &rect, WindingRule::NonZero);
        self.did_draw(damage);
    }

    /// Stroke a rectangle without touching the current path
    pub fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if !all_finite(&[x, y, width, height]) || (width == 0.0 && height == 0.0) {
            return;
        }
        let mut rect = Path::new();
        rect.rect(Rect::new(x, y, width, height), &self.get_transform());
        let Some((painter, state, _)) = self.parts() else {
            return;
        };
        let damage = engine::stroke(painter, state, &rect);
        self.did_draw(damage);
    }

    /// Clear a rectangle to transparent black
    pub fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if !all_finite(&[x, y, width, height]) {
            return;
        }
        let rect = Rect::from_signed(x, y, width, height);
        let Some((painter, state, _)) = self.parts() else {
            return;
        };
        let damage = engine::clear_rect(painter, state, rect);
        self.did_draw(damage);
    }

    // Text

    pub fn fill_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>) {
        self.draw_text(text, x, y, max_width, TextMode::Fill);
    }

    pub fn stroke_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>) {
        self.draw_text(text, x, y, max_width, TextMode::Stroke);
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>, mode: TextMode) {
        if !all_finite(&[x, y]) || !max_width_allows_drawing(max_width) {
            return;
        }
        let Some(font) = self.current_font() else {
            tracing::warn!("No font available, text not drawn");
            return;
        };
        let state = self.states.current();
        let prepared = prepare_text(
            text,
            max_width,
            &*font,
            state.text_align,
            state.text_baseline,
            &*self.segmenter,
        );
        let Some((painter, state, _)) = self.parts() else {
            return;
        };
        let damage = engine::draw_text(painter, state, &*font, &prepared, Point::new(x, y), mode);
        self.did_draw(damage);
    }

    /// Measure text with the current font, alignment and baseline
    pub fn measure_text(&mut self, text: &str) -> TextMetrics {
        let Some(font) = self.current_font() else {
            tracing::warn!("No font available, returning empty metrics");
            return TextMetrics::default();
        };
        let state = self.states.current();
        let prepared = prepare_text(
            text,
            None,
            &*font,
            state.text_align,
            state.text_baseline,
            &*self.segmenter,
        );
        TextMetrics::new(&prepared, &*font)
    }

    // Images

    /// Draw a source at its natural size
    pub fn draw_image(&mut self, source: &CanvasImageSource, dx: f64, dy: f64) -> Result<()> {
        if source.check_usability()? == Usability::Bad {
            return Ok(());
        }
        let (w, h) = source.size();
        let (w, h) = (w as f64, h as f64);
        self.draw_image_subrect(source, 0.0, 0.0, w, h, dx, dy, w, h)
    }

    /// Draw a whole source scaled into a destination rect
    pub fn draw_image_scaled(&mut self, source: &CanvasImageSource, dx: f64, dy: f64, dw: f64, dh: f64) -> Result<()> {
        if source.check_usability()? == Usability::Bad {
            return Ok(());
        }
        let (w, h) = source.size();
        self.draw_image_subrect(source, 0.0, 0.0, w as f64, h as f64, dx, dy, dw, dh)
    }

    /// Draw part of a source into a destination rect
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image_subrect(
        &mut self,
        source: &CanvasImageSource,
        sx: f64,
        sy: f64,
        sw: f64,
        sh: f64,
        dx: f64,
        dy: f64,
        dw: f64,
        dh: f64,
    ) -> Result<()> {
        if !all_finite(&[sx, sy, sw, sh, dx, dy, dw, dh]) || sw == 0.0 || sh == 0.0 {
            tracing::debug!("drawImage with degenerate geometry skipped");
            return Ok(());
        }
        if source.check_usability()? == Usability::Bad {
            tracing::debug!("drawImage source not usable");
            return Ok(());
        }

        let rects = source
            .bitmap()
            .and_then(|bitmap| {
                compute_draw_rects(Rect::new(sx, sy, sw, sh), Rect::new(dx, dy, dw, dh), bitmap.bounds())
                    .map(|rects| (bitmap, rects))
            });
        if let Some((bitmap, (src, dst))) = rects {
            if let Some((painter, state, _)) = self.parts() {
                let damage = engine::draw_image(painter, state, bitmap, src, dst);
                self.did_draw(damage);
            }
        }

        if source.is_cross_origin_tainted() {
            self.taint();
        }
        Ok(())
    }

    /// Snapshot of this canvas usable as an image source
    pub fn to_image_source(&self) -> CanvasImageSource {
        CanvasImageSource::Canvas(CanvasSnapshot {
            width: self.host.width(),
            height: self.host.height(),
            bitmap: self.bitmap().map(|b| Arc::new(b.clone())),
            origin_clean: self.origin_clean,
        })
    }

    // Pixel manipulation

    /// Transparent buffer of `|width| x |height|`
    pub fn create_image_data(&self, width: i32, height: i32) -> Result<ImageData> {
        self.new_image_data(width.unsigned_abs(), height.unsigned_abs())
    }

    /// Transparent buffer the size of `existing`; pixels are not copied
    pub fn create_image_data_from(&self, existing: &ImageData) -> Result<ImageData> {
        self.new_image_data(existing.width(), existing.height())
    }

    /// Buffers larger than the configured surface limit are an index-size
    /// error like zero-sized ones
    fn new_image_data(&self, width: u32, height: u32) -> Result<ImageData> {
        if width > 0 && height > 0 && !self.settings.allows_surface(width, height) {
            return Err(CanvasError::IndexSize);
        }
        ImageData::new(width, height)
    }

    /// Read back pixels. Negative extents grow the rect up/left from
    /// `(x, y)`; whatever lies outside the surface reads as transparent.
    pub fn get_image_data(&self, x: i32, y: i32, width: i32, height: i32) -> Result<ImageData> {
        if width == 0 || height == 0 {
            return Err(CanvasError::IndexSize);
        }
        if !self.origin_clean {
            return Err(CanvasError::Security);
        }

        let mut data = self.new_image_data(width.unsigned_abs(), height.unsigned_abs())?;
        let Some(bitmap) = self.bitmap() else {
            return Ok(data);
        };

        let left = x as i64 + (width as i64).min(0);
        let top = y as i64 + (height as i64).min(0);
        let right = (left + width.unsigned_abs() as i64).min(bitmap.width() as i64);
        let bottom = (top + height.unsigned_abs() as i64).min(bitmap.height() as i64);
        for sy in top.max(0)..bottom {
            for sx in left.max(0)..right {
                if let Some(color) = bitmap.pixel(sx as u32, sy as u32) {
                    data.set_pixel((sx - left) as u32, (sy - top) as u32, color);
                }
            }
        }
        Ok(data)
    }

    /// Write pixels at `(x, y)` in device space, ignoring transform, alpha
    /// and clip
    pub fn put_image_data(&mut self, data: &ImageData, x: i32, y: i32) {
        let Some(bitmap) = data.to_bitmap() else {
            return;
        };
        let Some(painter) = self.painter() else {
            return;
        };
        painter.blit(x, y, &bitmap, bitmap.bounds());
        let damage = IntRect::new(x, y, data.width(), data.height()).intersection(&painter.bitmap().bounds());
        if !damage.is_empty() {
            self.host.did_draw(damage.into());
        }
    }
}

impl<H: CanvasHost + fmt::Debug> fmt::Debug for CanvasRenderingContext2D<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasRenderingContext2D")
            .field("host", &self.host)
            .field("surface", &self.surface)
            .field("depth", &self.states.depth())
            .field("origin_clean", &self.origin_clean)
            .finish_non_exhaustive()
    }
}
