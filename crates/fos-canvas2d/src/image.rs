//! Image sources
//!
//! Everything `drawImage` accepts, as one closed sum type. Each variant
//! answers the usability query, exposes its decoded pixels and reports
//! whether drawing it taints the destination.

use std::sync::Arc;

use crate::geometry::{IntRect, Rect};
use crate::raster::Bitmap;
use crate::{CanvasError, Result};

/// Result of the usability query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usability {
    Good,
    /// Not drawable right now (e.g. not decoded); drawing is a no-op
    Bad,
}

/// Decoded `<img>` contents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageElement {
    /// `None` until fully decoded
    pub bitmap: Option<Arc<Bitmap>>,
    /// Fetched without CORS approval from another origin
    pub cross_origin: bool,
}

impl ImageElement {
    pub fn decoded(bitmap: Bitmap) -> Self {
        Self { bitmap: Some(Arc::new(bitmap)), cross_origin: false }
    }
}

/// Snapshot of another canvas
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasSnapshot {
    pub width: u32,
    pub height: u32,
    /// `None` if the canvas was never painted
    pub bitmap: Option<Arc<Bitmap>>,
    pub origin_clean: bool,
}

impl Default for CanvasSnapshot {
    /// Blank zero-sized snapshot of a clean canvas
    fn default() -> Self {
        Self { width: 0, height: 0, bitmap: None, origin_clean: true }
    }
}

/// ImageBitmap - transferable image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBitmap {
    /// `None` once closed or transferred
    pub bitmap: Option<Arc<Bitmap>>,
    pub origin_clean: bool,
}

impl Default for ImageBitmap {
    /// Detached bitmap that never held cross-origin pixels
    fn default() -> Self {
        Self { bitmap: None, origin_clean: true }
    }
}

impl ImageBitmap {
    pub fn new(bitmap: Bitmap) -> Self {
        Self { bitmap: Some(Arc::new(bitmap)), origin_clean: true }
    }

    pub fn is_detached(&self) -> bool {
        self.bitmap.is_none()
    }

    /// Release the pixels; the bitmap is detached afterwards
    pub fn close(&mut self) {
        self.bitmap = None;
    }
}

/// Drawable source for `drawImage` and patterns
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasImageSource {
    Image(ImageElement),
    Canvas(CanvasSnapshot),
    ImageBitmap(ImageBitmap),
}

impl CanvasImageSource {
    /// Whether the source can be drawn.
    ///
    /// A zero-sized canvas and a detached bitmap are state errors; an image
    /// that is not decoded (or decoded to nothing) is merely unusable.
    pub fn check_usability(&self) -> Result<Usability> {
        match self {
            Self::Image(image) => Ok(match &image.bitmap {
                Some(bitmap) if bitmap.width() > 0 && bitmap.height() > 0 => Usability::Good,
                _ => Usability::Bad,
            }),
            Self::Canvas(canvas) => {
                if canvas.width == 0 || canvas.height == 0 {
                    return Err(CanvasError::InvalidState("canvas source has zero size".into()));
                }
                Ok(Usability::Good)
            }
            Self::ImageBitmap(bitmap) => {
                if bitmap.is_detached() {
                    return Err(CanvasError::InvalidState("image bitmap is detached".into()));
                }
                Ok(Usability::Good)
            }
        }
    }

    /// Decoded pixels, if any
    pub fn bitmap(&self) -> Option<&Arc<Bitmap>> {
        match self {
            Self::Image(image) => image.bitmap.as_ref(),
            Self::Canvas(canvas) => canvas.bitmap.as_ref(),
            Self::ImageBitmap(bitmap) => bitmap.bitmap.as_ref(),
        }
    }

    /// Intrinsic size in CSS pixels
    pub fn size(&self) -> (u32, u32) {
        match self {
            Self::Canvas(canvas) => (canvas.width, canvas.height),
            _ => self.bitmap().map(|b| (b.width(), b.height())).unwrap_or((0, 0)),
        }
    }

    pub fn is_cross_origin_tainted(&self) -> bool {
        match self {
            Self::Image(image) => image.cross_origin,
            Self::Canvas(canvas) => !canvas.origin_clean,
            Self::ImageBitmap(bitmap) => !bitmap.origin_clean,
        }
    }
}

impl From<ImageElement> for CanvasImageSource {
    fn from(image: ImageElement) -> Self {
        Self::Image(image)
    }
}

impl From<CanvasSnapshot> for CanvasImageSource {
    fn from(canvas: CanvasSnapshot) -> Self {
        Self::Canvas(canvas)
    }
}

impl From<ImageBitmap> for CanvasImageSource {
    fn from(bitmap: ImageBitmap) -> Self {
        Self::ImageBitmap(bitmap)
    }
}

/// Clip `source` to `bounds` and shrink `dest` by the same fraction on each
/// side. Both rects may have negative extents on input. Returns `None` when
/// nothing of the source is left.
pub fn compute_draw_rects(source: Rect, dest: Rect, bounds: IntRect) -> Option<(Rect, Rect)> {
    let source = Rect::from_signed(source.x, source.y, source.width, source.height);
    let dest = Rect::from_signed(dest.x, dest.y, dest.width, dest.height);
    if source.is_empty() {
        return None;
    }

    let clipped = source.intersection(&Rect::from(bounds));
    if clipped.is_empty() {
        return None;
    }

    let scale_x = dest.width / source.width;
    let scale_y = dest.height / source.height;
    let dest = Rect::new(
        dest.x + (clipped.x - source.x) * scale_x,
        dest.y + (clipped.y - source.y) * scale_y,
        clipped.width * scale_x,
        clipped.height * scale_y,
    );
    Some((clipped, dest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Color;

    fn red(size: u32) -> Bitmap {
        Bitmap::filled(size, size, Color::rgb(255, 0, 0)).unwrap()
    }

    #[test]
    fn test_image_usability() {
        let pending = CanvasImageSource::from(ImageElement::default());
        assert_eq!(pending.check_usability().unwrap(), Usability::Bad);

        let ready = CanvasImageSource::from(ImageElement::decoded(red(2)));
        assert_eq!(ready.check_usability().unwrap(), Usability::Good);
        assert!(!ready.is_cross_origin_tainted());
    }

    #[test]
    fn test_zero_canvas_is_state_error() {
        let canvas = CanvasImageSource::from(CanvasSnapshot { width: 0, height: 10, ..Default::default() });
        assert!(matches!(canvas.check_usability(), Err(CanvasError::InvalidState(_))));
    }

    #[test]
    fn test_detached_bitmap_is_state_error() {
        let mut bitmap = ImageBitmap::new(red(2));
        bitmap.close();
        let source = CanvasImageSource::from(bitmap);
        assert!(matches!(source.check_usability(), Err(CanvasError::InvalidState(_))));
    }

    #[test]
    fn test_taint() {
        let canvas = CanvasSnapshot { width: 1, height: 1, bitmap: None, origin_clean: false };
        assert!(CanvasImageSource::from(canvas).is_cross_origin_tainted());
        let image = ImageElement { bitmap: Some(Arc::new(red(1))), cross_origin: true };
        assert!(CanvasImageSource::from(image).is_cross_origin_tainted());
    }

    #[test]
    fn test_default_sources_are_untainted() {
        let canvas = CanvasImageSource::from(CanvasSnapshot { width: 4, height: 4, ..Default::default() });
        assert!(!canvas.is_cross_origin_tainted());
        let bitmap = ImageBitmap::default();
        assert!(bitmap.is_detached());
        assert!(!CanvasImageSource::from(bitmap).is_cross_origin_tainted());
    }

    #[test]
    fn test_draw_rects_unclipped() {
        let bounds = IntRect::new(0, 0, 4, 4);
        let (src, dst) = compute_draw_rects(
            Rect::new(0.0, 0.0, 4.0, 4.0),
            Rect::new(0.0, 0.0, 2.0, 2.0),
            bounds,
        )
        .unwrap();
        assert_eq!(src, Rect::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(dst, Rect::new(0.0, 0.0, 2.0, 2.0));
    }

    #[test]
    fn test_draw_rects_clip_proportionally() {
        // half of the source hangs off the right and bottom edges
        let bounds = IntRect::new(0, 0, 4, 4);
        let (src, dst) = compute_draw_rects(
            Rect::new(2.0, 2.0, 4.0, 4.0),
            Rect::new(10.0, 10.0, 8.0, 8.0),
            bounds,
        )
        .unwrap();
        assert_eq!(src, Rect::new(2.0, 2.0, 2.0, 2.0));
        assert_eq!(dst, Rect::new(10.0, 10.0, 4.0, 4.0));
    }

    #[test]
    fn test_draw_rects_negative_extent() {
        let bounds = IntRect::new(0, 0, 4, 4);
        let (src, dst) = compute_draw_rects(
            Rect::new(4.0, 4.0, -4.0, -4.0),
            Rect::new(2.0, 2.0, -2.0, -2.0),
            bounds,
        )
        .unwrap();
        assert_eq!(src, Rect::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(dst, Rect::new(0.0, 0.0, 2.0, 2.0));
    }

    #[test]
    fn test_draw_rects_outside() {
        let bounds = IntRect::new(0, 0, 4, 4);
        assert!(compute_draw_rects(Rect::new(5.0, 5.0, 2.0, 2.0), Rect::new(0.0, 0.0, 1.0, 1.0), bounds).is_none());
    }
}
