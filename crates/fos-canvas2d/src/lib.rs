//! fOS Canvas 2D - Immediate-mode drawing core
//!
//! This crate provides the core of the canvas 2D rendering context:
//! - Drawing-state stack with save/restore
//! - Path model and affine transform pipeline
//! - Paint resolution (colors, gradients, patterns)
//! - Fill/stroke/clip engine over a pluggable painter (tiny-skia by default)
//! - Text preparation with grapheme segmentation (icu_segmenter)
//! - drawImage compositing with origin-clean tainting
//! - ImageData pixel read/write

pub mod geometry;
pub mod transform;
pub mod path;
pub mod paint;
pub mod state;
pub mod painter;
pub mod raster;
pub mod font;
pub mod text;
pub mod engine;
pub mod image;
pub mod image_data;
pub mod element;
pub mod settings;
pub mod context;

pub use context::CanvasRenderingContext2D;
pub use element::{CanvasElement, CanvasHost};
pub use font::{FontCache, FontDescriptor, FontHandle, FontKind, FontProvider, GlyphCell, SystemFontProvider};
pub use geometry::{IntRect, Point, Rect};
pub use image::{CanvasImageSource, CanvasSnapshot, ImageBitmap, ImageElement, Usability};
pub use image_data::ImageData;
pub use paint::{Color, Gradient, PaintStyle, Pattern, PatternRepetition, ResolvedPaint};
pub use painter::{Painter, ScalingMode, StrokeStyle, WindingRule};
pub use path::{OutlineSink, Path, Segment};
pub use raster::{Bitmap, SkiaPainter};
pub use settings::ContextSettings;
pub use state::{DrawingState, ImageSmoothingQuality, LineCap, LineJoin, TextAlign, TextBaseline};
pub use text::{GraphemeSegmenter, IcuGraphemeSegmenter, PreparedText, TextMetrics};
pub use transform::AffineTransform;

/// Canvas error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanvasError {
    #[error("Index or size is negative or greater than the allowed amount")]
    IndexSize,

    #[error("The operation is insecure: canvas is not origin-clean")]
    Security,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Font error: {0}")]
    Font(String),
}

pub type Result<T> = std::result::Result<T, CanvasError>;
