//! Paint styles
//!
//! Fill and stroke paint for Canvas 2D: solid colors, gradients and
//! patterns, plus resolution against the global alpha.

use std::sync::Arc;

use crate::geometry::Point;
use crate::painter::ScalingMode;
use crate::raster::Bitmap;
use crate::transform::AffineTransform;
use crate::{CanvasError, Result};

/// Color (RGBA, not premultiplied)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with alpha multiplied by `opacity` (clamped to 0..=1)
    pub fn with_opacity(self, opacity: f64) -> Self {
        let opacity = if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) };
        Self {
            a: (self.a as f64 * opacity).round() as u8,
            ..self
        }
    }

    pub fn to_tiny_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }

    /// Parse a CSS color: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`,
    /// `rgb()`/`rgba()` and a few named colors.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        if let Some(args) = s.strip_prefix("rgba(").or_else(|| s.strip_prefix("rgb(")) {
            return Self::parse_rgb_args(args.strip_suffix(')')?);
        }
        Some(match s.as_str() {
            "transparent" => Self::TRANSPARENT,
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "lime" => Self::rgb(0, 255, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "cyan" | "aqua" => Self::rgb(0, 255, 255),
            "magenta" | "fuchsia" => Self::rgb(255, 0, 255),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "silver" => Self::rgb(192, 192, 192),
            "maroon" => Self::rgb(128, 0, 0),
            "navy" => Self::rgb(0, 0, 128),
            "orange" => Self::rgb(255, 165, 0),
            "purple" => Self::rgb(128, 0, 128),
            _ => return None,
        })
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
        let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            3 | 4 => {
                let a = if hex.len() == 4 { digit(3)? * 17 } else { 255 };
                Some(Self::rgba(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17, a))
            }
            6 | 8 => {
                let a = if hex.len() == 8 { pair(6)? } else { 255 };
                Some(Self::rgba(pair(0)?, pair(2)?, pair(4)?, a))
            }
            _ => None,
        }
    }

    fn parse_rgb_args(args: &str) -> Option<Self> {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }
        let channel = |s: &str| -> Option<u8> {
            let v: f64 = s.parse().ok()?;
            Some(v.round().clamp(0.0, 255.0) as u8)
        };
        let alpha = match parts.get(3) {
            Some(s) => {
                let v: f64 = s.parse().ok()?;
                (v.clamp(0.0, 1.0) * 255.0).round() as u8
            }
            None => 255,
        };
        Some(Self::rgba(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, alpha))
    }
}

/// Gradient geometry, in user space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientKind {
    Linear { start: Point, end: Point },
    Radial { start: Point, start_radius: f64, end: Point, end_radius: f64 },
}

/// A color stop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Color,
}

/// Gradient
///
/// Stop colors are stored exactly as given; global alpha is never baked in.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub kind: GradientKind,
    stops: Vec<ColorStop>,
}

impl Gradient {
    pub fn linear(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            kind: GradientKind::Linear { start: Point::new(x0, y0), end: Point::new(x1, y1) },
            stops: Vec::new(),
        }
    }

    /// Radial gradient between two circles. Negative radii are rejected.
    pub fn radial(x0: f64, y0: f64, r0: f64, x1: f64, y1: f64, r1: f64) -> Result<Self> {
        if r0 < 0.0 || r1 < 0.0 {
            return Err(CanvasError::IndexSize);
        }
        Ok(Self {
            kind: GradientKind::Radial {
                start: Point::new(x0, y0),
                start_radius: r0,
                end: Point::new(x1, y1),
                end_radius: r1,
            },
            stops: Vec::new(),
        })
    }

    /// Add a stop; offsets outside 0..=1 are an index size error. Stops
    /// with equal offsets keep insertion order.
    pub fn add_color_stop(&mut self, offset: f64, color: Color) -> Result<()> {
        if !(0.0..=1.0).contains(&offset) {
            return Err(CanvasError::IndexSize);
        }
        let at = self.stops.partition_point(|s| s.offset <= offset);
        self.stops.insert(at, ColorStop { offset, color });
        Ok(())
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }
}

/// Pattern repetition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatternRepetition {
    #[default]
    Repeat,
    RepeatX,
    RepeatY,
    NoRepeat,
}

impl PatternRepetition {
    /// Parse a repetition keyword; the empty string means `repeat`
    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "" | "repeat" => Self::Repeat,
            "repeat-x" => Self::RepeatX,
            "repeat-y" => Self::RepeatY,
            "no-repeat" => Self::NoRepeat,
            _ => return None,
        })
    }
}

/// Pattern
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub bitmap: Arc<Bitmap>,
    pub repetition: PatternRepetition,
}

/// Paint style for fills and strokes
#[derive(Debug, Clone, PartialEq)]
pub enum PaintStyle {
    Color(Color),
    Gradient(Gradient),
    Pattern(Pattern),
}

impl Default for PaintStyle {
    fn default() -> Self {
        PaintStyle::Color(Color::BLACK)
    }
}

impl From<Color> for PaintStyle {
    fn from(color: Color) -> Self {
        PaintStyle::Color(color)
    }
}

/// Paint handed to the painter
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPaint {
    pub style: PaintStyle,
    /// Multiplier applied while shading. Always 1.0 for solid colors,
    /// whose alpha already includes it.
    pub opacity: f64,
    /// Maps gradient/pattern space to device space
    pub transform: AffineTransform,
    /// Filter for sampling pattern pixels
    pub scaling: ScalingMode,
}

impl ResolvedPaint {
    /// Resolve a style against the global alpha and the current transform
    pub fn resolve(style: &PaintStyle, global_alpha: f64, transform: AffineTransform) -> Self {
        match style {
            PaintStyle::Color(color) => Self {
                style: PaintStyle::Color(color.with_opacity(global_alpha)),
                opacity: 1.0,
                transform,
                scaling: ScalingMode::default(),
            },
            PaintStyle::Gradient(_) | PaintStyle::Pattern(_) => Self {
                style: style.clone(),
                opacity: global_alpha,
                transform,
                scaling: ScalingMode::default(),
            },
        }
    }

    /// Solid color at full opacity
    pub fn solid(color: Color) -> Self {
        Self {
            style: PaintStyle::Color(color),
            opacity: 1.0,
            transform: AffineTransform::identity(),
            scaling: ScalingMode::default(),
        }
    }

    /// Sample patterns with `scaling` (from the image smoothing settings)
    pub fn with_scaling(mut self, scaling: ScalingMode) -> Self {
        self.scaling = scaling;
        self
    }
}
