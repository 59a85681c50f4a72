//! Drawing state
//!
//! One frame of the save/restore stack.

use std::rc::Rc;

use crate::font::FontHandle;
use crate::paint::PaintStyle;
use crate::painter::WindingRule;
use crate::path::Path;
use crate::transform::AffineTransform;

/// Line cap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "butt" => Self::Butt,
            "round" => Self::Round,
            "square" => Self::Square,
            _ => return None,
        })
    }
}

/// Line join
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "miter" => Self::Miter,
            "round" => Self::Round,
            "bevel" => Self::Bevel,
            _ => return None,
        })
    }
}

/// Text alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Start,
    End,
    Left,
    Right,
    Center,
}

impl TextAlign {
    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "start" => Self::Start,
            "end" => Self::End,
            "left" => Self::Left,
            "right" => Self::Right,
            "center" => Self::Center,
            _ => return None,
        })
    }
}

/// Text baseline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextBaseline {
    Top,
    Hanging,
    Middle,
    #[default]
    Alphabetic,
    Ideographic,
    Bottom,
}

impl TextBaseline {
    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "top" => Self::Top,
            "hanging" => Self::Hanging,
            "middle" => Self::Middle,
            "alphabetic" => Self::Alphabetic,
            "ideographic" => Self::Ideographic,
            "bottom" => Self::Bottom,
            _ => return None,
        })
    }
}

/// Image smoothing quality hint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageSmoothingQuality {
    #[default]
    Low,
    Medium,
    High,
}

impl ImageSmoothingQuality {
    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => return None,
        })
    }
}

/// Clip region: the intersection of every entry, each a device-space path
/// filled with its winding rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clip {
    entries: Vec<(Path, WindingRule)>,
}

impl Clip {
    /// Narrow the clip to its intersection with `path`
    pub fn intersect(&mut self, path: Path, rule: WindingRule) {
        self.entries.push((path, rule));
    }

    pub fn entries(&self) -> &[(Path, WindingRule)] {
        &self.entries
    }

    /// Nothing can be drawn: some entry has no area
    pub fn is_degenerate(&self) -> bool {
        self.entries.iter().any(|(path, _)| path.bounding_box().is_empty())
    }
}

/// Resolved font shared between frames. Equality is identity.
#[derive(Debug, Clone)]
pub struct ResolvedFont(pub Rc<dyn FontHandle>);

impl PartialEq for ResolvedFont {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Drawing state (for save/restore)
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingState {
    pub transform: AffineTransform,
    pub fill_style: PaintStyle,
    pub stroke_style: PaintStyle,
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f64,
    pub line_dash: Vec<f64>,
    pub line_dash_offset: f64,
    pub global_alpha: f64,
    pub image_smoothing_enabled: bool,
    pub image_smoothing_quality: ImageSmoothingQuality,
    pub text_align: TextAlign,
    pub text_baseline: TextBaseline,
    /// Font shorthand as set by the caller; `None` until set
    pub font: Option<String>,
    /// Handle for `font` (or the default font), filled lazily
    pub resolved_font: Option<ResolvedFont>,
    pub clip: Option<Clip>,
}

impl Default for DrawingState {
    fn default() -> Self {
        Self {
            transform: AffineTransform::identity(),
            fill_style: PaintStyle::default(),
            stroke_style: PaintStyle::default(),
            line_width: 1.0,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            miter_limit: 10.0,
            line_dash: Vec::new(),
            line_dash_offset: 0.0,
            global_alpha: 1.0,
            image_smoothing_enabled: true,
            image_smoothing_quality: ImageSmoothingQuality::default(),
            text_align: TextAlign::default(),
            text_baseline: TextBaseline::default(),
            font: None,
            resolved_font: None,
            clip: None,
        }
    }
}

/// Save/restore stack. The current frame always exists.
#[derive(Debug, Clone)]
pub struct StateStack {
    current: DrawingState,
    saved: Vec<DrawingState>,
}

impl StateStack {
    pub fn new(initial: DrawingState) -> Self {
        Self { current: initial, saved: Vec::new() }
    }

    /// Push a copy of the current frame
    pub fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    /// Pop the last saved frame; no-op when nothing is saved
    pub fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.current = state;
        }
    }

    /// Drop all saved frames and reset the current one
    pub fn reset(&mut self, initial: DrawingState) {
        self.saved.clear();
        self.current = initial;
    }

    pub fn current(&self) -> &DrawingState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut DrawingState {
        &mut self.current
    }

    /// Number of saved frames
    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}
