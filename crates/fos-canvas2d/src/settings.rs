//! Context Configuration

use crate::font::DEFAULT_FONT;

/// Rendering context configuration options
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSettings {
    /// Font used until the caller sets one
    pub default_font: String,

    /// Initial `imageSmoothingEnabled`
    pub image_smoothing_enabled: bool,

    /// Anti-alias path edges
    pub anti_alias: bool,

    /// Largest backing surface, in pixels
    pub max_surface_area: u64,

    /// Resolved fonts kept per context
    pub font_cache_capacity: usize,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            default_font: DEFAULT_FONT.to_string(),
            image_smoothing_enabled: true,
            anti_alias: true,
            max_surface_area: 16384 * 16384, // 256 Mpx
            font_cache_capacity: 32,
        }
    }
}

impl ContextSettings {
    pub fn with_default_font(mut self, font: impl Into<String>) -> Self {
        self.default_font = font.into();
        self
    }

    pub fn with_image_smoothing(mut self, enabled: bool) -> Self {
        self.image_smoothing_enabled = enabled;
        self
    }

    pub fn with_anti_alias(mut self, anti_alias: bool) -> Self {
        self.anti_alias = anti_alias;
        self
    }

    pub fn with_max_surface_area(mut self, area: u64) -> Self {
        self.max_surface_area = area;
        self
    }

    pub fn with_font_cache_capacity(mut self, capacity: usize) -> Self {
        self.font_cache_capacity = capacity;
        self
    }

    /// Whether a surface of this size may be allocated
    pub fn allows_surface(&self, width: u32, height: u32) -> bool {
        width > 0 && height > 0 && (width as u64) * (height as u64) <= self.max_surface_area
    }
}
