//! Canvas host
//!
//! The element that owns a rendering context: it supplies the surface size
//! and receives damage notifications after every paint.

use crate::geometry::Rect;

/// Owner of a rendering context
pub trait CanvasHost {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// A region of the surface (device pixels) was painted
    fn did_draw(&mut self, rect: Rect);
}

/// Plain canvas element that collects damage for the embedder to repaint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasElement {
    width: u32,
    height: u32,
    damage: Vec<Rect>,
}

impl CanvasElement {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, damage: Vec::new() }
    }

    /// Damage reported since the last [`CanvasElement::take_damage`]
    pub fn damage(&self) -> &[Rect] {
        &self.damage
    }

    pub fn take_damage(&mut self) -> Vec<Rect> {
        std::mem::take(&mut self.damage)
    }

    /// Union of all pending damage
    pub fn damage_bounds(&self) -> Rect {
        self.damage
            .iter()
            .copied()
            .reduce(|acc, r| acc.union(&r))
            .unwrap_or_default()
    }
}

impl CanvasHost for CanvasElement {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn did_draw(&mut self, rect: Rect) {
        tracing::trace!(?rect, "canvas damage");
        self.damage.push(rect);
    }
}
