//! Path
//!
//! Vector path construction for Canvas 2D.
//!
//! Paths built by the context are stored in device space: every coordinate
//! has already been mapped through the transform that was current when the
//! segment was appended. Changing the transform later never touches
//! segments that are already in the path.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::font::FontHandle;
use crate::geometry::{Point, Rect};
use crate::transform::AffineTransform;

/// Path segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { control: Point, to: Point },
    CubicTo { control1: Point, control2: Point, to: Point },
    Close,
}

impl Segment {
    /// Every point stored in the segment, control points included
    fn points(&self) -> impl Iterator<Item = Point> {
        let (pts, n): ([Point; 3], usize) = match *self {
            Segment::MoveTo(p) | Segment::LineTo(p) => ([p, p, p], 1),
            Segment::QuadTo { control, to } => ([control, to, to], 2),
            Segment::CubicTo { control1, control2, to } => ([control1, control2, to], 3),
            Segment::Close => ([Point::default(); 3], 0),
        };
        pts.into_iter().take(n)
    }

    fn map(&self, t: &AffineTransform) -> Segment {
        match *self {
            Segment::MoveTo(p) => Segment::MoveTo(t.map_point(p)),
            Segment::LineTo(p) => Segment::LineTo(t.map_point(p)),
            Segment::QuadTo { control, to } => Segment::QuadTo {
                control: t.map_point(control),
                to: t.map_point(to),
            },
            Segment::CubicTo { control1, control2, to } => Segment::CubicTo {
                control1: t.map_point(control1),
                control2: t.map_point(control2),
                to: t.map_point(to),
            },
            Segment::Close => Segment::Close,
        }
    }
}

/// A contiguous run of segments beginning at a `MoveTo`
#[derive(Debug, Clone, Copy)]
pub struct SubPath<'a> {
    segments: &'a [Segment],
}

impl<'a> SubPath<'a> {
    pub fn segments(&self) -> &'a [Segment] {
        self.segments
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Close))
    }

    pub fn start(&self) -> Option<Point> {
        match self.segments.first() {
            Some(Segment::MoveTo(p)) => Some(*p),
            _ => None,
        }
    }
}

/// 2D path made of sub-paths
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<Segment>,
    /// Start of the open sub-path
    start: Option<Point>,
    /// Last point appended
    current: Option<Point>,
    /// A `Close` was the last segment; the next drawing segment opens a
    /// new sub-path at the closed one's start.
    reopen: bool,
}

impl Path {
    /// Create new empty path
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new sub-path at `p`
    pub fn move_to(&mut self, p: Point) {
        self.segments.push(Segment::MoveTo(p));
        self.start = Some(p);
        self.current = Some(p);
        self.reopen = false;
    }

    /// Straight line to `p`; acts as `move_to` on an empty path
    pub fn line_to(&mut self, p: Point) {
        if !self.ensure_subpath(p) {
            return;
        }
        self.segments.push(Segment::LineTo(p));
        self.current = Some(p);
    }

    /// Quadratic Bézier
    pub fn quadratic_curve_to(&mut self, control: Point, to: Point) {
        self.ensure_subpath(control);
        self.segments.push(Segment::QuadTo { control, to });
        self.current = Some(to);
    }

    /// Cubic Bézier
    pub fn bezier_curve_to(&mut self, control1: Point, control2: Point, to: Point) {
        self.ensure_subpath(control1);
        self.segments.push(Segment::CubicTo { control1, control2, to });
        self.current = Some(to);
    }

    /// Close the open sub-path
    pub fn close_path(&mut self) {
        let Some(start) = self.start else {
            return;
        };
        if self.reopen {
            return;
        }
        self.segments.push(Segment::Close);
        self.current = Some(start);
        self.reopen = true;
    }

    /// Append a closed rectangle whose corners are mapped through `transform`
    pub fn rect(&mut self, rect: Rect, transform: &AffineTransform) {
        let [p0, p1, p2, p3] = rect.corners().map(|p| transform.map_point(p));
        self.move_to(p0);
        self.segments.push(Segment::LineTo(p1));
        self.segments.push(Segment::LineTo(p2));
        self.segments.push(Segment::LineTo(p3));
        self.segments.push(Segment::Close);
        self.current = Some(p0);
        self.reopen = true;
    }

    /// Circular arc, see [`Path::ellipse`]
    pub fn arc(
        &mut self,
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        counterclockwise: bool,
        transform: &AffineTransform,
    ) {
        self.ellipse(center, radius, radius, 0.0, start_angle, end_angle, counterclockwise, transform);
    }

    /// Elliptical arc approximated with cubic Béziers (at most a quarter
    /// turn per segment). Connects to the current point with a line, or
    /// starts a new sub-path when there is none.
    #[allow(clippy::too_many_arguments)]
    pub fn ellipse(
        &mut self,
        center: Point,
        radius_x: f64,
        radius_y: f64,
        rotation: f64,
        start_angle: f64,
        end_angle: f64,
        counterclockwise: bool,
        transform: &AffineTransform,
    ) {
        let sweep = arc_sweep(start_angle, end_angle, counterclockwise);

        // unit circle -> ellipse -> device
        let local = AffineTransform::translation(center.x, center.y)
            .multiply(&AffineTransform::rotation(rotation))
            .multiply(&AffineTransform::scaling(radius_x, radius_y));
        let to_device = transform.multiply(&local);
        let on_circle = |theta: f64| Point::new(theta.cos(), theta.sin());

        let first = to_device.map_point(on_circle(start_angle));
        if self.current.is_some() {
            self.line_to(first);
        } else {
            self.move_to(first);
        }

        if sweep == 0.0 {
            return;
        }

        let count = (sweep.abs() / FRAC_PI_2).ceil().max(1.0) as usize;
        let delta = sweep / count as f64;
        let k = 4.0 / 3.0 * (delta / 4.0).tan();
        let mut theta = start_angle;
        for _ in 0..count {
            let next = theta + delta;
            let (s0, c0) = theta.sin_cos();
            let (s1, c1) = next.sin_cos();
            let control1 = Point::new(c0 - k * s0, s0 + k * c0);
            let control2 = Point::new(c1 + k * s1, s1 - k * c1);
            self.bezier_curve_to(
                to_device.map_point(control1),
                to_device.map_point(control2),
                to_device.map_point(on_circle(next)),
            );
            theta = next;
        }
    }

    /// Append glyph outlines for each cluster, advancing the pen by the
    /// cluster's width. Outlines are produced in glyph space (pixel units,
    /// y down, origin on the baseline) and mapped through `transform`.
    pub fn append_text<'t, I>(&mut self, clusters: I, font: &dyn FontHandle, transform: &AffineTransform)
    where
        I: IntoIterator<Item = &'t str>,
    {
        let mut pen_x = 0.0;
        for cluster in clusters {
            let placement = transform.multiply(&AffineTransform::translation(pen_x, 0.0));
            let mut sink = TransformedSink { path: self, transform: placement };
            font.outline(cluster, &mut sink);
            pen_x += font.width(cluster);
        }
    }

    /// All segments in order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterate sub-paths in order
    pub fn subpaths(&self) -> impl Iterator<Item = SubPath<'_>> {
        self.segments
            .split_inclusive(|s| matches!(s, Segment::Close))
            .flat_map(|run| {
                let mut starts: Vec<usize> = run
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| matches!(s, Segment::MoveTo(_)))
                    .map(|(i, _)| i)
                    .collect();
                if starts.first() != Some(&0) {
                    starts.insert(0, 0);
                }
                let ends = starts.iter().skip(1).copied().chain(std::iter::once(run.len()));
                starts
                    .iter()
                    .copied()
                    .zip(ends)
                    .map(move |(s, e)| SubPath { segments: &run[s..e] })
                    .collect::<Vec<_>>()
            })
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last point appended
    pub fn current_point(&self) -> Option<Point> {
        self.current
    }

    /// Smallest rect enclosing every point ever appended. Control points
    /// are included, so curves may get a slightly larger box than their
    /// true extent.
    pub fn bounding_box(&self) -> Rect {
        Rect::from_points(self.segments.iter().flat_map(Segment::points))
    }

    /// Copy of this path where every open sub-path gets a closing segment.
    /// The receiver is left untouched.
    pub fn close_all_subpaths(&self) -> Path {
        let mut closed = Path::new();
        for subpath in self.subpaths() {
            closed.segments.extend_from_slice(subpath.segments());
            if !subpath.is_closed() && subpath.segments().len() > 1 {
                closed.segments.push(Segment::Close);
            }
        }
        closed.start = self.start;
        closed.current = self.start;
        closed.reopen = !closed.is_empty();
        closed
    }

    /// Copy with every coordinate mapped through `transform`
    pub fn copy_transformed(&self, transform: &AffineTransform) -> Path {
        Path {
            segments: self.segments.iter().map(|s| s.map(transform)).collect(),
            start: self.start.map(|p| transform.map_point(p)),
            current: self.current.map(|p| transform.map_point(p)),
            reopen: self.reopen,
        }
    }

    /// Convert to a tiny-skia path; `None` when nothing drawable remains.
    pub fn to_tiny_skia(&self) -> Option<tiny_skia::Path> {
        let mut pb = tiny_skia::PathBuilder::new();
        for segment in &self.segments {
            match *segment {
                Segment::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
                Segment::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
                Segment::QuadTo { control, to } => {
                    pb.quad_to(control.x as f32, control.y as f32, to.x as f32, to.y as f32)
                }
                Segment::CubicTo { control1, control2, to } => pb.cubic_to(
                    control1.x as f32, control1.y as f32,
                    control2.x as f32, control2.y as f32,
                    to.x as f32, to.y as f32,
                ),
                Segment::Close => pb.close(),
            }
        }
        pb.finish()
    }

    /// Make sure a sub-path is open before a drawing segment. Returns false
    /// when `p` was used to open it (the segment itself is then redundant).
    fn ensure_subpath(&mut self, p: Point) -> bool {
        if self.reopen {
            if let Some(start) = self.start {
                self.move_to(start);
            }
        }
        if self.current.is_none() {
            self.move_to(p);
            return false;
        }
        true
    }
}

/// Receives glyph outlines from a font
pub trait OutlineSink {
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn quad_to(&mut self, x1: f64, y1: f64, x: f64, y: f64);
    fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64);
    fn close(&mut self);
}

/// Appends outline callbacks to a path through a transform
struct TransformedSink<'p> {
    path: &'p mut Path,
    transform: AffineTransform,
}

impl TransformedSink<'_> {
    fn map(&self, x: f64, y: f64) -> Point {
        self.transform.map_point(Point::new(x, y))
    }
}

impl OutlineSink for TransformedSink<'_> {
    fn move_to(&mut self, x: f64, y: f64) {
        let p = self.map(x, y);
        self.path.move_to(p);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let p = self.map(x, y);
        self.path.line_to(p);
    }

    fn quad_to(&mut self, x1: f64, y1: f64, x: f64, y: f64) {
        let (c, p) = (self.map(x1, y1), self.map(x, y));
        self.path.quadratic_curve_to(c, p);
    }

    fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        let (c1, c2, p) = (self.map(x1, y1), self.map(x2, y2), self.map(x, y));
        self.path.bezier_curve_to(c1, c2, p);
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

/// Signed sweep of an arc, following the canvas angle rules
fn arc_sweep(start: f64, end: f64, counterclockwise: bool) -> f64 {
    if !counterclockwise && end - start >= TAU {
        return TAU;
    }
    if counterclockwise && start - end >= TAU {
        return -TAU;
    }
    if counterclockwise {
        -(start - end).rem_euclid(TAU)
    } else {
        (end - start).rem_euclid(TAU)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_path_basic() {
        let mut path = Path::new();
        path.move_to(p(10.0, 10.0));
        path.line_to(p(100.0, 10.0));
        path.line_to(p(100.0, 100.0));
        path.close_path();

        assert_eq!(path.segments().len(), 4);
        assert_eq!(path.current_point(), Some(p(10.0, 10.0)));
    }

    #[test]
    fn test_line_to_on_empty_path_moves() {
        let mut path = Path::new();
        path.line_to(p(5.0, 5.0));
        assert_eq!(path.segments(), &[Segment::MoveTo(p(5.0, 5.0))]);
    }

    #[test]
    fn test_line_after_close_reopens_at_start() {
        let mut path = Path::new();
        path.move_to(p(1.0, 1.0));
        path.line_to(p(5.0, 1.0));
        path.close_path();
        path.line_to(p(9.0, 9.0));

        let subpaths: Vec<_> = path.subpaths().collect();
        assert_eq!(subpaths.len(), 2);
        assert!(subpaths[0].is_closed());
        assert_eq!(subpaths[1].start(), Some(p(1.0, 1.0)));
        assert!(!subpaths[1].is_closed());
    }

    #[test]
    fn test_rect_is_closed() {
        let mut path = Path::new();
        path.rect(Rect::new(0.0, 0.0, 50.0, 50.0), &AffineTransform::identity());

        assert_eq!(path.segments().len(), 5);
        assert!(path.subpaths().all(|s| s.is_closed()));
    }

    #[test]
    fn test_rect_respects_transform() {
        let mut path = Path::new();
        path.rect(Rect::new(0.0, 0.0, 5.0, 5.0), &AffineTransform::translation(10.0, 10.0));
        assert_eq!(path.bounding_box(), Rect::new(10.0, 10.0, 5.0, 5.0));
    }

    #[test]
    fn test_empty_bounding_box() {
        assert_eq!(Path::new().bounding_box(), Rect::default());
    }

    #[test]
    fn test_bounding_box_includes_control_points() {
        let mut path = Path::new();
        path.move_to(p(0.0, 0.0));
        path.quadratic_curve_to(p(5.0, 20.0), p(10.0, 0.0));
        assert_eq!(path.bounding_box(), Rect::new(0.0, 0.0, 10.0, 20.0));
    }

    #[test]
    fn test_close_all_subpaths_leaves_original() {
        let mut path = Path::new();
        path.move_to(p(0.0, 0.0));
        path.line_to(p(10.0, 0.0));
        path.line_to(p(10.0, 10.0));
        path.move_to(p(20.0, 20.0));
        path.line_to(p(30.0, 20.0));
        path.close_path();
        let before = path.clone();

        let closed = path.close_all_subpaths();
        assert_eq!(path, before);
        assert!(closed.subpaths().all(|s| s.is_closed()));
        assert_eq!(closed.subpaths().count(), 2);
        assert_eq!(closed.segments().len(), path.segments().len() + 1);
    }

    #[test]
    fn test_zero_length_segment_preserved() {
        let mut path = Path::new();
        path.move_to(p(3.0, 3.0));
        path.line_to(p(3.0, 3.0));
        assert_eq!(path.segments().len(), 2);
    }

    #[test]
    fn test_copy_transformed() {
        let mut path = Path::new();
        path.move_to(p(1.0, 2.0));
        path.line_to(p(3.0, 4.0));
        let moved = path.copy_transformed(&AffineTransform::translation(10.0, 0.0));
        assert_eq!(moved.segments()[1], Segment::LineTo(p(13.0, 4.0)));
        assert_eq!(path.segments()[1], Segment::LineTo(p(3.0, 4.0)));
    }

    #[test]
    fn test_full_circle_arc() {
        let mut path = Path::new();
        path.arc(p(50.0, 50.0), 10.0, 0.0, TAU, false, &AffineTransform::identity());
        // move + four quarter curves
        assert_eq!(path.segments().len(), 5);
        let bbox = path.bounding_box();
        assert!((bbox.left() - 40.0).abs() < 1e-9);
        assert!((bbox.right() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_arc_sweep_rules() {
        assert_eq!(arc_sweep(0.0, 7.0, false), TAU);
        assert!((arc_sweep(0.0, -FRAC_PI_2, false) - 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert!((arc_sweep(0.0, FRAC_PI_2, true) + 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert_eq!(arc_sweep(1.0, 1.0, false), 0.0);
    }
}
