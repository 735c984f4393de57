//! Workspace bounds
//!
//! Arrangement stays inside a finite region that scales with the content
//! already on the canvas.

use std::fmt;

use crate::domain::{Point, Positionable, Rect, Size};

/// Side of the default square and lower limit of each axis.
pub const MIN_WORKSPACE_SIZE: f64 = 10_000.0;
/// Span used for an axis along which the frames have no extent.
pub const DEGENERATE_SPAN: f64 = 2_000.0;
/// Growth factor applied to the current span of content.
pub const SPAN_FACTOR: f64 = 10.0;

/// Axis-aligned region arrangement must stay in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkspaceBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl WorkspaceBounds {
    fn centered(center: Point, size: Size) -> Self {
        Self {
            min_x: center.x - size.width / 2.0,
            min_y: center.y - size.height / 2.0,
            max_x: center.x + size.width / 2.0,
            max_y: center.y + size.height / 2.0,
        }
    }

    /// Derive bounds from every frame currently on the canvas.
    pub fn from_frames<P: Positionable>(frames: &[P]) -> Self {
        if frames.is_empty() {
            return Self::centered(
                Point::default(),
                Size::new(MIN_WORKSPACE_SIZE, MIN_WORKSPACE_SIZE),
            );
        }

        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for rect in frames.iter().map(Positionable::rect) {
            min_x = min_x.min(rect.left());
            min_y = min_y.min(rect.top());
            max_x = max_x.max(rect.right());
            max_y = max_y.max(rect.bottom());
        }

        let center = Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
        let span = |extent: f64| if extent > 0.0 { extent } else { DEGENERATE_SPAN };
        let size = Size::new(
            (span(max_x - min_x) * SPAN_FACTOR).max(MIN_WORKSPACE_SIZE),
            (span(max_y - min_y) * SPAN_FACTOR).max(MIN_WORKSPACE_SIZE),
        );
        Self::centered(center, size)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Move `position` so a rectangle of `dimension` stays inside the bounds.
    ///
    /// The near edge wins when the rectangle is larger than the bounds.
    pub fn clamp(&self, position: Point, dimension: Size) -> Point {
        let x = if position.x < self.min_x {
            self.min_x
        } else if position.x + dimension.width > self.max_x {
            self.max_x - dimension.width
        } else {
            position.x
        };
        let y = if position.y < self.min_y {
            self.min_y
        } else if position.y + dimension.height > self.max_y {
            self.max_y - dimension.height
        } else {
            position.y
        };
        Point::new(x, y)
    }

    pub fn contains(&self, rect: &Rect) -> bool {
        rect.left() >= self.min_x
            && rect.top() >= self.min_y
            && rect.right() <= self.max_x
            && rect.bottom() <= self.max_y
    }
}

impl fmt::Display for WorkspaceBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x: {} .. {}, y: {} .. {} ({} × {})",
            self.min_x,
            self.max_x,
            self.min_y,
            self.max_y,
            self.width(),
            self.height()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_bounds_when_clamping_far_edge_then_snaps_inside() {
        let bounds = WorkspaceBounds::from_frames::<crate::domain::Frame>(&[]);
        let clamped = bounds.clamp(Point::new(4900.0, -6000.0), Size::new(200.0, 100.0));
        assert_eq!(clamped, Point::new(4800.0, -5000.0));
    }
}
