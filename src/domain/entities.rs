//! Domain entities: core data structures

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Opaque branch identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(pub String);

/// Opaque frame identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(pub String);

impl BranchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FrameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canvas coordinate (top-left origin, y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `origin` to `self`.
    pub fn offset_from(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }

    pub fn translate(self, by: Point) -> Point {
        Point::new(self.x + by.x, self.y + by.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width and height of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// Tolerance for float comparisons on canvas coordinates.
pub const GEOMETRY_EPSILON: f64 = 1e-6;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn left(&self) -> f64 {
        self.origin.x
    }

    pub fn top(&self) -> f64 {
        self.origin.y
    }

    pub fn right(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn with_origin(&self, origin: Point) -> Rect {
        Rect::new(origin, self.size)
    }

    /// Signed distance between the rectangles along x and y (negative when
    /// they overlap on that axis).
    pub fn gap(&self, other: &Rect) -> (f64, f64) {
        (
            (other.left() - self.right()).max(self.left() - other.right()),
            (other.top() - self.bottom()).max(self.top() - other.bottom()),
        )
    }

    /// True when the rectangles, each grown by half of `spacing`, intersect:
    /// the gap is smaller than `spacing` on both axes.
    pub fn collides_with(&self, other: &Rect, spacing: f64) -> bool {
        let (gap_x, gap_y) = self.gap(other);
        gap_x < spacing - GEOMETRY_EPSILON && gap_y < spacing - GEOMETRY_EPSILON
    }
}

/// Minimal identity + position + dimension shape used by the geometry code.
pub trait Positionable {
    fn id(&self) -> &FrameId;
    fn position(&self) -> Point;
    fn dimension(&self) -> Size;

    fn rect(&self) -> Rect {
        Rect::new(self.position(), self.dimension())
    }
}

/// A named logical project variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Branch {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: BranchId::new(id),
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Positioned, sized rectangle on the canvas owned by one branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: FrameId,
    pub branch_id: BranchId,
    pub position: Point,
    pub dimension: Size,
}

impl Frame {
    pub fn new(
        id: impl Into<String>,
        branch_id: impl Into<String>,
        position: Point,
        dimension: Size,
    ) -> Self {
        Self {
            id: FrameId::new(id),
            branch_id: BranchId::new(branch_id),
            position,
            dimension,
        }
    }

    /// Reject frames whose geometry cannot take part in layout math.
    pub fn validate(&self) -> Result<(), DomainError> {
        let values = [
            self.position.x,
            self.position.y,
            self.dimension.width,
            self.dimension.height,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(DomainError::NonFiniteGeometry(self.id.clone()));
        }
        if self.dimension.width < 0.0 || self.dimension.height < 0.0 {
            return Err(DomainError::NegativeDimension(self.id.clone()));
        }
        Ok(())
    }
}

impl Positionable for Frame {
    fn id(&self) -> &FrameId {
        &self.id
    }

    fn position(&self) -> Point {
        self.position
    }

    fn dimension(&self) -> Size {
        self.dimension
    }
}

/// A rectangle treated as an obstacle (or a candidate) by the collision resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct Placed {
    pub id: FrameId,
    pub position: Point,
    pub dimension: Size,
}

impl Placed {
    pub fn new(id: FrameId, position: Point, dimension: Size) -> Self {
        Self {
            id,
            position,
            dimension,
        }
    }
}

impl From<&Frame> for Placed {
    fn from(frame: &Frame) -> Self {
        Self::new(frame.id.clone(), frame.position, frame.dimension)
    }
}

impl Positionable for Placed {
    fn id(&self) -> &FrameId {
        &self.id
    }

    fn position(&self) -> Point {
        self.position
    }

    fn dimension(&self) -> Size {
        self.dimension
    }
}

/// Offset of one frame relative to its group's primary frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOffset {
    pub frame_id: FrameId,
    pub offset: Point,
}

/// A branch with its frames, moved as one rigid body.
///
/// Offsets are captured at construction, before anything moves.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchGroup {
    branch: Branch,
    frames: Vec<Frame>,
    offsets: Vec<FrameOffset>,
}

impl BranchGroup {
    /// Build a group; returns `None` for a branch without frames.
    pub fn new(branch: Branch, frames: Vec<Frame>) -> Option<Self> {
        let primary = frames.first()?.position;
        let offsets = frames
            .iter()
            .map(|frame| FrameOffset {
                frame_id: frame.id.clone(),
                offset: frame.position.offset_from(primary),
            })
            .collect();
        Some(Self {
            branch,
            frames,
            offsets,
        })
    }

    pub fn branch(&self) -> &Branch {
        &self.branch
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// First frame encountered for the branch.
    pub fn primary(&self) -> &Frame {
        // non-empty by construction
        &self.frames[0]
    }

    pub fn primary_rect(&self) -> Rect {
        self.primary().rect()
    }

    pub fn frame_ids(&self) -> impl Iterator<Item = &FrameId> {
        self.frames.iter().map(|f| &f.id)
    }

    /// Position of every frame once the primary frame sits at `primary`.
    pub fn place_at(&self, primary: Point) -> Vec<Placed> {
        self.frames
            .iter()
            .zip(&self.offsets)
            .map(|(frame, offset)| {
                Placed::new(
                    frame.id.clone(),
                    primary.translate(offset.offset),
                    frame.dimension,
                )
            })
            .collect()
    }
}

/// Axis along which groups are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Left-to-right
    #[default]
    Horizontal,
    /// Top-to-bottom
    Vertical,
}

impl Direction {
    /// Slot adjacent to `cursor` for a rectangle following it on this axis.
    pub fn next_to(self, cursor: &Rect, spacing: f64) -> Point {
        match self {
            Direction::Horizontal => Point::new(cursor.right() + spacing, cursor.top()),
            Direction::Vertical => Point::new(cursor.left(), cursor.bottom() + spacing),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "horizontal" | "h" => Ok(Direction::Horizontal),
            "vertical" | "v" => Ok(Direction::Vertical),
            other => Err(format!(
                "invalid direction '{other}' (expected horizontal or vertical)"
            )),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Horizontal => f.write_str("horizontal"),
            Direction::Vertical => f.write_str("vertical"),
        }
    }
}
