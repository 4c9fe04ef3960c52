//! Geometric primitives for shapes, connections and docking.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in canvas space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular bounding box
//! - [`Axis`], [`Direction`], [`Orientation`] - Directional helpers used by
//!   the layout and space tool code
//! - Segment math: [`segment_intersection`], [`path_intersections`],
//!   [`closest_point_on_segment`], [`points_aligned`]
//!
//! # Coordinate System
//!
//! Easel uses a screen coordinate system:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Coordinates are `f32`. Editing operations round to whole canvas units
//! where a shape is centered or a delta is derived from a drop position.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A 2D point in canvas coordinate space.
///
/// # Examples
///
/// ```
/// # use easel_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
///
/// let mid = p1.midpoint(p2);
/// assert_eq!(mid.x(), 7.5);
/// assert_eq!(mid.y(), 12.5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Creates a new point with the specified x-coordinate
    pub fn with_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    /// Creates a new point with the specified y-coordinate
    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    /// Returns the coordinate along `axis`
    pub fn coord(self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Returns a copy with the coordinate along `axis` replaced
    pub fn with_coord(self, axis: Axis, value: f32) -> Self {
        match axis {
            Axis::X => self.with_x(value),
            Axis::Y => self.with_y(value),
        }
    }

    /// Checks if both x and y coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Calculates the hypotenuse (Euclidean distance from origin)
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to `other`
    pub fn distance(self, other: Point) -> f32 {
        self.sub_point(other).hypot()
    }

    /// Multiplies both coordinates by the given factor.
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Returns a new point with absolute values of both coordinates
    pub fn abs(self) -> Self {
        Self {
            x: self.x.abs(),
            y: self.y.abs(),
        }
    }

    /// Rounds both coordinates to the nearest whole canvas unit
    pub fn round(self) -> Self {
        Self {
            x: self.x.round(),
            y: self.y.round(),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns the extent along `axis`
    pub fn extent(self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }

    /// Returns a new Size with the maximum width and height between this size and another
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Multiplies both dimension by the given factor
    pub fn scale(self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    /// Returns true if both width and height are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates.
///
/// Shapes are positioned by their top-left corner, so most callers use the
/// [`x`](Self::x), [`y`](Self::y), [`width`](Self::width) and
/// [`height`](Self::height) view.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a center point and a size
    pub fn new_from_center(center: Point, size: Size) -> Self {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Shorthand for [`Bounds::new_from_top_left`] with raw components.
    ///
    /// ```
    /// # use easel_core::geometry::Bounds;
    /// let bounds = Bounds::new(150.0, 110.0, 100.0, 80.0);
    /// assert_eq!(bounds.max_x(), 250.0);
    /// assert_eq!(bounds.center().y(), 150.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new_from_top_left(Point::new(x, y), Size::new(width, height))
    }

    /// Returns the left edge
    pub fn x(self) -> f32 {
        self.min_x
    }

    /// Returns the top edge
    pub fn y(self) -> f32 {
        self.min_y
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the start coordinate along `axis` (left or top edge)
    pub fn start(self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.min_x,
            Axis::Y => self.min_y,
        }
    }

    /// Returns the end coordinate along `axis` (right or bottom edge)
    pub fn end(self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.max_x,
            Axis::Y => self.max_y,
        }
    }

    /// Returns the extent along `axis`
    pub fn extent(self, axis: Axis) -> f32 {
        self.end(axis) - self.start(axis)
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the same top-left corner with a different size
    pub fn with_size(self, size: Size) -> Self {
        Self::new_from_top_left(Point::new(self.min_x, self.min_y), size)
    }

    /// Returns true if `point` lies inside or on the edge of the bounds
    pub fn contains(self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// Returns true if the two bounds overlap (touching edges count)
    pub fn intersects(self, other: Bounds) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Merges two bounds to create a larger bounds that contains both.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Moves the bounds by the specified offset.
    ///
    /// ```
    /// # use easel_core::geometry::{Bounds, Point};
    /// let bounds = Bounds::new(10.0, 20.0, 50.0, 30.0);
    /// let moved = bounds.translate(Point::new(100.0, 50.0));
    /// assert_eq!(moved.x(), 110.0);
    /// assert_eq!(moved.y(), 70.0);
    /// assert_eq!(moved.width(), 50.0);
    /// ```
    pub fn translate(&self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.x,
            min_y: self.min_y + offset.y,
            max_x: self.max_x + offset.x,
            max_y: self.max_y + offset.y,
        }
    }

    /// Grows the bounds by `padding` on every side
    pub fn expand(&self, padding: f32) -> Self {
        Self {
            min_x: self.min_x - padding,
            min_y: self.min_y - padding,
            max_x: self.max_x + padding,
            max_y: self.max_y + padding,
        }
    }

    /// Returns the closed outline of the bounds, clockwise from the top-left
    /// corner, with the first corner repeated at the end.
    pub fn outline(self) -> [Point; 5] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
            Point::new(self.min_x, self.min_y),
        ]
    }

    /// Returns where `self` lies relative to `reference`.
    ///
    /// `padding` widens the gap that must exist before `self` counts as being
    /// on a side of `reference`.
    ///
    /// ```
    /// # use easel_core::geometry::{Bounds, Orientation};
    /// let reference = Bounds::new(100.0, 100.0, 100.0, 100.0);
    ///
    /// let left = Bounds::new(0.0, 120.0, 50.0, 50.0);
    /// assert_eq!(left.orientation_to(reference, 0.0), Orientation::Left);
    ///
    /// let above_right = Bounds::new(300.0, 0.0, 50.0, 50.0);
    /// assert_eq!(above_right.orientation_to(reference, 0.0), Orientation::TopRight);
    /// ```
    pub fn orientation_to(self, reference: Bounds, padding: f32) -> Orientation {
        let top = self.max_y + padding <= reference.min_y;
        let right = self.min_x - padding >= reference.max_x;
        let bottom = self.min_y - padding >= reference.max_y;
        let left = self.max_x + padding <= reference.min_x;

        match (top, bottom, left, right) {
            (true, _, true, _) => Orientation::TopLeft,
            (true, _, _, true) => Orientation::TopRight,
            (_, true, true, _) => Orientation::BottomLeft,
            (_, true, _, true) => Orientation::BottomRight,
            (true, _, _, _) => Orientation::Top,
            (_, true, _, _) => Orientation::Bottom,
            (_, _, true, _) => Orientation::Left,
            (_, _, _, true) => Orientation::Right,
            _ => Orientation::Intersect,
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}x{}]",
            self.x(),
            self.y(),
            self.width(),
            self.height()
        )
    }
}

/// A canvas axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Returns the perpendicular axis
    pub fn other(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// One of the four compass directions.
///
/// The space tool uses a direction to say which side of the split line is
/// affected, and resize uses it to say which edge is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "n")]
    North,
    #[serde(rename = "s")]
    South,
    #[serde(rename = "e")]
    East,
    #[serde(rename = "w")]
    West,
}

impl Direction {
    /// Returns the axis this direction moves along
    pub fn axis(self) -> Axis {
        match self {
            Direction::North | Direction::South => Axis::Y,
            Direction::East | Direction::West => Axis::X,
        }
    }

    /// Returns true for the directions pointing towards negative coordinates
    pub fn is_negative(self) -> bool {
        matches!(self, Direction::North | Direction::West)
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "n" => Ok(Direction::North),
            "s" => Ok(Direction::South),
            "e" => Ok(Direction::East),
            "w" => Ok(Direction::West),
            other => Err(format!("unknown direction `{other}`")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "n",
            Direction::South => "s",
            Direction::East => "e",
            Direction::West => "w",
        };
        f.write_str(name)
    }
}

/// Position of one bounds relative to another, see [`Bounds::orientation_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Intersect,
}

impl Orientation {
    /// True for orientations with a vertical component
    pub fn is_vertical(self) -> bool {
        matches!(
            self,
            Orientation::Top
                | Orientation::Bottom
                | Orientation::TopLeft
                | Orientation::TopRight
                | Orientation::BottomLeft
                | Orientation::BottomRight
        )
    }

    /// True for orientations with a horizontal component
    pub fn is_horizontal(self) -> bool {
        matches!(
            self,
            Orientation::Left
                | Orientation::Right
                | Orientation::TopLeft
                | Orientation::TopRight
                | Orientation::BottomLeft
                | Orientation::BottomRight
        )
    }
}

/// Computes the intersection of segments `a1-a2` and `b1-b2`, endpoints included.
///
/// Parallel and collinear segments yield `None`.
///
/// ```
/// # use easel_core::geometry::{Point, segment_intersection};
/// let hit = segment_intersection(
///     Point::new(0.0, 5.0),
///     Point::new(10.0, 5.0),
///     Point::new(5.0, 0.0),
///     Point::new(5.0, 10.0),
/// );
/// assert_eq!(hit, Some(Point::new(5.0, 5.0)));
/// ```
pub fn segment_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let r = a2.sub_point(a1);
    let s = b2.sub_point(b1);
    let denominator = r.x * s.y - r.y * s.x;
    if denominator.abs() < f32::EPSILON {
        return None;
    }

    let diff = b1.sub_point(a1);
    let t = (diff.x * s.y - diff.y * s.x) / denominator;
    let u = (diff.x * r.y - diff.y * r.x) / denominator;

    const TOLERANCE: f32 = 1e-4;
    let in_range = |v: f32| (-TOLERANCE..=1.0 + TOLERANCE).contains(&v);
    if in_range(t) && in_range(u) {
        Some(a1.add_point(r.scale(t.clamp(0.0, 1.0))))
    } else {
        None
    }
}

/// Returns every point where polyline `a` crosses polyline `b`.
///
/// Points closer than one canvas unit to an already reported point are
/// merged, so a path passing exactly through a corner counts once.
pub fn path_intersections(a: &[Point], b: &[Point]) -> Vec<Point> {
    let mut found: Vec<Point> = Vec::new();
    for segment_a in a.windows(2) {
        for segment_b in b.windows(2) {
            let Some(hit) =
                segment_intersection(segment_a[0], segment_a[1], segment_b[0], segment_b[1])
            else {
                continue;
            };
            if !found.iter().any(|known| known.distance(hit) < 1.0) {
                found.push(hit);
            }
        }
    }
    found
}

/// Returns the point on segment `a-b` closest to `point`.
pub fn closest_point_on_segment(point: Point, a: Point, b: Point) -> Point {
    let ab = b.sub_point(a);
    let length_sq = ab.x * ab.x + ab.y * ab.y;
    if length_sq == 0.0 {
        return a;
    }
    let ap = point.sub_point(a);
    let t = ((ap.x * ab.x + ap.y * ab.y) / length_sq).clamp(0.0, 1.0);
    a.add_point(ab.scale(t))
}

/// Reports whether `a` and `b` are aligned within `threshold`.
///
/// Returns the axis the segment `a-b` runs along: [`Axis::Y`] for a
/// vertical segment, [`Axis::X`] for a horizontal one. Coincident points
/// report [`Axis::Y`].
pub fn points_aligned(a: Point, b: Point, threshold: f32) -> Option<Axis> {
    if (a.x - b.x).abs() <= threshold {
        Some(Axis::Y)
    } else if (a.y - b.y).abs() <= threshold {
        Some(Axis::X)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_point_with_coord() {
        let point = Point::new(1.0, 2.0);
        assert_eq!(point.coord(Axis::X), 1.0);
        assert_eq!(point.with_coord(Axis::Y, 7.0), Point::new(1.0, 7.0));
    }

    #[test]
    fn test_point_round() {
        let point = Point::new(10.4, -2.6);
        assert_eq!(point.round(), Point::new(10.0, -3.0));
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_approx_eq!(f32, a.distance(b), 5.0);
    }

    #[test]
    fn test_bounds_view() {
        let bounds = Bounds::new(150.0, 110.0, 100.0, 80.0);
        assert_eq!(bounds.x(), 150.0);
        assert_eq!(bounds.y(), 110.0);
        assert_eq!(bounds.width(), 100.0);
        assert_eq!(bounds.height(), 80.0);
        assert_eq!(bounds.center(), Point::new(200.0, 150.0));
        assert_eq!(bounds.start(Axis::Y), 110.0);
        assert_eq!(bounds.end(Axis::X), 250.0);
        assert_eq!(bounds.extent(Axis::X), 100.0);
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(bounds.contains(Point::new(0.0, 0.0)));
        assert!(bounds.contains(Point::new(10.0, 5.0)));
        assert!(!bounds.contains(Point::new(10.1, 5.0)));
    }

    #[test]
    fn test_bounds_intersects() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(Bounds::new(5.0, 5.0, 10.0, 10.0)));
        assert!(a.intersects(Bounds::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!a.intersects(Bounds::new(11.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn test_bounds_expand() {
        let bounds = Bounds::new(10.0, 10.0, 20.0, 20.0).expand(5.0);
        assert_eq!(bounds, Bounds::new(5.0, 5.0, 30.0, 30.0));
    }

    #[test]
    fn test_bounds_with_size_keeps_top_left() {
        let bounds = Bounds::new(10.0, 20.0, 30.0, 40.0).with_size(Size::new(5.0, 6.0));
        assert_eq!(bounds, Bounds::new(10.0, 20.0, 5.0, 6.0));
    }

    #[test]
    fn test_orientation() {
        let reference = Bounds::new(100.0, 100.0, 100.0, 100.0);

        assert_eq!(
            Bounds::new(120.0, 0.0, 20.0, 20.0).orientation_to(reference, 0.0),
            Orientation::Top
        );
        assert_eq!(
            Bounds::new(120.0, 300.0, 20.0, 20.0).orientation_to(reference, 0.0),
            Orientation::Bottom
        );
        assert_eq!(
            Bounds::new(300.0, 120.0, 20.0, 20.0).orientation_to(reference, 0.0),
            Orientation::Right
        );
        assert_eq!(
            Bounds::new(0.0, 300.0, 20.0, 20.0).orientation_to(reference, 0.0),
            Orientation::BottomLeft
        );
        assert_eq!(
            Bounds::new(150.0, 150.0, 20.0, 20.0).orientation_to(reference, 0.0),
            Orientation::Intersect
        );
    }

    #[test]
    fn test_orientation_padding() {
        let reference = Bounds::new(100.0, 100.0, 100.0, 100.0);
        let near_left = Bounds::new(70.0, 120.0, 20.0, 20.0);

        assert_eq!(near_left.orientation_to(reference, 0.0), Orientation::Left);
        assert_eq!(
            near_left.orientation_to(reference, 20.0),
            Orientation::Intersect
        );
    }

    #[test]
    fn test_orientation_components() {
        assert!(Orientation::TopLeft.is_vertical());
        assert!(Orientation::TopLeft.is_horizontal());
        assert!(!Orientation::Left.is_vertical());
        assert!(!Orientation::Intersect.is_horizontal());
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("e".parse::<Direction>(), Ok(Direction::East));
        assert_eq!(Direction::North.axis(), Axis::Y);
        assert!(Direction::West.is_negative());
        assert!(!Direction::South.is_negative());
        assert!("x".parse::<Direction>().is_err());
        assert_eq!(Direction::West.to_string(), "w");
    }

    #[test]
    fn test_segment_intersection_parallel() {
        let hit = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 5.0),
            Point::new(10.0, 5.0),
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn test_segment_intersection_out_of_range() {
        let hit = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, -5.0),
            Point::new(20.0, 5.0),
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn test_path_intersections_with_outline() {
        let outline = Bounds::new(150.0, 110.0, 100.0, 80.0).outline();
        let path = [Point::new(200.0, 150.0), Point::new(400.0, 150.0)];

        let hits = path_intersections(&path, &outline);
        assert_eq!(hits.len(), 1);
        assert_approx_eq!(f32, hits[0].x(), 250.0);
        assert_approx_eq!(f32, hits[0].y(), 150.0);
    }

    #[test]
    fn test_path_intersections_merges_corner_hits() {
        let outline = Bounds::new(0.0, 0.0, 10.0, 10.0).outline();
        let diagonal = [Point::new(5.0, 5.0), Point::new(20.0, 20.0)];

        let hits = path_intersections(&diagonal, &outline);
        assert_eq!(hits.len(), 1);
        assert_approx_eq!(f32, hits[0].x(), 10.0);
    }

    #[test]
    fn test_closest_point_on_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);

        assert_eq!(
            closest_point_on_segment(Point::new(4.0, 3.0), a, b),
            Point::new(4.0, 0.0)
        );
        assert_eq!(closest_point_on_segment(Point::new(-4.0, 3.0), a, b), a);
        assert_eq!(closest_point_on_segment(Point::new(1.0, 1.0), a, a), a);
    }

    #[test]
    fn test_points_aligned() {
        let a = Point::new(0.0, 0.0);
        assert_eq!(points_aligned(a, Point::new(50.0, 1.0), 2.0), Some(Axis::X));
        assert_eq!(points_aligned(a, Point::new(1.5, 50.0), 2.0), Some(Axis::Y));
        assert_eq!(points_aligned(a, Point::new(5.0, 5.0), 2.0), None);
    }
}
