//! Anchor points of connection ends after their shape changed.
//!
//! Anchors are always derived from the logical (uncropped) position of the
//! end waypoint, so repeated moves do not drift towards the outline.

use easel_core::{
    element::Waypoint,
    geometry::{Bounds, Orientation, Point},
};

/// Maps `point` from `old_bounds` into `new_bounds`, keeping its relative
/// offset from the center.
///
/// ```
/// # use easel_core::geometry::{Bounds, Point};
/// # use easel::layout::anchors::get_new_attach_point;
/// let old = Bounds::new(0.0, 0.0, 100.0, 100.0);
/// let new = Bounds::new(0.0, 0.0, 200.0, 100.0);
/// let moved = get_new_attach_point(Point::new(100.0, 50.0), old, new);
/// assert_eq!(moved, Point::new(200.0, 50.0));
/// ```
pub fn get_new_attach_point(point: Point, old_bounds: Bounds, new_bounds: Bounds) -> Point {
    let old_center = old_bounds.center();
    let new_center = new_bounds.center();
    let offset = point.sub_point(old_center);
    let scale = |new: f32, old: f32| if old == 0.0 { 1.0 } else { new / old };
    let scaled = Point::new(
        offset.x() * scale(new_bounds.width(), old_bounds.width()),
        offset.y() * scale(new_bounds.height(), old_bounds.height()),
    );
    new_center.add_point(scaled).round()
}

/// Delta that keeps an attached shape at the same relative spot on its
/// host after the host changed from `old_bounds` to `new_bounds`.
pub fn new_attach_shape_delta(shape: Bounds, old_bounds: Bounds, new_bounds: Bounds) -> Point {
    let center = shape.center();
    get_new_attach_point(center, old_bounds, new_bounds).sub_point(center)
}

/// Source anchor of a connection whose source moved by `delta`.
pub fn moved_source_anchor(waypoints: &[Waypoint], source: Bounds, delta: Point) -> Option<Point> {
    let old_bounds = source.translate(delta.scale(-1.0));
    waypoints
        .first()
        .map(|anchor| get_new_attach_point(anchor.logical(), old_bounds, source))
}

/// Target anchor of a connection whose target moved by `delta`.
pub fn moved_target_anchor(waypoints: &[Waypoint], target: Bounds, delta: Point) -> Option<Point> {
    let old_bounds = target.translate(delta.scale(-1.0));
    waypoints
        .last()
        .map(|anchor| get_new_attach_point(anchor.logical(), old_bounds, target))
}

/// Source anchor of a connection whose source was resized.
///
/// If some waypoints now lie inside the source, the last of them becomes
/// the anchor.
pub fn resized_source_anchor(
    waypoints: &[Waypoint],
    source: Bounds,
    old_bounds: Bounds,
) -> Option<Point> {
    let inside: Vec<Point> = waypoints_inside(waypoints, source);
    if let Some(last) = inside.last() {
        return Some(*last);
    }
    waypoints
        .first()
        .map(|anchor| get_new_attach_point(anchor.logical(), old_bounds, source))
}

/// Target anchor of a connection whose target was resized.
///
/// If some waypoints now lie inside the target, the first of them becomes
/// the anchor.
pub fn resized_target_anchor(
    waypoints: &[Waypoint],
    target: Bounds,
    old_bounds: Bounds,
) -> Option<Point> {
    let inside: Vec<Point> = waypoints_inside(waypoints, target);
    if let Some(first) = inside.first() {
        return Some(*first);
    }
    waypoints
        .last()
        .map(|anchor| get_new_attach_point(anchor.logical(), old_bounds, target))
}

fn waypoints_inside(waypoints: &[Waypoint], bounds: Bounds) -> Vec<Point> {
    waypoints
        .iter()
        .map(Waypoint::logical)
        .filter(|point| {
            let probe = Bounds::new(point.x(), point.y(), 0.0, 0.0);
            bounds.orientation_to(probe, 1.0) == Orientation::Intersect
        })
        .collect()
}
