//! Orthogonal connection routing.

use log::trace;

use easel_core::{
    element::{Waypoint, waypoints_from},
    geometry::{Orientation, Point, points_aligned},
};

use super::{LayoutRequest, Layouter};

/// Points closer than this on one axis count as aligned.
const ALIGNED_THRESHOLD: f32 = 2.0;

/// Routes connections along horizontal and vertical segments.
///
/// Side by side shapes are joined horizontally with a vertical jog halfway,
/// stacked shapes vertically, and diagonal ones with a single bend. Routes
/// with more than `max_bends` bends fall back to a straight line.
#[derive(Debug, Clone, Copy)]
pub struct ManhattanLayouter {
    max_bends: usize,
}

impl ManhattanLayouter {
    pub fn new(max_bends: usize) -> Self {
        Self { max_bends }
    }

    pub fn max_bends(&self) -> usize {
        self.max_bends
    }
}

impl Default for ManhattanLayouter {
    fn default() -> Self {
        Self::new(2)
    }
}

impl Layouter for ManhattanLayouter {
    fn layout(&self, request: &LayoutRequest<'_>) -> Vec<Waypoint> {
        let start = request.start();
        let end = request.end();
        let orientation = request.source.orientation_to(request.target, 0.0);

        let mut points = match orientation {
            Orientation::Intersect => vec![start, end],
            Orientation::Left | Orientation::Right => connect_horizontal(start, end),
            Orientation::Top | Orientation::Bottom => connect_vertical(start, end),
            _ => connect_diagonal(start, end),
        };
        if points.len().saturating_sub(2) > self.max_bends {
            points = vec![start, end];
        }
        points.dedup();

        trace!(orientation:?, bends = points.len().saturating_sub(2); "Manhattan route");
        waypoints_from(points)
    }
}

fn connect_horizontal(a: Point, b: Point) -> Vec<Point> {
    if points_aligned(a, b, ALIGNED_THRESHOLD).is_some() {
        return vec![a, b];
    }
    let mid_x = ((b.x() - a.x()) / 2.0 + a.x()).round();
    vec![a, Point::new(mid_x, a.y()), Point::new(mid_x, b.y()), b]
}

fn connect_vertical(a: Point, b: Point) -> Vec<Point> {
    if points_aligned(a, b, ALIGNED_THRESHOLD).is_some() {
        return vec![a, b];
    }
    let mid_y = ((b.y() - a.y()) / 2.0 + a.y()).round();
    vec![a, Point::new(a.x(), mid_y), Point::new(b.x(), mid_y), b]
}

fn connect_diagonal(a: Point, b: Point) -> Vec<Point> {
    if points_aligned(a, b, ALIGNED_THRESHOLD).is_some() {
        return vec![a, b];
    }
    vec![a, Point::new(b.x(), a.y()), b]
}

#[cfg(test)]
mod tests {
    use easel_core::geometry::Bounds;

    use super::*;
    use crate::layout::LayoutHints;

    fn route(layouter: ManhattanLayouter, source: Bounds, target: Bounds) -> Vec<Point> {
        let hints = LayoutHints::default();
        let request = LayoutRequest {
            source,
            target,
            waypoints: &[],
            hints: &hints,
        };
        layouter.layout(&request).iter().map(Waypoint::point).collect()
    }

    #[test]
    fn test_side_by_side_aligned_is_straight() {
        let points = route(
            ManhattanLayouter::default(),
            Bounds::new(100.0, 100.0, 100.0, 80.0),
            Bounds::new(300.0, 100.0, 100.0, 80.0),
        );
        assert_eq!(points, vec![Point::new(150.0, 140.0), Point::new(350.0, 140.0)]);
    }

    #[test]
    fn test_side_by_side_offset_jogs_halfway() {
        let points = route(
            ManhattanLayouter::default(),
            Bounds::new(100.0, 100.0, 100.0, 80.0),
            Bounds::new(300.0, 150.0, 100.0, 80.0),
        );
        assert_eq!(
            points,
            vec![
                Point::new(150.0, 140.0),
                Point::new(250.0, 140.0),
                Point::new(250.0, 190.0),
                Point::new(350.0, 190.0),
            ]
        );
    }

    #[test]
    fn test_stacked_routes_vertically() {
        let points = route(
            ManhattanLayouter::default(),
            Bounds::new(100.0, 100.0, 100.0, 80.0),
            Bounds::new(130.0, 300.0, 100.0, 80.0),
        );
        assert_eq!(
            points,
            vec![
                Point::new(150.0, 140.0),
                Point::new(150.0, 240.0),
                Point::new(180.0, 240.0),
                Point::new(180.0, 340.0),
            ]
        );
    }

    #[test]
    fn test_diagonal_single_bend() {
        let points = route(
            ManhattanLayouter::default(),
            Bounds::new(100.0, 100.0, 100.0, 80.0),
            Bounds::new(400.0, 400.0, 100.0, 80.0),
        );
        assert_eq!(
            points,
            vec![
                Point::new(150.0, 140.0),
                Point::new(450.0, 140.0),
                Point::new(450.0, 440.0),
            ]
        );
    }

    #[test]
    fn test_bend_limit_falls_back_to_straight() {
        let points = route(
            ManhattanLayouter::new(1),
            Bounds::new(100.0, 100.0, 100.0, 80.0),
            Bounds::new(300.0, 150.0, 100.0, 80.0),
        );
        assert_eq!(points, vec![Point::new(150.0, 140.0), Point::new(350.0, 190.0)]);
    }

    #[test]
    fn test_overlapping_shapes_are_straight() {
        let points = route(
            ManhattanLayouter::default(),
            Bounds::new(100.0, 100.0, 100.0, 80.0),
            Bounds::new(150.0, 120.0, 100.0, 80.0),
        );
        assert_eq!(points, vec![Point::new(150.0, 140.0), Point::new(200.0, 160.0)]);
    }
}
