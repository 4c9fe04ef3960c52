//! Snaps the middle segments of laid out connections to the grid.

use log::debug;

use easel_core::{
    element::Waypoint,
    geometry::{Axis, points_aligned},
};

use super::GRID_SNAP_PRIORITY;
use crate::{
    command::{
        CommandStack, Context, Hook, Scope,
        context::{CreateConnectionContext, LayoutConnectionContext},
        names,
    },
    config::GridConfig,
    error::EaselError,
    modeling::Modeling,
};

/// Two points closer than this on one axis form an aligned segment.
const ALIGNED_THRESHOLD: f32 = 2.0;

fn snapped(waypoint: Waypoint, axis: Axis, grid: &GridConfig) -> Waypoint {
    let point = waypoint.point();
    let point = point.with_coord(axis, grid.snap(point.coord(axis)));
    match waypoint.original() {
        Some(original) => Waypoint::with_original(point, original),
        None => Waypoint::new(point),
    }
}

/// Snaps every segment that touches neither end of the path.
///
/// A vertical segment has its x snapped, a horizontal one its y; both of
/// its points move together so it stays straight.
pub fn snap_middle_segments(waypoints: &[Waypoint], grid: &GridConfig) -> Vec<Waypoint> {
    let mut snapped_points = waypoints.to_vec();
    for i in 1..waypoints.len().saturating_sub(2) {
        let (start, end) = (snapped_points[i], snapped_points[i + 1]);
        let axis = match points_aligned(start.point(), end.point(), ALIGNED_THRESHOLD) {
            Some(Axis::Y) => Axis::X,
            Some(Axis::X) => Axis::Y,
            None => continue,
        };
        snapped_points[i] = snapped(start, axis, grid);
        snapped_points[i + 1] = snapped(end, axis, grid);
    }
    snapped_points
}

fn snap_connection(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let (connection, hints) = match context.as_ref::<CreateConnectionContext>() {
        Some(ctx) => (ctx.connection.id(), &ctx.hints),
        None => {
            let ctx = context.get::<LayoutConnectionContext>()?;
            (ctx.connection, &ctx.hints)
        }
    };
    // freshly docked ends are already where they belong
    if hints.has_anchor() {
        return Ok(());
    }
    let Some(element) = scope.diagram().get(connection) else {
        return Ok(());
    };
    let waypoints = element.waypoints();
    if waypoints.len() <= 3 {
        return Ok(());
    }

    let snapped = snap_middle_segments(waypoints, scope.config().grid());
    if snapped.as_slice() == waypoints {
        return Ok(());
    }
    debug!(connection:%; "Snapped connection to grid");
    scope.update_waypoints(connection, snapped)
}

pub(super) fn register(stack: &mut CommandStack) {
    stack.register_listener(
        Hook::PostExecute,
        &[names::CONNECTION_CREATE, names::CONNECTION_LAYOUT],
        GRID_SNAP_PRIORITY,
        snap_connection,
    );
}

#[cfg(test)]
mod tests {
    use easel_core::{element::waypoints_from, geometry::Point};

    use super::*;

    #[test]
    fn test_snaps_middle_segments_only() {
        let grid = GridConfig::new(10.0, true);
        let waypoints = waypoints_from([
            Point::new(3.0, 3.0),
            Point::new(53.0, 3.0),
            Point::new(53.0, 97.0),
            Point::new(103.0, 97.0),
        ]);

        let snapped = snap_middle_segments(&waypoints, &grid);
        assert_eq!(snapped[0].point(), Point::new(3.0, 3.0));
        assert_eq!(snapped[1].point(), Point::new(50.0, 3.0));
        assert_eq!(snapped[2].point(), Point::new(50.0, 97.0));
        assert_eq!(snapped[3].point(), Point::new(103.0, 97.0));
    }

    #[test]
    fn test_short_paths_unchanged() {
        let grid = GridConfig::new(10.0, true);
        let waypoints = waypoints_from([
            Point::new(3.0, 3.0),
            Point::new(53.0, 3.0),
            Point::new(53.0, 97.0),
        ]);
        assert_eq!(snap_middle_segments(&waypoints, &grid), waypoints);
    }
}
