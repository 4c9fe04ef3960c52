//! Cropping connection ends to shape outlines.

use log::trace;

use easel_core::{
    diagram::Diagram,
    element::Waypoint,
    geometry::{Point, path_intersections},
    identifier::Id,
};

use crate::error::EaselError;

/// Where a connection end docks on a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DockingPoint {
    point: Waypoint,
    actual: Point,
    idx: usize,
}

impl DockingPoint {
    pub fn new(point: Waypoint, actual: Point, idx: usize) -> Self {
        Self { point, actual, idx }
    }

    /// The waypoint before cropping.
    pub fn point(&self) -> Waypoint {
        self.point
    }

    /// The cropped position on the shape outline.
    pub fn actual(&self) -> Point {
        self.actual
    }

    /// Index of the docked waypoint in the connection path.
    pub fn idx(&self) -> usize {
        self.idx
    }

    /// The cropped waypoint, remembering its logical position.
    pub fn to_waypoint(&self) -> Waypoint {
        Waypoint::with_original(self.actual, self.point.logical())
    }
}

/// Computes where connections dock on their shapes.
pub trait ConnectionDocking {
    /// Docking point of `connection` on `shape`, at its first waypoint when
    /// `dock_start` is set and at its last otherwise.
    fn docking_point(
        &self,
        diagram: &Diagram,
        connection: Id,
        shape: Id,
        dock_start: bool,
    ) -> Result<DockingPoint, EaselError>;

    /// The path of `connection` with both ends cropped to its source and target.
    fn cropped_waypoints(&self, diagram: &Diagram, connection: Id) -> Result<Vec<Waypoint>, EaselError> {
        let element = diagram.connection(connection)?;
        let waypoints = element.waypoints();
        let (Some(source), Some(target)) = (element.source(), element.target()) else {
            return Ok(waypoints.to_vec());
        };
        let start = self.docking_point(diagram, connection, source, true)?;
        let end = self.docking_point(diagram, connection, target, false)?;

        let mut cropped = Vec::with_capacity(waypoints.len());
        cropped.push(start.to_waypoint());
        if start.idx() + 1 < end.idx() {
            cropped.extend_from_slice(&waypoints[start.idx() + 1..end.idx()]);
        }
        cropped.push(end.to_waypoint());
        Ok(cropped)
    }
}

/// Crops against the rectangular outline of the shape.
///
/// Ends attached to another connection are left where they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct CroppingDocking;

impl ConnectionDocking for CroppingDocking {
    fn docking_point(
        &self,
        diagram: &Diagram,
        connection: Id,
        shape: Id,
        dock_start: bool,
    ) -> Result<DockingPoint, EaselError> {
        let waypoints = diagram.waypoints(connection)?;
        let idx = if dock_start { 0 } else { waypoints.len().saturating_sub(1) };
        let Some(point) = waypoints.get(idx).copied() else {
            return Err(EaselError::precondition(
                "connection.layout",
                format!("connection `{connection}` has no waypoints"),
            ));
        };

        let Some(bounds) = diagram.element(shape)?.bounds() else {
            return Ok(DockingPoint::new(point, point.point(), idx));
        };
        let connection_path: Vec<Point> = waypoints.iter().map(Waypoint::logical).collect();
        let hits = path_intersections(&bounds.outline(), &connection_path);

        let actual = match hits.as_slice() {
            [] => point.point(),
            [hit] => hit.round(),
            _ => {
                return Err(EaselError::AmbiguousDocking {
                    connection,
                    shape,
                    count: hits.len(),
                });
            }
        };
        trace!(connection:%, shape:%, idx, actual:%; "Docked connection end");
        Ok(DockingPoint::new(point, actual, idx))
    }
}

#[cfg(test)]
mod tests {
    use easel_core::{
        element::{Element, waypoints_from},
        geometry::Bounds,
    };

    use super::*;

    fn diagram_with(path: &[Point]) -> Diagram {
        let root = Id::new("Dock_Root");
        let mut diagram = Diagram::new(root, Id::new("Process"));
        for (name, x) in [("Dock_A", 150.0), ("Dock_B", 350.0)] {
            diagram
                .add_shape(
                    Element::shape(Id::new(name), Id::new("Task"), Bounds::new(x, 110.0, 100.0, 80.0)),
                    root,
                    None,
                )
                .expect("added");
        }
        diagram
            .add_connection(
                Element::connection(
                    Id::new("Dock_F"),
                    Id::new("SequenceFlow"),
                    waypoints_from(path.iter().copied()),
                ),
                Id::new("Dock_A"),
                Id::new("Dock_B"),
                root,
                None,
            )
            .expect("connected");
        diagram
    }

    #[test]
    fn test_crops_straight_connection() {
        let diagram = diagram_with(&[Point::new(200.0, 150.0), Point::new(400.0, 150.0)]);
        let cropped = CroppingDocking
            .cropped_waypoints(&diagram, Id::new("Dock_F"))
            .expect("croppable");

        assert_eq!(cropped.len(), 2);
        assert_eq!(cropped[0].point(), Point::new(250.0, 150.0));
        assert_eq!(cropped[0].original(), Some(Point::new(200.0, 150.0)));
        assert_eq!(cropped[1].point(), Point::new(350.0, 150.0));
        assert_eq!(cropped[1].original(), Some(Point::new(400.0, 150.0)));
    }

    #[test]
    fn test_keeps_interior_waypoints() {
        let diagram = diagram_with(&[
            Point::new(200.0, 150.0),
            Point::new(300.0, 150.0),
            Point::new(300.0, 140.0),
            Point::new(400.0, 140.0),
        ]);
        let cropped = CroppingDocking
            .cropped_waypoints(&diagram, Id::new("Dock_F"))
            .expect("croppable");
        assert_eq!(
            cropped.iter().map(Waypoint::point).collect::<Vec<_>>(),
            vec![
                Point::new(250.0, 150.0),
                Point::new(300.0, 150.0),
                Point::new(300.0, 140.0),
                Point::new(350.0, 140.0),
            ]
        );
    }

    #[test]
    fn test_no_intersection_keeps_point() {
        // both ends outside their shapes and the path misses them
        let diagram = diagram_with(&[Point::new(200.0, 50.0), Point::new(400.0, 50.0)]);
        let docking = CroppingDocking
            .docking_point(&diagram, Id::new("Dock_F"), Id::new("Dock_A"), true)
            .expect("dockable");
        assert_eq!(docking.actual(), Point::new(200.0, 50.0));
        assert_eq!(docking.idx(), 0);
    }

    #[test]
    fn test_ambiguous_docking_fails() {
        // the path enters and leaves the target outline
        let diagram = diagram_with(&[
            Point::new(200.0, 150.0),
            Point::new(500.0, 150.0),
            Point::new(500.0, 60.0),
            Point::new(400.0, 60.0),
            Point::new(400.0, 150.0),
        ]);
        let result = CroppingDocking.docking_point(&diagram, Id::new("Dock_F"), Id::new("Dock_B"), false);
        assert!(matches!(
            result,
            Err(EaselError::AmbiguousDocking { count, .. }) if count > 1
        ));
    }
}
