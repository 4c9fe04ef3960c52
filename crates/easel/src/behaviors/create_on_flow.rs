//! Dropping a shape onto a sequence flow splits the flow through the shape.
//!
//! The flow is reconnected to end on the shape where possible; the other
//! half becomes a new connection from the shape to the old target. Flows
//! that would duplicate the new ones are removed.

use log::debug;

use easel_core::{
    element::Waypoint,
    geometry::{Point, closest_point_on_segment},
    identifier::Id,
};

use super::CREATE_ON_FLOW_PRIORITY;
use crate::{
    command::{
        CommandStack, Context, DEFAULT_PRIORITY, Hook, Scope,
        context::{CreateShapeContext, MoveElementsContext, Reconnection},
        names,
    },
    error::EaselError,
    modeling::Modeling,
};

/// Where a point hits a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowIntersection {
    pub point: Point,
    /// Index of the hit waypoint, or of the end of the hit segment.
    pub index: usize,
    /// True if the hit is an existing waypoint.
    pub bendpoint: bool,
}

/// Finds where `reference` touches the path `points`, within `threshold`.
///
/// A waypoint within reach wins. Otherwise the segments within reach are
/// considered: if they all are the same segment, the closest point on it
/// is the hit; if several segments are in reach, the bendpoint between
/// them is.
pub fn approx_intersection(
    points: &[Point],
    reference: Point,
    threshold: f32,
) -> Option<FlowIntersection> {
    if let Some(index) = points
        .iter()
        .position(|point| point.distance(reference) <= threshold)
    {
        return Some(FlowIntersection {
            point: points[index],
            index,
            bendpoint: true,
        });
    }

    let hits: Vec<(usize, Point)> = points
        .windows(2)
        .enumerate()
        .filter_map(|(segment, ends)| {
            let closest = closest_point_on_segment(reference, ends[0], ends[1]);
            (closest.distance(reference) <= threshold).then_some((segment + 1, closest))
        })
        .collect();
    let (first, closest) = *hits.first()?;
    let (last, _) = *hits.last()?;

    if first != last {
        let index = first.max(last) - 1;
        return Some(FlowIntersection {
            point: points[index],
            index,
            bendpoint: true,
        });
    }
    Some(FlowIntersection {
        point: closest.round(),
        index: first,
        bendpoint: false,
    })
}

/// Splits `flow` at `mid` and routes it through `shape`.
fn insert_shape(scope: &mut Scope<'_>, shape: Id, flow: Id, mid: Point) -> Result<(), EaselError> {
    let threshold = scope.config().modeling().flow_intersection_threshold();
    let diagram = scope.diagram();
    let flow_element = diagram.connection(flow)?;
    let waypoints: Vec<Waypoint> = flow_element.waypoints().to_vec();
    let (source, target) = (flow_element.source(), flow_element.target());
    let flow_type = flow_element.type_name();
    let shape_element = diagram.element(shape)?;
    let shape_bounds = diagram.bounds(shape)?;
    let old_incoming = shape_element.incoming().to_vec();
    let old_outgoing = shape_element.outgoing().to_vec();

    let mut split: Option<(Vec<Waypoint>, Vec<Waypoint>)> = None;
    if let Some(hit) = approx_intersection(&flow_element.points(), mid, threshold) {
        let mut before = waypoints[..hit.index].to_vec();
        let mut after = waypoints[hit.index + usize::from(hit.bendpoint)..].to_vec();
        if before.is_empty() || after.is_empty() {
            debug!(flow:%, shape:%; "Drop point is a flow end, not splitting");
            return Ok(());
        }
        let docking = if hit.bendpoint {
            Waypoint::new(waypoints[hit.index].point())
        } else {
            Waypoint::new(mid)
        };
        // waypoints already inside the shape make the docking point redundant
        let inside = |waypoint: &Waypoint| shape_bounds.contains(waypoint.point());
        if before.len() == 1 || !before.last().is_some_and(inside) {
            before.push(docking);
        }
        if after.len() == 1 || !after.first().is_some_and(inside) {
            after.insert(0, docking);
        }
        split = Some((before, after));
    }

    let semantics = scope.services().semantics();
    let end = |id: Option<Id>| id.and_then(|id| diagram.get(id));
    let connects_in = end(source)
        .is_some_and(|source| semantics.can_connect(source, shape_element, flow_type));
    let connects_out = end(target)
        .is_some_and(|target| semantics.can_connect(shape_element, target, flow_type));
    let parent = shape_element.parent();

    let mut incoming = None;
    let mut outgoing = None;
    if connects_in {
        let docking = match &split {
            Some((before, _)) => Reconnection::Waypoints(before.clone()),
            None => Reconnection::Docking(mid),
        };
        scope.reconnect_end(flow, shape, docking)?;
        incoming = Some(flow);
    }
    if connects_out {
        match (incoming, target, parent) {
            (None, _, _) => {
                let docking = match &split {
                    Some((_, after)) => Reconnection::Waypoints(after.clone()),
                    None => Reconnection::Docking(mid),
                };
                scope.reconnect_start(flow, shape, docking)?;
                outgoing = Some(flow);
            }
            (Some(_), Some(target), Some(parent)) => {
                let (diagram, services) = scope.parts();
                let mut connection = services
                    .factory()
                    .create_connection(diagram.ids_mut(), flow_type);
                if let Some((_, after)) = &split {
                    connection = connection.with_waypoints(after.clone());
                }
                outgoing = Some(scope.create_connection(shape, target, connection, parent)?);
            }
            _ => {}
        }
    }
    debug!(flow:%, shape:%, split = split.is_some(); "Inserted shape into flow");

    let diagram = scope.diagram();
    let duplicates: Vec<Id> = old_incoming
        .into_iter()
        .filter(|_| incoming.is_some())
        .filter(|connection| diagram.get(*connection).and_then(|c| c.source()) == source)
        .chain(
            old_outgoing
                .into_iter()
                .filter(|_| outgoing.is_some())
                .filter(|connection| diagram.get(*connection).and_then(|c| c.target()) == target),
        )
        .collect();
    if !duplicates.is_empty() {
        debug!(count = duplicates.len(); "Removing duplicate connections");
        scope.remove_elements(duplicates)?;
    }
    Ok(())
}

fn create_on_flow(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let ctx = context.get_mut::<CreateShapeContext>()?;
    let Some(flow) = ctx.parent.and_then(|parent| scope.diagram().get(parent)) else {
        return Ok(());
    };
    if !flow.is_connection() || !scope.services().semantics().can_insert(&ctx.shape, flow) {
        return Ok(());
    }
    ctx.target_flow = Some(flow.id());
    ctx.parent = flow.parent();
    Ok(())
}

fn insert_created(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let ctx = context.get::<CreateShapeContext>()?;
    let (Some(flow), Some(position)) = (ctx.target_flow, ctx.position) else {
        return Ok(());
    };
    insert_shape(scope, ctx.shape.id(), flow, position.center())
}

/// Replaces a connection as new parent by the connection's own parent and
/// looks for a flow under the moved shape.
fn move_on_flow(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let ctx = context.get_mut::<MoveElementsContext>()?;
    let (Some(shape), Some(mut new_parent)) = (ctx.shapes.first().copied(), ctx.new_parent) else {
        return Ok(());
    };
    let diagram = scope.diagram();
    let parent_element = diagram.element(new_parent)?;
    if parent_element.is_connection() {
        if let Some(parent) = parent_element.parent() {
            new_parent = parent;
            ctx.new_parent = Some(parent);
        }
    }
    if ctx.shapes.len() != 1 {
        return Ok(());
    }

    let threshold = scope.config().modeling().flow_intersection_threshold();
    let semantics = scope.services().semantics();
    let shape_element = diagram.element(shape)?;
    let new_mid = diagram.bounds(shape)?.center().add_point(ctx.delta);
    let flow = diagram
        .element(new_parent)?
        .children()
        .iter()
        .copied()
        .find(|child| {
            diagram.get(*child).is_some_and(|candidate| {
                candidate.is_connection()
                    && semantics.can_insert(shape_element, candidate)
                    && approx_intersection(&candidate.points(), new_mid, threshold).is_some()
            })
        });
    if let Some(flow) = flow {
        debug!(shape:%, flow:%; "Shape dropped on flow");
        ctx.target_flow = Some(flow);
    }
    Ok(())
}

fn insert_moved(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let ctx = context.get::<MoveElementsContext>()?;
    let (Some(flow), Some(shape)) = (ctx.target_flow, ctx.shapes.first().copied()) else {
        return Ok(());
    };
    if !scope.diagram().contains(flow) {
        return Ok(());
    }
    let mid = scope.diagram().bounds(shape)?.center();
    insert_shape(scope, shape, flow, mid)
}

pub(super) fn register(stack: &mut CommandStack) {
    stack.register_listener(
        Hook::PreExecute,
        &[names::SHAPE_CREATE],
        CREATE_ON_FLOW_PRIORITY,
        create_on_flow,
    );
    stack.register_listener(
        Hook::PostExecute,
        &[names::SHAPE_CREATE],
        DEFAULT_PRIORITY,
        insert_created,
    );
    stack.register_listener(
        Hook::PreExecute,
        &[names::ELEMENTS_MOVE, names::SHAPES_MOVE],
        CREATE_ON_FLOW_PRIORITY,
        move_on_flow,
    );
    stack.register_listener(
        Hook::PostExecute,
        &[names::ELEMENTS_MOVE, names::SHAPES_MOVE],
        DEFAULT_PRIORITY,
        insert_moved,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
        ]
    }

    #[test]
    fn test_intersection_on_segment() {
        let hit = approx_intersection(&path(), Point::new(40.4, 6.0), 10.0).expect("hit");
        assert_eq!(hit.point, Point::new(40.0, 0.0));
        assert_eq!(hit.index, 1);
        assert!(!hit.bendpoint);
    }

    #[test]
    fn test_intersection_prefers_waypoints() {
        let hit = approx_intersection(&path(), Point::new(95.0, 4.0), 10.0).expect("hit");
        assert_eq!(hit.index, 1);
        assert!(hit.bendpoint);
    }

    #[test]
    fn test_intersection_near_corner_uses_bendpoint() {
        // within reach of both segments but not of the corner itself
        let hit = approx_intersection(&path(), Point::new(92.0, 8.0), 9.0).expect("hit");
        assert_eq!(hit.point, Point::new(100.0, 0.0));
        assert_eq!(hit.index, 1);
        assert!(hit.bendpoint);
    }

    #[test]
    fn test_no_intersection() {
        assert!(approx_intersection(&path(), Point::new(50.0, 50.0), 10.0).is_none());
    }
}
