//! `spaceTool`: makes or removes room by moving and stretching shapes.

use indexmap::IndexSet;
use log::debug;

use easel_core::{
    diagram::Diagram,
    geometry::{Axis, Bounds, Direction, Point},
    identifier::Id,
};

use crate::{
    command::{
        CommandHandler, Context, Scope,
        context::{MoveElementsContext, ResizeHints, ResizeShapeContext, SpaceToolContext},
        names,
    },
    error::EaselError,
};

/// Shapes affected by a space tool operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjustments {
    pub moving_shapes: Vec<Id>,
    pub resizing_shapes: Vec<Id>,
}

/// Grows or shrinks `bounds` on the edge facing `direction` by `delta`.
pub fn resize_bounds(bounds: Bounds, direction: Direction, delta: Point) -> Bounds {
    let (x, y, width, height) = (bounds.x(), bounds.y(), bounds.width(), bounds.height());
    match direction {
        Direction::North => Bounds::new(x, y + delta.y(), width, height - delta.y()),
        Direction::South => Bounds::new(x, y, width, height + delta.y()),
        Direction::East => Bounds::new(x, y, width + delta.x(), height),
        Direction::West => Bounds::new(x + delta.x(), y, width - delta.x(), height),
    }
}

/// Splits `elements` at `start` on `axis` into shapes to move and shapes to stretch.
///
/// With a positive `delta`, shapes starting after the line move; with a
/// negative one, shapes ending before it do. Shapes crossing the line are
/// resized. Labels of moving shapes move with them, and so do their
/// attachers. Roots, labels, connections and attached shapes are never
/// picked on their own.
pub fn calculate_adjustments(
    diagram: &Diagram,
    elements: &[Id],
    axis: Axis,
    delta: f32,
    start: f32,
) -> Adjustments {
    let mut moving: IndexSet<Id> = IndexSet::new();
    let mut resizing: IndexSet<Id> = IndexSet::new();

    for id in elements {
        let Some(element) = diagram.get(*id) else {
            continue;
        };
        if element.is_root() || element.is_label() || element.is_connection() || element.host().is_some() {
            continue;
        }
        let Some(bounds) = element.bounds() else {
            continue;
        };
        let (shape_start, shape_end) = (bounds.start(axis), bounds.end(axis));

        if (delta > 0.0 && shape_start > start) || (delta < 0.0 && shape_end < start) {
            moving.insert(*id);
            moving.extend(element.labels().iter().copied());
        } else if shape_start < start && shape_end > start {
            resizing.insert(*id);
        }
    }

    let hosts: Vec<Id> = moving.iter().copied().collect();
    for host in hosts {
        let Some(element) = diagram.get(host) else {
            continue;
        };
        for attacher in element.attachers() {
            moving.insert(*attacher);
            if let Some(attacher) = diagram.get(*attacher) {
                moving.extend(attacher.labels().iter().copied());
            }
        }
    }

    Adjustments {
        moving_shapes: moving.into_iter().collect(),
        resizing_shapes: resizing.into_iter().collect(),
    }
}

pub(super) struct SpaceToolHandler;

impl CommandHandler for SpaceToolHandler {
    fn pre_execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
        let ctx = context.get::<SpaceToolContext>()?;
        debug!(
            moving = ctx.moving_shapes.len(),
            resizing = ctx.resizing_shapes.len(),
            delta:% = ctx.delta,
            direction:% = ctx.direction;
            "Applying space tool"
        );
        let (shapes, direction, delta) = (ctx.resizing_shapes.clone(), ctx.direction, ctx.delta);

        for shape in shapes {
            let bounds = resize_bounds(scope.diagram().bounds(shape)?, direction, delta);
            let mut resize = ResizeShapeContext::new(shape, bounds);
            resize.hints = ResizeHints {
                layout: true,
                attach_support: false,
            };
            scope.execute(names::SHAPE_RESIZE, resize)?;
        }
        Ok(())
    }

    fn execute(&self, _context: &mut Context, _scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        Ok(Vec::new())
    }

    fn post_execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
        let ctx = context.get::<SpaceToolContext>()?;
        if ctx.moving_shapes.is_empty() {
            return Ok(());
        }
        scope.execute(
            names::ELEMENTS_MOVE,
            MoveElementsContext::new(ctx.moving_shapes.clone(), ctx.delta),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::element::Element;

    #[test]
    fn test_resize_bounds() {
        let bounds = Bounds::new(100.0, 100.0, 200.0, 100.0);
        let delta = Point::new(20.0, 30.0);
        assert_eq!(
            resize_bounds(bounds, Direction::North, delta),
            Bounds::new(100.0, 130.0, 200.0, 70.0)
        );
        assert_eq!(
            resize_bounds(bounds, Direction::South, delta),
            Bounds::new(100.0, 100.0, 200.0, 130.0)
        );
        assert_eq!(
            resize_bounds(bounds, Direction::East, delta),
            Bounds::new(100.0, 100.0, 220.0, 100.0)
        );
        assert_eq!(
            resize_bounds(bounds, Direction::West, delta),
            Bounds::new(120.0, 100.0, 180.0, 100.0)
        );
    }

    #[test]
    fn test_calculate_adjustments() {
        let root = Id::new("Root");
        let mut diagram = Diagram::new(root, Id::new("Process"));
        let boxes = [
            ("Left", 0.0, 100.0),
            ("Crossing", 150.0, 200.0),
            ("Right", 400.0, 100.0),
            ("Boundary", 410.0, 40.0),
        ];
        for (name, x, width) in boxes {
            diagram
                .add_shape(
                    Element::shape(Id::new(name), Id::new("Task"), Bounds::new(x, 0.0, width, 80.0)),
                    root,
                    None,
                )
                .expect("added");
        }
        diagram
            .set_host(Id::new("Boundary"), Some(Id::new("Right")), None)
            .expect("attached");

        let ids: Vec<Id> = diagram.elements().map(|element| element.id()).collect();
        let adjustments = calculate_adjustments(&diagram, &ids, Axis::X, 50.0, 200.0);
        assert_eq!(adjustments.moving_shapes, vec![Id::new("Right"), Id::new("Boundary")]);
        assert_eq!(adjustments.resizing_shapes, vec![Id::new("Crossing")]);

        let shrinking = calculate_adjustments(&diagram, &ids, Axis::X, -50.0, 200.0);
        assert_eq!(shrinking.moving_shapes, vec![Id::new("Left")]);
    }
}
