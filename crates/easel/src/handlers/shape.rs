//! Shape primitives: create, delete, move, resize and append.

use log::debug;

use easel_core::{
    element::Element,
    geometry::Bounds,
    identifier::Id,
};

use super::{elements, required};
use crate::{
    command::{
        CommandHandler, Context, Scope,
        context::{
            AppendShapeContext, CreateConnectionContext, CreateShapeContext, DeleteShapeContext,
            MoveShapeContext, Placement, ResizeShapeContext,
        },
        names,
    },
    error::EaselError,
    layout::{LayoutHints, anchors},
};

/// Bounds of a shape of `size` placed at `position`.
///
/// A center point keeps the size and centers on it, rounding the half
/// extents; explicit bounds are taken as they are.
pub(crate) fn placed_bounds(current: Bounds, position: Placement) -> Bounds {
    match position {
        Placement::Center(center) => Bounds::new(
            center.x() - (current.width() / 2.0).round(),
            center.y() - (current.height() / 2.0).round(),
            current.width(),
            current.height(),
        ),
        Placement::Bounds(bounds) => bounds,
    }
}

/// Removes the first related element returned by `next` until there is none left.
fn save_clear(
    scope: &mut Scope<'_>,
    owner: Id,
    next: impl Fn(&Element) -> Option<Id>,
) -> Result<(), EaselError> {
    while let Some(id) = next(scope.diagram().element(owner)?) {
        elements::delete_element(scope, id)?;
        if scope.diagram().contains(id) {
            return Err(EaselError::precondition(
                names::SHAPE_DELETE,
                format!("`{id}` survived its deletion"),
            ));
        }
    }
    Ok(())
}

pub(super) struct CreateShapeHandler;

impl CommandHandler for CreateShapeHandler {
    fn execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get_mut::<CreateShapeContext>()?;
        let parent = required(ctx.parent, names::SHAPE_CREATE, "parent")?;
        let position = required(ctx.position, names::SHAPE_CREATE, "position")?;

        let bounds = placed_bounds(ctx.shape.bounds().unwrap_or_default(), position);
        let shape = ctx.shape.clone().with_bounds(bounds);
        let id = shape.id();
        let index = scope.diagram_mut().add_shape(shape, parent, ctx.parent_index)?;
        ctx.parent_index = Some(index);

        debug!(shape:% = id, parent:%, bounds:%; "Created shape");
        Ok(vec![id, parent])
    }

    fn revert(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get::<CreateShapeContext>()?;
        let id = ctx.shape.id();
        let detachment = scope.diagram_mut().remove(id)?;
        let mut dirty = vec![id];
        dirty.extend(detachment.parent().map(|slot| slot.owner()));
        Ok(dirty)
    }
}

pub(super) struct DeleteShapeHandler;

impl CommandHandler for DeleteShapeHandler {
    /// Deletes connections first, then children, so the shape is free to go.
    fn pre_execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
        let shape = context.get::<DeleteShapeContext>()?.shape;
        save_clear(scope, shape, |element| {
            element
                .incoming()
                .first()
                .or_else(|| element.outgoing().first())
                .copied()
        })?;
        save_clear(scope, shape, |element| element.children().first().copied())
    }

    fn execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get_mut::<DeleteShapeContext>()?;
        let detachment = scope.diagram_mut().remove(ctx.shape)?;
        ctx.detachment = Some(detachment);

        debug!(shape:% = ctx.shape; "Deleted shape");
        let mut dirty = vec![ctx.shape];
        dirty.extend(detachment.parent().map(|slot| slot.owner()));
        Ok(dirty)
    }

    fn revert(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get::<DeleteShapeContext>()?;
        let detachment = required(ctx.detachment, names::SHAPE_DELETE, "detachment")?;
        scope.diagram_mut().restore(ctx.shape, &detachment)?;

        let mut dirty = vec![ctx.shape];
        dirty.extend(detachment.parent().map(|slot| slot.owner()));
        Ok(dirty)
    }
}

pub(super) struct MoveShapeHandler;

impl CommandHandler for MoveShapeHandler {
    fn execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get_mut::<MoveShapeContext>()?;
        let diagram = scope.diagram_mut();
        let current_parent = diagram.element(ctx.shape)?.parent();

        ctx.old_parent = None;
        if let Some(new_parent) = ctx.new_parent {
            if current_parent != Some(new_parent) || ctx.new_parent_index.is_some() {
                ctx.old_parent =
                    diagram.set_parent(ctx.shape, Some(new_parent), ctx.new_parent_index)?;
            }
        }

        let bounds = diagram.bounds(ctx.shape)?;
        ctx.old_bounds = Some(diagram.set_bounds(ctx.shape, bounds.translate(ctx.delta))?);

        let mut dirty = vec![ctx.shape];
        dirty.extend(ctx.old_parent.map(|slot| slot.owner()));
        dirty.extend(ctx.new_parent);
        Ok(dirty)
    }

    fn post_execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
        let ctx = context.get::<MoveShapeContext>()?;
        let (shape, delta, hints) = (ctx.shape, ctx.delta, ctx.hints);
        let element = scope.diagram().element(shape)?;
        let bounds = scope.diagram().bounds(shape)?;
        let incoming = element.incoming().to_vec();
        let outgoing = element.outgoing().to_vec();
        let children = element.children().to_vec();

        if hints.layout {
            for connection in incoming {
                let end = anchors::moved_target_anchor(
                    scope.diagram().waypoints(connection)?,
                    bounds,
                    delta,
                );
                elements::layout_connection(scope, connection, LayoutHints::default().with_end(end))?;
            }
            for connection in outgoing {
                let start = anchors::moved_source_anchor(
                    scope.diagram().waypoints(connection)?,
                    bounds,
                    delta,
                );
                elements::layout_connection(
                    scope,
                    connection,
                    LayoutHints::default().with_start(start),
                )?;
            }
        }

        if hints.recurse && !children.is_empty() {
            let closure = scope.diagram().closure(&children);
            elements::move_closure(scope, &closure, delta, None, None)?;
        }
        Ok(())
    }

    fn revert(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get::<MoveShapeContext>()?;
        let diagram = scope.diagram_mut();
        let mut dirty = vec![ctx.shape];
        if let Some(slot) = ctx.old_parent {
            diagram.set_parent(ctx.shape, Some(slot.owner()), Some(slot.index()))?;
            dirty.push(slot.owner());
        }
        let old_bounds = required(ctx.old_bounds, names::SHAPE_MOVE, "old_bounds")?;
        diagram.set_bounds(ctx.shape, old_bounds)?;
        Ok(dirty)
    }
}

pub(super) struct ResizeShapeHandler;

impl CommandHandler for ResizeShapeHandler {
    fn execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get_mut::<ResizeShapeContext>()?;
        let min = ctx
            .min_size
            .unwrap_or_else(|| scope.config().modeling().min_shape_size());
        if ctx.new_bounds.width() < min.width() || ctx.new_bounds.height() < min.height() {
            return Err(EaselError::precondition(
                names::SHAPE_RESIZE,
                format!(
                    "`{}` cannot be smaller than {}x{}, requested {}",
                    ctx.shape,
                    min.width(),
                    min.height(),
                    ctx.new_bounds
                ),
            ));
        }

        ctx.old_bounds = Some(scope.diagram_mut().set_bounds(ctx.shape, ctx.new_bounds)?);
        Ok(vec![ctx.shape])
    }

    /// Re-lays out connections so their anchors keep their relative position.
    fn post_execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
        let ctx = context.get::<ResizeShapeContext>()?;
        if !ctx.hints.layout {
            return Ok(());
        }
        let shape = ctx.shape;
        let new_bounds = ctx.new_bounds;
        let old_bounds = required(ctx.old_bounds, names::SHAPE_RESIZE, "old_bounds")?;

        let element = scope.diagram().element(shape)?;
        let incoming = element.incoming().to_vec();
        let outgoing = element.outgoing().to_vec();
        for connection in incoming {
            let end = anchors::resized_target_anchor(
                scope.diagram().waypoints(connection)?,
                new_bounds,
                old_bounds,
            );
            elements::layout_connection(scope, connection, LayoutHints::default().with_end(end))?;
        }
        for connection in outgoing {
            let start = anchors::resized_source_anchor(
                scope.diagram().waypoints(connection)?,
                new_bounds,
                old_bounds,
            );
            elements::layout_connection(scope, connection, LayoutHints::default().with_start(start))?;
        }
        Ok(())
    }

    fn revert(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get::<ResizeShapeContext>()?;
        let old_bounds = required(ctx.old_bounds, names::SHAPE_RESIZE, "old_bounds")?;
        scope.diagram_mut().set_bounds(ctx.shape, old_bounds)?;
        Ok(vec![ctx.shape])
    }
}

/// Creates a shape next to `source` and connects the two.
pub(super) struct AppendShapeHandler;

impl CommandHandler for AppendShapeHandler {
    fn pre_execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
        let ctx = context.get_mut::<AppendShapeContext>()?;
        let source = required(ctx.source, names::SHAPE_APPEND, "source")?;
        let target = match ctx.target {
            Some(target) => target,
            None => required(
                scope.diagram().element(source)?.parent(),
                names::SHAPE_APPEND,
                "target",
            )?,
        };
        ctx.target = Some(target);

        let create = if ctx.attach {
            let host_parent = required(
                scope.diagram().element(target)?.parent(),
                names::SHAPE_APPEND,
                "target",
            )?;
            CreateShapeContext::new(ctx.shape.clone(), ctx.position, host_parent).with_host(target)
        } else {
            CreateShapeContext::new(ctx.shape.clone(), ctx.position, target)
        };
        scope.execute(names::SHAPE_CREATE, create)?;
        Ok(())
    }

    fn execute(&self, _context: &mut Context, _scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        Ok(Vec::new())
    }

    /// Connects source and new shape unless a connection between them exists.
    fn post_execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
        let ctx = context.get_mut::<AppendShapeContext>()?;
        let source = required(ctx.source, names::SHAPE_APPEND, "source")?;
        let shape = ctx.shape.id();

        let diagram = scope.diagram();
        let connected = diagram
            .element(source)?
            .outgoing()
            .iter()
            .any(|connection| diagram.get(*connection).and_then(Element::target) == Some(shape));
        if connected {
            debug!(source:%, shape:%; "Appended shape already connected");
            return Ok(());
        }

        let parent = match ctx.connection_parent {
            Some(parent) => parent,
            None => required(diagram.element(source)?.parent(), names::SHAPE_APPEND, "connection_parent")?,
        };
        let connection = match &ctx.connection {
            Some(connection) => connection.clone(),
            None => {
                let (diagram, services) = scope.parts();
                let connection_type = services
                    .semantics()
                    .connection_type(diagram.element(source)?, diagram.element(shape)?);
                services
                    .factory()
                    .create_connection(diagram.ids_mut(), connection_type)
            }
        };
        ctx.connection = Some(connection.clone());
        ctx.connection_parent = Some(parent);

        scope.execute(
            names::CONNECTION_CREATE,
            CreateConnectionContext::new(connection, source, shape, parent),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use easel_core::geometry::Point;

    use super::*;

    #[test]
    fn test_placed_bounds_centers_and_rounds() {
        let current = Bounds::new(0.0, 0.0, 36.0, 25.0);
        let placed = placed_bounds(current, Placement::Center(Point::new(100.0, 100.0)));
        assert_eq!(placed, Bounds::new(82.0, 87.0, 36.0, 25.0));

        let explicit = Bounds::new(5.0, 6.0, 7.0, 8.0);
        assert_eq!(placed_bounds(current, Placement::Bounds(explicit)), explicit);
    }
}
