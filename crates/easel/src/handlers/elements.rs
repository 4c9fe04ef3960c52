//! Batch commands over a selection: delete and move.

use log::{debug, trace, warn};

use easel_core::{diagram::Closure, geometry::Point, identifier::Id};

use super::required;
use crate::{
    command::{
        CommandHandler, Context, Scope,
        context::{
            DeleteConnectionContext, DeleteElementsContext, DeleteShapeContext,
            LayoutConnectionContext, MoveConnectionContext, MoveElementsContext, MoveHints,
            MoveShapeContext,
        },
        names,
    },
    error::EaselError,
    layout::{LayoutHints, anchors},
};

/// Deletes `id` with the command matching its kind.
pub(crate) fn delete_element(scope: &mut Scope<'_>, id: Id) -> Result<(), EaselError> {
    if scope.diagram().element(id)?.is_connection() {
        scope.execute(names::CONNECTION_DELETE, DeleteConnectionContext::new(id))?;
    } else {
        scope.execute(names::SHAPE_DELETE, DeleteShapeContext::new(id))?;
    }
    Ok(())
}

/// Re-lays out `connection` with `hints`.
pub(crate) fn layout_connection(
    scope: &mut Scope<'_>,
    connection: Id,
    hints: LayoutHints,
) -> Result<(), EaselError> {
    scope.execute(
        names::CONNECTION_LAYOUT,
        LayoutConnectionContext::new(connection, hints),
    )?;
    Ok(())
}

/// Moves every element of `closure` by `delta`.
///
/// Shapes move one by one without recursion. Connections with both ends
/// moved are translated as a whole; the others are laid out again with
/// the anchors of their moved end. Top-level elements are reparented to
/// `new_parent` unless `primary` already lives there.
pub(crate) fn move_closure(
    scope: &mut Scope<'_>,
    closure: &Closure,
    delta: Point,
    new_parent: Option<Id>,
    primary: Option<Id>,
) -> Result<(), EaselError> {
    let keep_parent = match (primary, new_parent) {
        (Some(primary), Some(new_parent)) => {
            scope.diagram().element(primary)?.parent() == Some(new_parent)
        }
        _ => false,
    };
    let parent_for = |id: &Id| {
        if closure.top_level().contains(id) && !keep_parent {
            new_parent
        } else {
            None
        }
    };
    trace!(
        shapes = closure.all_shapes().len(),
        connections = closure.all_connections().len(),
        delta:%;
        "Moving closure"
    );

    for shape in closure.all_shapes() {
        scope.execute(
            names::SHAPE_MOVE,
            MoveShapeContext::new(*shape, delta)
                .with_parent(parent_for(shape))
                .with_hints(MoveHints::in_closure()),
        )?;
    }

    for connection in closure.all_connections() {
        let element = scope.diagram().element(*connection)?;
        let source = element.source();
        let target = element.target();
        let moved = |end: Option<Id>| end.filter(|id| closure.all_shapes().contains(id));
        let (source_moved, target_moved) = (moved(source), moved(target));

        if closure.enclosed_connections().contains(connection)
            && source_moved.is_some()
            && target_moved.is_some()
        {
            scope.execute(
                names::CONNECTION_MOVE,
                MoveConnectionContext::new(*connection, delta, parent_for(connection)),
            )?;
            continue;
        }

        let waypoints = scope.diagram().waypoints(*connection)?;
        let start = match source_moved {
            Some(source) => {
                anchors::moved_source_anchor(waypoints, scope.diagram().bounds(source)?, delta)
            }
            None => None,
        };
        let end = match target_moved {
            Some(target) => {
                anchors::moved_target_anchor(waypoints, scope.diagram().bounds(target)?, delta)
            }
            None => None,
        };
        layout_connection(
            scope,
            *connection,
            LayoutHints::default().with_start(start).with_end(end),
        )?;
    }
    Ok(())
}

/// Deletes a selection. Elements already gone are skipped.
pub(super) struct DeleteElementsHandler;

impl CommandHandler for DeleteElementsHandler {
    fn execute(&self, _context: &mut Context, _scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        Ok(Vec::new())
    }

    fn post_execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
        let elements = context.get::<DeleteElementsContext>()?.elements.clone();
        for id in elements {
            let Some(element) = scope.diagram().get(id) else {
                trace!(id:%; "Element already deleted");
                continue;
            };
            if element.is_root() {
                warn!(id:%; "Refusing to delete a root");
                continue;
            }
            delete_element(scope, id)?;
        }
        Ok(())
    }
}

/// Moves a selection together with everything it contains.
pub(super) struct MoveElementsHandler;

impl CommandHandler for MoveElementsHandler {
    fn pre_execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
        let ctx = context.get_mut::<MoveElementsContext>()?;
        let closure = scope.diagram().closure(&ctx.shapes);
        debug!(
            selected = ctx.shapes.len(),
            closure = closure.enclosed_elements().len();
            "Computed move closure"
        );
        ctx.closure = Some(closure);
        Ok(())
    }

    fn execute(&self, _context: &mut Context, _scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        Ok(Vec::new())
    }

    fn post_execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
        let ctx = context.get::<MoveElementsContext>()?;
        let closure = required(ctx.closure.as_ref(), names::ELEMENTS_MOVE, "closure")?;
        move_closure(
            scope,
            closure,
            ctx.delta,
            ctx.new_parent,
            ctx.shapes.first().copied(),
        )
    }
}
