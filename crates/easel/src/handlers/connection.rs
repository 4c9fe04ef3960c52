//! Connection primitives.

use log::debug;

use easel_core::{element::Waypoint, identifier::Id};

use super::{elements, required, slot_parts};
use crate::{
    command::{
        CommandHandler, Context, Scope,
        context::{
            CreateConnectionContext, DeleteConnectionContext, LayoutConnectionContext,
            MoveConnectionContext, ReconnectContext, Reconnection, UpdateWaypointsContext,
        },
        names,
    },
    error::EaselError,
    layout::layout_between,
};

pub(super) struct CreateConnectionHandler;

impl CommandHandler for CreateConnectionHandler {
    fn execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get_mut::<CreateConnectionContext>()?;
        let source = required(ctx.source, names::CONNECTION_CREATE, "source")?;
        let target = required(ctx.target, names::CONNECTION_CREATE, "target")?;
        let parent = required(ctx.parent, names::CONNECTION_CREATE, "parent")?;

        if ctx.connection.waypoints().is_empty() {
            let waypoints = layout_between(
                scope.diagram(),
                scope.services().layouter(),
                source,
                target,
                &[],
                &ctx.hints,
            )?;
            ctx.connection = ctx.connection.clone().with_waypoints(waypoints);
        }

        let id = ctx.connection.id();
        let index = scope.diagram_mut().add_connection(
            ctx.connection.clone(),
            source,
            target,
            parent,
            ctx.parent_index,
        )?;
        ctx.parent_index = Some(index);

        debug!(connection:% = id, source:%, target:%; "Created connection");
        Ok(vec![id, source, target])
    }

    /// Unlinks source and target together with the removal.
    fn revert(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get::<CreateConnectionContext>()?;
        let id = ctx.connection.id();
        let detachment = scope.diagram_mut().remove(id)?;

        let mut dirty = vec![id];
        dirty.extend(detachment.source().map(|slot| slot.owner()));
        dirty.extend(detachment.target().map(|slot| slot.owner()));
        Ok(dirty)
    }
}

pub(super) struct DeleteConnectionHandler;

impl CommandHandler for DeleteConnectionHandler {
    /// Deletes connections that end on this one.
    fn pre_execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
        let connection = context.get::<DeleteConnectionContext>()?.connection;
        loop {
            let element = scope.diagram().element(connection)?;
            let Some(next) = element
                .incoming()
                .first()
                .or_else(|| element.outgoing().first())
                .copied()
            else {
                return Ok(());
            };
            elements::delete_element(scope, next)?;
            if scope.diagram().contains(next) {
                return Err(EaselError::precondition(
                    names::CONNECTION_DELETE,
                    format!("`{next}` survived its deletion"),
                ));
            }
        }
    }

    fn execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get_mut::<DeleteConnectionContext>()?;
        let detachment = scope.diagram_mut().remove(ctx.connection)?;
        ctx.detachment = Some(detachment);

        debug!(connection:% = ctx.connection; "Deleted connection");
        let mut dirty = vec![ctx.connection];
        dirty.extend(detachment.source().map(|slot| slot.owner()));
        dirty.extend(detachment.target().map(|slot| slot.owner()));
        dirty.extend(detachment.parent().map(|slot| slot.owner()));
        Ok(dirty)
    }

    fn revert(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get::<DeleteConnectionContext>()?;
        let detachment = required(ctx.detachment, names::CONNECTION_DELETE, "detachment")?;
        scope.diagram_mut().restore(ctx.connection, &detachment)?;

        let mut dirty = vec![ctx.connection];
        dirty.extend(detachment.source().map(|slot| slot.owner()));
        dirty.extend(detachment.target().map(|slot| slot.owner()));
        Ok(dirty)
    }
}

pub(super) struct MoveConnectionHandler;

impl CommandHandler for MoveConnectionHandler {
    fn execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get_mut::<MoveConnectionContext>()?;
        let diagram = scope.diagram_mut();
        let current_parent = diagram.element(ctx.connection)?.parent();

        ctx.old_parent = None;
        if let Some(new_parent) = ctx.new_parent {
            if current_parent != Some(new_parent) || ctx.new_parent_index.is_some() {
                ctx.old_parent =
                    diagram.set_parent(ctx.connection, Some(new_parent), ctx.new_parent_index)?;
            }
        }

        let moved: Vec<Waypoint> = diagram
            .waypoints(ctx.connection)?
            .iter()
            .map(|waypoint| waypoint.translate(ctx.delta))
            .collect();
        ctx.old_waypoints = diagram.set_waypoints(ctx.connection, moved)?;
        Ok(vec![ctx.connection])
    }

    fn revert(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get::<MoveConnectionContext>()?;
        let diagram = scope.diagram_mut();
        if let Some(slot) = ctx.old_parent {
            diagram.set_parent(ctx.connection, Some(slot.owner()), Some(slot.index()))?;
        }
        diagram.set_waypoints(ctx.connection, ctx.old_waypoints.clone())?;
        Ok(vec![ctx.connection])
    }
}

/// Changes the source or the target of a connection.
pub(super) struct ReconnectConnectionHandler;

impl CommandHandler for ReconnectConnectionHandler {
    fn execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get_mut::<ReconnectContext>()?;
        let command = if ctx.new_source.is_some() {
            names::CONNECTION_RECONNECT_START
        } else {
            names::CONNECTION_RECONNECT_END
        };
        if ctx.new_source.is_some() == ctx.new_target.is_some() {
            return Err(EaselError::precondition(
                command,
                "exactly one of new_source and new_target must be given",
            ));
        }
        let docking = required(ctx.docking.as_ref(), command, "docking")?;

        let diagram = scope.diagram_mut();
        let mut waypoints = diagram.waypoints(ctx.connection)?.to_vec();
        match docking {
            Reconnection::Waypoints(points) => waypoints = points.clone(),
            Reconnection::Docking(point) => {
                let index = if ctx.new_source.is_some() {
                    Some(0)
                } else {
                    waypoints.len().checked_sub(1)
                };
                if let Some(waypoint) = index.and_then(|index| waypoints.get_mut(index)) {
                    *waypoint = Waypoint::new(*point);
                }
            }
        }

        // Path first: a rejected endpoint then only has the path to restore.
        let old_waypoints = diagram.set_waypoints(ctx.connection, waypoints)?;
        let relinked = match (ctx.new_source, ctx.new_target) {
            (Some(source), _) => diagram
                .set_source(ctx.connection, Some(source), None)
                .map(|slot| (source, slot)),
            (None, target) => {
                let target = required(target, command, "new_target")?;
                diagram
                    .set_target(ctx.connection, Some(target), None)
                    .map(|slot| (target, slot))
            }
        };
        let (endpoint, old_slot) = match relinked {
            Ok(relinked) => relinked,
            Err(err) => {
                diagram.set_waypoints(ctx.connection, old_waypoints)?;
                return Err(err.into());
            }
        };
        ctx.old_waypoints = old_waypoints;
        if ctx.new_source.is_some() {
            ctx.old_source = old_slot;
        } else {
            ctx.old_target = old_slot;
        }
        let mut dirty = vec![ctx.connection, endpoint];
        dirty.extend(old_slot.map(|slot| slot.owner()));

        debug!(connection:% = ctx.connection, command; "Reconnected connection");
        Ok(dirty)
    }

    fn revert(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get::<ReconnectContext>()?;
        let diagram = scope.diagram_mut();
        let mut dirty = vec![ctx.connection];
        if ctx.new_source.is_some() {
            let (owner, index) = slot_parts(ctx.old_source);
            diagram.set_source(ctx.connection, owner, index)?;
            dirty.extend(ctx.new_source);
            dirty.extend(owner);
        }
        if ctx.new_target.is_some() {
            let (owner, index) = slot_parts(ctx.old_target);
            diagram.set_target(ctx.connection, owner, index)?;
            dirty.extend(ctx.new_target);
            dirty.extend(owner);
        }
        diagram.set_waypoints(ctx.connection, ctx.old_waypoints.clone())?;
        Ok(dirty)
    }
}

pub(super) struct UpdateWaypointsHandler;

impl CommandHandler for UpdateWaypointsHandler {
    fn execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get_mut::<UpdateWaypointsContext>()?;
        ctx.old_waypoints = scope
            .diagram_mut()
            .set_waypoints(ctx.connection, ctx.new_waypoints.clone())?;
        Ok(vec![ctx.connection])
    }

    fn revert(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get::<UpdateWaypointsContext>()?;
        scope
            .diagram_mut()
            .set_waypoints(ctx.connection, ctx.old_waypoints.clone())?;
        Ok(vec![ctx.connection])
    }
}

/// Recomputes a connection's path with the configured layouter.
///
/// The path is computed once; redo applies the recorded one.
pub(super) struct LayoutConnectionHandler;

impl CommandHandler for LayoutConnectionHandler {
    fn execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get_mut::<LayoutConnectionContext>()?;
        let waypoints = match ctx.new_waypoints.clone() {
            Some(waypoints) => waypoints,
            None => {
                let diagram = scope.diagram();
                let element = diagram.connection(ctx.connection)?;
                let source = required(element.source(), names::CONNECTION_LAYOUT, "source")?;
                let target = required(element.target(), names::CONNECTION_LAYOUT, "target")?;
                let waypoints = layout_between(
                    diagram,
                    scope.services().layouter(),
                    source,
                    target,
                    element.waypoints(),
                    &ctx.hints,
                )?;
                ctx.new_waypoints = Some(waypoints.clone());
                waypoints
            }
        };
        ctx.old_waypoints = scope.diagram_mut().set_waypoints(ctx.connection, waypoints)?;
        Ok(vec![ctx.connection])
    }

    fn revert(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get::<LayoutConnectionContext>()?;
        scope
            .diagram_mut()
            .set_waypoints(ctx.connection, ctx.old_waypoints.clone())?;
        Ok(vec![ctx.connection])
    }
}
