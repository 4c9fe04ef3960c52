//! Crops connection ends to the outline of the shapes they connect.

use log::trace;

use easel_core::{element::Waypoint, identifier::Id};

use crate::{
    command::{
        CommandStack, Context, DEFAULT_PRIORITY, Hook, Scope,
        context::{CreateConnectionContext, LayoutConnectionContext, ReconnectContext},
        names,
    },
    error::EaselError,
};

/// Crops the connection of a create or layout command.
///
/// The cropped path is kept in the context and replayed on redo, so
/// docking is computed once per command.
fn crop_connection(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let (connection, cropped) = if context.as_ref::<CreateConnectionContext>().is_some() {
        let ctx = context.get_mut::<CreateConnectionContext>()?;
        (ctx.connection.id(), &mut ctx.cropped)
    } else {
        let ctx = context.get_mut::<LayoutConnectionContext>()?;
        (ctx.connection, &mut ctx.cropped)
    };

    let waypoints = match cropped {
        Some(waypoints) => waypoints.clone(),
        None => {
            let waypoints = scope
                .services()
                .docking()
                .cropped_waypoints(scope.diagram(), connection)?;
            *cropped = Some(waypoints.clone());
            waypoints
        }
    };
    apply(scope, connection, waypoints)
}

/// Crops a reconnected connection. Docking is recomputed on redo from the
/// same reconnected path.
fn crop_reconnected(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let connection = context.get::<ReconnectContext>()?.connection;
    let waypoints = scope
        .services()
        .docking()
        .cropped_waypoints(scope.diagram(), connection)?;
    apply(scope, connection, waypoints)
}

fn apply(scope: &mut Scope<'_>, connection: Id, waypoints: Vec<Waypoint>) -> Result<(), EaselError> {
    trace!(connection:%, count = waypoints.len(); "Cropped connection");
    scope.diagram_mut().set_waypoints(connection, waypoints)?;
    scope.mark_dirty([connection]);
    Ok(())
}

pub(super) fn register(stack: &mut CommandStack) {
    stack.register_listener(
        Hook::Executed,
        &[names::CONNECTION_CREATE, names::CONNECTION_LAYOUT],
        DEFAULT_PRIORITY,
        crop_connection,
    );
    stack.register_listener(
        Hook::Executed,
        &[names::CONNECTION_RECONNECT_START, names::CONNECTION_RECONNECT_END],
        DEFAULT_PRIORITY,
        crop_reconnected,
    );
}
