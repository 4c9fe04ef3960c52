//! Keeps attached shapes on their host.
//!
//! Attachers are deleted with their host, follow it when it moves and keep
//! their relative spot when it is resized. A shape created or moved onto a
//! host is attached to it; an attacher moved away without its host is
//! detached.

use log::debug;

use easel_core::identifier::Id;

use super::{ATTACH_MOVE_PRIORITY, move_along};
use crate::{
    command::{
        CommandStack, Context, DEFAULT_PRIORITY, Hook, Scope,
        context::{
            CreateShapeContext, DeleteShapeContext, MoveElementsContext, MoveShapeContext,
            ResizeShapeContext,
        },
        names,
    },
    error::EaselError,
    layout::anchors,
    modeling::Modeling,
};

fn delete_attachers(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let shape = context.get::<DeleteShapeContext>()?.shape;
    while let Some(attacher) = scope.diagram().element(shape)?.attachers().first().copied() {
        scope.remove_shape(attacher)?;
        if scope.diagram().contains(attacher) {
            return Err(EaselError::precondition(
                names::SHAPE_DELETE,
                format!("attacher `{attacher}` survived its deletion"),
            ));
        }
    }
    if scope.diagram().element(shape)?.host().is_some() {
        scope.update_attachment(shape, None)?;
    }
    Ok(())
}

fn attach_created(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let ctx = context.get::<CreateShapeContext>()?;
    if let Some(host) = ctx.host {
        scope.update_attachment(ctx.shape.id(), Some(host))?;
    }
    Ok(())
}

fn add_moved_attachers(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let ctx = context.get_mut::<MoveElementsContext>()?;
    let closure = scope.diagram().closure(&ctx.shapes);
    let mut attachers: Vec<Id> = Vec::new();
    for id in closure.all_shapes() {
        let Some(element) = scope.diagram().get(*id) else {
            continue;
        };
        attachers.extend(
            element
                .attachers()
                .iter()
                .filter(|attacher| !closure.all_shapes().contains(*attacher)),
        );
    }
    if !attachers.is_empty() {
        debug!(attachers = attachers.len(); "Moving attachers along");
    }
    for attacher in attachers {
        if !ctx.shapes.contains(&attacher) {
            ctx.shapes.push(attacher);
        }
    }
    Ok(())
}

/// Attaches the primary shape to the new host, or detaches attachers that
/// were moved without their host.
fn update_moved_attachments(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let ctx = context.get::<MoveElementsContext>()?;
    if let Some(host) = ctx.new_host {
        if let Some(primary) = ctx.shapes.first().copied() {
            if scope.diagram().element(primary)?.host() != Some(host) {
                scope.update_attachment(primary, Some(host))?;
            }
        }
        return Ok(());
    }

    let closure = scope.diagram().closure(&ctx.shapes);
    let detached: Vec<Id> = ctx
        .shapes
        .iter()
        .copied()
        .filter(|id| {
            scope
                .diagram()
                .get(*id)
                .and_then(|element| element.host())
                .is_some_and(|host| !closure.all_shapes().contains(&host))
        })
        .collect();
    for shape in detached {
        debug!(shape:%; "Detaching shape moved without its host");
        scope.update_attachment(shape, None)?;
    }
    Ok(())
}

fn move_attachers(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let ctx = context.get::<MoveShapeContext>()?;
    if !ctx.hints.recurse {
        return Ok(());
    }
    let attachers = scope.diagram().element(ctx.shape)?.attachers().to_vec();
    move_along(scope, &attachers, ctx.delta)
}

fn keep_attachers_on_resize(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let ctx = context.get::<ResizeShapeContext>()?;
    let Some(old_bounds) = ctx.old_bounds else {
        return Ok(());
    };
    if !ctx.hints.attach_support {
        return Ok(());
    }
    let attachers = scope.diagram().element(ctx.shape)?.attachers().to_vec();
    for attacher in attachers {
        let bounds = scope.diagram().bounds(attacher)?;
        let delta = anchors::new_attach_shape_delta(bounds, old_bounds, ctx.new_bounds);
        if !delta.is_zero() {
            scope.move_shape(attacher, delta, None)?;
        }
    }
    Ok(())
}

pub(super) fn register(stack: &mut CommandStack) {
    stack.register_listener(
        Hook::PreExecute,
        &[names::SHAPE_DELETE],
        DEFAULT_PRIORITY,
        delete_attachers,
    );
    stack.register_listener(
        Hook::PostExecute,
        &[names::SHAPE_CREATE],
        DEFAULT_PRIORITY,
        attach_created,
    );
    stack.register_listener(
        Hook::PreExecute,
        &[names::ELEMENTS_MOVE, names::SHAPES_MOVE],
        ATTACH_MOVE_PRIORITY,
        add_moved_attachers,
    );
    stack.register_listener(
        Hook::PostExecute,
        &[names::ELEMENTS_MOVE, names::SHAPES_MOVE],
        DEFAULT_PRIORITY,
        update_moved_attachments,
    );
    stack.register_listener(
        Hook::PostExecute,
        &[names::SHAPE_MOVE],
        DEFAULT_PRIORITY,
        move_attachers,
    );
    stack.register_listener(
        Hook::PostExecute,
        &[names::SHAPE_RESIZE],
        DEFAULT_PRIORITY,
        keep_attachers_on_resize,
    );
}
