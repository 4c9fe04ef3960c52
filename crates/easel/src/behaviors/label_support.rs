//! Keeps external labels with the element they annotate.
//!
//! Labels are deleted together with their target and follow it when it
//! moves. Deleting a label on its own unlinks it from its target first;
//! undo links it again at the same index.

use log::{debug, trace};

use easel_core::identifier::Id;

use super::{LABEL_MOVE_PRIORITY, move_along};
use crate::{
    command::{
        CommandStack, Context, DEFAULT_PRIORITY, Hook, Scope,
        context::{DeleteConnectionContext, DeleteShapeContext, MoveElementsContext, MoveShapeContext},
        names,
    },
    error::EaselError,
    modeling::Modeling,
};

fn deleted_element(context: &Context) -> Option<Id> {
    context
        .as_ref::<DeleteShapeContext>()
        .map(|ctx| ctx.shape)
        .or_else(|| context.as_ref::<DeleteConnectionContext>().map(|ctx| ctx.connection))
}

fn delete_labels(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let Some(id) = deleted_element(context) else {
        return Ok(());
    };
    let labels = scope.diagram().element(id)?.labels().to_vec();
    for label in labels {
        if scope.diagram().contains(label) {
            trace!(label:%, target:% = id; "Deleting label with its target");
            scope.remove_shape(label)?;
        }
    }
    Ok(())
}

/// Unlinks a label right before it is removed.
fn unlink_label(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let ctx = context.get_mut::<DeleteShapeContext>()?;
    if !scope.diagram().element(ctx.shape)?.is_label() {
        return Ok(());
    }
    ctx.label_target = scope.diagram_mut().set_label_target(ctx.shape, None, None)?;
    scope.mark_dirty(ctx.label_target.map(|slot| slot.owner()));
    Ok(())
}

fn relink_label(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let ctx = context.get::<DeleteShapeContext>()?;
    if let Some(slot) = ctx.label_target {
        scope
            .diagram_mut()
            .set_label_target(ctx.shape, Some(slot.owner()), Some(slot.index()))?;
        scope.mark_dirty([slot.owner()]);
    }
    Ok(())
}

/// Adds the labels of everything moved to the moved shapes.
fn add_moved_labels(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let ctx = context.get_mut::<MoveElementsContext>()?;
    let closure = scope.diagram().closure(&ctx.shapes);
    let mut added = 0;
    for id in closure.enclosed_elements() {
        let Some(element) = scope.diagram().get(*id) else {
            continue;
        };
        for label in element.labels() {
            if !ctx.shapes.contains(label) && !closure.enclosed_elements().contains(label) {
                ctx.shapes.push(*label);
                added += 1;
            }
        }
    }
    if added > 0 {
        debug!(labels = added; "Moving labels along");
    }
    Ok(())
}

fn move_labels(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let ctx = context.get::<MoveShapeContext>()?;
    if !ctx.hints.recurse {
        return Ok(());
    }
    let labels = scope.diagram().element(ctx.shape)?.labels().to_vec();
    move_along(scope, &labels, ctx.delta)
}

pub(super) fn register(stack: &mut CommandStack) {
    stack.register_listener(
        Hook::PreExecute,
        &[names::SHAPE_DELETE, names::CONNECTION_DELETE],
        DEFAULT_PRIORITY,
        delete_labels,
    );
    stack.register_listener(Hook::Execute, &[names::SHAPE_DELETE], DEFAULT_PRIORITY, unlink_label);
    stack.register_listener(Hook::Reverted, &[names::SHAPE_DELETE], DEFAULT_PRIORITY, relink_label);
    stack.register_listener(
        Hook::PreExecute,
        &[names::ELEMENTS_MOVE, names::SHAPES_MOVE],
        LABEL_MOVE_PRIORITY,
        add_moved_labels,
    );
    stack.register_listener(Hook::PostExecute, &[names::SHAPE_MOVE], DEFAULT_PRIORITY, move_labels);
}
