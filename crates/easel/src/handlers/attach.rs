//! Host and attacher relations.

use log::debug;

use easel_core::identifier::Id;

use super::{required, slot_parts};
use crate::{
    command::{
        CommandHandler, Context, Scope,
        context::{AttachShapeContext, UpdateAttachmentContext},
        names,
    },
    error::EaselError,
};

/// Attaches a shape to a new host and paints it, with its labels, right
/// above the host.
pub(super) struct AttachShapeHandler;

impl CommandHandler for AttachShapeHandler {
    fn execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get_mut::<AttachShapeContext>()?;
        let diagram = scope.diagram_mut();
        let shape = ctx.shape;

        ctx.old_host = diagram.set_host(shape, ctx.new_host, None)?;
        ctx.old_parents.clear();

        let mut dirty = vec![shape];
        dirty.extend(ctx.old_host.map(|slot| slot.owner()));
        let Some(host) = ctx.new_host else {
            return Ok(dirty);
        };
        dirty.push(host);

        let host_parent = required(diagram.element(host)?.parent(), names::SHAPE_ATTACH, "host parent")?;
        let labels = diagram.element(shape)?.labels().to_vec();

        // shape first, then its labels, each right after the previous one
        let mut anchor = host;
        for id in std::iter::once(shape).chain(labels) {
            let old = diagram.set_parent(id, None, None)?;
            ctx.old_parents.push((id, old));
            let index = diagram
                .element(host_parent)?
                .children()
                .iter()
                .position(|child| *child == anchor)
                .map(|index| index + 1);
            diagram.set_parent(id, Some(host_parent), index)?;
            anchor = id;
            dirty.extend(old.map(|slot| slot.owner()));
        }

        debug!(shape:%, host:%; "Attached shape");
        Ok(dirty)
    }

    fn revert(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get::<AttachShapeContext>()?;
        let diagram = scope.diagram_mut();
        let mut dirty = vec![ctx.shape];

        for (id, slot) in ctx.old_parents.iter().rev() {
            let (owner, index) = slot_parts(*slot);
            diagram.set_parent(*id, owner, index)?;
            dirty.extend(owner);
        }
        let (owner, index) = slot_parts(ctx.old_host);
        diagram.set_host(ctx.shape, owner, index)?;
        dirty.extend(owner);
        dirty.extend(ctx.new_host);
        Ok(dirty)
    }
}

/// Changes only the host of a shape.
pub(super) struct UpdateAttachmentHandler;

impl CommandHandler for UpdateAttachmentHandler {
    fn execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get_mut::<UpdateAttachmentContext>()?;
        ctx.old_host = scope.diagram_mut().set_host(ctx.shape, ctx.new_host, None)?;

        let mut dirty = vec![ctx.shape];
        dirty.extend(ctx.old_host.map(|slot| slot.owner()));
        dirty.extend(ctx.new_host);
        Ok(dirty)
    }

    fn revert(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get::<UpdateAttachmentContext>()?;
        let (owner, index) = slot_parts(ctx.old_host);
        scope.diagram_mut().set_host(ctx.shape, owner, index)?;

        let mut dirty = vec![ctx.shape];
        dirty.extend(owner);
        dirty.extend(ctx.new_host);
        Ok(dirty)
    }
}
