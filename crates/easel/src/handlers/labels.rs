//! `label.create`: a shape bound to the element it annotates.

use log::debug;

use easel_core::identifier::Id;

use super::{required, shape::placed_bounds};
use crate::{
    command::{CommandHandler, Context, Scope, context::CreateLabelContext, names},
    error::EaselError,
};

pub(super) struct CreateLabelHandler;

impl CommandHandler for CreateLabelHandler {
    fn execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get_mut::<CreateLabelContext>()?;
        let parent = required(ctx.parent, names::LABEL_CREATE, "parent")?;
        let position = required(ctx.position, names::LABEL_CREATE, "position")?;
        let target = required(ctx.label_target, names::LABEL_CREATE, "label_target")?;

        // a label without a size is a point until it is measured
        let size = ctx.size.unwrap_or_default();
        let current = ctx.shape.bounds().unwrap_or_default().with_size(size);
        let label = ctx.shape.clone().with_bounds(placed_bounds(current, position));
        let id = label.id();

        let diagram = scope.diagram_mut();
        let index = diagram.add_shape(label, parent, ctx.parent_index)?;
        ctx.parent_index = Some(index);
        diagram.set_label_target(id, Some(target), None)?;

        debug!(label:% = id, target:%; "Created label");
        Ok(vec![id, target])
    }

    /// Unlinks the label before removing it.
    fn revert(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get::<CreateLabelContext>()?;
        let id = ctx.shape.id();
        let diagram = scope.diagram_mut();
        let old_target = diagram.set_label_target(id, None, None)?;
        diagram.remove(id)?;

        let mut dirty = vec![id];
        dirty.extend(old_target.map(|slot| slot.owner()));
        Ok(dirty)
    }
}
