//! Releases the semantic id of deleted elements so it can be reused.
//!
//! The release runs before the element is removed, as a nested
//! `id.updateClaim`, so undoing the delete claims the id again.

use log::trace;

use crate::{
    command::{
        CommandStack, Context, DEFAULT_PRIORITY, Hook, Scope,
        context::{DeleteConnectionContext, DeleteShapeContext},
        names,
    },
    error::EaselError,
    modeling::Modeling,
};

fn unclaim(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let id = match context.as_ref::<DeleteShapeContext>() {
        Some(ctx) => ctx.shape,
        None => context.get::<DeleteConnectionContext>()?.connection,
    };
    let element = scope.diagram().element(id)?;
    // labels share the business object of their target
    if element.is_label() {
        return Ok(());
    }
    let Some(business_object) = element.business_object() else {
        return Ok(());
    };
    if scope.diagram().ids().assigned(business_object).is_none() {
        return Ok(());
    }
    trace!(id:% = business_object; "Releasing id");
    scope.unclaim_id(business_object, business_object)
}

pub(super) fn register(stack: &mut CommandStack) {
    stack.register_listener(
        Hook::PreExecute,
        &[names::SHAPE_DELETE, names::CONNECTION_DELETE],
        DEFAULT_PRIORITY,
        unclaim,
    );
}
