//! `id.updateClaim`: claims or releases a semantic identifier.

use log::trace;

use easel_core::identifier::Id;

use crate::{
    command::{CommandHandler, Context, Scope, context::IdClaimContext},
    error::EaselError,
};

pub(super) struct IdClaimHandler;

impl CommandHandler for IdClaimHandler {
    fn execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get_mut::<IdClaimContext>()?;
        let ids = scope.diagram_mut().ids_mut();
        ctx.changed = if ctx.claiming {
            let held = ids.assigned(ctx.id) == Some(ctx.owner);
            ids.claim(ctx.id, ctx.owner)?;
            !held
        } else {
            ids.unclaim(ctx.id, ctx.owner)
        };
        trace!(id:% = ctx.id, claiming = ctx.claiming, changed = ctx.changed; "Updated id claim");
        Ok(Vec::new())
    }

    fn revert(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get::<IdClaimContext>()?;
        if !ctx.changed {
            return Ok(Vec::new());
        }
        let ids = scope.diagram_mut().ids_mut();
        if ctx.claiming {
            ids.unclaim(ctx.id, ctx.owner);
        } else {
            ids.claim(ctx.id, ctx.owner)?;
        }
        Ok(Vec::new())
    }
}
