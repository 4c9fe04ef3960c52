//! `elements.align`.

use log::debug;

use easel_core::identifier::Id;

use super::required;
use crate::{
    command::{
        CommandHandler, Context, Scope,
        context::{AlignElementsContext, MoveElementsContext},
        names,
    },
    error::EaselError,
};

/// Moves each element so that the requested edge or center lines up.
///
/// Every element is moved on its own, within its current parent.
pub(super) struct AlignElementsHandler;

impl CommandHandler for AlignElementsHandler {
    fn pre_execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
        let ctx = context.get::<AlignElementsContext>()?;
        let alignment = required(ctx.alignment, names::ELEMENTS_ALIGN, "alignment")?;
        let elements = ctx.elements.clone();
        debug!(elements = elements.len(), alignment:?; "Aligning elements");

        for id in elements {
            let element = scope.diagram().element(id)?;
            let parent = element.parent();
            let delta = alignment.delta_for(scope.diagram().bounds(id)?);
            scope.execute(
                names::ELEMENTS_MOVE,
                MoveElementsContext::new(vec![id], delta).with_parent(parent),
            )?;
        }
        Ok(())
    }

    fn execute(&self, _context: &mut Context, _scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        Ok(Vec::new())
    }
}
