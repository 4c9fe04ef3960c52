//! `shape.toggleCollapse`.

use log::debug;

use easel_core::{diagram::Diagram, identifier::Id};

use crate::{
    command::{CommandHandler, Context, Scope, context::ToggleCollapseContext},
    error::EaselError,
};

/// Hides `elements` and their descendants when `hidden` is set.
///
/// Below the first level an element also stays hidden if its own parent is
/// collapsed.
fn set_hidden_recursive(
    diagram: &mut Diagram,
    elements: &[Id],
    hidden: bool,
    changed: &mut Vec<Id>,
) -> Result<(), EaselError> {
    for id in elements {
        diagram.set_hidden(*id, hidden)?;
        changed.push(*id);
        let element = diagram.element(*id)?;
        let children = element.children().to_vec();
        let collapsed = element.collapsed();
        set_hidden_recursive(diagram, &children, collapsed || hidden, changed)?;
    }
    Ok(())
}

pub(super) struct ToggleCollapseHandler;

impl CommandHandler for ToggleCollapseHandler {
    fn execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get_mut::<ToggleCollapseContext>()?;
        let diagram = scope.diagram_mut();

        ctx.old_visibility = diagram
            .descendants(ctx.shape)
            .into_iter()
            .map(|id| diagram.element(id).map(|element| (id, element.hidden())))
            .collect::<Result<_, _>>()?;

        let collapsed = !diagram.element(ctx.shape)?.collapsed();
        diagram.set_collapsed(ctx.shape, collapsed)?;

        let children = diagram.element(ctx.shape)?.children().to_vec();
        let mut dirty = vec![ctx.shape];
        set_hidden_recursive(diagram, &children, collapsed, &mut dirty)?;

        debug!(shape:% = ctx.shape, collapsed; "Toggled collapse");
        Ok(dirty)
    }

    /// Restores each descendant's own visibility.
    fn revert(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        let ctx = context.get::<ToggleCollapseContext>()?;
        let diagram = scope.diagram_mut();

        let collapsed = diagram.element(ctx.shape)?.collapsed();
        diagram.set_collapsed(ctx.shape, !collapsed)?;

        let mut dirty = vec![ctx.shape];
        for (id, hidden) in &ctx.old_visibility {
            diagram.set_hidden(*id, *hidden)?;
            dirty.push(*id);
        }
        Ok(dirty)
    }
}
