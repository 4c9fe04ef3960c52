//! Sequence connections may not cross container boundaries.

use log::debug;

use easel_core::identifier::Id;

use crate::{
    command::{
        CommandStack, Context, Hook, Scope, context::MoveElementsContext, names,
    },
    error::EaselError,
    modeling::Modeling,
};

/// Runs after the other move behaviors so it sees the final parents.
const PRIORITY: i32 = 500;

/// Deletes sequence connections of a moved closure whose ends ended up in
/// different containers.
fn drop_crossing(context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
    let ctx = context.get::<MoveElementsContext>()?;
    let closure = match &ctx.closure {
        Some(closure) => closure.clone(),
        None => scope.diagram().closure(&ctx.shapes),
    };

    let diagram = scope.diagram();
    let semantics = scope.services().semantics();
    let parent_of = |id: Option<Id>| id.and_then(|id| diagram.get(id)).and_then(|e| e.parent());
    let crossing: Vec<Id> = closure
        .all_connections()
        .iter()
        .copied()
        .filter(|id| {
            diagram.get(*id).is_some_and(|connection| {
                semantics.is_sequence(connection.type_name())
                    && parent_of(connection.source()) != parent_of(connection.target())
            })
        })
        .collect();

    for connection in crossing {
        if scope.diagram().contains(connection) {
            debug!(connection:%; "Dropping connection crossing containers");
            scope.remove_connection(connection)?;
        }
    }
    Ok(())
}

pub(super) fn register(stack: &mut CommandStack) {
    stack.register_listener(
        Hook::PostExecute,
        &[names::ELEMENTS_MOVE, names::SHAPES_MOVE],
        PRIORITY,
        drop_crossing,
    );
}
