//! Built-in command handlers.
//!
//! Each handler is a narrow, reversible transition of the element graph.
//! Compound handlers (append, delete, move, align, distribute, space tool)
//! do their work by nesting other commands from their pre and post phases,
//! so a single undo reverts everything they caused.

mod align;
mod attach;
mod collapse;
mod connection;
mod distribute;
mod elements;
mod ids;
mod labels;
mod shape;
mod space_tool;

use easel_core::{diagram::Slot, identifier::Id};

use crate::{
    command::{CommandStack, names},
    error::EaselError,
};

pub use distribute::group_for_distribution;
pub use space_tool::{Adjustments, calculate_adjustments, resize_bounds};

pub(crate) use elements::move_closure;

/// Registers every built-in handler on `stack`.
pub fn register_all(stack: &mut CommandStack) {
    stack.register_handler(&[names::SHAPE_CREATE], shape::CreateShapeHandler);
    stack.register_handler(&[names::SHAPE_DELETE], shape::DeleteShapeHandler);
    stack.register_handler(&[names::SHAPE_MOVE], shape::MoveShapeHandler);
    stack.register_handler(&[names::SHAPE_RESIZE], shape::ResizeShapeHandler);
    stack.register_handler(&[names::SHAPE_APPEND], shape::AppendShapeHandler);
    stack.register_handler(&[names::SHAPE_TOGGLE_COLLAPSE], collapse::ToggleCollapseHandler);
    stack.register_handler(&[names::SHAPE_ATTACH], attach::AttachShapeHandler);
    stack.register_handler(
        &[names::ELEMENT_UPDATE_ATTACHMENT],
        attach::UpdateAttachmentHandler,
    );
    stack.register_handler(&[names::LABEL_CREATE], labels::CreateLabelHandler);

    stack.register_handler(&[names::ELEMENTS_DELETE], elements::DeleteElementsHandler);
    stack.register_handler(
        &[names::ELEMENTS_MOVE, names::SHAPES_MOVE],
        elements::MoveElementsHandler,
    );
    stack.register_handler(&[names::ELEMENTS_ALIGN], align::AlignElementsHandler);
    stack.register_handler(
        &[names::ELEMENTS_DISTRIBUTE],
        distribute::DistributeElementsHandler,
    );

    stack.register_handler(&[names::CONNECTION_CREATE], connection::CreateConnectionHandler);
    stack.register_handler(&[names::CONNECTION_DELETE], connection::DeleteConnectionHandler);
    stack.register_handler(&[names::CONNECTION_MOVE], connection::MoveConnectionHandler);
    stack.register_handler(
        &[
            names::CONNECTION_RECONNECT_START,
            names::CONNECTION_RECONNECT_END,
        ],
        connection::ReconnectConnectionHandler,
    );
    stack.register_handler(
        &[names::CONNECTION_UPDATE_WAYPOINTS],
        connection::UpdateWaypointsHandler,
    );
    stack.register_handler(&[names::CONNECTION_LAYOUT], connection::LayoutConnectionHandler);

    stack.register_handler(&[names::ID_UPDATE_CLAIM], ids::IdClaimHandler);
    stack.register_handler(&[names::SPACE_TOOL], space_tool::SpaceToolHandler);
}

/// Unwraps a required context field.
fn required<T>(value: Option<T>, command: &'static str, field: &'static str) -> Result<T, EaselError> {
    value.ok_or(EaselError::MissingContext { command, field })
}

/// Splits a recorded slot into the owner and index the relation setters take.
fn slot_parts(slot: Option<Slot>) -> (Option<Id>, Option<usize>) {
    match slot {
        Some(slot) => (Some(slot.owner()), Some(slot.index())),
        None => (None, None),
    }
}
