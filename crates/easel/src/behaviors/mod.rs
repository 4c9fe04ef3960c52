//! Default behaviors.
//!
//! Behaviors are listeners and guards on the command pipeline. They keep
//! labels and attachers with their shapes, enforce the modeling rules,
//! split flows a shape is dropped on and tidy up connections after
//! layout. [`register_defaults`] installs all of them.

mod attach_support;
mod create_on_flow;
mod crop;
mod drop_crossing;
mod grid_snap;
mod label_support;
mod rules;
mod sticky_attach;
mod unclaim_id;

use easel_core::{geometry::Point, identifier::Id};

use crate::{
    command::{
        CommandStack, Scope,
        context::{MoveHints, MoveShapeContext},
        names,
    },
    config::AppConfig,
    error::EaselError,
};

pub use create_on_flow::{FlowIntersection, approx_intersection};
pub use grid_snap::snap_middle_segments;
pub use sticky_attach::StickyAttach;

/// Snapping runs before the other post-execute behaviors of its command.
const GRID_SNAP_PRIORITY: i32 = 1750;

/// Flow detection must see the selection before attachers and labels join it.
const CREATE_ON_FLOW_PRIORITY: i32 = 1600;

const ATTACH_MOVE_PRIORITY: i32 = 1500;

const LABEL_MOVE_PRIORITY: i32 = 1250;

/// Moves each of `ids` that still exists by `delta`, keeping its parent.
fn move_along(scope: &mut Scope<'_>, ids: &[Id], delta: Point) -> Result<(), EaselError> {
    for &id in ids {
        if !scope.diagram().contains(id) {
            continue;
        }
        scope.execute(
            names::SHAPE_MOVE,
            MoveShapeContext::new(id, delta).with_hints(MoveHints::default()),
        )?;
    }
    Ok(())
}

/// Registers the default behaviors on `stack`.
///
/// Grid snapping and cropping follow `config`.
pub fn register_defaults(stack: &mut CommandStack, config: &AppConfig) {
    rules::register(stack);
    label_support::register(stack);
    attach_support::register(stack);
    unclaim_id::register(stack);
    create_on_flow::register(stack);
    drop_crossing::register(stack);
    if config.layout().crop_connections() {
        crop::register(stack);
    }
    if config.grid().snap_connections() {
        grid_snap::register(stack);
    }
}
