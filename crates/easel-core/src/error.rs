//! Errors raised by the element arena.

use thiserror::Error;

use crate::{element::ElementKind, identifier::Id};

/// Structural errors of the element graph.
///
/// These indicate a caller bug: the editing core only issues arena
/// operations whose preconditions it has already checked.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Unknown element `{0}`")]
    UnknownElement(Id),

    #[error("Element `{id}` is a {actual}, expected a {expected}")]
    WrongKind {
        id: Id,
        expected: ElementKind,
        actual: ElementKind,
    },

    #[error("Element `{0}` cannot contain children")]
    NotAContainer(Id),

    #[error("Element `{0}` already exists")]
    DuplicateId(Id),

    #[error("Element `{0}` has no parent")]
    MissingParent(Id),

    #[error("Connection `{id}` needs at least 2 waypoints, got {count}")]
    InvalidWaypoints { id: Id, count: usize },

    #[error("Identifier `{id}` is already claimed by `{owner}`")]
    IdClaimed { id: Id, owner: Id },

    #[error("Element `{id}` still has {relation}")]
    StillLinked { id: Id, relation: &'static str },

    #[error("Invariant violated: {0}")]
    Invariant(String),
}
