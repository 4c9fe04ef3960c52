//! Error types for Easel editing operations.
//!
//! [`EaselError`] covers everything that can go wrong while running a
//! command: unknown handlers, malformed contexts, failed preconditions,
//! illegal re-entrance and inconsistencies reported by the element graph.

use thiserror::Error;

use easel_core::{ModelError, identifier::Id};

/// The main error type for Easel operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EaselError {
    #[error("No handler registered for command `{0}`")]
    HandlerNotFound(String),

    #[error("Command `{command}` requires `{field}`")]
    MissingContext {
        command: &'static str,
        field: &'static str,
    },

    #[error("Expected a `{expected}` context but got `{actual}`")]
    ContextMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Command `{command}` failed: {reason}")]
    Precondition {
        command: &'static str,
        reason: String,
    },

    #[error("Illegal invocation of `{command}` during {phase}")]
    IllegalInvocation { command: String, phase: &'static str },

    #[error("Connection `{connection}` crosses `{shape}` {count} times, docking is ambiguous")]
    AmbiguousDocking {
        connection: Id,
        shape: Id,
        count: usize,
    },

    /// A nested command was vetoed by a rule.
    ///
    /// The command stack turns this into [`Outcome::Denied`] after rolling
    /// back the whole operation, so callers of
    /// [`CommandStack::execute`](crate::command::CommandStack::execute)
    /// never observe it. The [`Modeling`](crate::modeling::Modeling)
    /// methods of [`Modeler`](crate::Modeler) report a denied command with it.
    ///
    /// [`Outcome::Denied`]: crate::command::Outcome::Denied
    #[error("Command `{command}` was denied")]
    Denied { command: String },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EaselError {
    /// Shorthand for a [`EaselError::Precondition`] failure.
    pub fn precondition(command: &'static str, reason: impl Into<String>) -> Self {
        Self::Precondition {
            command,
            reason: reason.into(),
        }
    }
}
