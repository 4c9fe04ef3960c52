//! The command stack and its interception pipeline.
//!
//! Every change to a [`Diagram`] goes through a named command. A
//! [`CommandHandler`] implements the primitive state transition and its
//! inverse; behaviors hook into the pipeline of any command through
//! listeners registered on the [`CommandStack`] by name, [`Hook`] and
//! priority.
//!
//! # Pipeline
//!
//! For each command, top-level or nested:
//!
//! 1. guards and `CommandHandler::can_execute` produce a [`Verdict`]
//! 2. [`Hook::PreExecute`] listeners, then `CommandHandler::pre_execute`
//! 3. [`Hook::Execute`] listeners, `CommandHandler::execute`,
//!    [`Hook::Executed`] listeners, after which the command takes its slot
//!    in the history
//! 4. `CommandHandler::post_execute`, then [`Hook::PostExecute`] listeners
//!
//! Commands nested from the pre and post phases are recorded in the same
//! history group and undone together with the command that issued them.
//! Step 3 is atomic: nesting from it fails with
//! [`EaselError::IllegalInvocation`].
//!
//! [`Diagram`]: easel_core::diagram::Diagram

pub mod context;
pub mod names;
mod scope;
mod stack;

use std::rc::Rc;

use easel_core::{diagram::Diagram, identifier::Id};

use crate::{error::EaselError, services::Services};

pub use context::{CommandContext, Context};
pub use scope::Scope;
pub use stack::CommandStack;

/// Priority used when a behavior has no reason to run earlier or later.
pub const DEFAULT_PRIORITY: i32 = 1000;

/// Pipeline stage a listener is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    PreExecute,
    Execute,
    Executed,
    PostExecute,
    Revert,
    Reverted,
}

/// Three valued answer of a `can_execute` check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Denied,
    /// Neither allowed nor denied. Feedback should show nothing; execution proceeds.
    Indeterminate,
}

impl Verdict {
    /// Combines two verdicts. `Denied` wins over `Indeterminate`, which wins
    /// over `Allowed`.
    pub fn combine(self, other: Verdict) -> Verdict {
        match (self, other) {
            (Verdict::Denied, _) | (_, Verdict::Denied) => Verdict::Denied,
            (Verdict::Indeterminate, _) | (_, Verdict::Indeterminate) => Verdict::Indeterminate,
            _ => Verdict::Allowed,
        }
    }

    pub fn from_bool(allowed: bool) -> Verdict {
        if allowed {
            Verdict::Allowed
        } else {
            Verdict::Denied
        }
    }
}

/// Result of a top-level [`CommandStack::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Executed,
    /// A rule vetoed the command or one of its nested commands. Nothing changed.
    Denied,
}

/// What caused a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Execute,
    Undo,
    Redo,
    Clear,
}

/// Change notification sent after each top-level execute, undo, redo or clear.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementsChanged {
    elements: Vec<Id>,
    trigger: Trigger,
}

impl ElementsChanged {
    pub fn new(elements: Vec<Id>, trigger: Trigger) -> Self {
        Self { elements, trigger }
    }

    /// Every element touched, in first-touched order, without duplicates.
    pub fn elements(&self) -> &[Id] {
        &self.elements
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }
}

/// A reversible primitive bound to one or more command names.
///
/// Only [`execute`](Self::execute) is required. `execute` and `revert`
/// return the ids of the elements they changed.
pub trait CommandHandler {
    /// The handler's own opinion on the command. `None` abstains.
    fn can_execute(
        &self,
        _context: &Context,
        _diagram: &Diagram,
        _services: &Services,
    ) -> Option<Verdict> {
        None
    }

    fn pre_execute(&self, _context: &mut Context, _scope: &mut Scope<'_>) -> Result<(), EaselError> {
        Ok(())
    }

    fn execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError>;

    fn post_execute(&self, _context: &mut Context, _scope: &mut Scope<'_>) -> Result<(), EaselError> {
        Ok(())
    }

    fn revert(&self, _context: &mut Context, _scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        Ok(Vec::new())
    }
}

/// Callback run at one [`Hook`] of a command's pipeline.
pub type Listener = Rc<dyn Fn(&mut Context, &mut Scope<'_>) -> Result<(), EaselError>>;

/// Callback taking part in `can_execute`. `None` abstains.
pub type Guard = Rc<dyn Fn(&Context, &Diagram, &Services) -> Option<Verdict>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_combine() {
        use Verdict::*;
        assert_eq!(Allowed.combine(Allowed), Allowed);
        assert_eq!(Allowed.combine(Indeterminate), Indeterminate);
        assert_eq!(Indeterminate.combine(Denied), Denied);
        assert_eq!(Denied.combine(Allowed), Denied);
        assert_eq!(Verdict::from_bool(false), Denied);
    }
}
