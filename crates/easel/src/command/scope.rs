//! [`Scope`]: what handlers and listeners see of a running command.

use easel_core::{diagram::Diagram, identifier::Id};

use super::{CommandStack, Context, Trigger, Verdict};
use crate::{config::AppConfig, error::EaselError, services::Services};

/// Access to the diagram, the services and nested execution while a
/// command runs.
pub struct Scope<'a> {
    diagram: &'a mut Diagram,
    services: &'a Services,
    stack: &'a mut CommandStack,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(
        diagram: &'a mut Diagram,
        services: &'a Services,
        stack: &'a mut CommandStack,
    ) -> Self {
        Self {
            diagram,
            services,
            stack,
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &*self.diagram
    }

    pub fn diagram_mut(&mut self) -> &mut Diagram {
        &mut *self.diagram
    }

    pub fn services(&self) -> &Services {
        self.services
    }

    pub fn config(&self) -> &AppConfig {
        self.services.config()
    }

    /// Borrows the diagram mutably together with the services.
    pub fn parts(&mut self) -> (&mut Diagram, &Services) {
        (&mut *self.diagram, self.services)
    }

    /// Whether the command is running for the first time, or being undone or redone.
    pub fn trigger(&self) -> Trigger {
        self.stack.trigger()
    }

    /// Adds elements to the change notification of the operation in flight.
    pub fn mark_dirty(&mut self, ids: impl IntoIterator<Item = Id>) {
        self.stack.mark_dirty(ids);
    }

    /// Executes a nested command and returns its final context.
    ///
    /// # Errors
    ///
    /// [`EaselError::IllegalInvocation`] when called from an atomic phase,
    /// [`EaselError::Denied`] when a rule vetoes the command, and any error
    /// of the nested command itself.
    pub fn execute(
        &mut self,
        name: &str,
        context: impl Into<Context>,
    ) -> Result<Context, EaselError> {
        self.stack
            .execute_nested(&mut *self.diagram, self.services, name, context.into())
    }

    pub fn can_execute(&self, name: &str, context: &Context) -> Result<Verdict, EaselError> {
        self.stack
            .can_execute(&*self.diagram, self.services, name, context)
    }
}
