//! [`CommandStack`]: handler registry, listener registry and history.

use std::{cmp::Reverse, collections::HashMap, fmt, rc::Rc};

use indexmap::IndexSet;
use log::{debug, info, trace, warn};

use easel_core::{diagram::Diagram, identifier::Id};

use super::{
    CommandHandler, Context, ElementsChanged, Guard, Hook, Listener, Outcome, Scope, Trigger,
    Verdict,
};
use crate::{error::EaselError, services::Services};

const PHASE_EXECUTE: &str = "execute";
const PHASE_REVERT: &str = "revert";
const PHASE_REPLAY: &str = "undo/redo replay";

type ChangeListener = Box<dyn FnMut(&ElementsChanged, &Diagram)>;

#[derive(Clone)]
struct ListenerEntry {
    priority: i32,
    sequence: u64,
    replay: bool,
    callback: Listener,
}

#[derive(Clone)]
struct GuardEntry {
    priority: i32,
    sequence: u64,
    callback: Guard,
}

/// One applied command. Actions sharing a group form one undo step.
#[derive(Debug, Clone)]
struct Action {
    group: u64,
    command: String,
    context: Context,
}

/// State of the top-level operation in flight.
#[derive(Debug)]
struct Execution {
    group: u64,
    trigger: Trigger,
    depth: usize,
    phase: Option<&'static str>,
    dirty: IndexSet<Id>,
}

impl Execution {
    fn new(group: u64, trigger: Trigger, phase: Option<&'static str>) -> Self {
        Self {
            group,
            trigger,
            depth: 0,
            phase,
            dirty: IndexSet::new(),
        }
    }
}

/// Runs named commands and keeps a linear undo/redo history.
///
/// The stack does not own the diagram: every operation takes the
/// [`Diagram`] and the [`Services`] it works on. [`Modeler`](crate::Modeler)
/// bundles the three.
#[derive(Default)]
pub struct CommandStack {
    handlers: HashMap<String, Rc<dyn CommandHandler>>,
    listeners: HashMap<String, HashMap<Hook, Rc<Vec<ListenerEntry>>>>,
    guards: HashMap<String, Rc<Vec<GuardEntry>>>,
    sequence: u64,
    history: Vec<Action>,
    /// Number of actions currently applied. Everything after is the redo tail.
    executed: usize,
    next_group: u64,
    current: Option<Execution>,
    change_listeners: Vec<ChangeListener>,
}

impl fmt::Debug for CommandStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handlers: Vec<&String> = self.handlers.keys().collect();
        handlers.sort();
        f.debug_struct("CommandStack")
            .field("handlers", &handlers)
            .field("history", &self.history)
            .field("executed", &self.executed)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl CommandStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handler` to every name in `names`, replacing earlier bindings.
    pub fn register_handler<H>(&mut self, names: &[&str], handler: H)
    where
        H: CommandHandler + 'static,
    {
        let handler: Rc<dyn CommandHandler> = Rc::new(handler);
        for name in names {
            if self
                .handlers
                .insert((*name).to_string(), Rc::clone(&handler))
                .is_some()
            {
                debug!(command = name; "Replaced command handler");
            }
        }
    }

    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registers a rule taking part in `can_execute` for `names`.
    pub fn register_guard<F>(&mut self, names: &[&str], priority: i32, guard: F)
    where
        F: Fn(&Context, &Diagram, &Services) -> Option<Verdict> + 'static,
    {
        let guard: Guard = Rc::new(guard);
        for name in names {
            let entry = GuardEntry {
                priority,
                sequence: self.next_sequence(),
                callback: Rc::clone(&guard),
            };
            let entries = Rc::make_mut(self.guards.entry((*name).to_string()).or_default());
            entries.push(entry);
            entries.sort_by_key(|entry| (Reverse(entry.priority), entry.sequence));
        }
    }

    /// Registers a listener that runs the first time a command executes.
    ///
    /// Higher priorities run first; equal priorities run in registration
    /// order.
    pub fn register_listener<F>(&mut self, hook: Hook, names: &[&str], priority: i32, listener: F)
    where
        F: Fn(&mut Context, &mut Scope<'_>) -> Result<(), EaselError> + 'static,
    {
        self.add_listener(hook, names, priority, false, Rc::new(listener));
    }

    /// Registers a listener that also runs when undo and redo replay the command.
    ///
    /// A replayed [`Hook::PreExecute`] listener runs before the command is
    /// redone and after it is undone; a [`Hook::PostExecute`] listener runs
    /// after the command is redone and before it is undone. The listener
    /// can tell the cases apart with [`Scope::trigger`]. Replayed listeners
    /// cannot execute commands.
    pub fn register_replay_listener<F>(
        &mut self,
        hook: Hook,
        names: &[&str],
        priority: i32,
        listener: F,
    ) where
        F: Fn(&mut Context, &mut Scope<'_>) -> Result<(), EaselError> + 'static,
    {
        self.add_listener(hook, names, priority, true, Rc::new(listener));
    }

    fn add_listener(
        &mut self,
        hook: Hook,
        names: &[&str],
        priority: i32,
        replay: bool,
        callback: Listener,
    ) {
        for name in names {
            let entry = ListenerEntry {
                priority,
                sequence: self.next_sequence(),
                replay,
                callback: Rc::clone(&callback),
            };
            let entries = Rc::make_mut(
                self.listeners
                    .entry((*name).to_string())
                    .or_default()
                    .entry(hook)
                    .or_default(),
            );
            entries.push(entry);
            entries.sort_by_key(|entry| (Reverse(entry.priority), entry.sequence));
        }
    }

    /// Subscribes to change notifications.
    pub fn on_changed<F>(&mut self, listener: F)
    where
        F: FnMut(&ElementsChanged, &Diagram) + 'static,
    {
        self.change_listeners.push(Box::new(listener));
    }

    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    fn handler(&self, name: &str) -> Result<Rc<dyn CommandHandler>, EaselError> {
        self.handlers
            .get(name)
            .cloned()
            .ok_or_else(|| EaselError::HandlerNotFound(name.to_string()))
    }

    /// True if there is an applied step to undo.
    pub fn can_undo(&self) -> bool {
        self.executed > 0
    }

    /// True if there is an undone step to redo.
    pub fn can_redo(&self) -> bool {
        self.executed < self.history.len()
    }

    /// Number of applied undo steps.
    pub fn undo_depth(&self) -> usize {
        let mut groups: Vec<u64> = self.history[..self.executed]
            .iter()
            .map(|action| action.group)
            .collect();
        groups.dedup();
        groups.len()
    }

    /// Names of the applied commands, oldest first, nested commands included.
    pub fn applied_commands(&self) -> impl Iterator<Item = &str> {
        self.history[..self.executed]
            .iter()
            .map(|action| action.command.as_str())
    }

    /// Evaluates every guard and the handler's own check.
    ///
    /// # Errors
    ///
    /// Returns [`EaselError::HandlerNotFound`] if `name` is not registered.
    pub fn can_execute(
        &self,
        diagram: &Diagram,
        services: &Services,
        name: &str,
        context: &Context,
    ) -> Result<Verdict, EaselError> {
        let handler = self.handler(name)?;
        let mut verdict = Verdict::Allowed;
        if let Some(guards) = self.guards.get(name) {
            for guard in guards.iter() {
                if let Some(answer) = (guard.callback)(context, diagram, services) {
                    verdict = verdict.combine(answer);
                }
                if verdict == Verdict::Denied {
                    return Ok(verdict);
                }
            }
        }
        if let Some(answer) = handler.can_execute(context, diagram, services) {
            verdict = verdict.combine(answer);
        }
        Ok(verdict)
    }

    /// Executes a top-level command as one undo step.
    ///
    /// Returns [`Outcome::Denied`] without changing anything if a rule
    /// vetoes the command or any command it nests.
    ///
    /// # Errors
    ///
    /// Any error raised by a handler or listener. Whatever the operation
    /// had applied is reverted before the error is returned.
    pub fn execute(
        &mut self,
        diagram: &mut Diagram,
        services: &Services,
        name: &str,
        context: Context,
    ) -> Result<Outcome, EaselError> {
        let verdict = self.can_execute(diagram, services, name, &context)?;
        if verdict == Verdict::Denied {
            info!(command = name; "Command denied");
            return Ok(Outcome::Denied);
        }

        let group = self.next_group;
        self.next_group += 1;
        let redo_tail = self.history.split_off(self.executed);
        self.current = Some(Execution::new(group, Trigger::Execute, None));
        info!(command = name, group; "Executing command");

        match self.internal_execute(diagram, services, name, context) {
            Ok(_) => {
                let elements = self.finish();
                self.notify(diagram, ElementsChanged::new(elements, Trigger::Execute));
                Ok(Outcome::Executed)
            }
            Err(err) => {
                debug!(command = name, group, err:%; "Rolling back command");
                self.rollback(diagram, services, group);
                self.current = None;
                self.history.extend(redo_tail);
                match err {
                    EaselError::Denied { command } => {
                        info!(command = name, denied = command.as_str(); "Command denied by nested rule");
                        Ok(Outcome::Denied)
                    }
                    err => Err(err),
                }
            }
        }
    }

    /// Executes a command nested in the operation in flight.
    pub(crate) fn execute_nested(
        &mut self,
        diagram: &mut Diagram,
        services: &Services,
        name: &str,
        context: Context,
    ) -> Result<Context, EaselError> {
        if let Some(phase) = self.current.as_ref().and_then(|execution| execution.phase) {
            return Err(EaselError::IllegalInvocation {
                command: name.to_string(),
                phase,
            });
        }
        if self.can_execute(diagram, services, name, &context)? == Verdict::Denied {
            debug!(command = name; "Nested command denied");
            return Err(EaselError::Denied {
                command: name.to_string(),
            });
        }
        self.internal_execute(diagram, services, name, context)
    }

    fn internal_execute(
        &mut self,
        diagram: &mut Diagram,
        services: &Services,
        name: &str,
        mut context: Context,
    ) -> Result<Context, EaselError> {
        let handler = self.handler(name)?;
        let group = self.enter();
        trace!(command = name, context:?; "Running command");

        self.fire(diagram, services, name, Hook::PreExecute, &mut context, false)?;
        handler.pre_execute(&mut context, &mut Scope::new(diagram, services, self))?;

        let previous = self.set_phase(Some(PHASE_EXECUTE));
        self.fire(diagram, services, name, Hook::Execute, &mut context, false)?;
        let dirty = handler.execute(&mut context, &mut Scope::new(diagram, services, self))?;
        self.mark_dirty(dirty);
        self.fire(diagram, services, name, Hook::Executed, &mut context, false)?;
        self.set_phase(previous);

        let slot = self.history.len();
        self.history.push(Action {
            group,
            command: name.to_string(),
            context: context.clone(),
        });
        self.executed = self.history.len();

        handler.post_execute(&mut context, &mut Scope::new(diagram, services, self))?;
        self.fire(diagram, services, name, Hook::PostExecute, &mut context, false)?;

        if let Some(action) = self.history.get_mut(slot) {
            action.context = context.clone();
        }
        self.leave();
        Ok(context)
    }

    /// Reverts the most recent undo step.
    ///
    /// Returns `false` if there was nothing to undo.
    ///
    /// # Errors
    ///
    /// Any error raised by a handler's revert. The history is left at the
    /// failing action.
    pub fn undo(&mut self, diagram: &mut Diagram, services: &Services) -> Result<bool, EaselError> {
        let Some(group) = self
            .executed
            .checked_sub(1)
            .map(|index| self.history[index].group)
        else {
            return Ok(false);
        };
        info!(group; "Undoing command");
        self.current = Some(Execution::new(group, Trigger::Undo, Some(PHASE_REPLAY)));

        let result = self.undo_group(diagram, services, group);
        let elements = self.finish();
        result?;
        self.notify(diagram, ElementsChanged::new(elements, Trigger::Undo));
        Ok(true)
    }

    fn undo_group(
        &mut self,
        diagram: &mut Diagram,
        services: &Services,
        group: u64,
    ) -> Result<(), EaselError> {
        while self.executed > 0 && self.history[self.executed - 1].group == group {
            let index = self.executed - 1;
            let command = self.history[index].command.clone();
            let mut context = self.history[index].context.clone();
            self.revert_action(diagram, services, &command, &mut context, true)?;
            self.history[index].context = context;
            self.executed = index;
        }
        Ok(())
    }

    /// Re-applies the most recently undone step.
    ///
    /// Rules are not consulted again. Returns `false` if there was nothing
    /// to redo.
    ///
    /// # Errors
    ///
    /// Any error raised by a handler's execute.
    pub fn redo(&mut self, diagram: &mut Diagram, services: &Services) -> Result<bool, EaselError> {
        let Some(group) = self.history.get(self.executed).map(|action| action.group) else {
            return Ok(false);
        };
        info!(group; "Redoing command");
        self.current = Some(Execution::new(group, Trigger::Redo, Some(PHASE_REPLAY)));

        let result = self.redo_group(diagram, services, group);
        let elements = self.finish();
        result?;
        self.notify(diagram, ElementsChanged::new(elements, Trigger::Redo));
        Ok(true)
    }

    fn redo_group(
        &mut self,
        diagram: &mut Diagram,
        services: &Services,
        group: u64,
    ) -> Result<(), EaselError> {
        while self
            .history
            .get(self.executed)
            .is_some_and(|action| action.group == group)
        {
            let index = self.executed;
            let command = self.history[index].command.clone();
            let mut context = self.history[index].context.clone();
            self.redo_action(diagram, services, &command, &mut context)?;
            self.history[index].context = context;
            self.executed = index + 1;
        }
        Ok(())
    }

    /// Drops the whole history.
    pub fn clear(&mut self, diagram: &Diagram) {
        info!(actions = self.history.len(); "Clearing command history");
        self.history.clear();
        self.executed = 0;
        self.notify(diagram, ElementsChanged::new(Vec::new(), Trigger::Clear));
    }

    fn redo_action(
        &mut self,
        diagram: &mut Diagram,
        services: &Services,
        name: &str,
        context: &mut Context,
    ) -> Result<(), EaselError> {
        let handler = self.handler(name)?;
        debug!(command = name; "Replaying command");
        self.fire(diagram, services, name, Hook::PreExecute, context, true)?;

        let previous = self.set_phase(Some(PHASE_EXECUTE));
        self.fire(diagram, services, name, Hook::Execute, context, false)?;
        let dirty = handler.execute(context, &mut Scope::new(diagram, services, self))?;
        self.mark_dirty(dirty);
        self.fire(diagram, services, name, Hook::Executed, context, false)?;
        self.set_phase(previous);

        self.fire(diagram, services, name, Hook::PostExecute, context, true)
    }

    fn revert_action(
        &mut self,
        diagram: &mut Diagram,
        services: &Services,
        name: &str,
        context: &mut Context,
        replay: bool,
    ) -> Result<(), EaselError> {
        let handler = self.handler(name)?;
        debug!(command = name; "Reverting command");
        if replay {
            self.fire(diagram, services, name, Hook::PostExecute, context, true)?;
        }

        let previous = self.set_phase(Some(PHASE_REVERT));
        self.fire(diagram, services, name, Hook::Revert, context, false)?;
        let dirty = handler.revert(context, &mut Scope::new(diagram, services, self))?;
        self.mark_dirty(dirty);
        self.fire(diagram, services, name, Hook::Reverted, context, false)?;
        self.set_phase(previous);

        if replay {
            self.fire(diagram, services, name, Hook::PreExecute, context, true)?;
        }
        Ok(())
    }

    /// Reverts every action of `group`, newest first.
    fn rollback(&mut self, diagram: &mut Diagram, services: &Services, group: u64) {
        self.set_phase(Some(PHASE_REVERT));
        while let Some(mut action) = self.history.pop_if(|action| action.group == group) {
            self.executed = self.history.len();
            if let Err(err) =
                self.revert_action(diagram, services, &action.command, &mut action.context, false)
            {
                warn!(command = action.command.as_str(), err:%; "Revert failed during rollback");
            }
        }
        self.executed = self.history.len();
    }

    fn fire(
        &mut self,
        diagram: &mut Diagram,
        services: &Services,
        name: &str,
        hook: Hook,
        context: &mut Context,
        replay_only: bool,
    ) -> Result<(), EaselError> {
        let Some(listeners) = self
            .listeners
            .get(name)
            .and_then(|hooks| hooks.get(&hook))
            .cloned()
        else {
            return Ok(());
        };
        for entry in listeners.iter().filter(|entry| !replay_only || entry.replay) {
            (entry.callback)(context, &mut Scope::new(diagram, services, self))?;
        }
        Ok(())
    }

    fn enter(&mut self) -> u64 {
        match self.current.as_mut() {
            Some(execution) => {
                execution.depth += 1;
                execution.group
            }
            None => self.next_group,
        }
    }

    fn leave(&mut self) {
        if let Some(execution) = self.current.as_mut() {
            execution.depth = execution.depth.saturating_sub(1);
        }
    }

    fn set_phase(&mut self, phase: Option<&'static str>) -> Option<&'static str> {
        match self.current.as_mut() {
            Some(execution) => std::mem::replace(&mut execution.phase, phase),
            None => None,
        }
    }

    /// Ends the operation in flight and returns its dirty elements.
    fn finish(&mut self) -> Vec<Id> {
        self.current
            .take()
            .map(|execution| execution.dirty.into_iter().collect())
            .unwrap_or_default()
    }

    pub(crate) fn mark_dirty(&mut self, ids: impl IntoIterator<Item = Id>) {
        if let Some(execution) = self.current.as_mut() {
            execution.dirty.extend(ids);
        }
    }

    pub(crate) fn trigger(&self) -> Trigger {
        self.current
            .as_ref()
            .map_or(Trigger::Execute, |execution| execution.trigger)
    }

    fn notify(&mut self, diagram: &Diagram, event: ElementsChanged) {
        trace!(trigger:? = event.trigger(), elements:? = event.elements(); "Elements changed");
        for listener in &mut self.change_listeners {
            listener(&event, diagram);
        }
    }
}
