//! Pipeline, history and notification behavior of the command stack.

use std::{cell::RefCell, rc::Rc};

use easel::{
    EaselError,
    command::{
        CommandStack, Context, DEFAULT_PRIORITY, Hook, Outcome, Trigger, Verdict,
        context::{CreateShapeContext, ResizeShapeContext},
        names,
    },
    handlers,
    services::Services,
};
use easel_core::{
    diagram::Diagram,
    element::Element,
    geometry::{Bounds, Point},
    identifier::Id,
};

const ROOT: &str = "Stack_Root";

fn setup() -> (CommandStack, Diagram, Services) {
    let mut stack = CommandStack::new();
    handlers::register_all(&mut stack);
    let diagram = Diagram::new(Id::new(ROOT), Id::new("Process"));
    (stack, diagram, Services::default())
}

fn create(name: &str) -> Context {
    let shape = Element::shape(
        Id::new(name),
        Id::new("Task"),
        Bounds::new(0.0, 0.0, 100.0, 80.0),
    );
    CreateShapeContext::new(shape, Point::new(100.0, 100.0), Id::new(ROOT)).into()
}

#[test]
fn test_listeners_run_by_priority_then_registration() {
    let (mut stack, mut diagram, services) = setup();
    let calls = Rc::new(RefCell::new(Vec::new()));

    for (label, priority) in [("low", 500), ("first", 1500), ("second", 1500), ("default", DEFAULT_PRIORITY)] {
        let calls = Rc::clone(&calls);
        stack.register_listener(Hook::PreExecute, &[names::SHAPE_CREATE], priority, move |_, _| {
            calls.borrow_mut().push(label);
            Ok(())
        });
    }
    let post_calls = Rc::clone(&calls);
    stack.register_listener(Hook::PostExecute, &[names::SHAPE_CREATE], DEFAULT_PRIORITY, move |_, _| {
        post_calls.borrow_mut().push("post");
        Ok(())
    });

    let outcome = stack
        .execute(&mut diagram, &services, names::SHAPE_CREATE, create("Stack_A"))
        .expect("executed");

    assert_eq!(outcome, Outcome::Executed);
    assert_eq!(*calls.borrow(), vec!["first", "second", "default", "low", "post"]);
}

#[test]
fn test_pre_execute_may_rewrite_context() {
    let (mut stack, mut diagram, services) = setup();
    stack.register_listener(Hook::PreExecute, &[names::SHAPE_CREATE], DEFAULT_PRIORITY, |context, _| {
        let ctx = context.get_mut::<CreateShapeContext>()?;
        ctx.position = Some(Point::new(500.0, 500.0).into());
        Ok(())
    });

    stack
        .execute(&mut diagram, &services, names::SHAPE_CREATE, create("Stack_A"))
        .expect("executed");

    let bounds = diagram.bounds(Id::new("Stack_A")).expect("shape");
    assert_eq!(bounds.center(), Point::new(500.0, 500.0));
}

#[test]
fn test_unknown_command() {
    let (mut stack, mut diagram, services) = setup();
    let err = stack
        .execute(&mut diagram, &services, "shape.teleport", create("Stack_A"))
        .expect_err("unknown");
    assert_eq!(err, EaselError::HandlerNotFound("shape.teleport".to_string()));
}

#[test]
fn test_nesting_from_execute_phase_is_illegal() {
    let (mut stack, mut diagram, services) = setup();
    stack.register_listener(Hook::Execute, &[names::SHAPE_CREATE], DEFAULT_PRIORITY, |_, scope| {
        scope.execute(names::SHAPE_CREATE, create("Stack_Nested"))?;
        Ok(())
    });

    let err = stack
        .execute(&mut diagram, &services, names::SHAPE_CREATE, create("Stack_A"))
        .expect_err("illegal");

    assert!(matches!(err, EaselError::IllegalInvocation { .. }));
    assert!(!diagram.contains(Id::new("Stack_A")));
    assert!(!diagram.contains(Id::new("Stack_Nested")));
    assert!(!stack.can_undo());
}

#[test]
fn test_failing_listener_rolls_back_nested_commands() {
    let (mut stack, mut diagram, services) = setup();
    stack.register_listener(Hook::PostExecute, &[names::SHAPE_CREATE], DEFAULT_PRIORITY, |context, scope| {
        let ctx = context.get::<CreateShapeContext>()?;
        if ctx.shape.id() != "Stack_A" {
            return Ok(());
        }
        scope.execute(names::SHAPE_CREATE, create("Stack_B"))?;
        Err(EaselError::precondition(names::SHAPE_CREATE, "refused"))
    });

    let err = stack
        .execute(&mut diagram, &services, names::SHAPE_CREATE, create("Stack_A"))
        .expect_err("fails");

    assert!(matches!(err, EaselError::Precondition { .. }));
    assert!(!diagram.contains(Id::new("Stack_A")));
    assert!(!diagram.contains(Id::new("Stack_B")));
    assert!(!stack.can_undo());
    diagram.check_invariants().expect("consistent");
}

#[test]
fn test_nested_denial_denies_the_whole_operation() {
    let (mut stack, mut diagram, services) = setup();
    stack.register_guard(&[names::SHAPE_RESIZE], DEFAULT_PRIORITY, |_, _, _| Some(Verdict::Denied));
    stack.register_listener(Hook::PostExecute, &[names::SHAPE_CREATE], DEFAULT_PRIORITY, |context, scope| {
        let id = context.get::<CreateShapeContext>()?.shape.id();
        scope.execute(
            names::SHAPE_RESIZE,
            ResizeShapeContext::new(id, Bounds::new(0.0, 0.0, 10.0, 10.0)),
        )?;
        Ok(())
    });

    let outcome = stack
        .execute(&mut diagram, &services, names::SHAPE_CREATE, create("Stack_A"))
        .expect("denied, not failed");

    assert_eq!(outcome, Outcome::Denied);
    assert!(!diagram.contains(Id::new("Stack_A")));
    assert!(!stack.can_undo());
}

#[test]
fn test_indeterminate_still_executes() {
    let (mut stack, mut diagram, services) = setup();
    stack.register_guard(&[names::SHAPE_CREATE], DEFAULT_PRIORITY, |_, _, _| Some(Verdict::Indeterminate));

    let context = create("Stack_A");
    let verdict = stack
        .can_execute(&diagram, &services, names::SHAPE_CREATE, &context)
        .expect("registered");
    assert_eq!(verdict, Verdict::Indeterminate);

    let outcome = stack
        .execute(&mut diagram, &services, names::SHAPE_CREATE, context)
        .expect("executed");
    assert_eq!(outcome, Outcome::Executed);
}

#[test]
fn test_replay_listeners_see_undo_and_redo() {
    let (mut stack, mut diagram, services) = setup();
    let triggers = Rc::new(RefCell::new(Vec::new()));
    let plain = Rc::new(RefCell::new(0));

    let seen = Rc::clone(&triggers);
    stack.register_replay_listener(Hook::PostExecute, &[names::SHAPE_CREATE], DEFAULT_PRIORITY, move |_, scope| {
        seen.borrow_mut().push(scope.trigger());
        Ok(())
    });
    let count = Rc::clone(&plain);
    stack.register_listener(Hook::PostExecute, &[names::SHAPE_CREATE], DEFAULT_PRIORITY, move |_, _| {
        *count.borrow_mut() += 1;
        Ok(())
    });

    stack
        .execute(&mut diagram, &services, names::SHAPE_CREATE, create("Stack_A"))
        .expect("executed");
    assert!(stack.undo(&mut diagram, &services).expect("undone"));
    assert!(stack.redo(&mut diagram, &services).expect("redone"));

    assert_eq!(*triggers.borrow(), vec![Trigger::Execute, Trigger::Undo, Trigger::Redo]);
    assert_eq!(*plain.borrow(), 1);
}

#[test]
fn test_change_notifications() {
    let (mut stack, mut diagram, services) = setup();
    let changes = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&changes);
    stack.on_changed(move |changed, _| {
        seen.borrow_mut()
            .push((changed.trigger(), changed.elements().to_vec()));
    });

    stack
        .execute(&mut diagram, &services, names::SHAPE_CREATE, create("Stack_A"))
        .expect("executed");
    stack.undo(&mut diagram, &services).expect("undone");
    stack.clear(&diagram);

    let changes = changes.borrow();
    let a = Id::new("Stack_A");
    let root = Id::new(ROOT);
    assert_eq!(changes[0], (Trigger::Execute, vec![a, root]));
    assert_eq!(changes[1], (Trigger::Undo, vec![a, root]));
    assert_eq!(changes[2].0, Trigger::Clear);
    assert!(!stack.can_redo());
}

#[test]
fn test_new_command_drops_redo_tail() {
    let (mut stack, mut diagram, services) = setup();
    stack
        .execute(&mut diagram, &services, names::SHAPE_CREATE, create("Stack_A"))
        .expect("executed");
    stack.undo(&mut diagram, &services).expect("undone");
    assert!(stack.can_redo());

    stack
        .execute(&mut diagram, &services, names::SHAPE_CREATE, create("Stack_B"))
        .expect("executed");

    assert!(!stack.can_redo());
    assert!(!stack.redo(&mut diagram, &services).expect("nothing to redo"));
    assert_eq!(stack.undo_depth(), 1);
    assert!(!diagram.contains(Id::new("Stack_A")));
}

#[test]
fn test_undo_on_empty_history() {
    let (mut stack, mut diagram, services) = setup();
    assert!(!stack.undo(&mut diagram, &services).expect("nothing to undo"));
}
