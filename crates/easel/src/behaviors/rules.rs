//! Default rules: guards that veto commands the semantics do not allow.

use easel_core::{diagram::Diagram, element::Element};

use crate::{
    command::{
        CommandStack, DEFAULT_PRIORITY, Verdict,
        context::{
            AttachShapeContext, CreateConnectionContext, CreateShapeContext, MoveElementsContext,
            ReconnectContext, ResizeShapeContext,
        },
        names,
    },
    semantics::Semantics,
};

/// Whether `shape` may be attached to the boundary of `host`.
pub(super) fn can_attach(
    diagram: &Diagram,
    semantics: &dyn Semantics,
    shape: &Element,
    host: &Element,
) -> bool {
    semantics.is_attachable(shape)
        && host.is_shape()
        && !host.is_label()
        && host.id() != shape.id()
        && host.host().is_none()
        && !diagram.is_ancestor(shape.id(), host.id())
}

fn connect_verdict(
    semantics: &dyn Semantics,
    source: Option<&Element>,
    target: Option<&Element>,
    connection: &Element,
) -> Verdict {
    match (source, target) {
        (Some(source), Some(target)) => {
            Verdict::from_bool(semantics.can_connect(source, target, connection.type_name()))
        }
        _ => Verdict::Indeterminate,
    }
}

pub(super) fn register(stack: &mut CommandStack) {
    stack.register_guard(
        &[names::CONNECTION_CREATE],
        DEFAULT_PRIORITY,
        |context, diagram, services| {
            let ctx = context.as_ref::<CreateConnectionContext>()?;
            let end = |id: Option<_>| id.and_then(|id| diagram.get(id));
            Some(connect_verdict(
                services.semantics(),
                end(ctx.source),
                end(ctx.target),
                &ctx.connection,
            ))
        },
    );

    stack.register_guard(
        &[
            names::CONNECTION_RECONNECT_START,
            names::CONNECTION_RECONNECT_END,
        ],
        DEFAULT_PRIORITY,
        |context, diagram, services| {
            let ctx = context.as_ref::<ReconnectContext>()?;
            let connection = diagram.get(ctx.connection)?;
            let source = ctx.new_source.or(connection.source());
            let target = ctx.new_target.or(connection.target());
            Some(connect_verdict(
                services.semantics(),
                source.and_then(|id| diagram.get(id)),
                target.and_then(|id| diagram.get(id)),
                connection,
            ))
        },
    );

    stack.register_guard(
        &[names::SHAPE_RESIZE],
        DEFAULT_PRIORITY,
        |context, _diagram, services| {
            let ctx = context.as_ref::<ResizeShapeContext>()?;
            let min = ctx
                .min_size
                .unwrap_or_else(|| services.config().modeling().min_shape_size());
            Some(Verdict::from_bool(
                ctx.new_bounds.width() >= min.width() && ctx.new_bounds.height() >= min.height(),
            ))
        },
    );

    stack.register_guard(
        &[names::SHAPE_ATTACH],
        DEFAULT_PRIORITY,
        |context, diagram, services| {
            let ctx = context.as_ref::<AttachShapeContext>()?;
            // detaching is always fine
            let Some(host) = ctx.new_host else {
                return Some(Verdict::Allowed);
            };
            let shape = diagram.get(ctx.shape)?;
            let host = diagram.get(host)?;
            Some(Verdict::from_bool(can_attach(
                diagram,
                services.semantics(),
                shape,
                host,
            )))
        },
    );

    stack.register_guard(
        &[names::SHAPE_CREATE],
        DEFAULT_PRIORITY,
        |context, diagram, services| {
            let ctx = context.as_ref::<CreateShapeContext>()?;
            let parent = diagram.get(ctx.parent?)?;
            if !parent.is_connection() {
                return None;
            }
            Some(Verdict::from_bool(
                services.semantics().can_insert(&ctx.shape, parent),
            ))
        },
    );

    stack.register_guard(
        &[names::ELEMENTS_MOVE, names::SHAPES_MOVE],
        DEFAULT_PRIORITY,
        |context, diagram, services| {
            let ctx = context.as_ref::<MoveElementsContext>()?;
            let single = match ctx.shapes.as_slice() {
                [shape] => diagram.get(*shape),
                _ => None,
            };

            if let Some(host) = ctx.new_host {
                let host = diagram.get(host)?;
                return Some(Verdict::from_bool(single.is_some_and(|shape| {
                    can_attach(diagram, services.semantics(), shape, host)
                })));
            }

            let parent = diagram.get(ctx.new_parent?)?;
            if !parent.is_connection() {
                return None;
            }
            Some(Verdict::from_bool(
                single.is_some_and(|shape| services.semantics().can_insert(shape, parent)),
            ))
        },
    );
}

#[cfg(test)]
mod tests {
    use easel_core::{
        element::waypoints_from,
        geometry::{Bounds, Point},
        identifier::Id,
    };

    use super::*;
    use crate::{command::Context, semantics::KindSemantics, services::Services};

    fn diagram() -> Diagram {
        let root = Id::new("Rules_Root");
        let mut diagram = Diagram::new(root, Id::new("Process"));
        for (name, kind, x) in [
            ("Rules_A", "Task", 0.0),
            ("Rules_B", "Task", 200.0),
            ("Rules_Event", "BoundaryEvent", 400.0),
        ] {
            diagram
                .add_shape(
                    Element::shape(Id::new(name), Id::new(kind), Bounds::new(x, 0.0, 100.0, 80.0)),
                    root,
                    None,
                )
                .expect("added");
        }
        diagram
    }

    fn verdict(stack: &CommandStack, diagram: &Diagram, name: &str, context: Context) -> Verdict {
        stack
            .can_execute(diagram, &Services::default(), name, &context)
            .expect("handler registered")
    }

    fn stack() -> CommandStack {
        let mut stack = CommandStack::new();
        crate::handlers::register_all(&mut stack);
        register(&mut stack);
        stack
    }

    #[test]
    fn test_connection_create_rules() {
        let stack = stack();
        let diagram = diagram();
        let flow = Element::connection(Id::new("Rules_F"), Id::new("SequenceFlow"), Vec::new());

        let ok = CreateConnectionContext::new(
            flow.clone(),
            Id::new("Rules_A"),
            Id::new("Rules_B"),
            Id::new("Rules_Root"),
        );
        assert_eq!(verdict(&stack, &diagram, names::CONNECTION_CREATE, ok.into()), Verdict::Allowed);

        let to_root = CreateConnectionContext::new(
            flow.clone(),
            Id::new("Rules_A"),
            Id::new("Rules_Root"),
            Id::new("Rules_Root"),
        );
        assert_eq!(
            verdict(&stack, &diagram, names::CONNECTION_CREATE, to_root.into()),
            Verdict::Denied
        );

        let mut dangling = CreateConnectionContext::new(
            flow,
            Id::new("Rules_A"),
            Id::new("Rules_B"),
            Id::new("Rules_Root"),
        );
        dangling.target = None;
        assert_eq!(
            verdict(&stack, &diagram, names::CONNECTION_CREATE, dangling.into()),
            Verdict::Indeterminate
        );
    }

    #[test]
    fn test_attach_and_resize_rules() {
        let stack = stack();
        let diagram = diagram();

        let attach = AttachShapeContext::new(Id::new("Rules_Event"), Id::new("Rules_A"));
        assert_eq!(verdict(&stack, &diagram, names::SHAPE_ATTACH, attach.into()), Verdict::Allowed);
        let attach_task = AttachShapeContext::new(Id::new("Rules_B"), Id::new("Rules_A"));
        assert_eq!(
            verdict(&stack, &diagram, names::SHAPE_ATTACH, attach_task.into()),
            Verdict::Denied
        );

        let tiny = ResizeShapeContext::new(Id::new("Rules_A"), Bounds::new(0.0, 0.0, 5.0, 80.0));
        assert_eq!(verdict(&stack, &diagram, names::SHAPE_RESIZE, tiny.into()), Verdict::Denied);
    }

    #[test]
    fn test_can_attach_rejects_nested_host() {
        let mut diagram = diagram();
        let semantics = KindSemantics::default();
        diagram
            .add_shape(
                Element::shape(
                    Id::new("Rules_Inner"),
                    Id::new("Task"),
                    Bounds::new(410.0, 10.0, 10.0, 10.0),
                ),
                Id::new("Rules_Event"),
                None,
            )
            .expect("nested");
        let event = diagram.element(Id::new("Rules_Event")).expect("live");
        let inner = diagram.element(Id::new("Rules_Inner")).expect("live");
        assert!(!can_attach(&diagram, &semantics, event, inner));

        let flow = Element::connection(
            Id::new("Rules_Flow"),
            Id::new("SequenceFlow"),
            waypoints_from([Point::new(0.0, 0.0), Point::new(10.0, 0.0)]),
        );
        assert!(!can_attach(&diagram, &semantics, event, &flow));
    }
}
