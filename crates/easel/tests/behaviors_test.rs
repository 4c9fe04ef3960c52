//! Default behaviors exercised through a full modeler.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use easel::{
    Modeler, ModelerBuilder,
    behaviors::StickyAttach,
    command::names,
    config::{AppConfig, LayoutConfig, Router},
    layout::{ConnectionDocking, CroppingDocking},
    modeling::Modeling,
};
use easel_core::{
    diagram::Diagram,
    element::{Element, waypoints_from},
    geometry::{Bounds, Point},
    identifier::Id,
};

fn modeler() -> Modeler {
    ModelerBuilder::default().build().expect("valid configuration")
}

fn shape_at(modeler: &mut Modeler, type_name: &str, x: f32, y: f32) -> Id {
    let root = modeler.diagram().current_root();
    modeler
        .create_shape(type_name, Point::new(x, y), root)
        .expect("created")
}

#[test]
fn test_create_on_flow_splits_the_flow() {
    let mut modeler = modeler();
    let a = shape_at(&mut modeler, "Task", 200.0, 150.0);
    let b = shape_at(&mut modeler, "Task", 600.0, 150.0);
    let flow = modeler.connect(a, b).expect("connected");

    let gateway = modeler
        .create_shape("Gateway", Point::new(400.0, 150.0), flow)
        .expect("created on flow");

    let diagram = modeler.diagram();
    let root = diagram.current_root();
    let gateway_element = diagram.element(gateway).expect("live");
    assert_eq!(gateway_element.parent(), Some(root));

    let reused = diagram.element(flow).expect("live");
    assert_eq!(reused.source(), Some(a));
    assert_eq!(reused.target(), Some(gateway));
    assert_eq!(reused.points().last(), Some(&Point::new(375.0, 150.0)));

    assert_eq!(gateway_element.outgoing().len(), 1);
    let second = diagram.element(gateway_element.outgoing()[0]).expect("live");
    assert_eq!(second.target(), Some(b));
    assert_eq!(
        second.points(),
        vec![Point::new(425.0, 150.0), Point::new(550.0, 150.0)]
    );
    diagram.check_invariants().expect("consistent");

    modeler.undo().expect("undone");
    let diagram = modeler.diagram();
    assert!(!diagram.contains(gateway));
    assert_eq!(diagram.element(flow).expect("live").target(), Some(b));
    assert_eq!(diagram.element(a).expect("live").outgoing(), &[flow]);
    assert_eq!(diagram.element(b).expect("live").incoming(), &[flow]);
}

#[test]
fn test_attachable_shapes_are_not_inserted() {
    let mut modeler = modeler();
    let a = shape_at(&mut modeler, "Task", 200.0, 150.0);
    let b = shape_at(&mut modeler, "Task", 600.0, 150.0);
    let flow = modeler.connect(a, b).expect("connected");

    let err = modeler
        .create_shape("BoundaryEvent", Point::new(400.0, 150.0), flow)
        .expect_err("denied");

    assert!(matches!(err, easel::EaselError::Denied { .. }));
    assert_eq!(modeler.diagram().element(flow).expect("live").target(), Some(b));
}

#[test]
fn test_moving_into_container_drops_crossing_flow() {
    let mut modeler = modeler();
    let container = shape_at(&mut modeler, "SubProcess", 500.0, 300.0);
    let a = shape_at(&mut modeler, "Task", 100.0, 300.0);
    let b = shape_at(&mut modeler, "Task", 900.0, 300.0);
    let flow = modeler.connect(a, b).expect("connected");

    modeler
        .move_elements(vec![b], Point::new(-300.0, 0.0), Some(container), None)
        .expect("moved");

    let diagram = modeler.diagram();
    assert_eq!(diagram.element(b).expect("live").parent(), Some(container));
    assert!(!diagram.contains(flow));
    assert_eq!(diagram.ids().assigned(flow), None);

    modeler.undo().expect("undone");
    let diagram = modeler.diagram();
    assert!(diagram.contains(flow));
    assert_eq!(diagram.element(b).expect("live").parent(), Some(diagram.current_root()));
    assert_eq!(diagram.ids().assigned(flow), Some(flow));
}

#[test]
fn test_moving_together_keeps_flow() {
    let mut modeler = modeler();
    let container = shape_at(&mut modeler, "SubProcess", 500.0, 600.0);
    let a = shape_at(&mut modeler, "Task", 100.0, 300.0);
    let b = shape_at(&mut modeler, "Task", 300.0, 300.0);
    let flow = modeler.connect(a, b).expect("connected");

    modeler
        .move_elements(vec![a, b], Point::new(300.0, 300.0), Some(container), None)
        .expect("moved");

    let diagram = modeler.diagram();
    assert!(diagram.contains(flow));
    assert_eq!(diagram.element(flow).expect("live").parent(), Some(container));
}

#[test]
fn test_grid_snaps_middle_segment() {
    let layout = LayoutConfig::new(Router::Manhattan, 3, true);
    let mut modeler = Modeler::builder(AppConfig::default().with_layout(layout))
        .build()
        .expect("valid configuration");
    let a = shape_at(&mut modeler, "Task", 100.0, 100.0);
    let b = shape_at(&mut modeler, "Task", 403.0, 137.0);

    let flow = modeler.connect(a, b).expect("connected");

    assert_eq!(
        modeler.diagram().element(flow).expect("live").points(),
        vec![
            Point::new(150.0, 100.0),
            Point::new(250.0, 100.0),
            Point::new(250.0, 137.0),
            Point::new(353.0, 137.0),
        ]
    );
    assert!(
        modeler
            .stack()
            .applied_commands()
            .any(|name| name == names::CONNECTION_UPDATE_WAYPOINTS)
    );
}

#[test]
fn test_attachers_follow_host_resize() {
    let mut modeler = modeler();
    let host = shape_at(&mut modeler, "Task", 200.0, 150.0);
    let event = modeler
        .create_attached_shape("BoundaryEvent", Point::new(250.0, 190.0), host)
        .expect("created");

    modeler
        .resize_shape(host, Bounds::new(150.0, 110.0, 200.0, 80.0))
        .expect("resized");

    let center = modeler.diagram().bounds(event).expect("shape").center();
    assert_eq!(center, Point::new(350.0, 190.0));

    modeler.undo().expect("undone");
    let center = modeler.diagram().bounds(event).expect("shape").center();
    assert_eq!(center, Point::new(250.0, 190.0));
}

#[test]
fn test_moving_attacher_away_detaches_it() {
    let mut modeler = modeler();
    let host = shape_at(&mut modeler, "Task", 200.0, 150.0);
    let event = modeler
        .create_attached_shape("BoundaryEvent", Point::new(250.0, 190.0), host)
        .expect("created");
    let root = modeler.diagram().current_root();

    modeler
        .move_elements(vec![event], Point::new(300.0, 300.0), Some(root), None)
        .expect("moved");
    assert_eq!(modeler.diagram().element(event).expect("live").host(), None);
    assert!(modeler.diagram().element(host).expect("live").attachers().is_empty());

    modeler.undo().expect("undone");
    assert_eq!(modeler.diagram().element(event).expect("live").host(), Some(host));
}

#[test]
fn test_reattach_to_other_host() {
    let mut modeler = modeler();
    let first = shape_at(&mut modeler, "Task", 200.0, 150.0);
    let second = shape_at(&mut modeler, "Task", 500.0, 150.0);
    let event = modeler
        .create_attached_shape("BoundaryEvent", Point::new(250.0, 190.0), first)
        .expect("created");

    let drag = StickyAttach::start(modeler.diagram(), modeler.config(), event).expect("started");
    let drop = drag
        .end(modeler.diagram(), Point::new(520.0, 170.0))
        .expect("dropped on a shape");
    assert_eq!(drop, second);

    let root = modeler.diagram().current_root();
    modeler
        .move_elements(vec![event], Point::new(300.0, 0.0), Some(root), Some(drop))
        .expect("moved");

    let diagram = modeler.diagram();
    assert_eq!(diagram.element(event).expect("live").host(), Some(second));
    assert_eq!(diagram.element(second).expect("live").attachers(), &[event]);
    assert!(diagram.element(first).expect("live").attachers().is_empty());
    diagram.check_invariants().expect("consistent");
}

#[test]
fn test_deleting_label_alone_unlinks_it() {
    let mut modeler = modeler();
    let task = shape_at(&mut modeler, "Task", 200.0, 150.0);
    let label = modeler
        .create_label(task, Point::new(200.0, 220.0))
        .expect("labelled");

    modeler.remove_shape(label).expect("deleted");
    assert!(modeler.diagram().element(task).expect("live").labels().is_empty());
    assert_eq!(modeler.diagram().ids().assigned(task), Some(task));

    modeler.undo().expect("undone");
    assert_eq!(modeler.diagram().element(task).expect("live").labels(), &[label]);
}

#[test]
fn test_without_default_behaviors_delete_keeps_strict_links() {
    let mut modeler = ModelerBuilder::default()
        .without_default_behaviors()
        .build()
        .expect("valid configuration");
    let task = shape_at(&mut modeler, "Task", 200.0, 150.0);
    let label = modeler
        .create_label(task, Point::new(200.0, 220.0))
        .expect("labelled");

    assert!(modeler.remove_shape(task).is_err());
    assert!(modeler.diagram().contains(task));
    assert!(modeler.diagram().contains(label));
}

fn docking_diagram(target: Bounds) -> Diagram {
    let root = Id::new("Dock_Root");
    let mut diagram = Diagram::new(root, Id::new("Process"));
    let source = Bounds::new(0.0, 0.0, 100.0, 80.0);
    for (name, bounds) in [("Dock_A", source), ("Dock_B", target)] {
        diagram
            .add_shape(Element::shape(Id::new(name), Id::new("Task"), bounds), root, None)
            .expect("added");
    }
    let path = waypoints_from([source.center(), target.center()]);
    diagram
        .add_connection(
            Element::connection(Id::new("Dock_F"), Id::new("SequenceFlow"), path),
            Id::new("Dock_A"),
            Id::new("Dock_B"),
            root,
            None,
        )
        .expect("connected");
    diagram
}

fn check_docking_is_deterministic(x: f32, y: f32) -> Result<(), TestCaseError> {
    let diagram = docking_diagram(Bounds::new(x, y, 100.0, 80.0));
    let docking = CroppingDocking;
    let connection = Id::new("Dock_F");
    for (shape, start) in [(Id::new("Dock_A"), true), (Id::new("Dock_B"), false)] {
        let first = docking
            .docking_point(&diagram, connection, shape, start)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let second = docking
            .docking_point(&diagram, connection, shape, start)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        prop_assert_eq!(first, second);
        let bounds = diagram.bounds(shape).map_err(|err| TestCaseError::fail(err.to_string()))?;
        prop_assert!(bounds.expand(0.5).contains(first.actual()));
    }
    let cropped = docking
        .cropped_waypoints(&diagram, connection)
        .map_err(|err| TestCaseError::fail(err.to_string()))?;
    prop_assert_eq!(cropped[0].logical(), Point::new(50.0, 40.0));
    Ok(())
}

proptest! {
    #[test]
    fn prop_docking_is_deterministic(x in 200.0f32..800.0, y in -400.0f32..400.0) {
        check_docking_is_deterministic(x.round(), y.round())?;
    }
}
