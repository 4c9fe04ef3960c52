//! Edit scripts: a TOML list of editing steps replayed against a modeler.
//!
//! ```toml
//! [[step]]
//! op = "create_shape"
//! name = "a"
//! type = "Task"
//! at = { x = 200.0, y = 150.0 }
//!
//! [[step]]
//! op = "connect"
//! source = "a"
//! target = "b"
//! ```
//!
//! Elements are referred to by the `name` given when they were created, or
//! by their id.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use easel::{
    EaselError, Modeler,
    command::context::Alignment,
    element::waypoints_from,
    geometry::{Axis, Bounds, Direction, Point},
    identifier::Id,
    layout::LayoutHints,
    modeling::Modeling,
};

use crate::error::CliError;

/// A parsed edit script.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    #[serde(default, rename = "step")]
    steps: Vec<Step>,
}

impl Script {
    /// Parses a script from TOML.
    ///
    /// # Errors
    ///
    /// [`CliError::Parse`] for malformed TOML or unknown steps.
    pub fn parse(source: &str) -> Result<Self, CliError> {
        toml::from_str(source).map_err(|err| CliError::Parse(err.to_string()))
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

/// Edge or axis to line elements up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Left,
    Right,
    Center,
    Top,
    Bottom,
    Middle,
}

/// Bounds as written in a script.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        Bounds::new(rect.x, rect.y, rect.width, rect.height)
    }
}

impl From<Bounds> for Rect {
    fn from(bounds: Bounds) -> Self {
        Rect {
            x: bounds.x(),
            y: bounds.y(),
            width: bounds.width(),
            height: bounds.height(),
        }
    }
}

fn once() -> usize {
    1
}

/// One editing step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    CreateShape {
        #[serde(rename = "type")]
        type_name: String,
        at: Point,
        name: Option<String>,
        /// Defaults to the current root.
        parent: Option<String>,
        /// Creates the shape on the boundary of this host.
        host: Option<String>,
    },
    CreateLabel {
        target: String,
        at: Point,
        name: Option<String>,
    },
    AppendShape {
        source: String,
        #[serde(rename = "type")]
        type_name: String,
        at: Point,
        name: Option<String>,
    },
    Connect {
        source: String,
        target: String,
        name: Option<String>,
    },
    Move {
        elements: Vec<String>,
        by: Point,
        parent: Option<String>,
        host: Option<String>,
    },
    Resize {
        shape: String,
        bounds: Rect,
    },
    Delete {
        elements: Vec<String>,
    },
    Attach {
        shape: String,
        host: String,
    },
    ToggleCollapse {
        shape: String,
    },
    Align {
        elements: Vec<String>,
        edge: Edge,
        /// Defaults to the matching edge of the elements' union.
        to: Option<f32>,
    },
    Distribute {
        elements: Vec<String>,
        axis: Axis,
    },
    Space {
        elements: Vec<String>,
        by: Point,
        direction: Direction,
        start: f32,
    },
    UpdateWaypoints {
        connection: String,
        points: Vec<Point>,
    },
    Layout {
        connection: String,
    },
    Undo {
        #[serde(default = "once")]
        times: usize,
    },
    Redo {
        #[serde(default = "once")]
        times: usize,
    },
}

impl Step {
    pub fn op(&self) -> &'static str {
        match self {
            Step::CreateShape { .. } => "create_shape",
            Step::CreateLabel { .. } => "create_label",
            Step::AppendShape { .. } => "append_shape",
            Step::Connect { .. } => "connect",
            Step::Move { .. } => "move",
            Step::Resize { .. } => "resize",
            Step::Delete { .. } => "delete",
            Step::Attach { .. } => "attach",
            Step::ToggleCollapse { .. } => "toggle_collapse",
            Step::Align { .. } => "align",
            Step::Distribute { .. } => "distribute",
            Step::Space { .. } => "space",
            Step::UpdateWaypoints { .. } => "update_waypoints",
            Step::Layout { .. } => "layout",
            Step::Undo { .. } => "undo",
            Step::Redo { .. } => "redo",
        }
    }
}

/// Replays steps against a modeler, keeping track of element names.
pub struct Runner {
    modeler: Modeler,
    names: BTreeMap<String, Id>,
}

impl Runner {
    pub fn new(modeler: Modeler) -> Self {
        Self {
            modeler,
            names: BTreeMap::new(),
        }
    }

    pub fn modeler(&self) -> &Modeler {
        &self.modeler
    }

    /// Id bound to `name`, if a step named an element so.
    pub fn named(&self, name: &str) -> Option<Id> {
        self.names.get(name).copied()
    }

    /// Runs every step of `script` in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// [`CliError::Script`] for unresolvable references and
    /// [`CliError::Command`] for steps the editing core rejects.
    pub fn run(&mut self, script: &Script) -> Result<(), CliError> {
        for (index, step) in script.steps().iter().enumerate() {
            let number = index + 1;
            debug!(step = number, op = step.op(); "Running step");
            self.step(number, step)?;
        }
        info!(steps = script.steps().len(); "Script replayed");
        Ok(())
    }

    fn step(&mut self, number: usize, step: &Step) -> Result<(), CliError> {
        let op = step.op();
        let failed = |source: EaselError| CliError::Command {
            step: number,
            op,
            source,
        };
        match step {
            Step::CreateShape {
                type_name,
                at,
                name,
                parent,
                host,
            } => {
                let id = match host {
                    Some(host) => {
                        let host = self.resolve(number, op, host)?;
                        self.modeler.create_attached_shape(type_name, *at, host)
                    }
                    None => {
                        let parent = match parent {
                            Some(parent) => self.resolve(number, op, parent)?,
                            None => self.modeler.diagram().current_root(),
                        };
                        self.modeler.create_shape(type_name, *at, parent)
                    }
                }
                .map_err(failed)?;
                self.bind(name.as_deref(), id);
            }
            Step::CreateLabel { target, at, name } => {
                let target = self.resolve(number, op, target)?;
                let id = self.modeler.create_label(target, *at).map_err(failed)?;
                self.bind(name.as_deref(), id);
            }
            Step::AppendShape {
                source,
                type_name,
                at,
                name,
            } => {
                let source = self.resolve(number, op, source)?;
                let id = self
                    .modeler
                    .append_shape(source, type_name, *at)
                    .map_err(failed)?;
                self.bind(name.as_deref(), id);
            }
            Step::Connect {
                source,
                target,
                name,
            } => {
                let source = self.resolve(number, op, source)?;
                let target = self.resolve(number, op, target)?;
                let id = self.modeler.connect(source, target).map_err(failed)?;
                self.bind(name.as_deref(), id);
            }
            Step::Move {
                elements,
                by,
                parent,
                host,
            } => {
                let elements = self.resolve_all(number, op, elements)?;
                let parent = self.resolve_opt(number, op, parent.as_deref())?;
                let host = self.resolve_opt(number, op, host.as_deref())?;
                self.modeler
                    .move_elements(elements, *by, parent, host)
                    .map_err(failed)?;
            }
            Step::Resize { shape, bounds } => {
                let shape = self.resolve(number, op, shape)?;
                self.modeler
                    .resize_shape(shape, (*bounds).into())
                    .map_err(failed)?;
            }
            Step::Delete { elements } => {
                let elements = self.resolve_all(number, op, elements)?;
                self.modeler.remove_elements(elements).map_err(failed)?;
            }
            Step::Attach { shape, host } => {
                let shape = self.resolve(number, op, shape)?;
                let host = self.resolve(number, op, host)?;
                self.modeler.attach_shape(shape, host).map_err(failed)?;
            }
            Step::ToggleCollapse { shape } => {
                let shape = self.resolve(number, op, shape)?;
                self.modeler.toggle_collapse(shape).map_err(failed)?;
            }
            Step::Align { elements, edge, to } => {
                let elements = self.resolve_all(number, op, elements)?;
                let alignment = match to {
                    Some(to) => alignment(*edge, *to),
                    None => {
                        let union = self
                            .union(&elements)
                            .ok_or_else(|| CliError::script(number, op, "no shapes to align"))?;
                        alignment(*edge, edge_of(*edge, union))
                    }
                };
                self.modeler
                    .align_elements(elements, alignment)
                    .map_err(failed)?;
            }
            Step::Distribute { elements, axis } => {
                let elements = self.resolve_all(number, op, elements)?;
                let distributed = self
                    .modeler
                    .distribute_elements(&elements, *axis)
                    .map_err(failed)?;
                if !distributed {
                    warn!(step = number; "Nothing to distribute");
                }
            }
            Step::Space {
                elements,
                by,
                direction,
                start,
            } => {
                let elements = self.resolve_all(number, op, elements)?;
                self.modeler
                    .space_tool(&elements, *by, *direction, *start)
                    .map_err(failed)?;
            }
            Step::UpdateWaypoints { connection, points } => {
                let connection = self.resolve(number, op, connection)?;
                self.modeler
                    .update_waypoints(connection, waypoints_from(points.iter().copied()))
                    .map_err(failed)?;
            }
            Step::Layout { connection } => {
                let connection = self.resolve(number, op, connection)?;
                self.modeler
                    .layout_connection(connection, LayoutHints::default())
                    .map_err(failed)?;
            }
            Step::Undo { times } => {
                for _ in 0..*times {
                    if !self.modeler.undo().map_err(failed)? {
                        warn!(step = number; "Nothing left to undo");
                        break;
                    }
                }
            }
            Step::Redo { times } => {
                for _ in 0..*times {
                    if !self.modeler.redo().map_err(failed)? {
                        warn!(step = number; "Nothing left to redo");
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn bind(&mut self, name: Option<&str>, id: Id) {
        if let Some(name) = name {
            debug!(name, id:%; "Bound element name");
            self.names.insert(name.to_string(), id);
        }
    }

    fn resolve(&self, step: usize, op: &'static str, reference: &str) -> Result<Id, CliError> {
        if let Some(id) = self.named(reference) {
            return Ok(id);
        }
        let id = Id::new(reference);
        if self.modeler.diagram().contains(id) {
            Ok(id)
        } else {
            Err(CliError::script(
                step,
                op,
                format!("unknown element `{reference}`"),
            ))
        }
    }

    fn resolve_opt(
        &self,
        step: usize,
        op: &'static str,
        reference: Option<&str>,
    ) -> Result<Option<Id>, CliError> {
        reference
            .map(|reference| self.resolve(step, op, reference))
            .transpose()
    }

    fn resolve_all(
        &self,
        step: usize,
        op: &'static str,
        references: &[String],
    ) -> Result<Vec<Id>, CliError> {
        references
            .iter()
            .map(|reference| self.resolve(step, op, reference))
            .collect()
    }

    fn union(&self, elements: &[Id]) -> Option<Bounds> {
        let diagram = self.modeler.diagram();
        elements
            .iter()
            .filter_map(|id| diagram.get(*id).and_then(|element| element.bounds()))
            .reduce(|union, bounds| union.merge(&bounds))
    }

    pub fn into_modeler(self) -> Modeler {
        self.modeler
    }
}

fn alignment(edge: Edge, to: f32) -> Alignment {
    match edge {
        Edge::Left => Alignment::Left(to),
        Edge::Right => Alignment::Right(to),
        Edge::Center => Alignment::Center(to),
        Edge::Top => Alignment::Top(to),
        Edge::Bottom => Alignment::Bottom(to),
        Edge::Middle => Alignment::Middle(to),
    }
}

fn edge_of(edge: Edge, bounds: Bounds) -> f32 {
    match edge {
        Edge::Left => bounds.min_x(),
        Edge::Right => bounds.max_x(),
        Edge::Center => bounds.center().x().round(),
        Edge::Top => bounds.min_y(),
        Edge::Bottom => bounds.max_y(),
        Edge::Middle => bounds.center().y().round(),
    }
}

/// One element of a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub waypoints: Vec<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_target: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub collapsed: bool,
}

/// The element graph and history state after a script run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub root: String,
    pub undo_depth: usize,
    pub can_redo: bool,
    #[serde(default)]
    pub names: BTreeMap<String, String>,
    #[serde(default, rename = "element")]
    pub elements: Vec<ElementSnapshot>,
}

impl Snapshot {
    /// Captures the state of `runner`. Elements are listed by id.
    pub fn capture(runner: &Runner) -> Self {
        let modeler = runner.modeler();
        let diagram = modeler.diagram();
        let name = |id: Option<Id>| id.map(|id| id.to_string());

        let mut elements: Vec<ElementSnapshot> = diagram
            .elements()
            .map(|element| ElementSnapshot {
                id: element.id().to_string(),
                type_name: element.type_name().to_string(),
                kind: element.kind().to_string(),
                parent: name(element.parent()),
                bounds: element.bounds().map(Rect::from),
                waypoints: element.points(),
                source: name(element.source()),
                target: name(element.target()),
                host: name(element.host()),
                label_target: name(element.label_target()),
                hidden: element.hidden(),
                collapsed: element.collapsed(),
            })
            .collect();
        elements.sort_by(|a, b| a.id.cmp(&b.id));

        Snapshot {
            root: diagram.current_root().to_string(),
            undo_depth: modeler.stack().undo_depth(),
            can_redo: modeler.can_redo(),
            names: runner
                .names
                .iter()
                .map(|(name, id)| (name.clone(), id.to_string()))
                .collect(),
            elements,
        }
    }

    /// Renders the snapshot as TOML.
    ///
    /// # Errors
    ///
    /// [`CliError::Snapshot`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, CliError> {
        toml::to_string(self).map_err(|err| CliError::Snapshot(err.to_string()))
    }

    pub fn element(&self, id: &str) -> Option<&ElementSnapshot> {
        self.elements.iter().find(|element| element.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        let script = Script::parse(
            r#"
            [[step]]
            op = "create_shape"
            name = "a"
            type = "Task"
            at = { x = 200.0, y = 150.0 }

            [[step]]
            op = "align"
            elements = ["a"]
            edge = "left"

            [[step]]
            op = "space"
            elements = ["a"]
            by = { x = 100.0, y = 0.0 }
            direction = "e"
            start = 50.0

            [[step]]
            op = "undo"
            "#,
        )
        .expect("parsed");

        assert_eq!(script.steps().len(), 4);
        assert_eq!(
            script.steps()[0],
            Step::CreateShape {
                type_name: "Task".to_string(),
                at: Point::new(200.0, 150.0),
                name: Some("a".to_string()),
                parent: None,
                host: None,
            }
        );
        assert_eq!(script.steps()[1].op(), "align");
        assert!(matches!(
            script.steps()[2],
            Step::Space {
                direction: Direction::East,
                ..
            }
        ));
        assert_eq!(script.steps()[3], Step::Undo { times: 1 });
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        let err = Script::parse("[[step]]\nop = \"teleport\"\n").expect_err("unknown");
        assert!(matches!(err, CliError::Parse(_)));
    }

    #[test]
    fn test_edges_of_union() {
        let bounds = Bounds::new(10.0, 20.0, 101.0, 40.0);
        assert_eq!(edge_of(Edge::Left, bounds), 10.0);
        assert_eq!(edge_of(Edge::Right, bounds), 111.0);
        assert_eq!(edge_of(Edge::Center, bounds), 61.0);
        assert_eq!(edge_of(Edge::Bottom, bounds), 60.0);
    }
}
