//! The element model: roots, shapes, labels and connections.
//!
//! Elements never own each other. Every relation (parent, children,
//! source/target, host/attachers, label/label target) is stored as an [`Id`]
//! and resolved through the [`Diagram`](crate::diagram::Diagram) arena, which
//! is also the only place allowed to change relations so both sides stay in
//! sync.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Bounds, Point},
    identifier::Id,
};

/// Coarse capability of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Root,
    Shape,
    Label,
    Connection,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Root => "root",
            ElementKind::Shape => "shape",
            ElementKind::Label => "label",
            ElementKind::Connection => "connection",
        };
        f.write_str(name)
    }
}

/// A single point of a connection path.
///
/// `original` holds the logical, uncropped position of a docked end point so
/// it can be cropped again after its shape moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    point: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original: Option<Point>,
}

impl Waypoint {
    pub fn new(point: Point) -> Self {
        Self {
            point,
            original: None,
        }
    }

    /// Creates a waypoint that remembers its uncropped position
    pub fn with_original(point: Point, original: Point) -> Self {
        Self {
            point,
            original: Some(original),
        }
    }

    pub fn point(&self) -> Point {
        self.point
    }

    pub fn original(&self) -> Option<Point> {
        self.original
    }

    /// Returns the uncropped position if known, else the point itself
    pub fn logical(&self) -> Point {
        self.original.unwrap_or(self.point)
    }

    pub fn x(&self) -> f32 {
        self.point.x()
    }

    pub fn y(&self) -> f32 {
        self.point.y()
    }

    /// Returns the same waypoint moved by `delta`, including its original
    pub fn translate(&self, delta: Point) -> Self {
        Self {
            point: self.point.add_point(delta),
            original: self.original.map(|original| original.add_point(delta)),
        }
    }
}

impl From<Point> for Waypoint {
    fn from(point: Point) -> Self {
        Self::new(point)
    }
}

/// Builds a waypoint list from plain points.
pub fn waypoints_from(points: impl IntoIterator<Item = Point>) -> Vec<Waypoint> {
    points.into_iter().map(Waypoint::new).collect()
}

/// Shape specific state.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeBody {
    pub(crate) bounds: Bounds,
    pub(crate) host: Option<Id>,
    pub(crate) attachers: Vec<Id>,
    pub(crate) label_target: Option<Id>,
}

/// Connection specific state.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionBody {
    pub(crate) source: Option<Id>,
    pub(crate) target: Option<Id>,
    pub(crate) waypoints: Vec<Waypoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Root,
    Shape(ShapeBody),
    Connection(ConnectionBody),
}

/// A diagram element.
///
/// Freshly constructed elements are detached: no parent and no relations.
/// They become part of a diagram through
/// [`Diagram::add_shape`](crate::diagram::Diagram::add_shape) or
/// [`Diagram::add_connection`](crate::diagram::Diagram::add_connection).
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub(crate) id: Id,
    pub(crate) type_name: Id,
    pub(crate) business_object: Option<Id>,
    pub(crate) parent: Option<Id>,
    pub(crate) children: Vec<Id>,
    pub(crate) incoming: Vec<Id>,
    pub(crate) outgoing: Vec<Id>,
    pub(crate) labels: Vec<Id>,
    pub(crate) hidden: bool,
    pub(crate) collapsed: bool,
    pub(crate) body: Body,
}

impl Element {
    fn with_body(id: Id, type_name: Id, body: Body) -> Self {
        Self {
            id,
            type_name,
            business_object: None,
            parent: None,
            children: Vec::new(),
            incoming: Vec::new(),
            outgoing: Vec::new(),
            labels: Vec::new(),
            hidden: false,
            collapsed: false,
            body,
        }
    }

    /// Creates a root container
    pub fn root(id: Id, type_name: Id) -> Self {
        Self::with_body(id, type_name, Body::Root)
    }

    /// Creates a detached shape with the given bounds
    pub fn shape(id: Id, type_name: Id, bounds: Bounds) -> Self {
        Self::with_body(
            id,
            type_name,
            Body::Shape(ShapeBody {
                bounds,
                host: None,
                attachers: Vec::new(),
                label_target: None,
            }),
        )
    }

    /// Creates a detached connection with the given path
    pub fn connection(id: Id, type_name: Id, waypoints: Vec<Waypoint>) -> Self {
        Self::with_body(
            id,
            type_name,
            Body::Connection(ConnectionBody {
                source: None,
                target: None,
                waypoints,
            }),
        )
    }

    pub fn with_business_object(mut self, business_object: Id) -> Self {
        self.business_object = Some(business_object);
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    /// Replaces the bounds of a shape prototype. No-op for other kinds.
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        if let Body::Shape(shape) = &mut self.body {
            shape.bounds = bounds;
        }
        self
    }

    /// Replaces the path of a connection prototype. No-op for other kinds.
    pub fn with_waypoints(mut self, waypoints: Vec<Waypoint>) -> Self {
        if let Body::Connection(connection) = &mut self.body {
            connection.waypoints = waypoints;
        }
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Returns the semantic kind tag, e.g. `Task` or `SequenceFlow`
    pub fn type_name(&self) -> Id {
        self.type_name
    }

    pub fn business_object(&self) -> Option<Id> {
        self.business_object
    }

    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    pub fn children(&self) -> &[Id] {
        &self.children
    }

    pub fn incoming(&self) -> &[Id] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[Id] {
        &self.outgoing
    }

    /// Labels annotating this element
    pub fn labels(&self) -> &[Id] {
        &self.labels
    }

    /// The primary label, if any
    pub fn label(&self) -> Option<Id> {
        self.labels.first().copied()
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn kind(&self) -> ElementKind {
        match &self.body {
            Body::Root => ElementKind::Root,
            Body::Shape(shape) if shape.label_target.is_some() => ElementKind::Label,
            Body::Shape(_) => ElementKind::Shape,
            Body::Connection(_) => ElementKind::Connection,
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.body, Body::Root)
    }

    /// True for shapes, including labels
    pub fn is_shape(&self) -> bool {
        matches!(self.body, Body::Shape(_))
    }

    pub fn is_label(&self) -> bool {
        self.kind() == ElementKind::Label
    }

    pub fn is_connection(&self) -> bool {
        matches!(self.body, Body::Connection(_))
    }

    pub fn as_shape(&self) -> Option<&ShapeBody> {
        match &self.body {
            Body::Shape(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_connection(&self) -> Option<&ConnectionBody> {
        match &self.body {
            Body::Connection(connection) => Some(connection),
            _ => None,
        }
    }

    pub(crate) fn shape_mut(&mut self) -> Option<&mut ShapeBody> {
        match &mut self.body {
            Body::Shape(shape) => Some(shape),
            _ => None,
        }
    }

    pub(crate) fn connection_mut(&mut self) -> Option<&mut ConnectionBody> {
        match &mut self.body {
            Body::Connection(connection) => Some(connection),
            _ => None,
        }
    }

    /// Bounds of a shape
    pub fn bounds(&self) -> Option<Bounds> {
        self.as_shape().map(|shape| shape.bounds)
    }

    pub fn host(&self) -> Option<Id> {
        self.as_shape().and_then(|shape| shape.host)
    }

    pub fn attachers(&self) -> &[Id] {
        self.as_shape()
            .map(|shape| shape.attachers.as_slice())
            .unwrap_or_default()
    }

    pub fn label_target(&self) -> Option<Id> {
        self.as_shape().and_then(|shape| shape.label_target)
    }

    pub fn source(&self) -> Option<Id> {
        self.as_connection().and_then(|connection| connection.source)
    }

    pub fn target(&self) -> Option<Id> {
        self.as_connection().and_then(|connection| connection.target)
    }

    /// Path of a connection; empty for other kinds
    pub fn waypoints(&self) -> &[Waypoint] {
        self.as_connection()
            .map(|connection| connection.waypoints.as_slice())
            .unwrap_or_default()
    }

    /// Plain points of the path
    pub fn points(&self) -> Vec<Point> {
        self.waypoints().iter().map(Waypoint::point).collect()
    }

    /// True if the element has no relation to any other element
    pub fn is_detached(&self) -> bool {
        self.parent.is_none()
            && self.children.is_empty()
            && self.incoming.is_empty()
            && self.outgoing.is_empty()
            && self.labels.is_empty()
            && self.host().is_none()
            && self.attachers().is_empty()
            && self.label_target().is_none()
            && self.source().is_none()
            && self.target().is_none()
    }
}

impl ShapeBody {
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn host(&self) -> Option<Id> {
        self.host
    }

    pub fn attachers(&self) -> &[Id] {
        &self.attachers
    }

    pub fn label_target(&self) -> Option<Id> {
        self.label_target
    }
}

impl ConnectionBody {
    pub fn source(&self) -> Option<Id> {
        self.source
    }

    pub fn target(&self) -> Option<Id> {
        self.target
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_accessors() {
        let shape = Element::shape(
            Id::new("Task_1"),
            Id::new("Task"),
            Bounds::new(0.0, 0.0, 100.0, 80.0),
        )
        .with_business_object(Id::new("Task_1"));

        assert_eq!(shape.kind(), ElementKind::Shape);
        assert!(shape.is_shape());
        assert!(!shape.is_connection());
        assert_eq!(shape.bounds(), Some(Bounds::new(0.0, 0.0, 100.0, 80.0)));
        assert_eq!(shape.business_object(), Some(Id::new("Task_1")));
        assert!(shape.waypoints().is_empty());
        assert!(shape.is_detached());
    }

    #[test]
    fn test_connection_accessors() {
        let connection = Element::connection(
            Id::new("Flow_1"),
            Id::new("SequenceFlow"),
            waypoints_from([Point::new(0.0, 0.0), Point::new(10.0, 0.0)]),
        );

        assert_eq!(connection.kind(), ElementKind::Connection);
        assert_eq!(connection.bounds(), None);
        assert_eq!(connection.points().len(), 2);
        assert!(connection.attachers().is_empty());
    }

    #[test]
    fn test_with_bounds_ignored_for_connection() {
        let connection = Element::connection(Id::new("Flow_2"), Id::new("SequenceFlow"), vec![])
            .with_bounds(Bounds::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(connection.bounds(), None);
    }

    #[test]
    fn test_waypoint_translate_moves_original() {
        let waypoint = Waypoint::with_original(Point::new(10.0, 0.0), Point::new(0.0, 0.0));
        let moved = waypoint.translate(Point::new(5.0, 5.0));

        assert_eq!(moved.point(), Point::new(15.0, 5.0));
        assert_eq!(moved.original(), Some(Point::new(5.0, 5.0)));
        assert_eq!(moved.logical(), Point::new(5.0, 5.0));
        assert_eq!(Waypoint::new(Point::new(1.0, 1.0)).logical(), Point::new(1.0, 1.0));
    }
}
