//! The semantic capability.
//!
//! The editing core never looks into business objects. Behaviors that need
//! to know whether two elements may be connected, or whether a connection
//! may not cross containers, ask a [`Semantics`] implementation instead.

use easel_core::{element::Element, identifier::Id};

use crate::config::SemanticsConfig;

/// Answers the questions rules and behaviors have about element types.
pub trait Semantics {
    /// Whether a connection of `connection_type` may link `source` to `target`.
    fn can_connect(&self, source: &Element, target: &Element, connection_type: Id) -> bool;

    /// Whether `shape` may be dropped onto `flow`, splitting it in two.
    fn can_insert(&self, shape: &Element, flow: &Element) -> bool;

    /// Whether connections of this type must stay inside one container.
    fn is_sequence(&self, connection_type: Id) -> bool;

    /// Whether `shape` can be attached to the boundary of another shape.
    fn is_attachable(&self, shape: &Element) -> bool;

    /// Type of the connection created between `source` and `target` when the
    /// caller does not name one.
    fn connection_type(&self, source: &Element, target: &Element) -> Id;
}

/// [`Semantics`] driven by type names from configuration.
#[derive(Debug, Clone)]
pub struct KindSemantics {
    sequence_kinds: Vec<Id>,
    attachable_kinds: Vec<Id>,
    connection_type: Id,
    label_kind: Id,
}

impl KindSemantics {
    pub fn from_config(config: &SemanticsConfig) -> Self {
        let ids = |names: &[String]| names.iter().map(|name| Id::new(name)).collect();
        Self {
            sequence_kinds: ids(config.sequence_kinds()),
            attachable_kinds: ids(config.attachable_kinds()),
            connection_type: Id::new(config.connection_type()),
            label_kind: Id::new(config.label_kind()),
        }
    }

    fn is_plain_shape(&self, element: &Element) -> bool {
        element.is_shape() && !element.is_label() && element.type_name() != self.label_kind
    }
}

impl Default for KindSemantics {
    fn default() -> Self {
        Self::from_config(&SemanticsConfig::default())
    }
}

impl Semantics for KindSemantics {
    fn can_connect(&self, source: &Element, target: &Element, connection_type: Id) -> bool {
        if source.is_root() || target.is_root() || source.is_label() || target.is_label() {
            return false;
        }
        if source.id() == target.id() {
            return false;
        }
        if self.is_sequence(connection_type) {
            return self.is_plain_shape(source) && self.is_plain_shape(target);
        }
        true
    }

    fn can_insert(&self, shape: &Element, flow: &Element) -> bool {
        flow.is_connection()
            && self.is_sequence(flow.type_name())
            && self.is_plain_shape(shape)
            && !self.is_attachable(shape)
            && flow.source() != Some(shape.id())
            && flow.target() != Some(shape.id())
    }

    fn is_sequence(&self, connection_type: Id) -> bool {
        self.sequence_kinds.contains(&connection_type)
    }

    fn is_attachable(&self, shape: &Element) -> bool {
        shape.is_shape() && self.attachable_kinds.contains(&shape.type_name())
    }

    fn connection_type(&self, _source: &Element, _target: &Element) -> Id {
        self.connection_type
    }
}

#[cfg(test)]
mod tests {
    use easel_core::{element::waypoints_from, geometry::{Bounds, Point}};

    use super::*;

    fn shape(name: &str, type_name: &str) -> Element {
        Element::shape(Id::new(name), Id::new(type_name), Bounds::new(0.0, 0.0, 100.0, 80.0))
    }

    #[test]
    fn test_sequence_connects_plain_shapes() {
        let semantics = KindSemantics::default();
        let flow = Id::new("SequenceFlow");
        let a = shape("Sem_A", "Task");
        let b = shape("Sem_B", "Task");

        assert!(semantics.can_connect(&a, &b, flow));
        assert!(!semantics.can_connect(&a, &a, flow));
        assert!(!semantics.can_connect(&a, &Element::root(Id::new("Sem_R"), Id::new("Process")), flow));
        assert_eq!(semantics.connection_type(&a, &b), flow);
    }

    #[test]
    fn test_insert_only_into_sequence_flows() {
        let semantics = KindSemantics::default();
        let task = shape("Sem_Task", "Task");
        let boundary = shape("Sem_Boundary", "BoundaryEvent");
        let path = waypoints_from([Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        let flow = Element::connection(Id::new("Sem_Flow"), Id::new("SequenceFlow"), path.clone());
        let association = Element::connection(Id::new("Sem_Assoc"), Id::new("Association"), path);

        assert!(semantics.can_insert(&task, &flow));
        assert!(!semantics.can_insert(&boundary, &flow));
        assert!(!semantics.can_insert(&task, &association));
        assert!(semantics.is_attachable(&boundary));
        assert!(!semantics.is_sequence(Id::new("Association")));
    }
}
