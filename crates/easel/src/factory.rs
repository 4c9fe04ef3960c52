//! Creates element prototypes with fresh ids and default sizes.

use easel_core::{
    element::Element,
    geometry::{Bounds, Point, Size},
    identifier::Id,
    ids::IdRegistry,
};

use crate::config::{AppConfig, ElementsConfig};

/// Builds detached elements ready to be passed to the create commands.
///
/// Shape and connection ids are generated as `<Type>_<n>` and claimed in
/// the diagram's [`IdRegistry`]; each element is its own business object.
#[derive(Debug, Clone)]
pub struct ElementFactory {
    elements: ElementsConfig,
    label_kind: Id,
}

impl ElementFactory {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            elements: config.elements().clone(),
            label_kind: Id::new(config.semantics().label_kind()),
        }
    }

    /// A shape of `type_name` at the origin with the configured default size.
    pub fn create_shape(&self, ids: &mut IdRegistry, type_name: &str) -> Element {
        let id = ids.next_prefixed(type_name);
        let size = self.elements.size_for(type_name);
        Element::shape(id, Id::new(type_name), Bounds::new_from_top_left(Point::default(), size))
            .with_business_object(id)
    }

    /// A connection of `type_name` without waypoints. `connection.create`
    /// lays it out.
    pub fn create_connection(&self, ids: &mut IdRegistry, type_name: Id) -> Element {
        let id = ids.next_prefixed(&type_name.as_string());
        Element::connection(id, type_name, Vec::new()).with_business_object(id)
    }

    /// The external label of `target`, sharing its business object.
    pub fn create_label(&self, target: &Element) -> Element {
        let size = self.elements.size_for(&self.label_kind.as_string());
        let label = Element::shape(
            target.id().with_suffix("label"),
            self.label_kind,
            Bounds::new_from_top_left(Point::default(), size),
        );
        match target.business_object() {
            Some(business_object) => label.with_business_object(business_object),
            None => label,
        }
    }

    /// Default size of labels.
    pub fn label_size(&self) -> Size {
        self.elements.size_for(&self.label_kind.as_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapes_get_prefixed_ids() {
        let factory = ElementFactory::new(&AppConfig::default());
        let mut ids = IdRegistry::new();

        let first = factory.create_shape(&mut ids, "Gateway");
        let second = factory.create_shape(&mut ids, "Gateway");
        assert_eq!(first.id(), "Gateway_1");
        assert_eq!(second.id(), "Gateway_2");
        assert_eq!(first.business_object(), Some(first.id()));
        assert_eq!(first.bounds().map(|bounds| bounds.width()), Some(50.0));
        assert_eq!(ids.assigned(second.id()), Some(second.id()));
    }

    #[test]
    fn test_label_shares_business_object() {
        let factory = ElementFactory::new(&AppConfig::default());
        let mut ids = IdRegistry::new();
        let task = factory.create_shape(&mut ids, "Task");

        let label = factory.create_label(&task);
        assert_eq!(label.id(), task.id().with_suffix("label"));
        assert_eq!(label.business_object(), task.business_object());
        assert_eq!(label.type_name(), "Label");
    }
}
