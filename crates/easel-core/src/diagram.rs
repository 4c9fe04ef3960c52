//! The element arena.
//!
//! [`Diagram`] exclusively owns every [`Element`]. Relations are stored as
//! ids on both ends and are only changed through the `set_*` helpers here,
//! which update both sides at once and report the previous position so a
//! command can put things back exactly where they were.

use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use log::trace;

use crate::{
    element::{Body, ConnectionBody, Element, ElementKind, ShapeBody, Waypoint},
    error::ModelError,
    geometry::{Bounds, Point},
    identifier::Id,
    ids::IdRegistry,
};

/// Position of an id inside one of an owner's relation lists.
///
/// Returned by the relation setters so the change can be reverted with the
/// same ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    owner: Id,
    index: usize,
}

impl Slot {
    pub fn new(owner: Id, index: usize) -> Self {
        Self { owner, index }
    }

    pub fn owner(&self) -> Id {
        self.owner
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// Everything [`Diagram::remove`] unlinked, for [`Diagram::restore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Detachment {
    parent: Option<Slot>,
    source: Option<Slot>,
    target: Option<Slot>,
}

impl Detachment {
    pub fn parent(&self) -> Option<Slot> {
        self.parent
    }

    pub fn source(&self) -> Option<Slot> {
        self.source
    }

    pub fn target(&self) -> Option<Slot> {
        self.target
    }
}

/// Live and removed elements.
///
/// Removed elements are kept in a detached pool with their own state intact
/// so an undo can put the very same element back.
#[derive(Debug, Clone, Default)]
pub struct ElementRegistry {
    live: IndexMap<Id, Element>,
    detached: HashMap<Id, Element>,
}

impl ElementRegistry {
    pub fn get(&self, id: Id) -> Option<&Element> {
        self.live.get(&id)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.live.contains_key(&id)
    }

    /// Live elements in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.live.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.live.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Returns a removed element
    pub fn detached(&self, id: Id) -> Option<&Element> {
        self.detached.get(&id)
    }
}

/// Result of [`Diagram::closure`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Closure {
    all_shapes: IndexSet<Id>,
    all_connections: IndexSet<Id>,
    enclosed_elements: IndexSet<Id>,
    enclosed_connections: IndexSet<Id>,
    top_level: IndexSet<Id>,
}

impl Closure {
    /// Every shape in the selection, including nested children
    pub fn all_shapes(&self) -> &IndexSet<Id> {
        &self.all_shapes
    }

    /// Every connection touching a shape of the closure
    pub fn all_connections(&self) -> &IndexSet<Id> {
        &self.all_connections
    }

    /// Selected elements, nested children and enclosed connections
    pub fn enclosed_elements(&self) -> &IndexSet<Id> {
        &self.enclosed_elements
    }

    /// Connections with both ends inside the closure
    pub fn enclosed_connections(&self) -> &IndexSet<Id> {
        &self.enclosed_connections
    }

    /// Selected elements without a selected ancestor
    pub fn top_level(&self) -> &IndexSet<Id> {
        &self.top_level
    }
}

/// An element graph with one or more roots.
#[derive(Debug, Clone)]
pub struct Diagram {
    registry: ElementRegistry,
    roots: Vec<Id>,
    current_root: Id,
    ids: IdRegistry,
}

impl Diagram {
    /// Creates a diagram with a single root, which becomes the current root.
    pub fn new(root_id: Id, root_type: Id) -> Self {
        let mut registry = ElementRegistry::default();
        registry
            .live
            .insert(root_id, Element::root(root_id, root_type));
        Self {
            registry,
            roots: vec![root_id],
            current_root: root_id,
            ids: IdRegistry::new(),
        }
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    pub fn ids(&self) -> &IdRegistry {
        &self.ids
    }

    pub fn ids_mut(&mut self) -> &mut IdRegistry {
        &mut self.ids
    }

    pub fn roots(&self) -> &[Id] {
        &self.roots
    }

    pub fn current_root(&self) -> Id {
        self.current_root
    }

    /// Adds another root, e.g. a second page.
    ///
    /// # Errors
    ///
    /// Fails if the element is not a root or its id is taken.
    pub fn add_root(&mut self, root: Element) -> Result<(), ModelError> {
        if !root.is_root() {
            return Err(wrong_kind(&root, ElementKind::Root));
        }
        if self.registry.contains(root.id) {
            return Err(ModelError::DuplicateId(root.id));
        }
        self.roots.push(root.id);
        self.registry.live.insert(root.id, root);
        Ok(())
    }

    /// Switches the rendered root. Returns the previous one.
    pub fn set_current_root(&mut self, id: Id) -> Result<Id, ModelError> {
        if !self.roots.contains(&id) {
            return Err(ModelError::UnknownElement(id));
        }
        Ok(std::mem::replace(&mut self.current_root, id))
    }

    pub fn get(&self, id: Id) -> Option<&Element> {
        self.registry.get(id)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.registry.contains(id)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.registry.iter()
    }

    /// Looks up a live element.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownElement`] if `id` is not live.
    pub fn element(&self, id: Id) -> Result<&Element, ModelError> {
        self.registry.get(id).ok_or(ModelError::UnknownElement(id))
    }

    /// Looks up a live shape or label
    pub fn shape(&self, id: Id) -> Result<&Element, ModelError> {
        let element = self.element(id)?;
        if element.is_shape() {
            Ok(element)
        } else {
            Err(wrong_kind(element, ElementKind::Shape))
        }
    }

    /// Looks up a live connection
    pub fn connection(&self, id: Id) -> Result<&Element, ModelError> {
        let element = self.element(id)?;
        if element.is_connection() {
            Ok(element)
        } else {
            Err(wrong_kind(element, ElementKind::Connection))
        }
    }

    /// Bounds of a live shape
    pub fn bounds(&self, id: Id) -> Result<Bounds, ModelError> {
        let shape = self.shape(id)?;
        Ok(shape.bounds().unwrap_or_default())
    }

    /// Path of a live connection
    pub fn waypoints(&self, id: Id) -> Result<&[Waypoint], ModelError> {
        Ok(self.connection(id)?.waypoints())
    }

    fn element_mut(&mut self, id: Id) -> Result<&mut Element, ModelError> {
        self.registry
            .live
            .get_mut(&id)
            .ok_or(ModelError::UnknownElement(id))
    }

    /// Inserts a detached shape under `parent`.
    ///
    /// Returns the index the shape took among the parent's children.
    pub fn add_shape(
        &mut self,
        element: Element,
        parent: Id,
        index: Option<usize>,
    ) -> Result<usize, ModelError> {
        if !element.is_shape() {
            return Err(wrong_kind(&element, ElementKind::Shape));
        }
        let id = element.id;
        self.insert_detached(element)?;
        self.set_parent(id, Some(parent), index)?;
        trace!(id:%, parent:%; "Added shape");
        self.index_in_parent(id)
    }

    /// Inserts a detached connection between `source` and `target`.
    ///
    /// Returns the index the connection took among the parent's children.
    pub fn add_connection(
        &mut self,
        element: Element,
        source: Id,
        target: Id,
        parent: Id,
        index: Option<usize>,
    ) -> Result<usize, ModelError> {
        if !element.is_connection() {
            return Err(wrong_kind(&element, ElementKind::Connection));
        }
        let count = element.waypoints().len();
        if count < 2 {
            return Err(ModelError::InvalidWaypoints {
                id: element.id,
                count,
            });
        }
        self.element(source)?;
        self.element(target)?;

        let id = element.id;
        self.insert_detached(element)?;
        self.set_source(id, Some(source), None)?;
        self.set_target(id, Some(target), None)?;
        self.set_parent(id, Some(parent), index)?;
        trace!(id:%, source:%, target:%; "Added connection");
        self.index_in_parent(id)
    }

    fn insert_detached(&mut self, element: Element) -> Result<(), ModelError> {
        if self.registry.contains(element.id) {
            return Err(ModelError::DuplicateId(element.id));
        }
        if !element.is_detached() {
            return Err(ModelError::StillLinked {
                id: element.id,
                relation: "relations",
            });
        }
        self.registry.detached.remove(&element.id);
        self.registry.live.insert(element.id, element);
        Ok(())
    }

    fn index_in_parent(&self, id: Id) -> Result<usize, ModelError> {
        let parent = self.element(id)?.parent.ok_or(ModelError::MissingParent(id))?;
        self.element(parent)?
            .children
            .iter()
            .position(|child| *child == id)
            .ok_or_else(|| ModelError::Invariant(format!("`{id}` missing from `{parent}`")))
    }

    /// Removes an element from the graph into the detached pool.
    ///
    /// A connection is unlinked from its source and target as part of the
    /// removal. A shape must already be free of children, connections,
    /// labels and attachments.
    pub fn remove(&mut self, id: Id) -> Result<Detachment, ModelError> {
        let element = self.element(id)?;
        if element.is_root() {
            return Err(wrong_kind(element, ElementKind::Shape));
        }
        let linked = if !element.children.is_empty() {
            Some("children")
        } else if !element.incoming.is_empty() || !element.outgoing.is_empty() {
            Some("connections")
        } else if !element.labels.is_empty() {
            Some("labels")
        } else if !element.attachers().is_empty() {
            Some("attachers")
        } else if element.host().is_some() {
            Some("a host")
        } else if element.label_target().is_some() {
            Some("a label target")
        } else {
            None
        };
        if let Some(relation) = linked {
            return Err(ModelError::StillLinked { id, relation });
        }
        let is_connection = element.is_connection();

        let mut detachment = Detachment::default();
        if is_connection {
            detachment.source = self.set_source(id, None, None)?;
            detachment.target = self.set_target(id, None, None)?;
        }
        detachment.parent = self.set_parent(id, None, None)?;

        if let Some(element) = self.registry.live.shift_remove(&id) {
            self.registry.detached.insert(id, element);
        }
        trace!(id:%; "Removed element");
        Ok(detachment)
    }

    /// Puts a removed element back exactly where [`Diagram::remove`] took it from.
    ///
    /// Source and target are restored before the parent.
    pub fn restore(&mut self, id: Id, detachment: &Detachment) -> Result<(), ModelError> {
        if self.registry.contains(id) {
            return Err(ModelError::DuplicateId(id));
        }
        let element = self
            .registry
            .detached
            .remove(&id)
            .ok_or(ModelError::UnknownElement(id))?;
        self.registry.live.insert(id, element);

        if let Some(slot) = detachment.source {
            self.set_source(id, Some(slot.owner), Some(slot.index))?;
        }
        if let Some(slot) = detachment.target {
            self.set_target(id, Some(slot.owner), Some(slot.index))?;
        }
        if let Some(slot) = detachment.parent {
            self.set_parent(id, Some(slot.owner), Some(slot.index))?;
        }
        trace!(id:%; "Restored element");
        Ok(())
    }

    /// Moves `id` under `parent` at `index` (appended when `None`).
    ///
    /// Returns the previous parent slot.
    ///
    /// # Errors
    ///
    /// Fails for roots, for parents that are connections and for moves that
    /// would make an element its own ancestor.
    pub fn set_parent(
        &mut self,
        id: Id,
        parent: Option<Id>,
        index: Option<usize>,
    ) -> Result<Option<Slot>, ModelError> {
        let element = self.element(id)?;
        if element.is_root() {
            return Err(wrong_kind(element, ElementKind::Shape));
        }
        if let Some(parent) = parent {
            let container = self.element(parent)?;
            if container.is_connection() {
                return Err(ModelError::NotAContainer(parent));
            }
            if parent == id || self.is_ancestor(id, parent) {
                return Err(ModelError::Invariant(format!(
                    "`{id}` cannot become a child of its descendant `{parent}`"
                )));
            }
        }

        let previous = self.element(id)?.parent;
        let old_slot = match previous {
            Some(old) => remove_from(&mut self.element_mut(old)?.children, id)
                .map(|index| Slot::new(old, index)),
            None => None,
        };
        self.element_mut(id)?.parent = parent;
        if let Some(parent) = parent {
            insert_at(&mut self.element_mut(parent)?.children, id, index);
        }
        Ok(old_slot)
    }

    /// Changes the source of a connection. Returns the previous source slot.
    pub fn set_source(
        &mut self,
        connection: Id,
        source: Option<Id>,
        index: Option<usize>,
    ) -> Result<Option<Slot>, ModelError> {
        self.connection(connection)?;
        if let Some(source) = source {
            self.ensure_linkable(source)?;
        }

        let previous = self.connection_body_mut(connection)?.source;
        let old_slot = match previous {
            Some(old) => remove_from(&mut self.element_mut(old)?.outgoing, connection)
                .map(|index| Slot::new(old, index)),
            None => None,
        };
        self.connection_body_mut(connection)?.source = source;
        if let Some(source) = source {
            insert_at(&mut self.element_mut(source)?.outgoing, connection, index);
        }
        Ok(old_slot)
    }

    /// Changes the target of a connection. Returns the previous target slot.
    pub fn set_target(
        &mut self,
        connection: Id,
        target: Option<Id>,
        index: Option<usize>,
    ) -> Result<Option<Slot>, ModelError> {
        self.connection(connection)?;
        if let Some(target) = target {
            self.ensure_linkable(target)?;
        }

        let previous = self.connection_body_mut(connection)?.target;
        let old_slot = match previous {
            Some(old) => remove_from(&mut self.element_mut(old)?.incoming, connection)
                .map(|index| Slot::new(old, index)),
            None => None,
        };
        self.connection_body_mut(connection)?.target = target;
        if let Some(target) = target {
            insert_at(&mut self.element_mut(target)?.incoming, connection, index);
        }
        Ok(old_slot)
    }

    /// Attaches `shape` to `host` (or detaches it with `None`).
    ///
    /// Returns the previous slot among the old host's attachers.
    pub fn set_host(
        &mut self,
        shape: Id,
        host: Option<Id>,
        index: Option<usize>,
    ) -> Result<Option<Slot>, ModelError> {
        self.shape(shape)?;
        if let Some(host) = host {
            self.shape(host)?;
            if host == shape {
                return Err(ModelError::Invariant(format!(
                    "`{shape}` cannot be attached to itself"
                )));
            }
        }

        let previous = self.shape_body_mut(shape)?.host;
        let old_slot = match previous {
            Some(old) => remove_from(&mut self.shape_body_mut(old)?.attachers, shape)
                .map(|index| Slot::new(old, index)),
            None => None,
        };
        self.shape_body_mut(shape)?.host = host;
        if let Some(host) = host {
            insert_at(&mut self.shape_body_mut(host)?.attachers, shape, index);
        }
        Ok(old_slot)
    }

    /// Links a label shape to the element it annotates.
    ///
    /// Returns the previous slot among the old target's labels.
    pub fn set_label_target(
        &mut self,
        label: Id,
        target: Option<Id>,
        index: Option<usize>,
    ) -> Result<Option<Slot>, ModelError> {
        self.shape(label)?;
        if let Some(target) = target {
            self.ensure_linkable(target)?;
        }

        let previous = self.shape_body_mut(label)?.label_target;
        let old_slot = match previous {
            Some(old) => remove_from(&mut self.element_mut(old)?.labels, label)
                .map(|index| Slot::new(old, index)),
            None => None,
        };
        self.shape_body_mut(label)?.label_target = target;
        if let Some(target) = target {
            insert_at(&mut self.element_mut(target)?.labels, label, index);
        }
        Ok(old_slot)
    }

    /// Replaces the bounds of a shape. Returns the previous bounds.
    pub fn set_bounds(&mut self, id: Id, bounds: Bounds) -> Result<Bounds, ModelError> {
        let shape = self.shape_body_mut(id)?;
        Ok(std::mem::replace(&mut shape.bounds, bounds))
    }

    /// Replaces the path of a connection. Returns the previous path.
    pub fn set_waypoints(
        &mut self,
        id: Id,
        waypoints: Vec<Waypoint>,
    ) -> Result<Vec<Waypoint>, ModelError> {
        if waypoints.len() < 2 {
            return Err(ModelError::InvalidWaypoints {
                id,
                count: waypoints.len(),
            });
        }
        let connection = self.connection_body_mut(id)?;
        Ok(std::mem::replace(&mut connection.waypoints, waypoints))
    }

    /// Returns the previous flag
    pub fn set_hidden(&mut self, id: Id, hidden: bool) -> Result<bool, ModelError> {
        let element = self.element_mut(id)?;
        Ok(std::mem::replace(&mut element.hidden, hidden))
    }

    /// Returns the previous flag
    pub fn set_collapsed(&mut self, id: Id, collapsed: bool) -> Result<bool, ModelError> {
        let element = self.element_mut(id)?;
        Ok(std::mem::replace(&mut element.collapsed, collapsed))
    }

    fn ensure_linkable(&self, id: Id) -> Result<(), ModelError> {
        let element = self.element(id)?;
        if element.is_root() {
            Err(wrong_kind(element, ElementKind::Shape))
        } else {
            Ok(())
        }
    }

    fn shape_body_mut(&mut self, id: Id) -> Result<&mut ShapeBody, ModelError> {
        let element = self.element_mut(id)?;
        let actual = element.kind();
        element.shape_mut().ok_or(ModelError::WrongKind {
            id,
            expected: ElementKind::Shape,
            actual,
        })
    }

    fn connection_body_mut(&mut self, id: Id) -> Result<&mut ConnectionBody, ModelError> {
        let element = self.element_mut(id)?;
        let actual = element.kind();
        element.connection_mut().ok_or(ModelError::WrongKind {
            id,
            expected: ElementKind::Connection,
            actual,
        })
    }

    /// True if `ancestor` is a (transitive) parent of `id`
    pub fn is_ancestor(&self, ancestor: Id, id: Id) -> bool {
        let mut current = self.get(id).and_then(Element::parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.get(parent).and_then(Element::parent);
        }
        false
    }

    /// All descendants of `id`, depth first, in child order
    pub fn descendants(&self, id: Id) -> Vec<Id> {
        let mut result = Vec::new();
        let mut stack: Vec<Id> = self
            .get(id)
            .map(|element| element.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            result.push(next);
            if let Some(element) = self.get(next) {
                stack.extend(element.children.iter().rev());
            }
        }
        result
    }

    /// Computes the closure of a selection.
    ///
    /// The closure contains the selected elements, every nested child of a
    /// selected shape, and every connection touching those shapes. A
    /// connection is enclosed when both its ends are part of the closure.
    pub fn closure(&self, ids: &[Id]) -> Closure {
        let selection: IndexSet<Id> = ids
            .iter()
            .copied()
            .filter(|id| self.get(*id).is_some_and(|element| !element.is_root()))
            .collect();

        let mut closure = Closure::default();
        for id in &selection {
            let has_selected_ancestor = selection
                .iter()
                .any(|other| other != id && self.is_ancestor(*other, *id));
            if !has_selected_ancestor {
                closure.top_level.insert(*id);
            }
        }

        let mut queue: Vec<Id> = selection.iter().rev().copied().collect();
        let mut visited = HashSet::new();
        while let Some(id) = queue.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(element) = self.get(id) else {
                continue;
            };
            closure.enclosed_elements.insert(id);
            if element.is_connection() {
                closure.all_connections.insert(id);
                closure.enclosed_connections.insert(id);
            } else {
                closure.all_shapes.insert(id);
                queue.extend(element.children.iter().rev());
            }
        }

        let shapes: Vec<Id> = closure.all_shapes.iter().copied().collect();
        for shape in shapes {
            let Some(element) = self.get(shape) else {
                continue;
            };
            for connection in element.incoming.iter().chain(element.outgoing.iter()) {
                let Some(connection_element) = self.get(*connection) else {
                    continue;
                };
                closure.all_connections.insert(*connection);

                let ends = connection_element
                    .source()
                    .zip(connection_element.target());
                if let Some((source, target)) = ends {
                    if closure.all_shapes.contains(&source) && closure.all_shapes.contains(&target)
                    {
                        closure.enclosed_connections.insert(*connection);
                        closure.enclosed_elements.insert(*connection);
                    }
                    if closure.top_level.contains(&source) && closure.top_level.contains(&target) {
                        closure.top_level.insert(*connection);
                    }
                }
            }
        }

        closure
    }

    /// Finds the top-most visible shape under `point` in the current root.
    ///
    /// Shapes later in paint order (children after their parent, later
    /// siblings after earlier ones) win. Ids in `exclude` are skipped.
    pub fn shape_at(&self, point: Point, exclude: &[Id]) -> Option<Id> {
        let mut hit = None;
        let mut stack = vec![self.current_root];
        while let Some(id) = stack.pop() {
            let Some(element) = self.get(id) else {
                continue;
            };
            if element.hidden || exclude.contains(&id) {
                continue;
            }
            if let Some(bounds) = element.bounds() {
                if bounds.contains(point) {
                    hit = Some(id);
                }
            }
            stack.extend(element.children.iter().rev());
        }
        hit
    }

    /// Verifies that every relation is recorded on both of its ends.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Invariant`] describing the first violation.
    pub fn check_invariants(&self) -> Result<(), ModelError> {
        let violation = |message: String| Err(ModelError::Invariant(message));

        if !self.roots.contains(&self.current_root) {
            return violation(format!("current root `{}` is not a root", self.current_root));
        }

        for element in self.registry.iter() {
            let id = element.id;

            match (element.is_root(), element.parent) {
                (true, Some(parent)) => {
                    return violation(format!("root `{id}` has parent `{parent}`"));
                }
                (true, None) if !self.roots.contains(&id) => {
                    return violation(format!("root `{id}` is not registered"));
                }
                (false, None) => return violation(format!("`{id}` has no parent")),
                (false, Some(parent)) => {
                    let listed = self
                        .get(parent)
                        .is_some_and(|parent| parent.children.contains(&id));
                    if !listed {
                        return violation(format!("`{parent}` does not list child `{id}`"));
                    }
                }
                _ => {}
            }

            for child in &element.children {
                if self.get(*child).and_then(Element::parent) != Some(id) {
                    return violation(format!("child `{child}` does not point to `{id}`"));
                }
            }

            for connection in &element.incoming {
                if self.get(*connection).and_then(Element::target) != Some(id) {
                    return violation(format!("incoming `{connection}` does not target `{id}`"));
                }
            }
            for connection in &element.outgoing {
                if self.get(*connection).and_then(Element::source) != Some(id) {
                    return violation(format!("outgoing `{connection}` does not start at `{id}`"));
                }
            }
            for label in &element.labels {
                if self.get(*label).and_then(Element::label_target) != Some(id) {
                    return violation(format!("label `{label}` does not annotate `{id}`"));
                }
            }

            match &element.body {
                Body::Root => {}
                Body::Shape(shape) => {
                    if let Some(host) = shape.host {
                        let listed = self
                            .get(host)
                            .is_some_and(|host| host.attachers().contains(&id));
                        if !listed {
                            return violation(format!("host `{host}` does not list `{id}`"));
                        }
                    }
                    for attacher in &shape.attachers {
                        if self.get(*attacher).and_then(Element::host) != Some(id) {
                            return violation(format!("attacher `{attacher}` is not on `{id}`"));
                        }
                    }
                    if let Some(target) = shape.label_target {
                        let listed = self
                            .get(target)
                            .is_some_and(|target| target.labels.contains(&id));
                        if !listed {
                            return violation(format!("`{target}` does not list label `{id}`"));
                        }
                    }
                }
                Body::Connection(connection) => {
                    let (Some(source), Some(target)) = (connection.source, connection.target)
                    else {
                        return violation(format!("connection `{id}` is missing an end"));
                    };
                    let outgoing = self
                        .get(source)
                        .is_some_and(|source| source.outgoing.contains(&id));
                    let incoming = self
                        .get(target)
                        .is_some_and(|target| target.incoming.contains(&id));
                    if !outgoing || !incoming {
                        return violation(format!("ends of `{id}` do not list it"));
                    }
                    if connection.waypoints.len() < 2 {
                        return violation(format!("connection `{id}` has fewer than 2 waypoints"));
                    }
                }
            }
        }
        Ok(())
    }
}

fn wrong_kind(element: &Element, expected: ElementKind) -> ModelError {
    ModelError::WrongKind {
        id: element.id,
        expected,
        actual: element.kind(),
    }
}

fn insert_at(list: &mut Vec<Id>, id: Id, index: Option<usize>) -> usize {
    let index = index.map_or(list.len(), |index| index.min(list.len()));
    list.insert(index, id);
    index
}

fn remove_from(list: &mut Vec<Id>, id: Id) -> Option<usize> {
    let index = list.iter().position(|entry| *entry == id)?;
    list.remove(index);
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::waypoints_from;

    fn diagram() -> Diagram {
        Diagram::new(Id::new("Root"), Id::new("Process"))
    }

    fn task(name: &str, x: f32, y: f32) -> Element {
        Element::shape(Id::new(name), Id::new("Task"), Bounds::new(x, y, 100.0, 80.0))
    }

    fn flow(name: &str) -> Element {
        Element::connection(
            Id::new(name),
            Id::new("SequenceFlow"),
            waypoints_from([Point::new(0.0, 0.0), Point::new(10.0, 0.0)]),
        )
    }

    #[test]
    fn test_add_shape_sets_both_sides() {
        let mut diagram = diagram();
        let index = diagram
            .add_shape(task("A", 0.0, 0.0), Id::new("Root"), None)
            .expect("added");

        assert_eq!(index, 0);
        assert_eq!(diagram.element(Id::new("A")).unwrap().parent(), Some(Id::new("Root")));
        assert_eq!(
            diagram.element(Id::new("Root")).unwrap().children(),
            &[Id::new("A")]
        );
        diagram.check_invariants().expect("consistent");
    }

    #[test]
    fn test_add_shape_duplicate() {
        let mut diagram = diagram();
        diagram
            .add_shape(task("Dup", 0.0, 0.0), Id::new("Root"), None)
            .unwrap();
        let err = diagram
            .add_shape(task("Dup", 0.0, 0.0), Id::new("Root"), None)
            .unwrap_err();
        assert_eq!(err, ModelError::DuplicateId(Id::new("Dup")));
    }

    #[test]
    fn test_add_shape_at_index() {
        let mut diagram = diagram();
        let root = Id::new("Root");
        diagram.add_shape(task("A", 0.0, 0.0), root, None).unwrap();
        diagram.add_shape(task("B", 0.0, 0.0), root, None).unwrap();
        diagram.add_shape(task("C", 0.0, 0.0), root, Some(1)).unwrap();

        assert_eq!(
            diagram.element(root).unwrap().children(),
            &[Id::new("A"), Id::new("C"), Id::new("B")]
        );
    }

    #[test]
    fn test_connection_requires_waypoints() {
        let mut diagram = diagram();
        let root = Id::new("Root");
        diagram.add_shape(task("A", 0.0, 0.0), root, None).unwrap();
        let short = Element::connection(Id::new("Short"), Id::new("SequenceFlow"), vec![]);

        let err = diagram
            .add_connection(short, Id::new("A"), Id::new("A"), root, None)
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidWaypoints {
                id: Id::new("Short"),
                count: 0
            }
        );
    }

    #[test]
    fn test_remove_and_restore_connection() {
        let mut diagram = diagram();
        let root = Id::new("Root");
        diagram.add_shape(task("A", 0.0, 0.0), root, None).unwrap();
        diagram.add_shape(task("B", 200.0, 0.0), root, None).unwrap();
        diagram
            .add_connection(flow("F1"), Id::new("A"), Id::new("B"), root, None)
            .unwrap();
        diagram
            .add_connection(flow("F2"), Id::new("A"), Id::new("B"), root, None)
            .unwrap();
        let before = diagram.clone();

        let detachment = diagram.remove(Id::new("F1")).expect("removed");
        assert!(!diagram.contains(Id::new("F1")));
        assert_eq!(diagram.element(Id::new("A")).unwrap().outgoing(), &[Id::new("F2")]);
        assert_eq!(detachment.source(), Some(Slot::new(Id::new("A"), 0)));
        assert!(diagram.registry().detached(Id::new("F1")).is_some());

        diagram.restore(Id::new("F1"), &detachment).expect("restored");
        assert_eq!(
            diagram.element(Id::new("A")).unwrap().outgoing(),
            before.element(Id::new("A")).unwrap().outgoing()
        );
        assert_eq!(
            diagram.element(root).unwrap().children(),
            before.element(root).unwrap().children()
        );
        diagram.check_invariants().expect("consistent");
    }

    #[test]
    fn test_remove_linked_shape_fails() {
        let mut diagram = diagram();
        let root = Id::new("Root");
        diagram.add_shape(task("A", 0.0, 0.0), root, None).unwrap();
        diagram.add_shape(task("B", 200.0, 0.0), root, None).unwrap();
        diagram
            .add_connection(flow("F"), Id::new("A"), Id::new("B"), root, None)
            .unwrap();

        let err = diagram.remove(Id::new("A")).unwrap_err();
        assert_eq!(
            err,
            ModelError::StillLinked {
                id: Id::new("A"),
                relation: "connections"
            }
        );
    }

    #[test]
    fn test_set_parent_rejects_cycles() {
        let mut diagram = diagram();
        let root = Id::new("Root");
        diagram.add_shape(task("Outer", 0.0, 0.0), root, None).unwrap();
        diagram
            .add_shape(task("Inner", 10.0, 10.0), Id::new("Outer"), None)
            .unwrap();

        assert!(diagram
            .set_parent(Id::new("Outer"), Some(Id::new("Inner")), None)
            .is_err());
        assert!(diagram.is_ancestor(root, Id::new("Inner")));
    }

    #[test]
    fn test_set_host_mutual() {
        let mut diagram = diagram();
        let root = Id::new("Root");
        diagram.add_shape(task("Host", 0.0, 0.0), root, None).unwrap();
        diagram.add_shape(task("Other", 0.0, 0.0), root, None).unwrap();
        diagram.add_shape(task("Marker", 0.0, 0.0), root, None).unwrap();

        diagram
            .set_host(Id::new("Other"), Some(Id::new("Host")), None)
            .unwrap();
        let old = diagram
            .set_host(Id::new("Marker"), Some(Id::new("Host")), None)
            .unwrap();
        assert_eq!(old, None);
        assert_eq!(
            diagram.element(Id::new("Host")).unwrap().attachers(),
            &[Id::new("Other"), Id::new("Marker")]
        );

        let old = diagram.set_host(Id::new("Marker"), None, None).unwrap();
        assert_eq!(old, Some(Slot::new(Id::new("Host"), 1)));
        assert_eq!(diagram.element(Id::new("Marker")).unwrap().host(), None);
        diagram.check_invariants().expect("consistent");
    }

    #[test]
    fn test_closure() {
        let mut diagram = diagram();
        let root = Id::new("Root");
        diagram.add_shape(task("Sub", 0.0, 0.0), root, None).unwrap();
        diagram
            .add_shape(task("Child", 10.0, 10.0), Id::new("Sub"), None)
            .unwrap();
        diagram.add_shape(task("Out", 500.0, 0.0), root, None).unwrap();
        diagram.add_shape(task("Peer", 300.0, 0.0), root, None).unwrap();
        diagram
            .add_connection(flow("Inside"), Id::new("Sub"), Id::new("Child"), root, None)
            .unwrap();
        diagram
            .add_connection(flow("Leaving"), Id::new("Child"), Id::new("Out"), root, None)
            .unwrap();
        diagram
            .add_connection(flow("Between"), Id::new("Sub"), Id::new("Peer"), root, None)
            .unwrap();

        let closure = diagram.closure(&[Id::new("Sub"), Id::new("Child"), Id::new("Peer")]);

        assert!(closure.all_shapes().contains(&Id::new("Child")));
        assert!(closure.enclosed_connections().contains(&Id::new("Inside")));
        assert!(closure.all_connections().contains(&Id::new("Leaving")));
        assert!(!closure.enclosed_connections().contains(&Id::new("Leaving")));
        assert!(closure.top_level().contains(&Id::new("Sub")));
        assert!(!closure.top_level().contains(&Id::new("Child")));
        assert!(closure.top_level().contains(&Id::new("Between")));
    }

    #[test]
    fn test_shape_at_prefers_children() {
        let mut diagram = diagram();
        let root = Id::new("Root");
        diagram
            .add_shape(
                Element::shape(Id::new("Big"), Id::new("SubProcess"), Bounds::new(0.0, 0.0, 400.0, 300.0)),
                root,
                None,
            )
            .unwrap();
        diagram
            .add_shape(task("Small", 50.0, 50.0), Id::new("Big"), None)
            .unwrap();

        let point = Point::new(60.0, 60.0);
        assert_eq!(diagram.shape_at(point, &[]), Some(Id::new("Small")));
        assert_eq!(diagram.shape_at(point, &[Id::new("Small")]), Some(Id::new("Big")));
        assert_eq!(diagram.shape_at(Point::new(900.0, 900.0), &[]), None);
    }

    #[test]
    fn test_check_invariants_detects_dangling_parent() {
        let mut diagram = diagram();
        diagram
            .add_shape(task("A", 0.0, 0.0), Id::new("Root"), None)
            .unwrap();
        diagram
            .registry
            .live
            .get_mut(&Id::new("Root"))
            .unwrap()
            .children
            .clear();

        assert!(matches!(
            diagram.check_invariants(),
            Err(ModelError::Invariant(_))
        ));
    }

    #[test]
    fn test_descendants_order() {
        let mut diagram = diagram();
        let root = Id::new("Root");
        diagram.add_shape(task("P", 0.0, 0.0), root, None).unwrap();
        diagram.add_shape(task("C1", 0.0, 0.0), Id::new("P"), None).unwrap();
        diagram.add_shape(task("G1", 0.0, 0.0), Id::new("C1"), None).unwrap();
        diagram.add_shape(task("C2", 0.0, 0.0), Id::new("P"), None).unwrap();

        assert_eq!(
            diagram.descendants(Id::new("P")),
            vec![Id::new("C1"), Id::new("G1"), Id::new("C2")]
        );
    }
}
