//! [`Modeling`]: convenience methods over the built-in commands.
//!
//! Each method fills in a command context and executes it. The trait is
//! implemented by [`Modeler`](crate::Modeler), where every call is its own
//! undo step, and by [`Scope`], where calls nest into the command in flight.

use easel_core::{
    diagram::Diagram,
    element::{Element, Waypoint},
    geometry::{Axis, Bounds, Direction, Point},
    identifier::Id,
};

use crate::{
    command::{
        Context, Scope,
        context::{
            AlignElementsContext, Alignment, AppendShapeContext, AttachShapeContext,
            CreateConnectionContext, CreateLabelContext, CreateShapeContext,
            DeleteConnectionContext, DeleteElementsContext, DeleteShapeContext,
            DistributeElementsContext, IdClaimContext, LayoutConnectionContext,
            MoveConnectionContext, MoveElementsContext, MoveShapeContext, Placement, ReconnectContext,
            Reconnection, ResizeShapeContext, SpaceToolContext, ToggleCollapseContext,
            UpdateAttachmentContext, UpdateWaypointsContext,
        },
        names,
    },
    error::EaselError,
    handlers::{calculate_adjustments, group_for_distribution},
    layout::LayoutHints,
    services::Services,
};

/// High level editing operations.
///
/// Only [`execute_command`](Self::execute_command) and
/// [`parts`](Self::parts) are required.
pub trait Modeling {
    /// Executes `name` with `context`.
    ///
    /// # Errors
    ///
    /// Any error of the command. A vetoed command is reported as
    /// [`EaselError::Denied`].
    fn execute_command(&mut self, name: &str, context: Context) -> Result<(), EaselError>;

    /// The diagram and the services the commands run against.
    fn parts(&mut self) -> (&mut Diagram, &Services);

    /// Creates a shape of `type_name` from the factory and returns its id.
    fn create_shape(
        &mut self,
        type_name: &str,
        position: impl Into<Placement>,
        parent: Id,
    ) -> Result<Id, EaselError> {
        let (diagram, services) = self.parts();
        let shape = services.factory().create_shape(diagram.ids_mut(), type_name);
        self.add_shape(shape, position, parent)
    }

    /// Creates `shape` as it is.
    fn add_shape(
        &mut self,
        shape: Element,
        position: impl Into<Placement>,
        parent: Id,
    ) -> Result<Id, EaselError> {
        let id = shape.id();
        self.execute_command(
            names::SHAPE_CREATE,
            CreateShapeContext::new(shape, position, parent).into(),
        )?;
        Ok(id)
    }

    /// Creates a shape of `type_name` attached to the boundary of `host`.
    fn create_attached_shape(
        &mut self,
        type_name: &str,
        position: impl Into<Placement>,
        host: Id,
    ) -> Result<Id, EaselError> {
        let (diagram, services) = self.parts();
        let parent = diagram.element(host)?.parent();
        let parent = parent.ok_or(EaselError::MissingContext {
            command: names::SHAPE_CREATE,
            field: "parent",
        })?;
        let shape = services.factory().create_shape(diagram.ids_mut(), type_name);
        let id = shape.id();
        self.execute_command(
            names::SHAPE_CREATE,
            CreateShapeContext::new(shape, position, parent)
                .with_host(host)
                .into(),
        )?;
        Ok(id)
    }

    /// Creates the external label of `target`, centered on `position`.
    fn create_label(&mut self, target: Id, position: Point) -> Result<Id, EaselError> {
        let (diagram, services) = self.parts();
        let element = diagram.element(target)?;
        let parent = element.parent().ok_or(EaselError::MissingContext {
            command: names::LABEL_CREATE,
            field: "parent",
        })?;
        let label = services.factory().create_label(element);
        let size = services.factory().label_size();
        let id = label.id();
        self.execute_command(
            names::LABEL_CREATE,
            CreateLabelContext::new(label, target, position, parent)
                .with_size(size)
                .into(),
        )?;
        Ok(id)
    }

    /// Creates a shape of `type_name` next to `source` and connects the two.
    fn append_shape(
        &mut self,
        source: Id,
        type_name: &str,
        position: Point,
    ) -> Result<Id, EaselError> {
        let (diagram, services) = self.parts();
        let shape = services.factory().create_shape(diagram.ids_mut(), type_name);
        let id = shape.id();
        self.execute_command(
            names::SHAPE_APPEND,
            AppendShapeContext::new(source, shape, position).into(),
        )?;
        Ok(id)
    }

    fn remove_shape(&mut self, shape: Id) -> Result<(), EaselError> {
        self.execute_command(names::SHAPE_DELETE, DeleteShapeContext::new(shape).into())
    }

    fn remove_connection(&mut self, connection: Id) -> Result<(), EaselError> {
        self.execute_command(
            names::CONNECTION_DELETE,
            DeleteConnectionContext::new(connection).into(),
        )
    }

    /// Deletes a selection; duplicates and already deleted elements are skipped.
    fn remove_elements(&mut self, elements: Vec<Id>) -> Result<(), EaselError> {
        self.execute_command(
            names::ELEMENTS_DELETE,
            DeleteElementsContext::new(elements).into(),
        )
    }

    fn move_shape(&mut self, shape: Id, delta: Point, new_parent: Option<Id>) -> Result<(), EaselError> {
        self.execute_command(
            names::SHAPE_MOVE,
            MoveShapeContext::new(shape, delta).with_parent(new_parent).into(),
        )
    }

    /// Moves `shapes` with everything they contain and connect.
    fn move_elements(
        &mut self,
        shapes: Vec<Id>,
        delta: Point,
        new_parent: Option<Id>,
        new_host: Option<Id>,
    ) -> Result<(), EaselError> {
        let mut context = MoveElementsContext::new(shapes, delta).with_parent(new_parent);
        if let Some(host) = new_host {
            context = context.with_host(host);
        }
        self.execute_command(names::ELEMENTS_MOVE, context.into())
    }

    fn move_connection(
        &mut self,
        connection: Id,
        delta: Point,
        new_parent: Option<Id>,
    ) -> Result<(), EaselError> {
        self.execute_command(
            names::CONNECTION_MOVE,
            MoveConnectionContext::new(connection, delta, new_parent).into(),
        )
    }

    fn resize_shape(&mut self, shape: Id, new_bounds: Bounds) -> Result<(), EaselError> {
        self.execute_command(
            names::SHAPE_RESIZE,
            ResizeShapeContext::new(shape, new_bounds).into(),
        )
    }

    fn toggle_collapse(&mut self, shape: Id) -> Result<(), EaselError> {
        self.execute_command(
            names::SHAPE_TOGGLE_COLLAPSE,
            ToggleCollapseContext::new(shape).into(),
        )
    }

    /// Connects `source` to `target` with the connection type the semantics
    /// pick, inside the source's parent.
    fn connect(&mut self, source: Id, target: Id) -> Result<Id, EaselError> {
        let (diagram, services) = self.parts();
        let connection_type = services
            .semantics()
            .connection_type(diagram.element(source)?, diagram.element(target)?);
        let connection = services
            .factory()
            .create_connection(diagram.ids_mut(), connection_type);
        let parent = diagram.element(source)?.parent().ok_or(EaselError::MissingContext {
            command: names::CONNECTION_CREATE,
            field: "parent",
        })?;
        self.create_connection(source, target, connection, parent)
    }

    /// Creates `connection` between `source` and `target`. Empty waypoints
    /// are laid out.
    fn create_connection(
        &mut self,
        source: Id,
        target: Id,
        connection: Element,
        parent: Id,
    ) -> Result<Id, EaselError> {
        let id = connection.id();
        self.execute_command(
            names::CONNECTION_CREATE,
            CreateConnectionContext::new(connection, source, target, parent).into(),
        )?;
        Ok(id)
    }

    fn reconnect_start(
        &mut self,
        connection: Id,
        source: Id,
        docking: Reconnection,
    ) -> Result<(), EaselError> {
        self.execute_command(
            names::CONNECTION_RECONNECT_START,
            ReconnectContext::new_source(connection, source, docking).into(),
        )
    }

    fn reconnect_end(
        &mut self,
        connection: Id,
        target: Id,
        docking: Reconnection,
    ) -> Result<(), EaselError> {
        self.execute_command(
            names::CONNECTION_RECONNECT_END,
            ReconnectContext::new_target(connection, target, docking).into(),
        )
    }

    fn update_waypoints(&mut self, connection: Id, waypoints: Vec<Waypoint>) -> Result<(), EaselError> {
        self.execute_command(
            names::CONNECTION_UPDATE_WAYPOINTS,
            UpdateWaypointsContext::new(connection, waypoints).into(),
        )
    }

    fn layout_connection(&mut self, connection: Id, hints: LayoutHints) -> Result<(), EaselError> {
        self.execute_command(
            names::CONNECTION_LAYOUT,
            LayoutConnectionContext::new(connection, hints).into(),
        )
    }

    fn align_elements(&mut self, elements: Vec<Id>, alignment: Alignment) -> Result<(), EaselError> {
        self.execute_command(
            names::ELEMENTS_ALIGN,
            AlignElementsContext::new(elements, alignment).into(),
        )
    }

    /// Spreads `elements` evenly along `axis`.
    ///
    /// Returns `false` without executing anything when there is nothing to
    /// distribute.
    fn distribute_elements(&mut self, elements: &[Id], axis: Axis) -> Result<bool, EaselError> {
        let (diagram, services) = self.parts();
        let threshold = services.config().modeling().distribute_threshold();
        let Some(groups) = group_for_distribution(diagram, elements, axis, threshold) else {
            return Ok(false);
        };
        self.execute_command(
            names::ELEMENTS_DISTRIBUTE,
            DistributeElementsContext::new(groups, axis).into(),
        )?;
        Ok(true)
    }

    fn attach_shape(&mut self, shape: Id, host: Id) -> Result<(), EaselError> {
        self.execute_command(names::SHAPE_ATTACH, AttachShapeContext::new(shape, host).into())
    }

    /// Sets or clears the host of `shape` without touching its parent.
    fn update_attachment(&mut self, shape: Id, host: Option<Id>) -> Result<(), EaselError> {
        self.execute_command(
            names::ELEMENT_UPDATE_ATTACHMENT,
            UpdateAttachmentContext::new(shape, host).into(),
        )
    }

    /// Opens (positive `delta`) or closes space at `start` for `elements`.
    fn space_tool(
        &mut self,
        elements: &[Id],
        delta: Point,
        direction: Direction,
        start: f32,
    ) -> Result<(), EaselError> {
        let (diagram, _) = self.parts();
        let axis = direction.axis();
        let adjustments = calculate_adjustments(diagram, elements, axis, delta.coord(axis), start);
        self.execute_command(
            names::SPACE_TOOL,
            SpaceToolContext::new(
                adjustments.moving_shapes,
                adjustments.resizing_shapes,
                delta,
                direction,
            )
            .into(),
        )
    }

    fn claim_id(&mut self, id: Id, owner: Id) -> Result<(), EaselError> {
        self.execute_command(names::ID_UPDATE_CLAIM, IdClaimContext::claim(id, owner).into())
    }

    fn unclaim_id(&mut self, id: Id, owner: Id) -> Result<(), EaselError> {
        self.execute_command(names::ID_UPDATE_CLAIM, IdClaimContext::unclaim(id, owner).into())
    }
}

impl Modeling for Scope<'_> {
    fn execute_command(&mut self, name: &str, context: Context) -> Result<(), EaselError> {
        self.execute(name, context)?;
        Ok(())
    }

    fn parts(&mut self) -> (&mut Diagram, &Services) {
        Scope::parts(self)
    }
}
