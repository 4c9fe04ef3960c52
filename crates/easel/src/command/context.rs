//! Command contexts.
//!
//! A [`Context`] is the mutable record a command carries through its
//! pipeline. Callers fill in the request fields, behaviors may rewrite them
//! before execution, and handlers store whatever they need to revert (prior
//! bounds, detachments, previous waypoints) in the `old_*` fields. The
//! history keeps the final context, so redo replays exactly what was applied.

use easel_core::{
    diagram::{Closure, Detachment, Slot},
    element::{Element, Waypoint},
    geometry::{Axis, Bounds, Direction, Point, Size},
    identifier::Id,
};

use crate::{error::EaselError, layout::LayoutHints};

/// Where a created shape goes: centered on a point or at explicit bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Center(Point),
    Bounds(Bounds),
}

impl Placement {
    /// The point the shape is (or will be) centered on.
    pub fn center(&self) -> Point {
        match self {
            Placement::Center(point) => *point,
            Placement::Bounds(bounds) => bounds.center(),
        }
    }
}

impl From<Point> for Placement {
    fn from(point: Point) -> Self {
        Placement::Center(point)
    }
}

impl From<Bounds> for Placement {
    fn from(bounds: Bounds) -> Self {
        Placement::Bounds(bounds)
    }
}

/// Hints for `shape.move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveHints {
    /// Re-layout incoming and outgoing connections.
    pub layout: bool,
    /// Move children, labels and attachers along.
    pub recurse: bool,
}

impl Default for MoveHints {
    fn default() -> Self {
        Self {
            layout: true,
            recurse: true,
        }
    }
}

impl MoveHints {
    /// Hints for a shape moved as part of a closure: nothing else follows it.
    pub fn in_closure() -> Self {
        Self {
            layout: false,
            recurse: false,
        }
    }
}

/// Hints for `shape.resize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeHints {
    pub layout: bool,
    pub attach_support: bool,
}

impl Default for ResizeHints {
    fn default() -> Self {
        Self {
            layout: true,
            attach_support: true,
        }
    }
}

/// The new end of a reconnected connection.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconnection {
    /// Replaces only the waypoint adjacent to the changed end.
    Docking(Point),
    /// Replaces the whole path.
    Waypoints(Vec<Waypoint>),
}

/// Target coordinate for `elements.align`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alignment {
    Left(f32),
    Right(f32),
    Center(f32),
    Top(f32),
    Bottom(f32),
    Middle(f32),
}

impl Alignment {
    /// The delta that aligns `bounds`. Only one axis is ever non-zero.
    pub fn delta_for(&self, bounds: Bounds) -> Point {
        let dx = |x: f32| Point::new(x - bounds.x(), 0.0);
        let dy = |y: f32| Point::new(0.0, y - bounds.y());
        match *self {
            Alignment::Left(left) => dx(left),
            Alignment::Right(right) => dx(right - bounds.width()),
            Alignment::Center(center) => dx(center - (bounds.width() / 2.0).round()),
            Alignment::Top(top) => dy(top),
            Alignment::Bottom(bottom) => dy(bottom - bounds.height()),
            Alignment::Middle(middle) => dy(middle - (bounds.height() / 2.0).round()),
        }
    }
}

/// Range covered by a distribution group along the distribution axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// True if the two ranges overlap, in either orientation.
    pub fn intersects(&self, other: &Range) -> bool {
        self.min.max(self.max) >= other.min.min(other.max)
            && self.min.min(self.max) <= other.min.max(other.max)
    }
}

/// Elements that overlap along the distribution axis and move as one.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionGroup {
    pub elements: Vec<Id>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateShapeContext {
    pub shape: Element,
    pub position: Option<Placement>,
    pub parent: Option<Id>,
    pub parent_index: Option<usize>,
    /// Host to attach the new shape to once it exists.
    pub host: Option<Id>,
    /// Flow the shape was dropped on, set by the create-on-flow behavior.
    pub target_flow: Option<Id>,
}

impl CreateShapeContext {
    pub fn new(shape: Element, position: impl Into<Placement>, parent: Id) -> Self {
        Self {
            shape,
            position: Some(position.into()),
            parent: Some(parent),
            parent_index: None,
            host: None,
            target_flow: None,
        }
    }

    pub fn with_parent_index(mut self, index: usize) -> Self {
        self.parent_index = Some(index);
        self
    }

    pub fn with_host(mut self, host: Id) -> Self {
        self.host = Some(host);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateLabelContext {
    pub shape: Element,
    /// Size of the label. Missing dimensions count as zero.
    pub size: Option<Size>,
    pub label_target: Option<Id>,
    pub position: Option<Placement>,
    pub parent: Option<Id>,
    pub parent_index: Option<usize>,
}

impl CreateLabelContext {
    pub fn new(shape: Element, label_target: Id, position: impl Into<Placement>, parent: Id) -> Self {
        Self {
            shape,
            size: None,
            label_target: Some(label_target),
            position: Some(position.into()),
            parent: Some(parent),
            parent_index: None,
        }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteShapeContext {
    pub shape: Id,
    pub detachment: Option<Detachment>,
    /// Set when the deleted shape was a label.
    pub label_target: Option<Slot>,
}

impl DeleteShapeContext {
    pub fn new(shape: Id) -> Self {
        Self {
            shape,
            detachment: None,
            label_target: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteConnectionContext {
    pub connection: Id,
    pub detachment: Option<Detachment>,
}

impl DeleteConnectionContext {
    pub fn new(connection: Id) -> Self {
        Self {
            connection,
            detachment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteElementsContext {
    pub elements: Vec<Id>,
}

impl DeleteElementsContext {
    pub fn new(elements: Vec<Id>) -> Self {
        Self { elements }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppendShapeContext {
    pub source: Option<Id>,
    pub shape: Element,
    pub position: Point,
    /// Parent of the new shape. Defaults to the source's parent.
    pub target: Option<Id>,
    /// Prototype of the connecting element. The factory builds one if unset.
    pub connection: Option<Element>,
    pub connection_parent: Option<Id>,
    /// Attach the appended shape to the parent instead of nesting it.
    pub attach: bool,
}

impl AppendShapeContext {
    pub fn new(source: Id, shape: Element, position: Point) -> Self {
        Self {
            source: Some(source),
            shape,
            position,
            target: None,
            connection: None,
            connection_parent: None,
            attach: false,
        }
    }

    pub fn with_target(mut self, target: Id) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_connection(mut self, connection: Element) -> Self {
        self.connection = Some(connection);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveShapeContext {
    pub shape: Id,
    pub delta: Point,
    pub new_parent: Option<Id>,
    pub new_parent_index: Option<usize>,
    pub hints: MoveHints,
    pub old_bounds: Option<Bounds>,
    pub old_parent: Option<Slot>,
}

impl MoveShapeContext {
    pub fn new(shape: Id, delta: Point) -> Self {
        Self {
            shape,
            delta,
            new_parent: None,
            new_parent_index: None,
            hints: MoveHints::default(),
            old_bounds: None,
            old_parent: None,
        }
    }

    pub fn with_parent(mut self, parent: Option<Id>) -> Self {
        self.new_parent = parent;
        self
    }

    pub fn with_hints(mut self, hints: MoveHints) -> Self {
        self.hints = hints;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveElementsContext {
    pub shapes: Vec<Id>,
    pub delta: Point,
    pub new_parent: Option<Id>,
    pub new_host: Option<Id>,
    /// Flow a single shape was dropped on, set by the create-on-flow behavior.
    pub target_flow: Option<Id>,
    pub closure: Option<Closure>,
}

impl MoveElementsContext {
    pub fn new(shapes: Vec<Id>, delta: Point) -> Self {
        Self {
            shapes,
            delta,
            new_parent: None,
            new_host: None,
            target_flow: None,
            closure: None,
        }
    }

    pub fn with_parent(mut self, parent: Option<Id>) -> Self {
        self.new_parent = parent;
        self
    }

    pub fn with_host(mut self, host: Id) -> Self {
        self.new_host = Some(host);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveConnectionContext {
    pub connection: Id,
    pub delta: Point,
    pub new_parent: Option<Id>,
    pub new_parent_index: Option<usize>,
    pub old_waypoints: Vec<Waypoint>,
    pub old_parent: Option<Slot>,
}

impl MoveConnectionContext {
    pub fn new(connection: Id, delta: Point, new_parent: Option<Id>) -> Self {
        Self {
            connection,
            delta,
            new_parent,
            new_parent_index: None,
            old_waypoints: Vec::new(),
            old_parent: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeShapeContext {
    pub shape: Id,
    pub new_bounds: Bounds,
    /// Overrides the configured minimum size.
    pub min_size: Option<Size>,
    pub hints: ResizeHints,
    pub old_bounds: Option<Bounds>,
}

impl ResizeShapeContext {
    pub fn new(shape: Id, new_bounds: Bounds) -> Self {
        Self {
            shape,
            new_bounds,
            min_size: None,
            hints: ResizeHints::default(),
            old_bounds: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToggleCollapseContext {
    pub shape: Id,
    /// Visibility of every descendant before the toggle.
    pub old_visibility: Vec<(Id, bool)>,
}

impl ToggleCollapseContext {
    pub fn new(shape: Id) -> Self {
        Self {
            shape,
            old_visibility: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateConnectionContext {
    /// Prototype. Its waypoints are computed on first execution when empty.
    pub connection: Element,
    pub source: Option<Id>,
    pub target: Option<Id>,
    pub parent: Option<Id>,
    pub parent_index: Option<usize>,
    pub hints: LayoutHints,
    /// Path after cropping, replayed on redo.
    pub cropped: Option<Vec<Waypoint>>,
}

impl CreateConnectionContext {
    pub fn new(connection: Element, source: Id, target: Id, parent: Id) -> Self {
        Self {
            connection,
            source: Some(source),
            target: Some(target),
            parent: Some(parent),
            parent_index: None,
            hints: LayoutHints::default(),
            cropped: None,
        }
    }

    pub fn with_hints(mut self, hints: LayoutHints) -> Self {
        self.hints = hints;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectContext {
    pub connection: Id,
    pub new_source: Option<Id>,
    pub new_target: Option<Id>,
    pub docking: Option<Reconnection>,
    pub old_source: Option<Slot>,
    pub old_target: Option<Slot>,
    pub old_waypoints: Vec<Waypoint>,
}

impl ReconnectContext {
    pub fn new_source(connection: Id, source: Id, docking: Reconnection) -> Self {
        Self {
            connection,
            new_source: Some(source),
            new_target: None,
            docking: Some(docking),
            old_source: None,
            old_target: None,
            old_waypoints: Vec::new(),
        }
    }

    pub fn new_target(connection: Id, target: Id, docking: Reconnection) -> Self {
        Self {
            connection,
            new_source: None,
            new_target: Some(target),
            docking: Some(docking),
            old_source: None,
            old_target: None,
            old_waypoints: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateWaypointsContext {
    pub connection: Id,
    pub new_waypoints: Vec<Waypoint>,
    pub old_waypoints: Vec<Waypoint>,
}

impl UpdateWaypointsContext {
    pub fn new(connection: Id, new_waypoints: Vec<Waypoint>) -> Self {
        Self {
            connection,
            new_waypoints,
            old_waypoints: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConnectionContext {
    pub connection: Id,
    pub hints: LayoutHints,
    pub old_waypoints: Vec<Waypoint>,
    /// Path computed on first execution, replayed on redo.
    pub new_waypoints: Option<Vec<Waypoint>>,
    pub cropped: Option<Vec<Waypoint>>,
}

impl LayoutConnectionContext {
    pub fn new(connection: Id, hints: LayoutHints) -> Self {
        Self {
            connection,
            hints,
            old_waypoints: Vec::new(),
            new_waypoints: None,
            cropped: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignElementsContext {
    pub elements: Vec<Id>,
    pub alignment: Option<Alignment>,
}

impl AlignElementsContext {
    pub fn new(elements: Vec<Id>, alignment: Alignment) -> Self {
        Self {
            elements,
            alignment: Some(alignment),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistributeElementsContext {
    pub groups: Vec<DistributionGroup>,
    pub axis: Axis,
}

impl DistributeElementsContext {
    pub fn new(groups: Vec<DistributionGroup>, axis: Axis) -> Self {
        Self { groups, axis }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttachShapeContext {
    pub shape: Id,
    pub new_host: Option<Id>,
    pub old_host: Option<Slot>,
    /// Previous parent slots of the shape and its labels, in the order they moved.
    pub old_parents: Vec<(Id, Option<Slot>)>,
}

impl AttachShapeContext {
    pub fn new(shape: Id, new_host: Id) -> Self {
        Self {
            shape,
            new_host: Some(new_host),
            old_host: None,
            old_parents: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateAttachmentContext {
    pub shape: Id,
    pub new_host: Option<Id>,
    pub old_host: Option<Slot>,
}

impl UpdateAttachmentContext {
    pub fn new(shape: Id, new_host: Option<Id>) -> Self {
        Self {
            shape,
            new_host,
            old_host: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdClaimContext {
    pub id: Id,
    pub owner: Id,
    pub claiming: bool,
    /// Whether the registry changed, so revert knows whether to undo it.
    pub changed: bool,
}

impl IdClaimContext {
    pub fn claim(id: Id, owner: Id) -> Self {
        Self {
            id,
            owner,
            claiming: true,
            changed: false,
        }
    }

    pub fn unclaim(id: Id, owner: Id) -> Self {
        Self {
            id,
            owner,
            claiming: false,
            changed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpaceToolContext {
    pub moving_shapes: Vec<Id>,
    pub resizing_shapes: Vec<Id>,
    pub delta: Point,
    pub direction: Direction,
}

impl SpaceToolContext {
    pub fn new(
        moving_shapes: Vec<Id>,
        resizing_shapes: Vec<Id>,
        delta: Point,
        direction: Direction,
    ) -> Self {
        Self {
            moving_shapes,
            resizing_shapes,
            delta,
            direction,
        }
    }
}

/// Implemented by every per-command context struct.
pub trait CommandContext: Sized {
    /// Name used in [`EaselError::ContextMismatch`].
    const NAME: &'static str;

    fn from_context(context: &Context) -> Option<&Self>;

    fn from_context_mut(context: &mut Context) -> Option<&mut Self>;
}

macro_rules! contexts {
    ($($variant:ident($ty:ident),)*) => {
        /// The context of one command invocation.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Context {
            $($variant($ty),)*
        }

        impl Context {
            /// Name of the context type, for error messages.
            pub fn type_name(&self) -> &'static str {
                match self {
                    $(Context::$variant(_) => <$ty as CommandContext>::NAME,)*
                }
            }
        }

        $(
            impl CommandContext for $ty {
                const NAME: &'static str = stringify!($ty);

                fn from_context(context: &Context) -> Option<&Self> {
                    match context {
                        Context::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }

                fn from_context_mut(context: &mut Context) -> Option<&mut Self> {
                    match context {
                        Context::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Context {
                fn from(context: $ty) -> Self {
                    Context::$variant(context)
                }
            }
        )*
    };
}

contexts! {
    CreateShape(CreateShapeContext),
    CreateLabel(CreateLabelContext),
    DeleteShape(DeleteShapeContext),
    DeleteConnection(DeleteConnectionContext),
    DeleteElements(DeleteElementsContext),
    AppendShape(AppendShapeContext),
    MoveShape(MoveShapeContext),
    MoveElements(MoveElementsContext),
    MoveConnection(MoveConnectionContext),
    ResizeShape(ResizeShapeContext),
    ToggleCollapse(ToggleCollapseContext),
    CreateConnection(CreateConnectionContext),
    Reconnect(ReconnectContext),
    UpdateWaypoints(UpdateWaypointsContext),
    LayoutConnection(LayoutConnectionContext),
    AlignElements(AlignElementsContext),
    DistributeElements(DistributeElementsContext),
    AttachShape(AttachShapeContext),
    UpdateAttachment(UpdateAttachmentContext),
    IdClaim(IdClaimContext),
    SpaceTool(SpaceToolContext),
}

impl Context {
    /// Borrows the context as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`EaselError::ContextMismatch`] for any other variant.
    pub fn get<T: CommandContext>(&self) -> Result<&T, EaselError> {
        let actual = self.type_name();
        T::from_context(self).ok_or(EaselError::ContextMismatch {
            expected: T::NAME,
            actual,
        })
    }

    /// Mutably borrows the context as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`EaselError::ContextMismatch`] for any other variant.
    pub fn get_mut<T: CommandContext>(&mut self) -> Result<&mut T, EaselError> {
        let actual = self.type_name();
        T::from_context_mut(self).ok_or(EaselError::ContextMismatch {
            expected: T::NAME,
            actual,
        })
    }

    /// Borrows the context as `T` if it is one.
    pub fn as_ref<T: CommandContext>(&self) -> Option<&T> {
        T::from_context(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_matching_variant() {
        let mut context: Context = DeleteShapeContext::new(Id::new("Task_1")).into();
        assert_eq!(context.type_name(), "DeleteShapeContext");

        let delete = context.get_mut::<DeleteShapeContext>().expect("matching");
        delete.label_target = Some(Slot::new(Id::new("Task_0"), 0));
        assert!(
            context
                .get::<DeleteShapeContext>()
                .expect("matching")
                .label_target
                .is_some()
        );
    }

    #[test]
    fn test_get_mismatch() {
        let context: Context = DeleteShapeContext::new(Id::new("Task_1")).into();
        assert_eq!(
            context.get::<MoveShapeContext>(),
            Err(EaselError::ContextMismatch {
                expected: "MoveShapeContext",
                actual: "DeleteShapeContext",
            })
        );
        assert!(context.as_ref::<MoveShapeContext>().is_none());
    }

    #[test]
    fn test_alignment_delta() {
        let bounds = Bounds::new(50.0, 30.0, 20.0, 10.0);
        assert_eq!(Alignment::Left(0.0).delta_for(bounds), Point::new(-50.0, 0.0));
        assert_eq!(Alignment::Right(100.0).delta_for(bounds), Point::new(30.0, 0.0));
        assert_eq!(Alignment::Center(100.0).delta_for(bounds), Point::new(40.0, 0.0));
        assert_eq!(Alignment::Bottom(50.0).delta_for(bounds), Point::new(0.0, 10.0));
        assert_eq!(Alignment::Middle(35.0).delta_for(bounds), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_range_intersects() {
        let a = Range::new(0.0, 10.0);
        assert!(a.intersects(&Range::new(10.0, 20.0)));
        assert!(!a.intersects(&Range::new(11.0, 20.0)));
        assert_eq!(a.span(), 10.0);
    }
}
