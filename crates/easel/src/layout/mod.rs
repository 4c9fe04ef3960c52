//! Connection layout and docking.
//!
//! A [`Layouter`] computes the path of a connection between the anchors of
//! its two ends. A [`ConnectionDocking`] then crops the ends of that path
//! to the outline of the shapes they attach to. The [`anchors`] module
//! derives new anchors when a shape moves or is resized.

pub mod anchors;
mod docking;
mod manhattan;

use easel_core::{
    diagram::Diagram,
    element::Waypoint,
    geometry::{Bounds, Point, Size},
    identifier::Id,
};

use crate::error::EaselError;

pub use docking::{ConnectionDocking, CroppingDocking, DockingPoint};
pub use manhattan::ManhattanLayouter;

/// Hints passed to a [`Layouter`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutHints {
    /// Anchor for the source end, overriding the current first waypoint.
    pub connection_start: Option<Point>,
    /// Anchor for the target end, overriding the current last waypoint.
    pub connection_end: Option<Point>,
    /// Path to lay out instead of the connection's current one.
    pub waypoints: Option<Vec<Waypoint>>,
}

impl LayoutHints {
    pub fn with_start(mut self, start: Option<Point>) -> Self {
        self.connection_start = start;
        self
    }

    pub fn with_end(mut self, end: Option<Point>) -> Self {
        self.connection_end = end;
        self
    }

    /// True if either end was given an explicit anchor.
    pub fn has_anchor(&self) -> bool {
        self.connection_start.is_some() || self.connection_end.is_some()
    }
}

/// Everything a [`Layouter`] needs to route one connection.
#[derive(Debug, Clone, Copy)]
pub struct LayoutRequest<'a> {
    pub source: Bounds,
    pub target: Bounds,
    /// Current path. Empty for a connection that was never laid out.
    pub waypoints: &'a [Waypoint],
    pub hints: &'a LayoutHints,
}

impl LayoutRequest<'_> {
    fn path(&self) -> &[Waypoint] {
        self.hints.waypoints.as_deref().unwrap_or(self.waypoints)
    }

    /// Anchor of the source end.
    ///
    /// An explicit hint wins, then the logical position of the current
    /// first waypoint, then the center of the source.
    pub fn start(&self) -> Point {
        self.hints
            .connection_start
            .or_else(|| self.path().first().map(Waypoint::logical))
            .unwrap_or_else(|| self.source.center())
    }

    /// Anchor of the target end.
    pub fn end(&self) -> Point {
        self.hints
            .connection_end
            .or_else(|| self.path().last().map(Waypoint::logical))
            .unwrap_or_else(|| self.target.center())
    }
}

/// Computes connection paths.
pub trait Layouter {
    fn layout(&self, request: &LayoutRequest<'_>) -> Vec<Waypoint>;
}

/// Connects the two anchors with a straight line.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLayouter;

impl Layouter for StraightLayouter {
    fn layout(&self, request: &LayoutRequest<'_>) -> Vec<Waypoint> {
        vec![Waypoint::new(request.start()), Waypoint::new(request.end())]
    }
}

/// Bounds used to anchor a connection end.
///
/// Connections can end on other connections; those are anchored on the
/// middle of their path.
pub fn end_bounds(diagram: &Diagram, id: Id) -> Result<Bounds, EaselError> {
    let element = diagram.element(id)?;
    let points = element.points();
    if element.is_connection() && !points.is_empty() {
        let len = points.len();
        let middle = if len % 2 == 0 {
            points[len / 2 - 1].midpoint(points[len / 2])
        } else {
            points[len / 2]
        };
        return Ok(Bounds::new_from_center(middle, Size::default()));
    }
    Ok(diagram.bounds(id)?)
}

/// Lays out `connection` between `source` and `target` with the configured
/// [`Layouter`].
///
/// The ends are passed explicitly so a connection can be routed before it
/// is linked to them.
pub fn layout_between(
    diagram: &Diagram,
    layouter: &dyn Layouter,
    source: Id,
    target: Id,
    waypoints: &[Waypoint],
    hints: &LayoutHints,
) -> Result<Vec<Waypoint>, EaselError> {
    let request = LayoutRequest {
        source: end_bounds(diagram, source)?,
        target: end_bounds(diagram, target)?,
        waypoints,
        hints,
    };
    Ok(layouter.layout(&request))
}
