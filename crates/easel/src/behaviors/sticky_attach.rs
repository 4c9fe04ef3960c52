//! Hover feedback for dragging an attached shape.
//!
//! While a shape with a host is dragged, the host's hit region grows by
//! `modeling.attach_hover_padding` so the shape can be dropped back onto
//! the host boundary without a neighbour taking the hover.

use log::debug;

use easel_core::{
    diagram::Diagram,
    geometry::{Bounds, Point},
    identifier::Id,
};

use crate::{config::AppConfig, error::EaselError};

/// A drag of one shape, from [`start`](Self::start) to
/// [`end`](Self::end) or [`cancel`](Self::cancel).
#[derive(Debug, Clone)]
pub struct StickyAttach {
    shape: Id,
    host: Option<Id>,
    host_region: Option<Bounds>,
}

impl StickyAttach {
    /// Starts dragging `shape`.
    ///
    /// # Errors
    ///
    /// `shape` or its host is not a shape of `diagram`.
    pub fn start(diagram: &Diagram, config: &AppConfig, shape: Id) -> Result<Self, EaselError> {
        let host = diagram.shape(shape)?.host();
        let host_region = match host {
            Some(host) => Some(
                diagram
                    .bounds(host)?
                    .expand(config.modeling().attach_hover_padding()),
            ),
            None => None,
        };
        debug!(shape:%, sticky = host.is_some(); "Drag started");
        Ok(Self {
            shape,
            host,
            host_region,
        })
    }

    pub fn shape(&self) -> Id {
        self.shape
    }

    /// The enlarged hit region of the host, if the shape has one.
    pub fn host_region(&self) -> Option<Bounds> {
        self.host_region
    }

    /// The shape a drop at `point` would target.
    ///
    /// Inside the host region the host wins over everything but its own
    /// descendants. The dragged shape never targets itself.
    pub fn hover_target(&self, diagram: &Diagram, point: Point) -> Option<Id> {
        let hit = diagram.shape_at(point, &[self.shape]);
        match (self.host, self.host_region) {
            (Some(host), Some(region)) if region.contains(point) => match hit {
                Some(hit) if diagram.is_ancestor(host, hit) => Some(hit),
                _ => Some(host),
            },
            _ => hit,
        }
    }

    /// Ends the drag at `point` and returns the drop target.
    pub fn end(self, diagram: &Diagram, point: Point) -> Option<Id> {
        let target = self.hover_target(diagram, point);
        debug!(shape:% = self.shape, dropped = target.is_some(); "Drag ended");
        target
    }

    /// Abandons the drag. The host region is dropped with the session.
    pub fn cancel(self) {
        debug!(shape:% = self.shape; "Drag cancelled");
    }
}

#[cfg(test)]
mod tests {
    use easel_core::element::Element;

    use super::*;

    fn diagram() -> Diagram {
        let root = Id::new("Sticky_Root");
        let mut diagram = Diagram::new(root, Id::new("Process"));
        let shapes = [
            ("Sticky_Task", "Task", Bounds::new(0.0, 0.0, 100.0, 80.0)),
            ("Sticky_Other", "Task", Bounds::new(105.0, 0.0, 100.0, 80.0)),
            ("Sticky_Event", "BoundaryEvent", Bounds::new(82.0, 62.0, 36.0, 36.0)),
            ("Sticky_Free", "BoundaryEvent", Bounds::new(300.0, 0.0, 36.0, 36.0)),
        ];
        for (name, kind, bounds) in shapes {
            diagram
                .add_shape(Element::shape(Id::new(name), Id::new(kind), bounds), root, None)
                .expect("added");
        }
        diagram
            .set_host(Id::new("Sticky_Event"), Some(Id::new("Sticky_Task")), None)
            .expect("attached");
        diagram
    }

    #[test]
    fn test_host_keeps_hover_in_padding() {
        let diagram = diagram();
        let drag = StickyAttach::start(&diagram, &AppConfig::default(), Id::new("Sticky_Event"))
            .expect("started");

        let region = drag.host_region().expect("has host");
        assert_eq!(region, Bounds::new(0.0, 0.0, 100.0, 80.0).expand(15.0));

        // over the neighbour, but within the padding of the host
        let point = Point::new(110.0, 40.0);
        assert_eq!(diagram.shape_at(point, &[]), Some(Id::new("Sticky_Other")));
        assert_eq!(drag.hover_target(&diagram, point), Some(Id::new("Sticky_Task")));

        // far enough away the neighbour wins again
        let point = Point::new(150.0, 40.0);
        assert_eq!(drag.end(&diagram, point), Some(Id::new("Sticky_Other")));
    }

    #[test]
    fn test_unattached_shape_uses_plain_hit_test() {
        let diagram = diagram();
        let drag = StickyAttach::start(&diagram, &AppConfig::default(), Id::new("Sticky_Free"))
            .expect("started");
        assert!(drag.host_region().is_none());
        assert_eq!(
            drag.hover_target(&diagram, Point::new(110.0, 40.0)),
            Some(Id::new("Sticky_Other"))
        );
        assert_eq!(drag.hover_target(&diagram, Point::new(318.0, 18.0)), None);
        drag.cancel();
    }
}
