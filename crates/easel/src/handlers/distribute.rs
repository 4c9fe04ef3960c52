//! `elements.distribute` and the grouping it works on.

use log::{debug, trace};

use easel_core::{
    diagram::Diagram,
    geometry::{Axis, Point},
    identifier::Id,
};

use crate::{
    command::{
        CommandHandler, Context, Scope,
        context::{DistributeElementsContext, DistributionGroup, MoveElementsContext, Range},
        names,
    },
    error::EaselError,
};

/// Groups `elements` for an even distribution along `axis`.
///
/// Labels and connections are ignored. Elements are sorted by their start
/// on the axis; an element whose range, shrunk by `threshold` on both ends,
/// overlaps the previous group joins it. Returns `None` when there is
/// nothing to distribute: fewer than three elements or at most two groups.
pub fn group_for_distribution(
    diagram: &Diagram,
    elements: &[Id],
    axis: Axis,
    threshold: f32,
) -> Option<Vec<DistributionGroup>> {
    if elements.len() < 3 {
        return None;
    }

    let mut shapes: Vec<_> = elements
        .iter()
        .filter_map(|id| diagram.get(*id))
        .filter(|element| !element.is_label())
        .filter_map(|element| element.bounds().map(|bounds| (element.id(), bounds)))
        .collect();
    shapes.sort_by(|(_, a), (_, b)| a.start(axis).total_cmp(&b.start(axis)));

    let mut groups: Vec<DistributionGroup> = Vec::new();
    for (id, bounds) in shapes {
        let range = Range::new(
            bounds.start(axis) + threshold,
            bounds.end(axis) - threshold,
        );
        match groups.last_mut() {
            Some(previous) if previous.range.intersects(&range) => previous.elements.push(id),
            _ => groups.push(DistributionGroup {
                elements: vec![id],
                range,
            }),
        }
    }

    trace!(groups = groups.len(), axis:?; "Grouped elements for distribution");
    if groups.len() <= 2 { None } else { Some(groups) }
}

fn along(axis: Axis, amount: f32) -> Point {
    Point::default().with_coord(axis, amount)
}

/// Moves `id` by `amount` along `axis` within its own parent. Zero moves are skipped.
fn shift(scope: &mut Scope<'_>, id: Id, axis: Axis, amount: f32) -> Result<(), EaselError> {
    if amount == 0.0 {
        return Ok(());
    }
    let parent = scope.diagram().element(id)?.parent();
    scope.execute(
        names::ELEMENTS_MOVE,
        MoveElementsContext::new(vec![id], along(axis, amount)).with_parent(parent),
    )?;
    Ok(())
}

/// Spreads groups so the gaps between them are equal.
///
/// Elements of a multi-element group are first centered on a reference
/// element: the first one for every group but the last, which uses its last
/// element. The outer groups then stay in place and the inner groups are
/// moved so that each starts one margin after the previous group ends.
pub(super) struct DistributeElementsHandler;

impl CommandHandler for DistributeElementsHandler {
    fn pre_execute(&self, context: &mut Context, scope: &mut Scope<'_>) -> Result<(), EaselError> {
        let ctx = context.get_mut::<DistributeElementsContext>()?;
        ctx.groups.retain(|group| !group.elements.is_empty());
        let axis = ctx.axis;
        let count = ctx.groups.len();
        if count < 2 {
            return Ok(());
        }
        let is_inner = |index: usize| index != 0 && index != count - 1;

        let mut groups_size = 0.0;
        for (index, group) in ctx.groups.iter_mut().enumerate() {
            if group.elements.len() < 2 {
                if is_inner(index) {
                    let bounds = scope.diagram().bounds(group.elements[0])?;
                    group.range.min = group.range.min.min(bounds.start(axis));
                    group.range.max = group.range.max.max(bounds.end(axis));
                    groups_size += group.range.span();
                }
                continue;
            }

            let mut sorted = group.elements.clone();
            let diagram = scope.diagram();
            sorted.sort_by(|a, b| {
                let start = |id: &Id| diagram.bounds(*id).map(|b| b.start(axis)).unwrap_or_default();
                start(a).total_cmp(&start(b))
            });
            let reference = if index == count - 1 {
                sorted[sorted.len() - 1]
            } else {
                sorted[0]
            };
            let reference_center = scope.diagram().bounds(reference)?.center().coord(axis);

            let mut range: Option<Range> = None;
            for id in sorted {
                let center = scope.diagram().bounds(id)?.center().coord(axis);
                shift(scope, id, axis, reference_center - center)?;
                let bounds = scope.diagram().bounds(id)?;
                range = Some(match range {
                    None => Range::new(bounds.start(axis), bounds.end(axis)),
                    Some(range) => Range::new(
                        range.min.min(bounds.start(axis)),
                        range.max.max(bounds.end(axis)),
                    ),
                });
            }
            if let Some(range) = range {
                group.range = range;
            }
            if is_inner(index) {
                groups_size += group.range.span();
            }
        }

        let space_in_between = (ctx.groups[count - 1].range.min - ctx.groups[0].range.max).abs();
        let margin = ((space_in_between - groups_size) / (count - 1) as f32).round();
        if margin < (count - 1) as f32 {
            debug!(margin, groups = count; "Not enough space to distribute");
            return Ok(());
        }
        debug!(margin, groups = count, axis:?; "Distributing elements");

        for index in 1..count - 1 {
            let previous_max = ctx.groups[index - 1].range.max;
            let group_min = ctx.groups[index].range.min;
            let elements = ctx.groups[index].elements.clone();
            let mut group_max = 0.0_f32;

            for (position, id) in elements.into_iter().enumerate() {
                let start = scope.diagram().bounds(id)?.start(axis);
                let mut amount = previous_max - start + margin;
                if group_min != start {
                    amount += start - group_min;
                }
                shift(scope, id, axis, amount)?;

                let end = scope.diagram().bounds(id)?.end(axis);
                group_max = if position == 0 { end } else { end.max(group_max) };
            }
            ctx.groups[index].range.max = group_max;
        }
        Ok(())
    }

    fn execute(&self, _context: &mut Context, _scope: &mut Scope<'_>) -> Result<Vec<Id>, EaselError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::{element::Element, geometry::Bounds};

    fn diagram_with(boxes: &[(&str, f32, f32)]) -> Diagram {
        let root = Id::new("Root");
        let mut diagram = Diagram::new(root, Id::new("Process"));
        for (name, x, width) in boxes {
            diagram
                .add_shape(
                    Element::shape(Id::new(name), Id::new("Task"), Bounds::new(*x, 0.0, *width, 50.0)),
                    root,
                    None,
                )
                .expect("added");
        }
        diagram
    }

    #[test]
    fn test_groups_overlapping_elements() {
        let diagram = diagram_with(&[("A", 0.0, 100.0), ("B", 90.0, 100.0), ("C", 300.0, 50.0), ("D", 500.0, 50.0)]);
        let ids: Vec<_> = ["A", "B", "C", "D"].into_iter().map(Id::new).collect();

        let groups = group_for_distribution(&diagram, &ids, Axis::X, 5.0).expect("three groups");
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].elements, vec![Id::new("A"), Id::new("B")]);
        assert_eq!(groups[1].range, Range::new(305.0, 345.0));
    }

    #[test]
    fn test_threshold_separates_touching_elements() {
        let diagram = diagram_with(&[("A", 0.0, 100.0), ("B", 98.0, 100.0), ("C", 300.0, 50.0)]);
        let ids: Vec<_> = ["C", "B", "A"].into_iter().map(Id::new).collect();

        let groups = group_for_distribution(&diagram, &ids, Axis::X, 5.0).expect("three groups");
        assert_eq!(groups[0].elements, vec![Id::new("A")]);
        assert_eq!(groups[1].elements, vec![Id::new("B")]);
    }

    #[test]
    fn test_nothing_to_distribute() {
        let diagram = diagram_with(&[("A", 0.0, 100.0), ("B", 50.0, 100.0), ("C", 300.0, 50.0)]);
        let ids: Vec<_> = ["A", "B", "C"].into_iter().map(Id::new).collect();
        assert!(group_for_distribution(&diagram, &ids, Axis::X, 5.0).is_none());
        assert!(group_for_distribution(&diagram, &ids[..2], Axis::X, 5.0).is_none());
    }
}
