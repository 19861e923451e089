//! Layered placement. Columns are the distinct signed-depth ranks; rows are
//! the deterministic in-column order. Horizontal layouts spread columns along
//! x, vertical layouts along y; every coordinate lands on the raster grid.

use crate::elements::LayoutElements;
use crate::geometry::{Vec2, snap};
use crate::profile::LayoutProfile;
use codetrail_api::LayoutDirection;
use std::cmp::Ordering;

pub fn place_nodes(
    elements: &mut LayoutElements,
    direction: LayoutDirection,
    profile: &LayoutProfile,
) {
    if elements.nodes.is_empty() {
        return;
    }
    let horizontal = direction == LayoutDirection::Horizontal;
    let step = profile.raster_step;
    let rank_sep = profile.placement.rank_separation;
    let node_sep = profile.placement.node_separation;

    let mut order: Vec<usize> = (0..elements.nodes.len()).collect();
    order.sort_by(|&left, &right| {
        let a = &elements.nodes[left];
        let b = &elements.nodes[right];
        match a.x_rank.total_cmp(&b.x_rank) {
            Ordering::Equal => {}
            other => return other,
        }
        match a.y_rank.cmp(&b.y_rank) {
            Ordering::Equal => {}
            other => return other,
        }
        match a.label.cmp(&b.label) {
            Ordering::Equal => a.id.cmp(&b.id),
            other => other,
        }
    });

    // Group consecutive indices into columns of equal rank.
    let mut columns: Vec<Vec<usize>> = Vec::new();
    for index in order {
        let rank = elements.nodes[index].x_rank;
        match columns.last_mut() {
            Some(column) if elements.nodes[column[0]].x_rank == rank => column.push(index),
            _ => columns.push(vec![index]),
        }
    }

    // (flow, cross) extents per node, resolved against the layout direction.
    let sizes: Vec<(f32, f32)> = elements
        .nodes
        .iter()
        .map(|node| {
            if horizontal {
                (node.width, node.height)
            } else {
                (node.height, node.width)
            }
        })
        .collect();

    let column_totals: Vec<f32> = columns
        .iter()
        .map(|column| {
            let cross: f32 = column.iter().map(|&index| sizes[index].1).sum();
            cross + node_sep * (column.len() - 1) as f32
        })
        .collect();
    let tallest = column_totals.iter().fold(0.0f32, |acc, &total| acc.max(total));

    let mut flow_cursor = 0.0f32;
    for (column, &total) in columns.iter().zip(&column_totals) {
        let extent = column
            .iter()
            .map(|&index| sizes[index].0)
            .fold(0.0f32, f32::max);
        // Columns are centered against the tallest one.
        let mut cross_cursor = (tallest - total) * 0.5;

        for (row, &index) in column.iter().enumerate() {
            let (x, y) = if horizontal {
                (flow_cursor, cross_cursor)
            } else {
                (cross_cursor, flow_cursor)
            };
            let node = &mut elements.nodes[index];
            node.x = snap(x, step);
            node.y = snap(y, step);
            node.y_rank = row as u32;
            cross_cursor += sizes[index].1 + node_sep;
        }
        flow_cursor += extent + rank_sep;
    }

    seed_edge_polylines(elements);
}

// Center-to-center seed polylines; the router overwrites these for every
// edge whose handles resolve.
fn seed_edge_polylines(elements: &mut LayoutElements) {
    let centers: Vec<(codetrail_api::NodeId, Vec2)> = elements
        .nodes
        .iter()
        .map(|node| (node.id.clone(), node.rect().center()))
        .collect();
    let center_of = |id: &codetrail_api::NodeId| -> Option<Vec2> {
        centers
            .iter()
            .find(|(node_id, _)| node_id == id)
            .map(|(_, center)| *center)
    };

    for edge in &mut elements.edges {
        if let (Some(source), Some(target)) = (center_of(&edge.source), center_of(&edge.target)) {
            edge.route_points = vec![source, target];
        } else {
            edge.route_points.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::canonicalize;
    use crate::elements::LayoutOptions;
    use codetrail_api::{EdgeId, EdgeKind, GraphEdgeDto, GraphNodeDto, GraphResponse, NodeId, NodeKind};

    fn node(id: &str, label: &str, kind: NodeKind, depth: u32) -> GraphNodeDto {
        GraphNodeDto {
            id: NodeId::new(id),
            label: label.to_string(),
            kind,
            depth,
            badge_visible_members: None,
            badge_total_members: None,
            member_access: None,
        }
    }

    fn edge(id: &str, source: &str, target: &str, kind: EdgeKind) -> GraphEdgeDto {
        GraphEdgeDto {
            id: EdgeId::new(id),
            source: NodeId::new(source),
            target: NodeId::new(target),
            kind,
            certainty: None,
        }
    }

    fn placed_fixture(direction: LayoutDirection) -> LayoutElements {
        let response = GraphResponse {
            center_id: NodeId::new("center"),
            nodes: vec![
                node("center", "Center", NodeKind::CLASS, 0),
                node("callee_a", "Alpha", NodeKind::FUNCTION, 1),
                node("callee_b", "Beta", NodeKind::FUNCTION, 1),
                node("caller", "Gamma", NodeKind::FUNCTION, 1),
            ],
            edges: vec![
                edge("e1", "center", "callee_a", EdgeKind::CALL),
                edge("e2", "center", "callee_b", EdgeKind::CALL),
                edge("e3", "caller", "center", EdgeKind::CALL),
            ],
            truncated: false,
            canonical_layout: None,
        };
        let profile = LayoutProfile::default();
        let mut elements = canonicalize(&response, &LayoutOptions::default(), &profile).elements;
        place_nodes(&mut elements, direction, &profile);
        elements
    }

    #[test]
    fn no_placed_rectangles_overlap() {
        let elements = placed_fixture(LayoutDirection::Horizontal);
        for (index, a) in elements.nodes.iter().enumerate() {
            for b in &elements.nodes[index + 1..] {
                assert!(
                    !a.rect().overlaps_interior(&b.rect()),
                    "{} overlaps {}",
                    a.id,
                    b.id
                );
            }
        }
    }

    #[test]
    fn coordinates_are_raster_multiples() {
        let elements = placed_fixture(LayoutDirection::Horizontal);
        let step = LayoutProfile::default().raster_step;
        for node in &elements.nodes {
            assert_eq!(node.x % step, 0.0, "x off grid for {}", node.id);
            assert_eq!(node.y % step, 0.0, "y off grid for {}", node.id);
        }
    }

    #[test]
    fn caller_lands_left_of_center_and_callees_right() {
        let elements = placed_fixture(LayoutDirection::Horizontal);
        let x_of = |id: &str| elements.node(&NodeId::new(id)).unwrap().x;
        assert!(x_of("caller") < x_of("center"));
        assert!(x_of("center") < x_of("callee_a"));
        assert!(x_of("center") < x_of("callee_b"));
    }

    #[test]
    fn orientation_controls_the_spread_axis() {
        let spread = |elements: &LayoutElements| {
            let xs: Vec<f32> = elements.nodes.iter().map(|n| n.x).collect();
            let ys: Vec<f32> = elements.nodes.iter().map(|n| n.y).collect();
            let span = |values: &[f32]| {
                let min = values.iter().fold(f32::MAX, |a, &b| a.min(b));
                let max = values.iter().fold(f32::MIN, |a, &b| a.max(b));
                max - min
            };
            (span(&xs), span(&ys))
        };

        let horizontal = placed_fixture(LayoutDirection::Horizontal);
        let (hx, hy) = spread(&horizontal);
        assert!(hx > hy, "horizontal layout should spread along x ({hx} vs {hy})");

        let vertical = placed_fixture(LayoutDirection::Vertical);
        let (vx, vy) = spread(&vertical);
        assert!(vy > vx, "vertical layout should spread along y ({vy} vs {vx})");
    }

    #[test]
    fn edges_receive_center_seed_polylines() {
        let elements = placed_fixture(LayoutDirection::Horizontal);
        for edge in &elements.edges {
            assert_eq!(edge.route_points.len(), 2);
        }
    }
}
