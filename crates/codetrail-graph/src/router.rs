//! Obstacle-aware orthogonal routing. Every edge gets a raster-snapped
//! polyline that starts and ends exactly on its handle anchors, avoids the
//! interior of non-endpoint node rectangles, and follows its assigned trunk
//! coordinate when the bundler gave it one.
//!
//! Vertical layouts are routed in a swapped planar frame, so the candidate
//! construction below only ever reasons about "horizontal" geometry.

use crate::elements::{LayoutElements, LayoutOptions, RoutedEdgeSpec, SemanticNodePlacement};
use crate::geometry::{Rect, Vec2, route_length, segment_intersects_rect, simplify, snap_point};
use crate::profile::LayoutProfile;
use codetrail_api::{LayoutDirection, NodeId};
use std::collections::HashMap;

pub fn route_edges(
    elements: &mut LayoutElements,
    options: &LayoutOptions,
    profile: &LayoutProfile,
) {
    let vertical = options.direction == LayoutDirection::Vertical;
    let info: HashMap<NodeId, NodeInfo> = elements
        .nodes
        .iter()
        .map(|node| (node.id.clone(), NodeInfo::new(node, vertical)))
        .collect();
    let obstacles: Vec<(NodeId, Rect)> = elements
        .nodes
        .iter()
        .map(|node| {
            let rect = node.rect();
            (node.id.clone(), if vertical { rect.swapped() } else { rect })
        })
        .collect();

    for edge in &mut elements.edges {
        let (Some(source), Some(target)) = (info.get(&edge.source), info.get(&edge.target)) else {
            // Degenerate input: leave the edge unrouted, the renderer falls
            // back to a smooth step between the node positions it has.
            edge.route_points.clear();
            continue;
        };

        let start = resolve_anchor(source, &edge.source_handle, profile);
        let end = resolve_anchor(target, &edge.target_handle, profile);

        let candidates = build_candidates(edge, start, end, profile);
        let blockers: Vec<Rect> = obstacles
            .iter()
            .filter(|(id, _)| *id != edge.source && *id != edge.target)
            .map(|(_, rect)| rect.expand(profile.routing.obstacle_padding))
            .collect();

        let mut best: Option<(f64, Vec<Vec2>)> = None;
        for (index, candidate) in candidates.into_iter().enumerate() {
            let snapped: Vec<Vec2> = candidate
                .into_iter()
                .map(|point| snap_point(point, profile.raster_step))
                .collect();
            let mut simplified = simplify(&snapped);
            pin_endpoints(&mut simplified, start, end);

            let score = score_candidate(&simplified, index, edge, &blockers, profile);
            if best.as_ref().is_none_or(|(best_score, _)| score < *best_score) {
                best = Some((score, simplified));
            }
        }

        let mut points = best.map(|(_, points)| points).unwrap_or_default();
        if options.debug_routes {
            tracing::debug!(
                edge = %edge.id,
                points = points.len(),
                length = route_length(&points),
                "routed"
            );
        }
        if vertical {
            for point in &mut points {
                *point = point.swapped();
            }
        }
        edge.route_points = points;
    }
}

struct NodeInfo {
    rect: Rect,
    member_ids: Vec<String>,
    section_count: usize,
}

impl NodeInfo {
    fn new(node: &SemanticNodePlacement, vertical: bool) -> Self {
        let rect = node.rect();
        Self {
            rect: if vertical { rect.swapped() } else { rect },
            member_ids: node
                .members
                .iter()
                .map(|member| member.id.0.clone())
                .collect(),
            section_count: crate::canonical::visible_section_count(&node.members),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// Map a handle id to its exit side in the virtual frame. The grammar is
/// direction-aware, but the swap already folded the vertical case into the
/// horizontal rules.
fn handle_side(handle: &str) -> Side {
    if handle.starts_with("source-member-") {
        return Side::Right;
    }
    if handle.starts_with("target-member-") {
        return Side::Left;
    }
    if handle.ends_with("-top") {
        return Side::Top;
    }
    if handle.ends_with("-bottom") {
        return Side::Bottom;
    }
    if handle.ends_with("-right") {
        return Side::Right;
    }
    if handle.ends_with("-left") {
        return Side::Left;
    }
    if handle.starts_with("source") {
        Side::Right
    } else {
        Side::Left
    }
}

fn resolve_anchor(node: &NodeInfo, handle: &str, profile: &LayoutProfile) -> Vec2 {
    let rect = node.rect;
    let side = handle_side(handle);

    let member_id = handle
        .strip_prefix("source-member-")
        .or_else(|| handle.strip_prefix("target-member-"));
    let y = if let Some(member_id) = member_id
        && let Some(index) = node.member_ids.iter().position(|id| id == member_id)
    {
        let metrics = &profile.node;
        rect.min.y
            + metrics.member_header_height
            + node.section_count as f32 * metrics.member_section_height
            + index as f32 * metrics.member_row_height
            + metrics.member_anchor_inset
    } else {
        rect.center().y
    };

    let anchor = match side {
        Side::Right => Vec2::new(rect.max.x, y),
        Side::Left => Vec2::new(rect.min.x, y),
        Side::Top => Vec2::new(rect.center().x, rect.min.y),
        Side::Bottom => Vec2::new(rect.center().x, rect.max.y),
    };
    snap_point(anchor, profile.raster_step)
}

fn build_candidates(
    edge: &RoutedEdgeSpec,
    start: Vec2,
    end: Vec2,
    profile: &LayoutProfile,
) -> Vec<Vec<Vec2>> {
    if edge.is_hierarchy() {
        return hierarchy_candidates(edge, start, end, profile);
    }
    flow_candidates(edge, start, end, profile)
}

fn hierarchy_candidates(
    edge: &RoutedEdgeSpec,
    start: Vec2,
    end: Vec2,
    profile: &LayoutProfile,
) -> Vec<Vec<Vec2>> {
    let routing = &profile.routing;
    let offsets = routing.offsets.for_kind(edge.kind);
    let mid_y = (start.y + end.y) * 0.5;
    let preferred_y = mid_y + offsets.vertical_offset;
    [
        preferred_y,
        mid_y,
        preferred_y - routing.hierarchy_detour,
        preferred_y + routing.hierarchy_detour,
    ]
    .into_iter()
    .map(|y| vec![start, Vec2::new(start.x, y), Vec2::new(end.x, y), end])
    .collect()
}

fn flow_candidates(
    edge: &RoutedEdgeSpec,
    start: Vec2,
    end: Vec2,
    profile: &LayoutProfile,
) -> Vec<Vec<Vec2>> {
    let routing = &profile.routing;
    let offsets = routing.offsets.for_kind(edge.kind);

    let source_dir: f32 = match handle_side(&edge.source_handle) {
        Side::Left => -1.0,
        _ => 1.0,
    };
    let target_dir: f32 = match handle_side(&edge.target_handle) {
        Side::Right => 1.0,
        _ => -1.0,
    };
    // Exit and entry gates; pivots are clamped into this corridor.
    let exit_gate = start.x + source_dir * routing.source_exit;
    let entry_gate = end.x + target_dir * routing.target_entry;
    let gate_lo = exit_gate.min(entry_gate);
    let gate_hi = exit_gate.max(entry_gate);

    let mid_x = (start.x + end.x) * 0.5;
    let mid_y = (start.y + end.y) * 0.5;
    let preferred_x = edge.trunk_coord.unwrap_or(mid_x);

    let mut candidates = Vec::with_capacity(8);

    // Styled candidate, Sourcetrail parity. Trunk edges pivot on the trunk
    // coordinate; everything else pivots a kind-specific offset off the exit.
    let pivot_x = if edge.trunk_coord.is_some() {
        preferred_x.clamp(gate_lo, gate_hi)
    } else {
        (start.x + source_dir * offsets.origin_x).clamp(gate_lo, gate_hi)
    };
    if offsets.vertical_offset == 0.0 {
        candidates.push(vec![
            start,
            Vec2::new(pivot_x, start.y),
            Vec2::new(pivot_x, end.y),
            end,
        ]);
    } else {
        let shelf_y = mid_y + offsets.vertical_offset;
        let approach_x = (end.x + target_dir * offsets.target_x).clamp(gate_lo, gate_hi);
        candidates.push(vec![
            start,
            Vec2::new(pivot_x, start.y),
            Vec2::new(pivot_x, shelf_y),
            Vec2::new(approach_x, shelf_y),
            Vec2::new(approach_x, end.y),
            end,
        ]);
    }

    // Trunk-biased 6-point fallback through the preferred X.
    candidates.push(vec![
        start,
        Vec2::new(exit_gate, start.y),
        Vec2::new(exit_gate, mid_y),
        Vec2::new(preferred_x, mid_y),
        Vec2::new(preferred_x, end.y),
        end,
    ]);

    // 4-point corridor variants.
    for x in [
        mid_x,
        preferred_x - routing.x_detour_step,
        preferred_x + routing.x_detour_step,
    ] {
        candidates.push(vec![start, Vec2::new(x, start.y), Vec2::new(x, end.y), end]);
    }

    // 6-point corridor variants through a shifted shelf.
    for y in [mid_y, mid_y + routing.y_detour_step, mid_y - routing.y_detour_step] {
        candidates.push(vec![
            start,
            Vec2::new(exit_gate, start.y),
            Vec2::new(exit_gate, y),
            Vec2::new(entry_gate, y),
            Vec2::new(entry_gate, end.y),
            end,
        ]);
    }

    candidates
}

fn score_candidate(
    points: &[Vec2],
    candidate_index: usize,
    edge: &RoutedEdgeSpec,
    blockers: &[Rect],
    profile: &LayoutProfile,
) -> f64 {
    let routing = &profile.routing;

    let mut collisions = 0u32;
    for pair in points.windows(2) {
        for rect in blockers {
            if segment_intersects_rect(pair[0], pair[1], rect) {
                collisions += 1;
            }
        }
    }

    let turns = points.len().saturating_sub(2) as f64;
    let weight_bias = edge.weight_bias() as f64;
    let turn_cost = routing.turn_base as f64
        + (weight_bias * routing.turn_bundle_scale as f64).min(routing.turn_bundle_cap as f64);

    let trunk_penalty = match edge.trunk_coord {
        Some(trunk) if points.len() > 2 => {
            let min_distance = points[1..points.len() - 1]
                .iter()
                .map(|point| (point.x - trunk).abs())
                .fold(f32::MAX, f32::min);
            min_distance as f64 * routing.trunk_penalty_weight as f64
        }
        _ => 0.0,
    };

    collisions as f64 * routing.collision_weight as f64
        + turns * turn_cost
        + route_length(points) as f64 * routing.length_weight as f64
        + trunk_penalty
        + candidate_index as f64 * routing.candidate_index_weight as f64
}

// Simplification may never move the endpoints; force them back onto the
// exact handle anchors.
fn pin_endpoints(points: &mut [Vec2], start: Vec2, end: Vec2) {
    if let Some(first) = points.first_mut() {
        *first = start;
    }
    if let Some(last) = points.last_mut() {
        *last = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::RoutedEdgeSpec;
    use codetrail_api::{
        CanonicalEdgeFamily, CanonicalNodeStyle, CanonicalRouteKind, EdgeCertainty, EdgeId,
        EdgeKind, NodeKind,
    };

    fn placed_node(id: &str, x: f32, y: f32, width: f32, height: f32) -> SemanticNodePlacement {
        SemanticNodePlacement {
            id: NodeId::new(id),
            kind: NodeKind::FUNCTION,
            label: id.to_string(),
            is_center: false,
            node_style: CanonicalNodeStyle::Pill,
            is_non_indexed: false,
            duplicate_count: 1,
            merged_symbol_ids: vec![NodeId::new(id)],
            member_count: 0,
            badge_visible_members: None,
            badge_total_members: None,
            members: Vec::new(),
            x_rank: 0.0,
            y_rank: 0,
            x,
            y,
            width,
            height,
            is_virtual_bundle: false,
        }
    }

    fn flow_edge(id: &str, source: &str, target: &str) -> RoutedEdgeSpec {
        RoutedEdgeSpec {
            id: id.to_string(),
            source_edge_ids: vec![EdgeId::new(id)],
            source: NodeId::new(source),
            target: NodeId::new(target),
            source_handle: "source-node".into(),
            target_handle: "target-node".into(),
            kind: EdgeKind::CALL,
            certainty: EdgeCertainty::None,
            multiplicity: 1,
            family: CanonicalEdgeFamily::Flow,
            route_kind: CanonicalRouteKind::Direct,
            bundle_count: 1,
            route_points: Vec::new(),
            trunk_coord: None,
            channel_id: None,
            channel_pair_id: None,
            channel_weight: None,
            shared_trunk_points: None,
            source_member_order: None,
            target_member_order: None,
        }
    }

    fn assert_orthogonal(points: &[Vec2]) {
        for pair in points.windows(2) {
            assert!(
                pair[0].x == pair[1].x || pair[0].y == pair[1].y,
                "segment {:?} -> {:?} is diagonal",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn straight_shot_collapses_to_two_points() {
        let mut elements = LayoutElements {
            nodes: vec![
                placed_node("a", 0.0, 100.0, 120.0, 40.0),
                placed_node("b", 400.0, 100.0, 120.0, 40.0),
            ],
            edges: vec![flow_edge("e1", "a", "b")],
            center_node_id: NodeId::new("a"),
        };
        route_edges(
            &mut elements,
            &LayoutOptions::default(),
            &LayoutProfile::default(),
        );

        let points = &elements.edges[0].route_points;
        assert_eq!(points.len(), 2, "aligned anchors route straight: {points:?}");
        assert_eq!(points[0], Vec2::new(120.0, 120.0));
        assert_eq!(points[1], Vec2::new(400.0, 120.0));
    }

    #[test]
    fn blocked_corridor_detours_below_the_obstacle() {
        let mut elements = LayoutElements {
            nodes: vec![
                placed_node("left", 40.0, 160.0, 140.0, 44.0),
                placed_node("right", 560.0, 160.0, 140.0, 44.0),
                placed_node("blocker", 250.0, 120.0, 220.0, 130.0),
            ],
            edges: vec![flow_edge("e1", "left", "right")],
            center_node_id: NodeId::new("left"),
        };
        route_edges(
            &mut elements,
            &LayoutOptions::default(),
            &LayoutProfile::default(),
        );

        let points = &elements.edges[0].route_points;
        assert!(points.len() >= 4, "detour needs bends: {points:?}");
        assert_orthogonal(points);
        assert_eq!(points[0], Vec2::new(180.0, 182.0));
        assert_eq!(points[points.len() - 1], Vec2::new(560.0, 182.0));

        // The blocker's interior stays untouched and the shelf runs below it.
        let blocker = Rect::from_pos_size(Vec2::new(250.0, 120.0), Vec2::new(220.0, 130.0));
        for pair in points.windows(2) {
            assert!(
                !segment_intersects_rect(pair[0], pair[1], &blocker),
                "segment {:?}->{:?} crosses the blocker",
                pair[0],
                pair[1]
            );
        }
        assert!(
            points.iter().any(|point| point.y > 250.0),
            "expected the route to dip below the blocker: {points:?}"
        );
        for pair in points.windows(2) {
            if pair[0].y == pair[1].y && pair[0].y == 160.0 {
                let lo = pair[0].x.min(pair[1].x);
                let hi = pair[0].x.max(pair[1].x);
                assert!(hi <= 250.0 || lo >= 470.0, "row 160 crossed inside the blocker span");
            }
        }
    }

    #[test]
    fn trunk_edges_pivot_on_the_trunk_coordinate() {
        let mut edge = flow_edge("e1", "a", "b");
        edge.route_kind = CanonicalRouteKind::FlowTrunk;
        edge.trunk_coord = Some(240.0);
        edge.channel_weight = Some(5);
        let mut elements = LayoutElements {
            nodes: vec![
                placed_node("a", 0.0, 40.0, 120.0, 40.0),
                placed_node("b", 400.0, 200.0, 120.0, 40.0),
            ],
            edges: vec![edge],
            center_node_id: NodeId::new("a"),
        };
        route_edges(
            &mut elements,
            &LayoutOptions::default(),
            &LayoutProfile::default(),
        );

        let points = &elements.edges[0].route_points;
        assert_orthogonal(points);
        assert!(
            points[1..points.len() - 1].iter().any(|p| p.x == 240.0),
            "trunk coordinate should carry the vertical run: {points:?}"
        );
    }

    #[test]
    fn missing_endpoint_leaves_route_empty() {
        let mut elements = LayoutElements {
            nodes: vec![placed_node("a", 0.0, 0.0, 120.0, 40.0)],
            edges: vec![flow_edge("e1", "a", "ghost")],
            center_node_id: NodeId::new("a"),
        };
        route_edges(
            &mut elements,
            &LayoutOptions::default(),
            &LayoutProfile::default(),
        );
        assert!(elements.edges[0].route_points.is_empty());
    }

    #[test]
    fn member_anchor_uses_card_row_geometry() {
        let mut host = placed_node("host", 0.0, 0.0, 240.0, 300.0);
        host.node_style = CanonicalNodeStyle::Card;
        host.kind = NodeKind::CLASS;
        host.members = vec![
            codetrail_api::CanonicalMemberDto {
                id: NodeId::new("m-alpha"),
                label: "alpha".into(),
                kind: NodeKind::METHOD,
                visibility: codetrail_api::CanonicalMemberVisibility::Public,
            },
            codetrail_api::CanonicalMemberDto {
                id: NodeId::new("m-beta"),
                label: "beta".into(),
                kind: NodeKind::METHOD,
                visibility: codetrail_api::CanonicalMemberVisibility::Public,
            },
        ];
        let mut edge = flow_edge("e1", "host", "sink");
        edge.source_handle = "source-member-m-beta".into();
        let mut elements = LayoutElements {
            nodes: vec![host, placed_node("sink", 500.0, 100.0, 120.0, 40.0)],
            edges: vec![edge],
            center_node_id: NodeId::new("host"),
        };
        route_edges(
            &mut elements,
            &LayoutOptions::default(),
            &LayoutProfile::default(),
        );

        let start = elements.edges[0].route_points[0];
        // One visible section, member row index 1:
        // y = 74 + 1*28 + 1*21 + 10 = 133, snapped to the raster step of 2 -> 134.
        assert_eq!(start.x, 240.0);
        assert_eq!(start.y, 134.0);
    }

    #[test]
    fn vertical_layout_emits_swapped_axis_aligned_routes() {
        let mut elements = LayoutElements {
            nodes: vec![
                placed_node("a", 100.0, 0.0, 120.0, 40.0),
                placed_node("b", 100.0, 400.0, 120.0, 40.0),
            ],
            edges: vec![flow_edge("e1", "a", "b")],
            center_node_id: NodeId::new("a"),
        };
        let options = LayoutOptions {
            direction: LayoutDirection::Vertical,
            ..LayoutOptions::default()
        };
        route_edges(&mut elements, &options, &LayoutProfile::default());

        let points = &elements.edges[0].route_points;
        assert!(points.len() >= 2);
        assert_orthogonal(points);
        // Plain source handle exits the bottom side in vertical layouts.
        assert_eq!(points[0], Vec2::new(160.0, 40.0));
        assert_eq!(points[points.len() - 1], Vec2::new(160.0, 400.0));
    }
}
