//! Render adapter: turns routed edges into SVG-style drawing instructions.
//! Straight segments join through quarter-arc fillets; trunk edges get a
//! small hook where a branch leaves the shared trunk line.

use crate::elements::{LayoutElements, RoutedEdgeSpec};
use crate::geometry::Vec2;
use crate::profile::LayoutProfile;
use crate::style::{self, EdgeStroke, MarkerKind};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerEnd {
    pub kind: MarkerKind,
    pub size: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgePath {
    pub edge_id: String,
    pub path: String,
    pub label_x: f32,
    pub label_y: f32,
    pub stroke: EdgeStroke,
    pub marker_end: MarkerEnd,
    pub interaction_width: f32,
}

/// Render every edge of a layout. Unroutable edges fall back to a smooth
/// step between the endpoint node positions when both are known.
pub fn render_edges(elements: &LayoutElements, profile: &LayoutProfile) -> Vec<EdgePath> {
    elements
        .edges
        .iter()
        .map(|edge| {
            let fallback = fallback_endpoints(elements, edge);
            build_edge_path(edge, fallback, profile)
        })
        .collect()
}

fn fallback_endpoints(elements: &LayoutElements, edge: &RoutedEdgeSpec) -> Option<(Vec2, Vec2)> {
    let source = elements.node(&edge.source)?.rect().center();
    let target = elements.node(&edge.target)?.rect().center();
    Some((source, target))
}

pub fn build_edge_path(
    edge: &RoutedEdgeSpec,
    fallback: Option<(Vec2, Vec2)>,
    profile: &LayoutProfile,
) -> EdgePath {
    let (path, label) = if edge.route_points.len() >= 2 {
        (
            orthogonal_path(&edge.route_points, edge.trunk_coord, profile),
            middle_point(&edge.route_points),
        )
    } else if let Some((source, target)) = fallback {
        (smooth_step_path(source, target), middle_of(source, target))
    } else {
        (String::new(), Vec2::default())
    };

    let tier = style::marker_tier(edge);
    EdgePath {
        edge_id: edge.id.clone(),
        path,
        label_x: label.x,
        label_y: label.y,
        stroke: style::edge_stroke(edge, profile),
        marker_end: MarkerEnd {
            kind: style::marker_kind(edge.kind),
            size: style::marker_size(tier, profile),
        },
        interaction_width: style::interaction_width(edge, profile),
    }
}

/// Label position: the middle route point by count.
fn middle_point(points: &[Vec2]) -> Vec2 {
    points[points.len() / 2]
}

fn middle_of(a: Vec2, b: Vec2) -> Vec2 {
    Vec2::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
}

// Degenerate-edge fallback: a cubic step between the two screen positions.
fn smooth_step_path(source: Vec2, target: Vec2) -> String {
    let mid_x = (source.x + target.x) * 0.5;
    format!(
        "M {} {} C {} {}, {} {}, {} {}",
        source.x, source.y, mid_x, source.y, mid_x, target.y, target.x, target.y
    )
}

fn orthogonal_path(points: &[Vec2], trunk: Option<f32>, profile: &LayoutProfile) -> String {
    let render = &profile.render;
    let mut path = String::new();
    let first = points[0];
    let _ = write!(path, "M {} {}", first.x, first.y);

    for i in 1..points.len().saturating_sub(1) {
        let prev = points[i - 1];
        let vertex = points[i];
        let next = points[i + 1];
        let in_len = segment_len(prev, vertex);
        let out_len = segment_len(vertex, next);

        if let Some(trunk) = trunk
            && let Some(hook) = trunk_join_hook(prev, vertex, next, trunk, render)
        {
            path.push_str(&hook);
            continue;
        }

        let radius = render
            .corner_radius
            .min(in_len * 0.5)
            .min(out_len * 0.5);
        if radius <= 0.0 {
            let _ = write!(path, " L {} {}", vertex.x, vertex.y);
            continue;
        }
        let approach = step_towards(vertex, prev, radius);
        let exit = step_towards(vertex, next, radius);
        let _ = write!(
            path,
            " L {} {} Q {} {} {} {}",
            approach.x, approach.y, vertex.x, vertex.y, exit.x, exit.y
        );
    }

    let last = points[points.len() - 1];
    let _ = write!(path, " L {} {}", last.x, last.y);
    path
}

fn segment_len(a: Vec2, b: Vec2) -> f32 {
    (b.x - a.x).abs() + (b.y - a.y).abs()
}

// Point at `distance` from `vertex` along the segment towards `other`.
fn step_towards(vertex: Vec2, other: Vec2, distance: f32) -> Vec2 {
    let dx = (other.x - vertex.x).signum();
    let dy = (other.y - vertex.y).signum();
    if other.x != vertex.x {
        Vec2::new(vertex.x + dx * distance.min((other.x - vertex.x).abs()), vertex.y)
    } else {
        Vec2::new(vertex.x, vertex.y + dy * distance.min((other.y - vertex.y).abs()))
    }
}

const TRUNK_EPSILON: f32 = 0.01;

/// A branch-exit vertex sits on the trunk line with the incoming segment
/// running along the trunk and the outgoing segment perpendicular to it.
/// Replace the plain corner with an upper-then-outward-then-lower lobe when
/// the adjacent segments leave room for it.
fn trunk_join_hook(
    prev: Vec2,
    vertex: Vec2,
    next: Vec2,
    trunk: f32,
    render: &crate::profile::RenderParams,
) -> Option<String> {
    let in_len = segment_len(prev, vertex);
    let out_len = segment_len(vertex, next);
    let radius = render.trunk_join_radius.min(in_len * 0.5);
    let depth = render.trunk_join_depth.min(out_len * 0.5);
    if radius < render.trunk_join_min_radius || depth < render.trunk_join_min_depth {
        return None;
    }

    let vertical_trunk = prev.x == vertex.x && (vertex.x - trunk).abs() < TRUNK_EPSILON;
    let horizontal_trunk = prev.y == vertex.y && (vertex.y - trunk).abs() < TRUNK_EPSILON;

    if vertical_trunk && next.y == vertex.y {
        let along = (vertex.y - prev.y).signum();
        let outward = (next.x - vertex.x).signum();
        let upper = Vec2::new(vertex.x, vertex.y - along * radius);
        let apex = Vec2::new(vertex.x + outward * depth, vertex.y - along * radius);
        let lower = Vec2::new(vertex.x + outward * depth, vertex.y);
        return Some(format!(
            " L {} {} Q {} {} {} {}",
            upper.x, upper.y, apex.x, apex.y, lower.x, lower.y
        ));
    }
    if horizontal_trunk && next.x == vertex.x {
        let along = (vertex.x - prev.x).signum();
        let outward = (next.y - vertex.y).signum();
        let upper = Vec2::new(vertex.x - along * radius, vertex.y);
        let apex = Vec2::new(vertex.x - along * radius, vertex.y + outward * depth);
        let lower = Vec2::new(vertex.x, vertex.y + outward * depth);
        return Some(format!(
            " L {} {} Q {} {} {} {}",
            upper.x, upper.y, apex.x, apex.y, lower.x, lower.y
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use codetrail_api::{
        CanonicalEdgeFamily, CanonicalRouteKind, EdgeCertainty, EdgeId, EdgeKind, NodeId,
    };

    fn routed(points: Vec<Vec2>) -> RoutedEdgeSpec {
        RoutedEdgeSpec {
            id: "e".into(),
            source_edge_ids: vec![EdgeId::new("e")],
            source: NodeId::new("a"),
            target: NodeId::new("b"),
            source_handle: "source-node".into(),
            target_handle: "target-node".into(),
            kind: EdgeKind::CALL,
            certainty: EdgeCertainty::None,
            multiplicity: 1,
            family: CanonicalEdgeFamily::Flow,
            route_kind: CanonicalRouteKind::Direct,
            bundle_count: 1,
            route_points: points,
            trunk_coord: None,
            channel_id: None,
            channel_pair_id: None,
            channel_weight: None,
            shared_trunk_points: None,
            source_member_order: None,
            target_member_order: None,
        }
    }

    #[test]
    fn straight_route_renders_move_and_line() {
        let edge = routed(vec![Vec2::new(0.0, 10.0), Vec2::new(100.0, 10.0)]);
        let rendered = build_edge_path(&edge, None, &LayoutProfile::default());
        assert_eq!(rendered.path, "M 0 10 L 100 10");
    }

    #[test]
    fn corners_become_quadratic_fillets() {
        let edge = routed(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(50.0, 0.0),
            Vec2::new(50.0, 80.0),
        ]);
        let rendered = build_edge_path(&edge, None, &LayoutProfile::default());
        assert!(rendered.path.contains(" Q 50 0 "), "path: {}", rendered.path);
        assert!(rendered.path.starts_with("M 0 0 L 42 0"), "path: {}", rendered.path);
        assert!(rendered.path.ends_with("L 50 80"), "path: {}", rendered.path);
    }

    #[test]
    fn fillet_radius_shrinks_with_short_segments() {
        let edge = routed(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(6.0, 0.0),
            Vec2::new(6.0, 80.0),
        ]);
        let rendered = build_edge_path(&edge, None, &LayoutProfile::default());
        // Half of the 6-long approach segment, not the full corner radius.
        assert!(rendered.path.contains("L 3 0"), "path: {}", rendered.path);
    }

    #[test]
    fn trunk_branch_exit_gets_a_hook() {
        let mut edge = routed(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(240.0, 0.0),
            Vec2::new(240.0, 120.0),
            Vec2::new(400.0, 120.0),
        ]);
        edge.route_kind = CanonicalRouteKind::FlowTrunk;
        edge.trunk_coord = Some(240.0);
        let rendered = build_edge_path(&edge, None, &LayoutProfile::default());
        // The branch exit at (240, 120) leaves the trunk with a lobe: up by
        // the hook radius to y=113, out by the hook depth to x=249.
        assert!(
            rendered.path.contains("L 240 113 Q 249 113 249 120"),
            "path: {}",
            rendered.path
        );
    }

    #[test]
    fn tight_trunk_joins_fall_back_to_plain_fillets() {
        let mut edge = routed(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(240.0, 0.0),
            Vec2::new(240.0, 6.0),
            Vec2::new(400.0, 6.0),
        ]);
        edge.route_kind = CanonicalRouteKind::FlowTrunk;
        edge.trunk_coord = Some(240.0);
        let rendered = build_edge_path(&edge, None, &LayoutProfile::default());
        assert!(!rendered.path.contains("Q 249"), "path: {}", rendered.path);
    }

    #[test]
    fn unroutable_edge_renders_smooth_step_fallback() {
        let edge = routed(Vec::new());
        let rendered = build_edge_path(
            &edge,
            Some((Vec2::new(0.0, 0.0), Vec2::new(100.0, 60.0))),
            &LayoutProfile::default(),
        );
        assert!(rendered.path.starts_with("M 0 0 C 50 0"), "path: {}", rendered.path);
        assert_eq!(rendered.label_x, 50.0);
        assert_eq!(rendered.label_y, 30.0);
    }

    #[test]
    fn label_sits_on_the_middle_route_point() {
        let edge = routed(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(50.0, 0.0),
            Vec2::new(50.0, 80.0),
            Vec2::new(90.0, 80.0),
        ]);
        let rendered = build_edge_path(&edge, None, &LayoutProfile::default());
        assert_eq!(rendered.label_x, 50.0);
        assert_eq!(rendered.label_y, 80.0);
    }
}
