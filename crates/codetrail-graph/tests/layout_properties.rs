//! Property suites for the full pipeline: determinism, orthogonality,
//! raster discipline, overlap freedom and hierarchy isolation over randomly
//! generated neighborhoods.

use codetrail_api::{
    CanonicalEdgeFamily, CanonicalRouteKind, EdgeCertainty, EdgeId, EdgeKind, GraphEdgeDto,
    GraphNodeDto, GraphResponse, NodeId, NodeKind,
};
use codetrail_graph::elements::LayoutOptions;
use codetrail_graph::profile::LayoutProfile;
use codetrail_graph::{Rect, layout_graph};
use proptest::prelude::*;

const NODE_KINDS: [NodeKind; 5] = [
    NodeKind::CLASS,
    NodeKind::METHOD,
    NodeKind::FUNCTION,
    NodeKind::FIELD,
    NodeKind::INTERFACE,
];
const EDGE_KINDS: [EdgeKind; 5] = [
    EdgeKind::CALL,
    EdgeKind::USAGE,
    EdgeKind::TYPE_USAGE,
    EdgeKind::INHERITANCE,
    EdgeKind::MEMBER,
];
const CERTAINTIES: [Option<EdgeCertainty>; 3] = [
    None,
    Some(EdgeCertainty::Probable),
    Some(EdgeCertainty::Uncertain),
];

fn graph_strategy() -> impl Strategy<Value = GraphResponse> {
    (2usize..=6).prop_flat_map(|node_count| {
        let nodes = proptest::collection::vec(
            (0usize..NODE_KINDS.len(), 0u32..4),
            node_count..=node_count,
        );
        let edges = proptest::collection::vec(
            (
                0usize..node_count,
                0usize..node_count,
                0usize..EDGE_KINDS.len(),
                0usize..CERTAINTIES.len(),
            ),
            0..=10,
        );
        (nodes, edges).prop_map(move |(node_specs, edge_specs)| {
            let nodes = node_specs
                .into_iter()
                .enumerate()
                .map(|(index, (kind, depth))| GraphNodeDto {
                    id: NodeId::new(format!("n{index}")),
                    // Repeating labels exercise the dedupe/folding paths.
                    label: format!("Sym{}", index % node_count.max(2).saturating_sub(1)),
                    kind: NODE_KINDS[kind],
                    depth,
                    badge_visible_members: None,
                    badge_total_members: None,
                    member_access: None,
                })
                .collect::<Vec<_>>();
            let edges = edge_specs
                .into_iter()
                .enumerate()
                .map(|(index, (source, target, kind, certainty))| GraphEdgeDto {
                    id: EdgeId::new(format!("e{index}")),
                    source: NodeId::new(format!("n{source}")),
                    target: NodeId::new(format!("n{target}")),
                    kind: EDGE_KINDS[kind],
                    certainty: CERTAINTIES[certainty],
                })
                .collect::<Vec<_>>();
            GraphResponse {
                center_id: NodeId::new("n0"),
                nodes,
                edges,
                truncated: false,
                canonical_layout: None,
            }
        })
    })
}

fn layout(response: &GraphResponse) -> codetrail_graph::LayoutElements {
    layout_graph(response, &LayoutOptions::default(), &LayoutProfile::default())
}

proptest! {
    #[test]
    fn pipeline_is_deterministic(response in graph_strategy()) {
        let first = serde_json::to_string(&layout(&response)).unwrap();
        let second = serde_json::to_string(&layout(&response)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn pipeline_is_permutation_invariant(
        response in graph_strategy(),
        node_rot in 0usize..6,
        edge_rot in 0usize..10,
    ) {
        let baseline = serde_json::to_string(&layout(&response)).unwrap();

        let mut permuted = response.clone();
        if !permuted.nodes.is_empty() {
            let rot = node_rot % permuted.nodes.len();
            permuted.nodes.rotate_left(rot);
        }
        if !permuted.edges.is_empty() {
            let rot = edge_rot % permuted.edges.len();
            permuted.edges.rotate_left(rot);
        }
        let shuffled = serde_json::to_string(&layout(&permuted)).unwrap();
        prop_assert_eq!(baseline, shuffled);
    }

    #[test]
    fn routes_are_orthogonal_and_raster_snapped(response in graph_strategy()) {
        let step = LayoutProfile::default().raster_step;
        let elements = layout(&response);
        for edge in &elements.edges {
            for pair in edge.route_points.windows(2) {
                prop_assert!(
                    pair[0].x == pair[1].x || pair[0].y == pair[1].y,
                    "diagonal segment on {}: {:?} -> {:?}",
                    edge.id, pair[0], pair[1]
                );
            }
            for point in &edge.route_points {
                prop_assert_eq!(point.x % step, 0.0, "x off raster on {}", edge.id.clone());
                prop_assert_eq!(point.y % step, 0.0, "y off raster on {}", edge.id.clone());
            }
        }
    }

    #[test]
    fn placed_nodes_never_overlap(response in graph_strategy()) {
        let elements = layout(&response);
        for (index, a) in elements.nodes.iter().enumerate() {
            for b in &elements.nodes[index + 1..] {
                prop_assert!(
                    !a.rect().overlaps_interior(&b.rect()),
                    "{} overlaps {}", a.id, b.id
                );
            }
        }
    }

    #[test]
    fn hierarchy_edges_stay_out_of_channels(response in graph_strategy()) {
        let elements = layout(&response);
        for edge in &elements.edges {
            if edge.family == CanonicalEdgeFamily::Hierarchy {
                prop_assert!(edge.channel_id.is_none(), "{} carries a channel", edge.id);
                prop_assert!(
                    edge.route_kind != CanonicalRouteKind::FlowTrunk,
                    "{} routed as flow trunk", edge.id
                );
            }
        }
    }

    #[test]
    fn references_resolve_and_endpoints_touch_their_nodes(response in graph_strategy()) {
        let elements = layout(&response);
        prop_assert!(elements.node(&elements.center_node_id).is_some());

        for edge in &elements.edges {
            let source = elements.node(&edge.source);
            let target = elements.node(&edge.target);
            prop_assert!(source.is_some(), "{} has unknown source", edge.id);
            prop_assert!(target.is_some(), "{} has unknown target", edge.id);

            if edge.route_points.len() >= 2 {
                let touches = |rect: Rect, point: codetrail_graph::Vec2| {
                    let grown = rect.expand(0.01);
                    point.x >= grown.min.x
                        && point.x <= grown.max.x
                        && point.y >= grown.min.y
                        && point.y <= grown.max.y
                };
                prop_assert!(
                    touches(source.unwrap().rect(), edge.route_points[0]),
                    "{} does not start on its source", edge.id
                );
                prop_assert!(
                    touches(target.unwrap().rect(), *edge.route_points.last().unwrap()),
                    "{} does not end on its target", edge.id
                );
            }
        }
    }
}
