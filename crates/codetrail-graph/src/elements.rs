use crate::geometry::{Rect, Vec2};
use codetrail_api::{
    CanonicalEdgeFamily, CanonicalMemberDto, CanonicalNodeStyle, CanonicalRouteKind, EdgeCertainty,
    EdgeId, EdgeKind, LayoutDirection, NodeId, NodeKind,
};
use serde::{Deserialize, Serialize};

/// A node after canonicalization. Coordinates are zero until the placer runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticNodePlacement {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: String,
    pub is_center: bool,
    pub node_style: CanonicalNodeStyle,
    pub is_non_indexed: bool,
    pub duplicate_count: u32,
    pub merged_symbol_ids: Vec<NodeId>,
    pub member_count: u32,
    pub badge_visible_members: Option<u32>,
    pub badge_total_members: Option<u32>,
    pub members: Vec<CanonicalMemberDto>,
    /// Signed-depth column. Fractional values are legal: fan-out bundle
    /// junctions sit between integer columns.
    pub x_rank: f32,
    pub y_rank: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub is_virtual_bundle: bool,
}

impl SemanticNodePlacement {
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(Vec2::new(self.x, self.y), Vec2::new(self.width, self.height))
    }
}

/// A folded edge with routing state. `route_points` stays empty when an
/// endpoint cannot be resolved; the renderer then falls back to a smooth step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutedEdgeSpec {
    pub id: String,
    pub source_edge_ids: Vec<EdgeId>,
    pub source: NodeId,
    pub target: NodeId,
    pub source_handle: String,
    pub target_handle: String,
    pub kind: EdgeKind,
    pub certainty: EdgeCertainty,
    pub multiplicity: u32,
    pub family: CanonicalEdgeFamily,
    pub route_kind: CanonicalRouteKind,
    pub bundle_count: u32,
    pub route_points: Vec<Vec2>,
    pub trunk_coord: Option<f32>,
    pub channel_id: Option<String>,
    pub channel_pair_id: Option<String>,
    pub channel_weight: Option<u32>,
    pub shared_trunk_points: Option<Vec<Vec2>>,
    pub source_member_order: Option<u32>,
    pub target_member_order: Option<u32>,
}

impl RoutedEdgeSpec {
    pub fn is_hierarchy(&self) -> bool {
        self.family == CanonicalEdgeFamily::Hierarchy
            || self.route_kind == CanonicalRouteKind::Hierarchy
    }

    /// Effective trunk weight used by the router's turn penalty.
    pub fn weight_bias(&self) -> u32 {
        self.channel_weight.unwrap_or(self.bundle_count).max(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutElements {
    pub nodes: Vec<SemanticNodePlacement>,
    pub edges: Vec<RoutedEdgeSpec>,
    pub center_node_id: NodeId,
}

impl LayoutElements {
    pub fn node(&self, id: &NodeId) -> Option<&SemanticNodePlacement> {
        self.nodes.iter().find(|node| &node.id == id)
    }
}

/// Density inputs for the bundler. The server knows the full request scale;
/// when absent these are derived from the canonical layout itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DensityInputs {
    pub depth: u32,
    pub node_count: usize,
    pub edge_count: usize,
}

impl DensityInputs {
    pub fn score(&self) -> f32 {
        self.depth as f32 * 0.45 + self.node_count as f32 / 90.0 + self.edge_count as f32 / 180.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayoutOptions {
    pub direction: LayoutDirection,
    /// Split fans of outgoing flow edges through virtual bundle junctions.
    pub bundle_fan_out_edges: bool,
    pub debug_channels: bool,
    pub debug_routes: bool,
    pub density: Option<DensityInputs>,
}
