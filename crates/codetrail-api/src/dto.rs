use crate::ids::{EdgeId, NodeId};
use crate::types::{
    CanonicalEdgeFamily, CanonicalMemberVisibility, CanonicalNodeStyle, CanonicalRouteKind,
    EdgeCertainty, EdgeKind, MemberAccess, NodeKind,
};
use serde::{Deserialize, Serialize};
use specta::Type;

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct GraphNodeDto {
    pub id: NodeId,
    pub label: String,
    pub kind: NodeKind,
    pub depth: u32,
    #[serde(default)]
    pub badge_visible_members: Option<u32>,
    #[serde(default)]
    pub badge_total_members: Option<u32>,
    #[serde(default)]
    pub member_access: Option<MemberAccess>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct GraphEdgeDto {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
    #[serde(default)]
    pub certainty: Option<EdgeCertainty>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct GraphResponse {
    pub center_id: NodeId,
    pub nodes: Vec<GraphNodeDto>,
    pub edges: Vec<GraphEdgeDto>,
    pub truncated: bool,
    /// Server-precomputed canonical layout. When present and valid it
    /// short-circuits canonicalization; otherwise it is rejected and the
    /// builder runs on the raw nodes/edges.
    #[serde(default)]
    pub canonical_layout: Option<CanonicalLayoutDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct CanonicalMemberDto {
    pub id: NodeId,
    pub label: String,
    pub kind: NodeKind,
    pub visibility: CanonicalMemberVisibility,
}

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct CanonicalNodeDto {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: String,
    pub center: bool,
    pub node_style: CanonicalNodeStyle,
    pub is_non_indexed: bool,
    pub duplicate_count: u32,
    #[serde(default)]
    pub merged_symbol_ids: Vec<NodeId>,
    pub member_count: u32,
    #[serde(default)]
    pub badge_visible_members: Option<u32>,
    #[serde(default)]
    pub badge_total_members: Option<u32>,
    #[serde(default)]
    pub members: Vec<CanonicalMemberDto>,
    pub x_rank: i32,
    pub y_rank: u32,
    pub width: f32,
    pub height: f32,
    pub is_virtual_bundle: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct CanonicalEdgeDto {
    pub id: String,
    #[serde(default)]
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
}

#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct CanonicalLayoutDto {
    pub schema_version: u32,
    pub center_node_id: NodeId,
    pub nodes: Vec<CanonicalNodeDto>,
    pub edges: Vec<CanonicalEdgeDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_response_parses_minimal_payload() {
        let payload = r#"{
            "center_id": "run",
            "truncated": false,
            "nodes": [
                {"id": "run", "label": "Workspace::run", "kind": "METHOD", "depth": 0}
            ],
            "edges": []
        }"#;

        let response: GraphResponse =
            serde_json::from_str(payload).expect("minimal response should parse");
        assert_eq!(response.center_id.as_str(), "run");
        assert!(response.canonical_layout.is_none());
        assert!(response.nodes[0].member_access.is_none());
    }

    #[test]
    fn edge_certainty_defaults_to_none_when_absent() {
        let payload = r#"{"id": "e1", "source": "a", "target": "b", "kind": "CALL"}"#;
        let edge: GraphEdgeDto = serde_json::from_str(payload).expect("edge should parse");
        assert!(edge.certainty.is_none());
    }
}
