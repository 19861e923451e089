use codetrail_api::{EdgeId, EdgeKind, GraphEdgeDto, GraphNodeDto, GraphResponse, NodeId, NodeKind};

/// Build a dense synthetic neighborhood: one center class with members, a
/// ring of host classes around it, and parallel call edges into each host.
pub fn synthetic_neighborhood(host_count: usize, calls_per_host: usize) -> GraphResponse {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    nodes.push(node("center", "Dispatcher", NodeKind::CLASS, 0));
    nodes.push(node("center_run", "Dispatcher::run", NodeKind::METHOD, 0));
    edges.push(edge("member-center", "center", "center_run", EdgeKind::MEMBER));

    for host in 0..host_count {
        let host_id = format!("host_{host}");
        let host_label = format!("Worker_{host}");
        nodes.push(node(&host_id, &host_label, NodeKind::CLASS, 1));

        let method_id = format!("host_{host}_exec");
        nodes.push(node(
            &method_id,
            &format!("{host_label}::execute"),
            NodeKind::METHOD,
            1,
        ));
        edges.push(edge(
            &format!("member-{host}"),
            &host_id,
            &method_id,
            EdgeKind::MEMBER,
        ));

        for call in 0..calls_per_host {
            edges.push(edge(
                &format!("call-{host}-{call}"),
                "center_run",
                &method_id,
                EdgeKind::CALL,
            ));
        }
    }

    GraphResponse {
        center_id: NodeId::new("center_run"),
        nodes,
        edges,
        truncated: false,
        canonical_layout: None,
    }
}

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
