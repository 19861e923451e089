//! Canonical semantic layout: member extraction, synthetic hosts, signed
//! depth columns, node and edge folding. The output is an unplaced
//! `LayoutElements` (all coordinates zero, all `route_points` empty).
//!
//! The builder runs as a sequence of phases over an id-sorted symbol list,
//! so "first seen wins" always means "smallest id wins" and the result is
//! invariant under input permutation.

use crate::elements::{LayoutElements, LayoutOptions, RoutedEdgeSpec, SemanticNodePlacement};
use crate::geometry::snap;
use crate::profile::LayoutProfile;
use codetrail_api::{
    CanonicalEdgeDto, CanonicalEdgeFamily, CanonicalLayoutDto, CanonicalMemberDto,
    CanonicalMemberVisibility, CanonicalNodeDto, CanonicalNodeStyle, CanonicalRouteKind,
    EdgeCertainty, EdgeId, EdgeKind, GraphEdgeDto, GraphNodeDto, GraphResponse, MemberAccess,
    NodeId, NodeKind,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

pub const SCHEMA_VERSION: u32 = 1;
const MAX_MERGED_SYMBOL_IDS: usize = 6;

/// Why a server-precomputed canonical layout was not usable. Rejection is a
/// value, not a failure: the builder reruns on the raw response.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SeedRejection {
    #[error("unsupported canonical schema version {0}")]
    UnsupportedSchema(u32),
    #[error("canonical center {0} is not among the canonical nodes")]
    DanglingCenter(NodeId),
    #[error("canonical edge {edge} references unknown node {node}")]
    DanglingEdgeEndpoint { edge: String, node: NodeId },
    #[error("canonical node {0} carries non-finite geometry")]
    NonFiniteGeometry(NodeId),
}

#[derive(Debug)]
pub struct CanonicalOutcome {
    pub elements: LayoutElements,
    pub seed_rejection: Option<SeedRejection>,
    /// Raw edges whose endpoints could not be resolved after folding.
    pub dropped_edges: Vec<EdgeId>,
}

pub fn canonicalize(
    response: &GraphResponse,
    options: &LayoutOptions,
    profile: &LayoutProfile,
) -> CanonicalOutcome {
    let mut seed_rejection = None;
    let mut outcome = match &response.canonical_layout {
        Some(seed) => match elements_from_seed(seed) {
            Ok(elements) => CanonicalOutcome {
                elements,
                seed_rejection: None,
                dropped_edges: Vec::new(),
            },
            Err(rejection) => {
                tracing::debug!(cause = %rejection, "canonical seed rejected, rebuilding");
                seed_rejection = Some(rejection);
                Canonicalizer::run(response, profile)
            }
        },
        None => Canonicalizer::run(response, profile),
    };
    if outcome.seed_rejection.is_none() {
        outcome.seed_rejection = seed_rejection;
    }

    if options.bundle_fan_out_edges {
        insert_fan_out_bundles(&mut outcome.elements, profile);
    }

    outcome
}

// ---------------------------------------------------------------------------
// Seed path
// ---------------------------------------------------------------------------

fn elements_from_seed(seed: &CanonicalLayoutDto) -> Result<LayoutElements, SeedRejection> {
    if seed.schema_version != SCHEMA_VERSION {
        return Err(SeedRejection::UnsupportedSchema(seed.schema_version));
    }

    let node_ids = seed
        .nodes
        .iter()
        .map(|node| node.id.clone())
        .collect::<HashSet<_>>();
    if !node_ids.contains(&seed.center_node_id) {
        return Err(SeedRejection::DanglingCenter(seed.center_node_id.clone()));
    }
    for node in &seed.nodes {
        if !node.width.is_finite() || !node.height.is_finite() {
            return Err(SeedRejection::NonFiniteGeometry(node.id.clone()));
        }
    }
    for edge in &seed.edges {
        for endpoint in [&edge.source, &edge.target] {
            if !node_ids.contains(endpoint) {
                return Err(SeedRejection::DanglingEdgeEndpoint {
                    edge: edge.id.clone(),
                    node: endpoint.clone(),
                });
            }
        }
    }

    let nodes = seed
        .nodes
        .iter()
        .map(|node| SemanticNodePlacement {
            id: node.id.clone(),
            kind: node.kind,
            label: node.label.clone(),
            is_center: node.center,
            node_style: node.node_style,
            is_non_indexed: node.is_non_indexed,
            duplicate_count: node.duplicate_count.max(1),
            merged_symbol_ids: node.merged_symbol_ids.clone(),
            member_count: node.member_count,
            badge_visible_members: node.badge_visible_members,
            badge_total_members: node.badge_total_members,
            members: node.members.clone(),
            x_rank: node.x_rank as f32,
            y_rank: node.y_rank,
            x: 0.0,
            y: 0.0,
            width: node.width,
            height: node.height,
            is_virtual_bundle: node.is_virtual_bundle,
        })
        .collect();

    let edges = seed
        .edges
        .iter()
        .map(|edge| {
            let mut source_edge_ids = edge.source_edge_ids.clone();
            if source_edge_ids.is_empty() {
                source_edge_ids.push(EdgeId::new(edge.id.clone()));
            }
            RoutedEdgeSpec {
                id: edge.id.clone(),
                source_edge_ids,
                source: edge.source.clone(),
                target: edge.target.clone(),
                source_handle: edge.source_handle.clone(),
                target_handle: edge.target_handle.clone(),
                kind: edge.kind,
                certainty: edge.certainty,
                multiplicity: edge.multiplicity.max(1),
                family: edge.family,
                route_kind: edge.route_kind,
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
        })
        .collect();

    Ok(LayoutElements {
        nodes,
        edges,
        center_node_id: seed.center_node_id.clone(),
    })
}

/// Re-export builder output as a cacheable canonical seed. Virtual bundle
/// junctions are placement artifacts and are not part of the seed contract.
pub fn to_seed(elements: &LayoutElements) -> CanonicalLayoutDto {
    let nodes = elements
        .nodes
        .iter()
        .filter(|node| !node.is_virtual_bundle)
        .map(|node| CanonicalNodeDto {
            id: node.id.clone(),
            kind: node.kind,
            label: node.label.clone(),
            center: node.is_center,
            node_style: node.node_style,
            is_non_indexed: node.is_non_indexed,
            duplicate_count: node.duplicate_count,
            merged_symbol_ids: node.merged_symbol_ids.clone(),
            member_count: node.member_count,
            badge_visible_members: node.badge_visible_members,
            badge_total_members: node.badge_total_members,
            members: node.members.clone(),
            x_rank: round_half_up(node.x_rank as f64),
            y_rank: node.y_rank,
            width: node.width,
            height: node.height,
            is_virtual_bundle: false,
        })
        .collect();

    let kept: HashSet<&NodeId> = elements
        .nodes
        .iter()
        .filter(|node| !node.is_virtual_bundle)
        .map(|node| &node.id)
        .collect();
    let edges = elements
        .edges
        .iter()
        .filter(|edge| kept.contains(&edge.source) && kept.contains(&edge.target))
        .map(|edge| CanonicalEdgeDto {
            id: edge.id.clone(),
            source_edge_ids: edge.source_edge_ids.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            source_handle: edge.source_handle.clone(),
            target_handle: edge.target_handle.clone(),
            kind: edge.kind,
            certainty: edge.certainty,
            multiplicity: edge.multiplicity,
            family: edge.family,
            route_kind: edge.route_kind,
        })
        .collect();

    CanonicalLayoutDto {
        schema_version: SCHEMA_VERSION,
        center_node_id: elements.center_node_id.clone(),
        nodes,
        edges,
    }
}

// ---------------------------------------------------------------------------
// Builder path
// ---------------------------------------------------------------------------

/// Phase-ordered canonicalization state. `symbols` holds the raw nodes plus
/// any minted hosts, kept id-sorted so lookups can binary search and group
/// leaders are always the smallest id.
struct Canonicalizer<'a> {
    profile: &'a LayoutProfile,
    symbols: Vec<GraphNodeDto>,
    edges: Vec<GraphEdgeDto>,
    host_of: HashMap<NodeId, NodeId>,
    rosters: HashMap<NodeId, Vec<CanonicalMemberDto>>,
    center: NodeId,
}

/// Alias table produced by node folding: every free symbol maps onto its
/// group leader, and each leader knows the ids it absorbed.
struct NodeFolding {
    alias: HashMap<NodeId, NodeId>,
    merged: HashMap<NodeId, Vec<NodeId>>,
}

struct FoldGroup<'e> {
    source: NodeId,
    target: NodeId,
    source_handle: String,
    target_handle: String,
    kind: EdgeKind,
    hierarchy: bool,
    raw: Vec<&'e GraphEdgeDto>,
}

impl<'a> Canonicalizer<'a> {
    fn run(response: &GraphResponse, profile: &'a LayoutProfile) -> CanonicalOutcome {
        let mut builder = Self::new(response, profile);
        builder.attach_members();
        builder.synthesize_hosts();
        builder.promote_center();

        let columns = builder.assign_columns();
        let folding = builder.fold_nodes(&columns);
        let (edges, dropped_edges) = builder.fold_edges(&folding);
        let nodes = builder.assemble(&columns, &folding);

        CanonicalOutcome {
            elements: LayoutElements {
                nodes,
                edges,
                center_node_id: builder.center,
            },
            seed_rejection: None,
            dropped_edges,
        }
    }

    fn new(response: &GraphResponse, profile: &'a LayoutProfile) -> Self {
        let mut symbols = response.nodes.clone();
        symbols.sort_by(|a, b| a.id.cmp(&b.id));
        let mut edges = response.edges.clone();
        edges.sort_by(|a, b| a.id.cmp(&b.id));
        Self {
            profile,
            symbols,
            edges,
            host_of: HashMap::new(),
            rosters: HashMap::new(),
            center: response.center_id.clone(),
        }
    }

    fn symbol(&self, id: &NodeId) -> Option<&GraphNodeDto> {
        self.symbols
            .binary_search_by(|probe| probe.id.cmp(id))
            .ok()
            .map(|index| &self.symbols[index])
    }

    /// Phase 1: MEMBER edges with exactly one structural endpoint turn the
    /// other endpoint into a member row of that host.
    fn attach_members(&mut self) {
        let mut adoptions = Vec::new();
        for edge in &self.edges {
            if edge.kind != EdgeKind::MEMBER {
                continue;
            }
            let (Some(a), Some(b)) = (self.symbol(&edge.source), self.symbol(&edge.target)) else {
                continue;
            };
            let (host, member) = match (a.kind.is_structural(), b.kind.is_structural()) {
                (true, false) => (a, b),
                (false, true) => (b, a),
                _ => continue,
            };
            adoptions.push((host.id.clone(), member_entry(member)));
        }
        for (host, member) in adoptions {
            self.adopt(host, member);
        }
    }

    /// Phase 2: free symbols with a qualified label join the structural node
    /// carrying their qualifier, minting a CLASS host when none exists.
    fn synthesize_hosts(&mut self) {
        let mut hosts_by_label = HashMap::<String, NodeId>::new();
        for symbol in &self.symbols {
            if symbol.kind.is_structural() {
                hosts_by_label
                    .entry(symbol.label.clone())
                    .or_insert_with(|| symbol.id.clone());
            }
        }

        let mut minted: Vec<GraphNodeDto> = Vec::new();
        let mut adoptions = Vec::new();
        for symbol in &self.symbols {
            if symbol.kind.is_structural() || self.host_of.contains_key(&symbol.id) {
                continue;
            }
            let Some((qualifier, _)) = symbol.label.split_once("::") else {
                continue;
            };
            if qualifier.is_empty() {
                continue;
            }

            let host_id = hosts_by_label
                .entry(qualifier.to_string())
                .or_insert_with(|| {
                    let id = NodeId(synthetic_host_id(qualifier));
                    minted.push(GraphNodeDto {
                        id: id.clone(),
                        label: qualifier.to_string(),
                        kind: NodeKind::CLASS,
                        depth: symbol.depth.saturating_sub(1).max(1),
                        badge_visible_members: None,
                        badge_total_members: None,
                        member_access: None,
                    });
                    id
                })
                .clone();
            adoptions.push((host_id, member_entry(symbol)));
        }

        for (host, member) in adoptions {
            self.adopt(host, member);
        }
        if !minted.is_empty() {
            self.symbols.extend(minted);
            self.symbols.sort_by(|a, b| a.id.cmp(&b.id));
        }
    }

    fn adopt(&mut self, host: NodeId, member: CanonicalMemberDto) {
        self.host_of.insert(member.id.clone(), host.clone());
        let roster = self.rosters.entry(host).or_default();
        if !roster.iter().any(|existing| existing.id == member.id) {
            roster.push(member);
        }
    }

    /// Phase 3: a focused member hands the center role to its host.
    fn promote_center(&mut self) {
        if let Some(host) = self.host_of.get(&self.center) {
            self.center = host.clone();
        }
    }

    /// Phase 4: signed-depth columns. Edges touching the center vote on which
    /// side their far endpoint lands; the depth ring gives the magnitude.
    fn assign_columns(&self) -> HashMap<NodeId, i32> {
        let mut side = HashMap::<NodeId, i32>::new();
        for edge in &self.edges {
            if edge.kind == EdgeKind::MEMBER {
                continue;
            }
            match (edge.source == self.center, edge.target == self.center) {
                (true, false) => *side.entry(edge.target.clone()).or_default() += 1,
                (false, true) => *side.entry(edge.source.clone()).or_default() -= 1,
                _ => {}
            }
        }

        self.symbols
            .iter()
            .map(|symbol| {
                let column = if symbol.id == self.center {
                    0
                } else {
                    let ring = symbol.depth.max(1) as i32;
                    if side.get(&symbol.id).copied().unwrap_or(0) < 0 {
                        -ring
                    } else {
                        ring
                    }
                };
                (symbol.id.clone(), column)
            })
            .collect()
    }

    /// Phase 5: free symbols with the same identity key collapse into their
    /// group leader. Cards fold across columns, everything else only within
    /// its own column; the center keeps its identity.
    fn fold_nodes(&self, columns: &HashMap<NodeId, i32>) -> NodeFolding {
        let mut groups: BTreeMap<String, Vec<NodeId>> = BTreeMap::new();
        let mut singles: Vec<NodeId> = Vec::new();
        for symbol in &self.symbols {
            if self.host_of.contains_key(&symbol.id) {
                continue;
            }
            match self.identity_key(symbol, columns) {
                Some(key) => groups.entry(key).or_default().push(symbol.id.clone()),
                None => singles.push(symbol.id.clone()),
            }
        }

        let mut alias = HashMap::new();
        let mut merged = HashMap::new();
        for ids in groups
            .into_values()
            .chain(singles.into_iter().map(|id| vec![id]))
        {
            let leader = ids[0].clone();
            for id in &ids {
                alias.insert(id.clone(), leader.clone());
            }
            merged.insert(leader, ids);
        }
        NodeFolding { alias, merged }
    }

    fn identity_key(&self, symbol: &GraphNodeDto, columns: &HashMap<NodeId, i32>) -> Option<String> {
        if symbol.id == self.center {
            return None;
        }
        let mut key = format!("{}:{}", symbol.kind.name(), symbol.label.to_lowercase());
        if !symbol.kind.is_card() {
            let column = columns.get(&symbol.id).copied().unwrap_or(0);
            key.push_str(&format!(":{column}"));
        }
        Some(key)
    }

    /// Phase 6: rewrite edge endpoints through membership and aliasing, then
    /// collapse everything that shares `(kind, endpoints, handles)`.
    fn fold_edges(&self, folding: &NodeFolding) -> (Vec<RoutedEdgeSpec>, Vec<EdgeId>) {
        let mut folds: BTreeMap<String, FoldGroup<'_>> = BTreeMap::new();
        let mut dropped = Vec::new();

        for edge in &self.edges {
            if edge.kind == EdgeKind::MEMBER {
                continue;
            }
            let hierarchy = edge.kind.is_hierarchy();
            let (Some(source), Some(target)) = (
                self.resolve_endpoint(&edge.source, folding),
                self.resolve_endpoint(&edge.target, folding),
            ) else {
                dropped.push(edge.id.clone());
                continue;
            };
            if source == target {
                continue;
            }

            let source_handle = endpoint_handle(
                true,
                &edge.source,
                self.host_of.contains_key(&edge.source),
                hierarchy,
            );
            let target_handle = endpoint_handle(
                false,
                &edge.target,
                self.host_of.contains_key(&edge.target),
                hierarchy,
            );
            let key = format!(
                "{}:{}:{}:{}:{}",
                edge.kind.name(),
                source,
                source_handle,
                target,
                target_handle
            );
            folds
                .entry(key)
                .or_insert_with(|| FoldGroup {
                    source,
                    target,
                    source_handle,
                    target_handle,
                    kind: edge.kind,
                    hierarchy,
                    raw: Vec::new(),
                })
                .raw
                .push(edge);
        }

        let folded = folds
            .into_iter()
            .map(|(id, group)| {
                let mut source_edge_ids: Vec<EdgeId> = Vec::with_capacity(group.raw.len());
                for raw in &group.raw {
                    if !source_edge_ids.contains(&raw.id) {
                        source_edge_ids.push(raw.id.clone());
                    }
                }
                let certainty = group
                    .raw
                    .iter()
                    .map(|raw| raw.certainty.unwrap_or_default())
                    .max()
                    .unwrap_or_default();
                RoutedEdgeSpec {
                    id,
                    source_edge_ids,
                    source: group.source,
                    target: group.target,
                    source_handle: group.source_handle,
                    target_handle: group.target_handle,
                    kind: group.kind,
                    certainty,
                    multiplicity: group.raw.len() as u32,
                    family: if group.hierarchy {
                        CanonicalEdgeFamily::Hierarchy
                    } else {
                        CanonicalEdgeFamily::Flow
                    },
                    route_kind: if group.hierarchy {
                        CanonicalRouteKind::Hierarchy
                    } else {
                        CanonicalRouteKind::Direct
                    },
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
            })
            .collect();

        (folded, dropped)
    }

    fn resolve_endpoint(&self, raw: &NodeId, folding: &NodeFolding) -> Option<NodeId> {
        let free = self.host_of.get(raw).unwrap_or(raw);
        folding.alias.get(free).cloned()
    }

    /// Phase 7: one placement per group leader, column from the rounded mean
    /// of the merged columns, rows assigned in (column, label, id) order.
    fn assemble(
        &self,
        columns: &HashMap<NodeId, i32>,
        folding: &NodeFolding,
    ) -> Vec<SemanticNodePlacement> {
        let mut placements = Vec::with_capacity(folding.merged.len());
        for (leader, group) in &folding.merged {
            let Some(symbol) = self.symbol(leader) else {
                continue;
            };

            let mut members: Vec<CanonicalMemberDto> = Vec::new();
            for id in group {
                for member in self.rosters.get(id).map(Vec::as_slice).unwrap_or(&[]) {
                    if !members.iter().any(|existing| existing.id == member.id) {
                        members.push(member.clone());
                    }
                }
            }
            members.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));

            let column = {
                let total: f64 = group
                    .iter()
                    .map(|id| columns.get(id).copied().unwrap_or(0) as f64)
                    .sum();
                round_half_up(total / group.len() as f64)
            };
            let (width, height) = self.estimate_size(symbol, &members);

            placements.push(SemanticNodePlacement {
                id: leader.clone(),
                kind: symbol.kind,
                label: symbol.label.clone(),
                is_center: *leader == self.center,
                node_style: if symbol.kind.is_card() {
                    CanonicalNodeStyle::Card
                } else {
                    CanonicalNodeStyle::Pill
                },
                is_non_indexed: matches!(symbol.kind, NodeKind::UNKNOWN | NodeKind::BUILTIN_TYPE),
                duplicate_count: group.len() as u32,
                merged_symbol_ids: group.iter().take(MAX_MERGED_SYMBOL_IDS).cloned().collect(),
                member_count: symbol
                    .badge_visible_members
                    .unwrap_or(members.len() as u32),
                badge_visible_members: symbol.badge_visible_members,
                badge_total_members: symbol.badge_total_members,
                members,
                x_rank: column as f32,
                y_rank: 0,
                x: 0.0,
                y: 0.0,
                width,
                height,
                is_virtual_bundle: false,
            });
        }

        placements.sort_by(|a, b| {
            a.x_rank
                .total_cmp(&b.x_rank)
                .then_with(|| a.label.cmp(&b.label))
                .then_with(|| a.id.cmp(&b.id))
        });
        let mut current_rank = f32::INFINITY;
        let mut row = 0u32;
        for placement in &mut placements {
            if placement.x_rank != current_rank {
                current_rank = placement.x_rank;
                row = 0;
            }
            placement.y_rank = row;
            row += 1;
        }
        placements
    }

    fn estimate_size(&self, symbol: &GraphNodeDto, members: &[CanonicalMemberDto]) -> (f32, f32) {
        let metrics = &self.profile.node;
        let step = self.profile.raster_step;
        let label_chars = symbol.label.chars().count();

        if symbol.kind.is_card() {
            let widest = members
                .iter()
                .map(|member| member.label.chars().count())
                .max()
                .unwrap_or(0)
                .max(label_chars);
            let width = (metrics.card_chrome_width + widest as f32 * metrics.approx_char_width)
                .clamp(metrics.card_width_min, metrics.card_width_max);
            let height = (metrics.member_header_height
                + visible_section_count(members) as f32 * metrics.member_section_height
                + members.len().max(1) as f32 * metrics.member_row_height)
                .clamp(metrics.card_height_min, metrics.card_height_max);
            (snap(width, step), snap(height, step))
        } else {
            let width = (metrics.pill_chrome_width + label_chars as f32 * metrics.approx_char_width)
                .clamp(metrics.pill_width_min, metrics.pill_width_max);
            (snap(width, step), snap(metrics.pill_height, step))
        }
    }
}

fn member_entry(node: &GraphNodeDto) -> CanonicalMemberDto {
    CanonicalMemberDto {
        id: node.id.clone(),
        label: node.label.clone(),
        kind: node.kind,
        visibility: infer_visibility(node.kind, &node.label, node.member_access),
    }
}

fn infer_visibility(
    kind: NodeKind,
    label: &str,
    access: Option<MemberAccess>,
) -> CanonicalMemberVisibility {
    if let Some(access) = access {
        return access.into();
    }
    if kind.is_private_member_kind() {
        return CanonicalMemberVisibility::Private;
    }
    if kind.is_public_member_kind() {
        return CanonicalMemberVisibility::Public;
    }
    if looks_private(label) {
        CanonicalMemberVisibility::Private
    } else {
        CanonicalMemberVisibility::Public
    }
}

// Naming conventions that mark a symbol private when the index gave us no
// access level: `_lead`, `trail_`, `m_hungarian`.
fn looks_private(label: &str) -> bool {
    label.starts_with('_')
        || label.ends_with('_')
        || label
            .strip_prefix("m_")
            .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_alphanumeric()))
}

fn endpoint_handle(is_source: bool, raw: &NodeId, via_host: bool, hierarchy: bool) -> String {
    let role = if is_source { "source" } else { "target" };
    if via_host {
        return format!("{role}-member-{raw}");
    }
    if hierarchy {
        return if is_source {
            "source-node-top"
        } else {
            "target-node-bottom"
        }
        .to_string();
    }
    format!("{role}-node")
}

fn synthetic_host_id(host_label: &str) -> String {
    let dashed: String = host_label
        .trim()
        .chars()
        .map(|c| {
            let lowered = c.to_ascii_lowercase();
            if lowered.is_ascii_alphanumeric() { lowered } else { '-' }
        })
        .collect();
    let slug = dashed
        .split('-')
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        return "__synthetic_host__anonymous".to_string();
    }
    format!("__synthetic_host__{slug}")
}

// Round half toward positive infinity, the way the web client rounds ranks.
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Number of visibility sections a card renders for its members.
pub fn visible_section_count(members: &[CanonicalMemberDto]) -> usize {
    let count = [
        CanonicalMemberVisibility::Public,
        CanonicalMemberVisibility::Protected,
        CanonicalMemberVisibility::Private,
        CanonicalMemberVisibility::Default,
    ]
    .into_iter()
    .filter(|visibility| members.iter().any(|member| member.visibility == *visibility))
    .count();
    if count == 0 { 1 } else { count }
}

// ---------------------------------------------------------------------------
// Fan-out bundling
// ---------------------------------------------------------------------------

/// Split every fan of outgoing flow edges into a binary tree of virtual
/// bundle junctions. The produced trunk edges are ordinary flow edges as far
/// as the bundler and router are concerned.
fn insert_fan_out_bundles(elements: &mut LayoutElements, profile: &LayoutProfile) {
    let min_branches = profile.bundling.fan_out_min_branches;
    let rank_by_id = elements
        .nodes
        .iter()
        .map(|node| (node.id.clone(), node.x_rank))
        .collect::<HashMap<_, _>>();

    let mut grouped: Vec<((NodeId, EdgeKind), Vec<usize>)> = Vec::new();
    for (index, edge) in elements.edges.iter().enumerate() {
        if edge.family != CanonicalEdgeFamily::Flow
            || edge.route_kind != CanonicalRouteKind::Direct
        {
            continue;
        }
        let key = (edge.source.clone(), edge.kind);
        match grouped.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, indices)) => indices.push(index),
            None => grouped.push((key, vec![index])),
        }
    }

    let mut removed = HashSet::new();
    let mut new_nodes = Vec::new();
    let mut new_edges = Vec::new();

    for ((source, kind), indices) in grouped {
        if indices.len() < min_branches {
            continue;
        }
        let Some(&source_rank) = rank_by_id.get(&source) else {
            continue;
        };

        let fan = indices
            .iter()
            .map(|&index| elements.edges[index].clone())
            .collect::<Vec<_>>();
        let mean_target_rank = fan
            .iter()
            .filter_map(|edge| rank_by_id.get(&edge.target))
            .sum::<f32>()
            / fan.len() as f32;
        let outward = if mean_target_rank < source_rank { -1.0 } else { 1.0 };

        let mut builder = FanBuilder {
            source: source.clone(),
            kind,
            source_rank,
            outward,
            bundle_size: profile.node.bundle_size,
            junction_row: 0,
            nodes: &mut new_nodes,
            edges: &mut new_edges,
        };
        let root = builder.junction("0", 0);
        builder.trunk_edge(&source, "source-node".to_string(), &root, &fan, "0");
        builder.split(&root, &fan, "0", 0);

        removed.extend(indices);
    }

    if new_nodes.is_empty() {
        return;
    }

    let mut edges = Vec::with_capacity(elements.edges.len() + new_edges.len());
    for (index, edge) in elements.edges.drain(..).enumerate() {
        if !removed.contains(&index) {
            edges.push(edge);
        }
    }
    edges.extend(new_edges);
    edges.sort_by(|left, right| left.id.cmp(&right.id));
    elements.edges = edges;
    elements.nodes.extend(new_nodes);
}

struct FanBuilder<'a> {
    source: NodeId,
    kind: EdgeKind,
    source_rank: f32,
    outward: f32,
    bundle_size: f32,
    junction_row: u32,
    nodes: &'a mut Vec<SemanticNodePlacement>,
    edges: &'a mut Vec<RoutedEdgeSpec>,
}

impl FanBuilder<'_> {
    fn junction(&mut self, path: &str, level: u32) -> NodeId {
        let id = NodeId(format!(
            "__bundle__{}:{}:{}",
            self.source.0,
            self.kind.name(),
            path
        ));
        // Junctions occupy fractional columns between the fan source and its
        // targets; deeper tree levels move further outward.
        let rank = self.source_rank + self.outward * (0.5 + 0.2 * level as f32).min(0.9);
        self.nodes.push(SemanticNodePlacement {
            id: id.clone(),
            kind: NodeKind::UNKNOWN,
            label: String::new(),
            is_center: false,
            node_style: CanonicalNodeStyle::Bundle,
            is_non_indexed: false,
            duplicate_count: 1,
            merged_symbol_ids: vec![id.clone()],
            member_count: 0,
            badge_visible_members: None,
            badge_total_members: None,
            members: Vec::new(),
            x_rank: rank,
            y_rank: self.junction_row,
            x: 0.0,
            y: 0.0,
            width: self.bundle_size,
            height: self.bundle_size,
            is_virtual_bundle: true,
        });
        self.junction_row += 1;
        id
    }

    fn trunk_edge(
        &mut self,
        source: &NodeId,
        source_handle: String,
        target: &NodeId,
        covered: &[RoutedEdgeSpec],
        path: &str,
    ) {
        let mut source_edge_ids = Vec::new();
        let mut multiplicity = 0u32;
        let mut certainty = EdgeCertainty::None;
        for edge in covered {
            for raw in &edge.source_edge_ids {
                if !source_edge_ids.contains(raw) {
                    source_edge_ids.push(raw.clone());
                }
            }
            multiplicity += edge.multiplicity;
            certainty = certainty.max(edge.certainty);
        }
        self.edges.push(RoutedEdgeSpec {
            id: format!(
                "bundle-edge:{}:{}:{}",
                self.kind.name(),
                self.source.0,
                path
            ),
            source_edge_ids,
            source: source.clone(),
            target: target.clone(),
            source_handle,
            target_handle: "target-node".to_string(),
            kind: self.kind,
            certainty,
            multiplicity: multiplicity.max(1),
            family: CanonicalEdgeFamily::Flow,
            route_kind: CanonicalRouteKind::Direct,
            bundle_count: covered.len().max(1) as u32,
            route_points: Vec::new(),
            trunk_coord: None,
            channel_id: None,
            channel_pair_id: None,
            channel_weight: None,
            shared_trunk_points: None,
            source_member_order: None,
            target_member_order: None,
        });
    }

    fn split(&mut self, junction: &NodeId, fan: &[RoutedEdgeSpec], path: &str, level: u32) {
        if fan.len() <= 2 {
            for edge in fan {
                let mut leaf = edge.clone();
                leaf.source = junction.clone();
                leaf.source_handle = "source-node".to_string();
                self.edges.push(leaf);
            }
            return;
        }
        let mid = fan.len() / 2;
        let halves = [(&fan[..mid], format!("{path}0")), (&fan[mid..], format!("{path}1"))];
        for (half, child_path) in halves {
            if half.len() == 1 {
                let mut leaf = half[0].clone();
                leaf.source = junction.clone();
                leaf.source_handle = "source-node".to_string();
                self.edges.push(leaf);
                continue;
            }
            let child = self.junction(&child_path, level + 1);
            self.trunk_edge(
                junction,
                "source-node".to_string(),
                &child,
                half,
                &child_path,
            );
            self.split(&child, half, &child_path, level + 1);
        }
    }
}
