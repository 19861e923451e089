//! Adaptive edge bundling: co-directional flow edges of the same kind between
//! the same node pair and lane band share a trunk coordinate, so dense
//! neighborhoods read as a handful of channels instead of a wire nest.
//!
//! Channel keys use the unordered endpoint pair, so reverse-direction edges
//! collapse into one canonical channel.

use crate::elements::{DensityInputs, LayoutElements, LayoutOptions};
use crate::geometry::{Rect, Vec2, snap};
use crate::profile::LayoutProfile;
use codetrail_api::{CanonicalEdgeFamily, CanonicalRouteKind, LayoutDirection, NodeId};
use std::collections::BTreeMap;

pub fn bundle_edges(
    elements: &mut LayoutElements,
    options: &LayoutOptions,
    profile: &LayoutProfile,
) {
    let bundling = &profile.bundling;
    if elements.edges.len() < bundling.min_edges_for_bundling {
        return;
    }

    let density_inputs = options.density.unwrap_or_else(|| derive_density(elements));
    let density = density_inputs.score();
    let dense = density >= bundling.dense_density_threshold;
    let lane_band_height = if dense {
        bundling.lane_band_dense_height
    } else {
        bundling.lane_band_base_height
    };

    let min_group_size = bundling
        .group_size_rows
        .iter()
        .find(|row| row.min_depth <= density_inputs.depth || row.min_density <= density)
        .map(|row| row.group_size)
        .unwrap_or(bundling.default_min_group_size);

    if options.debug_channels {
        tracing::debug!(
            density,
            dense,
            lane_band_height,
            min_group_size,
            "bundling pass"
        );
    }

    let vertical = options.direction == LayoutDirection::Vertical;
    let rects: std::collections::HashMap<NodeId, Rect> = elements
        .nodes
        .iter()
        .map(|node| {
            let rect = node.rect();
            (node.id.clone(), if vertical { rect.swapped() } else { rect })
        })
        .collect();

    // Group edge indices by channel id; BTreeMap keeps channel iteration in
    // code-point order.
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, edge) in elements.edges.iter().enumerate() {
        if edge.family == CanonicalEdgeFamily::Hierarchy
            || edge.route_kind == CanonicalRouteKind::Hierarchy
        {
            continue;
        }
        let (Some(&source), Some(&target)) = (rects.get(&edge.source), rects.get(&edge.target))
        else {
            continue;
        };

        let band = lane_band(source, target, lane_band_height, bundling.lane_band_max);
        let pair_id = unordered_pair_id(&edge.source, &edge.target);
        let channel_id = format!("channel:{}:{}:{}", edge.kind.name(), pair_id, band);
        groups.entry(channel_id).or_default().push(index);
    }

    for (channel_id, indices) in groups {
        if indices.len() < 2 || indices.len() < min_group_size {
            continue;
        }

        // Exit/entry coordinates along the virtual primary axis.
        let mut exits = Vec::with_capacity(indices.len());
        let mut entries = Vec::with_capacity(indices.len());
        let mut span_lo = f32::MAX;
        let mut span_hi = f32::MIN;
        for &index in &indices {
            let edge = &elements.edges[index];
            let source = rects[&edge.source];
            let target = rects[&edge.target];
            let rightward = target.center().x >= source.center().x;
            exits.push(if rightward { source.max.x } else { source.min.x });
            entries.push(if rightward { target.min.x } else { target.max.x });
            span_lo = span_lo.min(source.center().y).min(target.center().y);
            span_hi = span_hi.max(source.center().y).max(target.center().y);
        }

        let anchor = median(&mut exits);
        let counter = median(&mut entries);
        let direction = if counter >= anchor { 1.0 } else { -1.0 };
        let gap_boost = if dense { bundling.density_gap_boost } else { 0.0 };
        let gap = ((counter - anchor).abs() * bundling.trunk_gap_ratio + gap_boost)
            .clamp(bundling.min_trunk_gap, bundling.max_trunk_gap);

        let corridor_lo = anchor.min(counter) + bundling.corridor_padding;
        let corridor_hi = anchor.max(counter) - bundling.corridor_padding;
        let trunk = if corridor_lo > corridor_hi {
            anchor + direction * bundling.trunk_gutter
        } else {
            (anchor + direction * gap).clamp(corridor_lo, corridor_hi)
        };
        let trunk = snap(trunk, profile.raster_step);

        let weight: u32 = indices
            .iter()
            .map(|&index| elements.edges[index].multiplicity.max(1))
            .sum();
        let pair_id = unordered_pair_id(
            &elements.edges[indices[0]].source,
            &elements.edges[indices[0]].target,
        );

        let mut source_handles: Vec<String> = indices
            .iter()
            .map(|&index| elements.edges[index].source_handle.clone())
            .collect();
        source_handles.sort();
        source_handles.dedup();
        let mut target_handles: Vec<String> = indices
            .iter()
            .map(|&index| elements.edges[index].target_handle.clone())
            .collect();
        target_handles.sort();
        target_handles.dedup();

        let trunk_lo = snap(span_lo - bundling.shared_trunk_padding, profile.raster_step);
        let trunk_hi = snap(span_hi + bundling.shared_trunk_padding, profile.raster_step);
        let shared_points = [Vec2::new(trunk, trunk_lo), Vec2::new(trunk, trunk_hi)]
            .into_iter()
            .map(|point| if vertical { point.swapped() } else { point })
            .collect::<Vec<_>>();

        if options.debug_channels {
            tracing::debug!(
                channel = %channel_id,
                edges = indices.len(),
                weight,
                trunk,
                "assigned trunk"
            );
        }

        for &index in &indices {
            let edge = &mut elements.edges[index];
            edge.route_kind = CanonicalRouteKind::FlowTrunk;
            edge.trunk_coord = Some(trunk);
            edge.channel_id = Some(channel_id.clone());
            edge.channel_pair_id = Some(pair_id.clone());
            edge.channel_weight = Some(weight);
            edge.bundle_count = weight;
            edge.shared_trunk_points = Some(shared_points.clone());
            edge.source_member_order = handle_order(&source_handles, &edge.source_handle);
            edge.target_member_order = handle_order(&target_handles, &edge.target_handle);
        }
    }

    elements.edges.sort_by(|left, right| left.id.cmp(&right.id));
}

fn derive_density(elements: &LayoutElements) -> DensityInputs {
    DensityInputs {
        depth: elements
            .nodes
            .iter()
            .map(|node| node.x_rank.abs().ceil() as u32)
            .max()
            .unwrap_or(0),
        node_count: elements.nodes.len(),
        edge_count: elements.edges.len(),
    }
}

fn lane_band(source: Rect, target: Rect, band_height: f32, band_max: u32) -> u32 {
    let delta = (source.center().y - target.center().y).abs();
    let band = (delta / band_height).round();
    (band as u32).min(band_max)
}

fn unordered_pair_id(a: &NodeId, b: &NodeId) -> String {
    if a.0 <= b.0 {
        format!("{}<->{}", a.0, b.0)
    } else {
        format!("{}<->{}", b.0, a.0)
    }
}

fn handle_order(distinct: &[String], handle: &str) -> Option<u32> {
    distinct
        .iter()
        .position(|candidate| candidate == handle)
        .map(|position| position as u32)
}

fn median(values: &mut [f32]) -> f32 {
    values.sort_by(f32::total_cmp);
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) * 0.5
    }
}
