//! The parity profile: every tunable of the layout pipeline in one record.
//!
//! The values mirror the production web client so that fixtures rendered by
//! either side line up. The record is read-only after construction; tests
//! build alternative profiles instead of mutating this one.

use codetrail_api::EdgeKind;

#[derive(Debug, Clone)]
pub struct LayoutProfile {
    /// Pixel quantization applied to every emitted coordinate.
    pub raster_step: f32,
    pub node: NodeMetrics,
    pub placement: PlacementParams,
    pub bundling: BundlingParams,
    pub routing: RoutingParams,
    pub render: RenderParams,
    pub markers: MarkerSizes,
}

#[derive(Debug, Clone)]
pub struct NodeMetrics {
    pub card_width_min: f32,
    pub card_width_max: f32,
    pub card_chrome_width: f32,
    pub card_height_min: f32,
    pub card_height_max: f32,
    pub pill_width_min: f32,
    pub pill_width_max: f32,
    pub pill_chrome_width: f32,
    pub pill_height: f32,
    pub approx_char_width: f32,
    /// Card header block above the first member section.
    pub member_header_height: f32,
    pub member_section_height: f32,
    pub member_row_height: f32,
    pub member_anchor_inset: f32,
    pub bundle_size: f32,
}

#[derive(Debug, Clone)]
pub struct PlacementParams {
    pub rank_separation: f32,
    pub node_separation: f32,
}

/// One row of the minimum-group-size table. Rows are consulted in
/// `(min_density desc, min_depth desc)` order; the first row whose depth or
/// density gate passes decides the group size.
#[derive(Debug, Clone)]
pub struct GroupSizeRow {
    pub min_depth: u32,
    pub min_density: f32,
    pub group_size: usize,
}

#[derive(Debug, Clone)]
pub struct BundlingParams {
    pub min_edges_for_bundling: usize,
    pub lane_band_base_height: f32,
    pub lane_band_dense_height: f32,
    pub dense_density_threshold: f32,
    pub lane_band_max: u32,
    pub group_size_rows: Vec<GroupSizeRow>,
    pub default_min_group_size: usize,
    pub trunk_gap_ratio: f32,
    pub density_gap_boost: f32,
    pub min_trunk_gap: f32,
    pub max_trunk_gap: f32,
    pub corridor_padding: f32,
    pub trunk_gutter: f32,
    pub shared_trunk_padding: f32,
    pub fan_out_min_branches: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct EdgeOffsetProfile {
    pub origin_x: f32,
    pub target_x: f32,
    pub vertical_offset: f32,
}

#[derive(Debug, Clone)]
pub struct RoutingParams {
    pub obstacle_padding: f32,
    pub source_exit: f32,
    pub target_entry: f32,
    pub trunk_penalty_weight: f32,
    pub x_detour_step: f32,
    pub y_detour_step: f32,
    pub hierarchy_detour: f32,
    pub collision_weight: f32,
    pub turn_base: f32,
    pub turn_bundle_cap: f32,
    pub turn_bundle_scale: f32,
    pub length_weight: f32,
    pub candidate_index_weight: f32,
    pub offsets: EdgeOffsetTable,
}

#[derive(Debug, Clone)]
pub struct EdgeOffsetTable {
    pub call: EdgeOffsetProfile,
    pub usage: EdgeOffsetProfile,
    pub type_usage: EdgeOffsetProfile,
    pub import: EdgeOffsetProfile,
    pub fallback: EdgeOffsetProfile,
}

impl EdgeOffsetTable {
    pub fn for_kind(&self, kind: EdgeKind) -> EdgeOffsetProfile {
        match kind {
            EdgeKind::CALL | EdgeKind::MACRO_USAGE => self.call,
            EdgeKind::USAGE | EdgeKind::ANNOTATION_USAGE => self.usage,
            EdgeKind::TYPE_USAGE => self.type_usage,
            EdgeKind::IMPORT | EdgeKind::INCLUDE => self.import,
            _ => self.fallback,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderParams {
    pub corner_radius: f32,
    pub trunk_join_radius: f32,
    pub trunk_join_depth: f32,
    pub trunk_join_min_radius: f32,
    pub trunk_join_min_depth: f32,
    pub stroke_base: f32,
    pub bundled_log_multiplier: f32,
    pub bundled_max_boost: f32,
    pub multiplicity_step: f32,
    pub multiplicity_max_boost: f32,
    pub hierarchy_boost: f32,
    pub interaction_width: f32,
    pub bundled_interaction_width: f32,
    pub base_opacity: f32,
    pub probable_opacity: f32,
    pub uncertain_opacity: f32,
    pub hierarchy_opacity_bias: f32,
    pub uncertain_dash: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct MarkerSizes {
    pub default_size: f32,
    pub bundled: f32,
    pub inheritance: f32,
    pub template_specialization: f32,
}

impl Default for LayoutProfile {
    fn default() -> Self {
        Self {
            raster_step: 2.0,
            node: NodeMetrics {
                card_width_min: 228.0,
                card_width_max: 432.0,
                card_chrome_width: 112.0,
                card_height_min: 110.0,
                card_height_max: 560.0,
                pill_width_min: 96.0,
                pill_width_max: 560.0,
                pill_chrome_width: 72.0,
                pill_height: 34.0,
                approx_char_width: 7.25,
                member_header_height: 74.0,
                member_section_height: 28.0,
                member_row_height: 21.0,
                member_anchor_inset: 10.0,
                bundle_size: 12.0,
            },
            placement: PlacementParams {
                rank_separation: 280.0,
                node_separation: 48.0,
            },
            bundling: BundlingParams {
                min_edges_for_bundling: 6,
                lane_band_base_height: 120.0,
                lane_band_dense_height: 72.0,
                dense_density_threshold: 3.0,
                lane_band_max: 12,
                group_size_rows: vec![
                    GroupSizeRow {
                        min_depth: 5,
                        min_density: 5.0,
                        group_size: 2,
                    },
                    GroupSizeRow {
                        min_depth: 3,
                        min_density: 2.5,
                        group_size: 3,
                    },
                ],
                default_min_group_size: 4,
                trunk_gap_ratio: 0.34,
                density_gap_boost: 6.0,
                min_trunk_gap: 18.0,
                max_trunk_gap: 96.0,
                corridor_padding: 12.0,
                trunk_gutter: 28.0,
                shared_trunk_padding: 16.0,
                fan_out_min_branches: 3,
            },
            routing: RoutingParams {
                obstacle_padding: 6.0,
                source_exit: 24.0,
                target_entry: 24.0,
                trunk_penalty_weight: 0.08,
                x_detour_step: 56.0,
                y_detour_step: 96.0,
                hierarchy_detour: 64.0,
                collision_weight: 100_000.0,
                turn_base: 1.4,
                turn_bundle_cap: 6.0,
                turn_bundle_scale: 0.35,
                length_weight: 0.035,
                candidate_index_weight: 0.002,
                offsets: EdgeOffsetTable {
                    call: EdgeOffsetProfile {
                        origin_x: 28.0,
                        target_x: 28.0,
                        vertical_offset: 0.0,
                    },
                    usage: EdgeOffsetProfile {
                        origin_x: 20.0,
                        target_x: 20.0,
                        vertical_offset: 10.0,
                    },
                    type_usage: EdgeOffsetProfile {
                        origin_x: 20.0,
                        target_x: 20.0,
                        vertical_offset: -10.0,
                    },
                    import: EdgeOffsetProfile {
                        origin_x: 24.0,
                        target_x: 24.0,
                        vertical_offset: 0.0,
                    },
                    fallback: EdgeOffsetProfile {
                        origin_x: 24.0,
                        target_x: 24.0,
                        vertical_offset: 0.0,
                    },
                },
            },
            render: RenderParams {
                corner_radius: 8.0,
                trunk_join_radius: 7.0,
                trunk_join_depth: 9.0,
                trunk_join_min_radius: 4.0,
                trunk_join_min_depth: 6.0,
                stroke_base: 1.6,
                bundled_log_multiplier: 0.9,
                bundled_max_boost: 3.2,
                multiplicity_step: 0.25,
                multiplicity_max_boost: 1.5,
                hierarchy_boost: 0.6,
                interaction_width: 14.0,
                bundled_interaction_width: 18.0,
                base_opacity: 0.95,
                probable_opacity: 0.8,
                uncertain_opacity: 0.55,
                hierarchy_opacity_bias: 0.05,
                uncertain_dash: "6 4",
            },
            markers: MarkerSizes {
                default_size: 10.0,
                bundled: 13.0,
                inheritance: 15.0,
                template_specialization: 12.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_marker_never_smaller_than_default() {
        let profile = LayoutProfile::default();
        assert!(profile.markers.bundled >= profile.markers.default_size);
    }

    #[test]
    fn group_size_rows_are_ordered_strictest_first() {
        let profile = LayoutProfile::default();
        let rows = &profile.bundling.group_size_rows;
        for pair in rows.windows(2) {
            assert!(pair[0].min_density >= pair[1].min_density);
            assert!(pair[0].min_depth >= pair[1].min_depth);
        }
    }

    #[test]
    fn offset_table_covers_every_flow_kind() {
        let profile = LayoutProfile::default();
        for kind in [
            EdgeKind::CALL,
            EdgeKind::USAGE,
            EdgeKind::TYPE_USAGE,
            EdgeKind::IMPORT,
            EdgeKind::INCLUDE,
            EdgeKind::MACRO_USAGE,
            EdgeKind::ANNOTATION_USAGE,
            EdgeKind::UNKNOWN,
        ] {
            let offsets = profile.routing.offsets.for_kind(kind);
            assert!(offsets.origin_x > 0.0);
            assert!(offsets.target_x > 0.0);
        }
    }
}
