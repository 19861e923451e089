//! Edge styling: the Sourcetrail-scheme color table plus stroke, dash,
//! opacity and marker selection. All lookups are total; unknown kinds take
//! the UNKNOWN entry.

use crate::elements::RoutedEdgeSpec;
use crate::profile::LayoutProfile;
use codetrail_api::{CanonicalEdgeFamily, CanonicalRouteKind, EdgeCertainty, EdgeKind};
use serde::{Deserialize, Serialize};

/// RGB color representation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

pub const COLOR_EDGE_CALL: Color = Color::rgb(200, 160, 80);
pub const COLOR_EDGE_TYPE_USAGE: Color = Color::rgb(140, 140, 140);
pub const COLOR_EDGE_USAGE: Color = Color::rgb(80, 130, 180);
pub const COLOR_EDGE_INHERITANCE: Color = Color::rgb(80, 130, 180);
pub const COLOR_EDGE_OVERRIDE: Color = Color::rgb(100, 150, 200);
pub const COLOR_EDGE_TYPE_ARGUMENT: Color = Color::rgb(110, 140, 190);
pub const COLOR_EDGE_TEMPLATE_SPECIALIZATION: Color = Color::rgb(120, 150, 200);
pub const COLOR_EDGE_IMPORT: Color = Color::rgb(80, 140, 100);
pub const COLOR_EDGE_MACRO_USAGE: Color = Color::rgb(200, 120, 80);
pub const COLOR_EDGE_ANNOTATION: Color = Color::rgb(180, 100, 140);
pub const COLOR_EDGE_MEMBER: Color = Color::rgb(100, 100, 100);
pub const COLOR_EDGE_UNKNOWN: Color = Color::rgb(120, 120, 120);

pub fn edge_color(kind: EdgeKind) -> Color {
    match kind {
        EdgeKind::CALL => COLOR_EDGE_CALL,
        EdgeKind::TYPE_USAGE => COLOR_EDGE_TYPE_USAGE,
        EdgeKind::USAGE => COLOR_EDGE_USAGE,
        EdgeKind::INHERITANCE => COLOR_EDGE_INHERITANCE,
        EdgeKind::OVERRIDE => COLOR_EDGE_OVERRIDE,
        EdgeKind::TYPE_ARGUMENT => COLOR_EDGE_TYPE_ARGUMENT,
        EdgeKind::TEMPLATE_SPECIALIZATION => COLOR_EDGE_TEMPLATE_SPECIALIZATION,
        EdgeKind::IMPORT | EdgeKind::INCLUDE => COLOR_EDGE_IMPORT,
        EdgeKind::MACRO_USAGE => COLOR_EDGE_MACRO_USAGE,
        EdgeKind::ANNOTATION_USAGE => COLOR_EDGE_ANNOTATION,
        EdgeKind::MEMBER => COLOR_EDGE_MEMBER,
        EdgeKind::UNKNOWN => COLOR_EDGE_UNKNOWN,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerKind {
    OpenArrow,
    ClosedArrow,
}

pub fn marker_kind(kind: EdgeKind) -> MarkerKind {
    if kind.is_hierarchy() {
        MarkerKind::OpenArrow
    } else {
        MarkerKind::ClosedArrow
    }
}

/// Marker size tiers, ordered so that a bundled edge never renders a smaller
/// arrow than an unbundled one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MarkerTier {
    Default,
    Bundled,
    TemplateSpecialization,
    Inheritance,
}

pub fn marker_tier(edge: &RoutedEdgeSpec) -> MarkerTier {
    if edge.kind == EdgeKind::TEMPLATE_SPECIALIZATION {
        return MarkerTier::TemplateSpecialization;
    }
    if edge.kind.is_hierarchy() {
        return MarkerTier::Inheritance;
    }
    if edge.multiplicity > 1 || edge.route_kind == CanonicalRouteKind::FlowTrunk {
        return MarkerTier::Bundled;
    }
    MarkerTier::Default
}

pub fn marker_size(tier: MarkerTier, profile: &LayoutProfile) -> f32 {
    let markers = &profile.markers;
    match tier {
        MarkerTier::Default => markers.default_size,
        MarkerTier::Bundled => markers.bundled,
        MarkerTier::TemplateSpecialization => markers.template_specialization,
        MarkerTier::Inheritance => markers.inheritance,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeStroke {
    pub color: Color,
    pub width: f32,
    pub dash: Option<String>,
    pub opacity: f32,
}

pub fn stroke_width(edge: &RoutedEdgeSpec, profile: &LayoutProfile) -> f32 {
    let render = &profile.render;
    let bundled_boost = ((edge.bundle_count.max(1) as f32).log2() * render.bundled_log_multiplier)
        .min(render.bundled_max_boost);
    let multiplicity_boost = (edge.multiplicity.saturating_sub(1) as f32
        * render.multiplicity_step)
        .min(render.multiplicity_max_boost);
    let hierarchy_boost = if edge.family == CanonicalEdgeFamily::Hierarchy {
        render.hierarchy_boost
    } else {
        0.0
    };
    render.stroke_base + bundled_boost + multiplicity_boost + hierarchy_boost
}

pub fn stroke_opacity(edge: &RoutedEdgeSpec, profile: &LayoutProfile) -> f32 {
    let render = &profile.render;
    let base = match edge.certainty {
        EdgeCertainty::Uncertain => render.uncertain_opacity,
        EdgeCertainty::Probable => render.probable_opacity,
        EdgeCertainty::None => render.base_opacity,
    };
    let bias = if edge.family == CanonicalEdgeFamily::Hierarchy {
        render.hierarchy_opacity_bias
    } else {
        0.0
    };
    (base + bias).min(1.0)
}

pub fn stroke_dash(edge: &RoutedEdgeSpec, profile: &LayoutProfile) -> Option<String> {
    (edge.certainty == EdgeCertainty::Uncertain)
        .then(|| profile.render.uncertain_dash.to_string())
}

pub fn edge_stroke(edge: &RoutedEdgeSpec, profile: &LayoutProfile) -> EdgeStroke {
    EdgeStroke {
        color: edge_color(edge.kind),
        width: stroke_width(edge, profile),
        dash: stroke_dash(edge, profile),
        opacity: stroke_opacity(edge, profile),
    }
}

pub fn interaction_width(edge: &RoutedEdgeSpec, profile: &LayoutProfile) -> f32 {
    if edge.route_kind == CanonicalRouteKind::FlowTrunk || edge.bundle_count > 1 {
        profile.render.bundled_interaction_width
    } else {
        profile.render.interaction_width
    }
}
