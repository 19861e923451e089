//! Pipeline composition: canonical → placer → bundler → router. Pure and
//! synchronous; a single invocation owns every intermediate and nothing here
//! can fail — degraded inputs degrade the affected edge, never the layout.

use crate::bundler::bundle_edges;
use crate::canonical::canonicalize;
use crate::elements::{LayoutElements, LayoutOptions};
use crate::placer::place_nodes;
use crate::profile::LayoutProfile;
use crate::router::route_edges;
use codetrail_api::{EdgeId, GraphResponse};

#[derive(Debug)]
pub struct PipelineRun {
    pub elements: LayoutElements,
    /// Why a supplied canonical seed was rejected, if one was.
    pub seed_rejection: Option<String>,
    /// Raw edges dropped because an endpoint never resolved.
    pub dropped_edges: Vec<EdgeId>,
}

pub fn run_pipeline(
    response: &GraphResponse,
    options: &LayoutOptions,
    profile: &LayoutProfile,
) -> PipelineRun {
    let outcome = canonicalize(response, options, profile);
    let mut elements = outcome.elements;

    place_nodes(&mut elements, options.direction, profile);
    bundle_edges(&mut elements, options, profile);
    route_edges(&mut elements, options, profile);

    PipelineRun {
        elements,
        seed_rejection: outcome.seed_rejection.map(|rejection| rejection.to_string()),
        dropped_edges: outcome.dropped_edges,
    }
}

/// The plain entry point: graph response in, immutable layout out.
pub fn layout_graph(
    response: &GraphResponse,
    options: &LayoutOptions,
    profile: &LayoutProfile,
) -> LayoutElements {
    run_pipeline(response, options, profile).elements
}
