pub mod bundler;
pub mod canonical;
pub mod diagnostics;
pub mod elements;
pub mod geometry;
pub mod pipeline;
pub mod placer;
pub mod profile;
pub mod render;
pub mod router;
pub mod style;

pub use bundler::bundle_edges;
pub use canonical::{CanonicalOutcome, SeedRejection, canonicalize, to_seed};
pub use diagnostics::{
    ChannelReport, RouteReport, channel_reports, format_route_reports, route_reports,
};
pub use elements::{
    DensityInputs, LayoutElements, LayoutOptions, RoutedEdgeSpec, SemanticNodePlacement,
};
pub use geometry::{Rect, Vec2, route_length, segment_intersects_rect, simplify, snap};
pub use pipeline::{PipelineRun, layout_graph, run_pipeline};
pub use placer::place_nodes;
pub use profile::LayoutProfile;
pub use render::{EdgePath, MarkerEnd, build_edge_path, render_edges};
pub use router::route_edges;
pub use style::{Color, EdgeStroke, MarkerKind, MarkerTier, edge_color, edge_stroke, marker_tier};
