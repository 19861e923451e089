mod dto;
mod errors;
mod ids;
mod types;

pub use dto::{
    CanonicalEdgeDto, CanonicalLayoutDto, CanonicalMemberDto, CanonicalNodeDto, GraphEdgeDto,
    GraphNodeDto, GraphResponse,
};
pub use errors::ApiError;
pub use ids::{EdgeId, NodeId};
pub use types::{
    CanonicalEdgeFamily, CanonicalMemberVisibility, CanonicalNodeStyle, CanonicalRouteKind,
    EdgeCertainty, EdgeKind, LayoutDirection, MemberAccess, NodeKind,
};
