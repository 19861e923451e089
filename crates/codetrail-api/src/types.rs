use serde::{Deserialize, Serialize};
use specta::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[allow(non_camel_case_types)]
pub enum NodeKind {
    // Structural
    MODULE,
    NAMESPACE,
    PACKAGE,
    FILE,

    // Types
    STRUCT,
    CLASS,
    INTERFACE,
    ANNOTATION,
    UNION,
    ENUM,
    TYPEDEF,
    TYPE_PARAMETER,
    BUILTIN_TYPE,

    // Callable/Executable
    FUNCTION,
    METHOD,
    MACRO,

    // Variables/Constants
    GLOBAL_VARIABLE,
    FIELD,
    VARIABLE,
    CONSTANT,
    ENUM_CONSTANT,

    // Other: any kind this build does not know folds into UNKNOWN
    #[serde(other)]
    UNKNOWN,
}

impl NodeKind {
    /// Kinds that can host members and render as a card with member rows.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            NodeKind::CLASS
                | NodeKind::STRUCT
                | NodeKind::INTERFACE
                | NodeKind::UNION
                | NodeKind::ENUM
                | NodeKind::NAMESPACE
                | NodeKind::MODULE
                | NodeKind::PACKAGE
        )
    }

    pub fn is_card(self) -> bool {
        self.is_structural() || self == NodeKind::FILE
    }

    pub fn is_private_member_kind(self) -> bool {
        matches!(
            self,
            NodeKind::FIELD
                | NodeKind::VARIABLE
                | NodeKind::GLOBAL_VARIABLE
                | NodeKind::CONSTANT
                | NodeKind::ENUM_CONSTANT
        )
    }

    pub fn is_public_member_kind(self) -> bool {
        matches!(self, NodeKind::FUNCTION | NodeKind::METHOD | NodeKind::MACRO)
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::MODULE => "MODULE",
            NodeKind::NAMESPACE => "NAMESPACE",
            NodeKind::PACKAGE => "PACKAGE",
            NodeKind::FILE => "FILE",
            NodeKind::STRUCT => "STRUCT",
            NodeKind::CLASS => "CLASS",
            NodeKind::INTERFACE => "INTERFACE",
            NodeKind::ANNOTATION => "ANNOTATION",
            NodeKind::UNION => "UNION",
            NodeKind::ENUM => "ENUM",
            NodeKind::TYPEDEF => "TYPEDEF",
            NodeKind::TYPE_PARAMETER => "TYPE_PARAMETER",
            NodeKind::BUILTIN_TYPE => "BUILTIN_TYPE",
            NodeKind::FUNCTION => "FUNCTION",
            NodeKind::METHOD => "METHOD",
            NodeKind::MACRO => "MACRO",
            NodeKind::GLOBAL_VARIABLE => "GLOBAL_VARIABLE",
            NodeKind::FIELD => "FIELD",
            NodeKind::VARIABLE => "VARIABLE",
            NodeKind::CONSTANT => "CONSTANT",
            NodeKind::ENUM_CONSTANT => "ENUM_CONSTANT",
            NodeKind::UNKNOWN => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[allow(non_camel_case_types)]
pub enum EdgeKind {
    MEMBER,
    TYPE_USAGE,
    USAGE,
    CALL,
    INHERITANCE,
    OVERRIDE,
    TYPE_ARGUMENT,
    TEMPLATE_SPECIALIZATION,
    INCLUDE,
    IMPORT,
    MACRO_USAGE,
    ANNOTATION_USAGE,
    #[serde(other)]
    UNKNOWN,
}

impl EdgeKind {
    /// Hierarchy edges route top-to-bottom and never join flow trunks.
    pub fn is_hierarchy(self) -> bool {
        matches!(
            self,
            EdgeKind::INHERITANCE
                | EdgeKind::OVERRIDE
                | EdgeKind::TYPE_ARGUMENT
                | EdgeKind::TEMPLATE_SPECIALIZATION
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            EdgeKind::MEMBER => "MEMBER",
            EdgeKind::TYPE_USAGE => "TYPE_USAGE",
            EdgeKind::USAGE => "USAGE",
            EdgeKind::CALL => "CALL",
            EdgeKind::INHERITANCE => "INHERITANCE",
            EdgeKind::OVERRIDE => "OVERRIDE",
            EdgeKind::TYPE_ARGUMENT => "TYPE_ARGUMENT",
            EdgeKind::TEMPLATE_SPECIALIZATION => "TEMPLATE_SPECIALIZATION",
            EdgeKind::INCLUDE => "INCLUDE",
            EdgeKind::IMPORT => "IMPORT",
            EdgeKind::MACRO_USAGE => "MACRO_USAGE",
            EdgeKind::ANNOTATION_USAGE => "ANNOTATION_USAGE",
            EdgeKind::UNKNOWN => "UNKNOWN",
        }
    }
}

/// Resolution confidence attached to an edge. Ordering matters: folding keeps
/// the strongest value, and `Uncertain` outranks `Probable`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum EdgeCertainty {
    #[default]
    None,
    Probable,
    Uncertain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
pub enum MemberAccess {
    Public,
    Protected,
    Private,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, Default)]
pub enum LayoutDirection {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalNodeStyle {
    Card,
    Pill,
    Bundle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalEdgeFamily {
    Flow,
    Hierarchy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "kebab-case")]
pub enum CanonicalRouteKind {
    Direct,
    FlowTrunk,
    FlowBranch,
    Hierarchy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalMemberVisibility {
    Public,
    Protected,
    Private,
    Default,
}

impl From<MemberAccess> for CanonicalMemberVisibility {
    fn from(value: MemberAccess) -> Self {
        match value {
            MemberAccess::Public => Self::Public,
            MemberAccess::Protected => Self::Protected,
            MemberAccess::Private => Self::Private,
            MemberAccess::Default => Self::Default,
        }
    }
}
