use serde::{Deserialize, Serialize};
use specta::Type;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_serializes_transparently() {
        let id = NodeId::new("n:crate.c:Workspace");
        let json = serde_json::to_string(&id).expect("NodeId should serialize");
        assert_eq!(json, "\"n:crate.c:Workspace\"");

        let back: NodeId = serde_json::from_str(&json).expect("NodeId should deserialize");
        assert_eq!(back, id);
    }

    #[test]
    fn ids_order_by_code_point() {
        let mut ids = vec![EdgeId::new("call-2"), EdgeId::new("CALL-9"), EdgeId::new("call-1")];
        ids.sort();
        assert_eq!(
            ids.iter().map(EdgeId::as_str).collect::<Vec<_>>(),
            vec!["CALL-9", "call-1", "call-2"]
        );
    }
}
