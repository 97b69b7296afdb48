//! Newtype identifiers.
//!
//! Ids pass through many trait boundaries (repositories, lease manager,
//! observer callbacks) where a bare `Uuid` would make it easy to transpose
//! a workflow id for an execution id, so each gets its own newtype.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_newtype!(WorkflowId);
uuid_newtype!(ExecutionId);
uuid_newtype!(TenantId);

/// A node identifier within one workflow's node map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The current-node pointer of an execution: either a real node or the
/// terminal sentinel. Modeling this as an enum rather than a magic string
/// (e.g. `"__end__"`) makes "is this the terminal sentinel" a match arm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeRef {
    Node(NodeId),
    Terminal,
}

impl NodeRef {
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeRef::Terminal)
    }

    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            NodeRef::Node(id) => Some(id),
            NodeRef::Terminal => None,
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Node(id) => write!(f, "{id}"),
            NodeRef::Terminal => write!(f, "<terminal>"),
        }
    }
}
