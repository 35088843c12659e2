//! Commit notifications and the published snapshot.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::economy::PointsView;
use crate::model::{Edge, Node, NodeId};

/// What a commit changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GraphEvent {
    /// State seeded from a persisted snapshot
    Loaded { nodes: usize, edges: usize },

    /// A node was created
    NodeAdded { id: NodeId },

    /// A validated prerequisite edge was added
    EdgeAdded { id: String, source: NodeId, target: NodeId },

    /// A node's data changed; `spent` is the change in committed points
    NodeEdited { id: NodeId, spent: i64 },

    /// Nodes were deleted and their neighbors reconnected
    NodesRemoved {
        removed: Vec<NodeId>,
        created_edges: Vec<String>,
        refunded: i64,
    },

    /// Raw node deltas were applied
    NodesChanged { count: usize },

    /// Raw edge deltas were applied
    EdgesChanged { count: usize },

    /// Manual point grant
    PointsAdjusted { delta: i64, available: i64 },

    /// The connection diagnostic was set or cleared
    DiagnosticChanged { error_text: Option<String> },
}

/// Immutable view of the engine after a commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    pub revision: u64,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub points: PointsView,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
}

impl GraphSnapshot {
    /// Look up a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == *id)
    }
}

/// One published transition.
#[derive(Debug, Clone)]
pub struct Commit {
    pub revision: u64,
    pub event: GraphEvent,
    pub snapshot: Arc<GraphSnapshot>,
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);
