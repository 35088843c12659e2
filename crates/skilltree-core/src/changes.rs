//! Low-level deltas coming from the rendering surface.
//!
//! Drags, measurements and selection are folded straight into the stored
//! nodes and edges without a layout pass, so a manual drag is never
//! overridden. Node removals are not applied here: the engine routes them
//! through its delete routine so refunds and reconnection still happen.

use serde::{Deserialize, Serialize};
use skilltree_layout::{Point, Size};

use crate::model::{Edge, Node, NodeId};

/// A delta for one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeChange {
    /// Node dragged to a new top-left position
    Position { id: NodeId, position: Point },
    /// Node measured by the rendering surface
    Dimensions { id: NodeId, dimensions: Size },
    /// Selection toggled
    Select { id: NodeId, selected: bool },
    /// Node deleted on the canvas
    Remove { id: NodeId },
}

impl NodeChange {
    /// The node this change refers to.
    pub fn id(&self) -> &NodeId {
        match self {
            NodeChange::Position { id, .. } => id,
            NodeChange::Dimensions { id, .. } => id,
            NodeChange::Select { id, .. } => id,
            NodeChange::Remove { id } => id,
        }
    }
}

/// A delta for one edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EdgeChange {
    Select { id: String, selected: bool },
    Remove { id: String },
}

/// Fold non-removal changes into `nodes` and return the ids to remove, in
/// the order they were received. Changes for unknown ids are ignored.
pub fn apply_node_changes(changes: &[NodeChange], nodes: &mut [Node]) -> Vec<NodeId> {
    let mut removals = Vec::new();

    for change in changes {
        if let NodeChange::Remove { id } = change {
            removals.push(id.clone());
            continue;
        }

        let Some(node) = nodes.iter_mut().find(|n| n.id == *change.id()) else {
            continue;
        };

        match change {
            NodeChange::Position { position, .. } => node.position = *position,
            NodeChange::Dimensions { dimensions, .. } => node.measured = Some(*dimensions),
            NodeChange::Select { selected, .. } => node.selected = *selected,
            NodeChange::Remove { .. } => {}
        }
    }

    removals
}

/// Fold edge changes into `edges`. Changes for unknown ids are ignored.
pub fn apply_edge_changes(changes: &[EdgeChange], edges: &mut Vec<Edge>) {
    for change in changes {
        match change {
            EdgeChange::Select { id, selected } => {
                if let Some(edge) = edges.iter_mut().find(|e| e.id == *id) {
                    edge.selected = *selected;
                }
            }
            EdgeChange::Remove { id } => edges.retain(|e| e.id != *id),
        }
    }
}
