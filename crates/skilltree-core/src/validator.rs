//! Connection validity.
//!
//! A proposed prerequisite edge is checked in a fixed order, stopping at the
//! first failure:
//!
//! 1. the target node exists (and so does the source)
//! 2. the edge is not a self-loop
//! 3. the target is still locked
//! 4. the edge does not close a cycle
//!
//! Malformed requests (unknown endpoints) are rejected silently; every other
//! rejection carries the text shown to the user.

use std::collections::HashMap;

use thiserror::Error;

use crate::model::{Connection, Edge, Node, NodeId};

/// Shown when a prerequisite would be added to an unlocked skill.
pub const UNLOCKED_TARGET_MESSAGE: &str = "Cannot add prerequisites to an unlocked node.";

/// Shown when an edge would close a cycle (including a self-loop).
pub const CYCLE_MESSAGE: &str = "Cannot create cyclic dependencies.";

/// Why a connection was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionRejection {
    #[error("unknown target node {0}")]
    UnknownTarget(NodeId),

    #[error("unknown source node {0}")]
    UnknownSource(NodeId),

    #[error("{}", CYCLE_MESSAGE)]
    SelfLoop,

    #[error("{}", UNLOCKED_TARGET_MESSAGE)]
    TargetUnlocked,

    #[error("{}", CYCLE_MESSAGE)]
    WouldCycle,
}

impl ConnectionRejection {
    /// The diagnostic text for the user, `None` for malformed requests.
    pub fn diagnostic(&self) -> Option<&'static str> {
        match self {
            ConnectionRejection::UnknownTarget(_) | ConnectionRejection::UnknownSource(_) => None,
            ConnectionRejection::SelfLoop | ConnectionRejection::WouldCycle => Some(CYCLE_MESSAGE),
            ConnectionRejection::TargetUnlocked => Some(UNLOCKED_TARGET_MESSAGE),
        }
    }
}

/// Decide whether `connection` may be added to the graph.
pub fn validate_connection(
    connection: &Connection,
    nodes: &[Node],
    edges: &[Edge],
) -> Result<(), ConnectionRejection> {
    let target = nodes
        .iter()
        .find(|n| n.id == connection.target)
        .ok_or_else(|| ConnectionRejection::UnknownTarget(connection.target.clone()))?;

    if !nodes.iter().any(|n| n.id == connection.source) {
        return Err(ConnectionRejection::UnknownSource(connection.source.clone()));
    }

    if target.id == connection.source {
        return Err(ConnectionRejection::SelfLoop);
    }

    if target.unlocked {
        return Err(ConnectionRejection::TargetUnlocked);
    }

    if would_create_cycle(&connection.source, &connection.target, edges) {
        return Err(ConnectionRejection::WouldCycle);
    }

    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    OnPath,
    Done,
}

/// Whether adding `source -> target` would close a cycle.
///
/// Depth-first walk over existing outgoing edges starting at `target`. The
/// walk reports a cycle when it reaches `source`, or when it re-enters a
/// node still on the current path (the stored graph is already cyclic).
/// Nodes finished earlier in the same walk are skipped, so reconverging
/// diamonds are visited once and not mistaken for cycles. The visit map
/// lives for one call only.
pub fn would_create_cycle(source: &NodeId, target: &NodeId, edges: &[Edge]) -> bool {
    if source == target {
        return true;
    }

    let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        outgoing
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    let mut visits: HashMap<&str, Visit> = HashMap::new();
    let mut stack: Vec<(&str, usize)> = vec![(target.as_str(), 0)];
    visits.insert(target.as_str(), Visit::OnPath);

    while let Some(frame) = stack.last_mut() {
        let (node, next_child) = *frame;
        let children = outgoing.get(node).map(Vec::as_slice).unwrap_or(&[]);

        let Some(&child) = children.get(next_child) else {
            visits.insert(node, Visit::Done);
            stack.pop();
            continue;
        };
        frame.1 += 1;

        if child == source.as_str() {
            return true;
        }
        match visits.get(child) {
            Some(Visit::OnPath) => return true,
            Some(Visit::Done) => {}
            None => {
                visits.insert(child, Visit::OnPath);
                stack.push((child, 0));
            }
        }
    }

    false
}
