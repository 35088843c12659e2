//! Search highlighting over the published graph.
//!
//! A query seeds the set of nodes whose label contains it (case-insensitive).
//! A breadth-first walk over the undirected edge set then collects everything
//! connected to a seed. Nodes and edges are classified for display; the
//! stored graph is never touched.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::model::{Edge, Node, NodeId};

/// Visual state of a node under an active query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    /// Label matches the query
    Matched,
    /// Connected to a match but not matching itself
    Reachable,
    /// Not connected to any match
    Unreachable,
}

/// A node as the canvas should draw it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayNode {
    #[serde(flatten)]
    pub node: Node,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Highlight>,
}

/// An edge as the canvas should draw it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayEdge {
    #[serde(flatten)]
    pub edge: Edge,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub animated: bool,
}

/// Display lists for one query.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HighlightView {
    pub nodes: Vec<DisplayNode>,
    pub edges: Vec<DisplayEdge>,
}

impl HighlightView {
    /// The view of an inactive query: everything passes through as is.
    pub fn passthrough(nodes: &[Node], edges: &[Edge]) -> Self {
        Self {
            nodes: nodes
                .iter()
                .map(|node| DisplayNode { node: node.clone(), highlight: None })
                .collect(),
            edges: edges
                .iter()
                .map(|edge| DisplayEdge { edge: edge.clone(), animated: false })
                .collect(),
        }
    }

    /// Highlight of the node with `id`, if present.
    pub fn highlight_of(&self, id: &NodeId) -> Option<Highlight> {
        self.nodes
            .iter()
            .find(|n| n.node.id == *id)
            .and_then(|n| n.highlight)
    }
}

/// Ids of nodes whose label contains `query`, ignoring case.
pub fn matching_nodes<'a>(query: &str, nodes: &'a [Node]) -> HashSet<&'a str> {
    let needle = query.trim().to_lowercase();
    nodes
        .iter()
        .filter(|node| node.label.to_lowercase().contains(&needle))
        .map(|node| node.id.as_str())
        .collect()
}

/// Everything connected to `seeds` when edge direction is ignored.
/// Seeds are always part of the closure.
pub fn reachability_closure<'a>(seeds: &HashSet<&'a str>, edges: &'a [Edge]) -> HashSet<&'a str> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
        adjacency
            .entry(edge.target.as_str())
            .or_default()
            .push(edge.source.as_str());
    }

    let mut collected: HashSet<&str> = seeds.clone();
    let mut queue: VecDeque<&str> = seeds.iter().copied().collect();

    while let Some(current) = queue.pop_front() {
        for &neighbor in adjacency.get(current).into_iter().flatten() {
            if collected.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    collected
}

/// Classify nodes and edges for `query`. A blank query returns the inputs
/// unchanged.
pub fn highlight(query: &str, nodes: &[Node], edges: &[Edge]) -> HighlightView {
    if query.trim().is_empty() {
        return HighlightView::passthrough(nodes, edges);
    }

    let matched = matching_nodes(query, nodes);
    let closure = reachability_closure(&matched, edges);

    let display_nodes = nodes
        .iter()
        .map(|node| {
            let id = node.id.as_str();
            let highlight = if matched.contains(id) {
                Highlight::Matched
            } else if closure.contains(id) {
                Highlight::Reachable
            } else {
                Highlight::Unreachable
            };
            DisplayNode {
                node: node.clone(),
                highlight: Some(highlight),
            }
        })
        .collect();

    let display_edges = edges
        .iter()
        .map(|edge| DisplayEdge {
            edge: edge.clone(),
            animated: closure.contains(edge.source.as_str()),
        })
        .collect();

    HighlightView {
        nodes: display_nodes,
        edges: display_edges,
    }
}
