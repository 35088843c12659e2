//! Applies the layered layout to skill nodes.

use std::collections::HashMap;

use skilltree_layout::{layout, LayoutConfig, Size};

use crate::model::{Edge, Node};

/// Return `nodes` with every `position` replaced by the layout result.
///
/// Inputs are not modified and edges only contribute topology. Edges whose
/// endpoints are missing are ignored.
pub fn layout_nodes(nodes: &[Node], edges: &[Edge], config: &LayoutConfig) -> Vec<Node> {
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.as_str(), idx))
        .collect();

    let sizes: Vec<Size> = nodes.iter().map(Node::size).collect();
    let pairs: Vec<(usize, usize)> = edges
        .iter()
        .filter_map(|edge| {
            let from = *index.get(edge.source.as_str())?;
            let to = *index.get(edge.target.as_str())?;
            Some((from, to))
        })
        .collect();

    let result = layout(&sizes, &pairs, config);

    nodes
        .iter()
        .zip(result.positions)
        .map(|(node, position)| Node {
            position,
            ..node.clone()
        })
        .collect()
}
