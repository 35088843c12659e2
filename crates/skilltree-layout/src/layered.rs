//! The layered layout pipeline: rank, order, position, translate.

use crate::geometry::{Point, Size};
use crate::order::{minimize_crossings, LayerAdjacency};
use crate::position::assign_centers;
use crate::rank::longest_path_ranks;

/// Spacing and effort knobs for the layered layout.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutConfig {
    /// Horizontal gap between neighboring rectangles on one rank
    pub node_sep: f64,
    /// Vertical gap between ranks
    pub rank_sep: f64,
    /// Number of down/up barycenter sweeps
    pub sweeps: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_sep: 50.0,
            rank_sep: 50.0,
            sweeps: 4,
        }
    }
}

/// Result of a layout pass, indexed like the input nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    /// Rank (row) of every node, 0 at the top
    pub ranks: Vec<usize>,
    /// Node indices per rank, in left-to-right order
    pub layers: Vec<Vec<usize>>,
    /// Rectangle centers
    pub centers: Vec<Point>,
    /// Top-left corners (`center - size / 2`)
    pub positions: Vec<Point>,
}

/// Lay out `sizes.len()` rectangles connected by `edges` (pairs of indices
/// into `sizes`, meaning "from is above to").
///
/// Pure and deterministic: the same sizes and edges always produce the same
/// positions. Out-of-range edges and self-loops are ignored.
pub fn layout(sizes: &[Size], edges: &[(usize, usize)], config: &LayoutConfig) -> Layout {
    let node_count = sizes.len();
    if node_count == 0 {
        return Layout::default();
    }

    let mut unique: Vec<(usize, usize)> = edges
        .iter()
        .copied()
        .filter(|&(from, to)| from != to && from < node_count && to < node_count)
        .collect();
    unique.sort_unstable();
    unique.dedup();

    let ranks = longest_path_ranks(node_count, &unique);
    let rank_count = ranks.iter().copied().max().unwrap_or(0) + 1;

    // Layer graph: real nodes first, then one virtual vertex per rank
    // crossed by a long edge.
    let mut vertex_sizes: Vec<Size> = sizes.to_vec();
    let mut vertex_ranks: Vec<usize> = ranks.clone();
    let mut links: Vec<(usize, usize)> = Vec::new();

    for &(from, to) in &unique {
        if ranks[to] <= ranks[from] {
            continue;
        }
        let mut upper = from;
        for rank in (ranks[from] + 1)..ranks[to] {
            let virtual_vertex = vertex_sizes.len();
            vertex_sizes.push(Size::ZERO);
            vertex_ranks.push(rank);
            links.push((upper, virtual_vertex));
            upper = virtual_vertex;
        }
        links.push((upper, to));
    }

    let mut adjacency = LayerAdjacency::new(vertex_sizes.len());
    for &(upper, lower) in &links {
        adjacency.connect(upper, lower);
    }

    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); rank_count];
    for (vertex, &rank) in vertex_ranks.iter().enumerate() {
        layers[rank].push(vertex);
    }

    minimize_crossings(&mut layers, &adjacency, config.sweeps);

    let vertex_centers = assign_centers(
        &layers,
        &vertex_sizes,
        &adjacency,
        config.node_sep,
        config.rank_sep,
    );

    // Translate so the bounding box of the real nodes starts at the origin.
    let min_left = (0..node_count)
        .map(|n| vertex_centers[n].x - sizes[n].width / 2.0)
        .fold(f64::INFINITY, f64::min);
    let min_top = (0..node_count)
        .map(|n| vertex_centers[n].y - sizes[n].height / 2.0)
        .fold(f64::INFINITY, f64::min);
    let offset = Point::new(min_left, min_top);

    let centers: Vec<Point> = vertex_centers[..node_count]
        .iter()
        .map(|&c| c - offset)
        .collect();
    let positions = centers
        .iter()
        .zip(sizes)
        .map(|(&c, &s)| c.center_to_top_left(s))
        .collect();

    let layers = layers
        .into_iter()
        .map(|layer| layer.into_iter().filter(|&v| v < node_count).collect())
        .collect();

    Layout {
        ranks,
        layers,
        centers,
        positions,
    }
}
