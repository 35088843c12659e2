//! Coordinate assignment for ordered layers.
//!
//! Rank `r` is a horizontal band whose height is the tallest rectangle on
//! it; bands are stacked top to bottom with `rank_sep` between them. Inside
//! a band each vertex is pulled toward the mean x of its upper neighbors,
//! then pushed right until it clears its left sibling by `node_sep`, and the
//! whole band is shifted back by the mean displacement so it stays balanced.

use crate::geometry::{Point, Size};
use crate::order::LayerAdjacency;

/// Assign rectangle centers to every vertex of the layer graph.
pub fn assign_centers(
    layers: &[Vec<usize>],
    sizes: &[Size],
    adjacency: &LayerAdjacency,
    node_sep: f64,
    rank_sep: f64,
) -> Vec<Point> {
    let mut centers = vec![Point::ORIGIN; sizes.len()];

    let mut band_top = 0.0;
    for layer in layers {
        let band_height = layer
            .iter()
            .map(|&v| sizes[v].height)
            .fold(0.0_f64, f64::max);
        let y = band_top + band_height / 2.0;

        let desired: Vec<f64> = pack_desired(layer, sizes, adjacency, &centers, node_sep);
        let placed = separate(layer, sizes, &desired, node_sep);

        for (&vertex, x) in layer.iter().zip(placed) {
            centers[vertex] = Point::new(x, y);
        }

        band_top += band_height + rank_sep;
    }

    centers
}

/// Preferred x for each vertex: mean of upper neighbors when it has any,
/// otherwise its slot in a packed row centered on zero.
fn pack_desired(
    layer: &[usize],
    sizes: &[Size],
    adjacency: &LayerAdjacency,
    centers: &[Point],
    node_sep: f64,
) -> Vec<f64> {
    let row_width: f64 = layer.iter().map(|&v| sizes[v].width).sum::<f64>()
        + node_sep * layer.len().saturating_sub(1) as f64;

    let mut cursor = -row_width / 2.0;
    layer
        .iter()
        .map(|&vertex| {
            let width = sizes[vertex].width;
            let packed = cursor + width / 2.0;
            cursor += width + node_sep;

            let upper = &adjacency.up[vertex];
            if upper.is_empty() {
                packed
            } else {
                upper.iter().map(|&u| centers[u].x).sum::<f64>() / upper.len() as f64
            }
        })
        .collect()
}

/// Resolve overlaps left to right, then re-center on the desired positions.
fn separate(layer: &[usize], sizes: &[Size], desired: &[f64], node_sep: f64) -> Vec<f64> {
    let mut placed: Vec<f64> = Vec::with_capacity(layer.len());
    for (idx, &vertex) in layer.iter().enumerate() {
        let want = desired[idx];
        let x = match idx.checked_sub(1) {
            Some(prev_idx) => {
                let prev = layer[prev_idx];
                let min_gap = (sizes[prev].width + sizes[vertex].width) / 2.0 + node_sep;
                want.max(placed[prev_idx] + min_gap)
            }
            None => want,
        };
        placed.push(x);
    }

    if !placed.is_empty() {
        let drift: f64 = placed
            .iter()
            .zip(desired)
            .map(|(p, d)| p - d)
            .sum::<f64>()
            / placed.len() as f64;
        for x in &mut placed {
            *x -= drift;
        }
    }

    placed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_stack_downward() {
        let mut adjacency = LayerAdjacency::new(2);
        adjacency.connect(0, 1);
        let sizes = [Size::new(100.0, 40.0), Size::new(100.0, 60.0)];
        let layers = vec![vec![0], vec![1]];

        let centers = assign_centers(&layers, &sizes, &adjacency, 50.0, 50.0);
        assert_eq!(centers[0].y, 20.0);
        assert_eq!(centers[1].y, 40.0 + 50.0 + 30.0);
        // Child sits under its parent
        assert_eq!(centers[0].x, centers[1].x);
    }

    #[test]
    fn siblings_do_not_overlap() {
        let mut adjacency = LayerAdjacency::new(3);
        adjacency.connect(0, 1);
        adjacency.connect(0, 2);
        let sizes = [Size::new(80.0, 20.0); 3];
        let layers = vec![vec![0], vec![1, 2]];

        let centers = assign_centers(&layers, &sizes, &adjacency, 50.0, 50.0);
        let gap = centers[2].x - centers[1].x;
        assert!(gap >= 80.0 + 50.0 - 1e-9, "gap {gap}");
        // Balanced around the parent
        assert!(((centers[1].x + centers[2].x) / 2.0 - centers[0].x).abs() < 1e-9);
    }

    #[test]
    fn zero_sized_nodes_still_spaced() {
        let adjacency = LayerAdjacency::new(2);
        let sizes = [Size::ZERO; 2];
        let layers = vec![vec![0, 1]];

        let centers = assign_centers(&layers, &sizes, &adjacency, 50.0, 50.0);
        assert_eq!(centers[1].x - centers[0].x, 50.0);
    }
}
