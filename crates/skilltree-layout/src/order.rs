//! Ordering within ranks to reduce edge crossings.
//!
//! Layered barycenter heuristic: sweep down the ranks sorting each layer by
//! the mean position of its upper neighbors, then sweep up using lower
//! neighbors. The best ordering seen (fewest crossings) is kept. Sorting is
//! stable and vertices without neighbors on the reference side keep their
//! current slot, so the result is a pure function of the input.

/// Adjacency of the layer graph, split by direction.
#[derive(Debug, Clone, Default)]
pub struct LayerAdjacency {
    /// Neighbors one rank above each vertex.
    pub up: Vec<Vec<usize>>,
    /// Neighbors one rank below each vertex.
    pub down: Vec<Vec<usize>>,
}

impl LayerAdjacency {
    /// Create adjacency lists for `vertex_count` vertices.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            up: vec![Vec::new(); vertex_count],
            down: vec![Vec::new(); vertex_count],
        }
    }

    /// Record an edge between adjacent ranks (`upper` sits one rank above `lower`).
    pub fn connect(&mut self, upper: usize, lower: usize) {
        self.down[upper].push(lower);
        self.up[lower].push(upper);
    }
}

/// Reorder `layers` in place, running `sweeps` down/up passes.
pub fn minimize_crossings(layers: &mut [Vec<usize>], adjacency: &LayerAdjacency, sweeps: usize) {
    if layers.len() <= 1 {
        return;
    }

    let vertex_count = adjacency.up.len();
    let mut slot = vec![0usize; vertex_count];
    refresh_slots(layers, &mut slot);

    let mut best = layers.to_vec();
    let mut best_crossings = total_crossings(layers, adjacency, &slot);

    for _ in 0..sweeps {
        if best_crossings == 0 {
            break;
        }

        for rank in 1..layers.len() {
            sort_layer(&mut layers[rank], &adjacency.up, &slot);
            refresh_slots(layers, &mut slot);
        }
        for rank in (0..layers.len() - 1).rev() {
            sort_layer(&mut layers[rank], &adjacency.down, &slot);
            refresh_slots(layers, &mut slot);
        }

        let crossings = total_crossings(layers, adjacency, &slot);
        if crossings < best_crossings {
            best_crossings = crossings;
            best = layers.to_vec();
        }
    }

    layers.clone_from_slice(&best);
}

fn refresh_slots(layers: &[Vec<usize>], slot: &mut [usize]) {
    for layer in layers {
        for (idx, &vertex) in layer.iter().enumerate() {
            slot[vertex] = idx;
        }
    }
}

fn sort_layer(layer: &mut [usize], neighbors: &[Vec<usize>], slot: &[usize]) {
    if layer.len() <= 1 {
        return;
    }

    let mut keyed: Vec<(f64, usize, usize)> = layer
        .iter()
        .map(|&vertex| {
            let score = barycenter(vertex, neighbors, slot).unwrap_or(slot[vertex] as f64);
            (score, slot[vertex], vertex)
        })
        .collect();

    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    for (dst, (_, _, vertex)) in layer.iter_mut().zip(keyed) {
        *dst = vertex;
    }
}

/// Mean slot of a vertex's neighbors, `None` when it has none.
pub fn barycenter(vertex: usize, neighbors: &[Vec<usize>], slot: &[usize]) -> Option<f64> {
    let list = &neighbors[vertex];
    if list.is_empty() {
        return None;
    }
    let total: usize = list.iter().map(|&n| slot[n]).sum();
    Some(total as f64 / list.len() as f64)
}

/// Count crossings between every pair of adjacent layers.
pub fn total_crossings(layers: &[Vec<usize>], adjacency: &LayerAdjacency, slot: &[usize]) -> usize {
    layers
        .iter()
        .take(layers.len().saturating_sub(1))
        .map(|upper| layer_crossings(upper, adjacency, slot))
        .sum()
}

fn layer_crossings(upper: &[usize], adjacency: &LayerAdjacency, slot: &[usize]) -> usize {
    let segments: Vec<(usize, usize)> = upper
        .iter()
        .flat_map(|&u| adjacency.down[u].iter().map(move |&l| (u, l)))
        .map(|(u, l)| (slot[u], slot[l]))
        .collect();

    let mut crossings = 0;
    for i in 0..segments.len() {
        for j in (i + 1)..segments.len() {
            let (a_top, a_bottom) = segments[i];
            let (b_top, b_bottom) = segments[j];
            if (a_top < b_top && a_bottom > b_bottom) || (a_top > b_top && a_bottom < b_bottom) {
                crossings += 1;
            }
        }
    }
    crossings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots_for(layers: &[Vec<usize>], vertex_count: usize) -> Vec<usize> {
        let mut slot = vec![0; vertex_count];
        refresh_slots(layers, &mut slot);
        slot
    }

    #[test]
    fn crossing_is_counted() {
        // 0 -> 3, 1 -> 2 with layers [0, 1] / [2, 3] cross once
        let mut adjacency = LayerAdjacency::new(4);
        adjacency.connect(0, 3);
        adjacency.connect(1, 2);
        let layers = vec![vec![0, 1], vec![2, 3]];
        let slot = slots_for(&layers, 4);
        assert_eq!(total_crossings(&layers, &adjacency, &slot), 1);
    }

    #[test]
    fn sweeps_remove_simple_crossing() {
        let mut adjacency = LayerAdjacency::new(4);
        adjacency.connect(0, 3);
        adjacency.connect(1, 2);
        let mut layers = vec![vec![0, 1], vec![2, 3]];
        minimize_crossings(&mut layers, &adjacency, 4);

        let slot = slots_for(&layers, 4);
        assert_eq!(total_crossings(&layers, &adjacency, &slot), 0);
    }

    #[test]
    fn shared_endpoints_do_not_cross() {
        let mut adjacency = LayerAdjacency::new(3);
        adjacency.connect(0, 1);
        adjacency.connect(0, 2);
        let layers = vec![vec![0], vec![1, 2]];
        let slot = slots_for(&layers, 3);
        assert_eq!(total_crossings(&layers, &adjacency, &slot), 0);
    }

    #[test]
    fn barycenter_of_isolated_vertex_is_none() {
        let adjacency = LayerAdjacency::new(2);
        assert!(barycenter(0, &adjacency.up, &[0, 1]).is_none());
    }

    #[test]
    fn single_layer_untouched() {
        let adjacency = LayerAdjacency::new(3);
        let mut layers = vec![vec![2, 0, 1]];
        minimize_crossings(&mut layers, &adjacency, 4);
        assert_eq!(layers, vec![vec![2, 0, 1]]);
    }
}
