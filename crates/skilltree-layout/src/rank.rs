//! Rank assignment by longest path from the sources.
//!
//! Every node without incoming edges sits on rank 0; every other node sits
//! one rank below its deepest prerequisite. Ranks depend on topology only,
//! never on sizes or previous positions, so re-running the layout on its own
//! output keeps every node on the same rank.

use std::collections::VecDeque;

/// Compute a deterministic processing order (Kahn's algorithm, ties broken
/// by node index). Nodes left over because of a cycle are appended in index
/// order so the function stays total on malformed input.
pub fn topological_order(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut indegree = vec![0usize; node_count];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); node_count];

    for &(from, to) in edges {
        if from == to || from >= node_count || to >= node_count {
            continue;
        }
        successors[from].push(to);
        indegree[to] += 1;
    }

    let mut queue: VecDeque<usize> = (0..node_count).filter(|&n| indegree[n] == 0).collect();
    let mut order = Vec::with_capacity(node_count);
    let mut placed = vec![false; node_count];

    while let Some(node) = queue.pop_front() {
        order.push(node);
        placed[node] = true;
        for &next in &successors[node] {
            indegree[next] -= 1;
            if indegree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    if order.len() < node_count {
        order.extend((0..node_count).filter(|&n| !placed[n]));
    }

    order
}

/// Assign each node its longest-path rank.
///
/// Edges that point backwards in the processing order (only possible when
/// the input contains a cycle) do not contribute.
pub fn longest_path_ranks(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let order = topological_order(node_count, edges);
    let mut position = vec![0usize; node_count];
    for (idx, &node) in order.iter().enumerate() {
        position[node] = idx;
    }

    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for &(from, to) in edges {
        if from != to && from < node_count && to < node_count {
            successors[from].push(to);
        }
    }

    let mut ranks = vec![0usize; node_count];
    for &node in &order {
        let rank = ranks[node];
        for &next in &successors[node] {
            if position[next] > position[node] {
                ranks[next] = ranks[next].max(rank + 1);
            }
        }
    }

    ranks
}
