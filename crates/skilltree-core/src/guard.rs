//! Unlock state machine guard.
//!
//! A node may flip between locked and unlocked only while none of its
//! prerequisites are locked and none of its dependents are unlocked.
//! Unlocking additionally needs enough usable points to cover the cost.

use thiserror::Error;

use crate::economy::PointsEconomy;
use crate::model::{Edge, Node, NodeId};

/// Why a node's unlock state cannot change right now.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnlockBlocked {
    #[error("prerequisite {prerequisite} is still locked")]
    LockedPrerequisite { prerequisite: NodeId },

    #[error("dependent {dependent} is already unlocked")]
    UnlockedDependent { dependent: NodeId },

    #[error("unlocking costs {cost} but only {available} points are available")]
    InsufficientPoints { cost: i64, available: i64 },
}

/// Topology half of the guard: prerequisites unlocked, dependents locked.
pub fn check_neighbors(node: &NodeId, nodes: &[Node], edges: &[Edge]) -> Result<(), UnlockBlocked> {
    let unlocked = |id: &NodeId| nodes.iter().any(|n| n.id == *id && n.unlocked);

    if let Some(edge) = edges
        .iter()
        .find(|e| e.target == *node && !unlocked(&e.source))
    {
        return Err(UnlockBlocked::LockedPrerequisite {
            prerequisite: edge.source.clone(),
        });
    }

    if let Some(edge) = edges
        .iter()
        .find(|e| e.source == *node && unlocked(&e.target))
    {
        return Err(UnlockBlocked::UnlockedDependent {
            dependent: edge.target.clone(),
        });
    }

    Ok(())
}

/// Full guard for toggling `node`'s unlock state.
pub fn check_toggle(
    node: &Node,
    nodes: &[Node],
    edges: &[Edge],
    economy: &PointsEconomy,
) -> Result<(), UnlockBlocked> {
    check_neighbors(&node.id, nodes, edges)?;

    let cost = i64::from(node.cost);
    if !node.unlocked && !economy.can_afford(cost) {
        return Err(UnlockBlocked::InsufficientPoints {
            cost,
            available: economy.available(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, cost: u32, unlocked: bool) -> Node {
        let mut n = Node::new(NodeId::from(id), id, cost, None);
        n.unlocked = unlocked;
        n
    }

    fn edge(source: &str, target: &str) -> Edge {
        Edge::new(NodeId::from(source), NodeId::from(target))
    }

    #[test]
    fn root_with_points_can_unlock() {
        let nodes = vec![node("a", 2, false)];
        assert_eq!(check_toggle(&nodes[0], &nodes, &[], &PointsEconomy::new(2)), Ok(()));
    }

    #[test]
    fn locked_prerequisite_blocks() {
        let nodes = vec![node("a", 1, false), node("b", 1, false)];
        let edges = vec![edge("a", "b")];
        assert_eq!(
            check_toggle(&nodes[1], &nodes, &edges, &PointsEconomy::new(10)),
            Err(UnlockBlocked::LockedPrerequisite { prerequisite: NodeId::from("a") })
        );
    }

    #[test]
    fn unlocked_dependent_blocks_locking() {
        let nodes = vec![node("a", 1, true), node("b", 1, true)];
        let edges = vec![edge("a", "b")];
        assert_eq!(
            check_toggle(&nodes[0], &nodes, &edges, &PointsEconomy::new(0)),
            Err(UnlockBlocked::UnlockedDependent { dependent: NodeId::from("b") })
        );
        // The leaf can still be locked
        assert_eq!(check_toggle(&nodes[1], &nodes, &edges, &PointsEconomy::new(0)), Ok(()));
    }

    #[test]
    fn insufficient_points_block_unlock_only() {
        let locked = vec![node("a", 5, false)];
        assert_eq!(
            check_toggle(&locked[0], &locked, &[], &PointsEconomy::new(4)),
            Err(UnlockBlocked::InsufficientPoints { cost: 5, available: 4 })
        );

        let unlocked = vec![node("a", 5, true)];
        assert_eq!(check_toggle(&unlocked[0], &unlocked, &[], &PointsEconomy::new(0)), Ok(()));
    }
}
