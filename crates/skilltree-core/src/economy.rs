//! Points economy.
//!
//! The engine keeps exactly one number: the usable balance. Every grant,
//! unlock, lock, cost edit on an unlocked node and refund on delete moves it
//! directly. `spent` and `granted` are derived on demand from the node set,
//! so nothing persisted can drift:
//!
//! ```text
//! usable  = granted - Σ cost(unlocked)
//! spent   = Σ cost(unlocked)
//! granted = usable + spent
//! ```

use serde::{Deserialize, Serialize};

use crate::model::Node;

/// The running usable balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointsEconomy {
    available: i64,
}

impl PointsEconomy {
    /// Start from a usable balance.
    pub fn new(available: i64) -> Self {
        Self { available }
    }

    /// Points that can still be committed.
    pub fn available(&self) -> i64 {
        self.available
    }

    /// Whether `amount` more points can be committed.
    pub fn can_afford(&self, amount: i64) -> bool {
        amount <= self.available
    }

    /// Commit `amount` points (negative amounts release points).
    pub fn spend(&mut self, amount: i64) {
        self.available -= amount;
    }

    /// Return `amount` points to the balance.
    pub fn refund(&mut self, amount: i64) {
        self.available += amount;
    }

    /// Apply a manual grant (negative to take points away).
    pub fn grant(&mut self, delta: i64) {
        self.available += delta;
    }

    /// Change in committed points when a node goes from `before` to `after`.
    ///
    /// Covers every edit rule at once: toggling unlock moves the node's cost,
    /// a cost edit on an unlocked node moves the difference, anything else
    /// moves nothing.
    pub fn edit_delta(before: &Node, after: &Node) -> i64 {
        after.committed_cost() - before.committed_cost()
    }

    /// Derived view over a node set.
    pub fn view(&self, nodes: &[Node]) -> PointsView {
        let spent: i64 = nodes.iter().map(Node::committed_cost).sum();
        PointsView {
            available: self.available,
            spent,
            granted: self.available + spent,
        }
    }
}

/// Economy figures for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointsView {
    /// Usable balance
    pub available: i64,
    /// Points committed to unlocked nodes
    pub spent: i64,
    /// Net of all manual grants
    pub granted: i64,
}
