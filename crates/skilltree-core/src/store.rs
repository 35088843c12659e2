//! The skill tree state container.
//!
//! `SkillTree` owns the nodes, the prerequisite edges, the points economy
//! and the connection diagnostic. Collaborators read the last published
//! [`GraphSnapshot`] and change state only through the operations below.
//! Each operation validates, mutates, re-runs layout where required and
//! then commits exactly once: the revision advances, a fresh snapshot is
//! published and every subscriber sees the same [`Commit`].
//!
//! ```text
//! intent ─→ validate ─→ mutate nodes/edges/economy ─→ layout? ─→ commit
//!                                                                  │
//!                          snapshot() / subscribers ←──────────────┘
//! ```

use std::sync::Arc;

use serde::Serialize;
use skilltree_layout::LayoutConfig;
use tracing::{debug, info, warn};

use crate::changes::{self, EdgeChange, NodeChange};
use crate::economy::{PointsEconomy, PointsView};
use crate::error::{Error, Result};
use crate::events::{Commit, GraphEvent, GraphSnapshot, SubscriptionId};
use crate::guard::{self, UnlockBlocked};
use crate::ids::IdGenerator;
use crate::layout::layout_nodes;
use crate::model::{Connection, Edge, Node, NodeId, NodePatch};
use crate::persist::PersistedState;
use crate::search::{self, HighlightView};
use crate::validator::{self, ConnectionRejection};

/// Configuration for the engine.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Seed for deterministic node ids
    pub seed: Option<u64>,
    /// Layered layout spacing
    pub layout: LayoutConfig,
}

type Observer = Box<dyn FnMut(&Commit) + Send + Sync>;

/// Outcome of a node deletion batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Removal {
    /// Nodes actually deleted, in processing order
    pub removed: Vec<NodeId>,
    /// Reconnection edges that survive the whole batch
    pub created_edges: Vec<Edge>,
    /// Points returned for deleted unlocked nodes
    pub refunded: i64,
}

/// The graph state engine.
pub struct SkillTree {
    config: EngineConfig,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    economy: PointsEconomy,
    error_text: Option<String>,
    ids: IdGenerator,
    revision: u64,
    published: Arc<GraphSnapshot>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl SkillTree {
    /// Create an empty tree with no points.
    pub fn new(config: EngineConfig) -> Self {
        let ids = IdGenerator::new(config.seed);
        Self {
            config,
            nodes: Vec::new(),
            edges: Vec::new(),
            economy: PointsEconomy::default(),
            error_text: None,
            ids,
            revision: 0,
            published: Arc::new(GraphSnapshot::default()),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Seed a tree from persisted state. The state is trusted as-is: it was
    /// produced by this engine, so no validation pass runs.
    pub fn from_persisted(state: PersistedState, config: EngineConfig) -> Self {
        let mut tree = Self::new(config);
        tree.economy = PointsEconomy::new(state.usable_balance());
        tree.nodes = state.nodes;
        tree.edges = state.edges;
        let event = GraphEvent::Loaded {
            nodes: tree.nodes.len(),
            edges: tree.edges.len(),
        };
        info!(nodes = tree.nodes.len(), edges = tree.edges.len(), "skill tree loaded");
        tree.commit(event);
        tree
    }

    /// The durable form of the current state.
    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            skill_points_available: self.economy.available(),
            skill_points_spent: None,
        }
    }

    // --- Reads ---

    /// The last published snapshot.
    pub fn snapshot(&self) -> Arc<GraphSnapshot> {
        Arc::clone(&self.published)
    }

    /// Current revision (number of commits so far).
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Look up a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == *id)
    }

    /// Economy figures.
    pub fn points(&self) -> PointsView {
        self.economy.view(&self.nodes)
    }

    /// Current connection diagnostic.
    pub fn error_text(&self) -> Option<&str> {
        self.error_text.as_deref()
    }

    /// Search highlighting over the published snapshot.
    pub fn highlight(&self, query: &str) -> HighlightView {
        search::highlight(query, &self.published.nodes, &self.published.edges)
    }

    // --- Subscribers ---

    /// Register an observer called after every commit.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&Commit) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    // --- Mutations ---

    /// Create a locked node, lay out the whole tree and commit.
    pub fn add_node(&mut self, label: impl Into<String>, cost: u32, description: Option<String>) -> NodeId {
        let id = self.fresh_id();
        let node = Node::new(id.clone(), label, cost, description);
        debug!(id = %id, label = %node.label, cost, "adding node");

        self.nodes.push(node);
        self.relayout();
        self.commit(GraphEvent::NodeAdded { id: id.clone() });
        id
    }

    /// Validate a proposed edge and record the diagnostic.
    ///
    /// The diagnostic is overwritten on every call: set to the rejection
    /// text, or cleared when the connection is accepted. Malformed requests
    /// (unknown endpoints) leave it untouched.
    pub fn check_connection(&mut self, connection: &Connection) -> std::result::Result<(), ConnectionRejection> {
        let (verdict, changed) = self.judge_connection(connection);
        if changed {
            self.commit_diagnostic();
        }
        verdict
    }

    /// Predicate form of [`check_connection`](Self::check_connection).
    pub fn is_valid_connection(&mut self, connection: &Connection) -> bool {
        self.check_connection(connection).is_ok()
    }

    /// Add a prerequisite edge.
    ///
    /// The edge is validated again here; a rejection leaves the graph
    /// unchanged. Adding an edge that already exists is a no-op.
    pub fn connect(&mut self, connection: &Connection) -> Result<()> {
        let (verdict, changed) = self.judge_connection(connection);
        if let Err(rejection) = verdict {
            if changed {
                self.commit_diagnostic();
            }
            return Err(rejection.into());
        }

        let edge = connection.to_edge();
        if self.edges.iter().any(|e| e.id == edge.id) {
            debug!(id = %edge.id, "edge already present");
            if changed {
                self.commit_diagnostic();
            }
            return Ok(());
        }

        // A cleared diagnostic rides along in the same commit as the edge
        debug!(id = %edge.id, "adding edge");
        let event = GraphEvent::EdgeAdded {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
        };
        self.edges.push(edge);
        self.relayout();
        self.commit(event);
        Ok(())
    }

    /// Fold raw node deltas from the rendering surface. No layout pass runs.
    ///
    /// Removals in the batch go through the same refund and reconnect
    /// routine as [`remove_nodes`](Self::remove_nodes), within this commit.
    pub fn apply_node_changes(&mut self, node_changes: &[NodeChange]) {
        if node_changes.is_empty() {
            return;
        }
        let removals = changes::apply_node_changes(node_changes, &mut self.nodes);
        if !removals.is_empty() {
            self.remove_batch(&removals);
        }
        self.commit(GraphEvent::NodesChanged {
            count: node_changes.len(),
        });
    }

    /// Fold raw edge deltas from the rendering surface. No layout pass runs.
    pub fn apply_edge_changes(&mut self, edge_changes: &[EdgeChange]) {
        if edge_changes.is_empty() {
            return;
        }
        changes::apply_edge_changes(edge_changes, &mut self.edges);
        self.commit(GraphEvent::EdgesChanged {
            count: edge_changes.len(),
        });
    }

    /// Merge `patch` into a node, moving points in the same transition.
    ///
    /// Toggling `unlocked` must pass the unlock guard. Any edit that would
    /// commit more points than are usable is refused. On error nothing
    /// changes.
    pub fn edit_node(&mut self, id: &NodeId, patch: &NodePatch) -> Result<()> {
        let idx = self.index_of(id)?;
        let before = &self.nodes[idx];

        let mut after = before.clone();
        patch.apply_to(&mut after);

        let toggled = after.unlocked != before.unlocked;
        if toggled {
            guard::check_neighbors(id, &self.nodes, &self.edges).map_err(|blocked| {
                warn!(id = %id, %blocked, "unlock toggle refused");
                Error::UnlockBlocked(blocked)
            })?;
        }

        let spent = PointsEconomy::edit_delta(before, &after);
        if spent > 0 && !self.economy.can_afford(spent) {
            let available = self.economy.available();
            warn!(id = %id, needed = spent, available, "edit refused, not enough points");
            return Err(if toggled {
                UnlockBlocked::InsufficientPoints { cost: spent, available }.into()
            } else {
                Error::InsufficientPoints { needed: spent, available }
            });
        }

        debug!(id = %id, spent, unlocked = after.unlocked, "editing node");
        self.economy.spend(spent);
        self.nodes[idx] = after;
        self.commit(GraphEvent::NodeEdited { id: id.clone(), spent });
        Ok(())
    }

    /// Whether the node's unlock toggle is currently allowed.
    pub fn unlock_guard(&self, id: &NodeId) -> Result<()> {
        let node = self.node(id).ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        guard::check_toggle(node, &self.nodes, &self.edges, &self.economy)?;
        Ok(())
    }

    /// Delete nodes as one transition.
    ///
    /// Nodes are processed in the given order. Each one refunds its cost if
    /// unlocked, and every remaining prerequisite of it is wired directly to
    /// every remaining dependent, so removing a middle skill keeps the chain
    /// intact. Unknown and repeated ids are skipped. Layout does not re-run.
    pub fn remove_nodes(&mut self, ids: &[NodeId]) -> Removal {
        let removal = self.remove_batch(ids);
        if !removal.removed.is_empty() {
            self.commit(GraphEvent::NodesRemoved {
                removed: removal.removed.clone(),
                created_edges: removal.created_edges.iter().map(|e| e.id.clone()).collect(),
                refunded: removal.refunded,
            });
        }
        removal
    }

    /// Manual grant (`+1`) or withdrawal (`-1`) of points.
    pub fn adjust_points(&mut self, delta: i64) -> Result<()> {
        let available = self.economy.available();
        match available.checked_add(delta) {
            None => {
                warn!(delta, available, "point adjustment overflows");
                return Err(Error::PointsOverflow { delta });
            }
            Some(balance) if balance < 0 => {
                return Err(Error::InsufficientPoints {
                    needed: delta.saturating_neg(),
                    available,
                });
            }
            Some(_) => {}
        }

        self.economy.grant(delta);
        debug!(delta, available = self.economy.available(), "points adjusted");
        self.commit(GraphEvent::PointsAdjusted {
            delta,
            available: self.economy.available(),
        });
        Ok(())
    }

    // --- Internals ---

    fn index_of(&self, id: &NodeId) -> Result<usize> {
        self.nodes
            .iter()
            .position(|n| n.id == *id)
            .ok_or_else(|| Error::NodeNotFound(id.clone()))
    }

    fn fresh_id(&mut self) -> NodeId {
        loop {
            let id = self.ids.next_id();
            if !self.nodes.iter().any(|n| n.id == id) {
                return id;
            }
        }
    }

    fn relayout(&mut self) {
        self.nodes = layout_nodes(&self.nodes, &self.edges, &self.config.layout);
    }

    /// Run the validator and store the resulting diagnostic without
    /// committing. Returns the verdict and whether the diagnostic changed.
    fn judge_connection(
        &mut self,
        connection: &Connection,
    ) -> (std::result::Result<(), ConnectionRejection>, bool) {
        let verdict = validator::validate_connection(connection, &self.nodes, &self.edges);
        // Outer `None`: malformed request, diagnostic untouched
        let update: Option<Option<&'static str>> = match &verdict {
            Ok(()) => Some(None),
            Err(rejection) => {
                warn!(
                    source = %connection.source,
                    target = %connection.target,
                    %rejection,
                    "connection rejected"
                );
                rejection.diagnostic().map(Some)
            }
        };
        let Some(text) = update else {
            return (verdict, false);
        };

        let text = text.map(str::to_string);
        let changed = self.error_text != text;
        self.error_text = text;
        (verdict, changed)
    }

    fn commit_diagnostic(&mut self) {
        let error_text = self.error_text.clone();
        self.commit(GraphEvent::DiagnosticChanged { error_text });
    }

    /// Delete against a shrinking working copy; no commit.
    fn remove_batch(&mut self, ids: &[NodeId]) -> Removal {
        let mut remaining = self.nodes.clone();
        let mut edges = self.edges.clone();
        let mut removal = Removal::default();
        let mut created: Vec<String> = Vec::new();

        for id in ids {
            let Some(idx) = remaining.iter().position(|n| n.id == *id) else {
                continue;
            };
            let node = remaining.remove(idx);
            let present = |n: &NodeId| remaining.iter().any(|r| r.id == *n);

            let incomers: Vec<NodeId> = edges
                .iter()
                .filter(|e| e.target == *id && present(&e.source))
                .map(|e| e.source.clone())
                .collect();
            let outgoers: Vec<NodeId> = edges
                .iter()
                .filter(|e| e.source == *id && present(&e.target))
                .map(|e| e.target.clone())
                .collect();

            edges.retain(|e| !e.touches(id));

            for source in &incomers {
                for target in &outgoers {
                    let bridge = Edge::new(source.clone(), target.clone());
                    if !edges.iter().any(|e| e.id == bridge.id) {
                        debug!(id = %bridge.id, removed = %id, "reconnecting");
                        created.push(bridge.id.clone());
                        edges.push(bridge);
                    }
                }
            }

            removal.refunded += node.committed_cost();
            removal.removed.push(node.id);
        }

        removal.created_edges = edges
            .iter()
            .filter(|e| created.contains(&e.id))
            .cloned()
            .collect();

        self.economy.refund(removal.refunded);
        self.nodes = remaining;
        self.edges = edges;

        debug!(
            removed = removal.removed.len(),
            created = removal.created_edges.len(),
            refunded = removal.refunded,
            "nodes removed"
        );
        removal
    }

    fn commit(&mut self, event: GraphEvent) {
        self.revision += 1;
        self.published = Arc::new(GraphSnapshot {
            revision: self.revision,
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            points: self.economy.view(&self.nodes),
            error_text: self.error_text.clone(),
        });

        let commit = Commit {
            revision: self.revision,
            event,
            snapshot: Arc::clone(&self.published),
        };
        for (_, observer) in &mut self.observers {
            observer(&commit);
        }
    }
}

impl Default for SkillTree {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for SkillTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillTree")
            .field("revision", &self.revision)
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("available", &self.economy.available())
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::validator::{CYCLE_MESSAGE, UNLOCKED_TARGET_MESSAGE};
    use skilltree_layout::{Point, Size};

    fn tree() -> SkillTree {
        SkillTree::new(EngineConfig {
            seed: Some(42),
            ..EngineConfig::default()
        })
    }

    fn connect(tree: &mut SkillTree, source: &NodeId, target: &NodeId) {
        tree.connect(&Connection {
            source: source.clone(),
            target: target.clone(),
        })
        .unwrap();
    }

    fn edge_ids(tree: &SkillTree) -> Vec<String> {
        let mut ids: Vec<String> = tree.edges().iter().map(|e| e.id.clone()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn tree_starts_empty() {
        let tree = tree();
        assert!(tree.nodes().is_empty());
        assert_eq!(tree.revision(), 0);
        assert_eq!(tree.points(), PointsView::default());
    }

    #[test]
    fn add_node_is_locked_and_laid_out() {
        let mut tree = tree();
        let a = tree.add_node("Alpha", 3, Some("first".into()));
        let node = tree.node(&a).unwrap();
        assert!(!node.unlocked);
        assert_eq!(node.cost, 3);
        assert_eq!(node.description.as_deref(), Some("first"));
        assert_eq!(tree.revision(), 1);
        assert_eq!(tree.snapshot().nodes.len(), 1);
    }

    #[test]
    fn connect_relayouts_prerequisite_above() {
        let mut tree = tree();
        let a = tree.add_node("A", 1, None);
        let b = tree.add_node("B", 1, None);
        tree.apply_node_changes(&[
            NodeChange::Dimensions { id: a.clone(), dimensions: Size::new(100.0, 40.0) },
            NodeChange::Dimensions { id: b.clone(), dimensions: Size::new(100.0, 40.0) },
        ]);
        connect(&mut tree, &a, &b);

        let pa = tree.node(&a).unwrap().position;
        let pb = tree.node(&b).unwrap().position;
        assert!(pa.y < pb.y);
        assert_eq!(pa.x, pb.x);
    }

    #[test]
    fn duplicate_connect_is_noop() {
        let mut tree = tree();
        let a = tree.add_node("A", 1, None);
        let b = tree.add_node("B", 1, None);
        connect(&mut tree, &a, &b);
        let revision = tree.revision();
        connect(&mut tree, &a, &b);
        assert_eq!(tree.edges().len(), 1);
        assert_eq!(tree.revision(), revision);
    }

    #[test]
    fn self_loop_rejected_with_diagnostic() {
        let mut tree = tree();
        let a = tree.add_node("A", 1, None);
        let err = tree.connect(&Connection { source: a.clone(), target: a.clone() });
        assert!(matches!(err, Err(Error::Connection(ConnectionRejection::SelfLoop))));
        assert!(tree.edges().is_empty());
        assert_eq!(tree.error_text(), Some(CYCLE_MESSAGE));
    }

    #[test]
    fn cycle_rejected_and_diagnostic_cleared_on_success() {
        let mut tree = tree();
        let a = tree.add_node("A", 1, None);
        let b = tree.add_node("B", 1, None);
        let c = tree.add_node("C", 1, None);
        connect(&mut tree, &a, &b);
        connect(&mut tree, &b, &c);

        assert!(!tree.is_valid_connection(&Connection { source: c.clone(), target: a.clone() }));
        assert_eq!(tree.error_text(), Some(CYCLE_MESSAGE));
        assert_eq!(tree.snapshot().error_text.as_deref(), Some(CYCLE_MESSAGE));
        assert_eq!(tree.edges().len(), 2);

        assert!(tree.is_valid_connection(&Connection { source: a.clone(), target: c.clone() }));
        assert_eq!(tree.error_text(), None);
    }

    #[test]
    fn unlocked_target_rejected() {
        let mut tree = tree();
        let a = tree.add_node("A", 1, None);
        let b = tree.add_node("B", 1, None);
        tree.adjust_points(1).unwrap();
        tree.edit_node(&b, &NodePatch::unlocked(true)).unwrap();

        let err = tree.connect(&Connection { source: a, target: b });
        assert!(matches!(err, Err(Error::Connection(ConnectionRejection::TargetUnlocked))));
        assert_eq!(tree.error_text(), Some(UNLOCKED_TARGET_MESSAGE));
        assert!(tree.edges().is_empty());
    }

    #[test]
    fn unknown_target_leaves_diagnostic() {
        let mut tree = tree();
        let a = tree.add_node("A", 1, None);
        let b = tree.add_node("B", 1, None);
        connect(&mut tree, &a, &b);
        assert!(!tree.is_valid_connection(&Connection { source: b.clone(), target: a.clone() }));

        assert!(!tree.is_valid_connection(&Connection::new(a.as_str(), "ghost")));
        assert_eq!(tree.error_text(), Some(CYCLE_MESSAGE));
    }

    #[test]
    fn grant_unlock_lock_balance() {
        let mut tree = tree();
        tree.adjust_points(5).unwrap();
        let a = tree.add_node("A", 3, None);

        tree.edit_node(&a, &NodePatch::unlocked(true)).unwrap();
        assert_eq!(tree.points(), PointsView { available: 2, spent: 3, granted: 5 });

        tree.edit_node(&a, &NodePatch::unlocked(false)).unwrap();
        assert_eq!(tree.points(), PointsView { available: 5, spent: 0, granted: 5 });
    }

    #[test]
    fn unlock_without_points_refused() {
        let mut tree = tree();
        tree.adjust_points(2).unwrap();
        let a = tree.add_node("A", 3, None);

        let err = tree.edit_node(&a, &NodePatch::unlocked(true)).unwrap_err();
        assert!(matches!(
            err,
            Error::UnlockBlocked(UnlockBlocked::InsufficientPoints { cost: 3, available: 2 })
        ));
        assert!(!tree.node(&a).unwrap().unlocked);
        assert_eq!(tree.points().available, 2);
        assert!(tree.unlock_guard(&a).is_err());
    }

    #[test]
    fn unlock_requires_prerequisites() {
        let mut tree = tree();
        tree.adjust_points(10).unwrap();
        let a = tree.add_node("A", 1, None);
        let b = tree.add_node("B", 1, None);
        connect(&mut tree, &a, &b);

        assert!(matches!(
            tree.edit_node(&b, &NodePatch::unlocked(true)),
            Err(Error::UnlockBlocked(UnlockBlocked::LockedPrerequisite { .. }))
        ));

        tree.edit_node(&a, &NodePatch::unlocked(true)).unwrap();
        tree.edit_node(&b, &NodePatch::unlocked(true)).unwrap();

        // Now a cannot be locked while b is unlocked
        assert!(matches!(
            tree.edit_node(&a, &NodePatch::unlocked(false)),
            Err(Error::UnlockBlocked(UnlockBlocked::UnlockedDependent { .. }))
        ));
        assert_eq!(tree.points().spent, 2);
    }

    #[test]
    fn cost_edit_on_unlocked_tracks_delta() {
        let mut tree = tree();
        tree.adjust_points(10).unwrap();
        let a = tree.add_node("A", 3, None);
        tree.edit_node(&a, &NodePatch::unlocked(true)).unwrap();

        tree.edit_node(&a, &NodePatch::cost(5)).unwrap();
        assert_eq!(tree.points(), PointsView { available: 5, spent: 5, granted: 10 });

        tree.edit_node(&a, &NodePatch::cost(1)).unwrap();
        assert_eq!(tree.points(), PointsView { available: 9, spent: 1, granted: 10 });
    }

    #[test]
    fn cost_edit_beyond_balance_refused() {
        let mut tree = tree();
        tree.adjust_points(3).unwrap();
        let a = tree.add_node("A", 3, None);
        tree.edit_node(&a, &NodePatch::unlocked(true)).unwrap();

        assert!(matches!(
            tree.edit_node(&a, &NodePatch::cost(4)),
            Err(Error::InsufficientPoints { needed: 1, available: 0 })
        ));
        assert_eq!(tree.node(&a).unwrap().cost, 3);
    }

    #[test]
    fn label_edit_on_locked_is_free() {
        let mut tree = tree();
        tree.adjust_points(1).unwrap();
        let a = tree.add_node("A", 3, None);
        tree.edit_node(
            &a,
            &NodePatch { label: Some("Renamed".into()), cost: Some(7), ..NodePatch::default() },
        )
        .unwrap();
        assert_eq!(tree.node(&a).unwrap().label, "Renamed");
        assert_eq!(tree.points().available, 1);
    }

    #[test]
    fn edit_unknown_node() {
        let mut tree = tree();
        assert!(matches!(
            tree.edit_node(&NodeId::from("ghost"), &NodePatch::unlocked(true)),
            Err(Error::NodeNotFound(_))
        ));
    }

    #[test]
    fn extreme_adjustments_are_refused() {
        let mut tree = tree();
        tree.adjust_points(1).unwrap();
        let revision = tree.revision();

        assert!(matches!(
            tree.adjust_points(i64::MAX),
            Err(Error::PointsOverflow { delta: i64::MAX })
        ));
        assert!(matches!(
            tree.adjust_points(i64::MIN),
            Err(Error::InsufficientPoints { needed: i64::MAX, available: 1 })
        ));
        assert_eq!(tree.points().available, 1);
        assert_eq!(tree.revision(), revision);

        let mut empty = SkillTree::default();
        assert!(empty.adjust_points(i64::MIN).is_err());
        assert!(empty.adjust_points(i64::MAX).is_ok());
        assert_eq!(empty.points().available, i64::MAX);
    }

    #[test]
    fn connect_after_rejection_commits_once() {
        let mut tree = tree();
        let a = tree.add_node("A", 1, None);
        let b = tree.add_node("B", 1, None);
        assert!(tree.connect(&Connection { source: a.clone(), target: a.clone() }).is_err());
        assert_eq!(tree.error_text(), Some(CYCLE_MESSAGE));

        let seen: Arc<Mutex<Vec<GraphEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        tree.subscribe(move |commit| sink.lock().unwrap().push(commit.event.clone()));

        let revision = tree.revision();
        connect(&mut tree, &a, &b);
        assert_eq!(tree.revision(), revision + 1);

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], GraphEvent::EdgeAdded { .. }));

        let snapshot = tree.snapshot();
        assert_eq!(snapshot.edges.len(), 1);
        assert!(snapshot.error_text.is_none());
    }

    #[test]
    fn rejected_connect_publishes_diagnostic() {
        let mut tree = tree();
        let a = tree.add_node("A", 1, None);
        let revision = tree.revision();

        assert!(tree.connect(&Connection { source: a.clone(), target: a.clone() }).is_err());
        assert_eq!(tree.revision(), revision + 1);
        assert_eq!(tree.snapshot().error_text.as_deref(), Some(CYCLE_MESSAGE));

        // Same rejection again leaves the diagnostic as is
        assert!(tree.connect(&Connection { source: a.clone(), target: a }).is_err());
        assert_eq!(tree.revision(), revision + 1);
    }

    #[test]
    fn withdraw_below_zero_refused() {
        let mut tree = tree();
        tree.adjust_points(1).unwrap();
        tree.adjust_points(-1).unwrap();
        assert!(matches!(tree.adjust_points(-1), Err(Error::InsufficientPoints { .. })));
        assert_eq!(tree.points().available, 0);
    }

    #[test]
    fn delete_middle_reconnects_and_refunds() {
        let mut tree = tree();
        tree.adjust_points(10).unwrap();
        let a = tree.add_node("A", 1, None);
        let b = tree.add_node("B", 4, None);
        let c = tree.add_node("C", 1, None);
        connect(&mut tree, &a, &b);
        connect(&mut tree, &b, &c);
        tree.edit_node(&a, &NodePatch::unlocked(true)).unwrap();
        tree.edit_node(&b, &NodePatch::unlocked(true)).unwrap();
        assert_eq!(tree.points().available, 5);

        let removal = tree.remove_nodes(&[b.clone()]);
        assert_eq!(removal.removed, vec![b.clone()]);
        assert_eq!(removal.refunded, 4);
        assert_eq!(edge_ids(&tree), vec![Edge::id_for(&a, &c)]);
        assert_eq!(tree.points().available, 9);
        assert!(tree.node(&b).is_none());
    }

    #[test]
    fn delete_hub_cross_connects() {
        let mut tree = tree();
        let x = tree.add_node("X", 1, None);
        let y = tree.add_node("Y", 1, None);
        let z = tree.add_node("Z", 1, None);
        let p = tree.add_node("P", 1, None);
        let q = tree.add_node("Q", 1, None);
        for (s, t) in [(&x, &z), (&y, &z), (&z, &p), (&z, &q)] {
            connect(&mut tree, s, t);
        }

        let removal = tree.remove_nodes(&[z.clone()]);
        assert_eq!(removal.created_edges.len(), 4);

        let mut expected = vec![
            Edge::id_for(&x, &p),
            Edge::id_for(&x, &q),
            Edge::id_for(&y, &p),
            Edge::id_for(&y, &q),
        ];
        expected.sort();
        assert_eq!(edge_ids(&tree), expected);
        assert!(tree.edges().iter().all(|e| !e.touches(&z)));
    }

    #[test]
    fn chained_batch_delete_uses_working_copy() {
        let mut tree = tree();
        let a = tree.add_node("A", 1, None);
        let b = tree.add_node("B", 1, None);
        let c = tree.add_node("C", 1, None);
        let d = tree.add_node("D", 1, None);
        connect(&mut tree, &a, &b);
        connect(&mut tree, &b, &c);
        connect(&mut tree, &c, &d);

        let revision = tree.revision();
        let removal = tree.remove_nodes(&[b.clone(), c.clone()]);
        assert_eq!(tree.revision(), revision + 1);
        assert_eq!(edge_ids(&tree), vec![Edge::id_for(&a, &d)]);
        // a->c was created then consumed within the batch
        assert_eq!(removal.created_edges.len(), 1);
    }

    #[test]
    fn reconnect_does_not_duplicate_existing_edge() {
        let mut tree = tree();
        let a = tree.add_node("A", 1, None);
        let b = tree.add_node("B", 1, None);
        let c = tree.add_node("C", 1, None);
        connect(&mut tree, &a, &b);
        connect(&mut tree, &b, &c);
        connect(&mut tree, &a, &c);

        let removal = tree.remove_nodes(&[b]);
        assert!(removal.created_edges.is_empty());
        assert_eq!(edge_ids(&tree), vec![Edge::id_for(&a, &c)]);
    }

    #[test]
    fn delete_unknown_is_noop() {
        let mut tree = tree();
        tree.add_node("A", 1, None);
        let revision = tree.revision();
        let removal = tree.remove_nodes(&[NodeId::from("ghost")]);
        assert!(removal.removed.is_empty());
        assert_eq!(tree.revision(), revision);
    }

    #[test]
    fn drag_is_not_overridden() {
        let mut tree = tree();
        let a = tree.add_node("A", 1, None);
        tree.apply_node_changes(&[NodeChange::Position {
            id: a.clone(),
            position: Point::new(300.0, 120.0),
        }]);
        assert_eq!(tree.node(&a).unwrap().position, Point::new(300.0, 120.0));
    }

    #[test]
    fn remove_change_refunds_and_reconnects() {
        let mut tree = tree();
        tree.adjust_points(2).unwrap();
        let a = tree.add_node("A", 2, None);
        let b = tree.add_node("B", 1, None);
        connect(&mut tree, &a, &b);
        tree.edit_node(&a, &NodePatch::unlocked(true)).unwrap();

        tree.apply_node_changes(&[NodeChange::Remove { id: a.clone() }]);
        assert!(tree.node(&a).is_none());
        assert!(tree.edges().is_empty());
        assert_eq!(tree.points().available, 2);
    }

    #[test]
    fn edge_remove_change() {
        let mut tree = tree();
        let a = tree.add_node("A", 1, None);
        let b = tree.add_node("B", 1, None);
        connect(&mut tree, &a, &b);
        tree.apply_edge_changes(&[EdgeChange::Remove { id: Edge::id_for(&a, &b) }]);
        assert!(tree.edges().is_empty());
    }

    #[test]
    fn subscribers_see_every_commit() {
        let mut tree = tree();
        let seen: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = tree.subscribe(move |commit| {
            sink.lock().unwrap().push(commit.revision);
        });

        tree.add_node("A", 1, None);
        tree.adjust_points(1).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);

        assert!(tree.unsubscribe(sub));
        tree.adjust_points(1).unwrap();
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn published_snapshot_is_immutable() {
        let mut tree = tree();
        tree.add_node("A", 1, None);
        let before = tree.snapshot();
        tree.add_node("B", 1, None);
        assert_eq!(before.nodes.len(), 1);
        assert_eq!(tree.snapshot().nodes.len(), 2);
    }

    #[test]
    fn highlight_reads_snapshot() {
        let mut tree = tree();
        let a = tree.add_node("Alpha", 1, None);
        let b = tree.add_node("Beta", 1, None);
        connect(&mut tree, &a, &b);

        let view = tree.highlight("alp");
        assert_eq!(view.highlight_of(&a), Some(search::Highlight::Matched));
        assert_eq!(view.highlight_of(&b), Some(search::Highlight::Reachable));
    }

    #[test]
    fn persisted_round_trip() {
        let mut tree = tree();
        tree.adjust_points(4).unwrap();
        let a = tree.add_node("A", 3, None);
        tree.edit_node(&a, &NodePatch::unlocked(true)).unwrap();

        let state = tree.to_persisted();
        assert_eq!(state.skill_points_available, 1);

        let restored = SkillTree::from_persisted(state, EngineConfig::default());
        assert_eq!(restored.points(), PointsView { available: 1, spent: 3, granted: 4 });
        assert!(restored.node(&a).unwrap().unlocked);
        assert_eq!(restored.revision(), 1);
    }
}
