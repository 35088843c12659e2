//! Skill Tree Core
//!
//! Graph state engine behind the skill tree editor. Skills are nodes with a
//! cost and an unlock flag; directed edges say which skill must be unlocked
//! before another. The graph is kept acyclic at all times.
//!
//! # Components
//!
//! - **Validator**: decides whether a proposed prerequisite edge may exist
//! - **Unlock guard**: a skill toggles only when its prerequisites are
//!   unlocked and its dependents are locked
//! - **Economy**: a single usable balance moved by grants, unlocks, cost
//!   edits and refunds
//! - **Layout**: top-to-bottom layered positions, re-run on structural edits
//! - **Search**: label match plus undirected reachability for highlighting
//!
//! [`SkillTree`] ties these together. Every operation ends in one commit that
//! publishes an immutable [`GraphSnapshot`].
//!
//! ```
//! use skilltree_core::{Connection, EngineConfig, NodePatch, SkillTree};
//!
//! let mut tree = SkillTree::new(EngineConfig::default());
//! let basics = tree.add_node("Basics", 1, None);
//! let advanced = tree.add_node("Advanced", 2, None);
//! tree.connect(&Connection { source: basics.clone(), target: advanced.clone() }).unwrap();
//!
//! tree.adjust_points(3).unwrap();
//! tree.edit_node(&basics, &NodePatch::unlocked(true)).unwrap();
//! tree.edit_node(&advanced, &NodePatch::unlocked(true)).unwrap();
//! assert_eq!(tree.points().available, 0);
//! ```

mod changes;
mod draft;
mod economy;
mod error;
mod events;
mod guard;
mod ids;
mod layout;
mod model;
mod persist;
mod search;
mod store;
mod validator;

pub use changes::{apply_edge_changes, apply_node_changes, EdgeChange, NodeChange};
pub use draft::{DraftError, NodeDraft, ValidDraft};
pub use economy::{PointsEconomy, PointsView};
pub use error::{Error, Result};
pub use events::{Commit, GraphEvent, GraphSnapshot, SubscriptionId};
pub use guard::{check_neighbors, check_toggle, UnlockBlocked};
pub use ids::{IdGenerator, ID_LENGTH};
pub use layout::layout_nodes;
pub use model::{Connection, Edge, Node, NodeId, NodePatch};
pub use persist::PersistedState;
pub use search::{
    highlight, matching_nodes, reachability_closure, DisplayEdge, DisplayNode, Highlight,
    HighlightView,
};
pub use store::{EngineConfig, Removal, SkillTree};
pub use validator::{
    validate_connection, would_create_cycle, ConnectionRejection, CYCLE_MESSAGE,
    UNLOCKED_TARGET_MESSAGE,
};

pub use skilltree_layout::{LayoutConfig, Point, Size};
