//! Nodes, edges and the partial updates applied to them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use skilltree_layout::{Point, Size};

/// Opaque unique node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Wrap an id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub cost: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub unlocked: bool,
    /// Top-left corner, owned by the layout engine (or a manual drag)
    #[serde(default)]
    pub position: Point,
    /// Size reported by the rendering surface, `None` until measured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured: Option<Size>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

impl Node {
    /// Create a locked node at the placeholder position.
    pub fn new(id: NodeId, label: impl Into<String>, cost: u32, description: Option<String>) -> Self {
        Self {
            id,
            label: label.into(),
            cost,
            description,
            unlocked: false,
            position: Point::ORIGIN,
            measured: None,
            selected: false,
        }
    }

    /// Size used for layout (zero until measured).
    pub fn size(&self) -> Size {
        self.measured.unwrap_or(Size::ZERO)
    }

    /// Points this node currently commits against the economy.
    pub fn committed_cost(&self) -> i64 {
        if self.unlocked {
            i64::from(self.cost)
        } else {
            0
        }
    }
}

/// A prerequisite edge: `source` must be unlocked before `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

impl Edge {
    /// Create the edge for an ordered pair, with its derived id.
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            id: Self::id_for(&source, &target),
            source,
            target,
            selected: false,
        }
    }

    /// The id an edge between `source` and `target` always carries.
    pub fn id_for(source: &NodeId, target: &NodeId) -> String {
        format!("{}->{}", source, target)
    }

    /// Whether either endpoint is `node`.
    pub fn touches(&self, node: &NodeId) -> bool {
        self.source == *node || self.target == *node
    }
}

/// A proposed edge, as produced by a drag between two handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub source: NodeId,
    pub target: NodeId,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: NodeId(source.into()),
            target: NodeId(target.into()),
        }
    }

    /// The edge this connection would create.
    pub fn to_edge(&self) -> Edge {
        Edge::new(self.source.clone(), self.target.clone())
    }
}

/// Partial node update. Absent fields are left untouched.
///
/// `description` distinguishes "absent" (`None`) from "clear"
/// (`Some(None)`); in JSON that is a missing key versus `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<u32>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked: Option<bool>,
}

impl NodePatch {
    /// A patch that only toggles the unlock state.
    pub fn unlocked(unlocked: bool) -> Self {
        Self {
            unlocked: Some(unlocked),
            ..Self::default()
        }
    }

    /// A patch that only changes the cost.
    pub fn cost(cost: u32) -> Self {
        Self {
            cost: Some(cost),
            ..Self::default()
        }
    }

    /// Merge into `node`.
    pub fn apply_to(&self, node: &mut Node) {
        if let Some(label) = &self.label {
            node.label = label.clone();
        }
        if let Some(cost) = self.cost {
            node.cost = cost;
        }
        if let Some(description) = &self.description {
            node.description = description.clone();
        }
        if let Some(unlocked) = self.unlocked {
            node.unlocked = unlocked;
        }
    }
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}
