//! Durable snapshot of the editor state.
//!
//! Stored as camelCase JSON:
//!
//! ```json
//! { "nodes": [...], "edges": [...], "skillPointsAvailable": 3 }
//! ```
//!
//! `skillPointsAvailable` is the usable balance. Files written by older
//! builds also carry `skillPointsSpent`; on load it is subtracted once and
//! never written back.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Edge, Node};

/// The persisted shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub skill_points_available: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_points_spent: Option<i64>,
}

impl PersistedState {
    /// Usable balance this state seeds the engine with.
    pub fn usable_balance(&self) -> i64 {
        self.skill_points_available - self.skill_points_spent.unwrap_or(0)
    }

    /// Read state from `path`. A missing file is `Ok(None)`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let data = match fs::read(path.as_ref()) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&data)?))
    }

    /// Write state to `path` through a temporary file and a rename, so a
    /// crash never leaves a half-written snapshot behind.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let tmp = path.with_extension("tmp");
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(&tmp, data)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
