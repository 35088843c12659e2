//! Node editor input.
//!
//! The editor dialog collects free-form text and a number. It only submits
//! once the trimmed label is non-empty and the cost is positive; this module
//! is that check, shared by every surface that creates or edits nodes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::NodePatch;

/// Raw editor input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDraft {
    pub label: String,
    pub cost: i64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Editor input that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    pub label: String,
    pub cost: u32,
    pub description: Option<String>,
}

/// Why a draft cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("label must not be empty")]
    EmptyLabel,

    #[error("cost must be positive, got {0}")]
    NonPositiveCost(i64),

    #[error("cost {0} is too large")]
    CostTooLarge(i64),
}

impl NodeDraft {
    pub fn new(label: impl Into<String>, cost: i64, description: Option<String>) -> Self {
        Self {
            label: label.into(),
            cost,
            description,
        }
    }

    /// Trim text fields and check the submit conditions.
    pub fn validate(&self) -> Result<ValidDraft, DraftError> {
        let label = self.label.trim();
        if label.is_empty() {
            return Err(DraftError::EmptyLabel);
        }
        if self.cost <= 0 {
            return Err(DraftError::NonPositiveCost(self.cost));
        }
        let cost = u32::try_from(self.cost).map_err(|_| DraftError::CostTooLarge(self.cost))?;

        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(ValidDraft {
            label: label.to_string(),
            cost,
            description,
        })
    }
}

impl ValidDraft {
    /// The edit produced by submitting this draft for an existing node.
    /// An empty description clears the stored one.
    pub fn into_patch(self) -> NodePatch {
        NodePatch {
            label: Some(self.label),
            cost: Some(self.cost),
            description: Some(self.description),
            unlocked: None,
        }
    }
}
