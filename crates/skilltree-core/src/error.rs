//! Error types for the skill tree engine.

use thiserror::Error;

use crate::draft::DraftError;
use crate::guard::UnlockBlocked;
use crate::model::NodeId;
use crate::validator::ConnectionRejection;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in engine operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No node with this id
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Connection refused by the validator
    #[error("Invalid connection: {0}")]
    Connection(#[from] ConnectionRejection),

    /// Unlock state change refused by the guard
    #[error("Unlock blocked: {0}")]
    UnlockBlocked(#[from] UnlockBlocked),

    /// The usable balance cannot cover the change
    #[error("Insufficient points: need {needed}, have {available}")]
    InsufficientPoints { needed: i64, available: i64 },

    /// A point adjustment would overflow the balance
    #[error("Point adjustment {delta} overflows the balance")]
    PointsOverflow { delta: i64 },

    /// Editor input failed validation
    #[error("Invalid input: {0}")]
    InvalidDraft(#[from] DraftError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
