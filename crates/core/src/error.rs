use crate::overlap::SlotConflict;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The entity does not exist or is not visible to the caller. Missing and
    /// not-owned records produce the same error.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// New slots would overlap slots the owner already has.
    #[error("Time conflict detected with {} existing slot(s)", .0.len())]
    SlotOverlap(Vec<SlotConflict>),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
