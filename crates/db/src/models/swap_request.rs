//! Swap request entity model and DTOs.

use serde::{Deserialize, Serialize};
use slotswap_core::swap::DurationPreference;
use slotswap_core::types::{DbId, Timestamp};
use sqlx::FromRow;
use validator::Validate;

use crate::models::slot::Slot;
use crate::models::status::StatusId;

/// A row from the `swap_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SwapRequest {
    pub id: DbId,
    pub initiator_id: DbId,
    pub recipient_id: DbId,
    pub initiator_slot_id: DbId,
    pub recipient_slot_id: DbId,
    pub status_id: StatusId,
    pub duration_preference: String,
    pub selected_title: Option<String>,
    pub responded_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SwapRequest {
    /// Parsed duration preference. Unknown values fall back to the default;
    /// the column has a CHECK constraint so this only guards old rows.
    pub fn preference(&self) -> DurationPreference {
        DurationPreference::parse(&self.duration_preference).unwrap_or_default()
    }
}

/// A swap request together with the slots it references.
///
/// A slot is `None` when it has been deleted since the request was made.
#[derive(Debug, Clone, Serialize)]
pub struct SwapRequestWithSlots {
    #[serde(flatten)]
    pub request: SwapRequest,
    pub initiator_slot: Option<Slot>,
    pub recipient_slot: Option<Slot>,
}

/// DTO for proposing a swap.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSwapRequest {
    /// The requester's own slot.
    pub my_slot_id: DbId,
    /// The slot the requester wants in exchange.
    pub their_slot_id: DbId,
    #[serde(default)]
    pub duration_preference: DurationPreference,
}

/// DTO for the recipient's answer to a swap request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RespondToSwap {
    #[serde(alias = "acceptance")]
    pub accept: bool,
    /// Title applied to both slots when accepting.
    #[validate(length(max = 200))]
    pub selected_title: Option<String>,
}
