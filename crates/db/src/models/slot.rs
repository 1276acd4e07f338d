//! Calendar slot entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use slotswap_core::overlap::{SlotConflict, TimeRange};
use slotswap_core::recurrence::RecurrenceSpec;
use slotswap_core::types::{DbId, Timestamp};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::status::StatusId;

/// A row from the `slots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Slot {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub status_id: StatusId,
    pub recurrence_kind: String,
    pub recurrence_days: Option<Vec<i16>>,
    pub recurrence_end_date: Option<NaiveDate>,
    /// Shared by every row generated from one recurring create request.
    pub series_id: Option<Uuid>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Slot {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }

    /// Summary reported when this slot blocks a create request.
    pub fn to_conflict(&self) -> SlotConflict {
        SlotConflict {
            id: self.id,
            title: self.title.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// DTO for creating one slot or a recurring series.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSlot {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Defaults to 1 (BUSY) if omitted.
    pub status_id: Option<StatusId>,
    #[serde(default)]
    pub recurrence: RecurrenceSpec,
}

/// DTO for updating an existing slot. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSlot {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub status_id: Option<StatusId>,
}

/// Validated, already-expanded rows for one create request.
///
/// Built by the booking engine after recurrence expansion; every range
/// becomes one `slots` row sharing the same owner, title and series.
#[derive(Debug, Clone)]
pub struct NewSlotBatch<'a> {
    pub owner_id: DbId,
    pub title: &'a str,
    pub status_id: StatusId,
    pub recurrence: &'a RecurrenceSpec,
    /// Inclusive last date of the series; `None` for one-off slots.
    pub recurrence_end_date: Option<NaiveDate>,
    pub series_id: Option<Uuid>,
    pub ranges: &'a [TimeRange],
}
