//! Slot creation, update and deletion for a single owner.

use slotswap_core::error::CoreError;
use slotswap_core::lifecycle::slot_status;
use slotswap_core::overlap::{find_self_overlap, TimeRange};
use slotswap_core::recurrence::{self, RecurrenceKind, MAX_EXPANDED_SLOTS};
use slotswap_core::types::DbId;
use slotswap_db::models::slot::{CreateSlot, NewSlotBatch, Slot, UpdateSlot};
use slotswap_db::models::status::SlotStatus;
use slotswap_db::repositories::SlotRepo;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::engine::WriteScope;
use crate::error::{AppError, AppResult};

fn slot_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Slot", id })
}

/// Owner-scoped slot store.
pub struct SlotCalendar {
    pool: PgPool,
    supports_atomic_multi_write: bool,
}

impl SlotCalendar {
    pub fn new(pool: PgPool, supports_atomic_multi_write: bool) -> Self {
        Self {
            pool,
            supports_atomic_multi_write,
        }
    }

    /// Create one slot, or a whole recurring series, for `owner_id`.
    ///
    /// The expanded batch must not overlap itself or any existing slot of
    /// the owner; otherwise nothing is inserted. Returns the created rows
    /// ordered by start time.
    pub async fn create(&self, owner_id: DbId, input: &CreateSlot) -> AppResult<Vec<Slot>> {
        input.validate()?;

        let status_id = input.status_id.unwrap_or(SlotStatus::Busy.id());
        slot_status::validate_initial(status_id).map_err(CoreError::Validation)?;

        let range = TimeRange::new(input.start_time, input.end_time);
        let ranges = recurrence::expand(&range, &input.recurrence, MAX_EXPANDED_SLOTS)?;

        if let Some((a, b)) = find_self_overlap(&ranges) {
            return Err(CoreError::Conflict(format!(
                "Recurring occurrences overlap each other ({} and {})",
                ranges[a].start.to_rfc3339(),
                ranges[b].start.to_rfc3339()
            ))
            .into());
        }

        let (series_id, recurrence_end_date) = match input.recurrence.kind {
            RecurrenceKind::Once => (None, None),
            _ => (
                Some(Uuid::new_v4()),
                Some(input.recurrence.effective_end_date(&range)),
            ),
        };

        let batch = NewSlotBatch {
            owner_id,
            title: &input.title,
            status_id,
            recurrence: &input.recurrence,
            recurrence_end_date,
            series_id,
            ranges: &ranges,
        };

        let mut scope = WriteScope::open(&self.pool, self.supports_atomic_multi_write).await?;
        if scope.is_atomic() {
            // Two concurrent creates for the same owner would otherwise both
            // pass the overlap check.
            SlotRepo::lock_owner(scope.conn(), owner_id).await?;
        }
        let slots = insert_without_overlap(scope.conn(), &batch).await?;
        scope.finish().await?;

        tracing::info!(
            owner_id,
            count = slots.len(),
            recurrence = input.recurrence.kind.as_str(),
            series_id = ?series_id,
            "Slots created",
        );
        Ok(slots)
    }

    /// All slots of the owner, earliest first.
    pub async fn list(&self, owner_id: DbId) -> AppResult<Vec<Slot>> {
        Ok(SlotRepo::list_by_owner(&self.pool, owner_id).await?)
    }

    /// One slot of the owner. Missing and foreign slots are both not found.
    pub async fn get(&self, owner_id: DbId, id: DbId) -> AppResult<Slot> {
        let mut conn = self.pool.acquire().await?;
        SlotRepo::find_owned(&mut *conn, owner_id, id)
            .await?
            .ok_or_else(|| slot_not_found(id))
    }

    /// Apply the provided fields to an owned slot.
    pub async fn update(&self, owner_id: DbId, id: DbId, input: &UpdateSlot) -> AppResult<Slot> {
        input.validate()?;
        if let Some(status_id) = input.status_id {
            slot_status::validate(status_id).map_err(CoreError::Validation)?;
        }

        let mut scope = WriteScope::open(&self.pool, self.supports_atomic_multi_write).await?;
        let current = SlotRepo::find_owned(scope.conn(), owner_id, id)
            .await?
            .ok_or_else(|| slot_not_found(id))?;

        if input.start_time.is_some() || input.end_time.is_some() {
            let next = TimeRange::new(
                input.start_time.unwrap_or(current.start_time),
                input.end_time.unwrap_or(current.end_time),
            );
            recurrence::validate_range(&next)?;
        }

        let slot = SlotRepo::update_owned(scope.conn(), owner_id, id, input)
            .await?
            .ok_or_else(|| slot_not_found(id))?;
        scope.finish().await?;

        tracing::info!(owner_id, slot_id = id, status_id = slot.status_id, "Slot updated");
        Ok(slot)
    }

    /// Hard-delete an owned slot. Swap requests pointing at it are kept.
    pub async fn delete(&self, owner_id: DbId, id: DbId) -> AppResult<()> {
        if !SlotRepo::delete_owned(&self.pool, owner_id, id).await? {
            return Err(slot_not_found(id));
        }
        tracing::info!(owner_id, slot_id = id, "Slot deleted");
        Ok(())
    }
}

/// Reject the batch if any row overlaps an existing slot of the owner,
/// otherwise insert it in one statement.
async fn insert_without_overlap(
    conn: &mut PgConnection,
    batch: &NewSlotBatch<'_>,
) -> AppResult<Vec<Slot>> {
    let existing = SlotRepo::find_conflicts(&mut *conn, batch.owner_id, batch.ranges).await?;
    if !existing.is_empty() {
        tracing::debug!(
            owner_id = batch.owner_id,
            conflicts = existing.len(),
            "Slot creation blocked by overlap",
        );
        return Err(CoreError::SlotOverlap(existing.iter().map(Slot::to_conflict).collect()).into());
    }
    Ok(SlotRepo::insert_batch(conn, batch).await?)
}
