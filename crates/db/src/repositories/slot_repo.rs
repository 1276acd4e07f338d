//! Repository for the `slots` table.
//!
//! Reads that only serve listings take `&PgPool`. Everything the booking
//! engine composes into multi-statement operations takes `&mut PgConnection`
//! so the caller decides whether the statements share a transaction.

use sqlx::{PgConnection, PgPool};
use slotswap_core::overlap::TimeRange;
use slotswap_core::types::{DbId, Timestamp};

use crate::models::slot::{NewSlotBatch, Slot, UpdateSlot};
use crate::models::status::SlotStatus;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, title, start_time, end_time, status_id, \
    recurrence_kind, recurrence_days, recurrence_end_date, series_id, created_at, updated_at";

/// Provides CRUD and workflow operations for calendar slots.
pub struct SlotRepo;

impl SlotRepo {
    /// Serialise slot creation for one owner until the surrounding
    /// transaction ends. Only meaningful inside a transaction.
    pub async fn lock_owner(conn: &mut PgConnection, owner_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(owner_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Existing slots of `owner_id` that overlap any of `ranges`.
    ///
    /// Uses the same three predicates as
    /// [`TimeRange::conflicts_with`](slotswap_core::overlap::TimeRange::conflicts_with):
    /// contains-start, contains-end, fully-spans.
    pub async fn find_conflicts(
        conn: &mut PgConnection,
        owner_id: DbId,
        ranges: &[TimeRange],
    ) -> Result<Vec<Slot>, sqlx::Error> {
        let (starts, ends) = split_ranges(ranges);
        let query = format!(
            "SELECT {COLUMNS} FROM slots \
             WHERE owner_id = $1 \
               AND EXISTS ( \
                   SELECT 1 FROM UNNEST($2::timestamptz[], $3::timestamptz[]) AS r(new_start, new_end) \
                   WHERE (start_time >= new_start AND start_time < new_end) \
                      OR (end_time > new_start AND end_time <= new_end) \
                      OR (start_time <= new_start AND end_time >= new_end) \
               ) \
             ORDER BY start_time"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(owner_id)
            .bind(starts)
            .bind(ends)
            .fetch_all(conn)
            .await
    }

    /// Insert every range of the batch in one statement, returning the rows
    /// ordered by start time.
    pub async fn insert_batch(
        conn: &mut PgConnection,
        batch: &NewSlotBatch<'_>,
    ) -> Result<Vec<Slot>, sqlx::Error> {
        let (starts, ends) = split_ranges(batch.ranges);
        let days: Option<Vec<i16>> = if batch.recurrence.custom_days.is_empty() {
            None
        } else {
            Some(batch.recurrence.custom_days.iter().map(|&d| d as i16).collect())
        };
        let query = format!(
            "INSERT INTO slots \
                (owner_id, title, start_time, end_time, status_id, \
                 recurrence_kind, recurrence_days, recurrence_end_date, series_id) \
             SELECT $1, $2, r.new_start, r.new_end, $5, $6, $7, $8, $9 \
             FROM UNNEST($3::timestamptz[], $4::timestamptz[]) AS r(new_start, new_end) \
             RETURNING {COLUMNS}"
        );
        let mut slots = sqlx::query_as::<_, Slot>(&query)
            .bind(batch.owner_id)
            .bind(batch.title)
            .bind(starts)
            .bind(ends)
            .bind(batch.status_id)
            .bind(batch.recurrence.kind.as_str())
            .bind(days)
            .bind(batch.recurrence_end_date)
            .bind(batch.series_id)
            .fetch_all(conn)
            .await?;
        slots.sort_by_key(|s| (s.start_time, s.id));
        Ok(slots)
    }

    /// List all slots of an owner ordered by start time ascending.
    pub async fn list_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Slot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM slots WHERE owner_id = $1 ORDER BY start_time ASC, id ASC"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// List SWAPPABLE slots owned by anyone except `excluded_owner_id`.
    pub async fn list_swappable(
        pool: &PgPool,
        excluded_owner_id: DbId,
    ) -> Result<Vec<Slot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM slots \
             WHERE status_id = $1 AND owner_id <> $2 \
             ORDER BY start_time ASC, id ASC"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(SlotStatus::Swappable.id())
            .bind(excluded_owner_id)
            .fetch_all(pool)
            .await
    }

    /// Find a slot by ID regardless of owner.
    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Slot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM slots WHERE id = $1");
        sqlx::query_as::<_, Slot>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Find a slot by ID, only if it belongs to `owner_id`.
    pub async fn find_owned(
        conn: &mut PgConnection,
        owner_id: DbId,
        id: DbId,
    ) -> Result<Option<Slot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM slots WHERE id = $1 AND owner_id = $2");
        sqlx::query_as::<_, Slot>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(conn)
            .await
    }

    /// Fetch several slots by ID. Missing IDs are simply absent from the result.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Slot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM slots WHERE id = ANY($1)");
        sqlx::query_as::<_, Slot>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Update an owned slot. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` belongs to `owner_id`.
    pub async fn update_owned(
        conn: &mut PgConnection,
        owner_id: DbId,
        id: DbId,
        input: &UpdateSlot,
    ) -> Result<Option<Slot>, sqlx::Error> {
        let query = format!(
            "UPDATE slots SET
                title = COALESCE($3, title),
                start_time = COALESCE($4, start_time),
                end_time = COALESCE($5, end_time),
                status_id = COALESCE($6, status_id)
             WHERE id = $1 AND owner_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(&input.title)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.status_id)
            .fetch_optional(conn)
            .await
    }

    /// Permanently delete an owned slot. Returns `true` if a row was removed.
    ///
    /// Swap requests referencing the slot are left untouched.
    pub async fn delete_owned(pool: &PgPool, owner_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM slots WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move a slot from `from` to `to` status, only if it is currently `from`.
    ///
    /// Returns `None` when the slot is missing or has a different status,
    /// which lets callers detect a racing operation.
    pub async fn transition_status(
        conn: &mut PgConnection,
        id: DbId,
        from: SlotStatus,
        to: SlotStatus,
    ) -> Result<Option<Slot>, sqlx::Error> {
        let query = format!(
            "UPDATE slots SET status_id = $3 WHERE id = $1 AND status_id = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(id)
            .bind(from.id())
            .bind(to.id())
            .fetch_optional(conn)
            .await
    }

    /// Return a SWAP_PENDING slot to SWAPPABLE, only while `owner_id` still
    /// owns it.
    ///
    /// Returns `None` when the slot is gone, changed hands, or was moved out
    /// of SWAP_PENDING by its owner.
    pub async fn release_owned(
        conn: &mut PgConnection,
        owner_id: DbId,
        id: DbId,
    ) -> Result<Option<Slot>, sqlx::Error> {
        let query = format!(
            "UPDATE slots SET status_id = $3 \
             WHERE id = $1 AND owner_id = $2 AND status_id = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(SlotStatus::Swappable.id())
            .bind(SlotStatus::SwapPending.id())
            .fetch_optional(conn)
            .await
    }

    /// Write one side of an accepted swap: new owner, resolved end time,
    /// optional shared title and final status.
    pub async fn apply_swap(
        conn: &mut PgConnection,
        id: DbId,
        new_owner_id: DbId,
        end_time: Timestamp,
        title: Option<&str>,
        status: SlotStatus,
    ) -> Result<Option<Slot>, sqlx::Error> {
        let query = format!(
            "UPDATE slots SET
                owner_id = $2,
                end_time = $3,
                title = COALESCE($4, title),
                status_id = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(id)
            .bind(new_owner_id)
            .bind(end_time)
            .bind(title)
            .bind(status.id())
            .fetch_optional(conn)
            .await
    }
}

fn split_ranges(ranges: &[TimeRange]) -> (Vec<Timestamp>, Vec<Timestamp>) {
    ranges.iter().map(|r| (r.start, r.end)).unzip()
}
