//! Repository for the `swap_requests` table.

use sqlx::{PgConnection, PgPool};
use slotswap_core::types::DbId;

use crate::models::slot::Slot;
use crate::models::status::{SwapRequestStatus, StatusId};
use crate::models::swap_request::{CreateSwapRequest, SwapRequest, SwapRequestWithSlots};
use crate::repositories::SlotRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, initiator_id, recipient_id, initiator_slot_id, recipient_slot_id, \
    status_id, duration_preference, selected_title, responded_at, created_at, updated_at";

/// Provides persistence for swap requests.
pub struct SwapRequestRepo;

impl SwapRequestRepo {
    /// Insert a PENDING request unless one already exists for the same
    /// unordered slot pair.
    ///
    /// Returns `None` when the `uq_swap_requests_pending_pair` index already
    /// holds a pending request for the pair.
    pub async fn insert_pending(
        conn: &mut PgConnection,
        initiator_id: DbId,
        recipient_id: DbId,
        input: &CreateSwapRequest,
    ) -> Result<Option<SwapRequest>, sqlx::Error> {
        let query = format!(
            "INSERT INTO swap_requests \
                (initiator_id, recipient_id, initiator_slot_id, recipient_slot_id, \
                 status_id, duration_preference) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT ((LEAST(initiator_slot_id, recipient_slot_id)), \
                          (GREATEST(initiator_slot_id, recipient_slot_id))) \
                 WHERE status_id = 1 \
             DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SwapRequest>(&query)
            .bind(initiator_id)
            .bind(recipient_id)
            .bind(input.my_slot_id)
            .bind(input.their_slot_id)
            .bind(SwapRequestStatus::Pending.id())
            .bind(input.duration_preference.as_str())
            .fetch_optional(conn)
            .await
    }

    /// Find a request addressed to `recipient_id`, in any status, and lock
    /// the row for the rest of the transaction.
    pub async fn find_for_recipient(
        conn: &mut PgConnection,
        id: DbId,
        recipient_id: DbId,
    ) -> Result<Option<SwapRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM swap_requests \
             WHERE id = $1 AND recipient_id = $2 \
             FOR UPDATE"
        );
        sqlx::query_as::<_, SwapRequest>(&query)
            .bind(id)
            .bind(recipient_id)
            .fetch_optional(conn)
            .await
    }

    /// Find a request created by `initiator_id`, in any status, and lock the
    /// row for the rest of the transaction.
    pub async fn find_for_initiator(
        conn: &mut PgConnection,
        id: DbId,
        initiator_id: DbId,
    ) -> Result<Option<SwapRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM swap_requests \
             WHERE id = $1 AND initiator_id = $2 \
             FOR UPDATE"
        );
        sqlx::query_as::<_, SwapRequest>(&query)
            .bind(id)
            .bind(initiator_id)
            .fetch_optional(conn)
            .await
    }

    /// Move a PENDING request to a terminal status and stamp `responded_at`.
    ///
    /// Returns `None` if the request is no longer PENDING.
    pub async fn resolve(
        conn: &mut PgConnection,
        id: DbId,
        status_id: StatusId,
        selected_title: Option<&str>,
    ) -> Result<Option<SwapRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE swap_requests SET
                status_id = $3,
                selected_title = $4,
                responded_at = NOW()
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SwapRequest>(&query)
            .bind(id)
            .bind(SwapRequestStatus::Pending.id())
            .bind(status_id)
            .bind(selected_title)
            .fetch_optional(conn)
            .await
    }

    /// Find a request the user takes part in, as initiator or recipient.
    pub async fn find_visible(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<SwapRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM swap_requests \
             WHERE id = $1 AND (initiator_id = $2 OR recipient_id = $2)"
        );
        sqlx::query_as::<_, SwapRequest>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Requests addressed to `user_id`, newest first.
    pub async fn list_incoming(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<SwapRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM swap_requests \
             WHERE recipient_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, SwapRequest>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Requests created by `user_id`, newest first.
    pub async fn list_outgoing(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<SwapRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM swap_requests \
             WHERE initiator_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, SwapRequest>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Attach both referenced slots to each request with one extra query.
    ///
    /// Slots that were deleted come back as `None`.
    pub async fn with_slots(
        pool: &PgPool,
        requests: Vec<SwapRequest>,
    ) -> Result<Vec<SwapRequestWithSlots>, sqlx::Error> {
        let ids: Vec<DbId> = requests
            .iter()
            .flat_map(|r| [r.initiator_slot_id, r.recipient_slot_id])
            .collect();
        let slots = if ids.is_empty() {
            Vec::new()
        } else {
            SlotRepo::find_by_ids(pool, &ids).await?
        };
        let lookup = |id: DbId| -> Option<Slot> { slots.iter().find(|s| s.id == id).cloned() };

        Ok(requests
            .into_iter()
            .map(|request| SwapRequestWithSlots {
                initiator_slot: lookup(request.initiator_slot_id),
                recipient_slot: lookup(request.recipient_slot_id),
                request,
            })
            .collect())
    }
}
