//! Swap request workflow: propose, respond, cancel and the read paths.
//!
//! Every state change runs inside a [`WriteScope`] and publishes a
//! [`PlatformEvent`] addressed to the other party once the writes are done.

use std::sync::Arc;

use slotswap_core::error::CoreError;
use slotswap_core::lifecycle::{slot_status_after, swap_status};
use slotswap_core::swap::{resolve_durations, selected_title};
use slotswap_core::types::DbId;
use slotswap_db::models::slot::Slot;
use slotswap_db::models::status::{SlotStatus, SwapRequestStatus};
use slotswap_db::models::swap_request::{
    CreateSwapRequest, RespondToSwap, SwapRequest, SwapRequestWithSlots,
};
use slotswap_db::repositories::{SlotRepo, SwapRequestRepo};
use slotswap_events::{event_types, EventBus, PlatformEvent};
use sqlx::{PgConnection, PgPool};
use validator::Validate;

use crate::engine::WriteScope;
use crate::error::{AppError, AppResult};

fn request_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "SwapRequest",
        id,
    })
}

fn slot_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Slot", id })
}

/// Coordinates the slot and swap-request writes of the swap workflow.
pub struct SwapOrchestrator {
    pool: PgPool,
    event_bus: Arc<EventBus>,
    supports_atomic_multi_write: bool,
}

impl SwapOrchestrator {
    pub fn new(pool: PgPool, event_bus: Arc<EventBus>, supports_atomic_multi_write: bool) -> Self {
        Self {
            pool,
            event_bus,
            supports_atomic_multi_write,
        }
    }

    /// SWAPPABLE slots of every other user, earliest first.
    pub async fn list_swappable(&self, requester_id: DbId) -> AppResult<Vec<Slot>> {
        Ok(SlotRepo::list_swappable(&self.pool, requester_id).await?)
    }

    /// Offer `my_slot_id` in exchange for `their_slot_id`.
    ///
    /// Both slots must be SWAPPABLE and no PENDING request may exist for the
    /// pair in either direction. On success both slots become SWAP_PENDING
    /// and the recipient is notified.
    pub async fn propose(
        &self,
        requester_id: DbId,
        input: &CreateSwapRequest,
    ) -> AppResult<SwapRequestWithSlots> {
        if input.my_slot_id == input.their_slot_id {
            return Err(CoreError::Validation("Cannot swap a slot with itself".into()).into());
        }

        let mut scope = WriteScope::open(&self.pool, self.supports_atomic_multi_write).await?;
        let conn = scope.conn();

        let mine = SlotRepo::find_owned(&mut *conn, requester_id, input.my_slot_id)
            .await?
            .ok_or_else(|| slot_not_found(input.my_slot_id))?;
        let theirs = SlotRepo::find_by_id(&mut *conn, input.their_slot_id)
            .await?
            .filter(|slot| slot.owner_id != requester_id)
            .ok_or_else(|| slot_not_found(input.their_slot_id))?;

        for slot in [&mine, &theirs] {
            if slot.status_id != SlotStatus::Swappable.id() {
                return Err(CoreError::Conflict(format!(
                    "Slot {} is not SWAPPABLE",
                    slot.id
                ))
                .into());
            }
        }

        let request = SwapRequestRepo::insert_pending(&mut *conn, requester_id, theirs.owner_id, input)
            .await?
            .ok_or_else(|| {
                CoreError::Conflict("A pending swap request already exists for these slots".into())
            })?;

        let initiator_slot = lock_slot(&mut *conn, mine.id).await?;
        let recipient_slot = lock_slot(&mut *conn, theirs.id).await?;
        scope.finish().await?;

        tracing::info!(
            swap_request_id = request.id,
            initiator_id = request.initiator_id,
            recipient_id = request.recipient_id,
            initiator_slot_id = request.initiator_slot_id,
            recipient_slot_id = request.recipient_slot_id,
            duration_preference = %request.duration_preference,
            "Swap proposed",
        );
        self.notify(
            event_types::SWAP_REQUESTED,
            &request,
            request.recipient_id,
            format!("New swap request for \"{}\"", recipient_slot.title),
        );

        Ok(SwapRequestWithSlots {
            request,
            initiator_slot: Some(initiator_slot),
            recipient_slot: Some(recipient_slot),
        })
    }

    /// Accept or reject a PENDING request addressed to `recipient_id`.
    ///
    /// The caller must still own the recipient slot. Accepting exchanges the
    /// owners of the two slots, applies the request's duration preference
    /// and the optional shared title, and leaves both slots BUSY; both slots
    /// must still be SWAP_PENDING with their original owners. Rejecting
    /// returns the slots each party still holds to SWAPPABLE.
    pub async fn respond(
        &self,
        recipient_id: DbId,
        request_id: DbId,
        input: &RespondToSwap,
    ) -> AppResult<SwapRequestWithSlots> {
        input.validate()?;

        let (status, title) = if input.accept {
            (
                SwapRequestStatus::Accepted,
                selected_title(input.selected_title.as_deref()),
            )
        } else {
            (SwapRequestStatus::Rejected, None)
        };

        let mut scope = WriteScope::open(&self.pool, self.supports_atomic_multi_write).await?;
        let conn = scope.conn();

        let request = SwapRequestRepo::find_for_recipient(&mut *conn, request_id, recipient_id)
            .await?
            .ok_or_else(|| request_not_found(request_id))?;
        ensure_transition(&request, status)?;

        let initiator_slot = existing_slot(&mut *conn, request.initiator_slot_id).await?;
        let recipient_slot = existing_slot(&mut *conn, request.recipient_slot_id).await?;
        if recipient_slot.owner_id != recipient_id {
            tracing::debug!(
                swap_request_id = request.id,
                recipient_id,
                owner_id = recipient_slot.owner_id,
                "Recipient no longer owns the requested slot",
            );
            return Err(request_not_found(request_id));
        }

        let (initiator_slot, recipient_slot) = if input.accept {
            ensure_held(&initiator_slot, request.initiator_id)?;
            ensure_held(&recipient_slot, request.recipient_id)?;
            let slot_status = settled_slot_status(status)?;

            let resolved = resolve_durations(
                initiator_slot.range(),
                recipient_slot.range(),
                request.preference(),
            );
            let swapped_initiator = SlotRepo::apply_swap(
                &mut *conn,
                initiator_slot.id,
                request.recipient_id,
                resolved.initiator_slot.end,
                title.as_deref(),
                slot_status,
            )
            .await?
            .ok_or_else(|| slot_not_found(initiator_slot.id))?;
            let swapped_recipient = SlotRepo::apply_swap(
                &mut *conn,
                recipient_slot.id,
                request.initiator_id,
                resolved.recipient_slot.end,
                title.as_deref(),
                slot_status,
            )
            .await?
            .ok_or_else(|| slot_not_found(recipient_slot.id))?;
            (Some(swapped_initiator), Some(swapped_recipient))
        } else {
            (
                release_slot(&mut *conn, request.initiator_id, initiator_slot.id).await?,
                release_slot(&mut *conn, request.recipient_id, recipient_slot.id).await?,
            )
        };

        let request = SwapRequestRepo::resolve(&mut *conn, request.id, status.id(), title.as_deref())
            .await?
            .ok_or_else(|| CoreError::Conflict("Swap request is no longer pending".into()))?;
        scope.finish().await?;

        let (event_type, verb) = if input.accept {
            (event_types::SWAP_ACCEPTED, "accepted")
        } else {
            (event_types::SWAP_REJECTED, "rejected")
        };
        tracing::info!(
            swap_request_id = request.id,
            recipient_id,
            outcome = verb,
            "Swap request resolved",
        );
        self.notify(
            event_type,
            &request,
            request.initiator_id,
            format!("Your swap request was {verb}"),
        );

        Ok(SwapRequestWithSlots {
            request,
            initiator_slot,
            recipient_slot,
        })
    }

    /// Withdraw a PENDING request created by `initiator_id`.
    ///
    /// Referenced slots still held by their party go back to SWAPPABLE;
    /// deleted or re-owned slots are left alone.
    pub async fn cancel(&self, initiator_id: DbId, request_id: DbId) -> AppResult<SwapRequestWithSlots> {
        let status = SwapRequestStatus::Cancelled;

        let mut scope = WriteScope::open(&self.pool, self.supports_atomic_multi_write).await?;
        let conn = scope.conn();

        let request = SwapRequestRepo::find_for_initiator(&mut *conn, request_id, initiator_id)
            .await?
            .ok_or_else(|| request_not_found(request_id))?;
        ensure_transition(&request, status)?;

        let initiator_slot =
            release_slot(&mut *conn, request.initiator_id, request.initiator_slot_id).await?;
        let recipient_slot =
            release_slot(&mut *conn, request.recipient_id, request.recipient_slot_id).await?;

        let request = SwapRequestRepo::resolve(&mut *conn, request.id, status.id(), None)
            .await?
            .ok_or_else(|| CoreError::Conflict("Swap request is no longer pending".into()))?;
        scope.finish().await?;

        tracing::info!(swap_request_id = request.id, initiator_id, "Swap request cancelled");
        self.notify(
            event_types::SWAP_CANCELLED,
            &request,
            request.recipient_id,
            "A swap request for your slot was cancelled".to_string(),
        );

        Ok(SwapRequestWithSlots {
            request,
            initiator_slot,
            recipient_slot,
        })
    }

    /// A request the user takes part in, with both slots attached.
    pub async fn get(&self, user_id: DbId, request_id: DbId) -> AppResult<SwapRequestWithSlots> {
        let request = SwapRequestRepo::find_visible(&self.pool, request_id, user_id)
            .await?
            .ok_or_else(|| request_not_found(request_id))?;
        SwapRequestRepo::with_slots(&self.pool, vec![request])
            .await?
            .pop()
            .ok_or_else(|| request_not_found(request_id))
    }

    /// Requests addressed to the user, newest first.
    pub async fn list_incoming(&self, user_id: DbId) -> AppResult<Vec<SwapRequestWithSlots>> {
        let requests = SwapRequestRepo::list_incoming(&self.pool, user_id).await?;
        Ok(SwapRequestRepo::with_slots(&self.pool, requests).await?)
    }

    /// Requests the user created, newest first.
    pub async fn list_outgoing(&self, user_id: DbId) -> AppResult<Vec<SwapRequestWithSlots>> {
        let requests = SwapRequestRepo::list_outgoing(&self.pool, user_id).await?;
        Ok(SwapRequestRepo::with_slots(&self.pool, requests).await?)
    }

    fn notify(&self, event_type: &str, request: &SwapRequest, target_user_id: DbId, message: String) {
        let actor = if target_user_id == request.initiator_id {
            request.recipient_id
        } else {
            request.initiator_id
        };
        self.event_bus.publish(
            PlatformEvent::new(event_type)
                .with_source("swap_request", request.id)
                .with_actor(actor)
                .with_target(target_user_id)
                .with_message(message)
                .with_payload(serde_json::json!({
                    "swap_request_id": request.id,
                    "initiator_slot_id": request.initiator_slot_id,
                    "recipient_slot_id": request.recipient_slot_id,
                })),
        );
    }
}

/// Move a SWAPPABLE slot to SWAP_PENDING, failing if another operation got
/// there first.
async fn lock_slot(conn: &mut PgConnection, id: DbId) -> AppResult<Slot> {
    SlotRepo::transition_status(conn, id, SlotStatus::Swappable, SlotStatus::SwapPending)
        .await?
        .ok_or_else(|| CoreError::Conflict(format!("Slot {id} is no longer SWAPPABLE")).into())
}

/// Resolved requests are invisible to respond and cancel.
fn ensure_transition(request: &SwapRequest, to: SwapRequestStatus) -> AppResult<()> {
    swap_status::validate_transition(request.status_id, to.id()).map_err(|reason| {
        tracing::debug!(swap_request_id = request.id, %reason, "Swap request already resolved");
        request_not_found(request.id)
    })
}

/// An accepted swap may only move a slot still locked for it and still
/// owned by the party that offered it.
fn ensure_held(slot: &Slot, owner_id: DbId) -> AppResult<()> {
    if slot.owner_id != owner_id || slot.status_id != SlotStatus::SwapPending.id() {
        return Err(CoreError::Conflict(format!(
            "Slot {} is no longer held for this swap request",
            slot.id
        ))
        .into());
    }
    Ok(())
}

/// Release a slot back to SWAPPABLE if `owner_id` still holds it, returning
/// the slot as that party now sees it.
async fn release_slot(conn: &mut PgConnection, owner_id: DbId, id: DbId) -> AppResult<Option<Slot>> {
    if let Some(slot) = SlotRepo::release_owned(&mut *conn, owner_id, id).await? {
        return Ok(Some(slot));
    }
    Ok(SlotRepo::find_owned(conn, owner_id, id).await?)
}

/// Load a slot referenced by a request; a deleted slot blocks the response.
async fn existing_slot(conn: &mut PgConnection, id: DbId) -> AppResult<Slot> {
    SlotRepo::find_by_id(conn, id).await?.ok_or_else(|| {
        CoreError::Conflict(format!("Slot {id} referenced by this request no longer exists")).into()
    })
}

/// Status both slots take once a request reaches `status`.
fn settled_slot_status(status: SwapRequestStatus) -> AppResult<SlotStatus> {
    slot_status_after(status.id())
        .and_then(SlotStatus::from_id)
        .ok_or_else(|| {
            AppError::InternalError(format!("No slot status defined after request status {}", status.id()))
        })
}
