//! Handlers for the `/swap-requests` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use slotswap_core::types::DbId;
use slotswap_db::models::swap_request::{CreateSwapRequest, RespondToSwap, SwapRequestWithSlots};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/swap-requests
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateSwapRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SwapRequestWithSlots>>)> {
    let request = state.swaps.propose(user.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/swap-requests/incoming
pub async fn list_incoming(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<SwapRequestWithSlots>>>> {
    let requests = state.swaps.list_incoming(user.user_id).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/swap-requests/outgoing
pub async fn list_outgoing(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<SwapRequestWithSlots>>>> {
    let requests = state.swaps.list_outgoing(user.user_id).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/swap-requests/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SwapRequestWithSlots>>> {
    let request = state.swaps.get(user.user_id, id).await?;
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/swap-requests/{id}/respond
pub async fn respond(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<RespondToSwap>,
) -> AppResult<Json<DataResponse<SwapRequestWithSlots>>> {
    let request = state.swaps.respond(user.user_id, id, &input).await?;
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/swap-requests/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SwapRequestWithSlots>>> {
    let request = state.swaps.cancel(user.user_id, id).await?;
    Ok(Json(DataResponse { data: request }))
}
