//! Handlers for the `/slots` and `/swappable-slots` resources.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use slotswap_core::types::DbId;
use slotswap_db::models::slot::{CreateSlot, Slot, UpdateSlot};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/slots
///
/// Returns every created row; a recurring request yields more than one.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateSlot>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<Slot>>>)> {
    let slots = state.calendar.create(user.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: slots })))
}

/// GET /api/v1/slots
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Slot>>>> {
    let slots = state.calendar.list(user.user_id).await?;
    Ok(Json(DataResponse { data: slots }))
}

/// GET /api/v1/slots/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Slot>>> {
    let slot = state.calendar.get(user.user_id, id).await?;
    Ok(Json(DataResponse { data: slot }))
}

/// PUT /api/v1/slots/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSlot>,
) -> AppResult<Json<DataResponse<Slot>>> {
    let slot = state.calendar.update(user.user_id, id, &input).await?;
    Ok(Json(DataResponse { data: slot }))
}

/// DELETE /api/v1/slots/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.calendar.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/swappable-slots
pub async fn list_swappable(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Slot>>>> {
    let slots = state.swaps.list_swappable(user.user_id).await?;
    Ok(Json(DataResponse { data: slots }))
}
