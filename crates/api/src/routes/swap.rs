//! Route definitions for the `/swap-requests` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::swap;
use crate::state::AppState;

/// Routes mounted at `/swap-requests`.
///
/// ```text
/// POST   /                 -> create
/// GET    /incoming         -> list_incoming
/// GET    /outgoing         -> list_outgoing
/// GET    /{id}             -> get_by_id
/// POST   /{id}/respond     -> respond
/// POST   /{id}/cancel      -> cancel
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(swap::create))
        .route("/incoming", get(swap::list_incoming))
        .route("/outgoing", get(swap::list_outgoing))
        .route("/{id}", get(swap::get_by_id))
        .route("/{id}/respond", post(swap::respond))
        .route("/{id}/cancel", post(swap::cancel))
}
