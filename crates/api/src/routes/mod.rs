pub mod health;
pub mod slot;
pub mod swap;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                   WebSocket push channel (?token=<jwt>)
///
/// /slots                                list, create
/// /slots/{id}                           get, update, delete
/// /swappable-slots                      other users' SWAPPABLE slots
///
/// /swap-requests                        propose
/// /swap-requests/incoming               requests addressed to me
/// /swap-requests/outgoing               requests I created
/// /swap-requests/{id}                   get
/// /swap-requests/{id}/respond           accept or reject (POST)
/// /swap-requests/{id}/cancel            withdraw (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoint.
        .route("/ws", get(ws::ws_handler))
        // Owner-scoped slot CRUD.
        .nest("/slots", slot::router())
        // Marketplace listing.
        .route("/swappable-slots", get(handlers::slot::list_swappable))
        // Swap workflow.
        .nest("/swap-requests", swap::router())
}
