//! Route definitions for the `/slots` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::slot;
use crate::state::AppState;

/// Routes mounted at `/slots`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create
/// GET    /{id}    -> get_by_id
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(slot::list).post(slot::create))
        .route(
            "/{id}",
            get(slot::get_by_id).put(slot::update).delete(slot::delete),
        )
}
