//! Request handlers.
//!
//! Handlers authenticate via [`AuthUser`](crate::middleware::auth::AuthUser),
//! delegate to the booking engine on [`AppState`](crate::state::AppState)
//! and wrap results in the `{ "data": ... }` envelope.

pub mod slot;
pub mod swap;
