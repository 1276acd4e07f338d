//! Domain logic for the slot swap service.
//!
//! This crate has zero internal dependencies so it can be shared by the
//! repository layer, the HTTP API and any future tooling.

pub mod error;
pub mod lifecycle;
pub mod overlap;
pub mod recurrence;
pub mod swap;
pub mod types;
