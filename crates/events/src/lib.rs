//! Slot swap event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope published by the swap
//!   workflow and consumed by the notification router.
//! - [`event_types`]: the event names the workflow emits.

pub mod bus;

pub use bus::{event_types, EventBus, PlatformEvent};
