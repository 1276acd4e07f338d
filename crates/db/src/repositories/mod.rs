//! Repository layer: one zero-sized struct per table.

pub mod slot_repo;
pub mod swap_request_repo;

pub use slot_repo::SlotRepo;
pub use swap_request_repo::SwapRequestRepo;
