//! Slot and swap-request status lifecycles.
//!
//! Status IDs match the `slot_statuses` and `swap_request_statuses` seed data
//! (1-based SMALLSERIAL). The `db` crate mirrors them as typed enums; this
//! module stays dependency-free so it can be used anywhere.

/// Slot status IDs.
pub mod slot_status {
    /// Owner's own time; not offered for swapping.
    pub const BUSY: i16 = 1;
    /// Offered on the marketplace.
    pub const SWAPPABLE: i16 = 2;
    /// Locked by an outstanding swap request.
    pub const SWAP_PENDING: i16 = 3;

    /// Whether `id` is one of the three known slot statuses.
    pub fn is_valid(id: i16) -> bool {
        matches!(id, BUSY | SWAPPABLE | SWAP_PENDING)
    }

    /// Validate a status supplied by a client on slot update.
    pub fn validate(id: i16) -> Result<(), String> {
        if is_valid(id) {
            Ok(())
        } else {
            Err(format!(
                "Invalid slot status {id}. Must be one of: 1 (BUSY), 2 (SWAPPABLE), 3 (SWAP_PENDING)"
            ))
        }
    }

    /// Validate the initial status of a new slot. SWAP_PENDING is only ever
    /// set by the swap workflow.
    pub fn validate_initial(id: i16) -> Result<(), String> {
        match id {
            BUSY | SWAPPABLE => Ok(()),
            SWAP_PENDING => Err("New slots cannot start as SWAP_PENDING".to_string()),
            other => validate(other),
        }
    }

    /// Wire name for a status ID.
    pub fn name(id: i16) -> &'static str {
        match id {
            BUSY => "BUSY",
            SWAPPABLE => "SWAPPABLE",
            SWAP_PENDING => "SWAP_PENDING",
            _ => "UNKNOWN",
        }
    }
}

/// Swap request status IDs and the request state machine.
///
/// ```text
/// PENDING -> ACCEPTED | REJECTED | CANCELLED
/// ```
///
/// All three outcomes are terminal.
pub mod swap_status {
    pub const PENDING: i16 = 1;
    pub const ACCEPTED: i16 = 2;
    pub const REJECTED: i16 = 3;
    pub const CANCELLED: i16 = 4;

    /// Returns the set of valid target status IDs reachable from `from_status`.
    pub fn valid_transitions(from_status: i16) -> &'static [i16] {
        match from_status {
            PENDING => &[ACCEPTED, REJECTED, CANCELLED],
            // Terminal states and unknown IDs.
            _ => &[],
        }
    }

    /// Check whether a transition from `from` to `to` is valid.
    pub fn can_transition(from: i16, to: i16) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Validate a state transition, returning an error message for invalid ones.
    pub fn validate_transition(from: i16, to: i16) -> Result<(), String> {
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(format!(
                "Invalid swap request transition: {} -> {}",
                name(from),
                name(to)
            ))
        }
    }

    /// Wire name for a status ID.
    pub fn name(id: i16) -> &'static str {
        match id {
            PENDING => "PENDING",
            ACCEPTED => "ACCEPTED",
            REJECTED => "REJECTED",
            CANCELLED => "CANCELLED",
            _ => "UNKNOWN",
        }
    }
}

/// Slot status both slots end up in after a request leaves PENDING.
pub fn slot_status_after(request_status: i16) -> Option<i16> {
    match request_status {
        swap_status::ACCEPTED => Some(slot_status::BUSY),
        swap_status::REJECTED | swap_status::CANCELLED => Some(slot_status::SWAPPABLE),
        _ => None,
    }
}
