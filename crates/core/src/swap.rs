//! Swap acceptance rules: duration preference and the resulting slot ranges.

use serde::{Deserialize, Serialize};

use crate::overlap::TimeRange;

/// Which party's original time span survives an accepted swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationPreference {
    /// The initiator's duration is applied to the recipient slot.
    #[default]
    KeepMine,
    /// The recipient's duration is applied to the initiator slot.
    UseTheirs,
}

impl DurationPreference {
    /// Database representation (`swap_requests.duration_preference`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KeepMine => "keep_mine",
            Self::UseTheirs => "use_theirs",
        }
    }

    /// Parse the database representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "keep_mine" => Some(Self::KeepMine),
            "use_theirs" => Some(Self::UseTheirs),
            _ => None,
        }
    }
}

/// Time ranges of both slots after an accepted swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRanges {
    pub initiator_slot: TimeRange,
    pub recipient_slot: TimeRange,
}

/// Apply a duration preference to the two slots of an accepted swap.
///
/// Start times never move. Durations are read from the ranges as they were
/// before the swap.
pub fn resolve_durations(
    initiator_slot: TimeRange,
    recipient_slot: TimeRange,
    preference: DurationPreference,
) -> ResolvedRanges {
    match preference {
        DurationPreference::KeepMine => ResolvedRanges {
            initiator_slot,
            recipient_slot: TimeRange::new(
                recipient_slot.start,
                recipient_slot.start + initiator_slot.duration(),
            ),
        },
        DurationPreference::UseTheirs => ResolvedRanges {
            initiator_slot: TimeRange::new(
                initiator_slot.start,
                initiator_slot.start + recipient_slot.duration(),
            ),
            recipient_slot,
        },
    }
}

/// Normalise an optional title chosen at acceptance. Blank titles are ignored.
pub fn selected_title(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
