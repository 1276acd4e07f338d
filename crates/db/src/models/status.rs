//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

use slotswap_core::lifecycle::{slot_status, swap_status};

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up a variant by its database status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( x if x == $val => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Calendar slot status.
    SlotStatus {
        Busy = slot_status::BUSY,
        Swappable = slot_status::SWAPPABLE,
        SwapPending = slot_status::SWAP_PENDING,
    }
}

define_status_enum! {
    /// Swap request lifecycle status.
    SwapRequestStatus {
        Pending = swap_status::PENDING,
        Accepted = swap_status::ACCEPTED,
        Rejected = swap_status::REJECTED,
        Cancelled = swap_status::CANCELLED,
    }
}
