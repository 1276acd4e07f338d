//! Booking engine: the multi-statement operations behind the slot and swap
//! endpoints.
//!
//! - [`SlotCalendar`] -- slot creation (with recurrence expansion and overlap
//!   checks), update and deletion.
//! - [`SwapOrchestrator`] -- the swap request workflow.
//!
//! Both are constructed with `supports_atomic_multi_write`. When set, every
//! operation that writes more than one row runs in a single transaction;
//! otherwise the same statements run one after another on a pooled
//! connection and a failure part-way leaves the earlier writes in place.

pub mod calendar;
pub mod orchestrator;

pub use calendar::SlotCalendar;
pub use orchestrator::SwapOrchestrator;

use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

/// Connection a multi-statement operation writes through.
///
/// Dropping a [`WriteScope::Atomic`] without calling
/// [`finish`](WriteScope::finish) rolls the transaction back.
pub(crate) enum WriteScope {
    Atomic(Transaction<'static, Postgres>),
    Sequential(PoolConnection<Postgres>),
}

impl WriteScope {
    pub(crate) async fn open(pool: &PgPool, atomic: bool) -> Result<Self, sqlx::Error> {
        if atomic {
            Ok(Self::Atomic(pool.begin().await?))
        } else {
            Ok(Self::Sequential(pool.acquire().await?))
        }
    }

    pub(crate) fn conn(&mut self) -> &mut PgConnection {
        match self {
            Self::Atomic(tx) => &mut **tx,
            Self::Sequential(conn) => &mut **conn,
        }
    }

    pub(crate) fn is_atomic(&self) -> bool {
        matches!(self, Self::Atomic(_))
    }

    /// Commit when atomic; a no-op for sequential writes.
    pub(crate) async fn finish(self) -> Result<(), sqlx::Error> {
        match self {
            Self::Atomic(tx) => tx.commit().await,
            Self::Sequential(_) => Ok(()),
        }
    }
}
