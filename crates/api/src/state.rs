use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::{SlotCalendar, SwapOrchestrator};
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: slotswap_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Centralized event bus for publishing swap events.
    pub event_bus: Arc<slotswap_events::EventBus>,
    /// Slot creation, update and deletion.
    pub calendar: Arc<SlotCalendar>,
    /// Swap request workflow.
    pub swaps: Arc<SwapOrchestrator>,
}

impl AppState {
    /// Assemble the state, wiring the engine to the pool, bus and the
    /// configured write capability.
    pub fn new(
        pool: slotswap_db::DbPool,
        config: ServerConfig,
        ws_manager: Arc<WsManager>,
        event_bus: Arc<slotswap_events::EventBus>,
    ) -> Self {
        let atomic = config.atomic_multi_write;
        let calendar = Arc::new(SlotCalendar::new(pool.clone(), atomic));
        let swaps = Arc::new(SwapOrchestrator::new(
            pool.clone(),
            Arc::clone(&event_bus),
            atomic,
        ));
        Self {
            pool,
            config: Arc::new(config),
            ws_manager,
            event_bus,
            calendar,
            swaps,
        }
    }
}
