//! Event-to-notification routing.
//!
//! [`NotificationRouter`] subscribes to the event bus and forwards each
//! swap event to the user it is addressed to. Delivery is best effort: a
//! user without an open connection simply misses the push and picks the
//! change up on the next fetch.

use std::sync::Arc;

use axum::extract::ws::Message;
use slotswap_core::types::DbId;
use slotswap_events::PlatformEvent;
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Value of the `type` field on every pushed swap message.
pub const SWAP_NOTIFICATION_TYPE: &str = "swap-notification";

/// Routes bus events to WebSocket pushes.
pub struct NotificationRouter {
    ws_manager: Arc<WsManager>,
}

impl NotificationRouter {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the main routing loop.
    ///
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](slotswap_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.route_event(&event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Push one event to its target user. Returns the number of connections
    /// reached.
    pub async fn route_event(&self, event: &PlatformEvent) -> usize {
        let Some(user_id) = event.target_user_id else {
            tracing::debug!(event_type = %event.event_type, "Event has no target user");
            return 0;
        };
        if !event.event_type.starts_with("swap.") {
            return 0;
        }

        let message = Message::Text(notification_body(event).to_string().into());
        let delivered = self.ws_manager.send_to_user(user_id, message).await;
        tracing::debug!(
            event_type = %event.event_type,
            user_id,
            delivered,
            "Swap notification pushed",
        );
        delivered
    }
}

/// Build the JSON body pushed to the client.
pub fn notification_body(event: &PlatformEvent) -> serde_json::Value {
    let swap_request_id: Option<DbId> = event.source_entity_id;
    serde_json::json!({
        "type": SWAP_NOTIFICATION_TYPE,
        "event": event.event_type,
        "swap_request_id": swap_request_id,
        "from_user_id": event.actor_user_id,
        "message": event.message,
        "timestamp": event.timestamp,
    })
}

#[cfg(test)]
mod tests {
    use slotswap_events::event_types;

    use super::*;

    #[test]
    fn body_carries_request_and_sender() {
        let event = PlatformEvent::new(event_types::SWAP_ACCEPTED)
            .with_source("swap_request", 12)
            .with_actor(3)
            .with_target(4)
            .with_message("Your swap request was accepted");

        let body = notification_body(&event);
        assert_eq!(body["type"], "swap-notification");
        assert_eq!(body["event"], "swap.accepted");
        assert_eq!(body["swap_request_id"], 12);
        assert_eq!(body["from_user_id"], 3);
        assert_eq!(body["message"], "Your swap request was accepted");
    }

    #[tokio::test]
    async fn routes_only_to_target_user() {
        let manager = Arc::new(WsManager::new());
        let mut target_rx = manager.add("a".into(), 4).await;
        let mut other_rx = manager.add("b".into(), 5).await;
        let router = NotificationRouter::new(Arc::clone(&manager));

        let event = PlatformEvent::new(event_types::SWAP_REQUESTED)
            .with_source("swap_request", 1)
            .with_actor(5)
            .with_target(4);
        assert_eq!(router.route_event(&event).await, 1);

        let Some(Message::Text(text)) = target_rx.recv().await else {
            panic!("expected a text frame");
        };
        let body: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(body["event"], "swap.requested");
        assert!(other_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn untargeted_events_are_dropped() {
        let manager = Arc::new(WsManager::new());
        let _rx = manager.add("a".into(), 4).await;
        let router = NotificationRouter::new(manager);

        assert_eq!(router.route_event(&PlatformEvent::new(event_types::SWAP_REQUESTED)).await, 0);
        assert_eq!(
            router
                .route_event(&PlatformEvent::new("other.event").with_target(4))
                .await,
            0
        );
    }
}
