//! Realtime HTTP Routes and WebSocket Handler
//!
//! Every connected socket receives every change event as a JSON text frame
//! `{"event": ..., "payload": ...}`. Clients do not subscribe to channels and
//! nothing is replayed on connect.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::realtime::BroadcastNotifier;

// ==================
// Shared State
// ==================

/// Realtime state shared across handlers
pub struct RealtimeState {
    pub notifier: Arc<BroadcastNotifier>,
    pub active_connections: AtomicUsize,
    pub heartbeat: Duration,
}

impl RealtimeState {
    pub fn new(notifier: Arc<BroadcastNotifier>, heartbeat: Duration) -> Self {
        Self {
            notifier,
            active_connections: AtomicUsize::new(0),
            heartbeat,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RealtimeStatsResponse {
    pub active_connections: usize,
    pub subscribers: usize,
    pub events_published: u64,
}

// ==================
// Realtime Routes
// ==================

/// Create realtime routes with WebSocket support
pub fn realtime_routes(state: Arc<RealtimeState>) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/realtime/stats", get(get_stats_handler))
        .with_state(state)
}

// ==================
// WebSocket Handler
// ==================

/// Handle WebSocket upgrade request
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<RealtimeState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Forward change events to one connection until either side goes away
async fn handle_websocket(socket: WebSocket, state: Arc<RealtimeState>) {
    // subscribe before anything else so no event published after the
    // upgrade is missed
    let mut events = state.notifier.subscribe();
    let connection_id = Uuid::new_v4().to_string();
    let active = state.active_connections.fetch_add(1, Ordering::SeqCst) + 1;
    info!(connection_id = %connection_id, active, "realtime client connected");

    let (mut sender, mut receiver) = socket.split();
    let mut heartbeat = tokio::time::interval(state.heartbeat);
    heartbeat.tick().await;

    loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    debug!(connection_id = %connection_id, error = %e, "websocket receive error");
                    break;
                }
                // clients have nothing to say on this channel
                Some(Ok(_)) => {}
            },

            event = events.recv() => match event {
                Ok(event) => {
                    let json = match serde_json::to_string(&event) {
                        Ok(json) => json,
                        Err(e) => {
                            warn!(event = event.name(), error = %e, "failed to serialize event");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(connection_id = %connection_id, skipped, "realtime client lagging, events dropped");
                }
                Err(RecvError::Closed) => break,
            },

            _ = heartbeat.tick() => {
                if sender.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    let active = state.active_connections.fetch_sub(1, Ordering::SeqCst) - 1;
    info!(connection_id = %connection_id, active, "realtime client disconnected");
}

// ==================
// HTTP Handlers
// ==================

/// Get realtime statistics
async fn get_stats_handler(State(state): State<Arc<RealtimeState>>) -> Json<RealtimeStatsResponse> {
    Json(RealtimeStatsResponse {
        active_connections: state.active_connections.load(Ordering::SeqCst),
        subscribers: state.notifier.subscriber_count(),
        events_published: state.notifier.published(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realtime_state_creation() {
        let state = RealtimeState::new(Arc::new(BroadcastNotifier::default()), Duration::from_secs(30));
        assert_eq!(state.active_connections.load(Ordering::SeqCst), 0);
        assert_eq!(state.notifier.subscriber_count(), 0);
    }
}
