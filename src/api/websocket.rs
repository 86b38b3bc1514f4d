use crate::api::protocol::ControlMessage;
use crate::engine::{Observer, SimEngine};
use crate::world::WorldSnapshot;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::future::BoxFuture;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Shared application state for WebSocket handler
#[derive(Clone)]
pub struct WsAppState {
    pub engine: Arc<SimEngine>,
}

/// What happened to an inbound control message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    Applied,
    Ignored,
    Rejected,
}

/// GET /ws - WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsAppState>>) -> Response {
    info!("WebSocket upgrade request received");
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Create WebSocket router
pub fn create_ws_router(state: Arc<WsAppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}

/// Send half of a client socket, attached as an observer.
///
/// Snapshots are serialized here, once per delivery.
struct WsObserver {
    sink: Mutex<SplitSink<WebSocket, Message>>,
}

impl Observer for WsObserver {
    fn deliver<'a>(&'a self, snapshot: &'a Arc<WorldSnapshot>) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let json = match serde_json::to_string(snapshot.as_ref()) {
                Ok(json) => json,
                Err(e) => {
                    error!(error = %e, tick = snapshot.tick, "Failed to serialize snapshot");
                    return false;
                }
            };

            let mut sink = self.sink.lock().await;
            match sink.send(Message::Text(json)).await {
                Ok(()) => true,
                Err(e) => {
                    debug!(error = %e, "Failed to send snapshot");
                    false
                }
            }
        })
    }
}

/// Handle WebSocket connection.
///
/// The send half is handed to the distributor; this task only reads
/// control messages until the client goes away.
async fn handle_socket(socket: WebSocket, state: Arc<WsAppState>) {
    let (sink, mut stream) = socket.split();
    let observer = Arc::new(WsObserver {
        sink: Mutex::new(sink),
    });
    let observer_id = state.engine.attach_observer(observer);

    info!(observer_id = %observer_id, "WebSocket connection established");

    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                apply_control(&state.engine, &text).await;
            }
            Ok(Message::Close(_)) => {
                info!(observer_id = %observer_id, "WebSocket client disconnected");
                break;
            }
            Ok(_) => {
                // Ignore binary, ping, pong messages
            }
            Err(e) => {
                warn!(observer_id = %observer_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    state.engine.detach_observer(&observer_id);
    info!(observer_id = %observer_id, "WebSocket connection closed");
}

/// Parse one control message and apply it to the engine.
///
/// Malformed or invalid messages are dropped with no state change.
pub async fn apply_control(engine: &SimEngine, text: &str) -> ControlOutcome {
    let msg = match ControlMessage::parse(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(error = %e, "Dropping malformed control message");
            return ControlOutcome::Rejected;
        }
    };

    let result = match msg {
        ControlMessage::Resize { width, height } => {
            info!(width, height, "Resize requested");
            engine.resize(width, height).await
        }
        ControlMessage::Settings(settings) => {
            info!(?settings, "Settings change requested");
            match settings.into_parts() {
                Ok((population, config)) => engine.apply_settings(population, config).await,
                Err(e) => Err(e),
            }
        }
        ControlMessage::Unknown => {
            debug!("Ignoring unknown control message type");
            return ControlOutcome::Ignored;
        }
    };

    match result {
        Ok(()) => ControlOutcome::Applied,
        Err(e) => {
            warn!(error = %e, "Dropping invalid control message");
            ControlOutcome::Rejected
        }
    }
}
