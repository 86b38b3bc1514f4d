// WebSocket transport for spectators

pub mod protocol;
pub mod websocket;

pub use protocol::{ControlMessage, SettingsMessage};
pub use websocket::{apply_control, create_ws_router, ws_handler, ControlOutcome, WsAppState};

use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;

/// WebSocket route plus, when configured, the static client directory at `/`
pub fn create_router(state: Arc<WsAppState>, static_dir: Option<&Path>) -> Router {
    let router = create_ws_router(state);
    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}
