use axum::{
    Router,
    extract::{Query, State, WebSocketUpgrade},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::warn;

use crate::{services::websocket_service, state::SharedState};

#[derive(Debug, Deserialize)]
/// Handshake parameters supplied with the upgrade request.
pub struct WsHandshake {
    key: Option<String>,
    /// Explicit referring-page fallback for clients whose user agent omits
    /// the `Referer` header on websocket upgrades.
    referer: Option<String>,
}

/// Upgrade the HTTP connection into a channel WebSocket session.
///
/// The shared key is checked before the upgrade completes, so an invalid
/// credential rejects the handshake outright and never reaches channel join.
/// The referring page decides which channel the connection belongs to once
/// the socket is open.
pub async fn ws_handler(
    State(state): State<SharedState>,
    Query(handshake): Query<WsHandshake>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    if !state.config().authorize(handshake.key.as_deref()) {
        warn!("rejecting websocket handshake: invalid connection key");
        return (StatusCode::UNAUTHORIZED, "invalid connection key").into_response();
    }

    let referer = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .or(handshake.referer)
        .unwrap_or_default();

    ws.on_upgrade(move |socket| websocket_service::handle_socket(state, socket, referer))
}

/// Configure the WebSocket endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/ws", get(ws_handler))
}
