use axum::Router;
use tower_http::services::ServeDir;

use crate::state::SharedState;

pub mod pages;
pub mod websocket;

/// Compose all route trees, wiring in shared state and the static asset mount.
///
/// Static assets are served without authorization; only the data channel and
/// the pages that open it are gated.
pub fn router(state: SharedState) -> Router<()> {
    let assets = ServeDir::new(state.config().data_dir());

    pages::router()
        .merge(websocket::router())
        .nest_service("/source", assets)
        .with_state(state)
}
