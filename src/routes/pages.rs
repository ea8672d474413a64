use axum::{
    Form, Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use crate::{error::AppError, state::SharedState};

#[derive(Debug, Deserialize)]
/// Query or form parameters carrying the shared access key.
pub struct AuthParams {
    key: Option<String>,
}

/// Page routes: the login form plus the four gated control/overlay pages.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(root))
        .route("/auth", get(auth_page).post(auth_submit))
        .route("/rematch-control", get(rematch_control))
        .route("/rematch-overlay", get(rematch_overlay))
        .route("/finals-control", get(finals_control))
        .route("/finals-overlay", get(finals_overlay))
}

/// The root path only redirects to the login page.
async fn root() -> Redirect {
    Redirect::to("/auth")
}

/// Serve the login page; it is the only ungated page.
async fn auth_page(State(state): State<SharedState>) -> Result<Html<String>, AppError> {
    serve_page(&state, "auth.html").await
}

/// Validate a login submission.
///
/// On success the client is redirected to a protected page with the key
/// embedded in the query string, which is how every subsequent page and
/// realtime connection authenticates.
async fn auth_submit(State(state): State<SharedState>, Form(params): Form<AuthParams>) -> Redirect {
    match params
        .key
        .filter(|key| state.config().authorize(Some(key.as_str())))
    {
        Some(key) => Redirect::to(&format!("/rematch-overlay?key={key}")),
        None => Redirect::to("/auth?error=1"),
    }
}

/// Control panel for the rematch channel.
async fn rematch_control(
    State(state): State<SharedState>,
    Query(params): Query<AuthParams>,
) -> Result<Response, AppError> {
    gated_page(state, params, "rematch-control.html").await
}

/// Overlay display for the rematch channel.
async fn rematch_overlay(
    State(state): State<SharedState>,
    Query(params): Query<AuthParams>,
) -> Result<Response, AppError> {
    gated_page(state, params, "rematch-overlay.html").await
}

/// Control panel for the finals channel.
async fn finals_control(
    State(state): State<SharedState>,
    Query(params): Query<AuthParams>,
) -> Result<Response, AppError> {
    gated_page(state, params, "finals-control.html").await
}

/// Overlay display for the finals channel.
async fn finals_overlay(
    State(state): State<SharedState>,
    Query(params): Query<AuthParams>,
) -> Result<Response, AppError> {
    gated_page(state, params, "finals-overlay.html").await
}

/// Serve `file` when the request carries the shared key, otherwise redirect to
/// the login page.
async fn gated_page(
    state: SharedState,
    params: AuthParams,
    file: &str,
) -> Result<Response, AppError> {
    if !state.config().authorize(params.key.as_deref()) {
        return Ok(Redirect::to("/auth").into_response());
    }
    Ok(serve_page(&state, file).await?.into_response())
}

/// Read a page from the pages directory and serve it as HTML.
///
/// Pages are static documents; they open their own realtime connection using
/// the key available to them from the URL.
async fn serve_page(state: &SharedState, file: &str) -> Result<Html<String>, AppError> {
    let path = state.config().pages_dir().join(file);
    match fs::read_to_string(&path).await {
        Ok(contents) => Ok(Html(contents)),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read page");
            Err(AppError::NotFound(format!("page `{file}`")))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{path::Path, sync::Arc};

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use crate::{config::AppConfig, dao::file_store::FileChannelStore, state::AppState};

    async fn test_app(dir: &Path) -> axum::Router {
        std::fs::write(dir.join("auth.html"), "<html>login</html>").unwrap();
        for page in [
            "rematch-control.html",
            "rematch-overlay.html",
            "finals-control.html",
            "finals-overlay.html",
        ] {
            std::fs::write(dir.join(page), format!("<html>{page}</html>")).unwrap();
        }
        let store = Arc::new(FileChannelStore::open(dir).await.unwrap());
        let state = AppState::new(AppConfig::new("abc123", 0, dir, dir), store).await;
        crate::routes::router(state)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_login(key: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/auth")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("key={key}")))
            .unwrap()
    }

    fn location(response: &axum::response::Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[tokio::test]
    async fn gated_page_is_served_with_the_correct_key() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path()).await;

        let response = app.oneshot(get("/finals-control?key=abc123")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_key_redirects_to_login() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path()).await;

        let response = app.oneshot(get("/finals-control?key=wrong")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/auth");
    }

    #[tokio::test]
    async fn missing_key_redirects_to_login() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path()).await;

        let response = app.oneshot(get("/rematch-overlay")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/auth");
    }

    #[tokio::test]
    async fn root_redirects_to_login() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path()).await;

        let response = app.oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/auth");
    }

    #[tokio::test]
    async fn login_page_is_served_without_a_key() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path()).await;

        let response = app.oneshot(get("/auth")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn successful_login_redirects_with_the_key_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path()).await;

        let response = app.oneshot(post_login("abc123")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/rematch-overlay?key=abc123");
    }

    #[tokio::test]
    async fn failed_login_redirects_with_the_error_flag() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path()).await;

        let response = app.oneshot(post_login("wrong")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/auth?error=1");
    }
}
