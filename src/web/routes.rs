use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::advisor::Advisor;
use crate::catalog::FormOptions;

use super::handlers;

/// State shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub advisor: Arc<Advisor>,
    /// Picklists, languages and carousel served to the page.
    pub options: Arc<FormOptions>,
}

pub fn build(state: AppState) -> Router {
    Router::new()
        // Form UI
        .route("/", get(serve_index))
        .route("/style.css", get(serve_css))
        .route("/app.js", get(serve_js))
        // API
        .route("/api/options", get(handlers::get_options))
        .route("/api/recommendations", post(handlers::recommend))
        .route("/healthz", get(handlers::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn serve_index() -> axum::response::Html<&'static str> {
    axum::response::Html(include_str!("ui/index.html"))
}

async fn serve_css() -> (HeaderMap, &'static str) {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/css"));
    (headers, include_str!("ui/style.css"))
}

async fn serve_js() -> (HeaderMap, &'static str) {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/javascript"),
    );
    (headers, include_str!("ui/app.js"))
}
