use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use tracing::{Instrument, info, info_span};

use super::routes::AppState;
use crate::advisor::Submission;
use crate::catalog::FormOptions;

#[derive(Serialize)]
pub struct RecommendationResponse {
    /// Outcome tag, e.g. "recommendation" or "incomplete".
    pub kind: &'static str,
    /// Text for the output region.
    pub output: String,
}

// -- Form ----------------------------------------------------------------

pub async fn get_options(State(state): State<AppState>) -> Json<FormOptions> {
    Json(state.options.as_ref().clone())
}

/// Handle one submit.  Failures are reported in `output` with HTTP 200 so
/// the page shows them where the recommendation would go.
pub async fn recommend(
    State(state): State<AppState>,
    Json(submission): Json<Submission>,
) -> Json<RecommendationResponse> {
    let request_id = uuid::Uuid::new_v4();
    let span = info_span!("recommend", %request_id, n_clicks = submission.n_clicks);

    let outcome = state.advisor.recommend(&submission).instrument(span.clone()).await;

    span.in_scope(|| info!(kind = outcome.kind(), "submission handled"));

    Json(RecommendationResponse {
        kind: outcome.kind(),
        output: outcome.message(),
    })
}

// -- Health --------------------------------------------------------------

pub async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
