use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::bot::NewsBot;
use crate::digest::DigestKind;
use crate::metrics::{self, Metrics};

#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<NewsBot>,
}

/// Status API. `/metrics` is served only when a recorder handle is given.
pub fn create_router(state: AppState, metrics: Option<&Metrics>) -> Router {
    let api = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/digest/latest", get(latest_digest))
        .route("/digest/run", post(trigger_run))
        .with_state(state);

    let metrics_router = match metrics {
        Some(m) => m.router(),
        None => metrics::disabled_router(),
    };

    api.merge(metrics_router).layer(CorsLayer::very_permissive())
}

async fn latest_digest(State(state): State<AppState>) -> Response {
    let latest = state.bot.latest();
    let snapshot = match latest.read() {
        Ok(g) => g.clone(),
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "lock poisoned").into_response(),
    };
    match snapshot {
        Some(d) => Json(d).into_response(),
        None => (StatusCode::NOT_FOUND, "no digest yet").into_response(),
    }
}

#[derive(serde::Deserialize)]
struct RunQuery {
    #[serde(default)]
    kind: Option<String>,
}

#[derive(serde::Serialize)]
struct RunAccepted {
    status: &'static str,
    kind: DigestKind,
}

async fn trigger_run(State(state): State<AppState>, Query(q): Query<RunQuery>) -> Response {
    let kind = match q.kind.as_deref() {
        None | Some("daily") => DigestKind::Daily,
        Some("weekly") => DigestKind::Weekly,
        Some(other) => {
            return (StatusCode::BAD_REQUEST, format!("unknown digest kind `{other}`")).into_response()
        }
    };
    let Some(guard) = state.bot.try_claim_run() else {
        return (StatusCode::CONFLICT, "a digest run is already in progress").into_response();
    };

    info!(target: "digest", kind = kind.label(), "run requested over HTTP");
    let bot = state.bot.clone();
    tokio::spawn(async move {
        bot.run_digest_with(guard, kind).await;
    });
    (
        StatusCode::ACCEPTED,
        Json(RunAccepted {
            status: "accepted",
            kind,
        }),
    )
        .into_response()
}
