//! Startup readiness: schema bootstrap with retries and the gate in front of the API.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::Json;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use roster_db::Gateway;
use sea_orm::sea_query::TableCreateStatement;
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// Shared flag flipped once the schema exists. Starts out not ready.
#[derive(Debug, Clone, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn mark_ready(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Create the tables, retrying every `retry` until it succeeds or `cancel` fires.
///
/// Cancellation also interrupts an attempt in flight. Marks `readiness` on
/// success. Each failed attempt is logged at warn level.
pub async fn init_schema_until_ready(
    gateway: Gateway,
    tables: Vec<TableCreateStatement>,
    retry: Duration,
    readiness: Readiness,
    cancel: CancellationToken,
) {
    let mut attempt: u64 = 0;
    loop {
        attempt = attempt.saturating_add(1);
        // An attempt against an unreachable store can block for the whole acquire timeout.
        let outcome = tokio::select! {
            () = cancel.cancelled() => {
                tracing::info!(attempt, "Schema initialization cancelled");
                return;
            }
            outcome = gateway.ensure_schema(&tables) => outcome,
        };
        match outcome {
            Ok(()) => {
                readiness.mark_ready();
                tracing::info!(attempt, target_db = %gateway.target(), "Schema ready, accepting API requests");
                return;
            }
            Err(err) => {
                tracing::warn!(
                    attempt,
                    target_db = %gateway.target(),
                    error = %err,
                    retry_in = ?retry,
                    "Schema initialization failed, retrying"
                );
            }
        }

        tokio::select! {
            () = cancel.cancelled() => {
                tracing::info!(attempt, "Schema initialization cancelled");
                return;
            }
            () = tokio::time::sleep(retry) => {}
        }
    }
}

/// Answer 503 for every request while the schema is not ready.
pub async fn require_ready(
    State(readiness): State<Readiness>,
    req: Request,
    next: Next,
) -> Response {
    if readiness.is_ready() {
        next.run(req).await
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "service is not ready" })),
        )
            .into_response()
    }
}

/// `GET /health`: 200 `{"status":"ok"}` once ready, 503 `{"status":"starting"}` before.
pub async fn health(State(readiness): State<Readiness>) -> Response {
    if readiness.is_ready() {
        (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "starting" })),
        )
            .into_response()
    }
}
