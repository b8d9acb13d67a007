//! HTTP host: router assembly, middleware stack and the serve loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router, middleware};
use roster_db::Gateway;
use students::{GatewayStudentsRepository, Service, ServiceConfig, students_table};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::field::Empty;

use crate::config::{AppConfig, ServerConfig};
use crate::cors::build_cors_layer;
use crate::readiness::{self, Readiness};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Everything the host wires together before it starts accepting connections.
pub struct App {
    pub router: Router,
    pub gateway: Gateway,
    pub readiness: Readiness,
    schema_retry_interval: Duration,
}

impl App {
    /// Configure the store and assemble the router. Touches neither network nor disk.
    ///
    /// # Errors
    /// Returns an error if the database or CORS settings are invalid.
    pub fn build(config: &AppConfig) -> Result<Self> {
        let gateway =
            Gateway::connect(&config.database).context("failed to configure database pool")?;
        tracing::info!(target_db = %gateway.target(), "Database pool configured");

        let readiness = Readiness::new();
        let repo = Arc::new(GatewayStudentsRepository::new(gateway.clone()));
        let service = Arc::new(Service::new(repo, ServiceConfig::default()));
        let router = build_router(service, readiness.clone(), &config.server)?;

        Ok(Self {
            router,
            gateway,
            readiness,
            schema_retry_interval: config.database.schema_retry_interval,
        })
    }

    /// Start schema initialization in the background; the API opens once it succeeds.
    #[must_use]
    pub fn spawn_schema_init(&self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(readiness::init_schema_until_ready(
            self.gateway.clone(),
            vec![students_table()],
            self.schema_retry_interval,
            self.readiness.clone(),
            cancel,
        ))
    }
}

/// Assemble routes and the middleware stack.
///
/// At runtime requests flow outermost to innermost:
/// `SetRequestId` → `PropagateRequestId` → Trace → JSON error body → Timeout → `BodyLimit` → CORS → Router.
///
/// # Errors
/// Returns an error if the CORS configuration is invalid.
pub fn build_router(
    service: Arc<Service>,
    readiness: Readiness,
    cfg: &ServerConfig,
) -> Result<Router> {
    let api = students::router(service).layer(middleware::from_fn_with_state(
        readiness.clone(),
        readiness::require_ready,
    ));

    let mut router = Router::new()
        .route("/health", get(readiness::health))
        .route("/openapi.json", get(openapi_json))
        .with_state(readiness)
        .merge(api);

    // 6) CORS
    router = router.layer(build_cors_layer(&cfg.cors)?);

    // 5) Body limit, enforced by the extractors so the rejection goes through `ApiError`
    router = router.layer(DefaultBodyLimit::max(cfg.body_limit_bytes));

    // 4) Timeout
    router = router.layer(TimeoutLayer::with_status_code(
        StatusCode::GATEWAY_TIMEOUT,
        cfg.request_timeout,
    ));

    // 3) `{error}` body for responses produced by layers and the fallback
    router = router.layer(middleware::map_response(json_error_body));

    // 2) Trace
    router = apply_trace_layer(router);

    // 1) Request id: set when absent, echo on the response
    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
    router = router.layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid));

    Ok(router)
}

fn apply_trace_layer(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &axum::http::Request<axum::body::Body>| {
                let rid = req
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("n/a");

                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    request_id = %rid,
                    status = Empty,
                    latency_ms = Empty,
                )
            })
            .on_response(
                |res: &axum::http::Response<axum::body::Body>,
                 latency: Duration,
                 span: &tracing::Span| {
                    span.record("status", res.status().as_u16());
                    span.record("latency_ms", latency.as_millis());
                },
            ),
    )
}

/// Give bodiless or non-JSON error responses the `{"error": ...}` shape.
///
/// Handler errors are already JSON and pass through untouched, as do successes.
pub async fn json_error_body(response: Response) -> Response {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        return response;
    }

    let message = status.canonical_reason().unwrap_or("Request failed");
    let body = serde_json::json!({ "error": message }).to_string();
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(CONTENT_LENGTH);
    parts
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Response::from_parts(parts, Body::from(body))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(students::openapi())
}

/// Bind the configured address and serve until `cancel` fires.
///
/// # Errors
/// Returns an error if startup fails or the listener cannot be bound.
pub async fn run(config: AppConfig, cancel: CancellationToken) -> Result<()> {
    let app = App::build(&config)?;
    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| {
            format!(
                "failed to bind {}:{}",
                config.server.host, config.server.port
            )
        })?;
    serve(app, listener, cancel).await
}

/// Serve on an already bound listener.
///
/// On cancellation the listener stops accepting, in-flight requests drain,
/// schema initialization stops and the pool is closed.
///
/// # Errors
/// Returns an error if the server fails while running.
pub async fn serve(app: App, listener: TcpListener, cancel: CancellationToken) -> Result<()> {
    let addr = listener.local_addr().context("listener has no local address")?;
    tracing::info!(%addr, "HTTP server listening");

    let schema_task = app.spawn_schema_init(cancel.child_token());

    let shutdown = cancel.clone();
    let result = axum::serve(listener, app.router)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            tracing::info!("HTTP server draining in-flight requests");
        })
        .await
        .context("HTTP server failed");

    cancel.cancel();
    if let Err(err) = schema_task.await {
        tracing::warn!(error = %err, "Schema initialization task ended abnormally");
    }
    app.gateway.close().await;
    tracing::info!("HTTP server stopped");
    result
}
