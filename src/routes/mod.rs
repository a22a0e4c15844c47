pub mod analysis;
pub mod documents;
pub mod health;
mod middleware;
pub mod summary;
pub mod templates;
mod uploads;

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, StatusCode},
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::AppState;
use middleware::{HttpMakeSpan, HttpOnResponse, X_REQUEST_ID};

/// The routes wrapped in the request-id, tracing, timeout and CORS layers the
/// server runs with.
pub fn create_app(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

    create_router(state)
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            X_REQUEST_ID,
        )))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(HttpMakeSpan)
                .on_response(HttpOnResponse),
        )
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(X_REQUEST_ID),
            MakeRequestUuid,
        ))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/api/health", get(health::health))
        .route(
            "/report-template-fields",
            post(templates::report_template_fields),
        )
        .route("/analyze-graphs", post(analysis::analyze_graphs))
        .route("/analyze-spreadsheet", post(analysis::analyze_spreadsheet))
        .route(
            "/generate-executive-summary",
            post(summary::generate_executive_summary),
        )
        .route(
            "/generate-report-docx",
            post(documents::generate_report_docx),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
