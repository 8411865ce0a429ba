//! HTTP boundary: router, middleware stack and the JSON envelope.

use axum::body::Body;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::ConnectInfo;
use axum::http::header::{ACCEPT, ALLOW, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{middleware, Json, Router};
use serde::Serialize;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any as AnyOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};

use crate::config::Config;
use crate::domain::ports::OutboxFeed;
use crate::service::{AccountService, OrderLifecycle};
use crate::{AccountError, OrderError};

pub mod auth;
pub mod orders;
pub mod outbox;
pub mod rate_limit;
pub mod users;

use rate_limit::RateLimiter;

const REQUEST_ID: &str = "x-request-id";

#[derive(Clone)]
pub struct AppState {
    pub orders: OrderLifecycle,
    pub accounts: AccountService,
    pub outbox: Arc<dyn OutboxFeed>,
}

/// Routes only, without the outer middleware stack.
pub fn routes(state: AppState) -> Router {
    let public = Router::new()
        .route("/healthz", get(health))
        .route("/auth/register", post(users::register))
        .route("/auth/login", post(users::login));

    let protected = Router::new()
        .route("/users/me", get(users::me).patch(users::update_me))
        .route("/orders", get(orders::list).post(orders::create))
        .route("/orders/:id", get(orders::get_one))
        .route("/orders/:id/status", patch(orders::update_status))
        .route("/orders/:id/cancel", post(orders::cancel))
        .route("/admin/users", get(users::admin_list))
        .route("/admin/outbox", get(outbox::admin_list))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        .nest("/api/v1", public.merge(protected))
        .fallback(|| async { ApiError::not_found("resource not found") })
        .layer(middleware::map_response(envelope_status))
        .with_state(state)
}

pub fn app(state: AppState, config: &Config) -> Router { with_middleware(routes(state), config) }

/// Outer stack, innermost first: rate limit, CORS, timeout, panic recovery, tracing, request id.
pub fn with_middleware(router: Router, config: &Config) -> Router {
    let limiter = RateLimiter::new(config.rate_limit_rps, config.rate_limit_burst);
    router
        .layer(middleware::from_fn_with_state(limiter, rate_limit::throttle))
        .layer(cors_layer(&config.cors_origins))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(middleware::map_response(envelope_status))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id = request.headers().get(REQUEST_ID).and_then(|v| v.to_str().ok()).unwrap_or("-");
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
        remote_ip = %client_ip(request),
    )
}

/// First `X-Forwarded-For` entry, then the peer address.
fn client_ip(request: &Request<Body>) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    match forwarded {
        Some(ip) => ip.to_string(),
        None => request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map_or_else(|| "unknown".to_string(), |info| info.0.ip().to_string()),
    }
}

/// Wraps the bodiless 405 and 408 responses produced by routing and the timeout layer.
async fn envelope_status(response: Response) -> Response {
    let error = match response.status() {
        StatusCode::METHOD_NOT_ALLOWED => ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed", "method not allowed"),
        StatusCode::REQUEST_TIMEOUT => ApiError::new(StatusCode::REQUEST_TIMEOUT, "request_timeout", "request timed out"),
        _ => return response,
    };
    let allow = response.headers().get(ALLOW).cloned();
    let mut enveloped = error.into_response();
    if let Some(allow) = allow {
        enveloped.headers_mut().insert(ALLOW, allow);
    }
    enveloped
}

fn panic_response(_: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("handler panicked");
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error").into_response()
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let request_id = HeaderName::from_static(REQUEST_ID);
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([ACCEPT, AUTHORIZATION, CONTENT_TYPE, request_id.clone()])
        .expose_headers([request_id])
        .max_age(Duration::from_secs(300));
    if origins.iter().any(|o| o == "*") {
        cors.allow_origin(AnyOrigin)
    } else {
        cors.allow_origin(AllowOrigin::list(origins.iter().filter_map(|o| o.parse::<HeaderValue>().ok())))
    }
}

async fn health() -> Json<Envelope<serde_json::Value>> { ok(serde_json::json!({ "status": "ok" })) }

// =============================================================================
// Envelope & errors
// =============================================================================

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> { Json(Envelope { success: true, data: Some(data), error: None }) }

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, "invalid_input", message) }

    pub fn unauthorized(message: impl Into<String>) -> Self { Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message) }

    pub fn forbidden(message: impl Into<String>) -> Self { Self::new(StatusCode::FORBIDDEN, "forbidden", message) }

    pub fn not_found(message: impl Into<String>) -> Self { Self::new(StatusCode::NOT_FOUND, "not_found", message) }

    fn internal(error: &dyn std::fmt::Display) -> Self {
        tracing::error!(error = %error, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope::<()> { success: false, data: None, error: Some(ErrorBody { code: self.code, message: self.message }) };
        (self.status, Json(body)).into_response()
    }
}

impl From<OrderError> for ApiError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::InvalidItem(_) => Self::invalid_input(e.to_string()),
            OrderError::InvalidTransition { .. } => Self::new(StatusCode::BAD_REQUEST, "invalid_transition", e.to_string()),
            OrderError::NotFound => Self::not_found("order not found"),
            OrderError::Forbidden => Self::forbidden("not allowed"),
            OrderError::Conflict => Self::new(StatusCode::CONFLICT, "conflict", e.to_string()),
            OrderError::Persistence(_) => Self::internal(&e),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::InvalidInput(message) => Self::invalid_input(message),
            AccountError::EmailTaken => Self::new(StatusCode::CONFLICT, "email_taken", e.to_string()),
            AccountError::InvalidCredentials => Self::unauthorized(e.to_string()),
            AccountError::NotFound => Self::not_found(e.to_string()),
            AccountError::Token(_) | AccountError::Hashing(_) | AccountError::Persistence(_) => Self::internal(&e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        tracing::debug!(error = %e, "rejected request body");
        Self::invalid_input("invalid json")
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self { Self::invalid_input("invalid id") }
}

// =============================================================================
// Pagination
// =============================================================================

/// Missing or unparseable values use `default`; out-of-range ones are clamped.
pub(crate) fn parse_bounded(raw: Option<&str>, default: i64, min: i64, max: i64) -> i64 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<i64>().ok())
        .map_or(default, |v| v.clamp(min, max))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        Self { page: parse_bounded(page, 1, 1, 100_000), limit: parse_bounded(limit, 20, 1, 100) }
    }

    pub fn offset(&self) -> i64 { (self.page - 1) * self.limit }
}

#[derive(Debug, Serialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
}
