//! MCP gateway service: the HTTP JSON-RPC endpoint.

use crate::domain::config::{GatewayConfig, LimitsConfig};
use crate::domain::error::{ApiError, GatewayError};
use crate::domain::methods::get_method_info;
use crate::middleware::{create_cors_layer, GatewayMetrics, RequestTimer};
use crate::router::route_method;
use crate::rpc::McpHandlers;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use nano_telemetry::subsystems;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

const MAX_ID_LENGTH: usize = 256;

/// MCP gateway service state
pub struct McpGatewayService {
    config: GatewayConfig,
    handlers: Arc<McpHandlers>,
    metrics: Arc<GatewayMetrics>,
}

impl McpGatewayService {
    pub fn new(config: GatewayConfig, handlers: McpHandlers) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Self {
            config,
            handlers: Arc::new(handlers),
            metrics: Arc::new(GatewayMetrics::new()),
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    /// JSON-RPC on `POST /`, liveness on `GET /health`.
    pub fn build_router(&self) -> Router {
        let state = AppState {
            handlers: Arc::clone(&self.handlers),
            metrics: Arc::clone(&self.metrics),
            limits: self.config.limits.clone(),
        };

        // Innermost first. Each `layer` call maps the response body back to
        // `axum::body::Body` before the next layer wraps it.
        Router::new()
            .route("/", post(handle_json_rpc))
            .route("/health", get(health_check))
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(self.config.limits.max_request_size))
            .layer(TimeoutLayer::new(self.config.timeouts.request))
            .layer(TraceLayer::new_for_http())
            .layer(create_cors_layer(&self.config.cors))
            .with_state(state)
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn serve<F>(&self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{}: {}", addr, e)))?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener.
    pub async fn serve_on<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener
            .local_addr()
            .map_err(|e| GatewayError::Bind(e.to_string()))?;
        nano_telemetry::log_event!(
            info,
            subsystems::GATEWAY,
            "MCP gateway listening",
            addr = %addr
        );

        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GatewayError::Serve(e.to_string()))?;

        nano_telemetry::log_event!(info, subsystems::GATEWAY, "MCP gateway stopped");
        Ok(())
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    handlers: Arc<McpHandlers>,
    metrics: Arc<GatewayMetrics>,
    limits: LimitsConfig,
}

fn error_response(id: Option<Value>, error: &ApiError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id.unwrap_or(Value::Null),
        "error": error.to_json(),
    })
}

/// Handle a JSON-RPC request or batch. Notifications get no response
/// entry; a body of only notifications is answered with 202.
async fn handle_json_rpc(State(state): State<AppState>, body: String) -> Response {
    let request: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(error_response(None, &ApiError::parse_error(e.to_string()))),
            )
                .into_response();
        }
    };

    match request {
        Value::Array(requests) => {
            if requests.is_empty() {
                let error = ApiError::invalid_request("empty batch");
                return (StatusCode::OK, Json(error_response(None, &error))).into_response();
            }
            if requests.len() > state.limits.max_batch_size {
                let error = ApiError::limit_exceeded(format!(
                    "batch of {} exceeds {} requests",
                    requests.len(),
                    state.limits.max_batch_size
                ));
                return (StatusCode::OK, Json(error_response(None, &error))).into_response();
            }

            state.metrics.record_batch();
            let mut responses = Vec::with_capacity(requests.len());
            for req in &requests {
                if let Some(resp) = process_single_request(&state, req).await {
                    responses.push(resp);
                }
            }

            if responses.is_empty() {
                StatusCode::ACCEPTED.into_response()
            } else {
                (StatusCode::OK, Json(Value::Array(responses))).into_response()
            }
        }
        single => match process_single_request(&state, &single).await {
            Some(resp) => (StatusCode::OK, Json(resp)).into_response(),
            None => StatusCode::ACCEPTED.into_response(),
        },
    }
}

/// Reject ids that are not a short string or a number.
fn validate_id(id: &Value) -> Result<(), ApiError> {
    match id {
        Value::Number(_) => Ok(()),
        Value::String(s) if s.is_empty() => Err(ApiError::invalid_request("empty string id")),
        Value::String(s) if s.len() > MAX_ID_LENGTH => Err(ApiError::invalid_request(format!(
            "id string too long (max {} chars)",
            MAX_ID_LENGTH
        ))),
        Value::String(_) => Ok(()),
        Value::Null => Err(ApiError::invalid_request(
            "null id (notifications use no id)",
        )),
        _ => Err(ApiError::invalid_request("id must be string or number")),
    }
}

/// Process a single JSON-RPC request. `None` for notifications.
async fn process_single_request(state: &AppState, request: &Value) -> Option<Value> {
    let Some(object) = request.as_object() else {
        return Some(error_response(
            None,
            &ApiError::invalid_request("request must be an object"),
        ));
    };

    let method = object.get("method").and_then(Value::as_str);
    let id = object.get("id").cloned();

    let Some(id) = id else {
        // MCP clients send `notifications/initialized` and friends without
        // an id. Those need no reply; anything else must carry one.
        if method.is_some_and(|m| m.starts_with("notifications/")) {
            return None;
        }
        return Some(error_response(
            None,
            &ApiError::invalid_request("missing id"),
        ));
    };

    if let Err(e) = validate_id(&id) {
        return Some(error_response(None, &e));
    }
    if let Some(version) = object.get("jsonrpc") {
        if version.as_str() != Some("2.0") {
            return Some(error_response(
                Some(id),
                &ApiError::invalid_request("jsonrpc must be \"2.0\""),
            ));
        }
    }
    let Some(method) = method else {
        return Some(error_response(
            Some(id),
            &ApiError::invalid_request("missing method"),
        ));
    };

    let is_write = get_method_info(method).is_some_and(|info| info.is_write)
        || (method == "tools/call" && called_tool_is_write(object.get("params")));
    let timer = RequestTimer::start();
    let result = route_method(&state.handlers, method, object.get("params")).await;
    let latency_ms = timer.elapsed_ms();

    state
        .metrics
        .record_request(result.is_ok(), is_write, latency_ms);

    Some(match result {
        Ok(value) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": value,
        }),
        Err(e) => {
            nano_telemetry::log_event!(
                debug,
                subsystems::GATEWAY,
                "JSON-RPC request failed",
                method = method,
                code = e.code,
                latency_ms = latency_ms
            );
            error_response(Some(id), &e)
        }
    })
}

fn called_tool_is_write(params: Option<&Value>) -> bool {
    params
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .and_then(get_method_info)
        .is_some_and(|info| info.is_write)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "nano-mcp",
        "version": env!("CARGO_PKG_VERSION"),
        "metrics": state.metrics.to_json(),
    }))
}
