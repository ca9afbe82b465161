//! HTTP + Server-Sent Events transport implementation.
//!
//! Clients open an event stream with `GET /sse`. The first event
//! (`endpoint`) tells them where to POST their JSON-RPC messages; every
//! response is then pushed back as a `message` event on that same stream.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::{Stream, StreamExt, stream};
use serde::Deserialize;
use serde_json::{Value, json};
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{Instrument, error, info, instrument, warn};

use super::config::SseConfig;
use super::jsonrpc::{JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION};
use super::session::SessionRegistry;
use super::{TransportError, TransportResult};
use crate::core::McpServer;
use crate::core::server::INSTRUCTIONS;

/// Responses queued per session before senders wait.
const SESSION_CHANNEL_CAPACITY: usize = 32;

/// SSE transport handler.
pub struct SseTransport {
    config: SseConfig,
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The MCP server instance.
    server: McpServer,
    /// Open event streams, keyed by session id.
    sessions: SessionRegistry,
    /// Path advertised in the `endpoint` event.
    message_path: Arc<str>,
}

impl AppState {
    /// Create state for a server, advertising the configured message path.
    pub fn new(server: McpServer, config: &SseConfig) -> Self {
        Self {
            server,
            sessions: SessionRegistry::new(),
            message_path: Arc::from(config.message_path.as_str()),
        }
    }

    /// Sessions currently connected.
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }
}

/// Query string of `POST /messages`.
#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: String,
}

impl SseTransport {
    /// Create a new SSE transport with the given config.
    pub fn new(config: SseConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Build the axum router serving the stream, message and info routes.
    pub fn router(&self, state: AppState) -> Router {
        let mut app = Router::new()
            .route(&self.config.sse_path, get(handle_sse))
            .route(&self.config.message_path, post(handle_message))
            .route("/health", get(health_check))
            .route("/", get(root_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        app
    }

    /// Run the SSE transport until the listener fails.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        for path in [&self.config.sse_path, &self.config.message_path] {
            if !path.starts_with('/') {
                return Err(TransportError::init(format!(
                    "route path '{path}' must start with '/'"
                )));
            }
        }

        let addr = self.address();
        let state = AppState::new(server, &self.config);
        let app = self.router(state);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("Ready - listening on {} (MCP over SSE, CORS {})", addr, cors_status);
        info!("  → Stream:   GET {}", self.config.sse_path);
        info!("  → Messages: POST {}?sessionId=<id>", self.config.message_path);
        info!("  → Health:   GET /health");

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// URL a client must POST to for the given session.
fn endpoint_url(message_path: &str, session_id: &str) -> String {
    match serde_urlencoded::to_string([("sessionId", session_id)]) {
        Ok(query) => format!("{message_path}?{query}"),
        Err(_) => format!("{message_path}?sessionId={session_id}"),
    }
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "SSE",
        "endpoints": {
            "messages": state.message_path.as_ref(),
            "health": "/health"
        },
        "protocol": "JSON-RPC 2.0",
        "activeSessions": state.sessions.len()
    }))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Open an event stream for a new session.
async fn handle_sse(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (guard, receiver) = state.sessions.open(SESSION_CHANNEL_CAPACITY);
    info!(session_id = %guard.id(), "SSE client connected");

    let endpoint = Event::default()
        .event("endpoint")
        .data(endpoint_url(&state.message_path, guard.id()));

    // The guard travels with the stream, so the session closes with it.
    let messages = stream::unfold((receiver, guard), |(mut receiver, guard)| async move {
        let message = receiver.recv().await?;
        let event = Event::default().event("message").data(message.to_string());
        Some((event, (receiver, guard)))
    });

    Sse::new(stream::once(async move { endpoint }).chain(messages).map(Ok))
        .keep_alive(KeepAlive::default())
}

/// Accept a JSON-RPC message; the response goes out on the session's stream.
#[instrument(skip_all, fields(session_id, method))]
async fn handle_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    let span = tracing::Span::current();
    span.record("session_id", query.session_id.as_str());
    span.record("method", request.method.as_str());

    let Some(sender) = state.sessions.sender(&query.session_id) else {
        warn!("Message for unknown session");
        return (StatusCode::NOT_FOUND, "Unknown session").into_response();
    };
    info!("Received JSON-RPC message");

    tokio::spawn(
        async move {
            let Some(response) = process_request(&state, request).await else {
                return;
            };
            match serde_json::to_value(&response) {
                Ok(value) => {
                    if sender.send(value).await.is_err() {
                        warn!("Session closed before the response was delivered");
                    }
                }
                Err(e) => error!(error = %e, "Failed to serialize JSON-RPC response"),
            }
        }
        .instrument(span),
    );

    StatusCode::ACCEPTED.into_response()
}

/// Process a JSON-RPC message. Notifications produce no response.
async fn process_request(state: &AppState, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    if request.jsonrpc != "2.0" {
        if request.is_notification() {
            warn!("Dropping notification with jsonrpc '{}'", request.jsonrpc);
            return None;
        }
        return Some(JsonRpcResponse::invalid_request(request.id));
    }

    match request.method.as_str() {
        "initialize" => Some(handle_initialize(state, request)),
        "ping" => Some(JsonRpcResponse::success(request.id, json!({}))),
        "tools/list" => Some(handle_tools_list(state, request)),
        "tools/call" => Some(handle_tools_call(state, request).await),
        method if method.starts_with("notifications/") => {
            handle_notification(&request);
            None
        }
        _ if request.is_notification() => {
            info!("Ignoring unknown notification: {}", request.method);
            None
        }
        _ => {
            warn!("Unknown method: {}", request.method);
            Some(JsonRpcResponse::method_not_found(request.id, &request.method))
        }
    }
}

/// Handle initialize request.
fn handle_initialize(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing initialize request");

    let client_version = request
        .params
        .as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str);
    if let Some(version) = client_version.filter(|v| *v != PROTOCOL_VERSION) {
        info!("Client requested protocol {}, answering with {}", version, PROTOCOL_VERSION);
    }

    let result = json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": state.server.name(),
            "version": state.server.version()
        },
        "instructions": INSTRUCTIONS
    });

    JsonRpcResponse::success(request.id, result)
}

/// Handle tools/list request.
fn handle_tools_list(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing tools/list request");

    let tools = state.server.list_tools();
    JsonRpcResponse::success(request.id, json!({ "tools": tools }))
}

/// Handle tools/call request.
async fn handle_tools_call(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing tools/call request");

    let params = match request.params {
        Some(p) => p,
        None => return JsonRpcResponse::invalid_params(request.id, "Missing params"),
    };

    let name = match params.get("name").and_then(Value::as_str) {
        Some(n) => n.to_string(),
        None => return JsonRpcResponse::invalid_params(request.id, "Missing tool name"),
    };

    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

    match state.server.call_tool(&name, arguments).await {
        Ok(result) => JsonRpcResponse::success(request.id, result),
        Err(crate::Error::Json(e)) => JsonRpcResponse::internal_error(request.id, e.to_string()),
        Err(e) => JsonRpcResponse::invalid_params(request.id, e.to_string()),
    }
}

/// Handle notifications (no response).
fn handle_notification(request: &JsonRpcRequest) {
    match request.method.as_str() {
        "notifications/initialized" => {
            info!("Client sent initialized notification");
        }
        _ => {
            info!("Received notification: {}", request.method);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::test_support::{ScriptedProvider, config_for, context_with};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn state(reply: &str) -> AppState {
        let ctx = context_with(config_for("http://127.0.0.1:9"), ScriptedProvider::replying(reply));
        AppState::new(McpServer::with_context(ctx), &SseConfig::default())
    }

    fn request(value: Value) -> JsonRpcRequest {
        serde_json::from_value(value).unwrap()
    }

    fn router(state: &AppState) -> Router {
        SseTransport::new(SseConfig::default()).router(state.clone())
    }

    fn post_message(session_id: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/messages?sessionId={session_id}"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(endpoint_url("/messages", "abc-123"), "/messages?sessionId=abc-123");
    }

    #[tokio::test]
    async fn test_initialize_handshake() {
        let state = state("");

        let response = process_request(
            &state,
            request(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": { "protocolVersion": "2024-11-05", "capabilities": {} }
            })),
        )
        .await
        .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "weather-insight-mcp");
        assert!(result["capabilities"]["tools"].is_object());

        let ack = process_request(
            &state,
            request(json!({ "jsonrpc": "2.0", "method": "notifications/initialized" })),
        )
        .await;
        assert!(ack.is_none());
    }

    #[tokio::test]
    async fn test_ping_and_tools_list() {
        let state = state("");

        let pong = process_request(&state, request(json!({ "jsonrpc": "2.0", "id": "a", "method": "ping" })))
            .await
            .unwrap();
        assert_eq!(pong.id, Some(json!("a")));
        assert_eq!(pong.result, Some(json!({})));

        let listed = process_request(&state, request(json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" })))
            .await
            .unwrap();
        assert_eq!(listed.result.unwrap()["tools"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_tools_call() {
        let state = state("Hello from the model");

        let response = process_request(
            &state,
            request(json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "tools/call",
                "params": { "name": "raw-completion", "arguments": { "message": "hi" } }
            })),
        )
        .await
        .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["content"][0]["text"], "Hello from the model");
    }

    #[tokio::test]
    async fn test_tools_call_errors() {
        let state = state("");

        let missing_name = process_request(
            &state,
            request(json!({ "jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {} })),
        )
        .await
        .unwrap();
        assert_eq!(missing_name.error.unwrap().code, -32602);

        let blank_city = process_request(
            &state,
            request(json!({
                "jsonrpc": "2.0",
                "id": 5,
                "method": "tools/call",
                "params": { "name": "weather-insight", "arguments": { "city": "  " } }
            })),
        )
        .await
        .unwrap();
        assert_eq!(blank_city.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_unknown_method_and_bad_version() {
        let state = state("");

        let unknown = process_request(&state, request(json!({ "jsonrpc": "2.0", "id": 6, "method": "resources/list" })))
            .await
            .unwrap();
        assert_eq!(unknown.error.unwrap().code, -32601);

        let silent = process_request(&state, request(json!({ "jsonrpc": "2.0", "method": "resources/list" }))).await;
        assert!(silent.is_none());

        let bad = process_request(&state, request(json!({ "jsonrpc": "1.0", "id": 7, "method": "ping" })))
            .await
            .unwrap();
        assert_eq!(bad.error.unwrap().code, -32600);
    }

    #[tokio::test]
    async fn test_bad_version_notification_gets_no_reply() {
        let state = state("");

        let without_id = process_request(&state, request(json!({ "jsonrpc": "1.0", "method": "ping" }))).await;
        assert!(without_id.is_none());

        let initialized = process_request(
            &state,
            request(json!({ "jsonrpc": "1.0", "method": "notifications/initialized" })),
        )
        .await;
        assert!(initialized.is_none());
    }

    #[tokio::test]
    async fn test_message_for_unknown_session_is_404() {
        let state = state("");
        let response = router(&state)
            .oneshot(post_message("does-not-exist", json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_message_is_answered_on_session_stream() {
        let state = state("");
        let (guard, mut rx) = state.sessions.open(4);

        let response = router(&state)
            .oneshot(post_message(guard.id(), json!({ "jsonrpc": "2.0", "id": 9, "method": "ping" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let delivered = rx.recv().await.unwrap();
        assert_eq!(delivered["id"], 9);
        assert_eq!(delivered["result"], json!({}));
    }

    #[tokio::test]
    async fn test_stream_announces_endpoint_and_closes_session() {
        let state = state("");
        let response = router(&state)
            .oneshot(Request::builder().uri("/sse").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.sessions().len(), 1);

        let mut body = response.into_body().into_data_stream();
        let first = body.next().await.unwrap().unwrap();
        let first = String::from_utf8_lossy(&first);
        assert!(first.contains("event: endpoint"), "got: {first}");
        assert!(first.contains("data: /messages?sessionId="), "got: {first}");

        drop(body);
        assert!(state.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_health_check() {
        let state = state("");
        let response = router(&state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
