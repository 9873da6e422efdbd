//! Network transport: MCP over HTTP with Server-Sent Events.
//!
//! A client opens `GET /sse`, receives an `endpoint` event naming its
//! message URL, and posts JSON-RPC messages there. Responses come back as
//! `message` events on the stream. `POST /mcp` answers a message directly
//! in the HTTP response.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::{stream, Future, Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::{collections::HashMap, sync::Arc};
use tokio::{
    net::TcpListener,
    sync::{mpsc, watch, RwLock},
};
use tokio_stream::wrappers::ReceiverStream;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{JsonRpcResponse, McpServer};
use crate::{metrics, Result};

const SESSION_BUFFER: usize = 32;

pub struct HttpState {
    server: McpServer,
    sessions: RwLock<HashMap<String, mpsc::Sender<JsonRpcResponse>>>,
    shutdown: watch::Sender<bool>,
}

impl HttpState {
    pub fn new(server: McpServer) -> Arc<Self> {
        let (shutdown, _) = watch::channel(false);
        Arc::new(Self {
            server,
            sessions: RwLock::new(HashMap::new()),
            shutdown,
        })
    }

    /// End every open event stream. Streams opened afterwards end at once.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    fn stopped(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.shutdown.subscribe();
        async move {
            let _ = rx.wait_for(|stopped| *stopped).await;
        }
    }

    /// Register a new SSE session and return its id and outbound queue.
    pub async fn open_session(&self) -> (String, mpsc::Receiver<JsonRpcResponse>) {
        let session_id = Uuid::new_v4().simple().to_string();
        let (tx, rx) = mpsc::channel(SESSION_BUFFER);
        self.sessions.write().await.insert(session_id.clone(), tx);
        debug!(%session_id, "Opened SSE session");
        (session_id, rx)
    }

    pub async fn close_session(&self, session_id: &str) {
        if self.sessions.write().await.remove(session_id).is_some() {
            debug!(%session_id, "Closed SSE session");
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

// Removes the session once its event stream is dropped.
struct SessionGuard {
    state: Arc<HttpState>,
    session_id: String,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let state = self.state.clone();
        let session_id = std::mem::take(&mut self.session_id);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move { state.close_session(&session_id).await });
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_id: String,
}

pub fn build_router(server: McpServer) -> Router {
    router_with_state(HttpState::new(server))
}

pub fn router_with_state(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route("/sse", get(sse_handler))
        .route("/messages", post(post_message))
        .route("/messages/", post(post_message))
        .route("/mcp", post(post_mcp))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

pub async fn serve_http(server: McpServer, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Starting MCP server with SSE transport on {}", addr);

    serve_listener(listener, HttpState::new(server), shutdown_signal()).await?;

    info!("HTTP transport stopped");
    Ok(())
}

/// Serve until `signal` resolves, then close open SSE streams so the
/// graceful shutdown can finish.
pub async fn serve_listener<F>(listener: TcpListener, state: Arc<HttpState>, signal: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router_with_state(state.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            signal.await;
            let sessions = state.session_count().await;
            info!(sessions, "Closing SSE sessions");
            state.shutdown();
        })
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

async fn metrics_handler() -> Response {
    match metrics::gather_metrics() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to gather metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn sse_handler(
    State(state): State<Arc<HttpState>>,
) -> Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>> {
    let (session_id, rx) = state.open_session().await;

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("/messages/?session_id={}", session_id));

    let guard = SessionGuard {
        state: state.clone(),
        session_id,
    };
    let responses = ReceiverStream::new(rx).map(move |response| {
        let _session = &guard;
        Event::default().event("message").json_data(&response)
    });

    let events = stream::once(async move { Ok(endpoint) })
        .chain(responses)
        .take_until(state.stopped());
    Sse::new(events).keep_alive(KeepAlive::default())
}

async fn post_message(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<SessionQuery>,
    body: String,
) -> Response {
    let sender = state.sessions.read().await.get(&query.session_id).cloned();
    let Some(sender) = sender else {
        warn!(session_id = %query.session_id, "Message for unknown session");
        return (StatusCode::NOT_FOUND, "Could not find session").into_response();
    };

    if sender.is_closed() {
        state.close_session(&query.session_id).await;
        return (StatusCode::NOT_FOUND, "Session closed").into_response();
    }

    // Replies go out on the event stream.
    let session_id = query.session_id;
    tokio::spawn(async move {
        if let Some(response) = state.server.handle_message(&body).await {
            if sender.send(response).await.is_err() {
                debug!(%session_id, "Session closed before reply was delivered");
                state.close_session(&session_id).await;
            }
        }
    });

    (StatusCode::ACCEPTED, "Accepted").into_response()
}

async fn post_mcp(State(state): State<Arc<HttpState>>, body: String) -> Response {
    match state.server.handle_message(&body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
