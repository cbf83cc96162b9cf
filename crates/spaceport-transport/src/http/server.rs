//! HTTP ingress server.
//!
//! Routes:
//!
//! | Method | Path | Transport event |
//! |---|---|---|
//! | `GET` | `/warmup` | [`TransportEvent::Warmup`] |
//! | `POST` | `{queue_path}` (optional) | [`TransportEvent::Queued`], answered `202` before processing |
//! | `POST` | any other path | [`TransportEvent::Webhook`] with route `POST {path}` |
//!
//! Warm-up and webhook calls run under a timeout equal to the caller's
//! acknowledgment deadline.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use subtle::ConstantTimeEq;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::timeout::Timeout;
use tower::timeout::error::Elapsed;
use tower::{Service, ServiceBuilder, ServiceExt};
use tracing::{debug, error, info, trace, warn};

use spaceport_core::{
    Envelope, IngressResponse, TransportError, TransportEvent, TransportResult, WebhookRequest,
};

/// Default synchronous acknowledgment deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(3000);

/// Services the server can drive.
pub trait IngressService:
    Service<TransportEvent, Response = IngressResponse, Error = Infallible, Future: Send>
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> IngressService for T where
    T: Service<TransportEvent, Response = IngressResponse, Error = Infallible, Future: Send>
        + Clone
        + Send
        + Sync
        + 'static
{
}

// =============================================================================
// Configuration
// =============================================================================

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Bind address, e.g. `0.0.0.0:8080`.
    pub addr: String,
    pub request_timeout: Duration,
    /// Path accepting forwarded envelopes; disabled when `None`.
    pub queue_path: Option<String>,
    /// Bearer token required on the queue path.
    pub queue_token: Option<String>,
}

impl HttpServerConfig {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            queue_path: None,
            queue_token: None,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Accepts envelopes on `path`, guarded by a bearer token.
    ///
    /// Envelopes skip signature checks, so a missing or blank token is an
    /// error.
    pub fn with_queue(
        mut self,
        path: impl Into<String>,
        token: Option<String>,
    ) -> TransportResult<Self> {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| TransportError::MissingToken { path: path.clone() })?;
        self.queue_path = Some(path);
        self.queue_token = Some(token);
        Ok(self)
    }
}

// =============================================================================
// Listener
// =============================================================================

/// Handle to a running server.
pub struct ListenerHandle {
    id: String,
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections and waits for in-flight requests.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.task.await {
            error!(error = %e, "HTTP server task failed");
        }
    }
}

/// Binds the server and starts serving in the background.
pub async fn listen<S: IngressService>(
    config: HttpServerConfig,
    service: S,
) -> TransportResult<ListenerHandle> {
    let app = router(&config, service);

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    let local_addr = listener.local_addr()?;

    info!(
        addr = %local_addr,
        queue_path = config.queue_path.as_deref().unwrap_or("-"),
        timeout_ms = config.request_timeout.as_millis() as u64,
        "HTTP server listening"
    );

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
            info!("HTTP server shutting down");
        });
        if let Err(e) = server.await {
            error!(error = %e, "HTTP server error");
        }
    });

    Ok(ListenerHandle {
        id: format!("http-server-{local_addr}"),
        local_addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

// =============================================================================
// Routing
// =============================================================================

/// Shared state for the HTTP server.
#[derive(Clone)]
struct ServerState<S> {
    /// Used for background envelope processing.
    service: S,
    /// Used for anything the caller waits on.
    timed: Timeout<S>,
    queue_token: Option<String>,
}

/// Builds the axum router without binding it.
pub fn router<S: IngressService>(config: &HttpServerConfig, service: S) -> Router {
    let state = ServerState {
        timed: ServiceBuilder::new()
            .timeout(config.request_timeout)
            .service(service.clone()),
        service,
        queue_token: config.queue_token.clone(),
    };

    let mut router = Router::new()
        .route("/warmup", get(warmup_handler::<S>))
        .route("/{*route}", post(webhook_handler::<S>));

    if let Some(path) = &config.queue_path {
        router = router.route(path, post(queue_handler::<S>));
    }

    router.with_state(state)
}

async fn warmup_handler<S: IngressService>(State(state): State<ServerState<S>>) -> Response {
    call_timed(state, TransportEvent::Warmup).await
}

async fn webhook_handler<S: IngressService>(
    State(state): State<ServerState<S>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    trace!(path = uri.path(), len = body.len(), "Received webhook");
    let request = webhook_request(&uri, &headers, &body);
    call_timed(state, TransportEvent::Webhook(request)).await
}

async fn queue_handler<S: IngressService>(
    State(state): State<ServerState<S>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let authorized = match (state.queue_token.as_deref(), presented) {
        (Some(expected), Some(presented)) => token_matches(expected, presented),
        _ => false,
    };
    if !authorized {
        warn!("Rejected envelope with missing or wrong token");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let envelope = match std::str::from_utf8(&body) {
        Ok(text) => Envelope::from_json(text),
        Err(e) => {
            warn!(error = %e, "Envelope body is not UTF-8");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    let envelope = match envelope {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Rejected malformed envelope");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    debug!(endpoint = %envelope.endpoint, source = %envelope.source, "Envelope accepted");
    let service = state.service;
    tokio::spawn(async move {
        match service.oneshot(TransportEvent::Queued(envelope)).await {
            Ok(response) => trace!(status = response.status_code(), "Envelope processed"),
            Err(never) => match never {},
        }
    });

    StatusCode::ACCEPTED.into_response()
}

/// Constant-time token comparison. Length differences are not hidden.
fn token_matches(expected: &str, presented: &str) -> bool {
    expected.len() == presented.len()
        && bool::from(expected.as_bytes().ct_eq(presented.as_bytes()))
}

async fn call_timed<S: IngressService>(state: ServerState<S>, event: TransportEvent) -> Response {
    let kind = event.kind();
    match state.timed.oneshot(event).await {
        Ok(response) => render(response),
        Err(e) if e.is::<Elapsed>() => {
            warn!(kind, "Request exceeded the acknowledgment deadline");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
        Err(e) => {
            error!(kind, error = %e, "Ingress service failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Builds the transport-neutral request; non-UTF-8 bodies travel as base64.
fn webhook_request(uri: &Uri, headers: &HeaderMap, body: &Bytes) -> WebhookRequest {
    let (text, encoded) = match std::str::from_utf8(body) {
        Ok(text) => (text.to_string(), false),
        Err(_) => (STANDARD.encode(body), true),
    };

    let mut request =
        WebhookRequest::new(format!("POST {}", uri.path()), text).with_base64_body(encoded);
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            request.insert_header(name.as_str(), value);
        }
    }
    request
}

fn render(response: IngressResponse) -> Response {
    match response {
        IngressResponse::Empty => StatusCode::OK.into_response(),
        IngressResponse::Status(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        IngressResponse::Json(body) => Json(body).into_response(),
    }
}
