//! Ingress routing.
//!
//! [`IngressRouter`] is the single entry point for everything a transport
//! receives. It is a cheap-to-clone `tower::Service` so the HTTP server, the
//! queue consumer and a function gateway can all drive the same instance.
//!
//! ```text
//! Warmup ──────────────────────────────────────────────► Empty
//! Webhook ─► authenticate ─► endpoint ─► sync reply ─► enqueue ─► reply
//!                 │401          │400        │challenge / options (no enqueue)
//! Queued ──► decode ─► chain(endpoint) ────────────────► Empty
//! Other ───► chain(nonslack) ──────────────────────────► reply
//! ```

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use serde_json::{Value, json};
use tower::Service;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use spaceport_adapter_slack::{RequestAuthenticator, ValidatedRequest, text::escape_text};
use spaceport_core::{
    BoxedEnvelopeSink, Category, ChainCategory, Endpoint, Envelope, IngressResponse,
    NormalizedEvent, PLATFORM_SOURCE, TransportEvent, WebhookRequest,
};
use spaceport_framework::Dispatcher;

/// Default destination tag on produced envelopes.
pub const DEFAULT_DESTINATION: &str = "spaceport";

/// Classifies transport events and drives authentication, dispatch and
/// enqueueing.
#[derive(Clone)]
pub struct IngressRouter {
    authenticator: RequestAuthenticator,
    dispatcher: Dispatcher,
    sink: BoxedEnvelopeSink,
    source: Arc<str>,
    destination: Arc<str>,
    echo_unhandled: bool,
}

impl IngressRouter {
    pub fn new(
        authenticator: RequestAuthenticator,
        dispatcher: Dispatcher,
        sink: BoxedEnvelopeSink,
    ) -> Self {
        Self {
            authenticator,
            dispatcher,
            sink,
            source: Arc::from(PLATFORM_SOURCE),
            destination: Arc::from(DEFAULT_DESTINATION),
            echo_unhandled: false,
        }
    }

    /// Sets the origin and target tags of produced envelopes.
    ///
    /// Only queued envelopes carrying `source` are dispatched.
    pub fn with_tags(mut self, source: impl AsRef<str>, destination: impl AsRef<str>) -> Self {
        self.source = Arc::from(source.as_ref());
        self.destination = Arc::from(destination.as_ref());
        self
    }

    /// Echo commands that have no `command_response` handler.
    pub fn with_echo_unhandled(mut self, enabled: bool) -> Self {
        self.echo_unhandled = enabled;
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handles one transport event inside a `request` span.
    pub async fn handle(&self, event: TransportEvent) -> IngressResponse {
        let span = info_span!("request", id = %Uuid::new_v4(), kind = event.kind());
        async move {
            match event {
                TransportEvent::Warmup => {
                    debug!("Warm-up request");
                    IngressResponse::Empty
                }
                TransportEvent::Webhook(request) => self.handle_webhook(request).await,
                TransportEvent::Queued(envelope) => self.handle_queued(envelope).await,
                TransportEvent::Other(raw) => self.handle_other(raw).await,
            }
        }
        .instrument(span)
        .await
    }

    /// Classifies a gateway-style payload and renders the reply in gateway
    /// form.
    pub async fn handle_raw(&self, raw: Value) -> Value {
        self.handle(TransportEvent::classify(raw))
            .await
            .into_gateway_value()
    }

    // =========================================================================
    // Webhooks
    // =========================================================================

    async fn handle_webhook(&self, request: WebhookRequest) -> IngressResponse {
        let ValidatedRequest {
            canonical_body,
            event,
        } = match self.authenticator.validate(&request) {
            Ok(validated) => validated,
            Err(e) => {
                warn!(route = %request.route, error = %e, "Rejected webhook");
                return IngressResponse::unauthorized();
            }
        };

        let endpoint = match Endpoint::from_route(&request.route) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                warn!(error = %e, "Unknown request, ignored");
                return IngressResponse::bad_request();
            }
        };
        debug!(endpoint = %endpoint, "Inbound webhook");

        let event = Arc::new(event);
        let reply = match endpoint {
            Endpoint::Actions => IngressResponse::ok(),
            Endpoint::Commands => self.acknowledge_command(&event).await,
            Endpoint::Events => {
                if event.event_type() == Some("url_verification") {
                    let challenge = event.get("challenge").cloned().unwrap_or(Value::Null);
                    info!(challenge = %challenge, "Events API challenge accepted");
                    return IngressResponse::json(json!({ "challenge": challenge }));
                }
                IngressResponse::ok()
            }
            // No asynchronous menu handling; answer before the caller times out
            Endpoint::Menus => return IngressResponse::json(json!({ "options": [] })),
        };

        let envelope = Envelope::new(canonical_body, &*self.source, &*self.destination, endpoint);
        if let Err(e) = self.sink.enqueue(envelope).await {
            error!(endpoint = %endpoint, error = %e, "Failed to enqueue envelope");
            return IngressResponse::server_error();
        }
        debug!(endpoint = %endpoint, "Envelope enqueued");

        reply
    }

    /// Runs the `command_response` handler for the event's command.
    async fn acknowledge_command(&self, event: &Arc<NormalizedEvent>) -> IngressResponse {
        let command = event.get_str("command").unwrap_or_default();

        match self.dispatcher.run_keyed(command, Arc::clone(event)).await {
            Some(Value::String(text)) => IngressResponse::json(json!({ "text": text })),
            Some(reply @ Value::Object(_)) => IngressResponse::json(reply),
            Some(other) => {
                warn!(command, reply = %other, "Ignoring command reply that is not text or an object");
                IngressResponse::ok()
            }
            None if self.echo_unhandled
                && !command.is_empty()
                && self
                    .dispatcher
                    .registry()
                    .lookup(Category::CommandResponse, command)
                    .is_none() =>
            {
                IngressResponse::json(echo_reply(event, command))
            }
            None => IngressResponse::ok(),
        }
    }

    // =========================================================================
    // Asynchronous deliveries
    // =========================================================================

    async fn handle_queued(&self, envelope: Envelope) -> IngressResponse {
        if !envelope.originated_from(&self.source) {
            info!(
                source = %envelope.source,
                destination = %envelope.destination,
                "Envelope from another source, not dispatched"
            );
            return IngressResponse::Empty;
        }

        let decoded = match envelope.decode() {
            Ok(decoded) => decoded,
            Err(e) => {
                error!(endpoint = %envelope.endpoint, error = %e, "Discarding undecodable envelope");
                return IngressResponse::Empty;
            }
        };

        match decoded.endpoint.chain_category() {
            Ok(category) => {
                self.dispatcher
                    .run_chain(category, Arc::new(decoded.event))
                    .await;
            }
            Err(e) => warn!(error = %e, "Request cannot be processed here"),
        }

        IngressResponse::Empty
    }

    async fn handle_other(&self, raw: Value) -> IngressResponse {
        let event = match NormalizedEvent::from_value(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Unclassified payload is not an object, ignored");
                return IngressResponse::Empty;
            }
        };

        match self
            .dispatcher
            .run_chain(ChainCategory::NonSlack, Arc::new(event))
            .await
        {
            Some(reply) => IngressResponse::json(reply),
            None => IngressResponse::Empty,
        }
    }
}

/// `{"response_type":"ephemeral","text":"Received `<command> <text>`"}`
fn echo_reply(event: &NormalizedEvent, command: &str) -> Value {
    let echoed = match event.get_str("text").map(str::trim) {
        Some(text) if !text.is_empty() => format!("{command} {text}"),
        _ => command.to_string(),
    };
    json!({
        "response_type": "ephemeral",
        "text": format!("Received `{}`", escape_text(&echoed)),
    })
}

impl std::fmt::Debug for IngressRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngressRouter")
            .field("dispatcher", &self.dispatcher)
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("echo_unhandled", &self.echo_unhandled)
            .finish_non_exhaustive()
    }
}

impl Service<TransportEvent> for IngressRouter {
    type Response = IngressResponse;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<IngressResponse, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: TransportEvent) -> Self::Future {
        let router = self.clone();
        Box::pin(async move { Ok(router.handle(event).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use spaceport_adapter_slack::sign;
    use spaceport_core::{EnvelopeSink, TransportError, TransportResult};
    use spaceport_framework::{Control, Handler, Registry, apology};
    use tower::ServiceExt;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
    const JSON: &str = "application/json";
    const FORM: &str = "application/x-www-form-urlencoded";

    #[derive(Default)]
    struct RecordingSink {
        envelopes: Mutex<Vec<Envelope>>,
    }

    #[async_trait]
    impl EnvelopeSink for RecordingSink {
        async fn enqueue(&self, envelope: Envelope) -> TransportResult<()> {
            self.envelopes.lock().push(envelope);
            Ok(())
        }
    }

    struct FullSink;

    #[async_trait]
    impl EnvelopeSink for FullSink {
        async fn enqueue(&self, _envelope: Envelope) -> TransportResult<()> {
            Err(TransportError::QueueFull)
        }
    }

    /// Records which handlers ran, in order.
    #[derive(Clone, Default)]
    struct Trace(Arc<Mutex<Vec<&'static str>>>);

    impl Trace {
        fn mark(&self, name: &'static str) -> impl Handler {
            let trace = self.clone();
            move |_: Arc<NormalizedEvent>, _: Control| {
                let trace = trace.clone();
                async move {
                    trace.0.lock().push(name);
                }
            }
        }

        fn names(&self) -> Vec<&'static str> {
            self.0.lock().clone()
        }
    }

    fn router_with(registry: Registry) -> (IngressRouter, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let router = IngressRouter::new(
            RequestAuthenticator::new(SECRET),
            Dispatcher::new(registry),
            sink.clone(),
        );
        (router, sink)
    }

    fn now() -> String {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            .to_string()
    }

    fn signed(route: &str, content_type: &str, body: &str) -> WebhookRequest {
        let timestamp = now();
        WebhookRequest::new(route, body)
            .with_header("X-Slack-Request-Timestamp", timestamp.clone())
            .with_header("X-Slack-Signature", sign(SECRET, &timestamp, body.as_bytes()))
            .with_header("Content-Type", content_type)
    }

    fn webhook(route: &str, content_type: &str, body: &str) -> TransportEvent {
        TransportEvent::Webhook(signed(route, content_type, body))
    }

    #[tokio::test]
    async fn test_url_verification_answers_challenge_without_enqueue() {
        let (router, sink) = router_with(Registry::new());
        let body = r#"{"type":"url_verification","challenge":"abc123"}"#;

        let response = router.handle(webhook("POST /events", JSON, body)).await;

        assert_eq!(response, IngressResponse::json(json!({ "challenge": "abc123" })));
        assert!(sink.envelopes.lock().is_empty());
    }

    #[tokio::test]
    async fn test_stripped_signature_is_unauthorized() {
        let trace = Trace::default();
        let mut registry = Registry::new();
        registry
            .register(Category::Event, None, trace.mark("event"))
            .unwrap();
        let (router, sink) = router_with(registry);

        let body = r#"{"type":"event_callback","event":{"type":"app_mention"}}"#;
        let request = WebhookRequest::new("POST /events", body)
            .with_header("X-Slack-Request-Timestamp", now())
            .with_header("Content-Type", JSON);

        let response = router.handle(TransportEvent::Webhook(request)).await;

        assert_eq!(response, IngressResponse::unauthorized());
        assert!(sink.envelopes.lock().is_empty());
        assert!(trace.names().is_empty());
    }

    #[tokio::test]
    async fn test_tampered_body_is_unauthorized() {
        let (router, sink) = router_with(Registry::new());
        let mut request = signed("POST /events", JSON, r#"{"type":"event_callback"}"#);
        request.body = r#"{"type":"event_callbacK"}"#.to_string();

        let response = router.handle(TransportEvent::Webhook(request)).await;

        assert_eq!(response, IngressResponse::unauthorized());
        assert!(sink.envelopes.lock().is_empty());
    }

    #[tokio::test]
    async fn test_stale_timestamp_is_unauthorized() {
        let trace = Trace::default();
        let mut registry = Registry::new();
        registry
            .register(Category::Event, None, trace.mark("event"))
            .unwrap();
        let (router, sink) = router_with(registry);

        // Correctly signed, but outside the replay window
        let body = r#"{"type":"event_callback"}"#;
        let timestamp = (now().parse::<u64>().unwrap() - 301).to_string();
        let request = WebhookRequest::new("POST /events", body)
            .with_header("X-Slack-Request-Timestamp", timestamp.clone())
            .with_header("X-Slack-Signature", sign(SECRET, &timestamp, body.as_bytes()))
            .with_header("Content-Type", JSON);

        let response = router.handle(TransportEvent::Webhook(request)).await;

        assert_eq!(response, IngressResponse::unauthorized());
        assert!(sink.envelopes.lock().is_empty());
        assert!(trace.names().is_empty());
    }

    #[tokio::test]
    async fn test_signed_unparseable_body_is_unauthorized() {
        let trace = Trace::default();
        let mut registry = Registry::new();
        registry
            .register(Category::Event, None, trace.mark("event"))
            .unwrap();
        registry
            .register(Category::CommandResponse, Some("/sample"), trace.mark("ack"))
            .unwrap();
        let (router, sink) = router_with(registry);

        for (route, content_type, body) in [
            ("POST /events", JSON, "{not json"),
            ("POST /events", JSON, "[1, 2, 3]"),
            ("POST /commands", "text/plain", "command=/sample"),
        ] {
            let response = router.handle(webhook(route, content_type, body)).await;
            assert_eq!(response, IngressResponse::unauthorized(), "{route} {body}");
        }

        assert!(sink.envelopes.lock().is_empty());
        assert!(trace.names().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_route_is_bad_request() {
        let (router, sink) = router_with(Registry::new());
        let response = router.handle(webhook("POST /options", JSON, "{}")).await;
        assert_eq!(response, IngressResponse::bad_request());
        assert!(sink.envelopes.lock().is_empty());
    }

    #[tokio::test]
    async fn test_unregistered_command_is_empty_ack_and_enqueued() {
        let (router, sink) = router_with(Registry::new());
        let body = "command=%2Fsample&text=hello+world&channel_id=C1";

        let response = router.handle(webhook("POST /commands", FORM, body)).await;

        assert_eq!(response, IngressResponse::ok());
        let envelopes = sink.envelopes.lock();
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].endpoint, Endpoint::Commands);
        assert_eq!(envelopes[0].source, "slack");
        assert_eq!(envelopes[0].destination, "spaceport");
        let event = envelopes[0].decode().unwrap().event;
        assert_eq!(event.get_str("command"), Some("/sample"));
        assert_eq!(event.get_str("text"), Some("hello world"));
    }

    #[tokio::test]
    async fn test_command_response_text_and_object() {
        let mut registry = Registry::new();
        registry
            .register(
                Category::CommandResponse,
                Some("/text"),
                |_: Arc<NormalizedEvent>, _: Control| async { "on it" },
            )
            .unwrap();
        registry
            .register(
                Category::CommandResponse,
                Some("/object"),
                |e: Arc<NormalizedEvent>, _: Control| async move {
                    json!({
                        "response_type": "in_channel",
                        "text": format!("_Working on `{}`..._", e.get_str("command").unwrap_or_default()),
                    })
                },
            )
            .unwrap();
        let (router, sink) = router_with(registry);

        let response = router
            .handle(webhook("POST /commands", FORM, "command=%2Ftext"))
            .await;
        assert_eq!(response, IngressResponse::json(json!({ "text": "on it" })));

        let response = router
            .handle(webhook("POST /commands", FORM, "command=%2Fobject"))
            .await;
        assert_eq!(
            response,
            IngressResponse::json(json!({
                "response_type": "in_channel",
                "text": "_Working on `/object`..._",
            }))
        );
        assert_eq!(sink.envelopes.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_failing_command_response_apologizes() {
        let mut registry = Registry::new();
        registry
            .register(
                Category::CommandResponse,
                Some("/broken"),
                |_: Arc<NormalizedEvent>, _: Control| async { Err::<(), _>("boom") },
            )
            .unwrap();
        let (router, _sink) = router_with(registry);

        let response = router
            .handle(webhook("POST /commands", FORM, "command=%2Fbroken"))
            .await;
        assert_eq!(response, IngressResponse::json(apology()));
    }

    #[tokio::test]
    async fn test_echo_unhandled_command() {
        let (router, _sink) = router_with(Registry::new());
        let router = router.with_echo_unhandled(true);

        let response = router
            .handle(webhook("POST /commands", FORM, "command=%2Fdeploy&text=api+%3Cprod%3E"))
            .await;
        assert_eq!(
            response,
            IngressResponse::json(json!({
                "response_type": "ephemeral",
                "text": "Received `/deploy api &lt;prod&gt;`",
            }))
        );

        let response = router
            .handle(webhook("POST /commands", FORM, "command=%2Fdeploy&text="))
            .await;
        assert_eq!(
            response,
            IngressResponse::json(json!({
                "response_type": "ephemeral",
                "text": "Received `/deploy`",
            }))
        );
    }

    #[tokio::test]
    async fn test_echo_skips_registered_command_returning_nothing() {
        let mut registry = Registry::new();
        registry
            .register(
                Category::CommandResponse,
                Some("/quiet"),
                |_: Arc<NormalizedEvent>, _: Control| async {},
            )
            .unwrap();
        let (router, _sink) = router_with(registry);
        let router = router.with_echo_unhandled(true);

        let response = router
            .handle(webhook("POST /commands", FORM, "command=%2Fquiet"))
            .await;
        assert_eq!(response, IngressResponse::ok());
    }

    #[tokio::test]
    async fn test_actions_pass_through_and_enqueue() {
        let (router, sink) = router_with(Registry::new());
        let body = "payload=%7B%22type%22%3A%22block_actions%22%7D";

        let response = router.handle(webhook("POST /actions", FORM, body)).await;

        assert_eq!(response, IngressResponse::ok());
        let envelopes = sink.envelopes.lock();
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].endpoint, Endpoint::Actions);
        assert_eq!(envelopes[0].body, r#"{"payload":"{\"type\":\"block_actions\"}"}"#);
    }

    #[tokio::test]
    async fn test_menus_answer_empty_options_without_enqueue() {
        let (router, sink) = router_with(Registry::new());
        let response = router
            .handle(webhook("POST /menus", FORM, "payload=%7B%7D"))
            .await;
        assert_eq!(response, IngressResponse::json(json!({ "options": [] })));
        assert!(sink.envelopes.lock().is_empty());
    }

    #[tokio::test]
    async fn test_enqueue_failure_is_server_error() {
        let router = IngressRouter::new(
            RequestAuthenticator::new(SECRET),
            Dispatcher::default(),
            Arc::new(FullSink),
        );
        let response = router
            .handle(webhook("POST /events", JSON, r#"{"type":"event_callback"}"#))
            .await;
        assert_eq!(response, IngressResponse::server_error());
    }

    #[tokio::test]
    async fn test_queued_envelope_runs_matching_chain() {
        let trace = Trace::default();
        let mut registry = Registry::new();
        registry
            .register(Category::Event, None, trace.mark("event"))
            .unwrap();
        registry
            .register(Category::Command, None, trace.mark("command"))
            .unwrap();
        registry
            .register(Category::Action, None, trace.mark("action"))
            .unwrap();
        let (router, _sink) = router_with(registry);

        for endpoint in [Endpoint::Commands, Endpoint::Events, Endpoint::Actions] {
            let envelope = Envelope::new("{}", "slack", "spaceport", endpoint);
            let response = router.handle(TransportEvent::Queued(envelope)).await;
            assert_eq!(response, IngressResponse::Empty);
        }

        assert_eq!(trace.names(), vec!["command", "event", "action"]);
    }

    #[tokio::test]
    async fn test_queued_menus_and_foreign_sources_are_not_dispatched() {
        let trace = Trace::default();
        let mut registry = Registry::new();
        registry
            .register(Category::Menu, None, trace.mark("menu"))
            .unwrap();
        registry
            .register(Category::Event, None, trace.mark("event"))
            .unwrap();
        let (router, _sink) = router_with(registry);

        let menus = Envelope::new("{}", "slack", "spaceport", Endpoint::Menus);
        router.handle(TransportEvent::Queued(menus)).await;
        let foreign = Envelope::new("{}", "scheduler", "spaceport", Endpoint::Events);
        router.handle(TransportEvent::Queued(foreign)).await;
        let broken = Envelope::new("not json", "slack", "spaceport", Endpoint::Events);
        router.handle(TransportEvent::Queued(broken)).await;

        assert!(trace.names().is_empty());
    }

    #[tokio::test]
    async fn test_custom_source_tag_roundtrip() {
        let trace = Trace::default();
        let mut registry = Registry::new();
        registry
            .register(Category::Event, None, trace.mark("event"))
            .unwrap();
        let (router, sink) = router_with(registry);
        let router = router.with_tags("edge", "workers");

        router
            .handle(webhook("POST /events", JSON, r#"{"type":"event_callback"}"#))
            .await;
        let envelope = sink.envelopes.lock().pop().unwrap();
        assert_eq!(envelope.source, "edge");
        assert_eq!(envelope.destination, "workers");

        router.handle(TransportEvent::Queued(envelope)).await;
        assert_eq!(trace.names(), vec!["event"]);
    }

    #[tokio::test]
    async fn test_other_payload_runs_nonslack_chain() {
        let mut registry = Registry::new();
        registry
            .register(
                Category::NonSlack,
                Some("echo"),
                |e: Arc<NormalizedEvent>, _: Control| async move {
                    json!({ "seen": e.get_str("job").unwrap_or_default() })
                },
            )
            .unwrap();
        let (router, sink) = router_with(registry);

        let response = router
            .handle(TransportEvent::Other(json!({ "job": "nightly" })))
            .await;
        assert_eq!(response, IngressResponse::json(json!({ "seen": "nightly" })));

        let response = router.handle(TransportEvent::Other(json!([1, 2]))).await;
        assert_eq!(response, IngressResponse::Empty);
        assert!(sink.envelopes.lock().is_empty());
    }

    #[tokio::test]
    async fn test_handle_raw_gateway_payloads() {
        let (router, sink) = router_with(Registry::new());

        assert_eq!(router.handle_raw(json!({ "warmup": true })).await, Value::Null);

        let body = r#"{"type":"url_verification","challenge":"xyz"}"#;
        let request = signed("POST /events", JSON, body);
        let raw = json!({
            "routeKey": "POST /events",
            "headers": {
                "x-slack-request-timestamp": request.header("x-slack-request-timestamp"),
                "x-slack-signature": request.header("x-slack-signature"),
                "content-type": JSON,
            },
            "body": body,
            "isBase64Encoded": false,
        });
        let reply = router.handle_raw(raw).await;
        assert_eq!(reply["statusCode"], 200);
        assert_eq!(reply["body"], r#"{"challenge":"xyz"}"#);

        let raw = json!({ "routeKey": "POST /events", "body": body });
        assert_eq!(router.handle_raw(raw).await, json!({ "statusCode": 401 }));
        assert!(sink.envelopes.lock().is_empty());
    }

    #[tokio::test]
    async fn test_router_as_tower_service() {
        let (router, _sink) = router_with(Registry::new());
        let response = router.oneshot(TransportEvent::Warmup).await.unwrap();
        assert_eq!(response, IngressResponse::Empty);
    }
}
