//! Runtime orchestration.
//!
//! [`SpaceportRuntime`] turns a validated configuration into running
//! components: the Web API client handed to handlers, the queue sink the
//! router produces into, the local queue consumer and the HTTP server.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use spaceport_runtime::SpaceportRuntime;
//! use spaceport_framework::Registry;
//!
//! let runtime = SpaceportRuntime::builder()
//!     .config_file("spaceport.toml")
//!     .build()?;
//!
//! let registry = Registry::import()?;
//! runtime.run(registry).await?;
//! ```

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use figment::Provider;
use parking_lot::Mutex;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use spaceport_adapter_slack::{RequestAuthenticator, SlackWeb};
use spaceport_core::{BoxedChatApi, BoxedEnvelopeSink};
use spaceport_framework::{Dispatcher, Registry};

use crate::config::{ConfigLoader, QueueConfig, QueueMode, SlackConfig, SpaceportConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;
use crate::queue::{self, LocalQueue, LocalQueueReceiver};
use crate::router::IngressRouter;

/// The main Spaceport runtime.
pub struct SpaceportRuntime {
    config: SpaceportConfig,
    web: SlackWeb,
    sink: BoxedEnvelopeSink,
    /// Present in local queue mode while no consumer is running.
    receiver: Mutex<Option<LocalQueueReceiver>>,
    running: AtomicBool,
}

impl SpaceportRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from configuration.
    ///
    /// Fails if the configuration does not pass [`validate_config`]. Logging
    /// is initialized here unless a subscriber is already installed.
    pub fn from_config(config: SpaceportConfig) -> RuntimeResult<Self> {
        validate_config(&config)?;
        logging::init_from_config(&config.logging);

        let web = SlackWeb::new(create_chat_api(&config.slack)?)
            .with_log_channel(config.slack.log_channel_id.clone());
        let (sink, receiver) = create_queue(&config.queue)?;

        info!(
            log_level = %config.logging.level,
            queue_mode = ?config.queue.mode,
            addr = %config.server.bind_addr(),
            "Runtime initialized from configuration"
        );

        Ok(Self {
            config,
            web,
            sink,
            receiver: Mutex::new(receiver),
            running: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &SpaceportConfig {
        &self.config
    }

    /// Web API access for handlers.
    pub fn slack_web(&self) -> &SlackWeb {
        &self.web
    }

    /// Where the router puts envelopes.
    pub fn envelope_sink(&self) -> &BoxedEnvelopeSink {
        &self.sink
    }

    pub fn authenticator(&self) -> RequestAuthenticator {
        RequestAuthenticator::new(&self.config.slack.signing_secret)
            .with_replay_window(self.config.slack.replay_window())
    }

    /// Builds a router over `dispatcher` with this runtime's credentials and
    /// queue.
    ///
    /// Useful on its own behind a function gateway via
    /// [`IngressRouter::handle_raw`].
    pub fn router(&self, dispatcher: Dispatcher) -> IngressRouter {
        IngressRouter::new(self.authenticator(), dispatcher, Arc::clone(&self.sink))
            .with_tags(&self.config.queue.source, &self.config.queue.destination)
            .with_echo_unhandled(self.config.commands.echo_unhandled)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Runs until Ctrl+C or SIGTERM.
    pub async fn run(&self, registry: Registry) -> RuntimeResult<()> {
        info!("Spaceport runtime starting. Press Ctrl+C to stop.");
        self.run_until(registry, wait_for_shutdown()).await
    }

    /// Runs until `shutdown` completes.
    ///
    /// The registry is frozen into the dispatcher for the whole run.
    pub async fn run_until<F>(&self, registry: Registry, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(RuntimeError::AlreadyRunning);
        }
        let result = self.serve(registry, shutdown).await;
        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn serve<F>(&self, registry: Registry, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        for (category, count) in registry.stats() {
            debug!(category = %category, count, "Handlers registered");
        }
        info!(handlers = registry.len(), "Registry frozen");

        let router = self.router(Dispatcher::new(registry));
        let cancel = CancellationToken::new();

        #[cfg(feature = "http-server")]
        let listener =
            spaceport_transport::listen(self.http_server_config()?, router.clone()).await?;
        #[cfg(not(feature = "http-server"))]
        warn!("HTTP server disabled, only queued envelopes are processed");

        let taken = self.receiver.lock().take();
        let consumer = taken.map(|receiver| {
            tokio::spawn(queue::consume(receiver, router.clone(), cancel.child_token()))
        });

        info!("Spaceport runtime is now running");
        shutdown.await;
        info!("Stopping Spaceport runtime");

        #[cfg(feature = "http-server")]
        listener.shutdown().await;

        cancel.cancel();
        if let Some(consumer) = consumer {
            match consumer.await {
                Ok(receiver) => *self.receiver.lock() = Some(receiver),
                Err(e) => error!(error = %e, "Queue consumer task failed"),
            }
        }

        info!("Runtime stopped");
        Ok(())
    }

    #[cfg(feature = "http-server")]
    fn http_server_config(&self) -> RuntimeResult<spaceport_transport::HttpServerConfig> {
        let server = &self.config.server;
        let mut http = spaceport_transport::HttpServerConfig::new(server.bind_addr())
            .with_request_timeout(server.request_timeout());
        if server.accept_envelopes {
            http = http.with_queue(&server.queue_path, self.config.queue.token.clone())?;
        }
        Ok(http)
    }
}

impl std::fmt::Debug for SpaceportRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaceportRuntime")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Component construction
// =============================================================================

#[cfg(feature = "http-client")]
fn create_chat_api(slack: &SlackConfig) -> RuntimeResult<BoxedChatApi> {
    let client =
        spaceport_transport::HttpApiClient::new(&slack.api_base_url, &slack.bot_access_token)?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "http-client"))]
fn create_chat_api(_slack: &SlackConfig) -> RuntimeResult<BoxedChatApi> {
    warn!("HTTP client disabled, Web API calls will fail");
    Ok(Arc::new(unavailable::UnavailableApi))
}

fn create_queue(
    queue: &QueueConfig,
) -> RuntimeResult<(BoxedEnvelopeSink, Option<LocalQueueReceiver>)> {
    match queue.mode {
        QueueMode::Local => {
            let (sink, receiver) = LocalQueue::new(queue.capacity);
            Ok((Arc::new(sink), Some(receiver)))
        }
        QueueMode::Http => Ok((create_http_sink(queue)?, None)),
    }
}

#[cfg(feature = "http-client")]
fn create_http_sink(queue: &QueueConfig) -> RuntimeResult<BoxedEnvelopeSink> {
    let url = queue
        .url
        .clone()
        .ok_or_else(|| crate::config::ConfigError::missing_field("queue.url"))?;
    let sink = spaceport_transport::HttpEnvelopeSink::new(url, queue.token.clone())?;
    Ok(Arc::new(sink))
}

#[cfg(not(feature = "http-client"))]
fn create_http_sink(_queue: &QueueConfig) -> RuntimeResult<BoxedEnvelopeSink> {
    Err(spaceport_core::TransportError::NotAvailable {
        transport: "http-client",
    }
    .into())
}

#[cfg(not(feature = "http-client"))]
mod unavailable {
    use async_trait::async_trait;
    use serde_json::Value;
    use spaceport_core::{ApiReply, ApiResult, ChatApi, TransportError};

    pub(super) struct UnavailableApi;

    #[async_trait]
    impl ChatApi for UnavailableApi {
        async fn post(&self, _method: &str, _payload: &Value) -> ApiResult<ApiReply> {
            Err(TransportError::NotAvailable {
                transport: "http-client",
            }
            .into())
        }

        async fn post_url(&self, _url: &str, _payload: &Value) -> ApiResult<ApiReply> {
            Err(TransportError::NotAvailable {
                transport: "http-client",
            }
            .into())
        }
    }
}

/// Waits for shutdown signals (Ctrl+C or SIGTERM).
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c() => {}
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down");
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler");
                ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;
}

async fn ctrl_c() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Loads configuration and builds a [`SpaceportRuntime`].
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges a provider over every other configuration source.
    pub fn merge<P: Provider>(mut self, provider: P) -> Self {
        self.config_loader = self.config_loader.merge(provider);
        self
    }

    pub fn build(self) -> RuntimeResult<SpaceportRuntime> {
        let config = self.config_loader.load()?;
        SpaceportRuntime::from_config(config)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
