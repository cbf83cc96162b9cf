//! Spaceport Runtime - orchestration layer for the Spaceport webhook engine.
//!
//! This crate provides:
//! - The ingress router (`IngressRouter`), the single entry point for every
//!   transport event
//! - The in-process queue (`LocalQueue`) and its consumer
//! - Layered configuration (`ConfigLoader`, `SpaceportConfig`)
//! - Logging setup
//! - Runtime lifecycle (`SpaceportRuntime`)
//!
//! # Transport Features
//!
//! - `http-server` (default): axum ingress server
//! - `http-client` (default): reqwest Web API client and envelope forwarder
//!
//! ```ignore
//! use spaceport_runtime::SpaceportRuntime;
//! use spaceport_framework::Registry;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = SpaceportRuntime::builder().build()?;
//!     runtime.run(Registry::import()?).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Behind a function gateway
//!
//! ```ignore
//! let router = runtime.router(Dispatcher::new(Registry::import()?));
//! let reply: serde_json::Value = router.handle_raw(gateway_payload).await;
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod queue;
pub mod router;
pub mod runtime;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, SpaceportConfig, validate_config};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use queue::{LocalQueue, LocalQueueReceiver, consume};
pub use router::IngressRouter;
pub use runtime::{RuntimeBuilder, SpaceportRuntime};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
