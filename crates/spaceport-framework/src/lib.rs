//! # Spaceport Framework
//!
//! The handler model of the Spaceport webhook engine.
//!
//! This layer provides:
//! - The [`Handler`] trait, implemented for plain async functions taking
//!   `(Arc<NormalizedEvent>, Control)`
//! - The per-invocation [`Control`] handle used to stop a chain
//! - The [`Registry`] of handlers per category, populated programmatically or
//!   through [`register_handler!`] and [`Registry::import`]
//! - The [`Dispatcher`], which runs chains and keyed lookups with per-handler
//!   failure isolation

pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod registry;

#[doc(hidden)]
pub use linkme;

pub use dispatcher::{APOLOGY_TEXT, Dispatcher, apology};
pub use error::{HandlerError, HandlerResult, RegistryError, RegistryResult};
pub use handler::{BoxedHandler, Control, Handler, IntoReply, into_handler};
pub use registry::{HANDLER_DEFINITIONS, HandlerDefinition, HandlerEntry, Registry, Resolved};
pub use spaceport_core::{Category, ChainCategory, NormalizedEvent};
