//! Handler system for the Spaceport framework.
//!
//! A handler is any async function taking the event and a [`Control`] handle:
//!
//! ```rust,ignore
//! use spaceport_framework::{Control, NormalizedEvent};
//! use std::sync::Arc;
//!
//! async fn greet(event: Arc<NormalizedEvent>, control: Control) -> Option<String> {
//!     let text = event.pointer("/event/text")?.as_str()?;
//!     control.stop();
//!     Some(format!("you said {text}"))
//! }
//! ```
//!
//! The return type only needs to implement [`IntoReply`].

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::{HandlerError, HandlerResult};
use spaceport_core::NormalizedEvent;

// ============================================================================
// Control
// ============================================================================

/// Per-invocation control handle.
///
/// A fresh handle is created for every handler call, so a stop request can
/// never leak into a later invocation or a sibling handler.
#[derive(Debug, Clone, Default)]
pub struct Control {
    stopped: Arc<AtomicBool>,
}

impl Control {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ends the chain after the current handler completes.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

// ============================================================================
// IntoReply - Handle handler return values
// ============================================================================

/// Types a handler may return.
///
/// `None`, `()` and JSON `null` mean "no response". An `Err` becomes
/// [`HandlerError::Failed`].
pub trait IntoReply: Send {
    fn into_reply(self) -> HandlerResult;
}

impl IntoReply for () {
    fn into_reply(self) -> HandlerResult {
        Ok(None)
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> HandlerResult {
        match self {
            Value::Null => Ok(None),
            value => Ok(Some(value)),
        }
    }
}

impl IntoReply for String {
    fn into_reply(self) -> HandlerResult {
        Ok(Some(Value::String(self)))
    }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> HandlerResult {
        Ok(Some(Value::String(self.to_string())))
    }
}

impl<T: IntoReply> IntoReply for Option<T> {
    fn into_reply(self) -> HandlerResult {
        match self {
            Some(t) => t.into_reply(),
            None => Ok(None),
        }
    }
}

impl<T: IntoReply, E: Display + Send> IntoReply for Result<T, E> {
    fn into_reply(self) -> HandlerResult {
        match self {
            Ok(t) => t.into_reply(),
            Err(e) => Err(HandlerError::Failed(e.to_string())),
        }
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// A registered unit of behavior.
///
/// Implemented for every `Fn(Arc<NormalizedEvent>, Control) -> impl Future`
/// whose output implements [`IntoReply`].
pub trait Handler: Send + Sync + 'static {
    fn call(&self, event: Arc<NormalizedEvent>, control: Control)
    -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Arc<NormalizedEvent>, Control) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoReply + 'static,
{
    fn call(
        &self,
        event: Arc<NormalizedEvent>,
        control: Control,
    ) -> BoxFuture<'static, HandlerResult> {
        let fut = (self)(event, control);
        Box::pin(async move { fut.await.into_reply() })
    }
}

/// A type-erased handler that can be stored in the registry.
pub type BoxedHandler = Arc<dyn Handler>;

/// Convert a handler into a boxed handler.
pub fn into_handler<H: Handler>(handler: H) -> BoxedHandler {
    Arc::new(handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_reply_conversions() {
        assert_eq!(().into_reply(), Ok(None));
        assert_eq!(Value::Null.into_reply(), Ok(None));
        assert_eq!(json!({"a": 1}).into_reply(), Ok(Some(json!({"a": 1}))));
        assert_eq!("hi".into_reply(), Ok(Some(json!("hi"))));
        assert_eq!(None::<String>.into_reply(), Ok(None));
        assert_eq!(
            Err::<(), _>("boom").into_reply(),
            Err(HandlerError::Failed("boom".into()))
        );
    }

    #[test]
    fn test_control_is_shared_by_clones() {
        let control = Control::new();
        let copy = control.clone();
        assert!(!control.is_stopped());
        copy.stop();
        assert!(control.is_stopped());
        assert!(!Control::new().is_stopped());
    }

    #[tokio::test]
    async fn test_closure_handler() {
        let handler = into_handler(|event: Arc<NormalizedEvent>, control: Control| async move {
            control.stop();
            event.get_str("text").map(str::to_uppercase)
        });

        let event = Arc::new(NormalizedEvent::from_pairs([("text", "hello")]));
        let control = Control::new();
        let reply = handler.call(event, control.clone()).await;

        assert_eq!(reply, Ok(Some(json!("HELLO"))));
        assert!(control.is_stopped());
    }
}
