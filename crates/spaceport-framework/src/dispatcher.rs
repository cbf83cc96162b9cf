//! Event dispatcher for the Spaceport framework.
//!
//! The [`Dispatcher`] runs a frozen [`Registry`] against one event at a time:
//!
//! 1. Chain handlers run in registration order; each return value replaces
//!    the candidate response
//! 2. A handler that calls [`Control::stop`] ends the chain once it completes
//! 3. A failing or panicking handler contributes the apology reply and the
//!    chain moves on
//!
//! ```rust,ignore
//! let dispatcher = Dispatcher::new(Registry::import()?);
//! let reply = dispatcher.run_chain(ChainCategory::Event, Arc::new(event)).await;
//! ```

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Once};

use futures::FutureExt;
use serde_json::{Value, json};
use tracing::{Instrument, debug, error, info_span};

use crate::error::{HandlerError, HandlerResult};
use crate::handler::Control;
use crate::registry::{HandlerEntry, Registry};
use spaceport_core::{Category, ChainCategory, NormalizedEvent};

/// Text of the reply substituted for a failed handler.
pub const APOLOGY_TEXT: &str = "Woops, encountered an error.";

/// The reply substituted for a failed handler.
pub fn apology() -> Value {
    json!({ "text": APOLOGY_TEXT })
}

/// Runs handlers from a shared, read-only registry.
///
/// Cloning is cheap; all clones share the same registry.
#[derive(Clone, Default)]
pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl Dispatcher {
    /// Freezes `registry` into a dispatcher.
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn from_shared(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Runs a chain and returns the final candidate response.
    pub async fn run_chain(
        &self,
        category: ChainCategory,
        event: Arc<NormalizedEvent>,
    ) -> Option<Value> {
        let span = info_span!("dispatch", category = %category);
        async move {
            let mut candidate = None;

            for entry in self.registry.chain(category) {
                let control = Control::new();
                candidate = invoke(entry, Arc::clone(&event), control.clone()).await;

                if control.is_stopped() {
                    debug!(handler = %entry, "Handler stopped the chain");
                    break;
                }
            }

            candidate
        }
        .instrument(span)
        .await
    }

    /// Runs the `command_response` handler registered for `key`.
    ///
    /// An unmatched key is not an error and yields `None`.
    pub async fn run_keyed(&self, key: &str, event: Arc<NormalizedEvent>) -> Option<Value> {
        let span = info_span!("dispatch", category = %Category::CommandResponse, key);
        async move {
            let Some(entry) = self.registry.lookup(Category::CommandResponse, key) else {
                debug!("No handler registered for key");
                return None;
            };
            invoke(entry, event, Control::new()).await
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handler_count", &self.registry.len())
            .finish()
    }
}

/// Calls one handler with failure isolation.
async fn invoke(entry: &HandlerEntry, event: Arc<NormalizedEvent>, control: Control) -> Option<Value> {
    install_panic_hook();
    let handler = Arc::clone(entry.handler());
    let mut trace = None;

    // Closures may panic before returning their future.
    let result: HandlerResult =
        match std::panic::catch_unwind(AssertUnwindSafe(|| handler.call(event, control))) {
            Ok(fut) => match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => {
                    trace = take_panic_trace();
                    Err(HandlerError::Panicked(panic_message(payload)))
                }
            },
            Err(payload) => {
                trace = take_panic_trace();
                Err(HandlerError::Panicked(panic_message(payload)))
            }
        };

    match result {
        Ok(reply) => reply,
        Err(e) => {
            match trace {
                Some(trace) => {
                    error!(handler = %entry, error = %e, backtrace = %trace, "Handler panicked")
                }
                None => error!(handler = %entry, error = %e, error_debug = ?e, "Handler failed"),
            }
            Some(apology())
        }
    }
}

thread_local! {
    static PANIC_TRACE: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Chains a panic hook that keeps the panicking thread's backtrace.
///
/// Capture follows `RUST_BACKTRACE`/`RUST_LIB_BACKTRACE`. The previous hook
/// still runs.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            PANIC_TRACE.with(|slot| *slot.borrow_mut() = Some(Backtrace::capture()));
            previous(info);
        }));
    });
}

/// Backtrace of the last panic on this thread. Unwinding is caught on the
/// panicking thread, so this is the handler's own panic.
fn take_panic_trace() -> Option<Backtrace> {
    PANIC_TRACE.with(|slot| slot.borrow_mut().take())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records handler names in call order.
    #[derive(Clone, Default)]
    struct Trace(Arc<Mutex<Vec<&'static str>>>);

    impl Trace {
        fn push(&self, name: &'static str) {
            self.0.lock().unwrap().push(name);
        }

        fn names(&self) -> Vec<&'static str> {
            self.0.lock().unwrap().clone()
        }
    }

    fn recording(
        trace: &Trace,
        name: &'static str,
        stop: bool,
    ) -> impl Fn(Arc<NormalizedEvent>, Control) -> futures::future::Ready<Value> + Send + Sync + 'static
    {
        let trace = trace.clone();
        move |_event: Arc<NormalizedEvent>, control: Control| {
            trace.push(name);
            if stop {
                control.stop();
            }
            futures::future::ready(json!({ "from": name }))
        }
    }

    fn event() -> Arc<NormalizedEvent> {
        Arc::new(NormalizedEvent::from_pairs([("type", "app_mention")]))
    }

    #[tokio::test]
    async fn test_last_handler_wins() {
        let trace = Trace::default();
        let mut registry = Registry::new();
        registry
            .register(Category::Event, None, recording(&trace, "h1", false))
            .unwrap();
        registry
            .register(Category::Event, None, recording(&trace, "h2", false))
            .unwrap();

        let reply = Dispatcher::new(registry)
            .run_chain(ChainCategory::Event, event())
            .await;

        assert_eq!(trace.names(), vec!["h1", "h2"]);
        assert_eq!(reply, Some(json!({ "from": "h2" })));
    }

    #[tokio::test]
    async fn test_stop_short_circuits() {
        let trace = Trace::default();
        let mut registry = Registry::new();
        registry
            .register(Category::Command, None, recording(&trace, "h1", false))
            .unwrap();
        registry
            .register(Category::Command, None, recording(&trace, "h2", true))
            .unwrap();
        registry
            .register(Category::Command, None, recording(&trace, "h3", false))
            .unwrap();

        let dispatcher = Dispatcher::new(registry);
        let reply = dispatcher.run_chain(ChainCategory::Command, event()).await;

        assert_eq!(trace.names(), vec!["h1", "h2"]);
        assert_eq!(reply, Some(json!({ "from": "h2" })));

        // The stop request does not leak into the next dispatch.
        dispatcher.run_chain(ChainCategory::Command, event()).await;
        assert_eq!(trace.names(), vec!["h1", "h2", "h1", "h2"]);
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let trace = Trace::default();
        let mut registry = Registry::new();
        registry
            .register(Category::Action, None, |_: Arc<NormalizedEvent>, _: Control| async {
                Err::<Value, _>("database unavailable")
            })
            .unwrap();
        registry
            .register(Category::Action, None, recording(&trace, "after", false))
            .unwrap();

        let dispatcher = Dispatcher::new(registry);
        let reply = dispatcher.run_chain(ChainCategory::Action, event()).await;

        assert_eq!(trace.names(), vec!["after"]);
        assert_eq!(reply, Some(json!({ "from": "after" })));
    }

    #[tokio::test]
    async fn test_failing_last_handler_yields_apology() {
        let mut registry = Registry::new();
        registry
            .register(Category::NonSlack, None, |_: Arc<NormalizedEvent>, _: Control| async { "fine" })
            .unwrap();
        registry
            .register(Category::NonSlack, None, |_: Arc<NormalizedEvent>, _: Control| async {
                Err::<(), _>(String::from("boom"))
            })
            .unwrap();

        let reply = Dispatcher::new(registry)
            .run_chain(ChainCategory::NonSlack, event())
            .await;
        assert_eq!(reply, Some(apology()));
    }

    #[tokio::test]
    async fn test_panic_is_isolated() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut registry = Registry::new();
        registry
            .register(Category::Event, None, |_: Arc<NormalizedEvent>, _: Control| async {
                if true {
                    panic!("handler bug");
                }
            })
            .unwrap();
        registry
            .register(Category::Event, None, |_: Arc<NormalizedEvent>, _: Control| -> futures::future::Ready<()> {
                panic!("panicked before returning a future")
            })
            .unwrap();
        registry
            .register(Category::Event, None, move |_: Arc<NormalizedEvent>, _: Control| {
                counter.fetch_add(1, Ordering::SeqCst);
                async {}
            })
            .unwrap();

        let reply = Dispatcher::new(registry)
            .run_chain(ChainCategory::Event, event())
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(reply, None);
    }

    #[test]
    fn test_panic_backtrace_is_kept_for_the_failure_log() {
        install_panic_hook();
        let _ = std::panic::catch_unwind(|| panic!("handler bug"));
        assert!(take_panic_trace().is_some());
        assert!(take_panic_trace().is_none());
    }

    #[tokio::test]
    async fn test_panicking_handler_consumes_its_backtrace() {
        let mut registry = Registry::new();
        registry
            .register(Category::Event, None, |_: Arc<NormalizedEvent>, _: Control| async {
                if true {
                    panic!("handler bug");
                }
            })
            .unwrap();

        let reply = Dispatcher::new(registry)
            .run_chain(ChainCategory::Event, event())
            .await;

        assert_eq!(reply, Some(apology()));
        assert!(take_panic_trace().is_none());
    }

    #[tokio::test]
    async fn test_stop_then_fail_still_stops() {
        let trace = Trace::default();
        let mut registry = Registry::new();
        registry
            .register(Category::Event, None, |_: Arc<NormalizedEvent>, control: Control| async move {
                control.stop();
                Err::<(), _>("after stop")
            })
            .unwrap();
        registry
            .register(Category::Event, None, recording(&trace, "never", false))
            .unwrap();

        let reply = Dispatcher::new(registry)
            .run_chain(ChainCategory::Event, event())
            .await;

        assert!(trace.names().is_empty());
        assert_eq!(reply, Some(apology()));
    }

    #[tokio::test]
    async fn test_empty_reply_overwrites_candidate() {
        let mut registry = Registry::new();
        registry
            .register(Category::Event, None, |_: Arc<NormalizedEvent>, _: Control| async { "first" })
            .unwrap();
        registry
            .register(Category::Event, None, |_: Arc<NormalizedEvent>, _: Control| async {})
            .unwrap();

        let reply = Dispatcher::new(registry)
            .run_chain(ChainCategory::Event, event())
            .await;
        assert_eq!(reply, None);
    }

    #[tokio::test]
    async fn test_keyed_dispatch() {
        let mut registry = Registry::new();
        registry
            .register(
                Category::CommandResponse,
                Some("/sample"),
                |event: Arc<NormalizedEvent>, _: Control| async move {
                    format!("ack {}", event.get_str("text").unwrap_or_default())
                },
            )
            .unwrap();
        let dispatcher = Dispatcher::new(registry);

        let event = Arc::new(NormalizedEvent::from_pairs([("text", "hello")]));
        assert_eq!(
            dispatcher.run_keyed("/sample", Arc::clone(&event)).await,
            Some(json!("ack hello"))
        );
        assert_eq!(dispatcher.run_keyed("/unknown", event).await, None);
    }

    #[tokio::test]
    async fn test_empty_chain() {
        let dispatcher = Dispatcher::default();
        assert_eq!(dispatcher.run_chain(ChainCategory::Menu, event()).await, None);
    }
}
