//! Handler registry.
//!
//! Chain categories keep handlers in registration order; `command_response`
//! maps an exact command string to a single handler. The registry is built
//! during startup and then frozen behind an `Arc` inside the
//! [`Dispatcher`](crate::Dispatcher).
//!
//! Handlers can be registered programmatically or declared anywhere in the
//! binary with [`register_handler!`](crate::register_handler) and collected
//! with [`Registry::import`].

use std::collections::HashMap;
use std::fmt;

use linkme::distributed_slice;
use tracing::{debug, info};

use crate::error::{RegistryError, RegistryResult};
use crate::handler::{BoxedHandler, Handler, into_handler};
use spaceport_core::{Category, ChainCategory};

// =============================================================================
// Handler Entry
// =============================================================================

/// A registered handler with its category and optional name.
#[derive(Clone)]
pub struct HandlerEntry {
    category: Category,
    key: Option<String>,
    handler: BoxedHandler,
}

impl HandlerEntry {
    pub fn category(&self) -> Category {
        self.category
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn handler(&self) -> &BoxedHandler {
        &self.handler
    }
}

impl fmt::Display for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#<{} handler ({})>",
            self.category,
            self.key.as_deref().unwrap_or("anonymous")
        )
    }
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("category", &self.category)
            .field("key", &self.key)
            .finish()
    }
}

// =============================================================================
// Static Handler Definitions
// =============================================================================

/// A handler declared with [`register_handler!`](crate::register_handler).
pub struct HandlerDefinition {
    pub category: Category,
    pub key: Option<&'static str>,
    /// `module_path!()` of the declaration.
    pub module: &'static str,
    /// `line!()` of the declaration.
    pub line: u32,
    pub create: fn() -> BoxedHandler,
}

/// Every handler declared in the final binary.
#[distributed_slice]
pub static HANDLER_DEFINITIONS: [HandlerDefinition];

// =============================================================================
// Registry
// =============================================================================

/// Borrowed view of one category's handlers.
#[derive(Debug, Clone, Copy)]
pub enum Resolved<'a> {
    Chain(&'a [HandlerEntry]),
    Keyed(&'a HashMap<String, HandlerEntry>),
}

/// Process-wide handler table.
#[derive(Default, Clone)]
pub struct Registry {
    chains: [Vec<HandlerEntry>; 5],
    keyed: HashMap<String, HandlerEntry>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every statically declared handler.
    pub fn import() -> RegistryResult<Self> {
        let mut registry = Self::new();
        registry.import_definitions(&HANDLER_DEFINITIONS)?;
        Ok(registry)
    }

    /// Registers definitions ordered by module path, then declaration line.
    pub fn import_definitions(&mut self, definitions: &[HandlerDefinition]) -> RegistryResult<()> {
        let mut ordered: Vec<&HandlerDefinition> = definitions.iter().collect();
        ordered.sort_by(|a, b| (a.module, a.line).cmp(&(b.module, b.line)));

        for definition in ordered {
            debug!(
                category = %definition.category,
                key = definition.key.unwrap_or(""),
                module = definition.module,
                line = definition.line,
                "Importing handler"
            );
            self.register_boxed(definition.category, definition.key, (definition.create)())?;
        }

        info!(count = definitions.len(), "Handlers imported");
        Ok(())
    }

    /// Registers a handler.
    ///
    /// `command_response` requires a unique non-empty key; other categories
    /// append to their chain and treat the key as a display name.
    pub fn register<H: Handler>(
        &mut self,
        category: Category,
        key: Option<&str>,
        handler: H,
    ) -> RegistryResult<()> {
        self.register_boxed(category, key, into_handler(handler))
    }

    /// Registers an already-boxed handler.
    pub fn register_boxed(
        &mut self,
        category: Category,
        key: Option<&str>,
        handler: BoxedHandler,
    ) -> RegistryResult<()> {
        let key = key.filter(|k| !k.is_empty()).map(str::to_string);

        match category.as_chain() {
            Some(chain) => {
                self.chains[chain.index()].push(HandlerEntry {
                    category,
                    key,
                    handler,
                });
            }
            None => {
                let key = key.ok_or(RegistryError::MissingKey { category })?;
                if self.keyed.contains_key(&key) {
                    return Err(RegistryError::DuplicateKey { category, key });
                }
                self.keyed.insert(
                    key.clone(),
                    HandlerEntry {
                        category,
                        key: Some(key),
                        handler,
                    },
                );
            }
        }
        Ok(())
    }

    /// Returns a category's handlers.
    pub fn resolve(&self, category: Category) -> Resolved<'_> {
        match category.as_chain() {
            Some(chain) => Resolved::Chain(self.chain(chain)),
            None => Resolved::Keyed(&self.keyed),
        }
    }

    /// Returns a chain in registration order.
    pub fn chain(&self, category: ChainCategory) -> &[HandlerEntry] {
        &self.chains[category.index()]
    }

    /// Exact-match lookup by key.
    ///
    /// For chain categories this returns the first handler with that name.
    pub fn lookup(&self, category: Category, key: &str) -> Option<&HandlerEntry> {
        match self.resolve(category) {
            Resolved::Keyed(map) => map.get(key),
            Resolved::Chain(entries) => entries.iter().find(|e| e.key() == Some(key)),
        }
    }

    /// Handler count per category.
    pub fn stats(&self) -> Vec<(Category, usize)> {
        Category::ALL
            .into_iter()
            .map(|category| {
                let count = match self.resolve(category) {
                    Resolved::Chain(entries) => entries.len(),
                    Resolved::Keyed(map) => map.len(),
                };
                (category, count)
            })
            .collect()
    }

    /// Total number of registered handlers.
    pub fn len(&self) -> usize {
        self.chains.iter().map(Vec::len).sum::<usize>() + self.keyed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.stats()).finish()
    }
}

// =============================================================================
// Declaration Macro
// =============================================================================

/// Declares a handler that [`Registry::import`] will pick up.
///
/// The category is a [`Category`](spaceport_core::Category) variant name.
/// `CommandResponse` requires a key.
///
/// ```rust,ignore
/// register_handler!(CommandResponse, "/sample", |_event, _control| async {
///     "Working on it..."
/// });
///
/// register_handler!(Event, log_event);
/// ```
#[macro_export]
macro_rules! register_handler {
    ($category:ident, $key:literal, $handler:expr $(,)?) => {
        $crate::register_handler!(@emit $category, ::std::option::Option::Some($key), $handler);
    };
    ($category:ident, $handler:expr $(,)?) => {
        $crate::register_handler!(@emit $category, ::std::option::Option::None, $handler);
    };
    (@emit $category:ident, $key:expr, $handler:expr) => {
        const _: () = {
            #[$crate::linkme::distributed_slice($crate::registry::HANDLER_DEFINITIONS)]
            #[linkme(crate = $crate::linkme)]
            static DEFINITION: $crate::registry::HandlerDefinition =
                $crate::registry::HandlerDefinition {
                    category: $crate::Category::$category,
                    key: $key,
                    module: ::std::module_path!(),
                    line: ::std::line!(),
                    create: || $crate::handler::into_handler($handler),
                };
        };
    };
}
