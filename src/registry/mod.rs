//! Name-to-behavior registry.
//!
//! # Data Flow
//! ```text
//! Startup (single-threaded):
//!     RegistryBuilder
//!         .handler / .middleware             (static mappings)
//!         .handler_factory / .middleware_factory (family mappings)
//!     → build() → Registry (frozen)
//!
//! Router build:
//!     name → exact static match?
//!          → else name::split → family factory(family, args)
//!          → else ResolveError (fatal)
//! ```
//!
//! # Design Decisions
//! - `Registry` has no mutating methods; post-startup registration is
//!   impossible rather than discouraged
//! - Names are unique per mapping; a duplicate is a startup error
//! - Factory results are not cached

pub mod name;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::http::{Handler, Middleware};

/// Which mapping an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Handler,
    Middleware,
    HandlerFactory,
    MiddlewareFactory,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Handler => "handler",
            Kind::Middleware => "middleware",
            Kind::HandlerFactory => "handler factory",
            Kind::MiddlewareFactory => "middleware factory",
        })
    }
}

/// A factory refused to build from the given arguments.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct FactoryError(String);

impl FactoryError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{kind} `{name}` is already registered")]
    Duplicate { kind: Kind, name: String },
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no {kind} registered for `{name}`")]
    NotFound { kind: Kind, name: String },

    #[error("{kind} factory `{family}` rejected `{name}`: {source}")]
    Factory {
        kind: Kind,
        name: String,
        family: String,
        #[source]
        source: FactoryError,
    },
}

/// Builds a `T` from a family name and its ordered arguments.
pub trait Factory<T>: Send + Sync {
    fn produce(&self, family: &str, args: &[String]) -> Result<T, FactoryError>;
}

impl<T, F> Factory<T> for F
where
    F: Fn(&str, &[String]) -> Result<T, FactoryError> + Send + Sync,
{
    fn produce(&self, family: &str, args: &[String]) -> Result<T, FactoryError> {
        self(family, args)
    }
}

type Factories<T> = HashMap<String, Arc<dyn Factory<T>>>;

/// Collects registrations during startup.
#[derive(Default)]
pub struct RegistryBuilder {
    handlers: HashMap<String, Handler>,
    middleware: HashMap<String, Middleware>,
    handler_factories: Factories<Handler>,
    middleware_factories: Factories<Middleware>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler(mut self, name: impl Into<String>, handler: Handler) -> Result<Self, RegistryError> {
        insert_unique(&mut self.handlers, Kind::Handler, name.into(), handler)?;
        Ok(self)
    }

    pub fn middleware(
        mut self,
        name: impl Into<String>,
        middleware: Middleware,
    ) -> Result<Self, RegistryError> {
        insert_unique(&mut self.middleware, Kind::Middleware, name.into(), middleware)?;
        Ok(self)
    }

    pub fn handler_factory<F>(mut self, family: impl Into<String>, factory: F) -> Result<Self, RegistryError>
    where
        F: Factory<Handler> + 'static,
    {
        insert_unique(
            &mut self.handler_factories,
            Kind::HandlerFactory,
            family.into(),
            Arc::new(factory) as Arc<dyn Factory<Handler>>,
        )?;
        Ok(self)
    }

    pub fn middleware_factory<F>(
        mut self,
        family: impl Into<String>,
        factory: F,
    ) -> Result<Self, RegistryError>
    where
        F: Factory<Middleware> + 'static,
    {
        insert_unique(
            &mut self.middleware_factories,
            Kind::MiddlewareFactory,
            family.into(),
            Arc::new(factory) as Arc<dyn Factory<Middleware>>,
        )?;
        Ok(self)
    }

    /// Freeze the mappings.
    pub fn build(self) -> Registry {
        tracing::debug!(
            handlers = self.handlers.len(),
            middleware = self.middleware.len(),
            handler_factories = self.handler_factories.len(),
            middleware_factories = self.middleware_factories.len(),
            "Registry built"
        );
        Registry {
            handlers: self.handlers,
            middleware: self.middleware,
            handler_factories: self.handler_factories,
            middleware_factories: self.middleware_factories,
        }
    }
}

fn insert_unique<T>(
    map: &mut HashMap<String, T>,
    kind: Kind,
    name: String,
    value: T,
) -> Result<(), RegistryError> {
    match map.entry(name) {
        Entry::Occupied(entry) => Err(RegistryError::Duplicate {
            kind,
            name: entry.key().clone(),
        }),
        Entry::Vacant(entry) => {
            entry.insert(value);
            Ok(())
        }
    }
}

/// Frozen registry, shared read-only with the router builder.
pub struct Registry {
    handlers: HashMap<String, Handler>,
    middleware: HashMap<String, Middleware>,
    handler_factories: Factories<Handler>,
    middleware_factories: Factories<Middleware>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn resolve_handler(&self, name: &str) -> Result<Handler, ResolveError> {
        resolve(Kind::Handler, name, &self.handlers, &self.handler_factories)
    }

    pub fn resolve_middleware(&self, name: &str) -> Result<Middleware, ResolveError> {
        resolve(Kind::Middleware, name, &self.middleware, &self.middleware_factories)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handlers: Vec<_> = self.handlers.keys().collect();
        let mut middleware: Vec<_> = self.middleware.keys().collect();
        let mut handler_factories: Vec<_> = self.handler_factories.keys().collect();
        let mut middleware_factories: Vec<_> = self.middleware_factories.keys().collect();
        handlers.sort();
        middleware.sort();
        handler_factories.sort();
        middleware_factories.sort();
        f.debug_struct("Registry")
            .field("handlers", &handlers)
            .field("middleware", &middleware)
            .field("handler_factories", &handler_factories)
            .field("middleware_factories", &middleware_factories)
            .finish()
    }
}

fn resolve<T: Clone>(
    kind: Kind,
    name: &str,
    statics: &HashMap<String, T>,
    factories: &Factories<T>,
) -> Result<T, ResolveError> {
    if let Some(found) = statics.get(name) {
        return Ok(found.clone());
    }

    let (family, args) = name::split(name);
    let factory = factories.get(family).ok_or_else(|| ResolveError::NotFound {
        kind,
        name: name.to_string(),
    })?;

    tracing::debug!(kind = %kind, family, args = ?args, "Resolving through factory");
    factory
        .produce(family, &args)
        .map_err(|source| ResolveError::Factory {
            kind,
            name: name.to_string(),
            family: family.to_string(),
            source,
        })
}
