//! The compiled, immutable dispatch structure.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use axum::http::Method;
use axum::Router;

/// How a registration matches request paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchKind {
    /// The full pattern only.
    Exact,
    /// The full pattern and every path below it.
    Prefix,
}

/// One registered route, as seen after compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchEntry {
    pub name: String,
    pub method: Method,
    /// Base path + endpoint pattern.
    pub pattern: String,
    pub match_kind: MatchKind,
    /// Number of inherited middleware wrapped around the handler.
    pub middleware_len: usize,
    /// `None` when no timeout wrapper was applied.
    pub timeout: Option<Duration>,
}

/// Routing table produced by [`RouterBuilder`](super::RouterBuilder).
pub struct DispatchTable {
    router: Router,
    entries: Vec<DispatchEntry>,
}

impl DispatchTable {
    pub(crate) fn new(router: Router, entries: Vec<DispatchEntry>) -> Self {
        Self { router, entries }
    }

    /// Registrations in declaration order.
    pub fn entries(&self) -> &[DispatchEntry] {
        &self.entries
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn into_router(self) -> Router {
        self.router
    }

    /// `(method, pattern, match kind, middleware chain length)` for every
    /// registration. Two tables built from equivalent trees have equal
    /// signatures.
    pub fn signature(&self) -> BTreeSet<(String, String, MatchKind, usize)> {
        self.entries
            .iter()
            .map(|e| (e.method.to_string(), e.pattern.clone(), e.match_kind, e.middleware_len))
            .collect()
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}
