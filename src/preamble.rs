//! Namespace context and SPARQL preamble composition.

use std::sync::RwLock;

use indexmap::IndexMap;

/// Snapshot of a namespace resolver's state, read once per request.
///
/// The prefix map preserves insertion order so that repeated composition of
/// an unchanged context yields byte-identical preambles.
#[derive(Debug, Clone, Default)]
pub struct NamespaceContext {
    /// Base IRI, emitted as a leading `BASE` line when set
    pub base: Option<String>,
    /// Prefix name (without trailing colon) to namespace IRI, in insertion order
    pub prefixes: IndexMap<String, String>,
}

impl NamespaceContext {
    /// Compose the `BASE`/`PREFIX` preamble for this context.
    ///
    /// Empty iff `base` is unset and the prefix map is empty. Pure function
    /// of the context; prefixes are emitted in insertion order.
    pub fn preamble(&self) -> String {
        let mut out = String::new();
        if let Some(base) = &self.base {
            out.push_str(&format!("BASE <{base}>\n"));
        }
        for (name, iri) in &self.prefixes {
            out.push_str(&format!("PREFIX {name}: <{iri}>\n"));
        }
        out
    }
}

/// Source of the namespace context applied to each request.
///
/// The client holds a live reference to a resolver and takes a fresh
/// snapshot per call, so resolver mutation is visible to subsequent
/// requests without any caching.
pub trait NamespaceResolver: Send + Sync {
    /// Read the current base and prefix map
    fn snapshot(&self) -> NamespaceContext;
}

/// In-memory resolver with interior mutability.
#[derive(Debug, Default)]
pub struct InMemoryResolver {
    inner: RwLock<NamespaceContext>,
}

impl InMemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the base IRI
    pub fn set_base(&self, base: Option<String>) {
        self.write().base = base;
    }

    /// Register a prefix; re-registering keeps the original position
    pub fn register_prefix(&self, name: impl Into<String>, iri: impl Into<String>) {
        self.write().prefixes.insert(name.into(), iri.into());
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, NamespaceContext> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl NamespaceResolver for InMemoryResolver {
    fn snapshot(&self) -> NamespaceContext {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
