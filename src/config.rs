use serde::{Deserialize, Serialize};

/// Configuration for the graph store client
///
/// Endpoints are immutable for the client's lifetime. The query endpoint
/// receives SPARQL query/update requests; the graph store endpoint receives
/// whole-graph PUT/POST/GET/DELETE keyed by a `graph=` parameter.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct GraphStoreConfig {
    /// SPARQL query/update endpoint URL
    pub query_endpoint: String,

    /// Graph Store HTTP Protocol endpoint URL
    pub graph_store_endpoint: String,

    /// Optional username for HTTP Basic authentication
    #[serde(default)]
    pub username: Option<String>,

    /// Optional password for HTTP Basic authentication
    #[serde(default)]
    pub password: Option<String>,

    /// Extra headers sent with every query/update request
    /// (e.g. store-specific connection options)
    #[serde(default)]
    pub query_headers: Vec<(String, String)>,

    /// Timeout configuration for different operation types
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

impl GraphStoreConfig {
    /// Create a configuration with default timeouts and no authentication
    pub fn new(query_endpoint: impl Into<String>, graph_store_endpoint: impl Into<String>) -> Self {
        Self {
            query_endpoint: query_endpoint.into(),
            graph_store_endpoint: graph_store_endpoint.into(),
            username: None,
            password: None,
            query_headers: Vec::new(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

/// Timeout configuration for different protocol operations
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TimeoutConfig {
    /// Timeout for SPARQL queries in milliseconds
    pub query_ms: u64,

    /// Timeout for SPARQL updates in milliseconds
    pub update_ms: u64,

    /// Timeout for graph store PUT/POST/GET/DELETE in milliseconds
    pub graph_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            query_ms: 60_000,
            update_ms: 60_000,
            graph_ms: 120_000,
        }
    }
}

impl TimeoutConfig {
    /// Get query timeout as Duration
    pub fn query_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.query_ms)
    }

    /// Get update timeout as Duration
    pub fn update_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.update_ms)
    }

    /// Get graph store operation timeout as Duration
    pub fn graph_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.graph_ms)
    }
}
