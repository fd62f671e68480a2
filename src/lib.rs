//! Client for the SPARQL 1.1 Protocol and the SPARQL 1.1 Graph Store HTTP
//! Protocol.
//!
//! [`GraphStoreClient`] issues SPARQL queries/updates against a query
//! endpoint and whole-graph PUT/POST/GET/DELETE against a graph store
//! endpoint, then interprets the heterogeneous response bodies (JSON
//! bindings, boolean ASK results, N-Quads, JSON-LD) into a single
//! [`DecodedResult`].
//!
//! The HTTP transport, namespace resolution, and graph serialization are
//! consumed through narrow seams ([`Transport`], [`NamespaceResolver`],
//! [`GraphCodec`]) with default implementations backed by `reqwest`, an
//! in-memory resolver, and oxigraph's RDF parser.

pub mod bindings;
mod config;
pub mod error;
pub mod interpret;
pub mod iri;
pub mod mime;
mod preamble;
pub mod rdf;
pub mod transport;

use std::sync::Arc;

pub use bindings::Bindings;
pub use config::{GraphStoreConfig, TimeoutConfig};
pub use error::{GraphStoreError, Result};
pub use interpret::{BindingTerm, DecodedResult, ResponseEnvelope};
pub use mime::{ContentNegotiator, PayloadKind, content_types};
pub use oxigraph::model::Dataset;
pub use preamble::{InMemoryResolver, NamespaceContext, NamespaceResolver};
pub use rdf::{GraphCodec, NQuadsCodec};
pub use transport::{HttpRequest, HttpTransport, Method, Transport};

#[cfg(test)]
mod tests;

/// Graph content accepted by the upload operations.
///
/// Pre-serialized text is sent as-is; a structured [`Dataset`] is first
/// converted to N-Quads by the client's [`GraphCodec`].
#[derive(Debug, Clone)]
pub enum GraphContent {
    Text(String),
    Dataset(Dataset),
}

impl From<String> for GraphContent {
    fn from(text: String) -> Self {
        GraphContent::Text(text)
    }
}

impl From<&str> for GraphContent {
    fn from(text: &str) -> Self {
        GraphContent::Text(text.to_string())
    }
}

impl From<Dataset> for GraphContent {
    fn from(dataset: Dataset) -> Self {
        GraphContent::Dataset(dataset)
    }
}

/// SPARQL Protocol / Graph Store HTTP Protocol client.
///
/// Holds no mutable state between calls beyond the immutable configuration,
/// the per-client content negotiator, and a live reference to the namespace
/// resolver (whose mutation is visible to subsequent requests). Operations
/// may be issued concurrently and are independent; no retries are performed
/// internally.
pub struct GraphStoreClient {
    config: GraphStoreConfig,
    transport: Arc<dyn Transport>,
    resolver: Arc<dyn NamespaceResolver>,
    negotiator: ContentNegotiator,
    codec: Arc<dyn GraphCodec>,
}

impl GraphStoreClient {
    /// Create a client with the default transport, resolver, and codec.
    pub fn new(config: GraphStoreConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Ok(Self::with_parts(
            config,
            transport,
            Arc::new(InMemoryResolver::new()),
            Arc::new(NQuadsCodec),
        ))
    }

    /// Create a client from explicit collaborators.
    pub fn with_parts(
        config: GraphStoreConfig,
        transport: Arc<dyn Transport>,
        resolver: Arc<dyn NamespaceResolver>,
        codec: Arc<dyn GraphCodec>,
    ) -> Self {
        Self {
            config,
            transport,
            resolver,
            negotiator: ContentNegotiator::with_defaults(),
            codec,
        }
    }

    /// The namespace resolver this client reads on every call.
    pub fn resolver(&self) -> &Arc<dyn NamespaceResolver> {
        &self.resolver
    }

    /// Content negotiation table; extend before issuing requests.
    pub fn negotiator_mut(&mut self) -> &mut ContentNegotiator {
        &mut self.negotiator
    }

    /// Execute a SPARQL query.
    ///
    /// Bindings are substituted into the template, the resolver's
    /// `BASE`/`PREFIX` preamble is prepended, and the request is sent as
    /// `application/sparql-query`. The result shape follows the response's
    /// content type: `Bindings` for SELECT, `Boolean` for ASK, `Graph` for
    /// CONSTRUCT/DESCRIBE.
    pub async fn query(
        &self,
        sparql: &str,
        bindings: Option<&Bindings>,
    ) -> Result<DecodedResult> {
        let text = self.compose(sparql, bindings)?;
        tracing::debug!(query = %text, "issuing SPARQL query");

        let request = self.sparql_request(
            PayloadKind::Query,
            text,
            self.config.timeouts.query_timeout(),
        )?;
        let response = self.transport.send(&request).await?;
        interpret::interpret(&request, response, &self.negotiator, self.codec.as_ref())
    }

    /// Execute a SPARQL update. Success yields no payload.
    pub async fn update(&self, sparql: &str, bindings: Option<&Bindings>) -> Result<()> {
        let text = self.compose(sparql, bindings)?;
        tracing::debug!(update = %text, "issuing SPARQL update");

        let request = self.sparql_request(
            PayloadKind::Update,
            text,
            self.config.timeouts.update_timeout(),
        )?;
        let response = self.transport.send(&request).await?;
        interpret::interpret(&request, response, &self.negotiator, self.codec.as_ref())?;
        Ok(())
    }

    /// Replace the named graph's entire contents (HTTP PUT).
    ///
    /// A structured [`Dataset`] is serialized to N-Quads and sent as
    /// `application/n-quads`; raw text defaults to `text/turtle` unless
    /// `content_type` overrides it.
    pub async fn put(
        &self,
        iri: &str,
        content: impl Into<GraphContent>,
        content_type: Option<&str>,
    ) -> Result<()> {
        self.upload(Method::Put, iri, content.into(), content_type)
            .await
    }

    /// Add to the named graph (HTTP POST); merge semantics are the store's.
    pub async fn post(
        &self,
        iri: &str,
        content: impl Into<GraphContent>,
        content_type: Option<&str>,
    ) -> Result<()> {
        self.upload(Method::Post, iri, content.into(), content_type)
            .await
    }

    /// Remove the named graph (HTTP DELETE, no body).
    pub async fn delete(&self, iri: &str) -> Result<()> {
        let graph = self.resolve_graph(iri)?;
        tracing::debug!(graph = %graph, "deleting graph");

        let request = HttpRequest {
            method: Method::Delete,
            url: self.config.graph_store_endpoint.clone(),
            query: vec![("graph".to_string(), graph)],
            headers: Vec::new(),
            body: None,
            timeout: self.config.timeouts.graph_timeout(),
        };
        let response = self.transport.send(&request).await?;
        interpret::interpret(&request, response, &self.negotiator, self.codec.as_ref())?;
        Ok(())
    }

    /// Retrieve the named graph (HTTP GET), decoded per its content type.
    ///
    /// Stores following the legacy `text/plain` N-Quads convention get
    /// Unicode-escape decoding and conversion to a structured [`Dataset`].
    pub async fn get(&self, iri: &str) -> Result<DecodedResult> {
        let graph = self.resolve_graph(iri)?;
        tracing::debug!(graph = %graph, "retrieving graph");

        let request = HttpRequest {
            method: Method::Get,
            url: self.config.graph_store_endpoint.clone(),
            query: vec![("graph".to_string(), graph)],
            headers: vec![(
                "Accept".to_string(),
                content_types::QUERY_ACCEPT.to_string(),
            )],
            body: None,
            timeout: self.config.timeouts.graph_timeout(),
        };
        let response = self.transport.send(&request).await?;
        interpret::interpret(&request, response, &self.negotiator, self.codec.as_ref())
    }

    /// Substituted body with the resolver's preamble prepended.
    fn compose(&self, sparql: &str, bindings: Option<&Bindings>) -> Result<String> {
        let substituted = match bindings {
            Some(bindings) => bindings::substitute(sparql, bindings)?,
            None => sparql.to_string(),
        };
        let context = self.resolver.snapshot();
        Ok(format!("{}{}", context.preamble(), substituted))
    }

    fn sparql_request(
        &self,
        kind: PayloadKind,
        text: String,
        timeout: std::time::Duration,
    ) -> Result<HttpRequest> {
        let mut headers = vec![
            (
                "Content-Type".to_string(),
                self.negotiator.mime_for(kind)?.to_string(),
            ),
            (
                "Accept".to_string(),
                content_types::QUERY_ACCEPT.to_string(),
            ),
        ];
        headers.extend(self.config.query_headers.iter().cloned());

        Ok(HttpRequest {
            method: Method::Post,
            url: self.config.query_endpoint.clone(),
            query: Vec::new(),
            headers,
            body: Some(text),
            timeout,
        })
    }

    async fn upload(
        &self,
        method: Method,
        iri: &str,
        content: GraphContent,
        content_type: Option<&str>,
    ) -> Result<()> {
        let graph = self.resolve_graph(iri)?;

        let (body, content_type) = match content {
            GraphContent::Text(text) => (
                text,
                content_type.unwrap_or(content_types::TURTLE).to_string(),
            ),
            GraphContent::Dataset(dataset) => (
                self.codec.to_triples(&dataset)?,
                self.negotiator.mime_for(PayloadKind::NQuads)?.to_string(),
            ),
        };
        tracing::debug!(
            method = method.as_str(),
            graph = %graph,
            content_type = %content_type,
            bytes = body.len(),
            "uploading graph"
        );

        let request = HttpRequest {
            method,
            url: self.config.graph_store_endpoint.clone(),
            query: vec![("graph".to_string(), graph)],
            headers: vec![("Content-Type".to_string(), content_type)],
            body: Some(body),
            timeout: self.config.timeouts.graph_timeout(),
        };
        let response = self.transport.send(&request).await?;
        interpret::interpret(&request, response, &self.negotiator, self.codec.as_ref())?;
        Ok(())
    }

    /// Absolute graph IRI for the `graph=` parameter, resolved against the
    /// resolver's current base.
    fn resolve_graph(&self, value: &str) -> Result<String> {
        let context = self.resolver.snapshot();
        iri::resolve(value, context.base.as_deref())
    }
}
