//! Content negotiation: logical payload kinds, MIME types, and body decoders.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{GraphStoreError, Result};
use crate::interpret::{BindingTerm, DecodedResult};
use crate::rdf::GraphCodec;

/// MIME type constants used by the protocol
pub mod content_types {
    pub const SPARQL_QUERY: &str = "application/sparql-query";
    pub const SPARQL_UPDATE: &str = "application/sparql-update";
    pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
    pub const SPARQL_RESULTS_XML: &str = "application/sparql-results+xml";
    pub const N_QUADS: &str = "application/n-quads";
    pub const X_NQUADS: &str = "text/x-nquads";
    pub const TURTLE: &str = "text/turtle";
    pub const JSON_LD: &str = "application/ld+json";
    pub const PLAIN: &str = "text/plain";

    /// Accept list negotiated for SELECT/ASK/CONSTRUCT responses
    pub const QUERY_ACCEPT: &str =
        "application/ld+json, application/sparql-results+json, application/json, */*";
}

/// Logical payload kind, mapped to a wire MIME type by the negotiator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// Outgoing SPARQL query body
    Query,
    /// Outgoing SPARQL update body
    Update,
    /// JSON SPARQL results (SELECT bindings or ASK boolean)
    ResultsJson,
    /// XML SPARQL results (boolean only)
    ResultsXml,
    /// N-Triples/N-Quads text
    NQuads,
    /// Structured graph exchange (JSON-LD)
    StructuredGraph,
}

/// Body decoder: raw entity + serialization engine -> decoded result
pub type DecodeFn = fn(&str, &dyn GraphCodec) -> Result<DecodedResult>;

/// Per-client content negotiation table.
///
/// Built once at client construction instead of a process-wide registry, so
/// clients (and tests) cannot interfere with each other. Additional entries
/// can be registered before the first request; the table is not meant to be
/// mutated concurrently with in-flight requests.
pub struct ContentNegotiator {
    mimes: HashMap<PayloadKind, &'static str>,
    decoders: HashMap<String, DecodeFn>,
}

impl ContentNegotiator {
    /// Negotiator with the standard protocol entries registered
    pub fn with_defaults() -> Self {
        let mut negotiator = Self {
            mimes: HashMap::new(),
            decoders: HashMap::new(),
        };

        negotiator.mimes.insert(PayloadKind::Query, content_types::SPARQL_QUERY);
        negotiator.mimes.insert(PayloadKind::Update, content_types::SPARQL_UPDATE);
        negotiator
            .mimes
            .insert(PayloadKind::ResultsJson, content_types::SPARQL_RESULTS_JSON);
        negotiator
            .mimes
            .insert(PayloadKind::ResultsXml, content_types::SPARQL_RESULTS_XML);
        negotiator.mimes.insert(PayloadKind::NQuads, content_types::N_QUADS);
        negotiator
            .mimes
            .insert(PayloadKind::StructuredGraph, content_types::JSON_LD);

        negotiator.register(content_types::SPARQL_RESULTS_JSON, decode_results_json);
        negotiator.register(content_types::SPARQL_RESULTS_XML, decode_results_xml);
        negotiator.register(content_types::N_QUADS, decode_text);
        negotiator.register(content_types::X_NQUADS, decode_text);
        negotiator.register(content_types::TURTLE, decode_text);
        negotiator.register(content_types::JSON_LD, decode_structured_graph);

        negotiator
    }

    /// Register (or replace) a decoder for a content type
    pub fn register(&mut self, content_type: impl Into<String>, decode: DecodeFn) {
        self.decoders.insert(essence(&content_type.into()), decode);
    }

    /// Wire MIME type for a logical payload kind
    pub fn mime_for(&self, kind: PayloadKind) -> Result<&'static str> {
        self.mimes
            .get(&kind)
            .copied()
            .ok_or_else(|| GraphStoreError::UnsupportedContentType {
                content_type: format!("{kind:?}"),
            })
    }

    /// Decode a response body by its declared content type.
    ///
    /// Content types without a registered decoder pass through unchanged as
    /// [`DecodedResult::Raw`].
    pub fn decode(
        &self,
        content_type: &str,
        body: &str,
        codec: &dyn GraphCodec,
    ) -> Result<DecodedResult> {
        match self.decoders.get(&essence(content_type)) {
            Some(decode) => decode(body, codec),
            None => Ok(DecodedResult::Raw(body.to_string())),
        }
    }
}

/// Media type without parameters, lowercased (`text/plain;charset=utf-8` -> `text/plain`)
pub(crate) fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

#[derive(Deserialize)]
struct SparqlJsonResults {
    #[serde(default)]
    boolean: Option<bool>,
    #[serde(default)]
    results: Option<SparqlJsonBindings>,
}

#[derive(Deserialize)]
struct SparqlJsonBindings {
    #[serde(default)]
    bindings: Vec<HashMap<String, BindingTerm>>,
}

fn decode_results_json(body: &str, _codec: &dyn GraphCodec) -> Result<DecodedResult> {
    let parsed: SparqlJsonResults =
        serde_json::from_str(body).map_err(|e| GraphStoreError::Parse {
            reason: format!("Failed to parse SPARQL results JSON: {e}"),
        })?;

    if let Some(boolean) = parsed.boolean {
        return Ok(DecodedResult::Boolean(boolean));
    }

    match parsed.results {
        Some(results) => Ok(DecodedResult::Bindings(results.bindings)),
        None => Err(GraphStoreError::Parse {
            reason: "SPARQL results JSON has neither 'boolean' nor 'results'".to_string(),
        }),
    }
}

fn decode_results_xml(body: &str, _codec: &dyn GraphCodec) -> Result<DecodedResult> {
    // Boolean-only XML results; matches the `>true</` element closing pattern
    Ok(DecodedResult::Boolean(body.contains(">true</")))
}

fn decode_text(body: &str, _codec: &dyn GraphCodec) -> Result<DecodedResult> {
    Ok(DecodedResult::Raw(body.to_string()))
}

fn decode_structured_graph(body: &str, codec: &dyn GraphCodec) -> Result<DecodedResult> {
    codec.from_document(body).map(DecodedResult::Graph)
}
