//! Response interpretation: status classification and body decoding.

use std::collections::HashMap;

use oxigraph::model::Dataset;
use serde::Deserialize;

use crate::error::{GraphStoreError, Result};
use crate::mime::{self, ContentNegotiator, content_types};
use crate::rdf::GraphCodec;
use crate::transport::HttpRequest;

/// Raw HTTP response as produced by the transport, consumed exactly once.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ResponseEnvelope {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Declared content type, including any parameters
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// One term of a SPARQL JSON results binding
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BindingTerm {
    /// Term kind: `uri`, `literal`, or `bnode`
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(default)]
    pub datatype: Option<String>,
    #[serde(default, rename = "xml:lang")]
    pub lang: Option<String>,
}

/// The decoded value returned to the caller.
///
/// Which variant is produced depends on the response's declared content
/// type: SELECT results decode to `Bindings`, ASK results to `Boolean`,
/// CONSTRUCT/DESCRIBE and graph retrieval to `Graph`, anything without a
/// registered decoder to `Raw`.
#[derive(Debug, Clone)]
pub enum DecodedResult {
    Bindings(Vec<HashMap<String, BindingTerm>>),
    Boolean(bool),
    Graph(Dataset),
    Raw(String),
}

impl DecodedResult {
    pub fn as_bindings(&self) -> Option<&[HashMap<String, BindingTerm>]> {
        match self {
            DecodedResult::Bindings(bindings) => Some(bindings),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            DecodedResult::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_graph(&self) -> Option<&Dataset> {
        match self {
            DecodedResult::Graph(dataset) => Some(dataset),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            DecodedResult::Raw(body) => Some(body),
            _ => None,
        }
    }
}

/// Classify a response and decode its body.
///
/// Exactly one outcome is realized per call: an error status never yields a
/// decoded result. On success the body is dispatched on the declared
/// content type; `text/plain` carries the legacy N-Quads-as-text convention
/// and goes through Unicode-escape decoding before the serialization
/// engine, everything else goes through the negotiator.
pub(crate) fn interpret(
    request: &HttpRequest,
    response: ResponseEnvelope,
    negotiator: &ContentNegotiator,
    codec: &dyn GraphCodec,
) -> Result<DecodedResult> {
    if response.status >= 400 {
        tracing::debug!(
            status = response.status,
            url = %request.url,
            "endpoint returned an error status"
        );
        return Err(GraphStoreError::Endpoint {
            status: response.status,
            body: response.body,
            headers: response.headers,
            request: Box::new(request.clone()),
        });
    }

    let content_type = response.content_type().map(str::to_owned);
    tracing::debug!(
        status = response.status,
        content_type = content_type.as_deref().unwrap_or(""),
        bytes = response.body.len(),
        "decoding response entity"
    );
    tracing::trace!(entity = %response.body, "raw response entity");

    match content_type.as_deref() {
        Some(declared) if mime::essence(declared) == content_types::PLAIN => {
            let decoded = decode_unicode_escapes(&response.body);
            codec.from_triples(&decoded).map(DecodedResult::Graph)
        }
        Some(declared) => negotiator.decode(declared, &response.body, codec),
        None => Ok(DecodedResult::Raw(response.body)),
    }
}

/// Decode `\uXXXX` and `\UXXXXXXXX` escape sequences to characters.
///
/// Stores commonly escape non-ASCII characters in plain-text N-Quads
/// bodies. Malformed sequences are kept verbatim rather than dropped.
pub fn decode_unicode_escapes(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }

        let width = match chars.peek() {
            Some('u') => 4,
            Some('U') => 8,
            _ => {
                result.push(c);
                continue;
            }
        };

        let marker = chars.next().unwrap_or_default();
        let hex: String = chars.by_ref().take(width).collect();
        if hex.len() == width
            && let Ok(code) = u32::from_str_radix(&hex, 16)
            && let Some(decoded) = char::from_u32(code)
        {
            result.push(decoded);
        } else {
            // Malformed escape: keep original
            result.push('\\');
            result.push(marker);
            result.push_str(&hex);
        }
    }

    result
}
