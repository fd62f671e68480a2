use thiserror::Error;

use crate::transport::HttpRequest;

/// Graph store client errors
#[derive(Error, Debug)]
pub enum GraphStoreError {
    /// HTTP request failed before a response was obtained
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport-level failure reported by a non-HTTP transport
    #[error("Transport error: {reason}")]
    Transport { reason: String },

    /// Endpoint returned an error status (>= 400)
    ///
    /// The message embeds the status code and the raw entity verbatim;
    /// the request snapshot and response headers are kept for diagnosis.
    #[error("SPARQL Endpoint Error:{status} {body}")]
    Endpoint {
        status: u16,
        body: String,
        headers: Vec<(String, String)>,
        request: Box<HttpRequest>,
    },

    /// Binding name is not a valid SPARQL variable identifier
    #[error("Invalid binding name: {name}")]
    InvalidBindingName { name: String },

    /// No MIME entry registered for the requested payload kind or type
    #[error("Unsupported content type: {content_type}")]
    UnsupportedContentType { content_type: String },

    /// Relative IRI could not be resolved
    #[error("Cannot resolve IRI <{iri}>: {reason}")]
    IriResolution { iri: String, reason: String },

    /// Failed to parse a response body
    #[error("Failed to parse response: {reason}")]
    Parse { reason: String },
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, GraphStoreError>;
