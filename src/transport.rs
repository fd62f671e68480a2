//! HTTP transport seam and the default reqwest-backed implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::GraphStoreConfig;
use crate::error::Result;
use crate::interpret::ResponseEnvelope;

/// HTTP method used by the protocol operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// One outgoing request; constructed per call and discarded after send.
///
/// Kept (boxed) in endpoint errors as a diagnostic snapshot.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// URL query parameters (`graph=<iri>` for graph store operations)
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
}

/// Transport seam: one request in, one raw response out.
///
/// Connection handling, redirects, and TLS belong to the implementation.
/// The client performs no retries; a transport error is surfaced to the
/// caller verbatim.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<ResponseEnvelope>;
}

/// Default transport backed by a pooled [`reqwest::Client`].
pub struct HttpTransport {
    client: Client,
    username: Option<String>,
    password: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &GraphStoreConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            // Default request timeout, overridden per-request
            .timeout(config.timeouts.query_timeout())
            .build()?;

        Ok(Self {
            client,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &HttpRequest) -> Result<ResponseEnvelope> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &request.url)
            .timeout(request.timeout);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let (Some(user), Some(pass)) = (&self.username, &self.password) {
            builder = builder.basic_auth(user, Some(pass));
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().await?;

        Ok(ResponseEnvelope {
            status,
            headers,
            body,
        })
    }
}
