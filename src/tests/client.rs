#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{GraphStoreError, Result};
use crate::interpret::ResponseEnvelope;
use crate::rdf::{GraphCodec, NQuadsCodec};
use crate::transport::{HttpRequest, Method, Transport};
use crate::{Bindings, GraphStoreClient, GraphStoreConfig, InMemoryResolver};

/// Transport that records every request and replays scripted responses.
struct RecordingTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<ResponseEnvelope>>,
}

impl RecordingTransport {
    fn with_responses(responses: Vec<ResponseEnvelope>) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into()),
        })
    }

    fn recorded(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: &HttpRequest) -> Result<ResponseEnvelope> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| GraphStoreError::Transport {
                reason: "no scripted response left".to_string(),
            })
    }
}

/// Transport that fails every request at the connection level.
struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    async fn send(&self, _request: &HttpRequest) -> Result<ResponseEnvelope> {
        Err(GraphStoreError::Transport {
            reason: "connection refused".to_string(),
        })
    }
}

fn ok_response(content_type: &str, body: &str) -> ResponseEnvelope {
    ResponseEnvelope {
        status: 200,
        headers: vec![("Content-Type".to_string(), content_type.to_string())],
        body: body.to_string(),
    }
}

fn no_content_response() -> ResponseEnvelope {
    ResponseEnvelope {
        status: 204,
        headers: Vec::new(),
        body: String::new(),
    }
}

fn client_with(
    transport: Arc<RecordingTransport>,
) -> (GraphStoreClient, Arc<InMemoryResolver>) {
    let resolver = Arc::new(InMemoryResolver::new());
    let client = GraphStoreClient::with_parts(
        GraphStoreConfig::new("http://store.test/sparql", "http://store.test/graphs"),
        transport,
        resolver.clone(),
        Arc::new(NQuadsCodec),
    );
    (client, resolver)
}

fn one_binding(name: &str, value: &str) -> Bindings {
    let mut bindings = Bindings::new();
    bindings.insert(name.to_string(), value.to_string());
    bindings
}

#[tokio::test]
async fn query_prepends_preamble_and_substitutes_bindings() {
    let transport = RecordingTransport::with_responses(vec![ok_response(
        "application/sparql-results+json",
        r#"{"results":{"bindings":[]}}"#,
    )]);
    let (client, resolver) = client_with(transport.clone());

    resolver.set_base(Some("http://ex.org/".to_string()));
    resolver.register_prefix("foaf", "http://xmlns.com/foaf/0.1/");

    let bindings = one_binding("name", "<http://ex.org/n>");
    client
        .query("SELECT * WHERE { ?name a ?type }", Some(&bindings))
        .await
        .unwrap();

    let requests = transport.recorded();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url, "http://store.test/sparql");
    assert_eq!(
        request.body.as_deref().unwrap(),
        "BASE <http://ex.org/>\n\
         PREFIX foaf: <http://xmlns.com/foaf/0.1/>\n\
         SELECT * WHERE { <http://ex.org/n> a ?type }"
    );

    let header = |name: &str| {
        request
            .headers
            .iter()
            .find(|(h, _)| h == name)
            .map(|(_, v)| v.as_str())
    };
    assert_eq!(header("Content-Type"), Some("application/sparql-query"));
    assert_eq!(
        header("Accept"),
        Some("application/ld+json, application/sparql-results+json, application/json, */*")
    );
}

#[tokio::test]
async fn query_without_namespaces_has_no_preamble() {
    let transport = RecordingTransport::with_responses(vec![ok_response(
        "application/sparql-results+json",
        r#"{"results":{"bindings":[]}}"#,
    )]);
    let (client, _resolver) = client_with(transport.clone());

    client.query("ASK { ?s ?p ?o }", None).await.unwrap();

    let requests = transport.recorded();
    assert_eq!(requests[0].body.as_deref(), Some("ASK { ?s ?p ?o }"));
}

#[tokio::test]
async fn ask_json_result_decodes_to_boolean() {
    let transport = RecordingTransport::with_responses(vec![ok_response(
        "application/sparql-results+json",
        r#"{"boolean":true}"#,
    )]);
    let (client, _resolver) = client_with(transport);

    let result = client.query("ASK { ?s ?p ?o }", None).await.unwrap();
    assert_eq!(result.as_boolean(), Some(true));
}

#[tokio::test]
async fn select_result_decodes_to_bindings() {
    let transport = RecordingTransport::with_responses(vec![ok_response(
        "application/sparql-results+json",
        r#"{"results":{"bindings":[{"s":{"type":"uri","value":"http://ex.org/a"}}]}}"#,
    )]);
    let (client, _resolver) = client_with(transport);

    let result = client.query("SELECT ?s WHERE { ?s ?p ?o }", None).await.unwrap();
    let bindings = result.as_bindings().unwrap();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0]["s"].value, "http://ex.org/a");
}

#[tokio::test]
async fn error_status_rejects_with_endpoint_error() {
    let transport = RecordingTransport::with_responses(vec![ResponseEnvelope {
        status: 404,
        headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
        body: "no such graph".to_string(),
    }]);
    let (client, _resolver) = client_with(transport);

    let err = client.query("SELECT * WHERE { ?s ?p ?o }", None).await.unwrap_err();
    match &err {
        GraphStoreError::Endpoint {
            status,
            body,
            request,
            ..
        } => {
            assert_eq!(*status, 404);
            assert_eq!(body, "no such graph");
            assert_eq!(request.method, Method::Post);
        }
        other => panic!("expected endpoint error, got {other:?}"),
    }
    assert_eq!(err.to_string(), "SPARQL Endpoint Error:404 no such graph");
}

#[tokio::test]
async fn transport_error_is_surfaced_verbatim() {
    let resolver = Arc::new(InMemoryResolver::new());
    let client = GraphStoreClient::with_parts(
        GraphStoreConfig::new("http://store.test/sparql", "http://store.test/graphs"),
        Arc::new(FailingTransport),
        resolver,
        Arc::new(NQuadsCodec),
    );

    let err = client.query("SELECT * WHERE { ?s ?p ?o }", None).await.unwrap_err();
    assert!(matches!(err, GraphStoreError::Transport { .. }));
}

#[tokio::test]
async fn update_uses_update_mime_and_yields_no_payload() {
    let transport = RecordingTransport::with_responses(vec![no_content_response()]);
    let (client, _resolver) = client_with(transport.clone());

    client
        .update("INSERT DATA { <http://ex.org/a> <http://ex.org/b> <http://ex.org/c> }", None)
        .await
        .unwrap();

    let requests = transport.recorded();
    assert_eq!(requests.len(), 1);
    assert!(
        requests[0]
            .headers
            .contains(&("Content-Type".to_string(), "application/sparql-update".to_string()))
    );
}

#[tokio::test]
async fn extra_query_headers_are_sent() {
    let transport = RecordingTransport::with_responses(vec![no_content_response()]);
    let resolver = Arc::new(InMemoryResolver::new());
    let mut config = GraphStoreConfig::new("http://store.test/sparql", "http://store.test/graphs");
    config.query_headers = vec![(
        "SD-Connection-String".to_string(),
        "reasoning=SL".to_string(),
    )];
    let client = GraphStoreClient::with_parts(config, transport.clone(), resolver, Arc::new(NQuadsCodec));

    client.query("ASK { ?s ?p ?o }", None).await.unwrap();

    let requests = transport.recorded();
    assert!(
        requests[0]
            .headers
            .contains(&("SD-Connection-String".to_string(), "reasoning=SL".to_string()))
    );
}

#[tokio::test]
async fn put_issues_single_put_with_graph_param_and_body() {
    let transport = RecordingTransport::with_responses(vec![no_content_response()]);
    let (client, resolver) = client_with(transport.clone());
    resolver.set_base(Some("http://ex.org/".to_string()));

    client
        .put("g1", "<a> <b> <c> .", Some("text/turtle"))
        .await
        .unwrap();

    let requests = transport.recorded();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.url, "http://store.test/graphs");
    assert_eq!(
        request.query,
        vec![("graph".to_string(), "http://ex.org/g1".to_string())]
    );
    assert_eq!(request.body.as_deref(), Some("<a> <b> <c> ."));
    assert!(
        request
            .headers
            .contains(&("Content-Type".to_string(), "text/turtle".to_string()))
    );
}

#[tokio::test]
async fn put_raw_text_defaults_to_turtle() {
    let transport = RecordingTransport::with_responses(vec![no_content_response()]);
    let (client, resolver) = client_with(transport.clone());
    resolver.set_base(Some("http://ex.org/".to_string()));

    client.put("g1", "<a> <b> <c> .", None).await.unwrap();

    let requests = transport.recorded();
    assert!(
        requests[0]
            .headers
            .contains(&("Content-Type".to_string(), "text/turtle".to_string()))
    );
}

#[tokio::test]
async fn put_dataset_is_serialized_to_nquads() {
    let transport = RecordingTransport::with_responses(vec![no_content_response()]);
    let (client, resolver) = client_with(transport.clone());
    resolver.set_base(Some("http://ex.org/".to_string()));

    let dataset = NQuadsCodec
        .from_triples("<http://example.org/a> <http://example.org/b> <http://example.org/c> .")
        .unwrap();

    // Structured content ignores the caller's content type
    client.put("g1", dataset, Some("text/turtle")).await.unwrap();

    let requests = transport.recorded();
    let request = &requests[0];
    assert!(
        request
            .headers
            .contains(&("Content-Type".to_string(), "application/n-quads".to_string()))
    );
    let body = request.body.as_deref().unwrap();
    assert!(body.contains("<http://example.org/a>"));
    assert!(body.contains("<http://example.org/c>"));
}

#[tokio::test]
async fn post_uses_post_method_on_the_same_path() {
    let transport = RecordingTransport::with_responses(vec![no_content_response()]);
    let (client, resolver) = client_with(transport.clone());
    resolver.set_base(Some("http://ex.org/".to_string()));

    client.post("g1", "<a> <b> <c> .", None).await.unwrap();

    let requests = transport.recorded();
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].url, "http://store.test/graphs");
}

#[tokio::test]
async fn delete_sends_graph_param_and_no_body() {
    let transport = RecordingTransport::with_responses(vec![no_content_response()]);
    let (client, resolver) = client_with(transport.clone());
    resolver.set_base(Some("http://ex.org/".to_string()));

    client.delete("g1").await.unwrap();

    let requests = transport.recorded();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, Method::Delete);
    assert_eq!(
        request.query,
        vec![("graph".to_string(), "http://ex.org/g1".to_string())]
    );
    assert!(request.body.is_none());
}

#[tokio::test]
async fn get_text_plain_body_decodes_to_a_graph() {
    let transport = RecordingTransport::with_responses(vec![ok_response(
        "text/plain",
        "<http://ex.org/a> <http://ex.org/b> \"caf\\u00e9\" .",
    )]);
    let (client, resolver) = client_with(transport);
    resolver.set_base(Some("http://ex.org/".to_string()));

    let result = client.get("g1").await.unwrap();
    let graph = result.as_graph().unwrap();
    assert_eq!(graph.len(), 1);

    let serialized = NQuadsCodec.to_triples(graph).unwrap();
    assert!(serialized.contains("café"));
}

#[tokio::test]
async fn put_then_get_echo_round_trips_a_triple() {
    let triple = "<a> <b> <c> .";
    let transport = RecordingTransport::with_responses(vec![
        no_content_response(),
        ok_response("text/plain", triple),
    ]);
    let (client, resolver) = client_with(transport.clone());
    resolver.set_base(Some("http://ex.org/".to_string()));

    client.put("g1", triple, Some("text/turtle")).await.unwrap();
    let result = client.get("g1").await.unwrap();

    let graph = result.as_graph().unwrap();
    assert_eq!(graph.len(), 1);

    let requests = transport.recorded();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, Method::Put);
    assert_eq!(requests[1].method, Method::Get);
    for request in &requests {
        assert_eq!(
            request.query,
            vec![("graph".to_string(), "http://ex.org/g1".to_string())]
        );
    }
}

#[tokio::test]
async fn unknown_response_content_type_passes_through_raw() {
    let transport = RecordingTransport::with_responses(vec![ok_response(
        "application/octet-stream",
        "opaque",
    )]);
    let (client, _resolver) = client_with(transport);

    let result = client.query("SELECT * WHERE { ?s ?p ?o }", None).await.unwrap();
    assert_eq!(result.as_raw(), Some("opaque"));
}

#[tokio::test]
async fn relative_graph_iri_without_base_is_a_caller_error() {
    let transport = RecordingTransport::with_responses(vec![]);
    let (client, _resolver) = client_with(transport.clone());

    let err = client.get("g1").await.unwrap_err();
    assert!(matches!(err, GraphStoreError::IriResolution { .. }));
    // Nothing was sent
    assert!(transport.recorded().is_empty());
}

#[tokio::test]
async fn absolute_graph_iri_ignores_the_base() {
    let transport = RecordingTransport::with_responses(vec![no_content_response()]);
    let (client, resolver) = client_with(transport.clone());
    resolver.set_base(Some("http://ex.org/".to_string()));

    client.delete("http://other.org/g").await.unwrap();

    let requests = transport.recorded();
    assert_eq!(
        requests[0].query,
        vec![("graph".to_string(), "http://other.org/g".to_string())]
    );
}

#[tokio::test]
async fn resolver_mutation_is_visible_to_subsequent_calls() {
    let transport = RecordingTransport::with_responses(vec![
        no_content_response(),
        no_content_response(),
    ]);
    let (client, resolver) = client_with(transport.clone());

    resolver.set_base(Some("http://first.org/".to_string()));
    client.delete("g").await.unwrap();

    resolver.set_base(Some("http://second.org/".to_string()));
    client.delete("g").await.unwrap();

    let requests = transport.recorded();
    assert_eq!(requests[0].query[0].1, "http://first.org/g");
    assert_eq!(requests[1].query[0].1, "http://second.org/g");
}

#[tokio::test]
async fn invalid_binding_name_rejects_before_sending() {
    let transport = RecordingTransport::with_responses(vec![]);
    let (client, _resolver) = client_with(transport.clone());

    let bindings = one_binding("no spaces", "X");
    let err = client
        .query("SELECT * WHERE { ?s ?p ?o }", Some(&bindings))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphStoreError::InvalidBindingName { .. }));
    assert!(transport.recorded().is_empty());
}
