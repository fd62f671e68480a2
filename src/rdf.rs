//! Conversion between structured graphs and textual RDF serializations.

use oxigraph::io::{RdfFormat, RdfParser, RdfSerializer};
use oxigraph::model::Dataset;

use crate::error::{GraphStoreError, Result};
use crate::mime::content_types;

/// Serialization engine seam: converts between an in-memory [`Dataset`]
/// and its textual serializations.
///
/// `to_triples`/`from_triples` use N-Quads; `to_document`/`from_document`
/// use the structured-graph interchange format (JSON-LD).
pub trait GraphCodec: Send + Sync {
    /// Serialize a dataset to N-Quads text
    fn to_triples(&self, dataset: &Dataset) -> Result<String>;

    /// Parse N-Quads/N-Triples text into a dataset
    fn from_triples(&self, text: &str) -> Result<Dataset>;

    /// Serialize a dataset to a JSON-LD document
    fn to_document(&self, dataset: &Dataset) -> Result<String>;

    /// Parse a JSON-LD document into a dataset
    fn from_document(&self, document: &str) -> Result<Dataset>;
}

/// Default codec backed by oxigraph's RDF parser and serializer.
///
/// Parsing is lenient: graph-store responses routinely carry relative IRIs
/// that a strict parser would reject.
#[derive(Debug, Default, Clone, Copy)]
pub struct NQuadsCodec;

impl NQuadsCodec {
    fn parse(format: RdfFormat, text: &str) -> Result<Dataset> {
        let parser = RdfParser::from_format(format).lenient();
        let mut dataset = Dataset::new();

        for parsed in parser.for_reader(text.as_bytes()) {
            let quad = parsed.map_err(|e| GraphStoreError::Parse {
                reason: format!("Failed to parse {format} body: {e}"),
            })?;
            dataset.insert(&quad);
        }

        Ok(dataset)
    }

    fn serialize(format: RdfFormat, dataset: &Dataset) -> Result<String> {
        let mut serializer = RdfSerializer::from_format(format).for_writer(Vec::new());

        for quad in dataset.iter() {
            serializer
                .serialize_quad(quad)
                .map_err(|e| GraphStoreError::Parse {
                    reason: format!("Failed to serialize quad: {e}"),
                })?;
        }

        let bytes = serializer.finish().map_err(|e| GraphStoreError::Parse {
            reason: format!("Failed to finish serialization: {e}"),
        })?;

        String::from_utf8(bytes).map_err(|e| GraphStoreError::Parse {
            reason: format!("Serialized output is not valid UTF-8: {e}"),
        })
    }

    fn document_format() -> Result<RdfFormat> {
        RdfFormat::from_media_type(content_types::JSON_LD).ok_or_else(|| {
            GraphStoreError::UnsupportedContentType {
                content_type: content_types::JSON_LD.to_string(),
            }
        })
    }
}

impl GraphCodec for NQuadsCodec {
    fn to_triples(&self, dataset: &Dataset) -> Result<String> {
        Self::serialize(RdfFormat::NQuads, dataset)
    }

    fn from_triples(&self, text: &str) -> Result<Dataset> {
        Self::parse(RdfFormat::NQuads, text)
    }

    fn to_document(&self, dataset: &Dataset) -> Result<String> {
        Self::serialize(Self::document_format()?, dataset)
    }

    fn from_document(&self, document: &str) -> Result<Dataset> {
        Self::parse(Self::document_format()?, document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIPLE: &str =
        "<http://example.org/a> <http://example.org/b> <http://example.org/c> .";

    #[test]
    fn parses_nquads_into_a_dataset() {
        let dataset = NQuadsCodec.from_triples(TRIPLE).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn lenient_parsing_accepts_relative_iris() {
        let dataset = NQuadsCodec.from_triples("<a> <b> <c> .").unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn triples_round_trip_through_the_codec() {
        let dataset = NQuadsCodec.from_triples(TRIPLE).unwrap();
        let text = NQuadsCodec.to_triples(&dataset).unwrap();
        let reparsed = NQuadsCodec.from_triples(&text).unwrap();

        assert_eq!(reparsed.len(), dataset.len());
        for quad in dataset.iter() {
            assert!(reparsed.contains(quad));
        }
    }

    #[test]
    fn malformed_nquads_is_a_parse_error() {
        let err = NQuadsCodec
            .from_triples("<http://example.org/s> \"dangling\" .")
            .unwrap_err();
        assert!(matches!(err, GraphStoreError::Parse { .. }));
    }

    #[test]
    fn empty_input_yields_an_empty_dataset() {
        let dataset = NQuadsCodec.from_triples("").unwrap();
        assert!(dataset.is_empty());
    }
}
