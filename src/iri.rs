//! IRI resolution and SPARQL term formatting helpers.

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::{GraphStoreError, Result};

/// Resolve a value against an optional base IRI.
///
/// Absolute IRIs are returned untouched. Relative references are resolved
/// against `base` per RFC 3986. A relative reference without a base is a
/// caller error, not silently tolerated.
pub fn resolve(value: &str, base: Option<&str>) -> Result<String> {
    if Url::parse(value).is_ok() {
        return Ok(value.to_string());
    }

    let Some(base) = base else {
        return Err(GraphStoreError::IriResolution {
            iri: value.to_string(),
            reason: "relative IRI with no base".to_string(),
        });
    };

    let base_url = Url::parse(base).map_err(|e| GraphStoreError::IriResolution {
        iri: value.to_string(),
        reason: format!("invalid base <{base}>: {e}"),
    })?;

    let resolved = base_url
        .join(value)
        .map_err(|e| GraphStoreError::IriResolution {
            iri: value.to_string(),
            reason: e.to_string(),
        })?;

    Ok(resolved.to_string())
}

/// Resolve a value against an optional base and format it as an
/// angle-bracketed SPARQL IRI term, percent-decoded for display.
///
/// ```
/// use graph_store_client::iri;
///
/// let term = iri::iri("rel", Some("http://ex.org/")).unwrap();
/// assert_eq!(term, "<http://ex.org/rel>");
/// ```
pub fn iri(value: &str, base: Option<&str>) -> Result<String> {
    Ok(format!("<{}>", iri_bare(value, base)?))
}

/// Same as [`iri`] but without the surrounding angle brackets.
pub fn iri_bare(value: &str, base: Option<&str>) -> Result<String> {
    let resolved = resolve(value, base)?;
    Ok(percent_decode_str(&resolved).decode_utf8_lossy().into_owned())
}

/// Wrap a string in quotation marks for use as a SPARQL literal.
///
/// Internal quotes are not escaped; callers must pre-escape values that
/// may contain SPARQL syntax.
pub fn literal(value: &str) -> String {
    format!("\"{value}\"")
}
