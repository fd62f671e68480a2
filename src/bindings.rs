//! Textual substitution of `?name`/`$name` placeholders in SPARQL text.

use std::collections::BTreeMap;

use regex::{NoExpand, Regex};

use crate::error::{GraphStoreError, Result};

/// Name to replacement-text map for SPARQL templates.
///
/// A `BTreeMap` so that bindings are applied in sorted key order; with
/// overlapping replacement text the application order is observable, so it
/// has to be deterministic and documented.
pub type Bindings = BTreeMap<String, String>;

/// Replace every `?name`/`$name` occurrence with the bound value.
///
/// Substitution is purely textual: values are inserted verbatim, with no
/// escaping or quoting. Callers are responsible for pre-formatting IRI and
/// string values (see [`crate::iri::iri`] and [`crate::iri::literal`]); a
/// bound value containing SPARQL syntax will end up in the query as-is.
///
/// Matches are word-bounded on the name (`?name` does not match `?nameX`)
/// but not on the sigil. A name that does not occur in the text is a no-op.
/// Fails with [`GraphStoreError::InvalidBindingName`] if a name is not a
/// valid SPARQL variable identifier.
pub fn substitute(text: &str, bindings: &Bindings) -> Result<String> {
    let mut out = text.to_string();

    for (name, value) in bindings {
        if !is_valid_variable_name(name) {
            return Err(GraphStoreError::InvalidBindingName { name: name.clone() });
        }

        let pattern =
            Regex::new(&format!(r"[?$]{}\b", regex::escape(name))).map_err(|e| {
                GraphStoreError::InvalidBindingName {
                    name: format!("{name}: {e}"),
                }
            })?;

        // NoExpand: the bound value is literal text, not a regex template
        out = pattern.replace_all(&out, NoExpand(value)).into_owned();
    }

    Ok(out)
}

/// SPARQL `VARNAME` subset: ASCII alphanumerics and underscore.
fn is_valid_variable_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}
