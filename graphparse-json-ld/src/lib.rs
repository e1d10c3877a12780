//! Minimal JSON-LD processing for graphparse
//!
//! This library provides:
//! - Context processing (`@vocab`, `@base`, prefixes, term definitions)
//! - Document expansion
//! - Conversion of expanded documents to RDF through `GraphSink`
//! - N-Quads text output
//!
//! # Example
//!
//! ```
//! use graphparse_json_ld::to_nquads;
//! use serde_json::json;
//!
//! let doc = json!({
//!     "@context": {"homepage": {"@id": "http://xmlns.com/foaf/0.1/homepage", "@type": "@id"}},
//!     "@id": "../#me",
//!     "homepage": "xyz"
//! });
//!
//! let nquads = to_nquads(&doc, Some("https://www.example.org/abc/def")).unwrap();
//! assert_eq!(
//!     nquads,
//!     "<https://www.example.org/#me> <http://xmlns.com/foaf/0.1/homepage> <https://www.example.org/abc/xyz> .\n"
//! );
//! ```

pub mod canonical;
pub mod context;
pub mod error;
pub mod expand;
pub mod iri;
pub mod to_rdf;

pub use context::{Container, ContextEntry, ParsedContext, TypeValue};
pub use error::{JsonLdError, Result};
pub use to_rdf::to_graph_events;

use graphparse_ir::{GraphCollectorSink, GraphSink};
use serde_json::Value as JsonValue;

/// Expand a JSON-LD document, resolving relative identifiers against `base`.
///
/// # Example
/// ```
/// use graphparse_json_ld::expand;
/// use serde_json::json;
///
/// let doc = json!({
///     "@context": {"name": "http://schema.org/name"},
///     "@id": "http://example.org/person/1",
///     "name": "John Doe"
/// });
/// let expanded = expand(&doc, None).unwrap();
/// assert_eq!(expanded[0]["http://schema.org/name"][0]["@value"], "John Doe");
/// ```
pub fn expand(document: &JsonValue, base: Option<&str>) -> Result<JsonValue> {
    expand::node(document, &ParsedContext::with_base(base))
}

/// Expand a document and emit its statements to `sink`.
pub fn to_rdf<S: GraphSink>(document: &JsonValue, base: Option<&str>, sink: &mut S) -> Result<()> {
    let expanded = expand(document, base)?;
    to_graph_events(&expanded, sink)
}

/// Convert a document to N-Quads text, one statement per line.
pub fn to_nquads(document: &JsonValue, base: Option<&str>) -> Result<String> {
    let mut sink = GraphCollectorSink::new();
    to_rdf(document, base, &mut sink)?;
    Ok(sink.finish().to_nquads())
}
