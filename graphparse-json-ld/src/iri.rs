//! Compact IRI helpers.

/// Parse a compact IRI like "schema:name" into (prefix, suffix).
/// Returns None if not a valid compact IRI.
///
/// A compact IRI has the form prefix:suffix where:
/// - prefix does not contain : or /
/// - suffix does not start with //
pub fn parse_prefix(s: &str) -> Option<(&str, &str)> {
    let (prefix, suffix) = s.split_once(':')?;
    if prefix.is_empty() || prefix.contains('/') || prefix == "_" || suffix.starts_with("//") {
        return None;
    }
    Some((prefix, suffix))
}

/// `@`-prefixed keyword form
pub fn is_keyword(s: &str) -> bool {
    s.starts_with('@') && s.len() > 1
}

pub fn is_blank(s: &str) -> bool {
    s.starts_with("_:")
}

/// Absolute IRI or blank node identifier; anything else is dropped from RDF output
pub fn is_well_formed_node(s: &str) -> bool {
    is_blank(s) || graphparse_ir::iri::is_absolute(s)
}
