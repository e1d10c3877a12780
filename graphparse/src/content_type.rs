//! Content type keys and the formats they select.

use graphparse_vocab::media;

/// Key used when the caller gives no content type
pub const DEFAULT_CONTENT_TYPE: &str = media::TURTLE;

/// Every key the dispatcher handles
const HANDLED: &[&str] = &[
    media::N3,
    media::TURTLE,
    media::RDF_XML,
    media::XHTML,
    media::HTML,
    media::SPARQL_UPDATE,
    media::JSON_LD,
    media::NQUADS,
    media::N_QUADS,
];

/// Canonical key for a raw content type, falling back to `text/turtle`.
///
/// Parameters after the first `;` are dropped. Keys are compared exactly,
/// so `Text/Turtle` is a different (unhandled) key.
///
/// ```
/// use graphparse::content_type::resolve;
///
/// assert_eq!(resolve(Some("text/turtle;charset=UTF-8")), "text/turtle");
/// assert_eq!(resolve(None), "text/turtle");
/// ```
pub fn resolve(raw: Option<&str>) -> String {
    resolve_or(raw, DEFAULT_CONTENT_TYPE)
}

/// Like [`resolve`] with a caller-chosen default
pub fn resolve_or(raw: Option<&str>, default: &str) -> String {
    let raw = raw.unwrap_or(default);
    let key = raw.split(';').next().unwrap_or(raw);
    key.trim().to_string()
}

/// The registry of handled keys
pub fn handled_content_types() -> &'static [&'static str] {
    HANDLED
}

pub fn is_handled(key: &str) -> bool {
    HANDLED.contains(&key)
}

/// Parsing backend selected by a content type key
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Format {
    /// Turtle, and N3 read with the Turtle grammar
    Turtle,
    RdfXml,
    /// RDFa; `lenient` reads tag-soup HTML instead of well-formed XHTML
    Rdfa { lenient: bool },
    SparqlUpdate,
    JsonLd,
    NQuads,
    Unsupported(String),
}

impl Format {
    pub fn from_content_type(key: &str) -> Self {
        match key {
            media::N3 | media::TURTLE => Format::Turtle,
            media::RDF_XML => Format::RdfXml,
            media::XHTML => Format::Rdfa { lenient: false },
            media::HTML => Format::Rdfa { lenient: true },
            media::SPARQL_UPDATE => Format::SparqlUpdate,
            media::JSON_LD => Format::JsonLd,
            media::NQUADS | media::N_QUADS => Format::NQuads,
            other => Format::Unsupported(other.to_string()),
        }
    }

    /// Whether the backend runs through the buffered, asynchronous pipeline
    pub fn is_pipelined(&self) -> bool {
        matches!(self, Format::JsonLd | Format::NQuads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parameters_are_dropped() {
        assert_eq!(resolve(Some("text/turtle;charset=UTF-8")), "text/turtle");
        assert_eq!(resolve(Some("text/turtle ; charset=UTF-8")), "text/turtle");
        assert_eq!(resolve(Some("application/ld+json;profile=x;q=1")), "application/ld+json");
        assert!(!resolve(Some("a;b;c")).contains(';'));
    }

    #[test]
    fn test_default() {
        assert_eq!(resolve(None), "text/turtle");
        assert_eq!(resolve_or(None, "application/n-quads"), "application/n-quads");
        assert_eq!(resolve_or(Some("text/html"), "application/n-quads"), "text/html");
    }

    #[test]
    fn test_case_is_preserved() {
        assert_eq!(resolve(Some("Text/Turtle")), "Text/Turtle");
        assert_eq!(
            Format::from_content_type("Text/Turtle"),
            Format::Unsupported("Text/Turtle".to_string())
        );
    }

    #[test]
    fn test_registry_agrees_with_dispatch_table() {
        assert_eq!(handled_content_types().len(), 9);
        for key in handled_content_types() {
            assert!(is_handled(key));
            assert!(
                !matches!(Format::from_content_type(key), Format::Unsupported(_)),
                "{key} is registered but not dispatched"
            );
        }
        assert!(!is_handled("text/plain"));
    }

    #[test]
    fn test_format_table() {
        assert_eq!(Format::from_content_type("text/n3"), Format::Turtle);
        assert_eq!(Format::from_content_type("text/html"), Format::Rdfa { lenient: true });
        assert_eq!(
            Format::from_content_type("application/xhtml+xml"),
            Format::Rdfa { lenient: false }
        );
        assert!(Format::from_content_type("application/nquads").is_pipelined());
        assert!(Format::from_content_type("application/ld+json").is_pipelined());
        assert!(!Format::from_content_type("application/rdf+xml").is_pipelined());
    }
}
