//! Error types for dispatch and term reconstruction

use graphparse_json_ld::JsonLdError;
use graphparse_turtle::TurtleError;
use graphparse_xml::XmlError;

/// A failed parse
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// No backend for the content type key
    #[error("Don't know how to parse {0} yet")]
    UnsupportedFormat(String),

    /// The input text is not JSON
    #[error("JSON decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// JSON-LD could not be converted to N-Quads
    #[error("JSON-LD transform error: {0}")]
    Transform(#[source] JsonLdError),

    /// A text grammar (Turtle, N-Quads, SPARQL Update) rejected the input
    #[error(transparent)]
    Syntax(#[from] TurtleError),

    /// Markup could not be read as XML, RDF/XML or RDFa
    #[error(transparent)]
    Markup(#[from] XmlError),

    /// A fault raised to a caller without a completion handler
    #[error("{source} while trying to parse <{base}> as {content_type}")]
    Context {
        base: String,
        content_type: String,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    /// Wrap a fault with the document it came from
    pub fn in_context(self, base: &str, content_type: &str) -> Self {
        ParseError::Context {
            base: base.to_string(),
            content_type: content_type.to_string(),
            source: Box::new(self),
        }
    }

    /// The fault without any context wrapper
    pub fn root(&self) -> &ParseError {
        match self {
            ParseError::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for parsing
pub type Result<T> = std::result::Result<T, ParseError>;

/// A lexical term that could not be turned back into a term
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TermError {
    #[error("unrecognized term: {0}")]
    Unrecognized(String),

    /// Term of the wrong kind for its position, e.g. a literal subject
    #[error("{term} is not allowed as {position}")]
    Position { position: &'static str, term: String },
}
