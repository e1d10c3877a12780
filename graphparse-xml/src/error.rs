//! Error types for the XML readers

use graphparse_ir::IriError;

/// Error type for XML tree building and the RDF/XML and RDFa walkers
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// Malformed XML (strict mode)
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    /// Document without any element
    #[error("document has no root element")]
    NoRoot,

    /// Qualified name whose prefix has no namespace declaration
    #[error("Undefined namespace prefix: {0}")]
    UndefinedPrefix(String),

    /// RDF/XML structure error
    #[error("RDF/XML error: {0}")]
    RdfXml(String),

    /// IRI resolution error (relative IRI without base)
    #[error("IRI resolution error: {0}")]
    Iri(#[from] IriError),
}

/// Result type for XML operations
pub type Result<T> = std::result::Result<T, XmlError>;
