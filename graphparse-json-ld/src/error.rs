use graphparse_ir::IriError;
use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum JsonLdError {
    #[error("Invalid context: {message}")]
    InvalidContext { message: String },

    #[error("Invalid IRI mapping for term '{term}'")]
    InvalidIriMapping { term: String },

    #[error("@language cannot be used for values with a specified @type")]
    LanguageWithType,

    #[error("Lists of lists are not supported at: {idx:?}")]
    NestedSequence { idx: Vec<JsonValue> },

    #[error("Invalid expanded JSON-LD: {0}")]
    InvalidStructure(String),

    #[error("IRI resolution error: {0}")]
    Iri(#[from] IriError),
}

pub type Result<T> = std::result::Result<T, JsonLdError>;
