//! Parser configuration.

use serde::Deserialize;

use crate::content_type::DEFAULT_CONTENT_TYPE;

/// Settings shared by every parse call of a [`Parser`](crate::Parser)
///
/// Deserializes from TOML or JSON; missing fields take their defaults.
///
/// ```
/// use graphparse::ParserConfig;
///
/// let config: ParserConfig = serde_json::from_str(r#"{"record_provenance": false}"#).unwrap();
/// assert_eq!(config.default_content_type, "text/turtle");
/// assert!(!config.record_provenance);
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParserConfig {
    /// Content type assumed when the caller gives none
    pub default_content_type: String,
    /// Write synchronously parsed statements with the document IRI as context
    pub record_provenance: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
            record_provenance: true,
        }
    }
}

impl ParserConfig {
    pub fn with_default_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.default_content_type = content_type.into();
        self
    }

    pub fn with_provenance(mut self, record: bool) -> Self {
        self.record_provenance = record;
        self
    }
}
