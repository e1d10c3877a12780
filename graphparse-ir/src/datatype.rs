//! Literal datatypes.
//!
//! Every literal carries a datatype IRI. A plain literal is `xsd:string` and
//! a language-tagged one is `rdf:langString`; nothing is left untyped.

use graphparse_vocab::{rdf, xsd};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Expanded datatype IRI of a literal.
///
/// Compared, hashed and ordered by IRI. The JSON-LD `@json` keyword is
/// stored as `rdf:JSON`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Datatype(Arc<str>);

macro_rules! well_known {
    ($($(#[$doc:meta])* $name:ident => $iri:path;)*) => {
        impl Datatype {
            $(
                $(#[$doc])*
                pub fn $name() -> Self {
                    Datatype(Arc::from($iri))
                }
            )*
        }
    };
}

well_known! {
    /// `xsd:string`, the datatype of plain literals
    xsd_string => xsd::STRING;
    xsd_boolean => xsd::BOOLEAN;
    xsd_integer => xsd::INTEGER;
    xsd_decimal => xsd::DECIMAL;
    xsd_double => xsd::DOUBLE;
    /// `rdf:langString`, the datatype of language-tagged literals
    rdf_lang_string => rdf::LANG_STRING;
    rdf_xml_literal => rdf::XML_LITERAL;
    rdf_html => rdf::HTML;
    rdf_json => rdf::JSON;
}

impl Datatype {
    pub fn from_iri(iri: impl AsRef<str>) -> Self {
        match iri.as_ref() {
            "@json" => Self::rdf_json(),
            iri => Datatype(Arc::from(iri)),
        }
    }

    pub fn as_iri(&self) -> &str {
        &self.0
    }

    pub fn is_xsd_string(&self) -> bool {
        self.as_iri() == xsd::STRING
    }

    pub fn is_lang_string(&self) -> bool {
        self.as_iri() == rdf::LANG_STRING
    }

    /// Whether the lexical form is markup (`rdf:XMLLiteral` or `rdf:HTML`)
    pub fn is_markup(&self) -> bool {
        matches!(self.as_iri(), rdf::XML_LITERAL | rdf::HTML)
    }

    pub fn is_json(&self) -> bool {
        self.as_iri() == rdf::JSON
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
