//! Terms: IRIs, blank nodes and literals.

use crate::Datatype;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Label of a blank node, stored without the `_:` prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlankId(Arc<str>);

impl BlankId {
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(Arc::from(label.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// Value of a literal.
///
/// Text formats always produce `String` (the lexical form as written).
/// JSON-LD numbers and booleans arrive as native values, and `@json`
/// values as canonical JSON text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum LiteralValue {
    String(Arc<str>),
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Json(Arc<str>),
}

impl LiteralValue {
    pub fn string(s: impl AsRef<str>) -> Self {
        LiteralValue::String(Arc::from(s.as_ref()))
    }

    /// Lexical form. Doubles use the canonical XSD spelling (`1.5E0`, `INF`).
    pub fn lexical(&self) -> String {
        match self {
            LiteralValue::String(s) | LiteralValue::Json(s) => s.to_string(),
            LiteralValue::Boolean(b) => b.to_string(),
            LiteralValue::Integer(i) => i.to_string(),
            LiteralValue::Double(d) if d.is_nan() => "NaN".to_string(),
            LiteralValue::Double(d) if d.is_infinite() => {
                let inf = if d.is_sign_positive() { "INF" } else { "-INF" };
                inf.to_string()
            }
            LiteralValue::Double(d) => {
                let exp = format!("{d:E}");
                // `1E0` needs a fraction digit to be canonical
                match exp.split_once('E') {
                    Some((mantissa, e)) if !mantissa.contains('.') => format!("{mantissa}.0E{e}"),
                    _ => exp,
                }
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Values of different kinds never compare equal, even with the same
    /// lexical form.
    fn key(&self) -> (u8, String) {
        let rank = match self {
            LiteralValue::String(_) => 0,
            LiteralValue::Boolean(_) => 1,
            LiteralValue::Integer(_) => 2,
            LiteralValue::Double(_) => 3,
            LiteralValue::Json(_) => 4,
        };
        (rank, self.lexical())
    }
}

impl PartialEq for LiteralValue {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for LiteralValue {}

impl Hash for LiteralValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for LiteralValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LiteralValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// A node or value in a statement.
///
/// IRIs are absolute and non-empty. A literal with a language tag has the
/// datatype `rdf:langString`. Terms order blank nodes first, then IRIs,
/// then literals.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    BlankNode(BlankId),
    Iri(Arc<str>),
    Literal {
        value: LiteralValue,
        datatype: Datatype,
        language: Option<Arc<str>>,
    },
}

impl Term {
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Term::Iri(Arc::from(iri.as_ref()))
    }

    pub fn blank(label: impl AsRef<str>) -> Self {
        Term::BlankNode(BlankId::new(label))
    }

    /// Blank node whose label is unique within the process
    pub fn fresh_blank() -> Self {
        Term::blank(crate::sink::fresh_blank_label())
    }

    pub fn string(value: impl AsRef<str>) -> Self {
        Term::typed(value, Datatype::xsd_string())
    }

    pub fn integer(value: i64) -> Self {
        Term::Literal {
            value: LiteralValue::Integer(value),
            datatype: Datatype::xsd_integer(),
            language: None,
        }
    }

    pub fn lang_string(value: impl AsRef<str>, lang: impl AsRef<str>) -> Self {
        Term::Literal {
            value: LiteralValue::string(value),
            datatype: Datatype::rdf_lang_string(),
            language: Some(Arc::from(lang.as_ref())),
        }
    }

    pub fn typed(value: impl AsRef<str>, datatype: Datatype) -> Self {
        Term::Literal {
            value: LiteralValue::string(value),
            datatype,
            language: None,
        }
    }

    /// Literal from its lexical parts.
    ///
    /// A language tag wins over a datatype; with neither the literal is an
    /// `xsd:string`.
    pub fn literal(value: impl AsRef<str>, language: Option<&str>, datatype: Option<&str>) -> Self {
        match (language, datatype) {
            (Some(lang), _) => Term::lang_string(value, lang),
            (None, Some(dt)) => Term::typed(value, Datatype::from_iri(dt)),
            (None, None) => Term::string(value),
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_blank(&self) -> Option<&BlankId> {
        match self {
            Term::BlankNode(id) => Some(id),
            _ => None,
        }
    }

    /// Value, datatype and language of a literal
    pub fn as_literal(&self) -> Option<(&LiteralValue, &Datatype, Option<&str>)> {
        match self {
            Term::Literal {
                value,
                datatype,
                language,
            } => Some((value, datatype, language.as_deref())),
            _ => None,
        }
    }

    pub fn language(&self) -> Option<&str> {
        self.as_literal().and_then(|(_, _, lang)| lang)
    }

    pub fn datatype(&self) -> Option<&Datatype> {
        self.as_literal().map(|(_, dt, _)| dt)
    }

    pub fn lexical_value(&self) -> Option<String> {
        self.as_literal().map(|(value, _, _)| value.lexical())
    }
}

/// Escape a lexical form for an N-Triples string.
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// N-Triples spelling; `xsd:string` literals get no datatype suffix.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::BlankNode(id) => id.fmt(f),
            Term::Literal {
                value,
                datatype,
                language,
            } => {
                write!(f, "\"{}\"", escape_literal(&value.lexical()))?;
                match language {
                    Some(lang) => write!(f, "@{lang}"),
                    None if datatype.is_xsd_string() => Ok(()),
                    None => write!(f, "^^<{datatype}>"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphparse_vocab::xsd;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_literal_from_parts() {
        assert_eq!(Term::literal("x", None, None), Term::string("x"));
        assert_eq!(
            Term::literal("x", Some("en"), Some("http://example.org/ignored")),
            Term::lang_string("x", "en")
        );
        assert_eq!(
            Term::literal("5", None, Some(xsd::INTEGER)),
            Term::typed("5", Datatype::xsd_integer())
        );

        let lang = Term::lang_string("bonjour", "fr");
        assert!(lang.datatype().unwrap().is_lang_string());
        assert_eq!(lang.language(), Some("fr"));
        assert_eq!(lang.lexical_value().as_deref(), Some("bonjour"));
    }

    #[test]
    fn test_native_values_differ_from_lexical_ones() {
        assert_ne!(Term::integer(2), Term::typed("2", Datatype::xsd_integer()));
        assert_eq!(Term::integer(2).to_string(), Term::typed("2", Datatype::xsd_integer()).to_string());
    }

    #[test]
    fn test_double_lexical_form() {
        assert_eq!(LiteralValue::Double(1.1).lexical(), "1.1E0");
        assert_eq!(LiteralValue::Double(1.0).lexical(), "1.0E0");
        assert_eq!(LiteralValue::Double(1500.0).lexical(), "1.5E3");
        assert_eq!(LiteralValue::Double(f64::NAN).lexical(), "NaN");
        assert_eq!(LiteralValue::Double(f64::NEG_INFINITY).lexical(), "-INF");
    }

    #[test]
    fn test_ordering() {
        assert!(Term::blank("b0") < Term::iri("http://example.org"));
        assert!(Term::iri("http://example.org") < Term::string("hello"));
        assert!(Term::iri("http://a.org") < Term::iri("http://b.org"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Term::iri("http://example.org").to_string(), "<http://example.org>");
        assert_eq!(Term::blank("b0").to_string(), "_:b0");
        assert_eq!(Term::lang_string("bonjour", "fr").to_string(), "\"bonjour\"@fr");
        assert_eq!(
            Term::integer(42).to_string(),
            "\"42\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
        assert_eq!(Term::string("say \"hi\"\n").to_string(), "\"say \\\"hi\\\"\\n\"");
    }
}
