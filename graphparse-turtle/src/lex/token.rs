//! Token types produced by the lexer.

use std::sync::Arc;

/// A token with its source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Start byte offset
    pub start: usize,
    /// End byte offset
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

/// Token kinds.
///
/// Numeric tokens keep their lexical form so literals round-trip exactly
/// (`007` stays `"007"^^xsd:integer`).
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// `<...>` with escapes decoded, not yet resolved against a base
    Iri(Arc<str>),
    /// `prefix:` with no local part
    PrefixedNameNs(Arc<str>),
    /// `prefix:local`
    PrefixedName { prefix: Arc<str>, local: Arc<str> },

    /// `_:name`
    BlankNodeLabel(Arc<str>),
    /// `[]`
    Anon,
    /// `()`
    Nil,

    /// String literal (escapes decoded)
    String(Arc<str>),
    Integer(Arc<str>),
    Decimal(Arc<str>),
    Double(Arc<str>),
    /// Language tag without the `@`
    LangTag(Arc<str>),

    /// `@prefix`
    KwPrefix,
    /// `@base`
    KwBase,
    /// `PREFIX` (any case)
    KwSparqlPrefix,
    /// `BASE` (any case)
    KwSparqlBase,
    /// `a`
    KwA,
    KwTrue,
    KwFalse,
    /// Any other bare word (`INSERT`, `DATA`, `WHERE`, ...)
    Keyword(Arc<str>),
    /// `?name` or `$name`
    Variable(Arc<str>),

    Dot,
    Comma,
    Semicolon,
    /// `^^`
    DoubleCaret,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,

    Eof,
}

impl TokenKind {
    /// Whether this is the bare word `word`, compared case-insensitively
    pub fn is_keyword(&self, word: &str) -> bool {
        matches!(self, TokenKind::Keyword(w) if w.eq_ignore_ascii_case(word))
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Iri(s) => write!(f, "<{}>", s),
            TokenKind::PrefixedNameNs(s) => write!(f, "{}:", s),
            TokenKind::PrefixedName { prefix, local } => write!(f, "{}:{}", prefix, local),
            TokenKind::BlankNodeLabel(s) => write!(f, "_:{}", s),
            TokenKind::Anon => write!(f, "[]"),
            TokenKind::Nil => write!(f, "()"),
            TokenKind::String(s) => write!(f, "\"{}\"", s),
            TokenKind::Integer(s) | TokenKind::Decimal(s) | TokenKind::Double(s) => {
                write!(f, "{}", s)
            }
            TokenKind::LangTag(s) => write!(f, "@{}", s),
            TokenKind::KwPrefix => write!(f, "@prefix"),
            TokenKind::KwBase => write!(f, "@base"),
            TokenKind::KwSparqlPrefix => write!(f, "PREFIX"),
            TokenKind::KwSparqlBase => write!(f, "BASE"),
            TokenKind::KwA => write!(f, "a"),
            TokenKind::KwTrue => write!(f, "true"),
            TokenKind::KwFalse => write!(f, "false"),
            TokenKind::Keyword(w) => write!(f, "{}", w),
            TokenKind::Variable(v) => write!(f, "?{}", v),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::DoubleCaret => write!(f, "^^"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::RBrace => write!(f, "}}"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}
