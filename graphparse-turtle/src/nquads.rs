//! Line-oriented N-Quads reader.
//!
//! Yields statements in lexical notation rather than as terms: IRIs as
//! `<iri>`, blank nodes as `_:label`, literals as `"value"` followed by
//! `@lang` or `^^<datatype>`. Turning these back into terms is left to the
//! caller.

use std::fmt;

use graphparse_ir::iri;

use crate::error::{Result, TurtleError};
use crate::lex::{tokenize, Token, TokenKind};

/// One N-Quads statement with every position in lexical notation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexicalQuad {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub graph: Option<String>,
}

impl fmt::Display for LexicalQuad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if let Some(graph) = &self.graph {
            write!(f, " {graph}")?;
        }
        f.write_str(" .")
    }
}

/// Iterator over the statements of an N-Quads document.
///
/// Comments and blank lines are skipped. A malformed line yields an error
/// carrying its 1-based line number; the iterator can be resumed after it.
pub struct NQuadsReader<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> NQuadsReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().enumerate(),
        }
    }
}

impl Iterator for NQuadsReader<'_> {
    type Item = Result<LexicalQuad>;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, line) in self.lines.by_ref() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Some(read_line(trimmed).map_err(|message| TurtleError::Line {
                line: index + 1,
                message,
            }));
        }
        None
    }
}

/// Read every statement, stopping at the first malformed line
pub fn read_all(input: &str) -> Result<Vec<LexicalQuad>> {
    NQuadsReader::new(input).collect()
}

fn read_line(line: &str) -> std::result::Result<LexicalQuad, String> {
    let tokens = tokenize(line).map_err(|e| e.to_string())?;
    let mut cursor = LineCursor { tokens, pos: 0 };

    let subject = cursor.resource("subject")?;
    let predicate = match cursor.next_kind() {
        TokenKind::Iri(value) => absolute_iri(&value)?,
        other => return Err(format!("expected predicate IRI, found {other}")),
    };
    let object = cursor.object()?;
    let graph = match cursor.peek() {
        TokenKind::Dot => None,
        TokenKind::Eof => return Err("expected '.', found end of input".to_string()),
        _ => Some(cursor.resource("graph label")?),
    };

    match cursor.next_kind() {
        TokenKind::Dot => {}
        other => return Err(format!("expected '.', found {other}")),
    }
    match cursor.next_kind() {
        TokenKind::Eof => {}
        TokenKind::Dot => return Err("expected end of line, found '.'".to_string()),
        other => return Err(format!("expected end of line, found {other}")),
    }

    Ok(LexicalQuad {
        subject,
        predicate,
        object,
        graph,
    })
}

fn absolute_iri(value: &str) -> std::result::Result<String, String> {
    if iri::is_absolute(value) {
        Ok(format!("<{value}>"))
    } else {
        Err(format!("relative IRI <{value}> is not allowed"))
    }
}

struct LineCursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl LineCursor {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn next_kind(&mut self) -> TokenKind {
        let kind = self.tokens[self.pos].kind.clone();
        if !matches!(kind, TokenKind::Eof) {
            self.pos += 1;
        }
        kind
    }

    /// IRI or blank node
    fn resource(&mut self, what: &str) -> std::result::Result<String, String> {
        match self.next_kind() {
            TokenKind::Iri(value) => absolute_iri(&value),
            TokenKind::BlankNodeLabel(label) => Ok(format!("_:{label}")),
            other => Err(format!("expected {what}, found {other}")),
        }
    }

    fn object(&mut self) -> std::result::Result<String, String> {
        let value = match self.peek() {
            TokenKind::String(value) => value.clone(),
            _ => return self.resource("object"),
        };
        self.pos += 1;

        match self.peek().clone() {
            TokenKind::LangTag(lang) => {
                self.pos += 1;
                Ok(format!("\"{value}\"@{lang}"))
            }
            TokenKind::DoubleCaret => {
                self.pos += 1;
                match self.next_kind() {
                    TokenKind::Iri(datatype) => Ok(format!("\"{value}\"^^{}", absolute_iri(&datatype)?)),
                    other => Err(format!("expected datatype IRI, found {other}")),
                }
            }
            _ => Ok(format!("\"{value}\"")),
        }
    }
}
