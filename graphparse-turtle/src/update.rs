//! SPARQL Update patches.
//!
//! Reads the ground subset of SPARQL Update used to describe patches:
//! `INSERT DATA`, `DELETE DATA` and `DELETE { } INSERT { } WHERE { }`
//! operations separated by `;`, with a `PREFIX`/`BASE` prologue. Block
//! contents are Turtle triples and go through the Turtle parser.

use std::collections::HashMap;

use graphparse_ir::{iri, Graph, GraphCollectorSink};
use tracing::debug;

use crate::error::{Result, TurtleError};
use crate::lex::{tokenize, Token, TokenKind};
use crate::parser::Parser;

/// The three statement sets of a patch
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Patch {
    pub insert: Graph,
    pub delete: Graph,
    pub where_: Graph,
}

impl Patch {
    pub fn is_empty(&self) -> bool {
        self.insert.is_empty() && self.delete.is_empty() && self.where_.is_empty()
    }
}

#[derive(Clone, Copy, Debug)]
enum Target {
    Insert,
    Delete,
    Where,
}

struct UpdateReader {
    tokens: Vec<Token>,
    pos: usize,
    base: Option<String>,
    prefixes: HashMap<String, String>,
    patch: Patch,
}

/// Parse a SPARQL Update request into a patch, resolving relative IRIs
/// against `base` (an empty base means none).
pub fn parse_update(input: &str, base: &str) -> Result<Patch> {
    let mut reader = UpdateReader {
        tokens: tokenize(input)?,
        pos: 0,
        base: Some(base).filter(|b| !b.is_empty()).map(str::to_string),
        prefixes: HashMap::new(),
        patch: Patch::default(),
    };
    reader.read()?;
    Ok(reader.patch)
}

impl UpdateReader {
    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) {
        if !self.current().is_eof() {
            self.pos += 1;
        }
    }

    fn unexpected(&self, expected: &str) -> TurtleError {
        let token = self.current();
        TurtleError::parse(token.start, format!("expected {expected}, found {}", token.kind))
    }

    fn keyword(&mut self, word: &str) -> Result<()> {
        if self.current().kind.is_keyword(word) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(word))
        }
    }

    fn read(&mut self) -> Result<()> {
        loop {
            self.read_prologue()?;
            if self.current().is_eof() {
                return Ok(());
            }
            self.read_operation()?;

            match self.current().kind {
                TokenKind::Semicolon => self.advance(),
                TokenKind::Eof => return Ok(()),
                _ => return Err(self.unexpected("';' or end of update")),
            }
        }
    }

    fn read_prologue(&mut self) -> Result<()> {
        loop {
            match self.current().kind {
                TokenKind::KwSparqlPrefix => {
                    self.advance();
                    let prefix = match &self.current().kind {
                        TokenKind::PrefixedNameNs(p) => p.to_string(),
                        _ => return Err(self.unexpected("prefix name")),
                    };
                    self.advance();
                    let namespace = self.iri_ref("namespace IRI")?;
                    self.prefixes.insert(prefix, namespace);
                }
                TokenKind::KwSparqlBase => {
                    self.advance();
                    self.base = Some(self.iri_ref("base IRI")?);
                }
                _ => return Ok(()),
            }
        }
    }

    fn iri_ref(&mut self, expected: &str) -> Result<String> {
        let resolved = match &self.current().kind {
            TokenKind::Iri(reference) => iri::resolve_opt(self.base.as_deref(), reference)?,
            _ => return Err(self.unexpected(expected)),
        };
        self.advance();
        Ok(resolved)
    }

    fn read_operation(&mut self) -> Result<()> {
        if self.current().kind.is_keyword("INSERT") {
            self.advance();
            if self.current().kind.is_keyword("DATA") {
                self.advance();
                debug!("INSERT DATA");
                return self.read_block(Target::Insert);
            }
            self.read_block(Target::Insert)?;
            self.keyword("WHERE")?;
            return self.read_block(Target::Where);
        }

        if self.current().kind.is_keyword("DELETE") {
            self.advance();
            if self.current().kind.is_keyword("DATA") {
                self.advance();
                debug!("DELETE DATA");
                return self.read_block(Target::Delete);
            }
            self.read_block(Target::Delete)?;
            if self.current().kind.is_keyword("INSERT") {
                self.advance();
                self.read_block(Target::Insert)?;
            }
            self.keyword("WHERE")?;
            return self.read_block(Target::Where);
        }

        Err(self.unexpected("INSERT or DELETE"))
    }

    /// `{ triples }` parsed into the target graph
    fn read_block(&mut self, target: Target) -> Result<()> {
        if !matches!(self.current().kind, TokenKind::LBrace) {
            return Err(self.unexpected("'{'"));
        }
        self.advance();

        let start = self.pos;
        loop {
            let token = self.current();
            match &token.kind {
                TokenKind::RBrace => break,
                TokenKind::Eof => return Err(self.unexpected("'}'")),
                TokenKind::LBrace => {
                    return Err(TurtleError::parse(token.start, "nested groups are not supported"))
                }
                TokenKind::Variable(name) => {
                    return Err(TurtleError::parse(
                        token.start,
                        format!("variable ?{name} is not supported in a patch"),
                    ))
                }
                _ => self.advance(),
            }
        }
        let block = self.tokens[start..self.pos].to_vec();
        self.advance();

        let mut sink = GraphCollectorSink::new();
        Parser::from_tokens(block, &mut sink)
            .with_base(self.base.as_deref())
            .with_prefixes(self.prefixes.clone())
            .final_dot_optional()
            .parse()?;
        let graph = sink.finish();

        match target {
            Target::Insert => self.patch.insert.extend(graph),
            Target::Delete => self.patch.delete.extend(graph),
            Target::Where => self.patch.where_.extend(graph),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphparse_ir::Term;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_data() {
        let patch = parse_update(
            "INSERT DATA { <https://example.com/#s> <https://example.com/#p> <https://example.com/#o>. }",
            "https://example.com/",
        )
        .unwrap();

        assert_eq!(
            patch.insert.to_ntriples(),
            "<https://example.com/#s> <https://example.com/#p> <https://example.com/#o> .\n"
        );
        assert!(patch.delete.is_empty());
        assert!(patch.where_.is_empty());
    }

    #[test]
    fn test_delete_insert_where_with_prologue() {
        let patch = parse_update(
            r#"
            PREFIX ex: <http://example.org/>
            BASE <http://example.org/doc>
            DELETE { ex:s ex:p "old" }
            INSERT { ex:s ex:p "new" }
            WHERE { ex:s ex:p "old" . <#me> a ex:Thing }
            "#,
            "",
        )
        .unwrap();

        assert_eq!(patch.delete.len(), 1);
        assert_eq!(patch.insert.quads()[0].o, Term::string("new"));
        assert_eq!(patch.where_.len(), 2);
        assert_eq!(
            patch.where_.quads()[1].s,
            Term::iri("http://example.org/doc#me")
        );
    }

    #[test]
    fn test_operations_separated_by_semicolon() {
        let patch = parse_update(
            "insert data { <http://a/s> <http://a/p> 1 } ; delete data { <http://a/s> <http://a/p> 2 . }",
            "",
        )
        .unwrap();
        assert_eq!(patch.insert.len(), 1);
        assert_eq!(patch.delete.len(), 1);
    }

    #[test]
    fn test_variables_rejected() {
        let err = parse_update(
            "DELETE { ?s <http://a/p> ?o } WHERE { ?s <http://a/p> ?o }",
            "",
        )
        .unwrap_err();
        assert!(err.to_string().contains("variable ?s"), "{err}");
    }

    #[test]
    fn test_unknown_operation() {
        let err = parse_update("LOAD <http://a/doc>", "").unwrap_err();
        assert!(err.to_string().contains("INSERT or DELETE"), "{err}");
    }

    #[test]
    fn test_empty_update_is_empty_patch() {
        assert!(parse_update("PREFIX ex: <http://a/>", "").unwrap().is_empty());
    }
}
