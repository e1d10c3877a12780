//! Turtle parser that emits to GraphSink.
//!
//! Recursive descent over the token vector. `text/n3` documents go through
//! the same grammar; N3-only constructs (formulas, rules, paths) are
//! reported as parse errors.

use std::collections::HashMap;

use graphparse_ir::{iri, Datatype, GraphSink, TermId};
use graphparse_vocab::rdf;

use crate::error::{Result, TurtleError};
use crate::lex::{tokenize, Token, TokenKind};

/// Deepest nesting of `[ ... ]` and `( ... )` accepted
pub const MAX_NESTING: usize = 128;

/// Turtle parser state.
pub struct Parser<'a, S> {
    tokens: Vec<Token>,
    pos: usize,
    sink: &'a mut S,
    /// Prefix mappings (prefix -> namespace IRI)
    prefixes: HashMap<String, String>,
    /// Base IRI for relative IRI resolution
    base: Option<String>,
    /// Inside a `{ ... }` block the last statement may omit its `.`
    final_dot_optional: bool,
    /// Open blank node property lists and collections
    depth: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Position {
    Subject,
    Object,
}

impl<'a, S: GraphSink> Parser<'a, S> {
    /// Create a parser over a whole document.
    pub fn new(input: &str, sink: &'a mut S) -> Result<Self> {
        Ok(Self::from_tokens(tokenize(input)?, sink))
    }

    /// Create a parser over an already tokenized run ending in `Eof`.
    pub fn from_tokens(mut tokens: Vec<Token>, sink: &'a mut S) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let end = tokens.last().map_or(0, |t| t.end);
            tokens.push(Token::new(TokenKind::Eof, end, end));
        }
        Self {
            tokens,
            pos: 0,
            sink,
            prefixes: HashMap::new(),
            base: None,
            final_dot_optional: false,
            depth: 0,
        }
    }

    /// Resolve relative IRIs against `base`; an empty base means none.
    pub fn with_base(mut self, base: Option<&str>) -> Self {
        self.base = base.filter(|b| !b.is_empty()).map(str::to_string);
        self
    }

    /// Start with prefixes declared elsewhere (a SPARQL prologue).
    pub fn with_prefixes<I>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.prefixes.extend(prefixes);
        self
    }

    /// Accept a final statement without its terminating `.`.
    pub fn final_dot_optional(mut self) -> Self {
        self.final_dot_optional = true;
        self
    }

    /// Parse the entire document.
    pub fn parse(mut self) -> Result<()> {
        while !self.is_at_end() {
            self.parse_statement()?;
        }
        Ok(())
    }

    fn is_at_end(&self) -> bool {
        self.current().is_eof()
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    fn unexpected(&self, expected: &str) -> TurtleError {
        let token = self.current();
        TurtleError::parse(token.start, format!("expected {expected}, found {}", token.kind))
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<()> {
        if std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn parse_statement(&mut self) -> Result<()> {
        match &self.current().kind {
            TokenKind::KwPrefix | TokenKind::KwSparqlPrefix => self.parse_prefix_directive(),
            TokenKind::KwBase | TokenKind::KwSparqlBase => self.parse_base_directive(),
            _ => self.parse_triples(),
        }
    }

    /// `@prefix p: <iri> .` or `PREFIX p: <iri>`
    fn parse_prefix_directive(&mut self) -> Result<()> {
        let sparql_style = matches!(self.current().kind, TokenKind::KwSparqlPrefix);
        self.advance();

        let prefix = match &self.current().kind {
            TokenKind::PrefixedNameNs(p) => p.to_string(),
            _ => return Err(self.unexpected("prefix name")),
        };
        self.advance();

        let namespace = match &self.current().kind {
            TokenKind::Iri(reference) => self.resolve_iri(reference)?,
            _ => return Err(self.unexpected("namespace IRI")),
        };
        self.advance();

        self.sink.on_prefix(&prefix, &namespace);
        self.prefixes.insert(prefix, namespace);

        if !sparql_style {
            self.expect(&TokenKind::Dot, "'.' after @prefix")?;
        }
        Ok(())
    }

    /// `@base <iri> .` or `BASE <iri>`; relative bases resolve against the current one
    fn parse_base_directive(&mut self) -> Result<()> {
        let sparql_style = matches!(self.current().kind, TokenKind::KwSparqlBase);
        self.advance();

        let base = match &self.current().kind {
            TokenKind::Iri(reference) => self.resolve_iri(reference)?,
            _ => return Err(self.unexpected("base IRI")),
        };
        self.advance();

        self.sink.on_base(&base);
        self.base = Some(base);

        if !sparql_style {
            self.expect(&TokenKind::Dot, "'.' after @base")?;
        }
        Ok(())
    }

    fn parse_triples(&mut self) -> Result<()> {
        let subject = self.parse_term(Position::Subject)?;

        // `[ :p :o ] .` stands alone; otherwise a predicate list follows
        let bare_property_list = matches!(self.tokens[self.pos.saturating_sub(1)].kind, TokenKind::RBracket)
            && matches!(self.current().kind, TokenKind::Dot);
        if !bare_property_list {
            self.parse_predicate_object_list(subject)?;
        }

        if self.final_dot_optional && self.is_at_end() {
            return Ok(());
        }
        self.expect(&TokenKind::Dot, "'.' at end of statement")
    }

    fn parse_predicate_object_list(&mut self, subject: TermId) -> Result<()> {
        loop {
            let predicate = self.parse_predicate()?;
            self.parse_object_list(subject, predicate)?;

            if !matches!(self.current().kind, TokenKind::Semicolon) {
                return Ok(());
            }
            // repeated or trailing semicolons are allowed
            while matches!(self.current().kind, TokenKind::Semicolon) {
                self.advance();
            }
            if matches!(
                self.current().kind,
                TokenKind::Dot | TokenKind::RBracket | TokenKind::Eof
            ) {
                return Ok(());
            }
        }
    }

    fn parse_predicate(&mut self) -> Result<TermId> {
        if matches!(self.current().kind, TokenKind::KwA) {
            self.advance();
            return Ok(self.sink.term_iri(rdf::TYPE));
        }
        let kind = self.current().kind.clone();
        match self.iri_of(&kind) {
            Some(iri) => {
                let iri = iri?;
                self.advance();
                Ok(self.sink.term_iri(&iri))
            }
            None => Err(self.unexpected("predicate")),
        }
    }

    fn parse_object_list(&mut self, subject: TermId, predicate: TermId) -> Result<()> {
        loop {
            let object = self.parse_term(Position::Object)?;
            self.sink.emit_triple(subject, predicate, object);

            if !matches!(self.current().kind, TokenKind::Comma) {
                return Ok(());
            }
            self.advance();
        }
    }

    /// Subject or object term; literals only in object position.
    fn parse_term(&mut self, position: Position) -> Result<TermId> {
        let kind = self.current().kind.clone();
        if let Some(iri) = self.iri_of(&kind) {
            let iri = iri?;
            self.advance();
            return Ok(self.sink.term_iri(&iri));
        }

        match kind {
            TokenKind::BlankNodeLabel(label) => {
                self.advance();
                Ok(self.sink.term_blank(Some(&label)))
            }
            TokenKind::Anon => {
                self.advance();
                Ok(self.sink.term_blank(None))
            }
            TokenKind::Nil => {
                self.advance();
                Ok(self.sink.term_iri(rdf::NIL))
            }
            TokenKind::LBracket => self.nested(Self::parse_blank_node_property_list),
            TokenKind::LParen => self.nested(Self::parse_collection),
            TokenKind::String(_)
            | TokenKind::Integer(_)
            | TokenKind::Decimal(_)
            | TokenKind::Double(_)
            | TokenKind::KwTrue
            | TokenKind::KwFalse
                if position == Position::Object =>
            {
                self.parse_literal()
            }
            TokenKind::LBrace => Err(TurtleError::parse(
                self.current().start,
                "N3 formulas are not supported",
            )),
            TokenKind::Variable(name) => Err(TurtleError::parse(
                self.current().start,
                format!("variable ?{name} is not allowed in data"),
            )),
            _ if position == Position::Subject => Err(self.unexpected("subject")),
            _ => Err(self.unexpected("object")),
        }
    }

    /// IRI denoted by an IRI-ish token, or None for any other token
    fn iri_of(&self, kind: &TokenKind) -> Option<Result<String>> {
        match kind {
            TokenKind::Iri(reference) => Some(self.resolve_iri(reference)),
            TokenKind::PrefixedName { prefix, local } => {
                Some(self.expand_prefixed_name(prefix, local))
            }
            TokenKind::PrefixedNameNs(prefix) => Some(self.expand_prefixed_name(prefix, "")),
            _ => None,
        }
    }

    fn parse_literal(&mut self) -> Result<TermId> {
        let kind = self.current().kind.clone();
        self.advance();

        let (lexical, datatype) = match kind {
            TokenKind::String(value) => return self.parse_string_suffix(&value),
            TokenKind::Integer(lex) => (lex, Datatype::xsd_integer()),
            TokenKind::Decimal(lex) => (lex, Datatype::xsd_decimal()),
            TokenKind::Double(lex) => (lex, Datatype::xsd_double()),
            TokenKind::KwTrue => ("true".into(), Datatype::xsd_boolean()),
            TokenKind::KwFalse => ("false".into(), Datatype::xsd_boolean()),
            _ => return Err(self.unexpected("literal")),
        };
        Ok(self.sink.term_literal(&lexical, datatype, None))
    }

    /// Language tag or `^^datatype` after a string
    fn parse_string_suffix(&mut self, value: &str) -> Result<TermId> {
        match self.current().kind.clone() {
            TokenKind::LangTag(lang) => {
                self.advance();
                Ok(self
                    .sink
                    .term_literal(value, Datatype::rdf_lang_string(), Some(&lang)))
            }
            TokenKind::DoubleCaret => {
                self.advance();
                let kind = self.current().kind.clone();
                let datatype = match self.iri_of(&kind) {
                    Some(iri) => iri?,
                    None => return Err(self.unexpected("datatype IRI")),
                };
                self.advance();
                Ok(self
                    .sink
                    .term_literal(value, Datatype::from_iri(&datatype), None))
            }
            _ => Ok(self.sink.term_literal(value, Datatype::xsd_string(), None)),
        }
    }

    fn nested(&mut self, parse: fn(&mut Self) -> Result<TermId>) -> Result<TermId> {
        if self.depth == MAX_NESTING {
            return Err(TurtleError::parse(
                self.current().start,
                format!("nesting deeper than {MAX_NESTING} levels"),
            ));
        }
        self.depth += 1;
        let node = parse(self);
        self.depth -= 1;
        node
    }

    /// `[ predicate object ; ... ]`
    fn parse_blank_node_property_list(&mut self) -> Result<TermId> {
        self.expect(&TokenKind::LBracket, "'['")?;
        let node = self.sink.term_blank(None);
        if !matches!(self.current().kind, TokenKind::RBracket) {
            self.parse_predicate_object_list(node)?;
        }
        self.expect(&TokenKind::RBracket, "']'")?;
        Ok(node)
    }

    /// `( item ... )` as an rdf:first / rdf:rest chain
    fn parse_collection(&mut self) -> Result<TermId> {
        self.expect(&TokenKind::LParen, "'('")?;
        if matches!(self.current().kind, TokenKind::RParen) {
            self.advance();
            return Ok(self.sink.term_iri(rdf::NIL));
        }

        let first = self.sink.term_iri(rdf::FIRST);
        let rest = self.sink.term_iri(rdf::REST);
        let head = self.sink.term_blank(None);
        let mut node = head;

        loop {
            let item = self.parse_term(Position::Object)?;
            self.sink.emit_triple(node, first, item);

            if matches!(self.current().kind, TokenKind::RParen) {
                let nil = self.sink.term_iri(rdf::NIL);
                self.sink.emit_triple(node, rest, nil);
                break;
            }
            let next = self.sink.term_blank(None);
            self.sink.emit_triple(node, rest, next);
            node = next;
        }

        self.expect(&TokenKind::RParen, "')'")?;
        Ok(head)
    }

    fn resolve_iri(&self, reference: &str) -> Result<String> {
        Ok(iri::resolve_opt(self.base.as_deref(), reference)?)
    }

    fn expand_prefixed_name(&self, prefix: &str, local: &str) -> Result<String> {
        match self.prefixes.get(prefix) {
            Some(namespace) => Ok(format!("{namespace}{local}")),
            None => Err(TurtleError::UndefinedPrefix(prefix.to_string())),
        }
    }
}

/// Parse a Turtle document into GraphSink events.
pub fn parse<S: GraphSink>(input: &str, sink: &mut S) -> Result<()> {
    Parser::new(input, sink)?.parse()
}

/// Parse a Turtle document, resolving relative IRIs against `base`.
pub fn parse_with_base<S: GraphSink>(input: &str, base: &str, sink: &mut S) -> Result<()> {
    Parser::new(input, sink)?.with_base(Some(base)).parse()
}
