//! Lexer built on winnow.
//!
//! Produces the whole token vector up front and stops at the first invalid
//! token with a line/column message and a pointer into the source line.

use std::sync::Arc;

use winnow::ascii::digit1;
use winnow::combinator::{alt, delimited, opt, peek, preceded};
use winnow::error::{ContextError, ErrMode};
use winnow::stream::{AsChar, Location};
use winnow::token::{any, one_of, take_till, take_while};
use winnow::{LocatingSlice, ModalResult, Parser};

use super::chars::*;
use super::token::{Token, TokenKind};
use crate::error::{Result, TurtleError};

/// Input type for the lexer - tracks position for spans.
pub type Input<'a> = LocatingSlice<&'a str>;

fn backtrack<T>() -> ModalResult<T> {
    Err(ErrMode::Backtrack(ContextError::new()))
}

pub struct Lexer<'a> {
    input: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }

    /// Tokenize the entire input, ending with an `Eof` token.
    pub fn tokenize(self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut input = LocatingSlice::new(self.input);

        loop {
            skip_ws_and_comments(&mut input);

            let start = input.current_token_start();
            if input.is_empty() {
                tokens.push(Token::new(TokenKind::Eof, start, start));
                return Ok(tokens);
            }

            match next_token(&mut input) {
                Ok(kind) => tokens.push(Token::new(kind, start, input.current_token_start())),
                Err(_) => return Err(self.error_at(start)),
            }
        }
    }

    fn error_at(&self, position: usize) -> TurtleError {
        let bad_char = self.input[position..].chars().next().unwrap_or('?');
        let (line, col) = self.line_col(position);
        let source_line = self.input.lines().nth(line - 1).unwrap_or("");

        let what = match bad_char {
            '"' | '\'' => "unterminated string literal".to_string(),
            '<' => "invalid or unterminated IRI".to_string(),
            c if !c.is_ascii() && !is_pn_chars_base(c) => {
                format!("unexpected character '{}' (U+{:04X})", c.escape_unicode(), c as u32)
            }
            c => format!("unexpected character '{}'", c),
        };

        let pointer = " ".repeat(col.saturating_sub(1));
        TurtleError::lexer(
            position,
            format!("{what} at line {line}, column {col}\n  |\n{line} | {source_line}\n  | {pointer}^"),
        )
    }

    /// 1-indexed (line, column) of a byte offset
    fn line_col(&self, position: usize) -> (usize, usize) {
        let before = &self.input[..position];
        let line = before.matches('\n').count() + 1;
        let col = match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        (line, col)
    }
}

fn skip_ws_and_comments(input: &mut Input<'_>) {
    loop {
        let _: ModalResult<&str> = take_while(0.., is_ws).parse_next(input);
        if !input.starts_with('#') {
            return;
        }
        let _: ModalResult<&str> = take_till(0.., |c| c == '\n' || c == '\r').parse_next(input);
    }
}

fn next_token(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    alt((
        parse_double_caret,
        parse_iri_ref,
        parse_blank_node_label,
        parse_anon,
        parse_nil,
        parse_at_word,
        parse_variable,
        parse_default_prefix,
        parse_word,
        parse_string_literal,
        parse_number,
        parse_punctuation,
    ))
    .parse_next(input)
}

// IRIs

fn parse_iri_ref(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    delimited('<', iri_body, '>')
        .map(|s: String| TokenKind::Iri(Arc::from(s)))
        .parse_next(input)
}

/// Characters inside `<...>`; only `\u` / `\U` escapes are allowed.
fn iri_body(input: &mut Input<'_>) -> ModalResult<String> {
    let mut out = String::new();
    loop {
        let chunk: &str = take_while(0.., is_iri_char).parse_next(input)?;
        out.push_str(chunk);

        if !input.starts_with('\\') {
            return Ok(out);
        }
        '\\'.parse_next(input)?;
        match any.parse_next(input)? {
            'u' => out.push(hex_char(input, 4)?),
            'U' => out.push(hex_char(input, 8)?),
            _ => return backtrack(),
        }
    }
}

fn hex_char(input: &mut Input<'_>, digits: usize) -> ModalResult<char> {
    let hex: &str = take_while(digits, AsChar::is_hex_digit).parse_next(input)?;
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(c) => Ok(c),
        None => backtrack(),
    }
}

// Words: directives, language tags, keywords, prefixed names, variables

/// `@prefix`, `@base`, or a language tag
fn parse_at_word(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    let word: &str = preceded(
        '@',
        take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-'),
    )
    .parse_next(input)?;

    Ok(match word.to_ascii_lowercase().as_str() {
        "prefix" => TokenKind::KwPrefix,
        "base" => TokenKind::KwBase,
        _ => TokenKind::LangTag(Arc::from(word)),
    })
}

fn parse_variable(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    preceded(one_of(['?', '$']), take_while(1.., is_varname_char))
        .map(|name: &str| TokenKind::Variable(Arc::from(name)))
        .parse_next(input)
}

/// `:local` or bare `:`
fn parse_default_prefix(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    ':'.parse_next(input)?;
    Ok(match opt(parse_pn_local).parse_next(input)? {
        Some(local) => TokenKind::PrefixedName {
            prefix: Arc::from(""),
            local: Arc::from(local),
        },
        None => TokenKind::PrefixedNameNs(Arc::from("")),
    })
}

/// PN_PREFIX followed by `:` is a prefixed name; otherwise a keyword.
fn parse_word(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    let first = input.chars().next();
    if !first.is_some_and(is_pn_chars_base) {
        return backtrack();
    }

    let word = dotted_run(input, is_pn_chars)?;

    if peek(opt(':')).parse_next(input)?.is_some() {
        ':'.parse_next(input)?;
        return Ok(match opt(parse_pn_local).parse_next(input)? {
            Some(local) => TokenKind::PrefixedName {
                prefix: Arc::from(word),
                local: Arc::from(local),
            },
            None => TokenKind::PrefixedNameNs(Arc::from(word)),
        });
    }

    Ok(match word.as_str() {
        "a" => TokenKind::KwA,
        "true" => TokenKind::KwTrue,
        "false" => TokenKind::KwFalse,
        w if w.eq_ignore_ascii_case("prefix") => TokenKind::KwSparqlPrefix,
        w if w.eq_ignore_ascii_case("base") => TokenKind::KwSparqlBase,
        w => TokenKind::Keyword(Arc::from(w)),
    })
}

/// A run of `allowed` characters where `.` may appear but not at the end.
fn dotted_run(input: &mut Input<'_>, allowed: fn(char) -> bool) -> ModalResult<String> {
    let mut out = String::new();
    loop {
        let chunk: &str = take_while(0.., allowed).parse_next(input)?;
        out.push_str(chunk);

        let continues = input.starts_with('.')
            && input[1..].chars().next().is_some_and(allowed);
        if !continues {
            return Ok(out);
        }
        '.'.parse_next(input)?;
        out.push('.');
    }
}

/// Local part of a prefixed name, with `%XX` and `\` escapes
fn parse_pn_local(input: &mut Input<'_>) -> ModalResult<String> {
    let first = input.chars().next();
    if !first.is_some_and(|c| is_pn_local_start(c) || c == '%' || c == '\\') {
        return backtrack();
    }

    let mut out = String::new();
    loop {
        let chunk: &str = take_while(0.., |c: char| is_pn_chars(c) || c == ':').parse_next(input)?;
        out.push_str(chunk);

        if input.starts_with('.') {
            let next = input[1..].chars().next();
            if next.is_some_and(|c| is_pn_chars(c) || matches!(c, ':' | '%' | '\\')) {
                '.'.parse_next(input)?;
                out.push('.');
                continue;
            }
            break;
        } else if input.starts_with('%') {
            let hex: &str = preceded('%', take_while(2, AsChar::is_hex_digit)).parse_next(input)?;
            out.push('%');
            out.push_str(hex);
        } else if input.starts_with('\\') {
            let escaped = preceded('\\', any).parse_next(input)?;
            if !"_~.-!$&'()*+,;=/?#@%".contains(escaped) {
                return backtrack();
            }
            out.push(escaped);
        } else {
            break;
        }
    }

    if out.is_empty() {
        return backtrack();
    }
    Ok(out)
}

// Blank nodes

fn parse_blank_node_label(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    "_:".parse_next(input)?;
    let first = input.chars().next();
    if !first.is_some_and(|c| is_pn_chars_u(c) || c.is_ascii_digit()) {
        return backtrack();
    }
    // a trailing dot ends the statement, it is not part of the label
    let name = dotted_run(input, is_pn_chars)?;
    Ok(TokenKind::BlankNodeLabel(Arc::from(name)))
}

fn parse_anon(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    ('[', take_while(0.., is_ws), ']')
        .map(|_| TokenKind::Anon)
        .parse_next(input)
}

fn parse_nil(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    ('(', take_while(0.., is_ws), ')')
        .map(|_| TokenKind::Nil)
        .parse_next(input)
}

// Strings

fn parse_string_literal(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    alt((
        delimited("\"\"\"", long_double, "\"\"\""),
        delimited("'''", long_single, "'''"),
        delimited('"', short_double, '"'),
        delimited('\'', short_single, '\''),
    ))
    .map(|s: String| TokenKind::String(Arc::from(s)))
    .parse_next(input)
}

fn long_double(input: &mut Input<'_>) -> ModalResult<String> {
    string_body(input, '"', true)
}

fn long_single(input: &mut Input<'_>) -> ModalResult<String> {
    string_body(input, '\'', true)
}

fn short_double(input: &mut Input<'_>) -> ModalResult<String> {
    string_body(input, '"', false)
}

fn short_single(input: &mut Input<'_>) -> ModalResult<String> {
    string_body(input, '\'', false)
}

/// String content up to (not including) the closing delimiter.
///
/// Short strings stop at a line break, which leaves the closing delimiter
/// unmatched and reports an unterminated string.
fn string_body(input: &mut Input<'_>, quote: char, long: bool) -> ModalResult<String> {
    let mut out = String::new();
    loop {
        let chunk: &str = take_while(0.., |c: char| {
            c != quote && c != '\\' && (long || (c != '\n' && c != '\r'))
        })
        .parse_next(input)?;
        out.push_str(chunk);

        if input.starts_with('\\') {
            '\\'.parse_next(input)?;
            out.push(parse_escape_char(input)?);
            continue;
        }

        let closing_run = input.chars().take_while(|&c| c == quote).count();
        if long && closing_run > 0 && closing_run < 3 {
            let c: char = any.parse_next(input)?;
            out.push(c);
            continue;
        }
        if long && closing_run > 3 {
            // `""""` : the first quote belongs to the content
            let c: char = any.parse_next(input)?;
            out.push(c);
            continue;
        }
        return Ok(out);
    }
}

fn parse_escape_char(input: &mut Input<'_>) -> ModalResult<char> {
    match any.parse_next(input)? {
        't' => Ok('\t'),
        'b' => Ok('\x08'),
        'n' => Ok('\n'),
        'r' => Ok('\r'),
        'f' => Ok('\x0C'),
        '"' => Ok('"'),
        '\'' => Ok('\''),
        '\\' => Ok('\\'),
        'u' => hex_char(input, 4),
        'U' => hex_char(input, 8),
        _ => backtrack(),
    }
}

// Numbers

/// INTEGER, DECIMAL or DOUBLE, keeping the lexical form
fn parse_number(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    let text: &str = (
        opt(one_of(['+', '-'])),
        alt(((digit1, opt(('.', digit1))).void(), ('.', digit1).void())),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .parse_next(input)?;

    let lexical = Arc::from(text);
    Ok(if text.contains(['e', 'E']) {
        TokenKind::Double(lexical)
    } else if text.contains('.') {
        TokenKind::Decimal(lexical)
    } else {
        TokenKind::Integer(lexical)
    })
}

// Punctuation

fn parse_double_caret(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    "^^".map(|_| TokenKind::DoubleCaret).parse_next(input)
}

fn parse_punctuation(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    any.verify_map(|c| match c {
        '.' => Some(TokenKind::Dot),
        ',' => Some(TokenKind::Comma),
        ';' => Some(TokenKind::Semicolon),
        '[' => Some(TokenKind::LBracket),
        ']' => Some(TokenKind::RBracket),
        '(' => Some(TokenKind::LParen),
        ')' => Some(TokenKind::RParen),
        '{' => Some(TokenKind::LBrace),
        '}' => Some(TokenKind::RBrace),
        _ => None,
    })
    .parse_next(input)
}

/// Tokenize a document string.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tok(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| !matches!(k, TokenKind::Eof))
            .collect()
    }

    fn s(value: &str) -> Arc<str> {
        Arc::from(value)
    }

    #[test]
    fn test_iri() {
        assert_eq!(
            tok("<http://example.org/>"),
            vec![TokenKind::Iri(s("http://example.org/"))]
        );
        assert_eq!(tok("<>"), vec![TokenKind::Iri(s(""))]);
        assert_eq!(tok("<../#me>"), vec![TokenKind::Iri(s("../#me"))]);
        assert_eq!(tok("<a\\u00E9>"), vec![TokenKind::Iri(s("a\u{e9}"))]);
    }

    #[test]
    fn test_prefixed_names() {
        assert_eq!(
            tok("ex:name"),
            vec![TokenKind::PrefixedName {
                prefix: s("ex"),
                local: s("name"),
            }]
        );
        assert_eq!(tok("ex:"), vec![TokenKind::PrefixedNameNs(s("ex"))]);
        assert_eq!(
            tok(":name"),
            vec![TokenKind::PrefixedName {
                prefix: s(""),
                local: s("name"),
            }]
        );
        assert_eq!(tok(":"), vec![TokenKind::PrefixedNameNs(s(""))]);
    }

    #[test]
    fn test_prefixed_name_before_statement_dot() {
        assert_eq!(
            tok("ex:a."),
            vec![
                TokenKind::PrefixedName {
                    prefix: s("ex"),
                    local: s("a"),
                },
                TokenKind::Dot
            ]
        );
    }

    #[test]
    fn test_blank_nodes() {
        assert_eq!(tok("_:b1"), vec![TokenKind::BlankNodeLabel(s("b1"))]);
        assert_eq!(
            tok("_:b.1."),
            vec![TokenKind::BlankNodeLabel(s("b.1")), TokenKind::Dot]
        );
        assert_eq!(tok("[]"), vec![TokenKind::Anon]);
        assert_eq!(tok("[ ]"), vec![TokenKind::Anon]);
        assert_eq!(tok("( )"), vec![TokenKind::Nil]);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(tok("a"), vec![TokenKind::KwA]);
        assert_eq!(tok("true false"), vec![TokenKind::KwTrue, TokenKind::KwFalse]);
        assert_eq!(tok("@prefix @base"), vec![TokenKind::KwPrefix, TokenKind::KwBase]);
        assert_eq!(
            tok("PREFIX prefix Base"),
            vec![
                TokenKind::KwSparqlPrefix,
                TokenKind::KwSparqlPrefix,
                TokenKind::KwSparqlBase
            ]
        );
        assert_eq!(
            tok("INSERT DATA"),
            vec![TokenKind::Keyword(s("INSERT")), TokenKind::Keyword(s("DATA"))]
        );
        assert!(TokenKind::Keyword(s("insert")).is_keyword("INSERT"));
    }

    #[test]
    fn test_variables_and_braces() {
        assert_eq!(
            tok("{ ?x $y }"),
            vec![
                TokenKind::LBrace,
                TokenKind::Variable(s("x")),
                TokenKind::Variable(s("y")),
                TokenKind::RBrace
            ]
        );
    }

    #[test]
    fn test_lang_tag() {
        assert_eq!(tok("@en"), vec![TokenKind::LangTag(s("en"))]);
        assert_eq!(tok("@be-x-old"), vec![TokenKind::LangTag(s("be-x-old"))]);
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(tok("\"hello\""), vec![TokenKind::String(s("hello"))]);
        assert_eq!(tok("'hello'"), vec![TokenKind::String(s("hello"))]);
        assert_eq!(tok("\"\""), vec![TokenKind::String(s(""))]);
        assert_eq!(
            tok("\"hello\\nworld\""),
            vec![TokenKind::String(s("hello\nworld"))]
        );
        assert_eq!(
            tok("\"ангельская Вікіпэдыя\""),
            vec![TokenKind::String(s("ангельская Вікіпэдыя"))]
        );
    }

    #[test]
    fn test_long_strings() {
        assert_eq!(
            tok("\"\"\"hello\nworld\"\"\""),
            vec![TokenKind::String(s("hello\nworld"))]
        );
        assert_eq!(
            tok("\"\"\"say \"hi\"\"\"\""),
            vec![TokenKind::String(s("say \"hi\""))]
        );
    }

    #[test]
    fn test_numbers_keep_lexical_form() {
        assert_eq!(tok("42"), vec![TokenKind::Integer(s("42"))]);
        assert_eq!(tok("-007"), vec![TokenKind::Integer(s("-007"))]);
        assert_eq!(tok("3.14"), vec![TokenKind::Decimal(s("3.14"))]);
        assert_eq!(tok(".5"), vec![TokenKind::Decimal(s(".5"))]);
        assert_eq!(tok("1e10"), vec![TokenKind::Double(s("1e10"))]);
        assert_eq!(tok("1.5E-3"), vec![TokenKind::Double(s("1.5E-3"))]);
        assert_eq!(tok("1."), vec![TokenKind::Integer(s("1")), TokenKind::Dot]);
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            tok(".;,"),
            vec![TokenKind::Dot, TokenKind::Semicolon, TokenKind::Comma]
        );
        assert_eq!(tok("^^"), vec![TokenKind::DoubleCaret]);
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            tok("ex:name # this is a comment\nex:value"),
            vec![
                TokenKind::PrefixedName {
                    prefix: s("ex"),
                    local: s("name"),
                },
                TokenKind::PrefixedName {
                    prefix: s("ex"),
                    local: s("value"),
                },
            ]
        );
    }

    #[test]
    fn test_error_unexpected_char() {
        let msg = tokenize("ex:name % ex:value").unwrap_err().to_string();
        assert!(msg.contains("unexpected character '%'"), "{msg}");
        assert!(msg.contains("line 1, column 9"), "{msg}");
    }

    #[test]
    fn test_error_unterminated_string() {
        let msg = tokenize("ex:name \"unterminated").unwrap_err().to_string();
        assert!(msg.contains("unterminated string literal"), "{msg}");
    }

    #[test]
    fn test_error_with_line_info() {
        let msg = tokenize("ex:name \"ok\" .\nex:other % .")
            .unwrap_err()
            .to_string();
        assert!(msg.contains("line 2"), "{msg}");
    }
}
