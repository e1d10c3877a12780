//! Turning lexical stream terms back into terms.
//!
//! Pipelined backends hand over statements in lexical notation: `<iri>`,
//! `_:label`, `"value"`, `"value"@lang` and `"value"^^<datatype>`.

use graphparse_ir::{BlankScope, Quad, QuadStore, Term};
use graphparse_turtle::LexicalQuad;
use tracing::{trace, warn};

use crate::error::TermError;

/// Rebuild a term from its lexical notation.
///
/// Literal is tried first, then IRI, then blank node. The literal value is
/// everything between the first and the last `"`, so embedded quotes
/// survive.
///
/// ```
/// use graphparse::reconstruct::reconstruct_term;
/// use graphparse_ir::Term;
///
/// assert_eq!(reconstruct_term("\"chat\"@fr").unwrap(), Term::lang_string("chat", "fr"));
/// assert_eq!(reconstruct_term("_:b0").unwrap(), Term::blank("b0"));
/// ```
pub fn reconstruct_term(lexical: &str) -> Result<Term, TermError> {
    let unrecognized = || TermError::Unrecognized(lexical.to_string());

    if let Some(rest) = lexical.strip_prefix('"') {
        let end = rest.rfind('"').ok_or_else(unrecognized)?;
        let value = &rest[..end];
        let suffix = &rest[end + 1..];
        if suffix.is_empty() {
            return Ok(Term::string(value));
        }
        if let Some(lang) = suffix.strip_prefix('@').filter(|l| !l.is_empty()) {
            return Ok(Term::literal(value, Some(lang), None));
        }
        if let Some(datatype) = suffix
            .strip_prefix("^^<")
            .and_then(|s| s.strip_suffix('>'))
            .filter(|d| !d.is_empty())
        {
            return Ok(Term::literal(value, None, Some(datatype)));
        }
        return Err(unrecognized());
    }

    if let Some(iri) = lexical
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .filter(|i| !i.is_empty())
    {
        return Ok(Term::iri(iri));
    }

    if let Some(label) = lexical.strip_prefix("_:").filter(|l| !l.is_empty()) {
        return Ok(Term::blank(label));
    }

    Err(unrecognized())
}

/// Rebuild a statement, checking what each position may hold
pub fn reconstruct_quad(quad: &LexicalQuad) -> Result<Quad, TermError> {
    let subject = reconstruct_term(&quad.subject)?;
    if subject.is_literal() {
        return Err(misplaced("subject", &quad.subject));
    }
    let predicate = reconstruct_term(&quad.predicate)?;
    if !predicate.is_iri() {
        return Err(misplaced("predicate", &quad.predicate));
    }
    let object = reconstruct_term(&quad.object)?;
    let graph = match &quad.graph {
        Some(lexical) => {
            let graph = reconstruct_term(lexical)?;
            if graph.is_literal() {
                return Err(misplaced("graph", lexical));
            }
            Some(graph)
        }
        None => None,
    };
    Ok(Quad::new(subject, predicate, object, graph))
}

fn misplaced(position: &'static str, term: &str) -> TermError {
    TermError::Position {
        position,
        term: term.to_string(),
    }
}

/// Write buffered statements into `store` in order.
///
/// The statements are one document: its blank node labels get nodes of
/// their own. A statement with a position that does not reconstruct is
/// skipped with a warning. Returns the number written.
pub fn write_all<S: QuadStore + ?Sized>(store: &mut S, quads: &[LexicalQuad]) -> usize {
    let mut blanks = BlankScope::new();
    let mut written = 0;
    for lexical in quads {
        match reconstruct_quad(lexical) {
            Ok(quad) => {
                let quad = blanks.scope_quad(quad);
                trace!(%quad, "flushing statement");
                store.add(quad);
                written += 1;
            }
            Err(error) => warn!(%error, statement = %lexical, "skipping statement"),
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphparse_ir::{Datatype, Graph};
    use graphparse_vocab::xsd;
    use pretty_assertions::assert_eq;

    fn lexical(s: &str, p: &str, o: &str, g: Option<&str>) -> LexicalQuad {
        LexicalQuad {
            subject: s.to_string(),
            predicate: p.to_string(),
            object: o.to_string(),
            graph: g.map(str::to_string),
        }
    }

    #[test]
    fn test_literals() {
        assert_eq!(reconstruct_term("\"plain\"").unwrap(), Term::string("plain"));
        assert_eq!(
            reconstruct_term("\"5\"^^<http://www.w3.org/2001/XMLSchema#integer>").unwrap(),
            Term::typed("5", Datatype::from_iri(xsd::INTEGER))
        );
        assert_eq!(
            reconstruct_term("\"say \"hi\"\"@en-GB").unwrap(),
            Term::lang_string("say \"hi\"", "en-GB")
        );
        assert_eq!(reconstruct_term("\"\"").unwrap(), Term::string(""));
    }

    #[test]
    fn test_literal_checked_before_iri() {
        let term = reconstruct_term("\"<http://example.org/>\"").unwrap();
        assert!(term.is_literal());
    }

    #[test]
    fn test_iri_and_blank() {
        assert_eq!(
            reconstruct_term("<http://example.org/a>").unwrap(),
            Term::iri("http://example.org/a")
        );
        assert_eq!(reconstruct_term("_:b12").unwrap(), Term::blank("b12"));
    }

    #[test]
    fn test_unrecognized() {
        for bad in ["http://example.org/a", "<>", "_:", "\"open", "\"x\"@", "\"x\"^^dt", ""] {
            assert_eq!(
                reconstruct_term(bad),
                Err(TermError::Unrecognized(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_position_rules() {
        let quad = lexical("\"lit\"", "<http://p>", "<http://o>", None);
        assert!(matches!(
            reconstruct_quad(&quad),
            Err(TermError::Position { position: "subject", .. })
        ));

        let quad = lexical("<http://s>", "_:p", "<http://o>", None);
        assert!(matches!(
            reconstruct_quad(&quad),
            Err(TermError::Position { position: "predicate", .. })
        ));

        let quad = lexical("_:s", "<http://p>", "\"o\"", Some("<http://g>"));
        let quad = reconstruct_quad(&quad).unwrap();
        assert_eq!(quad.g, Some(Term::iri("http://g")));
    }

    #[test]
    fn test_write_all_skips_bad_statements_in_order() {
        let quads = vec![
            lexical("<http://s>", "<http://p>", "\"1\"", None),
            lexical("<http://s>", "<http://p>", "bogus", None),
            lexical("<http://s>", "<http://p>", "\"3\"", None),
        ];
        let mut graph = Graph::new();
        assert_eq!(write_all(&mut graph, &quads), 2);
        assert_eq!(
            graph.to_ntriples(),
            "<http://s> <http://p> \"1\" .\n<http://s> <http://p> \"3\" .\n"
        );
    }

    #[test]
    fn test_write_all_scopes_blank_labels_per_call() {
        let quads = vec![
            lexical("_:x", "<http://p>", "_:y", None),
            lexical("_:y", "<http://p>", "_:x", None),
        ];
        let mut graph = Graph::new();
        write_all(&mut graph, &quads);
        write_all(&mut graph, &quads);

        let stored = graph.quads();
        assert_eq!(stored[0].s, stored[1].o);
        assert_eq!(stored[0].o, stored[1].s);
        assert_ne!(stored[0].s, Term::blank("x"));
        assert_ne!(stored[2].s, stored[0].s);
        assert_ne!(stored[2].s, stored[0].o);
    }
}
