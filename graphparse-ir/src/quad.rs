//! RDF statement with an optional context (graph) term

use crate::Term;
use serde::{Deserialize, Serialize};

/// A statement: subject, predicate, object, and optional context
///
/// The context records why the statement holds: a named graph from an
/// N-Quads line, the document a statement was parsed from, or the blank
/// node standing for a SPARQL Update patch set.
///
/// Ordering is SPOG lexicographic (fields compared in declaration order).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quad {
    pub s: Term,
    pub p: Term,
    pub o: Term,
    pub g: Option<Term>,
}

impl Quad {
    /// Create a statement with a context term
    pub fn new(s: Term, p: Term, o: Term, g: Option<Term>) -> Self {
        Self { s, p, o, g }
    }

    /// Create a statement in the default graph
    pub fn triple(s: Term, p: Term, o: Term) -> Self {
        Self { s, p, o, g: None }
    }

    /// Replace the context term
    pub fn with_graph(mut self, g: Option<Term>) -> Self {
        self.g = g;
        self
    }

    /// N-Triples line (context dropped), without trailing newline
    pub fn to_ntriple(&self) -> String {
        format!("{} {} {} .", self.s, self.p, self.o)
    }

    /// N-Quads line, without trailing newline
    pub fn to_nquad(&self) -> String {
        match &self.g {
            Some(g) => format!("{} {} {} {} .", self.s, self.p, self.o, g),
            None => self.to_ntriple(),
        }
    }
}

impl std::fmt::Display for Quad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_nquad())
    }
}
