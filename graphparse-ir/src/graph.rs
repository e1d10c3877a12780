//! In-memory statement store
//!
//! The `Graph` type uses `Vec<Quad>` to preserve duplicates and insertion
//! order (bag semantics). Call `dedupe()` explicitly if you want set semantics.

use crate::{Quad, Term};
use std::collections::BTreeMap;

/// A collection of RDF statements
///
/// # Example
///
/// ```
/// use graphparse_ir::{Graph, Term};
///
/// let mut graph = Graph::new();
///
/// graph.add_triple(
///     Term::iri("http://example.org/alice"),
///     Term::iri("http://xmlns.com/foaf/0.1/name"),
///     Term::string("Alice"),
/// );
///
/// graph.canonicalize();
/// assert_eq!(graph.len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
    quads: Vec<Quad>,
    /// Base IRI from parsing
    pub base: Option<String>,
    /// Prefix mappings from parsing (deterministic order via BTreeMap)
    pub prefixes: BTreeMap<String, String>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph with a base IRI
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: Some(base.into()),
            ..Default::default()
        }
    }

    /// Set the base IRI
    pub fn set_base(&mut self, base: impl Into<String>) {
        self.base = Some(base.into());
    }

    /// Add a prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    pub(crate) fn push(&mut self, quad: Quad) {
        self.quads.push(quad);
    }

    /// Add a default-graph statement by components
    pub fn add_triple(&mut self, s: Term, p: Term, o: Term) {
        self.push(Quad::triple(s, p, o));
    }

    /// Get the number of statements
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Iterate over statements in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Quad> {
        self.quads.iter()
    }

    /// Get a reference to the statements
    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    /// Statements whose subject is `subject`
    pub fn statements_about<'a>(&'a self, subject: &'a Term) -> impl Iterator<Item = &'a Quad> {
        self.quads.iter().filter(move |q| &q.s == subject)
    }

    /// Statements recorded under the context term `graph`
    pub fn statements_in<'a>(&'a self, graph: &'a Term) -> impl Iterator<Item = &'a Quad> {
        self.quads.iter().filter(move |q| q.g.as_ref() == Some(graph))
    }

    /// Remove duplicate statements (apply set semantics)
    pub fn dedupe(&mut self) {
        self.quads.sort();
        self.quads.dedup();
    }

    /// Sort and dedupe in one pass
    pub fn canonicalize(&mut self) {
        self.dedupe();
    }

    /// Serialize as N-Triples, one statement per line, context dropped
    pub fn to_ntriples(&self) -> String {
        let mut out = String::new();
        for quad in &self.quads {
            out.push_str(&quad.to_ntriple());
            out.push('\n');
        }
        out
    }

    /// Serialize as N-Quads, one statement per line
    pub fn to_nquads(&self) -> String {
        let mut out = String::new();
        for quad in &self.quads {
            out.push_str(&quad.to_nquad());
            out.push('\n');
        }
        out
    }
}

impl IntoIterator for Graph {
    type Item = Quad;
    type IntoIter = std::vec::IntoIter<Quad>;

    fn into_iter(self) -> Self::IntoIter {
        self.quads.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Quad;
    type IntoIter = std::slice::Iter<'a, Quad>;

    fn into_iter(self) -> Self::IntoIter {
        self.quads.iter()
    }
}

impl FromIterator<Quad> for Graph {
    fn from_iter<T: IntoIterator<Item = Quad>>(iter: T) -> Self {
        Graph {
            quads: iter.into_iter().collect(),
            base: None,
            prefixes: BTreeMap::new(),
        }
    }
}

impl Extend<Quad> for Graph {
    fn extend<T: IntoIterator<Item = Quad>>(&mut self, iter: T) {
        self.quads.extend(iter);
    }
}
