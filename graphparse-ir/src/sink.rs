//! GraphSink trait for event-driven statement construction
//!
//! Parsers call methods like `term_iri()` and `emit_triple()` on a sink
//! without knowing where statements end up. The sink can be:
//! - `GraphCollectorSink`: collects statements into an owned `Graph`
//! - `StoreSink`: writes statements straight into a borrowed `QuadStore`

use crate::{Datatype, Graph, LiteralValue, Quad, QuadStore, Term};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

/// Fresh blank node labels are unique for the life of the process, so
/// documents parsed into one store never share a node.
static FRESH_BLANK: AtomicU64 = AtomicU64::new(0);

pub(crate) fn fresh_blank_label() -> String {
    format!("n{}", FRESH_BLANK.fetch_add(1, Ordering::Relaxed))
}

/// Blank node labels of one document.
///
/// A document label names the same node everywhere in that document and
/// nowhere else: the first use of each label allocates a fresh node.
#[derive(Debug, Default)]
pub struct BlankScope {
    labels: HashMap<String, Term>,
}

impl BlankScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node for the document label `label`
    pub fn label(&mut self, label: &str) -> Term {
        self.labels
            .entry(label.to_string())
            .or_insert_with(Term::fresh_blank)
            .clone()
    }

    /// `term` with a blank node replaced by this document's node
    pub fn scope(&mut self, term: Term) -> Term {
        match term {
            Term::BlankNode(id) => self.label(id.as_str()),
            other => other,
        }
    }

    pub fn scope_quad(&mut self, quad: Quad) -> Quad {
        Quad::new(
            self.scope(quad.s),
            self.scope(quad.p),
            self.scope(quad.o),
            quad.g.map(|g| self.scope(g)),
        )
    }
}

/// Opaque term identifier for efficient statement emission
///
/// `TermId` is only valid within a single sink session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TermId(pub(crate) u32);

/// Event-driven interface for RDF statement construction
///
/// # Example
///
/// ```
/// use graphparse_ir::{GraphSink, GraphCollectorSink, Datatype};
///
/// let mut sink = GraphCollectorSink::new();
///
/// sink.on_prefix("foaf", "http://xmlns.com/foaf/0.1/");
///
/// let alice = sink.term_iri("http://example.org/alice");
/// let name = sink.term_iri("http://xmlns.com/foaf/0.1/name");
/// let alice_name = sink.term_literal("Alice", Datatype::xsd_string(), None);
///
/// sink.emit_triple(alice, name, alice_name);
///
/// let graph = sink.finish();
/// assert_eq!(graph.len(), 1);
/// ```
pub trait GraphSink {
    /// A document declared its base (`@base`, `xml:base`, `<base href>`)
    fn on_base(&mut self, base_iri: &str);

    /// A document bound `prefix` (`@prefix`, `xmlns:p`, RDFa `prefix`)
    fn on_prefix(&mut self, prefix: &str, namespace_iri: &str);

    /// `iri` must already be absolute
    fn term_iri(&mut self, iri: &str) -> TermId;

    /// The same label yields the same node within one sink; `None` is
    /// always a new node.
    fn term_blank(&mut self, label: Option<&str>) -> TermId;

    fn term_literal(&mut self, value: &str, datatype: Datatype, language: Option<&str>) -> TermId;

    /// Literal from a JSON-LD native value
    fn term_literal_value(&mut self, value: LiteralValue, datatype: Datatype) -> TermId;

    /// Emit a statement with an optional context term
    fn emit_quad(&mut self, subject: TermId, predicate: TermId, object: TermId, graph: Option<TermId>);

    /// Emit a statement in the sink's default context
    fn emit_triple(&mut self, subject: TermId, predicate: TermId, object: TermId) {
        self.emit_quad(subject, predicate, object, None);
    }
}

impl<S: GraphSink + ?Sized> GraphSink for &mut S {
    fn on_base(&mut self, base_iri: &str) {
        (**self).on_base(base_iri);
    }

    fn on_prefix(&mut self, prefix: &str, namespace_iri: &str) {
        (**self).on_prefix(prefix, namespace_iri);
    }

    fn term_iri(&mut self, iri: &str) -> TermId {
        (**self).term_iri(iri)
    }

    fn term_blank(&mut self, label: Option<&str>) -> TermId {
        (**self).term_blank(label)
    }

    fn term_literal(&mut self, value: &str, datatype: Datatype, language: Option<&str>) -> TermId {
        (**self).term_literal(value, datatype, language)
    }

    fn term_literal_value(&mut self, value: LiteralValue, datatype: Datatype) -> TermId {
        (**self).term_literal_value(value, datatype)
    }

    fn emit_quad(&mut self, subject: TermId, predicate: TermId, object: TermId, graph: Option<TermId>) {
        (**self).emit_quad(subject, predicate, object, graph);
    }
}

#[derive(Debug, Default)]
struct TermTable {
    terms: Vec<Term>,
    blank_labels: HashMap<String, TermId>,
}

impl TermTable {
    fn get(&self, id: TermId) -> &Term {
        &self.terms[id.0 as usize]
    }

    fn add(&mut self, term: Term) -> TermId {
        let id = TermId(self.terms.len() as u32);
        self.terms.push(term);
        id
    }

    fn blank(&mut self, label: Option<&str>) -> TermId {
        let Some(label) = label else {
            return self.add(Term::fresh_blank());
        };
        if let Some(&id) = self.blank_labels.get(label) {
            return id;
        }
        let id = self.add(Term::fresh_blank());
        self.blank_labels.insert(label.to_string(), id);
        id
    }

    fn literal(&mut self, value: &str, datatype: Datatype, language: Option<&str>) -> TermId {
        let term = match language {
            Some(lang) => Term::lang_string(value, lang),
            None if datatype.is_xsd_string() => Term::string(value),
            None => Term::typed(value, datatype),
        };
        self.add(term)
    }

    fn literal_value(&mut self, value: LiteralValue, datatype: Datatype) -> TermId {
        self.add(Term::Literal {
            value,
            datatype,
            language: None,
        })
    }

    fn quad(&self, s: TermId, p: TermId, o: TermId, g: Option<TermId>) -> Quad {
        Quad::new(
            self.get(s).clone(),
            self.get(p).clone(),
            self.get(o).clone(),
            g.map(|g| self.get(g).clone()),
        )
    }
}

/// A sink that collects statements into an owned `Graph`
#[derive(Debug, Default)]
pub struct GraphCollectorSink {
    graph: Graph,
    terms: TermTable,
}

impl GraphCollectorSink {
    /// Create a new collector sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink with a pre-configured base IRI
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            graph: Graph::with_base(base),
            terms: TermTable::default(),
        }
    }

    /// Finish building and return the graph
    pub fn finish(self) -> Graph {
        self.graph
    }

    /// Get the current graph (non-consuming)
    pub fn graph(&self) -> &Graph {
        &self.graph
    }
}

impl GraphSink for GraphCollectorSink {
    fn on_base(&mut self, base_iri: &str) {
        self.graph.set_base(base_iri);
    }

    fn on_prefix(&mut self, prefix: &str, namespace_iri: &str) {
        self.graph.add_prefix(prefix, namespace_iri);
    }

    fn term_iri(&mut self, iri: &str) -> TermId {
        self.terms.add(Term::iri(iri))
    }

    fn term_blank(&mut self, label: Option<&str>) -> TermId {
        self.terms.blank(label)
    }

    fn term_literal(&mut self, value: &str, datatype: Datatype, language: Option<&str>) -> TermId {
        self.terms.literal(value, datatype, language)
    }

    fn term_literal_value(&mut self, value: LiteralValue, datatype: Datatype) -> TermId {
        self.terms.literal_value(value, datatype)
    }

    fn emit_quad(&mut self, subject: TermId, predicate: TermId, object: TermId, graph: Option<TermId>) {
        let quad = self.terms.quad(subject, predicate, object, graph);
        self.graph.add(quad);
    }
}

/// A sink that writes each statement into a borrowed store as it is emitted
///
/// Statements emitted without a context term get the sink's default
/// context, if one was set with [`StoreSink::with_context`].
pub struct StoreSink<'a, S: QuadStore + ?Sized> {
    store: &'a mut S,
    terms: TermTable,
    context: Option<Term>,
    base: Option<String>,
    prefixes: BTreeMap<String, String>,
    written: usize,
}

impl<'a, S: QuadStore + ?Sized> StoreSink<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self {
            store,
            terms: TermTable::default(),
            context: None,
            base: None,
            prefixes: BTreeMap::new(),
            written: 0,
        }
    }

    /// Record statements under `context` unless the parser names a graph
    pub fn with_context(mut self, context: Option<Term>) -> Self {
        self.context = context;
        self
    }

    /// Last base IRI the document declared
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Prefixes the document declared
    pub fn prefixes(&self) -> &BTreeMap<String, String> {
        &self.prefixes
    }

    /// Number of statements written so far
    pub fn written(&self) -> usize {
        self.written
    }
}

impl<S: QuadStore + ?Sized> GraphSink for StoreSink<'_, S> {
    fn on_base(&mut self, base_iri: &str) {
        self.base = Some(base_iri.to_string());
    }

    fn on_prefix(&mut self, prefix: &str, namespace_iri: &str) {
        self.prefixes
            .insert(prefix.to_string(), namespace_iri.to_string());
    }

    fn term_iri(&mut self, iri: &str) -> TermId {
        self.terms.add(Term::iri(iri))
    }

    fn term_blank(&mut self, label: Option<&str>) -> TermId {
        self.terms.blank(label)
    }

    fn term_literal(&mut self, value: &str, datatype: Datatype, language: Option<&str>) -> TermId {
        self.terms.literal(value, datatype, language)
    }

    fn term_literal_value(&mut self, value: LiteralValue, datatype: Datatype) -> TermId {
        self.terms.literal_value(value, datatype)
    }

    fn emit_quad(&mut self, subject: TermId, predicate: TermId, object: TermId, graph: Option<TermId>) {
        let mut quad = self.terms.quad(subject, predicate, object, graph);
        if quad.g.is_none() {
            quad.g = self.context.clone();
        }
        self.store.add(quad);
        self.written += 1;
    }
}
