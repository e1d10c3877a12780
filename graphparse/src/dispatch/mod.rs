//! Selecting and driving the backend for a format.
//!
//! Synchronous backends write into the store before [`Dispatcher::dispatch`]
//! returns. Pipelined backends (JSON-LD, N-Quads) return a pending future
//! that buffers the statement stream and writes it only once the stream
//! has ended without a fault.

mod backends;

pub use backends::{
    AttributeWalker, Backends, JsonLdToNQuads, JsonLdTransform, NQuadsStreamer, PatchParser,
    QuadStreamer, RdfXmlParser, RdfXmlReader, RdfaReader, StreamEvent, TripleLoader, TurtleLoader,
    UpdateReader,
};

use futures::future::BoxFuture;
use futures::StreamExt;
use graphparse_ir::{iri, Quad, QuadStore, StoreSink, Term};
use graphparse_turtle::Patch;
use graphparse_vocab::patch;
use graphparse_xml::{XmlDocument, XmlMode};
use serde_json::Value as JsonValue;
use tracing::{debug, instrument};

use crate::completion::Stage;
use crate::content_type::Format;
use crate::error::{ParseError, Result};
use crate::reconstruct;

/// Outcome of starting a parse
pub enum Dispatch<'a> {
    /// The backend already ran
    Ready(Result<()>),
    /// The backend is still running
    Pending(BoxFuture<'a, Result<()>>),
}

impl Dispatch<'_> {
    /// Wait for the outcome
    pub async fn settle(self) -> Result<()> {
        match self {
            Dispatch::Ready(outcome) => outcome,
            Dispatch::Pending(future) => future.await,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Dispatch::Ready(_) => Stage::Synchronous,
            Dispatch::Pending(_) => Stage::Pipelined,
        }
    }
}

impl std::fmt::Debug for Dispatch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dispatch::Ready(outcome) => f.debug_tuple("Ready").field(outcome).finish(),
            Dispatch::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// Runs exactly one backend per call
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    backends: Backends,
    record_provenance: bool,
}

impl Dispatcher {
    pub fn new(backends: Backends, record_provenance: bool) -> Self {
        Self {
            backends,
            record_provenance,
        }
    }

    /// Select the backend for `format` and start it.
    #[instrument(level = "debug", skip_all, fields(base = %base, format = ?format))]
    pub fn dispatch<'a, S: QuadStore + Send>(
        &'a self,
        content: &'a str,
        store: &'a mut S,
        base: &'a str,
        format: &Format,
    ) -> Dispatch<'a> {
        match format {
            Format::Unsupported(key) => {
                Dispatch::Ready(Err(ParseError::UnsupportedFormat(key.clone())))
            }
            Format::JsonLd => {
                let document: JsonValue = match serde_json::from_str(content) {
                    Ok(document) => document,
                    Err(e) => return Dispatch::Ready(Err(e.into())),
                };
                debug!("decoded JSON-LD document");
                Dispatch::Pending(Box::pin(async move {
                    let nquads = self
                        .backends
                        .jsonld
                        .to_nquads(&document, base)
                        .await
                        .map_err(ParseError::Transform)?;
                    self.buffer_stream(&nquads, store).await
                }))
            }
            Format::NQuads => Dispatch::Pending(Box::pin(self.buffer_stream(content, store))),
            synchronous => Dispatch::Ready(self.run_synchronous(content, store, base, synchronous)),
        }
    }

    fn run_synchronous<S: QuadStore>(
        &self,
        content: &str,
        store: &mut S,
        base: &str,
        format: &Format,
    ) -> Result<()> {
        let why = (self.record_provenance && !base.is_empty()).then(|| Term::iri(base));

        if *format == Format::SparqlUpdate {
            let patch = self.backends.patch.parse_patch(content, base)?;
            apply_patch(store, base, why, patch);
            return Ok(());
        }

        let mut sink = StoreSink::new(store).with_context(why);
        match format {
            Format::Turtle => self.backends.triples.load(content, base, &mut sink)?,
            Format::RdfXml => {
                let doc = XmlDocument::parse(content, XmlMode::Strict)?;
                self.backends.rdfxml.parse(&doc, base, &mut sink)?;
            }
            Format::Rdfa { lenient } => {
                let mode = if *lenient {
                    XmlMode::Lenient
                } else {
                    XmlMode::Strict
                };
                let doc = XmlDocument::parse(content, mode)?;
                self.backends.rdfa.walk(&doc, base, &mut sink)?;
            }
            other => return Err(ParseError::UnsupportedFormat(format!("{other:?}"))),
        }
        debug!(
            written = sink.written(),
            prefixes = sink.prefixes().len(),
            declared_base = sink.base(),
            "synchronous parse complete"
        );
        Ok(())
    }

    /// Collect the stream, then write it in arrival order
    async fn buffer_stream<S: QuadStore + Send>(&self, text: &str, store: &mut S) -> Result<()> {
        let mut events = self.backends.nquads.stream(text);
        let mut buffer = Vec::new();
        while let Some(event) = events.next().await {
            match event {
                StreamEvent::Statement(quad) => buffer.push(quad),
                StreamEvent::Fault(fault) => {
                    debug!(discarded = buffer.len(), "statement stream failed");
                    return Err(ParseError::Syntax(fault));
                }
                StreamEvent::End { prefixes } => {
                    debug!(prefixes = prefixes.len(), "statement stream ended");
                    break;
                }
            }
        }
        let written = reconstruct::write_all(store, &buffer);
        debug!(buffered = buffer.len(), written, "flushed statement buffer");
        Ok(())
    }
}

/// Record a patch as a query node linked to one sub-graph per statement set.
///
/// `<base#query>` gets a `patch:insert`, `patch:delete` or `patch:where`
/// edge to a fresh blank node for each non-empty set, and that set's
/// statements are written with the blank node as their context.
fn apply_patch<S: QuadStore + ?Sized>(store: &mut S, base: &str, why: Option<Term>, patch: Patch) {
    let query = Term::iri(format!("{}#query", iri::strip_fragment(base)));
    let sets = [
        (patch::INSERT, patch.insert),
        (patch::DELETE, patch.delete),
        (patch::WHERE, patch.where_),
    ];
    for (predicate, graph) in sets {
        if graph.is_empty() {
            continue;
        }
        let formula = Term::fresh_blank();
        store.add(Quad::new(
            query.clone(),
            Term::iri(predicate),
            formula.clone(),
            why.clone(),
        ));
        for quad in graph {
            store.add(quad.with_graph(Some(formula.clone())));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphparse_ir::{Datatype, Graph};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_apply_patch_links_sub_graphs() {
        let patch = graphparse_turtle::parse_update(
            "DELETE DATA { <#a> <#p> 1 } ; INSERT DATA { <#a> <#p> 2 }",
            "https://example.com/doc",
        )
        .unwrap();

        let mut graph = Graph::new();
        apply_patch(&mut graph, "https://example.com/doc", None, patch);

        let query = Term::iri("https://example.com/doc#query");
        let edges: Vec<&Quad> = graph.statements_about(&query).collect();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].p, Term::iri(patch::INSERT));
        assert_eq!(edges[1].p, Term::iri(patch::DELETE));

        let inserted: Vec<&Quad> = graph.statements_in(&edges[0].o).collect();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].o, Term::typed("2", Datatype::xsd_integer()));
    }

    #[test]
    fn test_empty_patch_writes_nothing() {
        let mut graph = Graph::new();
        apply_patch(&mut graph, "https://example.com/", None, Patch::default());
        assert!(graph.is_empty());
    }

    #[test]
    fn test_dispatch_stage() {
        let dispatcher = Dispatcher::default();
        let mut graph = Graph::new();

        let ready = dispatcher.dispatch("not json", &mut graph, "", &Format::JsonLd);
        assert_eq!(ready.stage(), Stage::Synchronous);
        assert!(matches!(ready, Dispatch::Ready(Err(ParseError::Decode(_)))));
        drop(ready);

        let pending = dispatcher.dispatch("", &mut graph, "", &Format::NQuads);
        assert_eq!(pending.stage(), Stage::Pipelined);
    }
}
