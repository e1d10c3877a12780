//! Parsing backends behind the dispatcher.
//!
//! Each backend is a trait object so callers and tests can substitute
//! their own. [`Backends::default`] wires up the workspace readers.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use graphparse_ir::GraphSink;
use graphparse_json_ld::JsonLdError;
use graphparse_turtle::{LexicalQuad, NQuadsReader, Patch, TurtleError};
use graphparse_xml::{XmlDocument, XmlError};
use serde_json::Value as JsonValue;

fn non_empty(base: &str) -> Option<&str> {
    Some(base).filter(|b| !b.is_empty())
}

/// Reads Turtle (and N3 with the Turtle grammar) into a sink
pub trait TripleLoader: Send + Sync {
    fn load(&self, text: &str, base: &str, sink: &mut dyn GraphSink) -> Result<(), TurtleError>;
}

/// Reads an RDF/XML element tree into a sink
pub trait RdfXmlParser: Send + Sync {
    fn parse(&self, doc: &XmlDocument, base: &str, sink: &mut dyn GraphSink) -> Result<(), XmlError>;
}

/// Finds RDFa statements in an (X)HTML element tree
pub trait AttributeWalker: Send + Sync {
    fn walk(&self, doc: &XmlDocument, base: &str, sink: &mut dyn GraphSink) -> Result<(), XmlError>;
}

/// Reads a SPARQL Update document into its statement sets
pub trait PatchParser: Send + Sync {
    fn parse_patch(&self, text: &str, base: &str) -> Result<Patch, TurtleError>;
}

/// Converts a decoded JSON-LD document to N-Quads text
#[async_trait]
pub trait JsonLdTransform: Send + Sync {
    async fn to_nquads(&self, document: &JsonValue, base: &str) -> Result<String, JsonLdError>;
}

/// One step of a statement stream
#[derive(Debug)]
pub enum StreamEvent {
    Statement(LexicalQuad),
    Fault(TurtleError),
    /// No more statements; carries the prefixes the text declared
    End { prefixes: BTreeMap<String, String> },
}

/// Streams N-Quads text as lexical statements
pub trait QuadStreamer: Send + Sync {
    fn stream<'a>(&self, text: &'a str) -> BoxStream<'a, StreamEvent>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TurtleLoader;

impl TripleLoader for TurtleLoader {
    fn load(&self, text: &str, base: &str, mut sink: &mut dyn GraphSink) -> Result<(), TurtleError> {
        match non_empty(base) {
            Some(base) => graphparse_turtle::parse_with_base(text, base, &mut sink),
            None => graphparse_turtle::parse(text, &mut sink),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RdfXmlReader;

impl RdfXmlParser for RdfXmlReader {
    fn parse(&self, doc: &XmlDocument, base: &str, mut sink: &mut dyn GraphSink) -> Result<(), XmlError> {
        graphparse_xml::parse_rdfxml(doc, non_empty(base), &mut sink)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RdfaReader;

impl AttributeWalker for RdfaReader {
    fn walk(&self, doc: &XmlDocument, base: &str, mut sink: &mut dyn GraphSink) -> Result<(), XmlError> {
        graphparse_xml::parse_rdfa(doc, non_empty(base), &mut sink)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct UpdateReader;

impl PatchParser for UpdateReader {
    fn parse_patch(&self, text: &str, base: &str) -> Result<Patch, TurtleError> {
        graphparse_turtle::parse_update(text, base)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct JsonLdToNQuads;

#[async_trait]
impl JsonLdTransform for JsonLdToNQuads {
    async fn to_nquads(&self, document: &JsonValue, base: &str) -> Result<String, JsonLdError> {
        graphparse_json_ld::to_nquads(document, non_empty(base))
    }
}

/// Streams lines of an N-Quads document; the stream stops after a fault
#[derive(Clone, Copy, Debug, Default)]
pub struct NQuadsStreamer;

impl QuadStreamer for NQuadsStreamer {
    fn stream<'a>(&self, text: &'a str) -> BoxStream<'a, StreamEvent> {
        let mut failed = false;
        let statements = NQuadsReader::new(text).map_while(move |line| {
            if failed {
                return None;
            }
            Some(match line {
                Ok(quad) => StreamEvent::Statement(quad),
                Err(fault) => {
                    failed = true;
                    StreamEvent::Fault(fault)
                }
            })
        });
        let end = std::iter::once(StreamEvent::End {
            prefixes: BTreeMap::new(),
        });
        stream::iter(statements.chain(end)).boxed()
    }
}

/// The backend for each format
#[derive(Clone)]
pub struct Backends {
    pub triples: Arc<dyn TripleLoader>,
    pub rdfxml: Arc<dyn RdfXmlParser>,
    pub rdfa: Arc<dyn AttributeWalker>,
    pub patch: Arc<dyn PatchParser>,
    pub jsonld: Arc<dyn JsonLdTransform>,
    pub nquads: Arc<dyn QuadStreamer>,
}

impl Default for Backends {
    fn default() -> Self {
        Self {
            triples: Arc::new(TurtleLoader),
            rdfxml: Arc::new(RdfXmlReader),
            rdfa: Arc::new(RdfaReader),
            patch: Arc::new(UpdateReader),
            jsonld: Arc::new(JsonLdToNQuads),
            nquads: Arc::new(NQuadsStreamer),
        }
    }
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends").finish_non_exhaustive()
    }
}

impl Backends {
    pub fn with_jsonld(mut self, transform: impl JsonLdTransform + 'static) -> Self {
        self.jsonld = Arc::new(transform);
        self
    }

    pub fn with_nquads(mut self, streamer: impl QuadStreamer + 'static) -> Self {
        self.nquads = Arc::new(streamer);
        self
    }

    pub fn with_triples(mut self, loader: impl TripleLoader + 'static) -> Self {
        self.triples = Arc::new(loader);
        self
    }
}
