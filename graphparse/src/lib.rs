//! Parse RDF documents of any handled content type into a statement store.
//!
//! The content type selects a backend: Turtle and N3, RDF/XML, RDFa in
//! XHTML or HTML, and SPARQL Update patches run synchronously and write
//! straight into the store; JSON-LD and N-Quads go through a buffered
//! statement stream that is written only once it ends cleanly. Either way
//! the outcome is reported once, to the completion handler if one is given.
//!
//! # Example
//!
//! ```
//! use graphparse::parse;
//! use graphparse_ir::{Graph, Term};
//!
//! # futures::executor::block_on(async {
//! let mut store = Graph::new();
//! parse(
//!     "<#me> <http://xmlns.com/foaf/0.1/name> \"Alice\" .",
//!     &mut store,
//!     "https://alice.example/profile",
//!     Some("text/turtle;charset=UTF-8"),
//!     None,
//! )
//! .await
//! .unwrap();
//!
//! let statement = &store.quads()[0];
//! assert_eq!(statement.s, Term::iri("https://alice.example/profile#me"));
//! // the document is recorded as the statement's context
//! assert_eq!(statement.g, Some(Term::iri("https://alice.example/profile")));
//! # });
//! ```

pub mod completion;
pub mod config;
pub mod content_type;
pub mod dispatch;
pub mod error;
pub mod reconstruct;

pub use completion::{Completion, CompletionBridge, Stage};
pub use config::ParserConfig;
pub use content_type::{handled_content_types, is_handled, Format};
pub use dispatch::{Backends, Dispatch, Dispatcher, StreamEvent};
pub use error::{ParseError, Result, TermError};
pub use reconstruct::{reconstruct_quad, reconstruct_term};

use graphparse_ir::QuadStore;
use tracing::debug;

/// Parses documents with a fixed configuration and set of backends
#[derive(Clone, Debug)]
pub struct Parser {
    config: ParserConfig,
    dispatcher: Dispatcher,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl Parser {
    pub fn new(config: ParserConfig) -> Self {
        Self::with_backends(config, Backends::default())
    }

    pub fn with_backends(config: ParserConfig, backends: Backends) -> Self {
        let dispatcher = Dispatcher::new(backends, config.record_provenance);
        Self { config, dispatcher }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse `content` into `store`.
    ///
    /// `base` is the document IRI relative references resolve against.
    /// `content_type` defaults to the configured type; parameters after `;`
    /// are ignored. When `on_complete` is given it is called exactly once
    /// and this returns `Ok(())`; otherwise a fault raised before any
    /// asynchronous work began is returned with the base and content type
    /// attached.
    pub async fn parse<'a, S: QuadStore + Send>(
        &self,
        content: &str,
        store: &mut S,
        base: &str,
        content_type: Option<&str>,
        on_complete: Option<Completion<'a, S>>,
    ) -> Result<()> {
        let key = content_type::resolve_or(content_type, &self.config.default_content_type);
        let format = Format::from_content_type(&key);
        debug!(content_type = %key, ?format, base, "parsing document");

        let bridge = CompletionBridge::new(on_complete, base, &key);
        let dispatch = self.dispatcher.dispatch(content, store, base, &format);
        let stage = dispatch.stage();
        let outcome = dispatch.settle().await;
        bridge.resolve(outcome, stage, store)
    }
}

/// Parse `content` into `store` with the default configuration.
///
/// See [`Parser::parse`].
pub async fn parse<'a, S: QuadStore + Send>(
    content: &str,
    store: &mut S,
    base: &str,
    content_type: Option<&str>,
    on_complete: Option<Completion<'a, S>>,
) -> Result<()> {
    Parser::default()
        .parse(content, store, base, content_type, on_complete)
        .await
}
