//! Format-agnostic RDF statement representation
//!
//! This crate provides the canonical types shared by every graphparse
//! backend: terms, quads, the [`QuadStore`] write interface, the in-memory
//! [`Graph`] store, and the [`GraphSink`] event interface parsers emit into.
//!
//! # Key Design Principles
//!
//! 1. **Expanded IRIs only** - All IRIs are stored in expanded form. Relative
//!    references are resolved with [`iri::resolve`] before a term is built.
//!
//! 2. **Explicit datatypes** - Literals always have an explicit datatype, never
//!    optional. Plain strings use `xsd:string`, language-tagged strings use
//!    `rdf:langString`.
//!
//! 3. **Bag semantics by default** - `Graph` keeps statements in insertion
//!    order and preserves duplicates. Call `dedupe()` explicitly for set
//!    semantics.
//!
//! # Example
//!
//! ```
//! use graphparse_ir::{Graph, QuadStore, Quad, Term};
//!
//! let mut graph = Graph::new();
//!
//! graph.add(Quad::triple(
//!     Term::iri("http://example.org/alice"),
//!     Term::iri("http://xmlns.com/foaf/0.1/name"),
//!     Term::string("Alice"),
//! ));
//!
//! assert_eq!(
//!     graph.to_ntriples(),
//!     "<http://example.org/alice> <http://xmlns.com/foaf/0.1/name> \"Alice\" .\n"
//! );
//! ```

pub mod datatype;
mod graph;
pub mod iri;
mod quad;
mod sink;
mod store;
mod term;

pub use datatype::Datatype;
pub use graph::Graph;
pub use iri::IriError;
pub use quad::Quad;
pub use sink::{BlankScope, GraphCollectorSink, GraphSink, StoreSink, TermId};
pub use store::QuadStore;
pub use term::{escape_literal, BlankId, LiteralValue, Term};
