//! Markup readers for graphparse: RDF/XML and RDFa in (X)HTML.
//!
//! Both readers work on an [`XmlDocument`] element tree and emit to a
//! `graphparse_ir::GraphSink`.
//!
//! # Example
//!
//! ```
//! use graphparse_ir::GraphCollectorSink;
//! use graphparse_xml::{parse_rdfxml, XmlDocument, XmlMode};
//!
//! let xml = r##"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
//!                       xmlns:foaf="http://xmlns.com/foaf/0.1/">
//!   <foaf:Person rdf:about="#me"><foaf:name>Alice</foaf:name></foaf:Person>
//! </rdf:RDF>"##;
//!
//! let doc = XmlDocument::parse(xml, XmlMode::Strict).unwrap();
//! let mut sink = GraphCollectorSink::new();
//! parse_rdfxml(&doc, Some("https://alice.example/card"), &mut sink).unwrap();
//! assert_eq!(sink.finish().len(), 2);
//! ```

pub mod document;
pub mod error;
pub mod rdfa;
pub mod rdfxml;

pub use document::{Element, Node, XmlDocument, XmlMode};
pub use error::{Result, XmlError};
pub use rdfa::parse_rdfa;
pub use rdfxml::parse_rdfxml;
