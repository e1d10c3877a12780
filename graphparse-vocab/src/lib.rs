//! RDF vocabulary constants for graphparse
//!
//! Constants are organized by vocabulary:
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `rdfs` - RDFS vocabulary (http://www.w3.org/2000/01/rdf-schema#)
//! - `xsd` - XSD vocabulary (http://www.w3.org/2001/XMLSchema#)
//! - `xml` - the reserved `xml:` namespace
//! - `patch` - the Solid patch vocabulary used to record SPARQL Update patches
//! - `media` - content type keys understood by the parser

/// RDF vocabulary constants
pub mod rdf {
    /// RDF namespace IRI
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// rdf:langString IRI
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

    /// rdf:JSON IRI
    pub const JSON: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#JSON";

    /// rdf:XMLLiteral IRI
    pub const XML_LITERAL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#XMLLiteral";

    /// rdf:HTML IRI
    pub const HTML: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#HTML";

    /// rdf:first IRI (RDF list head)
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";

    /// rdf:rest IRI (RDF list tail)
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";

    /// rdf:nil IRI (RDF list terminator)
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";

    /// rdf:subject IRI (reification)
    pub const SUBJECT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#subject";

    /// rdf:predicate IRI (reification)
    pub const PREDICATE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#predicate";

    /// rdf:object IRI (reification)
    pub const OBJECT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#object";

    /// rdf:Statement IRI (reification)
    pub const STATEMENT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Statement";

    /// Build the container membership property `rdf:_n`
    pub fn member(n: usize) -> String {
        format!("{NS}_{n}")
    }
}

/// RDFS vocabulary constants
pub mod rdfs {
    /// RDFS namespace IRI
    pub const NS: &str = "http://www.w3.org/2000/01/rdf-schema#";

    /// rdfs:label IRI
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

    /// rdfs:comment IRI
    pub const COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";
}

/// XSD vocabulary constants
pub mod xsd {
    /// XSD namespace IRI
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";

    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:decimal IRI
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";

    /// xsd:double IRI
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// xsd:dateTime IRI
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
}

/// The reserved XML namespace (`xml:lang`, `xml:base`)
pub mod xml {
    /// XML namespace IRI
    pub const NS: &str = "http://www.w3.org/XML/1998/namespace";
}

/// Solid patch vocabulary (`http://www.w3.org/ns/pim/patch#`)
///
/// SPARQL Update documents are stored as a query node linked to the
/// graphs they insert, delete, or match.
pub mod patch {
    /// Patch namespace IRI
    pub const NS: &str = "http://www.w3.org/ns/pim/patch#";

    /// patch:insert IRI
    pub const INSERT: &str = "http://www.w3.org/ns/pim/patch#insert";

    /// patch:delete IRI
    pub const DELETE: &str = "http://www.w3.org/ns/pim/patch#delete";

    /// patch:where IRI
    pub const WHERE: &str = "http://www.w3.org/ns/pim/patch#where";
}

/// Content type keys
pub mod media {
    pub const TURTLE: &str = "text/turtle";
    pub const N3: &str = "text/n3";
    pub const RDF_XML: &str = "application/rdf+xml";
    pub const XHTML: &str = "application/xhtml+xml";
    pub const HTML: &str = "text/html";
    pub const SPARQL_UPDATE: &str = "application/sparql-update";
    pub const JSON_LD: &str = "application/ld+json";
    pub const NQUADS: &str = "application/nquads";
    pub const N_QUADS: &str = "application/n-quads";
}
