//! RDF/XML reader over an element tree.
//!
//! Covers `rdf:RDF`, `rdf:Description` and typed node elements,
//! `rdf:about` / `rdf:ID` / `rdf:nodeID`, `rdf:resource`, `rdf:datatype`,
//! `xml:lang`, `xml:base`, property attributes, `rdf:li` and
//! `rdf:parseType` Resource, Literal and Collection. Reification through
//! `rdf:ID` on property elements is not performed.

use std::collections::HashMap;

use graphparse_ir::{iri, Datatype, GraphSink, TermId};
use graphparse_vocab::{rdf, xml};

use crate::document::{Element, XmlDocument};
use crate::error::{Result, XmlError};

/// RDF attributes that describe structure rather than statements
const SYNTAX_ATTRIBUTES: &[&str] = &["about", "ID", "nodeID", "resource", "datatype", "parseType"];

/// In-scope namespaces, base and language
#[derive(Clone, Debug, Default)]
struct Scope {
    namespaces: HashMap<String, String>,
    base: Option<String>,
    lang: Option<String>,
}

impl Scope {
    fn enter(&self, el: &Element) -> Result<Scope> {
        let mut scope = self.clone();
        for (key, value) in &el.attributes {
            if key == "xmlns" {
                scope.namespaces.insert(String::new(), value.clone());
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                scope.namespaces.insert(prefix.to_string(), value.clone());
            }
        }
        if let Some(base) = el.attr("xml:base") {
            scope.base = Some(iri::strip_fragment(&scope.resolve(base)?).to_string());
        }
        if let Some(lang) = el.attr("xml:lang") {
            scope.lang = Some(lang.to_string()).filter(|l| !l.is_empty());
        }
        Ok(scope)
    }

    /// Expand a qualified name to an IRI
    fn expand(&self, qname: &str) -> Result<String> {
        let (prefix, local) = qname.split_once(':').unwrap_or(("", qname));
        if prefix == "xml" {
            return Ok(format!("{}{}", xml::NS, local));
        }
        match self.namespaces.get(prefix) {
            Some(ns) => Ok(format!("{ns}{local}")),
            None if prefix.is_empty() => Err(XmlError::RdfXml(format!(
                "element or attribute '{qname}' has no namespace"
            ))),
            None => Err(XmlError::UndefinedPrefix(prefix.to_string())),
        }
    }

    fn resolve(&self, reference: &str) -> Result<String> {
        Ok(iri::resolve_opt(self.base.as_deref(), reference)?)
    }

    fn is_rdf(&self, qname: &str, local: &str) -> bool {
        self.expand(qname).is_ok_and(|iri| iri.strip_prefix(rdf::NS) == Some(local))
    }

    /// Value of the RDF attribute `local`, written qualified or bare
    fn rdf_attr<'e>(&self, el: &'e Element, local: &str) -> Option<&'e str> {
        el.attributes
            .iter()
            .find(|(k, _)| k == local || (k.ends_with(local) && self.is_rdf(k, local)))
            .map(|(_, v)| v.as_str())
    }

    /// Attributes that stand for statements: (property IRI, value)
    fn property_attributes<'e>(&self, el: &'e Element) -> Result<Vec<(String, &'e str)>> {
        let mut out = Vec::new();
        for (key, value) in &el.attributes {
            if key == "xmlns" || key.starts_with("xmlns:") || key.starts_with("xml:") {
                continue;
            }
            if !key.contains(':') {
                // bare names are only accepted for the RDF syntax attributes
                continue;
            }
            let property = self.expand(key)?;
            if let Some(local) = property.strip_prefix(rdf::NS) {
                if SYNTAX_ATTRIBUTES.contains(&local) {
                    continue;
                }
            }
            out.push((property, value.as_str()));
        }
        Ok(out)
    }
}

/// Read an RDF/XML document, emitting its statements to `sink`.
pub fn parse_rdfxml<S: GraphSink>(doc: &XmlDocument, base: Option<&str>, sink: &mut S) -> Result<()> {
    let scope = Scope {
        base: base.filter(|b| !b.is_empty()).map(|b| iri::strip_fragment(b).to_string()),
        ..Default::default()
    };
    let root = doc.root();
    let root_scope = scope.enter(root)?;

    let mut walker = Walker { sink };
    if root_scope.is_rdf(&root.name, "RDF") {
        for node in root.elements() {
            walker.node_element(node, &root_scope)?;
        }
    } else {
        walker.node_element(root, &scope)?;
    }
    Ok(())
}

struct Walker<'a, S> {
    sink: &'a mut S,
}

impl<S: GraphSink> Walker<'_, S> {
    fn node_element(&mut self, el: &Element, parent: &Scope) -> Result<TermId> {
        let scope = parent.enter(el)?;
        let subject = self.subject_of(el, &scope)?;

        if !scope.is_rdf(&el.name, "Description") {
            let class = scope.expand(&el.name)?;
            let rdf_type = self.sink.term_iri(rdf::TYPE);
            let class = self.sink.term_iri(&class);
            self.sink.emit_triple(subject, rdf_type, class);
        }

        self.property_attributes(el, subject, &scope)?;

        let mut li = 0;
        for property in el.elements() {
            self.property_element(property, subject, &scope, &mut li)?;
        }
        Ok(subject)
    }

    fn subject_of(&mut self, el: &Element, scope: &Scope) -> Result<TermId> {
        if let Some(about) = scope.rdf_attr(el, "about") {
            let iri = scope.resolve(about)?;
            return Ok(self.sink.term_iri(&iri));
        }
        if let Some(id) = scope.rdf_attr(el, "ID") {
            let iri = scope.resolve(&format!("#{id}"))?;
            return Ok(self.sink.term_iri(&iri));
        }
        if let Some(label) = scope.rdf_attr(el, "nodeID") {
            return Ok(self.sink.term_blank(Some(label)));
        }
        Ok(self.sink.term_blank(None))
    }

    /// `rdf:type` attributes name a class; all others give literals
    fn property_attributes(&mut self, el: &Element, subject: TermId, scope: &Scope) -> Result<()> {
        for (property, value) in scope.property_attributes(el)? {
            let predicate = self.sink.term_iri(&property);
            let object = if property == rdf::TYPE {
                let class = scope.resolve(value)?;
                self.sink.term_iri(&class)
            } else {
                self.plain_literal(value, scope)
            };
            self.sink.emit_triple(subject, predicate, object);
        }
        Ok(())
    }

    fn plain_literal(&mut self, value: &str, scope: &Scope) -> TermId {
        match &scope.lang {
            Some(lang) => self
                .sink
                .term_literal(value, Datatype::rdf_lang_string(), Some(lang)),
            None => self.sink.term_literal(value, Datatype::xsd_string(), None),
        }
    }

    fn property_element(
        &mut self,
        el: &Element,
        subject: TermId,
        parent: &Scope,
        li: &mut usize,
    ) -> Result<()> {
        let scope = parent.enter(el)?;
        let property = if scope.is_rdf(&el.name, "li") {
            *li += 1;
            rdf::member(*li)
        } else {
            scope.expand(&el.name)?
        };
        let predicate = self.sink.term_iri(&property);

        match scope.rdf_attr(el, "parseType") {
            Some("Resource") => {
                let object = self.sink.term_blank(None);
                self.sink.emit_triple(subject, predicate, object);
                let mut inner_li = 0;
                for child in el.elements() {
                    self.property_element(child, object, &scope, &mut inner_li)?;
                }
                return Ok(());
            }
            Some("Collection") => {
                let mut items = Vec::new();
                for child in el.elements() {
                    items.push(self.node_element(child, &scope)?);
                }
                let head = self.collection(&items);
                self.sink.emit_triple(subject, predicate, head);
                return Ok(());
            }
            Some(_) => {
                // "Literal" and unknown parse types keep the markup
                let object = self
                    .sink
                    .term_literal(&el.inner_xml(), Datatype::rdf_xml_literal(), None);
                self.sink.emit_triple(subject, predicate, object);
                return Ok(());
            }
            None => {}
        }

        let mut nodes = el.elements();
        if let Some(node) = nodes.next() {
            if nodes.next().is_some() {
                return Err(XmlError::RdfXml(format!(
                    "property element <{}> holds more than one node",
                    el.name
                )));
            }
            let object = self.node_element(node, &scope)?;
            self.sink.emit_triple(subject, predicate, object);
            return Ok(());
        }

        let resource = if let Some(reference) = scope.rdf_attr(el, "resource") {
            let iri = scope.resolve(reference)?;
            Some(self.sink.term_iri(&iri))
        } else {
            scope
                .rdf_attr(el, "nodeID")
                .map(|label| self.sink.term_blank(Some(label)))
        };

        let attributes = scope.property_attributes(el)?;
        if resource.is_some() || !attributes.is_empty() {
            // empty property element: the object carries the attributes
            let object = match resource {
                Some(object) => object,
                None => self.sink.term_blank(None),
            };
            self.sink.emit_triple(subject, predicate, object);
            self.property_attributes(el, object, &scope)?;
            return Ok(());
        }

        let text = el.text();
        let object = match scope.rdf_attr(el, "datatype") {
            Some(datatype) => {
                let datatype = scope.resolve(datatype)?;
                self.sink.term_literal(&text, Datatype::from_iri(&datatype), None)
            }
            None => self.plain_literal(&text, &scope),
        };
        self.sink.emit_triple(subject, predicate, object);
        Ok(())
    }

    fn collection(&mut self, items: &[TermId]) -> TermId {
        let nil = self.sink.term_iri(rdf::NIL);
        if items.is_empty() {
            return nil;
        }
        let first = self.sink.term_iri(rdf::FIRST);
        let rest = self.sink.term_iri(rdf::REST);
        let cells: Vec<TermId> = items.iter().map(|_| self.sink.term_blank(None)).collect();
        for (i, (cell, item)) in cells.iter().zip(items).enumerate() {
            self.sink.emit_triple(*cell, first, *item);
            let next = cells.get(i + 1).copied().unwrap_or(nil);
            self.sink.emit_triple(*cell, rest, next);
        }
        cells[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::XmlMode;
    use graphparse_ir::{Graph, GraphCollectorSink, Term};
    use pretty_assertions::assert_eq;

    fn read(xml: &str, base: &str) -> Result<Graph> {
        let doc = XmlDocument::parse(xml, XmlMode::Strict)?;
        let mut sink = GraphCollectorSink::new();
        parse_rdfxml(&doc, Some(base), &mut sink)?;
        Ok(sink.finish())
    }

    #[test]
    fn test_iri_object() {
        let graph = read(
            r#"<rdf:RDF
                xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                xmlns:ex="http://example.org/schema#">
              <rdf:Description rdf:about="http://example.org/a">
                <ex:p rdf:resource="http://example.org/b"/>
              </rdf:Description>
            </rdf:RDF>"#,
            "http://base/",
        )
        .unwrap();

        assert_eq!(
            graph.to_ntriples(),
            "<http://example.org/a> <http://example.org/schema#p> <http://example.org/b> .\n"
        );
    }

    #[test]
    fn test_typed_node_and_literals() {
        let graph = read(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                        xmlns:foaf="http://xmlns.com/foaf/0.1/" xml:lang="en">
              <foaf:Person rdf:ID="me" foaf:nick="al">
                <foaf:name>Alice</foaf:name>
                <foaf:age rdf:datatype="http://www.w3.org/2001/XMLSchema#integer">42</foaf:age>
              </foaf:Person>
            </rdf:RDF>"#,
            "http://example.org/card",
        )
        .unwrap();

        let lines: Vec<String> = graph.iter().map(|q| q.to_ntriple()).collect();
        assert_eq!(
            lines,
            vec![
                "<http://example.org/card#me> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://xmlns.com/foaf/0.1/Person> .",
                "<http://example.org/card#me> <http://xmlns.com/foaf/0.1/nick> \"al\"@en .",
                "<http://example.org/card#me> <http://xmlns.com/foaf/0.1/name> \"Alice\"@en .",
                "<http://example.org/card#me> <http://xmlns.com/foaf/0.1/age> \"42\"^^<http://www.w3.org/2001/XMLSchema#integer> .",
            ]
        );
    }

    #[test]
    fn test_nested_node_and_relative_resource() {
        let graph = read(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                        xmlns:ex="http://example.org/" xml:base="http://example.org/dir/">
              <rdf:Description rdf:about="a">
                <ex:knows>
                  <rdf:Description rdf:nodeID="b1">
                    <ex:page rdf:resource="../page"/>
                  </rdf:Description>
                </ex:knows>
              </rdf:Description>
            </rdf:RDF>"#,
            "http://ignored/",
        )
        .unwrap();

        assert_eq!(graph.len(), 2);
        assert!(graph.quads()[0].s.is_blank());
        assert_eq!(graph.quads()[1].o, graph.quads()[0].s);
        assert_eq!(graph.quads()[0].o, Term::iri("http://example.org/page"));
        assert_eq!(graph.quads()[1].s, Term::iri("http://example.org/dir/a"));
    }

    #[test]
    fn test_parse_types() {
        let graph = read(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                        xmlns:ex="http://example.org/">
              <rdf:Description rdf:about="http://example.org/s">
                <ex:address rdf:parseType="Resource"><ex:city>Paris</ex:city></ex:address>
                <ex:note rdf:parseType="Literal"><b>bold</b></ex:note>
                <ex:list rdf:parseType="Collection">
                  <rdf:Description rdf:about="http://example.org/one"/>
                  <rdf:Description rdf:about="http://example.org/two"/>
                </ex:list>
              </rdf:Description>
            </rdf:RDF>"#,
            "http://example.org/",
        )
        .unwrap();

        // address edge + city, note, 2 cells x (first + rest) + list edge
        assert_eq!(graph.len(), 8);
        let note = graph
            .iter()
            .find(|q| q.p == Term::iri("http://example.org/note"))
            .unwrap();
        assert_eq!(note.o.lexical_value().as_deref(), Some("<b>bold</b>"));
        assert_eq!(note.o.datatype().map(|d| d.as_iri()), Some(rdf::XML_LITERAL));
    }

    #[test]
    fn test_container_membership() {
        let graph = read(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
              <rdf:Bag rdf:about="http://example.org/bag">
                <rdf:li>a</rdf:li>
                <rdf:li>b</rdf:li>
              </rdf:Bag>
            </rdf:RDF>"#,
            "http://example.org/",
        )
        .unwrap();

        assert_eq!(graph.quads()[2].p, Term::iri(rdf::member(2)));
    }

    #[test]
    fn test_undefined_prefix() {
        let err = read(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
              <rdf:Description rdf:about="http://example.org/s"><ex:p>x</ex:p></rdf:Description>
            </rdf:RDF>"#,
            "http://example.org/",
        )
        .unwrap_err();
        assert!(matches!(err, XmlError::UndefinedPrefix(p) if p == "ex"));
    }
}
