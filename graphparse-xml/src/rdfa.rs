//! RDFa 1.1 walker for HTML and XHTML element trees.
//!
//! Handles `vocab`, `prefix`, `xmlns:*`, `lang` / `xml:lang`, `about`,
//! `resource`, `href`, `src`, `typeof`, `property`, `rel`, `rev`,
//! `content` and `datatype`, plus the HTML `<base href>` element.
//! Property copying (`rdfa:Pattern`) and `inlist` are not supported.

use std::collections::HashMap;

use graphparse_ir::{iri, Datatype, GraphSink, TermId};
use graphparse_vocab::rdf;
use tracing::trace;

use crate::document::{Element, XmlDocument};
use crate::error::Result;

/// Prefixes every RDFa document starts with
const INITIAL_PREFIXES: &[(&str, &str)] = &[
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("dc", "http://purl.org/dc/terms/"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("schema", "http://schema.org/"),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
];

/// Namespace of the unprefixed `:term` CURIE form
const XHTML_VOCAB: &str = "http://www.w3.org/1999/xhtml/vocab#";

/// A predicate waiting for the next subject found below its element
#[derive(Clone, Copy, Debug)]
enum Incomplete {
    Forward(TermId),
    Reverse(TermId),
}

/// Evaluation context handed from an element to its children
#[derive(Clone, Debug)]
struct Context {
    base: Option<String>,
    parent_subject: Option<TermId>,
    parent_object: Option<TermId>,
    incomplete: Vec<Incomplete>,
    prefixes: HashMap<String, String>,
    vocab: Option<String>,
    lang: Option<String>,
}

enum Resource {
    Iri(String),
    Blank(String),
}

/// Walk an (X)HTML document for RDFa statements.
///
/// `base` is the document location; an HTML `<base href>` overrides it.
pub fn parse_rdfa<S: GraphSink>(doc: &XmlDocument, base: Option<&str>, sink: &mut S) -> Result<()> {
    let root = doc.root();
    let mut base = base.filter(|b| !b.is_empty()).map(str::to_string);
    if let Some(href) = root
        .find(&|e| e.local_name() == "base" && e.attr("href").is_some())
        .and_then(|e| e.attr("href"))
    {
        base = Some(iri::resolve_opt(base.as_deref(), href)?);
    }

    let context = Context {
        parent_subject: None,
        parent_object: None,
        incomplete: Vec::new(),
        prefixes: INITIAL_PREFIXES
            .iter()
            .map(|(p, ns)| (p.to_string(), ns.to_string()))
            .collect(),
        vocab: None,
        lang: None,
        base,
    };

    let mut walker = Walker { sink };
    walker.element(root, &context, true)
}

struct Walker<'a, S> {
    sink: &'a mut S,
}

impl<S: GraphSink> Walker<'_, S> {
    fn element(&mut self, el: &Element, parent: &Context, is_root: bool) -> Result<()> {
        let mut ctx = parent.clone();
        self.update_mappings(el, &mut ctx)?;

        let rel = self.predicates(el.attr("rel"), &ctx);
        let rev = self.predicates(el.attr("rev"), &ctx);
        let has_links = el.attr("rel").is_some() || el.attr("rev").is_some();
        let property = el.attr("property");
        let types = self.predicates(el.attr("typeof"), &ctx);
        let has_typeof = el.attr("typeof").is_some();

        let about = self.attr_resource(el, "about", &ctx)?;
        let linked = match self.attr_resource(el, "resource", &ctx)? {
            Some(r) => Some(r),
            None => match self.attr_iri(el, "href", &ctx)? {
                Some(r) => Some(r),
                None => self.attr_iri(el, "src", &ctx)?,
            },
        };

        let mut new_subject = None;
        let mut object_resource = None;
        let mut typed_resource = None;
        let mut skip = false;

        if !has_links {
            if property.is_some() && el.attr("content").is_none() && el.attr("datatype").is_none() {
                new_subject = about.or(if is_root { self.base_term(&ctx) } else { None });
                if new_subject.is_none() {
                    new_subject = parent.parent_object;
                }
                if has_typeof {
                    typed_resource = match about {
                        Some(about) => Some(about),
                        None => Some(linked.unwrap_or_else(|| self.sink.term_blank(None))),
                    };
                    object_resource = typed_resource;
                }
            } else {
                new_subject = about.or(linked);
                if new_subject.is_none() && has_typeof {
                    new_subject = Some(self.sink.term_blank(None));
                }
                if new_subject.is_none() && is_root {
                    new_subject = self.base_term(&ctx);
                }
                if new_subject.is_none() {
                    new_subject = parent.parent_object;
                    skip = property.is_none();
                }
                if has_typeof {
                    typed_resource = new_subject;
                }
            }
        } else {
            new_subject = about.or(if is_root { self.base_term(&ctx) } else { None });
            if about.is_some() && has_typeof {
                typed_resource = new_subject;
            }
            if new_subject.is_none() {
                new_subject = parent.parent_object;
            }
            object_resource = linked;
            if object_resource.is_none() && has_typeof && about.is_none() {
                object_resource = Some(self.sink.term_blank(None));
                typed_resource = object_resource;
            }
        }

        if let Some(typed) = typed_resource {
            let rdf_type = self.sink.term_iri(rdf::TYPE);
            for class in &types {
                self.sink.emit_triple(typed, rdf_type, *class);
            }
        }

        // a new subject completes whatever the ancestors left dangling
        if let (Some(subject), false) = (new_subject, skip) {
            if let Some(parent_subject) = parent.parent_subject {
                for pending in &parent.incomplete {
                    match *pending {
                        Incomplete::Forward(p) => self.sink.emit_triple(parent_subject, p, subject),
                        Incomplete::Reverse(p) => self.sink.emit_triple(subject, p, parent_subject),
                    }
                }
            }
        }

        let mut incomplete = Vec::new();
        if let (Some(subject), Some(object)) = (new_subject, object_resource) {
            for p in &rel {
                self.sink.emit_triple(subject, *p, object);
            }
            for p in &rev {
                self.sink.emit_triple(object, *p, subject);
            }
        } else if has_links {
            incomplete.extend(rel.iter().map(|p| Incomplete::Forward(*p)));
            incomplete.extend(rev.iter().map(|p| Incomplete::Reverse(*p)));
        }

        if let (Some(subject), Some(_)) = (new_subject, property) {
            let predicates = self.predicates(property, &ctx);
            if !predicates.is_empty() {
                let object = self.property_value(el, &ctx, has_links, linked, typed_resource, about)?;
                for p in predicates {
                    self.sink.emit_triple(subject, p, object);
                }
            }
        }

        let child_ctx = if skip {
            ctx
        } else {
            Context {
                parent_subject: new_subject.or(parent.parent_subject),
                parent_object: object_resource.or(new_subject).or(parent.parent_subject),
                incomplete: if has_links && object_resource.is_none() {
                    incomplete
                } else {
                    Vec::new()
                },
                ..ctx
            }
        };

        for child in el.elements() {
            self.element(child, &child_ctx, false)?;
        }
        Ok(())
    }

    fn update_mappings(&mut self, el: &Element, ctx: &mut Context) -> Result<()> {
        if let Some(vocab) = el.attr("vocab") {
            ctx.vocab = if vocab.is_empty() {
                None
            } else {
                Some(iri::resolve_opt(ctx.base.as_deref(), vocab)?)
            };
        }
        for (key, value) in &el.attributes {
            if let Some(prefix) = key.strip_prefix("xmlns:") {
                ctx.prefixes.insert(prefix.to_ascii_lowercase(), value.clone());
            }
        }
        if let Some(declared) = el.attr("prefix") {
            let mut parts = declared.split_whitespace();
            while let (Some(name), Some(ns)) = (parts.next(), parts.next()) {
                if let Some(name) = name.strip_suffix(':') {
                    ctx.prefixes.insert(name.to_ascii_lowercase(), ns.to_string());
                }
            }
        }
        if let Some(lang) = el.attr("xml:lang").or(el.attr("lang")) {
            ctx.lang = Some(lang.to_string()).filter(|l| !l.is_empty());
        }
        Ok(())
    }

    fn base_term(&mut self, ctx: &Context) -> Option<TermId> {
        let base = ctx.base.as_deref()?;
        Some(self.sink.term_iri(base))
    }

    fn resource_term(&mut self, resource: Resource) -> TermId {
        match resource {
            Resource::Iri(iri) => self.sink.term_iri(&iri),
            Resource::Blank(label) => self.sink.term_blank(Some(&label)),
        }
    }

    /// `about` and `resource`: safe CURIE, CURIE or IRI
    fn attr_resource(&mut self, el: &Element, name: &str, ctx: &Context) -> Result<Option<TermId>> {
        let Some(value) = el.attr(name) else {
            return Ok(None);
        };
        if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
            return Ok(curie(inner, ctx).map(|r| self.resource_term(r)));
        }
        if let Some(resource) = curie(value, ctx) {
            return Ok(Some(self.resource_term(resource)));
        }
        let iri = iri::resolve_opt(ctx.base.as_deref(), value)?;
        Ok(Some(self.sink.term_iri(&iri)))
    }

    /// `href` and `src`: plain IRIs
    fn attr_iri(&mut self, el: &Element, name: &str, ctx: &Context) -> Result<Option<TermId>> {
        match el.attr(name) {
            Some(value) => {
                let iri = iri::resolve_opt(ctx.base.as_deref(), value)?;
                Ok(Some(self.sink.term_iri(&iri)))
            }
            None => Ok(None),
        }
    }

    /// Whitespace separated terms, CURIEs or absolute IRIs
    fn predicates(&mut self, value: Option<&str>, ctx: &Context) -> Vec<TermId> {
        let Some(value) = value else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for token in value.split_whitespace() {
            let resolved = if token.contains(':') {
                curie(token, ctx).or_else(|| {
                    iri::is_absolute(token).then(|| Resource::Iri(token.to_string()))
                })
            } else {
                ctx.vocab
                    .as_ref()
                    .map(|vocab| Resource::Iri(format!("{vocab}{token}")))
            };
            match resolved {
                // blank nodes are not allowed as predicates
                Some(Resource::Iri(iri)) => out.push(self.sink.term_iri(&iri)),
                Some(Resource::Blank(_)) | None => trace!(token, "ignoring unresolvable RDFa term"),
            }
        }
        out
    }

    fn property_value(
        &mut self,
        el: &Element,
        ctx: &Context,
        has_links: bool,
        linked: Option<TermId>,
        typed_resource: Option<TermId>,
        about: Option<TermId>,
    ) -> Result<TermId> {
        let datatype = match el.attr("datatype") {
            Some("") => Some(None),
            Some(dt) => Some(match curie(dt, ctx) {
                Some(Resource::Iri(iri)) => Some(iri),
                _ if dt.contains(':') => Some(dt.to_string()),
                _ => ctx.vocab.as_ref().map(|v| format!("{v}{dt}")),
            }),
            None => None,
        };

        if let Some(dt) = datatype.clone().flatten().map(Datatype::from_iri) {
            if dt.is_markup() {
                let value = el
                    .attr("content")
                    .map(str::to_string)
                    .unwrap_or_else(|| el.inner_xml());
                return Ok(self.sink.term_literal(&value, dt, None));
            }
        }

        if let Some(content) = el.attr("content") {
            return Ok(self.literal(content, datatype.flatten(), ctx));
        }

        if datatype.is_none() && !has_links {
            if let Some(object) = linked {
                return Ok(object);
            }
            if let (Some(typed), None) = (typed_resource, about) {
                return Ok(typed);
            }
        }

        Ok(self.literal(&el.text(), datatype.flatten(), ctx))
    }

    fn literal(&mut self, value: &str, datatype: Option<String>, ctx: &Context) -> TermId {
        match (datatype, &ctx.lang) {
            (Some(dt), _) => self.sink.term_literal(value, Datatype::from_iri(dt), None),
            (None, Some(lang)) => self
                .sink
                .term_literal(value, Datatype::rdf_lang_string(), Some(lang)),
            (None, None) => self.sink.term_literal(value, Datatype::xsd_string(), None),
        }
    }
}

/// Resolve `prefix:reference` or `_:label` with the in-scope prefixes
fn curie(value: &str, ctx: &Context) -> Option<Resource> {
    let (prefix, reference) = value.split_once(':')?;
    if reference.starts_with("//") {
        return None;
    }
    if prefix == "_" {
        return Some(Resource::Blank(reference.to_string()));
    }
    if prefix.is_empty() {
        return Some(Resource::Iri(format!("{XHTML_VOCAB}{reference}")));
    }
    ctx.prefixes
        .get(&prefix.to_ascii_lowercase())
        .map(|ns| Resource::Iri(format!("{ns}{reference}")))
}
