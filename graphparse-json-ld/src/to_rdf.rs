//! Expanded JSON-LD to GraphSink events.
//!
//! - `@type` becomes `rdf:type`
//! - `@list` becomes an `rdf:first` / `rdf:rest` chain
//! - `@reverse` properties swap subject and object
//! - a node with `@graph` names the graph its members are written to
//! - native numbers and booleans become xsd literals; `@json` values become
//!   `rdf:JSON` literals in canonical form
//!
//! Node identifiers and properties that are not absolute IRIs or blank
//! node identifiers are dropped.

use crate::canonical::canonicalize;
use crate::error::{JsonLdError, Result};
use crate::iri::{is_blank, is_well_formed_node};
use graphparse_ir::{Datatype, GraphSink, LiteralValue, TermId};
use graphparse_vocab::{rdf, xsd};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Convert expanded JSON-LD to GraphSink events
pub fn to_graph_events<S: GraphSink>(expanded: &Value, sink: &mut S) -> Result<()> {
    match expanded {
        Value::Array(arr) => {
            for item in arr {
                process_node(item, sink, None, None)?;
            }
        }
        Value::Object(_) => {
            process_node(expanded, sink, None, None)?;
        }
        _ => {
            return Err(JsonLdError::InvalidStructure(
                "Expected expanded array or object".to_string(),
            ))
        }
    }
    Ok(())
}

fn node_term<S: GraphSink>(id: &str, sink: &mut S) -> Option<TermId> {
    if !is_well_formed_node(id) {
        debug!(id, "dropping node with relative identifier");
        return None;
    }
    Some(match id.strip_prefix("_:") {
        Some(label) => sink.term_blank(Some(label)),
        None => sink.term_iri(id),
    })
}

fn as_object(value: &Value) -> Result<&Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| JsonLdError::InvalidStructure("Expected node to be an object".to_string()))
}

fn as_array(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(arr) => arr.iter().collect(),
        other => vec![other],
    }
}

/// Process a single node object; returns its subject term.
///
/// `forced_subject` carries the blank node already allocated for an
/// embedded node without `@id`.
fn process_node<S: GraphSink>(
    node: &Value,
    sink: &mut S,
    graph: Option<TermId>,
    forced_subject: Option<TermId>,
) -> Result<Option<TermId>> {
    let obj = as_object(node)?;

    let subject = match (forced_subject, obj.get("@id")) {
        (Some(id), _) => Some(id),
        (None, Some(id_val)) => {
            let id = id_val.as_str().ok_or_else(|| {
                JsonLdError::InvalidStructure("@id must be a string".to_string())
            })?;
            node_term(id, sink)
        }
        (None, None) => Some(sink.term_blank(None)),
    };

    if let Some(members) = obj.get("@graph") {
        // the graph is named by this node; members are written into it
        let name = subject.or_else(|| Some(sink.term_blank(None)));
        for member in as_array(members) {
            process_node(member, sink, name, None)?;
        }
    }

    let Some(subject) = subject else {
        return Ok(None);
    };

    for (key, value) in obj {
        match key.as_str() {
            "@type" => {
                let rdf_type = sink.term_iri(rdf::TYPE);
                for type_val in as_array(value) {
                    if let Some(object) = type_val.as_str().and_then(|t| node_term(t, sink)) {
                        sink.emit_quad(subject, rdf_type, object, graph);
                    }
                }
            }
            "@reverse" => {
                let Value::Object(reverse) = value else {
                    continue;
                };
                for (property, values) in reverse {
                    if !is_well_formed_node(property) || is_blank(property) {
                        continue;
                    }
                    let predicate = sink.term_iri(property);
                    for val in as_array(values) {
                        if let Some(object) = process_value(val, sink, graph)? {
                            sink.emit_quad(object, predicate, subject, graph);
                        }
                    }
                }
            }
            k if k.starts_with('@') => {}
            property => {
                if !is_well_formed_node(property) || is_blank(property) {
                    debug!(property, "dropping property without an absolute IRI");
                    continue;
                }
                let predicate = sink.term_iri(property);
                for val in as_array(value) {
                    if let Some(object) = process_value(val, sink, graph)? {
                        sink.emit_quad(subject, predicate, object, graph);
                    }
                }
            }
        }
    }

    Ok(Some(subject))
}

/// Term for a value object, node reference, embedded node or list
fn process_value<S: GraphSink>(value: &Value, sink: &mut S, graph: Option<TermId>) -> Result<Option<TermId>> {
    let obj = as_object(value)?;

    if let Some(val) = obj.get("@value") {
        return Ok(process_literal(val, obj, sink));
    }

    if let Some(list) = obj.get("@list") {
        return process_list(list, sink, graph).map(Some);
    }

    if obj.len() == 1 {
        if let Some(Value::String(id)) = obj.get("@id") {
            return Ok(node_term(id, sink));
        }
    }

    if obj.contains_key("@id") {
        return process_node(value, sink, graph, None);
    }

    // Embedded node without @id: allocate its blank node first so the
    // edge and the node's own statements share identity
    let subject = sink.term_blank(None);
    process_node(value, sink, graph, Some(subject))
}

/// Emit the `rdf:first` / `rdf:rest` chain for a list and return its head
fn process_list<S: GraphSink>(list: &Value, sink: &mut S, graph: Option<TermId>) -> Result<TermId> {
    let mut items = Vec::new();
    for item in as_array(list) {
        if let Some(term) = process_value(item, sink, graph)? {
            items.push(term);
        }
    }

    let nil = sink.term_iri(rdf::NIL);
    if items.is_empty() {
        return Ok(nil);
    }

    let first = sink.term_iri(rdf::FIRST);
    let rest = sink.term_iri(rdf::REST);
    let nodes: Vec<TermId> = items.iter().map(|_| sink.term_blank(None)).collect();

    for (i, (node, item)) in nodes.iter().zip(&items).enumerate() {
        sink.emit_quad(*node, first, *item, graph);
        let next = nodes.get(i + 1).copied().unwrap_or(nil);
        sink.emit_quad(*node, rest, next, graph);
    }

    Ok(nodes[0])
}

/// Process a literal value with @value, @type, @language
fn process_literal<S: GraphSink>(val: &Value, obj: &Map<String, Value>, sink: &mut S) -> Option<TermId> {
    let datatype = obj.get("@type").and_then(|t| t.as_str());
    let language = obj.get("@language").and_then(|l| l.as_str());

    if datatype == Some("@json") {
        return Some(sink.term_literal_value(
            LiteralValue::Json(Arc::from(canonicalize(val))),
            Datatype::rdf_json(),
        ));
    }

    match val {
        Value::String(s) => Some(match (language, datatype) {
            (Some(lang), _) => sink.term_literal(s, Datatype::rdf_lang_string(), Some(lang)),
            (None, Some(dt)) => sink.term_literal(s, Datatype::from_iri(dt), None),
            (None, None) => sink.term_literal(s, Datatype::xsd_string(), None),
        }),
        Value::Bool(b) => Some(sink.term_literal_value(
            LiteralValue::Boolean(*b),
            datatype.map_or_else(Datatype::xsd_boolean, Datatype::from_iri),
        )),
        Value::Number(n) => {
            let f = n.as_f64()?;
            let integral = n.is_i64() || n.is_u64() || (f.fract() == 0.0 && f.abs() < 1e21);
            let as_double = datatype == Some(xsd::DOUBLE) || !integral;
            let value = match n.as_i64() {
                Some(i) if !as_double => LiteralValue::Integer(i),
                _ if !as_double && f.abs() < i64::MAX as f64 => LiteralValue::Integer(f as i64),
                _ => LiteralValue::Double(f),
            };
            let default = if matches!(value, LiteralValue::Integer(_)) {
                Datatype::xsd_integer()
            } else {
                Datatype::xsd_double()
            };
            Some(sink.term_literal_value(value, datatype.map_or(default, Datatype::from_iri)))
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
