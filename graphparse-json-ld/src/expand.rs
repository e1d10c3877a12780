//! Document expansion.
//!
//! Produces expanded JSON-LD: every node is an object keyed by absolute
//! IRIs or keywords, every property value is an array of node, value or
//! list objects.

use crate::context::{Container, ContextEntry, ParsedContext, TypeValue};
use crate::error::{JsonLdError, Result};
use crate::iri::{is_blank, is_keyword, parse_prefix};
use graphparse_ir::iri as rfc;
use serde_json::{json, Map, Value as JsonValue};

/// Expand a single IRI.
///
/// With `vocab` set (properties, types, datatypes) terms and `@vocab`
/// apply; otherwise (node identifiers) relative references resolve against
/// the base. Values that expand to neither come back unchanged.
pub fn iri(value: &str, context: &ParsedContext, vocab: bool) -> String {
    if is_keyword(value) || is_blank(value) {
        return value.to_string();
    }

    if vocab {
        if let Some(entry) = context.get(value) {
            if let Some(id) = entry.property() {
                return id.to_string();
            }
        }
    }

    if let Some((prefix, suffix)) = parse_prefix(value) {
        if let Some(prefix_iri) = context.get(prefix).and_then(|e| e.id.as_deref()) {
            return format!("{}{}", prefix_iri, suffix);
        }
    }

    if rfc::is_absolute(value) {
        return value.to_string();
    }

    if vocab {
        return match &context.vocab {
            Some(vocab) => format!("{}{}", vocab, value),
            None => value.to_string(),
        };
    }

    rfc::resolve_opt(context.base.as_deref(), value).unwrap_or_else(|_| value.to_string())
}

/// Expand a property key: (expanded IRI or keyword, term definition)
pub fn details<'c>(key: &str, context: &'c ParsedContext) -> (String, Option<&'c ContextEntry>) {
    let entry = context.get(key);
    (iri(key, context, true), entry)
}

/// Value of keyword `keyword` in `map`, looked up through aliases
fn keyword_value<'m>(
    map: &'m Map<String, JsonValue>,
    context: &ParsedContext,
    keyword: &str,
) -> Option<&'m JsonValue> {
    map.get(keyword).or_else(|| {
        map.iter()
            .find(|(k, _)| !k.starts_with('@') && iri(k, context, true) == keyword)
            .map(|(_, v)| v)
    })
}

fn value_object(value: JsonValue, type_: Option<&str>, language: Option<&str>) -> JsonValue {
    let mut obj = Map::new();
    obj.insert("@value".to_string(), value);
    if let Some(t) = type_ {
        obj.insert("@type".to_string(), json!(t));
    } else if let Some(l) = language {
        obj.insert("@language".to_string(), json!(l));
    }
    JsonValue::Object(obj)
}

/// Expand a property value based on its type and the term definition
fn parse_node_value(
    value: &JsonValue,
    entry: Option<&ContextEntry>,
    context: &ParsedContext,
    idx: &[JsonValue],
) -> Result<Vec<JsonValue>> {
    let type_val = entry.and_then(|e| e.type_.as_ref());

    match value {
        JsonValue::Null => Ok(vec![]),

        JsonValue::Bool(_) | JsonValue::Number(_) => {
            let type_ = match type_val {
                Some(TypeValue::Iri(t)) => Some(t.as_str()),
                _ => None,
            };
            Ok(vec![value_object(value.clone(), type_, None)])
        }

        JsonValue::String(s) => match type_val {
            Some(TypeValue::Id) => Ok(vec![json!({"@id": iri(s, context, false)})]),
            Some(TypeValue::Vocab) => Ok(vec![json!({"@id": iri(s, context, true)})]),
            Some(TypeValue::Iri(t)) => Ok(vec![value_object(value.clone(), Some(t), None)]),
            Some(TypeValue::Json) => Ok(vec![value_object(value.clone(), Some("@json"), None)]),
            None => {
                let language = match entry.and_then(|e| e.language.as_ref()) {
                    Some(explicit) => explicit.as_deref(),
                    None => context.language.as_deref(),
                };
                Ok(vec![value_object(value.clone(), None, language)])
            }
        },

        JsonValue::Array(arr) => {
            if type_val == Some(&TypeValue::Json) {
                return Ok(vec![value_object(value.clone(), Some("@json"), None)]);
            }

            let in_list = entry.is_some_and(|e| e.has_container(&Container::List));
            let mut results = Vec::new();
            for (i, item) in arr.iter().enumerate() {
                let mut new_idx = idx.to_vec();
                new_idx.push(json!(i));

                if item.is_array() {
                    if in_list {
                        return Err(JsonLdError::NestedSequence { idx: new_idx });
                    }
                    results.extend(parse_node_value(item, entry, context, &new_idx)?);
                    continue;
                }
                results.extend(parse_node_value(item, entry.map(without_list).as_ref(), context, &new_idx)?);
            }

            if in_list {
                return Ok(vec![json!({"@list": results})]);
            }
            Ok(results)
        }

        JsonValue::Object(map) => {
            if type_val == Some(&TypeValue::Json) {
                return Ok(vec![value_object(value.clone(), Some("@json"), None)]);
            }

            if let Some(list_val) = keyword_value(map, context, "@list") {
                let mut new_idx = idx.to_vec();
                new_idx.push(json!("@list"));
                let items = match list_val {
                    JsonValue::Array(arr) => arr.clone(),
                    other => vec![other.clone()],
                };
                let mut expanded = Vec::new();
                for item in &items {
                    if item.is_array() {
                        return Err(JsonLdError::NestedSequence { idx: new_idx });
                    }
                    expanded.extend(parse_node_value(item, entry.map(without_list).as_ref(), context, &new_idx)?);
                }
                return Ok(vec![json!({"@list": expanded})]);
            }

            if let Some(set_val) = keyword_value(map, context, "@set") {
                let mut new_idx = idx.to_vec();
                new_idx.push(json!("@set"));
                return parse_node_value(set_val, entry, context, &new_idx);
            }

            if keyword_value(map, context, "@value").is_some() {
                return parse_value_object(map, context);
            }

            if let Some(e) = entry {
                if e.has_container(&Container::Language) {
                    return Ok(parse_language_map(map));
                }
                if e.has_container(&Container::Index) {
                    let mut results = Vec::new();
                    for v in map.values() {
                        results.extend(parse_node_value(v, Some(&without_index(e)), context, idx)?);
                    }
                    return Ok(results);
                }
            }

            // Otherwise, expand as nested node
            let ctx = context.scoped(entry.and_then(|e| e.context.as_deref()));
            Ok(vec![expand_node_internal(map, &ctx, idx)?])
        }
    }
}

fn without_list(entry: &ContextEntry) -> ContextEntry {
    let mut inner = entry.clone();
    inner.container = None;
    inner
}

fn without_index(entry: &ContextEntry) -> ContextEntry {
    let mut inner = entry.clone();
    if let Some(containers) = inner.container.as_mut() {
        containers.retain(|c| *c != Container::Index);
    }
    inner
}

/// `{"en": "The Queen", "de": ["Die Königin"]}` under a language container
fn parse_language_map(map: &Map<String, JsonValue>) -> Vec<JsonValue> {
    let mut results = Vec::new();
    for (lang, v) in map {
        let values = match v {
            JsonValue::Array(arr) => arr.iter().collect(),
            other => vec![other],
        };
        for val in values {
            if let Some(s) = val.as_str() {
                let language = (lang != "@none").then_some(lang.as_str());
                results.push(value_object(json!(s), None, language));
            }
        }
    }
    results
}

/// Parse a @value object
fn parse_value_object(map: &Map<String, JsonValue>, context: &ParsedContext) -> Result<Vec<JsonValue>> {
    let Some(val) = keyword_value(map, context, "@value") else {
        return Ok(vec![]);
    };
    if val.is_null() {
        return Ok(vec![]);
    }

    let type_iri = keyword_value(map, context, "@type")
        .and_then(|t| t.as_str())
        .map(|t| iri(t, context, true));

    let language = keyword_value(map, context, "@language").and_then(|l| l.as_str());

    if type_iri.is_some() && language.is_some() {
        return Err(JsonLdError::LanguageWithType);
    }

    Ok(vec![value_object(val.clone(), type_iri.as_deref(), language)])
}

/// Expanded @type values and the context with type-scoped contexts applied
fn parse_type(
    type_val: Option<&JsonValue>,
    context: &ParsedContext,
) -> (Vec<String>, ParsedContext) {
    let original_types: Vec<&str> = match type_val {
        Some(JsonValue::String(s)) => vec![s.as_str()],
        Some(JsonValue::Array(arr)) => arr.iter().filter_map(|v| v.as_str()).collect(),
        _ => vec![],
    };

    let types = original_types.iter().map(|t| iri(t, context, true)).collect();

    let mut updated_context = context.clone();
    for orig_t in original_types {
        if let Some(scoped) = context.get(orig_t).and_then(|e| e.context.as_deref()) {
            updated_context = updated_context.scoped(Some(scoped));
        }
    }

    (types, updated_context)
}

/// Internal node expansion
fn expand_node_internal(
    map: &Map<String, JsonValue>,
    context: &ParsedContext,
    idx: &[JsonValue],
) -> Result<JsonValue> {
    // Parse local context if present
    let merged_context = match map.get("@context") {
        Some(lc) => context.parse(lc)?,
        None => context.clone(),
    };

    let (types, ctx) = parse_type(keyword_value(map, &merged_context, "@type"), &merged_context);

    let mut result = Map::new();
    if !types.is_empty() {
        result.insert("@type".to_string(), json!(types));
    }

    for (k, v) in map {
        if k == "@context" {
            continue;
        }

        let mut key_idx = idx.to_vec();
        key_idx.push(json!(k));

        let (expanded_key, entry) = details(k, &ctx);

        match expanded_key.as_str() {
            "@type" | "@context" | "@index" => {}
            "@id" => {
                if let JsonValue::String(s) = v {
                    result.insert("@id".to_string(), json!(iri(s, &ctx, false)));
                }
            }
            "@graph" => {
                let nodes = expand_nodes(v, &ctx, &key_idx)?;
                result.insert("@graph".to_string(), JsonValue::Array(nodes));
            }
            "@reverse" => {
                let JsonValue::Object(reverse_map) = v else {
                    return Err(JsonLdError::InvalidStructure(
                        "@reverse value must be an object".to_string(),
                    ));
                };
                for (rk, rv) in reverse_map {
                    let (property, rentry) = details(rk, &ctx);
                    let values = parse_node_value(rv, rentry, &ctx, &key_idx)?;
                    append_reverse(&mut result, property, values);
                }
            }
            key if is_keyword(key) => {}
            _ => {
                let values = parse_node_value(v, entry, &ctx, &key_idx)?;
                if values.is_empty() {
                    continue;
                }
                if entry.is_some_and(|e| e.reverse.is_some()) {
                    append_reverse(&mut result, expanded_key, values);
                    continue;
                }
                append(&mut result, expanded_key, values);
            }
        }
    }

    Ok(JsonValue::Object(result))
}

fn append(result: &mut Map<String, JsonValue>, key: String, values: Vec<JsonValue>) {
    match result.get_mut(&key) {
        Some(JsonValue::Array(arr)) => arr.extend(values),
        _ => {
            result.insert(key, JsonValue::Array(values));
        }
    }
}

fn append_reverse(result: &mut Map<String, JsonValue>, property: String, values: Vec<JsonValue>) {
    let reverse = result
        .entry("@reverse".to_string())
        .or_insert_with(|| JsonValue::Object(Map::new()));
    if let JsonValue::Object(reverse) = reverse {
        append(reverse, property, values);
    }
}

/// Expand a node or an array of nodes, dropping non-object members
fn expand_nodes(value: &JsonValue, context: &ParsedContext, idx: &[JsonValue]) -> Result<Vec<JsonValue>> {
    match value {
        JsonValue::Array(arr) => {
            let mut nodes = Vec::new();
            for (i, item) in arr.iter().enumerate() {
                let mut new_idx = idx.to_vec();
                new_idx.push(json!(i));
                nodes.extend(expand_nodes(item, context, &new_idx)?);
            }
            Ok(nodes)
        }
        JsonValue::Object(map) => Ok(vec![expand_node_internal(map, context, idx)?]),
        _ => Ok(vec![]),
    }
}

/// Expand a JSON-LD document.
///
/// Always returns an array of node objects. A top-level object holding
/// only `@context` and `@graph` is unwrapped into its graph.
pub fn node(document: &JsonValue, context: &ParsedContext) -> Result<JsonValue> {
    let mut nodes = expand_nodes(document, context, &[])?;

    if let [JsonValue::Object(only)] = nodes.as_slice() {
        if only.len() == 1 {
            if let Some(JsonValue::Array(graph)) = only.get("@graph") {
                nodes = graph.clone();
            }
        }
    }

    Ok(JsonValue::Array(nodes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx(value: JsonValue) -> ParsedContext {
        ParsedContext::new().parse(&value).unwrap()
    }

    #[test]
    fn test_expand_iri_exact_match() {
        let ctx = ctx(json!({
            "schema": "http://schema.org/",
            "REPLACE": "http://schema.org/Person"
        }));

        assert_eq!(iri("schema:name", &ctx, true), "http://schema.org/name");
        assert_eq!(iri("REPLACE", &ctx, true), "http://schema.org/Person");
    }

    #[test]
    fn test_expand_iri_vocab() {
        let ctx = ctx(json!({"@vocab": "https://schema.org/"}));

        assert_eq!(iri("name", &ctx, true), "https://schema.org/name");
        // Full IRIs should pass through
        assert_eq!(
            iri("http://example.org/ns#Book", &ctx, true),
            "http://example.org/ns#Book"
        );
    }

    #[test]
    fn test_expand_iri_no_match() {
        let ctx = ctx(json!({"schema": "http://schema.org/"}));
        assert_eq!(iri("not:matching", &ctx, true), "not:matching");
        assert_eq!(iri("plain", &ctx, true), "plain");
    }

    #[test]
    fn test_node_ids_resolve_against_base() {
        let ctx = ParsedContext::with_base(Some("https://www.example.org/abc/def"));
        assert_eq!(iri("../#me", &ctx, false), "https://www.example.org/#me");
        assert_eq!(iri("xyz", &ctx, false), "https://www.example.org/abc/xyz");
        assert_eq!(iri("_:b0", &ctx, false), "_:b0");
    }

    #[test]
    fn test_expand_node() {
        let doc = json!({
            "@context": {
                "foaf": "http://xmlns.com/foaf/0.1/",
                "homepage": {"@id": "foaf:homepage", "@type": "@id"},
                "name": {"@id": "foaf:name", "@language": "en"}
            },
            "@id": "http://example.org/alice",
            "@type": "foaf:Person",
            "homepage": "http://alice.example/",
            "name": "Alice"
        });

        let expanded = node(&doc, &ParsedContext::new()).unwrap();
        assert_eq!(
            expanded,
            json!([{
                "@id": "http://example.org/alice",
                "@type": ["http://xmlns.com/foaf/0.1/Person"],
                "http://xmlns.com/foaf/0.1/homepage": [{"@id": "http://alice.example/"}],
                "http://xmlns.com/foaf/0.1/name": [{"@value": "Alice", "@language": "en"}]
            }])
        );
    }

    #[test]
    fn test_expand_list_container() {
        let doc = json!({
            "@context": {"items": {"@id": "http://example.org/items", "@container": "@list"}},
            "items": ["a", "b"]
        });

        let expanded = node(&doc, &ParsedContext::new()).unwrap();
        assert_eq!(
            expanded[0]["http://example.org/items"],
            json!([{"@list": [{"@value": "a"}, {"@value": "b"}]}])
        );
    }

    #[test]
    fn test_expand_reverse_term() {
        let doc = json!({
            "@context": {"children": {"@reverse": "http://example.org/parent"}},
            "@id": "http://example.org/mum",
            "children": {"@id": "http://example.org/kid"}
        });

        let expanded = node(&doc, &ParsedContext::new()).unwrap();
        assert_eq!(
            expanded[0]["@reverse"],
            json!({"http://example.org/parent": [{"@id": "http://example.org/kid"}]})
        );
    }

    #[test]
    fn test_language_with_type_is_error() {
        let doc = json!({
            "http://example.org/p": {"@value": "x", "@type": "http://example.org/T", "@language": "en"}
        });
        assert!(matches!(
            node(&doc, &ParsedContext::new()),
            Err(JsonLdError::LanguageWithType)
        ));
    }

    #[test]
    fn test_top_level_graph_unwrapped() {
        let doc = json!({
            "@context": {"@vocab": "http://example.org/"},
            "@graph": [{"@id": "http://example.org/a", "p": 1}, {"@id": "http://example.org/b", "p": 2}]
        });
        let expanded = node(&doc, &ParsedContext::new()).unwrap();
        assert_eq!(expanded.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_keys_without_mapping_are_kept_for_filtering() {
        let doc = json!({"@id": "http://example.org/a", "unmapped": "x"});
        let expanded = node(&doc, &ParsedContext::new()).unwrap();
        assert!(expanded[0].get("unmapped").is_some());
    }
}
