//! Context processing: turns `@context` values into an active context.
//!
//! Remote contexts are not fetched; only inline maps, arrays and `null` are
//! processed.

use crate::error::{JsonLdError, Result};
use crate::iri::{is_blank, is_keyword, parse_prefix};
use graphparse_ir::iri as rfc;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

/// `@container` kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    List,
    Set,
    Language,
    Index,
}

/// `@type` of a term definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeValue {
    /// `@id`: string values are IRI references
    Id,
    /// `@vocab`: string values are vocabulary-relative IRIs
    Vocab,
    /// `@json`: values are JSON literals
    Json,
    /// Datatype IRI
    Iri(String),
}

/// Term definition
#[derive(Debug, Clone, Default)]
pub struct ContextEntry {
    /// Expanded IRI, or a keyword for aliases
    pub id: Option<String>,
    pub type_: Option<TypeValue>,
    pub reverse: Option<String>,
    pub container: Option<Vec<Container>>,
    /// Term-scoped context
    pub context: Option<Box<ParsedContext>>,
    /// `Some(None)` clears the default language for this term
    pub language: Option<Option<String>>,
}

impl ContextEntry {
    pub fn has_container(&self, container: &Container) -> bool {
        self.container.as_ref().is_some_and(|c| c.contains(container))
    }

    /// IRI of the property, forward or reverse
    pub fn property(&self) -> Option<&str> {
        self.id.as_deref().or(self.reverse.as_deref())
    }
}

/// Active context
#[derive(Debug, Clone, Default)]
pub struct ParsedContext {
    pub vocab: Option<String>,
    /// `@base`, initially the document IRI
    pub base: Option<String>,
    pub language: Option<String>,
    pub terms: HashMap<String, ContextEntry>,
}

impl ParsedContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty context for a document at `base`
    pub fn with_base(base: Option<&str>) -> Self {
        Self {
            base: base.filter(|b| !b.is_empty()).map(str::to_string),
            ..Self::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<&ContextEntry> {
        self.terms.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.terms.contains_key(key)
    }

    /// Apply a local context to this one.
    pub fn parse(&self, context: &JsonValue) -> Result<ParsedContext> {
        match context {
            // null drops all definitions; the document base survives
            JsonValue::Null => Ok(ParsedContext::with_base(self.base.as_deref())),
            JsonValue::Array(items) => items
                .iter()
                .try_fold(self.clone(), |active, item| active.parse(item)),
            JsonValue::Object(map) => match map.get("@context") {
                Some(inner) => self.parse(inner),
                None => Definer::new(self, map).define(),
            },
            JsonValue::String(url) => Err(invalid(format!("remote context {url} cannot be loaded"))),
            other => Err(invalid(format!("context must be an object, array or null, got {other}"))),
        }
    }

    /// This context with a scoped context layered on top
    pub fn scoped(&self, scoped: Option<&ParsedContext>) -> ParsedContext {
        let Some(scoped) = scoped else {
            return self.clone();
        };
        let mut merged = self.clone();
        merged.terms.extend(scoped.terms.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.vocab = scoped.vocab.clone().or(merged.vocab);
        merged.language = scoped.language.clone().or(merged.language);
        merged
    }
}

fn invalid(message: String) -> JsonLdError {
    JsonLdError::InvalidContext { message }
}

/// Builds the definitions of one local context map.
///
/// Terms may refer to each other within the same map, so references are
/// looked up in `local` before the previous active context.
struct Definer<'a> {
    active: &'a ParsedContext,
    local: &'a Map<String, JsonValue>,
    result: ParsedContext,
}

impl<'a> Definer<'a> {
    fn new(active: &'a ParsedContext, local: &'a Map<String, JsonValue>) -> Self {
        Self {
            active,
            local,
            result: active.clone(),
        }
    }

    fn define(mut self) -> Result<ParsedContext> {
        // @base before @vocab: a relative @vocab resolves against it
        match self.local.get("@base") {
            None => {}
            Some(JsonValue::Null) => self.result.base = None,
            Some(JsonValue::String(base)) => {
                self.result.base = Some(rfc::resolve_opt(self.active.base.as_deref(), base)?);
            }
            Some(other) => return Err(invalid(format!("@base must be a string, got {other}"))),
        }

        match self.local.get("@vocab") {
            None => {}
            Some(JsonValue::Null) => self.result.vocab = None,
            Some(JsonValue::String(vocab)) if is_blank(vocab) || rfc::is_absolute(vocab) => {
                self.result.vocab = Some(vocab.clone());
            }
            Some(JsonValue::String(vocab)) => {
                self.result.vocab = Some(rfc::resolve_opt(self.result.base.as_deref(), vocab)?);
            }
            Some(other) => return Err(invalid(format!("@vocab must be a string, got {other}"))),
        }

        if let Some(language) = self.local.get("@language") {
            self.result.language = language.as_str().map(str::to_string);
        }

        for (term, value) in self.local.iter().filter(|(k, _)| !k.starts_with('@')) {
            let entry = self.term(term, value)?;
            self.result.terms.insert(term.clone(), entry);
        }
        Ok(self.result)
    }

    fn term(&self, term: &str, value: &JsonValue) -> Result<ContextEntry> {
        let map = match value {
            JsonValue::Null => return Ok(ContextEntry::default()),
            JsonValue::String(_) => {
                let target = self.alias_target(term, &mut Vec::new())?;
                return Ok(ContextEntry {
                    id: Some(self.expand(&target)),
                    ..ContextEntry::default()
                });
            }
            JsonValue::Object(map) => map,
            other => return Err(invalid(format!("definition of '{term}' must be a string or object, got {other}"))),
        };

        let mut entry = ContextEntry {
            id: map.get("@id").and_then(JsonValue::as_str).map(|id| self.expand(id)),
            reverse: map.get("@reverse").and_then(JsonValue::as_str).map(|r| self.expand(r)),
            language: map.get("@language").map(|l| l.as_str().map(str::to_string)),
            ..ContextEntry::default()
        };
        if let Some(type_) = map.get("@type") {
            entry.type_ = self.type_mapping(type_)?;
        }
        if let Some(container) = map.get("@container") {
            entry.container = Some(containers(container)?);
        }
        if let Some(scoped) = map.get("@context") {
            entry.context = Some(Box::new(ParsedContext::new().parse(scoped)?));
        }
        if entry.id.is_none() && entry.reverse.is_none() {
            entry.id = Some(self.expand(term));
        }
        Ok(entry)
    }

    /// Follow `"a": "b"` chains to the value that is not another local term.
    fn alias_target(&self, term: &str, seen: &mut Vec<String>) -> Result<String> {
        if seen.iter().any(|s| s == term) {
            return Err(JsonLdError::InvalidIriMapping { term: term.to_string() });
        }
        match self.local.get(term) {
            Some(JsonValue::String(target)) if target == term => {
                Err(JsonLdError::InvalidIriMapping { term: term.to_string() })
            }
            Some(JsonValue::String(target))
                if !target.contains(':') && !is_keyword(target) && self.local.contains_key(target) =>
            {
                seen.push(term.to_string());
                self.alias_target(target, seen)
            }
            Some(JsonValue::String(target)) => Ok(target.clone()),
            Some(JsonValue::Object(map)) => Ok(map
                .get("@id")
                .and_then(JsonValue::as_str)
                .unwrap_or(term)
                .to_string()),
            _ => Ok(term.to_string()),
        }
    }

    /// IRI of a prefix or term, defined locally or in the previous context
    fn lookup(&self, name: &str) -> Option<String> {
        let local = match self.local.get(name) {
            Some(JsonValue::String(iri)) => Some(iri.as_str()),
            Some(JsonValue::Object(map)) => map.get("@id").and_then(JsonValue::as_str),
            _ => None,
        };
        local
            .or_else(|| self.active.get(name).and_then(|e| e.id.as_deref()))
            .map(str::to_string)
    }

    fn expand(&self, value: &str) -> String {
        if is_keyword(value) || is_blank(value) {
            return value.to_string();
        }
        if let Some((prefix, suffix)) = parse_prefix(value) {
            if let Some(ns) = self.lookup(prefix) {
                return format!("{ns}{suffix}");
            }
        }
        if !value.contains(':') {
            if let Some(id) = self.active.get(value).and_then(|e| e.id.clone()) {
                return id;
            }
            if let Some(vocab) = &self.result.vocab {
                return format!("{vocab}{value}");
            }
        }
        value.to_string()
    }

    fn type_mapping(&self, value: &JsonValue) -> Result<Option<TypeValue>> {
        let type_ = match value {
            JsonValue::Null => return Ok(None),
            JsonValue::String(s) => self.expand(s),
            other => return Err(invalid(format!("@type must be a string, got {other}"))),
        };
        Ok(Some(match type_.as_str() {
            "@id" => TypeValue::Id,
            "@vocab" => TypeValue::Vocab,
            "@json" => TypeValue::Json,
            _ => TypeValue::Iri(type_),
        }))
    }
}

fn containers(value: &JsonValue) -> Result<Vec<Container>> {
    let one = |item: &JsonValue| match item.as_str() {
        Some("@list") => Ok(Container::List),
        Some("@set") => Ok(Container::Set),
        Some("@language") => Ok(Container::Language),
        Some("@index") => Ok(Container::Index),
        _ => Err(invalid(format!("unknown @container value {item}"))),
    };
    match value {
        JsonValue::Array(items) => items.iter().map(one).collect(),
        item => Ok(vec![one(item)?]),
    }
}
