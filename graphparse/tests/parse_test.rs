use std::error::Error;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use graphparse::dispatch::{JsonLdTransform, QuadStreamer, TripleLoader};
use graphparse::{parse, Backends, ParseError, Parser, ParserConfig, StreamEvent};
use graphparse_ir::{Datatype, Graph, GraphSink, Quad, Term};
use graphparse_json_ld::JsonLdError;
use graphparse_turtle::{LexicalQuad, TurtleError};
use graphparse_vocab::{patch, rdf};
use pretty_assertions::assert_eq;
use serde_json::Value as JsonValue;

const WIKIDATA: &str = "https://www.wikidata.org/wiki/Special:EntityData/Q2005.ttl";
const BE_X_OLD: &str = "<http://www.wikidata.org/entity/Q328> <http://www.w3.org/2000/01/rdf-schema#label> \"ангельская Вікіпэдыя\"@be-x-old .";

const PROFILE_JSONLD: &str = r#"
{
  "@context": {
    "homepage": {
      "@id": "http://xmlns.com/foaf/0.1/homepage",
      "@type": "@id"
    }
  },
  "@id": "../#me",
  "homepage": "xyz"
}"#;

/// Collects what the completion handler saw
#[derive(Debug, Default)]
struct Seen {
    calls: usize,
    fault: Option<String>,
    statements: usize,
}

fn lexical(s: &str, p: &str, o: &str) -> LexicalQuad {
    LexicalQuad {
        subject: s.to_string(),
        predicate: p.to_string(),
        object: o.to_string(),
        graph: None,
    }
}

#[tokio::test]
async fn turtle_language_subtags() {
    for content_type in ["text/turtle", "text/turtle;charset=UTF-8"] {
        let mut store = Graph::new();
        parse(BE_X_OLD, &mut store, WIKIDATA, Some(content_type), None)
            .await
            .unwrap();

        assert_eq!(store.len(), 1, "{content_type}");
        assert_eq!(store.quads()[0].o.language(), Some("be-x-old"));
        assert_eq!(store.quads()[0].g, Some(Term::iri(WIKIDATA)));
    }
}

#[tokio::test]
async fn default_content_type_is_turtle() {
    let mut store = Graph::new();
    parse(BE_X_OLD, &mut store, WIKIDATA, None, None).await.unwrap();
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn n3_is_read_with_the_turtle_grammar() {
    let mut store = Graph::new();
    parse(
        "@prefix : <#> . :a :b :c .",
        &mut store,
        "https://example.com/doc",
        Some("text/n3"),
        None,
    )
    .await
    .unwrap();
    assert_eq!(store.quads()[0].s, Term::iri("https://example.com/doc#a"));

    let err = parse(
        "{ :a :b :c } => { :a :b :d } .",
        &mut Graph::new(),
        "https://example.com/doc",
        Some("text/n3"),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err.root(), ParseError::Syntax(_)), "{err}");
}

#[tokio::test]
async fn document_labels_never_meet_anonymous_nodes() {
    let mut store = Graph::new();
    parse(
        "_:n0 <http://e/p> \"labelled\" .\n_:n1 <http://e/p> \"labelled1\" .\n[] <http://e/q> \"anon\" .",
        &mut store,
        "",
        Some("text/turtle"),
        None,
    )
    .await
    .unwrap();

    let subjects: Vec<&Term> = store.iter().map(|q| &q.s).collect();
    assert_eq!(subjects.len(), 3);
    assert!(subjects.iter().all(|s| s.is_blank()));
    assert_ne!(subjects[0], subjects[1]);
    assert_ne!(subjects[2], subjects[0]);
    assert_ne!(subjects[2], subjects[1]);
}

#[tokio::test]
async fn blank_labels_are_scoped_to_their_document() {
    let mut store = Graph::new();
    for (doc, content_type) in [
        ("_:x <http://e/p> \"a\" . _:x <http://e/p> \"a2\" .", "text/turtle"),
        ("_:x <http://e/p> \"b\" .\n_:x <http://e/p> \"b2\" .\n", "application/n-quads"),
        ("_:x <http://e/p> \"c\" .", "text/turtle"),
    ] {
        parse(doc, &mut store, "", Some(content_type), None).await.unwrap();
    }

    let quads = store.quads();
    assert_eq!(quads.len(), 6);
    assert_eq!(quads[0].s, quads[1].s);
    assert_eq!(quads[2].s, quads[3].s);
    assert_ne!(quads[0].s, quads[2].s);
    assert_ne!(quads[0].s, quads[4].s);
    assert_ne!(quads[2].s, quads[4].s);
}

#[tokio::test]
async fn jsonld_uses_the_base_iri() {
    let mut seen = Seen::default();
    let mut store = Graph::new();
    parse(
        PROFILE_JSONLD,
        &mut store,
        "https://www.example.org/abc/def",
        Some("application/ld+json"),
        Some(Box::new(|fault: Option<&ParseError>, store: &mut Graph| {
            seen.calls += 1;
            seen.fault = fault.map(|f| f.to_string());
            seen.statements = store.len();
        })),
    )
    .await
    .unwrap();

    assert_eq!(seen.calls, 1);
    assert_eq!(seen.fault, None);
    assert_eq!(seen.statements, 1);

    let statement = &store.quads()[0];
    assert_eq!(statement.s, Term::iri("https://www.example.org/#me"));
    assert_eq!(statement.p, Term::iri("http://xmlns.com/foaf/0.1/homepage"));
    assert_eq!(statement.o, Term::iri("https://www.example.org/abc/xyz"));
    assert_eq!(statement.g, None);
}

#[tokio::test]
async fn sparql_update_is_stored_as_sub_graphs() {
    let base = "https://example.com/";
    let mut store = Graph::new();
    parse(
        "INSERT DATA { <https://example.com/#s> <https://example.com/#p> <https://example.com/#o>. }",
        &mut store,
        base,
        Some("application/sparql-update"),
        None,
    )
    .await
    .unwrap();

    assert_eq!(store.len(), 2);
    let edge = &store.quads()[0];
    assert_eq!(edge.s, Term::iri("https://example.com/#query"));
    assert_eq!(edge.p, Term::iri(patch::INSERT));
    assert!(edge.o.is_blank());

    let inserted: Vec<String> = store.statements_in(&edge.o).map(Quad::to_ntriple).collect();
    assert_eq!(
        inserted,
        vec!["<https://example.com/#s> <https://example.com/#p> <https://example.com/#o> ."]
    );
}

#[tokio::test]
async fn unsupported_content_type_without_handler() {
    let mut store = Graph::new();
    let err = parse("hello", &mut store, "https://example.com/doc", Some("text/plain; q=1"), None)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Don't know how to parse text/plain yet while trying to parse <https://example.com/doc> as text/plain"
    );
    assert_eq!(
        err.source().map(|s| s.to_string()).as_deref(),
        Some("Don't know how to parse text/plain yet")
    );
    assert!(matches!(err.root(), ParseError::UnsupportedFormat(key) if key == "text/plain"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn unsupported_content_type_with_handler() {
    let mut seen = Seen::default();
    let mut store = Graph::new();
    let outcome = parse(
        "hello",
        &mut store,
        "https://example.com/doc",
        Some("Text/Turtle"),
        Some(Box::new(|fault: Option<&ParseError>, _: &mut Graph| {
            seen.calls += 1;
            seen.fault = fault.map(|f| f.to_string());
        })),
    )
    .await;

    assert!(outcome.is_ok());
    assert_eq!(seen.calls, 1);
    assert_eq!(seen.fault.as_deref(), Some("Don't know how to parse Text/Turtle yet"));
}

#[tokio::test]
async fn json_decode_fault_is_synchronous() {
    let mut store = Graph::new();
    let err = parse("{ not json", &mut store, "https://example.com/doc", Some("application/ld+json"), None)
        .await
        .unwrap_err();

    assert!(matches!(err.root(), ParseError::Decode(_)));
    assert!(err.to_string().ends_with("while trying to parse <https://example.com/doc> as application/ld+json"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn nquads_written_in_stream_order() {
    let text = "\
<http://example.org/a> <http://example.org/p> \"one\" .
# a comment
<http://example.org/a> <http://example.org/p> \"deux\"@fr <http://example.org/g> .
_:b1 <http://example.org/p> \"3\"^^<http://www.w3.org/2001/XMLSchema#integer> _:g1 .
";
    for content_type in ["application/n-quads", "application/nquads"] {
        let mut store = Graph::new();
        parse(text, &mut store, "https://example.com/doc", Some(content_type), None)
            .await
            .unwrap();

        let lines: Vec<String> = store.iter().map(Quad::to_nquad).collect();
        assert_eq!(
            lines[..2],
            [
                "<http://example.org/a> <http://example.org/p> \"one\" .",
                "<http://example.org/a> <http://example.org/p> \"deux\"@fr <http://example.org/g> .",
            ]
        );
        let last = &store.quads()[2];
        assert!(last.s.is_blank());
        assert!(last.g.as_ref().is_some_and(Term::is_blank));
        assert_ne!(Some(&last.s), last.g.as_ref());
        assert_eq!(last.o, Term::typed("3", Datatype::xsd_integer()));
    }
}

#[tokio::test]
async fn nquads_fault_discards_the_buffer() {
    let text = "\
<http://example.org/a> <http://example.org/p> \"one\" .
<http://example.org/a> <http://example.org/p> .
<http://example.org/a> <http://example.org/p> \"three\" .
";
    let mut seen = Seen::default();
    let mut store = Graph::new();
    parse(
        text,
        &mut store,
        "https://example.com/doc",
        Some("application/n-quads"),
        Some(Box::new(|fault: Option<&ParseError>, store: &mut Graph| {
            seen.calls += 1;
            seen.fault = fault.map(|f| f.to_string());
            seen.statements = store.len();
        })),
    )
    .await
    .unwrap();

    assert_eq!(seen.calls, 1);
    assert!(seen.fault.as_deref().is_some_and(|f| f.contains("line 2")), "{seen:?}");
    assert_eq!(seen.statements, 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn pipelined_fault_without_handler_is_dropped() {
    let mut store = Graph::new();
    let outcome = parse(
        "garbage line",
        &mut store,
        "https://example.com/doc",
        Some("application/n-quads"),
        None,
    )
    .await;

    assert!(outcome.is_ok());
    assert!(store.is_empty());
}

struct FailingTransform;

#[async_trait]
impl JsonLdTransform for FailingTransform {
    async fn to_nquads(&self, _document: &JsonValue, _base: &str) -> Result<String, JsonLdError> {
        Err(JsonLdError::InvalidStructure("transform refused".to_string()))
    }
}

#[tokio::test]
async fn transform_fault_reaches_handler() {
    let parser = Parser::with_backends(
        ParserConfig::default(),
        Backends::default().with_jsonld(FailingTransform),
    );
    let mut seen = Seen::default();
    let mut store = Graph::new();
    parser
        .parse(
            PROFILE_JSONLD,
            &mut store,
            "https://www.example.org/abc/def",
            Some("application/ld+json"),
            Some(Box::new(|fault: Option<&ParseError>, _: &mut Graph| {
                seen.calls += 1;
                seen.fault = fault.map(|f| f.to_string());
            })),
        )
        .await
        .unwrap();

    assert_eq!(seen.calls, 1);
    assert!(seen.fault.as_deref().is_some_and(|f| f.contains("transform refused")));
    assert!(store.is_empty());
}

/// Yields fixed events and never signals the end
struct ScriptedStreamer(Vec<LexicalQuad>);

impl QuadStreamer for ScriptedStreamer {
    fn stream<'a>(&self, _text: &'a str) -> BoxStream<'a, StreamEvent> {
        let events: Vec<StreamEvent> = self.0.iter().cloned().map(StreamEvent::Statement).collect();
        stream::iter(events).boxed()
    }
}

#[tokio::test]
async fn exhausted_stream_flushes_and_skips_bad_terms() {
    let parser = Parser::with_backends(
        ParserConfig::default(),
        Backends::default().with_nquads(ScriptedStreamer(vec![
            lexical("<http://example.org/a>", "<http://example.org/p>", "\"1\""),
            lexical("<http://example.org/a>", "\"not a predicate\"", "\"2\""),
            lexical("<http://example.org/a>", "<http://example.org/p>", "http://bare"),
            lexical("<http://example.org/a>", "<http://example.org/p>", "_:x"),
        ])),
    );
    let mut store = Graph::new();
    parser
        .parse("", &mut store, "", Some("application/n-quads"), None)
        .await
        .unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.quads()[0].o, Term::string("1"));
    assert!(store.quads()[1].o.is_blank());
}

struct FaultAfterOne;

impl QuadStreamer for FaultAfterOne {
    fn stream<'a>(&self, _text: &'a str) -> BoxStream<'a, StreamEvent> {
        stream::iter(vec![
            StreamEvent::Statement(lexical("<http://s>", "<http://p>", "<http://o>")),
            StreamEvent::Fault(TurtleError::parse(0, "scripted failure")),
            StreamEvent::Statement(lexical("<http://s>", "<http://p>", "<http://o2>")),
        ])
        .boxed()
    }
}

#[tokio::test]
async fn nothing_is_written_before_end_of_stream() {
    let parser = Parser::with_backends(ParserConfig::default(), Backends::default().with_nquads(FaultAfterOne));
    let mut seen = Seen::default();
    let mut store = Graph::new();
    parser
        .parse(
            "",
            &mut store,
            "https://example.com/doc",
            Some("application/nquads"),
            Some(Box::new(|fault: Option<&ParseError>, store: &mut Graph| {
                seen.calls += 1;
                seen.fault = fault.map(|f| f.to_string());
                seen.statements = store.len();
            })),
        )
        .await
        .unwrap();

    assert_eq!(seen.calls, 1);
    assert!(seen.fault.as_deref().is_some_and(|f| f.contains("scripted failure")));
    assert_eq!(seen.statements, 0);
}

/// Reads every document as one fixed statement
struct FixedLoader;

impl TripleLoader for FixedLoader {
    fn load(&self, _text: &str, base: &str, sink: &mut dyn GraphSink) -> Result<(), TurtleError> {
        let s = sink.term_iri(base);
        let p = sink.term_iri(rdf::TYPE);
        let o = sink.term_iri("http://example.org/Loaded");
        sink.emit_triple(s, p, o);
        Ok(())
    }
}

#[tokio::test]
async fn substituted_turtle_loader_writes_with_provenance() {
    let parser = Parser::with_backends(ParserConfig::default(), Backends::default().with_triples(FixedLoader));
    let mut store = Graph::new();
    parser
        .parse("not turtle at all", &mut store, "https://example.com/doc", Some("text/turtle"), None)
        .await
        .unwrap();

    assert_eq!(store.len(), 1);
    let quad = &store.quads()[0];
    assert_eq!(quad.s, Term::iri("https://example.com/doc"));
    assert_eq!(quad.o, Term::iri("http://example.org/Loaded"));
    assert_eq!(quad.g, Some(Term::iri("https://example.com/doc")));
}

#[tokio::test]
async fn rdfxml_and_rdfa() {
    let rdfxml = r##"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                          xmlns:foaf="http://xmlns.com/foaf/0.1/">
      <foaf:Person rdf:about="#me"><foaf:name>Alice</foaf:name></foaf:Person>
    </rdf:RDF>"##;
    let mut store = Graph::new();
    parse(rdfxml, &mut store, "https://alice.example/card", Some("application/rdf+xml"), None)
        .await
        .unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.quads()[0].p, Term::iri(rdf::TYPE));

    let html = r##"<html><body vocab="http://schema.org/">
      <div typeof="Person" about="#me"><span property="name">Alice</span><br></div>
    </body></html>"##;
    let mut store = Graph::new();
    parse(html, &mut store, "https://alice.example/", Some("text/html"), None)
        .await
        .unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.quads()[1].o, Term::string("Alice"));

    // the same tag soup is not well-formed XHTML
    let err = parse(html, &mut Graph::new(), "https://alice.example/", Some("application/xhtml+xml"), None)
        .await
        .unwrap_err();
    assert!(matches!(err.root(), ParseError::Markup(_)), "{err}");
}

#[tokio::test]
async fn provenance_can_be_disabled() {
    let parser = Parser::new(ParserConfig::default().with_provenance(false));
    let mut store = Graph::new();
    parser
        .parse(BE_X_OLD, &mut store, WIKIDATA, None, None)
        .await
        .unwrap();
    assert_eq!(store.quads()[0].g, None);

    // an empty base records no context either
    let mut store = Graph::new();
    parse(BE_X_OLD, &mut store, "", None, None).await.unwrap();
    assert_eq!(store.quads()[0].g, None);
}

#[tokio::test]
async fn configured_default_content_type() {
    let parser = Parser::new(ParserConfig::default().with_default_content_type("application/n-quads"));
    let mut store = Graph::new();
    parser
        .parse("<http://s> <http://p> <http://o> .", &mut store, "", None, None)
        .await
        .unwrap();
    assert_eq!(store.len(), 1);
}
