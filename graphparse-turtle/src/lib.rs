//! Text readers for graphparse: Turtle/N3, N-Quads and SPARQL Update.
//!
//! The Turtle parser emits to `graphparse_ir::GraphSink`; the N-Quads reader
//! yields statements in lexical notation; the update reader produces a
//! [`Patch`] of ground statement sets.
//!
//! # Example
//!
//! ```
//! use graphparse_turtle::parse_with_base;
//! use graphparse_ir::GraphCollectorSink;
//!
//! let turtle = r#"
//!     @prefix foaf: <http://xmlns.com/foaf/0.1/> .
//!     <#me> foaf:name "Alice" ;
//!           foaf:age 30 .
//! "#;
//!
//! let mut sink = GraphCollectorSink::new();
//! parse_with_base(turtle, "https://alice.example/profile", &mut sink).unwrap();
//! assert_eq!(sink.finish().len(), 2);
//! ```

pub mod error;
pub mod lex;
pub mod nquads;
pub mod parser;
pub mod update;

pub use error::{Result, TurtleError};
pub use lex::{tokenize, Lexer, Token, TokenKind};
pub use nquads::{LexicalQuad, NQuadsReader};
pub use parser::{parse, parse_with_base, Parser};
pub use update::{parse_update, Patch};
