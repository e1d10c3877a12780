//! Tokenizer shared by the Turtle, N-Quads and SPARQL Update readers.

pub mod chars;
pub mod lexer;
pub mod token;

pub use lexer::{tokenize, Lexer};
pub use token::{Token, TokenKind};
