//! Lexical analysis for femto source.
//!
//! Converts source text into a lazy stream of tokens. It handles:
//!
//! - Tokenization driven by an ordered table of regex patterns
//! - Keyword and primitive-type lookup for identifiers
//! - Numeric, string and character literals (with escape decoding)
//! - Span tracking on every token for diagnostics

pub mod lexer;
pub mod tokens;
