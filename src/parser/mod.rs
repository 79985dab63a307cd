//! Parser module for building the femto AST.
//!
//! Transforms a token stream into a [`SourceFile`](crate::ast::statements::SourceFile).
//! It uses a Pratt parser for expressions, with binding powers for operator
//! precedence, and handles:
//!
//! - Statement parsing (declarations, assignments, control flow, `defer`)
//! - Block parsing (expression-bodied or statement lists)
//! - Expression parsing (operators, postfix chains, literals, initializers)
//! - Type parsing, including the bracketed array and slice suffixes
//! - Statement-level error recovery
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;

#[cfg(test)]
mod tests;
