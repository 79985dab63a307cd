//! The femto abstract syntax tree.
//!
//! Submodules:
//! - ast: the `Stmt`, `Expr` and `Type` sum types, their tags, and shared name nodes
//! - expressions: expression nodes and operators
//! - statements: statement nodes, blocks and the source file root
//! - types: type expression nodes
//!
//! Every node records the span of the source text it was built from. Nodes
//! serialize with a `kind` tag per variant.
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
