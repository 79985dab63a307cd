//! Error types and error handling for the parser.
//!
//! This module defines the error types produced while lexing and parsing
//! femto source. It includes:
//!
//! - Error structures with source span information
//! - Specific error variants, grouped into the kinds callers match on
//! - Helpful error messages and suggestions

pub mod errors;
