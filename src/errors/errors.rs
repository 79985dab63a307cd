use std::fmt::Display;

use serde::Serialize;
use thiserror::Error;

use crate::{Position, Span};

/// Broad error classes reported by the lexer and parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    LexError,
    TypeSyntaxError,
    ExpressionSyntaxError,
    StatementSyntaxError,
    UnexpectedToken,
    NestingTooDeep,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub type ParseError = Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{internal_error}")]
pub struct Error {
    internal_error: ErrorImpl,
    span: Span,
    /// Start of the innermost statement being parsed when the error occurred
    statement_start: Option<Position>,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, span: Span) -> Self {
        Error {
            internal_error: error_impl,
            span,
            statement_start: None,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.span.start
    }

    pub fn get_span(&self) -> &Span {
        &self.span
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_statement_start(&self) -> Option<&Position> {
        self.statement_start.as_ref()
    }

    /// Records the enclosing statement's start, keeping an innermost one already set.
    pub fn with_statement_start(mut self, start: Position) -> Self {
        if self.statement_start.is_none() {
            self.statement_start = Some(start);
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::UnterminatedLiteral { .. }
            | ErrorImpl::InvalidEscape { .. }
            | ErrorImpl::InvalidCharLiteral { .. } => ErrorKind::LexError,
            ErrorImpl::ExpectedType { .. } | ErrorImpl::DuplicateMember { .. } => {
                ErrorKind::TypeSyntaxError
            }
            ErrorImpl::ExpectedExpression { .. }
            | ErrorImpl::NumberParseError { .. }
            | ErrorImpl::MissingFunctionBody => ErrorKind::ExpressionSyntaxError,
            ErrorImpl::UnexpectedStatement { .. } => ErrorKind::StatementSyntaxError,
            ErrorImpl::UnexpectedToken { .. } => ErrorKind::UnexpectedToken,
            ErrorImpl::NestingTooDeep { .. } => ErrorKind::NestingTooDeep,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnterminatedLiteral { .. } => "UnterminatedLiteral",
            ErrorImpl::InvalidEscape { .. } => "InvalidEscape",
            ErrorImpl::InvalidCharLiteral { .. } => "InvalidCharLiteral",
            ErrorImpl::ExpectedType { .. } => "ExpectedType",
            ErrorImpl::DuplicateMember { .. } => "DuplicateMember",
            ErrorImpl::ExpectedExpression { .. } => "ExpectedExpression",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::MissingFunctionBody => "MissingFunctionBody",
            ErrorImpl::UnexpectedStatement { .. } => "UnexpectedStatement",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::NestingTooDeep { .. } => "NestingTooDeep",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnterminatedLiteral { literal } => ErrorTip::Suggestion(format!(
                "{} literal is never closed, is a closing quote missing?",
                literal
            )),
            ErrorImpl::InvalidEscape { sequence } => ErrorTip::Suggestion(format!(
                "Unknown escape `{}`, expected one of \\a \\b \\f \\n \\r \\t \\v \\' \\\" \\\\",
                sequence
            )),
            ErrorImpl::InvalidCharLiteral { literal } => ErrorTip::Suggestion(format!(
                "Character literal `{}` must contain exactly one character",
                literal
            )),
            ErrorImpl::ExpectedType { found } => ErrorTip::Suggestion(format!(
                "Expected a type (primitive, pointer, array, slice, struct, fn or name), found {}",
                found
            )),
            ErrorImpl::DuplicateMember { name } => {
                ErrorTip::Suggestion(format!("Struct member `{}` is declared twice", name))
            }
            ErrorImpl::ExpectedExpression { found } => {
                ErrorTip::Suggestion(format!("Expected an expression, found {}", found))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::MissingFunctionBody => ErrorTip::Suggestion(String::from(
                "Function literals need a `{ ... }` body unless they declare an external function",
            )),
            ErrorImpl::UnexpectedStatement { found, message } => {
                ErrorTip::Suggestion(format!("Unexpected {}, {}", found, message))
            }
            ErrorImpl::UnexpectedToken { expected, found } => {
                ErrorTip::Suggestion(format!("expected {}, found {}", expected, found))
            }
            ErrorImpl::NestingTooDeep { limit } => ErrorTip::Suggestion(format!(
                "Source nests deeper than {} levels, split it into smaller pieces",
                limit
            )),
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unterminated {literal} literal")]
    UnterminatedLiteral { literal: String },
    #[error("invalid escape sequence {sequence:?}")]
    InvalidEscape { sequence: String },
    #[error("invalid character literal {literal:?}")]
    InvalidCharLiteral { literal: String },
    #[error("expected a type, found {found}")]
    ExpectedType { found: String },
    #[error("duplicate struct member {name:?}")]
    DuplicateMember { name: String },
    #[error("expected an expression, found {found}")]
    ExpectedExpression { found: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("function literal is missing its body")]
    MissingFunctionBody,
    #[error("unexpected {found}: {message}")]
    UnexpectedStatement { found: String, message: String },
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("nesting exceeds the maximum depth of {limit}")]
    NestingTooDeep { limit: usize },
}
