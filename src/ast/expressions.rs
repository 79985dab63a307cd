use std::fmt::Display;

use serde::Serialize;

use crate::{lexer::tokens::TokenKind, Span};

use super::{
    ast::{Expr, Identifier, ScopePath},
    statements::Block,
    types::{FunctionSignature, StructType},
};

// LITERALS

/// Integer literal. `text` keeps the source spelling (`0x1F`, `0b101`, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntLiteral {
    pub value: u64,
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloatLiteral {
    pub value: f64,
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoolLiteral {
    pub value: bool,
    pub span: Span,
}

/// String literal with its escapes decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringLiteral {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharLiteral {
    pub value: char,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NullLiteral {
    pub span: Span,
}

// NAMES

/// Variable Expression
/// A single identifier. Dotted names such as `io.stdout` parse as field
/// accesses on a variable; [`Expr::as_scope_path`] turns them back into a path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableExpr {
    pub name: Identifier,
    pub span: Span,
}

/// `fn(params) ReturnType { body }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionLiteral {
    pub signature: FunctionSignature,
    pub body: Block,
    pub span: Span,
}

// OPERATORS

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
    /// `-`
    Negate,
    /// `~`
    BitNot,
    /// `not`
    Not,
    /// `*`
    Deref,
    /// `&`
    AddressOf,
}

impl UnaryOperator {
    pub fn from_token(kind: TokenKind) -> Option<UnaryOperator> {
        let operator = match kind {
            TokenKind::Dash => UnaryOperator::Negate,
            TokenKind::Tilde => UnaryOperator::BitNot,
            TokenKind::Not => UnaryOperator::Not,
            TokenKind::Star => UnaryOperator::Deref,
            TokenKind::Ampersand => UnaryOperator::AddressOf,
            _ => return None,
        };
        Some(operator)
    }
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            UnaryOperator::Negate => "-",
            UnaryOperator::BitNot => "~",
            UnaryOperator::Not => "not ",
            UnaryOperator::Deref => "*",
            UnaryOperator::AddressOf => "&",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOperator {
    Or,
    And,
    Xor,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOperator {
    pub fn from_token(kind: TokenKind) -> Option<BinaryOperator> {
        let operator = match kind {
            TokenKind::Or => BinaryOperator::Or,
            TokenKind::And => BinaryOperator::And,
            TokenKind::Xor => BinaryOperator::Xor,
            TokenKind::Equals => BinaryOperator::Eq,
            TokenKind::NotEquals => BinaryOperator::Ne,
            TokenKind::Less => BinaryOperator::Lt,
            TokenKind::Greater => BinaryOperator::Gt,
            TokenKind::LessEquals => BinaryOperator::Le,
            TokenKind::GreaterEquals => BinaryOperator::Ge,
            TokenKind::Pipe => BinaryOperator::BitOr,
            TokenKind::Caret => BinaryOperator::BitXor,
            TokenKind::Ampersand => BinaryOperator::BitAnd,
            TokenKind::ShiftLeft => BinaryOperator::Shl,
            TokenKind::ShiftRight => BinaryOperator::Shr,
            TokenKind::Plus => BinaryOperator::Add,
            TokenKind::Dash => BinaryOperator::Sub,
            TokenKind::Star => BinaryOperator::Mul,
            TokenKind::Slash => BinaryOperator::Div,
            TokenKind::Percent => BinaryOperator::Rem,
            _ => return None,
        };
        Some(operator)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Or => "or",
            BinaryOperator::And => "and",
            BinaryOperator::Xor => "xor",
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Gt => ">",
            BinaryOperator::Le => "<=",
            BinaryOperator::Ge => ">=",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::Shl => "<<",
            BinaryOperator::Shr => ">>",
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Rem => "%",
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnaryExpr {
    pub operator: UnaryOperator,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: BinaryOperator,
    pub right: Box<Expr>,
    pub span: Span,
}

/// Parenthesised expression. Kept in the tree so it can be printed back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParenExpr {
    pub inner: Box<Expr>,
    pub span: Span,
}

// POSTFIX

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldAccessExpr {
    pub object: Box<Expr>,
    pub field: Identifier,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexExpr {
    pub object: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

// INITIALIZERS

/// What a struct initializer builds: a named struct or an inline struct type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "target")]
pub enum StructInitTarget {
    Named(ScopePath),
    Inline(StructType),
}

/// `.name = value`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldInit {
    pub name: Identifier,
    pub value: Expr,
    pub span: Span,
}

/// `Point { .x = 1, .y = 2 }`. Fields are kept in source order; duplicates are
/// not rejected here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructInitExpr {
    pub target: StructInitTarget,
    pub fields: Vec<FieldInit>,
    pub span: Span,
}

/// `[a, b, c]`, or `[a, b ...]` when `spread` is set (the last element repeats
/// to fill the array).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayInitExpr {
    pub elements: Vec<Expr>,
    pub spread: bool,
    pub span: Span,
}
