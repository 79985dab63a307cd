use std::slice::Iter;

use serde::Serialize;

use crate::{lexer::tokens::TokenKind, Span};

use super::{
    ast::{Expr, Identifier, ScopePath, Stmt, StmtWrapper, Type},
    expressions::{BinaryOperator, StringLiteral},
};

/// `use a.b as c`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportStmt {
    pub path: ScopePath,
    pub alias: Option<Identifier>,
    pub span: Span,
}

/// `include "file.fm" as c`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncludeStmt {
    pub file: StringLiteral,
    pub alias: Option<Identifier>,
    pub span: Span,
}

/// `let name: T = value` or `let mut name: T = value`. Whether the binding is
/// mutable is carried by the enclosing `Stmt` variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDeclStmt {
    pub name: ScopePath,
    pub explicit_type: Option<Type>,
    pub assigned_value: Option<Expr>,
    pub span: Span,
}

/// `type Name = T` or `distinct type Name = T`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDeclStmt {
    pub name: ScopePath,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssignmentOperator {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
    BitOrAssign,
    BitAndAssign,
    BitXorAssign,
    ShlAssign,
    ShrAssign,
}

impl AssignmentOperator {
    pub fn from_token(kind: TokenKind) -> Option<AssignmentOperator> {
        let operator = match kind {
            TokenKind::Assignment => AssignmentOperator::Assign,
            TokenKind::PlusEquals => AssignmentOperator::AddAssign,
            TokenKind::MinusEquals => AssignmentOperator::SubAssign,
            TokenKind::StarEquals => AssignmentOperator::MulAssign,
            TokenKind::SlashEquals => AssignmentOperator::DivAssign,
            TokenKind::PercentEquals => AssignmentOperator::RemAssign,
            TokenKind::PipeEquals => AssignmentOperator::BitOrAssign,
            TokenKind::AmpersandEquals => AssignmentOperator::BitAndAssign,
            TokenKind::CaretEquals => AssignmentOperator::BitXorAssign,
            TokenKind::ShiftLeftEquals => AssignmentOperator::ShlAssign,
            TokenKind::ShiftRightEquals => AssignmentOperator::ShrAssign,
            _ => return None,
        };
        Some(operator)
    }

    /// The operator `lhs OP= rhs` abbreviates, or `None` for plain `=`.
    pub fn binary_operator(&self) -> Option<BinaryOperator> {
        let operator = match self {
            AssignmentOperator::Assign => return None,
            AssignmentOperator::AddAssign => BinaryOperator::Add,
            AssignmentOperator::SubAssign => BinaryOperator::Sub,
            AssignmentOperator::MulAssign => BinaryOperator::Mul,
            AssignmentOperator::DivAssign => BinaryOperator::Div,
            AssignmentOperator::RemAssign => BinaryOperator::Rem,
            AssignmentOperator::BitOrAssign => BinaryOperator::BitOr,
            AssignmentOperator::BitAndAssign => BinaryOperator::BitAnd,
            AssignmentOperator::BitXorAssign => BinaryOperator::BitXor,
            AssignmentOperator::ShlAssign => BinaryOperator::Shl,
            AssignmentOperator::ShrAssign => BinaryOperator::Shr,
        };
        Some(operator)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            AssignmentOperator::Assign => "=",
            AssignmentOperator::AddAssign => "+=",
            AssignmentOperator::SubAssign => "-=",
            AssignmentOperator::MulAssign => "*=",
            AssignmentOperator::DivAssign => "/=",
            AssignmentOperator::RemAssign => "%=",
            AssignmentOperator::BitOrAssign => "|=",
            AssignmentOperator::BitAndAssign => "&=",
            AssignmentOperator::BitXorAssign => "^=",
            AssignmentOperator::ShlAssign => "<<=",
            AssignmentOperator::ShrAssign => ">>=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentStmt {
    pub target: Expr,
    pub operator: AssignmentOperator,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakStmt {
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// `defer stmt`. The deferred statement is never an `if`, a `for` or a block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeferStmt {
    pub statement: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "branch")]
pub enum ElseBranch {
    If(Box<IfStmt>),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Block,
    pub else_branch: Option<ElseBranch>,
    pub span: Span,
}

/// First clause of a ranged loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "binding")]
pub enum LoopBinding {
    Const(VarDeclStmt),
    Mut(VarDeclStmt),
    Assignment(AssignmentStmt),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "form")]
pub enum LoopForm {
    /// `for { }`
    Forever,
    /// `for condition { }`
    Conditional { condition: Expr },
    /// `for binding; condition; afterthought { }`
    Ranged {
        binding: LoopBinding,
        condition: Expr,
        afterthought: AssignmentStmt,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopStmt {
    pub form: LoopForm,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "body")]
pub enum BlockBody {
    /// `{ expr }`
    Expression { expression: Box<Expr> },
    Statements { statements: Vec<StmtWrapper> },
}

/// `{ ... }`. `id` is unique within one parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub body: BlockBody,
    pub id: i32,
    pub span: Span,
}

impl Block {
    /// Statements of a statement block; empty for an expression-bodied block.
    pub fn statements(&self) -> &[StmtWrapper] {
        match &self.body {
            BlockBody::Statements { statements } => statements,
            BlockBody::Expression { .. } => &[],
        }
    }

    pub fn iter(&self) -> Iter<'_, StmtWrapper> {
        self.statements().iter()
    }

    pub fn expression(&self) -> Option<&Expr> {
        match &self.body {
            BlockBody::Expression { expression } => Some(expression),
            BlockBody::Statements { .. } => None,
        }
    }
}

/// Root of a parsed source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceFile {
    pub body: Vec<StmtWrapper>,
    pub span: Span,
}

impl SourceFile {
    pub fn iter(&self) -> Iter<'_, StmtWrapper> {
        self.body.iter()
    }
}
