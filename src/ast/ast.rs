use serde::Serialize;

use crate::Span;

use super::{
    expressions::{
        ArrayInitExpr, BinaryExpr, BoolLiteral, CallExpr, CharLiteral, FieldAccessExpr, FloatLiteral,
        FunctionLiteral, IndexExpr, IntLiteral, NullLiteral, ParenExpr, StringLiteral, StructInitExpr,
        UnaryExpr, UnaryOperator, VariableExpr,
    },
    statements::{
        AssignmentStmt, Block, BreakStmt, DeferStmt, IfStmt, ImportStmt, IncludeStmt, LoopStmt, ReturnStmt,
        TypeDeclStmt, VarDeclStmt, YieldStmt,
    },
    types::{ArrayType, FunctionSignature, NamedType, PointerType, PrimitiveType, SliceType, StructType},
};

/// Statement Types
#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize)]
pub enum StmtType {
    Import,
    Include,
    ConstDecl,
    MutDecl,
    TypeAlias,
    DistinctTypeDecl,
    Assignment,
    Call,
    Return,
    Break,
    Yield,
    Defer,
    If,
    For,
    Block,
}

/// A statement, without its annotations or terminating `;`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Stmt {
    Import(ImportStmt),
    Include(IncludeStmt),
    ConstDecl(VarDeclStmt),
    MutDecl(VarDeclStmt),
    TypeAlias(TypeDeclStmt),
    DistinctTypeDecl(TypeDeclStmt),
    Assignment(AssignmentStmt),
    Call(CallExpr),
    Return(ReturnStmt),
    Break(BreakStmt),
    Yield(YieldStmt),
    Defer(DeferStmt),
    If(IfStmt),
    For(LoopStmt),
    Block(Block),
}

impl Stmt {
    pub fn get_stmt_type(&self) -> StmtType {
        match self {
            Stmt::Import(_) => StmtType::Import,
            Stmt::Include(_) => StmtType::Include,
            Stmt::ConstDecl(_) => StmtType::ConstDecl,
            Stmt::MutDecl(_) => StmtType::MutDecl,
            Stmt::TypeAlias(_) => StmtType::TypeAlias,
            Stmt::DistinctTypeDecl(_) => StmtType::DistinctTypeDecl,
            Stmt::Assignment(_) => StmtType::Assignment,
            Stmt::Call(_) => StmtType::Call,
            Stmt::Return(_) => StmtType::Return,
            Stmt::Break(_) => StmtType::Break,
            Stmt::Yield(_) => StmtType::Yield,
            Stmt::Defer(_) => StmtType::Defer,
            Stmt::If(_) => StmtType::If,
            Stmt::For(_) => StmtType::For,
            Stmt::Block(_) => StmtType::Block,
        }
    }

    pub fn get_span(&self) -> &Span {
        match self {
            Stmt::Import(stmt) => &stmt.span,
            Stmt::Include(stmt) => &stmt.span,
            Stmt::ConstDecl(stmt) | Stmt::MutDecl(stmt) => &stmt.span,
            Stmt::TypeAlias(stmt) | Stmt::DistinctTypeDecl(stmt) => &stmt.span,
            Stmt::Assignment(stmt) => &stmt.span,
            Stmt::Call(expr) => &expr.span,
            Stmt::Return(stmt) => &stmt.span,
            Stmt::Break(stmt) => &stmt.span,
            Stmt::Yield(stmt) => &stmt.span,
            Stmt::Defer(stmt) => &stmt.span,
            Stmt::If(stmt) => &stmt.span,
            Stmt::For(stmt) => &stmt.span,
            Stmt::Block(block) => &block.span,
        }
    }

    /// Control-flow statements and blocks, which carry no terminating `;`.
    pub fn is_compound(&self) -> bool {
        matches!(self, Stmt::If(_) | Stmt::For(_) | Stmt::Block(_))
    }
}

/// Statement Wrapper
///
/// A statement together with the annotations prefixing it. The span covers the
/// annotations and the terminating `;`, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StmtWrapper {
    pub annotations: Vec<Annotation>,
    pub stmt: Stmt,
    pub span: Span,
}

impl StmtWrapper {
    pub fn get_stmt_type(&self) -> StmtType {
        self.stmt.get_stmt_type()
    }
}

/// Expression Types
#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize)]
pub enum ExprType {
    Int,
    Float,
    Bool,
    String,
    Char,
    Null,
    Variable,
    FunctionLiteral,
    FunctionSignature,
    Unary,
    Binary,
    Paren,
    Call,
    FieldAccess,
    Index,
    StructInit,
    ArrayInit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Expr {
    Int(IntLiteral),
    Float(FloatLiteral),
    Bool(BoolLiteral),
    String(StringLiteral),
    Char(CharLiteral),
    Null(NullLiteral),
    Variable(VariableExpr),
    FunctionLiteral(FunctionLiteral),
    /// A function header without a body. Only produced for a top-level
    /// declaration's initializer.
    FunctionSignature(FunctionSignature),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Paren(ParenExpr),
    Call(CallExpr),
    FieldAccess(FieldAccessExpr),
    Index(IndexExpr),
    StructInit(StructInitExpr),
    ArrayInit(ArrayInitExpr),
}

impl Expr {
    pub fn get_expr_type(&self) -> ExprType {
        match self {
            Expr::Int(_) => ExprType::Int,
            Expr::Float(_) => ExprType::Float,
            Expr::Bool(_) => ExprType::Bool,
            Expr::String(_) => ExprType::String,
            Expr::Char(_) => ExprType::Char,
            Expr::Null(_) => ExprType::Null,
            Expr::Variable(_) => ExprType::Variable,
            Expr::FunctionLiteral(_) => ExprType::FunctionLiteral,
            Expr::FunctionSignature(_) => ExprType::FunctionSignature,
            Expr::Unary(_) => ExprType::Unary,
            Expr::Binary(_) => ExprType::Binary,
            Expr::Paren(_) => ExprType::Paren,
            Expr::Call(_) => ExprType::Call,
            Expr::FieldAccess(_) => ExprType::FieldAccess,
            Expr::Index(_) => ExprType::Index,
            Expr::StructInit(_) => ExprType::StructInit,
            Expr::ArrayInit(_) => ExprType::ArrayInit,
        }
    }

    pub fn get_span(&self) -> &Span {
        match self {
            Expr::Int(expr) => &expr.span,
            Expr::Float(expr) => &expr.span,
            Expr::Bool(expr) => &expr.span,
            Expr::String(expr) => &expr.span,
            Expr::Char(expr) => &expr.span,
            Expr::Null(expr) => &expr.span,
            Expr::Variable(expr) => &expr.span,
            Expr::FunctionLiteral(expr) => &expr.span,
            Expr::FunctionSignature(expr) => &expr.span,
            Expr::Unary(expr) => &expr.span,
            Expr::Binary(expr) => &expr.span,
            Expr::Paren(expr) => &expr.span,
            Expr::Call(expr) => &expr.span,
            Expr::FieldAccess(expr) => &expr.span,
            Expr::Index(expr) => &expr.span,
            Expr::StructInit(expr) => &expr.span,
            Expr::ArrayInit(expr) => &expr.span,
        }
    }

    /// Whether the expression can be assigned to: a variable, a field access,
    /// an index or a dereference.
    pub fn is_lvalue(&self) -> bool {
        match self {
            Expr::Variable(_) | Expr::FieldAccess(_) | Expr::Index(_) => true,
            Expr::Unary(unary) => unary.operator == UnaryOperator::Deref,
            _ => false,
        }
    }

    /// The dotted path spelled by a variable or a chain of field accesses on
    /// one, e.g. `std.io.File`.
    pub fn as_scope_path(&self) -> Option<ScopePath> {
        match self {
            Expr::Variable(variable) => Some(ScopePath {
                segments: vec![variable.name.clone()],
                span: variable.span.clone(),
            }),
            Expr::FieldAccess(access) => {
                let mut path = access.object.as_scope_path()?;
                path.segments.push(access.field.clone());
                path.span = access.span.clone();
                Some(path)
            }
            _ => None,
        }
    }
}

/// Type Types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TypeType {
    Primitive,
    Pointer,
    Array,
    Slice,
    Struct,
    Named,
    Function,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Type {
    Primitive(PrimitiveType),
    Pointer(PointerType),
    Array(ArrayType),
    Slice(SliceType),
    Struct(StructType),
    Named(NamedType),
    Function(FunctionSignature),
}

impl Type {
    pub fn get_type_type(&self) -> TypeType {
        match self {
            Type::Primitive(_) => TypeType::Primitive,
            Type::Pointer(_) => TypeType::Pointer,
            Type::Array(_) => TypeType::Array,
            Type::Slice(_) => TypeType::Slice,
            Type::Struct(_) => TypeType::Struct,
            Type::Named(_) => TypeType::Named,
            Type::Function(_) => TypeType::Function,
        }
    }

    pub fn get_span(&self) -> &Span {
        match self {
            Type::Primitive(ty) => &ty.span,
            Type::Pointer(ty) => &ty.span,
            Type::Array(ty) => &ty.span,
            Type::Slice(ty) => &ty.span,
            Type::Struct(ty) => &ty.span,
            Type::Named(ty) => &ty.span,
            Type::Function(ty) => &ty.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

/// A non-empty dotted sequence of identifiers, e.g. `std.io.File`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopePath {
    pub segments: Vec<Identifier>,
    pub span: Span,
}

impl ScopePath {
    pub fn names(&self) -> Vec<&str> {
        self.segments.iter().map(|segment| segment.name.as_str()).collect()
    }

    pub fn is_simple(&self) -> bool {
        self.segments.len() == 1
    }
}

/// `@name` or `@scope.name` prefixing a statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub path: ScopePath,
    pub span: Span,
}
