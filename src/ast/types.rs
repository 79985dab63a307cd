//! Type expressions as written in source.
//!
//! These are purely syntactic: a `NamedType` is not resolved, and an array
//! length is the literal from the source. Downstream stages give them meaning.

use std::fmt::Display;

use serde::Serialize;

use crate::Span;

use super::{
    ast::{Identifier, ScopePath, Type},
    expressions::IntLiteral,
};

/// The builtin types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PrimitiveKind {
    Void,
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
}

impl PrimitiveKind {
    pub fn from_name(name: &str) -> Option<PrimitiveKind> {
        let kind = match name {
            "void" => PrimitiveKind::Void,
            "bool" => PrimitiveKind::Bool,
            "char" => PrimitiveKind::Char,
            "i8" => PrimitiveKind::I8,
            "i16" => PrimitiveKind::I16,
            "i32" => PrimitiveKind::I32,
            "i64" => PrimitiveKind::I64,
            "isize" => PrimitiveKind::Isize,
            "u8" => PrimitiveKind::U8,
            "u16" => PrimitiveKind::U16,
            "u32" => PrimitiveKind::U32,
            "u64" => PrimitiveKind::U64,
            "usize" => PrimitiveKind::Usize,
            "f32" => PrimitiveKind::F32,
            "f64" => PrimitiveKind::F64,
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::I8 => "i8",
            PrimitiveKind::I16 => "i16",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::Isize => "isize",
            PrimitiveKind::U8 => "u8",
            PrimitiveKind::U16 => "u16",
            PrimitiveKind::U32 => "u32",
            PrimitiveKind::U64 => "u64",
            PrimitiveKind::Usize => "usize",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
        }
    }
}

impl Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimitiveType {
    pub primitive: PrimitiveKind,
    pub span: Span,
}

/// `T*`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointerType {
    pub base: Box<Type>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "length")]
pub enum ArrayLength {
    /// `T[4]`
    Fixed(IntLiteral),
    /// `T[_]`, taken from the initializer
    Inferred { span: Span },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayType {
    pub element: Box<Type>,
    pub length: ArrayLength,
    pub span: Span,
}

/// `T[]`, or `T[*]` when `capacity` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceType {
    pub element: Box<Type>,
    pub capacity: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructMember {
    pub name: Identifier,
    pub ty: Type,
    pub span: Span,
}

/// `struct { a: T, b: U }`. Member names are unique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructType {
    pub members: Vec<StructMember>,
    pub span: Span,
}

impl StructType {
    pub fn get_member(&self, name: &str) -> Option<&StructMember> {
        self.members.iter().find(|member| member.name.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedType {
    pub path: ScopePath,
    pub span: Span,
}

/// A function parameter. A `None` name is the blank `_`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: Option<Identifier>,
    pub ty: Type,
    pub span: Span,
}

/// `fn(a: T, _: U) R`
///
/// Used both as a function type and as the header of a function literal. The
/// return type is optional here; requiring it is left to semantic analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionSignature {
    pub parameters: Vec<Parameter>,
    pub return_type: Option<Box<Type>>,
    pub span: Span,
}
