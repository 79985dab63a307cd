use lazy_static::lazy_static;
use serde::Serialize;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    /// Reserved words. Keywords are never contextual: these spellings can't be identifiers.
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("let", TokenKind::Let);
        map.insert("mut", TokenKind::Mut);
        map.insert("type", TokenKind::Type);
        map.insert("distinct", TokenKind::Distinct);
        map.insert("use", TokenKind::Use);
        map.insert("include", TokenKind::Include);
        map.insert("as", TokenKind::As);
        map.insert("fn", TokenKind::Fn);
        map.insert("struct", TokenKind::Struct);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("for", TokenKind::For);
        map.insert("return", TokenKind::Return);
        map.insert("break", TokenKind::Break);
        map.insert("yield", TokenKind::Yield);
        map.insert("defer", TokenKind::Defer);
        map.insert("not", TokenKind::Not);
        map.insert("and", TokenKind::And);
        map.insert("or", TokenKind::Or);
        map.insert("xor", TokenKind::Xor);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map.insert("null", TokenKind::Null);

        for primitive in [
            "void", "bool", "char", "i8", "i16", "i32", "i64", "isize", "u8", "u16", "u32",
            "u64", "usize", "f32", "f64",
        ] {
            map.insert(primitive, TokenKind::Primitive);
        }
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize)]
pub enum TokenKind {
    EOF,
    Integer,
    Float,
    String,
    Char,
    Identifier,
    Primitive,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment,    // =
    Equals,        // ==
    NotEquals,     // !=
    Less,          // <
    LessEquals,    // <=
    Greater,       // >
    GreaterEquals, // >=

    Plus,
    Dash,
    Star,
    Slash,
    Percent,
    Pipe,
    Ampersand,
    Caret,
    Tilde,
    ShiftLeft,
    ShiftRight,

    PlusEquals,
    MinusEquals,
    StarEquals,
    SlashEquals,
    PercentEquals,
    PipeEquals,
    AmpersandEquals,
    CaretEquals,
    ShiftLeftEquals,
    ShiftRightEquals,

    Dot,
    Ellipsis,
    Comma,
    Semicolon,
    Colon,
    At,

    // Reserved
    Let,
    Mut,
    Type,
    Distinct,
    Use,
    Include,
    As,
    Fn,
    Struct,
    If,
    Else,
    For,
    Return,
    Break,
    Yield,
    Defer,
    Not,
    And,
    Or,
    Xor,
    True,
    False,
    Null,
}

impl TokenKind {
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            TokenKind::Assignment
                | TokenKind::PlusEquals
                | TokenKind::MinusEquals
                | TokenKind::StarEquals
                | TokenKind::SlashEquals
                | TokenKind::PercentEquals
                | TokenKind::PipeEquals
                | TokenKind::AmpersandEquals
                | TokenKind::CaretEquals
                | TokenKind::ShiftLeftEquals
                | TokenKind::ShiftRightEquals
        )
    }

    /// Source spelling for punctuation and keywords, used in "expected ..." messages.
    pub fn spelling(&self) -> Option<&'static str> {
        let text = match self {
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::OpenCurly => "{",
            TokenKind::CloseCurly => "}",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::Assignment => "=",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::Dot => ".",
            TokenKind::Ellipsis => "...",
            TokenKind::At => "@",
            TokenKind::Type => "type",
            TokenKind::Fn => "fn",
            TokenKind::Struct => "struct",
            _ => return None,
        };
        Some(text)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.spelling() {
            Some(text) => write!(f, "`{}`", text),
            None => match self {
                TokenKind::EOF => write!(f, "end of input"),
                TokenKind::Identifier => write!(f, "identifier"),
                TokenKind::String => write!(f, "string literal"),
                TokenKind::Integer => write!(f, "integer literal"),
                _ => write!(f, "{:?}", self),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::EOF => write!(f, "end of input"),
            TokenKind::String => write!(f, "string literal {:?}", self.value),
            _ => write!(f, "`{}`", self.value),
        }
    }
}

impl Token {
    pub fn is_one_of_many(&self, tokens: &[TokenKind]) -> bool {
        tokens.contains(&self.kind)
    }
}
