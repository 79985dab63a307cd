//! Type parsing.
//!
//! A type starts with a token from the type NUD table (a primitive, a name,
//! `struct` or `fn`) and is followed by any number of `*` and bracket
//! suffixes, applied left to right.

use std::collections::{HashMap, HashSet};

use crate::{
    ast::{
        ast::Type,
        types::{
            ArrayLength, ArrayType, FunctionSignature, NamedType, Parameter, PointerType, PrimitiveKind,
            PrimitiveType, SliceType, StructMember, StructType,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{expr::parse_int_literal, parser::Parser};

pub type TypeNUDHandler = fn(&mut Parser) -> Result<Type, Error>;

pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Primitive, parse_primitive_type);
    parser.type_nud(TokenKind::Identifier, parse_named_type);
    parser.type_nud(TokenKind::Struct, |parser| Ok(Type::Struct(parse_struct_type(parser)?)));
    parser.type_nud(TokenKind::Fn, |parser| Ok(Type::Function(parse_function_signature(parser)?)));
}

pub fn can_start_type(parser: &Parser) -> bool {
    parser.get_type_nud_lookup().contains_key(&parser.current_token_kind())
}

/// Parses a type and its suffixes.
///
/// # Arguments
///
/// * `parser` - The parser, positioned at a token from the type NUD table
///
/// # Returns
///
/// The type, or `ExpectedType` if the current token cannot start one.
pub fn parse_type(parser: &mut Parser) -> Result<Type, Error> {
    parser.with_depth(|parser| {
        let token_kind = parser.current_token_kind();
        let nud_fn = match parser.get_type_nud_lookup().get(&token_kind) {
            Some(nud_fn) => *nud_fn,
            None => {
                let token = parser.current_token();
                return Err(Error::new(
                    ErrorImpl::ExpectedType {
                        found: token.to_string(),
                    },
                    token.span.clone(),
                ));
            }
        };

        let base = nud_fn(parser)?;

        let depth = parser.depth();
        let result = parse_type_suffixes(parser, base);
        parser.restore_depth(depth);
        result
    })
}

/// Applies `*` and bracket suffixes to `left`, one nesting level each.
fn parse_type_suffixes(parser: &mut Parser, mut left: Type) -> Result<Type, Error> {
    loop {
        match parser.current_token_kind() {
            TokenKind::Star => {
                parser.deepen()?;
                parser.advance();
                left = Type::Pointer(PointerType {
                    span: parser.span_from(left.get_span()),
                    base: Box::new(left),
                });
            }
            TokenKind::OpenBracket => {
                parser.deepen()?;
                match parse_bracket_suffix(parser, left)? {
                    Ok(ty) => left = ty,
                    Err(base) => return Ok(base),
                }
            }
            _ => break,
        }
    }

    Ok(left)
}

/// Parses `[]`, `[*]`, `[N]` or `[_]` after `base`.
///
/// Anything else inside the brackets is not a type suffix: the parser is
/// rewound to the `[` and `base` is handed back unchanged as `Err`.
fn parse_bracket_suffix(parser: &mut Parser, base: Type) -> Result<Result<Type, Type>, Error> {
    let checkpoint = parser.checkpoint();
    parser.advance();

    let suffix = match (parser.current_token_kind(), parser.peek_kind(1)) {
        (TokenKind::CloseBracket, _) => Some(None),
        (TokenKind::Star, TokenKind::CloseBracket) => {
            parser.advance();
            Some(Some(true))
        }
        (TokenKind::Integer, TokenKind::CloseBracket) => {
            let length = parse_int_literal(parser.current_token())?;
            parser.advance();
            return finish_array(parser, base, ArrayLength::Fixed(length)).map(Ok);
        }
        (TokenKind::Identifier, TokenKind::CloseBracket) if parser.current_token().value == "_" => {
            let span = parser.advance().span.clone();
            return finish_array(parser, base, ArrayLength::Inferred { span }).map(Ok);
        }
        _ => None,
    };

    match suffix {
        Some(capacity) => {
            parser.expect(TokenKind::CloseBracket)?;
            Ok(Ok(Type::Slice(SliceType {
                span: parser.span_from(base.get_span()),
                element: Box::new(base),
                capacity: capacity.unwrap_or(false),
            })))
        }
        None => {
            parser.rewind(checkpoint);
            Ok(Err(base))
        }
    }
}

fn finish_array(parser: &mut Parser, element: Type, length: ArrayLength) -> Result<Type, Error> {
    parser.expect(TokenKind::CloseBracket)?;
    Ok(Type::Array(ArrayType {
        span: parser.span_from(element.get_span()),
        element: Box::new(element),
        length,
    }))
}

pub fn parse_primitive_type(parser: &mut Parser) -> Result<Type, Error> {
    let token = parser.expect(TokenKind::Primitive)?;

    match PrimitiveKind::from_name(&token.value) {
        Some(primitive) => Ok(Type::Primitive(PrimitiveType {
            primitive,
            span: token.span,
        })),
        None => Err(Error::new(
            ErrorImpl::ExpectedType {
                found: token.to_string(),
            },
            token.span,
        )),
    }
}

pub fn parse_named_type(parser: &mut Parser) -> Result<Type, Error> {
    let path = parser.expect_scope_path()?;
    Ok(Type::Named(NamedType {
        span: path.span.clone(),
        path,
    }))
}

/// `struct { a: T, b: U }`, trailing comma optional. Member names must be unique.
pub fn parse_struct_type(parser: &mut Parser) -> Result<StructType, Error> {
    let start = parser.expect(TokenKind::Struct)?.span;
    parser.expect(TokenKind::OpenCurly)?;

    let mut members: Vec<StructMember> = vec![];
    let mut names = HashSet::new();

    while !parser
        .current_token()
        .is_one_of_many(&[TokenKind::CloseCurly, TokenKind::EOF])
    {
        let name = parser.expect_identifier()?;
        if !names.insert(name.name.clone()) {
            return Err(Error::new(
                ErrorImpl::DuplicateMember { name: name.name },
                name.span,
            ));
        }

        parser.expect(TokenKind::Colon)?;
        let ty = parse_type(parser)?;

        members.push(StructMember {
            span: name.span.to(ty.get_span()),
            name,
            ty,
        });

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(StructType {
        members,
        span: parser.span_from(&start),
    })
}

/// `fn(a: T, _: U) R`. The return type is present when a type follows `)`.
pub fn parse_function_signature(parser: &mut Parser) -> Result<FunctionSignature, Error> {
    let start = parser.expect(TokenKind::Fn)?.span;
    parser.expect(TokenKind::OpenParen)?;

    let mut parameters = vec![];

    while !parser
        .current_token()
        .is_one_of_many(&[TokenKind::CloseParen, TokenKind::EOF])
    {
        let name = parser.expect_identifier()?;
        parser.expect(TokenKind::Colon)?;
        let ty = parse_type(parser)?;

        parameters.push(Parameter {
            span: name.span.to(ty.get_span()),
            name: if name.name == "_" { None } else { Some(name) },
            ty,
        });

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    let return_type = if can_start_type(parser) {
        Some(Box::new(parse_type(parser)?))
    } else {
        None
    };

    Ok(FunctionSignature {
        parameters,
        return_type,
        span: parser.span_from(&start),
    })
}
