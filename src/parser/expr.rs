use crate::{
    ast::{
        ast::{Expr, Identifier},
        expressions::{
            ArrayInitExpr, BinaryExpr, BinaryOperator, BoolLiteral, CallExpr, CharLiteral, FieldAccessExpr,
            FieldInit, FloatLiteral, FunctionLiteral, IndexExpr, IntLiteral, NullLiteral, ParenExpr,
            StringLiteral, StructInitExpr, StructInitTarget, UnaryExpr, UnaryOperator, VariableExpr,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
};

use super::{
    lookups::BindingPower,
    parser::Parser,
    stmt::parse_block,
    types::{parse_function_signature, parse_struct_type},
};

/// Parses an expression whose operators bind tighter than `bp`.
///
/// # Arguments
///
/// * `parser` - The parser, positioned at the first token of the expression
/// * `bp` - The binding power of the operator to the left, or `BindingPower::Default`
///
/// # Returns
///
/// The parsed expression. Each operator applied counts as one nesting level.
pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    parser.with_depth(|parser| {
        let token_kind = parser.current_token_kind();
        let nud_fn = match parser.get_nud_lookup().get(&token_kind) {
            Some(nud_fn) => *nud_fn,
            None => return Err(expected_expression(parser)),
        };

        let left = nud_fn(parser)?;

        let depth = parser.depth();
        let result = parse_led_chain(parser, left, bp);
        parser.restore_depth(depth);
        result
    })
}

/// While the next operator binds tighter than `bp`, it takes `left` as its left operand.
fn parse_led_chain(parser: &mut Parser, mut left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    loop {
        let token_kind = parser.current_token_kind();
        let next_bp = match parser.get_bp_lookup().get(&token_kind) {
            Some(next_bp) if *next_bp > bp => *next_bp,
            _ => break,
        };

        if token_kind == TokenKind::OpenCurly && !struct_init_follows(parser, &left) {
            break;
        }

        let led_fn = match parser.get_led_lookup().get(&token_kind) {
            Some(led_fn) => *led_fn,
            None => break,
        };

        parser.deepen()?;
        left = led_fn(parser, left, next_bp)?;
    }

    Ok(left)
}

fn expected_expression(parser: &Parser) -> Error {
    let token = parser.current_token();
    Error::new(
        ErrorImpl::ExpectedExpression {
            found: token.to_string(),
        },
        token.span.clone(),
    )
}

/// Decodes `0b`, `0o`, `0x` and decimal integer literals.
pub fn parse_int_literal(token: &Token) -> Result<IntLiteral, Error> {
    let text = token.value.as_str();
    let (digits, radix) = if let Some(digits) = text.strip_prefix("0b") {
        (digits, 2)
    } else if let Some(digits) = text.strip_prefix("0o") {
        (digits, 8)
    } else if let Some(digits) = text.strip_prefix("0x") {
        (digits, 16)
    } else {
        (text, 10)
    };

    match u64::from_str_radix(digits, radix) {
        Ok(value) => Ok(IntLiteral {
            value,
            text: token.value.clone(),
            span: token.span.clone(),
        }),
        Err(_) => Err(Error::new(
            ErrorImpl::NumberParseError {
                token: token.value.clone(),
            },
            token.span.clone(),
        )),
    }
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance().clone();

    let expr = match token.kind {
        TokenKind::Integer => Expr::Int(parse_int_literal(&token)?),
        TokenKind::Float => match token.value.parse::<f64>() {
            Ok(value) => Expr::Float(FloatLiteral {
                value,
                text: token.value,
                span: token.span,
            }),
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.span,
                ))
            }
        },
        TokenKind::String => Expr::String(StringLiteral {
            value: token.value,
            span: token.span,
        }),
        TokenKind::Char => match token.value.chars().next() {
            Some(value) => Expr::Char(CharLiteral {
                value,
                span: token.span,
            }),
            None => {
                return Err(Error::new(
                    ErrorImpl::InvalidCharLiteral { literal: token.value },
                    token.span,
                ))
            }
        },
        TokenKind::True | TokenKind::False => Expr::Bool(BoolLiteral {
            value: token.kind == TokenKind::True,
            span: token.span,
        }),
        TokenKind::Null => Expr::Null(NullLiteral { span: token.span }),
        TokenKind::Identifier => Expr::Variable(VariableExpr {
            span: token.span.clone(),
            name: Identifier {
                name: token.value,
                span: token.span,
            },
        }),
        _ => {
            return Err(Error::new(
                ErrorImpl::ExpectedExpression {
                    found: token.to_string(),
                },
                token.span,
            ))
        }
    };

    Ok(expr)
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let Some(operator) = BinaryOperator::from_token(parser.current_token_kind()) else {
        return Err(parser.unexpected_token("a binary operator"));
    };
    parser.advance();

    let right = parse_expr(parser, bp)?;

    Ok(Expr::Binary(BinaryExpr {
        span: left.get_span().to(right.get_span()),
        left: Box::new(left),
        operator,
        right: Box::new(right),
    }))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let Some(operator) = UnaryOperator::from_token(parser.current_token_kind()) else {
        return Err(expected_expression(parser));
    };
    let start = parser.advance().span.clone();

    let operand = parse_expr(parser, BindingPower::Unary)?;

    Ok(Expr::Unary(UnaryExpr {
        span: start.to(operand.get_span()),
        operator,
        operand: Box::new(operand),
    }))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.clone();

    let inner = parser.with_struct_literals(true, |parser| parse_expr(parser, BindingPower::Default))?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(Expr::Paren(ParenExpr {
        inner: Box::new(inner),
        span: parser.span_from(&start),
    }))
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();

    let arguments = parser.with_struct_literals(true, |parser| {
        let mut arguments = vec![];

        while !parser
            .current_token()
            .is_one_of_many(&[TokenKind::CloseParen, TokenKind::EOF])
        {
            arguments.push(parse_expr(parser, BindingPower::Default)?);

            if parser.current_token_kind() == TokenKind::Comma {
                parser.advance();
            } else {
                break;
            }
        }

        Ok(arguments)
    })?;

    parser.expect(TokenKind::CloseParen)?;

    Ok(Expr::Call(CallExpr {
        span: parser.span_from(left.get_span()),
        callee: Box::new(left),
        arguments,
    }))
}

pub fn parse_field_access_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let field = parser.expect_identifier()?;

    Ok(Expr::FieldAccess(FieldAccessExpr {
        span: left.get_span().to(&field.span),
        object: Box::new(left),
        field,
    }))
}

pub fn parse_index_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();

    let index = parser.with_struct_literals(true, |parser| parse_expr(parser, BindingPower::Default))?;
    parser.expect(TokenKind::CloseBracket)?;

    Ok(Expr::Index(IndexExpr {
        span: parser.span_from(left.get_span()),
        object: Box::new(left),
        index: Box::new(index),
    }))
}

/// Whether the `{` at the current token opens an initializer for `left`:
/// `left` names a struct and the braces hold `}` or `.field =` next.
fn struct_init_follows(parser: &Parser, left: &Expr) -> bool {
    if !parser.allows_struct_literals() || left.as_scope_path().is_none() {
        return false;
    }

    match parser.peek_kind(1) {
        TokenKind::CloseCurly => true,
        TokenKind::Dot => {
            parser.peek_kind(2) == TokenKind::Identifier && parser.peek_kind(3) == TokenKind::Assignment
        }
        _ => false,
    }
}

/// `{ .a = 1, .b = 2 }`, trailing comma allowed.
fn parse_field_inits(parser: &mut Parser) -> Result<Vec<FieldInit>, Error> {
    parser.expect(TokenKind::OpenCurly)?;

    let fields = parser.with_struct_literals(true, |parser| {
        let mut fields = vec![];

        while !parser
            .current_token()
            .is_one_of_many(&[TokenKind::CloseCurly, TokenKind::EOF])
        {
            let start = parser.expect(TokenKind::Dot)?.span;
            let name = parser.expect_identifier()?;
            parser.expect(TokenKind::Assignment)?;
            let value = parse_expr(parser, BindingPower::Default)?;

            fields.push(FieldInit {
                name,
                value,
                span: parser.span_from(&start),
            });

            if parser.current_token_kind() == TokenKind::Comma {
                parser.advance();
            } else {
                break;
            }
        }

        Ok(fields)
    })?;

    parser.expect(TokenKind::CloseCurly)?;
    Ok(fields)
}

pub fn parse_struct_init_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let Some(path) = left.as_scope_path() else {
        return Err(parser.unexpected_token("a struct name before `{`"));
    };

    let fields = parse_field_inits(parser)?;

    Ok(Expr::StructInit(StructInitExpr {
        span: parser.span_from(left.get_span()),
        target: StructInitTarget::Named(path),
        fields,
    }))
}

/// `struct { a: i32 } { .a = 1 }`
pub fn parse_inline_struct_init_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let struct_type = parse_struct_type(parser)?;
    let fields = parse_field_inits(parser)?;

    Ok(Expr::StructInit(StructInitExpr {
        span: parser.span_from(&struct_type.span),
        target: StructInitTarget::Inline(struct_type),
        fields,
    }))
}

pub fn parse_array_init_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.clone();

    let (elements, spread) = parser.with_struct_literals(true, |parser| {
        let mut elements = vec![];
        let mut spread = false;

        while !parser
            .current_token()
            .is_one_of_many(&[TokenKind::CloseBracket, TokenKind::EOF])
        {
            elements.push(parse_expr(parser, BindingPower::Default)?);

            // `...` may only follow the last element
            if parser.current_token_kind() == TokenKind::Ellipsis {
                parser.advance();
                spread = true;
                break;
            }

            if parser.current_token_kind() == TokenKind::Comma {
                parser.advance();
            } else {
                break;
            }
        }

        Ok((elements, spread))
    })?;

    parser.expect(TokenKind::CloseBracket)?;

    Ok(Expr::ArrayInit(ArrayInitExpr {
        elements,
        spread,
        span: parser.span_from(&start),
    }))
}

/// `fn(params) R { body }`. The body may only be left out where the parser
/// allows a bare signature (a top-level declaration's initializer).
pub fn parse_function_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let allow_signature = parser.take_function_signature();
    let signature = parse_function_signature(parser)?;

    if parser.current_token_kind() == TokenKind::OpenCurly {
        let body = parse_block(parser)?;
        return Ok(Expr::FunctionLiteral(FunctionLiteral {
            span: parser.span_from(&signature.span),
            signature,
            body,
        }));
    }

    if allow_signature {
        return Ok(Expr::FunctionSignature(signature));
    }

    Err(Error::new(
        ErrorImpl::MissingFunctionBody,
        parser.current_token().span.clone(),
    ))
}
