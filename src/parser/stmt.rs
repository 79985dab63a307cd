use crate::{
    ast::{
        ast::{Annotation, Expr, Identifier, Stmt, StmtWrapper},
        statements::{
            AssignmentOperator, AssignmentStmt, Block, BlockBody, BreakStmt, DeferStmt, ElseBranch, IfStmt,
            ImportStmt, IncludeStmt, LoopBinding, LoopForm, LoopStmt, ReturnStmt, TypeDeclStmt, VarDeclStmt,
            YieldStmt,
        },
        expressions::StringLiteral,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Span,
};

use super::{lookups::STATEMENT_START, parser::Parser, types::parse_type};

/// Parses one statement with its annotations and terminating `;`.
///
/// # Arguments
///
/// * `parser` - The parser, positioned at the first annotation or the statement's leading token
///
/// # Returns
///
/// The wrapped statement. Errors carry the start of the innermost statement being parsed.
pub fn parse_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.current_token().span.clone();

    parser
        .with_depth(|parser| {
            let annotations = parse_annotations(parser)?;
            let stmt = parse_stmt_kind(parser)?;
            finish_stmt(parser, annotations, stmt, &start)
        })
        .map_err(|error| error.with_statement_start(start.start.clone()))
}

fn finish_stmt(
    parser: &mut Parser,
    annotations: Vec<Annotation>,
    stmt: Stmt,
    start: &Span,
) -> Result<StmtWrapper, Error> {
    if !stmt.is_compound() {
        parser.expect(TokenKind::Semicolon)?;
    }

    Ok(StmtWrapper {
        annotations,
        stmt,
        span: parser.span_from(start),
    })
}

fn parse_annotations(parser: &mut Parser) -> Result<Vec<Annotation>, Error> {
    let mut annotations = vec![];

    while parser.current_token_kind() == TokenKind::At {
        let start = parser.advance().span.clone();
        let path = parser.expect_scope_path()?;

        annotations.push(Annotation {
            span: start.to(&path.span),
            path,
        });
    }

    Ok(annotations)
}

/// Dispatches on the leading token. Does not consume the terminating `;`.
fn parse_stmt_kind(parser: &mut Parser) -> Result<Stmt, Error> {
    let token_kind = parser.current_token_kind();

    if let Some(stmt_fn) = parser.get_stmt_lookup().get(&token_kind).copied() {
        return stmt_fn(parser);
    }

    let expr = parse_expr(parser, BindingPower::Default)?;
    finish_expression_stmt(parser, expr)
}

/// Turns an already parsed expression into an assignment or a call statement.
fn finish_expression_stmt(parser: &mut Parser, expr: Expr) -> Result<Stmt, Error> {
    if let Some(operator) = AssignmentOperator::from_token(parser.current_token_kind()) {
        return parse_assignment_rest(parser, expr, operator).map(Stmt::Assignment);
    }

    match expr {
        Expr::Call(call) => Ok(Stmt::Call(call)),
        other => Err(Error::new(
            ErrorImpl::UnexpectedStatement {
                found: format!("expression `{}`", other),
                message: String::from("only calls and assignments can be used as statements"),
            },
            other.get_span().clone(),
        )),
    }
}

fn parse_assignment_rest(
    parser: &mut Parser,
    target: Expr,
    operator: AssignmentOperator,
) -> Result<AssignmentStmt, Error> {
    if !target.is_lvalue() {
        return Err(Error::new(
            ErrorImpl::UnexpectedStatement {
                found: format!("`{}`", target),
                message: String::from("only variables, fields, indexes and dereferences can be assigned to"),
            },
            target.get_span().clone(),
        ));
    }

    parser.advance();
    let value = parse_expr(parser, BindingPower::Default)?;

    Ok(AssignmentStmt {
        span: target.get_span().to(value.get_span()),
        target,
        operator,
        value,
    })
}

fn parse_assignment(parser: &mut Parser) -> Result<AssignmentStmt, Error> {
    let target = parse_expr(parser, BindingPower::Default)?;

    match AssignmentOperator::from_token(parser.current_token_kind()) {
        Some(operator) => parse_assignment_rest(parser, target, operator),
        None => Err(parser.unexpected_token("an assignment operator")),
    }
}

pub fn parse_import_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.expect(TokenKind::Use)?.span;
    let path = parser.expect_scope_path()?;
    let alias = parse_alias(parser)?;

    Ok(Stmt::Import(ImportStmt {
        path,
        alias,
        span: parser.span_from(&start),
    }))
}

pub fn parse_include_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.expect(TokenKind::Include)?.span;
    let file = parser.expect(TokenKind::String)?;
    let alias = parse_alias(parser)?;

    Ok(Stmt::Include(IncludeStmt {
        file: StringLiteral {
            value: file.value,
            span: file.span,
        },
        alias,
        span: parser.span_from(&start),
    }))
}

fn parse_alias(parser: &mut Parser) -> Result<Option<Identifier>, Error> {
    if parser.current_token_kind() != TokenKind::As {
        return Ok(None);
    }

    parser.advance();
    Ok(Some(parser.expect_identifier()?))
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let allow_signature = parser.at_top_level();
    let (mutable, decl) = parse_var_decl(parser, allow_signature)?;

    if mutable {
        Ok(Stmt::MutDecl(decl))
    } else {
        Ok(Stmt::ConstDecl(decl))
    }
}

/// `let [mut] name [: T] [= value]`. Returns whether the binding is mutable.
fn parse_var_decl(parser: &mut Parser, allow_signature: bool) -> Result<(bool, VarDeclStmt), Error> {
    let start = parser.expect(TokenKind::Let)?.span;

    let mutable = parser.current_token_kind() == TokenKind::Mut;
    if mutable {
        parser.advance();
    }

    let name = parser.expect_scope_path()?;

    let explicit_type = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(parse_type(parser)?)
    } else {
        None
    };

    let assigned_value = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();

        if allow_signature && parser.current_token_kind() == TokenKind::Fn {
            parser.allow_function_signature();
        }
        let value = parse_expr(parser, BindingPower::Default);
        parser.take_function_signature();

        Some(value?)
    } else {
        None
    };

    Ok((
        mutable,
        VarDeclStmt {
            name,
            explicit_type,
            assigned_value,
            span: parser.span_from(&start),
        },
    ))
}

/// `type Name = T` or `distinct type Name = T`.
pub fn parse_type_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.current_token().span.clone();

    let distinct = parser.current_token_kind() == TokenKind::Distinct;
    if distinct {
        parser.advance();
    }

    parser.expect(TokenKind::Type)?;
    let name = parser.expect_scope_path()?;
    parser.expect(TokenKind::Assignment)?;
    let ty = parse_type(parser)?;

    let decl = TypeDeclStmt {
        name,
        ty,
        span: parser.span_from(&start),
    };

    if distinct {
        Ok(Stmt::DistinctTypeDecl(decl))
    } else {
        Ok(Stmt::TypeAlias(decl))
    }
}

fn parse_optional_value(parser: &mut Parser) -> Result<Option<Expr>, Error> {
    if parser
        .current_token()
        .is_one_of_many(&[TokenKind::Semicolon, TokenKind::CloseCurly, TokenKind::EOF])
    {
        return Ok(None);
    }

    Ok(Some(parse_expr(parser, BindingPower::Default)?))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.clone();
    let value = parse_optional_value(parser)?;

    Ok(Stmt::Return(ReturnStmt {
        value,
        span: parser.span_from(&start),
    }))
}

pub fn parse_yield_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.clone();
    let value = parse_optional_value(parser)?;

    Ok(Stmt::Yield(YieldStmt {
        value,
        span: parser.span_from(&start),
    }))
}

pub fn parse_break_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let span = parser.advance().span.clone();
    Ok(Stmt::Break(BreakStmt { span }))
}

/// `defer stmt`, where `stmt` is a simple statement.
pub fn parse_defer_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.clone();

    if parser
        .current_token()
        .is_one_of_many(&[TokenKind::If, TokenKind::For, TokenKind::OpenCurly])
    {
        let token = parser.current_token();
        return Err(Error::new(
            ErrorImpl::UnexpectedStatement {
                found: token.to_string(),
                message: String::from("`defer` only takes a simple statement, not a conditional, loop or block"),
            },
            token.span.clone(),
        ));
    }

    let statement = parser.with_depth(parse_stmt_kind)?;

    Ok(Stmt::Defer(DeferStmt {
        statement: Box::new(statement),
        span: parser.span_from(&start),
    }))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    parse_if(parser).map(Stmt::If)
}

fn parse_if(parser: &mut Parser) -> Result<IfStmt, Error> {
    let start = parser.expect(TokenKind::If)?.span;

    let condition = parser.with_struct_literals(false, |parser| parse_expr(parser, BindingPower::Default))?;
    let then_block = parse_block(parser)?;

    let else_branch = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();

        match parser.current_token_kind() {
            TokenKind::If => Some(ElseBranch::If(Box::new(parser.with_depth(parse_if)?))),
            TokenKind::OpenCurly => Some(ElseBranch::Block(parse_block(parser)?)),
            _ => return Err(parser.unexpected_token("`if` or `{` after `else`")),
        }
    } else {
        None
    };

    Ok(IfStmt {
        condition,
        then_block,
        else_branch,
        span: parser.span_from(&start),
    })
}

pub fn parse_for_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.expect(TokenKind::For)?.span;

    let form = parser.with_struct_literals(false, parse_loop_header)?;
    let body = parse_block(parser)?;

    Ok(Stmt::For(LoopStmt {
        form,
        body,
        span: parser.span_from(&start),
    }))
}

fn missing_loop_clause(parser: &Parser, clause: &str) -> Error {
    let token = parser.current_token();
    Error::new(
        ErrorImpl::UnexpectedStatement {
            found: token.to_string(),
            message: format!("a ranged `for` loop needs a {} clause", clause),
        },
        token.span.clone(),
    )
}

/// Everything between `for` and the body.
fn parse_loop_header(parser: &mut Parser) -> Result<LoopForm, Error> {
    match parser.current_token_kind() {
        TokenKind::OpenCurly => return Ok(LoopForm::Forever),
        TokenKind::Semicolon => return Err(missing_loop_clause(parser, "binding")),
        _ => {}
    }

    let binding = if parser.current_token_kind() == TokenKind::Let {
        match parse_var_decl(parser, false)? {
            (true, decl) => LoopBinding::Mut(decl),
            (false, decl) => LoopBinding::Const(decl),
        }
    } else {
        let expr = parse_expr(parser, BindingPower::Default)?;

        match AssignmentOperator::from_token(parser.current_token_kind()) {
            Some(operator) => LoopBinding::Assignment(parse_assignment_rest(parser, expr, operator)?),
            None if parser.current_token_kind() == TokenKind::Semicolon => {
                return Err(Error::new(
                    ErrorImpl::UnexpectedStatement {
                        found: format!("expression `{}`", expr),
                        message: String::from("the first clause of a ranged `for` loop must be a declaration or an assignment"),
                    },
                    expr.get_span().clone(),
                ));
            }
            None => return Ok(LoopForm::Conditional { condition: expr }),
        }
    };

    parser.expect(TokenKind::Semicolon)?;
    if parser.current_token_kind() == TokenKind::Semicolon {
        return Err(missing_loop_clause(parser, "condition"));
    }
    let condition = parse_expr(parser, BindingPower::Default)?;

    parser.expect(TokenKind::Semicolon)?;
    if parser.current_token_kind() == TokenKind::OpenCurly {
        return Err(missing_loop_clause(parser, "afterthought"));
    }
    let afterthought = parse_assignment(parser)?;

    Ok(LoopForm::Ranged {
        binding,
        condition,
        afterthought,
    })
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    parse_block(parser).map(Stmt::Block)
}

/// Parses `{ ... }`, either one trailing expression or a list of statements.
pub fn parse_block(parser: &mut Parser) -> Result<Block, Error> {
    parser.with_depth(|parser| {
        let start = parser.expect(TokenKind::OpenCurly)?.span;

        parser.enter_block();
        let body = parser.with_struct_literals(true, parse_block_body);
        parser.exit_block();
        let body = body?;

        parser.expect(TokenKind::CloseCurly)?;

        Ok(Block {
            body,
            id: parser.advance_id(),
            span: parser.span_from(&start),
        })
    })
}

fn parse_block_body(parser: &mut Parser) -> Result<BlockBody, Error> {
    let mut statements = vec![];

    // Not a statement keyword: the body starts with an expression, which is
    // either the whole body or the start of the first statement
    if !at_block_end(parser) && !parser.current_token().is_one_of_many(&STATEMENT_START) {
        let start = parser.current_token().span.clone();

        let first = match parse_expr(parser, BindingPower::Default) {
            Ok(expr) if parser.current_token_kind() == TokenKind::CloseCurly => {
                return Ok(BlockBody::Expression {
                    expression: Box::new(expr),
                });
            }
            Ok(expr) => match finish_expression_stmt(parser, expr) {
                Ok(stmt) => finish_stmt(parser, vec![], stmt, &start),
                Err(error) => Err(error),
            },
            Err(error) => Err(error),
        };

        statements.push(first.map_err(|error| error.with_statement_start(start.start.clone()))?);
    }

    while !at_block_end(parser) {
        statements.push(parse_stmt(parser)?);
    }

    Ok(BlockBody::Statements { statements })
}

fn at_block_end(parser: &Parser) -> bool {
    parser
        .current_token()
        .is_one_of_many(&[TokenKind::CloseCurly, TokenKind::EOF])
}
