//! Unit tests for the parser module.
//!
//! This module contains tests for parsing:
//! - Operator precedence and postfix chains
//! - Literals, struct and array initializers, function literals
//! - Types
//! - Declarations, control flow and blocks
//! - Errors, nesting limits and recovery

use super::parser::{parse, parse_recovering};
use crate::{
    ast::{
        ast::{Expr, Stmt, Type},
        expressions::{BinaryOperator, StructInitTarget, UnaryOperator},
        statements::{AssignmentOperator, BlockBody, ElseBranch, LoopBinding, LoopForm, SourceFile},
        types::{ArrayLength, PrimitiveKind},
    },
    config::ParserConfig,
    errors::errors::{Error, ErrorImpl, ErrorKind},
    lexer::lexer::tokenize,
    Span,
};

fn parse_source(source: &str) -> Result<SourceFile, Error> {
    let tokens = tokenize(source.to_string(), Some("test.fm".to_string())).unwrap();
    let (_, result) = parse(tokens, &ParserConfig::default().with_file_name("test.fm"));
    result
}

fn parse_ok(source: &str) -> SourceFile {
    match parse_source(source) {
        Ok(file) => file,
        Err(error) => panic!("failed to parse {:?}: {}", source, error),
    }
}

fn parse_err(source: &str) -> Error {
    match parse_source(source) {
        Ok(file) => panic!("expected {:?} to fail, got {:?}", source, file),
        Err(error) => error,
    }
}

/// Parses `let x = <source>;` and returns the initializer.
fn expr(source: &str) -> Expr {
    let file = parse_ok(&format!("let x = {};", source));
    match &file.body[0].stmt {
        Stmt::ConstDecl(decl) => decl.assigned_value.clone().unwrap(),
        other => panic!("expected a declaration, got {:?}", other),
    }
}

/// Parses `let x: <source>;` and returns the type.
fn ty(source: &str) -> Type {
    let file = parse_ok(&format!("let x: {};", source));
    match &file.body[0].stmt {
        Stmt::ConstDecl(decl) => decl.explicit_type.clone().unwrap(),
        other => panic!("expected a declaration, got {:?}", other),
    }
}

fn binary(expr: &Expr) -> (&Expr, BinaryOperator, &Expr) {
    match expr {
        Expr::Binary(binary) => (&binary.left, binary.operator, &binary.right),
        other => panic!("expected a binary expression, got {:?}", other),
    }
}

fn variable_name(expr: &Expr) -> &str {
    match expr {
        Expr::Variable(variable) => &variable.name.name,
        other => panic!("expected a variable, got {:?}", other),
    }
}

fn int_value(expr: &Expr) -> u64 {
    match expr {
        Expr::Int(int) => int.value,
        other => panic!("expected an integer, got {:?}", other),
    }
}

#[test]
fn test_parse_or_binds_looser_than_and() {
    let parsed = expr("a or b and c");
    let (left, operator, right) = binary(&parsed);

    assert_eq!(operator, BinaryOperator::Or);
    assert_eq!(variable_name(left), "a");

    let (left, operator, right) = binary(right);
    assert_eq!(operator, BinaryOperator::And);
    assert_eq!(variable_name(left), "b");
    assert_eq!(variable_name(right), "c");
}

#[test]
fn test_parse_multiplication_binds_tighter() {
    let parsed = expr("a + b * c");
    let (left, operator, right) = binary(&parsed);

    assert_eq!(operator, BinaryOperator::Add);
    assert_eq!(variable_name(left), "a");
    assert_eq!(binary(right).1, BinaryOperator::Mul);
}

#[test]
fn test_parse_subtraction_is_left_associative() {
    let parsed = expr("1 - 2 - 3");
    let (left, operator, right) = binary(&parsed);

    assert_eq!(operator, BinaryOperator::Sub);
    assert_eq!(int_value(right), 3);

    let (left, operator, right) = binary(left);
    assert_eq!(operator, BinaryOperator::Sub);
    assert_eq!(int_value(left), 1);
    assert_eq!(int_value(right), 2);
}

#[test]
fn test_parse_comparisons_chain_left_to_right() {
    let parsed = expr("a == b < c");
    let (left, operator, right) = binary(&parsed);

    assert_eq!(operator, BinaryOperator::Lt);
    assert_eq!(variable_name(right), "c");
    assert_eq!(binary(left).1, BinaryOperator::Eq);
}

#[test]
fn test_parse_xor_between_and_and_comparisons() {
    let parsed = expr("a and b xor c or d");
    let (left, operator, right) = binary(&parsed);

    assert_eq!(operator, BinaryOperator::Or);
    assert_eq!(variable_name(right), "d");

    let (left, operator, right) = binary(left);
    assert_eq!(operator, BinaryOperator::And);
    assert_eq!(variable_name(left), "a");
    assert_eq!(binary(right).1, BinaryOperator::Xor);
}

#[test]
fn test_parse_bitwise_ladder() {
    let parsed = expr("a | b ^ c & d << 1");
    let (_, operator, right) = binary(&parsed);
    assert_eq!(operator, BinaryOperator::BitOr);

    let (_, operator, right) = binary(right);
    assert_eq!(operator, BinaryOperator::BitXor);

    let (_, operator, right) = binary(right);
    assert_eq!(operator, BinaryOperator::BitAnd);
    assert_eq!(binary(right).1, BinaryOperator::Shl);
}

#[test]
fn test_parse_prefix_operators() {
    let parsed = expr("-a * b");
    let (left, operator, _) = binary(&parsed);
    assert_eq!(operator, BinaryOperator::Mul);
    assert!(matches!(left, Expr::Unary(unary) if unary.operator == UnaryOperator::Negate));

    let parsed = expr("not a and b");
    let (left, operator, _) = binary(&parsed);
    assert_eq!(operator, BinaryOperator::And);
    assert!(matches!(left, Expr::Unary(unary) if unary.operator == UnaryOperator::Not));

    match expr("*p.x") {
        Expr::Unary(unary) => {
            assert_eq!(unary.operator, UnaryOperator::Deref);
            assert!(matches!(*unary.operand, Expr::FieldAccess(_)));
        }
        other => panic!("expected a dereference, got {:?}", other),
    }

    match expr("&~x") {
        Expr::Unary(unary) => {
            assert_eq!(unary.operator, UnaryOperator::AddressOf);
            assert!(matches!(*unary.operand, Expr::Unary(ref inner) if inner.operator == UnaryOperator::BitNot));
        }
        other => panic!("expected address-of, got {:?}", other),
    }
}

#[test]
fn test_parse_postfix_chain() {
    let call = match expr("a.b[0](c)") {
        Expr::Call(call) => call,
        other => panic!("expected a call, got {:?}", other),
    };

    assert_eq!(call.arguments.len(), 1);
    assert_eq!(variable_name(&call.arguments[0]), "c");

    let index = match call.callee.as_ref() {
        Expr::Index(index) => index,
        other => panic!("expected an index, got {:?}", other),
    };
    assert_eq!(int_value(&index.index), 0);

    match index.object.as_ref() {
        Expr::FieldAccess(access) => {
            assert_eq!(variable_name(&access.object), "a");
            assert_eq!(access.field.name, "b");
        }
        other => panic!("expected a field access, got {:?}", other),
    }

    let path = index.object.as_scope_path().unwrap();
    assert_eq!(path.names(), vec!["a", "b"]);
}

#[test]
fn test_parse_parentheses_reset_precedence() {
    let parsed = expr("(a + b) * c");
    let (left, operator, _) = binary(&parsed);

    assert_eq!(operator, BinaryOperator::Mul);
    match left {
        Expr::Paren(paren) => assert_eq!(binary(&paren.inner).1, BinaryOperator::Add),
        other => panic!("expected parentheses, got {:?}", other),
    }
}

#[test]
fn test_parse_integer_literals() {
    assert_eq!(int_value(&expr("0x1F")), 31);
    assert_eq!(int_value(&expr("0b101")), 5);
    assert_eq!(int_value(&expr("0o17")), 15);
    assert_eq!(int_value(&expr("1234")), 1234);

    match expr("0x1F") {
        Expr::Int(int) => assert_eq!(int.text, "0x1F"),
        other => panic!("expected an integer, got {:?}", other),
    }
}

#[test]
fn test_parse_other_literals() {
    assert!(matches!(expr("2.5e3"), Expr::Float(float) if float.value == 2500.0));
    assert!(matches!(expr("true"), Expr::Bool(boolean) if boolean.value));
    assert!(matches!(expr("null"), Expr::Null(_)));
    assert!(matches!(expr(r"'\n'"), Expr::Char(character) if character.value == '\n'));
    assert!(matches!(expr(r#""a\tb""#), Expr::String(string) if string.value == "a\tb"));
}

#[test]
fn test_parse_integer_overflow() {
    let error = parse_err("let x = 99999999999999999999;");

    assert_eq!(error.kind(), ErrorKind::ExpressionSyntaxError);
    assert!(matches!(error.get_impl(), ErrorImpl::NumberParseError { .. }));
}

#[test]
fn test_parse_struct_init_keeps_duplicate_fields() {
    let init = match expr("Point { .x = 1, .x = 2 }") {
        Expr::StructInit(init) => init,
        other => panic!("expected a struct initializer, got {:?}", other),
    };

    match &init.target {
        StructInitTarget::Named(path) => assert_eq!(path.names(), vec!["Point"]),
        other => panic!("expected a named target, got {:?}", other),
    }

    assert_eq!(init.fields.len(), 2);
    assert_eq!(init.fields[0].name.name, "x");
    assert_eq!(int_value(&init.fields[0].value), 1);
    assert_eq!(init.fields[1].name.name, "x");
    assert_eq!(int_value(&init.fields[1].value), 2);
}

#[test]
fn test_parse_struct_init_forms() {
    match expr("geo.Point {}") {
        Expr::StructInit(init) => {
            assert!(init.fields.is_empty());
            assert!(matches!(&init.target, StructInitTarget::Named(path) if path.names() == vec!["geo", "Point"]));
        }
        other => panic!("expected a struct initializer, got {:?}", other),
    }

    match expr("struct { a: i32, b: bool } { .a = 1, .b = true, }") {
        Expr::StructInit(init) => {
            assert_eq!(init.fields.len(), 2);
            match &init.target {
                StructInitTarget::Inline(struct_type) => {
                    assert_eq!(struct_type.members.len(), 2);
                    assert!(struct_type.get_member("b").is_some());
                }
                other => panic!("expected an inline struct, got {:?}", other),
            }
        }
        other => panic!("expected a struct initializer, got {:?}", other),
    }
}

#[test]
fn test_parse_array_init() {
    match expr("[1, 2, 3 ...]") {
        Expr::ArrayInit(array) => {
            assert_eq!(array.elements.len(), 3);
            assert!(array.spread);
        }
        other => panic!("expected an array, got {:?}", other),
    }

    match expr("[1, 2,]") {
        Expr::ArrayInit(array) => {
            assert_eq!(array.elements.len(), 2);
            assert!(!array.spread);
        }
        other => panic!("expected an array, got {:?}", other),
    }

    assert!(matches!(expr("[]"), Expr::ArrayInit(array) if array.elements.is_empty()));

    let error = parse_err("let x = [1 ..., 2];");
    assert_eq!(error.kind(), ErrorKind::UnexpectedToken);
}

#[test]
fn test_parse_function_literal() {
    let function = match expr("fn(a: i32, _: u8) i32 { a }") {
        Expr::FunctionLiteral(function) => function,
        other => panic!("expected a function literal, got {:?}", other),
    };

    let parameters = &function.signature.parameters;
    assert_eq!(parameters.len(), 2);
    assert_eq!(parameters[0].name.as_ref().unwrap().name, "a");
    assert!(parameters[1].name.is_none());

    assert!(matches!(
        function.signature.return_type.as_deref(),
        Some(Type::Primitive(primitive)) if primitive.primitive == PrimitiveKind::I32
    ));
    assert!(function.body.expression().is_some());
}

#[test]
fn test_parse_function_signature_only_at_top_level() {
    let file = parse_ok("let puts = fn(s: char*) i32;");
    match &file.body[0].stmt {
        Stmt::ConstDecl(decl) => assert!(matches!(decl.assigned_value, Some(Expr::FunctionSignature(_)))),
        other => panic!("expected a declaration, got {:?}", other),
    }

    let error = parse_err("{ let puts = fn(s: char*) i32; }");
    assert!(matches!(error.get_impl(), ErrorImpl::MissingFunctionBody));
    assert_eq!(error.kind(), ErrorKind::ExpressionSyntaxError);

    let error = parse_err("let puts = (fn(s: char*) i32);");
    assert!(matches!(error.get_impl(), ErrorImpl::MissingFunctionBody));

    let error = parse_err("f(fn() void);");
    assert!(matches!(error.get_impl(), ErrorImpl::MissingFunctionBody));
}

#[test]
fn test_parse_pointer_types_chain() {
    match ty("i32**") {
        Type::Pointer(outer) => match *outer.base {
            Type::Pointer(inner) => {
                assert!(matches!(*inner.base, Type::Primitive(ref p) if p.primitive == PrimitiveKind::I32))
            }
            other => panic!("expected a pointer, got {:?}", other),
        },
        other => panic!("expected a pointer, got {:?}", other),
    }
}

#[test]
fn test_parse_bracket_types() {
    assert!(matches!(ty("u8[]"), Type::Slice(slice) if !slice.capacity));
    assert!(matches!(ty("u8[*]"), Type::Slice(slice) if slice.capacity));
    assert!(matches!(ty("u8[_]"), Type::Array(array) if matches!(array.length, ArrayLength::Inferred { .. })));

    match ty("i32*[3]") {
        Type::Array(array) => {
            assert!(matches!(array.length, ArrayLength::Fixed(ref length) if length.value == 3));
            assert!(matches!(*array.element, Type::Pointer(_)));
        }
        other => panic!("expected an array, got {:?}", other),
    }
}

#[test]
fn test_parse_named_struct_and_function_types() {
    assert!(matches!(ty("std.io.File*"), Type::Pointer(pointer) if matches!(*pointer.base, Type::Named(_))));

    match ty("fn(_: i32, b: bool*) void") {
        Type::Function(signature) => {
            assert_eq!(signature.parameters.len(), 2);
            assert!(signature.return_type.is_some());
        }
        other => panic!("expected a function type, got {:?}", other),
    }

    match ty("struct { x: f32, y: f32 }") {
        Type::Struct(struct_type) => assert_eq!(struct_type.members.len(), 2),
        other => panic!("expected a struct type, got {:?}", other),
    }
}

#[test]
fn test_parse_type_errors() {
    let error = parse_err("type P = struct { x: i32, x: i32 };");
    assert_eq!(error.kind(), ErrorKind::TypeSyntaxError);
    assert!(matches!(error.get_impl(), ErrorImpl::DuplicateMember { name } if name == "x"));

    let error = parse_err("let x: 5;");
    assert_eq!(error.kind(), ErrorKind::TypeSyntaxError);
    assert!(matches!(error.get_impl(), ErrorImpl::ExpectedType { .. }));
}

#[test]
fn test_parse_declarations() {
    let file = parse_ok(
        "use std.io as io;\n\
         include \"lib.fm\";\n\
         type Id = u32;\n\
         distinct type Meters = f64;\n\
         let mut a.b = 1;\n\
         let c;",
    );

    match &file.body[0].stmt {
        Stmt::Import(import) => {
            assert_eq!(import.path.names(), vec!["std", "io"]);
            assert_eq!(import.alias.as_ref().unwrap().name, "io");
        }
        other => panic!("expected an import, got {:?}", other),
    }

    assert!(matches!(&file.body[1].stmt, Stmt::Include(include) if include.file.value == "lib.fm" && include.alias.is_none()));
    assert!(matches!(&file.body[2].stmt, Stmt::TypeAlias(decl) if decl.name.is_simple()));
    assert!(matches!(&file.body[3].stmt, Stmt::DistinctTypeDecl(_)));

    match &file.body[4].stmt {
        Stmt::MutDecl(decl) => {
            assert_eq!(decl.name.names(), vec!["a", "b"]);
            assert!(decl.explicit_type.is_none());
        }
        other => panic!("expected a mutable declaration, got {:?}", other),
    }

    assert!(matches!(&file.body[5].stmt, Stmt::ConstDecl(decl) if decl.assigned_value.is_none()));
}

#[test]
fn test_parse_assignments() {
    let file = parse_ok("x += 1; a[0] = 2; *p = 3; s.f <<= 4;");

    let operators: Vec<AssignmentOperator> = file
        .iter()
        .map(|stmt| match &stmt.stmt {
            Stmt::Assignment(assignment) => assignment.operator,
            other => panic!("expected an assignment, got {:?}", other),
        })
        .collect();

    assert_eq!(
        operators,
        vec![
            AssignmentOperator::AddAssign,
            AssignmentOperator::Assign,
            AssignmentOperator::Assign,
            AssignmentOperator::ShlAssign,
        ]
    );
    assert_eq!(operators[0].binary_operator(), Some(BinaryOperator::Add));
    assert_eq!(operators[1].binary_operator(), None);
}

#[test]
fn test_parse_expression_statements() {
    let file = parse_ok("f(1, 2);");
    assert!(matches!(&file.body[0].stmt, Stmt::Call(call) if call.arguments.len() == 2));

    let error = parse_err("a + b;");
    assert_eq!(error.kind(), ErrorKind::StatementSyntaxError);

    let error = parse_err("1 = 2;");
    assert_eq!(error.kind(), ErrorKind::StatementSyntaxError);
}

#[test]
fn test_parse_if_else_chain() {
    let file = parse_ok("if a { b(); } else if c { d(); } else { e(); }");

    let if_stmt = match &file.body[0].stmt {
        Stmt::If(if_stmt) => if_stmt,
        other => panic!("expected an if, got {:?}", other),
    };

    match &if_stmt.else_branch {
        Some(ElseBranch::If(else_if)) => {
            assert_eq!(variable_name(&else_if.condition), "c");
            assert!(matches!(else_if.else_branch, Some(ElseBranch::Block(_))));
        }
        other => panic!("expected an else-if, got {:?}", other),
    }

    let error = parse_err("if a { } else b();");
    assert_eq!(error.kind(), ErrorKind::UnexpectedToken);
}

#[test]
fn test_parse_struct_literal_restriction_in_conditions() {
    // `Origin {}` is not an initializer here, so `{}` is the body
    let file = parse_ok("if p == Origin {} {}");
    assert_eq!(file.body.len(), 2);
    assert!(matches!(&file.body[1].stmt, Stmt::Block(_)));

    let file = parse_ok("if (p == Origin {}) { f(); }");
    match &file.body[0].stmt {
        Stmt::If(if_stmt) => assert!(matches!(if_stmt.condition, Expr::Paren(_))),
        other => panic!("expected an if, got {:?}", other),
    }
}

#[test]
fn test_parse_loop_forms() {
    let file = parse_ok(
        "for { break; }\n\
         for i < 10 { i += 1; }\n\
         for let mut i = 0; i < 10; i += 1 { f(i); }\n\
         for i = 0; i < n; i += 1 {}",
    );

    let forms: Vec<&LoopForm> = file
        .iter()
        .map(|stmt| match &stmt.stmt {
            Stmt::For(loop_stmt) => &loop_stmt.form,
            other => panic!("expected a loop, got {:?}", other),
        })
        .collect();

    assert!(matches!(forms[0], LoopForm::Forever));
    assert!(matches!(forms[1], LoopForm::Conditional { .. }));
    assert!(matches!(
        forms[2],
        LoopForm::Ranged { binding: LoopBinding::Mut(_), afterthought, .. } if afterthought.operator == AssignmentOperator::AddAssign
    ));
    assert!(matches!(forms[3], LoopForm::Ranged { binding: LoopBinding::Assignment(_), .. }));
}

#[test]
fn test_parse_ranged_loop_requires_all_clauses() {
    for source in [
        "for ; ; { }",
        "for let i = 0; ; i += 1 { }",
        "for let i = 0; i < 3; { }",
        "for f(); i < 3; i += 1 { }",
    ] {
        let error = parse_err(source);
        assert_eq!(error.kind(), ErrorKind::StatementSyntaxError, "{}", source);
    }
}

#[test]
fn test_parse_defer() {
    let file = parse_ok("{ defer close(f); defer x = 1; }");
    match &file.body[0].stmt {
        Stmt::Block(block) => {
            assert!(matches!(&block.statements()[0].stmt, Stmt::Defer(defer) if matches!(*defer.statement, Stmt::Call(_))));
            assert!(matches!(&block.statements()[1].stmt, Stmt::Defer(defer) if matches!(*defer.statement, Stmt::Assignment(_))));
        }
        other => panic!("expected a block, got {:?}", other),
    }

    for source in ["defer if x { y(); };", "defer for { };", "defer { f(); };"] {
        let error = parse_err(source);
        assert_eq!(error.kind(), ErrorKind::StatementSyntaxError, "{}", source);
    }
}

#[test]
fn test_parse_block_bodies() {
    let file = parse_ok("let f = fn() i32 { 42 }; let g = fn() void { x = 1; h(); return; };");

    let bodies: Vec<&BlockBody> = file
        .iter()
        .map(|stmt| match &stmt.stmt {
            Stmt::ConstDecl(decl) => match decl.assigned_value.as_ref() {
                Some(Expr::FunctionLiteral(function)) => &function.body.body,
                other => panic!("expected a function literal, got {:?}", other),
            },
            other => panic!("expected a declaration, got {:?}", other),
        })
        .collect();

    assert!(matches!(bodies[0], BlockBody::Expression { expression } if int_value(expression) == 42));
    match bodies[1] {
        BlockBody::Statements { statements } => {
            assert_eq!(statements.len(), 3);
            assert!(matches!(statements[0].stmt, Stmt::Assignment(_)));
            assert!(matches!(&statements[2].stmt, Stmt::Return(ret) if ret.value.is_none()));
        }
        other => panic!("expected statements, got {:?}", other),
    }

    let error = parse_err("{ x; }");
    assert_eq!(error.kind(), ErrorKind::StatementSyntaxError);
}

#[test]
fn test_parse_block_ids_are_unique() {
    let file = parse_ok("{ { } { { } } }");

    fn collect_ids(block: &crate::ast::statements::Block, ids: &mut Vec<i32>) {
        ids.push(block.id);
        for stmt in block.iter() {
            if let Stmt::Block(inner) = &stmt.stmt {
                collect_ids(inner, ids);
            }
        }
    }

    let mut ids = vec![];
    match &file.body[0].stmt {
        Stmt::Block(block) => collect_ids(block, &mut ids),
        other => panic!("expected a block, got {:?}", other),
    }

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}

#[test]
fn test_parse_annotations() {
    let file = parse_ok("@inline @std.export let f = fn() void {};");

    let annotations = &file.body[0].annotations;
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[0].path.names(), vec!["inline"]);
    assert_eq!(annotations[1].path.names(), vec!["std", "export"]);
}

/// Source text covered by `span`.
fn text<'a>(source: &'a str, span: &Span) -> &'a str {
    &source[span.start.0 as usize..span.end.0 as usize]
}

#[test]
fn test_parse_spans_cover_source_text() {
    let source = "@inline\n\
                  let x: i32* = (a + 1) * b;\n\
                  for let mut i = 0; i < n; i += 1 { f(i); }\n\
                  let p = Point { .x = 1, .y = 2 };\n\
                  let g = fn(v: u8[4]) void { g(v); };\n";
    let file = parse_ok(source);

    let wrapper = &file.body[0];
    assert_eq!(text(source, &wrapper.span), "@inline\nlet x: i32* = (a + 1) * b;");
    assert_eq!(text(source, &wrapper.annotations[0].span), "@inline");
    assert_eq!(text(source, wrapper.stmt.get_span()), "let x: i32* = (a + 1) * b");
    match &wrapper.stmt {
        Stmt::ConstDecl(decl) => {
            assert_eq!(text(source, decl.explicit_type.as_ref().unwrap().get_span()), "i32*");

            let value = decl.assigned_value.as_ref().unwrap();
            assert_eq!(text(source, value.get_span()), "(a + 1) * b");
            let (left, _, right) = binary(value);
            assert_eq!(text(source, left.get_span()), "(a + 1)");
            assert_eq!(text(source, right.get_span()), "b");
            match left {
                Expr::Paren(paren) => assert_eq!(text(source, paren.inner.get_span()), "a + 1"),
                other => panic!("expected a parenthesised expression, got {:?}", other),
            }
        }
        other => panic!("expected a declaration, got {:?}", other),
    }

    let wrapper = &file.body[1];
    assert_eq!(text(source, &wrapper.span), "for let mut i = 0; i < n; i += 1 { f(i); }");
    match &wrapper.stmt {
        Stmt::For(loop_stmt) => {
            assert_eq!(text(source, &loop_stmt.body.span), "{ f(i); }");
            assert_eq!(text(source, &loop_stmt.body.statements()[0].span), "f(i);");
            match &loop_stmt.form {
                LoopForm::Ranged {
                    condition, afterthought, ..
                } => {
                    assert_eq!(text(source, condition.get_span()), "i < n");
                    assert_eq!(text(source, &afterthought.span), "i += 1");
                }
                other => panic!("expected a ranged loop, got {:?}", other),
            }
        }
        other => panic!("expected a loop, got {:?}", other),
    }

    match &file.body[2].stmt {
        Stmt::ConstDecl(decl) => match decl.assigned_value.as_ref() {
            Some(Expr::StructInit(init)) => {
                assert_eq!(text(source, &init.span), "Point { .x = 1, .y = 2 }");
                assert_eq!(text(source, &init.fields[0].span), ".x = 1");
                assert_eq!(text(source, &init.fields[1].span), ".y = 2");
            }
            other => panic!("expected a struct initializer, got {:?}", other),
        },
        other => panic!("expected a declaration, got {:?}", other),
    }

    let wrapper = &file.body[3];
    assert_eq!(text(source, &wrapper.span), "let g = fn(v: u8[4]) void { g(v); };");
    match &wrapper.stmt {
        Stmt::ConstDecl(decl) => match decl.assigned_value.as_ref() {
            Some(Expr::FunctionLiteral(function)) => {
                assert_eq!(text(source, &function.span), "fn(v: u8[4]) void { g(v); }");
                assert_eq!(text(source, &function.signature.span), "fn(v: u8[4]) void");
                assert_eq!(text(source, &function.signature.parameters[0].span), "v: u8[4]");
                assert_eq!(text(source, function.signature.parameters[0].ty.get_span()), "u8[4]");
                assert_eq!(text(source, &function.body.span), "{ g(v); }");
            }
            other => panic!("expected a function literal, got {:?}", other),
        },
        other => panic!("expected a declaration, got {:?}", other),
    }

    assert_eq!(file.span.start.0, 0);
}

#[test]
fn test_parse_missing_paren() {
    let error = parse_err("f(1, 2");

    assert_eq!(error.kind(), ErrorKind::UnexpectedToken);
    assert_eq!(error.get_position().0, 6);
    match error.get_impl() {
        ErrorImpl::UnexpectedToken { expected, found } => {
            assert_eq!(expected, "`)`");
            assert_eq!(found, "end of input");
        }
        other => panic!("expected UnexpectedToken, got {:?}", other),
    }
}

#[test]
fn test_parse_missing_semicolon_and_expression() {
    let error = parse_err("let x = 1");
    assert_eq!(error.kind(), ErrorKind::UnexpectedToken);

    let error = parse_err("let x = );");
    assert_eq!(error.kind(), ErrorKind::ExpressionSyntaxError);
    assert_eq!(error.get_position().0, 8);
}

#[test]
fn test_parse_error_records_innermost_statement() {
    let error = parse_err("{ let x = ; }");

    assert_eq!(error.get_position().0, 10);
    assert_eq!(error.get_statement_start().unwrap().0, 2);
}

#[test]
fn test_parse_nesting_limit() {
    let source = format!("let x = {}1{};", "(".repeat(20), ")".repeat(20));
    let tokens = tokenize(source.clone(), None).unwrap();

    let (_, result) = parse(tokens.clone(), &ParserConfig::default().with_max_nesting_depth(8));
    let error = result.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NestingTooDeep);
    assert!(matches!(error.get_impl(), ErrorImpl::NestingTooDeep { limit: 8 }));

    let (_, result) = parse(tokens, &ParserConfig::default());
    assert!(result.is_ok());
}

#[test]
fn test_parse_nesting_limit_counts_chains() {
    let config = ParserConfig::default().with_max_nesting_depth(8);
    let sources = [
        format!("let x = a{};", " + a".repeat(20)),
        format!("let x = f{};", "()".repeat(20)),
        format!("let x = a{};", ".b".repeat(20)),
        format!("let x: i32{};", "*".repeat(20)),
        format!("let x: u8{};", "[]".repeat(20)),
    ];

    for source in &sources {
        let tokens = tokenize(source.clone(), None).unwrap();

        let (_, result) = parse(tokens.clone(), &config);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::NestingTooDeep, "{}", source);

        let (_, result) = parse(tokens, &ParserConfig::default());
        assert!(result.is_ok(), "{}", source);
    }

    // Sibling chains do not add up
    let tokens = tokenize("let x = a + a + a; let y: i32** = b + b;".to_string(), None).unwrap();
    let (_, result) = parse(tokens, &ParserConfig::default().with_max_nesting_depth(6));
    assert!(result.is_ok());
}

#[test]
fn test_parse_recovering_collects_errors() {
    let tokens = tokenize("let a = ; let b = 2; let c = );".to_string(), None).unwrap();
    let (file, errors) = parse_recovering(tokens, &ParserConfig::default());

    assert_eq!(errors.len(), 2);
    assert_eq!(file.body.len(), 1);
    assert!(matches!(&file.body[0].stmt, Stmt::ConstDecl(decl) if decl.name.names() == vec!["b"]));
}

#[test]
fn test_parse_recovering_skips_whole_blocks() {
    let tokens = tokenize("let f = fn() void { x; }; let g = 1;".to_string(), None).unwrap();
    let (file, errors) = parse_recovering(tokens, &ParserConfig::default());

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), ErrorKind::StatementSyntaxError);
    assert_eq!(file.body.len(), 1);
    assert!(matches!(&file.body[0].stmt, Stmt::ConstDecl(decl) if decl.name.names() == vec!["g"]));
}

#[test]
fn test_parse_recovering_skips_else_branches() {
    let sources = [
        "if a { f( } else { g(); } let y = 1;",
        "if a { f( } else if (b) { g(); } else { h(); } let y = 1;",
        "if a { } else { f( } let y = 1;",
    ];

    for source in &sources {
        let tokens = tokenize(source.to_string(), None).unwrap();
        let (file, errors) = parse_recovering(tokens, &ParserConfig::default());

        assert_eq!(errors.len(), 1, "{}", source);
        assert_eq!(file.body.len(), 1, "{}", source);
        assert!(matches!(&file.body[0].stmt, Stmt::ConstDecl(decl) if decl.name.names() == vec!["y"]));
    }
}
