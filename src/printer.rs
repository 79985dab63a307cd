//! Pretty printer for the femto AST.
//!
//! Output is valid femto source: printing a parsed file and parsing the result
//! again gives a tree that prints identically. Parentheses are only emitted
//! where the tree has a `Paren` node, so precedence is preserved as parsed.

use std::fmt::Display;

use crate::ast::{
    ast::{Annotation, Expr, Identifier, ScopePath, Stmt, StmtWrapper, Type},
    expressions::StructInitTarget,
    statements::{AssignmentStmt, Block, BlockBody, ElseBranch, IfStmt, LoopBinding, LoopForm, SourceFile, VarDeclStmt},
    types::{ArrayLength, FunctionSignature, StructType},
};

const INDENT: &str = "    ";

pub struct Printer {
    output: String,
    indent: usize,
}

impl Default for Printer {
    fn default() -> Self {
        Printer::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Printer {
            output: String::new(),
            indent: 0,
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn newline(&mut self) {
        self.output.push('\n');
        for _ in 0..self.indent {
            self.output.push_str(INDENT);
        }
    }

    pub fn print_source_file(&mut self, file: &SourceFile) {
        for stmt in file.iter() {
            self.print_stmt(stmt);
            self.write("\n");
        }
    }

    pub fn print_stmt(&mut self, wrapper: &StmtWrapper) {
        for annotation in &wrapper.annotations {
            self.print_annotation(annotation);
            self.newline();
        }

        self.print_stmt_kind(&wrapper.stmt);

        if !wrapper.stmt.is_compound() {
            self.write(";");
        }
    }

    fn print_annotation(&mut self, annotation: &Annotation) {
        self.write("@");
        self.print_path(&annotation.path);
    }

    fn print_path(&mut self, path: &ScopePath) {
        self.write(&path.names().join("."));
    }

    fn print_alias(&mut self, alias: Option<&Identifier>) {
        if let Some(alias) = alias {
            self.write(" as ");
            self.write(&alias.name);
        }
    }

    fn print_var_decl(&mut self, decl: &VarDeclStmt, mutable: bool) {
        self.write(if mutable { "let mut " } else { "let " });
        self.print_path(&decl.name);

        if let Some(ty) = &decl.explicit_type {
            self.write(": ");
            self.print_type(ty);
        }

        if let Some(value) = &decl.assigned_value {
            self.write(" = ");
            self.print_expr(value);
        }
    }

    fn print_assignment(&mut self, assignment: &AssignmentStmt) {
        self.print_expr(&assignment.target);
        self.write(" ");
        self.write(assignment.operator.symbol());
        self.write(" ");
        self.print_expr(&assignment.value);
    }

    fn print_optional_value(&mut self, keyword: &str, value: Option<&Expr>) {
        self.write(keyword);
        if let Some(value) = value {
            self.write(" ");
            self.print_expr(value);
        }
    }

    /// Prints a statement without annotations or `;`.
    pub fn print_stmt_kind(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Import(import) => {
                self.write("use ");
                self.print_path(&import.path);
                self.print_alias(import.alias.as_ref());
            }
            Stmt::Include(include) => {
                self.write("include ");
                self.write(&quote(&include.file.value, '"'));
                self.print_alias(include.alias.as_ref());
            }
            Stmt::ConstDecl(decl) => self.print_var_decl(decl, false),
            Stmt::MutDecl(decl) => self.print_var_decl(decl, true),
            Stmt::TypeAlias(decl) | Stmt::DistinctTypeDecl(decl) => {
                if let Stmt::DistinctTypeDecl(_) = stmt {
                    self.write("distinct ");
                }
                self.write("type ");
                self.print_path(&decl.name);
                self.write(" = ");
                self.print_type(&decl.ty);
            }
            Stmt::Assignment(assignment) => self.print_assignment(assignment),
            Stmt::Call(call) => {
                self.print_expr(&call.callee);
                self.print_arguments(&call.arguments);
            }
            Stmt::Return(ret) => self.print_optional_value("return", ret.value.as_ref()),
            Stmt::Yield(yld) => self.print_optional_value("yield", yld.value.as_ref()),
            Stmt::Break(_) => self.write("break"),
            Stmt::Defer(defer) => {
                self.write("defer ");
                self.print_stmt_kind(&defer.statement);
            }
            Stmt::If(if_stmt) => self.print_if(if_stmt),
            Stmt::For(loop_stmt) => {
                self.write("for ");

                match &loop_stmt.form {
                    LoopForm::Forever => {}
                    LoopForm::Conditional { condition } => {
                        self.print_expr(condition);
                        self.write(" ");
                    }
                    LoopForm::Ranged {
                        binding,
                        condition,
                        afterthought,
                    } => {
                        match binding {
                            LoopBinding::Const(decl) => self.print_var_decl(decl, false),
                            LoopBinding::Mut(decl) => self.print_var_decl(decl, true),
                            LoopBinding::Assignment(assignment) => self.print_assignment(assignment),
                        }
                        self.write("; ");
                        self.print_expr(condition);
                        self.write("; ");
                        self.print_assignment(afterthought);
                        self.write(" ");
                    }
                }

                self.print_block(&loop_stmt.body);
            }
            Stmt::Block(block) => self.print_block(block),
        }
    }

    fn print_if(&mut self, if_stmt: &IfStmt) {
        self.write("if ");
        self.print_expr(&if_stmt.condition);
        self.write(" ");
        self.print_block(&if_stmt.then_block);

        match &if_stmt.else_branch {
            Some(ElseBranch::If(else_if)) => {
                self.write(" else ");
                self.print_if(else_if);
            }
            Some(ElseBranch::Block(block)) => {
                self.write(" else ");
                self.print_block(block);
            }
            None => {}
        }
    }

    pub fn print_block(&mut self, block: &Block) {
        match &block.body {
            BlockBody::Expression { expression } => {
                self.write("{ ");
                self.print_expr(expression);
                self.write(" }");
            }
            BlockBody::Statements { statements } if statements.is_empty() => self.write("{}"),
            BlockBody::Statements { statements } => {
                self.write("{");
                self.indent += 1;
                for stmt in statements {
                    self.newline();
                    self.print_stmt(stmt);
                }
                self.indent -= 1;
                self.newline();
                self.write("}");
            }
        }
    }

    fn print_arguments(&mut self, arguments: &[Expr]) {
        self.write("(");
        for (i, argument) in arguments.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_expr(argument);
        }
        self.write(")");
    }

    pub fn print_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Int(int) => self.write(&int.text),
            Expr::Float(float) => self.write(&float.text),
            Expr::Bool(boolean) => self.write(if boolean.value { "true" } else { "false" }),
            Expr::String(string) => self.write(&quote(&string.value, '"')),
            Expr::Char(character) => self.write(&quote(&character.value.to_string(), '\'')),
            Expr::Null(_) => self.write("null"),
            Expr::Variable(variable) => self.write(&variable.name.name),
            Expr::FunctionLiteral(function) => {
                self.print_signature(&function.signature);
                self.write(" ");
                self.print_block(&function.body);
            }
            Expr::FunctionSignature(signature) => self.print_signature(signature),
            Expr::Unary(unary) => {
                self.write(&unary.operator.to_string());
                self.print_expr(&unary.operand);
            }
            Expr::Binary(binary) => {
                self.print_expr(&binary.left);
                self.write(" ");
                self.write(binary.operator.symbol());
                self.write(" ");
                self.print_expr(&binary.right);
            }
            Expr::Paren(paren) => {
                self.write("(");
                self.print_expr(&paren.inner);
                self.write(")");
            }
            Expr::Call(call) => {
                self.print_expr(&call.callee);
                self.print_arguments(&call.arguments);
            }
            Expr::FieldAccess(access) => {
                self.print_expr(&access.object);
                self.write(".");
                self.write(&access.field.name);
            }
            Expr::Index(index) => {
                self.print_expr(&index.object);
                self.write("[");
                self.print_expr(&index.index);
                self.write("]");
            }
            Expr::StructInit(init) => {
                match &init.target {
                    StructInitTarget::Named(path) => self.print_path(path),
                    StructInitTarget::Inline(struct_type) => self.print_struct_type(struct_type),
                }

                if init.fields.is_empty() {
                    self.write(" {}");
                    return;
                }

                self.write(" { ");
                for (i, field) in init.fields.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.write(".");
                    self.write(&field.name.name);
                    self.write(" = ");
                    self.print_expr(&field.value);
                }
                self.write(" }");
            }
            Expr::ArrayInit(array) => {
                self.write("[");
                for (i, element) in array.elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.print_expr(element);
                }
                if array.spread {
                    self.write(" ...");
                }
                self.write("]");
            }
        }
    }

    fn print_signature(&mut self, signature: &FunctionSignature) {
        self.write("fn(");
        for (i, parameter) in signature.parameters.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            match &parameter.name {
                Some(name) => self.write(&name.name),
                None => self.write("_"),
            }
            self.write(": ");
            self.print_type(&parameter.ty);
        }
        self.write(")");

        if let Some(return_type) = &signature.return_type {
            self.write(" ");
            self.print_type(return_type);
        }
    }

    fn print_struct_type(&mut self, struct_type: &StructType) {
        if struct_type.members.is_empty() {
            self.write("struct {}");
            return;
        }

        self.write("struct { ");
        for (i, member) in struct_type.members.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&member.name.name);
            self.write(": ");
            self.print_type(&member.ty);
        }
        self.write(" }");
    }

    pub fn print_type(&mut self, ty: &Type) {
        match ty {
            Type::Primitive(primitive) => self.write(primitive.primitive.name()),
            Type::Pointer(pointer) => {
                self.print_type(&pointer.base);
                self.write("*");
            }
            Type::Array(array) => {
                self.print_type(&array.element);
                self.write("[");
                match &array.length {
                    ArrayLength::Fixed(length) => self.write(&length.text),
                    ArrayLength::Inferred { .. } => self.write("_"),
                }
                self.write("]");
            }
            Type::Slice(slice) => {
                self.print_type(&slice.element);
                self.write(if slice.capacity { "[*]" } else { "[]" });
            }
            Type::Struct(struct_type) => self.print_struct_type(struct_type),
            Type::Named(named) => self.print_path(&named.path),
            Type::Function(signature) => self.print_signature(signature),
        }
    }
}

/// Surrounds `value` with `delimiter`, re-escaping what the lexer decodes.
fn quote(value: &str, delimiter: char) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push(delimiter);

    for ch in value.chars() {
        match ch {
            '\x07' => quoted.push_str("\\a"),
            '\x08' => quoted.push_str("\\b"),
            '\x0C' => quoted.push_str("\\f"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\x0B' => quoted.push_str("\\v"),
            '\\' => quoted.push_str("\\\\"),
            c if c == delimiter => {
                quoted.push('\\');
                quoted.push(c);
            }
            c => quoted.push(c),
        }
    }

    quoted.push(delimiter);
    quoted
}

pub fn print_source_file(file: &SourceFile) -> String {
    let mut printer = Printer::new();
    printer.print_source_file(file);
    printer.finish()
}

pub fn print_expr(expr: &Expr) -> String {
    let mut printer = Printer::new();
    printer.print_expr(expr);
    printer.finish()
}

pub fn print_type(ty: &Type) -> String {
    let mut printer = Printer::new();
    printer.print_type(ty);
    printer.finish()
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", print_expr(self))
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", print_type(self))
    }
}

impl Display for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", print_source_file(self))
    }
}
