//! Parser state and the top-level parse loops.
//!
//! The parser is a Pratt parser. It keeps lookup tables for:
//! - Statement handlers, keyed by a statement's leading token
//! - NUD (null denotation) handlers for prefix and primary expressions
//! - LED (left denotation) handlers for infix and postfix expressions
//! - Binding powers for operator precedence
//! - Type handlers, keyed by a type's leading token
//!
//! Recursion is bounded by the configured maximum nesting depth.

use std::{collections::HashMap, sync::Arc};

use tracing::{debug, instrument, trace};

use crate::{
    ast::{
        ast::{Identifier, ScopePath},
        statements::SourceFile,
    },
    config::ParserConfig,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position, Span, MK_TOKEN,
};

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup,
    },
    stmt::parse_stmt,
    types::{create_token_type_lookups, TypeNUDHandler, TypeNUDLookup},
};

/// The main parser structure that maintains parsing state.
pub struct Parser {
    /// The tokens to parse, always ending with `EOF`
    tokens: Vec<Token>,
    /// Index of the current token
    pos: usize,
    file: Arc<String>,
    stmt_lookup: StmtLookup,
    nud_lookup: NUDLookup,
    led_lookup: LEDLookup,
    binding_power_lookup: BPLookup,
    type_nud_lookup: TypeNUDLookup,
    /// Current recursion depth and its limit
    depth: usize,
    max_depth: usize,
    /// Number of blocks currently open
    block_depth: usize,
    /// Cleared in `if` conditions and `for` headers, where `{` opens the body
    struct_literals: bool,
    /// Set for the initializer of a top-level declaration, where a `fn` header
    /// may omit its body
    function_signature: bool,
    /// Counter for block ids
    current_id: i32,
}

impl Parser {
    /// Creates a new Parser instance with empty lookup tables.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Tokens to parse. An `EOF` token is appended if missing
    /// * `config` - Supplies the file name and the maximum nesting depth
    ///
    /// # Returns
    ///
    /// A new Parser positioned at the first token.
    pub fn new(mut tokens: Vec<Token>, config: &ParserConfig) -> Self {
        let file = match tokens.last() {
            Some(token) => Arc::clone(&token.span.end.1),
            None => Arc::new(config.file_name.clone()),
        };

        if tokens.last().map(|token| token.kind) != Some(TokenKind::EOF) {
            let end = match tokens.last() {
                Some(token) => token.span.end.clone(),
                None => Position(0, Arc::clone(&file)),
            };
            tokens.push(MK_TOKEN!(
                TokenKind::EOF,
                String::from("EOF"),
                Span {
                    start: end.clone(),
                    end
                }
            ));
        }

        Parser {
            tokens,
            pos: 0,
            file,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            type_nud_lookup: HashMap::new(),
            depth: 0,
            max_depth: config.max_nesting_depth,
            block_depth: 0,
            struct_literals: true,
            function_signature: false,
            current_id: 0,
        }
    }

    /// Returns the current token without advancing. At the end of input this
    /// is the `EOF` token.
    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Kind of the token `offset` positions ahead of the current one.
    pub fn peek_kind(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|token| token.kind)
            .unwrap_or(TokenKind::EOF)
    }

    /// Advances to the next token and returns the previous one. Never moves past `EOF`.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos.min(self.tokens.len() - 1);
        if self.tokens[index].kind != TokenKind::EOF {
            self.pos = index + 1;
        }
        &self.tokens[index]
    }

    /// The most recently consumed token.
    pub fn previous_token(&self) -> &Token {
        &self.tokens[self.pos.saturating_sub(1).min(self.tokens.len() - 1)]
    }

    /// Expects a token of the specified kind, with optional custom error.
    ///
    /// # Arguments
    ///
    /// * `expected_kind` - The expected TokenKind
    /// * `error` - Optional custom error to return if expectation fails
    ///
    /// # Returns
    ///
    /// The consumed token if it matches, otherwise the custom error or an
    /// `UnexpectedToken` error naming `expected_kind`.
    pub fn expect_error(&mut self, expected_kind: TokenKind, error: Option<Error>) -> Result<Token, Error> {
        if self.current_token_kind() == expected_kind {
            return Ok(self.advance().clone());
        }

        match error {
            Some(error) => Err(error),
            None => Err(self.unexpected_token(&expected_kind.to_string())),
        }
    }

    /// Expects a token of the specified kind with the default error.
    ///
    /// # Arguments
    ///
    /// * `expected_kind` - The expected TokenKind
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// An `UnexpectedToken` error at the current token.
    pub fn unexpected_token(&self, expected: &str) -> Error {
        let token = self.current_token();
        Error::new(
            ErrorImpl::UnexpectedToken {
                expected: String::from(expected),
                found: token.to_string(),
            },
            token.span.clone(),
        )
    }

    pub fn expect_identifier(&mut self) -> Result<Identifier, Error> {
        let token = self.expect(TokenKind::Identifier)?;
        Ok(Identifier {
            name: token.value,
            span: token.span,
        })
    }

    /// Parses `a.b.c`.
    pub fn expect_scope_path(&mut self) -> Result<ScopePath, Error> {
        let mut segments = vec![self.expect_identifier()?];

        while self.current_token_kind() == TokenKind::Dot && self.peek_kind(1) == TokenKind::Identifier {
            self.advance();
            segments.push(self.expect_identifier()?);
        }

        let span = segments[0].span.to(&segments[segments.len() - 1].span);
        Ok(ScopePath { segments, span })
    }

    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    /// Span from the start of `start` to the end of the last consumed token.
    pub fn span_from(&self, start: &Span) -> Span {
        let end = self.previous_token().span.end.clone();
        if end.0 < start.start.0 {
            return start.clone();
        }
        Span {
            start: start.start.clone(),
            end,
        }
    }

    pub fn checkpoint(&self) -> usize {
        self.pos
    }

    pub fn rewind(&mut self, checkpoint: usize) {
        self.pos = checkpoint;
    }

    /// Runs a parse function one nesting level deeper.
    ///
    /// # Arguments
    ///
    /// * `f` - The parse function to run
    ///
    /// # Returns
    ///
    /// The result of `f`, or `NestingTooDeep` if the limit is already reached
    pub fn with_depth<T>(&mut self, f: impl FnOnce(&mut Parser) -> Result<T, Error>) -> Result<T, Error> {
        let depth = self.depth;
        self.deepen()?;
        let result = f(self);
        self.depth = depth;
        result
    }

    /// Charges one nesting level without recursing, failing with `NestingTooDeep`
    /// past the limit. Operator chains and type suffixes build their nodes in a
    /// loop and call this once per node they wrap.
    pub fn deepen(&mut self) -> Result<(), Error> {
        if self.depth >= self.max_depth {
            return Err(Error::new(
                ErrorImpl::NestingTooDeep { limit: self.max_depth },
                self.current_token().span.clone(),
            ));
        }

        self.depth += 1;
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Releases the levels charged by `deepen` since `depth` was read.
    pub fn restore_depth(&mut self, depth: usize) {
        self.depth = depth;
    }

    /// Runs `f` with struct initializers allowed or not, restoring the previous setting.
    ///
    /// # Arguments
    ///
    /// * `allowed` - Whether `Name { ... }` is read as a struct initializer inside `f`
    /// * `f` - The parse function to run
    pub fn with_struct_literals<T>(
        &mut self,
        allowed: bool,
        f: impl FnOnce(&mut Parser) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let previous = std::mem::replace(&mut self.struct_literals, allowed);
        let result = f(self);
        self.struct_literals = previous;
        result
    }

    pub fn allows_struct_literals(&self) -> bool {
        self.struct_literals
    }

    /// Lets the next function literal omit its body.
    pub fn allow_function_signature(&mut self) {
        self.function_signature = true;
    }

    /// Returns whether a bodiless function header is allowed here, clearing the permission.
    pub fn take_function_signature(&mut self) -> bool {
        std::mem::take(&mut self.function_signature)
    }

    pub fn enter_block(&mut self) {
        self.block_depth += 1;
    }

    pub fn exit_block(&mut self) {
        self.block_depth = self.block_depth.saturating_sub(1);
    }

    pub fn at_top_level(&self) -> bool {
        self.block_depth == 0
    }

    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    pub fn get_type_nud_lookup(&self) -> &TypeNUDLookup {
        &self.type_nud_lookup
    }

    /// Registers a left denotation (infix or postfix) handler for a token.
    ///
    /// # Arguments
    ///
    /// * `kind` - The token kind to register
    /// * `binding_power` - The precedence/binding power for this operator
    /// * `led_fn` - The handler function for this operator
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix or primary) handler for a token.
    ///
    /// # Arguments
    ///
    /// * `kind` - The token kind to register
    /// * `nud_fn` - The handler function for this token
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    pub fn type_nud(&mut self, kind: TokenKind, nud_fn: TypeNUDHandler) {
        self.type_nud_lookup.insert(kind, nud_fn);
    }

    /// Advances the internal ID counter and returns the previous value.
    pub fn advance_id(&mut self) -> i32 {
        let id = self.current_id;
        self.current_id += 1;
        id
    }

    /// Span of the whole input, from offset 0 to `EOF`.
    fn file_span(&self) -> Span {
        Span {
            start: Position(0, Arc::clone(&self.file)),
            end: self.tokens[self.tokens.len() - 1].span.end.clone(),
        }
    }

    /// Skips the rest of a statement that failed to parse: up to and including
    /// the next `;` outside braces, or the `}` closing the first brace opened.
    fn synchronize(&mut self) {
        let mut depth = 0usize;
        let mut skipped = 0usize;

        loop {
            let kind = self.current_token_kind();
            if kind == TokenKind::EOF {
                break;
            }

            self.advance();
            skipped += 1;

            match kind {
                TokenKind::OpenCurly => depth += 1,
                TokenKind::CloseCurly if depth <= 1 => {
                    skipped += self.skip_else_branches();

                    // `let f = fn() { ... };`
                    if self.current_token_kind() == TokenKind::Semicolon {
                        self.advance();
                        skipped += 1;
                    }
                    break;
                }
                TokenKind::CloseCurly => depth -= 1,
                TokenKind::Semicolon if depth == 0 => break,
                _ => {}
            }
        }

        debug!(skipped, "skipped tokens after parse error");
    }

    /// Skips the `else { ... }` and `else if ... { ... }` branches that follow
    /// a skipped block, returning the number of tokens consumed.
    fn skip_else_branches(&mut self) -> usize {
        let mut skipped = 0usize;

        while self.current_token_kind() == TokenKind::Else {
            self.advance();
            skipped += 1;

            // Condition of an `else if`, up to the `{` of its body
            let mut parens = 0usize;
            loop {
                match self.current_token_kind() {
                    TokenKind::EOF => return skipped,
                    TokenKind::OpenCurly | TokenKind::Semicolon if parens == 0 => break,
                    TokenKind::OpenParen => parens += 1,
                    TokenKind::CloseParen => parens = parens.saturating_sub(1),
                    _ => {}
                }
                self.advance();
                skipped += 1;
            }

            if self.current_token_kind() != TokenKind::OpenCurly {
                break;
            }
            skipped += self.skip_block();
        }

        skipped
    }

    /// Skips from a `{` through its matching `}`.
    fn skip_block(&mut self) -> usize {
        let mut depth = 0usize;
        let mut skipped = 0usize;

        loop {
            let kind = self.current_token_kind();
            if kind == TokenKind::EOF {
                break;
            }

            self.advance();
            skipped += 1;

            match kind {
                TokenKind::OpenCurly => depth += 1,
                TokenKind::CloseCurly if depth <= 1 => break,
                TokenKind::CloseCurly => depth -= 1,
                _ => {}
            }
        }

        skipped
    }

    fn new_with_lookups(tokens: Vec<Token>, config: &ParserConfig) -> Parser {
        let mut parser = Parser::new(tokens, config);
        create_token_lookups(&mut parser);
        create_token_type_lookups(&mut parser);
        parser
    }
}

/// Parses a stream of tokens into a [`SourceFile`], stopping at the first error.
///
/// # Arguments
///
/// * `tokens` - The tokens to parse, as produced by the lexer
/// * `config` - Parser configuration
///
/// # Returns
///
/// The parser alongside the result, so callers can inspect where it stopped.
#[instrument(skip_all, fields(file = %config.file_name))]
pub fn parse(tokens: Vec<Token>, config: &ParserConfig) -> (Parser, Result<SourceFile, Error>) {
    let mut parser = Parser::new_with_lookups(tokens, config);
    let mut body = vec![];

    while parser.has_tokens() {
        match parse_stmt(&mut parser) {
            Ok(stmt) => {
                trace!(kind = ?stmt.get_stmt_type(), "parsed statement");
                body.push(stmt);
            }
            Err(error) => return (parser, Err(error)),
        }
    }

    debug!(statements = body.len(), "parsed source file");

    let span = parser.file_span();
    (parser, Ok(SourceFile { body, span }))
}

/// Parses every statement it can, resynchronising after each error.
///
/// # Arguments
///
/// * `tokens` - The tokens to parse, as produced by the lexer
/// * `config` - Parser configuration
///
/// # Returns
///
/// The statements that parsed, and every error in source order. Statements
/// that failed are left out of the tree.
#[instrument(skip_all, fields(file = %config.file_name))]
pub fn parse_recovering(tokens: Vec<Token>, config: &ParserConfig) -> (SourceFile, Vec<Error>) {
    let mut parser = Parser::new_with_lookups(tokens, config);
    let mut body = vec![];
    let mut errors = vec![];

    while parser.has_tokens() {
        let checkpoint = parser.checkpoint();

        match parse_stmt(&mut parser) {
            Ok(stmt) => {
                trace!(kind = ?stmt.get_stmt_type(), "parsed statement");
                body.push(stmt);
            }
            Err(error) => {
                errors.push(error);
                parser.rewind(checkpoint);
                parser.block_depth = 0;
                parser.function_signature = false;
                parser.synchronize();
            }
        }
    }

    debug!(statements = body.len(), errors = errors.len(), "parsed source file with recovery");

    let span = parser.file_span();
    (SourceFile { body, span }, errors)
}
