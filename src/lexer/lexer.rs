use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, instrument, trace};

use crate::{errors::errors::{Error, ErrorImpl}, Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

/// Consumes the text matched by its pattern. `Ok(None)` means the text is skipped.
pub type RegexHandler = fn(&mut Lexer, &Regex) -> Result<Option<Token>, Error>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

fn pattern(regex: &str, handler: RegexHandler) -> RegexPattern {
    RegexPattern {
        regex: Regex::new(regex).expect("lexer patterns are valid regexes"),
        handler,
    }
}

lazy_static! {
    /// Tried in order at the current offset; the first match wins. Multi-character
    /// operators precede their single-character prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        pattern(r"^\s+", skip_handler),
        pattern(r"^//[^\n]*", skip_handler),
        pattern(r"^[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler),
        pattern(r"^0b[01]+", integer_handler),
        pattern(r"^0o[0-7]+", integer_handler),
        pattern(r"^0x[0-9a-fA-F]+", integer_handler),
        pattern(r"^[0-9]+(\.[0-9]*([eE][-+]?[0-9]+)?)?", number_handler),
        pattern(r"^\.[0-9]+([eE][-+]?[0-9]+)?", float_handler),
        pattern(r#"^"(?:[^"\\\n]|\\.)*""#, string_handler),
        pattern(r#"^""#, unterminated_string_handler),
        pattern(r"^'(?:[^'\\\n]|\\.)'", char_handler),
        pattern(r"^'(?:[^'\\\n]|\\.)*'", invalid_char_handler),
        pattern(r"^'", unterminated_char_handler),
        pattern(r"^<<=", MK_DEFAULT_HANDLER!(TokenKind::ShiftLeftEquals, "<<=")),
        pattern(r"^>>=", MK_DEFAULT_HANDLER!(TokenKind::ShiftRightEquals, ">>=")),
        pattern(r"^\.\.\.", MK_DEFAULT_HANDLER!(TokenKind::Ellipsis, "...")),
        pattern(r"^<<", MK_DEFAULT_HANDLER!(TokenKind::ShiftLeft, "<<")),
        pattern(r"^>>", MK_DEFAULT_HANDLER!(TokenKind::ShiftRight, ">>")),
        pattern(r"^<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
        pattern(r"^>=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
        pattern(r"^==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
        pattern(r"^!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
        pattern(r"^\+=", MK_DEFAULT_HANDLER!(TokenKind::PlusEquals, "+=")),
        pattern(r"^-=", MK_DEFAULT_HANDLER!(TokenKind::MinusEquals, "-=")),
        pattern(r"^\*=", MK_DEFAULT_HANDLER!(TokenKind::StarEquals, "*=")),
        pattern(r"^/=", MK_DEFAULT_HANDLER!(TokenKind::SlashEquals, "/=")),
        pattern(r"^%=", MK_DEFAULT_HANDLER!(TokenKind::PercentEquals, "%=")),
        pattern(r"^\|=", MK_DEFAULT_HANDLER!(TokenKind::PipeEquals, "|=")),
        pattern(r"^&=", MK_DEFAULT_HANDLER!(TokenKind::AmpersandEquals, "&=")),
        pattern(r"^\^=", MK_DEFAULT_HANDLER!(TokenKind::CaretEquals, "^=")),
        pattern(r"^\[", MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[")),
        pattern(r"^\]", MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]")),
        pattern(r"^\{", MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{")),
        pattern(r"^\}", MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}")),
        pattern(r"^\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(")),
        pattern(r"^\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")")),
        pattern(r"^=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
        pattern(r"^<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
        pattern(r"^>", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
        pattern(r"^\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
        pattern(r"^-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
        pattern(r"^\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
        pattern(r"^/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
        pattern(r"^%", MK_DEFAULT_HANDLER!(TokenKind::Percent, "%")),
        pattern(r"^\|", MK_DEFAULT_HANDLER!(TokenKind::Pipe, "|")),
        pattern(r"^&", MK_DEFAULT_HANDLER!(TokenKind::Ampersand, "&")),
        pattern(r"^\^", MK_DEFAULT_HANDLER!(TokenKind::Caret, "^")),
        pattern(r"^~", MK_DEFAULT_HANDLER!(TokenKind::Tilde, "~")),
        pattern(r"^\.", MK_DEFAULT_HANDLER!(TokenKind::Dot, ".")),
        pattern(r"^,", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
        pattern(r"^;", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";")),
        pattern(r"^:", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":")),
        pattern(r"^@", MK_DEFAULT_HANDLER!(TokenKind::At, "@")),
    ];
}

/// Lazy tokenizer over a single source buffer.
///
/// Yields tokens one at a time, ending with a single `EOF` token. After an
/// error the iterator is exhausted; [`Lexer::skip_line`] resumes on the next line
/// and [`Lexer::reset`] restarts from the beginning.
#[derive(Debug, Clone)]
pub struct Lexer {
    source: String,
    pos: usize,
    file: Arc<String>,
    finished: bool,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Arc::new(file)
        } else {
            Arc::new(String::from("<input>"))
        };

        Lexer {
            pos: 0,
            source,
            file: file_name,
            finished: false,
        }
    }

    pub fn reset(&mut self) {
        self.pos = 0;
        self.finished = false;
    }

    /// Moves past the end of the current line so lexing can resume after an error.
    pub fn skip_line(&mut self) {
        self.pos = match self.source[self.pos..].find('\n') {
            Some(offset) => self.pos + offset + 1,
            None => self.source.len(),
        };
        self.finished = false;
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn position(&self, offset: usize) -> Position {
        Position(offset as u32, Arc::clone(&self.file))
    }

    /// Span of the next `len` bytes.
    pub fn span_of(&self, len: usize) -> Span {
        Span {
            start: self.position(self.pos),
            end: self.position(self.pos + len),
        }
    }

    fn matched_len(&self, regex: &Regex) -> usize {
        regex.find(self.remainder()).map(|m| m.end()).unwrap_or(0)
    }

    fn lex_token(&mut self) -> Result<Option<Token>, Error> {
        for pattern in PATTERNS.iter() {
            if pattern.regex.is_match(self.remainder()) {
                return (pattern.handler)(self, &pattern.regex);
            }
        }

        let token = self.remainder().chars().next().map(String::from).unwrap_or_default();
        Err(Error::new(ErrorImpl::UnrecognisedToken { token: token.clone() }, self.span_of(token.len())))
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        while !self.at_eof() {
            match self.lex_token() {
                Ok(Some(token)) => return Some(Ok(token)),
                Ok(None) => continue,
                Err(error) => {
                    self.finished = true;
                    return Some(Err(error));
                }
            }
        }

        self.finished = true;
        Some(Ok(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), self.span_of(0))))
    }
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Result<Option<Token>, Error> {
    let matched = lexer.matched_len(regex);
    lexer.advance_n(matched);
    Ok(None)
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Result<Option<Token>, Error> {
    let len = lexer.matched_len(regex);
    let value = String::from(&lexer.remainder()[..len]);
    let span = lexer.span_of(len);
    lexer.advance_n(len);

    let kind = RESERVED_LOOKUP.get(value.as_str()).copied().unwrap_or(TokenKind::Identifier);
    Ok(Some(MK_TOKEN!(kind, value, span)))
}

fn integer_handler(lexer: &mut Lexer, regex: &Regex) -> Result<Option<Token>, Error> {
    let len = lexer.matched_len(regex);
    let value = String::from(&lexer.remainder()[..len]);
    let span = lexer.span_of(len);
    lexer.advance_n(len);
    Ok(Some(MK_TOKEN!(TokenKind::Integer, value, span)))
}

fn float_handler(lexer: &mut Lexer, regex: &Regex) -> Result<Option<Token>, Error> {
    let len = lexer.matched_len(regex);
    let value = String::from(&lexer.remainder()[..len]);
    let span = lexer.span_of(len);
    lexer.advance_n(len);
    Ok(Some(MK_TOKEN!(TokenKind::Float, value, span)))
}

/// Decimal integers and floats. A `.` directly followed by another `.` or an
/// identifier character belongs to the next token (`1...`, `1.field`), so the
/// number stops before it and stays an integer.
fn number_handler(lexer: &mut Lexer, regex: &Regex) -> Result<Option<Token>, Error> {
    let matched = lexer.matched_len(regex);
    let text = &lexer.remainder()[..matched];

    let (len, kind) = match text.find('.') {
        Some(dot) => {
            let after_dot = lexer.remainder()[dot + 1..].chars().next();
            match after_dot {
                Some(c) if c == '.' || c == '_' || c.is_ascii_alphabetic() => (dot, TokenKind::Integer),
                _ => (matched, TokenKind::Float),
            }
        }
        None => (matched, TokenKind::Integer),
    };

    let value = String::from(&lexer.remainder()[..len]);
    let span = lexer.span_of(len);
    lexer.advance_n(len);
    Ok(Some(MK_TOKEN!(kind, value, span)))
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) -> Result<Option<Token>, Error> {
    let len = lexer.matched_len(regex);
    let span = lexer.span_of(len);
    let value = unescape(lexer, 1, len - 1)?;
    lexer.advance_n(len);
    Ok(Some(MK_TOKEN!(TokenKind::String, value, span)))
}

fn char_handler(lexer: &mut Lexer, regex: &Regex) -> Result<Option<Token>, Error> {
    let len = lexer.matched_len(regex);
    let span = lexer.span_of(len);
    let value = unescape(lexer, 1, len - 1)?;
    lexer.advance_n(len);
    Ok(Some(MK_TOKEN!(TokenKind::Char, value, span)))
}

fn invalid_char_handler(lexer: &mut Lexer, regex: &Regex) -> Result<Option<Token>, Error> {
    let len = lexer.matched_len(regex);
    let literal = String::from(&lexer.remainder()[..len]);
    Err(Error::new(ErrorImpl::InvalidCharLiteral { literal }, lexer.span_of(len)))
}

fn unterminated_string_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<Option<Token>, Error> {
    Err(unterminated(lexer, "string"))
}

fn unterminated_char_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<Option<Token>, Error> {
    Err(unterminated(lexer, "character"))
}

/// Error spanning from the opening quote to the end of its line.
fn unterminated(lexer: &Lexer, literal: &str) -> Error {
    let len = lexer.remainder().find('\n').unwrap_or(lexer.remainder().len());
    Error::new(ErrorImpl::UnterminatedLiteral { literal: String::from(literal) }, lexer.span_of(len))
}

/// Decodes the escapes in `remainder()[start..end]`.
fn unescape(lexer: &Lexer, start: usize, end: usize) -> Result<String, Error> {
    let body = &lexer.remainder()[start..end];
    let mut result = String::with_capacity(body.len());
    let mut chars = body.char_indices();

    while let Some((index, ch)) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        // The literal patterns guarantee a character after every backslash
        let Some((_, escaped)) = chars.next() else {
            break;
        };

        let decoded = match escaped {
            'a' => '\x07',
            'b' => '\x08',
            'f' => '\x0C',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\x0B',
            '\'' => '\'',
            '"' => '"',
            '\\' => '\\',
            _ => {
                let offset = lexer.pos + start + index;
                let sequence = format!("\\{}", escaped);
                return Err(Error::new(
                    ErrorImpl::InvalidEscape { sequence: sequence.clone() },
                    Span {
                        start: lexer.position(offset),
                        end: lexer.position(offset + sequence.len()),
                    },
                ));
            }
        };
        result.push(decoded);
    }

    Ok(result)
}

/// Tokenizes `source`, stopping at the first lexical error.
///
/// The returned tokens always end with `EOF`.
#[instrument(skip_all, fields(file = file.as_deref().unwrap_or("<input>")))]
pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let tokens = Lexer::new(source, file).collect::<Result<Vec<Token>, Error>>()?;
    debug!(tokens = tokens.len(), "tokenized source");
    Ok(tokens)
}

/// Tokenizes `source`, skipping the rest of the line after each lexical error.
pub fn tokenize_recovering(source: String, file: Option<String>) -> (Vec<Token>, Vec<Error>) {
    let mut lex = Lexer::new(source, file);
    let mut tokens = vec![];
    let mut errors = vec![];

    loop {
        match lex.next() {
            Some(Ok(token)) => tokens.push(token),
            Some(Err(error)) => {
                trace!(error = %error, "skipping line after lexical error");
                errors.push(error);
                lex.skip_line();
            }
            None => break,
        }
    }

    (tokens, errors)
}
