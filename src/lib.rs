#![allow(clippy::module_inception)]

use std::sync::Arc;

use serde::Serialize;

use crate::{
    ast::statements::SourceFile,
    config::ParserConfig,
    errors::errors::{Error, ErrorTip},
    lexer::lexer::{tokenize, tokenize_recovering},
};

pub mod ast;
pub mod config;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod printer;

extern crate regex;

pub use errors::errors::{ErrorKind, ParseError};

/// A byte offset into a named source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position(pub u32, pub Arc<String>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// Span from the start of `self` to the end of `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span {
            start: self.start.clone(),
            end: other.end.clone(),
        }
    }
}

/// Parses femto source text into a [`SourceFile`] using the default configuration.
pub fn parse(source: &str) -> Result<SourceFile, ParseError> {
    parse_with_config(source, &ParserConfig::default())
}

pub fn parse_with_config(source: &str, config: &ParserConfig) -> Result<SourceFile, ParseError> {
    let tokens = tokenize(source.to_string(), Some(config.file_name.clone()))?;
    let (_, result) = parser::parser::parse(tokens, config);
    result
}

/// Parses as much of `source` as possible, collecting every error instead of
/// stopping at the first one.
///
/// Statements that failed to parse are absent from the returned tree; all others
/// are complete. Errors are ordered by source position.
pub fn parse_recovering(source: &str, config: &ParserConfig) -> (SourceFile, Vec<Error>) {
    let (tokens, mut errors) = tokenize_recovering(source.to_string(), Some(config.file_name.clone()));
    let (file, parse_errors) = parser::parser::parse_recovering(tokens, config);

    errors.extend(parse_errors);
    errors.sort_by_key(|error| error.get_position().0);

    (file, errors)
}

/// Finds the line containing byte `position`.
///
/// Returns the 1-based line number, the line text (including its terminator)
/// and the offset of `position` within that line. A position equal to the
/// source length resolves to the end of the last line.
pub fn get_line_at_position(source: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;

    if pos > source.len() {
        return None;
    }

    let mut start = 0;
    let mut line_number = 1;
    let mut last = (1, String::new(), 0);

    for line in source.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return Some((line_number, line.to_string(), pos - start));
        }

        last = (line_number, line.to_string(), start);
        start = end;
        line_number += 1;
    }

    // End of input
    let (line_number, line, line_start) = last;
    if line.ends_with('\n') {
        Some((line_number + 1, String::new(), 0))
    } else {
        Some((line_number, line, pos - line_start))
    }
}


/// Renders an error as a caret diagnostic against the source it came from.
pub fn render_error(error: &Error, source: &str) -> String {
    /*
        Error: UnexpectedToken (expected `)`, found end of input)
        -> main.fm
           |
         1 | f(1, 2
           | ------^
    */

    let position = error.get_position();
    let mut output = String::new();

    if let ErrorTip::None = error.get_tip() {
        output.push_str(&format!("Error: {}\n", error.get_error_name()));
    } else {
        output.push_str(&format!("Error: {} ({})\n", error.get_error_name(), error.get_tip()));
    }
    output.push_str(&format!("-> {}\n", position.1));

    let Some((line, line_text, line_pos)) = get_line_at_position(source, position.0) else {
        return output;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    output.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    output.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

    output.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));
    output
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string.len() - string.trim_start_matches([' ', '\t']).len();
    (String::from(&string[start..]), start)
}
