//! Turns a failed parse into the message shown to the user.
//!
//! A call to a name the registry doesn't know is a misspelled function: we
//! propose the closest registered operations. A lexer error is looked at
//! through the name written before the first `[` of the failing line. When
//! that name is registered (as a name or as the `IF`/`IN` keyword) the
//! problem is elsewhere on the line and we report a plain syntax error.
//! Every other parser error is an "unexpected token" and is reported as is.

use colored::*;
use std::fmt::Display;

use tools::fuzzy::{closest, MAX_EDIT_DISTANCE};

use crate::parser::ParserError;
use crate::registry::Operation;
use crate::FrontendError;

#[derive(Debug, PartialEq)]
pub enum Diagnostic {
    SyntaxError {
        line: usize,
        column: usize,
        character: char,
    },
    UnknownFunction {
        name: String,
    },
    Suggestions {
        name: String,
        candidates: Vec<Operation>,
    },
    UnexpectedToken {
        line: usize,
        column: usize,
        token: String,
    },
}

impl Diagnostic {
    pub fn from_error(source: &str, error: &FrontendError) -> Diagnostic {
        match error {
            FrontendError::Lexer(e) => {
                unexpected_character(source, e.line(), e.column(), e.character())
            }
            // The parser already knows which name it couldn't find
            FrontendError::Parser(ParserError::UnknownOperation { name, .. }) => suggest(name),
            FrontendError::Parser(e) => {
                let token = e.token();

                Diagnostic::UnexpectedToken {
                    line: token.line,
                    column: token.column,
                    token: token.to_string(),
                }
            }
        }
    }

    // Every parse failure ends the run
    pub fn exit_code(&self) -> i32 {
        1
    }
}

fn is_registered(name: &str) -> bool {
    Operation::ALL
        .iter()
        .any(|op| op.name() == name || op.keyword() == name)
}

fn unexpected_character(source: &str, line: usize, column: usize, character: char) -> Diagnostic {
    let failing_line = source.lines().nth(line.saturating_sub(1)).unwrap_or("");
    let name = failing_line.split('[').next().unwrap_or("").trim();

    // A registered name, or something that can't be a name at all, means
    // the problem is elsewhere on the line
    let is_word = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic());
    if !is_word || is_registered(name) {
        return Diagnostic::SyntaxError {
            line,
            column,
            character,
        };
    }

    suggest(name)
}

// Closest registered operations, compared case insensitively
fn suggest(name: &str) -> Diagnostic {
    let lowercase_names = Operation::ALL
        .iter()
        .map(|op| op.name().to_lowercase())
        .collect::<Vec<_>>();
    let lowercase_refs = lowercase_names.iter().map(String::as_str).collect::<Vec<_>>();

    let candidates = closest(&name.to_lowercase(), &lowercase_refs, MAX_EDIT_DISTANCE)
        .into_iter()
        .filter_map(|m| Operation::ALL.into_iter().find(|op| op.name().to_lowercase() == m))
        .collect::<Vec<_>>();

    if candidates.is_empty() {
        Diagnostic::UnknownFunction { name: name.into() }
    } else {
        Diagnostic::Suggestions {
            name: name.into(),
            candidates,
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::SyntaxError {
                line,
                column,
                character,
            } => {
                writeln!(f, "{} on line {}, column {}.", "Syntax error".red().bold(), line, column)?;
                write!(f, "Unexpected character: {:?}", character)
            }
            Diagnostic::UnknownFunction { name } => {
                write!(f, "Function {} does not exist.", name.yellow())
            }
            Diagnostic::Suggestions { name, candidates } => {
                writeln!(
                    f,
                    "Function '{}' does not exist. Did you mean one of these?",
                    name.yellow()
                )?;
                write!(f, "{}", "-".repeat(10))?;

                for op in candidates {
                    write!(f, "\n{}: {}", op.keyword().cyan(), op.description())?;
                }

                Ok(())
            }
            Diagnostic::UnexpectedToken {
                line,
                column,
                token,
            } => {
                writeln!(f, "{} on line {}, column {}.", "Syntax error".red().bold(), line, column)?;
                write!(f, "Unexpected token: {}", token)
            }
        }
    }
}
