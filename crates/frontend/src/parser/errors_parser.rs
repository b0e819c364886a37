use colored::*;
use thiserror::*;

use super::Token;
use crate::registry::Operation;

#[derive(Error, Debug, PartialEq)]
pub enum ParserError {
    #[error("{} while parsing line {}, column {}: unexpected token {0}", "Error".red().bold(), .0.line, .0.column)]
    UnexpectedToken(Token),

    // The token is the '[' following the unknown name, which is where
    // the line stops making sense
    #[error("{} while parsing line {}, column {}: function {name} does not exist", "Error".red().bold(), .token.line, .token.column)]
    UnknownOperation { name: String, token: Token },

    #[error("{} while parsing {operation} call at line {}, column {}: expected {expected}, found {found}", "Error".red().bold(), .found.line, .found.column)]
    WrongArguments {
        operation: Operation,
        expected: &'static str,
        found: Token,
    },

    #[error("{} while parsing block at line {}: {} and {} bodies can't contain another block", "Error".red().bold(), .0.line, "IF".cyan(), "IN".cyan())]
    NestedBlock(Token),

    #[error("{} while parsing assignment at line {}: -{}- is a function name and can't be a variable", "Error".red().bold(), .0.line, .0.value)]
    ReservedName(Token),

    #[error("{} while parsing line {}: -{}- doesn't produce a value here", "Error".red().bold(), .0.line, .0.value)]
    NotAnExpression(Token),

    #[error("{} while parsing integer -{}- at line {}: value out of range", "Error".red().bold(), .0.value, .0.line)]
    IntegerOutOfRange(Token),

    #[error("{} while parsing {} at line {}: the condition is empty", "Error".red().bold(), "IF".cyan(), .0.line)]
    EmptyCondition(Token),
}

impl ParserError {
    // Token the error points at, used for line/column reporting
    pub fn token(&self) -> &Token {
        match self {
            ParserError::UnexpectedToken(tk) => tk,
            ParserError::UnknownOperation { token, .. } => token,
            ParserError::WrongArguments { found, .. } => found,
            ParserError::NestedBlock(tk) => tk,
            ParserError::ReservedName(tk) => tk,
            ParserError::NotAnExpression(tk) => tk,
            ParserError::IntegerOutOfRange(tk) => tk,
            ParserError::EmptyCondition(tk) => tk,
        }
    }
}
