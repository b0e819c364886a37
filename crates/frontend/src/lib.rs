pub mod ast;
pub mod diagnostic;
pub mod lexer;
pub mod parser;
pub mod registry;

extern crate tools;

use thiserror::Error;

use ast::ASTNode;
use lexer::{Lexer, LexerError};
use parser::{Parser, ParserError};

#[derive(Debug, Error, PartialEq)]
pub enum FrontendError {
    #[error("{0}")]
    Lexer(#[from] LexerError),

    #[error("{0}")]
    Parser(#[from] ParserError),
}

// Source text to program, the whole front end in one call
pub fn parse_source(source: &str) -> Result<Vec<ASTNode>, FrontendError> {
    let mut lexer: Lexer = Default::default();
    let mut parser: Parser = Default::default();

    lexer.tokenize(source.to_string())?;
    parser.build_ast(std::mem::take(&mut lexer.tokens))?;

    Ok(parser.ast_nodes)
}
