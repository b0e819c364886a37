use log::debug;
use std::collections::VecDeque;

mod block_parser;
mod call_parser;
mod errors_parser;

pub use crate::ast::{ASTNode, ASTNodeKind, ExpressionKind, StatementKind};
pub use crate::lexer::{Token, TokenKind};
pub use errors_parser::ParserError;

use crate::registry::Operation;

#[derive(Default)]
pub struct Parser {
    tokens: VecDeque<Token>,
    // Returned by `at` once the buffer is drained
    eof: Token,
    pub ast_nodes: Vec<ASTNode>,
}

impl Parser {
    pub fn build_ast(&mut self, tokens: VecDeque<Token>) -> Result<(), ParserError> {
        self.ast_nodes.clear();
        self.tokens = tokens;

        while !self.is_eof() {
            match self.at().kind {
                // Empty lines carry nothing
                TokenKind::EndLine => {
                    self.eat();
                }
                // A line made only of spaces is still an empty line
                TokenKind::Indent if self.is_blank_after_indent() => {
                    self.eat();
                }
                // Any other indented line has no block to belong to
                TokenKind::Indent => return Err(ParserError::UnexpectedToken(self.eat())),
                _ => {
                    let node = self.parse_line(false)?;
                    self.ast_nodes.push(node);
                }
            }
        }

        debug!("Parsed {} top level statements", self.ast_nodes.len());
        Ok(())
    }

    // Parse one full line (and its block body if it opens one)
    fn parse_line(&mut self, in_block: bool) -> Result<ASTNode, ParserError> {
        let line = self.at().line;

        if let Some(op) = self.block_header() {
            if in_block {
                return Err(ParserError::NestedBlock(self.eat()));
            }

            let stmt = match op {
                Operation::If => self.parse_conditional()?,
                _ => self.parse_iteration()?,
            };

            // Block parsers consume their own line ends
            return Ok(ASTNode::new(ASTNodeKind::from(stmt), line));
        }

        let node = self.parse_statement()?;
        self.expect_line_end()?;

        Ok(ASTNode::new(node, line))
    }

    // Entry point of a single statement, without its line end
    fn parse_statement(&mut self) -> Result<ASTNodeKind, ParserError> {
        match self.at().kind {
            TokenKind::Comment => Ok(ASTNodeKind::from(StatementKind::Comment {
                text: self.eat().value,
            })),
            TokenKind::Identifier if self.next_kind() == Some(TokenKind::OpenBracket) => {
                match Operation::from_keyword(&self.at().value) {
                    Some(Operation::Help) => Ok(ASTNodeKind::from(self.parse_help()?)),
                    Some(Operation::Exit) => Ok(ASTNodeKind::from(self.parse_exit()?)),
                    _ => Ok(ASTNodeKind::from(self.parse_expression()?)),
                }
            }
            _ => Ok(ASTNodeKind::from(self.parse_expression()?)),
        }
    }

    fn parse_expression(&mut self) -> Result<ExpressionKind, ParserError> {
        // Assignment: name = <expression>
        if self.at().kind == TokenKind::Identifier && self.next_kind() == Some(TokenKind::Equals) {
            let name = self.eat();

            if Operation::from_keyword(&name.value).is_some() {
                return Err(ParserError::ReservedName(name));
            }

            // We eat the '='
            self.eat();
            let value = self.parse_expression()?;

            return Ok(ExpressionKind::VarAssignment {
                name: name.value,
                value: Box::new(value),
            });
        }

        let left = self.parse_operand()?;

        if self.at().kind == TokenKind::EqualEqual {
            self.eat();
            let right = self.parse_operand()?;

            return Ok(ExpressionKind::Equality {
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    fn parse_operand(&mut self) -> Result<ExpressionKind, ParserError> {
        match self.at().kind {
            TokenKind::Int => self.parse_int_literal(),
            TokenKind::String => Ok(ExpressionKind::StringLiteral {
                value: strip_quotes(&self.eat().value),
            }),
            TokenKind::Bool => Ok(ExpressionKind::BoolLiteral {
                value: self.eat().value == "True",
            }),
            TokenKind::Identifier => {
                if self.next_kind() == Some(TokenKind::OpenBracket) {
                    self.parse_function_call()
                } else {
                    Ok(ExpressionKind::VariableRef {
                        symbol: self.eat().value,
                    })
                }
            }
            _ => Err(ParserError::UnexpectedToken(self.eat())),
        }
    }

    fn parse_int_literal(&mut self) -> Result<ExpressionKind, ParserError> {
        let number = self.eat();

        match number.value.parse::<i64>() {
            Ok(value) => Ok(ExpressionKind::IntLiteral { value }),
            Err(_) => Err(ParserError::IntegerOutOfRange(number)),
        }
    }

    // A line ends with a new line or the end of input. A trailing comment is
    // allowed and dropped.
    fn expect_line_end(&mut self) -> Result<(), ParserError> {
        if self.at().kind == TokenKind::Comment {
            self.eat();
        }

        match self.at().kind {
            TokenKind::EndLine => {
                self.eat();
                Ok(())
            }
            TokenKind::EOF => Ok(()),
            _ => Err(ParserError::UnexpectedToken(self.eat())),
        }
    }

    // IF[ or IN[ at the current position
    fn block_header(&self) -> Option<Operation> {
        if self.at().kind != TokenKind::Identifier || self.next_kind() != Some(TokenKind::OpenBracket) {
            return None;
        }

        Operation::from_keyword(&self.at().value).filter(|op| op.is_block_header())
    }

    // Only indent units up to the end of the line
    fn is_blank_after_indent(&self) -> bool {
        let rest = self.tokens.iter().skip(1).find(|tk| tk.kind != TokenKind::Indent);

        matches!(
            rest.map(|tk| tk.kind),
            Some(TokenKind::EndLine) | Some(TokenKind::EOF) | None
        )
    }

    fn at(&self) -> &Token {
        self.tokens.front().unwrap_or(&self.eof)
    }

    fn next_kind(&self) -> Option<TokenKind> {
        self.tokens.get(1).map(|tk| tk.kind)
    }

    // The final EOF token is never removed, so `at` always sees it
    fn eat(&mut self) -> Token {
        if self.is_eof() {
            return self.at().clone();
        }

        match self.tokens.pop_front() {
            Some(tk) => tk,
            None => self.eof.clone(),
        }
    }

    fn expect_token(&mut self, token_kind: TokenKind) -> Result<Token, ParserError> {
        if self.at().kind != token_kind {
            return Err(ParserError::UnexpectedToken(self.eat()));
        }

        Ok(self.eat())
    }

    // Is end of file
    fn is_eof(&self) -> bool {
        self.at().kind == TokenKind::EOF
    }
}

fn strip_quotes(raw: &str) -> String {
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
        .to_string()
}
