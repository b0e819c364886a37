use log::trace;

use super::errors_parser::ParserError;
use super::{strip_quotes, ASTNode, Parser, StatementKind, TokenKind};
use crate::registry::Operation;

impl Parser {
    // "IF" "[" Statement+ "]" EOL (Indent Statement)*
    pub(super) fn parse_conditional(&mut self) -> Result<StatementKind, ParserError> {
        let header = self.eat();
        self.expect_token(TokenKind::OpenBracket)?;

        let mut condition = vec![];
        while self.at().kind != TokenKind::CloseBracket {
            if matches!(self.at().kind, TokenKind::EndLine | TokenKind::EOF) {
                return Err(ParserError::UnexpectedToken(self.eat()));
            }

            condition.push(self.parse_expression()?);
        }

        if condition.is_empty() {
            return Err(ParserError::EmptyCondition(header));
        }

        // We eat the ']'
        self.eat();
        self.expect_line_end()?;

        let body = self.parse_block_body()?;

        Ok(StatementKind::Conditional { condition, body })
    }

    // "IN" "[" String "]" EOL (Indent Statement)*
    pub(super) fn parse_iteration(&mut self) -> Result<StatementKind, ParserError> {
        let header = self.eat();
        self.expect_token(TokenKind::OpenBracket)?;

        if self.at().kind != TokenKind::String {
            return Err(ParserError::WrongArguments {
                operation: Operation::In,
                expected: "one directory string",
                found: header,
            });
        }
        let source = strip_quotes(&self.eat().value);

        self.expect_token(TokenKind::CloseBracket)?;
        self.expect_line_end()?;

        let body = self.parse_block_body()?;

        Ok(StatementKind::Iteration { source, body })
    }

    // The body is the run of lines starting with exactly one indent unit.
    // The first line without it (empty lines included) closes the block.
    fn parse_block_body(&mut self) -> Result<Vec<ASTNode>, ParserError> {
        let mut body = vec![];

        while self.at().kind == TokenKind::Indent {
            // We eat the indent
            self.eat();

            match self.at().kind {
                // Indented but empty line
                TokenKind::EndLine => {
                    self.eat();
                }
                TokenKind::EOF => break,
                // Deeper indented but still empty
                TokenKind::Indent if self.is_blank_after_indent() => {
                    while self.at().kind == TokenKind::Indent {
                        self.eat();
                    }
                    // We eat the line end
                    self.eat();
                }
                // A second indent unit would mean a deeper block
                TokenKind::Indent => return Err(ParserError::NestedBlock(self.eat())),
                _ => body.push(self.parse_line(true)?),
            }
        }

        trace!("Parsed block body of {} statements", body.len());
        Ok(body)
    }
}
