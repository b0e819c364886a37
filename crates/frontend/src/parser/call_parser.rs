use super::errors_parser::ParserError;
use super::{strip_quotes, ExpressionKind, Parser, StatementKind, TokenKind};
use crate::lexer::Token;
use crate::registry::Operation;

// Accepted argument shapes, checked right after a call is parsed.
// Variables are accepted anywhere a literal is, their type is only known
// at run time.
enum ArgShape {
    NoArg,
    OptionalString,
    Strings,
    OptionalInt,
    OptionalValue,
    FourInts,
}

impl ArgShape {
    fn of(operation: Operation) -> ArgShape {
        match operation {
            Operation::Load | Operation::Save | Operation::Replace => ArgShape::OptionalString,
            Operation::Detect | Operation::Classify | Operation::Segment => ArgShape::Strings,
            Operation::Count => ArgShape::OptionalInt,
            Operation::Say => ArgShape::OptionalValue,
            Operation::CountInRegion => ArgShape::FourInts,
            _ => ArgShape::NoArg,
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            ArgShape::NoArg => "no argument",
            ArgShape::OptionalString => "at most one string",
            ArgShape::Strings => "only strings",
            ArgShape::OptionalInt => "at most one integer",
            ArgShape::OptionalValue => "at most one value",
            ArgShape::FourInts => "exactly four integers",
        }
    }

    fn accepts(&self, args: &[ExpressionKind]) -> bool {
        let is_string = |a: &ExpressionKind| {
            matches!(a, ExpressionKind::StringLiteral { .. } | ExpressionKind::VariableRef { .. })
        };
        let is_int = |a: &ExpressionKind| {
            matches!(a, ExpressionKind::IntLiteral { .. } | ExpressionKind::VariableRef { .. })
        };

        match self {
            ArgShape::NoArg => args.is_empty(),
            ArgShape::OptionalString => args.len() <= 1 && args.iter().all(is_string),
            ArgShape::Strings => args.iter().all(is_string),
            ArgShape::OptionalInt => args.len() <= 1 && args.iter().all(is_int),
            ArgShape::OptionalValue => args.len() <= 1,
            ArgShape::FourInts => args.len() == 4 && args.iter().all(is_int),
        }
    }
}

impl Parser {
    // Name "[" ArgList? "]"
    pub(super) fn parse_function_call(&mut self) -> Result<ExpressionKind, ParserError> {
        let name = self.eat();

        let operation = match Operation::from_keyword(&name.value) {
            Some(op) => op,
            None => {
                return Err(ParserError::UnknownOperation {
                    name: name.value,
                    token: self.at().clone(),
                })
            }
        };

        // Those only exist as full statements
        if operation.is_block_header() || matches!(operation, Operation::Help | Operation::Exit) {
            return Err(ParserError::NotAnExpression(name));
        }

        self.expect_token(TokenKind::OpenBracket)?;
        let args = self.parse_args()?;
        self.expect_token(TokenKind::CloseBracket)?;

        let shape = ArgShape::of(operation);
        if !shape.accepts(&args) {
            return Err(ParserError::WrongArguments {
                operation,
                expected: shape.expected(),
                found: name,
            });
        }

        Ok(ExpressionKind::FunctionCall { operation, args })
    }

    // Arg ("," Arg)*, stops before the closing bracket
    fn parse_args(&mut self) -> Result<Vec<ExpressionKind>, ParserError> {
        let mut args = vec![];

        if self.at().kind == TokenKind::CloseBracket {
            return Ok(args);
        }

        loop {
            let arg = match self.at().kind {
                TokenKind::String => ExpressionKind::StringLiteral {
                    value: strip_quotes(&self.eat().value),
                },
                TokenKind::Int => self.parse_int_literal()?,
                TokenKind::Identifier => ExpressionKind::VariableRef {
                    symbol: self.eat().value,
                },
                _ => return Err(ParserError::UnexpectedToken(self.eat())),
            };
            args.push(arg);

            if self.at().kind == TokenKind::Comma {
                self.eat();
            } else {
                break;
            }
        }

        Ok(args)
    }

    // Help["Name"] or Help[Name]: the topic is a raw name, never a variable
    pub(super) fn parse_help(&mut self) -> Result<StatementKind, ParserError> {
        let help = self.eat();
        self.expect_token(TokenKind::OpenBracket)?;

        let topic = match self.at().kind {
            TokenKind::String => strip_quotes(&self.eat().value),
            TokenKind::Identifier => self.eat().value,
            _ => return Err(wrong_help_args(help)),
        };

        if self.at().kind != TokenKind::CloseBracket {
            return Err(wrong_help_args(help));
        }
        self.eat();

        Ok(StatementKind::Help { topic })
    }

    pub(super) fn parse_exit(&mut self) -> Result<StatementKind, ParserError> {
        let exit = self.eat();
        self.expect_token(TokenKind::OpenBracket)?;

        if self.at().kind != TokenKind::CloseBracket {
            return Err(ParserError::WrongArguments {
                operation: Operation::Exit,
                expected: ArgShape::NoArg.expected(),
                found: exit,
            });
        }
        self.eat();

        Ok(StatementKind::Exit)
    }
}

fn wrong_help_args(help: Token) -> ParserError {
    ParserError::WrongArguments {
        operation: Operation::Help,
        expected: "one function name",
        found: help,
    }
}
