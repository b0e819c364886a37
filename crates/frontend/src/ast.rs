use std::fmt::Display;

use crate::registry::Operation;

#[derive(Debug, PartialEq, Clone)]
pub struct ASTNode {
    pub node: ASTNodeKind,
    pub line: usize,
}

impl ASTNode {
    pub fn new(node: ASTNodeKind, line: usize) -> Self {
        Self { node, line }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum ASTNodeKind {
    Statement(StatementKind),
    Expression(ExpressionKind),
}

impl From<ExpressionKind> for ASTNodeKind {
    fn from(value: ExpressionKind) -> Self {
        ASTNodeKind::Expression(value)
    }
}

impl From<StatementKind> for ASTNodeKind {
    fn from(value: StatementKind) -> Self {
        ASTNodeKind::Statement(value)
    }
}

// Block bodies hold the same node shape as the top level, so the
// interpreter never has to care where a statement lives.
#[derive(Debug, PartialEq, Clone)]
pub enum StatementKind {
    // IF[cond] followed by indented lines. The condition is a run of
    // expressions, the last one decides.
    Conditional {
        condition: Vec<ExpressionKind>,
        body: Vec<ASTNode>,
    },
    // IN["dir"] followed by indented lines, run once per directory entry
    Iteration {
        source: String,
        body: Vec<ASTNode>,
    },
    // Single line, never owns what comes after it
    Comment {
        text: String,
    },
    Help {
        topic: String,
    },
    Exit,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ExpressionKind {
    BoolLiteral {
        value: bool,
    },
    IntLiteral {
        value: i64,
    },
    // Quotes are already stripped here
    StringLiteral {
        value: String,
    },
    VariableRef {
        symbol: String,
    },
    Equality {
        left: Box<ExpressionKind>,
        right: Box<ExpressionKind>,
    },
    VarAssignment {
        name: String,
        value: Box<ExpressionKind>,
    },
    // Arguments are only StringLiteral, IntLiteral or VariableRef
    FunctionCall {
        operation: Operation,
        args: Vec<ExpressionKind>,
    },
}

impl Display for ExpressionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpressionKind::BoolLiteral { value } => {
                write!(f, "{}", if *value { "True" } else { "False" })
            }
            ExpressionKind::IntLiteral { value } => write!(f, "{}", value),
            ExpressionKind::StringLiteral { value } => write!(f, "\"{}\"", value),
            ExpressionKind::VariableRef { symbol } => write!(f, "{}", symbol),
            ExpressionKind::Equality { left, right } => write!(f, "{} == {}", left, right),
            ExpressionKind::VarAssignment { name, value } => write!(f, "{} = {}", name, value),
            ExpressionKind::FunctionCall { operation, args } => {
                write!(f, "{}[", operation.keyword())?;

                for (idx, arg) in args.iter().enumerate() {
                    write!(f, "{}", arg)?;

                    // We write a comma only if there is another value after
                    if idx != args.len() - 1 {
                        write!(f, ", ")?;
                    }
                }

                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_function_call() {
        let call = ExpressionKind::FunctionCall {
            operation: Operation::CountInRegion,
            args: vec![
                ExpressionKind::IntLiteral { value: 0 },
                ExpressionKind::IntLiteral { value: -5 },
                ExpressionKind::VariableRef { symbol: "w".into() },
                ExpressionKind::IntLiteral { value: 10 },
            ],
        };

        assert_eq!(call.to_string(), "CountInRegion[0, -5, w, 10]");
    }

    #[test]
    fn display_assignment_of_equality() {
        let expr = ExpressionKind::VarAssignment {
            name: "same".into(),
            value: Box::new(ExpressionKind::Equality {
                left: Box::new(ExpressionKind::StringLiteral { value: "a".into() }),
                right: Box::new(ExpressionKind::BoolLiteral { value: false }),
            }),
        };

        assert_eq!(expr.to_string(), "same = \"a\" == False");
    }
}
