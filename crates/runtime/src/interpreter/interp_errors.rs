use colored::*;
use thiserror::Error;

use tools::errors::ReportCodeErr;
use crate::frontend::registry::Operation;
use crate::operations::OperationError;
use crate::state::StateError;

#[derive(Error, Debug, PartialEq)]
pub enum InterpreterError {
    #[error("{} while evaluating expression: {0}", "Error".red().bold())]
    UndefinedVariable(#[from] StateError),

    #[error("{} in Help: no function named '{0}'", "Error".red().bold())]
    UnknownHelpTopic(String),

    #[error("{} {0} can't be called as a plain operation", "Error".red().bold())]
    NotCallable(Operation),

    #[error("{} while writing output: {0}", "Error".red().bold())]
    Output(String),

    #[error("{0}")]
    Operation(#[from] OperationError),
}

// Implement global trait for final error
impl ReportCodeErr for InterpreterError {}
