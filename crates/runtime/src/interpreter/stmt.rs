use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use tools::errors::{CodeErr, ReportCodeErr};

use super::{Flow, Interpreter, InterpreterError};
use crate::frontend::ast::{ASTNode, ExpressionKind, StatementKind};
use crate::frontend::registry::Operation;
use crate::operations::OperationError;
use crate::state::{ControlContext, ExecutionState};
use crate::values::Value;

impl<W: Write> Interpreter<W> {
    pub(super) fn resolve(
        &mut self,
        stmt: &StatementKind,
        line: usize,
        state: &mut ExecutionState,
    ) -> Result<Flow, CodeErr> {
        match stmt {
            StatementKind::Comment { .. } => Ok(Flow::Continue),
            StatementKind::Exit => {
                info!("Exit requested on line {}", line);
                Ok(Flow::Exit)
            }
            StatementKind::Help { topic } => {
                self.help(topic).map_err(|e| e.to_glob_err(line))?;

                Ok(Flow::Continue)
            }
            StatementKind::Conditional { condition, body } => {
                match self.check_condition(condition, state).map_err(|e| e.to_glob_err(line))? {
                    true => self.run_block(body, ControlContext::InConditional, state),
                    false => Ok(Flow::Continue),
                }
            }
            StatementKind::Iteration { source, body } => {
                let entries = list_dir(source).map_err(|e| InterpreterError::from(e).to_glob_err(line))?;
                info!("Iterating over {} entries of {}", entries.len(), source);

                for (i, active_file) in entries.iter().enumerate() {
                    let context = ControlContext::InIteration {
                        remaining: entries[i + 1..].to_vec(),
                        active_file: active_file.clone(),
                    };

                    if self.run_block(body, context, state)? == Flow::Exit {
                        return Ok(Flow::Exit);
                    }
                }

                Ok(Flow::Continue)
            }
        }
    }

    fn help(&mut self, topic: &str) -> Result<(), InterpreterError> {
        let op = Operation::from_name(topic)
            .ok_or_else(|| InterpreterError::UnknownHelpTopic(topic.to_string()))?;

        writeln!(self.out, "{}", op.description()).map_err(|e| InterpreterError::Output(e.to_string()))
    }

    // Every expression of the condition runs, the last one decides. Only a
    // literal False skips the body.
    fn check_condition(
        &mut self,
        condition: &[ExpressionKind],
        state: &mut ExecutionState,
    ) -> Result<bool, InterpreterError> {
        let mut result = Value::None;

        for expr in condition {
            result = self.evaluate(expr, state)?;
        }

        debug!("Condition evaluated to {}", result);
        Ok(result != Value::Bool(false))
    }

    // The context is cleared whatever way the body ends
    fn run_block(
        &mut self,
        body: &[ASTNode],
        context: ControlContext,
        state: &mut ExecutionState,
    ) -> Result<Flow, CodeErr> {
        state.enter_context(context);
        let flow = self.execute_program(body, state);
        state.leave_context();

        flow
    }
}

// Directory entries in the order the filesystem gives them
fn list_dir(source: &str) -> Result<Vec<PathBuf>, OperationError> {
    let to_io_err = |e: std::io::Error| OperationError::Io(format!("{}: {}", source, e));

    fs::read_dir(source)
        .map_err(to_io_err)?
        .map(|entry| entry.map(|e| e.path()).map_err(to_io_err))
        .collect()
}
