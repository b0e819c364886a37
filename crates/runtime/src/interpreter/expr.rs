use log::debug;
use std::io::Write;

use super::{Interpreter, InterpreterError};
use crate::frontend::ast::ExpressionKind;
use crate::frontend::registry::Operation;
use crate::operations;
use crate::state::ExecutionState;
use crate::values::{Detections, Value};

impl<W: Write> Interpreter<W> {
    pub(super) fn evaluate(
        &mut self,
        expr: &ExpressionKind,
        state: &mut ExecutionState,
    ) -> Result<Value, InterpreterError> {
        match expr {
            ExpressionKind::BoolLiteral { value } => Ok(Value::Bool(*value)),
            ExpressionKind::IntLiteral { value } => Ok(Value::Int(*value)),
            ExpressionKind::StringLiteral { value } => Ok(Value::Str(value.clone())),
            ExpressionKind::VariableRef { symbol } => Ok(state.lookup_var(symbol)?.clone()),
            ExpressionKind::Equality { left, right } => {
                let lhs = self.evaluate(left, state)?;
                let rhs = self.evaluate(right, state)?;

                Ok(Value::Bool(lhs == rhs))
            }
            ExpressionKind::VarAssignment { name, value } => {
                let assignment_value = self.evaluate(value, state)?;
                state.assign_var(name, assignment_value.clone());

                Ok(assignment_value)
            }
            ExpressionKind::FunctionCall { operation, args } => {
                // We evaluate each of the argument
                let mut values = Vec::with_capacity(args.len());
                for a in args {
                    values.push(self.evaluate(a, state)?);
                }

                self.call(*operation, values, state)
            }
        }
    }

    fn call(
        &mut self,
        operation: Operation,
        args: Vec<Value>,
        state: &mut ExecutionState,
    ) -> Result<Value, InterpreterError> {
        if operation == Operation::Say {
            return self.say(args.first(), state);
        }

        let func = operations::handler(operation).ok_or(InterpreterError::NotCallable(operation))?;

        debug!("Dispatching {}[{}]", operation.name(), args.len());
        let result = func(&args, state, self.backend.as_mut())?;
        state.record_call(operation, args, result.clone());

        Ok(result)
    }

    // Say reads the state but never changes it
    fn say(
        &mut self,
        arg: Option<&Value>,
        state: &ExecutionState,
    ) -> Result<Value, InterpreterError> {
        let text = match (&state.last, state.last_operation) {
            (Value::Detections(detections), Some(op)) if op.yields_detections() => {
                detection_listing(detections, &state.last_operation_args)
            }
            _ => arg.unwrap_or(&state.last).to_string(),
        };

        writeln!(self.out, "{}", text).map_err(|e| InterpreterError::Output(e.to_string()))?;

        Ok(Value::None)
    }
}

// One line per detection: label, confidence, box. The label is the one the
// user asked for when there is one at the same position.
fn detection_listing(detections: &Detections, requested: &[Value]) -> String {
    detections
        .items
        .iter()
        .enumerate()
        .map(|(i, det)| {
            let label = requested
                .get(i)
                .and_then(Value::as_str)
                .unwrap_or(&det.label);

            format!("{} {:.2} {}", label, det.confidence, det.bbox)
        })
        .collect::<Vec<String>>()
        .join("\n")
}
