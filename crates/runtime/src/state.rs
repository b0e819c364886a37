use log::trace;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::frontend::registry::Operation;
use crate::values::{Image, Value};

#[derive(Error, Debug, PartialEq)]
pub enum StateError {
    #[error("Undeclared variable: {0}")]
    UndeclaredVar(String),
}

// Which kind of block body is running, if any. Blocks don't nest so there
// is never more than one.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ControlContext {
    #[default]
    None,
    InConditional,
    InIteration {
        // Entries still waiting after the active one
        remaining: Vec<PathBuf>,
        active_file: PathBuf,
    },
}

// The single mutable record the interpreter works on. A batch run creates
// one and drops it; the REPL keeps the same one for the whole session.
#[derive(Debug, Default)]
pub struct ExecutionState {
    pub last: Value,
    pub last_operation: Option<Operation>,
    pub last_operation_args: Vec<Value>,
    pub loaded_image: Option<Image>,
    pub loaded_image_name: Option<String>,
    variables: HashMap<String, Value>,
    context: ControlContext,
}

impl ExecutionState {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn lookup_var(&self, name: &str) -> Result<&Value, StateError> {
        self.variables
            .get(name)
            .ok_or_else(|| StateError::UndeclaredVar(name.to_string()))
    }

    // Assignment declares the variable if needed and always updates `last`
    pub fn assign_var(&mut self, name: &str, value: Value) {
        trace!("Assigning {} = {}", name, value);

        self.last = value.clone();
        self.variables.insert(name.to_string(), value);
    }

    pub fn variables(&self) -> &HashMap<String, Value> {
        &self.variables
    }

    // Bookkeeping after a dispatched operation returned
    pub fn record_call(&mut self, operation: Operation, args: Vec<Value>, result: Value) {
        if operation == Operation::Load {
            if let Value::Image(img) = &result {
                self.loaded_image = Some(img.clone());
            }
        }

        self.last = result;
        self.last_operation = Some(operation);
        self.last_operation_args = args;
    }

    pub fn context(&self) -> &ControlContext {
        &self.context
    }

    pub fn enter_context(&mut self, context: ControlContext) {
        trace!("Entering context {:?}", context);
        self.context = context;
    }

    pub fn leave_context(&mut self) {
        trace!("Leaving context {:?}", self.context);
        self.context = ControlContext::None;
    }

    // File the current IN iteration is on
    pub fn active_file(&self) -> Option<&Path> {
        match &self.context {
            ControlContext::InIteration { active_file, .. } => Some(active_file),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_empty() {
        let state = ExecutionState::new();

        assert_eq!(state.last, Value::None);
        assert!(state.last_operation.is_none());
        assert!(state.loaded_image.is_none());
        assert!(state.variables().is_empty());
        assert_eq!(state.context(), &ControlContext::None);
    }

    #[test]
    fn lookup_undeclared_var() {
        let state = ExecutionState::new();

        assert_eq!(
            state.lookup_var("people"),
            Err(StateError::UndeclaredVar("people".into()))
        );
    }

    #[test]
    fn assign_sets_last_but_not_operation() {
        let mut state = ExecutionState::new();
        state.assign_var("n", Value::Int(3));

        assert_eq!(state.lookup_var("n"), Ok(&Value::Int(3)));
        assert_eq!(state.last, Value::Int(3));
        assert!(state.last_operation.is_none());
    }

    #[test]
    fn record_load_replaces_image() {
        let mut state = ExecutionState::new();
        let img = Image::filled(2, 2, [1, 2, 3, 255]);

        state.record_call(
            Operation::Load,
            vec![Value::Str("a.png".into())],
            Value::Image(img.clone()),
        );

        assert_eq!(state.loaded_image, Some(img));
        assert_eq!(state.last_operation, Some(Operation::Load));
        assert_eq!(state.last_operation_args, vec![Value::Str("a.png".into())]);
    }

    #[test]
    fn active_file_only_in_iteration() {
        let mut state = ExecutionState::new();
        state.enter_context(ControlContext::InConditional);
        assert!(state.active_file().is_none());

        state.enter_context(ControlContext::InIteration {
            remaining: vec![],
            active_file: PathBuf::from("dir/a.png"),
        });
        assert_eq!(state.active_file(), Some(Path::new("dir/a.png")));

        state.leave_context();
        assert!(state.active_file().is_none());
    }
}
