mod expr;
mod interp_errors;
mod stmt;

use std::io::{self, Stdout, Write};

use tools::errors::{CodeErr, ReportCodeErr};

pub use interp_errors::InterpreterError;

use crate::backend::Backend;
use crate::frontend::ast::{ASTNode, ASTNodeKind};
use crate::state::ExecutionState;

// What the caller should do once a run of statements returns
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Interpreter<W: Write = Stdout> {
    backend: Box<dyn Backend>,
    out: W,
}

impl Interpreter<Stdout> {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self::with_output(backend, io::stdout())
    }
}

impl<W: Write> Interpreter<W> {
    // Say and Help print through `out`
    pub fn with_output(backend: Box<dyn Backend>, out: W) -> Self {
        Self { backend, out }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn execute_program(
        &mut self,
        nodes: &[ASTNode],
        state: &mut ExecutionState,
    ) -> Result<Flow, CodeErr> {
        for n in nodes {
            if self.interpret_node(n, state)? == Flow::Exit {
                return Ok(Flow::Exit);
            }
        }

        Ok(Flow::Continue)
    }

    fn interpret_node(
        &mut self,
        node: &ASTNode,
        state: &mut ExecutionState,
    ) -> Result<Flow, CodeErr> {
        match &node.node {
            ASTNodeKind::Expression(expr) => {
                self.evaluate(expr, state)
                    .map_err(|e| e.to_glob_err(node.line))?;

                Ok(Flow::Continue)
            }
            // Statements own bodies whose nodes carry their own lines
            ASTNodeKind::Statement(stmt) => self.resolve(stmt, node.line, state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{detection, run, run_with, FakeBackend};
    use crate::values::Value;

    #[test]
    fn say_prints_argument() {
        let (out, _) = run("Say[\"hello\"]\n");
        assert_eq!(out, "hello\n");
    }

    #[test]
    fn if_false_skips_body() {
        let (out, state) = run("IF[False]\n    n = 3\n    Say[\"never\"]\n");

        assert_eq!(out, "");
        assert!(state.variables().is_empty());
        assert_eq!(state.last, Value::None);
    }

    #[test]
    fn if_equality() {
        let (hit, _) = run("IF[1==1]\n    Say[\"hit\"]\n");
        let (miss, _) = run("IF[1==2]\n    Say[\"miss\"]\n");

        assert_eq!(hit, "hit\n");
        assert_eq!(miss, "");
    }

    #[test]
    fn if_non_bool_is_truthy() {
        let (out, _) = run("IF[0]\n    Say[\"zero\"]\n");
        assert_eq!(out, "zero\n");
    }

    #[test]
    fn body_ends_at_unindented_line() {
        let (out, _) = run("IF[False]\n    Say[\"in\"]\nSay[\"out\"]\n");
        assert_eq!(out, "out\n");
    }

    #[test]
    fn variables_and_equality() {
        let (out, state) = run("n = 2\nm = n\nIF[m == 2]\n    Say[m]\n");

        assert_eq!(out, "2\n");
        assert_eq!(state.lookup_var("m"), Ok(&Value::Int(2)));
    }

    #[test]
    fn runs_are_deterministic() {
        let program = "a = 1\nIF[a == 1]\n    b = \"x\"\n    Say[b]\nSay[]\n";

        let (out1, state1) = run(program);
        let (out2, state2) = run(program);

        assert_eq!(out1, out2);
        assert_eq!(state1.variables(), state2.variables());
    }

    #[test]
    fn bare_literal_keeps_last() {
        let (out, state) = run("n = 5\n7\nn\nSay[]\n");

        assert_eq!(out, "5\n");
        assert_eq!(state.last, Value::Int(5));
    }

    #[test]
    fn help_does_not_touch_state() {
        let (out, state) = run("Help[\"Load\"]\nHelp[Load]\n");

        assert_eq!(out, "Load an image\nLoad an image\n");
        assert_eq!(state.last, Value::None);
        assert!(state.last_operation.is_none());
    }

    #[test]
    fn exit_stops_program() {
        let backend = FakeBackend::default();
        let mut interpreter = Interpreter::with_output(Box::new(backend), Vec::new());
        let mut state = ExecutionState::new();
        let nodes = frontend::parse_source("Say[\"a\"]\nExit[]\nSay[\"b\"]\n").unwrap();

        let flow = interpreter.execute_program(&nodes, &mut state).unwrap();

        assert_eq!(flow, Flow::Exit);
        assert_eq!(String::from_utf8_lossy(interpreter.output()), "a\n");
    }

    #[test]
    fn undefined_variable_reports_line() {
        let backend = FakeBackend::default();
        let mut interpreter = Interpreter::with_output(Box::new(backend), Vec::new());
        let mut state = ExecutionState::new();
        let nodes = frontend::parse_source("n = 1\n\nSay[missing]\n").unwrap();

        let err = interpreter.execute_program(&nodes, &mut state).unwrap_err();

        assert_eq!(err.line(), 3);
        assert!(err.message().contains("missing"));
    }

    #[test]
    fn error_inside_block_reports_body_line() {
        let backend = FakeBackend::default();
        let mut interpreter = Interpreter::with_output(Box::new(backend), Vec::new());
        let mut state = ExecutionState::new();
        let nodes = frontend::parse_source("IF[True]\n    Say[\"ok\"]\n    Size[]\n").unwrap();

        let err = interpreter.execute_program(&nodes, &mut state).unwrap_err();

        assert_eq!(err.line(), 3);
        assert_eq!(state.context(), &crate::state::ControlContext::None);
    }

    #[test]
    fn pipeline_with_detections() {
        let backend = FakeBackend::with_detections(vec![
            detection("person", 0, (1., 2., 10., 20.)),
            detection("dog", 16, (5., 5., 8., 8.)),
        ]);

        let (out, state) = run_with(
            backend,
            "Load[\"street.png\"]\nDetect[\"person\"]\nSay[]\nn = Count[]\nSay[n]\n",
        );

        assert_eq!(out, "person 0.90 [1 2 10 20]\n1\n");
        assert_eq!(state.last, Value::Int(1));
        assert_eq!(state.last_operation, Some(frontend::registry::Operation::Count));
    }

    #[test]
    fn say_uses_requested_labels() {
        let backend = FakeBackend::with_detections(vec![detection("person", 0, (0., 0., 4., 4.))]);

        let (out, _) = run_with(backend, "Load[\"a.png\"]\nDetect[\"person\"]\nSay[\"ignored\"]\n");

        assert_eq!(out, "person 0.90 [0 0 4 4]\n");
    }

    #[test]
    fn size_is_stored_in_variable() {
        let (_, state) = run_with(FakeBackend::default(), "Load[\"a.png\"]\ns = Size[]\n");

        assert_eq!(
            state.lookup_var("s"),
            Ok(&Value::Size {
                width: 16,
                height: 16
            })
        );
    }
}
