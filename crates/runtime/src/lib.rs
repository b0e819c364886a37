pub mod backend;
pub mod interpreter;
pub mod operations;
pub mod state;
pub mod values;

#[cfg(test)]
mod testing;

extern crate tools;
extern crate frontend;

pub use interpreter::{Flow, Interpreter};
pub use state::ExecutionState;
