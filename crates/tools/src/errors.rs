use std::fmt::Display;

// Final error of a run, once we know on which source line it happened
#[derive(Debug, PartialEq)]
pub struct CodeErr {
    line: usize,
    message: String,
}

impl CodeErr {
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for CodeErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Line: {}\n{}", self.line, self.message)
    }
}

pub trait ReportCodeErr {
    // Lines are already 1-based when they reach this point
    fn to_glob_err(&self, line: usize) -> CodeErr
    where
        Self: std::fmt::Display,
    {
        CodeErr {
            line,
            message: self.to_string(),
        }
    }
}
