//! Template rules: compiled expressions that project or derive a string from a record.
//!
//! A rule is either a bare field path (`request_id`, `http.status`) or an expression
//! in `{{ ... }}` syntax with pipelines, conditionals and a fixed function table.
//! Rules are compiled once at startup and evaluated per line.

mod eval;
mod funcs;
mod lexer;
mod parser;

pub use funcs::{format_seconds, truncate_left, truncate_right, ELLIPSIS};

use crate::model::Record;
use parser::Node;
use thiserror::Error;

/// Output for a null value. Any rendered output containing it is normalised to `""`.
pub const NO_VALUE: &str = "<no value>";

/// Template compilation errors. These are configuration errors and fatal at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The source is not a well-formed template.
    #[error("template {source_text:?}: {message} (at byte {position})")]
    Syntax {
        /// Full template text.
        source_text: String,
        /// Byte offset of the offending action.
        position: usize,
        /// What went wrong.
        message: String,
    },

    /// A call names a function outside the fixed table.
    #[error("function {name:?} not defined")]
    UnknownFunction {
        /// The unknown name.
        name: String,
    },

    /// A bare field path such as `a..b` or `.a`.
    #[error("field path {source_text:?} has an empty segment")]
    EmptyField {
        /// Full rule text.
        source_text: String,
    },
}

/// Evaluation failures. These are per-line and never abort ingestion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// A referenced field is absent from the record.
    #[error("map has no entry for key {key:?}")]
    MissingKey {
        /// The absent key.
        key: String,
    },

    /// A field path descends into a scalar or list.
    #[error("can't evaluate field {key:?} of a non-map value")]
    NotAMap {
        /// The key looked up on the non-map value.
        key: String,
    },

    /// A function got the wrong number of arguments.
    #[error("wrong number of args for {func}: want {expected} got {got}")]
    Arity {
        /// Function name.
        func: String,
        /// Arguments it takes.
        expected: usize,
        /// Arguments it got, including a piped value.
        got: usize,
    },

    /// A function rejected an argument.
    #[error("error calling {func}: {message}")]
    Type {
        /// Function name.
        func: String,
        /// Why the argument was rejected.
        message: String,
    },

    /// A name used in call position is not callable.
    #[error("{name:?} is not a function")]
    NotAFunction {
        /// The name.
        name: String,
    },
}

/// A compiled, reusable template rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Compile `source`. Sources without `{{` are treated as a bare field path.
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        let nodes = if source.contains("{{") {
            parser::parse(source, lexer::lex(source)?)?
        } else {
            parser::bare_field(source)?
        };

        Ok(Self {
            source: source.to_string(),
            nodes,
        })
    }

    /// The text this template was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render against `record`.
    ///
    /// A reference to a missing key fails the evaluation (outside `if`/`with`
    /// conditions). A present-but-null value renders as empty.
    pub fn evaluate(&self, record: &Record) -> Result<String, EvalError> {
        let output = eval::execute(&self.nodes, record)?;
        if output.contains(NO_VALUE) {
            Ok(String::new())
        } else {
            Ok(output)
        }
    }
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
