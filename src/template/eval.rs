//! Tree-walking evaluator for compiled templates.

use super::funcs;
use super::parser::{Command, Node, Operand, Pipeline};
use super::{EvalError, NO_VALUE};
use crate::model::Record;
use serde_json::Value;

/// The value `.` refers to.
#[derive(Clone, Copy)]
enum Dot<'a> {
    /// The record being evaluated.
    Root,
    /// A value bound by `{{ with }}`.
    Value(&'a Value),
}

/// What a reference to an absent key evaluates to.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Missing {
    /// Fail the evaluation.
    Fail,
    /// Yield `null`, so functions in an `if`/`with` condition still run.
    Null,
}

struct Evaluator<'r> {
    root: &'r Record,
}

pub(super) fn execute(nodes: &[Node], root: &Record) -> Result<String, EvalError> {
    let mut out = String::new();
    Evaluator { root }.nodes(nodes, Dot::Root, &mut out)?;
    Ok(out)
}

impl Evaluator<'_> {
    fn nodes(&self, nodes: &[Node], dot: Dot<'_>, out: &mut String) -> Result<(), EvalError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Output(pipeline) => {
                    out.push_str(&render(&self.pipeline(pipeline, dot, Missing::Fail)?));
                }
                Node::If {
                    branches,
                    otherwise,
                } => {
                    let mut taken = None;
                    for (condition, body) in branches {
                        if truthy(&self.condition(condition, dot)?) {
                            taken = Some(body);
                            break;
                        }
                    }
                    self.nodes(taken.unwrap_or(otherwise), dot, out)?;
                }
                Node::With {
                    pipeline,
                    body,
                    otherwise,
                } => {
                    let value = self.condition(pipeline, dot)?;
                    if truthy(&value) {
                        self.nodes(body, Dot::Value(&value), out)?;
                    } else {
                        self.nodes(otherwise, dot, out)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Inside a condition an absent key reads as `null` rather than failing.
    fn condition(&self, pipeline: &Pipeline, dot: Dot<'_>) -> Result<Value, EvalError> {
        self.pipeline(pipeline, dot, Missing::Null)
    }

    fn pipeline(&self, pipeline: &Pipeline, dot: Dot<'_>, missing: Missing) -> Result<Value, EvalError> {
        let mut piped = None;
        for command in &pipeline.commands {
            let value = match command {
                Command::Operand(operand) => self.operand(operand, dot, missing)?,
                Command::Call { func, args } => {
                    self.call(func, args, piped.take(), dot, missing)?
                }
            };
            piped = Some(value);
        }
        Ok(piped.unwrap_or(Value::Null))
    }

    fn call(
        &self,
        func: &str,
        args: &[Operand],
        piped: Option<Value>,
        dot: Dot<'_>,
        missing: Missing,
    ) -> Result<Value, EvalError> {
        match func {
            "and" => self.short_circuit(func, args, piped, dot, missing, false),
            "or" => self.short_circuit(func, args, piped, dot, missing, true),
            _ => {
                let mut values = args
                    .iter()
                    .map(|arg| self.operand(arg, dot, missing))
                    .collect::<Result<Vec<_>, _>>()?;
                values.extend(piped);
                funcs::call(func, &values)
            }
        }
    }

    /// `and`/`or`: return the first argument whose truthiness equals `stop_on`,
    /// otherwise the last argument. Later arguments are not evaluated.
    fn short_circuit(
        &self,
        func: &str,
        args: &[Operand],
        piped: Option<Value>,
        dot: Dot<'_>,
        missing: Missing,
        stop_on: bool,
    ) -> Result<Value, EvalError> {
        if args.is_empty() && piped.is_none() {
            return Err(EvalError::Arity {
                func: func.to_string(),
                expected: 1,
                got: 0,
            });
        }

        let mut last = Value::Null;
        for arg in args {
            last = self.operand(arg, dot, missing)?;
            if truthy(&last) == stop_on {
                return Ok(last);
            }
        }
        Ok(piped.unwrap_or(last))
    }

    fn operand(&self, operand: &Operand, dot: Dot<'_>, missing: Missing) -> Result<Value, EvalError> {
        let field = match operand {
            Operand::Literal(value) => return Ok(value.clone()),
            Operand::Nested(pipeline) => return self.pipeline(pipeline, dot, missing),
            Operand::Root(path) => self.root_field(path),
            Operand::Field(path) => match dot {
                Dot::Root => self.root_field(path),
                Dot::Value(value) => walk(value, path).cloned(),
            },
        };

        match field {
            Err(EvalError::MissingKey { .. }) if missing == Missing::Null => Ok(Value::Null),
            other => other,
        }
    }

    fn root_field(&self, path: &[String]) -> Result<Value, EvalError> {
        match path.split_first() {
            None => Ok(Value::Object(self.root.clone())),
            Some((first, rest)) => walk(entry(self.root, first)?, rest).cloned(),
        }
    }
}

fn entry<'v>(map: &'v Record, key: &str) -> Result<&'v Value, EvalError> {
    map.get(key).ok_or_else(|| EvalError::MissingKey {
        key: key.to_string(),
    })
}

fn walk<'v>(mut current: &'v Value, path: &[String]) -> Result<&'v Value, EvalError> {
    for key in path {
        current = match current {
            Value::Object(map) => entry(map, key)?,
            _ => return Err(EvalError::NotAMap { key: key.clone() }),
        };
    }
    Ok(current)
}

/// Template truthiness: false, zero, null and empty collections are false.
pub(super) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Text form of a value as it appears in template output.
pub(crate) fn render(value: &Value) -> String {
    match value {
        Value::Null => NO_VALUE.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => render_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(render).collect();
            format!("[{}]", parts.join(" "))
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{k}:{}", render(v)))
                .collect();
            format!("map[{}]", parts.join(" "))
        }
    }
}

fn render_number(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
