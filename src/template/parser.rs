//! Parser from lexed segments to an evaluable node tree.

use super::funcs;
use super::lexer::{Segment, Token};
use super::TemplateError;
use serde_json::Value;

/// A node of the compiled template.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Node {
    Text(String),
    Output(Pipeline),
    If {
        branches: Vec<(Pipeline, Vec<Node>)>,
        otherwise: Vec<Node>,
    },
    With {
        pipeline: Pipeline,
        body: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

/// `cmd | cmd | ...`; the result of each stage is appended to the next call's arguments.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Pipeline {
    pub(super) commands: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Command {
    Call { func: String, args: Vec<Operand> },
    Operand(Operand),
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Operand {
    Field(Vec<String>),
    Root(Vec<String>),
    Literal(Value),
    Nested(Pipeline),
}

/// How a nested node list ended.
enum Terminator {
    Eof,
    End,
    Else(Option<Pipeline>),
}

pub(super) fn parse(source: &str, segments: Vec<Segment>) -> Result<Vec<Node>, TemplateError> {
    let mut parser = Parser {
        source,
        segments: segments.into_iter(),
    };

    let (nodes, terminator) = parser.parse_list()?;
    match terminator {
        Terminator::Eof => Ok(nodes),
        Terminator::End => Err(parser.error(0, "unexpected {{end}}")),
        Terminator::Else(_) => Err(parser.error(0, "unexpected {{else}}")),
    }
}

/// Field projection without going through the lexer, so bare names can contain
/// characters the expression syntax does not allow (`request-id`, `@timestamp`).
pub(super) fn bare_field(source: &str) -> Result<Vec<Node>, TemplateError> {
    let path: Vec<String> = source.split('.').map(str::to_string).collect();
    if path.iter().any(String::is_empty) {
        return Err(TemplateError::EmptyField {
            source_text: source.to_string(),
        });
    }

    Ok(vec![Node::Output(Pipeline {
        commands: vec![Command::Operand(Operand::Field(path))],
    })])
}

struct Parser<'a> {
    source: &'a str,
    segments: std::vec::IntoIter<Segment>,
}

impl Parser<'_> {
    fn parse_list(&mut self) -> Result<(Vec<Node>, Terminator), TemplateError> {
        let mut nodes = Vec::new();

        while let Some(segment) = self.segments.next() {
            let (tokens, position) = match segment {
                Segment::Text(text) => {
                    nodes.push(Node::Text(text));
                    continue;
                }
                Segment::Action { tokens, position } => (tokens, position),
            };

            match tokens.first() {
                Some(Token::Ident(word)) if word == "if" => {
                    nodes.push(self.parse_if(&tokens[1..], position)?);
                }
                Some(Token::Ident(word)) if word == "with" => {
                    nodes.push(self.parse_with(&tokens[1..], position)?);
                }
                Some(Token::Ident(word)) if word == "end" => {
                    if tokens.len() > 1 {
                        return Err(self.error(position, "unexpected tokens after {{end}}"));
                    }
                    return Ok((nodes, Terminator::End));
                }
                Some(Token::Ident(word)) if word == "else" => {
                    let rest = &tokens[1..];
                    let chained = match rest.first() {
                        None => None,
                        Some(Token::Ident(word)) if word == "if" => {
                            Some(self.parse_pipeline(&rest[1..], position)?)
                        }
                        Some(_) => {
                            return Err(self.error(position, "unexpected tokens after {{else}}"));
                        }
                    };
                    return Ok((nodes, Terminator::Else(chained)));
                }
                Some(Token::Ident(word))
                    if matches!(word.as_str(), "range" | "define" | "template" | "block") =>
                {
                    return Err(self.error(position, &format!("{{{{{word}}}}} is not supported")));
                }
                _ => nodes.push(Node::Output(self.parse_pipeline(&tokens, position)?)),
            }
        }

        Ok((nodes, Terminator::Eof))
    }

    fn parse_if(&mut self, tokens: &[Token], position: usize) -> Result<Node, TemplateError> {
        let mut branches = Vec::new();
        let mut condition = self.parse_pipeline(tokens, position)?;

        loop {
            let (body, terminator) = self.parse_list()?;
            branches.push((condition, body));

            match terminator {
                Terminator::End => {
                    return Ok(Node::If {
                        branches,
                        otherwise: Vec::new(),
                    });
                }
                Terminator::Else(Some(next)) => condition = next,
                Terminator::Else(None) => {
                    let otherwise = self.parse_closing_else(position)?;
                    return Ok(Node::If {
                        branches,
                        otherwise,
                    });
                }
                Terminator::Eof => return Err(self.error(position, "unclosed {{if}}")),
            }
        }
    }

    fn parse_with(&mut self, tokens: &[Token], position: usize) -> Result<Node, TemplateError> {
        let pipeline = self.parse_pipeline(tokens, position)?;
        let (body, terminator) = self.parse_list()?;

        let otherwise = match terminator {
            Terminator::End => Vec::new(),
            Terminator::Else(None) => self.parse_closing_else(position)?,
            Terminator::Else(Some(_)) => {
                return Err(self.error(position, "{{else if}} is not allowed inside {{with}}"));
            }
            Terminator::Eof => return Err(self.error(position, "unclosed {{with}}")),
        };

        Ok(Node::With {
            pipeline,
            body,
            otherwise,
        })
    }

    /// The final `{{else}} ... {{end}}` branch.
    fn parse_closing_else(&mut self, position: usize) -> Result<Vec<Node>, TemplateError> {
        let (otherwise, terminator) = self.parse_list()?;
        match terminator {
            Terminator::End => Ok(otherwise),
            Terminator::Else(_) => Err(self.error(position, "more than one {{else}}")),
            Terminator::Eof => Err(self.error(position, "unclosed block")),
        }
    }

    fn parse_pipeline(&self, tokens: &[Token], position: usize) -> Result<Pipeline, TemplateError> {
        if tokens.is_empty() {
            return Err(self.error(position, "missing value for command"));
        }

        let mut commands = Vec::new();
        for (stage, stage_tokens) in split_top_level(tokens, position, self)?
            .into_iter()
            .enumerate()
        {
            let command = self.parse_command(stage_tokens, position)?;
            if stage > 0 && matches!(command, Command::Operand(_)) {
                return Err(self.error(position, "non-function in pipeline stage"));
            }
            commands.push(command);
        }

        Ok(Pipeline { commands })
    }

    fn parse_command(&self, tokens: &[Token], position: usize) -> Result<Command, TemplateError> {
        if tokens.is_empty() {
            return Err(self.error(position, "missing command in pipeline"));
        }

        if let Token::Ident(name) = &tokens[0] {
            self.check_function(name)?;
            let args = self.parse_operands(&tokens[1..], position)?;
            return Ok(Command::Call {
                func: name.clone(),
                args,
            });
        }

        let mut operands = self.parse_operands(tokens, position)?;
        if operands.len() != 1 {
            return Err(self.error(position, "can't give argument to non-function"));
        }
        Ok(Command::Operand(operands.remove(0)))
    }

    fn parse_operands(&self, tokens: &[Token], position: usize) -> Result<Vec<Operand>, TemplateError> {
        let mut operands = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let operand = match &tokens[i] {
                Token::Field(path) => Operand::Field(path.clone()),
                Token::Root(path) => Operand::Root(path.clone()),
                Token::Str(s) => Operand::Literal(Value::String(s.clone())),
                Token::Number(n) => Operand::Literal(number_literal(*n)),
                Token::Bool(b) => Operand::Literal(Value::Bool(*b)),
                Token::Nil => Operand::Literal(Value::Null),
                Token::Ident(name) => {
                    // A function used as an argument is called with no arguments.
                    self.check_function(name)?;
                    Operand::Nested(Pipeline {
                        commands: vec![Command::Call {
                            func: name.clone(),
                            args: Vec::new(),
                        }],
                    })
                }
                Token::LParen => {
                    let close = matching_paren(tokens, i)
                        .ok_or_else(|| self.error(position, "unclosed left paren"))?;
                    let nested = self.parse_pipeline(&tokens[i + 1..close], position)?;
                    i = close;
                    Operand::Nested(nested)
                }
                Token::RParen => return Err(self.error(position, "unexpected right paren")),
                Token::Pipe => return Err(self.error(position, "unexpected '|'")),
            };
            operands.push(operand);
            i += 1;
        }

        Ok(operands)
    }

    fn check_function(&self, name: &str) -> Result<(), TemplateError> {
        if funcs::is_defined(name) {
            Ok(())
        } else {
            Err(TemplateError::UnknownFunction {
                name: name.to_string(),
            })
        }
    }

    fn error(&self, position: usize, message: &str) -> TemplateError {
        TemplateError::Syntax {
            source_text: self.source.to_string(),
            position,
            message: message.to_string(),
        }
    }
}

/// Split a pipeline's tokens on `|` outside parentheses.
fn split_top_level<'t>(
    tokens: &'t [Token],
    position: usize,
    parser: &Parser<'_>,
) -> Result<Vec<&'t [Token]>, TemplateError> {
    let mut stages = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| parser.error(position, "unexpected right paren"))?;
            }
            Token::Pipe if depth == 0 => {
                stages.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    stages.push(&tokens[start..]);

    Ok(stages)
}

fn matching_paren(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Integral literals become JSON integers so they render without a fraction.
fn number_literal(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}
