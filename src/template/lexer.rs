//! Tokenizer for template source text.
//!
//! Splits a source string into literal text segments and `{{ ... }}` actions,
//! applying `{{-` / `-}}` whitespace trimming to the neighbouring text.

use super::TemplateError;

/// A lexical token inside an action.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Token {
    /// `.` or `.a.b` relative to the current value. Empty path means `.` itself.
    Field(Vec<String>),
    /// `$` or `$.a.b` relative to the root record.
    Root(Vec<String>),
    /// Bare identifier: a keyword or a function name.
    Ident(String),
    Str(String),
    Number(f64),
    Bool(bool),
    Nil,
    Pipe,
    LParen,
    RParen,
}

/// One lexed piece of the source.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Segment {
    Text(String),
    Action {
        tokens: Vec<Token>,
        /// Byte offset of the opening `{{`, for error messages.
        position: usize,
    },
}

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

pub(super) fn lex(source: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut pos = 0;
    let mut trim_next_text = false;

    loop {
        let rest = &source[pos..];
        let Some(offset) = rest.find(OPEN) else {
            push_text(&mut segments, rest, trim_next_text);
            break;
        };

        let start = pos + offset;
        let mut text = &source[pos..start];
        if trim_next_text {
            text = text.trim_start();
        }

        let mut cursor = start + OPEN.len();
        if trim_marker_follows(&source[cursor..]) {
            text = text.trim_end();
            cursor += 1;
        }
        push_text(&mut segments, text, false);

        let (tokens, end, trim_right) = lex_action(source, cursor, start)?;
        segments.push(Segment::Action {
            tokens,
            position: start,
        });

        pos = end;
        trim_next_text = trim_right;
    }

    Ok(segments)
}

fn push_text(segments: &mut Vec<Segment>, text: &str, trim_start: bool) {
    let text = if trim_start { text.trim_start() } else { text };
    if !text.is_empty() {
        segments.push(Segment::Text(text.to_string()));
    }
}

/// `{{-` only trims when the dash is followed by whitespace; `{{-3}}` is a number.
fn trim_marker_follows(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('-') && chars.next().is_some_and(char::is_whitespace)
}

/// Lex tokens starting at `cursor` until the closing `}}`.
///
/// Returns the tokens, the byte offset just past the close, and whether a
/// `-}}` trim marker was used.
fn lex_action(
    source: &str,
    mut cursor: usize,
    open_position: usize,
) -> Result<(Vec<Token>, usize, bool), TemplateError> {
    let mut tokens = Vec::new();

    loop {
        let before_ws = cursor;
        cursor = skip_whitespace(source, cursor);
        let had_space = cursor > before_ws;
        let rest = &source[cursor..];

        if rest.is_empty() {
            return Err(syntax(source, open_position, "unclosed action"));
        }
        if had_space && rest.starts_with("-}}") {
            return Ok((tokens, cursor + 3, true));
        }
        if rest.starts_with(CLOSE) {
            return Ok((tokens, cursor + CLOSE.len(), false));
        }

        let c = rest.chars().next().unwrap_or_default();
        match c {
            '|' => {
                tokens.push(Token::Pipe);
                cursor += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                cursor += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                cursor += 1;
            }
            '"' => {
                let (value, len) = lex_quoted(source, cursor)?;
                tokens.push(Token::Str(value));
                cursor += len;
            }
            '`' => {
                let body = &rest[1..];
                let Some(end) = body.find('`') else {
                    return Err(syntax(source, cursor, "unterminated raw string"));
                };
                tokens.push(Token::Str(body[..end].to_string()));
                cursor += end + 2;
            }
            '.' => {
                let (path, len) = lex_path(source, cursor)?;
                tokens.push(Token::Field(path));
                cursor += len;
            }
            '$' => {
                let after = &rest[1..];
                if after.starts_with(is_ident_start) {
                    return Err(syntax(source, cursor, "template variables are not supported"));
                }
                let (path, len) = if after.starts_with('.') {
                    lex_path(source, cursor + 1)?
                } else {
                    (Vec::new(), 0)
                };
                tokens.push(Token::Root(path));
                cursor += 1 + len;
            }
            c if c.is_ascii_digit() || ((c == '-' || c == '+') && starts_number(&rest[1..])) => {
                let (value, len) = lex_number(source, cursor)?;
                tokens.push(Token::Number(value));
                cursor += len;
            }
            c if is_ident_start(c) => {
                let len = rest
                    .find(|ch: char| !is_ident_char(ch))
                    .unwrap_or(rest.len());
                let word = &rest[..len];
                tokens.push(match word {
                    "true" => Token::Bool(true),
                    "false" => Token::Bool(false),
                    "nil" => Token::Nil,
                    _ => Token::Ident(word.to_string()),
                });
                cursor += len;
            }
            other => {
                return Err(syntax(
                    source,
                    cursor,
                    &format!("unexpected character {other:?} in action"),
                ));
            }
        }
    }
}

fn skip_whitespace(source: &str, cursor: usize) -> usize {
    let rest = &source[cursor..];
    cursor + (rest.len() - rest.trim_start().len())
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn starts_number(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_digit())
}

/// Lex `.a.b.c` (or a lone `.`) starting at the first dot.
fn lex_path(source: &str, cursor: usize) -> Result<(Vec<String>, usize), TemplateError> {
    let rest = &source[cursor..];
    let mut path = Vec::new();
    let mut len = 0;

    while rest[len..].starts_with('.') {
        let name = &rest[len + 1..];
        let name_len = name.find(|c: char| !is_ident_char(c)).unwrap_or(name.len());
        if name_len == 0 {
            if path.is_empty() {
                // Lone `.`
                return Ok((path, len + 1));
            }
            return Err(syntax(source, cursor + len, "field name expected after '.'"));
        }
        path.push(name[..name_len].to_string());
        len += 1 + name_len;
    }

    Ok((path, len))
}

fn lex_quoted(source: &str, cursor: usize) -> Result<(String, usize), TemplateError> {
    let mut value = String::new();
    let mut chars = source[cursor + 1..].char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((value, i + 2)),
            '\\' => {
                let Some((_, escaped)) = chars.next() else {
                    break;
                };
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '\\' => '\\',
                    '"' => '"',
                    other => {
                        return Err(syntax(
                            source,
                            cursor + 1 + i,
                            &format!("unknown escape sequence \\{other}"),
                        ));
                    }
                });
            }
            '\n' => break,
            c => value.push(c),
        }
    }

    Err(syntax(source, cursor, "unterminated quoted string"))
}

fn lex_number(source: &str, cursor: usize) -> Result<(f64, usize), TemplateError> {
    let rest = &source[cursor..];
    let mut len = 0;
    let bytes = rest.as_bytes();

    if matches!(bytes.first(), Some(b'-' | b'+')) {
        len += 1;
    }
    while len < bytes.len() {
        let b = bytes[len];
        let after_exponent =
            (b == b'-' || b == b'+') && len > 0 && matches!(bytes[len - 1], b'e' | b'E');
        if b.is_ascii_digit() || b == b'.' || b == b'e' || b == b'E' || after_exponent {
            len += 1;
        } else {
            break;
        }
    }

    let literal = &rest[..len];
    literal
        .parse::<f64>()
        .map(|value| (value, len))
        .map_err(|_| syntax(source, cursor, &format!("bad number syntax: {literal:?}")))
}

fn syntax(source: &str, position: usize, message: &str) -> TemplateError {
    TemplateError::Syntax {
        source_text: source.to_string(),
        position,
        message: message.to_string(),
    }
}
