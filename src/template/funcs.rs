//! Functions callable from template pipelines.
//!
//! Argument coercion is lenient for scalars: any string, number or boolean is
//! accepted where a string is expected, and numeric strings are accepted where a
//! number is expected. Lists and maps are only accepted where the function
//! genuinely works on collections.

use super::eval::{render, truthy};
use super::EvalError;
use serde_json::Value;

/// Marker appended or prepended by the truncation functions.
pub const ELLIPSIS: &str = "…";

const FUNCTIONS: &[&str] = &[
    // String tests
    "Contains",
    "ContainsAny",
    "HasPrefix",
    "HasSuffix",
    "StrIndex",
    // Splitting and joining
    "Fields",
    "Split",
    "SplitN",
    "StrJoin",
    // Rewriting
    "Replace",
    "ReplaceAll",
    "Title",
    "ToLower",
    "ToUpper",
    "TrimPrefix",
    "TrimSpace",
    "TrimSuffix",
    "TruncateLeft",
    "Truncate",
    // Numbers
    "FormatSeconds",
    "div",
    "mul",
    "add",
    "sub",
    // Builtins
    "and",
    "or",
    "not",
    "eq",
    "ne",
    "lt",
    "le",
    "gt",
    "ge",
    "len",
    "index",
    "print",
];

pub(super) fn is_defined(name: &str) -> bool {
    FUNCTIONS.contains(&name)
}

/// Call `name` with fully evaluated arguments.
///
/// `and`/`or` short-circuit and are handled by the evaluator before reaching here.
pub(super) fn call(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    let f = Args { func: name, args };

    match name {
        "Contains" => {
            f.arity(2)?;
            Ok(Value::Bool(f.string(0)?.contains(f.string(1)?.as_str())))
        }
        "ContainsAny" => {
            f.arity(2)?;
            let chars = f.string(1)?;
            Ok(Value::Bool(f.string(0)?.contains(|c| chars.contains(c))))
        }
        "HasPrefix" => {
            f.arity(2)?;
            Ok(Value::Bool(f.string(0)?.starts_with(f.string(1)?.as_str())))
        }
        "HasSuffix" => {
            f.arity(2)?;
            Ok(Value::Bool(f.string(0)?.ends_with(f.string(1)?.as_str())))
        }
        "StrIndex" => {
            f.arity(2)?;
            let index = f
                .string(0)?
                .find(f.string(1)?.as_str())
                .map_or(-1, |i| i as i64);
            Ok(Value::from(index))
        }
        "Fields" => {
            f.arity(1)?;
            Ok(string_list(f.string(0)?.split_whitespace()))
        }
        "Split" => {
            f.arity(2)?;
            let (s, sep) = (f.string(0)?, f.string(1)?);
            Ok(split_n(&s, &sep, -1))
        }
        "SplitN" => {
            f.arity(3)?;
            let (s, sep) = (f.string(0)?, f.string(1)?);
            Ok(split_n(&s, &sep, f.int(2)?))
        }
        "StrJoin" => {
            f.arity(2)?;
            Ok(Value::String(f.list(0)?.join(&f.string(1)?)))
        }
        "Replace" => {
            f.arity(4)?;
            let (s, old, new) = (f.string(0)?, f.string(1)?, f.string(2)?);
            let n = f.int(3)?;
            Ok(Value::String(if n < 0 {
                s.replace(&old, &new)
            } else {
                s.replacen(&old, &new, n as usize)
            }))
        }
        "ReplaceAll" => {
            f.arity(3)?;
            Ok(Value::String(
                f.string(0)?.replace(&f.string(1)?, &f.string(2)?),
            ))
        }
        "Title" => {
            f.arity(1)?;
            Ok(Value::String(title_case(&f.string(0)?)))
        }
        "ToLower" => {
            f.arity(1)?;
            Ok(Value::String(f.string(0)?.to_lowercase()))
        }
        "ToUpper" => {
            f.arity(1)?;
            Ok(Value::String(f.string(0)?.to_uppercase()))
        }
        "TrimPrefix" => {
            f.arity(2)?;
            let (s, prefix) = (f.string(0)?, f.string(1)?);
            Ok(Value::String(
                s.strip_prefix(prefix.as_str()).unwrap_or(&s).to_string(),
            ))
        }
        "TrimSuffix" => {
            f.arity(2)?;
            let (s, suffix) = (f.string(0)?, f.string(1)?);
            Ok(Value::String(
                s.strip_suffix(suffix.as_str()).unwrap_or(&s).to_string(),
            ))
        }
        "TrimSpace" => {
            f.arity(1)?;
            Ok(Value::String(f.string(0)?.trim().to_string()))
        }
        "Truncate" => {
            f.arity(2)?;
            Ok(Value::String(truncate_right(&f.string(0)?, f.limit(1)?)))
        }
        "TruncateLeft" => {
            f.arity(2)?;
            Ok(Value::String(truncate_left(&f.string(0)?, f.limit(1)?)))
        }
        "FormatSeconds" => {
            f.arity(1)?;
            Ok(Value::String(format_seconds(f.float(0)?)))
        }
        "add" => f.arithmetic(|a, b| a + b),
        "sub" => f.arithmetic(|a, b| a - b),
        "mul" => f.arithmetic(|a, b| a * b),
        "div" => f.arithmetic(|a, b| a / b),
        "not" => {
            f.arity(1)?;
            Ok(Value::Bool(!truthy(&args[0])))
        }
        "eq" => {
            if args.len() < 2 {
                return Err(f.arity_error(2));
            }
            Ok(Value::Bool(args[1..].iter().any(|b| equal(&args[0], b))))
        }
        "ne" => {
            f.arity(2)?;
            Ok(Value::Bool(!equal(&args[0], &args[1])))
        }
        "lt" => f.compare(|o| o.is_lt()),
        "le" => f.compare(|o| o.is_le()),
        "gt" => f.compare(|o| o.is_gt()),
        "ge" => f.compare(|o| o.is_ge()),
        "len" => {
            f.arity(1)?;
            let len = match &args[0] {
                Value::String(s) => s.chars().count(),
                Value::Array(items) => items.len(),
                Value::Object(map) => map.len(),
                other => return Err(f.type_error(&format!("len of {}", kind(other)))),
            };
            Ok(Value::from(len))
        }
        "index" => {
            if args.is_empty() {
                return Err(f.arity_error(1));
            }
            args[1..]
                .iter()
                .try_fold(args[0].clone(), |current, key| f.index(current, key))
        }
        "print" => Ok(Value::String(print(args))),
        other => Err(EvalError::NotAFunction {
            name: other.to_string(),
        }),
    }
}

/// Argument accessor carrying the function name for error messages.
struct Args<'a> {
    func: &'a str,
    args: &'a [Value],
}

impl Args<'_> {
    fn arity(&self, expected: usize) -> Result<(), EvalError> {
        if self.args.len() == expected {
            Ok(())
        } else {
            Err(self.arity_error(expected))
        }
    }

    fn arity_error(&self, expected: usize) -> EvalError {
        EvalError::Arity {
            func: self.func.to_string(),
            expected,
            got: self.args.len(),
        }
    }

    fn type_error(&self, message: &str) -> EvalError {
        EvalError::Type {
            func: self.func.to_string(),
            message: message.to_string(),
        }
    }

    fn string(&self, i: usize) -> Result<String, EvalError> {
        match &self.args[i] {
            Value::String(s) => Ok(s.clone()),
            v @ (Value::Number(_) | Value::Bool(_)) => Ok(render(v)),
            other => Err(self.type_error(&format!(
                "argument {} must be a string, got {}",
                i + 1,
                kind(other)
            ))),
        }
    }

    fn float(&self, i: usize) -> Result<f64, EvalError> {
        let parsed = match &self.args[i] {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| {
            self.type_error(&format!(
                "argument {} must be a number, got {}",
                i + 1,
                kind(&self.args[i])
            ))
        })
    }

    fn int(&self, i: usize) -> Result<i64, EvalError> {
        let value = self.float(i)?;
        if value.fract() == 0.0 {
            Ok(value as i64)
        } else {
            Err(self.type_error(&format!("argument {} must be an integer", i + 1)))
        }
    }

    fn limit(&self, i: usize) -> Result<usize, EvalError> {
        usize::try_from(self.int(i)?)
            .map_err(|_| self.type_error(&format!("argument {} must not be negative", i + 1)))
    }

    fn list(&self, i: usize) -> Result<Vec<String>, EvalError> {
        match &self.args[i] {
            Value::Array(items) => Ok(items.iter().map(render).collect()),
            other => Err(self.type_error(&format!(
                "argument {} must be a list, got {}",
                i + 1,
                kind(other)
            ))),
        }
    }

    fn arithmetic(&self, op: impl Fn(f64, f64) -> f64) -> Result<Value, EvalError> {
        self.arity(2)?;
        let result = op(self.float(0)?, self.float(1)?);
        serde_json::Number::from_f64(result)
            .map(Value::Number)
            .ok_or_else(|| self.type_error("result is not a finite number"))
    }

    fn compare(&self, test: impl Fn(std::cmp::Ordering) -> bool) -> Result<Value, EvalError> {
        self.arity(2)?;
        let ordering = match (&self.args[0], &self.args[1]) {
            (Value::Number(a), Value::Number(b)) => a
                .as_f64()
                .zip(b.as_f64())
                .and_then(|(a, b)| a.partial_cmp(&b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        };
        ordering.map(|o| Value::Bool(test(o))).ok_or_else(|| {
            self.type_error(&format!(
                "incompatible types for comparison: {} and {}",
                kind(&self.args[0]),
                kind(&self.args[1])
            ))
        })
    }

    fn index(&self, current: Value, key: &Value) -> Result<Value, EvalError> {
        match (current, key) {
            (Value::Object(mut map), Value::String(k)) => Ok(map.remove(k).unwrap_or(Value::Null)),
            (Value::Array(mut items), Value::Number(n)) => {
                let i = n
                    .as_u64()
                    .ok_or_else(|| self.type_error("list index must be a non-negative integer"))?;
                if (i as usize) < items.len() {
                    Ok(items.swap_remove(i as usize))
                } else {
                    Err(self.type_error(&format!("index {i} out of range")))
                }
            }
            (other, key) => Err(self.type_error(&format!(
                "can't index {} with {}",
                kind(&other),
                kind(key)
            ))),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "nil",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

fn string_list<'a>(items: impl Iterator<Item = &'a str>) -> Value {
    Value::Array(items.map(|s| Value::String(s.to_string())).collect())
}

/// Split into at most `n` pieces (`n < 0`: unlimited, `n == 0`: none).
/// An empty separator splits between characters.
fn split_n(s: &str, sep: &str, n: i64) -> Value {
    if n == 0 {
        return Value::Array(Vec::new());
    }

    let mut pieces: Vec<String> = if sep.is_empty() {
        s.chars().map(String::from).collect()
    } else if n < 0 {
        s.split(sep).map(str::to_string).collect()
    } else {
        s.splitn(n as usize, sep).map(str::to_string).collect()
    };

    if sep.is_empty() && n > 0 && pieces.len() > n as usize {
        let tail: String = pieces.split_off(n as usize - 1).concat();
        pieces.push(tail);
    }

    Value::Array(pieces.into_iter().map(Value::String).collect())
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;

    for c in s.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }

    out
}

/// Keep the first `limit` characters, marking the cut with `…`.
pub fn truncate_right(s: &str, limit: usize) -> String {
    match s.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &s[..cut]),
        None => s.to_string(),
    }
}

/// Keep the last `limit` characters, marking the cut with `…`.
pub fn truncate_left(s: &str, limit: usize) -> String {
    let count = s.chars().count();
    if count <= limit {
        return s.to_string();
    }
    let skip = count - limit;
    let cut = s.char_indices().nth(skip).map_or(s.len(), |(i, _)| i);
    format!("{ELLIPSIS}{}", &s[cut..])
}

/// Render a number of seconds the way Go's `time.Duration` prints itself.
pub fn format_seconds(seconds: f64) -> String {
    // Truncation toward zero matches the integer duration conversion.
    let nanos = (seconds * 1e9) as i128;
    let sign = if nanos < 0 { "-" } else { "" };
    let u = nanos.unsigned_abs();

    if u == 0 {
        return "0s".to_string();
    }

    if u < 1_000_000_000 {
        let (precision, unit) = match u {
            0..=999 => (0, "ns"),
            1_000..=999_999 => (3, "µs"),
            _ => (6, "ms"),
        };
        let (whole, fraction) = split_fraction(u, precision);
        return format!("{sign}{whole}{fraction}{unit}");
    }

    let (secs, fraction) = split_fraction(u, 9);
    let mins = secs / 60;
    let mut out = sign.to_string();
    if mins > 0 {
        let hours = mins / 60;
        if hours > 0 {
            out.push_str(&format!("{hours}h"));
        }
        out.push_str(&format!("{}m", mins % 60));
    }
    out.push_str(&format!("{}{fraction}s", secs % 60));
    out
}

/// Split `v` into `v / 10^precision` and a `.ddd` suffix without trailing zeros.
fn split_fraction(v: u128, precision: u32) -> (u128, String) {
    if precision == 0 {
        return (v, String::new());
    }
    let scale = 10u128.pow(precision);
    let (whole, rem) = (v / scale, v % scale);
    if rem == 0 {
        return (whole, String::new());
    }
    let digits = format!("{:0width$}", rem, width = precision as usize);
    (whole, format!(".{}", digits.trim_end_matches('0')))
}

fn equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Go's `Sprint`: a space goes between operands when neither side is a string.
fn print(args: &[Value]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 && !args[i - 1].is_string() && !arg.is_string() {
            out.push(' ');
        }
        out.push_str(&render(arg));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call_ok(name: &str, args: &[Value]) -> Value {
        call(name, args).unwrap_or_else(|e| panic!("{name} failed: {e}"))
    }

    #[test]
    fn truncate_right_marks_cut() {
        assert_eq!(truncate_right("abcdef", 3), "abc…");
        assert_eq!(truncate_right("abc", 3), "abc");
        assert_eq!(truncate_right("héllo wörld", 5), "héllo…");
    }

    #[test]
    fn truncate_left_marks_cut() {
        assert_eq!(truncate_left("abcdef", 3), "…def");
        assert_eq!(truncate_left("abc", 5), "abc");
        assert_eq!(truncate_left("wörld", 3), "…rld");
    }

    #[test]
    fn format_seconds_matches_go_durations() {
        assert_eq!(format_seconds(0.0), "0s");
        assert_eq!(format_seconds(1.5), "1.5s");
        assert_eq!(format_seconds(90.0), "1m30s");
        assert_eq!(format_seconds(3600.0), "1h0m0s");
        assert_eq!(format_seconds(3661.25), "1h1m1.25s");
        assert_eq!(format_seconds(0.25), "250ms");
        assert_eq!(format_seconds(0.001953125), "1.953125ms");
        assert_eq!(format_seconds(0.0009765625), "976.562µs");
        assert_eq!(format_seconds(-2.0), "-2s");
    }

    #[test]
    fn split_and_join() {
        assert_eq!(
            call_ok("Split", &[json!("a,b,c"), json!(",")]),
            json!(["a", "b", "c"])
        );
        assert_eq!(
            call_ok("SplitN", &[json!("a,b,c"), json!(","), json!(2)]),
            json!(["a", "b,c"])
        );
        assert_eq!(
            call_ok("StrJoin", &[json!(["x", "y"]), json!("-")]),
            json!("x-y")
        );
        assert_eq!(call_ok("Fields", &[json!("  a  b ")]), json!(["a", "b"]));
    }

    #[test]
    fn string_tests() {
        assert_eq!(call_ok("Contains", &[json!("hello"), json!("ell")]), json!(true));
        assert_eq!(call_ok("ContainsAny", &[json!("hello"), json!("xyz")]), json!(false));
        assert_eq!(call_ok("HasPrefix", &[json!("GET /"), json!("GET")]), json!(true));
        assert_eq!(call_ok("HasSuffix", &[json!("a.json"), json!(".json")]), json!(true));
        assert_eq!(call_ok("StrIndex", &[json!("chicken"), json!("ken")]), json!(4));
        assert_eq!(call_ok("StrIndex", &[json!("chicken"), json!("dmr")]), json!(-1));
    }

    #[test]
    fn case_transforms() {
        assert_eq!(call_ok("Title", &[json!("hELLO wORLD")]), json!("Hello World"));
        assert_eq!(call_ok("ToUpper", &[json!("warn")]), json!("WARN"));
        assert_eq!(call_ok("ToLower", &[json!("WARN")]), json!("warn"));
    }

    #[test]
    fn replace_respects_count() {
        assert_eq!(
            call_ok("Replace", &[json!("aaa"), json!("a"), json!("b"), json!(2)]),
            json!("bba")
        );
        assert_eq!(
            call_ok("Replace", &[json!("aaa"), json!("a"), json!("b"), json!(-1)]),
            json!("bbb")
        );
    }

    #[test]
    fn arithmetic_on_numbers_and_numeric_strings() {
        assert_eq!(call_ok("mul", &[json!(1.5), json!(1000)]), json!(1500.0));
        assert_eq!(call_ok("add", &[json!("2"), json!(3)]), json!(5.0));
        assert!(call("div", &[json!(1), json!(0)]).is_err());
    }

    #[test]
    fn comparisons() {
        assert_eq!(call_ok("eq", &[json!(200), json!(200.0)]), json!(true));
        assert_eq!(call_ok("eq", &[json!("a"), json!("b"), json!("a")]), json!(true));
        assert_eq!(call_ok("gt", &[json!(3), json!(2)]), json!(true));
        assert_eq!(call_ok("le", &[json!("a"), json!("b")]), json!(true));
        assert!(call("lt", &[json!("a"), json!(1)]).is_err());
    }

    #[test]
    fn index_into_maps_and_lists() {
        let data = json!({"a": [10, 20]});
        assert_eq!(call_ok("index", &[data.clone(), json!("a"), json!(1)]), json!(20));
        assert_eq!(call_ok("index", &[data, json!("missing")]), Value::Null);
    }

    #[test]
    fn print_spaces_between_non_strings() {
        assert_eq!(call_ok("print", &[json!(1), json!(2)]), json!("1 2"));
        assert_eq!(call_ok("print", &[json!("a"), json!(1)]), json!("a1"));
    }

    #[test]
    fn wrong_arity_is_reported() {
        let err = call("ToUpper", &[]).unwrap_err();
        assert_eq!(
            err,
            EvalError::Arity {
                func: "ToUpper".to_string(),
                expected: 1,
                got: 0
            }
        );
    }

    #[test]
    fn negative_truncate_limit_is_type_error() {
        assert!(call("Truncate", &[json!("abc"), json!(-1)]).is_err());
    }

    #[test]
    fn every_listed_function_is_defined() {
        for name in FUNCTIONS {
            assert!(is_defined(name));
        }
        assert!(!is_defined("printf"));
    }
}
