//! Constrained literal-expression evaluator for bound attributes.
//!
//! Bound attributes (`:key="expr"`) accept a small expression language:
//! numbers, strings, booleans, `null`, arrays and objects of literals, plus
//! `+ - * /` on numbers and `+` concatenation on strings. This keeps the
//! "author can write a small literal expression" capability without
//! executing arbitrary code. Callers fall back to strict JSON parsing when
//! evaluation fails.

use serde_json::{Map, Value};

/// Evaluate a literal expression to a JSON value.
///
/// # Example
///
/// ```
/// use demodoc_demos::expr::eval;
///
/// assert_eq!(eval("1+1").unwrap(), serde_json::json!(2));
/// assert_eq!(eval("[1, 'a']").unwrap(), serde_json::json!([1, "a"]));
/// ```
pub fn eval(input: &str) -> Result<Value, EvalError> {
    let mut parser = Parser {
        chars: input.char_indices().peekable(),
        input,
    };
    let value = parser.expr()?;
    parser.skip_ws();
    if let Some(&(pos, _)) = parser.chars.peek() {
        return Err(EvalError::trailing(input, pos));
    }
    Ok(value)
}

/// Error from literal-expression evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid literal expression: {0}")]
pub struct EvalError(String);

impl EvalError {
    fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    fn trailing(input: &str, pos: usize) -> Self {
        Self(format!("unexpected trailing input at byte {pos} in '{input}'"))
    }
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    input: &'a str,
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.chars.peek().map(|&(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    fn expect(&mut self, c: char) -> Result<(), EvalError> {
        if self.peek() == Some(c) {
            self.bump();
            Ok(())
        } else {
            Err(EvalError::new(format!("expected '{c}' in '{}'", self.input)))
        }
    }

    /// expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Value, EvalError> {
        let mut lhs = self.term()?;
        loop {
            match self.peek() {
                Some('+') => {
                    self.bump();
                    let rhs = self.term()?;
                    lhs = add(&lhs, &rhs)?;
                }
                Some('-') => {
                    self.bump();
                    let rhs = self.term()?;
                    lhs = arith(&lhs, &rhs, "-", |a, b| a - b)?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    /// term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Result<Value, EvalError> {
        let mut lhs = self.factor()?;
        loop {
            match self.peek() {
                Some('*') => {
                    self.bump();
                    let rhs = self.factor()?;
                    lhs = arith(&lhs, &rhs, "*", |a, b| a * b)?;
                }
                Some('/') => {
                    self.bump();
                    let rhs = self.factor()?;
                    lhs = arith(&lhs, &rhs, "/", |a, b| a / b)?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn factor(&mut self) -> Result<Value, EvalError> {
        match self.peek() {
            Some('-') => {
                self.bump();
                let inner = self.factor()?;
                arith(&Value::from(0), &inner, "-", |a, b| a - b)
            }
            Some('(') => {
                self.bump();
                let inner = self.expr()?;
                self.expect(')')?;
                Ok(inner)
            }
            Some('[') => self.array(),
            Some('{') => self.object(),
            Some('\'' | '"') => self.string().map(Value::String),
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.keyword(),
            _ => Err(EvalError::new(format!(
                "unexpected end of expression in '{}'",
                self.input
            ))),
        }
    }

    fn array(&mut self) -> Result<Value, EvalError> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            if self.peek() == Some(']') {
                self.bump();
                return Ok(Value::Array(items));
            }
            items.push(self.expr()?);
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {}
                _ => return Err(EvalError::new(format!("unterminated array in '{}'", self.input))),
            }
        }
    }

    fn object(&mut self) -> Result<Value, EvalError> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Value::Object(map));
            }
            let key = match self.peek() {
                Some('\'' | '"') => self.string()?,
                Some(c) if c.is_alphabetic() || c == '_' || c == '$' => self.ident(),
                _ => return Err(EvalError::new(format!("expected object key in '{}'", self.input))),
            };
            self.expect(':')?;
            map.insert(key, self.expr()?);
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {}
                _ => {
                    return Err(EvalError::new(format!(
                        "unterminated object in '{}'",
                        self.input
                    )));
                }
            }
        }
    }

    fn string(&mut self) -> Result<String, EvalError> {
        self.skip_ws();
        let quote = self
            .bump()
            .ok_or_else(|| EvalError::new("expected string"))?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c) => out.push(c),
                    None => {
                        return Err(EvalError::new(format!(
                            "unterminated string in '{}'",
                            self.input
                        )));
                    }
                },
                Some(c) => out.push(c),
                None => {
                    return Err(EvalError::new(format!(
                        "unterminated string in '{}'",
                        self.input
                    )));
                }
            }
        }
    }

    fn ident(&mut self) -> String {
        let mut out = String::new();
        while matches!(self.chars.peek(), Some((_, c)) if c.is_alphanumeric() || *c == '_' || *c == '$')
        {
            out.push(self.bump().unwrap_or_default());
        }
        out
    }

    fn number(&mut self) -> Result<Value, EvalError> {
        self.skip_ws();
        let mut text = String::new();
        while matches!(self.chars.peek(), Some((_, c)) if c.is_ascii_digit() || *c == '.') {
            text.push(self.bump().unwrap_or_default());
        }
        let n: f64 = text
            .parse()
            .map_err(|_| EvalError::new(format!("invalid number '{text}'")))?;
        Ok(number_value(n))
    }

    fn keyword(&mut self) -> Result<Value, EvalError> {
        self.skip_ws();
        let word = self.ident();
        match word.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" | "undefined" => Ok(Value::Null),
            _ => Err(EvalError::new(format!(
                "unknown identifier '{word}' (only literals are allowed)"
            ))),
        }
    }
}

/// `+` adds numbers and concatenates strings.
fn add(lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    match (lhs, rhs) {
        (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
        _ => arith(lhs, rhs, "+", |a, b| a + b),
    }
}

fn arith(lhs: &Value, rhs: &Value, op: &str, f: impl Fn(f64, f64) -> f64) -> Result<Value, EvalError> {
    let (Some(a), Some(b)) = (lhs.as_f64(), rhs.as_f64()) else {
        return Err(EvalError::new(format!(
            "'{op}' requires numeric operands, got {lhs} and {rhs}"
        )));
    };
    let out = f(a, b);
    if out.is_finite() {
        Ok(number_value(out))
    } else {
        Err(EvalError::new(format!("'{a} {op} {b}' is not finite")))
    }
}

/// Integral results within i64 range collapse to integers so `1+1 == 2`.
#[allow(clippy::cast_possible_truncation)]
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}
