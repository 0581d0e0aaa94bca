//! Arithmetic calculator, registered as a plain callable.

use super::registry::RegisteredTool;
use super::traits::ToolArgs;
use anyhow::{anyhow, bail, Result};

/// Build the `calculator` tool.
pub fn calculator_tool() -> RegisteredTool {
    RegisteredTool::from_fn("calculator", calculate).with_description(
        "Evaluate an arithmetic expression. Params: {\"expr\": \"<expression>\"}. Supports + - * / % and parentheses.",
    )
}

/// Evaluate `expr` (or `expression`) and format the result.
pub fn calculate(args: ToolArgs) -> Result<String> {
    let expr = args
        .get("expr")
        .or_else(|| args.get("expression"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("Missing 'expr' argument"))?;
    Ok(format_number(evaluate(expr)?))
}

/// Integral values print without a fractional part.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expr: &str) -> Result<f64> {
    let mut parser = Parser {
        chars: expr.chars().filter(|c| !c.is_whitespace()).collect(),
        pos: 0,
    };
    let value = parser.expression()?;
    if let Some(c) = parser.peek() {
        bail!("Unexpected '{}' in expression", c);
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    // expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<f64> {
        let mut value = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.bump();
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    // term := factor (('*' | '/' | '%') factor)*
    fn term(&mut self) -> Result<f64> {
        let mut value = self.factor()?;
        while let Some(op @ ('*' | '/' | '%')) = self.peek() {
            self.bump();
            let rhs = self.factor()?;
            if op != '*' && rhs == 0.0 {
                bail!("Division by zero");
            }
            value = match op {
                '*' => value * rhs,
                '/' => value / rhs,
                _ => value % rhs,
            };
        }
        Ok(value)
    }

    // factor := '-' factor | '(' expression ')' | number
    fn factor(&mut self) -> Result<f64> {
        match self.peek() {
            Some('-') => {
                self.bump();
                Ok(-self.factor()?)
            }
            Some('+') => {
                self.bump();
                self.factor()
            }
            Some('(') => {
                self.bump();
                let value = self.expression()?;
                match self.bump() {
                    Some(')') => Ok(value),
                    _ => bail!("Unbalanced parentheses"),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => bail!("Unexpected '{}' in expression", c),
            None => bail!("Unexpected end of expression"),
        }
    }

    fn number(&mut self) -> Result<f64> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse()
            .map_err(|_| anyhow!("Invalid number '{}'", literal))
    }
}
