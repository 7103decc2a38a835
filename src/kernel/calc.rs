//! Inline calculator row.
//!
//! Recursive descent over `+ - * / % ^`, parentheses and decimals. A query
//! only counts as arithmetic when it contains at least one binary operator.
//! Nesting deeper than [`MAX_DEPTH`] is rejected rather than parsed.

/// Upper bound on nested parentheses, unary signs and exponent chains.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    pub expression: String,
    pub value: f64,
    pub display: String,
}

pub fn calculate(query: &str) -> Option<Calculation> {
    let expression = query.trim();
    if expression.is_empty() {
        return None;
    }
    let value = evaluate(expression)?;
    Some(Calculation {
        expression: expression.to_string(),
        value,
        display: format_number(value),
    })
}

pub fn evaluate(expression: &str) -> Option<f64> {
    let mut parser = Parser {
        chars: expression.chars().filter(|c| !c.is_whitespace()).collect(),
        pos: 0,
        operators: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if parser.pos != parser.chars.len() || parser.operators == 0 || !value.is_finite() {
        return None;
    }
    Some(value)
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let text = format!("{value:.10}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    operators: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn nested(&mut self, parse: fn(&mut Self) -> Option<f64>) -> Option<f64> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn expr(&mut self) -> Option<f64> {
        let mut value = self.term()?;
        loop {
            if self.eat('+') {
                self.operators += 1;
                value += self.term()?;
            } else if self.eat('-') {
                self.operators += 1;
                value -= self.term()?;
            } else {
                return Some(value);
            }
        }
    }

    fn term(&mut self) -> Option<f64> {
        let mut value = self.power()?;
        loop {
            if self.eat('*') {
                self.operators += 1;
                value *= self.power()?;
            } else if self.eat('/') {
                self.operators += 1;
                let rhs = self.power()?;
                if rhs == 0.0 {
                    return None;
                }
                value /= rhs;
            } else if self.eat('%') {
                self.operators += 1;
                let rhs = self.power()?;
                if rhs == 0.0 {
                    return None;
                }
                value %= rhs;
            } else {
                return Some(value);
            }
        }
    }

    fn power(&mut self) -> Option<f64> {
        let base = self.unary()?;
        if self.eat('^') {
            self.operators += 1;
            let exponent = self.nested(Self::power)?;
            return Some(base.powf(exponent));
        }
        Some(base)
    }

    fn unary(&mut self) -> Option<f64> {
        if self.eat('-') {
            return self.nested(Self::unary).map(|value| -value);
        }
        if self.eat('+') {
            return self.nested(Self::unary);
        }
        self.primary()
    }

    fn primary(&mut self) -> Option<f64> {
        if self.eat('(') {
            let value = self.nested(Self::expr)?;
            return self.eat(')').then_some(value);
        }
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        if start == self.pos {
            return None;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal.parse().ok()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/calc.rs"]
mod tests;
