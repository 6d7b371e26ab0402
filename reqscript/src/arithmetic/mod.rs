//! Recursive-descent arithmetic expression evaluator
//!
//! Grammar:
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := factor (('*' | '/') factor)*
//! factor     := ('+'|'-') factor
//!             | '(' expression ')'
//!             | NUMBER
//!             | FUNC '(' expression ')'
//!             | FUNC factor
//! ```
//!
//! `^` binds tighter than `*`/`/` and is right-associative: after a factor
//! is parsed, a following `^` raises it to the next parsed factor.
//! Trigonometric functions take degrees.
//!
//! Two entry points share the grammar: [`evaluate_strict`] surfaces
//! malformed input as [`ArithmeticError`], while [`evaluate_lenient`]
//! returns the original text unchanged on any failure, which is what
//! comparison operands rely on to pass plain strings through.

pub mod error;

pub use error::{ArithmeticError, ArithmeticResult};

use crate::config::compile_time::arithmetic::MAX_EXPR_DEPTH;
use crate::scanner;
use serde::{Deserialize, Serialize};

const FUNCTIONS: [&str; 4] = ["sqrt", "sin", "cos", "tan"];

/// How a comparison operand routes through the evaluator
///
/// Decided once at parse time: text with an arithmetic operator outside
/// quotes, or with a decimal-number shape, runs the grammar leniently;
/// everything else passes through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExprMode {
    Arithmetic,
    Passthrough,
}

impl ExprMode {
    pub fn detect(text: &str) -> Self {
        let has_operator = ["+", "-", "*", "/", "^"]
            .iter()
            .any(|op| scanner::contains_ignoring_quotes(text, op));
        let has_function_call = FUNCTIONS
            .iter()
            .any(|name| text.starts_with(name) && text.as_bytes().get(name.len()) == Some(&b'('));
        if has_operator || has_function_call || scanner::contains_decimal_shape(text) {
            ExprMode::Arithmetic
        } else {
            ExprMode::Passthrough
        }
    }
}

/// Evaluate in strict mode: any malformed input is an error
pub fn evaluate_strict(input: &str) -> ArithmeticResult<f64> {
    ExprParser::new(input).parse()
}

/// Evaluate in lenient mode: failures return the original text
///
/// Successful results are rendered through [`format_numeric`], so both
/// sides of a comparison agree on the textual form of a number.
pub fn evaluate_lenient(input: &str, want_double: bool) -> String {
    match ExprParser::new(input).parse() {
        Ok(value) => format_numeric(value, want_double),
        Err(_) => input.to_string(),
    }
}

/// Shared numeric formatting rule
///
/// The decimal form appears only when doubles were requested and the value
/// has a fractional part; otherwise the truncated integer form renders
/// without a decimal point. `5.0`, `4+1` and `5` all format as `5`.
pub fn format_numeric(value: f64, want_double: bool) -> String {
    if want_double && value.fract() != 0.0 {
        value.to_string()
    } else {
        (value as i64).to_string()
    }
}

/// Cursor-based parser with one method per grammar rule
struct ExprParser {
    chars: Vec<char>,
    pos: usize,
    ch: Option<char>,
    depth: usize,
}

impl ExprParser {
    fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let ch = chars.first().copied();
        Self {
            chars,
            pos: 0,
            ch,
            depth: 0,
        }
    }

    fn bump(&mut self) {
        self.pos += 1;
        self.ch = self.chars.get(self.pos).copied();
    }

    /// Skip spaces, then consume `want` if it is the current character
    fn eat(&mut self, want: char) -> bool {
        while self.ch == Some(' ') {
            self.bump();
        }
        if self.ch == Some(want) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn parse(&mut self) -> ArithmeticResult<f64> {
        let value = self.parse_expression()?;
        while self.ch == Some(' ') {
            self.bump();
        }
        if self.pos < self.chars.len() {
            return Err(ArithmeticError::trailing_input(self.pos));
        }
        Ok(value)
    }

    fn parse_expression(&mut self) -> ArithmeticResult<f64> {
        let mut value = self.parse_term()?;
        loop {
            if self.eat('+') {
                value += self.parse_term()?;
            } else if self.eat('-') {
                value -= self.parse_term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn parse_term(&mut self) -> ArithmeticResult<f64> {
        let mut value = self.parse_factor()?;
        loop {
            if self.eat('*') {
                value *= self.parse_factor()?;
            } else if self.eat('/') {
                value /= self.parse_factor()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn parse_factor(&mut self) -> ArithmeticResult<f64> {
        self.depth += 1;
        if self.depth > MAX_EXPR_DEPTH {
            return Err(ArithmeticError::ExpressionTooDeep {
                limit: MAX_EXPR_DEPTH,
            });
        }
        let value = self.parse_factor_inner();
        self.depth -= 1;
        value
    }

    fn parse_factor_inner(&mut self) -> ArithmeticResult<f64> {
        if self.eat('+') {
            return self.parse_factor();
        }
        if self.eat('-') {
            return Ok(-self.parse_factor()?);
        }

        let start = self.pos;
        let mut value;
        if self.eat('(') {
            value = self.parse_expression()?;
            if !self.eat(')') {
                return Err(ArithmeticError::missing_paren(self.pos));
            }
        } else if matches!(self.ch, Some('0'..='9') | Some('.')) {
            while matches!(self.ch, Some('0'..='9') | Some('.')) {
                self.bump();
            }
            let text: String = self.chars[start..self.pos].iter().collect();
            value = text
                .parse::<f64>()
                .map_err(|_| ArithmeticError::invalid_number(&text))?;
        } else if matches!(self.ch, Some('a'..='z')) {
            while matches!(self.ch, Some('a'..='z')) {
                self.bump();
            }
            let name: String = self.chars[start..self.pos].iter().collect();
            let argument = if self.eat('(') {
                let inner = self.parse_expression()?;
                if !self.eat(')') {
                    return Err(ArithmeticError::missing_paren(self.pos));
                }
                inner
            } else {
                self.parse_factor()?
            };
            value = match name.as_str() {
                "sqrt" => argument.sqrt(),
                "sin" => argument.to_radians().sin(),
                "cos" => argument.to_radians().cos(),
                "tan" => argument.to_radians().tan(),
                // FUNCTIONS lists exactly the names matched here.
                _ => return Err(ArithmeticError::unknown_function(&name)),
            };
        } else {
            return Err(match self.ch {
                Some(character) => ArithmeticError::unexpected_character(character, self.pos),
                None => ArithmeticError::unexpected_end(self.pos),
            });
        }

        if self.eat('^') {
            value = value.powf(self.parse_factor()?);
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn eval(input: &str) -> f64 {
        match evaluate_strict(input) {
            Ok(value) => value,
            Err(error) => panic!("'{}' failed: {}", input, error),
        }
    }

    #[test]
    fn test_precedence_and_grouping() {
        assert_eq!(eval("1+2*3"), 7.0);
        assert_eq!(eval("(1+2)*3"), 9.0);
        assert_eq!(eval("10-4/2"), 8.0);
        assert_eq!(eval(" 2 + 3 "), 5.0);
    }

    #[test]
    fn test_unary_signs() {
        assert_eq!(eval("-5"), -5.0);
        assert_eq!(eval("+5"), 5.0);
        assert_eq!(eval("--5"), 5.0);
        assert_eq!(eval("3*-2"), -6.0);
    }

    #[test]
    fn test_power_binds_tighter_than_multiplication() {
        assert_eq!(eval("2*3^2"), 18.0);
        assert_eq!(eval("-2^2"), -4.0);
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(eval("2^3^2"), 512.0);
    }

    #[test]
    fn test_functions_in_degrees() {
        assert_eq!(eval("sqrt(25)"), 5.0);
        assert!((eval("sin(90)") - 1.0).abs() < 1e-9);
        assert!((eval("cos(180)") + 1.0).abs() < 1e-9);
        assert!(eval("tan(45)") - 1.0 < 1e-9);
        // FUNC factor form, no parentheses
        assert_eq!(eval("sqrt 25"), 5.0);
    }

    #[test]
    fn test_strict_errors() {
        assert_matches!(
            evaluate_strict("1+2x"),
            Err(ArithmeticError::TrailingInput { .. })
        );
        assert_matches!(
            evaluate_strict("(1+2"),
            Err(ArithmeticError::MissingParen { .. })
        );
        assert_matches!(
            evaluate_strict("log(10)"),
            Err(ArithmeticError::UnknownFunction { name }) if name == "log"
        );
        assert_matches!(
            evaluate_strict("1+"),
            Err(ArithmeticError::UnexpectedEnd { .. })
        );
        assert_matches!(
            evaluate_strict("%x%"),
            Err(ArithmeticError::UnexpectedCharacter { character: '%', .. })
        );
        assert_matches!(
            evaluate_strict("1..2"),
            Err(ArithmeticError::InvalidNumber { .. })
        );
    }

    #[test]
    fn test_lenient_passthrough() {
        assert_eq!(evaluate_lenient("abc", true), "abc");
        assert_eq!(evaluate_lenient("'quoted'", true), "'quoted'");
        assert_eq!(evaluate_lenient("1+2x", true), "1+2x");
    }

    #[test]
    fn test_lenient_formatting() {
        assert_eq!(evaluate_lenient("4+1", false), "5");
        assert_eq!(evaluate_lenient("4+1", true), "5");
        assert_eq!(evaluate_lenient("5.0", true), "5");
        assert_eq!(evaluate_lenient("1/2", true), "0.5");
        assert_eq!(evaluate_lenient("1/2", false), "0");
    }

    #[test]
    fn test_format_numeric() {
        assert_eq!(format_numeric(5.0, true), "5");
        assert_eq!(format_numeric(5.5, true), "5.5");
        assert_eq!(format_numeric(5.5, false), "5");
        assert_eq!(format_numeric(-2.0, true), "-2");
    }

    #[test]
    fn test_mode_detection() {
        assert_eq!(ExprMode::detect("1+2"), ExprMode::Arithmetic);
        assert_eq!(ExprMode::detect("1.5"), ExprMode::Arithmetic);
        assert_eq!(ExprMode::detect("%money%"), ExprMode::Passthrough);
        assert_eq!(ExprMode::detect("'a+b'"), ExprMode::Passthrough);
        assert_eq!(ExprMode::detect("high-rank"), ExprMode::Arithmetic);
        assert_eq!(ExprMode::detect("sqrt(25)"), ExprMode::Arithmetic);
        assert_eq!(ExprMode::detect("sinister"), ExprMode::Passthrough);
    }
}
