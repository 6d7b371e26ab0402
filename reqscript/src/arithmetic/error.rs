//! Error types for arithmetic expression evaluation

use crate::logging::{codes, Code};

pub type ArithmeticResult<T> = Result<T, ArithmeticError>;

/// Malformed-expression errors raised by the strict evaluator
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArithmeticError {
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },

    #[error("Expression ended while a value was expected at position {position}")]
    UnexpectedEnd { position: usize },

    #[error("Missing closing parenthesis at position {position}")]
    MissingParen { position: usize },

    #[error("Unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("Trailing characters after expression at position {position}")]
    TrailingInput { position: usize },

    #[error("Invalid number '{text}'")]
    InvalidNumber { text: String },

    #[error("Expression nesting deeper than {limit}")]
    ExpressionTooDeep { limit: usize },
}

impl ArithmeticError {
    pub fn unexpected_character(character: char, position: usize) -> Self {
        Self::UnexpectedCharacter {
            character,
            position,
        }
    }

    pub fn unexpected_end(position: usize) -> Self {
        Self::UnexpectedEnd { position }
    }

    pub fn missing_paren(position: usize) -> Self {
        Self::MissingParen { position }
    }

    pub fn unknown_function(name: &str) -> Self {
        Self::UnknownFunction {
            name: name.to_string(),
        }
    }

    pub fn trailing_input(position: usize) -> Self {
        Self::TrailingInput { position }
    }

    pub fn invalid_number(text: &str) -> Self {
        Self::InvalidNumber {
            text: text.to_string(),
        }
    }

    /// Get error code for the global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedCharacter { .. } => codes::arithmetic::UNEXPECTED_CHARACTER,
            Self::UnexpectedEnd { .. } => codes::arithmetic::UNEXPECTED_END,
            Self::MissingParen { .. } => codes::arithmetic::MISSING_PAREN,
            Self::UnknownFunction { .. } => codes::arithmetic::UNKNOWN_FUNCTION,
            Self::TrailingInput { .. } => codes::arithmetic::TRAILING_INPUT,
            Self::InvalidNumber { .. } => codes::arithmetic::INVALID_NUMBER,
            Self::ExpressionTooDeep { .. } => codes::arithmetic::EXPRESSION_TOO_DEEP,
        }
    }

    /// Get error severity
    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    /// Get error category
    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let unexpected = ArithmeticError::unexpected_character('?', 3);
        assert_eq!(unexpected.error_code().as_str(), "E010");

        let unknown = ArithmeticError::unknown_function("log");
        assert_eq!(unknown.error_code().as_str(), "E013");

        let trailing = ArithmeticError::trailing_input(5);
        assert_eq!(trailing.error_code().as_str(), "E014");
    }

    #[test]
    fn test_error_category() {
        let error = ArithmeticError::missing_paren(7);
        assert_eq!(error.category(), "Arithmetic");
    }
}
