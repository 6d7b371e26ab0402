//! Error types for condition parsing and evaluation

use crate::logging::{codes, Code};
use crate::value::TypeTag;

pub type ParseResult<T> = Result<T, ParseError>;
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors surfaced while parsing a script into a condition tree
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Script text is empty")]
    EmptyScript,

    #[error("Unrecognized condition '{text}'")]
    UnrecognizedCondition { text: String },

    #[error("Script length {length} exceeds the limit of {limit} bytes")]
    ScriptTooLong { length: usize, limit: usize },
}

impl ParseError {
    pub fn empty_script() -> Self {
        Self::EmptyScript
    }

    pub fn unrecognized(text: &str) -> Self {
        Self::UnrecognizedCondition {
            text: text.to_string(),
        }
    }

    pub fn script_too_long(length: usize, limit: usize) -> Self {
        Self::ScriptTooLong { length, limit }
    }

    /// Get error code for the global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::EmptyScript => codes::script::EMPTY_SCRIPT,
            Self::UnrecognizedCondition { .. } => codes::script::UNRECOGNIZED_CONDITION,
            Self::ScriptTooLong { .. } => codes::script::SCRIPT_TOO_LONG,
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

/// Errors surfaced while evaluating a parsed condition tree
///
/// Invocation failures are not here on purpose: a failing method handler
/// is reported to the error channel and degrades its node to false.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("Script was not parsed before evaluation")]
    NotParsed,

    #[error("Unknown method '{method}' on type {type_name}")]
    UnknownMethod { type_name: String, method: String },

    #[error("No overload of '{method}' on type {type_name} matches ({kinds})")]
    NoMatchingOverload {
        type_name: String,
        method: String,
        kinds: String,
    },

    #[error("Operand '{text}' of an ordering comparison is not numeric")]
    NumericCoercionFailed { text: String },
}

impl EvalError {
    pub fn not_parsed() -> Self {
        Self::NotParsed
    }

    pub fn unknown_method(tag: TypeTag, method: &str) -> Self {
        Self::UnknownMethod {
            type_name: tag.as_str().to_string(),
            method: method.to_string(),
        }
    }

    pub fn no_matching_overload(tag: TypeTag, method: &str, kinds: &[TypeTag]) -> Self {
        let kinds = kinds
            .iter()
            .map(TypeTag::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        Self::NoMatchingOverload {
            type_name: tag.as_str().to_string(),
            method: method.to_string(),
            kinds,
        }
    }

    pub fn numeric_coercion_failed(text: &str) -> Self {
        Self::NumericCoercionFailed {
            text: text.to_string(),
        }
    }

    /// Get error code for the global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::NotParsed => codes::eval::NOT_PARSED,
            Self::UnknownMethod { .. } => codes::eval::UNKNOWN_METHOD,
            Self::NoMatchingOverload { .. } => codes::eval::NO_MATCHING_OVERLOAD,
            Self::NumericCoercionFailed { .. } => codes::eval::NUMERIC_COERCION_FAILED,
        }
    }

    /// Get error severity
    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }
}
