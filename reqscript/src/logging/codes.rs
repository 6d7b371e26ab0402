//! Consolidated error codes and classification system
//!
//! Single source of truth for all error codes, their metadata, and
//! classification functions.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// Script parsing error codes
pub mod script {
    use super::Code;

    pub const EMPTY_SCRIPT: Code = Code::new("E001");
    pub const UNRECOGNIZED_CONDITION: Code = Code::new("E002");
    pub const SCRIPT_TOO_LONG: Code = Code::new("E003");
}

/// Arithmetic expression error codes
pub mod arithmetic {
    use super::Code;

    pub const UNEXPECTED_CHARACTER: Code = Code::new("E010");
    pub const UNEXPECTED_END: Code = Code::new("E011");
    pub const MISSING_PAREN: Code = Code::new("E012");
    pub const UNKNOWN_FUNCTION: Code = Code::new("E013");
    pub const TRAILING_INPUT: Code = Code::new("E014");
    pub const INVALID_NUMBER: Code = Code::new("E015");
    pub const EXPRESSION_TOO_DEEP: Code = Code::new("E016");
}

/// Method registry error codes
pub mod registry {
    use super::Code;

    pub const UNKNOWN_TYPE_NAME: Code = Code::new("E020");
}

/// Evaluation error codes
pub mod eval {
    use super::Code;

    pub const NOT_PARSED: Code = Code::new("E030");
    pub const UNKNOWN_METHOD: Code = Code::new("E031");
    pub const NO_MATCHING_OVERLOAD: Code = Code::new("E032");
    pub const NUMERIC_COERCION_FAILED: Code = Code::new("E033");
    pub const INVOCATION_FAILED: Code = Code::new("E034");
}

/// Success codes for notable completions
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZED: Code = Code::new("I001");
    pub const SCRIPT_PARSED: Code = Code::new("I002");
    pub const REGISTRY_UPDATED: Code = Code::new("I003");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();

        // Script parsing errors
        registry.insert(
            "E001",
            ErrorMetadata::new(
                "E001",
                "Parsing",
                Severity::Low,
                true,
                "Script text is empty",
                "Provide a non-empty condition script",
            ),
        );
        registry.insert(
            "E002",
            ErrorMetadata::new(
                "E002",
                "Parsing",
                Severity::Medium,
                true,
                "Condition text matches no comparison, group or method chain shape",
                "Check operator spelling and quoting in the condition",
            ),
        );
        registry.insert(
            "E003",
            ErrorMetadata::new(
                "E003",
                "Parsing",
                Severity::Medium,
                true,
                "Script exceeds the maximum accepted length",
                "Split the script or raise the compile-time length bound",
            ),
        );

        // Arithmetic errors
        registry.insert(
            "E010",
            ErrorMetadata::new(
                "E010",
                "Arithmetic",
                Severity::Medium,
                true,
                "Unexpected character in arithmetic expression",
                "Remove or replace the offending character",
            ),
        );
        registry.insert(
            "E011",
            ErrorMetadata::new(
                "E011",
                "Arithmetic",
                Severity::Medium,
                true,
                "Expression ended while a value was expected",
                "Complete the arithmetic expression",
            ),
        );
        registry.insert(
            "E012",
            ErrorMetadata::new(
                "E012",
                "Arithmetic",
                Severity::Medium,
                true,
                "Missing closing parenthesis",
                "Balance the parentheses in the expression",
            ),
        );
        registry.insert(
            "E013",
            ErrorMetadata::new(
                "E013",
                "Arithmetic",
                Severity::Medium,
                true,
                "Unknown function name in arithmetic expression",
                "Use one of: sqrt, sin, cos, tan",
            ),
        );
        registry.insert(
            "E014",
            ErrorMetadata::new(
                "E014",
                "Arithmetic",
                Severity::Medium,
                true,
                "Trailing characters after a complete expression",
                "Remove text following the expression",
            ),
        );
        registry.insert(
            "E015",
            ErrorMetadata::new(
                "E015",
                "Arithmetic",
                Severity::Medium,
                true,
                "Numeric literal could not be parsed",
                "Check the digits and decimal point placement",
            ),
        );

        registry.insert(
            "E016",
            ErrorMetadata::new(
                "E016",
                "Arithmetic",
                Severity::Medium,
                true,
                "Expression nesting exceeds the maximum depth",
                "Flatten the expression or raise the compile-time depth bound",
            ),
        );

        // Registry errors
        registry.insert(
            "E020",
            ErrorMetadata::new(
                "E020",
                "Registry",
                Severity::Low,
                true,
                "Type name resolves to no known value kind",
                "Use a known kind name or register an alias first",
            ),
        );

        // Evaluation errors
        registry.insert(
            "E030",
            ErrorMetadata::new(
                "E030",
                "Evaluation",
                Severity::Medium,
                true,
                "Script was evaluated before being parsed",
                "Call parse_script or create the script with immediate parsing",
            ),
        );
        registry.insert(
            "E031",
            ErrorMetadata::new(
                "E031",
                "Evaluation",
                Severity::Medium,
                true,
                "No method table exposed for the receiver type, or method name unknown",
                "Expose the receiver type or fix the method name",
            ),
        );
        registry.insert(
            "E032",
            ErrorMetadata::new(
                "E032",
                "Evaluation",
                Severity::Medium,
                true,
                "Method exists but no overload matches the argument kinds",
                "Adjust the argument types or register a matching overload",
            ),
        );
        registry.insert(
            "E033",
            ErrorMetadata::new(
                "E033",
                "Evaluation",
                Severity::Medium,
                true,
                "Ordering comparison operand is not numeric",
                "Ensure both sides of >, >=, <, <= resolve to numbers",
            ),
        );
        registry.insert(
            "E034",
            ErrorMetadata::new(
                "E034",
                "Evaluation",
                Severity::Low,
                true,
                "Method handler reported a failure during invocation",
                "Check handler preconditions; the chain evaluated to false",
            ),
        );

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get complete metadata for an error code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_display() {
        let code = script::EMPTY_SCRIPT;
        assert_eq!(code.as_str(), "E001");
        assert_eq!(format!("{}", code), "E001");
    }

    #[test]
    fn test_metadata_lookup() {
        let metadata = get_error_metadata("E033");
        assert!(metadata.is_some());
        let metadata = metadata.unwrap();
        assert_eq!(metadata.category, "Evaluation");
        assert!(metadata.recoverable);
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_severity("E999"), Severity::Medium);
        assert_eq!(get_description("E999"), "Unknown error");
        assert_eq!(get_category("E999"), "Unknown");
    }
}
