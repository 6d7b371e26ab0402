//! Error types for registry configuration

use crate::logging::{codes, Code};

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("Unknown type name '{name}'")]
    UnknownTypeName { name: String },
}

impl RegistryError {
    pub fn unknown_type_name(name: &str) -> Self {
        Self::UnknownTypeName {
            name: name.to_string(),
        }
    }

    /// Get error code for the global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnknownTypeName { .. } => codes::registry::UNKNOWN_TYPE_NAME,
        }
    }
}
