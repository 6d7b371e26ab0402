//! Runtime preferences loaded from the environment
//!
//! Compile-time bounds live in `constants.rs` and cannot be changed at
//! runtime; everything here is a user preference with a safe default.

use crate::logging::LogLevel;
use std::env;

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(default)
}

/// Preferences for the logging subsystem
#[derive(Debug, Clone)]
pub struct LoggingPreferences {
    pub min_log_level: LogLevel,
    pub use_structured_logging: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        let min_log_level = match env::var("REQSCRIPT_LOG_LEVEL").ok().as_deref() {
            Some("error") => LogLevel::Error,
            Some("warn") => LogLevel::Warning,
            Some("debug") => LogLevel::Debug,
            _ => LogLevel::Info,
        };

        Self {
            min_log_level,
            use_structured_logging: env_flag("REQSCRIPT_STRUCTURED_LOGGING", false),
        }
    }
}

/// Preferences for the evaluation engine
#[derive(Debug, Clone)]
pub struct EnginePreferences {
    /// Emit a debug event for every parsed script
    pub log_parse_events: bool,
}

impl Default for EnginePreferences {
    fn default() -> Self {
        Self {
            log_parse_events: env_flag("REQSCRIPT_LOG_PARSE_EVENTS", false),
        }
    }
}
