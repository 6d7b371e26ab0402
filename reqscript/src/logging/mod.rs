//! Global logging system for the condition engine
//!
//! A `OnceLock`-held service fans events out to the configured loggers.
//! Initialization is explicit; until then every log call is a no-op, which
//! keeps the library silent when embedded.

pub mod codes;
pub mod events;
#[macro_use]
pub mod macros;
pub mod service;

pub use codes::{Code, Severity};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

use std::sync::{Arc, OnceLock};

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_MEMORY: OnceLock<Arc<MemoryLogger>> = OnceLock::new();

/// Initialize global logging from runtime preferences
///
/// A bounded memory channel is always attached so callers can inspect
/// recently reported errors. Safe to call more than once; later calls are
/// ignored.
pub fn init_global_logging() {
    let memory = GLOBAL_MEMORY
        .get_or_init(|| Arc::new(MemoryLogger::new()))
        .clone();
    let _ = GLOBAL_LOGGER.set(Arc::new(
        LoggingService::with_config().with_logger(memory),
    ));
}

/// Initialize global logging with an explicit service
pub fn init_with_service(service: LoggingService) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(Arc::new(service))
        .map_err(|_| "Global logger already initialized".to_string())
}

/// Check whether global logging has been initialized
pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

/// Get the global logger if initialized
pub fn try_get_global_logger() -> Option<Arc<LoggingService>> {
    GLOBAL_LOGGER.get().cloned()
}

/// The bounded memory channel attached by `init_global_logging`
pub fn memory_channel() -> Option<Arc<MemoryLogger>> {
    GLOBAL_MEMORY.get().cloned()
}

/// Log an error with context through the global service
pub fn log_error_with_context(code: Code, message: &str, context: Vec<(&str, String)>) {
    if let Some(logger) = try_get_global_logger() {
        let mut event = LogEvent::error(code, message);
        for (key, value) in context {
            event = event.with_context(key, &value);
        }
        logger.log_event(event);
    }
}

/// Log a success with context through the global service
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, String)>) {
    if let Some(logger) = try_get_global_logger() {
        let mut event = LogEvent::success(code, message);
        for (key, value) in context {
            event = event.with_context(key, &value);
        }
        logger.log_event(event);
    }
}

/// Log an info message with context through the global service
pub fn log_info_with_context(message: &str, context: Vec<(&str, String)>) {
    if let Some(logger) = try_get_global_logger() {
        let mut event = LogEvent::info(message);
        for (key, value) in context {
            event = event.with_context(key, &value);
        }
        logger.log_event(event);
    }
}

/// Log a warning with context through the global service
pub fn log_warning_with_context(message: &str, context: Vec<(&str, String)>) {
    if let Some(logger) = try_get_global_logger() {
        let mut event = LogEvent::warning(message);
        for (key, value) in context {
            event = event.with_context(key, &value);
        }
        logger.log_event(event);
    }
}

/// Log a debug message with context through the global service
pub fn log_debug_with_context(message: &str, context: Vec<(&str, String)>) {
    if let Some(logger) = try_get_global_logger() {
        let mut event = LogEvent::debug(message);
        for (key, value) in context {
            event = event.with_context(key, &value);
        }
        logger.log_event(event);
    }
}
