//! Logging service implementation

use super::events::{LogEvent, LogLevel};
use crate::config::compile_time::logging::MEMORY_CHANNEL_CAPACITY;
use crate::config::runtime::LoggingPreferences;
use std::sync::{Arc, Mutex};

/// Simple logger trait
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Main logging service with configuration awareness
pub struct LoggingService {
    loggers: Vec<Arc<dyn Logger>>,
    min_level: LogLevel,
}

impl LoggingService {
    /// Create new logging service with specified loggers and minimum level
    pub fn new(loggers: Vec<Arc<dyn Logger>>, min_level: LogLevel) -> Self {
        Self { loggers, min_level }
    }

    /// Create service with configuration-aware settings
    pub fn with_config() -> Self {
        let preferences = LoggingPreferences::default();
        let min_level = preferences.min_log_level;
        let console: Arc<dyn Logger> = if preferences.use_structured_logging {
            Arc::new(StructuredLogger)
        } else {
            Arc::new(ConsoleLogger)
        };

        Self::new(vec![console], min_level)
    }

    /// Attach an additional logger, typically a memory channel
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.loggers.push(logger);
        self
    }

    /// Check if level should be logged
    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    /// Log an event
    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            for logger in &self.loggers {
                logger.log(&event);
            }
        }
    }
}

/// Simple console logger with local timestamps
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let mut line = format!("{} {}", stamp, event.format());
        if !event.context.is_empty() {
            let mut pairs: Vec<String> = event
                .context
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            pairs.sort();
            line.push_str(&format!(" ({})", pairs.join(", ")));
        }
        if event.is_error() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

/// JSON-lines logger for structured log consumers
pub struct StructuredLogger;

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        match event.format_json() {
            Ok(json) => println!("{}", json),
            Err(_) => println!("{}", event.format()),
        }
    }
}

/// Bounded in-memory logger
///
/// Serves as the observable error channel: invocation failures degrade a
/// chain to false, and the event lands here for callers to inspect.
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
    capacity: usize,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::with_capacity(MEMORY_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Snapshot of the recorded events, oldest first
    pub fn events(&self) -> Vec<LogEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Snapshot of the recorded error events only
    pub fn errors(&self) -> Vec<LogEvent> {
        self.events().into_iter().filter(|e| e.is_error()).collect()
    }

    /// Drop all recorded events
    pub fn clear(&self) {
        match self.events.lock() {
            Ok(mut events) => events.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        if events.len() == self.capacity {
            events.remove(0);
        }
        events.push(event.clone());
    }
}
