//! Logging infrastructure - structured tracing across the boundary
//!
//! Design: Uses `tracing` for structured, contextual logging with:
//! - Configurable log levels, from the environment or `protolink.toml`
//! - Zero-cost when disabled
//! - Optional JSON output and span events
//! - Optional file output through a non-blocking appender

use once_cell::sync::OnceCell;
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::interop::CallError;
use crate::proto::CallStatus;

/// Global logging state
static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Default log level
    pub level: Level,
    /// Log file path; logs go to stderr when `None`
    pub log_path: Option<String>,
    /// Enable JSON format (vs human-readable)
    pub json_format: bool,
    /// Show span events (enter/exit)
    pub show_spans: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            log_path: None,
            json_format: false,
            show_spans: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// Overlay environment variables on top of `self`
    pub fn merge_env(mut self) -> Self {
        // PROTOLINK_LOG_LEVEL: trace, debug, info, warn, error
        if let Ok(level_str) = std::env::var("PROTOLINK_LOG_LEVEL") {
            self.level = parse_level(&level_str).unwrap_or(self.level);
        }

        // PROTOLINK_LOG_FILE: path to log file
        if let Ok(path) = std::env::var("PROTOLINK_LOG_FILE") {
            self.log_path = Some(path);
        }

        if std::env::var("PROTOLINK_LOG_JSON").is_ok() {
            self.json_format = true;
        }

        if std::env::var("PROTOLINK_LOG_SPANS").is_ok() {
            self.show_spans = true;
        }

        self
    }

    /// Create high-performance config (minimal logging)
    pub fn performance() -> Self {
        Self {
            level: Level::ERROR,
            ..Self::default()
        }
    }

    /// Create debug config (verbose logging)
    pub fn debug() -> Self {
        Self {
            level: Level::TRACE,
            log_path: Some("protolink.log".to_string()),
            json_format: false,
            show_spans: true,
        }
    }
}

/// Parse a level name, case-insensitively
pub fn parse_level(name: &str) -> Option<Level> {
    match name.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Initialize logging with configuration from the environment
pub fn init() -> Option<WorkerGuard> {
    init_with_config(LogConfig::from_env())
}

/// Initialize logging with custom configuration
///
/// Only the first call installs a subscriber. The returned guard flushes
/// file output on drop and must be kept alive for the program's duration.
pub fn init_with_config(config: LogConfig) -> Option<WorkerGuard> {
    let mut guard = None;

    LOGGER_INITIALIZED.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("protolink={}", config.level.as_str().to_lowercase()))
        });

        let span_events = if config.show_spans {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let (writer, worker) = match &config.log_path {
            Some(path) => {
                let path = Path::new(path);
                let directory = path.parent().unwrap_or_else(|| Path::new("."));
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "protolink.log".to_string());
                tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name))
            }
            None => tracing_appender::non_blocking(std::io::stderr()),
        };
        guard = Some(worker);

        let layer = fmt::layer()
            .with_writer(writer)
            .with_span_events(span_events)
            .with_target(true)
            .with_thread_ids(cfg!(debug_assertions))
            .with_line_number(cfg!(debug_assertions));

        let layer = if config.json_format {
            layer.json().boxed()
        } else {
            layer.compact().boxed()
        };

        // another subscriber may already be installed by the host application
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(layer)
            .try_init();
    });

    guard
}

/// Check if logging is initialized
pub fn is_initialized() -> bool {
    LOGGER_INITIALIZED.get().is_some()
}

// ============================================================================
// Boundary-specific logging functions
// ============================================================================

/// Log an outgoing boundary call
#[inline]
pub fn log_boundary_call(function: &str, request_bytes: usize) {
    use tracing::debug;
    debug!(
        event = "boundary_call",
        function = function,
        request_bytes = request_bytes,
        "Boundary function called"
    );
}

/// Log a successful return
#[inline]
pub fn log_boundary_return(function: &str, status: i32) {
    use tracing::trace;
    trace!(
        event = "boundary_return",
        function = function,
        status = status,
        "Boundary function returned"
    );
}

/// Log a failed call. Failures are returned to the caller, so this stays
/// at debug level.
pub fn log_boundary_failure(function: &str, status: i32, error: &CallError) {
    use tracing::debug;
    let status_name = CallStatus::try_from(status)
        .map(|s| s.as_str_name())
        .unwrap_or("UNMAPPED");
    debug!(
        event = "boundary_failure",
        function = function,
        status = status,
        status_name = status_name,
        kind = ?error.kind(),
        error = %error,
        "Boundary function failed"
    );
}

/// Log a native instance creation
pub fn log_handle_created(kind: &str, handle: u64) {
    use tracing::debug;
    debug!(
        event = "handle_created",
        kind = kind,
        handle = handle,
        "Native instance created"
    );
}

/// Log a native instance release
pub fn log_handle_released(kind: &str, handle: u64) {
    use tracing::debug;
    debug!(
        event = "handle_released",
        kind = kind,
        handle = handle,
        "Native instance released"
    );
}

/// Performance tracking utilities
pub mod perf {
    use std::time::Instant;
    use tracing::debug;

    /// Track operation duration (returns guard that logs on drop)
    #[must_use]
    pub fn track(operation: &str) -> PerformanceGuard {
        PerformanceGuard {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub struct PerformanceGuard {
        operation: String,
        start: Instant,
    }

    impl Drop for PerformanceGuard {
        fn drop(&mut self) {
            let elapsed = self.start.elapsed();
            debug!(
                operation = %self.operation,
                duration_us = elapsed.as_micros() as u64,
                "operation completed"
            );
        }
    }
}
