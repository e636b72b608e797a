//! Tracing bootstrap for hosts that embed the engine without a subscriber
//! of their own. Library code only emits `tracing` events; installing a
//! global subscriber is the host's decision, so this helper never panics
//! and steps aside when one is already in place.

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::EngineError;

const LOG_FILE_PREFIX: &str = "learning-engine";

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Filter directive applied when `RUST_LOG` is unset.
    pub default_filter: String,
    /// Directory for daily-rolled JSON log files. `None` keeps output on
    /// stdout only, the usual mode for an embedded library.
    pub file_dir: Option<String>,
    pub max_log_files: usize,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            default_filter: "learning_engine=info".to_string(),
            file_dir: None,
            max_log_files: 14,
        }
    }
}

/// Install a global subscriber for engine events. Returns `Ok(true)` when
/// this call installed it and `Ok(false)` when one was already in place
/// (the host's subscriber wins). An unwritable log directory is the only
/// hard failure.
pub fn init(options: &LogOptions) -> Result<bool, EngineError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&options.default_filter));
    let stdout_layer = fmt::layer().with_target(true);
    let registry = tracing_subscriber::registry().with(filter).with(stdout_layer);

    let installed = match &options.file_dir {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .filename_suffix("log")
                .max_log_files(options.max_log_files)
                .build(dir)
                .map_err(|e| {
                    EngineError::validation(format!("cannot open log directory {dir}: {e}"))
                })?;
            let file_layer = fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .json();
            registry.with(file_layer).try_init().is_ok()
        }
        None => registry.try_init().is_ok(),
    };

    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_defers_to_the_first() {
        let options = LogOptions::default();
        let _ = init(&options).unwrap();
        // A subscriber now exists (ours or the harness's), so a repeat
        // install is refused without an error.
        assert!(!init(&options).unwrap());
    }

    #[test]
    fn unwritable_log_directory_is_an_error() {
        let options = LogOptions {
            file_dir: Some("/dev/null/logs".to_string()),
            ..LogOptions::default()
        };
        assert!(matches!(init(&options), Err(EngineError::Validation(_))));
    }
}
