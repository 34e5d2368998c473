//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - human-readable console output
//! - JSON-formatted log files with daily or hourly rotation
//! - log level from configuration, CLI or `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use tabula::logging::init_logging;
//! use tabula::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! tracing::warn!(model = "Addressbook_Model_Contact", "No records matched");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an export
///
/// # Example
///
/// ```no_run
/// use tabula::log_export_start;
/// use tabula::domain::ModelName;
///
/// let model = ModelName::new("Addressbook_Model_Contact").unwrap();
/// log_export_start!(&model, "default");
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($model:expr, $definition:expr) => {
        tracing::info!(
            model = %$model,
            definition = %$definition,
            "Starting export"
        );
    };
}

/// Log the completion of an export
///
/// # Example
///
/// ```no_run
/// use tabula::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!(42, Duration::from_secs(3));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($count:expr, $duration:expr) => {
        tracing::info!(
            count = $count,
            duration_ms = $duration.as_millis(),
            "Export completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use tabula::log_error_with_context;
/// use tabula::domain::TabulaError;
///
/// let error = TabulaError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log one processed page of records
///
/// # Example
///
/// ```no_run
/// use tabula::log_page_processing;
///
/// log_page_processing!(2, 100, 1000);
/// ```
#[macro_export]
macro_rules! log_page_processing {
    ($page:expr, $records:expr, $total:expr) => {
        tracing::debug!(
            page = $page,
            records = $records,
            total = $total,
            "Processing page"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::{ModelName, TabulaError};
    use std::time::Duration;

    #[test]
    fn test_macros_expand_without_subscriber() {
        let model = ModelName::new("Addressbook_Model_Contact").unwrap();
        crate::log_export_start!(&model, "default");
        crate::log_page_processing!(1usize, 10usize, 25usize);
        crate::log_export_complete!(25usize, Duration::from_millis(12));
        crate::log_error_with_context!(&TabulaError::Io("disk full".to_string()), "finalizing");
    }
}
