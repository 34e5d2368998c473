//! Error context extension trait
//!
//! Adds `.context()` / `.with_context()` to any result whose error converts
//! into [`TabulaError`]. Unlike `anyhow::Context`, the variant of the
//! underlying error is kept, so callers can still match on
//! [`TabulaError::ConfigNotFound`] after context was attached.
//!
//! ```rust
//! use tabula::domain::context::ResultExt;
//! use tabula::domain::Result;
//!
//! fn read_definition(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path).with_context(|| format!("reading definition {path}"))
//! }
//! ```

use crate::domain::errors::TabulaError;
use crate::domain::result::Result;
use std::fmt::Display;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error (evaluated eagerly)
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display;

    /// Add context to an error, computing it only on the error path
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<TabulaError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display,
    {
        self.map_err(|e| prefixed(e.into(), &context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| prefixed(e.into(), &f()))
    }
}

/// Rebuilds `err` with the same variant and `context` prepended to its message
fn prefixed(err: TabulaError, context: &dyn Display) -> TabulaError {
    let wrap = |msg: String| format!("{context}: {msg}");
    match err {
        TabulaError::ConfigNotFound(m) => TabulaError::ConfigNotFound(wrap(m)),
        TabulaError::FormatNotFound(m) => TabulaError::FormatNotFound(wrap(m)),
        TabulaError::Definition(m) => TabulaError::Definition(wrap(m)),
        TabulaError::Template(m) => TabulaError::Template(wrap(m)),
        TabulaError::Source(m) => TabulaError::Source(wrap(m)),
        TabulaError::Resolution(m) => TabulaError::Resolution(wrap(m)),
        TabulaError::Sink(m) => TabulaError::Sink(wrap(m)),
        TabulaError::Configuration(m) => TabulaError::Configuration(wrap(m)),
        TabulaError::Validation(m) => TabulaError::Validation(wrap(m)),
        TabulaError::Serialization(m) => TabulaError::Serialization(wrap(m)),
        TabulaError::Io(m) => TabulaError::Io(wrap(m)),
    }
}
