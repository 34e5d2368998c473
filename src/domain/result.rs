//! Result type alias for Tabula

use super::errors::TabulaError;

/// Result type alias for Tabula operations
///
/// # Examples
///
/// ```
/// use tabula::domain::result::Result;
/// use tabula::domain::errors::TabulaError;
///
/// fn lookup(found: bool) -> Result<()> {
///     if found {
///         Ok(())
///     } else {
///         Err(TabulaError::ConfigNotFound("no definition".to_string()))
///     }
/// }
/// # assert!(lookup(true).is_ok());
/// ```
pub type Result<T> = std::result::Result<T, TabulaError>;
