//! Configuration management for Tabula.
//!
//! TOML configuration with:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `TABULA_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tabula::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("tabula.toml")?;
//!
//! println!("Definitions: {}", config.export.definitions_dir.display());
//! println!("Page size: {}", config.export.page_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level
//! - [`ExportSettings`] - page size, definition lookup, output format
//! - [`AccountConfig`] - the account exports run as (timezone, locale)
//! - [`crate::domain::Branding`] - values exposed to templates as `branding`
//! - `preferences` - per-application preference values
//! - [`LoggingConfig`] - file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [export]
//! page_size = 100
//! definitions_dir = "definitions"
//! preference_key = "exportName"
//!
//! [account]
//! id = "u1"
//! display_name = "Alice Admin"
//! timezone = "+02:00"
//!
//! [branding]
//! title = "${TABULA_BRAND_TITLE}"
//!
//! [preferences.Addressbook]
//! exportName = "short"
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_config, parse_config};
pub use schema::{AccountConfig, ApplicationConfig, ExportSettings, LoggingConfig, TabulaConfig};
