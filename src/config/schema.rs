//! Configuration schema types
//!
//! Every section has defaults, so an empty `tabula.toml` is a valid
//! configuration.

use crate::adapters::definitions::Preferences;
use crate::definition::DEFAULT_EXPORT_NAME;
use crate::domain::{parse_locale, Account, AccountTimezone, Branding};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main Tabula configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TabulaConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportSettings,

    /// The account exports run on behalf of
    #[serde(default)]
    pub account: AccountConfig,

    /// Installation branding exposed to templates
    #[serde(default)]
    pub branding: Branding,

    /// Stored preferences, keyed by application
    #[serde(default)]
    pub preferences: Preferences,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TabulaConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.export.validate()?;
        self.account.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid application.log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Records fetched per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Definition name searched when no preference names one
    #[serde(default = "default_export_name")]
    pub default_export_name: String,

    /// Preference key holding the user's preferred export name
    #[serde(default)]
    pub preference_key: Option<String>,

    /// Directory of `*.xml` export definitions
    #[serde(default = "default_definitions_dir")]
    pub definitions_dir: PathBuf,

    /// Format assumed for definitions that declare none
    #[serde(default = "default_format")]
    pub default_format: String,

    /// CSV field delimiter
    #[serde(default = "default_csv_delimiter")]
    pub csv_delimiter: String,
}

impl ExportSettings {
    fn validate(&self) -> Result<(), String> {
        if !(1..=10_000).contains(&self.page_size) {
            return Err(format!(
                "export.page_size must be between 1 and 10000, got {}",
                self.page_size
            ));
        }

        if self.default_export_name.trim().is_empty() {
            return Err("export.default_export_name cannot be empty".to_string());
        }

        let valid_formats = ["csv"];
        if !valid_formats.contains(&self.default_format.as_str()) {
            return Err(format!(
                "Invalid export.default_format '{}'. Must be one of: {}",
                self.default_format,
                valid_formats.join(", ")
            ));
        }

        self.delimiter()?;
        Ok(())
    }

    /// The CSV delimiter as a single byte
    ///
    /// # Errors
    ///
    /// Returns an error unless the delimiter is exactly one ASCII character.
    pub fn delimiter(&self) -> Result<u8, String> {
        match self.csv_delimiter.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(format!(
                "export.csv_delimiter must be a single ASCII character, got '{}'",
                self.csv_delimiter
            )),
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            default_export_name: default_export_name(),
            preference_key: None,
            definitions_dir: default_definitions_dir(),
            default_format: default_format(),
            csv_delimiter: default_csv_delimiter(),
        }
    }
}

/// Account configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Account id, used for container grants
    #[serde(default = "default_account_id")]
    pub id: String,

    /// Display name exposed to templates
    #[serde(default = "default_account_name")]
    pub display_name: String,

    /// Timezone date-times are rendered in: a UTC offset such as `+02:00`
    /// or an IANA name such as `Europe/Berlin`
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Locale tag used for month and day names, e.g. `de_DE`
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl AccountConfig {
    fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("account.id cannot be empty".to_string());
        }
        AccountTimezone::parse(&self.timezone).map_err(|e| format!("account.timezone: {e}"))?;
        parse_locale(&self.locale).map_err(|e| format!("account.locale: {e}"))?;
        Ok(())
    }

    /// Builds the exporting [`Account`]
    ///
    /// # Errors
    ///
    /// Returns an error if the timezone is neither a UTC offset nor a known
    /// IANA zone.
    pub fn to_account(&self) -> Result<Account, String> {
        let timezone =
            AccountTimezone::parse(&self.timezone).map_err(|e| format!("account.timezone: {e}"))?;
        Ok(Account::new(&self.id, &self.display_name)
            .with_timezone(timezone)
            .with_locale(&self.locale))
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            id: default_account_id(),
            display_name: default_account_name(),
            timezone: default_timezone(),
            locale: default_locale(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_page_size() -> usize {
    100
}

fn default_export_name() -> String {
    DEFAULT_EXPORT_NAME.to_string()
}

fn default_definitions_dir() -> PathBuf {
    PathBuf::from("definitions")
}

fn default_format() -> String {
    "csv".to_string()
}

fn default_csv_delimiter() -> String {
    ",".to_string()
}

fn default_account_id() -> String {
    "tabula".to_string()
}

fn default_account_name() -> String {
    "Tabula".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
