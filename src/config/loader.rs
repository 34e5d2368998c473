//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::TabulaConfig;
use crate::domain::errors::TabulaError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`TabulaConfig`]
/// 4. Applies environment variable overrides (`TABULA_*` prefix)
/// 5. Validates the configuration
///
/// A relative `export.definitions_dir` is resolved against the directory of
/// the configuration file.
///
/// # Errors
///
/// Returns [`TabulaError::Configuration`] if the file cannot be read or
/// parsed, a referenced environment variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use tabula::config::loader::load_config;
///
/// let config = load_config("tabula.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<TabulaConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(TabulaError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        TabulaError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let mut config = parse_config(&contents)?;

    if config.export.definitions_dir.is_relative() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.export.definitions_dir = parent.join(&config.export.definitions_dir);
        }
    }

    Ok(config)
}

/// Parses and validates configuration text
///
/// Same pipeline as [`load_config`] without the file access.
pub fn parse_config(contents: &str) -> Result<TabulaConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: TabulaConfig = toml::from_str(&contents)
        .map_err(|e| TabulaError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    config.validate().map_err(|e| {
        TabulaError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are copied unchanged.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| TabulaError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&cap[0], &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(TabulaError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    let mut result = lines.join("\n");
    if input.ends_with('\n') {
        result.push('\n');
    }
    Ok(result)
}

/// Applies environment variable overrides using the `TABULA_*` prefix
///
/// Variables follow the pattern `TABULA_<SECTION>_<KEY>`, e.g.
/// `TABULA_EXPORT_PAGE_SIZE` or `TABULA_ACCOUNT_TIMEZONE`. Values that do not
/// parse are ignored.
fn apply_env_overrides(config: &mut TabulaConfig, var: impl Fn(&str) -> Option<String>) {
    // Application overrides
    if let Some(val) = var("TABULA_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Export overrides
    if let Some(size) = var("TABULA_EXPORT_PAGE_SIZE").and_then(|v| v.parse().ok()) {
        config.export.page_size = size;
    }
    if let Some(val) = var("TABULA_EXPORT_DEFAULT_EXPORT_NAME") {
        config.export.default_export_name = val;
    }
    if let Some(val) = var("TABULA_EXPORT_PREFERENCE_KEY") {
        config.export.preference_key = Some(val);
    }
    if let Some(val) = var("TABULA_EXPORT_DEFINITIONS_DIR") {
        config.export.definitions_dir = PathBuf::from(val);
    }
    if let Some(val) = var("TABULA_EXPORT_DEFAULT_FORMAT") {
        config.export.default_format = val;
    }
    if let Some(val) = var("TABULA_EXPORT_CSV_DELIMITER") {
        config.export.csv_delimiter = val;
    }

    // Account overrides
    if let Some(val) = var("TABULA_ACCOUNT_ID") {
        config.account.id = val;
    }
    if let Some(val) = var("TABULA_ACCOUNT_DISPLAY_NAME") {
        config.account.display_name = val;
    }
    if let Some(val) = var("TABULA_ACCOUNT_TIMEZONE") {
        config.account.timezone = val;
    }
    if let Some(val) = var("TABULA_ACCOUNT_LOCALE") {
        config.account.locale = val;
    }

    // Logging overrides
    if let Some(enabled) = var("TABULA_LOGGING_LOCAL_ENABLED").and_then(|v| v.parse().ok()) {
        config.logging.local_enabled = enabled;
    }
    if let Some(val) = var("TABULA_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = var("TABULA_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("TABULA_TEST_SUBST_VAR", "test_value");
        let input = "title = \"${TABULA_TEST_SUBST_VAR}\"\n";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "title = \"test_value\"\n");
        std::env::remove_var("TABULA_TEST_SUBST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("TABULA_TEST_MISSING_VAR");
        let input = "title = \"${TABULA_TEST_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("TABULA_TEST_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("TABULA_TEST_COMMENTED_VAR");
        let input = "# title = \"${TABULA_TEST_COMMENTED_VAR}\"";
        assert_eq!(substitute_env_vars(input).unwrap(), input);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("TABULA_EXPORT_PAGE_SIZE", "25"),
            ("TABULA_ACCOUNT_TIMEZONE", "+01:00"),
            ("TABULA_LOGGING_LOCAL_ENABLED", "true"),
            ("TABULA_EXPORT_CSV_DELIMITER", ";"),
        ]);
        let mut config = TabulaConfig::default();
        apply_env_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.export.page_size, 25);
        assert_eq!(config.account.timezone, "+01:00");
        assert!(config.logging.local_enabled);
        assert_eq!(config.export.csv_delimiter, ";");
    }

    #[test]
    fn test_env_overrides_ignore_unparsable_values() {
        let mut config = TabulaConfig::default();
        apply_env_overrides(&mut config, |key| {
            (key == "TABULA_EXPORT_PAGE_SIZE").then(|| "many".to_string())
        });
        assert_eq!(config.export.page_size, 100);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-tabula.toml");
        assert!(matches!(result, Err(TabulaError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[export]
page_size = 50
definitions_dir = "defs"

[account]
id = "u1"
display_name = "Alice"
timezone = "+02:00"

[branding]
title = "Acme CRM"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.export.page_size, 50);
        assert_eq!(config.branding.title.as_deref(), Some("Acme CRM"));

        let parent = temp_file.path().parent().unwrap();
        assert_eq!(config.export.definitions_dir, parent.join("defs"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_values() {
        let result = parse_config("[export]\npage_size = 0\n");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }
}
