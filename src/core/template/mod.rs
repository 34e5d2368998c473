//! Template engine adapter
//!
//! Templates turn one record into JSON text: a JSON array for column exports
//! (one slot per expression column) or a JSON object for document-template
//! exports. The engine itself sits behind [`TemplateEngine`]; [`jinja`]
//! provides the MiniJinja implementation.
//!
//! Every template sees the same context:
//!
//! | name               | value                                       |
//! |--------------------|---------------------------------------------|
//! | `record`           | the record, or none on the footer pass      |
//! | `branding`         | `logo`, `title`, `description`, `weburl`    |
//! | `export.timestamp` | session start, RFC 3339 in account timezone |
//! | `export.account`   | `id`, `display_name`, `locale`              |

pub mod jinja;

pub use jinja::MiniJinjaEngine;

use crate::domain::{Account, Branding, Record, Result};
use serde::Serialize;

/// Values exposed to a template render
#[derive(Debug, Clone, Serialize)]
pub struct TemplateContext<'a> {
    /// Record being rendered; `None` on the footer pass
    pub record: Option<&'a Record>,
    /// Installation branding
    pub branding: &'a Branding,
    /// Export metadata
    pub export: ExportInfo<'a>,
}

/// The `export` entry of a [`TemplateContext`]
#[derive(Debug, Clone, Serialize)]
pub struct ExportInfo<'a> {
    /// Session start timestamp
    pub timestamp: &'a str,
    /// Exporting account
    pub account: &'a Account,
}

/// Compiles template sources
pub trait TemplateEngine: Send + Sync {
    /// Compiles `source` under `name`
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::TabulaError::Template`] on syntax errors.
    fn compile(&self, name: &str, source: &str) -> Result<Box<dyn CompiledTemplate>>;
}

/// A compiled template, rendered once per record
pub trait CompiledTemplate: Send + Sync {
    /// Renders the template; interpolated values are JSON string escaped
    fn render(&self, context: &TemplateContext<'_>) -> Result<String>;
}

/// Builds the column template `["<expr1>","<expr2>",...]` in column order
pub fn synthesize_column_source<'a>(expressions: impl IntoIterator<Item = &'a str>) -> String {
    let slots: Vec<String> = expressions
        .into_iter()
        .map(|expr| format!("\"{expr}\""))
        .collect();
    format!("[{}]", slots.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesize_column_source() {
        assert_eq!(
            synthesize_column_source(["{{ record.n_fn }}", "{{ record.age }} years"]),
            r#"["{{ record.n_fn }}","{{ record.age }} years"]"#
        );
        assert_eq!(synthesize_column_source(Vec::<&str>::new()), "[]");
    }
}
