//! MiniJinja template engine
//!
//! Each compiled template owns its environment. Output of every `{{ }}`
//! interpolation is escaped as the inside of a JSON string literal, so
//! templates such as `["{{ record.name }}"]` always yield valid JSON. Undefined
//! and none values interpolate to nothing, and chained lookups on them stay
//! undefined, which keeps the footer pass (no record) from failing.

use super::{CompiledTemplate, TemplateContext, TemplateEngine};
use crate::domain::{Result, TabulaError};
use minijinja::{AutoEscape, Environment, Error, ErrorKind, UndefinedBehavior, Value};
use std::fmt::Write as _;

/// [`TemplateEngine`] backed by MiniJinja
#[derive(Debug, Clone, Copy, Default)]
pub struct MiniJinjaEngine;

impl MiniJinjaEngine {
    /// Creates the engine
    pub fn new() -> Self {
        Self
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn compile(&self, name: &str, source: &str) -> Result<Box<dyn CompiledTemplate>> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_undefined_behavior(UndefinedBehavior::Chainable);
        env.set_formatter(|out, _state, value| {
            if value.is_undefined() || value.is_none() {
                return Ok(());
            }
            out.write_str(&json_escape(value)?)
                .map_err(|e| Error::new(ErrorKind::WriteFailure, e.to_string()))
        });

        env.add_template_owned(name.to_string(), source.to_string())
            .map_err(|e| TabulaError::Template(format!("invalid template syntax in '{name}': {e}")))?;

        tracing::debug!(template = name, "Compiled template");
        Ok(Box::new(MiniJinjaTemplate {
            env,
            name: name.to_string(),
        }))
    }
}

struct MiniJinjaTemplate {
    env: Environment<'static>,
    name: String,
}

impl CompiledTemplate for MiniJinjaTemplate {
    fn render(&self, context: &TemplateContext<'_>) -> Result<String> {
        let template = self.env.get_template(&self.name)?;
        template
            .render(Value::from_serialize(context))
            .map_err(|e| TabulaError::Template(format!("rendering '{}' failed: {e}", self.name)))
    }
}

fn json_escape(value: &Value) -> std::result::Result<String, Error> {
    let text = match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    };
    let quoted = serde_json::to_string(&text)
        .map_err(|e| Error::new(ErrorKind::WriteFailure, e.to_string()))?;
    Ok(quoted[1..quoted.len() - 1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::template::ExportInfo;
    use crate::domain::{Account, Branding, Record};

    fn render(source: &str, record: Option<&Record>) -> Result<String> {
        let account = Account::new("acc", "Exporter");
        let branding = Branding {
            title: Some("Tabula".to_string()),
            ..Branding::default()
        };
        let context = TemplateContext {
            record,
            branding: &branding,
            export: ExportInfo {
                timestamp: "2024-03-01T10:00:00+00:00",
                account: &account,
            },
        };
        MiniJinjaEngine::new().compile("test", source)?.render(&context)
    }

    #[test]
    fn test_renders_record_fields() {
        let record = Record::new("1").with("name", "Alice").with("age", 42i64);
        let out = render(r#"["{{ record.name }}","{{ record.age }}"]"#, Some(&record)).unwrap();
        assert_eq!(out, r#"["Alice","42"]"#);
    }

    #[test]
    fn test_values_are_json_escaped() {
        let record = Record::new("1").with("name", "say \"hi\"\nbye");
        let out = render(r#"["{{ record.name }}"]"#, Some(&record)).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, vec!["say \"hi\"\nbye"]);
    }

    #[test]
    fn test_footer_pass_renders_empty_slots() {
        let out = render(r#"["{{ record.created_by.display_name }}"]"#, None).unwrap();
        assert_eq!(out, r#"[""]"#);
    }

    #[test]
    fn test_context_exposes_branding_and_export() {
        let out = render(
            r#"{"title":"{{ branding.title }}","by":"{{ export.account.display_name }}"}"#,
            None,
        )
        .unwrap();
        assert_eq!(out, r#"{"title":"Tabula","by":"Exporter"}"#);
    }

    #[test]
    fn test_syntax_error_is_template_error() {
        let err = MiniJinjaEngine::new()
            .compile("broken", "{{ record.name ")
            .err()
            .unwrap();
        assert!(matches!(err, TabulaError::Template(_)));
    }
}
