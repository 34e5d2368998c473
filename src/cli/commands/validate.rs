//! Validate definition command implementation
//!
//! Parses export definitions, compiles their templates and prints the
//! resulting column layout.

use crate::adapters::definitions::FsDefinitionStore;
use crate::config::load_config;
use crate::core::template::{synthesize_column_source, MiniJinjaEngine, TemplateEngine};
use crate::definition::{ColumnSource, Definition, ExportOptions};
use crate::domain::context::ResultExt;
use crate::domain::Result;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the validate-definition command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Definition files; defaults to every definition of the configured directory
    pub files: Vec<PathBuf>,
}

impl ValidateArgs {
    /// Execute the validate-definition command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let definitions: Vec<Result<Definition>> = if self.files.is_empty() {
            let config = match load_config(config_path) {
                Ok(c) => c,
                Err(e) => {
                    println!("❌ Failed to load configuration file");
                    println!("   Error: {e}");
                    return Ok(2);
                }
            };
            tracing::info!(dir = %config.export.definitions_dir.display(), "Validating definitions");
            match FsDefinitionStore::open(&config.export.definitions_dir).await {
                Ok(store) => store.definitions().cloned().map(Ok).collect(),
                Err(e) => {
                    println!("❌ Failed to read definitions directory");
                    println!("   Error: {e}");
                    return Ok(2);
                }
            }
        } else {
            let mut parsed = Vec::with_capacity(self.files.len());
            for path in &self.files {
                parsed.push(FsDefinitionStore::read_definition(path).await);
            }
            parsed
        };

        if definitions.is_empty() {
            println!("⚠️  No export definitions found");
            return Ok(2);
        }

        let mut failures = 0;
        for definition in definitions {
            match definition {
                Ok(definition) => match check(&definition).await {
                    Ok(()) => print_definition(&definition),
                    Err(e) => {
                        failures += 1;
                        println!("❌ {}: {e}", definition.id);
                    }
                },
                Err(e) => {
                    failures += 1;
                    println!("❌ {e}");
                }
            }
        }

        if failures > 0 {
            println!();
            println!("{failures} definition(s) failed validation");
            Ok(2)
        } else {
            Ok(0)
        }
    }
}

/// Compiles the templates a definition would run with
async fn check(definition: &Definition) -> Result<()> {
    let config = definition.to_config(&ExportOptions::default());
    let engine = MiniJinjaEngine::new();

    if let Some(path) = &config.template {
        let source = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading template {}", path.display()))?;
        engine.compile(&path.display().to_string(), &source)?;
    } else if config.template_expressions().next().is_some() {
        engine.compile("columns", &synthesize_column_source(config.template_expressions()))?;
    }
    Ok(())
}

fn print_definition(definition: &Definition) {
    let config = definition.to_config(&ExportOptions::default());

    println!("✅ {} ({})", definition.id, definition.name);
    println!("   Model: {}", definition.model);
    println!("   Format: {}", config.format.as_deref().unwrap_or("-"));
    if let Some(template) = &config.template {
        println!("   Template: {}", template.display());
        for entry in &config.template_mapping {
            println!("     {} <- {}", entry.output_key, entry.template_key);
        }
    }
    if config.columns.is_empty() {
        println!("   Columns: all model fields");
    }
    for column in &config.columns {
        let source = match column.source() {
            ColumnSource::Template(expr) => format!("template {expr}"),
            ColumnSource::Property(property) => format!("property {property}"),
            ColumnSource::Unsourced => "no source".to_string(),
        };
        println!("   - {:<20} {}", column.header_label(), source);
    }
    println!();
}
