//! XML export definitions
//!
//! A definition is a small XML document:
//!
//! ```xml
//! <config>
//!     <name>adb_default_csv</name>
//!     <model>Addressbook_Model_Contact</model>
//!     <format>csv</format>
//!     <header>1</header>
//!     <datetimeFormat>%d.%m.%Y %H:%M</datetimeFormat>
//!     <columns>
//!         <column>
//!             <identifier>n_fn</identifier>
//!             <header>Name</header>
//!             <recordProperty>n_fn</recordProperty>
//!         </column>
//!         <column>
//!             <identifier>creator</identifier>
//!             <type>created_by</type>
//!             <header>Created by</header>
//!             <expression>{{ record.created_by.display_name }}</expression>
//!         </column>
//!     </columns>
//! </config>
//! ```
//!
//! Document-template definitions add `<template>path</template>` and a
//! `<mapping>` of `<field key="..." source="..."/>` entries.

use super::loader::ExportOptions;
use super::model::{ColumnSpec, ExportConfig, MappingEntry};
use crate::domain::{DefinitionId, ModelName, Result, TabulaError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDefinition {
    name: Option<String>,
    model: Option<String>,
    label: Option<String>,
    format: Option<String>,
    header: Option<String>,
    template: Option<String>,
    #[serde(alias = "datetimeformat")]
    datetime_format: Option<String>,
    export_filename: Option<String>,
    columns: Option<RawColumns>,
    mapping: Option<RawMapping>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawColumns {
    #[serde(default)]
    column: Vec<RawColumn>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawColumn {
    identifier: Option<String>,
    #[serde(rename = "type")]
    field_type: Option<String>,
    header: Option<String>,
    record_property: Option<String>,
    expression: Option<String>,
    datetime_format: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawMapping {
    #[serde(default)]
    field: Vec<RawMappingField>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawMappingField {
    #[serde(rename = "@key")]
    key: String,
    #[serde(rename = "@source")]
    source: Option<String>,
}

/// A stored export definition in raw form
#[derive(Debug, Clone)]
pub struct Definition {
    /// Store id (file stem for file-backed definitions)
    pub id: DefinitionId,
    /// Definition name
    pub name: String,
    /// Model the definition exports
    pub model: ModelName,
    /// Human readable label
    pub label: Option<String>,
    /// Directory relative template paths are resolved against
    pub base_dir: Option<PathBuf>,
    raw: RawDefinition,
}

impl Definition {
    /// Parses a definition document
    ///
    /// # Errors
    ///
    /// Returns [`TabulaError::Definition`] if the XML is malformed or the
    /// `<model>` element is missing or invalid.
    pub fn from_xml(id: DefinitionId, xml: &str, base_dir: Option<PathBuf>) -> Result<Self> {
        let raw: RawDefinition = quick_xml::de::from_str(xml)?;

        let model = raw
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| {
                TabulaError::Definition(format!("Definition '{id}' does not declare a <model>"))
            })
            .and_then(|m| {
                ModelName::new(m)
                    .map_err(|e| TabulaError::Definition(format!("Definition '{id}': {e}")))
            })?;

        let name = raw
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(id.as_str())
            .to_string();

        Ok(Self {
            name,
            model,
            label: raw.label.clone(),
            base_dir,
            raw,
            id,
        })
    }

    /// Builds the export config, applying option overrides
    pub fn to_config(&self, options: &ExportOptions) -> ExportConfig {
        let raw = &self.raw;

        let columns = raw
            .columns
            .as_ref()
            .map(|c| c.column.iter().enumerate().map(|(i, col)| column_spec(i, col)).collect())
            .unwrap_or_default();

        let template = options
            .template
            .clone()
            .or_else(|| trimmed(&raw.template).map(PathBuf::from))
            .map(|path| self.resolve_path(&path));

        let template_mapping = raw
            .mapping
            .as_ref()
            .map(|m| {
                m.field
                    .iter()
                    .map(|f| {
                        let source = f.source.as_deref().unwrap_or(&f.key);
                        MappingEntry::new(f.key.trim(), source.trim())
                    })
                    .collect()
            })
            .unwrap_or_default();

        ExportConfig {
            name: self.name.clone(),
            format: trimmed(&raw.format).map(str::to_string),
            columns,
            write_generic_header: parse_flag(raw.header.as_deref(), true),
            template,
            template_mapping,
            datetime_format: options
                .datetime_format
                .clone()
                .or_else(|| trimmed(&raw.datetime_format).map(str::to_string)),
            export_filename: trimmed(&raw.export_filename).map(str::to_string),
        }
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn column_spec(index: usize, raw: &RawColumn) -> ColumnSpec {
    let identifier = trimmed(&raw.identifier)
        .or_else(|| trimmed(&raw.record_property))
        .map(str::to_string)
        .unwrap_or_else(|| format!("column_{index}"));

    ColumnSpec {
        identifier,
        field_type: trimmed(&raw.field_type).map(str::to_string),
        header: raw.header.clone(),
        record_property: trimmed(&raw.record_property).map(str::to_string),
        // expressions keep their whitespace; it is part of the rendered value
        template_expr: raw.expression.clone().filter(|e| !e.trim().is_empty()),
        datetime_format: trimmed(&raw.datetime_format).map(str::to_string),
    }
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Reads `1`/`true`/`yes`/`on` and `0`/`false`/`no`/`off`; anything else is `default`
fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.trim().to_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
