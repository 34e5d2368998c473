//! Column configuration loader
//!
//! Resolves the definition an export runs with, in this order:
//!
//! 1. an explicit definition file ([`ExportOptions::definition_file`])
//! 2. an explicit definition id ([`ExportOptions::definition_id`])
//! 3. the definition of the model named by the user's preference, falling
//!    back to the default export name
//!
//! Only step 3 can come up empty, which yields
//! [`TabulaError::ConfigNotFound`].

use super::model::{ExportConfig, DEFAULT_EXPORT_NAME};
use crate::adapters::traits::DefinitionStore;
use crate::domain::context::ResultExt;
use crate::domain::{DefinitionId, ModelName, Result, TabulaError};
use std::path::PathBuf;
use std::sync::Arc;

/// Caller options for one export
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Definition file to use instead of the store
    pub definition_file: Option<PathBuf>,

    /// Store id of the definition to use
    pub definition_id: Option<DefinitionId>,

    /// Preference key holding the user's preferred export name
    pub preference_key: Option<String>,

    /// Document template overriding the definition's
    pub template: Option<PathBuf>,

    /// Date-time format overriding the definition's
    pub datetime_format: Option<String>,
}

/// Loads export configurations from a [`DefinitionStore`]
pub struct ColumnConfigLoader {
    store: Arc<dyn DefinitionStore>,
    default_export_name: String,
}

impl ColumnConfigLoader {
    /// Creates a loader using the `"default"` export name
    pub fn new(store: Arc<dyn DefinitionStore>) -> Self {
        Self {
            store,
            default_export_name: DEFAULT_EXPORT_NAME.to_string(),
        }
    }

    /// Overrides the export name used when no preference is stored
    pub fn with_default_export_name(mut self, name: impl Into<String>) -> Self {
        self.default_export_name = name.into();
        self
    }

    /// Loads the export configuration for `model`
    ///
    /// # Errors
    ///
    /// Returns [`TabulaError::ConfigNotFound`] if no definition of `model`
    /// carries the preferred name, and propagates store failures.
    pub async fn load(&self, model: &ModelName, options: &ExportOptions) -> Result<ExportConfig> {
        let definition = if let Some(path) = &options.definition_file {
            tracing::debug!(path = %path.display(), "Loading export definition from file");
            self.store
                .get_from_file(path)
                .await
                .with_context(|| format!("definition file {}", path.display()))?
        } else if let Some(id) = &options.definition_id {
            tracing::debug!(definition_id = %id, "Loading export definition by id");
            self.store.get(id).await?
        } else {
            let name = self.preferred_name(model, options).await?;
            tracing::debug!(model = %model, name = %name, "Searching export definition");

            self.store
                .search(model, &name)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    TabulaError::ConfigNotFound(format!(
                        "Export definition for model {model} not found."
                    ))
                })?
        };

        if definition.model != *model {
            tracing::warn!(
                model = %model,
                definition_model = %definition.model,
                definition = %definition.name,
                "Export definition was written for another model"
            );
        }

        let config = definition.to_config(options);
        tracing::trace!(config = ?config, "Export config");
        Ok(config)
    }

    async fn preferred_name(&self, model: &ModelName, options: &ExportOptions) -> Result<String> {
        match &options.preference_key {
            Some(key) => {
                self.store
                    .get_preference(model.application(), key, &self.default_export_name)
                    .await
            }
            None => Ok(self.default_export_name.clone()),
        }
    }
}
