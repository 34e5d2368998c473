//! Directory-backed definition store
//!
//! Indexes every `*.xml` file of one directory as an export definition. The
//! definition id is the file stem. Preferences come from configuration
//! (`[preferences.<application>]`), not from the directory.

use crate::adapters::traits::DefinitionStore;
use crate::definition::Definition;
use crate::domain::context::ResultExt;
use crate::domain::{DefinitionId, ModelName, Result, TabulaError};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Preferences keyed by application, then preference key
pub type Preferences = HashMap<String, HashMap<String, String>>;

/// Definition store over a directory of XML files
#[derive(Debug, Default)]
pub struct FsDefinitionStore {
    dir: PathBuf,
    definitions: BTreeMap<DefinitionId, Definition>,
    preferences: Preferences,
}

impl FsDefinitionStore {
    /// Indexes the definitions in `dir`
    ///
    /// Files that fail to parse are logged and left out of the index.
    ///
    /// # Errors
    ///
    /// Returns [`TabulaError::Io`] if the directory cannot be read.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let mut definitions = BTreeMap::new();

        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .with_context(|| format!("reading definitions directory {}", dir.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("xml") {
                continue;
            }
            match Self::read_definition(&path).await {
                Ok(definition) => {
                    definitions.insert(definition.id.clone(), definition);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable definition");
                }
            }
        }

        tracing::debug!(
            dir = %dir.display(),
            count = definitions.len(),
            "Indexed export definitions"
        );

        Ok(Self {
            dir,
            definitions,
            preferences: Preferences::new(),
        })
    }

    /// Sets the preferences served by [`DefinitionStore::get_preference`]
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Directory the store was opened on
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All indexed definitions, ordered by id
    pub fn definitions(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.values()
    }

    /// Reads and parses one definition file
    ///
    /// Relative template paths in the definition resolve against the file's
    /// directory.
    pub async fn read_definition(path: &Path) -> Result<Definition> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                TabulaError::Definition(format!("Invalid definition file name: {}", path.display()))
            })?;
        let id = DefinitionId::new(stem).map_err(TabulaError::Definition)?;

        let xml = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;

        Definition::from_xml(id, &xml, path.parent().map(Path::to_path_buf))
            .with_context(|| path.display().to_string())
    }
}

#[async_trait]
impl DefinitionStore for FsDefinitionStore {
    async fn get(&self, id: &DefinitionId) -> Result<Definition> {
        self.definitions.get(id).cloned().ok_or_else(|| {
            TabulaError::ConfigNotFound(format!("Export definition with id '{id}' not found."))
        })
    }

    async fn get_from_file(&self, path: &Path) -> Result<Definition> {
        if !path.exists() {
            return Err(TabulaError::ConfigNotFound(format!(
                "Export definition file {} not found.",
                path.display()
            )));
        }
        Self::read_definition(path).await
    }

    async fn search(&self, model: &ModelName, name: &str) -> Result<Vec<Definition>> {
        Ok(self
            .definitions
            .values()
            .filter(|d| d.model == *model && d.name == name)
            .cloned()
            .collect())
    }

    async fn get_preference(&self, application: &str, key: &str, default: &str) -> Result<String> {
        Ok(self
            .preferences
            .get(application)
            .and_then(|prefs| prefs.get(key))
            .cloned()
            .unwrap_or_else(|| default.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, file: &str, name: &str, model: &str) {
        let xml = format!(
            "<config><name>{name}</name><model>{model}</model><format>csv</format></config>"
        );
        fs::write(dir.join(file), xml).unwrap();
    }

    #[tokio::test]
    async fn test_open_indexes_xml_files() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "adb_default.xml", "default", "Addressbook_Model_Contact");
        write(temp.path(), "adb_short.xml", "short", "Addressbook_Model_Contact");
        fs::write(temp.path().join("README.txt"), "not a definition").unwrap();
        fs::write(temp.path().join("broken.xml"), "<config>").unwrap();

        let store = FsDefinitionStore::open(temp.path()).await.unwrap();
        let ids: Vec<_> = store.definitions().map(|d| d.id.to_string()).collect();
        assert_eq!(ids, vec!["adb_default", "adb_short"]);
    }

    #[tokio::test]
    async fn test_search_by_model_and_name() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "adb_default.xml", "default", "Addressbook_Model_Contact");
        write(temp.path(), "crm_default.xml", "default", "Crm_Model_Lead");

        let store = FsDefinitionStore::open(temp.path()).await.unwrap();
        let model = ModelName::new("Crm_Model_Lead").unwrap();

        let found = store.search(&model, "default").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.as_str(), "crm_default");

        assert!(store.search(&model, "missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_config_not_found() {
        let temp = TempDir::new().unwrap();
        let store = FsDefinitionStore::open(temp.path()).await.unwrap();
        let err = store
            .get(&DefinitionId::new("nope").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, TabulaError::ConfigNotFound(_)));
    }

    #[tokio::test]
    async fn test_preferences_fall_back_to_default() {
        let temp = TempDir::new().unwrap();
        let mut prefs = Preferences::new();
        prefs.insert(
            "Addressbook".to_string(),
            HashMap::from([("exportName".to_string(), "short".to_string())]),
        );
        let store = FsDefinitionStore::open(temp.path())
            .await
            .unwrap()
            .with_preferences(prefs);

        let name = store
            .get_preference("Addressbook", "exportName", "default")
            .await
            .unwrap();
        assert_eq!(name, "short");

        let name = store.get_preference("Crm", "exportName", "default").await.unwrap();
        assert_eq!(name, "default");
    }
}
