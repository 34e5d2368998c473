//! JSON dataset adapter
//!
//! A single JSON file holding the records of one model together with the
//! users, notes and containers they reference. It implements the record
//! source and all three resolution collaborators, so an export can run end to
//! end without external services.
//!
//! ```json
//! {
//!   "model": "Addressbook_Model_Contact",
//!   "fields": ["id", "n_fn", "email", "created_by", "creation_time"],
//!   "datetime_fields": ["creation_time"],
//!   "records": [{"id": "1", "n_fn": "Alice", "created_by": "u1"}],
//!   "users": [{"id": "u1", "display_name": "Alice Admin"}],
//!   "notes": {"1": [{"note_type": "note", "note": "Met at fair"}]},
//!   "containers": [{"id": "c1", "name": "Internal", "grants": {"u1": ["read"]}}]
//! }
//! ```

use crate::adapters::traits::{ContainerGrants, NotesStore, PageRequest, RecordSource, UserDirectory};
use crate::domain::context::ResultExt;
use crate::domain::{
    Account, ContainerRef, FieldValue, ModelName, ModelSchema, Note, Record, RecordBatch,
    RecordFilter, Result, SortSpec, TabulaError, UserRef,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawDataset {
    model: ModelName,
    fields: Vec<String>,
    #[serde(default)]
    datetime_fields: Vec<String>,
    #[serde(default)]
    records: Vec<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    users: Vec<UserRef>,
    #[serde(default)]
    notes: HashMap<String, Vec<Note>>,
    #[serde(default)]
    containers: Vec<RawContainer>,
}

#[derive(Debug, Deserialize)]
struct RawContainer {
    id: String,
    name: String,
    #[serde(default)]
    grants: HashMap<String, Vec<String>>,
}

/// In-memory dataset loaded from JSON
#[derive(Debug)]
pub struct JsonDataset {
    schema: ModelSchema,
    records: Vec<Record>,
    users: HashMap<String, UserRef>,
    notes: HashMap<String, Vec<Note>>,
    containers: HashMap<String, RawContainer>,
}

impl JsonDataset {
    /// Reads a dataset file
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading dataset {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("dataset {}", path.display()))
    }

    /// Parses a dataset document
    ///
    /// # Errors
    ///
    /// Returns [`TabulaError::Serialization`] for malformed JSON and
    /// [`TabulaError::Source`] for records without an `id`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawDataset = serde_json::from_str(json)?;
        let datetime_fields: HashSet<&str> = raw.datetime_fields.iter().map(String::as_str).collect();

        let records = raw
            .records
            .into_iter()
            .enumerate()
            .map(|(index, fields)| {
                let id = match fields.get("id") {
                    Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
                    Some(serde_json::Value::Number(n)) => n.to_string(),
                    _ => {
                        return Err(TabulaError::Source(format!(
                            "Record #{index} has no id"
                        )))
                    }
                };
                let mut record = Record::new(id);
                for (name, value) in fields {
                    let is_datetime = datetime_fields.contains(name.as_str());
                    record.set(name, FieldValue::from_json(value, is_datetime));
                }
                Ok(record)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            schema: ModelSchema::new(raw.model, raw.fields),
            records,
            users: raw.users.into_iter().map(|u| (u.id.clone(), u)).collect(),
            notes: raw.notes,
            containers: raw.containers.into_iter().map(|c| (c.id.clone(), c)).collect(),
        })
    }

    /// Model of the dataset
    pub fn model(&self) -> &ModelName {
        &self.schema.model
    }

    fn check_model(&self, model: &ModelName) -> Result<()> {
        if *model == self.schema.model {
            Ok(())
        } else {
            Err(TabulaError::Source(format!(
                "Dataset holds {} records, not {model}",
                self.schema.model
            )))
        }
    }

    fn matching<'a>(&'a self, filter: &'a RecordFilter) -> impl Iterator<Item = &'a Record> + 'a {
        self.records.iter().filter(move |r| filter.matches(r))
    }
}

#[async_trait]
impl RecordSource for JsonDataset {
    async fn schema(&self, model: &ModelName) -> Result<ModelSchema> {
        self.check_model(model)?;
        Ok(self.schema.clone())
    }

    async fn count(&self, filter: &RecordFilter) -> Result<usize> {
        self.check_model(&filter.model)?;
        Ok(self.matching(filter).count())
    }

    async fn fetch_page(
        &self,
        filter: &RecordFilter,
        sort: Option<&SortSpec>,
        page: PageRequest,
    ) -> Result<RecordBatch> {
        self.check_model(&filter.model)?;

        let mut matching: Vec<&Record> = self.matching(filter).collect();
        if let Some(sort) = sort {
            matching.sort_by(|a, b| sort.compare(a, b));
        }

        Ok(RecordBatch::new(
            matching
                .into_iter()
                .skip(page.start)
                .take(page.limit)
                .cloned()
                .collect(),
        ))
    }
}

#[async_trait]
impl UserDirectory for JsonDataset {
    async fn resolve_users(&self, batch: &mut RecordBatch, field: &str) -> Result<()> {
        for record in batch.iter_mut() {
            let Some(id) = record.get(field).reference_id() else {
                continue;
            };
            match self.users.get(&id) {
                Some(user) => record.set(field, FieldValue::User(user.clone())),
                None => tracing::debug!(record_id = record.id(), user_id = %id, "Unknown user"),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl NotesStore for JsonDataset {
    async fn attach_notes(&self, batch: &mut RecordBatch, field: &str) -> Result<()> {
        for record in batch.iter_mut() {
            let notes = self.notes.get(record.id()).cloned().unwrap_or_default();
            record.set(field, FieldValue::Notes(notes));
        }
        Ok(())
    }
}

#[async_trait]
impl ContainerGrants for JsonDataset {
    async fn resolve_grants(
        &self,
        batch: &mut RecordBatch,
        field: &str,
        account: &Account,
    ) -> Result<()> {
        for record in batch.iter_mut() {
            let Some(id) = record.get(field).reference_id() else {
                continue;
            };
            if let Some(container) = self.containers.get(&id) {
                record.set(
                    field,
                    FieldValue::Container(ContainerRef {
                        id: container.id.clone(),
                        name: container.name.clone(),
                        account_grants: container.grants.get(&account.id).cloned().unwrap_or_default(),
                    }),
                );
            }
        }
        Ok(())
    }
}
