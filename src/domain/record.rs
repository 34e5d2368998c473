//! Records, field values and model schemas
//!
//! A [`Record`] is an opaque key-value entity of one model. Its field set is
//! fixed by the model's [`ModelSchema`], which also carries the natural field
//! order used by dump exports and generic headers.

use crate::domain::account::AccountTimezone;
use crate::domain::ids::ModelName;
use chrono::{DateTime, FixedOffset};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

static NULL: FieldValue = FieldValue::Null;

/// A single field value of a record
///
/// Serializes untagged, so templates see plain JSON (`null`, strings,
/// numbers, objects for resolved references).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Absent value
    Null,
    /// Boolean flag
    Bool(bool),
    /// Integer number
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// Text, including raw (unresolved) reference ids
    Text(String),
    /// Point in time with its offset
    DateTime(DateTime<FixedOffset>),
    /// Resolved user reference
    User(UserRef),
    /// Resolved container reference with the exporting account's grants
    Container(ContainerRef),
    /// Notes attached to the record
    Notes(Vec<Note>),
    /// Any other composite value
    Structured(serde_json::Value),
}

impl FieldValue {
    /// True for [`FieldValue::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Raw reference id carried by this value, if it is one
    ///
    /// Already resolved references report their id, which keeps resolution
    /// idempotent.
    pub fn reference_id(&self) -> Option<String> {
        match self {
            FieldValue::Text(id) if !id.is_empty() => Some(id.clone()),
            FieldValue::Integer(id) => Some(id.to_string()),
            FieldValue::User(user) => Some(user.id.clone()),
            FieldValue::Container(container) => Some(container.id.clone()),
            _ => None,
        }
    }

    /// Converts a plain JSON value, parsing RFC 3339 strings when `datetime` is set
    pub fn from_json(value: serde_json::Value, datetime: bool) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => n.as_f64().map_or(FieldValue::Null, FieldValue::Float),
            },
            Value::String(s) if datetime => match DateTime::parse_from_rfc3339(&s) {
                Ok(dt) => FieldValue::DateTime(dt),
                Err(_) => FieldValue::Text(s),
            },
            Value::String(s) => FieldValue::Text(s),
            other => FieldValue::Structured(other),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<DateTime<FixedOffset>> for FieldValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        FieldValue::DateTime(value)
    }
}

/// A user reference resolved by the user directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// Account id
    pub id: String,
    /// Display name
    pub display_name: String,
    /// Primary email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

/// A container reference resolved together with the account's grants on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRef {
    /// Container id
    pub id: String,
    /// Container name
    pub name: String,
    /// Grants the exporting account holds on the container
    #[serde(default)]
    pub account_grants: Vec<String>,
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A note attached to a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Note type (e.g. `note`, `changed`)
    #[serde(default)]
    pub note_type: String,
    /// Note text
    pub note: String,
    /// Author account id
    #[serde(default)]
    pub created_by: Option<String>,
    /// Creation time
    #[serde(default)]
    pub creation_time: Option<DateTime<FixedOffset>>,
}

/// Declared field set of a model, in natural order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSchema {
    /// Model name
    pub model: ModelName,
    /// Field names in the model's natural order
    pub fields: Vec<String>,
}

impl ModelSchema {
    /// Creates a schema from a model and its ordered field names
    pub fn new(model: ModelName, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            model,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// One record of a model
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    id: String,
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates a record whose only field is `id`
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let mut fields = BTreeMap::new();
        fields.insert("id".to_string(), FieldValue::Text(id.clone()));
        Self { id, fields }
    }

    /// Builder-style field setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Record id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Value of `field`, [`FieldValue::Null`] when absent
    pub fn get(&self, field: &str) -> &FieldValue {
        self.fields.get(field).unwrap_or(&NULL)
    }

    /// Overwrites `field`
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Iterates over all present fields
    pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Mutable access to all present field values
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut FieldValue> {
        self.fields.values_mut()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        for (key, value) in &self.fields {
            if key != "id" {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

/// The records of one iteration page
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordBatch {
    records: Vec<Record>,
}

impl RecordBatch {
    /// Wraps records into a batch
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the page holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates the records in page order
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Mutably iterates the records in page order
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Record> {
        self.records.iter_mut()
    }

    /// Moves every date-time value of the batch into `timezone`
    pub fn set_timezone(&mut self, timezone: &AccountTimezone) {
        for record in &mut self.records {
            for value in record.values_mut() {
                match value {
                    FieldValue::DateTime(dt) => *dt = timezone.localize(dt),
                    FieldValue::Notes(notes) => {
                        for note in notes.iter_mut() {
                            if let Some(created) = note.creation_time.as_mut() {
                                *created = timezone.localize(created);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    /// Consumes the batch
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl<'a> IntoIterator for &'a RecordBatch {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
