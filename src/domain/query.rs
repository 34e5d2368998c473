//! Record filters and sort specifications
//!
//! These are handed unchanged to the record source; the in-memory dataset
//! adapter evaluates them with [`RecordFilter::matches`] and
//! [`SortSpec::compare`].

use crate::domain::ids::ModelName;
use crate::domain::record::{FieldValue, Record};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a filter condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Field equals the value
    Equals,
    /// Field does not equal the value
    Not,
    /// Field text contains the value (case-insensitive)
    Contains,
    /// Field text starts with the value
    StartsWith,
    /// Field equals any of the comma-separated values
    In,
}

impl FromStr for FilterOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "equals" | "=" => Ok(FilterOperator::Equals),
            "not" | "!=" => Ok(FilterOperator::Not),
            "contains" => Ok(FilterOperator::Contains),
            "startswith" => Ok(FilterOperator::StartsWith),
            "in" => Ok(FilterOperator::In),
            other => Err(format!(
                "Invalid filter operator '{other}'. Must be one of: equals, not, contains, startswith, in"
            )),
        }
    }
}

/// One `field operator value` condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCondition {
    /// Field name
    pub field: String,
    /// Operator
    pub operator: FilterOperator,
    /// Comparison value
    pub value: String,
}

impl FilterCondition {
    /// Parses `field<op>value` where op is `=`, `!=`, `~` (contains) or `^` (starts with)
    pub fn parse(expr: &str) -> Result<Self, String> {
        let candidates = [
            ("!=", FilterOperator::Not),
            ("=", FilterOperator::Equals),
            ("~", FilterOperator::Contains),
            ("^", FilterOperator::StartsWith),
        ];
        for (token, operator) in candidates {
            if let Some((field, value)) = expr.split_once(token) {
                let field = field.trim();
                if field.is_empty() {
                    return Err(format!("Missing field name in filter '{expr}'"));
                }
                return Ok(Self {
                    field: field.to_string(),
                    operator,
                    value: value.trim().to_string(),
                });
            }
        }
        Err(format!(
            "Invalid filter '{expr}'. Expected field=value, field!=value, field~value or field^value"
        ))
    }

    fn matches(&self, record: &Record) -> bool {
        let actual = comparable(record.get(&self.field));
        match self.operator {
            FilterOperator::Equals => actual == self.value,
            FilterOperator::Not => actual != self.value,
            FilterOperator::Contains => actual
                .to_lowercase()
                .contains(&self.value.to_lowercase()),
            FilterOperator::StartsWith => actual.starts_with(&self.value),
            FilterOperator::In => self.value.split(',').any(|v| v.trim() == actual),
        }
    }
}

/// A conjunction of conditions over one model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Model the filter applies to
    pub model: ModelName,
    /// Conditions, all of which must hold
    #[serde(default)]
    pub conditions: Vec<FilterCondition>,
}

impl RecordFilter {
    /// A filter matching every record of `model`
    pub fn all(model: ModelName) -> Self {
        Self {
            model,
            conditions: Vec::new(),
        }
    }

    /// Adds a condition
    pub fn with_condition(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// True if `record` satisfies every condition
    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    /// Ascending (default)
    #[default]
    Asc,
    /// Descending
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            other => Err(format!("Invalid sort direction '{other}'. Must be ASC or DESC")),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("ASC"),
            SortDirection::Desc => f.write_str("DESC"),
        }
    }
}

/// Field and direction to order records by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Field to sort on
    pub field: String,
    /// Direction
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    /// Sort on `field`, direction defaulting to ascending
    pub fn new(field: impl Into<String>, direction: Option<SortDirection>) -> Self {
        Self {
            field: field.into(),
            direction: direction.unwrap_or_default(),
        }
    }

    /// Orders two records by this spec
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ordering = compare_values(a.get(&self.field), b.get(&self.field));
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Bool(x), FieldValue::Bool(y)) => x.cmp(y),
        (FieldValue::DateTime(x), FieldValue::DateTime(y)) => x.cmp(y),
        (FieldValue::Notes(_) | FieldValue::Structured(_), _)
        | (_, FieldValue::Notes(_) | FieldValue::Structured(_)) => sort_rank(a).cmp(&sort_rank(b)),
        _ => match (numeric_key(a), numeric_key(b)) {
            (Some((x, xi)), Some((y, yi))) => x.total_cmp(&y).then(xi.cmp(&yi)),
            _ => sort_rank(a)
                .cmp(&sort_rank(b))
                .then_with(|| comparable(a).cmp(&comparable(b))),
        },
    }
}

/// Values of different kinds sort by kind: null, flags, numbers, date-times,
/// text and references, then composites
fn sort_rank(value: &FieldValue) -> u8 {
    match value {
        FieldValue::Null => 0,
        FieldValue::Bool(_) => 1,
        FieldValue::Integer(_) | FieldValue::Float(_) => 2,
        FieldValue::DateTime(_) => 3,
        FieldValue::Text(_) | FieldValue::User(_) | FieldValue::Container(_) => 4,
        FieldValue::Notes(_) | FieldValue::Structured(_) => 5,
    }
}

/// Integers and floats on one axis; the integer part breaks ties between
/// large integers that widen to the same float
fn numeric_key(value: &FieldValue) -> Option<(f64, i128)> {
    match value {
        FieldValue::Integer(i) => Some((*i as f64, i128::from(*i))),
        FieldValue::Float(f) => Some((*f, *f as i128)),
        _ => None,
    }
}

/// Plain text used to compare a field value against filter input
fn comparable(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => String::new(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Integer(i) => i.to_string(),
        FieldValue::Float(f) => f.to_string(),
        FieldValue::Text(s) => s.clone(),
        FieldValue::DateTime(dt) => dt.to_rfc3339(),
        FieldValue::User(user) => user.id.clone(),
        FieldValue::Container(container) => container.id.clone(),
        FieldValue::Notes(_) | FieldValue::Structured(_) => String::new(),
    }
}
