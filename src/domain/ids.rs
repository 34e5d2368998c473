//! Domain identifier types with validation
//!
//! Newtype wrappers for the names and ids the export pipeline passes around,
//! so a model name can never be handed where a definition id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Record model name, e.g. `Addressbook_Model_Contact`
///
/// The application a model belongs to is the segment before the first `_`.
///
/// # Examples
///
/// ```
/// use tabula::domain::ids::ModelName;
/// use std::str::FromStr;
///
/// let model = ModelName::from_str("Addressbook_Model_Contact").unwrap();
/// assert_eq!(model.application(), "Addressbook");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelName(String);

impl ModelName {
    /// Creates a new ModelName, rejecting blank names and whitespace
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if name.chars().any(char::is_whitespace) {
            return Err(format!("Model name cannot contain whitespace: '{name}'"));
        }
        Ok(Self(name))
    }

    /// Returns the model name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the application owning this model
    pub fn application(&self) -> &str {
        self.0.split('_').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ModelName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ModelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a stored export definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DefinitionId(String);

impl DefinitionId {
    /// Creates a new DefinitionId
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Definition ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the definition ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DefinitionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
