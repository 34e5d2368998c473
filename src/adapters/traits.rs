//! Collaborator traits
//!
//! The export pipeline talks to its external collaborators only through
//! these traits: the record source, the definition store and the three
//! batch resolution services. Every resolution call receives a whole page,
//! so an export makes one call per page and concern.

use crate::definition::Definition;
use crate::domain::{
    Account, DefinitionId, ModelName, ModelSchema, RecordBatch, RecordFilter, Result, SortSpec,
};
use async_trait::async_trait;
use std::path::Path;

/// Window of one page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Offset of the first record
    pub start: usize,

    /// Maximum number of records in the page
    pub limit: usize,
}

impl PageRequest {
    /// Page number `index` (zero-based) of `size` records
    pub fn nth(index: usize, size: usize) -> Self {
        Self {
            start: index * size,
            limit: size,
        }
    }
}

/// Source of the records to export
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Declared field set of `model`, in natural order
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::TabulaError::Source`] if the model is unknown.
    async fn schema(&self, model: &ModelName) -> Result<ModelSchema>;

    /// Number of records matching `filter`
    async fn count(&self, filter: &RecordFilter) -> Result<usize>;

    /// One page of records matching `filter`, ordered by `sort`
    ///
    /// A page shorter than `page.limit` is the last one.
    async fn fetch_page(
        &self,
        filter: &RecordFilter,
        sort: Option<&SortSpec>,
        page: PageRequest,
    ) -> Result<RecordBatch>;
}

/// Store of export definitions and user preferences
#[async_trait]
pub trait DefinitionStore: Send + Sync {
    /// Definition by store id
    async fn get(&self, id: &DefinitionId) -> Result<Definition>;

    /// Definition read from a file outside the store
    async fn get_from_file(&self, path: &Path) -> Result<Definition>;

    /// Definitions of `model` named `name`
    ///
    /// An empty result is not an error; callers decide what missing means.
    async fn search(&self, model: &ModelName, name: &str) -> Result<Vec<Definition>>;

    /// Stored preference `key` of `application`, `default` when unset
    async fn get_preference(&self, application: &str, key: &str, default: &str) -> Result<String>;
}

/// Resolves user ids to user references
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Replaces the user ids in `field` of every record with [`crate::domain::UserRef`]s
    async fn resolve_users(&self, batch: &mut RecordBatch, field: &str) -> Result<()>;
}

/// Attaches notes to records
#[async_trait]
pub trait NotesStore: Send + Sync {
    /// Sets `field` of every record to the notes attached to it
    async fn attach_notes(&self, batch: &mut RecordBatch, field: &str) -> Result<()>;
}

/// Resolves containers together with the account's grants on them
#[async_trait]
pub trait ContainerGrants: Send + Sync {
    /// Replaces the container ids in `field` with [`crate::domain::ContainerRef`]s
    /// carrying the grants `account` holds
    async fn resolve_grants(
        &self,
        batch: &mut RecordBatch,
        field: &str,
        account: &Account,
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_nth() {
        assert_eq!(PageRequest::nth(0, 100), PageRequest { start: 0, limit: 100 });
        assert_eq!(PageRequest::nth(3, 25), PageRequest { start: 75, limit: 25 });
    }
}
