//! Batch field resolver
//!
//! The columns of an export decide which references get resolved: a user
//! field is resolved when its name appears as a column type or identifier,
//! notes and containers when they appear as a column type. Without columns a
//! fallback set of types is used instead.
//!
//! Every collaborator is called at most once per page, never per record.

use crate::adapters::traits::{ContainerGrants, NotesStore, UserDirectory};
use crate::definition::ExportConfig;
use crate::domain::context::ResultExt;
use crate::domain::{Account, RecordBatch, Result};
use std::collections::BTreeSet;
use std::sync::Arc;

/// User reference fields resolved through the user directory
pub const USER_FIELDS: [&str; 3] = ["created_by", "last_modified_by", "account_id"];

/// Field type requesting notes
pub const NOTES_FIELD: &str = "notes";

/// Field type requesting container grants
pub const CONTAINER_FIELD: &str = "container_id";

/// Field types and identifiers requested by a config
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestedFields {
    /// Semantic field types
    pub types: BTreeSet<String>,
    /// Column identifiers
    pub identifiers: BTreeSet<String>,
}

impl RequestedFields {
    fn wants_user_field(&self, field: &str) -> bool {
        self.types.contains(field) || self.identifiers.contains(field)
    }

    fn wants_type(&self, field_type: &str) -> bool {
        self.types.contains(field_type)
    }
}

/// Resolves references of a page in place
pub struct FieldResolver {
    users: Arc<dyn UserDirectory>,
    notes: Arc<dyn NotesStore>,
    containers: Arc<dyn ContainerGrants>,
    fallback_types: BTreeSet<String>,
}

impl FieldResolver {
    /// Creates a resolver over the three collaborators
    pub fn new(
        users: Arc<dyn UserDirectory>,
        notes: Arc<dyn NotesStore>,
        containers: Arc<dyn ContainerGrants>,
    ) -> Self {
        Self {
            users,
            notes,
            containers,
            fallback_types: BTreeSet::new(),
        }
    }

    /// Types resolved when the config has no columns
    pub fn with_fallback_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallback_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Field types and identifiers `config` asks for
    pub fn requested(&self, config: &ExportConfig) -> RequestedFields {
        if !config.has_columns() {
            return RequestedFields {
                types: self.fallback_types.clone(),
                identifiers: BTreeSet::new(),
            };
        }

        RequestedFields {
            types: config
                .columns
                .iter()
                .filter_map(|c| c.field_type.clone())
                .collect(),
            identifiers: config.columns.iter().map(|c| c.identifier.clone()).collect(),
        }
    }

    /// Resolves `batch` for `config`, then moves all date-times into the
    /// account timezone
    ///
    /// Resolving an already resolved batch leaves its values unchanged.
    ///
    /// # Errors
    ///
    /// Propagates collaborator failures as they are structural.
    pub async fn resolve(
        &self,
        batch: &mut RecordBatch,
        config: &ExportConfig,
        account: &Account,
    ) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let requested = self.requested(config);

        for field in USER_FIELDS {
            if requested.wants_user_field(field) {
                tracing::debug!(field, records = batch.len(), "Resolving users");
                self.users
                    .resolve_users(batch, field)
                    .await
                    .with_context(|| format!("resolving users of '{field}'"))?;
            }
        }

        if requested.wants_type(NOTES_FIELD) {
            tracing::debug!(records = batch.len(), "Attaching notes");
            self.notes
                .attach_notes(batch, NOTES_FIELD)
                .await
                .context("attaching notes")?;
        }

        if requested.wants_type(CONTAINER_FIELD) {
            tracing::debug!(records = batch.len(), account = %account.id, "Resolving container grants");
            self.containers
                .resolve_grants(batch, CONTAINER_FIELD, account)
                .await
                .context("resolving container grants")?;
        }

        batch.set_timezone(&account.timezone);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ColumnSpec;
    use crate::domain::{FieldValue, Record, TabulaError, UserRef};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Calls {
        users: AtomicUsize,
        notes: AtomicUsize,
        containers: AtomicUsize,
    }

    #[async_trait]
    impl UserDirectory for Calls {
        async fn resolve_users(&self, batch: &mut RecordBatch, field: &str) -> Result<()> {
            self.users.fetch_add(1, Ordering::SeqCst);
            for record in batch.iter_mut() {
                if let Some(id) = record.get(field).reference_id() {
                    record.set(
                        field,
                        FieldValue::User(UserRef {
                            display_name: format!("User {id}"),
                            id,
                            email: None,
                        }),
                    );
                }
            }
            Ok(())
        }
    }

    #[async_trait]
    impl NotesStore for Calls {
        async fn attach_notes(&self, _batch: &mut RecordBatch, _field: &str) -> Result<()> {
            self.notes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl ContainerGrants for Calls {
        async fn resolve_grants(
            &self,
            _batch: &mut RecordBatch,
            _field: &str,
            _account: &Account,
        ) -> Result<()> {
            self.containers.fetch_add(1, Ordering::SeqCst);
            Err(TabulaError::Resolution("grants service down".to_string()))
        }
    }

    fn resolver(calls: &Arc<Calls>) -> FieldResolver {
        FieldResolver::new(calls.clone(), calls.clone(), calls.clone())
    }

    fn batch() -> RecordBatch {
        RecordBatch::new(vec![
            Record::new("1").with("created_by", "u1"),
            Record::new("2").with("created_by", "u2"),
        ])
    }

    #[tokio::test]
    async fn test_user_fields_by_identifier_or_type() {
        let calls = Arc::new(Calls::default());
        let config = ExportConfig::new("x").with_columns(vec![
            ColumnSpec::new("created_by"),
            ColumnSpec::new("editor").with_type("last_modified_by"),
        ]);

        let mut b = batch();
        resolver(&calls)
            .resolve(&mut b, &config, &Account::new("acc", "Exporter"))
            .await
            .unwrap();

        assert_eq!(calls.users.load(Ordering::SeqCst), 2);
        assert_eq!(calls.notes.load(Ordering::SeqCst), 0);
        match b.iter().next().unwrap().get("created_by") {
            FieldValue::User(user) => assert_eq!(user.display_name, "User u1"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let calls = Arc::new(Calls::default());
        let config = ExportConfig::new("x").with_columns(vec![ColumnSpec::new("created_by")]);
        let account = Account::new("acc", "Exporter");
        let resolver = resolver(&calls);

        let mut once = batch();
        resolver.resolve(&mut once, &config, &account).await.unwrap();
        let mut twice = once.clone();
        resolver.resolve(&mut twice, &config, &account).await.unwrap();

        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_fallback_types_without_columns() {
        let calls = Arc::new(Calls::default());
        let resolver = resolver(&calls).with_fallback_types(["notes"]);

        let mut b = batch();
        resolver
            .resolve(&mut b, &ExportConfig::default(), &Account::new("acc", "Exporter"))
            .await
            .unwrap();

        assert_eq!(calls.users.load(Ordering::SeqCst), 0);
        assert_eq!(calls.notes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_collaborator_failure_propagates() {
        let calls = Arc::new(Calls::default());
        let config = ExportConfig::new("x")
            .with_columns(vec![ColumnSpec::new("container").with_type("container_id")]);

        let err = resolver(&calls)
            .resolve(&mut batch(), &config, &Account::new("acc", "Exporter"))
            .await
            .unwrap_err();
        assert!(matches!(err, TabulaError::Resolution(_)));
        assert_eq!(calls.containers.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_calls() {
        let calls = Arc::new(Calls::default());
        let config = ExportConfig::new("x").with_columns(vec![ColumnSpec::new("created_by")]);
        resolver(&calls)
            .resolve(
                &mut RecordBatch::default(),
                &config,
                &Account::new("acc", "Exporter"),
            )
            .await
            .unwrap();
        assert_eq!(calls.users.load(Ordering::SeqCst), 0);
    }
}
