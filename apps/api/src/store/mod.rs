//! Persistence adapter: every read and write of generated content goes
//! through `ContentStore`, scoped by the owning user's id.
//!
//! `AppState` carries an `Arc<dyn ContentStore>`; production uses
//! `PgContentStore`, tests use the in-memory store.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::record::{ContentKind, FormatRow, NewRecord, RecordRow, SubField, SummaryRow};
use crate::models::user::UserAccess;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgContentStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: ContentKind, id: Uuid },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Summary upsert payload, keyed by (kind, instance id).
#[derive(Debug, Clone)]
pub struct SummaryUpsert {
    pub user_id: Uuid,
    pub kind: ContentKind,
    pub instance_id: Uuid,
    pub summary: String,
}

/// Format upsert payload, keyed by (kind, sub-field, instance id).
#[derive(Debug, Clone)]
pub struct FormatUpsert {
    pub user_id: Uuid,
    pub kind: ContentKind,
    pub sub_field: SubField,
    pub instance_id: Uuid,
    pub input_hash: String,
    pub output: String,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Inserts a record and returns it as stored.
    async fn create_record(&self, record: NewRecord) -> Result<RecordRow, StoreError>;

    /// Overwrites the output of a record owned by `user_id`.
    /// Fails with `NotFound` when the id does not exist or is owned by someone else.
    async fn update_output(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        id: Uuid,
        output: &str,
    ) -> Result<RecordRow, StoreError>;

    async fn get_record(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<RecordRow>, StoreError>;

    /// A record the user owns, or any public one.
    async fn get_visible_record(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<RecordRow>, StoreError>;

    /// The user's records, newest first.
    async fn list_records(
        &self,
        kind: ContentKind,
        user_id: Uuid,
    ) -> Result<Vec<RecordRow>, StoreError>;

    /// The user's records that reference `parent_id`, newest first.
    async fn list_children(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        parent_id: Uuid,
    ) -> Result<Vec<RecordRow>, StoreError>;

    /// A public record of any owner.
    async fn get_public_record(
        &self,
        kind: ContentKind,
        id: Uuid,
    ) -> Result<Option<RecordRow>, StoreError>;

    /// Public records of any owner, newest first.
    async fn list_public(&self, kind: ContentKind) -> Result<Vec<RecordRow>, StoreError>;

    async fn upsert_summary(&self, summary: SummaryUpsert) -> Result<SummaryRow, StoreError>;

    async fn get_summary(
        &self,
        kind: ContentKind,
        instance_id: Uuid,
    ) -> Result<Option<SummaryRow>, StoreError>;

    async fn list_summaries(
        &self,
        kind: ContentKind,
        user_id: Uuid,
    ) -> Result<Vec<SummaryRow>, StoreError>;

    async fn upsert_format(&self, format: FormatUpsert) -> Result<FormatRow, StoreError>;

    async fn get_formats(
        &self,
        kind: ContentKind,
        instance_id: Uuid,
    ) -> Result<Vec<FormatRow>, StoreError>;

    /// Most recent format of the user for the same kind and sub-field whose
    /// raw text hashed to `input_hash`.
    async fn find_format_by_hash(
        &self,
        user_id: Uuid,
        kind: ContentKind,
        sub_field: SubField,
        input_hash: &str,
    ) -> Result<Option<FormatRow>, StoreError>;

    async fn user_access(&self, user_id: Uuid) -> Result<Option<UserAccess>, StoreError>;
}
