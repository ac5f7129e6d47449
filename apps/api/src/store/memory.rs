//! In-memory `ContentStore` for workflow and router tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::record::{ContentKind, FormatRow, NewRecord, RecordRow, SubField, SummaryRow};
use crate::models::user::UserAccess;
use crate::store::{ContentStore, FormatUpsert, StoreError, SummaryUpsert};

#[derive(Default)]
struct Tables {
    records: Vec<(ContentKind, RecordRow)>,
    summaries: Vec<SummaryRow>,
    formats: Vec<FormatRow>,
    users: Vec<UserAccess>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn with_user(user: UserAccess) -> Self {
        let store = Self::default();
        store.add_user(user);
        store
    }

    pub fn add_user(&self, user: UserAccess) {
        self.tables.lock().unwrap().users.push(user);
    }

    pub fn records_of(&self, kind: ContentKind) -> Vec<RecordRow> {
        let tables = self.tables.lock().unwrap();
        tables
            .records
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub fn summary_count(&self) -> usize {
        self.tables.lock().unwrap().summaries.len()
    }

    pub fn format_count(&self) -> usize {
        self.tables.lock().unwrap().formats.len()
    }
}

fn newest_first(mut rows: Vec<RecordRow>) -> Vec<RecordRow> {
    rows.reverse();
    rows
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn create_record(&self, record: NewRecord) -> Result<RecordRow, StoreError> {
        let row = RecordRow {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            parent_id: record.parent_id,
            inputs: record.inputs,
            output: record.output,
            is_public: record.is_public,
            created_at: Utc::now(),
        };
        self.tables
            .lock()
            .unwrap()
            .records
            .push((record.kind, row.clone()));
        Ok(row)
    }

    async fn update_output(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        id: Uuid,
        output: &str,
    ) -> Result<RecordRow, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let (_, row) = tables
            .records
            .iter_mut()
            .find(|(k, r)| *k == kind && r.id == id && r.user_id == user_id)
            .ok_or(StoreError::NotFound { kind, id })?;
        row.output = output.to_string();
        Ok(row.clone())
    }

    async fn get_record(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<RecordRow>, StoreError> {
        Ok(self
            .records_of(kind)
            .into_iter()
            .find(|r| r.id == id && r.user_id == user_id))
    }

    async fn get_visible_record(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<RecordRow>, StoreError> {
        Ok(self
            .records_of(kind)
            .into_iter()
            .find(|r| r.id == id && (r.user_id == user_id || r.is_public)))
    }

    async fn list_records(
        &self,
        kind: ContentKind,
        user_id: Uuid,
    ) -> Result<Vec<RecordRow>, StoreError> {
        Ok(newest_first(
            self.records_of(kind)
                .into_iter()
                .filter(|r| r.user_id == user_id)
                .collect(),
        ))
    }

    async fn list_children(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        parent_id: Uuid,
    ) -> Result<Vec<RecordRow>, StoreError> {
        Ok(newest_first(
            self.records_of(kind)
                .into_iter()
                .filter(|r| r.user_id == user_id && r.parent_id == Some(parent_id))
                .collect(),
        ))
    }

    async fn get_public_record(
        &self,
        kind: ContentKind,
        id: Uuid,
    ) -> Result<Option<RecordRow>, StoreError> {
        Ok(self
            .records_of(kind)
            .into_iter()
            .find(|r| r.id == id && r.is_public))
    }

    async fn list_public(&self, kind: ContentKind) -> Result<Vec<RecordRow>, StoreError> {
        Ok(newest_first(
            self.records_of(kind)
                .into_iter()
                .filter(|r| r.is_public)
                .collect(),
        ))
    }

    async fn upsert_summary(&self, summary: SummaryUpsert) -> Result<SummaryRow, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        if let Some(existing) = tables
            .summaries
            .iter_mut()
            .find(|s| s.content_type == summary.kind.tag() && s.instance_id == summary.instance_id)
        {
            existing.summary = summary.summary;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let row = SummaryRow {
            id: Uuid::new_v4(),
            user_id: summary.user_id,
            content_type: summary.kind.tag().to_string(),
            instance_id: summary.instance_id,
            summary: summary.summary,
            created_at: now,
            updated_at: now,
        };
        tables.summaries.push(row.clone());
        Ok(row)
    }

    async fn get_summary(
        &self,
        kind: ContentKind,
        instance_id: Uuid,
    ) -> Result<Option<SummaryRow>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .summaries
            .iter()
            .find(|s| s.content_type == kind.tag() && s.instance_id == instance_id)
            .cloned())
    }

    async fn list_summaries(
        &self,
        kind: ContentKind,
        user_id: Uuid,
    ) -> Result<Vec<SummaryRow>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .summaries
            .iter()
            .filter(|s| s.content_type == kind.tag() && s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn upsert_format(&self, format: FormatUpsert) -> Result<FormatRow, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        if let Some(existing) = tables.formats.iter_mut().find(|f| {
            f.content_type == format.kind.tag()
                && f.sub_field == format.sub_field.tag()
                && f.instance_id == format.instance_id
        }) {
            existing.input_hash = format.input_hash;
            existing.output = format.output;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let row = FormatRow {
            id: Uuid::new_v4(),
            user_id: format.user_id,
            content_type: format.kind.tag().to_string(),
            sub_field: format.sub_field.tag().to_string(),
            instance_id: format.instance_id,
            input_hash: format.input_hash,
            output: format.output,
            created_at: now,
            updated_at: now,
        };
        tables.formats.push(row.clone());
        Ok(row)
    }

    async fn get_formats(
        &self,
        kind: ContentKind,
        instance_id: Uuid,
    ) -> Result<Vec<FormatRow>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .formats
            .iter()
            .filter(|f| f.content_type == kind.tag() && f.instance_id == instance_id)
            .cloned()
            .collect())
    }

    async fn find_format_by_hash(
        &self,
        user_id: Uuid,
        kind: ContentKind,
        sub_field: SubField,
        input_hash: &str,
    ) -> Result<Option<FormatRow>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .formats
            .iter()
            .rev()
            .find(|f| {
                f.user_id == user_id
                    && f.content_type == kind.tag()
                    && f.sub_field == sub_field.tag()
                    && f.input_hash == input_hash
            })
            .cloned())
    }

    async fn user_access(&self, user_id: Uuid) -> Result<Option<UserAccess>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.id == user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_record(kind: ContentKind, user_id: Uuid, is_public: bool) -> NewRecord {
        NewRecord {
            kind,
            user_id,
            parent_id: None,
            inputs: json!({}),
            output: String::new(),
            is_public,
        }
    }

    #[tokio::test]
    async fn test_update_output_keeps_only_latest_value() {
        let store = MemoryStore::default();
        let user_id = Uuid::new_v4();
        let record = store
            .create_record(new_record(ContentKind::UnitPlan, user_id, false))
            .await
            .unwrap();

        store
            .update_output(ContentKind::UnitPlan, user_id, record.id, "first draft")
            .await
            .unwrap();
        let updated = store
            .update_output(ContentKind::UnitPlan, user_id, record.id, "second draft")
            .await
            .unwrap();

        assert_eq!(updated.output, "second draft");
        let rows = store.records_of(ContentKind::UnitPlan);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].output, "second draft");
    }

    #[tokio::test]
    async fn test_update_output_under_another_user_is_not_found() {
        let store = MemoryStore::default();
        let owner = Uuid::new_v4();
        let record = store
            .create_record(new_record(ContentKind::Dok, owner, false))
            .await
            .unwrap();

        let err = store
            .update_output(ContentKind::Dok, Uuid::new_v4(), record.id, "hijacked")
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound { id, .. } if id == record.id));
        assert_eq!(store.records_of(ContentKind::Dok)[0].output, "");
    }

    #[tokio::test]
    async fn test_update_output_checks_kind() {
        let store = MemoryStore::default();
        let user_id = Uuid::new_v4();
        let record = store
            .create_record(new_record(ContentKind::Dok, user_id, false))
            .await
            .unwrap();

        let err = store
            .update_output(ContentKind::Newsletter, user_id, record.id, "wrong table")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_public_record_ignores_private_rows() {
        let store = MemoryStore::default();
        let owner = Uuid::new_v4();
        let shared = store
            .create_record(new_record(ContentKind::Rubric, owner, true))
            .await
            .unwrap();
        let private = store
            .create_record(new_record(ContentKind::Rubric, owner, false))
            .await
            .unwrap();

        assert!(store
            .get_public_record(ContentKind::Rubric, shared.id)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .get_public_record(ContentKind::Rubric, private.id)
            .await
            .unwrap()
            .is_none());
    }
}
