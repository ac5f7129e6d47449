use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::record::{ContentKind, FormatRow, NewRecord, RecordRow, SubField, SummaryRow};
use crate::models::user::UserAccess;
use crate::store::{ContentStore, FormatUpsert, StoreError, SummaryUpsert};

const RECORD_COLUMNS: &str = "id, user_id, parent_id, inputs, output, is_public, created_at";

/// sqlx-backed store. Table names come from `ContentKind::table`, never from input.
#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens the connection pool. Fails at startup rather than on first request.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!("PostgreSQL pool ready ({max_connections} connections)");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn create_record(&self, record: NewRecord) -> Result<RecordRow, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO {} (id, user_id, parent_id, inputs, output, is_public)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {RECORD_COLUMNS}
            "#,
            record.kind.table()
        );
        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(record.user_id)
            .bind(record.parent_id)
            .bind(&record.inputs)
            .bind(&record.output)
            .bind(record.is_public)
            .fetch_one(&self.pool)
            .await?;
        debug!("Inserted {} {}", record.kind, row.id);
        Ok(row)
    }

    async fn update_output(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        id: Uuid,
        output: &str,
    ) -> Result<RecordRow, StoreError> {
        let sql = format!(
            "UPDATE {} SET output = $1 WHERE id = $2 AND user_id = $3 RETURNING {RECORD_COLUMNS}",
            kind.table()
        );
        sqlx::query_as::<_, RecordRow>(&sql)
            .bind(output)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound { kind, id })
    }

    async fn get_record(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<RecordRow>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM {} WHERE id = $1 AND user_id = $2",
            kind.table()
        );
        Ok(sqlx::query_as::<_, RecordRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_visible_record(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<RecordRow>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM {} WHERE id = $1 AND (user_id = $2 OR is_public)",
            kind.table()
        );
        Ok(sqlx::query_as::<_, RecordRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_records(
        &self,
        kind: ContentKind,
        user_id: Uuid,
    ) -> Result<Vec<RecordRow>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM {} WHERE user_id = $1 ORDER BY created_at DESC",
            kind.table()
        );
        Ok(sqlx::query_as::<_, RecordRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_children(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        parent_id: Uuid,
    ) -> Result<Vec<RecordRow>, StoreError> {
        let sql = format!(
            r#"
            SELECT {RECORD_COLUMNS} FROM {}
            WHERE user_id = $1 AND parent_id = $2
            ORDER BY created_at DESC
            "#,
            kind.table()
        );
        Ok(sqlx::query_as::<_, RecordRow>(&sql)
            .bind(user_id)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_public_record(
        &self,
        kind: ContentKind,
        id: Uuid,
    ) -> Result<Option<RecordRow>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM {} WHERE id = $1 AND is_public",
            kind.table()
        );
        Ok(sqlx::query_as::<_, RecordRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_public(&self, kind: ContentKind) -> Result<Vec<RecordRow>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM {} WHERE is_public ORDER BY created_at DESC",
            kind.table()
        );
        Ok(sqlx::query_as::<_, RecordRow>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn upsert_summary(&self, summary: SummaryUpsert) -> Result<SummaryRow, StoreError> {
        Ok(sqlx::query_as::<_, SummaryRow>(
            r#"
            INSERT INTO summaries (id, user_id, content_type, instance_id, summary)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (content_type, instance_id)
            DO UPDATE SET summary = EXCLUDED.summary, updated_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(summary.user_id)
        .bind(summary.kind.tag())
        .bind(summary.instance_id)
        .bind(&summary.summary)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get_summary(
        &self,
        kind: ContentKind,
        instance_id: Uuid,
    ) -> Result<Option<SummaryRow>, StoreError> {
        Ok(sqlx::query_as::<_, SummaryRow>(
            "SELECT * FROM summaries WHERE content_type = $1 AND instance_id = $2",
        )
        .bind(kind.tag())
        .bind(instance_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_summaries(
        &self,
        kind: ContentKind,
        user_id: Uuid,
    ) -> Result<Vec<SummaryRow>, StoreError> {
        Ok(sqlx::query_as::<_, SummaryRow>(
            "SELECT * FROM summaries WHERE content_type = $1 AND user_id = $2",
        )
        .bind(kind.tag())
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn upsert_format(&self, format: FormatUpsert) -> Result<FormatRow, StoreError> {
        Ok(sqlx::query_as::<_, FormatRow>(
            r#"
            INSERT INTO formats (id, user_id, content_type, sub_field, instance_id, input_hash, output)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (content_type, sub_field, instance_id)
            DO UPDATE SET input_hash = EXCLUDED.input_hash,
                          output = EXCLUDED.output,
                          updated_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(format.user_id)
        .bind(format.kind.tag())
        .bind(format.sub_field.tag())
        .bind(format.instance_id)
        .bind(&format.input_hash)
        .bind(&format.output)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get_formats(
        &self,
        kind: ContentKind,
        instance_id: Uuid,
    ) -> Result<Vec<FormatRow>, StoreError> {
        Ok(sqlx::query_as::<_, FormatRow>(
            "SELECT * FROM formats WHERE content_type = $1 AND instance_id = $2 ORDER BY sub_field",
        )
        .bind(kind.tag())
        .bind(instance_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_format_by_hash(
        &self,
        user_id: Uuid,
        kind: ContentKind,
        sub_field: SubField,
        input_hash: &str,
    ) -> Result<Option<FormatRow>, StoreError> {
        Ok(sqlx::query_as::<_, FormatRow>(
            r#"
            SELECT * FROM formats
            WHERE user_id = $1 AND content_type = $2 AND sub_field = $3 AND input_hash = $4
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(kind.tag())
        .bind(sub_field.tag())
        .bind(input_hash)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn user_access(&self, user_id: Uuid) -> Result<Option<UserAccess>, StoreError> {
        Ok(sqlx::query_as::<_, UserAccess>(
            r#"
            SELECT id, permissions, subscription_status, subscription_period_end
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }
}
