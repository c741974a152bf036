//! PostgreSQL remote batch collection

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{Batch, BatchStatus, NewBatch};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::batch_store::RemoteBatchStore;

#[derive(Clone)]
pub struct PgBatchStore {
    db: PgPool,
}

/// Row shape of the `batches` table
#[derive(Debug, FromRow)]
struct BatchRow {
    id: Uuid,
    local_id: Option<Uuid>,
    user_id: Uuid,
    crop_type: String,
    weight_kg: Decimal,
    harvest_date: NaiveDate,
    storage_location: String,
    storage_type: String,
    moisture_content: Option<Decimal>,
    status: String,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<BatchRow> for Batch {
    type Error = AppError;

    fn try_from(row: BatchRow) -> Result<Self, Self::Error> {
        let status = BatchStatus::parse(&row.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown batch status: {}", row.status)))?;
        Ok(Batch {
            id: row.id,
            local_id: row.local_id,
            crop_type: row.crop_type,
            weight_kg: row.weight_kg,
            harvest_date: row.harvest_date,
            storage_location: row.storage_location,
            storage_type: row.storage_type,
            moisture_content: row.moisture_content,
            status,
            created_at: row.created_at,
            completed_at: row.completed_at,
            synced: true,
            user_id: row.user_id,
        })
    }
}

const BATCH_COLUMNS: &str = "id, local_id, user_id, crop_type, weight_kg, harvest_date, storage_location, \
     storage_type, moisture_content, status, created_at, completed_at";

impl PgBatchStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RemoteBatchStore for PgBatchStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn insert(&self, batch: NewBatch, local_id: Option<Uuid>) -> AppResult<Batch> {
        let row = sqlx::query_as::<_, BatchRow>(&format!(
            r#"
            INSERT INTO batches (
                id, local_id, user_id, crop_type, weight_kg, harvest_date,
                storage_location, storage_type, moisture_content, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            BATCH_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(local_id)
        .bind(batch.user_id)
        .bind(&batch.crop_type)
        .bind(batch.weight_kg)
        .bind(batch.harvest_date)
        .bind(&batch.storage_location)
        .bind(&batch.storage_type)
        .bind(batch.moisture_content)
        .bind(batch.status.as_str())
        .bind(batch.created_at)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Batch>> {
        let row = sqlx::query_as::<_, BatchRow>(&format!(
            "SELECT {} FROM batches WHERE id = $1",
            BATCH_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(Batch::try_from).transpose()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: BatchStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> AppResult<Batch> {
        let row = sqlx::query_as::<_, BatchRow>(&format!(
            "UPDATE batches SET status = $2, completed_at = $3 WHERE id = $1 RETURNING {}",
            BATCH_COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(completed_at)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;

        row.try_into()
    }

    async fn list_by_owner(&self, user_id: Uuid) -> AppResult<Vec<Batch>> {
        let rows = sqlx::query_as::<_, BatchRow>(&format!(
            "SELECT {} FROM batches WHERE user_id = $1 ORDER BY created_at DESC",
            BATCH_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Batch::try_from).collect()
    }
}
