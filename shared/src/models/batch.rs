//! Harvest batch models

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a stored batch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BatchStatus {
    #[default]
    Active,
    Processing,
    Completed,
}

impl BatchStatus {
    /// Whether a batch may move from `self` to `next`.
    /// `Completed` is terminal.
    pub fn can_transition_to(&self, next: BatchStatus) -> bool {
        matches!(
            (self, next),
            (BatchStatus::Active, BatchStatus::Processing)
                | (BatchStatus::Active, BatchStatus::Completed)
                | (BatchStatus::Processing, BatchStatus::Completed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Active => "Active",
            BatchStatus::Processing => "Processing",
            BatchStatus::Completed => "Completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Active" => Some(BatchStatus::Active),
            "Processing" => Some(BatchStatus::Processing),
            "Completed" => Some(BatchStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Batch details entered by the farmer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchDraft {
    pub crop_type: String,
    pub weight_kg: Decimal,
    pub harvest_date: NaiveDate,
    /// District or warehouse name
    pub storage_location: String,
    /// Free-form storage description, e.g. "Silo", "Jute Bags", "Cold Storage"
    pub storage_type: String,
    #[serde(default)]
    pub moisture_content: Option<Decimal>,
}

/// A batch as written to the remote collection, before the store assigns an id.
/// The offline queue stores this shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewBatch {
    pub crop_type: String,
    pub weight_kg: Decimal,
    pub harvest_date: NaiveDate,
    pub storage_location: String,
    pub storage_type: String,
    #[serde(default)]
    pub moisture_content: Option<Decimal>,
    pub status: BatchStatus,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
}

impl NewBatch {
    /// Stamp a draft with its owner and creation time
    pub fn from_draft(draft: BatchDraft, user_id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            crop_type: draft.crop_type,
            weight_kg: draft.weight_kg,
            harvest_date: draft.harvest_date,
            storage_location: draft.storage_location,
            storage_type: draft.storage_type,
            moisture_content: draft.moisture_content,
            status: BatchStatus::Active,
            created_at,
            user_id,
        }
    }

    /// Materialize the record with a store-assigned id. `local_id` is the
    /// offline queue id the record was created under, if any.
    pub fn into_batch(self, id: Uuid, local_id: Option<Uuid>, synced: bool) -> Batch {
        Batch {
            id,
            local_id,
            crop_type: self.crop_type,
            weight_kg: self.weight_kg,
            harvest_date: self.harvest_date,
            storage_location: self.storage_location,
            storage_type: self.storage_type,
            moisture_content: self.moisture_content,
            status: self.status,
            created_at: self.created_at,
            completed_at: None,
            synced,
            user_id: self.user_id,
        }
    }
}

/// A harvest batch in the authoritative collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: Uuid,
    /// Offline queue id, kept after sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_id: Option<Uuid>,
    pub crop_type: String,
    pub weight_kg: Decimal,
    pub harvest_date: NaiveDate,
    pub storage_location: String,
    pub storage_type: String,
    #[serde(default)]
    pub moisture_content: Option<Decimal>,
    pub status: BatchStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// False while the record only exists in the offline queue
    pub synced: bool,
    pub user_id: Uuid,
}

impl Batch {
    /// Risk is tracked until the batch is completed
    pub fn is_monitored(&self) -> bool {
        self.status != BatchStatus::Completed
    }

    /// Identity that survives sync: the offline queue id for batches created
    /// offline, the store id otherwise
    pub fn stable_id(&self) -> Uuid {
        self.local_id.unwrap_or(self.id)
    }
}
