use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct RecordExportModel {
    pub animation_id: Uuid,
    pub format: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoExportDto {
    pub id: Uuid,
    pub animation_id: Uuid,
    pub format: String,
    pub created_at: DateTime<Utc>,
}
