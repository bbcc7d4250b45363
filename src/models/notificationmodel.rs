use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    /// None for broadcast notifications.
    pub user_id: Option<Uuid>,
    pub event_type: String,
    pub job_id: Option<Uuid>,
    pub payload: Option<serde_json::Value>,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
