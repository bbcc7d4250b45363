use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::notificationmodel::Notification;

#[async_trait]
pub trait NotificationExt {
    async fn store_notification(
        &self,
        user_id: Option<Uuid>,
        event_type: &str,
        job_id: Option<Uuid>,
        payload: Option<serde_json::Value>,
        message: String,
    ) -> Result<(), Error>;

    async fn list_notifications(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, Error>;

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, Error>;

    /// Housekeeping for the purge task: drop read notifications older than
    /// the retention horizon. Idempotent.
    async fn purge_read_notifications(&self, retention_days: i32) -> Result<u64, Error>;
}

#[async_trait]
impl NotificationExt for DBClient {
    async fn store_notification(
        &self,
        user_id: Option<Uuid>,
        event_type: &str,
        job_id: Option<Uuid>,
        payload: Option<serde_json::Value>,
        message: String,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO notifications (user_id, event_type, job_id, payload, message)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(event_type)
        .bind(job_id)
        .bind(payload)
        .bind(message)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_notifications(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, event_type, job_id, payload, message, is_read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn purge_read_notifications(&self, retention_days: i32) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM notifications
            WHERE is_read = TRUE AND created_at < NOW() - ($1 * INTERVAL '1 day')
            "#,
        )
        .bind(retention_days)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
