use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::chatmodel::*;

#[async_trait]
pub trait ChatExt {
    /// Create the job's chat room and seed it with a system message.
    /// Runs inside the bid-acceptance transaction so a failure here rolls
    /// the acceptance back. The unique index on job_id makes a second
    /// acceptance attempt fail loudly rather than create a twin room.
    async fn create_room_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job_id: Uuid,
        customer_id: Uuid,
        vendor_id: Uuid,
    ) -> Result<ChatRoom, Error>;

    async fn get_room_by_job(&self, job_id: Uuid) -> Result<Option<ChatRoom>, Error>;

    async fn get_room_messages(
        &self,
        room_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChatMessage>, Error>;
}

#[async_trait]
impl ChatExt for DBClient {
    async fn create_room_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job_id: Uuid,
        customer_id: Uuid,
        vendor_id: Uuid,
    ) -> Result<ChatRoom, Error> {
        let room = sqlx::query_as::<_, ChatRoom>(
            r#"
            INSERT INTO chat_rooms (job_id, customer_id, vendor_id)
            VALUES ($1, $2, $3)
            RETURNING id, job_id, customer_id, vendor_id, created_at
            "#,
        )
        .bind(job_id)
        .bind(customer_id)
        .bind(vendor_id)
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO chat_messages (room_id, sender_id, content)
            VALUES ($1, NULL, $2)
            "#,
        )
        .bind(room.id)
        .bind("Bid accepted. You can use this room to coordinate the work.")
        .execute(&mut **tx)
        .await?;

        Ok(room)
    }

    async fn get_room_by_job(&self, job_id: Uuid) -> Result<Option<ChatRoom>, Error> {
        sqlx::query_as::<_, ChatRoom>(
            r#"
            SELECT id, job_id, customer_id, vendor_id, created_at
            FROM chat_rooms
            WHERE job_id = $1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_room_messages(
        &self,
        room_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChatMessage>, Error> {
        sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, room_id, sender_id, content, created_at
            FROM chat_messages
            WHERE room_id = $1
            ORDER BY created_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(room_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }
}
