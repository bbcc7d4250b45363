use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::usermodel::*;

#[async_trait]
pub trait UserExt {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error>;

    async fn get_vendor_profile(&self, user_id: Uuid) -> Result<Option<VendorProfile>, Error>;

    /// Returns the number of rows touched; 0 means the vendor has no
    /// profile row yet, which release treats as best-effort.
    async fn increment_completed_jobs_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        vendor_user_id: Uuid,
    ) -> Result<u64, Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_vendor_profile(&self, user_id: Uuid) -> Result<Option<VendorProfile>, Error> {
        sqlx::query_as::<_, VendorProfile>(
            r#"
            SELECT id, user_id, completed_jobs, rating, created_at, updated_at
            FROM vendor_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn increment_completed_jobs_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        vendor_user_id: Uuid,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE vendor_profiles
            SET completed_jobs = completed_jobs + 1, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(vendor_user_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }
}
