use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::paymentmodel::*;

#[async_trait]
pub trait PayoutExt {
    async fn create_payout(
        &self,
        vendor_id: Uuid,
        amount_pence: i64,
        method: PayoutMethod,
    ) -> Result<VendorPayout, Error>;

    async fn get_payout_by_id(&self, payout_id: Uuid) -> Result<Option<VendorPayout>, Error>;

    /// pending -> approved, guarded.
    async fn approve_payout(
        &self,
        payout_id: Uuid,
        admin_notes: Option<String>,
    ) -> Result<Option<VendorPayout>, Error>;

    /// pending -> rejected, guarded. Terminal.
    async fn reject_payout(
        &self,
        payout_id: Uuid,
        admin_notes: String,
    ) -> Result<Option<VendorPayout>, Error>;

    /// approved -> processed, guarded; part of the sweep transaction.
    async fn process_payout_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        payout_id: Uuid,
        external_payout_id: Option<String>,
    ) -> Result<Option<VendorPayout>, Error>;

    async fn list_vendor_payouts(&self, vendor_id: Uuid) -> Result<Vec<VendorPayout>, Error>;

    async fn list_payouts_by_status(
        &self,
        status: PayoutStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<VendorPayout>, Error>;
}

const PAYOUT_COLUMNS: &str = r#"
    id, vendor_id, amount_pence, method, status, admin_notes,
    external_payout_id, processed_at, created_at, updated_at
"#;

#[async_trait]
impl PayoutExt for DBClient {
    async fn create_payout(
        &self,
        vendor_id: Uuid,
        amount_pence: i64,
        method: PayoutMethod,
    ) -> Result<VendorPayout, Error> {
        sqlx::query_as::<_, VendorPayout>(&format!(
            r#"
            INSERT INTO vendor_payouts (vendor_id, amount_pence, method)
            VALUES ($1, $2, $3)
            RETURNING {PAYOUT_COLUMNS}
            "#
        ))
        .bind(vendor_id)
        .bind(amount_pence)
        .bind(method)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_payout_by_id(&self, payout_id: Uuid) -> Result<Option<VendorPayout>, Error> {
        sqlx::query_as::<_, VendorPayout>(&format!(
            r#"
            SELECT {PAYOUT_COLUMNS}
            FROM vendor_payouts
            WHERE id = $1
            "#
        ))
        .bind(payout_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn approve_payout(
        &self,
        payout_id: Uuid,
        admin_notes: Option<String>,
    ) -> Result<Option<VendorPayout>, Error> {
        sqlx::query_as::<_, VendorPayout>(&format!(
            r#"
            UPDATE vendor_payouts
            SET status = 'approved', admin_notes = COALESCE($2, admin_notes), updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {PAYOUT_COLUMNS}
            "#
        ))
        .bind(payout_id)
        .bind(admin_notes)
        .fetch_optional(&self.pool)
        .await
    }

    async fn reject_payout(
        &self,
        payout_id: Uuid,
        admin_notes: String,
    ) -> Result<Option<VendorPayout>, Error> {
        sqlx::query_as::<_, VendorPayout>(&format!(
            r#"
            UPDATE vendor_payouts
            SET status = 'rejected', admin_notes = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {PAYOUT_COLUMNS}
            "#
        ))
        .bind(payout_id)
        .bind(admin_notes)
        .fetch_optional(&self.pool)
        .await
    }

    async fn process_payout_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        payout_id: Uuid,
        external_payout_id: Option<String>,
    ) -> Result<Option<VendorPayout>, Error> {
        sqlx::query_as::<_, VendorPayout>(&format!(
            r#"
            UPDATE vendor_payouts
            SET status = 'processed',
                external_payout_id = $2,
                processed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = 'approved'
            RETURNING {PAYOUT_COLUMNS}
            "#
        ))
        .bind(payout_id)
        .bind(external_payout_id)
        .fetch_optional(&mut **tx)
        .await
    }

    async fn list_vendor_payouts(&self, vendor_id: Uuid) -> Result<Vec<VendorPayout>, Error> {
        sqlx::query_as::<_, VendorPayout>(&format!(
            r#"
            SELECT {PAYOUT_COLUMNS}
            FROM vendor_payouts
            WHERE vendor_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_payouts_by_status(
        &self,
        status: PayoutStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<VendorPayout>, Error> {
        sqlx::query_as::<_, VendorPayout>(&format!(
            r#"
            SELECT {PAYOUT_COLUMNS}
            FROM vendor_payouts
            WHERE status = $1
            ORDER BY created_at ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }
}
