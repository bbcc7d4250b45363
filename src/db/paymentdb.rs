use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::paymentmodel::*;

#[async_trait]
pub trait PaymentExt {
    async fn create_escrow_payment(
        &self,
        job_id: Uuid,
        customer_id: Uuid,
        vendor_id: Uuid,
        amount_pence: i64,
        platform_fee_pence: i64,
        escrow_fee_pence: i64,
        net_amount_pence: i64,
        currency: String,
        method: PaymentMethod,
    ) -> Result<Payment, Error>;

    async fn get_payment_by_id(&self, payment_id: Uuid) -> Result<Option<Payment>, Error>;

    /// The job's outstanding (pending or in-escrow) payment, if any.
    async fn get_active_payment_for_job(&self, job_id: Uuid) -> Result<Option<Payment>, Error>;

    /// Row-locked lookup of the job's in-escrow payment, for the approval
    /// path that releases inside its own transaction.
    async fn get_escrowed_payment_for_job_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job_id: Uuid,
    ) -> Result<Option<Payment>, Error>;

    async fn count_payments_for_job(&self, job_id: Uuid) -> Result<i64, Error>;

    /// pending -> in_escrow, guarded on the current status.
    async fn fund_payment(
        &self,
        payment_id: Uuid,
        transaction_id: Option<String>,
    ) -> Result<Option<Payment>, Error>;

    /// in_escrow -> released, guarded; a second call finds no row.
    async fn release_payment_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        payment_id: Uuid,
    ) -> Result<Option<Payment>, Error>;

    /// in_escrow -> refunded, guarded.
    async fn refund_payment_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        payment_id: Uuid,
    ) -> Result<Option<Payment>, Error>;

    async fn list_customer_payments(&self, customer_id: Uuid) -> Result<Vec<Payment>, Error>;

    async fn list_vendor_payments(&self, vendor_id: Uuid) -> Result<Vec<Payment>, Error>;

    /// Sum of net amounts over released payments not yet swept into a payout.
    async fn available_balance(&self, vendor_id: Uuid) -> Result<i64, Error>;

    /// Sweep candidates, oldest release first (id as tie-break), locked for
    /// the duration of the payout-processing transaction.
    async fn unlinked_released_payments_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        vendor_id: Uuid,
    ) -> Result<Vec<Payment>, Error>;

    async fn link_payment_to_payout_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        payment_id: Uuid,
        payout_id: Uuid,
    ) -> Result<u64, Error>;
}

const PAYMENT_COLUMNS: &str = r#"
    id, job_id, customer_id, vendor_id, amount_pence, platform_fee_pence,
    escrow_fee_pence, net_amount_pence, currency, method, status, is_escrow,
    transaction_id, vendor_payout_id, paid_at, released_at, created_at, updated_at
"#;

#[async_trait]
impl PaymentExt for DBClient {
    async fn create_escrow_payment(
        &self,
        job_id: Uuid,
        customer_id: Uuid,
        vendor_id: Uuid,
        amount_pence: i64,
        platform_fee_pence: i64,
        escrow_fee_pence: i64,
        net_amount_pence: i64,
        currency: String,
        method: PaymentMethod,
    ) -> Result<Payment, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            INSERT INTO payments
            (job_id, customer_id, vendor_id, amount_pence, platform_fee_pence,
             escrow_fee_pence, net_amount_pence, currency, method, is_escrow)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE)
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(customer_id)
        .bind(vendor_id)
        .bind(amount_pence)
        .bind(platform_fee_pence)
        .bind(escrow_fee_pence)
        .bind(net_amount_pence)
        .bind(currency)
        .bind(method)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_payment_by_id(&self, payment_id: Uuid) -> Result<Option<Payment>, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM payments
            WHERE id = $1
            "#
        ))
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_active_payment_for_job(&self, job_id: Uuid) -> Result<Option<Payment>, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM payments
            WHERE job_id = $1 AND status IN ('pending', 'in_escrow')
            "#
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_escrowed_payment_for_job_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job_id: Uuid,
    ) -> Result<Option<Payment>, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM payments
            WHERE job_id = $1 AND status = 'in_escrow'
            FOR UPDATE
            "#
        ))
        .bind(job_id)
        .fetch_optional(&mut **tx)
        .await
    }

    async fn count_payments_for_job(&self, job_id: Uuid) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM payments WHERE job_id = $1")
            .bind(job_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn fund_payment(
        &self,
        payment_id: Uuid,
        transaction_id: Option<String>,
    ) -> Result<Option<Payment>, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            UPDATE payments
            SET status = 'in_escrow',
                transaction_id = COALESCE($2, transaction_id),
                paid_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment_id)
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn release_payment_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        payment_id: Uuid,
    ) -> Result<Option<Payment>, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            UPDATE payments
            SET status = 'released', released_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'in_escrow'
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment_id)
        .fetch_optional(&mut **tx)
        .await
    }

    async fn refund_payment_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        payment_id: Uuid,
    ) -> Result<Option<Payment>, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            UPDATE payments
            SET status = 'refunded', updated_at = NOW()
            WHERE id = $1 AND status = 'in_escrow'
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment_id)
        .fetch_optional(&mut **tx)
        .await
    }

    async fn list_customer_payments(&self, customer_id: Uuid) -> Result<Vec<Payment>, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM payments
            WHERE customer_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_vendor_payments(&self, vendor_id: Uuid) -> Result<Vec<Payment>, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM payments
            WHERE vendor_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn available_balance(&self, vendor_id: Uuid) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(net_amount_pence), 0)::BIGINT
            FROM payments
            WHERE vendor_id = $1 AND status = 'released' AND vendor_payout_id IS NULL
            "#,
        )
        .bind(vendor_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn unlinked_released_payments_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        vendor_id: Uuid,
    ) -> Result<Vec<Payment>, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM payments
            WHERE vendor_id = $1 AND status = 'released' AND vendor_payout_id IS NULL
            ORDER BY released_at ASC, id ASC
            FOR UPDATE
            "#
        ))
        .bind(vendor_id)
        .fetch_all(&mut **tx)
        .await
    }

    async fn link_payment_to_payout_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        payment_id: Uuid,
        payout_id: Uuid,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET vendor_payout_id = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'released' AND vendor_payout_id IS NULL
            "#,
        )
        .bind(payment_id)
        .bind(payout_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }
}
