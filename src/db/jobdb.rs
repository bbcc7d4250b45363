use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::jobmodel::*;

#[async_trait]
pub trait JobExt {
    // Job management
    async fn create_job(
        &self,
        customer_id: Uuid,
        title: String,
        description: String,
        budget_pence: Option<i64>,
        budget_type: BudgetType,
        category: ServiceCategory,
    ) -> Result<Job, Error>;

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, Error>;

    async fn list_open_jobs(
        &self,
        category: Option<ServiceCategory>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Job>, Error>;

    async fn list_customer_jobs(&self, customer_id: Uuid) -> Result<Vec<Job>, Error>;

    async fn list_vendor_jobs(&self, vendor_id: Uuid) -> Result<Vec<Job>, Error>;

    // Only legal while the job is still open; returns None otherwise.
    async fn update_open_job(
        &self,
        job_id: Uuid,
        title: Option<String>,
        description: Option<String>,
        budget_pence: Option<i64>,
    ) -> Result<Option<Job>, Error>;

    async fn count_bids(&self, job_id: Uuid) -> Result<i64, Error>;

    // Bid management
    async fn create_bid(
        &self,
        job_id: Uuid,
        vendor_id: Uuid,
        amount_pence: i64,
        description: String,
        timeline_days: i32,
    ) -> Result<Bid, Error>;

    async fn get_bid_by_id(&self, bid_id: Uuid) -> Result<Option<Bid>, Error>;

    async fn list_bids_for_job(&self, job_id: Uuid) -> Result<Vec<Bid>, Error>;

    async fn list_vendor_bids(&self, vendor_id: Uuid) -> Result<Vec<Bid>, Error>;

    async fn update_pending_bid(
        &self,
        bid_id: Uuid,
        amount_pence: Option<i64>,
        description: Option<String>,
        timeline_days: Option<i32>,
    ) -> Result<Option<Bid>, Error>;

    async fn withdraw_pending_bid(&self, bid_id: Uuid) -> Result<Option<Bid>, Error>;

    // Transition steps of bid acceptance; each is status-guarded so a
    // concurrent acceptance resolves to exactly one winner. All run inside
    // the caller's transaction.
    async fn accept_bid_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        bid_id: Uuid,
    ) -> Result<Option<Bid>, Error>;

    async fn reject_pending_bids_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job_id: Uuid,
        except_bid_id: Option<Uuid>,
    ) -> Result<Vec<Bid>, Error>;

    async fn assign_vendor_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job_id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<Job>, Error>;

    // Completion phases
    async fn begin_completion(
        &self,
        job_id: Uuid,
        settlement_method: SettlementMethod,
    ) -> Result<Option<Job>, Error>;

    async fn approve_completion_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job_id: Uuid,
    ) -> Result<Option<Job>, Error>;

    // Idempotent: funding a payment keeps an already-started job in progress.
    async fn mark_job_in_progress(&self, job_id: Uuid) -> Result<Option<Job>, Error>;

    async fn complete_job_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job_id: Uuid,
    ) -> Result<Option<Job>, Error>;

    async fn dispute_job_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job_id: Uuid,
    ) -> Result<Option<Job>, Error>;

    async fn cancel_job_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job_id: Uuid,
        reason: String,
    ) -> Result<Option<Job>, Error>;

    async fn soft_delete_job_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job_id: Uuid,
    ) -> Result<Option<Job>, Error>;
}

const JOB_COLUMNS: &str = r#"
    id, customer_id, assigned_vendor_id, title, description,
    budget_pence, budget_type, category, status, is_deleted,
    settlement_method, payment_received, payment_received_at,
    completion_date, cancel_reason, created_at, updated_at
"#;

const BID_COLUMNS: &str = r#"
    id, job_id, vendor_id, amount_pence, description, timeline_days,
    status, created_at, updated_at
"#;

#[async_trait]
impl JobExt for DBClient {
    async fn create_job(
        &self,
        customer_id: Uuid,
        title: String,
        description: String,
        budget_pence: Option<i64>,
        budget_type: BudgetType,
        category: ServiceCategory,
    ) -> Result<Job, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO jobs (customer_id, title, description, budget_pence, budget_type, category)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(customer_id)
        .bind(title)
        .bind(description)
        .bind(budget_pence)
        .bind(budget_type)
        .bind(category)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE id = $1 AND is_deleted = FALSE
            "#
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_open_jobs(
        &self,
        category: Option<ServiceCategory>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE status = 'open' AND is_deleted = FALSE
              AND ($1::service_category IS NULL OR category = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(category)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_customer_jobs(&self, customer_id: Uuid) -> Result<Vec<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE customer_id = $1 AND is_deleted = FALSE
            ORDER BY created_at DESC
            "#
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_vendor_jobs(&self, vendor_id: Uuid) -> Result<Vec<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE assigned_vendor_id = $1 AND is_deleted = FALSE
            ORDER BY created_at DESC
            "#
        ))
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_open_job(
        &self,
        job_id: Uuid,
        title: Option<String>,
        description: Option<String>,
        budget_pence: Option<i64>,
    ) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                budget_pence = COALESCE($4, budget_pence),
                updated_at = NOW()
            WHERE id = $1 AND status = 'open' AND is_deleted = FALSE
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(title)
        .bind(description)
        .bind(budget_pence)
        .fetch_optional(&self.pool)
        .await
    }

    async fn count_bids(&self, job_id: Uuid) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bids WHERE job_id = $1")
            .bind(job_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn create_bid(
        &self,
        job_id: Uuid,
        vendor_id: Uuid,
        amount_pence: i64,
        description: String,
        timeline_days: i32,
    ) -> Result<Bid, Error> {
        sqlx::query_as::<_, Bid>(&format!(
            r#"
            INSERT INTO bids (job_id, vendor_id, amount_pence, description, timeline_days)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {BID_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(vendor_id)
        .bind(amount_pence)
        .bind(description)
        .bind(timeline_days)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_bid_by_id(&self, bid_id: Uuid) -> Result<Option<Bid>, Error> {
        sqlx::query_as::<_, Bid>(&format!(
            r#"
            SELECT {BID_COLUMNS}
            FROM bids
            WHERE id = $1
            "#
        ))
        .bind(bid_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_bids_for_job(&self, job_id: Uuid) -> Result<Vec<Bid>, Error> {
        sqlx::query_as::<_, Bid>(&format!(
            r#"
            SELECT {BID_COLUMNS}
            FROM bids
            WHERE job_id = $1
            ORDER BY created_at ASC
            "#
        ))
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_vendor_bids(&self, vendor_id: Uuid) -> Result<Vec<Bid>, Error> {
        sqlx::query_as::<_, Bid>(&format!(
            r#"
            SELECT {BID_COLUMNS}
            FROM bids
            WHERE vendor_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_pending_bid(
        &self,
        bid_id: Uuid,
        amount_pence: Option<i64>,
        description: Option<String>,
        timeline_days: Option<i32>,
    ) -> Result<Option<Bid>, Error> {
        sqlx::query_as::<_, Bid>(&format!(
            r#"
            UPDATE bids
            SET amount_pence = COALESCE($2, amount_pence),
                description = COALESCE($3, description),
                timeline_days = COALESCE($4, timeline_days),
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {BID_COLUMNS}
            "#
        ))
        .bind(bid_id)
        .bind(amount_pence)
        .bind(description)
        .bind(timeline_days)
        .fetch_optional(&self.pool)
        .await
    }

    async fn withdraw_pending_bid(&self, bid_id: Uuid) -> Result<Option<Bid>, Error> {
        sqlx::query_as::<_, Bid>(&format!(
            r#"
            UPDATE bids
            SET status = 'withdrawn', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {BID_COLUMNS}
            "#
        ))
        .bind(bid_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn accept_bid_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        bid_id: Uuid,
    ) -> Result<Option<Bid>, Error> {
        sqlx::query_as::<_, Bid>(&format!(
            r#"
            UPDATE bids
            SET status = 'accepted', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {BID_COLUMNS}
            "#
        ))
        .bind(bid_id)
        .fetch_optional(&mut **tx)
        .await
    }

    async fn reject_pending_bids_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job_id: Uuid,
        except_bid_id: Option<Uuid>,
    ) -> Result<Vec<Bid>, Error> {
        sqlx::query_as::<_, Bid>(&format!(
            r#"
            UPDATE bids
            SET status = 'rejected', updated_at = NOW()
            WHERE job_id = $1 AND status = 'pending'
              AND ($2::uuid IS NULL OR id <> $2)
            RETURNING {BID_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(except_bid_id)
        .fetch_all(&mut **tx)
        .await
    }

    async fn assign_vendor_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job_id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET status = 'in_progress', assigned_vendor_id = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'open' AND is_deleted = FALSE
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(vendor_id)
        .fetch_optional(&mut **tx)
        .await
    }

    async fn begin_completion(
        &self,
        job_id: Uuid,
        settlement_method: SettlementMethod,
    ) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET status = 'pending_approval',
                settlement_method = $2,
                payment_received = TRUE,
                payment_received_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = 'in_progress' AND is_deleted = FALSE
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(settlement_method)
        .fetch_optional(&self.pool)
        .await
    }

    async fn approve_completion_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job_id: Uuid,
    ) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET status = 'completed', completion_date = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'pending_approval' AND is_deleted = FALSE
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id)
        .fetch_optional(&mut **tx)
        .await
    }

    async fn mark_job_in_progress(&self, job_id: Uuid) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET status = 'in_progress', updated_at = NOW()
            WHERE id = $1 AND status IN ('open', 'in_progress') AND is_deleted = FALSE
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn complete_job_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job_id: Uuid,
    ) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET status = 'completed',
                completion_date = COALESCE(completion_date, NOW()),
                updated_at = NOW()
            WHERE id = $1 AND status IN ('in_progress', 'pending_approval', 'completed')
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id)
        .fetch_optional(&mut **tx)
        .await
    }

    async fn dispute_job_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job_id: Uuid,
    ) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET status = 'disputed', updated_at = NOW()
            WHERE id = $1 AND status NOT IN ('completed', 'cancelled')
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id)
        .fetch_optional(&mut **tx)
        .await
    }

    async fn cancel_job_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job_id: Uuid,
        reason: String,
    ) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET status = 'cancelled', cancel_reason = $2, updated_at = NOW()
            WHERE id = $1 AND status IN ('open', 'in_progress', 'pending_approval')
              AND is_deleted = FALSE
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(reason)
        .fetch_optional(&mut **tx)
        .await
    }

    async fn soft_delete_job_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job_id: Uuid,
    ) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET is_deleted = TRUE, updated_at = NOW()
            WHERE id = $1 AND status = 'open' AND is_deleted = FALSE
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id)
        .fetch_optional(&mut **tx)
        .await
    }
}
