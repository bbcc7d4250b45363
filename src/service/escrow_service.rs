use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, jobdb::JobExt, paymentdb::PaymentExt, userdb::UserExt},
    dtos::paymentdtos::CreateEscrowPaymentDto,
    models::{jobmodel::JobStatus, paymentmodel::*},
    service::{error::ServiceError, events::DomainEvent, notification_service::NotificationService},
    utils::currency::split_fees,
};

/// Escrow engine: owns every payment status transition. Fees are computed
/// once at creation and frozen; transitions are status-guarded in SQL so a
/// double release or refund loses the race and fails cleanly.
#[derive(Debug, Clone)]
pub struct EscrowService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
    platform_fee_bps: u32,
    escrow_fee_bps: u32,
    currency: String,
}

impl EscrowService {
    pub fn new(
        db_client: Arc<DBClient>,
        notification_service: Arc<NotificationService>,
        platform_fee_bps: u32,
        escrow_fee_bps: u32,
        currency: String,
    ) -> Self {
        Self {
            db_client,
            notification_service,
            platform_fee_bps,
            escrow_fee_bps,
            currency,
        }
    }

    pub async fn create_escrow_payment(
        &self,
        customer_id: Uuid,
        payment_data: CreateEscrowPaymentDto,
    ) -> Result<Payment, ServiceError> {
        let job_id = payment_data.job_id;
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if job.customer_id != customer_id {
            return Err(ServiceError::Forbidden(customer_id, job_id));
        }

        let vendor_id = match (job.status, job.assigned_vendor_id) {
            (JobStatus::InProgress | JobStatus::PendingApproval, Some(vendor_id)) => vendor_id,
            _ => {
                return Err(ServiceError::InvalidState(format!(
                    "Job {} has no assigned vendor to pay (status: {})",
                    job_id,
                    job.status.to_str()
                )))
            }
        };

        if self
            .db_client
            .get_active_payment_for_job(job_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "Job {} already has an outstanding escrow payment",
                job_id
            )));
        }

        let fees = split_fees(
            payment_data.amount_pence,
            self.platform_fee_bps,
            self.escrow_fee_bps,
        );

        let payment = self
            .db_client
            .create_escrow_payment(
                job_id,
                customer_id,
                vendor_id,
                payment_data.amount_pence,
                fees.platform_fee_pence,
                fees.escrow_fee_pence,
                fees.net_amount_pence,
                self.currency.clone(),
                payment_data.method,
            )
            .await?;

        Ok(payment)
    }

    /// Customer funds the payment: pending -> in_escrow. Keeps the job in
    /// progress (a no-op when it already is).
    pub async fn process_payment(
        &self,
        payment_id: Uuid,
        customer_id: Uuid,
        transaction_id: Option<String>,
    ) -> Result<Payment, ServiceError> {
        let payment = self
            .db_client
            .get_payment_by_id(payment_id)
            .await?
            .ok_or(ServiceError::PaymentNotFound(payment_id))?;

        if payment.customer_id != customer_id {
            return Err(ServiceError::Forbidden(customer_id, payment_id));
        }

        let funded = self
            .db_client
            .fund_payment(payment_id, transaction_id)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidState(format!(
                    "Payment {} is not awaiting funding (status: {})",
                    payment_id,
                    payment.status.to_str()
                ))
            })?;

        if let Some(job_id) = funded.job_id {
            self.db_client.mark_job_in_progress(job_id).await?;
        }

        self.notification_service
            .dispatch(&[DomainEvent::PaymentFunded {
                payment_id,
                job_id: funded.job_id.unwrap_or_default(),
                vendor_id: funded.vendor_id,
                amount_pence: funded.amount_pence,
            }])
            .await;

        Ok(funded)
    }

    /// Admin release path; the approval flow uses [`Self::release_in_tx`]
    /// inside its own transaction instead.
    pub async fn release_payment(&self, payment_id: Uuid) -> Result<Payment, ServiceError> {
        // Existence first, so a missing id reads as 404 rather than a
        // state error.
        self.db_client
            .get_payment_by_id(payment_id)
            .await?
            .ok_or(ServiceError::PaymentNotFound(payment_id))?;

        let mut tx = self.db_client.pool.begin().await?;
        let (payment, events) = self.release_in_tx(&mut tx, payment_id).await?;
        tx.commit().await?;

        self.notification_service.dispatch(&events).await;

        Ok(payment)
    }

    /// The single release implementation: payment in_escrow -> released,
    /// job -> completed, vendor completed-jobs bump (best effort). Returns
    /// the events for the caller to dispatch after commit.
    pub async fn release_in_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        payment_id: Uuid,
    ) -> Result<(Payment, Vec<DomainEvent>), ServiceError> {
        let payment = self
            .db_client
            .release_payment_tx(tx, payment_id)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidState(format!(
                    "Payment {} is not in escrow and cannot be released",
                    payment_id
                ))
            })?;

        if let Some(job_id) = payment.job_id {
            self.db_client.complete_job_tx(tx, job_id).await?;
        }

        match self
            .db_client
            .increment_completed_jobs_tx(tx, payment.vendor_id)
            .await
        {
            Ok(0) => tracing::warn!(
                vendor_id = %payment.vendor_id,
                "no vendor profile to credit for released payment {}",
                payment_id
            ),
            Ok(_) => {}
            Err(err) => tracing::warn!(
                vendor_id = %payment.vendor_id,
                "failed to bump completed jobs: {}",
                err
            ),
        }

        let events = vec![DomainEvent::PaymentReleased {
            payment_id,
            job_id: payment.job_id.unwrap_or_default(),
            vendor_id: payment.vendor_id,
            net_amount_pence: payment.net_amount_pence,
        }];

        Ok((payment, events))
    }

    /// Admin refund: in_escrow -> refunded, and the job goes to disputed.
    /// A refund is dispute resolution, not a silent cancellation.
    pub async fn refund_payment(
        &self,
        payment_id: Uuid,
        reason: String,
    ) -> Result<Payment, ServiceError> {
        self.db_client
            .get_payment_by_id(payment_id)
            .await?
            .ok_or(ServiceError::PaymentNotFound(payment_id))?;

        let mut tx = self.db_client.pool.begin().await?;

        let payment = self
            .db_client
            .refund_payment_tx(&mut tx, payment_id)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidState(format!(
                    "Payment {} is not in escrow and cannot be refunded",
                    payment_id
                ))
            })?;

        if let Some(job_id) = payment.job_id {
            self.db_client
                .dispute_job_tx(&mut tx, job_id)
                .await?
                .ok_or_else(|| {
                    ServiceError::InvalidState(format!(
                        "Job {} is already closed and cannot enter dispute",
                        job_id
                    ))
                })?;
        }

        tx.commit().await?;

        self.notification_service
            .dispatch(&[DomainEvent::PaymentRefunded {
                payment_id,
                job_id: payment.job_id.unwrap_or_default(),
                customer_id: payment.customer_id,
                vendor_id: payment.vendor_id,
                reason,
            }])
            .await;

        Ok(payment)
    }

    /// Payments are visible to their customer, their vendor and admins.
    pub async fn get_payment(
        &self,
        payment_id: Uuid,
        caller_id: Uuid,
        is_admin: bool,
    ) -> Result<Payment, ServiceError> {
        let payment = self
            .db_client
            .get_payment_by_id(payment_id)
            .await?
            .ok_or(ServiceError::PaymentNotFound(payment_id))?;

        if !is_admin && payment.customer_id != caller_id && payment.vendor_id != caller_id {
            return Err(ServiceError::Forbidden(caller_id, payment_id));
        }

        Ok(payment)
    }

    pub async fn list_customer_payments(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<Payment>, ServiceError> {
        Ok(self.db_client.list_customer_payments(customer_id).await?)
    }

    pub async fn list_vendor_payments(&self, vendor_id: Uuid) -> Result<Vec<Payment>, ServiceError> {
        Ok(self.db_client.list_vendor_payments(vendor_id).await?)
    }
}
