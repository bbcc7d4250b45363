use std::sync::Arc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{chatdb::ChatExt, db::DBClient, jobdb::JobExt, paymentdb::PaymentExt},
    dtos::jobdtos::{CreateJobDto, UpdateJobDto},
    models::{chatmodel::ChatRoom, jobmodel::*, paymentmodel::PaymentStatus},
    service::{
        error::ServiceError, escrow_service::EscrowService, events::DomainEvent,
        notification_service::NotificationService,
    },
};

#[derive(Debug, Clone)]
pub struct JobService {
    db_client: Arc<DBClient>,
    escrow_service: Arc<EscrowService>,
    notification_service: Arc<NotificationService>,
}

#[derive(Debug, Serialize)]
pub struct BidAcceptanceResult {
    pub job: Job,
    pub bid: Bid,
    pub chat_room: ChatRoom,
}

impl JobService {
    pub fn new(
        db_client: Arc<DBClient>,
        escrow_service: Arc<EscrowService>,
        notification_service: Arc<NotificationService>,
    ) -> Self {
        Self {
            db_client,
            escrow_service,
            notification_service,
        }
    }

    pub async fn create_job(
        &self,
        customer_id: Uuid,
        job_data: CreateJobDto,
    ) -> Result<Job, ServiceError> {
        let job = self
            .db_client
            .create_job(
                customer_id,
                job_data.title,
                job_data.description,
                job_data.budget_pence,
                job_data.budget_type,
                job_data.category,
            )
            .await?;

        self.notification_service
            .dispatch(&[DomainEvent::JobPosted {
                job_id: job.id,
                title: job.title.clone(),
            }])
            .await;

        Ok(job)
    }

    pub async fn get_job(&self, job_id: Uuid) -> Result<(Job, i64), ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;
        // Live count; bid totals are never cached on the job row.
        let bid_count = self.db_client.count_bids(job_id).await?;
        Ok((job, bid_count))
    }

    pub async fn update_job(
        &self,
        job_id: Uuid,
        customer_id: Uuid,
        job_data: UpdateJobDto,
    ) -> Result<Job, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if job.customer_id != customer_id {
            return Err(ServiceError::Forbidden(customer_id, job_id));
        }

        self.db_client
            .update_open_job(
                job_id,
                job_data.title,
                job_data.description,
                job_data.budget_pence,
            )
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidState(format!(
                    "Job {} can no longer be edited (status: {})",
                    job_id,
                    job.status.to_str()
                ))
            })
    }

    /// Accept one bid: the winning bid, the job assignment, the sibling
    /// rejections and the chat room are one transaction — none of them is
    /// observable without the others.
    pub async fn accept_bid(
        &self,
        job_id: Uuid,
        bid_id: Uuid,
        customer_id: Uuid,
    ) -> Result<BidAcceptanceResult, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if job.customer_id != customer_id {
            return Err(ServiceError::Forbidden(customer_id, job_id));
        }

        if job.status != JobStatus::Open {
            return Err(ServiceError::InvalidState(format!(
                "Job {} is not open (status: {})",
                job_id,
                job.status.to_str()
            )));
        }

        let bid = self
            .db_client
            .get_bid_by_id(bid_id)
            .await?
            .filter(|b| b.job_id == job_id)
            .ok_or(ServiceError::BidNotFound(bid_id))?;

        if bid.status != BidStatus::Pending {
            return Err(ServiceError::InvalidState(format!(
                "Bid {} is not pending (status: {})",
                bid_id,
                bid.status.to_str()
            )));
        }

        let mut tx = self.db_client.pool.begin().await?;

        // Guarded open -> in_progress; a concurrent acceptance already won
        // if this comes back empty.
        let updated_job = self
            .db_client
            .assign_vendor_tx(&mut tx, job_id, bid.vendor_id)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidState(format!("Job {} is no longer open", job_id))
            })?;

        let accepted_bid = self
            .db_client
            .accept_bid_tx(&mut tx, bid_id)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidState(format!("Bid {} is no longer pending", bid_id))
            })?;

        let rejected = self
            .db_client
            .reject_pending_bids_tx(&mut tx, job_id, Some(bid_id))
            .await?;

        let chat_room = self
            .db_client
            .create_room_tx(&mut tx, job_id, customer_id, bid.vendor_id)
            .await?;

        tx.commit().await?;

        let mut events = vec![DomainEvent::BidAccepted {
            job_id,
            bid_id,
            vendor_id: accepted_bid.vendor_id,
            title: updated_job.title.clone(),
        }];
        for loser in &rejected {
            events.push(DomainEvent::BidRejected {
                job_id,
                bid_id: loser.id,
                vendor_id: loser.vendor_id,
                title: updated_job.title.clone(),
            });
        }
        self.notification_service.dispatch(&events).await;

        Ok(BidAcceptanceResult {
            job: updated_job,
            bid: accepted_bid,
            chat_room,
        })
    }

    /// Vendor phase of the two-phase completion: in_progress ->
    /// pending_approval, recording how the vendor says they were settled.
    pub async fn request_completion(
        &self,
        job_id: Uuid,
        vendor_id: Uuid,
        settlement_method: Option<SettlementMethod>,
    ) -> Result<Job, ServiceError> {
        let settlement_method = settlement_method.ok_or_else(|| {
            ServiceError::Validation("A settlement method is required to mark work done".to_string())
        })?;

        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if job.assigned_vendor_id != Some(vendor_id) {
            return Err(ServiceError::Forbidden(vendor_id, job_id));
        }

        let updated_job = self
            .db_client
            .begin_completion(job_id, settlement_method)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidState(format!(
                    "Job {} is not in progress (status: {})",
                    job_id,
                    job.status.to_str()
                ))
            })?;

        self.notification_service
            .dispatch(&[DomainEvent::CompletionRequested {
                job_id,
                customer_id: updated_job.customer_id,
                vendor_id,
                settlement_method,
            }])
            .await;

        Ok(updated_job)
    }

    /// Customer phase: pending_approval -> completed. If an escrow payment
    /// is funded for the job it is released in the same transaction.
    pub async fn approve_completion(
        &self,
        job_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Job, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if job.customer_id != customer_id {
            return Err(ServiceError::Forbidden(customer_id, job_id));
        }

        let mut tx = self.db_client.pool.begin().await?;

        let updated_job = self
            .db_client
            .approve_completion_tx(&mut tx, job_id)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidState(format!(
                    "Job {} is not awaiting approval (status: {})",
                    job_id,
                    job.status.to_str()
                ))
            })?;

        let mut events = vec![];
        if let Some(payment) = self
            .db_client
            .get_escrowed_payment_for_job_tx(&mut tx, job_id)
            .await?
        {
            let (_, mut release_events) = self
                .escrow_service
                .release_in_tx(&mut tx, payment.id)
                .await?;
            events.append(&mut release_events);
        }

        tx.commit().await?;

        if let Some(vendor_id) = updated_job.assigned_vendor_id {
            events.push(DomainEvent::JobApproved {
                job_id,
                vendor_id,
                title: updated_job.title.clone(),
            });
        }
        self.notification_service.dispatch(&events).await;

        Ok(updated_job)
    }

    /// Legal from open, in_progress and pending_approval, but never once
    /// escrow money is held: funded jobs go through refund/dispute instead.
    pub async fn cancel_job(
        &self,
        job_id: Uuid,
        customer_id: Uuid,
        reason: String,
    ) -> Result<Job, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if job.customer_id != customer_id {
            return Err(ServiceError::Forbidden(customer_id, job_id));
        }

        if let Some(payment) = self.db_client.get_active_payment_for_job(job_id).await? {
            if payment.status == PaymentStatus::InEscrow {
                return Err(ServiceError::InvalidState(format!(
                    "Job {} has funds in escrow; request a refund instead",
                    job_id
                )));
            }
        }

        let mut tx = self.db_client.pool.begin().await?;

        let cancelled_job = self
            .db_client
            .cancel_job_tx(&mut tx, job_id, reason.clone())
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidState(format!(
                    "Job {} can no longer be cancelled (status: {})",
                    job_id,
                    job.status.to_str()
                ))
            })?;

        self.db_client
            .reject_pending_bids_tx(&mut tx, job_id, None)
            .await?;

        tx.commit().await?;

        self.notification_service
            .dispatch(&[DomainEvent::JobCancelled {
                job_id,
                vendor_id: cancelled_job.assigned_vendor_id,
                title: cancelled_job.title.clone(),
                reason,
            }])
            .await;

        Ok(cancelled_job)
    }

    /// Soft delete, strictly while open. Refused outright once any payment
    /// row references the job: the financial history must stay intact.
    pub async fn delete_job(&self, job_id: Uuid, customer_id: Uuid) -> Result<(), ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if job.customer_id != customer_id {
            return Err(ServiceError::Forbidden(customer_id, job_id));
        }

        if self.db_client.count_payments_for_job(job_id).await? > 0 {
            return Err(ServiceError::Conflict(format!(
                "Job {} has payment records and cannot be deleted",
                job_id
            )));
        }

        let mut tx = self.db_client.pool.begin().await?;

        self.db_client
            .soft_delete_job_tx(&mut tx, job_id)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidState(format!(
                    "Job {} can only be deleted while open (status: {})",
                    job_id,
                    job.status.to_str()
                ))
            })?;

        self.db_client
            .reject_pending_bids_tx(&mut tx, job_id, None)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    pub async fn list_open_jobs(
        &self,
        category: Option<ServiceCategory>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Job>, ServiceError> {
        Ok(self.db_client.list_open_jobs(category, limit, offset).await?)
    }

    pub async fn list_customer_jobs(&self, customer_id: Uuid) -> Result<Vec<Job>, ServiceError> {
        Ok(self.db_client.list_customer_jobs(customer_id).await?)
    }

    pub async fn list_vendor_jobs(&self, vendor_id: Uuid) -> Result<Vec<Job>, ServiceError> {
        Ok(self.db_client.list_vendor_jobs(vendor_id).await?)
    }
}
