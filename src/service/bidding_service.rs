use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, jobdb::JobExt},
    dtos::jobdtos::{SubmitBidDto, UpdateBidDto},
    models::jobmodel::*,
    service::{error::ServiceError, events::DomainEvent, notification_service::NotificationService},
};

#[derive(Debug, Clone)]
pub struct BiddingService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
}

impl BiddingService {
    pub fn new(db_client: Arc<DBClient>, notification_service: Arc<NotificationService>) -> Self {
        Self {
            db_client,
            notification_service,
        }
    }

    pub async fn submit_bid(
        &self,
        job_id: Uuid,
        vendor_id: Uuid,
        bid_data: SubmitBidDto,
    ) -> Result<Bid, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if job.status != JobStatus::Open {
            return Err(ServiceError::InvalidState(format!(
                "Job {} is not open for bidding (status: {})",
                job_id,
                job.status.to_str()
            )));
        }

        if job.customer_id == vendor_id {
            return Err(ServiceError::Validation(
                "You cannot bid on your own job".to_string(),
            ));
        }

        // The unique (job_id, vendor_id) index is the real guard; a lost
        // race surfaces as a unique violation here.
        let bid = self
            .db_client
            .create_bid(
                job_id,
                vendor_id,
                bid_data.amount_pence,
                bid_data.description,
                bid_data.timeline_days,
            )
            .await
            .map_err(|e| {
                ServiceError::from_unique_violation(e, "You have already bid on this job")
            })?;

        self.notification_service
            .dispatch(&[DomainEvent::BidSubmitted {
                job_id,
                bid_id: bid.id,
                customer_id: job.customer_id,
                vendor_id,
                amount_pence: bid.amount_pence,
            }])
            .await;

        Ok(bid)
    }

    pub async fn update_bid(
        &self,
        bid_id: Uuid,
        vendor_id: Uuid,
        bid_data: UpdateBidDto,
    ) -> Result<Bid, ServiceError> {
        let bid = self
            .db_client
            .get_bid_by_id(bid_id)
            .await?
            .ok_or(ServiceError::BidNotFound(bid_id))?;

        if bid.vendor_id != vendor_id {
            return Err(ServiceError::Forbidden(vendor_id, bid_id));
        }

        self.db_client
            .update_pending_bid(
                bid_id,
                bid_data.amount_pence,
                bid_data.description,
                bid_data.timeline_days,
            )
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidState(format!(
                    "Bid {} can no longer be edited (status: {})",
                    bid_id,
                    bid.status.to_str()
                ))
            })
    }

    pub async fn withdraw_bid(&self, bid_id: Uuid, vendor_id: Uuid) -> Result<Bid, ServiceError> {
        let bid = self
            .db_client
            .get_bid_by_id(bid_id)
            .await?
            .ok_or(ServiceError::BidNotFound(bid_id))?;

        if bid.vendor_id != vendor_id {
            return Err(ServiceError::Forbidden(vendor_id, bid_id));
        }

        self.db_client
            .withdraw_pending_bid(bid_id)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidState(format!(
                    "Bid {} can no longer be withdrawn (status: {})",
                    bid_id,
                    bid.status.to_str()
                ))
            })
    }

    /// Bids are visible to the job owner and to admins.
    pub async fn list_bids_for_job(
        &self,
        job_id: Uuid,
        caller_id: Uuid,
        is_admin: bool,
    ) -> Result<Vec<Bid>, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if !is_admin && job.customer_id != caller_id {
            return Err(ServiceError::Forbidden(caller_id, job_id));
        }

        Ok(self.db_client.list_bids_for_job(job_id).await?)
    }

    pub async fn list_vendor_bids(&self, vendor_id: Uuid) -> Result<Vec<Bid>, ServiceError> {
        Ok(self.db_client.list_vendor_bids(vendor_id).await?)
    }
}
