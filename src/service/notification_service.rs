use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, notificationdb::NotificationExt},
    models::notificationmodel::Notification,
    service::{error::ServiceError, events::DomainEvent},
    utils::currency::format_pence,
};

/// Fans domain events out as stored notifications. Dispatch is strictly
/// fire-and-forget: a failure here is logged and swallowed, never bubbled
/// into the operation that produced the events.
#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
}

impl NotificationService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn dispatch(&self, events: &[DomainEvent]) {
        for event in events {
            if let Err(err) = self.deliver(event).await {
                tracing::warn!(
                    event_type = event.event_type(),
                    "failed to deliver notification: {}",
                    err
                );
            }
        }
    }

    async fn deliver(&self, event: &DomainEvent) -> Result<(), ServiceError> {
        match event {
            DomainEvent::JobPosted { job_id, title } => {
                tracing::info!(%job_id, "job posted: {}", title);
                self.store(
                    None,
                    event.event_type(),
                    Some(*job_id),
                    Some(serde_json::json!({ "title": title })),
                    format!("New job available: {}", title),
                )
                .await
            }
            DomainEvent::BidSubmitted {
                job_id,
                bid_id,
                customer_id,
                vendor_id,
                amount_pence,
            } => {
                self.store(
                    Some(*customer_id),
                    event.event_type(),
                    Some(*job_id),
                    Some(serde_json::json!({
                        "bid_id": bid_id,
                        "vendor_id": vendor_id,
                        "amount_pence": amount_pence,
                    })),
                    format!("New bid of {} on your job", format_pence(*amount_pence)),
                )
                .await
            }
            DomainEvent::BidAccepted {
                job_id,
                bid_id,
                vendor_id,
                title,
            } => {
                self.store(
                    Some(*vendor_id),
                    event.event_type(),
                    Some(*job_id),
                    Some(serde_json::json!({ "bid_id": bid_id })),
                    format!("Your bid was accepted — you are assigned to: {}", title),
                )
                .await
            }
            DomainEvent::BidRejected {
                job_id,
                bid_id,
                vendor_id,
                title,
            } => {
                self.store(
                    Some(*vendor_id),
                    event.event_type(),
                    Some(*job_id),
                    Some(serde_json::json!({ "bid_id": bid_id })),
                    format!("Your bid was not selected for: {}", title),
                )
                .await
            }
            DomainEvent::CompletionRequested {
                job_id,
                customer_id,
                vendor_id,
                settlement_method,
            } => {
                self.store(
                    Some(*customer_id),
                    event.event_type(),
                    Some(*job_id),
                    Some(serde_json::json!({
                        "vendor_id": vendor_id,
                        "settlement_method": settlement_method,
                    })),
                    "The vendor marked the work as done — please review and approve".to_string(),
                )
                .await
            }
            DomainEvent::JobApproved {
                job_id,
                vendor_id,
                title,
            } => {
                self.store(
                    Some(*vendor_id),
                    event.event_type(),
                    Some(*job_id),
                    None,
                    format!("Job completed: {}", title),
                )
                .await
            }
            DomainEvent::JobCancelled {
                job_id,
                vendor_id,
                title,
                reason,
            } => {
                // Only the assigned vendor (if any) is told; open jobs die quietly.
                if let Some(vendor_id) = vendor_id {
                    self.store(
                        Some(*vendor_id),
                        event.event_type(),
                        Some(*job_id),
                        Some(serde_json::json!({ "reason": reason })),
                        format!("Job cancelled: {}", title),
                    )
                    .await
                } else {
                    Ok(())
                }
            }
            DomainEvent::PaymentFunded {
                payment_id,
                job_id,
                vendor_id,
                amount_pence,
            } => {
                self.store(
                    Some(*vendor_id),
                    event.event_type(),
                    Some(*job_id),
                    Some(serde_json::json!({ "payment_id": payment_id })),
                    format!("{} is now held in escrow for your job", format_pence(*amount_pence)),
                )
                .await
            }
            DomainEvent::PaymentReleased {
                payment_id,
                job_id,
                vendor_id,
                net_amount_pence,
            } => {
                self.store(
                    Some(*vendor_id),
                    event.event_type(),
                    Some(*job_id),
                    Some(serde_json::json!({ "payment_id": payment_id })),
                    format!("Payment of {} released", format_pence(*net_amount_pence)),
                )
                .await
            }
            DomainEvent::PaymentRefunded {
                payment_id,
                job_id,
                customer_id,
                vendor_id,
                reason,
            } => {
                self.store(
                    Some(*customer_id),
                    event.event_type(),
                    Some(*job_id),
                    Some(serde_json::json!({ "payment_id": payment_id, "reason": reason })),
                    "Your escrow payment was refunded".to_string(),
                )
                .await?;
                self.store(
                    Some(*vendor_id),
                    event.event_type(),
                    Some(*job_id),
                    Some(serde_json::json!({ "payment_id": payment_id, "reason": reason })),
                    "The escrow payment for your job was refunded and the job is under dispute"
                        .to_string(),
                )
                .await
            }
            DomainEvent::PayoutRequested {
                payout_id,
                vendor_id,
                amount_pence,
            } => {
                self.store(
                    Some(*vendor_id),
                    event.event_type(),
                    None,
                    Some(serde_json::json!({ "payout_id": payout_id })),
                    format!("Payout request of {} received", format_pence(*amount_pence)),
                )
                .await
            }
            DomainEvent::PayoutApproved { payout_id, vendor_id } => {
                self.store(
                    Some(*vendor_id),
                    event.event_type(),
                    None,
                    Some(serde_json::json!({ "payout_id": payout_id })),
                    "Your payout request was approved".to_string(),
                )
                .await
            }
            DomainEvent::PayoutRejected {
                payout_id,
                vendor_id,
                notes,
            } => {
                self.store(
                    Some(*vendor_id),
                    event.event_type(),
                    None,
                    Some(serde_json::json!({ "payout_id": payout_id, "notes": notes })),
                    "Your payout request was rejected".to_string(),
                )
                .await
            }
            DomainEvent::PayoutProcessed {
                payout_id,
                vendor_id,
                amount_pence,
                external_payout_id,
            } => {
                self.store(
                    Some(*vendor_id),
                    event.event_type(),
                    None,
                    Some(serde_json::json!({
                        "payout_id": payout_id,
                        "external_payout_id": external_payout_id,
                    })),
                    format!("Payout of {} is on its way", format_pence(*amount_pence)),
                )
                .await
            }
        }
    }

    async fn store(
        &self,
        user_id: Option<Uuid>,
        event_type: &str,
        job_id: Option<Uuid>,
        payload: Option<serde_json::Value>,
        message: String,
    ) -> Result<(), ServiceError> {
        self.db_client
            .store_notification(user_id, event_type, job_id, payload, message)
            .await
            .map_err(|e| ServiceError::Notification(e.to_string()))
    }

    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, ServiceError> {
        Ok(self
            .db_client
            .list_notifications(user_id, limit, offset)
            .await?)
    }

    pub async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> Result<(), ServiceError> {
        let touched = self
            .db_client
            .mark_notification_read(notification_id, user_id)
            .await?;

        if touched == 0 {
            return Err(ServiceError::Validation(
                "Notification not found".to_string(),
            ));
        }
        Ok(())
    }
}
