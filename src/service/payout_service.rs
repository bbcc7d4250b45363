use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, paymentdb::PaymentExt, payoutdb::PayoutExt},
    dtos::paymentdtos::RequestPayoutDto,
    models::paymentmodel::*,
    service::{
        error::ServiceError, events::DomainEvent, notification_service::NotificationService,
        payout_provider::PayoutProviderService,
    },
};

/// Aggregates a vendor's released escrow payments into payout requests and
/// walks them through the admin approve/process flow.
#[derive(Debug, Clone)]
pub struct PayoutService {
    db_client: Arc<DBClient>,
    provider: Arc<PayoutProviderService>,
    notification_service: Arc<NotificationService>,
}

/// Pick sweep candidates in the order given until their net amounts cover
/// the target. Candidates arrive oldest release first (id as tie-break),
/// which makes the sweep deterministic: a 700 request over nets of 300 and
/// 500 consumes both.
pub fn select_for_sweep(candidates: &[(Uuid, i64)], target_pence: i64) -> (Vec<Uuid>, i64) {
    let mut picked = Vec::new();
    let mut total = 0i64;
    for (id, net) in candidates {
        if total >= target_pence {
            break;
        }
        picked.push(*id);
        total += net;
    }
    (picked, total)
}

impl PayoutService {
    pub fn new(
        db_client: Arc<DBClient>,
        provider: Arc<PayoutProviderService>,
        notification_service: Arc<NotificationService>,
    ) -> Self {
        Self {
            db_client,
            provider,
            notification_service,
        }
    }

    pub async fn available_balance(&self, vendor_id: Uuid) -> Result<i64, ServiceError> {
        Ok(self.db_client.available_balance(vendor_id).await?)
    }

    pub async fn request_payout(
        &self,
        vendor_id: Uuid,
        payout_data: RequestPayoutDto,
    ) -> Result<VendorPayout, ServiceError> {
        let available = self.db_client.available_balance(vendor_id).await?;
        if payout_data.amount_pence > available {
            return Err(ServiceError::InsufficientBalance {
                requested: payout_data.amount_pence,
                available,
            });
        }

        let payout = self
            .db_client
            .create_payout(vendor_id, payout_data.amount_pence, payout_data.method)
            .await?;

        self.notification_service
            .dispatch(&[DomainEvent::PayoutRequested {
                payout_id: payout.id,
                vendor_id,
                amount_pence: payout.amount_pence,
            }])
            .await;

        Ok(payout)
    }

    pub async fn approve_payout(
        &self,
        payout_id: Uuid,
        admin_notes: Option<String>,
    ) -> Result<VendorPayout, ServiceError> {
        let payout = self
            .db_client
            .get_payout_by_id(payout_id)
            .await?
            .ok_or(ServiceError::PayoutNotFound(payout_id))?;

        let approved = self
            .db_client
            .approve_payout(payout_id, admin_notes)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidState(format!(
                    "Payout {} is not pending (status: {})",
                    payout_id,
                    payout.status.to_str()
                ))
            })?;

        self.notification_service
            .dispatch(&[DomainEvent::PayoutApproved {
                payout_id,
                vendor_id: approved.vendor_id,
            }])
            .await;

        Ok(approved)
    }

    pub async fn reject_payout(
        &self,
        payout_id: Uuid,
        admin_notes: String,
    ) -> Result<VendorPayout, ServiceError> {
        let payout = self
            .db_client
            .get_payout_by_id(payout_id)
            .await?
            .ok_or(ServiceError::PayoutNotFound(payout_id))?;

        let rejected = self
            .db_client
            .reject_payout(payout_id, admin_notes.clone())
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidState(format!(
                    "Payout {} is not pending (status: {})",
                    payout_id,
                    payout.status.to_str()
                ))
            })?;

        self.notification_service
            .dispatch(&[DomainEvent::PayoutRejected {
                payout_id,
                vendor_id: rejected.vendor_id,
                notes: admin_notes,
            }])
            .await;

        Ok(rejected)
    }

    /// Send the funds over the configured rail, then mark the payout
    /// processed and sweep the vendor's unlinked released payments into it.
    /// A rail failure surfaces to the admin and leaves the payout approved
    /// for a retry; nothing is linked until the transfer goes through.
    pub async fn process_payout(&self, payout_id: Uuid) -> Result<VendorPayout, ServiceError> {
        let payout = self
            .db_client
            .get_payout_by_id(payout_id)
            .await?
            .ok_or(ServiceError::PayoutNotFound(payout_id))?;

        if payout.status != PayoutStatus::Approved {
            return Err(ServiceError::InvalidState(format!(
                "Payout {} is not approved (status: {})",
                payout_id,
                payout.status.to_str()
            )));
        }

        let external_payout_id = self
            .provider
            .send_funds(
                payout.amount_pence,
                "GBP",
                &payout.vendor_id.to_string(),
                payout.method,
            )
            .await?;

        let mut tx = self.db_client.pool.begin().await?;

        let processed = self
            .db_client
            .process_payout_tx(&mut tx, payout_id, Some(external_payout_id.clone()))
            .await?
            .ok_or_else(|| {
                // Lost a race after the rail call; surface it rather than
                // pretend the double transfer did not happen.
                ServiceError::Conflict(format!(
                    "Payout {} was processed concurrently (external ref {})",
                    payout_id, external_payout_id
                ))
            })?;

        let candidates = self
            .db_client
            .unlinked_released_payments_tx(&mut tx, processed.vendor_id)
            .await?;

        let pairs: Vec<(Uuid, i64)> = candidates
            .iter()
            .map(|p| (p.id, p.net_amount_pence))
            .collect();
        let (picked, linked_total) = select_for_sweep(&pairs, processed.amount_pence);

        if linked_total < processed.amount_pence {
            // Balance shrank since approval (e.g. a concurrent payout).
            // Rolls back the processed mark; the external reference is in
            // the error so the transfer can be reconciled by hand.
            return Err(ServiceError::Conflict(format!(
                "Vendor balance no longer covers payout {} (external ref {})",
                payout_id, external_payout_id
            )));
        }

        for payment_id in &picked {
            self.db_client
                .link_payment_to_payout_tx(&mut tx, *payment_id, payout_id)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            %payout_id,
            linked = picked.len(),
            linked_total_pence = linked_total,
            "payout processed"
        );

        self.notification_service
            .dispatch(&[DomainEvent::PayoutProcessed {
                payout_id,
                vendor_id: processed.vendor_id,
                amount_pence: processed.amount_pence,
                external_payout_id: processed.external_payout_id.clone(),
            }])
            .await;

        Ok(processed)
    }

    pub async fn list_vendor_payouts(
        &self,
        vendor_id: Uuid,
    ) -> Result<Vec<VendorPayout>, ServiceError> {
        Ok(self.db_client.list_vendor_payouts(vendor_id).await?)
    }

    pub async fn list_payouts_by_status(
        &self,
        status: PayoutStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<VendorPayout>, ServiceError> {
        Ok(self
            .db_client
            .list_payouts_by_status(status, limit, offset)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn sweep_consumes_both_when_neither_covers_alone() {
        // Released nets of 300 and 500 against a 700 request: both go.
        let candidates = vec![(id(1), 30000), (id(2), 50000)];
        let (picked, total) = select_for_sweep(&candidates, 70000);
        assert_eq!(picked, vec![id(1), id(2)]);
        assert_eq!(total, 80000);
    }

    #[test]
    fn sweep_stops_once_covered() {
        let candidates = vec![(id(1), 50000), (id(2), 30000), (id(3), 20000)];
        let (picked, total) = select_for_sweep(&candidates, 70000);
        assert_eq!(picked, vec![id(1), id(2)]);
        assert_eq!(total, 80000);
    }

    #[test]
    fn sweep_takes_oldest_first() {
        let candidates = vec![(id(1), 10000), (id(2), 70000)];
        let (picked, _) = select_for_sweep(&candidates, 70000);
        // The older 100 payment is consumed even though the newer one
        // covers the request alone.
        assert_eq!(picked, vec![id(1), id(2)]);
    }

    #[test]
    fn sweep_reports_shortfall() {
        let candidates = vec![(id(1), 30000)];
        let (picked, total) = select_for_sweep(&candidates, 70000);
        assert_eq!(picked, vec![id(1)]);
        assert!(total < 70000);
    }

    #[test]
    fn sweep_exact_cover() {
        let candidates = vec![(id(1), 30000), (id(2), 40000)];
        let (picked, total) = select_for_sweep(&candidates, 70000);
        assert_eq!(picked, vec![id(1), id(2)]);
        assert_eq!(total, 70000);
    }
}
