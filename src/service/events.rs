use uuid::Uuid;

use crate::models::jobmodel::SettlementMethod;

/// Side effects of core operations, emitted as values rather than woven
/// into the state machine. Services collect them during an operation and
/// hand them to the notification dispatcher after the transaction commits,
/// so the lifecycle logic stays testable without a dispatcher in the loop.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    JobPosted {
        job_id: Uuid,
        title: String,
    },
    BidSubmitted {
        job_id: Uuid,
        bid_id: Uuid,
        customer_id: Uuid,
        vendor_id: Uuid,
        amount_pence: i64,
    },
    BidAccepted {
        job_id: Uuid,
        bid_id: Uuid,
        vendor_id: Uuid,
        title: String,
    },
    BidRejected {
        job_id: Uuid,
        bid_id: Uuid,
        vendor_id: Uuid,
        title: String,
    },
    CompletionRequested {
        job_id: Uuid,
        customer_id: Uuid,
        vendor_id: Uuid,
        settlement_method: SettlementMethod,
    },
    JobApproved {
        job_id: Uuid,
        vendor_id: Uuid,
        title: String,
    },
    JobCancelled {
        job_id: Uuid,
        vendor_id: Option<Uuid>,
        title: String,
        reason: String,
    },
    PaymentFunded {
        payment_id: Uuid,
        job_id: Uuid,
        vendor_id: Uuid,
        amount_pence: i64,
    },
    PaymentReleased {
        payment_id: Uuid,
        job_id: Uuid,
        vendor_id: Uuid,
        net_amount_pence: i64,
    },
    PaymentRefunded {
        payment_id: Uuid,
        job_id: Uuid,
        customer_id: Uuid,
        vendor_id: Uuid,
        reason: String,
    },
    PayoutRequested {
        payout_id: Uuid,
        vendor_id: Uuid,
        amount_pence: i64,
    },
    PayoutApproved {
        payout_id: Uuid,
        vendor_id: Uuid,
    },
    PayoutRejected {
        payout_id: Uuid,
        vendor_id: Uuid,
        notes: String,
    },
    PayoutProcessed {
        payout_id: Uuid,
        vendor_id: Uuid,
        amount_pence: i64,
        external_payout_id: Option<String>,
    },
}

impl DomainEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::JobPosted { .. } => "job_posted",
            DomainEvent::BidSubmitted { .. } => "new_bid",
            DomainEvent::BidAccepted { .. } => "bid_accepted",
            DomainEvent::BidRejected { .. } => "bid_rejected",
            DomainEvent::CompletionRequested { .. } => "completion_requested",
            DomainEvent::JobApproved { .. } => "job_completed",
            DomainEvent::JobCancelled { .. } => "job_cancelled",
            DomainEvent::PaymentFunded { .. } => "payment_funded",
            DomainEvent::PaymentReleased { .. } => "payment_released",
            DomainEvent::PaymentRefunded { .. } => "payment_refunded",
            DomainEvent::PayoutRequested { .. } => "payout_requested",
            DomainEvent::PayoutApproved { .. } => "payout_approved",
            DomainEvent::PayoutRejected { .. } => "payout_rejected",
            DomainEvent::PayoutProcessed { .. } => "payout_processed",
        }
    }
}
