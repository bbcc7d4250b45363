use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    InEscrow,
    /// Direct (non-escrow) settlement; never used for job escrow flows.
    Paid,
    Released,
    Refunded,
    Disputed,
}

impl PaymentStatus {
    pub fn to_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::InEscrow => "in_escrow",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Released => "released",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Disputed => "disputed",
        }
    }

    /// Monotonic: pending -> in_escrow -> {released | refunded}, with the
    /// disputed side-branch off in_escrow. No transition re-enters an
    /// earlier state.
    pub fn can_transition_to(&self, to: PaymentStatus) -> bool {
        match (self, to) {
            (PaymentStatus::Pending, PaymentStatus::InEscrow) => true,
            (PaymentStatus::Pending, PaymentStatus::Paid) => true,
            (PaymentStatus::InEscrow, PaymentStatus::Released) => true,
            (PaymentStatus::InEscrow, PaymentStatus::Refunded) => true,
            (PaymentStatus::InEscrow, PaymentStatus::Disputed) => true,
            (PaymentStatus::Disputed, PaymentStatus::Released) => true,
            (PaymentStatus::Disputed, PaymentStatus::Refunded) => true,
            _ => false,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Paid | PaymentStatus::Released | PaymentStatus::Refunded
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    BankTransfer,
    Wallet,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "payout_method", rename_all = "snake_case")]
pub enum PayoutMethod {
    BankTransfer,
    Paypal,
    Stripe,
}

impl PayoutMethod {
    pub fn to_str(&self) -> &str {
        match self {
            PayoutMethod::BankTransfer => "bank_transfer",
            PayoutMethod::Paypal => "paypal",
            PayoutMethod::Stripe => "stripe",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "payout_status", rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Approved,
    Processed,
    Rejected,
}

impl PayoutStatus {
    pub fn to_str(&self) -> &str {
        match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Approved => "approved",
            PayoutStatus::Processed => "processed",
            PayoutStatus::Rejected => "rejected",
        }
    }

    pub fn can_transition_to(&self, to: PayoutStatus) -> bool {
        matches!(
            (self, to),
            (PayoutStatus::Pending, PayoutStatus::Approved)
                | (PayoutStatus::Pending, PayoutStatus::Rejected)
                | (PayoutStatus::Approved, PayoutStatus::Processed)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub job_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub vendor_id: Uuid,
    pub amount_pence: i64,
    pub platform_fee_pence: i64,
    pub escrow_fee_pence: i64,
    pub net_amount_pence: i64,
    pub currency: String,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub is_escrow: bool,
    pub transaction_id: Option<String>,
    pub vendor_payout_id: Option<Uuid>,
    pub paid_at: Option<DateTime<Utc>>,
    pub released_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VendorPayout {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub amount_pence: i64,
    pub method: PayoutMethod,
    pub status: PayoutStatus,
    pub admin_notes: Option<String>,
    pub external_payout_id: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_is_monotonic() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::InEscrow));
        assert!(PaymentStatus::InEscrow.can_transition_to(PaymentStatus::Released));
        assert!(PaymentStatus::InEscrow.can_transition_to(PaymentStatus::Refunded));
        // No going back, no double-settlement.
        assert!(!PaymentStatus::Released.can_transition_to(PaymentStatus::Released));
        assert!(!PaymentStatus::Released.can_transition_to(PaymentStatus::Refunded));
        assert!(!PaymentStatus::Refunded.can_transition_to(PaymentStatus::InEscrow));
        assert!(!PaymentStatus::Pending.can_transition_to(PaymentStatus::Released));
    }

    #[test]
    fn dispute_branches_off_escrow_only() {
        assert!(PaymentStatus::InEscrow.can_transition_to(PaymentStatus::Disputed));
        assert!(!PaymentStatus::Pending.can_transition_to(PaymentStatus::Disputed));
        assert!(PaymentStatus::Disputed.can_transition_to(PaymentStatus::Refunded));
        assert!(PaymentStatus::Disputed.can_transition_to(PaymentStatus::Released));
    }

    #[test]
    fn payout_approval_and_rejection_exclude_each_other() {
        assert!(PayoutStatus::Pending.can_transition_to(PayoutStatus::Approved));
        assert!(PayoutStatus::Pending.can_transition_to(PayoutStatus::Rejected));
        assert!(!PayoutStatus::Rejected.can_transition_to(PayoutStatus::Approved));
        assert!(!PayoutStatus::Approved.can_transition_to(PayoutStatus::Rejected));
        assert!(PayoutStatus::Approved.can_transition_to(PayoutStatus::Processed));
        assert!(!PayoutStatus::Pending.can_transition_to(PayoutStatus::Processed));
        assert!(!PayoutStatus::Processed.can_transition_to(PayoutStatus::Approved));
    }
}
