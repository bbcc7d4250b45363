use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "service_category", rename_all = "snake_case")]
pub enum ServiceCategory {
    Plumbing,
    Electrical,
    Carpentry,
    Painting,
    Cleaning,
    Gardening,
    Roofing,
    Flooring,
    ApplianceRepair,
    Removals,
    Other,
}

impl ServiceCategory {
    pub fn to_str(&self) -> &str {
        match self {
            ServiceCategory::Plumbing => "plumbing",
            ServiceCategory::Electrical => "electrical",
            ServiceCategory::Carpentry => "carpentry",
            ServiceCategory::Painting => "painting",
            ServiceCategory::Cleaning => "cleaning",
            ServiceCategory::Gardening => "gardening",
            ServiceCategory::Roofing => "roofing",
            ServiceCategory::Flooring => "flooring",
            ServiceCategory::ApplianceRepair => "appliance_repair",
            ServiceCategory::Removals => "removals",
            ServiceCategory::Other => "other",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "budget_type", rename_all = "snake_case")]
pub enum BudgetType {
    Fixed,
    Hourly,
    Negotiable,
}

/// How the vendor reports being settled when marking work done.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "settlement_method", rename_all = "snake_case")]
pub enum SettlementMethod {
    Cash,
    Venmo,
    Zelle,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    InProgress,
    PendingApproval,
    Completed,
    Cancelled,
    Disputed,
}

impl JobStatus {
    pub fn to_str(&self) -> &str {
        match self {
            JobStatus::Open => "open",
            JobStatus::InProgress => "in_progress",
            JobStatus::PendingApproval => "pending_approval",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Disputed => "disputed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }

    /// The lifecycle the store enforces with status-guarded updates.
    /// Disputed is reachable from any non-terminal state via admin refund.
    pub fn can_transition_to(&self, to: JobStatus) -> bool {
        match (self, to) {
            (JobStatus::Open, JobStatus::InProgress) => true,
            (JobStatus::Open, JobStatus::Cancelled) => true,
            (JobStatus::InProgress, JobStatus::PendingApproval) => true,
            (JobStatus::InProgress, JobStatus::Cancelled) => true,
            (JobStatus::PendingApproval, JobStatus::Completed) => true,
            (JobStatus::PendingApproval, JobStatus::Cancelled) => true,
            (from, JobStatus::Disputed) => !from.is_terminal() && *from != JobStatus::Disputed,
            _ => false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "bid_status", rename_all = "snake_case")]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

impl BidStatus {
    pub fn to_str(&self) -> &str {
        match self {
            BidStatus::Pending => "pending",
            BidStatus::Accepted => "accepted",
            BidStatus::Rejected => "rejected",
            BidStatus::Withdrawn => "withdrawn",
        }
    }

    /// Pending is the only mutable state; everything else is terminal.
    pub fn can_transition_to(&self, to: BidStatus) -> bool {
        matches!(
            (self, to),
            (BidStatus::Pending, BidStatus::Accepted)
                | (BidStatus::Pending, BidStatus::Rejected)
                | (BidStatus::Pending, BidStatus::Withdrawn)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub assigned_vendor_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub budget_pence: Option<i64>,
    pub budget_type: BudgetType,
    pub category: ServiceCategory,
    pub status: JobStatus,
    pub is_deleted: bool,
    pub settlement_method: Option<SettlementMethod>,
    pub payment_received: bool,
    pub payment_received_at: Option<DateTime<Utc>>,
    pub completion_date: Option<DateTime<Utc>>,
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: Uuid,
    pub job_id: Uuid,
    pub vendor_id: Uuid,
    pub amount_pence: i64,
    pub description: String,
    pub timeline_days: i32,
    pub status: BidStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_happy_path_transitions() {
        assert!(JobStatus::Open.can_transition_to(JobStatus::InProgress));
        assert!(JobStatus::InProgress.can_transition_to(JobStatus::PendingApproval));
        assert!(JobStatus::PendingApproval.can_transition_to(JobStatus::Completed));
    }

    #[test]
    fn job_cannot_skip_approval_phase() {
        assert!(!JobStatus::Open.can_transition_to(JobStatus::PendingApproval));
        assert!(!JobStatus::Open.can_transition_to(JobStatus::Completed));
        assert!(!JobStatus::InProgress.can_transition_to(JobStatus::Completed));
    }

    #[test]
    fn job_terminal_states_are_final() {
        for to in [
            JobStatus::Open,
            JobStatus::InProgress,
            JobStatus::PendingApproval,
            JobStatus::Cancelled,
            JobStatus::Disputed,
        ] {
            assert!(!JobStatus::Completed.can_transition_to(to));
            assert!(!JobStatus::Cancelled.can_transition_to(to));
        }
    }

    #[test]
    fn dispute_reachable_from_any_non_terminal() {
        assert!(JobStatus::Open.can_transition_to(JobStatus::Disputed));
        assert!(JobStatus::InProgress.can_transition_to(JobStatus::Disputed));
        assert!(JobStatus::PendingApproval.can_transition_to(JobStatus::Disputed));
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Disputed));
        assert!(!JobStatus::Cancelled.can_transition_to(JobStatus::Disputed));
        assert!(!JobStatus::Disputed.can_transition_to(JobStatus::Disputed));
    }

    #[test]
    fn bid_only_moves_out_of_pending() {
        assert!(BidStatus::Pending.can_transition_to(BidStatus::Accepted));
        assert!(BidStatus::Pending.can_transition_to(BidStatus::Withdrawn));
        assert!(!BidStatus::Accepted.can_transition_to(BidStatus::Rejected));
        assert!(!BidStatus::Withdrawn.can_transition_to(BidStatus::Accepted));
        assert!(!BidStatus::Rejected.can_transition_to(BidStatus::Pending));
    }
}
