use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::jobmodel::*;

// Job DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateJobDto {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,

    #[validate(length(
        min = 20,
        max = 2000,
        message = "Description must be between 20 and 2000 characters"
    ))]
    pub description: String,

    #[validate(range(min = 1, message = "Budget must be positive"))]
    pub budget_pence: Option<i64>,

    pub budget_type: BudgetType,

    pub category: ServiceCategory,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateJobDto {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: Option<String>,

    #[validate(length(
        min = 20,
        max = 2000,
        message = "Description must be between 20 and 2000 characters"
    ))]
    pub description: Option<String>,

    #[validate(range(min = 1, message = "Budget must be positive"))]
    pub budget_pence: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CancelJobDto {
    #[validate(length(min = 1, max = 500, message = "Reason must be between 1 and 500 characters"))]
    pub reason: String,
}

/// Vendor phase of completion; the settlement method is how the vendor
/// reports being paid outside escrow (cash in hand and the like).
#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteJobDto {
    pub settlement_method: Option<SettlementMethod>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchJobsDto {
    pub category: Option<ServiceCategory>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobResponseDto {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub assigned_vendor_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub budget_pence: Option<i64>,
    pub budget_type: BudgetType,
    pub category: ServiceCategory,
    pub status: JobStatus,
    pub settlement_method: Option<SettlementMethod>,
    pub payment_received: bool,
    pub completion_date: Option<DateTime<Utc>>,
    pub bid_count: i64,
    pub created_at: DateTime<Utc>,
}

impl JobResponseDto {
    pub fn from_job(job: Job, bid_count: i64) -> Self {
        Self {
            id: job.id,
            customer_id: job.customer_id,
            assigned_vendor_id: job.assigned_vendor_id,
            title: job.title,
            description: job.description,
            budget_pence: job.budget_pence,
            budget_type: job.budget_type,
            category: job.category,
            status: job.status,
            settlement_method: job.settlement_method,
            payment_received: job.payment_received,
            completion_date: job.completion_date,
            bid_count,
            created_at: job.created_at,
        }
    }
}

// Bid DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SubmitBidDto {
    #[validate(range(min = 1, message = "Bid amount must be positive"))]
    pub amount_pence: i64,

    #[validate(length(
        min = 10,
        max = 1000,
        message = "Description must be between 10 and 1000 characters"
    ))]
    pub description: String,

    #[validate(range(min = 1, max = 365, message = "Timeline must be between 1 and 365 days"))]
    pub timeline_days: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateBidDto {
    #[validate(range(min = 1, message = "Bid amount must be positive"))]
    pub amount_pence: Option<i64>,

    #[validate(length(
        min = 10,
        max = 1000,
        message = "Description must be between 10 and 1000 characters"
    ))]
    pub description: Option<String>,

    #[validate(range(min = 1, max = 365, message = "Timeline must be between 1 and 365 days"))]
    pub timeline_days: Option<i32>,
}

// Response wrappers
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }

    pub fn error(message: &str) -> ApiResponse<()> {
        ApiResponse {
            status: "error".to_string(),
            message: message.to_string(),
            data: None,
        }
    }
}
