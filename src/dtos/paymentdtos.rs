use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::paymentmodel::*;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateEscrowPaymentDto {
    pub job_id: Uuid,

    #[validate(range(min = 1, message = "Amount must be positive"))]
    pub amount_pence: i64,

    pub method: PaymentMethod,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ProcessPaymentDto {
    #[validate(length(max = 255, message = "Transaction reference is too long"))]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RefundPaymentDto {
    #[validate(length(min = 1, max = 500, message = "Reason must be between 1 and 500 characters"))]
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RequestPayoutDto {
    #[validate(range(min = 1, message = "Amount must be positive"))]
    pub amount_pence: i64,

    pub method: PayoutMethod,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ApprovePayoutDto {
    #[validate(length(max = 1000, message = "Notes are too long"))]
    pub admin_notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RejectPayoutDto {
    #[validate(length(min = 1, max = 1000, message = "Notes must be between 1 and 1000 characters"))]
    pub admin_notes: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PayoutQueueDto {
    pub status: Option<PayoutStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponseDto {
    pub vendor_id: Uuid,
    pub available_pence: i64,
}
