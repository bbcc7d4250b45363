use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{jobdtos::ApiResponse, paymentdtos::*},
    error::HttpError,
    middleware::{require_admin, AuthenticatedUser},
    models::usermodel::UserRole,
    AppState,
};

pub fn payments_handler() -> Router {
    Router::new()
        .route("/escrow", post(create_escrow_payment))
        .route("/customer", get(get_customer_payments))
        .route("/vendor", get(get_vendor_payments))
        .route("/:payment_id", get(get_payment))
        .route("/:payment_id/process", post(process_payment))
        .route("/:payment_id/release", post(release_payment))
        .route("/:payment_id/refund", post(refund_payment))
}

pub async fn create_escrow_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(body): Json<CreateEscrowPaymentDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let payment = app_state
        .escrow_service
        .create_escrow_payment(auth.user.id, body)
        .await?;

    Ok(Json(ApiResponse::success(
        "Escrow payment created successfully",
        payment,
    )))
}

pub async fn process_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(payment_id): Path<Uuid>,
    Json(body): Json<ProcessPaymentDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let payment = app_state
        .escrow_service
        .process_payment(payment_id, auth.user.id, body.transaction_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Payment moved to escrow",
        payment,
    )))
}

/// Admin release; the customer-approval path releases automatically.
pub async fn release_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    require_admin(&auth.user)?;

    let payment = app_state.escrow_service.release_payment(payment_id).await?;

    Ok(Json(ApiResponse::success(
        "Payment released successfully",
        payment,
    )))
}

pub async fn refund_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(payment_id): Path<Uuid>,
    Json(body): Json<RefundPaymentDto>,
) -> Result<impl IntoResponse, HttpError> {
    require_admin(&auth.user)?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let payment = app_state
        .escrow_service
        .refund_payment(payment_id, body.reason)
        .await?;

    Ok(Json(ApiResponse::success(
        "Payment refunded; job is now under dispute",
        payment,
    )))
}

pub async fn get_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let payment = app_state
        .escrow_service
        .get_payment(payment_id, auth.user.id, auth.user.role == UserRole::Admin)
        .await?;

    Ok(Json(ApiResponse::success(
        "Payment retrieved successfully",
        payment,
    )))
}

pub async fn get_customer_payments(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, HttpError> {
    let payments = app_state
        .escrow_service
        .list_customer_payments(auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Payments retrieved successfully",
        payments,
    )))
}

pub async fn get_vendor_payments(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, HttpError> {
    let payments = app_state
        .escrow_service
        .list_vendor_payments(auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Payments retrieved successfully",
        payments,
    )))
}
