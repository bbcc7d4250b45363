use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{jobdtos::ApiResponse, paymentdtos::*},
    error::HttpError,
    middleware::{require_admin, AuthenticatedUser},
    models::{paymentmodel::PayoutStatus, usermodel::UserRole},
    AppState,
};

pub fn payouts_handler() -> Router {
    Router::new()
        .route("/", post(request_payout))
        .route("/balance", get(get_balance))
        .route("/mine", get(get_my_payouts))
        .route("/queue", get(get_payout_queue))
        .route("/:payout_id/approve", put(approve_payout))
        .route("/:payout_id/reject", put(reject_payout))
        .route("/:payout_id/process", post(process_payout))
}

pub async fn request_payout(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(body): Json<RequestPayoutDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if auth.user.role != UserRole::Vendor {
        return Err(HttpError::forbidden("Only vendors can request payouts"));
    }

    let payout = app_state
        .payout_service
        .request_payout(auth.user.id, body)
        .await?;

    Ok(Json(ApiResponse::success(
        "Payout requested successfully",
        payout,
    )))
}

pub async fn get_balance(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, HttpError> {
    let available_pence = app_state
        .payout_service
        .available_balance(auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Balance retrieved successfully",
        BalanceResponseDto {
            vendor_id: auth.user.id,
            available_pence,
        },
    )))
}

pub async fn get_my_payouts(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, HttpError> {
    let payouts = app_state
        .payout_service
        .list_vendor_payouts(auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Payouts retrieved successfully",
        payouts,
    )))
}

pub async fn get_payout_queue(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<PayoutQueueDto>,
) -> Result<impl IntoResponse, HttpError> {
    require_admin(&auth.user)?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).min(100);
    let offset = ((page - 1) * limit) as i64;

    let payouts = app_state
        .payout_service
        .list_payouts_by_status(
            query.status.unwrap_or(PayoutStatus::Pending),
            limit as i64,
            offset,
        )
        .await?;

    Ok(Json(ApiResponse::success(
        "Payouts retrieved successfully",
        payouts,
    )))
}

pub async fn approve_payout(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(payout_id): Path<Uuid>,
    Json(body): Json<ApprovePayoutDto>,
) -> Result<impl IntoResponse, HttpError> {
    require_admin(&auth.user)?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let payout = app_state
        .payout_service
        .approve_payout(payout_id, body.admin_notes)
        .await?;

    Ok(Json(ApiResponse::success(
        "Payout approved successfully",
        payout,
    )))
}

pub async fn reject_payout(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(payout_id): Path<Uuid>,
    Json(body): Json<RejectPayoutDto>,
) -> Result<impl IntoResponse, HttpError> {
    require_admin(&auth.user)?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let payout = app_state
        .payout_service
        .reject_payout(payout_id, body.admin_notes)
        .await?;

    Ok(Json(ApiResponse::success(
        "Payout rejected",
        payout,
    )))
}

pub async fn process_payout(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(payout_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    require_admin(&auth.user)?;

    let payout = app_state.payout_service.process_payout(payout_id).await?;

    Ok(Json(ApiResponse::success(
        "Payout processed successfully",
        payout,
    )))
}
