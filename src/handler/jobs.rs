use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::jobdtos::*,
    error::HttpError,
    middleware::AuthenticatedUser,
    models::usermodel::UserRole,
    AppState,
};

pub fn jobs_handler() -> Router {
    Router::new()
        // Job lifecycle
        .route("/", post(create_job))
        .route("/", get(search_jobs))
        .route("/mine", get(get_my_jobs))
        .route("/assigned", get(get_assigned_jobs))
        .route("/:job_id", get(get_job_details))
        .route("/:job_id", put(update_job))
        .route("/:job_id", delete(delete_job))
        .route("/:job_id/cancel", post(cancel_job))
        .route("/:job_id/complete", post(request_completion))
        .route("/:job_id/approve", post(approve_completion))
        // Bidding
        .route("/:job_id/bids", post(submit_bid))
        .route("/:job_id/bids", get(get_job_bids))
        .route("/:job_id/bids/:bid_id/accept", put(accept_bid))
}

pub fn bids_handler() -> Router {
    Router::new()
        .route("/mine", get(get_my_bids))
        .route("/:bid_id", put(update_bid))
        .route("/:bid_id", delete(withdraw_bid))
}

pub async fn create_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(body): Json<CreateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .job_service
        .create_job(auth.user.id, body)
        .await?;

    Ok(Json(ApiResponse::success("Job created successfully", job)))
}

pub async fn search_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<SearchJobsDto>,
) -> Result<impl IntoResponse, HttpError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).min(100);
    let offset = ((page - 1) * limit) as i64;

    let jobs = app_state
        .job_service
        .list_open_jobs(query.category, limit as i64, offset)
        .await?;

    Ok(Json(ApiResponse::success("Jobs retrieved successfully", jobs)))
}

pub async fn get_my_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state
        .job_service
        .list_customer_jobs(auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success("Jobs retrieved successfully", jobs)))
}

pub async fn get_assigned_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state
        .job_service
        .list_vendor_jobs(auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success("Jobs retrieved successfully", jobs)))
}

pub async fn get_job_details(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let (job, bid_count) = app_state.job_service.get_job(job_id).await?;

    Ok(Json(ApiResponse::success(
        "Job retrieved successfully",
        JobResponseDto::from_job(job, bid_count),
    )))
}

pub async fn update_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<UpdateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .job_service
        .update_job(job_id, auth.user.id, body)
        .await?;

    Ok(Json(ApiResponse::success("Job updated successfully", job)))
}

pub async fn delete_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .job_service
        .delete_job(job_id, auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success("Job deleted successfully", ())))
}

pub async fn cancel_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<CancelJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .job_service
        .cancel_job(job_id, auth.user.id, body.reason)
        .await?;

    Ok(Json(ApiResponse::success("Job cancelled successfully", job)))
}

/// Vendor marks the work as done and reports how they were settled.
pub async fn request_completion(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<CompleteJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .job_service
        .request_completion(job_id, auth.user.id, body.settlement_method)
        .await?;

    Ok(Json(ApiResponse::success(
        "Job submitted for approval",
        job,
    )))
}

/// Customer signs the work off; releases any escrowed payment.
pub async fn approve_completion(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .job_service
        .approve_completion(job_id, auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success("Job completed successfully", job)))
}

pub async fn submit_bid(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<SubmitBidDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if auth.user.role != UserRole::Vendor {
        return Err(HttpError::forbidden("Only vendors can bid on jobs"));
    }

    let bid = app_state
        .bidding_service
        .submit_bid(job_id, auth.user.id, body)
        .await?;

    Ok(Json(ApiResponse::success("Bid submitted successfully", bid)))
}

pub async fn get_job_bids(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let bids = app_state
        .bidding_service
        .list_bids_for_job(job_id, auth.user.id, auth.user.role == UserRole::Admin)
        .await?;

    Ok(Json(ApiResponse::success("Bids retrieved successfully", bids)))
}

pub async fn accept_bid(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path((job_id, bid_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpError> {
    let result = app_state
        .job_service
        .accept_bid(job_id, bid_id, auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success("Bid accepted successfully", result)))
}

pub async fn get_my_bids(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, HttpError> {
    let bids = app_state
        .bidding_service
        .list_vendor_bids(auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success("Bids retrieved successfully", bids)))
}

pub async fn update_bid(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(bid_id): Path<Uuid>,
    Json(body): Json<UpdateBidDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let bid = app_state
        .bidding_service
        .update_bid(bid_id, auth.user.id, body)
        .await?;

    Ok(Json(ApiResponse::success("Bid updated successfully", bid)))
}

pub async fn withdraw_bid(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(bid_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let bid = app_state
        .bidding_service
        .withdraw_bid(bid_id, auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success("Bid withdrawn successfully", bid)))
}
