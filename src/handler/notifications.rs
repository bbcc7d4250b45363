use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    dtos::jobdtos::ApiResponse, error::HttpError, middleware::AuthenticatedUser, AppState,
};

pub fn notifications_handler() -> Router {
    Router::new()
        .route("/", get(get_notifications))
        .route("/:notification_id/read", put(mark_notification_read))
}

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn get_notifications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<NotificationQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).min(100);
    let offset = ((page - 1) * limit) as i64;

    let notifications = app_state
        .notification_service
        .list_for_user(auth.user.id, limit as i64, offset)
        .await?;

    Ok(Json(ApiResponse::success(
        "Notifications retrieved successfully",
        notifications,
    )))
}

pub async fn mark_notification_read(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .notification_service
        .mark_read(notification_id, auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success("Notification marked as read", ())))
}
