//! Lending request endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::lending::{
        CreateLendingRequest, LendingRequest, UpdateLendingDates, UpdateLendingStatus,
    },
};

use super::AuthenticatedUser;

/// List requests where the caller is the borrower or the item owner
#[utoipa::path(
    get,
    path = "/lending-requests",
    tag = "lending",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Requests, newest first", body = Vec<LendingRequest>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LendingRequest>>> {
    let requests = state.services.lending.list_for_user(claims.user_id).await?;
    Ok(Json(requests))
}

/// Request to borrow an item
#[utoipa::path(
    post,
    path = "/lending-requests",
    tag = "lending",
    security(("bearer_auth" = [])),
    request_body = CreateLendingRequest,
    responses(
        (status = 201, description = "Request created as PENDING", body = LendingRequest),
        (status = 400, description = "Invalid dates or own item"),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Item unavailable for these dates")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateLendingRequest>,
) -> AppResult<(StatusCode, Json<LendingRequest>)> {
    let request = state
        .services
        .lending
        .create(data.item_id, claims.user_id, data.requested_from, data.requested_to)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Get a request (borrower or item owner only)
#[utoipa::path(
    get,
    path = "/lending-requests/{id}",
    tag = "lending",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Lending request ID")),
    responses(
        (status = 200, description = "Request details", body = LendingRequest),
        (status = 403, description = "Not a party to this request"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LendingRequest>> {
    let request = state.services.lending.get(id, claims.user_id).await?;
    Ok(Json(request))
}

/// Change the status of a request
#[utoipa::path(
    patch,
    path = "/lending-requests/{id}/status",
    tag = "lending",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Lending request ID")),
    request_body = UpdateLendingStatus,
    responses(
        (status = 200, description = "Status updated", body = LendingRequest),
        (status = 403, description = "Caller may not make this change"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Transition not allowed from the current status")
    )
)]
pub async fn update_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateLendingStatus>,
) -> AppResult<Json<LendingRequest>> {
    let request = state
        .services
        .lending
        .update_status(id, claims.user_id, data.status)
        .await?;
    Ok(Json(request))
}

/// Change the requested dates (borrower only)
#[utoipa::path(
    patch,
    path = "/lending-requests/{id}/dates",
    tag = "lending",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Lending request ID")),
    request_body = UpdateLendingDates,
    responses(
        (status = 200, description = "Dates updated", body = LendingRequest),
        (status = 400, description = "Invalid dates"),
        (status = 403, description = "Not the borrower, or request closed"),
        (status = 409, description = "Item unavailable for these dates")
    )
)]
pub async fn update_dates(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateLendingDates>,
) -> AppResult<Json<LendingRequest>> {
    let request = state
        .services
        .lending
        .update_dates(id, claims.user_id, data.requested_from, data.requested_to)
        .await?;
    Ok(Json(request))
}
