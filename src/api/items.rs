//! Item and availability block endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::item::{Availability, CreateAvailability, CreateItem, Item, UpdateItem},
    services::items::page_bounds,
};

use super::{validate_body, AuthenticatedUser};

/// Pagination parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ItemsQuery {
    /// Page number (1-based)
    pub page: Option<i64>,
    /// Items per page (default: 20, max: 100)
    pub per_page: Option<i64>,
}

/// Paginated items response
#[derive(Serialize, ToSchema)]
pub struct ItemsListResponse {
    pub items: Vec<Item>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// List items, newest first
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    security(("bearer_auth" = [])),
    params(ItemsQuery),
    responses(
        (status = 200, description = "List of items", body = ItemsListResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_items(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<ItemsQuery>,
) -> AppResult<Json<ItemsListResponse>> {
    let (page, per_page) = page_bounds(query.page, query.per_page);
    let (items, total) = state.services.items.list(page, per_page).await?;

    Ok(Json(ItemsListResponse {
        items,
        total,
        page,
        per_page,
    }))
}

/// Get item details by ID
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item details", body = Item),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Item>> {
    let item = state.services.items.get(id).await?;
    Ok(Json(item))
}

/// List a new item owned by the caller
#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    security(("bearer_auth" = [])),
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_item(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateItem>,
) -> AppResult<(StatusCode, Json<Item>)> {
    validate_body(&data)?;
    let item = state.services.items.create(claims.user_id, &data).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Update an item (owner only)
#[utoipa::path(
    put,
    path = "/items/{id}",
    tag = "items",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Item ID")),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 403, description = "Not the item owner"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn update_item(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateItem>,
) -> AppResult<Json<Item>> {
    validate_body(&data)?;
    let item = state.services.items.update(id, claims.user_id, &data).await?;
    Ok(Json(item))
}

/// Delete an item (owner only)
#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "items",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 403, description = "Not the item owner"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn delete_item(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.items.delete(id, claims.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the unavailability windows of an item
#[utoipa::path(
    get,
    path = "/items/{id}/availabilities",
    tag = "items",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Blocked windows", body = Vec<Availability>),
        (status = 404, description = "Item not found")
    )
)]
pub async fn list_availabilities(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<Availability>>> {
    let blocks = state.services.items.list_availabilities(id).await?;
    Ok(Json(blocks))
}

/// Block a date window on an item (owner only)
#[utoipa::path(
    post,
    path = "/items/{id}/availabilities",
    tag = "items",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Item ID")),
    request_body = CreateAvailability,
    responses(
        (status = 201, description = "Window blocked", body = Availability),
        (status = 400, description = "Invalid dates"),
        (status = 403, description = "Not the item owner")
    )
)]
pub async fn create_availability(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<CreateAvailability>,
) -> AppResult<(StatusCode, Json<Availability>)> {
    let block = state
        .services
        .items
        .add_availability(id, claims.user_id, &data)
        .await?;
    Ok((StatusCode::CREATED, Json(block)))
}

/// Remove an unavailability window (owner only)
#[utoipa::path(
    delete,
    path = "/availabilities/{id}",
    tag = "items",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Availability ID")),
    responses(
        (status = 204, description = "Window removed"),
        (status = 403, description = "Not the item owner"),
        (status = 404, description = "Window not found")
    )
)]
pub async fn delete_availability(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state
        .services
        .items
        .delete_availability(id, claims.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
