//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, items, lending, messages};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LendShare API",
        version = "0.1.0",
        description = "Peer-to-peer item lending REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Items
        items::list_items,
        items::get_item,
        items::create_item,
        items::update_item,
        items::delete_item,
        items::list_availabilities,
        items::create_availability,
        items::delete_availability,
        // Lending
        lending::list_requests,
        lending::create_request,
        lending::get_request,
        lending::update_status,
        lending::update_dates,
        // Messages
        messages::list_messages,
        messages::send_message,
        messages::get_message,
    ),
    components(
        schemas(
            // Items
            crate::models::item::Item,
            crate::models::item::CreateItem,
            crate::models::item::UpdateItem,
            crate::models::item::Availability,
            crate::models::item::CreateAvailability,
            crate::models::enums::ItemCondition,
            items::ItemsQuery,
            items::ItemsListResponse,
            // Lending
            crate::models::lending::LendingRequest,
            crate::models::lending::CreateLendingRequest,
            crate::models::lending::UpdateLendingStatus,
            crate::models::lending::UpdateLendingDates,
            crate::models::enums::LendingStatus,
            // Messages
            crate::models::message::Message,
            crate::models::message::CreateMessage,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "items", description = "Item listings and availability"),
        (name = "lending", description = "Lending request workflow"),
        (name = "messages", description = "User messages and notifications")
    )
)]
pub struct ApiDoc;

/// Registers the bearer JWT scheme referenced by secured paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
