//! Item and availability block models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::ItemCondition;
use super::lending::DateRange;

/// Lendable item listed by its owner
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Item {
    pub id: i32,
    pub owner_id: i32,
    pub name: String,
    pub description: String,
    pub condition: ItemCondition,
    /// Simplified location for pickup/return
    pub location: String,
    /// Global switch; when false no request can be made
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create item request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateItem {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub condition: ItemCondition,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub location: String,
    pub is_available: Option<bool>,
}

/// Update item request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateItem {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub condition: Option<ItemCondition>,
    #[validate(length(max = 100))]
    pub location: Option<String>,
    pub is_available: Option<bool>,
}

/// Owner-declared window during which the item cannot be borrowed
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Availability {
    pub id: i32,
    pub item_id: i32,
    pub unavailable_from: NaiveDate,
    pub unavailable_to: NaiveDate,
}

impl Availability {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.unavailable_from, self.unavailable_to)
    }
}

/// Create availability block request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAvailability {
    /// First blocked day (YYYY-MM-DD, inclusive)
    pub unavailable_from: NaiveDate,
    /// Last blocked day (YYYY-MM-DD, inclusive)
    pub unavailable_to: NaiveDate,
}
