//! Direct messages between users

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Message from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Message {
    pub id: i32,
    pub sender_id: i32,
    pub recipient_id: i32,
    pub content: String,
    pub time_stamp: DateTime<Utc>,
    pub is_read: bool,
}

/// Send message request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMessage {
    pub recipient_id: i32,
    #[validate(length(min = 1, max = 4000))]
    pub content: String,
}
