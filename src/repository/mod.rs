//! Repository layer for database operations
//!
//! Services only talk to storage through the store traits below, so they
//! can run against Postgres, mocks or an in-memory double.

pub mod availabilities;
pub mod items;
pub mod lending;
pub mod messages;
pub mod users;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        item::{CreateAvailability, CreateItem, UpdateItem},
        Availability, DateRange, Item, LendingRequest, Message, NewLendingRequest, UserShort,
    },
};

/// Read access to items
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn get(&self, item_id: i32) -> AppResult<Item>;
}

/// Item listing management
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    /// Page of items, newest first, with the total count
    async fn list(&self, page: i64, per_page: i64) -> AppResult<(Vec<Item>, i64)>;

    async fn get_by_id(&self, id: i32) -> AppResult<Item>;

    async fn create(&self, owner_id: i32, data: &CreateItem) -> AppResult<Item>;

    async fn update(&self, id: i32, data: &UpdateItem) -> AppResult<Item>;

    async fn delete(&self, id: i32) -> AppResult<()>;
}

/// Management of the availability block rows themselves
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlockStore: Send + Sync {
    async fn list_for_item(&self, item_id: i32) -> AppResult<Vec<Availability>>;

    async fn get_by_id(&self, id: i32) -> AppResult<Availability>;

    async fn create(&self, item_id: i32, data: &CreateAvailability) -> AppResult<Availability>;

    async fn delete(&self, id: i32) -> AppResult<()>;
}

/// Read access to owner-declared unavailability windows
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    async fn blocks_for(&self, item_id: i32) -> AppResult<Vec<DateRange>>;
}

/// Persistence of lending requests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LendingStore: Send + Sync {
    async fn get(&self, request_id: i32) -> AppResult<LendingRequest>;

    /// Requests on the item whose status still holds dates
    async fn active_for_item(&self, item_id: i32) -> AppResult<Vec<LendingRequest>>;

    async fn insert(&self, request: &NewLendingRequest) -> AppResult<LendingRequest>;

    /// Write back a mutated request. Fails with `ConcurrentUpdate` when the
    /// stored `updated_at` no longer equals `expected_updated_at`.
    async fn update(
        &self,
        request: &LendingRequest,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<LendingRequest>;

    /// Requests where the user is the borrower or the item owner, newest first
    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<LendingRequest>>;
}

/// Message creation used for notifications
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn create(&self, sender_id: i32, recipient_id: i32, content: &str) -> AppResult<Message>;
}

/// Reading a user's messages
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Inbox: Send + Sync {
    /// Messages sent or received by the user, newest first
    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Message>>;

    async fn get_by_id(&self, id: i32) -> AppResult<Message>;

    async fn mark_read(&self, id: i32) -> AppResult<Message>;
}

/// User identity lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_short(&self, user_id: i32) -> AppResult<UserShort>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub items: items::ItemsRepository,
    pub availabilities: availabilities::AvailabilitiesRepository,
    pub lending: lending::LendingRepository,
    pub messages: messages::MessagesRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            items: items::ItemsRepository::new(pool.clone()),
            availabilities: availabilities::AvailabilitiesRepository::new(pool.clone()),
            lending: lending::LendingRepository::new(pool.clone()),
            messages: messages::MessagesRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }

    /// Check database connectivity
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
