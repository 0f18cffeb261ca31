//! In-memory stores for driving the lending service without a database

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};

use lendshare_server::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{DateRange, Item, ItemCondition, LendingRequest, LendingStatus, Message, NewLendingRequest, UserShort},
    repository::{AvailabilityStore, ItemStore, LendingStore, MessageStore, UserStore},
    services::lending::LendingService,
};

#[derive(Default)]
struct State {
    users: Vec<UserShort>,
    items: Vec<Item>,
    blocks: Vec<(i32, DateRange)>,
    requests: Vec<LendingRequest>,
    messages: Vec<Message>,
    fail_messages: bool,
}

/// Shared in-memory backing for every store trait
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn add_user(&self, id: i32, username: &str) {
        self.state.lock().unwrap().users.push(UserShort {
            id,
            username: username.to_string(),
        });
    }

    pub fn add_item(&self, id: i32, owner_id: i32, name: &str, is_available: bool) {
        let now = Utc::now();
        self.state.lock().unwrap().items.push(Item {
            id,
            owner_id,
            name: name.to_string(),
            description: String::new(),
            condition: ItemCondition::Good,
            location: String::new(),
            is_available,
            created_at: now,
            updated_at: now,
        });
    }

    pub fn block(&self, item_id: i32, from: NaiveDate, to: NaiveDate) {
        self.state
            .lock()
            .unwrap()
            .blocks
            .push((item_id, DateRange::new(from, to)));
    }

    pub fn fail_messages(&self) {
        self.state.lock().unwrap().fail_messages = true;
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state.lock().unwrap().messages.clone()
    }

    pub fn service(&self) -> LendingService {
        LendingService::new(
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            LendingConfig::default(),
        )
    }
}

/// Day `offset` days from today
pub fn day(offset: i64) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(offset)
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn get(&self, item_id: i32) -> AppResult<Item> {
        self.state
            .lock()
            .unwrap()
            .items
            .iter()
            .find(|i| i.id == item_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", item_id)))
    }
}

#[async_trait]
impl AvailabilityStore for MemoryStore {
    async fn blocks_for(&self, item_id: i32) -> AppResult<Vec<DateRange>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .blocks
            .iter()
            .filter(|(id, _)| *id == item_id)
            .map(|(_, range)| *range)
            .collect())
    }
}

#[async_trait]
impl LendingStore for MemoryStore {
    async fn get(&self, request_id: i32) -> AppResult<LendingRequest> {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .find(|r| r.id == request_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Lending request with id {} not found", request_id)))
    }

    async fn active_for_item(&self, item_id: i32) -> AppResult<Vec<LendingRequest>> {
        // Let other tasks run between the check and the write
        tokio::task::yield_now().await;
        Ok(self
            .state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.item_id == item_id && r.status.blocks_dates())
            .cloned()
            .collect())
    }

    async fn insert(&self, request: &NewLendingRequest) -> AppResult<LendingRequest> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let row = LendingRequest {
            id: state.requests.len() as i32 + 1,
            item_id: request.item_id,
            borrower_id: request.borrower_id,
            requested_from: request.range.from,
            requested_to: request.range.to,
            status: LendingStatus::Pending,
            approved_at: None,
            returned_at: None,
            created_at: now,
            updated_at: now,
        };
        state.requests.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        request: &LendingRequest,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<LendingRequest> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .requests
            .iter_mut()
            .find(|r| r.id == request.id)
            .ok_or_else(|| AppError::NotFound(format!("Lending request with id {} not found", request.id)))?;
        if stored.updated_at != expected_updated_at {
            return Err(AppError::ConcurrentUpdate(request.id));
        }
        *stored = request.clone();
        Ok(stored.clone())
    }

    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<LendingRequest>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<LendingRequest> = state
            .requests
            .iter()
            .filter(|r| {
                r.borrower_id == user_id
                    || state
                        .items
                        .iter()
                        .any(|i| i.id == r.item_id && i.owner_id == user_id)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn create(&self, sender_id: i32, recipient_id: i32, content: &str) -> AppResult<Message> {
        let mut state = self.state.lock().unwrap();
        if state.fail_messages {
            return Err(AppError::Internal("message store unavailable".to_string()));
        }
        let message = Message {
            id: state.messages.len() as i32 + 1,
            sender_id,
            recipient_id,
            content: content.to_string(),
            time_stamp: Utc::now(),
            is_read: false,
        };
        state.messages.push(message.clone());
        Ok(message)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_short(&self, user_id: i32) -> AppResult<UserShort> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))
    }
}
