//! Lending request lifecycle
//!
//! Creation, status transitions and date changes all run the same
//! check-then-write sequence while holding the item's lock, so two
//! callers can never both pass the availability check for one item.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{NaiveDate, Utc};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{DateRange, Item, LendingRequest, LendingStatus, NewLendingRequest},
    repository::{AvailabilityStore, ItemStore, LendingStore, MessageStore, UserStore},
};

use super::{
    availability::{check_availability, ensure_not_owner, validate_dates},
    notifications::{derive_notification, NotificationEmitter},
};

/// Per-item async locks held across check-then-write sequences
#[derive(Clone, Default)]
pub struct ItemLocks {
    locks: Arc<Mutex<HashMap<i32, Arc<AsyncMutex<()>>>>>,
}

impl ItemLocks {
    pub async fn acquire(&self, item_id: i32) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Drop locks nobody holds or waits on
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            locks.entry(item_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// Role of the acting user on a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Owner,
    Borrower,
}

impl Party {
    pub fn of(item: &Item, request: &LendingRequest, user_id: i32) -> Option<Party> {
        if item.owner_id == user_id {
            Some(Party::Owner)
        } else if request.borrower_id == user_id {
            Some(Party::Borrower)
        } else {
            None
        }
    }

    /// Whether this party may move a request into `next`
    pub fn may_set(self, next: LendingStatus) -> bool {
        match next {
            LendingStatus::Approved | LendingStatus::Denied => self == Party::Owner,
            LendingStatus::Canceled => self == Party::Borrower,
            LendingStatus::OnLoan | LendingStatus::Completed => true,
            LendingStatus::Pending => false,
        }
    }
}

/// Check a status change against the transition table and the actor's role.
///
/// Terminal requests are rejected before the actor is considered.
pub fn authorize_transition(
    request: &LendingRequest,
    party: Option<Party>,
    next: LendingStatus,
) -> AppResult<()> {
    let current = request.status;
    if current.is_terminal() {
        return Err(AppError::InvalidTransition { from: current, to: next });
    }

    let party = party.ok_or_else(|| {
        AppError::Authorization("Only the item owner or the borrower can update this request".to_string())
    })?;

    if current == next {
        return Ok(());
    }

    if !current.can_transition_to(next) {
        return Err(AppError::InvalidTransition { from: current, to: next });
    }

    if !party.may_set(next) {
        let who = match next {
            LendingStatus::Canceled => "the borrower",
            _ => "the item owner",
        };
        return Err(AppError::Authorization(format!(
            "Only {} can mark a request as {}",
            who, next
        )));
    }

    Ok(())
}

#[derive(Clone)]
pub struct LendingService {
    items: Arc<dyn ItemStore>,
    availability: Arc<dyn AvailabilityStore>,
    requests: Arc<dyn LendingStore>,
    users: Arc<dyn UserStore>,
    notifier: NotificationEmitter,
    locks: ItemLocks,
    config: LendingConfig,
}

impl LendingService {
    pub fn new(
        items: Arc<dyn ItemStore>,
        availability: Arc<dyn AvailabilityStore>,
        requests: Arc<dyn LendingStore>,
        messages: Arc<dyn MessageStore>,
        users: Arc<dyn UserStore>,
        config: LendingConfig,
    ) -> Self {
        Self {
            items,
            availability,
            requests,
            users,
            notifier: NotificationEmitter::new(messages),
            locks: ItemLocks::default(),
            config,
        }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Run the availability checks for `range` on `item`
    async fn ensure_available(
        &self,
        item: &Item,
        range: &DateRange,
        excluding: Option<i32>,
    ) -> AppResult<()> {
        let blocks = self.availability.blocks_for(item.id).await?;
        let active = self.requests.active_for_item(item.id).await?;
        check_availability(item, range, &blocks, &active, excluding).map_err(|conflict| {
            tracing::debug!("Item {} unavailable for {:?}: {}", item.id, range, conflict);
            AppError::Conflict(conflict)
        })
    }

    /// Submit a new request; it starts out `PENDING`
    pub async fn create(
        &self,
        item_id: i32,
        borrower_id: i32,
        requested_from: NaiveDate,
        requested_to: NaiveDate,
    ) -> AppResult<LendingRequest> {
        let range = DateRange::new(requested_from, requested_to);
        validate_dates(&range, Self::today(), self.config.max_request_days)?;

        let item = self.items.get(item_id).await?;
        ensure_not_owner(&item, borrower_id)?;

        let _guard = self.locks.acquire(item.id).await;
        self.ensure_available(&item, &range, None).await?;

        let request = self
            .requests
            .insert(&NewLendingRequest {
                item_id: item.id,
                borrower_id,
                range,
            })
            .await?;

        tracing::info!(
            "Lending request {} created by user {} for item {} ({} to {})",
            request.id,
            borrower_id,
            item.id,
            requested_from,
            requested_to
        );

        Ok(request)
    }

    /// Move a request to `new_status` on behalf of `actor_id`
    pub async fn update_status(
        &self,
        request_id: i32,
        actor_id: i32,
        new_status: LendingStatus,
    ) -> AppResult<LendingRequest> {
        let item_id = self.requests.get(request_id).await?.item_id;
        let guard = self.locks.acquire(item_id).await;

        // Re-read under the lock
        let mut request = self.requests.get(request_id).await?;
        let item = self.items.get(request.item_id).await?;
        let party = Party::of(&item, &request, actor_id);

        if let Err(e) = authorize_transition(&request, party, new_status) {
            tracing::debug!(
                "User {} cannot move request {} from {} to {}: {}",
                actor_id,
                request_id,
                request.status,
                new_status,
                e
            );
            return Err(e);
        }

        let old_status = request.status;
        let expected = request.updated_at;
        request.apply_status(new_status, Utc::now());
        let saved = self.requests.update(&request, expected).await?;
        drop(guard);

        if old_status != new_status {
            tracing::info!(
                "Lending request {} moved from {} to {} by user {}",
                saved.id,
                old_status,
                new_status,
                actor_id
            );
            self.notify(old_status, &saved, &item, actor_id).await;
        }

        Ok(saved)
    }

    /// Change the dates of a request still holding them. Borrower only.
    pub async fn update_dates(
        &self,
        request_id: i32,
        actor_id: i32,
        requested_from: NaiveDate,
        requested_to: NaiveDate,
    ) -> AppResult<LendingRequest> {
        let item_id = self.requests.get(request_id).await?.item_id;
        let _guard = self.locks.acquire(item_id).await;

        let mut request = self.requests.get(request_id).await?;
        if request.status.is_terminal() {
            return Err(AppError::Authorization(format!(
                "Request {} is {} and can no longer be changed",
                request.id, request.status
            )));
        }

        let item = self.items.get(request.item_id).await?;
        if Party::of(&item, &request, actor_id) != Some(Party::Borrower) {
            return Err(AppError::Authorization(
                "Only the borrower can change the requested dates".to_string(),
            ));
        }

        // Dates are checked only once the caller may edit them
        let range = DateRange::new(requested_from, requested_to);
        validate_dates(&range, Self::today(), self.config.max_request_days)?;

        self.ensure_available(&item, &range, Some(request.id)).await?;

        let expected = request.updated_at;
        request.reschedule(range, Utc::now());
        let saved = self.requests.update(&request, expected).await?;

        tracing::info!(
            "Lending request {} rescheduled to {} - {}",
            saved.id,
            requested_from,
            requested_to
        );

        Ok(saved)
    }

    /// Get one request; only its two parties may see it
    pub async fn get(&self, request_id: i32, actor_id: i32) -> AppResult<LendingRequest> {
        let request = self.requests.get(request_id).await?;
        let item = self.items.get(request.item_id).await?;
        if Party::of(&item, &request, actor_id).is_none() {
            return Err(AppError::Authorization(
                "Only the item owner or the borrower can view this request".to_string(),
            ));
        }
        Ok(request)
    }

    /// Requests the user borrows or owns the item of
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<LendingRequest>> {
        self.requests.list_for_user(user_id).await
    }

    async fn notify(&self, old_status: LendingStatus, request: &LendingRequest, item: &Item, actor_id: i32) {
        let actor = match self.users.get_short(actor_id).await {
            Ok(actor) => actor,
            Err(e) => {
                tracing::warn!("Skipping notification for request {}: {}", request.id, e);
                return;
            }
        };

        if let Some(notification) = derive_notification(old_status, request, item, &actor) {
            self.notifier.emit(notification).await;
        }
    }
}
