//! Status-change notifications sent as messages between the two parties

use std::sync::Arc;

use crate::{
    models::{Item, LendingRequest, LendingStatus, UserShort},
    repository::MessageStore,
};

/// Message to deliver after a status change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub sender_id: i32,
    pub recipient_id: i32,
    pub content: String,
}

/// Build the notification for a status change, if any.
///
/// `request` carries the new status; `actor` is the user who triggered it.
pub fn derive_notification(
    old_status: LendingStatus,
    request: &LendingRequest,
    item: &Item,
    actor: &UserShort,
) -> Option<Notification> {
    let new_status = request.status;
    if old_status == new_status {
        return None;
    }

    let owner = item.owner_id;
    let borrower = request.borrower_id;
    let other_party = if actor.id == borrower { owner } else { borrower };

    let (sender_id, recipient_id, content) = match new_status {
        LendingStatus::Approved => (
            owner,
            borrower,
            format!("Your request for '{}' has been APPROVED by the owner.", item.name),
        ),
        LendingStatus::Denied => (
            owner,
            borrower,
            format!("Your request for '{}' has been DENIED by the owner.", item.name),
        ),
        LendingStatus::OnLoan => (
            actor.id,
            other_party,
            format!("The item '{}' has been marked as ON LOAN by {}.", item.name, actor.username),
        ),
        LendingStatus::Completed => (
            actor.id,
            other_party,
            format!("The item '{}' has been marked as RETURNED by {}.", item.name, actor.username),
        ),
        LendingStatus::Canceled => (
            borrower,
            owner,
            format!("The request for '{}' was CANCELLED by the borrower.", item.name),
        ),
        LendingStatus::Pending => return None,
    };

    Some(Notification {
        sender_id,
        recipient_id,
        content,
    })
}

/// Best-effort delivery of notifications into the message store
#[derive(Clone)]
pub struct NotificationEmitter {
    messages: Arc<dyn MessageStore>,
}

impl NotificationEmitter {
    pub fn new(messages: Arc<dyn MessageStore>) -> Self {
        Self { messages }
    }

    /// Store the notification. Failures are logged and dropped; the status
    /// change that produced it has already been committed.
    pub async fn emit(&self, notification: Notification) {
        match self
            .messages
            .create(notification.sender_id, notification.recipient_id, &notification.content)
            .await
        {
            Ok(message) => tracing::debug!(
                "Notification {} sent from user {} to user {}",
                message.id,
                notification.sender_id,
                notification.recipient_id
            ),
            Err(e) => tracing::warn!(
                "Failed to send notification to user {}: {}",
                notification.recipient_id,
                e
            ),
        }
    }
}
