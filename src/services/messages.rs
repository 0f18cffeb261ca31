//! Messaging between users

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{message::CreateMessage, Message},
    repository::{Inbox, MessageStore, UserStore},
};

#[derive(Clone)]
pub struct MessagesService {
    inbox: Arc<dyn Inbox>,
    outbox: Arc<dyn MessageStore>,
    users: Arc<dyn UserStore>,
}

impl MessagesService {
    pub fn new(
        inbox: Arc<dyn Inbox>,
        outbox: Arc<dyn MessageStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self { inbox, outbox, users }
    }

    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Message>> {
        self.inbox.list_for_user(user_id).await
    }

    pub async fn send(&self, sender_id: i32, data: &CreateMessage) -> AppResult<Message> {
        // Recipient must exist
        self.users.get_short(data.recipient_id).await?;
        self.outbox
            .create(sender_id, data.recipient_id, &data.content)
            .await
    }

    /// Fetch a message; reading it as the recipient marks it read
    pub async fn retrieve_and_mark_read(&self, id: i32, user_id: i32) -> AppResult<Message> {
        let message = self.inbox.get_by_id(id).await?;

        if message.sender_id != user_id && message.recipient_id != user_id {
            return Err(AppError::Authorization(
                "Not authorized to view this message".to_string(),
            ));
        }

        if message.recipient_id == user_id && !message.is_read {
            return self.inbox.mark_read(id).await;
        }

        Ok(message)
    }
}
