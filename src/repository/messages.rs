//! Messages repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::Message,
};

use super::{Inbox, MessageStore};

#[derive(Clone)]
pub struct MessagesRepository {
    pool: Pool<Postgres>,
}

impl MessagesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Inbox for MessagesRepository {
    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE sender_id = $1 OR recipient_id = $1
            ORDER BY time_stamp DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Message> {
        sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Message {} not found", id)))
    }

    async fn mark_read(&self, id: i32) -> AppResult<Message> {
        sqlx::query_as::<_, Message>(
            "UPDATE messages SET is_read = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Message {} not found", id)))
    }
}

#[async_trait]
impl MessageStore for MessagesRepository {
    async fn create(&self, sender_id: i32, recipient_id: i32, content: &str) -> AppResult<Message> {
        let row = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (sender_id, recipient_id, content, time_stamp, is_read)
            VALUES ($1, $2, $3, NOW(), FALSE)
            RETURNING *
            "#,
        )
        .bind(sender_id)
        .bind(recipient_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
