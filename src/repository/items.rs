//! Items repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::item::{CreateItem, Item, UpdateItem},
};

use super::{ItemCatalog, ItemStore};

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Postgres>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Row offset of a 1-based page, saturating instead of overflowing
pub(crate) fn page_offset(page: i64, per_page: i64) -> i64 {
    page.saturating_sub(1).max(0).saturating_mul(per_page)
}

#[async_trait]
impl ItemCatalog for ItemsRepository {
    async fn list(&self, page: i64, per_page: i64) -> AppResult<(Vec<Item>, i64)> {
        let offset = page_offset(page, per_page);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, Item>(
            "SELECT * FROM items ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((items, total))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Item> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }

    async fn create(&self, owner_id: i32, data: &CreateItem) -> AppResult<Item> {
        let now = Utc::now();

        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (owner_id, name, description, condition, location, is_available, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.condition)
        .bind(&data.location)
        .bind(data.is_available.unwrap_or(true))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    /// Only provided fields change
    async fn update(&self, id: i32, data: &UpdateItem) -> AppResult<Item> {
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_f {
            ($field:expr, $name:expr) => {
                if $field.is_some() { sets.push(format!("{} = ${}", $name, idx)); idx += 1; }
            };
        }

        add_f!(data.name, "name");
        add_f!(data.description, "description");
        add_f!(data.condition, "condition");
        add_f!(data.location, "location");
        add_f!(data.is_available, "is_available");

        let query = format!(
            "UPDATE items SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Item>(&query).bind(Utc::now());

        macro_rules! bind_f {
            ($field:expr) => {
                if let Some(ref val) = $field { builder = builder.bind(val); }
            };
        }

        bind_f!(data.name);
        bind_f!(data.description);
        bind_f!(data.condition);
        bind_f!(data.location);
        bind_f!(data.is_available);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }

    /// Availability blocks and requests cascade
    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Item with id {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl ItemStore for ItemsRepository {
    async fn get(&self, item_id: i32) -> AppResult<Item> {
        self.get_by_id(item_id).await
    }
}
