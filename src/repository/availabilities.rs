//! Availability blocks repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        item::{Availability, CreateAvailability},
        DateRange,
    },
};

use super::{AvailabilityStore, BlockStore};

#[derive(Clone)]
pub struct AvailabilitiesRepository {
    pool: Pool<Postgres>,
}

impl AvailabilitiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlockStore for AvailabilitiesRepository {
    /// Blocks declared for an item, earliest first
    async fn list_for_item(&self, item_id: i32) -> AppResult<Vec<Availability>> {
        let rows = sqlx::query_as::<_, Availability>(
            "SELECT * FROM availabilities WHERE item_id = $1 ORDER BY unavailable_from",
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Availability> {
        sqlx::query_as::<_, Availability>("SELECT * FROM availabilities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Availability {} not found", id)))
    }

    async fn create(&self, item_id: i32, data: &CreateAvailability) -> AppResult<Availability> {
        let row = sqlx::query_as::<_, Availability>(
            r#"
            INSERT INTO availabilities (item_id, unavailable_from, unavailable_to)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(data.unavailable_from)
        .bind(data.unavailable_to)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM availabilities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Availability {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl AvailabilityStore for AvailabilitiesRepository {
    async fn blocks_for(&self, item_id: i32) -> AppResult<Vec<DateRange>> {
        let blocks = self.list_for_item(item_id).await?;
        Ok(blocks.iter().map(Availability::range).collect())
    }
}
