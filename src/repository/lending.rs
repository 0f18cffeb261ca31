//! Lending requests repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult, AvailabilityConflict},
    models::{LendingRequest, LendingStatus, NewLendingRequest},
};

use super::LendingStore;

/// SQLSTATE raised by the `lending_requests_no_overlap` exclusion constraint
const EXCLUSION_VIOLATION: &str = "23P01";

#[derive(Clone)]
pub struct LendingRepository {
    pool: Pool<Postgres>,
}

impl LendingRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Two writers raced past the availability check; the database kept one.
fn map_write_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(EXCLUSION_VIOLATION) => {
            AppError::Conflict(AvailabilityConflict::RequestOverlap)
        }
        _ => AppError::Database(e),
    }
}

fn blocking_statuses() -> Vec<&'static str> {
    LendingStatus::date_blocking()
        .iter()
        .map(|s| s.as_str())
        .collect()
}

#[async_trait]
impl LendingStore for LendingRepository {
    async fn get(&self, request_id: i32) -> AppResult<LendingRequest> {
        sqlx::query_as::<_, LendingRequest>("SELECT * FROM lending_requests WHERE id = $1")
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Lending request with id {} not found", request_id))
            })
    }

    async fn active_for_item(&self, item_id: i32) -> AppResult<Vec<LendingRequest>> {
        let rows = sqlx::query_as::<_, LendingRequest>(
            r#"
            SELECT * FROM lending_requests
            WHERE item_id = $1 AND status = ANY($2)
            ORDER BY requested_from
            "#,
        )
        .bind(item_id)
        .bind(blocking_statuses())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert(&self, request: &NewLendingRequest) -> AppResult<LendingRequest> {
        let now = Utc::now();

        sqlx::query_as::<_, LendingRequest>(
            r#"
            INSERT INTO lending_requests (
                item_id, borrower_id, requested_from, requested_to,
                status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(request.item_id)
        .bind(request.borrower_id)
        .bind(request.range.from)
        .bind(request.range.to)
        .bind(LendingStatus::Pending)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn update(
        &self,
        request: &LendingRequest,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<LendingRequest> {
        let updated = sqlx::query_as::<_, LendingRequest>(
            r#"
            UPDATE lending_requests
            SET requested_from = $2, requested_to = $3, status = $4,
                approved_at = $5, returned_at = $6, updated_at = $7
            WHERE id = $1 AND updated_at = $8
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.requested_from)
        .bind(request.requested_to)
        .bind(request.status)
        .bind(request.approved_at)
        .bind(request.returned_at)
        .bind(request.updated_at)
        .bind(expected_updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        match updated {
            Some(row) => Ok(row),
            None => {
                // Distinguish a vanished row from a lost race
                self.get(request.id).await?;
                Err(AppError::ConcurrentUpdate(request.id))
            }
        }
    }

    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<LendingRequest>> {
        let rows = sqlx::query_as::<_, LendingRequest>(
            r#"
            SELECT lr.* FROM lending_requests lr
            JOIN items i ON i.id = lr.item_id
            WHERE lr.borrower_id = $1 OR i.owner_id = $1
            ORDER BY lr.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
