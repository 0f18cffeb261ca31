//! Lending request model and date ranges

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::LendingStatus;

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Both ends are inclusive, so touching ranges overlap
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.from <= other.to && self.to >= other.from
    }

    /// Number of days between the two bounds
    pub fn span_days(&self) -> i64 {
        (self.to - self.from).num_days()
    }
}

/// Lending request from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LendingRequest {
    pub id: i32,
    pub item_id: i32,
    pub borrower_id: i32,
    pub requested_from: NaiveDate,
    pub requested_to: NaiveDate,
    pub status: LendingStatus,
    pub approved_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LendingRequest {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.requested_from, self.requested_to)
    }

    /// Move to `status`, stamping `approved_at` / `returned_at` the first time
    /// they are reached. Later saves never overwrite those stamps.
    pub fn apply_status(&mut self, status: LendingStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == LendingStatus::Approved && self.approved_at.is_none() {
            self.approved_at = Some(now);
        }
        if status == LendingStatus::Completed && self.returned_at.is_none() {
            self.returned_at = Some(now);
        }
        self.updated_at = now;
    }

    pub fn reschedule(&mut self, range: DateRange, now: DateTime<Utc>) {
        self.requested_from = range.from;
        self.requested_to = range.to;
        self.updated_at = now;
    }
}

/// Fields of a request about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewLendingRequest {
    pub item_id: i32,
    pub borrower_id: i32,
    pub range: DateRange,
}

/// Create lending request payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLendingRequest {
    pub item_id: i32,
    /// Pickup day (YYYY-MM-DD)
    pub requested_from: NaiveDate,
    /// Return day (YYYY-MM-DD)
    pub requested_to: NaiveDate,
}

/// Status change payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLendingStatus {
    pub status: LendingStatus,
}

/// Date change payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLendingDates {
    pub requested_from: NaiveDate,
    pub requested_to: NaiveDate,
}
