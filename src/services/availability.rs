//! Availability conflict checking for lending requests
//!
//! Pure functions over data fetched by the caller, so the rules can be
//! tested without storage.

use chrono::NaiveDate;

use crate::{
    error::{AvailabilityConflict, RequestViolation},
    models::{DateRange, Item, LendingRequest},
};

/// Validate a requested range on its own: ordered, not in the past,
/// and no longer than `max_days` when a limit is configured.
pub fn validate_dates(
    range: &DateRange,
    today: NaiveDate,
    max_days: Option<i64>,
) -> Result<(), RequestViolation> {
    let too_long = max_days.is_some_and(|max| range.span_days() > max);
    if range.from >= range.to || too_long {
        return Err(RequestViolation::InvalidDateRange);
    }
    if range.from < today {
        return Err(RequestViolation::PastDate);
    }
    Ok(())
}

/// Owners cannot borrow their own items
pub fn ensure_not_owner(item: &Item, borrower_id: i32) -> Result<(), RequestViolation> {
    if item.owner_id == borrower_id {
        return Err(RequestViolation::SelfBorrow);
    }
    Ok(())
}

/// Check whether `range` can be booked on `item`.
///
/// The checks run in order and stop at the first failure: the item's global
/// flag, then owner blocks, then requests still holding dates. `excluding`
/// skips the request being re-validated.
pub fn check_availability(
    item: &Item,
    range: &DateRange,
    blocks: &[DateRange],
    requests: &[LendingRequest],
    excluding: Option<i32>,
) -> Result<(), AvailabilityConflict> {
    if !item.is_available {
        return Err(AvailabilityConflict::ItemUnavailable);
    }

    if blocks.iter().any(|block| block.overlaps(range)) {
        return Err(AvailabilityConflict::OwnerBlocked);
    }

    let overlapping = requests
        .iter()
        .filter(|r| r.item_id == item.id)
        .filter(|r| Some(r.id) != excluding)
        .filter(|r| r.status.blocks_dates())
        .any(|r| r.range().overlaps(range));

    if overlapping {
        return Err(AvailabilityConflict::RequestOverlap);
    }

    Ok(())
}
