//! Shared domain enums stored as text columns

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Implements sqlx text (de)serialization through `as_str` / `FromStr`
macro_rules! text_column {
    ($ty:ty) => {
        impl sqlx::Type<Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $ty {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $ty {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// LendingStatus
// ---------------------------------------------------------------------------

/// Lifecycle of a lending request.
///
/// ```text
/// PENDING ──► APPROVED ──► ON_LOAN ──► COMPLETED
///    │            │  └────────────────►──┘
///    ├──► DENIED  └──► CANCELED
///    └──► CANCELED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LendingStatus {
    Pending,
    Approved,
    Denied,
    OnLoan,
    Completed,
    Canceled,
}

impl LendingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LendingStatus::Pending => "PENDING",
            LendingStatus::Approved => "APPROVED",
            LendingStatus::Denied => "DENIED",
            LendingStatus::OnLoan => "ON_LOAN",
            LendingStatus::Completed => "COMPLETED",
            LendingStatus::Canceled => "CANCELED",
        }
    }

    /// Statuses reachable in one step from this one
    pub fn successors(self) -> &'static [LendingStatus] {
        use LendingStatus::*;
        match self {
            Pending => &[Approved, Denied, Canceled],
            Approved => &[OnLoan, Completed, Canceled],
            OnLoan => &[Completed],
            Denied | Completed | Canceled => &[],
        }
    }

    pub fn can_transition_to(self, next: LendingStatus) -> bool {
        self.successors().contains(&next)
    }

    /// No transition may leave a terminal status
    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    /// Whether a request in this status holds its dates against other requests
    pub fn blocks_dates(self) -> bool {
        matches!(
            self,
            LendingStatus::Pending | LendingStatus::Approved | LendingStatus::OnLoan
        )
    }

    /// Statuses that hold dates, in storage form
    pub fn date_blocking() -> [LendingStatus; 3] {
        [LendingStatus::Pending, LendingStatus::Approved, LendingStatus::OnLoan]
    }
}

impl std::str::FromStr for LendingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(LendingStatus::Pending),
            "APPROVED" => Ok(LendingStatus::Approved),
            "DENIED" => Ok(LendingStatus::Denied),
            "ON_LOAN" => Ok(LendingStatus::OnLoan),
            "COMPLETED" => Ok(LendingStatus::Completed),
            "CANCELED" => Ok(LendingStatus::Canceled),
            _ => Err(format!("Invalid lending status: {}", s)),
        }
    }
}

text_column!(LendingStatus);

// ---------------------------------------------------------------------------
// ItemCondition
// ---------------------------------------------------------------------------

/// Physical condition declared by the item owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ItemCondition {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ItemCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCondition::Excellent => "Excellent",
            ItemCondition::Good => "Good",
            ItemCondition::Fair => "Fair",
            ItemCondition::Poor => "Poor",
        }
    }
}

impl std::str::FromStr for ItemCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "excellent" => Ok(ItemCondition::Excellent),
            "good" => Ok(ItemCondition::Good),
            "fair" => Ok(ItemCondition::Fair),
            "poor" => Ok(ItemCondition::Poor),
            _ => Err(format!("Invalid item condition: {}", s)),
        }
    }
}

text_column!(ItemCondition);
