//! Data models for LendShare

pub mod enums;
pub mod item;
pub mod lending;
pub mod message;
pub mod user;

// Re-export commonly used types
pub use enums::{ItemCondition, LendingStatus};
pub use item::{Availability, Item};
pub use lending::{DateRange, LendingRequest, NewLendingRequest};
pub use message::Message;
pub use user::{UserClaims, UserShort};
