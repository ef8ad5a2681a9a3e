//! Port interfaces consumed by the engine.
//!
//! The engine is synchronous and CPU-bound, so these seams are plain traits.
//! Infrastructure provides file-backed implementations; tests provide
//! in-memory ones.

use crate::domain::errors::StoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One user correction: "this description belongs to that category".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub description: String,
    pub category: String,
}

/// Durable append-only store of user feedback.
pub trait FeedbackStore: Send + Sync {
    /// Append a record. Appending an exact duplicate is a no-op; the store
    /// never overwrites.
    fn append(&self, record: &FeedbackRecord) -> Result<(), StoreError>;

    /// All records in insertion order.
    fn load_all(&self) -> Result<Vec<FeedbackRecord>, StoreError>;
}

/// Load/save of the serialized model artifact. The artifact is opaque bytes
/// to the store; versioning and atomic replacement are the caller's concern.
pub trait ModelStore: Send + Sync {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError>;
    fn save(&self, artifact: &[u8]) -> Result<(), StoreError>;
}

/// Regional holiday lookup.
pub trait HolidayCalendar: Send + Sync {
    fn is_holiday(&self, date: NaiveDate) -> bool;
}
