use std::fmt;

use serde::{Deserialize, Serialize};

/// Ledger height: the number of confirmation events applied so far.
pub type Height = u64;

/// Unique identifier for a submitted intent (UUID v7 for time-ordering).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntentId(uuid::Uuid);

impl IntentId {
    /// Generate a new time-ordered intent ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Short representation (first 8 characters of the UUID).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for IntentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IntentId({})", self.short_id())
    }
}

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic identifier of a balance entry.
///
/// An entry is named by the block that produced it, the position of the
/// producing intent inside that block, and the output slot of the intent.
/// Ordering is therefore creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId {
    pub height: Height,
    pub index: u32,
    pub output: u32,
}

impl EntryId {
    pub const fn new(height: Height, index: u32, output: u32) -> Self {
        Self {
            height,
            index,
            output,
        }
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.height, self.index, self.output)
    }
}
