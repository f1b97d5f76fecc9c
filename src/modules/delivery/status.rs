use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse receipt level reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Delivered,
    Read,
}

/// Receipt state of a single message.
///
/// Each variant carries exactly the timestamps that are known at that level, so a
/// message that was read always has a delivery time no later than its read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    Sent,
    Delivered { delivered_at: DateTime<Utc> },
    Read { delivered_at: DateTime<Utc>, read_at: DateTime<Utc> },
}

impl DeliveryState {
    /// Rebuilds the state from the stored receipt columns.
    ///
    /// A row that only has `read_at` (written before delivery receipts existed) is
    /// treated as delivered at the moment it was read.
    pub fn from_columns(
        delivered_at: Option<DateTime<Utc>>,
        read_at: Option<DateTime<Utc>>,
    ) -> Self {
        match (delivered_at, read_at) {
            (None, None) => DeliveryState::Sent,
            (Some(delivered_at), None) => DeliveryState::Delivered { delivered_at },
            (Some(delivered_at), Some(read_at)) => DeliveryState::Read { delivered_at, read_at },
            (None, Some(read_at)) => DeliveryState::Read { delivered_at: read_at, read_at },
        }
    }

    pub fn columns(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        match *self {
            DeliveryState::Sent => (None, None),
            DeliveryState::Delivered { delivered_at } => (Some(delivered_at), None),
            DeliveryState::Read { delivered_at, read_at } => (Some(delivered_at), Some(read_at)),
        }
    }

    pub fn status(&self) -> DeliveryStatus {
        match self {
            DeliveryState::Sent => DeliveryStatus::Sent,
            DeliveryState::Delivered { .. } => DeliveryStatus::Delivered,
            DeliveryState::Read { .. } => DeliveryStatus::Read,
        }
    }

    /// Moves forward to `target`, never backward.
    ///
    /// Returns the new state and whether anything changed. Timestamps that are already
    /// set are kept; reading an undelivered message stamps both with `now`.
    pub fn advance(self, target: DeliveryStatus, now: DateTime<Utc>) -> (Self, bool) {
        if target <= self.status() {
            return (self, false);
        }

        let next = match (self, target) {
            (DeliveryState::Sent, DeliveryStatus::Delivered) => {
                DeliveryState::Delivered { delivered_at: now }
            }
            (DeliveryState::Sent, DeliveryStatus::Read) => {
                DeliveryState::Read { delivered_at: now, read_at: now }
            }
            (DeliveryState::Delivered { delivered_at }, DeliveryStatus::Read) => {
                // clock skew must not produce read_at < delivered_at
                DeliveryState::Read { delivered_at, read_at: now.max(delivered_at) }
            }
            (state, _) => state,
        };

        (next, true)
    }
}
