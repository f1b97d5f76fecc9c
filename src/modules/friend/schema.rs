use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

use crate::api::error;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "friend_request_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FriendRequestStatus {
    /// PENDING resolves exactly once; ACCEPTED and REJECTED are terminal.
    pub fn respond(self, accept: bool) -> Result<Self, error::SystemError> {
        match self {
            FriendRequestStatus::Pending if accept => Ok(FriendRequestStatus::Accepted),
            FriendRequestStatus::Pending => Ok(FriendRequestStatus::Rejected),
            _ => Err(error::SystemError::invalid_state("Request already processed")),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestEntity {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: FriendRequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
