use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::modules::friend::schema::{FriendRequestEntity, FriendRequestStatus};
use crate::modules::user::{model::UserResponse, schema::UserEntity};

#[derive(Debug, Clone, Deserialize)]
pub struct RequestPath {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RespondQuery {
    pub accept: bool,
}

/// Pending request joined with its sender.
#[derive(Debug, Clone, FromRow)]
pub struct PendingRequestRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: FriendRequestStatus,
    pub created_at: DateTime<Utc>,
    pub sender_username: String,
    pub sender_created_at: DateTime<Utc>,
    pub sender_last_seen: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestResponse {
    pub id: Uuid,
    pub sender: UserResponse,
    pub receiver_id: Uuid,
    pub status: FriendRequestStatus,
    pub created_at: DateTime<Utc>,
}

impl FriendRequestResponse {
    pub fn new(request: FriendRequestEntity, sender: UserEntity) -> Self {
        FriendRequestResponse {
            id: request.id,
            sender: UserResponse::from(sender),
            receiver_id: request.receiver_id,
            status: request.status,
            created_at: request.created_at,
        }
    }
}

impl From<PendingRequestRow> for FriendRequestResponse {
    fn from(row: PendingRequestRow) -> Self {
        let sender = UserEntity {
            id: row.sender_id,
            username: row.sender_username,
            hash_password: String::new(),
            created_at: row.sender_created_at,
            last_seen: row.sender_last_seen,
        };
        FriendRequestResponse {
            id: row.id,
            sender: UserResponse::from(sender),
            receiver_id: row.receiver_id,
            status: row.status,
            created_at: row.created_at,
        }
    }
}
