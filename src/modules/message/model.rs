use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::error;
use crate::constants::MAX_MESSAGE_LENGTH;
use crate::modules::delivery::status::DeliveryStatus;
use crate::modules::message::schema::MessageEntity;
use crate::utils::empty_as_none;

/// Where a message goes. Exactly one destination per message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    User(Uuid),
    Group(Uuid),
}

impl Recipient {
    pub fn from_parts(
        receiver_id: Option<Uuid>,
        group_id: Option<Uuid>,
    ) -> Result<Self, error::SystemError> {
        match (receiver_id, group_id) {
            (Some(receiver), None) => Ok(Recipient::User(receiver)),
            (None, Some(group)) => Ok(Recipient::Group(group)),
            (Some(_), Some(_)) => Err(error::SystemError::bad_request(
                "A message targets either a receiver or a group, not both",
            )),
            (None, None) => {
                Err(error::SystemError::bad_request("A message needs a receiver or a group"))
            }
        }
    }

    pub fn receiver_id(&self) -> Option<Uuid> {
        match *self {
            Recipient::User(id) => Some(id),
            Recipient::Group(_) => None,
        }
    }

    pub fn group_id(&self) -> Option<Uuid> {
        match *self {
            Recipient::Group(id) => Some(id),
            Recipient::User(_) => None,
        }
    }
}

/// Quoted-message context, stored as the client sent it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplySnapshot {
    pub reply_to_id: Option<Uuid>,
    pub preview: Option<String>,
    pub sender_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InsertMessage {
    pub sender_id: Uuid,
    pub recipient: Recipient,
    pub content: String,
    pub reply: ReplySnapshot,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageBody {
    pub sender_id: Uuid,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub receiver_id: Option<Uuid>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub group_id: Option<Uuid>,
    #[validate(length(max = (MAX_MESSAGE_LENGTH as u64), message = "Message content is too long"))]
    pub content: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub reply_to_id: Option<Uuid>,
    pub reply_preview: Option<String>,
    pub reply_sender_name: Option<String>,
}

impl SendMessageBody {
    pub fn reply(&self) -> ReplySnapshot {
        ReplySnapshot {
            reply_to_id: self.reply_to_id,
            preview: self.reply_preview.clone(),
            sender_name: self.reply_sender_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EditMessageBody {
    #[validate(length(max = (MAX_MESSAGE_LENGTH as u64), message = "Message content is too long"))]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairQuery {
    pub user_id: Uuid,
    pub friend_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadAllQuery {
    pub user_id: Uuid,
    pub sender_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
    pub status: DeliveryStatus,
    pub reply_to_id: Option<Uuid>,
    pub reply_preview: Option<String>,
    pub reply_sender_name: Option<String>,
    pub edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
}

impl From<MessageEntity> for MessageResponse {
    fn from(entity: MessageEntity) -> Self {
        MessageResponse {
            status: entity.delivery_state().status(),
            id: entity.id,
            sender_id: entity.sender_id,
            receiver_id: entity.receiver_id,
            group_id: entity.group_id,
            content: entity.content,
            timestamp: entity.created_at,
            delivered_at: entity.delivered_at,
            read_at: entity.read_at,
            reply_to_id: entity.reply_to_id,
            reply_preview: entity.reply_preview,
            reply_sender_name: entity.reply_sender_name,
            edited: entity.edited,
            edited_at: entity.edited_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedMessage {
    pub deleted: Uuid,
}
