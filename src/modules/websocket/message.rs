/// WebSocket frame protocol, JSON tagged by `type`.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::delivery::fanout::DeliveryEvent;
use crate::modules::message::model::ReplySnapshot;
use crate::utils::{bool_or_string, empty_as_none};

fn typing_default() -> bool {
    true
}

/// Frames sent by the client
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    Auth {
        token: String,
    },

    Subscribe {
        destination: String,
    },

    Unsubscribe {
        destination: String,
    },

    /// `sender` and `receiver` are usernames
    #[serde(rename = "private.send", rename_all = "camelCase")]
    PrivateSend {
        sender: String,
        receiver: String,
        content: String,
        #[serde(default, deserialize_with = "empty_as_none")]
        reply_to_id: Option<Uuid>,
        #[serde(default, deserialize_with = "empty_as_none")]
        reply_preview: Option<String>,
        #[serde(default, deserialize_with = "empty_as_none")]
        reply_sender_name: Option<String>,
    },

    #[serde(rename = "group.send", rename_all = "camelCase")]
    GroupSend {
        sender: String,
        group_id: Uuid,
        content: String,
        #[serde(default, deserialize_with = "empty_as_none")]
        reply_to_id: Option<Uuid>,
        #[serde(default, deserialize_with = "empty_as_none")]
        reply_preview: Option<String>,
        #[serde(default, deserialize_with = "empty_as_none")]
        reply_sender_name: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    Typing {
        sender: String,
        #[serde(default, deserialize_with = "empty_as_none")]
        receiver: Option<String>,
        #[serde(default, deserialize_with = "empty_as_none")]
        group_id: Option<Uuid>,
        #[serde(default = "typing_default", deserialize_with = "bool_or_string")]
        typing: bool,
    },

    Ping,
}

impl ClientMessage {
    pub fn reply(&self) -> ReplySnapshot {
        match self {
            ClientMessage::PrivateSend { reply_to_id, reply_preview, reply_sender_name, .. }
            | ClientMessage::GroupSend { reply_to_id, reply_preview, reply_sender_name, .. } => {
                ReplySnapshot {
                    reply_to_id: *reply_to_id,
                    preview: reply_preview.clone(),
                    sender_name: reply_sender_name.clone(),
                }
            }
            _ => ReplySnapshot::default(),
        }
    }
}

/// Frames sent by the server
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    AuthSuccess { user_id: Uuid, username: String },

    AuthFailed { reason: String },

    Subscribed { destination: String },

    /// A fan-out event for one of the connection's subscriptions
    Event { destination: String, event: DeliveryEvent },

    Pong,

    Error { message: String },
}
