use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::modules::delivery::status::DeliveryStatus;
use crate::modules::message::{model::MessageResponse, schema::MessageEntity};

const USER_MESSAGES: &str = "/user/queue/messages";
const USER_TYPING: &str = "/user/queue/typing";
const GROUP_TOPIC: &str = "/topic/group/";
const GROUP_TYPING_TOPIC: &str = "/topic/typing/group/";

/// A subscribable destination.
///
/// User queues carry the owner so the registry can key them, but on the wire they are
/// addressed without it: each connection only ever sees its own queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    UserMessages(Uuid),
    UserTyping(Uuid),
    Group(Uuid),
    GroupTyping(Uuid),
}

impl Channel {
    pub fn destination(&self) -> String {
        match self {
            Channel::UserMessages(_) => USER_MESSAGES.to_string(),
            Channel::UserTyping(_) => USER_TYPING.to_string(),
            Channel::Group(id) => format!("{GROUP_TOPIC}{id}"),
            Channel::GroupTyping(id) => format!("{GROUP_TYPING_TOPIC}{id}"),
        }
    }

    /// Resolves a client destination; user queues resolve to `user_id`'s own queue.
    pub fn parse(destination: &str, user_id: Uuid) -> Option<Self> {
        let destination = destination.trim();
        if destination == USER_MESSAGES {
            return Some(Channel::UserMessages(user_id));
        }
        if destination == USER_TYPING {
            return Some(Channel::UserTyping(user_id));
        }
        if let Some(id) = destination.strip_prefix(GROUP_TYPING_TOPIC) {
            return id.parse().ok().map(Channel::GroupTyping);
        }
        if let Some(id) = destination.strip_prefix(GROUP_TOPIC) {
            return id.parse().ok().map(Channel::Group);
        }
        None
    }

    pub fn group_id(&self) -> Option<Uuid> {
        match *self {
            Channel::Group(id) | Channel::GroupTyping(id) => Some(id),
            Channel::UserMessages(_) | Channel::UserTyping(_) => None,
        }
    }
}

/// Private messages go to both parties (the sender's copy confirms the send),
/// group messages to the group topic.
pub fn message_targets(message: &MessageEntity) -> Vec<Channel> {
    match (message.receiver_id, message.group_id) {
        (_, Some(group_id)) => vec![Channel::Group(group_id)],
        (Some(receiver_id), None) if receiver_id == message.sender_id => {
            vec![Channel::UserMessages(receiver_id)]
        }
        (Some(receiver_id), None) => {
            vec![Channel::UserMessages(receiver_id), Channel::UserMessages(message.sender_id)]
        }
        (None, None) => Vec::new(),
    }
}

/// Group typing wins over a private receiver; with neither the indicator is dropped.
pub fn typing_target(receiver_id: Option<Uuid>, group_id: Option<Uuid>) -> Option<Channel> {
    match (group_id, receiver_id) {
        (Some(group_id), _) => Some(Channel::GroupTyping(group_id)),
        (None, Some(receiver_id)) => Some(Channel::UserTyping(receiver_id)),
        (None, None) => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub message_id: Uuid,
    pub status: DeliveryStatus,
    pub delivered_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
}

impl From<&MessageEntity> for Receipt {
    fn from(message: &MessageEntity) -> Self {
        Receipt {
            message_id: message.id,
            status: message.delivery_state().status(),
            delivered_at: message.delivered_at,
            read_at: message.read_at,
        }
    }
}

/// Payload pushed to subscribers of a channel.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum DeliveryEvent {
    NewMessage {
        message: MessageResponse,
    },
    MessageEdited {
        message: MessageResponse,
    },
    #[serde(rename_all = "camelCase")]
    MessageDeleted {
        message_id: Uuid,
    },
    StatusChanged {
        receipts: Vec<Receipt>,
    },
    #[serde(rename_all = "camelCase")]
    Typing {
        sender: String,
        group_id: Option<Uuid>,
        typing: bool,
    },
}
