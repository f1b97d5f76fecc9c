/// Messages exchanged between the session actors and the server actor.
use actix::prelude::*;
use uuid::Uuid;

use super::session::WebSocketSession;
use crate::modules::delivery::fanout::{Channel, DeliveryEvent};

#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub id: Uuid,
    pub addr: Addr<WebSocketSession>,
}

/// Drops the session and every subscription it held
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: Uuid,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Subscribe {
    pub session_id: Uuid,
    pub channel: Channel,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Unsubscribe {
    pub session_id: Uuid,
    pub channel: Channel,
}

/// Pushes an event to every session subscribed to `channel`
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct Publish {
    pub channel: Channel,
    pub event: DeliveryEvent,
}

/// Sent to a session by the socket loop once the connection is gone
#[derive(Message)]
#[rtype(result = "()")]
pub struct Close;
