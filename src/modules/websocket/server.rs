/// WebSocket Server Actor
///
/// Owns every live session and the channel subscriptions. Being a single actor, all
/// registry mutation is serialized through its mailbox.
use actix::prelude::*;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::events::*;
use super::message::ServerMessage;
use super::session::WebSocketSession;
use crate::modules::delivery::fanout::{Channel, DeliveryEvent};
use crate::modules::delivery::publisher::Publisher;

/// Channel ↔ session bookkeeping, kept in both directions so a disconnect is cheap.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    subscribers: HashMap<Channel, HashSet<Uuid>>,
    subscriptions: HashMap<Uuid, HashSet<Channel>>,
}

impl SubscriptionRegistry {
    /// `false` if the session was already subscribed
    pub fn subscribe(&mut self, session_id: Uuid, channel: Channel) -> bool {
        self.subscriptions.entry(session_id).or_default().insert(channel);
        self.subscribers.entry(channel).or_default().insert(session_id)
    }

    pub fn unsubscribe(&mut self, session_id: Uuid, channel: Channel) -> bool {
        if let Some(channels) = self.subscriptions.get_mut(&session_id) {
            channels.remove(&channel);
            if channels.is_empty() {
                self.subscriptions.remove(&session_id);
            }
        }
        self.detach(session_id, channel)
    }

    /// Removes the session everywhere; returns how many subscriptions it had.
    pub fn remove_session(&mut self, session_id: Uuid) -> usize {
        let Some(channels) = self.subscriptions.remove(&session_id) else {
            return 0;
        };
        for channel in &channels {
            self.detach(session_id, *channel);
        }
        channels.len()
    }

    pub fn subscribers(&self, channel: &Channel) -> impl Iterator<Item = &Uuid> {
        self.subscribers.get(channel).into_iter().flatten()
    }

    fn detach(&mut self, session_id: Uuid, channel: Channel) -> bool {
        let Some(sessions) = self.subscribers.get_mut(&channel) else {
            return false;
        };
        let removed = sessions.remove(&session_id);
        if sessions.is_empty() {
            self.subscribers.remove(&channel);
        }
        removed
    }
}

#[derive(Default)]
pub struct WebSocketServer {
    /// session_id -> session actor
    sessions: HashMap<Uuid, Addr<WebSocketSession>>,
    registry: SubscriptionRegistry,
}

impl WebSocketServer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Actor for WebSocketServer {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("WebSocket server started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("WebSocket server stopped");
    }
}

impl Handler<Connect> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) {
        tracing::debug!("New WebSocket session connected: {}", msg.id);
        self.sessions.insert(msg.id, msg.addr);
    }
}

impl Handler<Disconnect> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        self.sessions.remove(&msg.id);
        let dropped = self.registry.remove_session(msg.id);
        tracing::debug!(
            "WebSocket session {} disconnected, {} subscription(s) dropped",
            msg.id,
            dropped
        );
    }
}

impl Handler<Subscribe> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Subscribe, _: &mut Context<Self>) {
        if !self.sessions.contains_key(&msg.session_id) {
            tracing::debug!("Ignoring subscribe from unknown session {}", msg.session_id);
            return;
        }
        if self.registry.subscribe(msg.session_id, msg.channel) {
            tracing::debug!("Session {} subscribed to {:?}", msg.session_id, msg.channel);
        }
    }
}

impl Handler<Unsubscribe> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Unsubscribe, _: &mut Context<Self>) {
        if self.registry.unsubscribe(msg.session_id, msg.channel) {
            tracing::debug!("Session {} unsubscribed from {:?}", msg.session_id, msg.channel);
        }
    }
}

impl Handler<Publish> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Publish, _: &mut Context<Self>) {
        let destination = msg.channel.destination();
        let mut sent_count = 0;

        for session_id in self.registry.subscribers(&msg.channel) {
            if let Some(addr) = self.sessions.get(session_id) {
                addr.do_send(ServerMessage::Event {
                    destination: destination.clone(),
                    event: msg.event.clone(),
                });
                sent_count += 1;
            }
        }

        tracing::debug!("Published to {:?}: {} session(s)", msg.channel, sent_count);
    }
}

impl Message for ServerMessage {
    type Result = ();
}

/// Fan-out through the server actor's mailbox. A full or closed mailbox drops the event.
impl Publisher for Addr<WebSocketServer> {
    fn publish(&self, channel: Channel, event: DeliveryEvent) {
        match self.try_send(Publish { channel, event }) {
            Ok(()) => {}
            Err(SendError::Full(_)) => {
                tracing::warn!("WebSocket server mailbox full, dropped event for {:?}", channel);
            }
            Err(SendError::Closed(_)) => {
                tracing::warn!("WebSocket server stopped, dropped event for {:?}", channel);
            }
        }
    }
}
