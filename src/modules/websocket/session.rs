/// WebSocket Session Actor
///
/// One actor per connection. It holds the authenticated identity, relays client frames
/// to the services and writes server frames to the socket through an mpsc channel
/// bridged in handler.rs. Service calls run inside `ctx.spawn()`.
use actix::prelude::*;
use actix_web::web;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::events::*;
use super::message::{ClientMessage, ServerMessage};
use super::server::WebSocketServer;
use crate::api::error;
use crate::modules::delivery::fanout::Channel;
use crate::modules::group::handle::GroupSvc;
use crate::modules::message::{handle::MessageSvc, model::ReplySnapshot};
use crate::modules::user::service::UserService;

struct Identity {
    user_id: Uuid,
    username: String,
}

pub struct WebSocketSession {
    pub id: Uuid,
    identity: Option<Identity>,
    server: Addr<WebSocketServer>,
    tx: mpsc::UnboundedSender<String>,
    user_service: web::Data<UserService>,
    message_service: web::Data<MessageSvc>,
    group_service: web::Data<GroupSvc>,
}

/// Text shown to the client for a failed operation; internal faults stay generic.
fn client_error(err: error::SystemError) -> ServerMessage {
    ServerMessage::Error { message: error::Error::from(err).to_string() }
}

impl WebSocketSession {
    pub fn new(
        server: Addr<WebSocketServer>,
        tx: mpsc::UnboundedSender<String>,
        user_service: web::Data<UserService>,
        message_service: web::Data<MessageSvc>,
        group_service: web::Data<GroupSvc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            identity: None,
            server,
            tx,
            user_service,
            message_service,
            group_service,
        }
    }

    fn send_to_client(&self, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(json) => {
                if let Err(e) = self.tx.send(json) {
                    tracing::error!("Failed to queue frame for session {}: {}", self.id, e);
                }
            }
            Err(e) => {
                tracing::error!("Failed to serialize frame for session {}: {}", self.id, e);
            }
        }
    }

    fn send_error(&self, message: &str) {
        self.send_to_client(&ServerMessage::Error { message: message.to_string() });
    }

    fn require_auth(&self) -> Option<(Uuid, String)> {
        match &self.identity {
            Some(identity) => Some((identity.user_id, identity.username.clone())),
            None => {
                self.send_error("Authenticate before sending this frame");
                tracing::warn!("Rejected frame on unauthenticated session {}", self.id);
                None
            }
        }
    }

    /// Frames carry the sender's username; it has to be the one the token was issued to.
    fn require_sender(&self, sender: &str) -> Option<(Uuid, String)> {
        let (user_id, username) = self.require_auth()?;
        if sender != username {
            self.send_error("Sender does not match the authenticated user");
            return None;
        }
        Some((user_id, username))
    }

    fn handle_client_message(&mut self, msg: ClientMessage, ctx: &mut Context<Self>) {
        match msg {
            ClientMessage::Auth { token } => self.handle_auth(&token, ctx),
            ClientMessage::Subscribe { destination } => self.handle_subscribe(&destination, ctx),
            ClientMessage::Unsubscribe { destination } => self.handle_unsubscribe(&destination),
            ClientMessage::PrivateSend { .. } => self.handle_private_send(msg, ctx),
            ClientMessage::GroupSend { .. } => self.handle_group_send(msg, ctx),
            ClientMessage::Typing { sender, receiver, group_id, typing } => {
                self.handle_typing(&sender, receiver, group_id, typing, ctx)
            }
            ClientMessage::Ping => {
                self.send_to_client(&ServerMessage::Pong);
                self.touch_heartbeat(ctx);
            }
        }
    }

    fn touch_heartbeat(&self, ctx: &mut Context<Self>) {
        let Some(identity) = &self.identity else {
            return;
        };
        let user_id = identity.user_id;
        let users = self.user_service.clone();
        ctx.spawn(
            async move {
                if let Err(e) = users.heartbeat(user_id).await {
                    tracing::warn!("Heartbeat update failed for user {}: {}", user_id, e);
                }
            }
            .into_actor(self),
        );
    }

    fn handle_auth(&mut self, token: &str, ctx: &mut Context<Self>) {
        if self.identity.is_some() {
            self.send_error("Session already authenticated");
            return;
        }

        let claims = match self.user_service.verify_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("JWT verification failed on session {}: {}", self.id, e);
                self.send_to_client(&ServerMessage::AuthFailed {
                    reason: "Invalid or expired token".to_string(),
                });
                return;
            }
        };

        let user_id = claims.sub;
        for channel in [Channel::UserMessages(user_id), Channel::UserTyping(user_id)] {
            self.server.do_send(Subscribe { session_id: self.id, channel });
        }
        self.identity = Some(Identity { user_id, username: claims.username.clone() });

        self.send_to_client(&ServerMessage::AuthSuccess { user_id, username: claims.username });
        self.touch_heartbeat(ctx);

        tracing::info!("User {} authenticated on session {}", user_id, self.id);
    }

    fn handle_subscribe(&mut self, destination: &str, ctx: &mut Context<Self>) {
        let Some((user_id, _)) = self.require_auth() else {
            return;
        };
        let Some(channel) = Channel::parse(destination, user_id) else {
            self.send_error(&format!("Unknown destination: {destination}"));
            return;
        };

        let Some(group_id) = channel.group_id() else {
            self.server.do_send(Subscribe { session_id: self.id, channel });
            self.send_to_client(&ServerMessage::Subscribed { destination: channel.destination() });
            return;
        };

        let groups = self.group_service.clone();
        ctx.spawn(async move { groups.is_member(group_id, user_id).await }.into_actor(self).map(
            move |result, act, _ctx| match result {
                Ok(true) => {
                    act.server.do_send(Subscribe { session_id: act.id, channel });
                    act.send_to_client(&ServerMessage::Subscribed {
                        destination: channel.destination(),
                    });
                }
                Ok(false) => act.send_error("Not a member of this group"),
                Err(e) => act.send_to_client(&client_error(e)),
            },
        ));
    }

    fn handle_unsubscribe(&self, destination: &str) {
        let Some((user_id, _)) = self.require_auth() else {
            return;
        };
        match Channel::parse(destination, user_id) {
            Some(channel) => self.server.do_send(Unsubscribe { session_id: self.id, channel }),
            None => self.send_error(&format!("Unknown destination: {destination}")),
        }
    }

    fn handle_private_send(&self, msg: ClientMessage, ctx: &mut Context<Self>) {
        let reply = msg.reply();
        let ClientMessage::PrivateSend { sender, receiver, content, .. } = msg else {
            return;
        };
        let Some((sender_id, _)) = self.require_sender(&sender) else {
            return;
        };

        let users = self.user_service.clone();
        let messages = self.message_service.clone();
        ctx.spawn(
            async move {
                let receiver = users.get_by_username(&receiver).await?;
                messages.send_private(sender_id, receiver.id, content, reply).await
            }
            .into_actor(self)
            .map(|result, act, _ctx| {
                if let Err(e) = result {
                    tracing::warn!("private.send failed on session {}: {}", act.id, e);
                    act.send_to_client(&client_error(e));
                }
            }),
        );
    }

    fn handle_group_send(&self, msg: ClientMessage, ctx: &mut Context<Self>) {
        let reply: ReplySnapshot = msg.reply();
        let ClientMessage::GroupSend { sender, group_id, content, .. } = msg else {
            return;
        };
        let Some((sender_id, _)) = self.require_sender(&sender) else {
            return;
        };

        let messages = self.message_service.clone();
        ctx.spawn(
            async move { messages.send_group(sender_id, group_id, content, reply).await }
                .into_actor(self)
                .map(|result, act, _ctx| {
                    if let Err(e) = result {
                        tracing::warn!("group.send failed on session {}: {}", act.id, e);
                        act.send_to_client(&client_error(e));
                    }
                }),
        );
    }

    fn handle_typing(
        &self,
        sender: &str,
        receiver: Option<String>,
        group_id: Option<Uuid>,
        typing: bool,
        ctx: &mut Context<Self>,
    ) {
        let Some((_, username)) = self.require_sender(sender) else {
            return;
        };

        // a group target needs no lookup
        let receiver = match (group_id, receiver) {
            (Some(_), _) | (None, None) => {
                self.message_service.send_typing(&username, None, group_id, typing);
                return;
            }
            (None, Some(receiver)) => receiver,
        };

        let users = self.user_service.clone();
        let messages = self.message_service.clone();
        ctx.spawn(
            async move {
                match users.get_by_username(&receiver).await {
                    Ok(user) => {
                        messages.send_typing(&username, Some(user.id), None, typing);
                    }
                    Err(e) => tracing::debug!("Typing indicator dropped: {}", e),
                }
            }
            .into_actor(self),
        );
    }
}

impl Actor for WebSocketSession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::debug!("WebSocket session started: {}", self.id);
        self.server.do_send(Connect { id: self.id, addr: ctx.address() });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!("WebSocket session stopped: {}", self.id);
        self.server.do_send(Disconnect { id: self.id });
    }
}

impl Message for ClientMessage {
    type Result = ();
}

/// Frames parsed by handler.rs
impl Handler<ClientMessage> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: ClientMessage, ctx: &mut Context<Self>) {
        self.handle_client_message(msg, ctx);
    }
}

impl Handler<Close> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, _: Close, ctx: &mut Context<Self>) {
        ctx.stop();
    }
}

/// Frames pushed by the server actor
impl Handler<ServerMessage> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, _ctx: &mut Context<Self>) {
        self.send_to_client(&msg);
    }
}
