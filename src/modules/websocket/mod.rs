/// Real-time transport: frame protocol, the subscription registry actor, per-connection
/// session actors and the HTTP upgrade handler.
pub mod events;
pub mod handler;
pub mod message;
pub mod server;
pub mod session;
