//! Channel core: connection lifecycle and topic pub/sub.
//!
//! This module contains the embedded implementation of the event channel.
//! The public API is [`EventChannel`] (built via [`ChannelBuilder`]), a
//! handle to a single worker task that owns the connection and recovers it
//! transparently.
//!
//! Internal modules:
//! - [`worker`]: reconnect loop, session select loop, heartbeat, replay;
//! - [`registry`]: topic → handler bookkeeping with snapshot dispatch;
//! - [`transport`]: pluggable wire layer (`WsTransport` by default);
//! - [`frame`]: the JSON wire contract;
//! - [`config`]: tunables (backoff, heartbeat, publish policy).

mod builder;
mod channel;
mod config;
mod frame;
mod handler;
mod registry;
mod state;
mod transport;
mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::ChannelBuilder;
pub use channel::EventChannel;
pub use config::{ChannelConfig, PublishPolicy};
pub use frame::Envelope;
pub use handler::{HandlerFn, HandlerRef, TopicHandler};
pub use registry::SubscriptionHandle;
pub use state::ConnectionState;
pub use transport::{Incoming, Transport, WireSink, WireStream, WsTransport};
