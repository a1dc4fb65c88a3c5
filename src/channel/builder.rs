//! Builder for constructing an [`EventChannel`] with optional features.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::channel::channel::EventChannel;
use crate::channel::config::ChannelConfig;
use crate::channel::registry::SubscriptionRegistry;
use crate::channel::state::ConnectionState;
use crate::channel::transport::{Transport, WsTransport};
use crate::channel::worker::ChannelWorker;
use crate::events::Bus;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for an [`EventChannel`].
///
/// ```no_run
/// use relink::{ChannelBuilder, ChannelConfig};
///
/// # async fn demo() {
/// let channel = ChannelBuilder::new(ChannelConfig::default()).build();
/// channel.connect("ws://127.0.0.1:8080/ws");
/// # }
/// ```
pub struct ChannelBuilder {
    cfg: ChannelConfig,
    transport: Arc<dyn Transport>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ChannelBuilder {
    /// Creates a new builder with the given configuration and the default
    /// WebSocket transport.
    pub fn new(cfg: ChannelConfig) -> Self {
        Self {
            cfg,
            transport: Arc::new(WsTransport),
            subscribers: Vec::new(),
        }
    }

    /// Replaces the wire layer (tests use an in-memory transport).
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive lifecycle events (reconnects, drops, replay)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the channel and spawns its worker task.
    ///
    /// Must be called within a tokio runtime. The channel starts
    /// disconnected; call [`EventChannel::connect`] to bring it up.
    pub fn build(self) -> EventChannel {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let registry = Arc::new(SubscriptionRegistry::new());
        let subs = Arc::new(SubscriberSet::new(self.subscribers));
        let token = CancellationToken::new();

        // Fan-out listener: bus -> subscriber set (fire-and-forget).
        {
            let mut rx = bus.subscribe();
            let set = Arc::clone(&subs);
            tokio::spawn(async move {
                while let Ok(ev) = rx.recv().await {
                    set.emit(&ev);
                }
            });
        }

        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        let worker = ChannelWorker {
            cfg: self.cfg,
            transport: self.transport,
            registry: Arc::clone(&registry),
            bus: bus.clone(),
            state: state_tx,
            cmd_rx,
            token: token.child_token(),
        };
        let handle = tokio::spawn(worker.run());

        EventChannel {
            bus,
            registry,
            cmd_tx,
            state_rx,
            token,
            subs,
            worker: handle,
        }
    }
}
