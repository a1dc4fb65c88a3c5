//! # relink
//!
//! **relink** maintains a single logical real-time connection to a backend
//! event endpoint and keeps it alive so the rest of the application does not
//! have to. It pairs a self-healing [`EventChannel`] (reconnection with
//! exponential backoff, heartbeat liveness checking, topic subscriptions that
//! survive reconnects) with a bounded [`HealthProbe`] used to gate operations
//! that need a live backend.
//!
//! ## Architecture
//! ```text
//!   subscribe/publish        ┌──────────────────────────────────────────┐
//!  ─────────────────────────►│  EventChannel (handle)                   │
//!   connect/disconnect       │  - SubscriptionRegistry (topic→handlers) │
//!                            │  - command channel ──────────────┐       │
//!                            └──────────────────────────────────┼───────┘
//!                                                               ▼
//!                            ┌──────────────────────────────────────────┐
//!                            │  ChannelWorker (connection lifecycle)    │
//!                            │   loop {                                 │
//!                            │     connect ──► replay subs ──► flush    │
//!                            │        │             queued publishes    │
//!                            │        ▼                                 │
//!                            │     session: recv / send / heartbeat     │
//!                            │        │                                 │
//!                            │     dropped? ─► backoff.next(n) ─► retry │
//!                            │     disconnect()? ─► stop, stay down     │
//!                            │   }                                      │
//!                            └───────────────┬──────────────────────────┘
//!                                            │ publish(Event)
//!                                            ▼
//!                            ┌──────────────────────────────────────────┐
//!                            │  Bus (broadcast) ──► SubscriberSet       │
//!                            │     │                 [queue S1]─►worker │
//!                            │     └─► watchers      [queue SN]─►worker │
//!                            └──────────────────────────────────────────┘
//!
//!   HealthProbe::check() ──► HealthBackend (GET /health, per-attempt
//!   timeout, capped backoff between attempts) ──► shared HealthStatus
//! ```
//!
//! ## Lifecycle
//! ```text
//! connect(url)
//!   ├─► state = Connecting, attempt = 1
//!   ├─► transport.connect(url)
//!   │      ├─ Ok  ──► state = Connected, failures = 0
//!   │      │          ├─► re-send subscribe frame per registered topic
//!   │      │          ├─► flush queued publishes (in order)
//!   │      │          └─► session loop until dropped / disconnect()
//!   │      └─ Err ──► ConnectFailed
//!   ├─► failures += 1
//!   ├─► delay = backoff.next(failures - 1)   (capped at backoff.max)
//!   ├─► ReconnectScheduled { delay, attempt } ─► sleep(delay), cancellable
//!   └─► retry forever - only disconnect() or shutdown() stops the loop
//! ```
//!
//! ## Features
//! | Area              | Description                                        | Key types / traits                   |
//! |-------------------|----------------------------------------------------|--------------------------------------|
//! | **Channel**       | Self-healing duplex connection with topic pub/sub. | [`EventChannel`], [`ChannelBuilder`] |
//! | **Handlers**      | Per-topic message callbacks, closure-friendly.     | [`TopicHandler`], [`HandlerFn`]      |
//! | **Policies**      | Retry delay growth and jitter.                     | [`BackoffPolicy`], [`JitterPolicy`]  |
//! | **Probe**         | Bounded readiness check with shared cached status. | [`HealthProbe`], [`HealthStatus`]    |
//! | **Observability** | Lifecycle events fanned out to subscribers.        | [`Event`], [`Subscribe`], [`Bus`]    |
//! | **Transports**    | Pluggable wire layer (WebSocket by default).       | [`Transport`], [`WsTransport`]       |
//! | **Errors**        | Typed, non-panicking failure taxonomy.             | [`ChannelError`], [`ProbeError`]     |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use relink::{ChannelBuilder, ChannelConfig, HandlerFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let channel = Arc::new(ChannelBuilder::new(ChannelConfig::default()).build());
//!
//!     let handle = channel
//!         .subscribe(
//!             "cognitive_event",
//!             HandlerFn::arc(|msg| async move {
//!                 println!("{}: {}", msg.topic, msg.payload);
//!             }),
//!         )
//!         .await?;
//!
//!     channel.connect("ws://127.0.0.1:8080/ws");
//!     // ... application runs; the channel reconnects on its own ...
//!     channel.unsubscribe(handle).await;
//!     channel.disconnect();
//!     Ok(())
//! }
//! ```

mod channel;
mod error;
mod events;
mod policies;
mod probe;
mod subscribers;

// ---- Public re-exports ----

pub use channel::{
    ChannelBuilder, ChannelConfig, ConnectionState, Envelope, EventChannel, HandlerFn, HandlerRef,
    Incoming, PublishPolicy, SubscriptionHandle, TopicHandler, Transport, WireSink, WireStream,
    WsTransport,
};
pub use error::{ChannelError, ProbeError};
pub use events::{Bus, Event, EventKind};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use probe::{HealthBackend, HealthProbe, HealthReport, HealthStatus, HttpBackend, ProbeConfig};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
