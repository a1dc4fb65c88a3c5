//! Channel events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by the connection worker
//! and the health probe.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `channel::worker` (connection lifecycle, traffic
//!   accounting), `probe::HealthProbe` (check outcomes).
//! - **Consumers**: the `EventChannel` listener (fans out to
//!   `SubscriberSet`), plus any caller holding a receiver from
//!   [`EventChannel::events`](crate::EventChannel::events).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
