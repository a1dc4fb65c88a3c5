//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used to observe channel and probe events without touching the
//! hot path.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   worker / probe ── publish(Event) ──► Bus ──► EventChannel listener
//!                                                     │
//!                                                     ▼
//!                                          SubscriberSet::emit(&Event)
//!                                        ┌─────────┬─────────┐
//!                                        ▼         ▼         ▼
//!                                    LogWriter  Metrics   Custom ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```rust
//! use relink::{Subscribe, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct StatusIndicator;
//!
//! #[async_trait]
//! impl Subscribe for StatusIndicator {
//!     async fn on_event(&self, event: &Event) {
//!         match event.kind {
//!             EventKind::Connected => { /* flip badge to green */ }
//!             EventKind::ReconnectScheduled => { /* show "reconnecting…" */ }
//!             _ => {}
//!         }
//!     }
//!     fn name(&self) -> &'static str { "status-indicator" }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
