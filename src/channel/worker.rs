//! # ChannelWorker: owner of the connection lifecycle.
//!
//! One worker task per [`EventChannel`](crate::EventChannel). The public
//! handle talks to it over a command channel; the worker owns the socket,
//! the reconnect schedule, and the offline publish queue, so no state is
//! shared across tasks.
//!
//! ## Event flow
//! For each connection series the worker publishes:
//! ```text
//! Connecting → [handshake] → Connected → replay subs → flush queue
//!                  │                          │
//!                  │                     session loop ──► dispatch inbound
//!                  │                          │           send outbound
//!                  │                          │           heartbeat/liveness
//!                  ▼                          ▼
//!            ConnectFailed            ConnectionLost / HeartbeatMissed
//!                  │                          │
//!                  └──► failures += 1 ──► ReconnectScheduled ──► [sleep] ─┐
//!                             ▲                                          │
//!                             └──────────────────────────────────────────┘
//! Deliberate disconnect() at any point → Closed, no retry.
//! ```
//!
//! ## Rules
//! - Connection attempts run **strictly sequentially**; a new attempt never
//!   starts while a previous one is pending.
//! - The failure counter increments **before** the delay for that retry is
//!   computed, and resets to zero on every successful connect.
//! - `disconnect()` interrupts handshakes and backoff sleeps; cancellation
//!   is checked at the same safe points.
//! - A malformed inbound message is dropped per-message; the session stays up.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::channel::config::{ChannelConfig, PublishPolicy};
use crate::channel::frame::{ClientFrame, Envelope};
use crate::channel::registry::SubscriptionRegistry;
use crate::channel::state::ConnectionState;
use crate::channel::transport::{Incoming, Transport, WireSink, WireStream};
use crate::error::ChannelError;
use crate::events::{Bus, Event, EventKind};

/// Instructions from the public handle.
pub(crate) enum Command {
    /// Start (or restart after a deliberate disconnect) the connection series.
    Connect(String),
    /// Close deliberately; no reconnect follows.
    Disconnect,
    /// Put a frame on the wire (or apply the offline publish policy).
    Send(ClientFrame),
}

/// Why the connection series ended.
enum Exit {
    /// `disconnect()` - the worker goes back to idle, reusable.
    Deliberate,
    /// Cancellation or command channel gone - the worker stops for good.
    Shutdown,
}

/// Outcome of one handshake attempt.
enum Attempt {
    Open(Box<dyn WireSink>, Box<dyn WireStream>),
    Failed(ChannelError),
    Deliberate,
    Shutdown,
}

/// Why an established session ended.
enum SessionEnd {
    Deliberate,
    Shutdown,
    Dropped(ChannelError),
}

/// Owns the connection; drives reconnects, heartbeat, replay, and dispatch.
pub(crate) struct ChannelWorker {
    pub cfg: ChannelConfig,
    pub transport: Arc<dyn Transport>,
    pub registry: Arc<SubscriptionRegistry>,
    pub bus: Bus,
    pub state: watch::Sender<ConnectionState>,
    pub cmd_rx: mpsc::UnboundedReceiver<Command>,
    pub token: CancellationToken,
}

impl ChannelWorker {
    /// Runs until the token is cancelled or the handle is dropped.
    ///
    /// Idle loop: the worker waits for a `Connect` command, runs the
    /// connection series until a deliberate disconnect, then waits again.
    pub(crate) async fn run(self) {
        let ChannelWorker {
            cfg,
            transport,
            registry,
            bus,
            state,
            mut cmd_rx,
            token,
        } = self;
        let mut pending: VecDeque<ClientFrame> = VecDeque::new();

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                cmd = cmd_rx.recv() => match cmd {
                    None => break,
                    Some(Command::Connect(url)) => {
                        let exit = drive_series(
                            &cfg, &transport, &registry, &bus, &state,
                            &mut cmd_rx, &token, &mut pending, &url,
                        )
                        .await;
                        let _ = state.send_replace(ConnectionState::Disconnected);
                        if matches!(exit, Exit::Shutdown) {
                            break;
                        }
                    }
                    // Already disconnected.
                    Some(Command::Disconnect) => {}
                    Some(Command::Send(frame)) => stash_frame(&cfg, &bus, &mut pending, frame),
                },
            }
        }
        let _ = state.send_replace(ConnectionState::Disconnected);
    }
}

/// One connection series: connect, run the session, reconnect with backoff,
/// forever - until a deliberate disconnect or shutdown.
#[allow(clippy::too_many_arguments)]
async fn drive_series(
    cfg: &ChannelConfig,
    transport: &Arc<dyn Transport>,
    registry: &SubscriptionRegistry,
    bus: &Bus,
    state: &watch::Sender<ConnectionState>,
    cmd_rx: &mut mpsc::UnboundedReceiver<Command>,
    token: &CancellationToken,
    pending: &mut VecDeque<ClientFrame>,
    url: &str,
) -> Exit {
    // Consecutive failed attempts since the last successful connect.
    let mut failures: u32 = 0;

    loop {
        let attempt = failures + 1;
        let _ = state.send_replace(if failures == 0 {
            ConnectionState::Connecting
        } else {
            ConnectionState::Reconnecting
        });
        bus.publish(Event::new(EventKind::Connecting).with_attempt(attempt));

        match open_link(cfg, transport, bus, cmd_rx, token, pending, url).await {
            Attempt::Deliberate => {
                bus.publish(Event::new(EventKind::Closed));
                return Exit::Deliberate;
            }
            Attempt::Shutdown => return Exit::Shutdown,
            Attempt::Failed(err) => {
                bus.publish(
                    Event::new(EventKind::ConnectFailed)
                        .with_reason(err.as_message())
                        .with_attempt(attempt),
                );
            }
            Attempt::Open(mut sink, mut stream) => {
                failures = 0;
                let _ = state.send_replace(ConnectionState::Connected);
                bus.publish(Event::new(EventKind::Connected));

                let end = match establish(registry, bus, pending, sink.as_mut()).await {
                    Ok(()) => {
                        session(
                            cfg,
                            registry,
                            bus,
                            cmd_rx,
                            token,
                            sink.as_mut(),
                            stream.as_mut(),
                        )
                        .await
                    }
                    Err(e) => SessionEnd::Dropped(e),
                };
                sink.close().await;

                match end {
                    SessionEnd::Deliberate => {
                        bus.publish(Event::new(EventKind::Closed));
                        return Exit::Deliberate;
                    }
                    SessionEnd::Shutdown => return Exit::Shutdown,
                    SessionEnd::Dropped(err) => {
                        bus.publish(
                            Event::new(EventKind::ConnectionLost).with_reason(err.as_message()),
                        );
                        // Only transient failures re-enter the backoff loop;
                        // anything else ends the series.
                        if !err.is_retryable() {
                            bus.publish(Event::new(EventKind::Closed));
                            return Exit::Deliberate;
                        }
                    }
                }
            }
        }

        // Counter moves before the delay for this retry is computed.
        failures += 1;
        let delay = cfg.backoff.next(failures - 1);
        let _ = state.send_replace(ConnectionState::Reconnecting);
        bus.publish(
            Event::new(EventKind::ReconnectScheduled)
                .with_delay(delay)
                .with_attempt(failures + 1),
        );

        let sleep = time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => break,
                _ = token.cancelled() => return Exit::Shutdown,
                cmd = cmd_rx.recv() => match cmd {
                    None => return Exit::Shutdown,
                    Some(Command::Disconnect) => {
                        bus.publish(Event::new(EventKind::Closed));
                        return Exit::Deliberate;
                    }
                    Some(Command::Send(frame)) => stash_frame(cfg, bus, pending, frame),
                    // Already in a series.
                    Some(Command::Connect(_)) => {}
                },
            }
        }
    }
}

/// One handshake attempt, interruptible by commands and cancellation.
async fn open_link(
    cfg: &ChannelConfig,
    transport: &Arc<dyn Transport>,
    bus: &Bus,
    cmd_rx: &mut mpsc::UnboundedReceiver<Command>,
    token: &CancellationToken,
    pending: &mut VecDeque<ClientFrame>,
    url: &str,
) -> Attempt {
    let deadline = cfg.connect_deadline();
    let transport = Arc::clone(transport);
    let target = url.to_string();

    let handshake = async move {
        match deadline {
            Some(limit) => match time::timeout(limit, transport.connect(&target)).await {
                Ok(res) => res,
                Err(_) => Err(ChannelError::Connect {
                    reason: format!("handshake timed out after {limit:?}"),
                }),
            },
            None => transport.connect(&target).await,
        }
    };
    tokio::pin!(handshake);

    loop {
        tokio::select! {
            res = &mut handshake => {
                return match res {
                    Ok((sink, stream)) => Attempt::Open(sink, stream),
                    Err(reason) => Attempt::Failed(reason),
                };
            }
            _ = token.cancelled() => return Attempt::Shutdown,
            cmd = cmd_rx.recv() => match cmd {
                None => return Attempt::Shutdown,
                Some(Command::Disconnect) => return Attempt::Deliberate,
                Some(Command::Send(frame)) => stash_frame(cfg, bus, pending, frame),
                Some(Command::Connect(_)) => {}
            },
        }
    }
}

/// Post-connect bring-up: replay one subscribe frame per registered topic,
/// then flush queued publishes in order. Any send error drops the link.
async fn establish(
    registry: &SubscriptionRegistry,
    bus: &Bus,
    pending: &mut VecDeque<ClientFrame>,
    sink: &mut dyn WireSink,
) -> Result<(), ChannelError> {
    for topic in registry.topics().await {
        let frame = ClientFrame::Subscribe {
            topic: topic.clone(),
        };
        sink.send(frame.encode()?).await?;
        bus.publish(Event::new(EventKind::SubscriptionReplayed).with_topic(topic));
    }

    while let Some(frame) = pending.pop_front() {
        let text = match frame.encode() {
            Ok(text) => text,
            Err(e) => {
                bus.publish(Event::new(EventKind::PublishDropped).with_reason(e.as_message()));
                continue;
            }
        };
        if let Err(e) = sink.send(text).await {
            // Keep the message for the next session.
            pending.push_front(frame);
            return Err(e);
        }
    }
    Ok(())
}

/// Established-session select loop: inbound dispatch, outbound sends,
/// heartbeat pings and the liveness window.
async fn session(
    cfg: &ChannelConfig,
    registry: &SubscriptionRegistry,
    bus: &Bus,
    cmd_rx: &mut mpsc::UnboundedReceiver<Command>,
    token: &CancellationToken,
    sink: &mut dyn WireSink,
    stream: &mut dyn WireStream,
) -> SessionEnd {
    // A disabled heartbeat still needs a timer arm; park it far out.
    let period = if cfg.heartbeat_enabled() {
        cfg.heartbeat_interval
    } else {
        std::time::Duration::from_secs(3600)
    };
    let mut heartbeat = time::interval_at(time::Instant::now() + period, period);
    let mut last_traffic = time::Instant::now();

    loop {
        tokio::select! {
            _ = token.cancelled() => return SessionEnd::Shutdown,

            cmd = cmd_rx.recv() => match cmd {
                None => return SessionEnd::Shutdown,
                Some(Command::Disconnect) => return SessionEnd::Deliberate,
                // Already connected.
                Some(Command::Connect(_)) => {}
                Some(Command::Send(frame)) => {
                    let text = match frame.encode() {
                        Ok(text) => text,
                        Err(e) => {
                            bus.publish(
                                Event::new(EventKind::PublishDropped).with_reason(e.as_message()),
                            );
                            continue;
                        }
                    };
                    if let Err(e) = sink.send(text).await {
                        return SessionEnd::Dropped(e);
                    }
                }
            },

            incoming = stream.next() => match incoming {
                None => return SessionEnd::Dropped(ChannelError::Transport {
                    reason: "closed by peer".into(),
                }),
                Some(Err(e)) => return SessionEnd::Dropped(e),
                Some(Ok(Incoming::Text(text))) => {
                    last_traffic = time::Instant::now();
                    dispatch(registry, bus, &text).await;
                }
                Some(Ok(Incoming::Pong)) | Some(Ok(Incoming::Other)) => {
                    last_traffic = time::Instant::now();
                }
            },

            _ = heartbeat.tick() => {
                if !cfg.heartbeat_enabled() {
                    continue;
                }
                if last_traffic.elapsed() >= cfg.liveness_timeout {
                    bus.publish(
                        Event::new(EventKind::HeartbeatMissed).with_timeout(cfg.liveness_timeout),
                    );
                    return SessionEnd::Dropped(ChannelError::Liveness {
                        window: cfg.liveness_timeout,
                    });
                }
                if let Err(e) = sink.ping().await {
                    return SessionEnd::Dropped(e);
                }
            }
        }
    }
}

/// Parses one inbound text frame and invokes the topic's handlers in
/// registration order, against a snapshot - handlers may unsubscribe
/// themselves mid-dispatch.
async fn dispatch(registry: &SubscriptionRegistry, bus: &Bus, text: &str) {
    let env = match Envelope::decode(text) {
        Ok(env) => env,
        Err(e) => {
            bus.publish(Event::new(EventKind::MessageDropped).with_reason(e.as_message()));
            return;
        }
    };

    for handler in registry.snapshot(&env.topic).await {
        handler.on_message(&env).await;
    }
}

/// Applies the offline publish policy to a frame issued while disconnected.
///
/// Control frames are discarded: the registry is the source of truth and
/// subscribe frames are rebuilt from it on reconnect.
fn stash_frame(
    cfg: &ChannelConfig,
    bus: &Bus,
    pending: &mut VecDeque<ClientFrame>,
    frame: ClientFrame,
) {
    let ClientFrame::Publish { topic, payload } = frame else {
        return;
    };

    match cfg.publish_policy {
        PublishPolicy::Drop => {
            bus.publish(
                Event::new(EventKind::PublishDropped)
                    .with_topic(topic)
                    .with_reason("not connected"),
            );
        }
        PublishPolicy::Queue { capacity } => {
            let capacity = capacity.max(1);
            if pending.len() >= capacity {
                if let Some(ClientFrame::Publish { topic: oldest, .. }) = pending.pop_front() {
                    bus.publish(
                        Event::new(EventKind::PublishDropped)
                            .with_topic(oldest)
                            .with_reason("queue overflow"),
                    );
                }
            }
            bus.publish(Event::new(EventKind::PublishQueued).with_topic(topic.clone()));
            pending.push_back(ClientFrame::Publish { topic, payload });
        }
    }
}
