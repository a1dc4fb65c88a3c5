//! In-memory transport for exercising the worker without sockets.
//!
//! `MockTransport` hands out scripted connections. Each accepted connection
//! is exposed to the test as a [`MockConn`]: it records outbound frames and
//! pings, lets the test inject inbound traffic, and can sever the link to
//! simulate an unexpected drop.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::channel::transport::{Incoming, Transport, WireSink, WireStream};
use crate::error::ChannelError;

/// One accepted in-memory connection, driven by the test.
pub(crate) struct MockConn {
    sent: Mutex<Vec<String>>,
    pings: AtomicU32,
    inbound: Mutex<Option<mpsc::UnboundedSender<Result<Incoming, ChannelError>>>>,
}

impl MockConn {
    /// Injects one inbound text frame.
    pub(crate) fn push_text(&self, text: impl Into<String>) {
        if let Some(tx) = &*self.inbound.lock().unwrap() {
            let _ = tx.send(Ok(Incoming::Text(text.into())));
        }
    }

    /// Drops the link: the worker observes "closed by peer".
    pub(crate) fn sever(&self) {
        self.inbound.lock().unwrap().take();
    }

    /// Frames the worker has written, in order.
    pub(crate) fn sent_frames(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of heartbeat pings observed.
    pub(crate) fn ping_count(&self) -> u32 {
        self.pings.load(AtomicOrdering::Relaxed)
    }
}

/// Scripted transport. An empty script accepts every connection.
#[derive(Default)]
pub(crate) struct MockTransport {
    script: Mutex<VecDeque<Result<(), String>>>,
    conns: Mutex<Vec<Arc<MockConn>>>,
    connects: AtomicU32,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues outcomes for upcoming connect attempts.
    pub(crate) fn script(&self, outcomes: Vec<Result<(), &str>>) {
        let mut script = self.script.lock().unwrap();
        for outcome in outcomes {
            script.push_back(outcome.map_err(str::to_string));
        }
    }

    /// Total connect attempts observed.
    pub(crate) fn connect_count(&self) -> u32 {
        self.connects.load(AtomicOrdering::Relaxed)
    }

    /// The `n`-th accepted connection (0-based).
    pub(crate) fn conn(&self, n: usize) -> Arc<MockConn> {
        Arc::clone(&self.conns.lock().unwrap()[n])
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(
        &self,
        _url: &str,
    ) -> Result<(Box<dyn WireSink>, Box<dyn WireStream>), ChannelError> {
        self.connects.fetch_add(1, AtomicOrdering::Relaxed);

        let outcome = self.script.lock().unwrap().pop_front().unwrap_or(Ok(()));
        if let Err(reason) = outcome {
            return Err(ChannelError::Connect { reason });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let conn = Arc::new(MockConn {
            sent: Mutex::new(Vec::new()),
            pings: AtomicU32::new(0),
            inbound: Mutex::new(Some(tx)),
        });
        self.conns.lock().unwrap().push(Arc::clone(&conn));

        Ok((Box::new(MockSink { conn }), Box::new(MockStream { rx })))
    }
}

struct MockSink {
    conn: Arc<MockConn>,
}

#[async_trait]
impl WireSink for MockSink {
    async fn send(&mut self, text: String) -> Result<(), ChannelError> {
        if self.conn.inbound.lock().unwrap().is_none() {
            return Err(ChannelError::Transport {
                reason: "link severed".into(),
            });
        }
        self.conn.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn ping(&mut self) -> Result<(), ChannelError> {
        self.conn.pings.fetch_add(1, AtomicOrdering::Relaxed);
        Ok(())
    }

    async fn close(&mut self) {}
}

struct MockStream {
    rx: mpsc::UnboundedReceiver<Result<Incoming, ChannelError>>,
}

#[async_trait]
impl WireStream for MockStream {
    async fn next(&mut self) -> Option<Result<Incoming, ChannelError>> {
        self.rx.recv().await
    }
}
