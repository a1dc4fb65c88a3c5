//! # Pluggable wire layer.
//!
//! The worker never touches a socket directly; it drives a pair of trait
//! objects obtained from a [`Transport`]:
//!
//! - [`WireSink`] - the write half: text frames, pings, close.
//! - [`WireStream`] - the read half: a stream of [`Incoming`] items.
//!
//! Splitting the halves lets the session loop await inbound traffic while
//! commands write to the sink from other select branches.
//!
//! [`WsTransport`] is the production implementation over `tokio-tungstenite`.
//! Tests substitute an in-memory transport.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::ChannelError;

/// One item produced by the read half.
#[derive(Debug)]
pub enum Incoming {
    /// A text frame; candidate [`Envelope`](crate::Envelope).
    Text(String),
    /// A pong answering one of our pings.
    Pong,
    /// Any other frame (binary, server ping). Counts as liveness traffic.
    Other,
}

/// Write half of an established connection.
#[async_trait]
pub trait WireSink: Send {
    /// Sends one text frame.
    async fn send(&mut self, text: String) -> Result<(), ChannelError>;

    /// Sends a heartbeat ping.
    async fn ping(&mut self) -> Result<(), ChannelError>;

    /// Closes the connection. Errors are ignored; the link is gone either way.
    async fn close(&mut self);
}

/// Read half of an established connection.
#[async_trait]
pub trait WireStream: Send {
    /// Waits for the next inbound item.
    ///
    /// `None` means the peer closed the connection.
    async fn next(&mut self) -> Option<Result<Incoming, ChannelError>>;
}

/// Factory for connections; the seam tests mock.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Opens a connection to `url` and returns its split halves.
    async fn connect(
        &self,
        url: &str,
    ) -> Result<(Box<dyn WireSink>, Box<dyn WireStream>), ChannelError>;
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport over `tokio-tungstenite`.
///
/// Text frames carry the JSON wire contract; heartbeats use native
/// ping/pong frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct WsTransport;

struct WsSink {
    sink: SplitSink<WsStream, Message>,
}

struct WsRead {
    stream: SplitStream<WsStream>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn connect(
        &self,
        url: &str,
    ) -> Result<(Box<dyn WireSink>, Box<dyn WireStream>), ChannelError> {
        let (ws, _response) = connect_async(url)
            .await
            .map_err(|e| ChannelError::Connect {
                reason: e.to_string(),
            })?;
        let (sink, stream) = ws.split();
        Ok((Box::new(WsSink { sink }), Box::new(WsRead { stream })))
    }
}

#[async_trait]
impl WireSink for WsSink {
    async fn send(&mut self, text: String) -> Result<(), ChannelError> {
        self.sink
            .send(Message::Text(text))
            .await
            .map_err(|e| ChannelError::Transport {
                reason: e.to_string(),
            })
    }

    async fn ping(&mut self) -> Result<(), ChannelError> {
        self.sink
            .send(Message::Ping(Vec::new()))
            .await
            .map_err(|e| ChannelError::Transport {
                reason: e.to_string(),
            })
    }

    async fn close(&mut self) {
        let _ = self.sink.send(Message::Close(None)).await;
        let _ = self.sink.close().await;
    }
}

#[async_trait]
impl WireStream for WsRead {
    async fn next(&mut self) -> Option<Result<Incoming, ChannelError>> {
        loop {
            return match self.stream.next().await? {
                Ok(Message::Text(text)) => Some(Ok(Incoming::Text(text))),
                Ok(Message::Pong(_)) => Some(Ok(Incoming::Pong)),
                Ok(Message::Close(_)) => None,
                // tungstenite answers pings on flush; count them as traffic.
                Ok(Message::Ping(_)) | Ok(Message::Binary(_)) => Some(Ok(Incoming::Other)),
                Ok(Message::Frame(_)) => continue,
                Err(e) => Some(Err(ChannelError::Transport {
                    reason: e.to_string(),
                })),
            };
        }
    }
}
