//! Run against any WebSocket echo of the JSON envelope protocol:
//!
//! ```bash
//! RELINK_URL=ws://127.0.0.1:8080/ws cargo run --example reconnect --features logging
//! ```
//!
//! Subscribes to one topic, publishes a message every few seconds, and logs
//! every lifecycle event. Kill and restart the server to watch the backoff
//! schedule and the subscription replay.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use relink::{ChannelBuilder, ChannelConfig, HandlerFn, LogWriter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url =
        std::env::var("RELINK_URL").unwrap_or_else(|_| "ws://127.0.0.1:8080/ws".to_string());

    let channel = Arc::new(
        ChannelBuilder::new(ChannelConfig::default())
            .with_subscribers(vec![Arc::new(LogWriter)])
            .build(),
    );

    channel
        .subscribe(
            "cognitive_event",
            HandlerFn::arc(|msg| async move {
                println!("[cognitive_event] {}", msg.payload);
            }),
        )
        .await?;

    channel.connect(&url);
    println!("connected series started against {url}; Ctrl-C to stop");

    let publisher = {
        let channel = Arc::clone(&channel);
        tokio::spawn(async move {
            let mut n = 0u64;
            loop {
                tokio::time::sleep(Duration::from_secs(3)).await;
                n += 1;
                let _ = channel.publish("query", json!({ "n": n }));
            }
        })
    };

    tokio::signal::ctrl_c().await?;
    publisher.abort();

    match Arc::into_inner(channel) {
        Some(channel) => channel.shutdown().await,
        None => {}
    }
    Ok(())
}
