//! The native messaging host. The browser extension starts it and streams tab events over stdin.
//! Three cooperative tasks run on a single thread: [messaging::MessageReader] parses frames,
//! [processing::ProcessingModule] applies them in order, [messaging::MessageWriter] sends replies.

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use messaging::{IncomingMessage, MessageReader, MessageWriter, OutgoingMessage};
use processing::ProcessingModule;
use service::ActivityService;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    notify::ChannelNotifier,
    storage::{file_store::JsonFileStore, KeyValueStore},
    tracker::{domain::TrackedDomains, lookup::TabRegistry},
    usage::UsageStore,
    utils::clock::{Clock, DefaultClock},
};

pub mod args;
pub mod messaging;
pub mod processing;
pub mod service;
pub mod shutdown;

const CHANNEL_CAPACITY: usize = 16;

/// Represents the starting point for the host. Talks to the browser over stdin/stdout and
/// persists into `dir/store`.
pub async fn start_host(dir: PathBuf) -> Result<()> {
    let store = JsonFileStore::new(dir.join("store"))?;
    let shutdown_token = CancellationToken::new();

    info!("Starting host in {dir:?}");
    let (_, result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        run_host(
            tokio::io::stdin(),
            tokio::io::stdout(),
            store,
            DefaultClock,
            shutdown_token.clone()
        ),
    );
    info!("Host stopped");
    result
}

/// Runs until `input` is closed or `shutdown` is cancelled.
pub async fn run_host<S: KeyValueStore>(
    input: impl AsyncRead + Unpin,
    output: impl AsyncWrite + Unpin,
    store: S,
    clock: impl Clock + Clone,
    shutdown: CancellationToken,
) -> Result<()> {
    let (incoming_sender, incoming_receiver) = mpsc::channel::<IncomingMessage>(CHANNEL_CAPACITY);
    let (outgoing_sender, outgoing_receiver) = mpsc::channel::<OutgoingMessage>(CHANNEL_CAPACITY);

    let reader = MessageReader::new(input, incoming_sender, outgoing_sender.clone(), shutdown);
    let processor = create_processor(store, incoming_receiver, outgoing_sender, clock);
    let writer = MessageWriter::new(output, outgoing_receiver);

    let (reading_result, processing_result, writing_result) =
        tokio::join!(reader.run(), processor.run(), writer.run());

    if let Err(e) = &reading_result {
        error!("Reading module got an error {:?}", e);
    }

    if let Err(e) = &processing_result {
        error!("Processing module got an error {:?}", e);
    }

    if let Err(e) = &writing_result {
        error!("Writing module got an error {:?}", e);
    }

    reading_result.and(processing_result).and(writing_result)
}

fn create_processor<S: KeyValueStore>(
    store: S,
    receiver: mpsc::Receiver<IncomingMessage>,
    next: mpsc::Sender<OutgoingMessage>,
    clock: impl Clock + Clone,
) -> ProcessingModule<S> {
    let registry = Arc::new(TabRegistry::new());
    let service = ActivityService::new(
        TrackedDomains::default(),
        Box::new(registry.clone()),
        UsageStore::new(store, Box::new(clock.clone())),
        Box::new(ChannelNotifier::new(next.clone())),
        Box::new(clock),
    );
    ProcessingModule::new(receiver, next, registry, service)
}

#[cfg(test)]
mod host_tests {
    use anyhow::{Context, Result};
    use chrono::Duration;
    use serde_json::{json, Value};
    use tempfile::tempdir;
    use tokio::io::{duplex, AsyncWriteExt, DuplexStream};
    use tokio_util::sync::CancellationToken;

    use crate::{
        host::{messaging::read_frame, run_host},
        storage::{file_store::JsonFileStore, KeyValueStore},
        utils::{clock::test_clock::ManualClock, logging::TEST_LOGGING},
    };

    async fn send(stream: &mut DuplexStream, value: Value) -> Result<()> {
        let json = serde_json::to_vec(&value)?;
        stream.write_all(&(json.len() as u32).to_le_bytes()).await?;
        stream.write_all(&json).await?;
        Ok(())
    }

    async fn receive(stream: &mut DuplexStream) -> Result<Value> {
        let frame = read_frame(stream)
            .await?
            .context("Host closed the connection")?;
        Ok(serde_json::from_slice(&frame)?)
    }

    /// Asks for usage and waits for it. Everything sent before is processed once this returns.
    async fn usage(input: &mut DuplexStream, output: &mut DuplexStream) -> Result<Value> {
        send(input, json!({ "type": "request_usage" })).await?;
        let reply = receive(output).await?;
        assert_eq!(reply["type"], "usage");
        Ok(reply)
    }

    /// Drives a whole browsing session through the host the way the extension would.
    #[tokio::test]
    async fn smoke_test_host() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let clock = ManualClock::at_test_start();
        let (mut input, host_input) = duplex(64 * 1024);
        let (host_output, mut output) = duplex(64 * 1024);

        let host = run_host(
            host_input,
            host_output,
            JsonFileStore::new(dir.path().to_owned())?,
            clock.clone(),
            CancellationToken::new(),
        );

        let driver = async {
            send(&mut input, json!({ "type": "set_daily_limit", "dailyLimit": 1 })).await?;
            let reply = receive(&mut output).await?;
            assert_eq!(reply["dailyLimit"], 1);
            assert_eq!(reply["totalMs"], 0);

            send(&mut input, json!({ "type": "something_else" })).await?;
            let error = receive(&mut output).await?;
            assert_eq!(error["type"], "error");
            send(
                &mut input,
                json!({ "type": "tab_activated", "tabId": 1, "url": "https://www.facebook.com/feed" }),
            )
            .await?;
            usage(&mut input, &mut output).await?;

            clock.advance(Duration::seconds(40));
            // Still loading, nothing happens.
            send(
                &mut input,
                json!({ "type": "tab_updated", "tabId": 2, "status": "loading", "url": "https://twitter.com/" }),
            )
            .await?;
            let reply = usage(&mut input, &mut output).await?;
            assert_eq!(reply["totalMs"], 0);

            send(
                &mut input,
                json!({ "type": "tab_updated", "tabId": 2, "status": "complete", "url": "https://twitter.com/" }),
            )
            .await?;
            let reply = usage(&mut input, &mut output).await?;
            assert_eq!(reply["usage"]["www.facebook.com"], 40_000);

            clock.advance(Duration::seconds(40));
            send(
                &mut input,
                json!({ "type": "tab_activated", "tabId": 1, "url": "https://www.facebook.com/feed" }),
            )
            .await?;
            let notification = receive(&mut output).await?;
            assert_eq!(notification["type"], "notification");
            assert_eq!(notification["title"], "Daily Limit Reached");

            let reply = usage(&mut input, &mut output).await?;
            assert_eq!(reply["totalMs"], 80_000);
            assert_eq!(reply["usage"]["twitter.com"], 40_000);

            send(&mut input, json!({ "type": "reset_usage" })).await?;
            let reply = receive(&mut output).await?;
            assert_eq!(reply["usage"], json!({}));

            send(&mut input, json!({ "type": "set_daily_limit", "dailyLimit": 0 })).await?;
            let error = receive(&mut output).await?;
            assert_eq!(error["type"], "error");
            let reply = receive(&mut output).await?;
            assert_eq!(reply["dailyLimit"], 1);

            input.shutdown().await?;
            anyhow::Ok(())
        };

        let (host_result, driver_result) = tokio::join!(host, driver);
        driver_result?;
        host_result?;

        let store = JsonFileStore::new(dir.path().to_owned())?;
        assert_eq!(store.get("usageData").await?, Some(json!({})));
        assert_eq!(store.get("settings").await?, Some(json!({ "dailyLimit": 1 })));
        Ok(())
    }
}
