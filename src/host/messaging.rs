//! Chrome native messaging. Every message is a 4-byte little-endian length followed by that many
//! bytes of UTF-8 JSON, in both directions.

use std::io::ErrorKind;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{notify::Notification, tracker::TabId, usage::UsageSnapshot};

/// Chrome refuses messages from a host larger than 1MB, the same limit is applied to input.
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    Loading,
    Complete,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IncomingMessage {
    TabActivated {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        #[serde(default)]
        url: Option<String>,
    },
    TabUpdated {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        #[serde(default)]
        status: Option<TabStatus>,
        #[serde(default)]
        url: Option<String>,
    },
    TabRemoved {
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
    RequestUsage,
    ResetUsage,
    SetDailyLimit {
        #[serde(rename = "dailyLimit")]
        daily_limit: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingMessage {
    Notification(Notification),
    Usage(UsageSnapshot),
    Error { message: String },
}

/// Reads one frame. Returns `None` once the browser closes the pipe.
pub async fn read_frame(input: &mut (impl AsyncRead + Unpin)) -> Result<Option<Vec<u8>>> {
    let mut len_bytes = [0u8; 4];
    match input.read_exact(&mut len_bytes).await {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_le_bytes(len_bytes) as usize;
    if len > MAX_MESSAGE_SIZE {
        bail!("Message too large: {len} bytes (max: {MAX_MESSAGE_SIZE} bytes)");
    }

    let mut buffer = vec![0u8; len];
    input.read_exact(&mut buffer).await?;
    Ok(Some(buffer))
}

pub async fn write_message(
    output: &mut (impl AsyncWrite + Unpin),
    message: &OutgoingMessage,
) -> Result<()> {
    let json = serde_json::to_vec(message)?;
    if json.len() > MAX_MESSAGE_SIZE {
        bail!("Outgoing message too large: {} bytes", json.len());
    }
    output.write_all(&(json.len() as u32).to_le_bytes()).await?;
    output.write_all(&json).await?;
    output.flush().await?;
    Ok(())
}

/// Reads frames from the browser and forwards parsed messages. Messages that can't be parsed are
/// answered with [OutgoingMessage::Error] and skipped. Closing the input cancels `shutdown`.
pub struct MessageReader<R> {
    input: R,
    next: mpsc::Sender<IncomingMessage>,
    replies: mpsc::Sender<OutgoingMessage>,
    shutdown: CancellationToken,
}

impl<R: AsyncRead + Unpin> MessageReader<R> {
    pub fn new(
        input: R,
        next: mpsc::Sender<IncomingMessage>,
        replies: mpsc::Sender<OutgoingMessage>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            input,
            next,
            replies,
            shutdown,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        loop {
            let frame = tokio::select! {
                // Dropping `next` here stops the processing module.
                _ = self.shutdown.cancelled() => return Ok(()),
                frame = read_frame(&mut self.input) => frame,
            };

            let frame = match frame {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("Browser closed the connection");
                    self.shutdown.cancel();
                    return Ok(());
                }
                Err(e) => {
                    error!("Failed to read a message {e:?}");
                    self.shutdown.cancel();
                    return Err(e);
                }
            };

            match serde_json::from_slice::<IncomingMessage>(&frame) {
                Ok(message) => {
                    debug!("Received {message:?}");
                    self.next
                        .send(message)
                        .await
                        .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
                }
                Err(e) => {
                    warn!(
                        "Skipping illegal message {}: {e}",
                        String::from_utf8_lossy(&frame)
                    );
                    self.replies
                        .send(OutgoingMessage::Error {
                            message: format!("Illegal message: {e}"),
                        })
                        .await
                        .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
                }
            }
        }
    }
}

/// Writes every outgoing message until all senders are gone.
pub struct MessageWriter<W> {
    output: W,
    receiver: mpsc::Receiver<OutgoingMessage>,
}

impl<W: AsyncWrite + Unpin> MessageWriter<W> {
    pub fn new(output: W, receiver: mpsc::Receiver<OutgoingMessage>) -> Self {
        Self { output, receiver }
    }

    pub async fn run(mut self) -> Result<()> {
        while let Some(message) = self.receiver.recv().await {
            write_message(&mut self.output, &message)
                .await
                .inspect_err(|e| error!("Failed to write {message:?}: {e:?}"))?;
            debug!("Sent {message:?}");
        }
        Ok(())
    }
}
