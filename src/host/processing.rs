use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::{storage::KeyValueStore, tracker::lookup::TabRegistry};

use super::{
    messaging::{IncomingMessage, OutgoingMessage, TabStatus},
    service::ActivityService,
};

/// Handles browser messages one at a time, in the order they arrived.
pub struct ProcessingModule<S: KeyValueStore> {
    receiver: mpsc::Receiver<IncomingMessage>,
    next: mpsc::Sender<OutgoingMessage>,
    registry: Arc<TabRegistry>,
    service: ActivityService<S>,
}

impl<S: KeyValueStore> ProcessingModule<S> {
    pub fn new(
        receiver: mpsc::Receiver<IncomingMessage>,
        next: mpsc::Sender<OutgoingMessage>,
        registry: Arc<TabRegistry>,
        service: ActivityService<S>,
    ) -> Self {
        Self {
            receiver,
            next,
            registry,
            service,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        while let Some(message) = self.receiver.recv().await {
            debug!("Processing message {:?}", message);
            if let Err(e) = self.process_next(message.clone()).await {
                error!("Error processing message {:?}: {e:?}", message);
            }
        }
        self.receiver.close();
        Ok(())
    }

    async fn process_next(&mut self, message: IncomingMessage) -> Result<()> {
        match message {
            IncomingMessage::TabActivated { tab_id, url } => {
                if let Some(url) = url {
                    self.registry.observe(tab_id, url)?;
                }
                self.service.update_tab_usage(tab_id).await;
            }
            IncomingMessage::TabUpdated {
                tab_id,
                status,
                url,
            } => {
                // Navigation updates usually don't repeat the url, keep the last known one.
                if let Some(url) = url {
                    self.registry.observe(tab_id, url)?;
                }
                if status == Some(TabStatus::Complete) {
                    self.service.update_tab_usage(tab_id).await;
                }
            }
            IncomingMessage::TabRemoved { tab_id } => {
                self.registry.forget(tab_id)?;
            }
            IncomingMessage::RequestUsage => self.send_usage().await?,
            IncomingMessage::ResetUsage => {
                let result = self.service.usage().reset_all().await;
                self.reply_on_error(result).await?;
                self.send_usage().await?;
            }
            IncomingMessage::SetDailyLimit { daily_limit } => {
                let result = self.service.usage().set_daily_limit(daily_limit).await;
                self.reply_on_error(result).await?;
                self.send_usage().await?;
            }
        }
        Ok(())
    }

    async fn send_usage(&self) -> Result<()> {
        let message = match self.service.usage().today_snapshot().await {
            Ok(snapshot) => OutgoingMessage::Usage(snapshot),
            Err(e) => {
                error!("Failed to read today's usage {e:?}");
                OutgoingMessage::Error {
                    message: format!("{e:#}"),
                }
            }
        };
        self.next.send(message).await?;
        Ok(())
    }

    /// Tells the extension about a failed request without stopping the host.
    async fn reply_on_error(&self, result: Result<()>) -> Result<()> {
        if let Err(e) = result {
            error!("Request failed {e:?}");
            self.next
                .send(OutgoingMessage::Error {
                    message: format!("{e:#}"),
                })
                .await?;
        }
        Ok(())
    }
}
