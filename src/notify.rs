use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::host::messaging::OutgoingMessage;

pub const NOTIFICATION_ICON: &str = "icon128.png";

/// A basic user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub icon_url: String,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn daily_limit_reached(daily_limit_minutes: u32) -> Self {
        Self {
            icon_url: NOTIFICATION_ICON.into(),
            title: "Daily Limit Reached".into(),
            message: format!(
                "You've reached your daily social media usage limit of {daily_limit_minutes} minutes."
            ),
        }
    }
}

/// Surface capable of showing a [Notification] to the user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<()>;
}

/// Hands notifications to the browser extension, which displays them.
pub struct ChannelNotifier {
    next: mpsc::Sender<OutgoingMessage>,
}

impl ChannelNotifier {
    pub fn new(next: mpsc::Sender<OutgoingMessage>) -> Self {
        Self { next }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        self.next
            .send(OutgoingMessage::Notification(notification))
            .await
            .context("Outgoing channel was closed")
    }
}
