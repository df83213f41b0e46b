//! In-process notification source.
//!
//! Webhook handlers push parsed deliveries into a bounded channel; the
//! dispatcher drains it through [`NotificationSource`].

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::{Notification, NotificationSource};
use tokio::sync::{mpsc, Mutex};

/// Sending half handed to webhook front-ends.
#[derive(Debug, Clone)]
pub struct NotificationSender {
    sender: mpsc::Sender<Vec<Notification>>,
}

impl NotificationSender {
    /// Queue one delivery. Waits while the channel is full.
    pub async fn send(&self, delivery: Vec<Notification>) -> Result<()> {
        self.sender
            .send(delivery)
            .await
            .map_err(|_| BridgeError::NotAvailable("notification queue closed".to_string()))
    }
}

/// Receiving half, consumed by the dispatcher.
#[derive(Debug)]
pub struct ChannelNotificationSource {
    receiver: Mutex<mpsc::Receiver<Vec<Notification>>>,
}

/// Create a bounded notification queue holding up to `capacity` deliveries.
pub fn notification_channel(capacity: usize) -> (NotificationSender, ChannelNotificationSource) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (
        NotificationSender { sender },
        ChannelNotificationSource {
            receiver: Mutex::new(receiver),
        },
    )
}

#[async_trait]
impl NotificationSource for ChannelNotificationSource {
    async fn next_delivery(&self) -> Result<Option<Vec<Notification>>> {
        Ok(self.receiver.lock().await.recv().await)
    }
}
