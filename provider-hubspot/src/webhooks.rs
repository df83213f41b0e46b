//! Webhook notifications
//!
//! HubSpot delivers contact webhooks as a JSON array of events. Each
//! recognised contact event becomes one engine [`Notification`].

use bridge_traits::{Notification, NotificationKind};
use tracing::debug;

use crate::error::{HubSpotError, Result};
use crate::types::WebhookEvent;

fn kind_for(subscription_type: &str) -> Option<NotificationKind> {
    match subscription_type {
        "contact.creation" => Some(NotificationKind::Created),
        "contact.propertyChange" => Some(NotificationKind::Updated),
        "contact.deletion" => Some(NotificationKind::Deleted),
        _ => None,
    }
}

/// Parse a webhook delivery body.
///
/// Events of unknown subscription types, or without an object id, are
/// skipped. A body that is not a JSON array of events is rejected.
pub fn parse_webhook_notifications(body: &[u8]) -> Result<Vec<Notification>> {
    let events: Vec<WebhookEvent> =
        serde_json::from_slice(body).map_err(|e| HubSpotError::InvalidWebhook(e.to_string()))?;

    let notifications = events
        .into_iter()
        .filter_map(|event| {
            let subscription_type = event.subscription_type.unwrap_or_default();
            let Some(kind) = kind_for(&subscription_type) else {
                debug!(%subscription_type, "Ignoring webhook event");
                return None;
            };
            let id = event.object_id?.into_string();
            Some(Notification::crm(kind, id))
        })
        .collect();

    Ok(notifications)
}
