//! Customer subscriptions
//!
//! 10to8 pushes a notification to a callback URL whenever a subscribed
//! resource changes. Setup replaces every existing customer subscription with
//! one pointing at the configured callback, and incoming bodies are turned
//! into engine [`Notification`]s here.

use bridge_traits::error::Result;
use bridge_traits::http::{HttpMethod, HttpRequest};
use bridge_traits::{Notification, NotificationKind};
use tracing::{debug, info, instrument};

use crate::connector::{TenToEightConnector, SUBSCRIPTION_PATH};
use crate::error::TenToEightError;
use crate::types::{
    NewSubscription, Subscription, SubscriptionList, SubscriptionNotification, CUSTOMER_SCOPE,
};

impl TenToEightConnector {
    /// List the organisation's subscriptions.
    #[instrument(skip(self))]
    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        let response = self
            .send(HttpRequest::new(
                HttpMethod::Get,
                self.endpoint(SUBSCRIPTION_PATH),
            ))
            .await?;

        let list: SubscriptionList = response
            .json()
            .map_err(|e| TenToEightError::ParseError(e.to_string()))?;
        Ok(list.results)
    }

    #[instrument(skip(self))]
    pub async fn delete_subscription(&self, resource_uri: &str) -> Result<()> {
        self.send(HttpRequest::new(HttpMethod::Delete, resource_uri))
            .await?;
        debug!("Deleted subscription");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn create_subscription(&self, callback_url: &str) -> Result<Subscription> {
        let request = HttpRequest::new(HttpMethod::Post, self.endpoint(SUBSCRIPTION_PATH)).json(
            &NewSubscription {
                callback_url,
                scope: CUSTOMER_SCOPE,
            },
        )?;

        let response = self.send(request).await?;
        response
            .json()
            .map_err(|e| TenToEightError::ParseError(e.to_string()).into())
    }

    /// Replace every customer subscription with one for `callback_url`.
    ///
    /// Fails without touching anything when the existing subscriptions
    /// cannot be listed.
    #[instrument(skip(self))]
    pub async fn register_customer_subscription(&self, callback_url: &str) -> Result<Subscription> {
        let existing = self.list_subscriptions().await?;

        for subscription in existing
            .iter()
            .filter(|subscription| subscription.scope == CUSTOMER_SCOPE)
        {
            self.delete_subscription(&subscription.resource_uri).await?;
        }

        let subscription = self.create_subscription(callback_url).await?;
        info!(uri = %subscription.resource_uri, "Registered customer subscription");
        Ok(subscription)
    }
}

/// Parse a subscription notification body.
///
/// Only customer-scoped bodies yield notifications, one `Updated` per item.
/// Any other scope, or a body without items, yields an empty batch. The
/// callback does not say what changed, so the engine re-reads each customer
/// and discovers deletions from the lookup.
pub fn parse_subscription_notification(body: &[u8]) -> crate::error::Result<Vec<Notification>> {
    let notification: SubscriptionNotification = serde_json::from_slice(body)
        .map_err(|e| TenToEightError::InvalidNotification(e.to_string()))?;

    if notification.scope.as_deref() != Some(CUSTOMER_SCOPE) {
        debug!(scope = ?notification.scope, "Ignoring notification outside the customer scope");
        return Ok(Vec::new());
    }

    Ok(notification
        .items
        .unwrap_or_default()
        .into_iter()
        .filter(|uri| !uri.trim().is_empty())
        .map(|uri| Notification::booking(NotificationKind::Updated, uri))
        .collect())
}
