//! HubSpot API connector implementation
//!
//! Implements the `CrmStore` trait for the HubSpot CRM v3 contacts API.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::{CrmContact, CrmProperties, CrmStore, Fetched};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::HubSpotError;
use crate::types::{ContactsPage, CreatedContact, PropertiesPayload, SearchRequest};

/// HubSpot API base URL
pub const DEFAULT_API_BASE: &str = "https://api.hubapi.com";

const CONTACTS_PATH: &str = "/crm/v3/objects/contacts";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HubSpot CRM connector
///
/// Implements `CrmStore` over the contact object. Every read requests the
/// properties in [`CrmProperties::FETCHED`].
///
/// # Example
///
/// ```ignore
/// use provider_hubspot::HubSpotConnector;
/// use bridge_traits::CrmStore;
///
/// let connector = HubSpotConnector::new(http_client, access_token);
/// let linked = connector.find_by_cross_ref(customer_uri).await?;
/// ```
#[derive(Clone)]
pub struct HubSpotConnector {
    http_client: Arc<dyn HttpClient>,

    /// Private-app access token
    access_token: String,

    api_base: String,

    timeout: Duration,
}

impl HubSpotConnector {
    /// Create a connector against the public API host.
    pub fn new(http_client: Arc<dyn HttpClient>, access_token: impl Into<String>) -> Self {
        Self {
            http_client,
            access_token: access_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn contacts_url(&self) -> String {
        format!("{}{}", self.api_base, CONTACTS_PATH)
    }

    fn contact_url(&self, id: &str) -> String {
        format!("{}/{}", self.contacts_url(), urlencoding::encode(id))
    }

    fn properties_query() -> String {
        urlencoding::encode(&CrmProperties::FETCHED.join(",")).into_owned()
    }

    #[instrument(skip(self, request), fields(method = ?request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let request = request
            .bearer_token(self.access_token.as_str())
            .header("Accept", "application/json")
            .timeout(self.timeout);

        let response = self.http_client.execute(request).await?;
        if response.is_success() {
            debug!(status = response.status, "API request succeeded");
            return Ok(response);
        }

        if response.status != 404 {
            warn!(status = response.status, "API request failed");
        }
        Err(HubSpotError::ApiError {
            status_code: response.status,
            message: String::from_utf8_lossy(&response.body).to_string(),
        }
        .into())
    }
}

#[async_trait]
impl CrmStore for HubSpotConnector {
    #[instrument(skip(self, cursor))]
    async fn fetch_page(
        &self,
        cursor: Option<String>,
        limit: usize,
        archived: bool,
    ) -> Result<(Vec<CrmContact>, Option<String>)> {
        let mut url = format!(
            "{}?limit={}&archived={}&properties={}",
            self.contacts_url(),
            limit,
            archived,
            Self::properties_query()
        );
        if let Some(after) = cursor {
            url.push_str(&format!("&after={}", urlencoding::encode(&after)));
        }

        let response = self.send(HttpRequest::new(HttpMethod::Get, url)).await?;
        let page: ContactsPage = response
            .json()
            .map_err(|e| HubSpotError::ParseError(e.to_string()))?;

        let next = page.next_after();
        info!(
            count = page.results.len(),
            has_more = next.is_some(),
            "Fetched page of contacts"
        );

        Ok((page.results, next))
    }

    #[instrument(skip(self))]
    async fn fetch_one(&self, id: &str, include_archived: bool) -> Result<Fetched<CrmContact>> {
        let url = format!(
            "{}?archived={}&properties={}",
            self.contact_url(id),
            include_archived,
            Self::properties_query()
        );

        let response = match self.send(HttpRequest::new(HttpMethod::Get, url)).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                debug!("Contact not found");
                return Ok(Fetched::NotFound);
            }
            Err(e) => return Err(e),
        };

        let contact: CrmContact = response
            .json()
            .map_err(|e| HubSpotError::ParseError(e.to_string()))?;
        Ok(Fetched::Found(contact))
    }

    #[instrument(skip(self))]
    async fn find_by_cross_ref(&self, booking_uri: &str) -> Result<Vec<CrmContact>> {
        let request = HttpRequest::new(HttpMethod::Post, format!("{}/search", self.contacts_url()))
            .json(&SearchRequest::by_cross_reference(booking_uri))?;

        let response = self.send(request).await?;
        let page: ContactsPage = response
            .json()
            .map_err(|e| HubSpotError::ParseError(e.to_string()))?;

        debug!(matches = page.results.len(), "Searched contacts by cross-reference");
        Ok(page.results)
    }

    #[instrument(skip(self, properties))]
    async fn create(&self, properties: &CrmProperties) -> Result<String> {
        let request = HttpRequest::new(HttpMethod::Post, self.contacts_url())
            .json(&PropertiesPayload { properties })?;

        let response = self.send(request).await?;
        let created: CreatedContact = response
            .json()
            .map_err(|e| HubSpotError::ParseError(e.to_string()))?;

        info!(id = %created.id, "Created contact");
        Ok(created.id)
    }

    #[instrument(skip(self, properties))]
    async fn update(&self, id: &str, properties: &CrmProperties) -> Result<()> {
        let request = HttpRequest::new(HttpMethod::Patch, self.contact_url(id))
            .json(&PropertiesPayload { properties })?;

        self.send(request).await?;
        debug!("Updated contact");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn archive(&self, id: &str) -> Result<()> {
        self.send(HttpRequest::new(HttpMethod::Delete, self.contact_url(id)))
            .await?;
        info!("Archived contact");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
        }
    }

    const PROPERTIES: &str = "firstname%2Clastname%2Chs_object_id%2Cemail%2Cphone%2Ctte_customer_uri%2Ctte_customer_secondary_emails%2Ctte_customer_secondary_phone%2Ctte_customer_sync_status";

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn connector(http_client: MockHttpClient) -> HubSpotConnector {
        HubSpotConnector::new(Arc::new(http_client), "pat-token")
    }

    fn body_json(request: &HttpRequest) -> serde_json::Value {
        serde_json::from_slice(request.body.as_deref().unwrap_or_default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_page_with_cursor() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .withf(|request| {
                request.method == HttpMethod::Get
                    && request.url
                        == format!(
                            "https://api.hubapi.com/crm/v3/objects/contacts?limit=10&archived=true&properties={}&after=600",
                            PROPERTIES
                        )
                    && request.headers.get("Authorization") == Some(&"Bearer pat-token".to_string())
            })
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"results": [{"id": "601", "properties": {"firstname": "Ada"}, "archived": true}]}"#,
                ))
            });

        let (contacts, next) = connector(http_client)
            .fetch_page(Some("600".to_string()), 10, true)
            .await
            .unwrap();

        assert_eq!(contacts.len(), 1);
        assert!(contacts[0].archived);
        assert_eq!(next, None);
    }

    #[tokio::test]
    async fn test_fetch_one_not_found() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .withf(|request| {
                request.url.starts_with("https://api.hubapi.com/crm/v3/objects/contacts/501?archived=false")
            })
            .times(1)
            .returning(|_| Ok(response(404, r#"{"status": "error", "category": "OBJECT_NOT_FOUND"}"#)));

        let fetched = connector(http_client).fetch_one("501", false).await.unwrap();

        assert_eq!(fetched, Fetched::NotFound);
    }

    #[tokio::test]
    async fn test_find_by_cross_ref_posts_search() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .withf(|request| {
                let body = body_json(request);
                request.method == HttpMethod::Post
                    && request.url == "https://api.hubapi.com/crm/v3/objects/contacts/search"
                    && body["filterGroups"][0]["filters"][0]["value"] == "https://10to8.com/c/42/"
            })
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"total": 2, "results": [
                        {"id": "7", "properties": {"tte_customer_uri": "https://10to8.com/c/42/"}},
                        {"id": "8", "properties": {"tte_customer_uri": "https://10to8.com/c/42/"}}
                    ]}"#,
                ))
            });

        let contacts = connector(http_client)
            .find_by_cross_ref("https://10to8.com/c/42/")
            .await
            .unwrap();

        let ids: Vec<_> = contacts.iter().map(|contact| contact.id.as_str()).collect();
        assert_eq!(ids, vec!["7", "8"]);
    }

    #[tokio::test]
    async fn test_create_returns_id() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .withf(|request| {
                request.method == HttpMethod::Post
                    && request.url == "https://api.hubapi.com/crm/v3/objects/contacts"
                    && body_json(request)
                        == serde_json::json!({
                            "properties": {"firstname": "Ada", "email": "ada@x.com"}
                        })
            })
            .times(1)
            .returning(|_| Ok(response(201, r#"{"id": "501", "properties": {}}"#)));

        let properties = CrmProperties {
            first_name: Some("Ada".to_string()),
            email: Some("ada@x.com".to_string()),
            ..Default::default()
        };

        let id = connector(http_client).create(&properties).await.unwrap();

        assert_eq!(id, "501");
    }

    #[tokio::test]
    async fn test_update_patches_properties() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .withf(|request| {
                request.method == HttpMethod::Patch
                    && request.url == "https://api.hubapi.com/crm/v3/objects/contacts/501"
                    && body_json(request)
                        == serde_json::json!({
                            "properties": {"tte_customer_sync_status": "Last synced: t"}
                        })
            })
            .times(1)
            .returning(|_| Ok(response(200, r#"{"id": "501", "properties": {}}"#)));

        connector(http_client)
            .update("501", &CrmProperties::status_only("Last synced: t"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_property_is_reported() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .times(1)
            .returning(|_| Ok(response(400, "Property values were not valid")));

        let error = connector(http_client)
            .update("501", &CrmProperties::status_only("Last synced: t"))
            .await
            .unwrap_err();

        assert_eq!(error.status(), Some(400));
    }

    #[tokio::test]
    async fn test_archive_deletes_contact() {
        let mut http_client = MockHttpClient::new();
        http_client
            .expect_execute()
            .withf(|request| {
                request.method == HttpMethod::Delete
                    && request.url == "https://api.hubapi.com/crm/v3/objects/contacts/501"
            })
            .times(1)
            .returning(|_| Ok(response(204, "")));

        connector(http_client).archive("501").await.unwrap();
    }
}
