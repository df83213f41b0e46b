//! 10to8 API connector implementation
//!
//! Implements the `BookingStore` trait for the 10to8 Enterprise API v2.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::{BookingAttributes, BookingCustomer, BookingStore, Fetched};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::TenToEightError;
use crate::rate_limit::RateLimiter;
use crate::types::{CustomerPage, CustomerPayload, CustomerResource};

/// 10to8 production host
pub const DEFAULT_API_BASE: &str = "https://10to8.com";

pub(crate) const CUSTOMER_PATH: &str = "/api/enterprise/v2/customer/";
pub(crate) const SUBSCRIPTION_PATH: &str = "/api/enterprise/v2/subscription/";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// 10to8 Enterprise API connector
///
/// Implements `BookingStore` over the customer resource.
///
/// # Features
///
/// - Paginated customer listing following the API's `next` links
/// - Partial updates that only send the supplied fields
/// - Forced deletes that skip the future-booking conflict check
/// - Every call spaced by a shared [`RateLimiter`]
///
/// # Example
///
/// ```ignore
/// use provider_tentoeight::TenToEightConnector;
/// use bridge_traits::BookingStore;
///
/// let connector = TenToEightConnector::new(http_client, api_key);
/// let (customers, next) = connector.fetch_page(None, 10, false).await?;
/// ```
#[derive(Clone)]
pub struct TenToEightConnector {
    http_client: Arc<dyn HttpClient>,

    /// Enterprise API key
    api_key: String,

    /// Scheme and host, no trailing slash
    api_base: String,

    rate_limiter: RateLimiter,

    timeout: Duration,
}

impl TenToEightConnector {
    /// Create a connector against the production host.
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `api_key` - Enterprise API key of the 10to8 organisation
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            rate_limiter: RateLimiter::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL for an API path.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn auth_header(&self) -> String {
        format!("token {}", self.api_key)
    }

    /// Send a request once the rate limiter allows it.
    ///
    /// Non-2xx responses come back as [`TenToEightError::ApiError`].
    #[instrument(skip(self, request), fields(method = ?request.method, url = %request.url))]
    pub(crate) async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.rate_limiter.acquire().await;

        let request = request
            .header("Authorization", self.auth_header())
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
        Err(TenToEightError::ApiError {
            status_code: response.status,
            message: String::from_utf8_lossy(&response.body).to_string(),
        }
        .into())
    }

    /// Resolve a `Location` header that may be relative to the API host.
    fn absolute_uri(&self, location: &str) -> String {
        if location.starts_with('/') {
            self.endpoint(location)
        } else {
            location.to_string()
        }
    }
}

#[async_trait]
impl BookingStore for TenToEightConnector {
    #[instrument(skip(self, cursor))]
    async fn fetch_page(
        &self,
        cursor: Option<String>,
        limit: usize,
        include_deleted: bool,
    ) -> Result<(Vec<BookingCustomer>, Option<String>)> {
        // The cursor is the `next` link of the previous page and already
        // carries the query.
        let url = cursor.unwrap_or_else(|| {
            format!(
                "{}?include_deleted={}&limit={}",
                self.endpoint(CUSTOMER_PATH),
                include_deleted,
                limit
            )
        });

        let response = self.send(HttpRequest::new(HttpMethod::Get, url)).await?;
        let page: CustomerPage = response
            .json()
            .map_err(|e| TenToEightError::ParseError(e.to_string()))?;

        let next = page.next.filter(|next| !next.is_empty());
        let customers: Vec<BookingCustomer> =
            page.results.into_iter().map(BookingCustomer::from).collect();

        info!(
            count = customers.len(),
            has_more = next.is_some(),
            "Fetched page of customers"
        );

        Ok((customers, next))
    }

    #[instrument(skip(self))]
    async fn fetch_one(&self, uri: &str) -> Result<Fetched<BookingCustomer>> {
        let response = match self.send(HttpRequest::new(HttpMethod::Get, uri)).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                debug!("Customer not found");
                return Ok(Fetched::NotFound);
            }
            Err(e) => return Err(e),
        };

        let resource: CustomerResource = response
            .json()
            .map_err(|e| TenToEightError::ParseError(e.to_string()))?;

        Ok(Fetched::Found(resource.into()))
    }

    #[instrument(skip(self, attributes), fields(external_id = ?attributes.external_id))]
    async fn create(&self, attributes: &BookingAttributes) -> Result<String> {
        let request = HttpRequest::new(HttpMethod::Post, self.endpoint(CUSTOMER_PATH))
            .json(&CustomerPayload::for_create(attributes))?;

        let response = self.send(request).await?;
        let location = response
            .header("Location")
            .filter(|location| !location.is_empty())
            .ok_or(TenToEightError::MissingLocation)?;

        let uri = self.absolute_uri(location);
        info!(%uri, "Created customer");
        Ok(uri)
    }

    #[instrument(skip(self, attributes), fields(fields = attributes.field_count()))]
    async fn update(&self, uri: &str, attributes: &BookingAttributes) -> Result<()> {
        let request = HttpRequest::new(HttpMethod::Patch, uri)
            .json(&CustomerPayload::for_update(attributes))?;

        self.send(request).await?;
        debug!("Updated customer");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, uri: &str, force: bool) -> Result<()> {
        let url = format!("{}?force={}", uri, force);

        self.send(HttpRequest::new(HttpMethod::Delete, url)).await?;
        info!("Deleted customer");
        Ok(())
    }
}
