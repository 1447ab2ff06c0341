//! ERP query gateway client.
//!
//! Low-level HTTP client that handles authentication and raw requests, and
//! implements [`QueryApi`] on top of them. Typed lookups and cache refreshes
//! are provided by the helper traits on entity types.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::api::QueryApi;
use crate::cache::{CacheChanges, EntityCache};
use crate::company::Company;
use crate::entity::{Entity, EntityType};
use crate::error::{ErpError, Result};
use crate::filter::QueryFilter;

const DEFAULT_API_URL: &str = "https://erp.example.com/api";
const USER_AGENT: &str = concat!("erplookup/", env!("CARGO_PKG_VERSION"));

/// ERP query gateway client.
///
/// Every request is scoped to the client's [`Company`], which also owns the
/// entity caches loaded through this client.
///
/// This struct is cheaply cloneable; clones share the underlying connection
/// pool and the same company cache registry.
///
/// # Example
///
/// ```no_run
/// use erplookup::ErpClient;
///
/// # fn example() -> erplookup::Result<()> {
/// // Create from environment variables
/// let client = ErpClient::from_env()?;
///
/// // Or configure manually
/// let client = ErpClient::new("your-api-key", "https://erp.example.com/api", 1042)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ErpClient {
    http: Client,
    base_url: Arc<Url>,
    token: String,
    company: Arc<Company>,
}

impl std::fmt::Debug for ErpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpClient")
            .field("base_url", &self.base_url.as_str())
            .field("company", &self.company.id())
            .finish_non_exhaustive()
    }
}

/// Body of a query request.
#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    filters: &'a [QueryFilter],
}

/// Query response; the gateway may send `null` rows for an empty result.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct QueryResponse<T> {
    #[serde(default)]
    rows: Option<Vec<T>>,
}

/// Full cache load response; an empty table may come back with `null` rows.
#[derive(Debug, Deserialize)]
struct CacheSnapshot {
    #[serde(default)]
    rows: Option<Vec<Value>>,
}

/// Query string of a cache changes request.
#[derive(Debug, Serialize)]
pub(crate) struct ChangesQuery {
    pub(crate) since: DateTime<Utc>,
}

impl ErpClient {
    /// Create a client from environment variables.
    ///
    /// Uses `ERP_API_KEY` for authentication, `ERP_COMPANY_ID` for the
    /// company context, and optionally `ERP_API_URL` for the base URL
    /// (defaults to `https://erp.example.com/api`).
    ///
    /// # Errors
    ///
    /// Returns an error if `ERP_API_KEY` or `ERP_COMPANY_ID` is not set, or
    /// if the company id is not a number.
    pub fn from_env() -> Result<Self> {
        let token = env::var("ERP_API_KEY").map_err(|_| {
            ErpError::ConfigMissing("ERP_API_KEY environment variable not set".to_string())
        })?;

        let company = env::var("ERP_COMPANY_ID").map_err(|_| {
            ErpError::ConfigMissing("ERP_COMPANY_ID environment variable not set".to_string())
        })?;
        let company: u32 = company.trim().parse().map_err(|_| {
            ErpError::InvalidArgument(format!("ERP_COMPANY_ID must be a number, got '{company}'"))
        })?;

        let base_url = env::var("ERP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Self::new(&token, &base_url, company)
    }

    /// Create a new client for `company_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(token: &str, base_url: &str, company_id: u32) -> Result<Self> {
        Self::with_company(token, base_url, Company::new(company_id))
    }

    /// Create a new client for an existing company context.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn with_company(token: &str, base_url: &str, company: Company) -> Result<Self> {
        // Ensure base URL ends with /
        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base_url = Url::parse(&base_url_str)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(ErpError::HttpError)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            token: token.to_string(),
            company: Arc::new(company),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The company context requests are scoped to.
    pub fn company(&self) -> &Company {
        &self.company
    }

    /// Make a GET request.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = self.base_url.join(path)?;

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(ErpError::HttpError)?;

        Self::check_response(response).await
    }

    /// Make a GET request with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Response> {
        let url = self.base_url.join(path)?;

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .map_err(ErpError::HttpError)?;

        Self::check_response(response).await
    }

    /// Make a POST request with JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = self.base_url.join(path)?;

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(ErpError::HttpError)?;

        Self::check_response(response).await
    }

    /// Relative path of a company-scoped resource for an entity type.
    fn company_path(&self, resource: &str, entity_type: EntityType) -> String {
        format!(
            "companies/{}/{}/{}",
            self.company.id(),
            resource,
            urlencoding::encode(entity_type.name())
        )
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        // Handle rate limiting
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(ErpError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let message = Self::extract_error_message(response, status).await;
        Err(ErpError::ApiError {
            message,
            status_code: Some(status.as_u16()),
        })
    }

    /// Extract error message from a failed response.
    async fn extract_error_message(response: Response, status: reqwest::StatusCode) -> String {
        let body = match response.text().await {
            Ok(b) => b,
            Err(_) => return format!("HTTP {status}"),
        };

        if let Ok(json) = serde_json::from_str::<Value>(&body) {
            if let Some(msg) = json.get("message").and_then(|m| m.as_str()) {
                return msg.to_string();
            }
            if let Some(err) = json.get("error").and_then(|m| m.as_str()) {
                return err.to_string();
            }
        }

        if body.is_empty() {
            format!("HTTP {status}")
        } else {
            body
        }
    }
}

#[async_trait]
impl QueryApi for ErpClient {
    type Error = ErpError;
    type Cache = Arc<EntityCache>;

    #[tracing::instrument(skip(self, filters), fields(entity = %T::ENTITY_TYPE, filters = filters.len()))]
    async fn query<T: Entity>(&self, filters: &[QueryFilter]) -> Result<Vec<T>> {
        let path = self.company_path("query", T::ENTITY_TYPE);

        let response = self.post(&path, &QueryRequest { filters }).await?;
        let data: QueryResponse<T> = response.json().await.map_err(ErpError::HttpError)?;

        Ok(data.rows.unwrap_or_default())
    }

    fn has_cache(&self, entity_type: EntityType) -> bool {
        self.company.has_cache(entity_type)
    }

    #[tracing::instrument(skip(self))]
    async fn update_cache(&self, entity_types: &[EntityType]) -> Result<()> {
        for &entity_type in entity_types {
            let Some(current) = self.company.cache(entity_type) else {
                tracing::debug!(%entity_type, "no cache registered, nothing to update");
                continue;
            };

            let path = format!("{}/changes", self.company_path("cache", entity_type));
            let requested_at = Utc::now();
            let query = ChangesQuery {
                since: current.loaded_at(),
            };

            let response = self.get_with_query(&path, &query).await?;
            let changes: CacheChanges = response.json().await.map_err(ErpError::HttpError)?;

            if changes.reset {
                tracing::debug!(%entity_type, "server requested a full reload, evicting cache");
                self.company.evict(entity_type);
                continue;
            }

            tracing::debug!(
                %entity_type,
                changed = changes.rows.len(),
                deleted = changes.deleted.len(),
                "applying cache changes"
            );
            self.company
                .store(current.apply_changes(changes, requested_at));
        }

        Ok(())
    }

    fn get_cache(&self, entity_type: EntityType) -> Option<Arc<EntityCache>> {
        self.company.cache(entity_type)
    }

    #[tracing::instrument(skip(self))]
    async fn load_cache(&self, entity_type: EntityType) -> Result<Arc<EntityCache>> {
        let path = self.company_path("cache", entity_type);
        let requested_at = Utc::now();

        let response = self.get(&path).await?;
        let snapshot: CacheSnapshot = response.json().await.map_err(ErpError::HttpError)?;
        let rows = snapshot.rows.unwrap_or_default();

        tracing::debug!(%entity_type, rows = rows.len(), "cache loaded");
        Ok(self
            .company
            .store(EntityCache::new(entity_type, rows, requested_at)))
    }
}
