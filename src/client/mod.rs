//! Typed HTTP client for the catalog REST API.
//!
//! Reads and mutations get separate deadlines. Idempotent reads are
//! retried when they time out; mutations are never retried, since a
//! timed-out mutation may still have been applied.

mod error;

pub use error::{ClientError, ErrorKind};

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::dto::{
    CategoryRequest, DeletedCategoryResponse, DeletedProductResponse, LoginRequest,
    LoginResponse, MessageResponse, ProductRequest, SeedResponse,
};
use crate::domain::{
    ActivityAction, ActivityLogEntry, Actor, CatalogStatistics, Category, CategoryId, Product,
    ProductFilter, ProductId,
};
use crate::error::ErrorResponse;

/// Deadlines and retry policy for [`CatalogClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Deadline for a single read attempt.
    pub read_timeout: Duration,
    /// Deadline for a mutation.
    pub write_timeout: Duration,
    /// Extra attempts for a read that timed out.
    pub read_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(15),
            read_retries: 1,
        }
    }
}

/// HTTP client for one catalog server.
///
/// The bearer token is held by the client value itself; clone the client
/// to share a session.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
    config: ClientConfig,
}

impl CatalogClient {
    /// Creates a client for the server at `base_url` with default deadlines.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Invalid`] if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_config(base_url, ClientConfig::default())
    }

    /// Creates a client with explicit deadlines and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Invalid`] if `base_url` is not an absolute URL.
    pub fn with_config(base_url: &str, config: ClientConfig) -> Result<Self, ClientError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base = Url::parse(&normalized).map_err(|e| {
            ClientError::new(ErrorKind::Invalid, format!("invalid base url '{base_url}': {e}"))
        })?;
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            token: None,
            config,
        })
    }

    /// Returns the client carrying `token` as its bearer credential.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Current bearer token, if signed in.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Probes `GET /health`. Never retried.
    pub async fn check_server_connection(&self) -> bool {
        let Ok(url) = self.url("health") else {
            return false;
        };
        match self
            .http
            .get(url)
            .timeout(self.config.read_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "server connection check failed");
                false
            }
        }
    }

    // ── Auth ────────────────────────────────────────────────────────────

    /// Logs in and keeps the returned token for subsequent calls.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Unauthenticated`] for invalid credentials.
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, ClientError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self
            .write(Method::POST, "api/auth/login", Some(&body))
            .await?;
        self.token = Some(response.token.clone());
        Ok(response)
    }

    /// Revokes the current token and forgets it.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Unauthenticated`] if the token is already invalid;
    /// the token is forgotten either way.
    pub async fn logout(&mut self) -> Result<MessageResponse, ClientError> {
        let result = self
            .write::<(), _>(Method::POST, "api/auth/logout", None)
            .await;
        self.token = None;
        result
    }

    /// Returns the user behind the current token.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Unauthenticated`] without a valid token.
    pub async fn me(&self) -> Result<Actor, ClientError> {
        self.read("api/auth/me", &[]).await
    }

    // ── Categories ──────────────────────────────────────────────────────

    /// Lists all categories.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] carrying the server's message.
    pub async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        self.read("api/categories", &[]).await
    }

    /// Fetches one category.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotFound`] for an unknown id.
    pub async fn get_category(&self, id: CategoryId) -> Result<Category, ClientError> {
        self.read(&format!("api/categories/{id}"), &[]).await
    }

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Conflict`] for a duplicate name.
    pub async fn create_category(&self, req: &CategoryRequest) -> Result<Category, ClientError> {
        self.write(Method::POST, "api/categories", Some(req)).await
    }

    /// Replaces a category.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] carrying the server's message.
    pub async fn update_category(
        &self,
        id: CategoryId,
        req: &CategoryRequest,
    ) -> Result<Category, ClientError> {
        self.write(Method::PUT, &format!("api/categories/{id}"), Some(req))
            .await
    }

    /// Deletes a category.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Conflict`] while products reference it.
    pub async fn delete_category(
        &self,
        id: CategoryId,
    ) -> Result<DeletedCategoryResponse, ClientError> {
        self.write::<(), _>(Method::DELETE, &format!("api/categories/{id}"), None)
            .await
    }

    /// Creates the missing sample categories.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Forbidden`] for non-admins.
    pub async fn seed_categories(&self) -> Result<SeedResponse, ClientError> {
        self.write::<(), _>(Method::POST, "api/categories/seed", None)
            .await
    }

    // ── Products ────────────────────────────────────────────────────────

    /// Lists products matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] carrying the server's message.
    pub async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ClientError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(id) = filter.category_id {
            params.push(("categoryId", id.to_string()));
        }
        if let Some(keyword) = &filter.keyword {
            params.push(("keyword", keyword.clone()));
        }
        if let Some(status) = filter.status {
            params.push(("status", status.to_string()));
        }
        if let Some(min) = filter.min_price {
            params.push(("minPrice", min.to_string()));
        }
        if let Some(max) = filter.max_price {
            params.push(("maxPrice", max.to_string()));
        }
        self.read("api/products", &params).await
    }

    /// Fetches one product.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotFound`] for an unknown id.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ClientError> {
        self.read(&format!("api/products/{id}"), &[]).await
    }

    /// Creates a product.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Conflict`] for a duplicate SKU or
    /// [`ErrorKind::Invalid`] for an unknown category.
    pub async fn create_product(&self, req: &ProductRequest) -> Result<Product, ClientError> {
        self.write(Method::POST, "api/products", Some(req)).await
    }

    /// Replaces a product.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] carrying the server's message.
    pub async fn update_product(
        &self,
        id: ProductId,
        req: &ProductRequest,
    ) -> Result<Product, ClientError> {
        self.write(Method::PUT, &format!("api/products/{id}"), Some(req))
            .await
    }

    /// Deletes a product.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Forbidden`] for non-admins.
    pub async fn delete_product(&self, id: ProductId) -> Result<DeletedProductResponse, ClientError> {
        self.write::<(), _>(Method::DELETE, &format!("api/products/{id}"), None)
            .await
    }

    // ── Reports ─────────────────────────────────────────────────────────

    /// Fetches catalog statistics.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] carrying the server's message.
    pub async fn statistics(&self) -> Result<CatalogStatistics, ClientError> {
        self.read("api/reports/statistics", &[]).await
    }

    /// Fetches activity history for the last `days` days.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Invalid`] for an out-of-range window.
    pub async fn history(
        &self,
        days: u32,
        action: Option<ActivityAction>,
    ) -> Result<Vec<ActivityLogEntry>, ClientError> {
        let mut params = vec![("timeRange", days.to_string())];
        if let Some(action) = action {
            params.push(("action", action.to_string()));
        }
        self.read("api/reports/history", &params).await
    }

    // ── Transport ───────────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path)
            .map_err(|e| ClientError::new(ErrorKind::Invalid, format!("invalid path '{path}': {e}")))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// GET with the read deadline, retried on timeout.
    async fn read<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let mut url = self.url(path)?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }

        let mut attempt = 0;
        loop {
            let request = self
                .authorized(self.http.get(url.clone()))
                .timeout(self.config.read_timeout);
            match Self::execute(request).await {
                Err(e) if e.is_timeout() && attempt < self.config.read_retries => {
                    attempt += 1;
                    tracing::warn!(%url, attempt, "read timed out; retrying");
                }
                other => return other,
            }
        }
    }

    /// Single-attempt mutation with the write deadline.
    async fn write<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let url = self.url(path)?;
        let mut request = self
            .authorized(self.http.request(method, url))
            .timeout(self.config.write_timeout);
        if let Some(body) = body {
            request = request.json(body);
        }
        Self::execute(request).await
    }

    async fn execute<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response.json::<T>().await?);
        }
        Err(Self::error_from(response).await)
    }

    async fn error_from(response: Response) -> ClientError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| body.message)
            .ok()
            .filter(|m| !m.is_empty())
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        ClientError {
            kind: ErrorKind::from_status(status),
            status: Some(status.as_u16()),
            message,
        }
    }
}
