use crate::domain::model::{
    BuildRequest, CatalogStats, HealthStatus, Part, PartsQuery, RecommendationResponse,
};
use crate::domain::ports::{AdvisorApi, ConfigProvider};
use crate::utils::error::{AdvisorError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// reqwest-backed client for the BuildMyRig HTTP API.
#[derive(Debug, Clone)]
pub struct HttpAdvisorClient {
    client: Client,
    base_url: Url,
}

impl HttpAdvisorClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: normalize_base(base_url)?,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.base_url(),
            Duration::from_secs(config.timeout_seconds()),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Sends the request and decodes a JSON body. Non-2xx and undecodable bodies are both errors.
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, endpoint: &Url) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("{} -> {}", endpoint, status);

        if !status.is_success() {
            return Err(AdvisorError::HttpStatusError {
                status: status.as_u16(),
                endpoint: endpoint.path().to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

// Url::join drops the last path segment unless the base ends with '/'.
fn normalize_base(base_url: &str) -> Result<Url> {
    let trimmed = base_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    Ok(Url::parse(&with_slash)?)
}

#[async_trait]
impl AdvisorApi for HttpAdvisorClient {
    async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint("health")?;
        tracing::debug!("Checking API health at: {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdvisorError::HttpStatusError {
                status: status.as_u16(),
                endpoint: url.path().to_string(),
            });
        }

        // 只看狀態碼；回應內容不是 JSON 也算健康
        let body = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str(&body).unwrap_or_else(|_| HealthStatus {
            status: "healthy".to_string(),
            message: None,
        }))
    }

    async fn recommend(&self, request: &BuildRequest) -> Result<RecommendationResponse> {
        let url = self.endpoint("recommend")?;
        tracing::debug!(
            "POST {} (budget: {}, use_case: {})",
            url,
            request.budget(),
            request.use_case()
        );
        let builder = self.client.post(url.clone()).json(request);
        self.send_json(builder, &url).await
    }

    async fn fetch_parts(&self, query: &PartsQuery) -> Result<Vec<Part>> {
        let url = self.endpoint(&format!("parts/{}", query.category))?;
        tracing::debug!(
            "GET {} (limit: {}, offset: {}, sort: {} {})",
            url,
            query.limit,
            query.offset,
            query.sort.by.as_str(),
            query.sort.order.as_str()
        );
        let builder = self.client.get(url.clone()).query(&query.query_pairs());
        self.send_json(builder, &url).await
    }

    async fn list_all_parts(&self) -> Result<Vec<Part>> {
        let url = self.endpoint("parts")?;
        let builder = self.client.get(url.clone());
        self.send_json(builder, &url).await
    }

    async fn catalog_stats(&self) -> Result<CatalogStats> {
        let url = self.endpoint("stats")?;
        let builder = self.client.get(url.clone());
        self.send_json(builder, &url).await
    }

    async fn api_info(&self) -> Result<serde_json::Value> {
        let url = self.endpoint("api")?;
        let builder = self.client.get(url.clone());
        self.send_json(builder, &url).await
    }
}
