use crate::domain::model::{
    BuildRequest, CatalogStats, Category, HealthStatus, Notification, Part, PartsQuery,
    RecommendationResponse,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The remote recommendation and parts catalog service.
#[async_trait]
pub trait AdvisorApi: Send + Sync {
    async fn health(&self) -> Result<HealthStatus>;
    async fn recommend(&self, request: &BuildRequest) -> Result<RecommendationResponse>;
    async fn fetch_parts(&self, query: &PartsQuery) -> Result<Vec<Part>>;
    async fn list_all_parts(&self) -> Result<Vec<Part>>;
    async fn catalog_stats(&self) -> Result<CatalogStats>;
    async fn api_info(&self) -> Result<serde_json::Value>;
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn page_size(&self) -> usize;
    fn default_category(&self) -> Category;
}
