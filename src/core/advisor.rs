use crate::core::sequence::{RequestSequencer, RequestToken};
use crate::domain::model::{
    page_signals_more, BuildRequest, BuildResult, CatalogStats, Category, Notification, Part,
    PartsQuery, PartsSort, DEFAULT_PAGE_SIZE,
};
use crate::domain::ports::{AdvisorApi, Notifier};
use crate::utils::error::{AdvisorError, Result};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub const MSG_BUILDS_FOUND: &str = "Build recommendations found!";
pub const MSG_NO_BUILDS: &str = "No builds found for your criteria";
pub const MSG_RECOMMEND_FAILED: &str = "Failed to get recommendations. Please try again.";
pub const MSG_PARTS_FAILED: &str = "Failed to load parts";
pub const MSG_LOAD_MORE_FAILED: &str = "Failed to load more parts";
pub const MSG_API_UNHEALTHY: &str = "API connection failed. Please ensure the backend is running.";
pub const MSG_UNEXPECTED: &str = "An unexpected error occurred. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub struct BuildCard {
    /// 1-based position in the service's ranking.
    pub number: usize,
    pub build: BuildResult,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildResultsView {
    pub loading: bool,
    pub visible: bool,
    pub cards: Vec<BuildCard>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartsStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Empty,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartsView {
    pub category: Option<Category>,
    pub sort: PartsSort,
    pub brand: Option<String>,
    pub parts: Vec<Part>,
    pub status: PartsStatus,
    pub load_more: bool,
    pub loading_more: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rendered(usize),
    NoResults,
    /// A newer submission was issued while this one was in flight.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Loaded {
        received: usize,
        shown: usize,
        more: bool,
    },
    Empty,
    Stale,
    /// Nothing to do: no category loaded, no more pages hinted, or a load-more already running.
    Skipped,
}

/// The advisor component: build results and the parts browser, each with its own request generation.
pub struct BuildAdvisor<A: AdvisorApi, N: Notifier> {
    api: A,
    notifier: N,
    page_size: usize,
    service_label: String,
    builds: Mutex<BuildResultsView>,
    parts: Mutex<PartsView>,
    build_requests: RequestSequencer,
    parts_requests: RequestSequencer,
}

impl<A: AdvisorApi, N: Notifier> BuildAdvisor<A, N> {
    pub fn new(api: A, notifier: N) -> Self {
        Self {
            api,
            notifier,
            page_size: DEFAULT_PAGE_SIZE,
            service_label: "the configured address".to_string(),
            builds: Mutex::new(BuildResultsView::default()),
            parts: Mutex::new(PartsView::default()),
            build_requests: RequestSequencer::new(),
            parts_requests: RequestSequencer::new(),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Where the service is expected to run; used in connection failure messages.
    pub fn with_service_label(mut self, label: impl Into<String>) -> Self {
        self.service_label = label.into();
        self
    }

    pub fn builds(&self) -> BuildResultsView {
        self.lock_builds().clone()
    }

    pub fn parts(&self) -> PartsView {
        self.lock_parts().clone()
    }

    fn lock_builds(&self) -> MutexGuard<'_, BuildResultsView> {
        self.builds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_parts(&self) -> MutexGuard<'_, PartsView> {
        self.parts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fail(&self, message: &str, error: &AdvisorError) {
        tracing::error!("{}: {}", message, error);
        self.notifier.notify(Notification::error(message));
    }

    pub async fn check_connection(&self) -> bool {
        match self.api.health().await {
            Ok(health) => {
                tracing::debug!("API connection successful ({})", health.status);
                true
            }
            Err(e @ AdvisorError::HttpStatusError { .. }) => {
                self.fail(MSG_API_UNHEALTHY, &e);
                false
            }
            Err(e) => {
                let message = format!(
                    "Cannot connect to API. Please ensure the backend is running on {}.",
                    self.service_label
                );
                self.fail(&message, &e);
                false
            }
        }
    }

    pub async fn submit_build(&self, request: &BuildRequest) -> Result<SubmitOutcome> {
        let token = self.build_requests.issue();
        {
            let mut view = self.lock_builds();
            view.loading = true;
            view.visible = false;
        }

        tracing::info!(
            "Requesting {} builds for a ${} budget",
            request.use_case(),
            request.budget()
        );
        let result = self.api.recommend(request).await;

        if !self.build_requests.is_current(token) {
            log_stale("recommend", token, result.as_ref().err());
            return Ok(SubmitOutcome::Stale);
        }

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                {
                    let mut view = self.lock_builds();
                    view.loading = false;
                    view.visible = false;
                }
                self.fail(MSG_RECOMMEND_FAILED, &e);
                return Err(e);
            }
        };

        if let Some(message) = &response.message {
            tracing::debug!("Service says: {}", message);
        }

        let count = response.builds.len();
        {
            let mut view = self.lock_builds();
            view.loading = false;
            view.cards = response
                .builds
                .into_iter()
                .enumerate()
                .map(|(index, build)| BuildCard {
                    number: index + 1,
                    build,
                })
                .collect();
            view.visible = count > 0;
        }

        if count == 0 {
            tracing::info!("No builds returned");
            self.notifier.notify(Notification::error(MSG_NO_BUILDS));
            Ok(SubmitOutcome::NoResults)
        } else {
            tracing::info!("Received {} build(s)", count);
            self.notifier.notify(Notification::success(MSG_BUILDS_FOUND));
            Ok(SubmitOutcome::Rendered(count))
        }
    }

    pub async fn load_parts(&self, category: Category, sort: PartsSort) -> Result<PageOutcome> {
        self.load_parts_for_brand(category, sort, None).await
    }

    /// First page of `category`, replacing whatever the browser showed.
    pub async fn load_parts_for_brand(
        &self,
        category: Category,
        sort: PartsSort,
        brand: Option<String>,
    ) -> Result<PageOutcome> {
        let query = PartsQuery::new(category)
            .with_page(self.page_size, 0)
            .with_sort(sort)
            .with_brand(brand);

        let token = self.parts_requests.issue();
        {
            let mut view = self.lock_parts();
            *view = PartsView {
                category: Some(category),
                sort,
                brand: query.brand.clone(),
                status: PartsStatus::Loading,
                ..PartsView::default()
            };
        }

        let result = self.api.fetch_parts(&query).await;

        if !self.parts_requests.is_current(token) {
            log_stale("parts", token, result.as_ref().err());
            return Ok(PageOutcome::Stale);
        }

        match result {
            Ok(page) => {
                let received = page.len();
                let more = page_signals_more(received, query.limit);
                let mut view = self.lock_parts();
                view.parts = page;
                view.load_more = more;
                if received == 0 {
                    view.status = PartsStatus::Empty;
                    tracing::info!("No parts found in category {}", category);
                    Ok(PageOutcome::Empty)
                } else {
                    view.status = PartsStatus::Ready;
                    tracing::info!("Showing {} {} parts", received, category);
                    Ok(PageOutcome::Loaded {
                        received,
                        shown: received,
                        more,
                    })
                }
            }
            Err(e) => {
                {
                    let mut view = self.lock_parts();
                    view.parts.clear();
                    view.load_more = false;
                    view.status = PartsStatus::Failed;
                }
                self.fail(MSG_PARTS_FAILED, &e);
                Err(e)
            }
        }
    }

    /// Reloads the current category from the first page with a new sort.
    pub async fn change_sort(&self, sort: PartsSort) -> Result<PageOutcome> {
        let (category, brand) = {
            let view = self.lock_parts();
            match view.category {
                Some(category) => (category, view.brand.clone()),
                None => return Ok(PageOutcome::Skipped),
            }
        };
        self.load_parts_for_brand(category, sort, brand).await
    }

    /// Appends the next page, offset by the number of parts already shown, keeping the current sort.
    pub async fn load_more(&self) -> Result<PageOutcome> {
        let (query, token) = {
            let mut view = self.lock_parts();
            let category = match view.category {
                Some(category) if view.load_more && !view.loading_more => category,
                _ => return Ok(PageOutcome::Skipped),
            };
            view.loading_more = true;
            let query = PartsQuery::new(category)
                .with_page(self.page_size, view.parts.len())
                .with_sort(view.sort)
                .with_brand(view.brand.clone());
            (query, self.parts_requests.issue())
        };

        let result = self.api.fetch_parts(&query).await;

        if !self.parts_requests.is_current(token) {
            log_stale("load more", token, result.as_ref().err());
            return Ok(PageOutcome::Stale);
        }

        match result {
            Ok(page) => {
                let received = page.len();
                let more = page_signals_more(received, query.limit);
                let mut view = self.lock_parts();
                view.parts.extend(page);
                view.load_more = more;
                view.loading_more = false;
                view.status = PartsStatus::Ready;
                tracing::info!("Showing {} parts", view.parts.len());
                Ok(PageOutcome::Loaded {
                    received,
                    shown: view.parts.len(),
                    more,
                })
            }
            Err(e) => {
                // 保留已顯示的零件，讓使用者可以再試一次
                self.lock_parts().loading_more = false;
                self.fail(MSG_LOAD_MORE_FAILED, &e);
                Err(e)
            }
        }
    }

    pub async fn catalog_stats(&self) -> Result<CatalogStats> {
        self.api.catalog_stats().await.inspect_err(|e| {
            self.fail("Failed to load catalog statistics", e);
        })
    }

    pub async fn all_parts(&self) -> Result<Vec<Part>> {
        self.api.list_all_parts().await.inspect_err(|e| {
            self.fail(MSG_PARTS_FAILED, e);
        })
    }

    pub async fn api_info(&self) -> Result<serde_json::Value> {
        self.api.api_info().await.inspect_err(|e| {
            self.fail(MSG_UNEXPECTED, e);
        })
    }
}

fn log_stale(flow: &str, token: RequestToken, error: Option<&AdvisorError>) {
    match error {
        Some(e) => tracing::debug!(
            "Discarding stale {} failure (generation {}): {}",
            flow,
            token.generation(),
            e
        ),
        None => tracing::debug!(
            "Discarding stale {} response (generation {})",
            flow,
            token.generation()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::notify::MemoryNotifier;
    use crate::domain::model::{
        BrandPreferences, HealthStatus, RecommendationResponse, SortKey, SortOrder, UseCase,
    };
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use tokio::sync::{oneshot, Mutex as AsyncMutex};

    fn part(category: &str, index: usize) -> Part {
        Part {
            id: Some(index as i64),
            category: category.to_string(),
            name: format!("{} part {}", category, index),
            price: 100.0 + index as f64,
            brand: Some("Brand".to_string()),
            performance_score: Some(50.0 + index as f64),
            hardware_brand: None,
            compatibility_tags: None,
            specifications: None,
        }
    }

    fn build(total: f64) -> BuildResult {
        BuildResult {
            parts: vec![part("cpu", 1)],
            total_price: total,
            bang_for_buck_score: 0.5,
            performance_score: None,
            budget_allocation: None,
            compatibility_status: None,
        }
    }

    type Gate = oneshot::Receiver<()>;

    /// Scripted responses, optionally held until a gate is released.
    #[derive(Default)]
    struct ScriptedApi {
        recommend: AsyncMutex<VecDeque<(Option<Gate>, Result<RecommendationResponse>)>>,
        parts: AsyncMutex<VecDeque<(Option<Gate>, Result<Vec<Part>>)>>,
        seen_queries: std::sync::Mutex<Vec<PartsQuery>>,
    }

    impl ScriptedApi {
        async fn push_recommend(&self, gate: Option<Gate>, result: Result<RecommendationResponse>) {
            self.recommend.lock().await.push_back((gate, result));
        }

        async fn push_parts(&self, gate: Option<Gate>, result: Result<Vec<Part>>) {
            self.parts.lock().await.push_back((gate, result));
        }

        fn queries(&self) -> Vec<PartsQuery> {
            self.seen_queries.lock().unwrap().clone()
        }
    }

    fn unscripted() -> AdvisorError {
        AdvisorError::ValidationError {
            message: "unscripted call".to_string(),
        }
    }

    #[async_trait]
    impl AdvisorApi for Arc<ScriptedApi> {
        async fn health(&self) -> Result<HealthStatus> {
            Err(AdvisorError::HttpStatusError {
                status: 503,
                endpoint: "/health".to_string(),
            })
        }

        async fn recommend(&self, _request: &BuildRequest) -> Result<RecommendationResponse> {
            let next = self.recommend.lock().await.pop_front();
            let (gate, result) = next.ok_or_else(unscripted)?;
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            result
        }

        async fn fetch_parts(&self, query: &PartsQuery) -> Result<Vec<Part>> {
            self.seen_queries.lock().unwrap().push(query.clone());
            let next = self.parts.lock().await.pop_front();
            let (gate, result) = next.ok_or_else(unscripted)?;
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            result
        }

        async fn list_all_parts(&self) -> Result<Vec<Part>> {
            Err(unscripted())
        }

        async fn catalog_stats(&self) -> Result<CatalogStats> {
            Err(unscripted())
        }

        async fn api_info(&self) -> Result<serde_json::Value> {
            Err(unscripted())
        }
    }

    fn request() -> BuildRequest {
        BuildRequest::new(1500.0, UseCase::Gaming, BrandPreferences::default()).unwrap()
    }

    #[tokio::test]
    async fn test_stale_build_response_does_not_clobber_newer_results() {
        let api = Arc::new(ScriptedApi::default());
        let (release_first, first_gate) = oneshot::channel();
        api.push_recommend(
            Some(first_gate),
            Ok(RecommendationResponse {
                builds: vec![build(1000.0)],
                ..Default::default()
            }),
        )
        .await;
        api.push_recommend(
            None,
            Ok(RecommendationResponse {
                builds: vec![build(1400.0), build(1450.0)],
                ..Default::default()
            }),
        )
        .await;

        let notifier = MemoryNotifier::new();
        let advisor = BuildAdvisor::new(api.clone(), notifier.clone());
        let first_request = request();
        let second_request = request();

        let slow = advisor.submit_build(&first_request);
        let fast = async {
            // 讓第一個請求先送出
            tokio::task::yield_now().await;
            let outcome = advisor.submit_build(&second_request).await;
            let _ = release_first.send(());
            outcome
        };
        let (slow_outcome, fast_outcome) = tokio::join!(slow, fast);

        assert_eq!(fast_outcome.unwrap(), SubmitOutcome::Rendered(2));
        assert_eq!(slow_outcome.unwrap(), SubmitOutcome::Stale);

        let view = advisor.builds();
        assert!(view.visible);
        assert_eq!(view.cards.len(), 2);
        assert_eq!(view.cards[0].build.total_price, 1400.0);
        assert_eq!(notifier.messages(), vec![MSG_BUILDS_FOUND.to_string()]);
    }

    #[tokio::test]
    async fn test_stale_parts_failure_is_silent() {
        let api = Arc::new(ScriptedApi::default());
        let (release_first, first_gate) = oneshot::channel();
        api.push_parts(
            Some(first_gate),
            Err(AdvisorError::HttpStatusError {
                status: 500,
                endpoint: "/parts/cpu".to_string(),
            }),
        )
        .await;
        api.push_parts(None, Ok(vec![part("gpu", 1), part("gpu", 2)])).await;

        let notifier = MemoryNotifier::new();
        let advisor = BuildAdvisor::new(api.clone(), notifier.clone());

        let slow = advisor.load_parts(Category::Cpu, PartsSort::default());
        let fast = async {
            tokio::task::yield_now().await;
            let outcome = advisor.load_parts(Category::Gpu, PartsSort::default()).await;
            let _ = release_first.send(());
            outcome
        };
        let (slow_outcome, fast_outcome) = tokio::join!(slow, fast);

        assert_eq!(slow_outcome.unwrap(), PageOutcome::Stale);
        assert!(matches!(
            fast_outcome.unwrap(),
            PageOutcome::Loaded { received: 2, .. }
        ));
        let view = advisor.parts();
        assert_eq!(view.category, Some(Category::Gpu));
        assert_eq!(view.status, PartsStatus::Ready);
        assert_eq!(notifier.error_count(), 0);
    }

    #[tokio::test]
    async fn test_load_more_keeps_sort_and_appends() {
        let api = Arc::new(ScriptedApi::default());
        api.push_parts(None, Ok((0..3).map(|i| part("ram", i)).collect()))
            .await;
        api.push_parts(None, Ok(vec![part("ram", 3)])).await;

        let notifier = MemoryNotifier::new();
        let advisor = BuildAdvisor::new(api.clone(), notifier.clone()).with_page_size(3);

        let sort = PartsSort::by(SortKey::Name);
        let first = advisor.load_parts(Category::Ram, sort).await.unwrap();
        assert_eq!(
            first,
            PageOutcome::Loaded {
                received: 3,
                shown: 3,
                more: true
            }
        );

        let second = advisor.load_more().await.unwrap();
        assert_eq!(
            second,
            PageOutcome::Loaded {
                received: 1,
                shown: 4,
                more: false
            }
        );

        let queries = api.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1].offset, 3);
        assert_eq!(queries[1].sort.by, SortKey::Name);
        assert_eq!(queries[1].sort.order, SortOrder::Asc);

        let view = advisor.parts();
        assert_eq!(view.parts.len(), 4);
        assert!(!view.load_more);

        // 沒有更多頁時不再發出請求
        assert_eq!(advisor.load_more().await.unwrap(), PageOutcome::Skipped);
        assert_eq!(api.queries().len(), 2);
    }

    #[tokio::test]
    async fn test_load_more_failure_keeps_shown_parts() {
        let api = Arc::new(ScriptedApi::default());
        api.push_parts(None, Ok((0..2).map(|i| part("psu", i)).collect()))
            .await;
        api.push_parts(
            None,
            Err(AdvisorError::HttpStatusError {
                status: 502,
                endpoint: "/parts/psu".to_string(),
            }),
        )
        .await;

        let notifier = MemoryNotifier::new();
        let advisor = BuildAdvisor::new(api.clone(), notifier.clone()).with_page_size(2);

        advisor
            .load_parts(Category::Psu, PartsSort::default())
            .await
            .unwrap();
        assert!(advisor.load_more().await.is_err());

        let view = advisor.parts();
        assert_eq!(view.parts.len(), 2);
        assert!(view.load_more);
        assert!(!view.loading_more);
        assert_eq!(notifier.messages(), vec![MSG_LOAD_MORE_FAILED.to_string()]);
    }

    #[tokio::test]
    async fn test_load_more_before_any_page_is_skipped() {
        let api = Arc::new(ScriptedApi::default());
        let advisor = BuildAdvisor::new(api.clone(), MemoryNotifier::new());
        assert_eq!(advisor.load_more().await.unwrap(), PageOutcome::Skipped);
        assert_eq!(
            advisor.change_sort(PartsSort::default()).await.unwrap(),
            PageOutcome::Skipped
        );
        assert!(api.queries().is_empty());
    }

    #[tokio::test]
    async fn test_unhealthy_service_notifies_once() {
        let api = Arc::new(ScriptedApi::default());
        let notifier = MemoryNotifier::new();
        let advisor = BuildAdvisor::new(api, notifier.clone());

        assert!(!advisor.check_connection().await);
        assert_eq!(notifier.messages(), vec![MSG_API_UNHEALTHY.to_string()]);
    }
}
