use crate::utils::error::{AdvisorError, Result};
use crate::utils::validation::validate_positive_amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// What the build is mainly for. The service weights CPU/GPU/RAM budgets differently per use case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UseCase {
    Gaming,
    Workstation,
    General,
}

impl UseCase {
    pub fn as_str(&self) -> &'static str {
        match self {
            UseCase::Gaming => "gaming",
            UseCase::Workstation => "workstation",
            UseCase::General => "general",
        }
    }
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UseCase {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gaming" => Ok(UseCase::Gaming),
            "workstation" => Ok(UseCase::Workstation),
            "general" => Ok(UseCase::General),
            other => Err(AdvisorError::ValidationError {
                message: format!(
                    "Unknown use case '{}'. Valid use cases: gaming, workstation, general",
                    other
                ),
            }),
        }
    }
}

/// Per-slot brand preference. Absent slots are left out of the JSON body entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu: Option<String>,
}

impl BrandPreferences {
    /// Blank strings mean "no preference".
    pub fn new(cpu: Option<String>, gpu: Option<String>) -> Self {
        Self {
            cpu: non_blank(cpu),
            gpu: non_blank(gpu),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildRequest {
    #[serde(serialize_with = "serialize_amount")]
    budget: f64,
    use_case: UseCase,
    brand_preferences: BrandPreferences,
}

impl BuildRequest {
    pub fn new(budget: f64, use_case: UseCase, brand_preferences: BrandPreferences) -> Result<Self> {
        validate_positive_amount("budget", budget)?;
        Ok(Self {
            budget,
            use_case,
            brand_preferences,
        })
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn use_case(&self) -> UseCase {
        self.use_case
    }

    pub fn brand_preferences(&self) -> &BrandPreferences {
        &self.brand_preferences
    }
}

// Integral amounts go out as JSON integers (1500, not 1500.0), the same text a browser would send.
fn serialize_amount<S: Serializer>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub category: String,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility_tags: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<serde_json::Value>,
}

/// One ranked build. The service promises `total_price` is the sum of part prices; nothing here checks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub parts: Vec<Part>,
    pub total_price: f64,
    pub bang_for_buck_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_allocation: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility_status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub builds: Vec<BuildResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_summary: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cpu,
    Gpu,
    Motherboard,
    Ram,
    Storage,
    Psu,
    Case,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Cpu,
        Category::Gpu,
        Category::Motherboard,
        Category::Ram,
        Category::Storage,
        Category::Psu,
        Category::Case,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cpu => "cpu",
            Category::Gpu => "gpu",
            Category::Motherboard => "motherboard",
            Category::Ram => "ram",
            Category::Storage => "storage",
            Category::Psu => "psu",
            Category::Case => "case",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| AdvisorError::ValidationError {
                message: format!(
                    "Invalid category '{}'. Must be one of: {}",
                    s,
                    Category::ALL.map(|c| c.as_str()).join(", ")
                ),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    PerformanceScore,
    Price,
    Name,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::PerformanceScore => "performance_score",
            SortKey::Price => "price",
            SortKey::Name => "name",
        }
    }

    /// Performance high to low, price low to high, name A to Z.
    pub fn default_order(&self) -> SortOrder {
        match self {
            SortKey::PerformanceScore => SortOrder::Desc,
            SortKey::Price | SortKey::Name => SortOrder::Asc,
        }
    }
}

impl FromStr for SortKey {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "performance_score" | "performance" => Ok(SortKey::PerformanceScore),
            "price" => Ok(SortKey::Price),
            "name" => Ok(SortKey::Name),
            other => Err(AdvisorError::ValidationError {
                message: format!(
                    "Invalid sort key '{}'. Must be one of: performance_score, price, name",
                    other
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(AdvisorError::ValidationError {
                message: format!("Invalid sort order '{}'. Must be asc or desc", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartsSort {
    pub by: SortKey,
    pub order: SortOrder,
}

impl PartsSort {
    pub fn new(by: SortKey, order: SortOrder) -> Self {
        Self { by, order }
    }

    /// Sort on `key` in its natural direction.
    pub fn by(key: SortKey) -> Self {
        Self::new(key, key.default_order())
    }
}

impl Default for PartsSort {
    fn default() -> Self {
        Self::by(SortKey::PerformanceScore)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartsQuery {
    pub category: Category,
    pub limit: usize,
    pub offset: usize,
    pub sort: PartsSort,
    pub brand: Option<String>,
}

impl PartsQuery {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
            sort: PartsSort::default(),
            brand: None,
        }
    }

    pub fn with_page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    pub fn with_sort(mut self, sort: PartsSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_brand(mut self, brand: Option<String>) -> Self {
        self.brand = non_blank(brand);
        self
    }

    /// Query string pairs in the order the service documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
            ("sort_by", self.sort.by.as_str().to_string()),
            ("sort_order", self.sort.order.as_str().to_string()),
        ];
        if let Some(brand) = &self.brand {
            pairs.push(("brand", brand.clone()));
        }
        pairs
    }
}

/// Whether a page hints at more results. A full page only means "maybe"; the service sends no total.
pub fn page_signals_more(received: usize, limit: usize) -> bool {
    limit > 0 && received >= limit
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_parts: usize,
    #[serde(default)]
    pub categories: BTreeMap<String, usize>,
    #[serde(default)]
    pub brands: BTreeMap<String, usize>,
    pub price_range: PriceRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A short-lived user-facing message, the terminal stand-in for a toast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}
