use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("HTTP error! status: {status} ({endpoint})")]
    HttpStatusError { status: u16, endpoint: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Service,
    Data,
    Configuration,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AdvisorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AdvisorError::ApiError(_) => ErrorCategory::Network,
            AdvisorError::HttpStatusError { .. } => ErrorCategory::Service,
            AdvisorError::SerializationError(_) => ErrorCategory::Data,
            AdvisorError::IoError(_) => ErrorCategory::System,
            AdvisorError::UrlError(_)
            | AdvisorError::ConfigError { .. }
            | AdvisorError::ConfigValidationError { .. }
            | AdvisorError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            AdvisorError::ValidationError { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 服務暫時不可用，可以稍後重試
            AdvisorError::ApiError(_) => ErrorSeverity::Medium,
            AdvisorError::HttpStatusError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            AdvisorError::HttpStatusError { .. } => ErrorSeverity::High,
            AdvisorError::SerializationError(_) => ErrorSeverity::High,
            AdvisorError::ValidationError { .. } => ErrorSeverity::High,
            AdvisorError::IoError(_) => ErrorSeverity::Critical,
            AdvisorError::UrlError(_)
            | AdvisorError::ConfigError { .. }
            | AdvisorError::ConfigValidationError { .. }
            | AdvisorError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => "Cannot reach the BuildMyRig service".to_string(),
            ErrorCategory::Service => match self {
                AdvisorError::HttpStatusError { status: 404, .. } => {
                    "The service found nothing matching your request".to_string()
                }
                _ => "The BuildMyRig service rejected the request".to_string(),
            },
            ErrorCategory::Data => "The service returned a response that could not be read".to_string(),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Invalid input: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Please ensure the backend is running and the base URL is correct",
            ErrorCategory::Service => match self {
                AdvisorError::HttpStatusError { endpoint, .. } if endpoint.ends_with("/recommend") => {
                    "Try a different budget, use case or brand preference"
                }
                AdvisorError::HttpStatusError { endpoint, .. } if endpoint.contains("/parts") => {
                    "Try another category, sort order or brand filter"
                }
                _ => "Run `buildmyrig health` to check the service",
            },
            ErrorCategory::Data => "Check that the base URL points at a BuildMyRig API",
            ErrorCategory::Configuration => "Check the configuration file and command-line flags",
            ErrorCategory::Input => "Check the values you entered and try again",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, AdvisorError>;
