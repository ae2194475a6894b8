use crate::error::*;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::IdeaApi(e) => {
                error!("Idea API error details: {:?}", e);
            }
            CoreError::Extraction(e) => {
                error!("Extraction error details: {:?}", e);
            }
            CoreError::Cache(e) => {
                error!("Cache error details: {:?}", e);
            }
            CoreError::Llm(e) => {
                error!("LLM error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::IdeaApi(e) => e.user_friendly_message(),
            CoreError::Extraction(e) => e.user_friendly_message(),
            CoreError::Cache(e) => e.user_friendly_message(),
            CoreError::Llm(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection or proxy."
                    .to_string()
            }
            CoreError::Io(_) => "Could not read or write the local cache directory.".to_string(),
            CoreError::Serialization(_) => {
                "A cached or received document could not be parsed.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::IdeaApi(_) => "IDEA_API".to_string(),
            CoreError::Extraction(_) => "EXTRACTION".to_string(),
            CoreError::Cache(_) => "CACHE".to_string(),
            CoreError::Llm(_) => "LLM".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
        }
    }
}

impl ErrorExt for IdeaApiError {
    fn log_error(&self) -> &Self {
        error!("IdeaApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("IdeaApiError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            IdeaApiError::RequestTimeout { .. } => {
                "The idea service did not answer in time. Please try again.".to_string()
            }
            IdeaApiError::RateLimitExceeded { retry_after } => format!(
                "Too many requests. Please wait {} seconds before trying again.",
                retry_after
            ),
            IdeaApiError::Unauthorized { .. } => {
                "The idea service rejected the API key. Please check SUPABASE_APIKEY.".to_string()
            }
            IdeaApiError::NotFound { resource } => format!("Could not find: {}", resource),
            IdeaApiError::ProxyUnavailable { proxy } => {
                format!("Proxy {} is not answering. Please check PROXY_URL.", proxy)
            }
            _ => "Idea service error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            IdeaApiError::RequestTimeout { .. } => "IDEA_API_TIMEOUT".to_string(),
            IdeaApiError::RateLimitExceeded { .. } => "IDEA_API_RATE_LIMIT".to_string(),
            IdeaApiError::Unauthorized { .. } => "IDEA_API_UNAUTHORIZED".to_string(),
            IdeaApiError::NotFound { .. } => "IDEA_API_NOT_FOUND".to_string(),
            IdeaApiError::ServerError { .. } => "IDEA_API_SERVER_ERROR".to_string(),
            IdeaApiError::RequestFailed { .. } => "IDEA_API_REQUEST_FAILED".to_string(),
            IdeaApiError::InvalidResponse { .. } => "IDEA_API_INVALID_RESPONSE".to_string(),
            IdeaApiError::ProxyUnavailable { .. } => "IDEA_API_PROXY_UNAVAILABLE".to_string(),
        }
    }
}

impl ErrorExt for ExtractionError {
    fn log_error(&self) -> &Self {
        error!("ExtractionError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ExtractionError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ExtractionError::MissingField { field } => format!(
                "The fetched record has no '{}' collection. The upstream format may have changed.",
                field
            ),
            ExtractionError::MalformedPayload { field, .. } => {
                format!("The '{}' collection of the fetched record is malformed.", field)
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ExtractionError::MissingField { .. } => "EXTRACT_MISSING_FIELD".to_string(),
            ExtractionError::MalformedPayload { .. } => "EXTRACT_MALFORMED_PAYLOAD".to_string(),
        }
    }
}

impl ErrorExt for CacheError {
    fn log_error(&self) -> &Self {
        error!("CacheError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CacheError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CacheError::InvalidEntry { keyword, .. } => {
                format!("Refusing to cache an invalid entry for '{}'.", keyword)
            }
            CacheError::Corrupt { path } => {
                format!("Cache file {} is corrupt. Delete it and try again.", path)
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            CacheError::InvalidEntry { .. } => "CACHE_INVALID_ENTRY".to_string(),
            CacheError::Corrupt { .. } => "CACHE_CORRUPT".to_string(),
        }
    }
}

impl ErrorExt for LlmError {
    fn log_error(&self) -> &Self {
        error!("LlmError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("LlmError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            LlmError::InvalidApiKey { provider } => format!(
                "Invalid API key for {}. Please update your credentials.",
                provider
            ),
            LlmError::RateLimitExceeded { provider } => format!(
                "Rate limit exceeded for {}. Please wait before scoring again.",
                provider
            ),
            LlmError::ServiceUnavailable { provider } => format!(
                "{} service is temporarily unavailable. Please try again later.",
                provider
            ),
            LlmError::RequestTimeout { provider } => {
                format!("{} did not answer in time. Please try again.", provider)
            }
            _ => "AI service error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            LlmError::InvalidApiKey { .. } => "LLM_INVALID_API_KEY".to_string(),
            LlmError::RateLimitExceeded { .. } => "LLM_RATE_LIMIT".to_string(),
            LlmError::ServiceUnavailable { .. } => "LLM_SERVICE_UNAVAILABLE".to_string(),
            LlmError::RequestTimeout { .. } => "LLM_TIMEOUT".to_string(),
            LlmError::RequestFailed { .. } => "LLM_REQUEST_FAILED".to_string(),
            LlmError::InvalidResponseFormat { .. } => "LLM_INVALID_RESPONSE".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file {} not found.", path)
            }
            ConfigError::Read { path, .. } => {
                format!("Configuration file {} could not be read.", path)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::MissingEnvironmentVariable { var_name } => format!(
                "Environment variable '{}' is required but not set.",
                var_name
            ),
            _ => "Configuration error occurred. Please check your settings.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::Read { .. } => "CONFIG_READ_ERROR".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::MissingEnvironmentVariable { .. } => "CONFIG_MISSING_ENV_VAR".to_string(),
            ConfigError::ValidationFailed { .. } => "CONFIG_VALIDATION_FAILED".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report_error(&self, error: &CoreError) {
        error.log_error();
        info!("Error code: {}", error.error_code());
        info!("User message: {}", error.user_friendly_message());
    }

    pub fn report_warning(&self, error: &CoreError) {
        error.log_warn();
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
