use scout_core::{
    CacheError, ConfigError, CoreError, ErrorExt, ErrorReporter, ExtractionError, IdeaApiError,
    LlmError,
};

#[test]
fn test_error_codes() {
    let api_error = CoreError::IdeaApi(IdeaApiError::ServerError { status_code: 502 });
    assert_eq!(api_error.error_code(), "IDEA_API");

    let extraction_error = CoreError::Extraction(ExtractionError::MissingField {
        field: "ideas".to_string(),
    });
    assert_eq!(extraction_error.error_code(), "EXTRACTION");

    let cache_error = CoreError::Cache(CacheError::InvalidEntry {
        keyword: "invoicing".to_string(),
        reason: "missing id".to_string(),
    });
    assert_eq!(cache_error.error_code(), "CACHE");

    let llm_error = CoreError::Llm(LlmError::InvalidApiKey {
        provider: "deepseek".to_string(),
    });
    assert_eq!(llm_error.error_code(), "LLM");

    let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "DEEPSEEK_APIKEY".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG");
}

#[test]
fn test_nested_error_codes() {
    assert_eq!(
        ExtractionError::MalformedPayload {
            field: "ideas".to_string(),
            details: "expected string".to_string(),
        }
        .error_code(),
        "EXTRACT_MALFORMED_PAYLOAD"
    );
    assert_eq!(
        IdeaApiError::RequestTimeout {
            endpoint: "generator".to_string()
        }
        .error_code(),
        "IDEA_API_TIMEOUT"
    );
}

#[test]
fn test_from_conversions() {
    let error: CoreError = ExtractionError::MissingField {
        field: "ideas".to_string(),
    }
    .into();
    assert!(matches!(
        error,
        CoreError::Extraction(ExtractionError::MissingField { .. })
    ));
    assert!(error.to_string().contains("ideas"));
}

#[test]
fn test_user_friendly_messages() {
    let api_error = CoreError::IdeaApi(IdeaApiError::Unauthorized {
        endpoint: "/rest/v1/micro_saas_ideas".to_string(),
    });
    let message = api_error.user_friendly_message();
    assert!(message.contains("SUPABASE_APIKEY"));

    let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "DEEPSEEK_APIKEY".to_string(),
    });
    let message = config_error.user_friendly_message();
    assert!(message.contains("DEEPSEEK_APIKEY"));

    let extraction_error = CoreError::Extraction(ExtractionError::MissingField {
        field: "ideas".to_string(),
    });
    assert!(extraction_error.user_friendly_message().contains("'ideas'"));
}

#[test]
fn test_error_reporter() {
    let reporter = ErrorReporter::new();
    let error = CoreError::IdeaApi(IdeaApiError::RateLimitExceeded { retry_after: 30 });

    // This test just ensures the methods don't panic
    reporter.report_error(&error);
    reporter.report_warning(&error);
}
