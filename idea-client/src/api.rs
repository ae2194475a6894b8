use crate::metrics::{ApiMetrics, CallOutcome, MetricsCollector, UpstreamCall};
use crate::source::IdeaSource;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use scout_core::{ApiConfig, ConfigError, CoreError, IdeaApiError, IdeaRecord};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    niche: &'a str,
    #[serde(rename = "userId")]
    user_id: &'a str,
}

/// HTTP gateway to the idea generator and the record store.
#[derive(Debug)]
pub struct IdeaApiClient {
    http_client: Client,
    metrics: MetricsCollector,
    config: ApiConfig,
}

impl IdeaApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, CoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("accept-profile", HeaderValue::from_static("public"));

        if let Some(api_key) = &config.api_key {
            headers.insert("apikey", header_value("api.api_key", api_key)?);
            headers.insert(
                AUTHORIZATION,
                header_value("api.api_key", &format!("Bearer {api_key}"))?,
            );
        }

        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(config.request_timeout());

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|_| ConfigError::InvalidValue {
                field: "api.proxy_url".to_string(),
                value: proxy_url.clone(),
            })?;
            builder = builder.proxy(proxy);
            debug!("Routing idea API traffic through proxy {}", proxy_url);
        }

        let http_client = builder.build()?;

        Ok(Self {
            http_client,
            metrics: MetricsCollector::new(),
            config,
        })
    }

    /// Sends `request`, records metrics, and maps failures onto the error
    /// taxonomy. Only successful responses are returned.
    async fn execute(
        &self,
        call: UpstreamCall,
        request: RequestBuilder,
    ) -> Result<Response, CoreError> {
        let endpoint = endpoint_name(call);
        let start_time = Instant::now();
        let outcome = request.send().await;

        self.metrics
            .record(CallOutcome {
                call,
                status_code: outcome.as_ref().ok().map(|r| r.status().as_u16()),
                latency: start_time.elapsed(),
            })
            .await;

        match outcome {
            Ok(response) if response.status().is_success() => {
                debug!("Request successful: {} for {}", response.status(), endpoint);
                Ok(response)
            }
            Ok(response) => Err(CoreError::IdeaApi(status_error(endpoint, &response))),
            Err(e) if e.is_timeout() => Err(CoreError::IdeaApi(IdeaApiError::RequestTimeout {
                endpoint: endpoint.to_string(),
            })),
            Err(e) => Err(CoreError::Network(e)),
        }
    }

    async fn request_identifier(&self, keyword: &str) -> Result<String, CoreError> {
        let payload = GenerateRequest {
            niche: keyword,
            user_id: &self.config.user_id,
        };
        let request = self
            .http_client
            .post(&self.config.generator_url)
            .json(&payload);

        let response = self
            .execute(UpstreamCall::GenerateIdentifier, request)
            .await?;
        let body: Value = response.json().await.map_err(|e| {
            CoreError::IdeaApi(IdeaApiError::InvalidResponse {
                details: format!("generator returned a non-JSON body: {e}"),
            })
        })?;

        match body.get("id") {
            Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
            Some(Value::Number(id)) => Ok(id.to_string()),
            _ => Err(CoreError::IdeaApi(IdeaApiError::InvalidResponse {
                details: "generator response has no id".to_string(),
            })),
        }
    }

    /// HEAD request to the ping URL through the configured proxy.
    pub async fn ping_proxy(&self) -> bool {
        let request = self
            .http_client
            .head(&self.config.ping_url)
            .timeout(self.config.ping_timeout());

        match self.execute(UpstreamCall::Ping, request).await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                debug!("Proxy ping failed: {}", e);
                false
            }
        }
    }

    pub async fn healthy_proxy_check(&self) -> bool {
        info!("Checking proxy ...");
        let healthy = self.ping_proxy().await;
        if healthy {
            info!("The proxy is healthy");
        } else {
            warn!(
                "The proxy is unhealthy: {}",
                self.config.proxy_url.as_deref().unwrap_or("<direct connection>")
            );
        }
        healthy
    }

    pub async fn metrics(&self) -> ApiMetrics {
        self.metrics.snapshot().await
    }
}

impl IdeaSource for IdeaApiClient {
    async fn generate_identifier(&self, keyword: &str) -> Option<String> {
        let result = self.request_identifier(keyword).await;
        // Unconditional pause to stay under the generator's rate limit
        sleep(self.config.request_delay()).await;

        match result {
            Ok(id) => {
                debug!("Generated identifier {} for '{}'", id, keyword);
                Some(id)
            }
            Err(CoreError::IdeaApi(e)) => {
                error!("Generator failed for '{}': {}", keyword, e);
                None
            }
            Err(e) => {
                warn!("Generator failed for '{}': {}", keyword, e);
                None
            }
        }
    }

    async fn fetch_record(&self, identifier: &str) -> Result<IdeaRecord, CoreError> {
        let id_filter = format!("eq.{identifier}");
        let request = self
            .http_client
            .get(&self.config.records_url)
            .query(&[("select", "*"), ("id", id_filter.as_str())]);

        info!("Fetching record {}", identifier);
        let response = self.execute(UpstreamCall::FetchRecord, request).await?;
        let body: Value = response.json().await.map_err(|e| {
            error!("Failed to parse record {}: {}", identifier, e);
            CoreError::IdeaApi(IdeaApiError::InvalidResponse {
                details: format!("record {identifier} is not valid JSON"),
            })
        })?;

        let Value::Array(rows) = body else {
            return Err(CoreError::IdeaApi(IdeaApiError::InvalidResponse {
                details: format!("expected an array of records for {identifier}"),
            }));
        };

        match rows.into_iter().next() {
            None => {
                warn!("No record found for identifier {}", identifier);
                Ok(IdeaRecord::empty())
            }
            Some(Value::Object(fields)) => Ok(IdeaRecord::from(fields)),
            Some(_) => Err(CoreError::IdeaApi(IdeaApiError::InvalidResponse {
                details: format!("record {identifier} is not a JSON object"),
            })),
        }
    }
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value: "<redacted>".to_string(),
    })
}

fn status_error(endpoint: &str, response: &Response) -> IdeaApiError {
    let status = response.status();
    error!("Request failed with status: {} for {}", status, endpoint);

    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(60);
            warn!("Rate limited, retry after {} seconds", retry_after);
            IdeaApiError::RateLimitExceeded { retry_after }
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => IdeaApiError::Unauthorized {
            endpoint: endpoint.to_string(),
        },
        StatusCode::NOT_FOUND => IdeaApiError::NotFound {
            resource: response.url().to_string(),
        },
        s if s.is_server_error() => IdeaApiError::ServerError {
            status_code: s.as_u16(),
        },
        s => IdeaApiError::RequestFailed {
            endpoint: endpoint.to_string(),
            status_code: s.as_u16(),
        },
    }
}

fn endpoint_name(call: UpstreamCall) -> &'static str {
    match call {
        UpstreamCall::GenerateIdentifier => "generate_identifier",
        UpstreamCall::FetchRecord => "fetch_record",
        UpstreamCall::Ping => "ping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use httpmock::Method::HEAD;
    use scout_core::ErrorExt;
    use serde_json::json;

    fn test_config(server: &MockServer) -> ApiConfig {
        ApiConfig {
            records_url: server.url("/rest/v1/micro_saas_ideas"),
            generator_url: server.url("/api/micro-saas-ideas-generator"),
            ping_url: server.url("/ip"),
            api_key: Some("test-key".to_string()),
            user_id: "user-1".to_string(),
            request_delay_ms: 0,
            ..ApiConfig::default()
        }
    }

    #[tokio::test]
    async fn test_generate_identifier_sends_niche_and_user() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/micro-saas-ideas-generator")
                .header("apikey", "test-key")
                .header("authorization", "Bearer test-key")
                .json_body(json!({"niche": "invoicing", "userId": "user-1"}));
            then.status(200).json_body(json!({"id": "abc123", "status": "ok"}));
        });

        let client = IdeaApiClient::new(test_config(&server)).unwrap();
        let id = client.generate_identifier("invoicing").await;

        mock.assert();
        assert_eq!(id.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_generate_identifier_absorbs_failures() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/micro-saas-ideas-generator");
            then.status(500).body("boom");
        });

        let client = IdeaApiClient::new(test_config(&server)).unwrap();
        assert_eq!(client.generate_identifier("invoicing").await, None);
        mock.assert_calls(1);

        let metrics = client.metrics().await;
        assert_eq!(metrics.generate_identifier.failures, 1);
        assert_eq!(metrics.generate_identifier.last_status_code, Some(500));
    }

    #[tokio::test]
    async fn test_generate_identifier_without_id_is_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/micro-saas-ideas-generator");
            then.status(200).json_body(json!({"status": "queued"}));
        });

        let client = IdeaApiClient::new(test_config(&server)).unwrap();
        assert_eq!(client.generate_identifier("invoicing").await, None);
    }

    #[tokio::test]
    async fn test_generate_identifier_waits_request_delay() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/micro-saas-ideas-generator");
            then.status(503);
        });

        let mut config = test_config(&server);
        config.request_delay_ms = 50;
        let client = IdeaApiClient::new(config).unwrap();

        let started = Instant::now();
        assert_eq!(client.generate_identifier("invoicing").await, None);
        assert!(started.elapsed() >= std::time::Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_fetch_record_filters_by_id() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v1/micro_saas_ideas")
                .query_param("select", "*")
                .query_param("id", "eq.abc123")
                .header("accept-profile", "public");
            then.status(200).json_body(json!([
                {"id": "abc123", "niche": "invoicing", "ideas": "{'a': 'A', 'b': 'B'}"}
            ]));
        });

        let client = IdeaApiClient::new(test_config(&server)).unwrap();
        let record = client.fetch_record("abc123").await.unwrap();

        mock.assert();
        assert_eq!(record.id(), Some("abc123"));
        assert_eq!(record.get("niche"), Some(&json!("invoicing")));
    }

    #[tokio::test]
    async fn test_fetch_record_empty_array_is_empty_record() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rest/v1/micro_saas_ideas");
            then.status(200).json_body(json!([]));
        });

        let client = IdeaApiClient::new(test_config(&server)).unwrap();
        let record = client.fetch_record("missing").await.unwrap();
        assert!(record.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_record_fails_loudly() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rest/v1/micro_saas_ideas");
            then.status(401);
        });

        let client = IdeaApiClient::new(test_config(&server)).unwrap();
        let err = client.fetch_record("abc123").await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::IdeaApi(IdeaApiError::Unauthorized { .. })
        ));
        assert_eq!(err.error_code(), "IDEA_API");
    }

    #[tokio::test]
    async fn test_fetch_record_rate_limit_reads_retry_after() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rest/v1/micro_saas_ideas");
            then.status(429).header("retry-after", "7");
        });

        let client = IdeaApiClient::new(test_config(&server)).unwrap();
        let err = client.fetch_record("abc123").await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::IdeaApi(IdeaApiError::RateLimitExceeded { retry_after: 7 })
        ));
        assert_eq!(client.metrics().await.fetch_record.rate_limited, 1);
    }

    #[tokio::test]
    async fn test_fetch_record_rejects_non_array_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rest/v1/micro_saas_ideas");
            then.status(200).json_body(json!({"id": "abc123"}));
        });

        let client = IdeaApiClient::new(test_config(&server)).unwrap();
        let err = client.fetch_record("abc123").await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::IdeaApi(IdeaApiError::InvalidResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_ping_proxy() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(HEAD).path("/ip");
            then.status(200);
        });

        let client = IdeaApiClient::new(test_config(&server)).unwrap();
        assert!(client.healthy_proxy_check().await);
        mock.assert();
    }

    #[tokio::test]
    async fn test_ping_proxy_unhealthy() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(HEAD).path("/ip");
            then.status(502);
        });

        let client = IdeaApiClient::new(test_config(&server)).unwrap();
        assert!(!client.ping_proxy().await);
    }

    #[test]
    fn test_invalid_proxy_is_config_error() {
        let config = ApiConfig {
            proxy_url: Some("http://[::1".to_string()),
            ..ApiConfig::default()
        };
        let result = IdeaApiClient::new(config);
        assert!(matches!(result, Err(CoreError::Config(_))));
    }
}
