use crate::scoring::{build_prompt, extract_json_array, merge_scored, SYSTEM_PROMPT};
use crate::LlmProvider;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use scout_core::{CoreError, IdeaUnit, LlmConfig, LlmError, ScoredIdea};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

const PROVIDER: &str = "deepseek";

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Scores ideas through DeepSeek's chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct DeepSeekProvider {
    client: Client,
    config: LlmConfig,
}

impl DeepSeekProvider {
    pub fn new(config: LlmConfig) -> Result<Self, CoreError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| LlmError::InvalidApiKey {
                provider: PROVIDER.to_string(),
            })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
            LlmError::InvalidApiKey {
                provider: PROVIDER.to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self { client, config })
    }

    async fn complete(&self, prompt: String, idea_count: usize) -> Result<String, CoreError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(prompt),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self
                .config
                .max_tokens_per_idea
                .saturating_mul(idea_count as u32),
        };

        let response = self
            .client
            .post(&self.config.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CoreError::Llm(LlmError::RequestTimeout {
                        provider: PROVIDER.to_string(),
                    })
                } else {
                    CoreError::Network(e)
                }
            })?;

        let status = response.status();
        debug!("Scoring response status: {}", status);
        if !status.is_success() {
            error!("Scoring request failed with status {}", status);
            return Err(CoreError::Llm(status_error(status)));
        }

        let body: ChatResponse = response.json().await.map_err(|e| LlmError::InvalidResponseFormat {
            provider: PROVIDER.to_string(),
            details: e.to_string(),
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                CoreError::Llm(LlmError::InvalidResponseFormat {
                    provider: PROVIDER.to_string(),
                    details: "response has no message content".to_string(),
                })
            })
    }
}

impl LlmProvider for DeepSeekProvider {
    async fn score_ideas(&self, ideas: &[IdeaUnit]) -> Result<Vec<ScoredIdea>, CoreError> {
        if ideas.is_empty() {
            return Ok(Vec::new());
        }

        info!("Evaluating {} ideas...", ideas.len());
        let content = self.complete(build_prompt(ideas), ideas.len()).await?;
        let scored = extract_json_array(PROVIDER, &content)?;

        let original = ideas.iter().map(IdeaUnit::to_object).collect();
        Ok(merge_scored(original, scored))
    }
}

fn status_error(status: StatusCode) -> LlmError {
    let provider = PROVIDER.to_string();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::InvalidApiKey { provider },
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded { provider },
        s if s.is_server_error() => LlmError::ServiceUnavailable { provider },
        s => LlmError::RequestFailed {
            provider,
            status_code: s.as_u16(),
        },
    }
}
