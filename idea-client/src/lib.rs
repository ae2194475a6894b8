pub mod accumulator;
pub mod api;
pub mod extractor;
pub mod literal;
pub mod metrics;
pub mod source;

pub use accumulator::{IdeaAccumulator, DEFAULT_MAX_REQUESTS};
pub use api::IdeaApiClient;
pub use extractor::{extract, pair_values};
pub use literal::decode_mapping;
pub use metrics::{ApiMetrics, CallOutcome, CallStats, MetricsCollector, UpstreamCall};
pub use source::IdeaSource;

use idea_cache::CacheStore;
use scout_core::{AppConfig, CoreError, IdeaRecord, IdeaUnit};
use tracing::{info, warn};

/// Entry point used by the binary: the HTTP gateway, the cache and the
/// acquisition loop wired from one `AppConfig`.
#[derive(Debug)]
pub struct IdeaClient {
    accumulator: IdeaAccumulator<IdeaApiClient>,
}

impl IdeaClient {
    pub fn new(config: &AppConfig) -> Result<Self, CoreError> {
        let api = IdeaApiClient::new(config.api.clone())?;
        let cache = CacheStore::new(config.cache.dir.clone());
        Ok(Self {
            accumulator: IdeaAccumulator::new(api, cache, config.acquisition.cycle_delay()),
        })
    }

    pub fn api(&self) -> &IdeaApiClient {
        self.accumulator.source()
    }

    pub fn cache(&self) -> &CacheStore {
        self.accumulator.cache()
    }

    /// One record for `keyword`: the cached identifier when there is one,
    /// otherwise a freshly generated one. `None` when generation fails.
    pub async fn get_ideas(&self, keyword: &str) -> Result<Option<IdeaRecord>, CoreError> {
        let id = match self.cache().load(keyword).await? {
            Some(id) => {
                info!("Cache hit for '{}': {}", keyword, id);
                id
            }
            None => {
                let Some(id) = self.api().generate_identifier(keyword).await else {
                    warn!("No identifier generated for '{}'", keyword);
                    return Ok(None);
                };
                self.cache().save_identifier(keyword, &id).await?;
                id
            }
        };

        let record = self.api().fetch_record(&id).await?;
        if !record.is_empty() {
            self.cache().save_record(keyword, &record).await?;
        }
        Ok(Some(record))
    }

    pub async fn deep_extract_ideas(
        &self,
        keyword: &str,
        target_count: usize,
        max_requests: u32,
    ) -> Result<Vec<IdeaUnit>, CoreError> {
        self.accumulator
            .acquire(keyword, target_count, max_requests)
            .await
    }

    pub async fn list_cached_keywords(&self) -> Result<Vec<String>, CoreError> {
        self.cache().list_cached_keywords().await
    }
}
