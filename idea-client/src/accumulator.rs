use crate::extractor::extract;
use crate::source::IdeaSource;
use idea_cache::CacheStore;
use scout_core::{CoreError, IdeaSet, IdeaUnit};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_REQUESTS: u32 = 10;

/// Repeats generate → fetch → extract cycles for one keyword until enough
/// distinct ideas are collected or the request budget runs out.
#[derive(Debug)]
pub struct IdeaAccumulator<S> {
    source: S,
    cache: CacheStore,
    cycle_delay: Duration,
}

impl<S: IdeaSource> IdeaAccumulator<S> {
    pub fn new(source: S, cache: CacheStore, cycle_delay: Duration) -> Self {
        Self {
            source,
            cache,
            cycle_delay,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Collects up to `target_count` distinct ideas for `keyword` and writes
    /// them to the keyword's output cache entry.
    ///
    /// `remaining_requests` only drops on a completed cycle. Consecutive
    /// failed identifier generations are capped separately at
    /// `max_requests`, so a generator that never answers still ends the loop.
    ///
    /// Fetch and extraction errors abort the whole acquisition.
    pub async fn acquire(
        &self,
        keyword: &str,
        target_count: usize,
        max_requests: u32,
    ) -> Result<Vec<IdeaUnit>, CoreError> {
        info!(
            "Acquiring {} ideas for '{}' (max {} requests)",
            target_count, keyword, max_requests
        );

        let mut ideas = IdeaSet::with_limit(target_count);
        let mut identifier = if target_count > 0 {
            self.cache.load(keyword).await?
        } else {
            None
        };
        let mut identifier_persisted = identifier.is_some();
        if identifier_persisted {
            debug!("Using cached identifier for '{}'", keyword);
        }

        let mut remaining_requests = max_requests;
        let mut generation_attempts = max_requests;

        while ideas.len() < target_count && remaining_requests > 0 {
            let Some(id) = identifier.take() else {
                if generation_attempts == 0 {
                    warn!(
                        "Giving up on '{}': {} identifier generations failed in a row",
                        keyword, max_requests
                    );
                    break;
                }

                identifier = self.source.generate_identifier(keyword).await;
                match &identifier {
                    Some(id) => {
                        generation_attempts = max_requests;
                        if !identifier_persisted {
                            self.cache.save_identifier(keyword, id).await?;
                            identifier_persisted = true;
                        }
                    }
                    None => generation_attempts -= 1,
                }
                continue;
            };

            let record = self.source.fetch_record(&id).await?;
            if record.is_empty() {
                warn!("Record {} for '{}' is empty", id, keyword);
            } else {
                self.cache.save_record(keyword, &record).await?;
            }

            let units = extract(&record)?;
            let extracted = units.len();
            let added = ideas.extend_until_full(units);
            info!(
                "Cycle for '{}': {} extracted, {} new, {}/{} collected",
                keyword,
                extracted,
                added,
                ideas.len(),
                target_count
            );

            // Next identifier is fetched ahead of the loop test, but only
            // when another cycle can still be useful
            if !ideas.is_full() {
                identifier = self.source.generate_identifier(keyword).await;
                generation_attempts = match identifier {
                    Some(_) => max_requests,
                    None => generation_attempts.saturating_sub(1),
                };
            }

            sleep(self.cycle_delay).await;
            remaining_requests -= 1;
        }

        if ideas.len() < target_count {
            warn!(
                "Collected {} of {} ideas for '{}'",
                ideas.len(),
                target_count,
                keyword
            );
        }

        let result = ideas.into_vec();
        self.cache
            .save_output(keyword, target_count, &result)
            .await?;
        Ok(result)
    }
}
