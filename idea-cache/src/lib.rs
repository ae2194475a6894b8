//! Keyword-indexed JSON cache.
//!
//! One pretty-printed file per keyword and purpose lives in the cache
//! directory:
//!
//! - `keyword_id_<keyword>.json`: `{"id": ...}` as soon as an identifier exists
//! - `ideas_<keyword>.json`: the full record fetched for that identifier
//! - `deep_<keyword>_<target>.json`: the accumulated idea list of one acquisition
//! - `deepseek_<keyword>.json`: scored ideas
//!
//! There is no locking; concurrent writers for the same keyword race and the
//! last one wins.

use scout_core::{CacheError, CoreError, IdeaRecord, IdeaUnit, KeywordCacheEntry, ScoredIdea};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const IDENTIFIER_PREFIX: &str = "keyword_id_";
const RECORD_PREFIX: &str = "ideas_";
const OUTPUT_PREFIX: &str = "deep_";
const SCORED_PREFIX: &str = "deepseek_";

/// Lowercases and replaces every non-alphanumeric character with `_`.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn identifier_path(&self, keyword: &str) -> PathBuf {
        self.file(IDENTIFIER_PREFIX, &normalize_keyword(keyword))
    }

    pub fn record_path(&self, keyword: &str) -> PathBuf {
        self.file(RECORD_PREFIX, &normalize_keyword(keyword))
    }

    pub fn output_path(&self, keyword: &str, target: usize) -> PathBuf {
        self.file(
            OUTPUT_PREFIX,
            &format!("{}_{}", normalize_keyword(keyword), target),
        )
    }

    pub fn scored_path(&self, keyword: &str) -> PathBuf {
        self.file(SCORED_PREFIX, &normalize_keyword(keyword))
    }

    fn file(&self, prefix: &str, stem: &str) -> PathBuf {
        self.dir.join(format!("{prefix}{stem}.json"))
    }

    /// Identifier known for `keyword`, preferring the full record over the
    /// identifier-only entry.
    pub async fn load(&self, keyword: &str) -> Result<Option<String>, CoreError> {
        Ok(self
            .load_entry(keyword)
            .await?
            .and_then(|entry| entry.id().map(str::to_string)))
    }

    pub async fn load_entry(&self, keyword: &str) -> Result<Option<KeywordCacheEntry>, CoreError> {
        if let Some(record) = self.read_json::<IdeaRecord>(&self.record_path(keyword)).await? {
            if record.id().is_some() {
                return Ok(Some(KeywordCacheEntry::Record(record)));
            }
            warn!(
                "Cached record for '{}' has no id, falling back to identifier entry",
                keyword
            );
        }

        let Some(entry) = self.read_json::<Value>(&self.identifier_path(keyword)).await? else {
            return Ok(None);
        };
        match entry.get("id").and_then(Value::as_str) {
            Some(id) => Ok(Some(KeywordCacheEntry::Identifier { id: id.to_string() })),
            None => Err(CacheError::Corrupt {
                path: self.identifier_path(keyword).display().to_string(),
            }
            .into()),
        }
    }

    /// Identifier write path. The entry must be a JSON object with an `id`.
    pub async fn save(&self, keyword: &str, entry: &Value) -> Result<(), CoreError> {
        let Some(object) = entry.as_object() else {
            return Err(CacheError::InvalidEntry {
                keyword: keyword.to_string(),
                reason: "entry must be a JSON object".to_string(),
            }
            .into());
        };
        if !object.contains_key("id") {
            return Err(CacheError::InvalidEntry {
                keyword: keyword.to_string(),
                reason: "entry must contain an 'id' field".to_string(),
            }
            .into());
        }

        self.write_json(&self.identifier_path(keyword), entry).await
    }

    pub async fn save_identifier(&self, keyword: &str, id: &str) -> Result<(), CoreError> {
        self.save(keyword, &serde_json::json!({ "id": id })).await
    }

    /// Full-record write path; stores whatever mapping it is given.
    pub async fn save_record(&self, keyword: &str, record: &IdeaRecord) -> Result<(), CoreError> {
        self.write_json(&self.record_path(keyword), record).await
    }

    pub async fn save_output(
        &self,
        keyword: &str,
        target: usize,
        ideas: &[IdeaUnit],
    ) -> Result<(), CoreError> {
        self.write_json(&self.output_path(keyword, target), ideas)
            .await
    }

    pub async fn load_output(
        &self,
        keyword: &str,
        target: usize,
    ) -> Result<Option<Vec<IdeaUnit>>, CoreError> {
        self.read_json(&self.output_path(keyword, target)).await
    }

    pub async fn save_scored(&self, keyword: &str, scored: &[ScoredIdea]) -> Result<(), CoreError> {
        self.write_json(&self.scored_path(keyword), scored).await
    }

    /// Keywords with an identifier or record entry, in their normalized form
    /// with `_` shown as spaces. Sorted and deduplicated.
    pub async fn list_cached_keywords(&self) -> Result<Vec<String>, CoreError> {
        let mut keywords = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(keywords),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let keyword = stem
                .strip_prefix(IDENTIFIER_PREFIX)
                .or_else(|| stem.strip_prefix(RECORD_PREFIX));
            if let Some(keyword) = keyword {
                keywords.push(keyword.replace('_', " "));
            }
        }

        keywords.sort();
        keywords.dedup();
        Ok(keywords)
    }

    async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>, CoreError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        debug!("Cache hit: {}", path.display());
        serde_json::from_str(&raw).map(Some).map_err(|e| {
            warn!("Failed to parse cache file {}: {}", path.display(), e);
            CoreError::from(CacheError::Corrupt {
                path: path.display().to_string(),
            })
        })
    }

    async fn write_json<T: Serialize + ?Sized>(
        &self,
        path: &Path,
        value: &T,
    ) -> Result<(), CoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let body = serde_json::to_string_pretty(value)?;
        tokio::fs::write(path, body).await?;
        debug!("Wrote cache file {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests;
