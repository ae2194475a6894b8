use scout_core::{CoreError, IdeaRecord};

/// The two upstream calls the acquisition loop depends on.
pub trait IdeaSource {
    /// Never fails: any upstream problem is logged and reported as `None`.
    async fn generate_identifier(&self, keyword: &str) -> Option<String>;

    /// Fails loudly on any non-success answer. An empty upstream result is an
    /// empty record, not an error.
    async fn fetch_record(&self, identifier: &str) -> Result<IdeaRecord, CoreError>;
}
