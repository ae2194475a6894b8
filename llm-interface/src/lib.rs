pub mod deepseek;
pub mod scoring;

pub use deepseek::DeepSeekProvider;
pub use scoring::{build_prompt, extract_json_array, merge_scored, SYSTEM_PROMPT};

use scout_core::{CoreError, IdeaUnit, ScoredIdea};

pub trait LlmProvider {
    /// One scored entry per idea, each holding the original `{title: description}`
    /// pair plus whatever the model added.
    async fn score_ideas(&self, ideas: &[IdeaUnit]) -> Result<Vec<ScoredIdea>, CoreError>;
}
