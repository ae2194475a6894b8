//! Prompt building and response handling for idea scoring.

use regex::Regex;
use scout_core::{IdeaUnit, LlmError, ScoredIdea};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::warn;

pub const SYSTEM_PROMPT: &str = "You are a startup analyst.  \
Return a JSON list with keys: score, market_size, competition, build_difficulty, mvp_budget, summary.  \
score is 0-100.  \
market_size ∈ {large,medium,small}.  \
competition ∈ {high,medium,low}.  \
build_difficulty ∈ {easy,medium,hard}.  \
mvp_budget is a float in EUR based on the fiverr prices.  \
summary is 2-3 sentences.";

static FENCED_ARRAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\[.*?\])\s*```").expect("fenced array pattern compiles")
});
static BARE_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(\[.*?\])").expect("bare array pattern compiles"));

/// Numbered list of ideas, one `Idea:`/`Description:` block per idea.
pub fn build_prompt(ideas: &[IdeaUnit]) -> String {
    ideas
        .iter()
        .enumerate()
        .map(|(i, idea)| {
            format!(
                "{}. Idea: {}\n   Description: {}",
                i + 1,
                idea.title,
                idea.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// First JSON array in a model reply. A fenced block wins over a bare array.
pub fn extract_json_array(provider: &str, text: &str) -> Result<Vec<Value>, LlmError> {
    let invalid = |details: String| LlmError::InvalidResponseFormat {
        provider: provider.to_string(),
        details,
    };

    let found = FENCED_ARRAY
        .captures(text)
        .or_else(|| BARE_ARRAY.captures(text))
        .and_then(|captures| captures.get(1));

    let Some(array) = found else {
        return Err(invalid("no JSON array in response".to_string()));
    };
    serde_json::from_str(array.as_str()).map_err(|e| invalid(format!("unparseable JSON array: {e}")))
}

/// Adds the scored keys to the matching original entry by position. Keys the
/// original already has are kept as they are.
pub fn merge_scored(mut original: Vec<ScoredIdea>, scored: Vec<Value>) -> Vec<ScoredIdea> {
    if scored.len() != original.len() {
        warn!(
            "Scored {} entries for {} ideas",
            scored.len(),
            original.len()
        );
    }

    for (idx, entry) in scored.into_iter().enumerate() {
        let Some(target) = original.get_mut(idx) else {
            warn!("Ignoring scored entry {} with no matching idea", idx);
            continue;
        };
        let Value::Object(fields) = entry else {
            warn!("Ignoring scored entry {}: not a JSON object", idx);
            continue;
        };

        for (key, value) in fields {
            if target.contains_key(&key) {
                warn!("Keeping original '{}', discarding scored value {}", key, value);
                continue;
            }
            target.insert(key, value);
        }
    }

    original
}
