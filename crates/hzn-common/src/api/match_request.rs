use serde::Deserialize;

/// Match request from the dashboard: a free-text proposal and an optional
/// result count (server clamps it, see `MatchSettings`).
#[derive(Debug, Clone, Deserialize)]
pub struct MatchRequest {
    pub proposal: String,
    #[serde(default)]
    pub top_n: Option<usize>,
}
