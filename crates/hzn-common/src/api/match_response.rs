use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ProjectId;

/// One dashboard-ready match row: the ranked (id, score) pair joined with
/// the display columns the UI shows. Metadata fields stay null when a
/// project id has no row in the metadata catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    #[serde(rename = "projectID")]
    pub project_id: ProjectId,
    /// Cosine similarity in [-1, 1].
    pub score: f32,
    pub acronym: Option<String>,
    pub title: Option<String>,
    pub funding_scheme: Option<String>,
    pub total_cost: Option<f64>,
    pub ec_max_contribution: Option<f64>,
    pub objective: Option<String>,
}

/// Envelope for a match listing, carrying enough metadata to trace every
/// score back to the run and encoder generation that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchListResponse {
    pub run_id: String,
    pub request_id: String,
    pub encoder: String,
    pub encoder_version: String,
    pub matched_at: DateTime<Utc>,
    pub matches: Vec<MatchResponse>,
}

/// Serving-side knobs for match requests.
#[derive(Debug, Clone)]
pub struct MatchSettings {
    /// Used when the request omits top_n.
    pub default_top_n: usize,
    /// Hard cap on requested top_n.
    pub max_top_n: usize,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            default_top_n: 10,
            max_top_n: 100,
        }
    }
}

impl MatchSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_top_n: env_usize("HZN_DEFAULT_TOP_N").unwrap_or(defaults.default_top_n),
            max_top_n: env_usize("HZN_MAX_TOP_N").unwrap_or(defaults.max_top_n),
        }
    }

    /// Resolve a requested top_n against the defaults and the cap.
    pub fn resolve_top_n(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_top_n).min(self.max_top_n)
    }
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .filter(|value| *value > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_top_n_applies_default_and_cap() {
        let settings = MatchSettings {
            default_top_n: 10,
            max_top_n: 50,
        };

        assert_eq!(settings.resolve_top_n(None), 10);
        assert_eq!(settings.resolve_top_n(Some(25)), 25);
        assert_eq!(settings.resolve_top_n(Some(500)), 50);
        assert_eq!(settings.resolve_top_n(Some(0)), 0);
    }

    #[test]
    fn match_response_serializes_dataset_column_names() {
        let row = MatchResponse {
            project_id: 101069207,
            score: 0.83,
            acronym: Some("BIOSPHERE".into()),
            title: Some("Biosphere monitoring".into()),
            funding_scheme: Some("HORIZON-RIA".into()),
            total_cost: Some(2_500_000.0),
            ec_max_contribution: None,
            objective: None,
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["projectID"], 101069207);
        assert_eq!(json["fundingScheme"], "HORIZON-RIA");
        assert_eq!(json["totalCost"], 2_500_000.0);
        assert!(json["ecMaxContribution"].is_null());
    }
}
