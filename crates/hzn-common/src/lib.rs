pub mod api;
pub mod artifacts;
pub mod embedding;
pub mod logging;
pub mod matching;
pub mod normalize;
pub mod run_id;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// CORDIS project identifier (`projectID` in the merged dataset).
pub type ProjectId = i64;

// Project metadata row from the merged CORDIS dataset. The matching core
// only ever sees ids and objective texts; the full row exists for the
// display join in the API layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "projectID")]
    pub project_id: ProjectId,
    pub acronym: Option<String>,
    pub status: Option<String>,
    pub title: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_cost: Option<f64>,
    pub ec_max_contribution: Option<f64>,
    pub funding_scheme: Option<String>,
    pub framework_programme: Option<String>,
    pub topics: Option<String>,
    pub objective: Option<String>,
    #[serde(rename = "duration_years")]
    pub duration_years: Option<f64>,
    #[serde(rename = "n_organisations")]
    pub n_organisations: Option<u32>,
    #[serde(rename = "cordis_project_url")]
    pub cordis_project_url: Option<String>,
}
