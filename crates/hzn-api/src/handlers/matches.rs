use axum::{extract::State, Json};
use chrono::Utc;

use hzn_common::api::{MatchListResponse, MatchRequest, MatchResponse};
use hzn_common::matching::RankedProject;
use hzn_common::run_id;

use crate::auth::AuthUser;
use crate::catalog::ProjectCatalog;
use crate::error::ApiError;
use crate::SharedState;

pub async fn find_matches(
    State(state): State<SharedState>,
    _auth: AuthUser,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchListResponse>, ApiError> {
    let top_n = state.settings.resolve_top_n(request.top_n);

    let ranked = state.recommender.get_top_matches(&request.proposal, top_n)?;

    let encoder = state.recommender.encoder();
    let response = MatchListResponse {
        run_id: run_id::get().to_string(),
        request_id: run_id::generate(),
        encoder: encoder.name().to_string(),
        encoder_version: encoder.version().to_string(),
        matched_at: Utc::now(),
        matches: join_metadata(&ranked, &state.catalog),
    };

    Ok(Json(response))
}

/// Join ranked (id, score) pairs against the metadata catalog. Ids the
/// catalog does not know keep their score with null display columns; the
/// ranking itself never depends on metadata presence.
fn join_metadata(ranked: &[RankedProject], catalog: &ProjectCatalog) -> Vec<MatchResponse> {
    ranked
        .iter()
        .map(|m| {
            let meta = catalog.get(m.project_id);
            MatchResponse {
                project_id: m.project_id,
                score: m.score,
                acronym: meta.and_then(|p| p.acronym.clone()),
                title: meta.and_then(|p| p.title.clone()),
                funding_scheme: meta.and_then(|p| p.funding_scheme.clone()),
                total_cost: meta.and_then(|p| p.total_cost),
                ec_max_contribution: meta.and_then(|p| p.ec_max_contribution),
                objective: meta.and_then(|p| p.objective.clone()),
            }
        })
        .collect()
}
