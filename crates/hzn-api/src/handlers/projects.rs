use axum::{
    extract::{Path, State},
    Json,
};

use hzn_common::{Project, ProjectId};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::SharedState;

pub async fn get_project(
    State(state): State<SharedState>,
    Path(project_id): Path<ProjectId>,
    _auth: AuthUser,
) -> Result<Json<Project>, ApiError> {
    let project = state
        .catalog
        .get(project_id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("project {project_id} not found")))?;

    Ok(Json(project))
}
