pub mod index;
pub mod ranker;
pub mod recommender;
pub mod similarity;

pub use index::ProjectEmbeddingIndex;
pub use ranker::rank;
pub use recommender::Recommender;
pub use similarity::cosine_similarity;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::embedding::EncoderError;
use crate::ProjectId;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("no project embedding index loaded; call load_pretrained or train first")]
    NotReady,
    #[error("query vector width {actual} does not match index width {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("identifier count {ids} does not match embedding row count {rows}")]
    ShapeMismatch { ids: usize, rows: usize },
    #[error("duplicate project identifier {0} in embedding index")]
    DuplicateIdentifier(ProjectId),
    #[error(transparent)]
    Encoder(#[from] EncoderError),
}

/// One ranked match: a project id and its cosine similarity to the query,
/// in [-1, 1]. A full result list is sorted non-increasing by score with
/// ties kept in index order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedProject {
    #[serde(rename = "projectID")]
    pub project_id: ProjectId,
    pub score: f32,
}
