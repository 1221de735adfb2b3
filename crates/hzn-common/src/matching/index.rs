use std::collections::HashSet;

use tracing::info;

use super::MatchError;
use crate::embedding::TextEncoder;
use crate::ProjectId;

/// Precomputed project embeddings: a parallel id list and a row-major
/// (N x D) vector matrix, positionally aligned.
///
/// Invariants, enforced at construction:
/// - `ids.len() == rows.len()`
/// - ids are unique
/// - every row has the same width D
///
/// An index is immutable once built; replacing embeddings means building a
/// new index and swapping it in at the [`Recommender`](super::Recommender).
///
/// N = 0 is a valid (empty) index; every query against it returns an empty
/// match list.
#[derive(Debug, Clone)]
pub struct ProjectEmbeddingIndex {
    ids: Vec<ProjectId>,
    rows: Vec<Vec<f32>>,
    dimension: usize,
}

impl ProjectEmbeddingIndex {
    /// Build an index from precomputed vectors (the load-from-artifact path).
    pub fn from_vectors(
        ids: Vec<ProjectId>,
        rows: Vec<Vec<f32>>,
    ) -> Result<Self, MatchError> {
        if ids.len() != rows.len() {
            return Err(MatchError::ShapeMismatch {
                ids: ids.len(),
                rows: rows.len(),
            });
        }

        let mut seen = HashSet::with_capacity(ids.len());
        for id in &ids {
            if !seen.insert(*id) {
                return Err(MatchError::DuplicateIdentifier(*id));
            }
        }

        let dimension = rows.first().map(|row| row.len()).unwrap_or(0);
        for row in &rows {
            if row.len() != dimension {
                return Err(MatchError::DimensionMismatch {
                    expected: dimension,
                    actual: row.len(),
                });
            }
        }

        Ok(Self {
            ids,
            rows,
            dimension,
        })
    }

    /// Build an index by encoding objective texts (the train path).
    /// `ids` and `texts` correspond 1:1 by position.
    pub fn build(
        ids: Vec<ProjectId>,
        texts: &[String],
        encoder: &dyn TextEncoder,
    ) -> Result<Self, MatchError> {
        if ids.len() != texts.len() {
            return Err(MatchError::ShapeMismatch {
                ids: ids.len(),
                rows: texts.len(),
            });
        }

        let rows = encoder.encode(texts)?;
        let index = Self::from_vectors(ids, rows)?;

        info!(
            projects = index.len(),
            dimension = index.dimension(),
            encoder = encoder.name(),
            encoder_version = encoder.version(),
            "built project embedding index"
        );

        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Vector width D. 0 only for an empty index.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn ids(&self) -> &[ProjectId] {
        &self.ids
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }
}
