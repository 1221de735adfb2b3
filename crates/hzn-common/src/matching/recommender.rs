use std::sync::{Arc, RwLock};

use tracing::debug;

use super::{rank, MatchError, ProjectEmbeddingIndex, RankedProject};
use crate::embedding::TextEncoder;
use crate::ProjectId;

/// Facade over encoder + index + ranker: the single entry point the API
/// layer calls.
///
/// Lifecycle: constructed without an index (`Uninitialized`), then
/// `load_pretrained` or `train` publishes one (`Ready`). Either call may be
/// repeated; the index is rebuilt off to the side and swapped in atomically,
/// so queries in flight keep the snapshot they started with and never
/// observe a half-loaded index.
pub struct Recommender {
    encoder: Box<dyn TextEncoder>,
    index: RwLock<Option<Arc<ProjectEmbeddingIndex>>>,
}

impl Recommender {
    pub fn new(encoder: Box<dyn TextEncoder>) -> Self {
        Self {
            encoder,
            index: RwLock::new(None),
        }
    }

    /// Publish precomputed embeddings (the load-from-artifact path).
    /// Replaces any previously held index wholesale.
    pub fn load_pretrained(
        &self,
        ids: Vec<ProjectId>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<(), MatchError> {
        let index = ProjectEmbeddingIndex::from_vectors(ids, vectors)?;
        self.publish(index);
        Ok(())
    }

    /// Encode objective texts with the held encoder and publish the result.
    pub fn train(&self, ids: Vec<ProjectId>, objectives: &[String]) -> Result<(), MatchError> {
        let index = ProjectEmbeddingIndex::build(ids, objectives, self.encoder.as_ref())?;
        self.publish(index);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.index
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    pub fn encoder(&self) -> &dyn TextEncoder {
        self.encoder.as_ref()
    }

    /// Number of indexed projects; 0 before any load.
    pub fn indexed_projects(&self) -> usize {
        self.snapshot().map(|index| index.len()).unwrap_or(0)
    }

    /// Rank the indexed projects against a free-text proposal.
    ///
    /// An empty or all-whitespace proposal returns an empty list without
    /// invoking the encoder — the guard lives here so every caller gets it,
    /// not just the dashboard. `top_n` above the index size returns all
    /// indexed projects.
    pub fn get_top_matches(
        &self,
        proposal_text: &str,
        top_n: usize,
    ) -> Result<Vec<RankedProject>, MatchError> {
        if proposal_text.trim().is_empty() {
            debug!("empty proposal; skipping encode");
            return Ok(Vec::new());
        }

        let index = self.snapshot().ok_or(MatchError::NotReady)?;

        // Encode outside any lock: the encoder call is the slow part and the
        // snapshot keeps this query consistent even if a retrain lands now.
        let query = self.encoder.encode_one(proposal_text)?;

        rank(&query, &index, top_n)
    }

    fn snapshot(&self) -> Option<Arc<ProjectEmbeddingIndex>> {
        self.index.read().ok().and_then(|guard| guard.clone())
    }

    fn publish(&self, index: ProjectEmbeddingIndex) {
        let mut guard = self
            .index
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(Arc::new(index));
    }
}
