//! Serialized model artifacts.
//!
//! Three files travel from a training run to a serving process, positionally
//! aligned with each other:
//! - `project_embeddings.json` — 2-D float array, shape (N, D)
//! - `project_ids.json` — array of N project ids, same row order
//! - `encoder_name.txt` — one line naming the encoder that produced the rows
//!
//! Reading is the serving process's whole persistence story; there is no
//! in-place mutation of artifacts after they are written.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::ProjectId;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("artifact parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("encoder name artifact is empty")]
    EmptyEncoderName,
}

pub fn read_embedding_matrix(path: &Path) -> Result<Vec<Vec<f32>>, ArtifactError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn write_embedding_matrix(path: &Path, rows: &[Vec<f32>]) -> Result<(), ArtifactError> {
    fs::write(path, serde_json::to_string(rows)?)?;
    Ok(())
}

pub fn read_project_ids(path: &Path) -> Result<Vec<ProjectId>, ArtifactError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn write_project_ids(path: &Path, ids: &[ProjectId]) -> Result<(), ArtifactError> {
    fs::write(path, serde_json::to_string(ids)?)?;
    Ok(())
}

/// The encoder-selector artifact: a single trimmed line.
pub fn read_encoder_name(path: &Path) -> Result<String, ArtifactError> {
    let raw = fs::read_to_string(path)?;
    let name = raw.trim();
    if name.is_empty() {
        return Err(ArtifactError::EmptyEncoderName);
    }
    Ok(name.to_string())
}

pub fn write_encoder_name(path: &Path, name: &str) -> Result<(), ArtifactError> {
    fs::write(path, format!("{}\n", name.trim()))?;
    Ok(())
}
