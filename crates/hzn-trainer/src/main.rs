use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use dotenvy::dotenv;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use hzn_common::artifacts;
use hzn_common::embedding::{create_encoder, EncoderConfig};
use hzn_common::logging;
use hzn_common::matching::{MatchError, ProjectEmbeddingIndex};
use hzn_common::ProjectId;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "hzn-trainer",
    about = "Encode a project objective corpus into embedding artifacts"
)]
struct Cli {
    /// Corpus file: JSON array of { "projectID": i64, "objective": string }
    #[arg(long, env = "HZN_CORPUS_PATH", default_value = "data/processed/project_objectives.json")]
    corpus_path: PathBuf,

    /// Output directory for the artifact set
    #[arg(long, env = "HZN_MODELS_DIR", default_value = "models")]
    out_dir: PathBuf,

    /// Encoder to train with (also written as the encoder-selector artifact)
    #[arg(long, env = "HZN_ENCODER", default_value = "hash")]
    encoder: String,

    /// Embedding width
    #[arg(long, env = "HZN_ENCODER_DIMENSION", default_value_t = 256)]
    dimension: usize,
}

#[derive(Debug, Error)]
enum TrainerError {
    #[error("corpus io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corpus parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corpus is empty")]
    EmptyCorpus,
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Artifact(#[from] hzn_common::artifacts::ArtifactError),
}

#[derive(Debug, Deserialize)]
struct CorpusRecord {
    #[serde(rename = "projectID")]
    project_id: ProjectId,
    objective: String,
}

fn read_corpus(path: &Path) -> Result<(Vec<ProjectId>, Vec<String>), TrainerError> {
    let raw = fs::read_to_string(path)?;
    let records: Vec<CorpusRecord> = serde_json::from_str(&raw)?;

    if records.is_empty() {
        return Err(TrainerError::EmptyCorpus);
    }

    Ok(records
        .into_iter()
        .map(|record| (record.project_id, record.objective))
        .unzip())
}

fn run(cli: Cli) -> Result<(), TrainerError> {
    let started = Instant::now();

    let (ids, objectives) = read_corpus(&cli.corpus_path)?;
    info!(
        corpus = %cli.corpus_path.display(),
        projects = ids.len(),
        "corpus loaded"
    );

    let encoder = create_encoder(
        &cli.encoder,
        EncoderConfig {
            dimension: cli.dimension,
        },
    );
    let index = ProjectEmbeddingIndex::build(ids, &objectives, encoder.as_ref())?;

    fs::create_dir_all(&cli.out_dir)?;
    artifacts::write_embedding_matrix(
        &cli.out_dir.join("project_embeddings.json"),
        index.rows(),
    )?;
    artifacts::write_project_ids(&cli.out_dir.join("project_ids.json"), index.ids())?;
    artifacts::write_encoder_name(&cli.out_dir.join("encoder_name.txt"), encoder.name())?;

    info!(
        projects = index.len(),
        dimension = index.dimension(),
        encoder = encoder.name(),
        encoder_version = encoder.version(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        out_dir = %cli.out_dir.display(),
        "artifacts written"
    );

    Ok(())
}

fn main() {
    dotenv().ok();
    logging::init("hzn-trainer");

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        tracing::error!(error = %err, "hzn-trainer failed");
        std::process::exit(1);
    }
}
