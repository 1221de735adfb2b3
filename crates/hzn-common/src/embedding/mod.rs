pub mod hash_encoder;
pub mod tokenizer;

pub use hash_encoder::HashEncoder;

use thiserror::Error;
use tracing::warn;

/// Failure of the underlying encode call. Surfaced immediately to the
/// caller; retry/backoff is a caller-level concern.
#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("encoder backend failure: {0}")]
    Backend(String),
}

/// Abstract text-to-vector encoder.
///
/// Implementations:
/// - HashEncoder: feature hashing over normalized tokens (deterministic,
///   training-free)
///
/// name() and version() are recorded in match responses so a score can be
/// attributed to the encoder generation that produced it.
pub trait TextEncoder: Send + Sync {
    /// Implementation name ("hash"); also the encoder-selector artifact value.
    fn name(&self) -> &'static str;

    /// Version marker for model-generation management.
    /// Bump whenever token design or hashing changes.
    fn version(&self) -> &str;

    /// Embedding width; every produced vector has exactly this length.
    fn dimension(&self) -> usize;

    /// Encode a batch of texts, one vector per input, in input order.
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EncoderError>;

    /// Encode a single text. Default goes through the batch path.
    fn encode_one(&self, text: &str) -> Result<Vec<f32>, EncoderError> {
        let mut vectors = self.encode(std::slice::from_ref(&text.to_string()))?;
        vectors.pop().ok_or_else(|| {
            EncoderError::Backend("encoder returned no vector for a single input".into())
        })
    }
}

#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Embedding width (powers of two recommended: 256, 512, 1024).
    pub dimension: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self { dimension: 256 }
    }
}

/// Read encoder settings from the environment (`HZN_ENCODER_DIMENSION`).
pub fn load_config_from_env() -> EncoderConfig {
    EncoderConfig {
        dimension: std::env::var("HZN_ENCODER_DIMENSION")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
    }
}

/// Encoder factory keyed by the encoder-selector artifact string.
/// Unknown names fall back to the hash encoder.
pub fn create_encoder(name: &str, config: EncoderConfig) -> Box<dyn TextEncoder> {
    match name {
        "hash" => Box::new(HashEncoder::new(config)),
        other => {
            warn!(encoder = other, "unknown encoder name; falling back to hash");
            Box::new(HashEncoder::new(config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_falls_back_to_hash_for_unknown_names() {
        let encoder = create_encoder("sentence-transformer", EncoderConfig { dimension: 64 });
        assert_eq!(encoder.name(), "hash");
        assert_eq!(encoder.dimension(), 64);
    }

    #[test]
    fn encode_one_matches_batch_encoding() {
        let encoder = create_encoder("hash", EncoderConfig::default());
        let single = encoder.encode_one("marine ecosystems").unwrap();
        let batch = encoder.encode(&["marine ecosystems".to_string()]).unwrap();
        assert_eq!(single, batch[0]);
    }
}
