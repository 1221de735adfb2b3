use std::hash::{Hash, Hasher};

use siphasher::sip::SipHasher13;

use super::tokenizer::{tokenize_text, WeightedToken};
use super::{EncoderConfig, EncoderError, TextEncoder};

/// Fixed seed for deterministic hashing.
/// Changing these values changes every embedding; bump `version()` with them.
const HASH_SEED_K0: u64 = 0x6861_7368_6578_7431;
const HASH_SEED_K1: u64 = 0x686f_7269_7a6f_6e32;

/// Deterministic feature-hashing text encoder.
///
/// - Training-free: a fixed hash function maps terms to dimensions
/// - O(tokens) per text
/// - SipHash-1-3 with a fixed seed keeps embeddings stable across Rust
///   versions and platforms
/// - Sign hashing keeps the expected dot-product contribution of unrelated
///   terms near zero
pub struct HashEncoder {
    config: EncoderConfig,
}

impl HashEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        let mut cfg = config;
        cfg.dimension = cfg.dimension.max(1);
        Self { config: cfg }
    }

    fn hash_token(&self, token: &str) -> usize {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        token.hash(&mut hasher);
        (hasher.finish() as usize) % self.config.dimension
    }

    fn tokens_to_vector(&self, tokens: &[WeightedToken]) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.config.dimension];

        for wt in tokens {
            let idx = self.hash_token(&wt.token);
            let sign = if self.hash_token(&format!("{}#sign", wt.token)) % 2 == 0 {
                1.0
            } else {
                -1.0
            };
            vector[idx] += sign * wt.weight;
        }

        // L2-normalize so cosine against other normalized vectors reduces to
        // a dot product. Texts with no usable tokens stay the zero vector.
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }
}

impl TextEncoder for HashEncoder {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn version(&self) -> &str {
        // Bump when the tokenizer or the hash seeds change.
        "v1"
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EncoderError> {
        Ok(texts
            .iter()
            .map(|text| self.tokens_to_vector(&tokenize_text(text)))
            .collect())
    }
}
