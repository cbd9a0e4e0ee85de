//! Deterministic embedder for tests and environments without a local model.
//!
//! Hashes each word's sparse contributions across ~16 dimensions (rather than
//! a single bucket) so that semantically-overlapping text (shares words)
//! lands closer in cosine space than unrelated text, without needing ONNX or
//! network access. Positional decay weights earlier words more heavily, and
//! small character-trigram contributions let near-miss spellings and shared
//! roots still register as partial overlap.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::local::{Embedder, EmbeddingError};

/// Output dimensionality of [`MockEmbedder`].
pub const MOCK_DIMENSIONS: usize = 128;

/// Number of dimensions each token's hash is spread across.
const SPARSE_DIMS_PER_TOKEN: usize = 16;

/// Weight applied to character-trigram contributions, relative to whole-word
/// contributions of weight 1.0.
const TRIGRAM_WEIGHT: f32 = 0.25;

/// Always-available embedder that derives a vector from word hashes.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockEmbedder;

impl MockEmbedder {
    pub fn new() -> Self {
        Self
    }

    fn hash_str(s: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    fn accumulate(vector: &mut [f32], key: &str, weight: f32) {
        for i in 0..SPARSE_DIMS_PER_TOKEN {
            let hash = Self::hash_str(&format!("{key}#{i}"));
            let bucket = (hash as usize) % vector.len();
            let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign * weight;
        }
    }

    fn trigrams(word: &str) -> Vec<String> {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() < 3 {
            return vec![word.to_string()];
        }
        chars.windows(3).map(|w| w.iter().collect()).collect()
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; MOCK_DIMENSIONS];
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return vector;
        }

        for (pos, word) in words.iter().enumerate() {
            let lower = word.to_lowercase();
            Self::accumulate(&mut vector, &lower, 1.0);

            let positional_decay = 1.0 / (pos as f32 + 1.0);
            let pos_hash = Self::hash_str(&format!("pos#{lower}"));
            let pos_bucket = (pos_hash as usize) % vector.len();
            vector[pos_bucket] += positional_decay;

            for trigram in Self::trigrams(&lower) {
                Self::accumulate(&mut vector, &trigram, TRIGRAM_WEIGHT);
            }
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

impl Embedder for MockEmbedder {
    fn dimensions(&self) -> usize {
        MOCK_DIMENSIONS
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.is_empty() {
            return Err(EmbeddingError::InvalidInput("Text cannot be empty".to_string()));
        }
        Ok(self.embed_one(text))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}
