//! Semantic embeddings
//!
//! Provides local embedding generation using fastembed (ONNX-based) behind
//! the `embeddings` feature, plus a deterministic mock embedder for tests
//! and environments without model access. No external API calls required.

mod local;
mod mock;

pub use local::{
    Embedder, Embedding, EmbeddingError, EmbeddingService, LocalEmbedder, BATCH_SIZE,
    EMBEDDING_DIMENSIONS, MAX_TEXT_LENGTH, RAW_DIMENSIONS, cosine_similarity, dot_product,
    euclidean_distance, matryoshka_truncate,
};
pub use mock::{MOCK_DIMENSIONS, MockEmbedder};
