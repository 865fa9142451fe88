// embeddings/ — Sentence embedding backends.
//
// Provides:
// - Model resolution + download with SHA256 verification
// - Local BERT inference with mean pooling (candle)
// - Hosted inference via the Hugging Face feature-extraction API

pub mod download;
pub mod engine;
pub mod remote;
