use std::str::FromStr;

use anyhow::{bail, Context};

use crate::config;
use crate::embeddings::download;
use crate::embeddings::engine::EmbeddingEngine;
use crate::embeddings::remote::RemoteEmbedder;

/// Which engine computes the embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Local,
    Remote,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Backend::Local),
            "remote" => Ok(Backend::Remote),
            other => bail!("unknown backend {other:?} (expected \"local\" or \"remote\")"),
        }
    }
}

impl Backend {
    pub fn from_env() -> anyhow::Result<Self> {
        match config::env_non_empty(config::env::BACKEND) {
            Some(v) => v.parse::<Backend>().with_context(|| format!("invalid {}", config::env::BACKEND)),
            None => Ok(Backend::default()),
        }
    }
}

/// Embed `text` and return the vector as a JSON array.
pub fn generate_vector(text: &str) -> anyhow::Result<String> {
    let backend = Backend::from_env()?;
    log::info!("Embedding {} with {:?} backend", input_size(text), backend);

    let vector = match backend {
        Backend::Local => {
            let model_dir = download::ensure_model_files()?;
            let engine = EmbeddingEngine::load(&model_dir)?;
            engine.embed(text)?
        }
        Backend::Remote => RemoteEmbedder::from_env()?.embed(text)?,
    };

    to_json(&vector)
}

/// Size of the input for log lines; byte and char counts differ for non-ASCII text.
pub fn input_size(text: &str) -> String {
    format!("{} chars / {} bytes", text.chars().count(), text.len())
}

pub fn to_json(vector: &[f32]) -> anyhow::Result<String> {
    serde_json::to_string(vector).context("failed serializing embedding")
}
