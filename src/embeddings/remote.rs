// remote.rs — Hosted embedding via the Hugging Face feature-extraction pipeline.
//
// Same model (sentence-transformers/all-MiniLM-L6-v2), computed server-side.

use anyhow::{bail, Context};
use serde::Serialize;
use serde_json::Value;

use crate::config;

#[derive(Debug, Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: [&'a str; 1],
    options: RequestOptions,
}

#[derive(Debug, Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

pub struct RemoteEmbedder {
    url: String,
    api_key: String,
}

impl RemoteEmbedder {
    /// Build from the environment; the API key is required.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = config::env_non_empty(config::env::HF_API_KEY)
            .with_context(|| format!("{} is not set (required by the remote backend)", config::env::HF_API_KEY))?;
        Ok(Self::with_url(config::remote::FEATURE_EXTRACTION_URL, api_key))
    }

    pub fn with_url(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        log::info!("Requesting embedding from {}", self.url);

        let body = FeatureExtractionRequest {
            inputs: [text],
            options: RequestOptions { wait_for_model: true },
        };

        let resp = ureq::post(&self.url)
            .timeout(std::time::Duration::from_secs(config::remote::REQUEST_TIMEOUT_SECS))
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(&body)
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => {
                    let detail = resp.into_string().unwrap_or_default();
                    anyhow::anyhow!("HTTP {code} from feature-extraction API: {}", detail.trim())
                }
                other => anyhow::Error::new(other).context("feature-extraction request failed"),
            })?;

        let value: Value = resp.into_json().context("invalid JSON from feature-extraction API")?;
        parse_embedding(&value)
    }
}

/// Accept either `[[f, ...]]` (one row per input) or a bare `[f, ...]`.
fn parse_embedding(value: &Value) -> anyhow::Result<Vec<f32>> {
    let items = value
        .as_array()
        .with_context(|| format!("unexpected feature-extraction response: {value}"))?;
    let row = match items.first() {
        Some(Value::Array(inner)) => inner,
        Some(Value::Number(_)) => items,
        _ => bail!("unexpected feature-extraction response shape"),
    };

    let vector = row
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect::<Option<Vec<f32>>>()
        .context("feature-extraction response contains non-numeric values")?;

    if vector.len() != config::embedding::EMBEDDING_DIMS {
        bail!(
            "unexpected embedding dims: got {}, expected {}",
            vector.len(),
            config::embedding::EMBEDDING_DIMS
        );
    }
    Ok(vector)
}
