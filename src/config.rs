// IMPORTANT:
// Keep ALL numeric values centralized here (no hardcoded numeric values scattered around).

// NOTE: VERSION must stay in sync with the `version` field in Cargo.toml.
pub const VERSION: &str = "0.1.0";

pub const USAGE: &str = "Please provide text as an argument";

pub mod logging {
    pub const LOG_DIR_REL: &str = ".generate_vectors/logs";
    pub const LOG_FILE_NAME: &str = "generate_vectors.log";
    pub const DEFAULT_LOG_SPEC: &str = "info";

    pub const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
    pub const LOG_ROTATE_KEEP_FILES: usize = 5;
}

pub mod embedding {
    pub const EMBEDDING_DIMS: usize = 384;
    pub const EMBEDDING_MODEL_NAME: &str = "all-MiniLM-L6-v2";

    // sentence-transformers max_seq_length for all-MiniLM-L6-v2.
    pub const MAX_TOKENS: usize = 256;

    pub const CONFIG_FILE: &str = "config.json";
    pub const WEIGHTS_FILE: &str = "model.safetensors";
    pub const TOKENIZER_FILE: &str = "tokenizer.json";

    // Clamp floors for pooling / normalization denominators.
    pub const MASK_SUM_EPS: f64 = 1e-9;
    pub const NORM_EPS: f64 = 1e-12;
}

pub mod download {
    pub const MODEL_BASE_URL: &str =
        "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main";

    // SHA256 hashes for integrity verification
    pub const MODEL_SAFETENSORS_SHA256: &str =
        "53aa51172d142c89d9012cce15ae4d6cc0ca6895895114379cacb4fab128d9db";
    pub const TOKENIZER_JSON_SHA256: &str =
        "be50c3628f2bf5bb5e3a7f17b1f74611b2561a3a27eeab05e5aa30f411572037";
    pub const CONFIG_JSON_SHA256: &str =
        "953f9c0d463486b10a6871cc2fd59f223b2c70184f49815e7efbcab5d8908b41";

    // Local model storage directory (relative to home)
    pub const MODEL_DIR_REL: &str = ".generate_vectors/models/all-MiniLM-L6-v2";

    pub const DOWNLOAD_TIMEOUT_SECS: u64 = 90;
}

pub mod remote {
    pub const FEATURE_EXTRACTION_URL: &str = "https://api-inference.huggingface.co/pipeline/feature-extraction/sentence-transformers/all-MiniLM-L6-v2";

    // wait_for_model can hold the request while the hosted model cold-starts.
    pub const REQUEST_TIMEOUT_SECS: u64 = 120;
}

pub mod env {
    pub const BACKEND: &str = "GENERATE_VECTORS_BACKEND";
    pub const MODEL_DIR: &str = "GENERATE_VECTORS_MODEL_DIR";
    pub const MODEL_BASE_URL: &str = "GENERATE_VECTORS_MODEL_BASE_URL";
    pub const LOG_DIR: &str = "GENERATE_VECTORS_LOG_DIR";
    pub const LOG_SPEC: &str = "GENERATE_VECTORS_LOG";
    pub const HF_API_KEY: &str = "HUGGING_FACE_API_KEY";
}

/// Read an environment variable, treating unset and empty the same way.
pub fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Home directory: `HOME`, falling back to `USERPROFILE` on Windows.
pub fn home_dir() -> anyhow::Result<std::path::PathBuf> {
    env_non_empty("HOME")
        .or_else(|| env_non_empty("USERPROFILE"))
        .map(std::path::PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory (neither HOME nor USERPROFILE is set)"))
}
