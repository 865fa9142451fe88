// download.rs — Model file resolution and download with SHA256 verification.
//
// Either uses a pre-provisioned model directory (GENERATE_VECTORS_MODEL_DIR) or
// downloads the weights on first use and caches them at ~/.generate_vectors/models/.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use sha2::{Digest, Sha256};

use crate::config;
use crate::config::embedding::{CONFIG_FILE, TOKENIZER_FILE, WEIGHTS_FILE};

/// Where the model files come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelLocation {
    /// Supplied by the caller; never downloaded into.
    Provided(PathBuf),
    /// Local cache, filled from the download base URL when incomplete.
    Cached(PathBuf),
}

impl ModelLocation {
    pub fn dir(&self) -> &Path {
        match self {
            ModelLocation::Provided(p) | ModelLocation::Cached(p) => p,
        }
    }
}

/// Resolve the model location from the environment.
pub fn model_location() -> anyhow::Result<ModelLocation> {
    location_from(config::env_non_empty(config::env::MODEL_DIR), config::home_dir)
}

fn location_from(
    override_dir: Option<String>,
    home: impl FnOnce() -> anyhow::Result<PathBuf>,
) -> anyhow::Result<ModelLocation> {
    match override_dir {
        Some(dir) => Ok(ModelLocation::Provided(PathBuf::from(dir))),
        None => Ok(ModelLocation::Cached(home()?.join(config::download::MODEL_DIR_REL))),
    }
}

/// Check if all required model files exist in `dir`.
pub fn model_files_exist(dir: &Path) -> bool {
    dir.join(WEIGHTS_FILE).exists() && dir.join(TOKENIZER_FILE).exists() && dir.join(CONFIG_FILE).exists()
}

/// Make sure the model files are available locally. Returns the model directory path.
pub fn ensure_model_files() -> anyhow::Result<PathBuf> {
    let location = model_location()?;
    let base_url = config::env_non_empty(config::env::MODEL_BASE_URL)
        .unwrap_or_else(|| config::download::MODEL_BASE_URL.to_string());
    ensure_model_files_at(&location, &base_url)
}

fn ensure_model_files_at(location: &ModelLocation, base_url: &str) -> anyhow::Result<PathBuf> {
    let dir = location.dir().to_path_buf();

    if model_files_exist(&dir) {
        log::info!("Model files found at {}", dir.display());
        return Ok(dir);
    }

    if let ModelLocation::Provided(_) = location {
        bail!(
            "model directory {} is missing one of {}, {}, {}",
            dir.display(),
            WEIGHTS_FILE,
            TOKENIZER_FILE,
            CONFIG_FILE
        );
    }

    log::info!("Downloading embedding model to {}", dir.display());
    fs::create_dir_all(&dir).with_context(|| format!("failed to create model dir {}", dir.display()))?;

    let base = base_url.trim_end_matches('/');
    let files = [
        (WEIGHTS_FILE, config::download::MODEL_SAFETENSORS_SHA256),
        (TOKENIZER_FILE, config::download::TOKENIZER_JSON_SHA256),
        (CONFIG_FILE, config::download::CONFIG_JSON_SHA256),
    ];
    for (name, sha256) in files {
        let dest = dir.join(name);
        if dest.exists() {
            log::debug!("{} already present, skipping", name);
            continue;
        }
        download_and_verify(&format!("{base}/{name}"), &dest, sha256)?;
    }

    log::info!("Model download complete");
    Ok(dir)
}

/// Download a file from URL and verify its SHA256 hash.
fn download_and_verify(url: &str, dest: &Path, expected_sha256: &str) -> anyhow::Result<()> {
    let filename = dest.file_name().unwrap_or_default().to_string_lossy().into_owned();
    log::info!("Downloading {} from {}", filename, url);

    let resp = ureq::get(url)
        .timeout(std::time::Duration::from_secs(config::download::DOWNLOAD_TIMEOUT_SECS))
        .call()
        .with_context(|| format!("failed to download {url}"))?;

    let status = resp.status();
    if status != 200 {
        bail!("HTTP {status} downloading {url}");
    }

    // Whole body in memory (model is ~87 MB)
    let mut body = Vec::new();
    resp.into_reader()
        .read_to_end(&mut body)
        .with_context(|| format!("failed to read response body for {url}"))?;

    let actual_hash = verify_sha256(&body, expected_sha256, &filename)?;
    log::info!("SHA256 verified for {} ({})", filename, &actual_hash[..12]);

    write_atomically(dest, &body)
}

/// Write to a `.tmp` sibling, then rename over `dest`. The tmp file is removed on failure.
fn write_atomically(dest: &Path, body: &[u8]) -> anyhow::Result<()> {
    let tmp_path = dest.with_extension("tmp");
    let result = write_then_rename(&tmp_path, dest, body);
    if result.is_err() && tmp_path.exists() {
        if let Err(e) = fs::remove_file(&tmp_path) {
            log::warn!("Could not remove {}: {}", tmp_path.display(), e);
        }
    }
    result
}

fn write_then_rename(tmp_path: &Path, dest: &Path, body: &[u8]) -> anyhow::Result<()> {
    let mut file =
        fs::File::create(tmp_path).with_context(|| format!("failed to create {}", tmp_path.display()))?;
    file.write_all(body)
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    file.flush()?;
    drop(file);

    fs::rename(tmp_path, dest)
        .with_context(|| format!("failed to rename {} -> {}", tmp_path.display(), dest.display()))?;
    Ok(())
}

/// Hex SHA256 of `body`, or an error if it differs from `expected`.
fn verify_sha256(body: &[u8], expected: &str, filename: &str) -> anyhow::Result<String> {
    let actual = hex::encode(Sha256::digest(body));
    if !actual.eq_ignore_ascii_case(expected) {
        bail!("SHA256 mismatch for {}: expected {}, got {}", filename, expected, actual);
    }
    Ok(actual)
}
