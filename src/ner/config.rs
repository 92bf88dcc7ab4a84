use anyhow::{Context, Result};
use candle_core::Device;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::ner::{CONFIG_FILE, HF_BASE_URL, TOKENIZER_FILE, WEIGHTS_FILE};
use crate::TARGET_NER;

pub const DEFAULT_MODEL_ID: &str = "dicta-il/dictabert-ner";
pub const DEFAULT_MODEL_DIR: &str = "models/dictabert-ner";

/// Where the token-classification model lives and how to run it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NerModelConfig {
    /// Hub identifier, used to download missing files
    pub model_id: String,
    /// Local directory holding config.json, model.safetensors and tokenizer.json
    pub model_dir: PathBuf,
    /// Skip accelerator detection and always run on the CPU
    pub force_cpu: bool,
}

impl Default for NerModelConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            force_cpu: false,
        }
    }
}

impl NerModelConfig {
    pub fn config_path(&self) -> PathBuf {
        self.model_dir.join(CONFIG_FILE)
    }

    pub fn weights_path(&self) -> PathBuf {
        self.model_dir.join(WEIGHTS_FILE)
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.model_dir.join(TOKENIZER_FILE)
    }

    pub fn file_url(&self, file: &str) -> String {
        format!("{}/{}/resolve/main/{}", HF_BASE_URL, self.model_id, file)
    }

    /// Download any model file that is not already on disk.
    pub async fn ensure_models_exist(&self) -> Result<()> {
        if !self.model_dir.exists() {
            fs::create_dir_all(&self.model_dir)
                .await
                .with_context(|| format!("Cannot create {}", self.model_dir.display()))?;
        }

        for (file, path) in [
            (CONFIG_FILE, self.config_path()),
            (WEIGHTS_FILE, self.weights_path()),
            (TOKENIZER_FILE, self.tokenizer_path()),
        ] {
            if path.exists() {
                continue;
            }
            let url = self.file_url(file);
            info!(target: TARGET_NER, "Downloading {} from {}", file, url);
            download(&url, &path).await?;
            info!(target: TARGET_NER, "Downloaded {} to {}", file, path.display());
        }

        Ok(())
    }

    /// Pick the compute device for this run.
    pub fn select_device(&self) -> Result<Device> {
        if self.force_cpu {
            return Ok(Device::Cpu);
        }
        match Device::cuda_if_available(0) {
            Ok(device) => Ok(device),
            Err(e) => {
                warn!(target: TARGET_NER, "CUDA probe failed, falling back to CPU: {}", e);
                Ok(Device::Cpu)
            }
        }
    }
}

async fn download(url: &str, path: &Path) -> Result<()> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Request to {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Download of {} failed", url))?;
    let bytes = response.bytes().await?;
    write_atomically(path, &bytes).await
}

/// Write under a `.part` name and rename into place, so an interrupted write
/// never leaves a file that looks complete.
async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    if let Err(e) = fs::write(&partial, bytes).await {
        let _ = fs::remove_file(&partial).await;
        return Err(e).with_context(|| format!("Cannot write {}", partial.display()));
    }
    fs::rename(&partial, path)
        .await
        .with_context(|| format!("Cannot move {} into place", partial.display()))?;
    Ok(())
}

#[derive(Deserialize)]
struct LabelConfig {
    id2label: HashMap<String, String>,
}

/// Read the `id2label` table out of a model's config.json, ordered by id.
pub fn load_labels(config_json: &str) -> Result<Vec<String>> {
    let config: LabelConfig =
        serde_json::from_str(config_json).context("config.json has no usable id2label")?;

    let mut labels = vec![None; config.id2label.len()];
    for (id, label) in config.id2label {
        let index: usize = id
            .parse()
            .with_context(|| format!("Label id '{}' is not a number", id))?;
        let slot = labels
            .get_mut(index)
            .with_context(|| format!("Label id {} is out of range", index))?;
        *slot = Some(label);
    }

    labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| label.with_context(|| format!("Label id {} is missing", i)))
        .collect()
}
