// Hugging Face hub layout for BERT token-classification checkpoints
pub const HF_BASE_URL: &str = "https://huggingface.co";
pub const CONFIG_FILE: &str = "config.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

use anyhow::Result;
use serde_json::Value;

pub mod config;
pub mod decode;
pub mod model;

pub use config::NerModelConfig;
pub use model::BertNerEngine;

/// A named-entity recognition backend.
///
/// `predict` takes a batch of sentences and returns the engine's raw, loosely
/// typed payload: a JSON array with one object per sentence, each shaped as
/// `{"text": ..., "ner_entities": [{"phrase": ..., "label": ...}, ...]}`.
/// Callers validate the payload with
/// [`Prediction::from_payload`](crate::entity::Prediction::from_payload)
/// before trusting any of it.
pub trait NerEngine {
    fn predict(&self, sentences: &[&str]) -> Result<Value>;
}
