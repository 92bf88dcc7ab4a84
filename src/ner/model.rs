use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use serde_json::{json, Value};
use std::time::Instant;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, error, info};

use crate::ner::config::{load_labels, NerModelConfig};
use crate::ner::decode::{decode_spans, TaggedToken};
use crate::ner::NerEngine;
use crate::TARGET_NER;

/// BERT encoder with a token-classification head, run through candle.
pub struct BertNerEngine {
    model: BertModel,
    classifier: Linear,
    tokenizer: Tokenizer,
    labels: Vec<String>,
    device: Device,
}

impl BertNerEngine {
    /// Fetch any missing model files, then load them.
    pub async fn from_config(config: &NerModelConfig) -> Result<Self> {
        let start = Instant::now();
        config.ensure_models_exist().await?;
        let engine = Self::load(config)?;
        info!(target: TARGET_NER, "Model ready after {:?}", start.elapsed());
        Ok(engine)
    }

    /// Load the model from files already on disk.
    pub fn load(config: &NerModelConfig) -> Result<Self> {
        info!(target: TARGET_NER, "Loading NER model from {}", config.model_dir.display());

        let config_json = std::fs::read_to_string(config.config_path())
            .with_context(|| format!("Cannot read {}", config.config_path().display()))?;
        let bert_config: BertConfig =
            serde_json::from_str(&config_json).context("Invalid BERT config.json")?;
        let labels = load_labels(&config_json)?;

        let device = config.select_device()?;

        let tensors = match candle_core::safetensors::load(config.weights_path(), &device) {
            Ok(t) => t,
            Err(e) => {
                error!(target: TARGET_NER, "!!! Failed to load model tensors: {}", e);
                return Err(anyhow::anyhow!("Failed to load model tensors: {}", e));
            }
        };
        let vb = VarBuilder::from_tensors(tensors, DType::F32, &device);

        let model = BertModel::load(vb.pp("bert"), &bert_config)
            .context("Failed to load BERT encoder")?;
        let classifier =
            candle_nn::linear(bert_config.hidden_size, labels.len(), vb.pp("classifier"))
                .context("Failed to load token classification head")?;

        let mut tokenizer = Tokenizer::from_file(config.tokenizer_path())
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        limit_length(&mut tokenizer, bert_config.max_position_embeddings)?;

        info!(
            target: TARGET_NER,
            "Model loaded successfully on: {} ({} labels)",
            if device.is_cuda() { "cuda" } else { "cpu" },
            labels.len()
        );

        Ok(Self {
            model,
            classifier,
            tokenizer,
            labels,
            device,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Tag a single sentence and shape the result like the hub model's JSON output.
    fn predict_one(&self, sentence: &str) -> Result<Value> {
        let start = Instant::now();
        let encoding = self
            .tokenizer
            .encode(sentence, true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let len = encoding.len();
        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let hidden_state = self
            .model
            .forward(&input_ids, &type_ids, Some(&attention_mask))?;
        let logits = self.classifier.forward(&hidden_state)?;
        let predictions = logits.squeeze(0)?.argmax(D::Minus1)?.to_vec1::<u32>()?;

        let tokens: Vec<TaggedToken<'_>> = predictions
            .iter()
            .zip(encoding.get_offsets())
            .zip(encoding.get_word_ids())
            .zip(encoding.get_special_tokens_mask())
            .map(|(((&id, &(start, end)), &word), &special)| TaggedToken {
                tag: self.labels.get(id as usize).map(String::as_str).unwrap_or("O"),
                start,
                end,
                word,
                special: special == 1,
            })
            .collect();

        let entities: Vec<Value> = decode_spans(&tokens)
            .into_iter()
            .filter_map(|span| {
                let phrase = sentence.get(span.start..span.end)?;
                Some(json!({
                    "phrase": phrase,
                    "label": span.label,
                    "start": span.start,
                    "end": span.end,
                }))
            })
            .collect();

        debug!(
            target: TARGET_NER,
            "Tagged {} tokens, {} entities in {:?}",
            len,
            entities.len(),
            start.elapsed()
        );

        Ok(json!({ "text": sentence, "ner_entities": entities }))
    }
}

/// Cap encodings at the model's position limit, keeping [CLS] and [SEP].
fn limit_length(tokenizer: &mut Tokenizer, max_length: usize) -> Result<()> {
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| anyhow::anyhow!("Failed to set truncation: {}", e))?;
    Ok(())
}

impl NerEngine for BertNerEngine {
    fn predict(&self, sentences: &[&str]) -> Result<Value> {
        let predictions = sentences
            .iter()
            .map(|sentence| self.predict_one(sentence))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Array(predictions))
    }
}
