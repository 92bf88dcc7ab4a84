//! # NER Model Smoke Test
//!
//! Loads the token-classification model (downloading it on first use), tags
//! the built-in sample text, or the file given as the first argument, and
//! prints each prediction as JSON.
//!
//! ```
//! cargo run --bin test_ner_model
//! cargo run --bin test_ner_model -- some_text.txt
//! ```
//!
//! Uses the same model settings as the main batch job.

use hebrew_ner::entity::Prediction;
use hebrew_ner::input::SAMPLE_TEXT;
use hebrew_ner::ner::{BertNerEngine, NerEngine};
use hebrew_ner::sentences::split_sentences;
use hebrew_ner::PipelineConfig;
use serde_json::to_string_pretty;
use std::env;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let text = match env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => SAMPLE_TEXT.to_string(),
    };

    let config = PipelineConfig::default();
    let engine = BertNerEngine::from_config(&config.model).await?;
    info!("Model labels: {}", engine.labels().join(", "));

    for sentence in split_sentences(&text) {
        let start_time = Instant::now();
        let payload = match engine.predict(&[sentence]) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to tag sentence: {:?}", e);
                continue;
            }
        };

        match Prediction::from_payload(&payload) {
            Ok(prediction) => {
                info!(
                    "Tagged {} entities in {:?}",
                    prediction.entities.len(),
                    start_time.elapsed()
                );
                for (i, entity) in prediction.entities.iter().enumerate() {
                    info!(
                        "{}: {} ({}), Type: {}",
                        i + 1,
                        entity.phrase,
                        entity.label,
                        entity.entity_type()
                    );
                }
            }
            Err(e) => error!("Payload failed validation: {:?}", e),
        }

        println!("{}", to_string_pretty(&payload)?);
    }

    Ok(())
}
