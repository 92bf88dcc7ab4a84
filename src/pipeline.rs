use anyhow::Result;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::config::PipelineConfig;
use crate::entity::{extract_records, ExtractedRecord, Prediction};
use crate::input::load_or_create_input;
use crate::ner::NerEngine;
use crate::output::{write_results, WriteOutcome};
use crate::sentences::split_sentences;
use crate::TARGET_PIPELINE;

const PREVIEW_CHARS: usize = 30;

/// What a run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub sentences: usize,
    pub failed: usize,
    pub records: Vec<ExtractedRecord>,
    pub outcome: WriteOutcome,
}

/// Load, split, tag every sentence in order, then write the spreadsheet.
///
/// A sentence whose prediction fails is logged and skipped. Only input and
/// output I/O errors abort the run.
pub fn run(config: &PipelineConfig, engine: &dyn NerEngine) -> Result<PipelineReport> {
    let start = Instant::now();
    let text = load_or_create_input(&config.input_path)?;

    let sentences = split_sentences(&text);
    let total = sentences.clone().count();
    info!(target: TARGET_PIPELINE, "Found {} sentences to process.", total);

    let mut records = Vec::new();
    let mut failed = 0;

    info!(target: TARGET_PIPELINE, "Starting processing...");
    for (index, sentence) in sentences.enumerate() {
        debug!(target: TARGET_PIPELINE, "Processing sentence ({}/{})", index + 1, total);
        match process_sentence(engine, sentence) {
            Ok(extracted) => records.extend(extracted),
            Err(e) => {
                failed += 1;
                error!(
                    target: TARGET_PIPELINE,
                    "Error processing sentence: {}... Error: {:#}",
                    preview(sentence),
                    e
                );
            }
        }
    }

    info!(
        target: TARGET_PIPELINE,
        "Processed {} sentences in {:?}: {} entities, {} failures",
        total,
        start.elapsed(),
        records.len(),
        failed
    );

    let outcome = write_results(&records, &config.output_path)?;

    Ok(PipelineReport {
        sentences: total,
        failed,
        records,
        outcome,
    })
}

fn process_sentence(engine: &dyn NerEngine, sentence: &str) -> Result<Vec<ExtractedRecord>> {
    let payload = engine.predict(&[sentence])?;
    let prediction = Prediction::from_payload(&payload)?;
    if prediction.text != sentence {
        return Err(anyhow::anyhow!(
            "Engine echoed different text: {}...",
            preview(&prediction.text)
        ));
    }
    Ok(extract_records(&prediction))
}

/// First few characters of a sentence, safe on multi-byte text
fn preview(sentence: &str) -> String {
    sentence.chars().take(PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::fs;

    /// Tags every word starting with an uppercase ASCII letter as ORG and
    /// fails on any sentence containing "boom".
    struct MockEngine {
        calls: RefCell<Vec<String>>,
    }

    impl MockEngine {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl NerEngine for MockEngine {
        fn predict(&self, sentences: &[&str]) -> Result<Value> {
            let mut out = Vec::new();
            for sentence in sentences {
                self.calls.borrow_mut().push(sentence.to_string());
                if sentence.contains("boom") {
                    return Err(anyhow::anyhow!("model exploded"));
                }
                let entities: Vec<Value> = sentence
                    .split_whitespace()
                    .filter(|w| w.starts_with(|c: char| c.is_ascii_uppercase()))
                    .map(|w| json!({"phrase": w, "label": "ORG"}))
                    .collect();
                out.push(json!({"text": sentence, "ner_entities": entities}));
            }
            Ok(Value::Array(out))
        }
    }

    /// Returns a payload that breaks the single-prediction contract
    struct BadShapeEngine;

    impl NerEngine for BadShapeEngine {
        fn predict(&self, _sentences: &[&str]) -> Result<Value> {
            Ok(json!({"text": "not a list"}))
        }
    }

    /// Answers every sentence with a prediction for some other text
    struct WrongTextEngine;

    impl NerEngine for WrongTextEngine {
        fn predict(&self, _sentences: &[&str]) -> Result<Value> {
            Ok(json!([{
                "text": "something else",
                "ner_entities": [{"phrase": "X", "label": "ORG"}]
            }]))
        }
    }

    fn config_in(dir: &tempfile::TempDir) -> PipelineConfig {
        PipelineConfig::default()
            .with_input(dir.path().join("input.txt"))
            .with_output(dir.path().join("results.xlsx"))
    }

    #[test]
    fn test_empty_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        fs::write(&config.input_path, "").unwrap();

        let engine = MockEngine::new();
        let report = run(&config, &engine).unwrap();

        assert_eq!(report.sentences, 0);
        assert!(report.records.is_empty());
        assert_eq!(report.outcome, WriteOutcome::NoEntities);
        assert!(!config.output_path.exists());
        assert!(engine.calls.borrow().is_empty());
    }

    #[test]
    fn test_one_call_per_sentence_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        fs::write(&config.input_path, "A. B.").unwrap();

        let engine = MockEngine::new();
        let report = run(&config, &engine).unwrap();

        assert_eq!(*engine.calls.borrow(), vec!["A", "B"]);
        assert_eq!(report.sentences, 2);
        let phrases: Vec<&str> = report.records.iter().map(|r| r.entity_text.as_str()).collect();
        assert_eq!(phrases, vec!["A", "B"]);
        assert!(config.output_path.exists());
    }

    #[test]
    fn test_failed_sentence_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        fs::write(&config.input_path, "Alpha one.\nboom Beta.\nGamma Delta three").unwrap();

        let engine = MockEngine::new();
        let report = run(&config, &engine).unwrap();

        assert_eq!(report.sentences, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(engine.calls.borrow().len(), 3);

        let sentences: Vec<&str> = report
            .records
            .iter()
            .map(|r| r.original_sentence.as_str())
            .collect();
        assert_eq!(
            sentences,
            vec!["Alpha one", "Gamma Delta three", "Gamma Delta three"]
        );
        assert_eq!(
            report.outcome,
            WriteOutcome::Written {
                path: config.output_path.clone(),
                rows: 3
            }
        );
    }

    #[test]
    fn test_records_keep_sentence_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        fs::write(&config.input_path, "First Second.\nThird").unwrap();

        let report = run(&config, &MockEngine::new()).unwrap();
        let rows: Vec<(&str, &str)> = report
            .records
            .iter()
            .map(|r| (r.original_sentence.as_str(), r.entity_text.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("First Second", "First"),
                ("First Second", "Second"),
                ("Third", "Third"),
            ]
        );
    }

    #[test]
    fn test_missing_input_creates_sample() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);

        let engine = MockEngine::new();
        let report = run(&config, &engine).unwrap();

        assert_eq!(
            fs::read_to_string(&config.input_path).unwrap(),
            crate::input::SAMPLE_TEXT
        );
        assert_eq!(report.sentences, 3);
        assert_eq!(report.failed, 0);
        // Hebrew has no uppercase, so the mock finds nothing
        assert_eq!(report.outcome, WriteOutcome::NoEntities);
    }

    #[test]
    fn test_malformed_payload_counts_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        fs::write(&config.input_path, "A. B.").unwrap();

        let report = run(&config, &BadShapeEngine).unwrap();
        assert_eq!(report.failed, 2);
        assert!(report.records.is_empty());
        assert_eq!(report.outcome, WriteOutcome::NoEntities);
    }

    #[test]
    fn test_mismatched_text_counts_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        fs::write(&config.input_path, "Alpha").unwrap();

        let report = run(&config, &WrongTextEngine).unwrap();
        assert_eq!(report.failed, 1);
        assert!(report.records.is_empty());
        assert_eq!(report.outcome, WriteOutcome::NoEntities);
    }

    #[test]
    fn test_unwritable_output_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir).with_output(dir.path().join("nope").join("results.xlsx"));
        fs::write(&config.input_path, "Alpha").unwrap();

        assert!(run(&config, &MockEngine::new()).is_err());
    }

    #[test]
    fn test_preview_is_char_safe() {
        let sentence = "ראש הממשלה בנימין נתניהו נפגש עם נשיא ארה\"ב";
        let short = preview(sentence);
        assert_eq!(short.chars().count(), PREVIEW_CHARS);
        assert!(sentence.starts_with(&short));
        assert_eq!(preview("A"), "A");
    }
}
