use colored::Colorize;
use tracing::info;

use hebrew_ner::logging::configure_logging;
use hebrew_ner::ner::BertNerEngine;
use hebrew_ner::output::{print_summary, WriteOutcome};
use hebrew_ner::{pipeline, PipelineConfig, TARGET_PIPELINE};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    configure_logging();

    let config = PipelineConfig::default();
    info!(
        target: TARGET_PIPELINE,
        "Loading NER model {}... (This might take a minute the first time)",
        config.model.model_id
    );
    let engine = BertNerEngine::from_config(&config.model).await?;

    let report = pipeline::run(&config, &engine)?;

    match &report.outcome {
        WriteOutcome::Written { path, rows } => {
            print_summary(&report.records);
            println!(
                "{}",
                format!(
                    "Done: {} entities from {} sentences written to {}",
                    rows,
                    report.sentences,
                    path.display()
                )
                .green()
            );
        }
        WriteOutcome::NoEntities => {
            println!(
                "{}",
                format!("No entities found in {} sentences.", report.sentences).yellow()
            );
        }
    }

    if report.failed > 0 {
        println!(
            "{}",
            format!("{} sentences failed and were skipped.", report.failed).red()
        );
    }

    Ok(())
}
