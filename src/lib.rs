pub mod config;
pub mod entity;
pub mod input;
pub mod logging;
pub mod ner;
pub mod output;
pub mod pipeline;
pub mod sentences;

pub const TARGET_PIPELINE: &str = "pipeline";
pub const TARGET_NER: &str = "ner_engine";
pub const TARGET_OUTPUT: &str = "ner_output";

pub use config::PipelineConfig;
pub use pipeline::{run, PipelineReport};
