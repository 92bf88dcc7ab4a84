use std::path::PathBuf;

use crate::ner::NerModelConfig;

pub const DEFAULT_INPUT_FILE: &str = "input.txt";
pub const DEFAULT_OUTPUT_FILE: &str = "results.xlsx";

/// Everything one batch run needs to know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub model: NerModelConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_FILE),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            model: NerModelConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = path.into();
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }
}
