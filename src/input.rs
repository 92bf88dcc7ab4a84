use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::TARGET_PIPELINE;

/// Written to the input path when no input file exists yet
pub const SAMPLE_TEXT: &str = "בשנת 1948 השלים אפרים קישון את לימודיו בפיסול מתכת.
ראש הממשלה בנימין נתניהו נפגש עם נשיא ארה\"ב ג'ו ביידן בבית הלבן.
חברת מובילאיי ממוקמת בירושלים והיא מובילה בתחום הרכב האוטונומי.";

/// Read the input file as UTF-8, creating it from [`SAMPLE_TEXT`] first if it
/// does not exist.
pub fn load_or_create_input(path: &Path) -> Result<String> {
    if !path.exists() {
        info!(target: TARGET_PIPELINE, "Creating sample file: {}", path.display());
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
        }
        fs::write(path, SAMPLE_TEXT)
            .with_context(|| format!("Cannot write sample file '{}'", path.display()))?;
    }

    info!(target: TARGET_PIPELINE, "Reading data from {}", path.display());
    fs::read_to_string(path).with_context(|| format!("Cannot read '{}'", path.display()))
}
