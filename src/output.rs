use anyhow::{Context, Result};
use prettytable::{Cell, Row as PrettyRow, Table};
use rust_xlsxwriter::{Format, Workbook};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::entity::{EntityType, ExtractedRecord};
use crate::TARGET_OUTPUT;

pub const COLUMNS: [&str; 3] = ["Original Sentence", "Entity Text", "Entity Type"];

/// What the writer did with the result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written { path: PathBuf, rows: usize },
    NoEntities,
}

/// Write all records to a spreadsheet, header row first.
///
/// An empty result set writes nothing.
pub fn write_results(records: &[ExtractedRecord], path: &Path) -> Result<WriteOutcome> {
    if records.is_empty() {
        info!(target: TARGET_OUTPUT, "No entities found in the text.");
        return Ok(WriteOutcome::NoEntities);
    }

    info!(
        target: TARGET_OUTPUT,
        "Saving {} entities to {}...",
        records.len(),
        path.display()
    );

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Entities")?;
    // Hebrew text reads better in a right-to-left sheet
    worksheet.set_right_to_left(true);

    let header = Format::new().set_bold();
    for (col, name) in COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = u32::try_from(i + 1).context("Too many rows for a worksheet")?;
        worksheet.write_string(row, 0, &record.original_sentence)?;
        worksheet.write_string(row, 1, &record.entity_text)?;
        worksheet.write_string(row, 2, &record.entity_type)?;
    }

    worksheet.set_column_width(0, 70)?;
    worksheet.set_column_width(1, 30)?;
    worksheet.set_column_width(2, 14)?;
    worksheet.set_freeze_panes(1, 0)?;

    workbook
        .save(path)
        .with_context(|| format!("Cannot write '{}'", path.display()))?;

    info!(target: TARGET_OUTPUT, "Done! Check the Excel file.");

    Ok(WriteOutcome::Written {
        path: path.to_path_buf(),
        rows: records.len(),
    })
}

/// Count records per raw label
pub fn count_by_label(records: &[ExtractedRecord]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.entity_type.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Print a per-label breakdown of the result set
pub fn print_summary(records: &[ExtractedRecord]) {
    if records.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.add_row(PrettyRow::new(vec![
        Cell::new("Label"),
        Cell::new("Category"),
        Cell::new("Count"),
    ]));
    for (label, count) in count_by_label(records) {
        table.add_row(PrettyRow::new(vec![
            Cell::new(label),
            Cell::new(&EntityType::from(label).to_string()),
            Cell::new(&count.to_string()),
        ]));
    }
    table.printstd();
}
