// src/export/mod.rs

mod fs_utils;
mod json_csv;
mod model;

pub use model::SeatExport;

use crate::core::reconciler::MergedView;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};
use clap::ValueEnum;
use std::path::Path;

/// Helper comune per messaggi di completamento export.
pub(crate) fn notify_export_success(label: &str, path: &Path, rows: usize) {
    success(format!(
        "{label} export completed: {} ({rows} seats)",
        path.display()
    ));
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

/// Write the occupied seats of `view` to `file`.
pub fn export_view(view: &MergedView, format: ExportFormat, file: &str, force: bool) -> AppResult<()> {
    let path = Path::new(file);
    fs_utils::ensure_writable(path, force)?;

    let rows = model::rows_from_view(view);
    if rows.is_empty() {
        warning(format!("No occupied seats on {}", view.date()));
    }

    match format {
        ExportFormat::Csv => json_csv::export_csv(&rows, path),
        ExportFormat::Json => json_csv::export_json(&rows, path),
    }
}
