pub mod csv;
pub mod pdf;
pub mod xlsx;

use crate::ledger::model::AssessmentRecord;
use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use self::csv::{parse_csv, to_csv};
pub use self::pdf::{ReportOptions, to_report_document};
pub use self::xlsx::to_spreadsheet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Csv => "cost_assessment.csv",
            ExportFormat::Xlsx => "cost_assessment.xlsx",
            ExportFormat::Pdf => "assessment_report.pdf",
        }
    }

    pub fn content_type(self) -> String {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8".to_string(),
            ExportFormat::Xlsx | ExportFormat::Pdf => mime_guess::from_path(self.file_name())
                .first_or_octet_stream()
                .to_string(),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => bail!("Unsupported export format: {raw}. Supported: csv, xlsx, pdf"),
        }
    }
}

/// Serializes exactly the records given. Callers pass the view they want
/// exported; nothing here filters.
pub fn render(
    format: ExportFormat,
    records: &[AssessmentRecord],
    options: &ReportOptions,
) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Csv => to_csv(records),
        ExportFormat::Xlsx => to_spreadsheet(records),
        ExportFormat::Pdf => to_report_document(records, options),
    }
}

pub fn save_export(
    format: ExportFormat,
    records: &[AssessmentRecord],
    options: &ReportOptions,
    dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    let payload = render(format, records, options)?;
    let path = dir.join(format.file_name());
    fs::write(&path, payload)
        .with_context(|| format!("Failed to write {format} export: {}", path.display()))?;

    Ok(path)
}
