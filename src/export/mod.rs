//! Export/Summary engine.
//!
//! Turns a task snapshot into a row set, then writes that row set either as
//! comma-separated text or as a spreadsheet. Building the row set is pure;
//! only `Exporter::export` touches the filesystem.

mod delimited;
mod error;
mod spreadsheet;
mod summary;

pub use delimited::{escape_cell, to_delimited};
pub use error::{ExportError, ExportResult};
pub use spreadsheet::{build_workbook, write_workbook, SHEET_NAME};
pub use summary::{summarize, Summary, Tally};

use crate::inventory::TaskWithItems;
use crate::utils::text_processing::{format_local_time, is_valid_time_format, sanitize_file_stem};
use chrono::{DateTime, Utc};
use log::*;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

/// Supported output formats.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown export format '{}' (expected csv or xlsx)", other)),
        }
    }
}

/// One exported item. Empty annotations stay empty; there is no fallback
/// text for a missing condition.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub index: usize,
    pub code: String,
    pub location: String,
    pub condition: String,
    pub notes: String,
    pub scanned_time: String,
}

impl Row {
    /// Cells in header order.
    pub fn cells(&self) -> [String; 6] {
        [
            self.index.to_string(),
            self.code.clone(),
            self.location.clone(),
            self.condition.clone(),
            self.notes.clone(),
            self.scanned_time.clone(),
        ]
    }
}

/// Header plus one row per item, numbered from 1.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowSet {
    pub rows: Vec<Row>,
}

impl RowSet {
    pub const HEADER: [&'static str; 6] = [
        "#",
        "Serial/Code",
        "Location",
        "Condition",
        "Notes",
        "Scanned Time",
    ];
}

/// Reject snapshots that could not have come from a single task read.
///
fn validate(data: &TaskWithItems) -> ExportResult<()> {
    if data.task.name.trim().is_empty() {
        return Err(ExportError::InvalidInput("task has no name".to_string()));
    }
    if let Some(stray) = data.items.iter().find(|item| item.task_id != data.task.id) {
        return Err(ExportError::InvalidInput(format!(
            "item {} belongs to task {}, not task {}",
            stray.id, stray.task_id, data.task.id
        )));
    }
    Ok(())
}

fn check_time_format(time_format: &str) -> ExportResult<()> {
    if is_valid_time_format(time_format) {
        Ok(())
    } else {
        Err(ExportError::InvalidInput(format!(
            "invalid time format '{}'",
            time_format
        )))
    }
}

/// Build the row set for a task snapshot, rendering scan times with the
/// given strftime pattern in local time.
///
pub fn build_row_set(data: &TaskWithItems, time_format: &str) -> ExportResult<RowSet> {
    validate(data)?;
    check_time_format(time_format)?;
    let rows = data
        .items
        .iter()
        .enumerate()
        .map(|(n, item)| Row {
            index: n + 1,
            code: item.scanned_data.display_text().to_string(),
            location: item.location.clone(),
            condition: item
                .condition
                .map(|c| c.as_str().to_string())
                .unwrap_or_default(),
            notes: item.notes.clone(),
            scanned_time: format_local_time(&item.timestamp, time_format),
        })
        .collect();
    Ok(RowSet { rows })
}

/// `<sanitized task name>_<YYYY-MM-DD>.<ext>`, dated at the export moment.
///
pub fn file_name(task_name: &str, format: ExportFormat, at: DateTime<Utc>) -> String {
    format!(
        "{}_{}.{}",
        sanitize_file_stem(task_name),
        at.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Result of a completed export.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub path: PathBuf,
    pub item_count: usize,
}

/// Writes export files into a directory.
///
#[derive(Clone, Debug)]
pub struct Exporter {
    directory: PathBuf,
    time_format: String,
}

impl Exporter {
    /// Exporter writing into `directory`. Fails if chrono cannot render
    /// `time_format`.
    ///
    pub fn new(
        directory: impl Into<PathBuf>,
        time_format: impl Into<String>,
    ) -> ExportResult<Self> {
        let time_format = time_format.into();
        check_time_format(&time_format)?;
        Ok(Exporter {
            directory: directory.into(),
            time_format,
        })
    }

    /// Write the snapshot in the requested format. Nothing is written if the
    /// snapshot is rejected.
    ///
    pub fn export(
        &self,
        data: &TaskWithItems,
        format: ExportFormat,
        at: DateTime<Utc>,
    ) -> ExportResult<ExportedFile> {
        let row_set = build_row_set(data, &self.time_format)?;
        let file_name = file_name(&data.task.name, format, at);
        let path = self.directory.join(&file_name);
        debug!(
            "Exporting {} item(s) of task {} to {}...",
            row_set.rows.len(),
            data.task.id,
            path.display()
        );

        if !self.directory.exists() {
            fs::create_dir_all(&self.directory).map_err(|e| ExportError::WriteFailed {
                path: self.directory.clone(),
                source: e,
            })?;
        }

        match format {
            ExportFormat::Csv => {
                fs::write(&path, to_delimited(&row_set)).map_err(|e| {
                    ExportError::WriteFailed {
                        path: path.clone(),
                        source: e,
                    }
                })?;
            }
            ExportFormat::Xlsx => write_workbook(&row_set, &path)?,
        }

        info!("Exported {} item(s) to {}", row_set.rows.len(), file_name);
        Ok(ExportedFile {
            file_name,
            path,
            item_count: row_set.rows.len(),
        })
    }
}
