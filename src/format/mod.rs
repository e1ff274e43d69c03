//! Export of result rows (xlsx, CSV, JSON) and the console summary table.

use crate::config::OutputFormat;
use crate::pricing::ResultRow;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

/// Export columns, in order.
pub const COLUMNS: [&str; 7] =
    ["board_name", "link_text", "link", "current_price", "original_price", "error", "timestamp"];

/// `board_prices_<YYYYMMDD_HHMMSS>.<ext>` for a run started at `started`.
pub fn output_filename(format: OutputFormat, started: DateTime<Local>) -> String {
    format!("board_prices_{}.{}", started.format("%Y%m%d_%H%M%S"), format.extension())
}

/// Writes result rows to disk.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Writes all rows to `path` in the configured format.
    pub fn write(&self, path: &Path, rows: &[ResultRow]) -> Result<()> {
        match self.format {
            OutputFormat::Xlsx => self.write_xlsx(path, rows),
            OutputFormat::Csv => std::fs::write(path, self.csv(rows))
                .with_context(|| format!("Failed to write {}", path.display())),
            OutputFormat::Json => std::fs::write(path, self.json(rows)?)
                .with_context(|| format!("Failed to write {}", path.display())),
        }
    }

    // Spreadsheet

    fn write_xlsx(&self, path: &Path, rows: &[ResultRow]) -> Result<()> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();

        let sheet = workbook.add_worksheet();
        sheet.set_name("Prices")?;

        for (col, name) in COLUMNS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *name, &header)?;
        }

        for (i, row) in rows.iter().enumerate() {
            let r = i as u32 + 1;
            for (col, value) in row_values(row).iter().enumerate() {
                // Missing values stay as empty cells
                if let Some(value) = value {
                    sheet.write_string(r, col as u16, value)?;
                }
            }
        }

        sheet.set_column_width(0, 28)?;
        sheet.set_column_width(2, 60)?;
        sheet.set_freeze_panes(1, 0)?;

        workbook.save(path).with_context(|| format!("Failed to save {}", path.display()))
    }

    // CSV formatting

    fn csv(&self, rows: &[ResultRow]) -> String {
        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(COLUMNS.join(","));

        for row in rows {
            let fields: Vec<String> = row_values(row)
                .iter()
                .map(|v| v.as_deref().map(Self::csv_escape).unwrap_or_default())
                .collect();
            lines.push(fields.join(","));
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }

    // JSON formatting

    fn json(&self, rows: &[ResultRow]) -> Result<String> {
        serde_json::to_string_pretty(rows).context("Failed to serialize rows")
    }
}

/// Cell values in [`COLUMNS`] order.
fn row_values(row: &ResultRow) -> [Option<String>; 7] {
    [
        Some(row.board_name.clone()),
        Some(row.link_text.clone()),
        Some(row.link.clone()),
        row.current_price.clone(),
        row.original_price.clone(),
        row.error.as_ref().map(|e| e.to_string()),
        Some(row.timestamp_iso()),
    ]
}

/// Fixed-width table of the run for the console.
pub fn summary_table(rows: &[ResultRow]) -> String {
    let board_width = 30;
    let price_width = 14;

    let mut lines = Vec::new();

    lines.push(format!(
        "{:<board_width$}  {:>price_width$}  {:>price_width$}  {}",
        "Board", "Price", "Original", "Status"
    ));
    lines.push(format!(
        "{:-<board_width$}  {:-<price_width$}  {:-<price_width$}  {:-<10}",
        "", "", "", ""
    ));

    for row in rows {
        let board = truncate(&row.board_name, board_width);
        let status = match &row.error {
            Some(e) => e.to_string(),
            None => "OK".to_string(),
        };

        lines.push(format!(
            "{:<board_width$}  {:>price_width$}  {:>price_width$}  {}",
            board,
            row.current_price.as_deref().unwrap_or("N/A"),
            row.original_price.as_deref().unwrap_or("-"),
            status
        ));
    }

    let failed = rows.iter().filter(|r| r.error.is_some()).count();
    lines.push(String::new());
    lines.push(format!("Total: {} boards, {} failed", rows.len(), failed));

    lines.join("\n")
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let head: String = s.chars().take(width - 3).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}
