// 📥 Spreadsheet Importer
//
// Two steps, both reading the file from disk:
//   1. preview()        → headers + first 5 rows, untouched
//   2. confirm_import() → every row mapped into a Unit (after a short delay)
//
// Readers are polymorphic over the file format (workbook vs CSV), the same
// way bank parsers are chosen per source.

use anyhow::Context;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::columns;
use crate::entities::{round2, Unit};
use crate::error::{InventoryError, Result};

/// Rows shown to the operator before confirming
pub const PREVIEW_ROWS: usize = 5;

// ============================================================================
// CORE TYPES
// ============================================================================

/// One cell as read from the sheet
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Text rendering; whole numbers print without ".0"
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// A data row keyed by header, in sheet column order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetRow {
    pub cells: Vec<(String, CellValue)>,
}

impl SheetRow {
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(header, _)| header == column)
            .map(|(_, value)| value)
    }
}

/// First sheet of a file, as header-keyed rows
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub file_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
}

/// What the operator reviews before confirming
#[derive(Debug, Clone, PartialEq)]
pub struct ImportPreview {
    pub file_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
    pub total_rows: usize,
}

/// Units ready to be appended to the store
#[derive(Debug, Clone)]
pub struct ImportBatch {
    pub source_file: String,
    pub units: Vec<Unit>,
}

// ============================================================================
// READERS
// ============================================================================

/// SheetReader - reads the first sheet of a file into header-keyed rows
pub trait SheetReader {
    fn read(&self, file_path: &Path) -> Result<Sheet>;

    /// Check if this reader handles the file (by extension)
    fn can_read(&self, file_path: &Path) -> bool;
}

/// Excel / OpenDocument workbooks (first worksheet only)
pub struct WorkbookReader;

impl SheetReader for WorkbookReader {
    fn read(&self, file_path: &Path) -> Result<Sheet> {
        let file_name = file_name_of(file_path);
        let unreadable = |reason: String| InventoryError::UnreadableFile {
            file: file_name.clone(),
            reason,
        };

        let mut workbook = open_workbook_auto(file_path).map_err(|e| unreadable(e.to_string()))?;

        let first_sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| unreadable("workbook has no sheets".to_string()))?;

        let range = workbook
            .worksheet_range(&first_sheet)
            .map_err(|e| unreadable(e.to_string()))?;

        let mut rows = range.rows();
        let header_row = rows.next().ok_or_else(|| InventoryError::MissingHeader {
            file: file_name.clone(),
        })?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|c| cell_value(c).as_text().trim().to_string())
            .collect();

        let data_rows = rows
            .filter_map(|row| build_row(&headers, row.iter().map(cell_value)))
            .collect();

        Ok(Sheet {
            file_name,
            headers: headers.into_iter().filter(|h| !h.is_empty()).collect(),
            rows: data_rows,
        })
    }

    fn can_read(&self, file_path: &Path) -> bool {
        matches!(
            extension_of(file_path).as_str(),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods"
        )
    }
}

/// Plain CSV with a header line (the whole file is the sheet)
pub struct CsvSheetReader;

impl SheetReader for CsvSheetReader {
    fn read(&self, file_path: &Path) -> Result<Sheet> {
        let file_name = file_name_of(file_path);

        let sheet = read_csv(file_path, &file_name).map_err(|e| InventoryError::UnreadableFile {
            file: file_name.clone(),
            reason: format!("{:#}", e),
        })?;

        if sheet.headers.is_empty() {
            return Err(InventoryError::MissingHeader { file: file_name });
        }

        Ok(sheet)
    }

    fn can_read(&self, file_path: &Path) -> bool {
        extension_of(file_path) == "csv"
    }
}

fn read_csv(file_path: &Path, file_name: &str) -> anyhow::Result<Sheet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(file_path)
        .with_context(|| format!("Failed to open file: {}", file_path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (line_num, result) in reader.records().enumerate() {
        let record = result.with_context(|| {
            format!("Failed to parse CSV line {} in {}", line_num + 2, file_name)
        })?;

        let values = record.iter().map(|field| {
            if field.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(field.to_string())
            }
        });

        if let Some(row) = build_row(&headers, values) {
            rows.push(row);
        }
    }

    Ok(Sheet {
        file_name: file_name.to_string(),
        headers: headers.into_iter().filter(|h| !h.is_empty()).collect(),
        rows,
    })
}

/// Pick the reader for a file
pub fn get_reader(file_path: &Path) -> Result<Box<dyn SheetReader>> {
    let readers: Vec<Box<dyn SheetReader>> = vec![Box::new(WorkbookReader), Box::new(CsvSheetReader)];

    readers
        .into_iter()
        .find(|r| r.can_read(file_path))
        .ok_or_else(|| InventoryError::UnreadableFile {
            file: file_name_of(file_path),
            reason: "unsupported file type".to_string(),
        })
}

/// Read the first sheet of any supported file
pub fn read_sheet(file_path: &Path) -> Result<Sheet> {
    get_reader(file_path)?.read(file_path)
}

/// Key a row by header. None when every cell is empty, unlabeled columns
/// included; cells under an empty header are then dropped.
fn build_row(headers: &[String], values: impl Iterator<Item = CellValue>) -> Option<SheetRow> {
    let values: Vec<CellValue> = values.collect();
    if values.iter().all(CellValue::is_empty) {
        return None;
    }

    let cells = headers
        .iter()
        .zip(values)
        .filter(|(header, _)| !header.is_empty())
        .map(|(header, value)| (header.clone(), value))
        .collect();

    Some(SheetRow { cells })
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(v) => CellValue::Number(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Bool(v) => CellValue::Bool(*v),
        other => CellValue::Text(other.to_string()),
    }
}

fn file_name_of(file_path: &Path) -> String {
    file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

fn extension_of(file_path: &Path) -> String {
    file_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ============================================================================
// PREVIEW / CONFIRM
// ============================================================================

/// Read the file and keep the first rows for review
pub fn preview(file_path: &Path) -> Result<ImportPreview> {
    let sheet = read_sheet(file_path)?;

    tracing::debug!(
        file = %sheet.file_name,
        rows = sheet.rows.len(),
        columns = sheet.headers.len(),
        "Import preview loaded"
    );

    Ok(ImportPreview {
        total_rows: sheet.rows.len(),
        rows: sheet.rows.into_iter().take(PREVIEW_ROWS).collect(),
        headers: sheet.headers,
        file_name: sheet.file_name,
    })
}

/// Re-read the file, wait out the simulated delay, then map every row.
/// Cancelling before the delay ends returns `Cancelled`; nothing is mapped.
pub async fn confirm_import(
    file_path: &Path,
    delay: Duration,
    cancel: &CancellationToken,
) -> Result<ImportBatch> {
    let sheet = read_sheet(file_path).map_err(InventoryError::into_import_failure)?;

    tokio::select! {
        _ = cancel.cancelled() => return Err(InventoryError::Cancelled),
        _ = tokio::time::sleep(delay) => {}
    }

    Ok(map_sheet(&sheet, Utc::now()))
}

/// Map every row of a sheet, preserving file order
pub fn map_sheet(sheet: &Sheet, now: DateTime<Utc>) -> ImportBatch {
    ImportBatch {
        source_file: sheet.file_name.clone(),
        units: sheet.rows.iter().map(|row| map_row(row, now)).collect(),
    }
}

// ============================================================================
// ROW → UNIT MAPPING
// ============================================================================

/// Map one row. Status is always Free; company/agent always empty,
/// whatever the sheet says. Bad numbers become 0.
pub fn map_row(row: &SheetRow, now: DateTime<Utc>) -> Unit {
    let mut unit = Unit::new(
        &text(row, columns::PORTAL),
        &text(row, columns::FLOOR),
        &text(row, columns::LETTER),
        now,
    );

    unit.typology = text(row, columns::TYPOLOGY);
    unit.orientation = text(row, columns::ORIENTATION);
    unit.bedrooms = row.get(columns::BEDROOMS).and_then(cell_int).unwrap_or(0);
    unit.surface_total = round2(decimal(row, columns::SURFACE_TOTAL));
    unit.surface_living = round2(decimal(row, columns::SURFACE_LIVING));
    unit.surface_terraces = round2(decimal(row, columns::SURFACE_TERRACES));
    unit.price = decimal(row, columns::PRICE);
    unit.notes = text(row, columns::NOTES);

    unit
}

fn text(row: &SheetRow, column: &str) -> String {
    row.get(column).map(CellValue::as_text).unwrap_or_default()
}

fn decimal(row: &SheetRow, column: &str) -> f64 {
    row.get(column).and_then(cell_decimal).unwrap_or(0.0)
}

fn cell_int(cell: &CellValue) -> Option<i64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(n.trunc() as i64),
        CellValue::Text(s) => parse_int_prefix(s),
        _ => None,
    }
}

fn cell_decimal(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Text(s) => parse_decimal_prefix(s),
        _ => None,
    }
}

/// Leading integer of a string ("3", " 3 dorm" → 3). None when no digits.
pub fn parse_int_prefix(value: &str) -> Option<i64> {
    let s = value.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Leading decimal of a string ("85.5", "85.5 m2" → 85.5).
/// A lone comma is taken as the decimal separator ("85,50" → 85.5).
pub fn parse_decimal_prefix(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let normalized = if trimmed.contains(',') && !trimmed.contains('.') && trimmed.matches(',').count() == 1 {
        trimmed.replace(',', ".")
    } else {
        trimmed.to_string()
    };

    let bytes = normalized.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'-' || bytes[end] == b'+') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || has_digits {
            has_digits = has_digits || frac_end > frac_start;
            end = frac_end;
        }
    }

    if !has_digits {
        return None;
    }

    // Optional exponent, only if complete
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'-' || bytes[exp_end] == b'+') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    normalized[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}
