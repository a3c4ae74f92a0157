//! Inventory file parser: detects RVTools / CloudPhysics exports and extracts
//! one [`VmRow`] per named VM.
//!
//! DESIGN
//! ======
//! Detection is driven by header signatures, not file names. RVTools exports
//! carry many tabs; the `vInfo` tab is preferred and any other tab carrying
//! the RVTools signature is accepted as a fallback. CloudPhysics exports are a
//! single sheet.
//!
//! ERROR HANDLING
//! ==============
//! Blank VM-name rows are skipped silently. Rows with no OS data are kept and
//! logged; the classifier turns them into `needs_info`.

use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx};
use tracing::{info, warn};

use crate::error::ErrorCode;

const RVTOOLS_SIGNATURE: [&str; 3] = ["VM", "Powerstate", "OS according to VMware Tools"];
const CLOUDPHYSICS_SIGNATURE: [&str; 2] = ["VM Name", "Guest OS"];

const RVTOOLS_REQUIRED: [&str; 3] = ["VM", "OS according to VMware Tools", "OS according to configuration file"];
const CLOUDPHYSICS_REQUIRED: [&str; 2] = ["VM Name", "Guest OS"];

const RVTOOLS_TARGET_SHEET: &str = "vInfo";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{0}")]
    UnsupportedFormat(String),
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("{0}")]
    FileTooLarge(String),
}

impl ErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) => "UNRECOGNIZED_FORMAT",
            Self::MissingColumns(_) => "MISSING_COLUMNS",
            Self::FileTooLarge(_) => "FILE_TOO_LARGE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    RvTools,
    CloudPhysics,
}

impl SourceFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RvTools => "rvtools",
            Self::CloudPhysics => "cloudphysics",
        }
    }
}

/// A single VM record from an uploaded inventory file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmRow {
    pub vm_name: String,
    pub host_cluster: Option<String>,
    /// Never absent; empty when the cell is blank.
    pub os_raw_primary: String,
    /// RVTools only (`OS according to configuration file`); `None` for CloudPhysics.
    pub os_raw_fallback: Option<String>,
    pub source_format: SourceFormat,
    /// 1-based Excel row number.
    pub row_index: u32,
}

/// Header lookup for one sheet.
struct Sheet {
    range: Range<Data>,
    headers: Vec<String>,
}

impl Sheet {
    fn new(range: Range<Data>) -> Self {
        let headers = range
            .rows()
            .next()
            .map(|row| row.iter().map(clean).collect())
            .unwrap_or_default();
        Self { range, headers }
    }

    fn has_all(&self, columns: &[&str]) -> bool {
        columns.iter().all(|c| self.column(c).is_some())
    }

    fn missing(&self, columns: &[&str]) -> Vec<String> {
        columns
            .iter()
            .filter(|c| self.column(c).is_none())
            .map(|c| (*c).to_owned())
            .collect()
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Data rows with their 1-based Excel row numbers.
    fn data_rows(&self) -> impl Iterator<Item = (u32, &[Data])> {
        let first_row = self.range.start().map_or(0, |(row, _)| row);
        self.range
            .rows()
            .enumerate()
            .skip(1)
            .map(move |(offset, cells)| (first_row + u32::try_from(offset).unwrap_or(u32::MAX) + 1, cells))
    }
}

fn cell(cells: &[Data], column: Option<usize>) -> String {
    column.and_then(|idx| cells.get(idx)).map(clean).unwrap_or_default()
}

/// Cell text, trimmed; blank / `nan` become "".
fn clean(value: &Data) -> String {
    let text = match value {
        Data::Empty | Data::Error(_) => return String::new(),
        Data::String(s) => s.trim().to_owned(),
        other => other.to_string().trim().to_owned(),
    };
    if text.eq_ignore_ascii_case("nan") { String::new() } else { text }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

// =============================================================================
// PARSE
// =============================================================================

/// Parse an uploaded workbook into VM rows.
///
/// # Errors
///
/// - [`ParseError::UnsupportedFormat`] when the name is not `.xlsx`, the bytes
///   are not a workbook, or no known column layout is found.
/// - [`ParseError::FileTooLarge`] when `bytes` exceeds `max_bytes`.
/// - [`ParseError::MissingColumns`] when the layout is recognized but a
///   required column is absent.
pub fn parse(bytes: &[u8], filename: &str, max_bytes: usize) -> Result<Vec<VmRow>, ParseError> {
    validate_extension(filename)?;
    validate_size(bytes, filename, max_bytes)?;

    let mut workbook = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| ParseError::UnsupportedFormat(format!("'{filename}' is not a readable .xlsx workbook: {e}")))?;
    let sheets = load_sheets(&mut workbook);

    let (format, sheet) = detect_format(&sheets, filename)?;
    let rows = match format {
        SourceFormat::RvTools => extract_rvtools(sheet)?,
        SourceFormat::CloudPhysics => extract_cloudphysics(sheet)?,
    };

    info!(format = format.as_str(), rows = rows.len(), filename, "file upload parsed");
    Ok(rows)
}

fn validate_extension(filename: &str) -> Result<(), ParseError> {
    if filename.to_lowercase().ends_with(".xlsx") {
        Ok(())
    } else {
        Err(ParseError::UnsupportedFormat(format!(
            "Unsupported file type: '{filename}'. Only .xlsx files are accepted."
        )))
    }
}

fn validate_size(bytes: &[u8], filename: &str, max_bytes: usize) -> Result<(), ParseError> {
    if bytes.len() > max_bytes {
        return Err(ParseError::FileTooLarge(format!(
            "File '{filename}' exceeds the {}MB size limit.",
            max_bytes / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Every sheet that calamine can read, in workbook order.
fn load_sheets(workbook: &mut Xlsx<Cursor<Vec<u8>>>) -> Vec<(String, Sheet)> {
    let names = workbook.sheet_names();
    names
        .into_iter()
        .filter_map(|name| match workbook.worksheet_range(&name) {
            Ok(range) => Some((name, Sheet::new(range))),
            Err(e) => {
                warn!(sheet = %name, error = %e, "skipping unreadable sheet");
                None
            }
        })
        .collect()
}

fn find_rvtools_sheet(sheets: &[(String, Sheet)]) -> Option<&Sheet> {
    sheets
        .iter()
        .find(|(name, _)| name == RVTOOLS_TARGET_SHEET)
        .or_else(|| sheets.iter().find(|(_, sheet)| sheet.has_all(&RVTOOLS_SIGNATURE)))
        .map(|(_, sheet)| sheet)
}

fn detect_format<'a>(sheets: &'a [(String, Sheet)], filename: &str) -> Result<(SourceFormat, &'a Sheet), ParseError> {
    if let Some(sheet) = find_rvtools_sheet(sheets) {
        if sheet.has_all(&RVTOOLS_SIGNATURE) {
            return Ok((SourceFormat::RvTools, sheet));
        }
    }

    if let Some((_, first)) = sheets.first() {
        if first.has_all(&CLOUDPHYSICS_SIGNATURE) && !first.has_all(&RVTOOLS_SIGNATURE) {
            return Ok((SourceFormat::CloudPhysics, first));
        }
    }

    Err(ParseError::UnsupportedFormat(format!(
        "'{filename}' does not match RVTools or CloudPhysics format. \
         Ensure you are uploading a valid RVTools vInfo export or a CloudPhysics VM export."
    )))
}

fn extract_rvtools(sheet: &Sheet) -> Result<Vec<VmRow>, ParseError> {
    let missing = sheet.missing(&RVTOOLS_REQUIRED);
    if !missing.is_empty() {
        return Err(ParseError::MissingColumns(missing));
    }

    let vm_col = sheet.column("VM");
    let primary_col = sheet.column("OS according to VMware Tools");
    let fallback_col = sheet.column("OS according to configuration file");
    let cluster_col = sheet.column("Cluster");
    let host_col = sheet.column("Host");

    let mut rows = Vec::new();
    for (row_index, cells) in sheet.data_rows() {
        let vm_name = cell(cells, vm_col);
        if vm_name.is_empty() {
            continue;
        }

        let os_primary = cell(cells, primary_col);
        let os_fallback = cell(cells, fallback_col);
        let host_cluster = non_empty(cell(cells, cluster_col)).or_else(|| non_empty(cell(cells, host_col)));

        if os_primary.is_empty() && os_fallback.is_empty() {
            warn!(row_index, vm = %vm_name, "both OS columns empty; will be classified as needs_info");
        }

        rows.push(VmRow {
            vm_name,
            host_cluster,
            os_raw_primary: os_primary,
            os_raw_fallback: Some(os_fallback),
            source_format: SourceFormat::RvTools,
            row_index,
        });
    }
    Ok(rows)
}

fn extract_cloudphysics(sheet: &Sheet) -> Result<Vec<VmRow>, ParseError> {
    let missing = sheet.missing(&CLOUDPHYSICS_REQUIRED);
    if !missing.is_empty() {
        return Err(ParseError::MissingColumns(missing));
    }

    let vm_col = sheet.column("VM Name");
    let os_col = sheet.column("Guest OS");
    let cluster_col = sheet.column("Cluster");

    Ok(sheet
        .data_rows()
        .filter_map(|(row_index, cells)| {
            let vm_name = non_empty(cell(cells, vm_col))?;
            Some(VmRow {
                vm_name,
                host_cluster: non_empty(cell(cells, cluster_col)),
                os_raw_primary: cell(cells, os_col),
                os_raw_fallback: None,
                source_format: SourceFormat::CloudPhysics,
                row_index,
            })
        })
        .collect())
}

#[cfg(test)]
#[path = "file_parser_test.rs"]
mod tests;
