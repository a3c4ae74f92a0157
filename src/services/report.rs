//! Branded three-tab `.xlsx` report built from classified VMs.
//!
//! Tabs, in order: `VM Detail`, `Summary`, `Executive Summary`. Row 1 of each
//! tab is reserved for the logo; headers sit on row 2.

use std::path::Path;

use chrono::NaiveDate;
use rust_xlsxwriter::{Color, Format, FormatAlign, Image, Workbook, Worksheet, XlsxError};
use tracing::{debug, warn};

use crate::error::ErrorCode;
use crate::services::classification::{ClassifiedVm, TierSummary};
use crate::tier::Tier;

const HEADER_BG: u32 = 0x1F2937;
const LIGHT_TEXT: u32 = 0xF9FAFB;
const LOGO_BG: u32 = 0x0A0D12;
const FONT_MONO: &str = "IBM Plex Mono";
const FONT_SANS: &str = "IBM Plex Sans";

const LOGO_ROW: u32 = 0;
const HEADER_ROW: u32 = 1;
const FIRST_DATA_ROW: u32 = 2;

const VM_DETAIL_COLUMNS: [(&str, f64); 9] = [
    ("VM Name", 28.0),
    ("Host/Cluster", 22.0),
    ("OS (Raw)", 32.0),
    ("OS (Interpreted)", 28.0),
    ("Classification", 26.0),
    ("Classification Color", 18.0),
    ("Classification Reason", 38.0),
    ("Migration Path", 34.0),
    ("Notes", 28.0),
];

const SUMMARY_COLUMNS: [(&str, f64); 3] = [("Classification", 28.0), ("Count", 10.0), ("Percentage", 12.0)];

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report generation failed: {0}")]
    Xlsx(#[from] XlsxError),
}

impl ErrorCode for ReportError {
    fn error_code(&self) -> &'static str {
        "PROCESSING_ERROR"
    }
}

/// Inputs that are not part of the classified data itself.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions<'a> {
    pub customer_name: Option<&'a str>,
    /// Inserted into row 1 of each tab when the file exists.
    pub logo_path: Option<&'a Path>,
    pub analysis_date: NaiveDate,
}

/// Build the report and return the workbook bytes.
///
/// # Errors
///
/// Returns [`ReportError::Xlsx`] if the workbook cannot be assembled or
/// serialized. A missing or unreadable logo is logged and skipped.
pub fn build(vms: &[ClassifiedVm], options: &ReportOptions<'_>) -> Result<Vec<u8>, ReportError> {
    let logo = options.logo_path.and_then(load_logo);
    let summary = TierSummary::from_vms(vms);
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet().set_name("VM Detail")?;
    insert_logo(sheet, logo.as_ref())?;
    write_vm_detail(sheet, vms)?;

    let sheet = workbook.add_worksheet().set_name("Summary")?;
    insert_logo(sheet, logo.as_ref())?;
    write_summary(sheet, &summary)?;

    let sheet = workbook.add_worksheet().set_name("Executive Summary")?;
    insert_logo(sheet, logo.as_ref())?;
    write_executive_summary(sheet, &summary, options)?;

    let bytes = workbook.save_to_buffer()?;
    debug!(vms = vms.len(), bytes = bytes.len(), "report built");
    Ok(bytes)
}

/// `VME-Analysis-{customer}-{date}.xlsx`, or `VME-Analysis-{date}.xlsx` when
/// the customer name has no usable characters.
#[must_use]
pub fn build_filename(customer_name: Option<&str>, date: NaiveDate) -> String {
    let date = date.format("%Y-%m-%d");
    match customer_name.map(sanitize_customer).filter(|s| !s.is_empty()) {
        Some(safe) => format!("VME-Analysis-{safe}-{date}.xlsx"),
        None => format!("VME-Analysis-{date}.xlsx"),
    }
}

/// Keep ASCII letters, digits, whitespace and `-`; trim; spaces become `-`.
fn sanitize_customer(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();
    kept.trim().replace(' ', "-")
}

// =============================================================================
// FORMATS
// =============================================================================

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_name(FONT_SANS)
        .set_font_color(Color::RGB(LIGHT_TEXT))
        .set_background_color(Color::RGB(HEADER_BG))
        .set_align(FormatAlign::VerticalCenter)
}

fn row_format(tier: Tier, font: &str) -> Format {
    Format::new()
        .set_font_name(font)
        .set_font_color(Color::RGB(LIGHT_TEXT))
        .set_background_color(Color::RGB(tier.row_background()))
}

fn write_headers(sheet: &mut Worksheet, columns: &[(&str, f64)]) -> Result<(), XlsxError> {
    let format = header_format();
    for (col, (title, width)) in (0u16..).zip(columns) {
        sheet.write_string_with_format(HEADER_ROW, col, *title, &format)?;
        sheet.set_column_width(col, *width)?;
    }
    Ok(())
}

// =============================================================================
// LOGO
// =============================================================================

fn load_logo(path: &Path) -> Option<Image> {
    if !path.exists() {
        warn!(path = %path.display(), "logo asset not found; skipping logo insertion");
        return None;
    }
    match Image::new(path) {
        Ok(image) => Some(image.set_scale_to_size(120, 40, true)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load logo; skipping");
            None
        }
    }
}

fn insert_logo(sheet: &mut Worksheet, logo: Option<&Image>) -> Result<(), XlsxError> {
    let Some(image) = logo else {
        return Ok(());
    };
    sheet.write_blank(LOGO_ROW, 0, &Format::new().set_background_color(Color::RGB(LOGO_BG)))?;
    sheet.set_row_height(LOGO_ROW, 32)?;
    sheet.insert_image(LOGO_ROW, 0, image)?;
    Ok(())
}

// =============================================================================
// TABS
// =============================================================================

fn write_vm_detail(sheet: &mut Worksheet, vms: &[ClassifiedVm]) -> Result<(), XlsxError> {
    write_headers(sheet, &VM_DETAIL_COLUMNS)?;
    sheet.set_row_height(HEADER_ROW, 22)?;
    sheet.set_freeze_panes(FIRST_DATA_ROW, 0)?;

    for (row, vm) in (FIRST_DATA_ROW..).zip(vms) {
        let format = row_format(vm.tier, FONT_MONO)
            .set_text_wrap()
            .set_align(FormatAlign::Top);
        let values = [
            vm.vm_name.as_str(),
            vm.host_cluster.as_deref().unwrap_or(""),
            vm.os_raw.as_str(),
            vm.os_interpreted.as_str(),
            vm.tier.display_name(),
            vm.color,
            vm.reason.as_str(),
            vm.migration_path.as_str(),
            vm.notes.as_deref().unwrap_or(""),
        ];
        for (col, value) in (0u16..).zip(values) {
            sheet.write_string_with_format(row, col, value, &format)?;
        }
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn write_summary(sheet: &mut Worksheet, summary: &TierSummary) -> Result<(), XlsxError> {
    write_headers(sheet, &SUMMARY_COLUMNS)?;

    let mut row = FIRST_DATA_ROW;
    for tier in Tier::ALL {
        let format = row_format(tier, FONT_SANS);
        sheet.write_string_with_format(row, 0, tier.display_name(), &format)?;
        sheet.write_number_with_format(row, 1, summary.count(tier) as f64, &format)?;
        sheet.write_string_with_format(row, 2, format!("{:.1}%", summary.percentage(tier)), &format)?;
        row += 1;
    }

    let totals = header_format();
    sheet.write_string_with_format(row, 0, "TOTAL", &totals)?;
    sheet.write_number_with_format(row, 1, summary.total as f64, &totals)?;
    sheet.write_string_with_format(row, 2, "100%", &totals)?;
    Ok(())
}

fn write_executive_summary(sheet: &mut Worksheet, summary: &TierSummary, options: &ReportOptions<'_>) -> Result<(), XlsxError> {
    let format = Format::new().set_font_name(FONT_SANS).set_font_color(Color::RGB(LIGHT_TEXT));
    for (row, line) in (FIRST_DATA_ROW..).zip(executive_lines(summary, options)) {
        sheet.write_string_with_format(row, 0, line, &format)?;
    }
    sheet.set_column_width(0, 90)?;
    Ok(())
}

/// Narrative text, one entry per spreadsheet row. Empty entries are spacer
/// rows.
fn executive_lines(summary: &TierSummary, options: &ReportOptions<'_>) -> Vec<String> {
    let suffix = options.customer_name.map(|name| format!(" — {name}")).unwrap_or_default();
    let n = |tier: Tier| summary.count(tier);
    let pct = |tier: Tier| format!("{:.1}", summary.percentage(tier));

    vec![
        format!("VME Compatibility Analysis{suffix}"),
        format!("Analysis Date: {}", options.analysis_date.format("%Y-%m-%d")),
        format!("Total VMs Analyzed: {}", summary.total),
        String::new(),
        "SUMMARY".to_owned(),
        format!(
            "{} VMs ({}%) are Officially Supported and validated by HPE for migration to VM Essentials.",
            n(Tier::OfficiallySupported),
            pct(Tier::OfficiallySupported)
        ),
        format!(
            "{} VMs ({}%) are Unofficially Supported — KVM-compatible but not HPE-validated; \
             recommend non-production testing.",
            n(Tier::UnofficiallySupported),
            pct(Tier::UnofficiallySupported)
        ),
        format!(
            "{} VMs ({}%) are Supported VDI workloads (Citrix, Omnissa Horizon, or HP Anyware) validated for VME.",
            n(Tier::SupportedVdi),
            pct(Tier::SupportedVdi)
        ),
        format!(
            "{} VMs ({}%) require review with the customer to confirm OS version or compatibility.",
            n(Tier::NeedsReview),
            pct(Tier::NeedsReview)
        ),
        format!(
            "{} VMs ({}%) have insufficient OS data for classification — additional information required.",
            n(Tier::NeedsInfo),
            pct(Tier::NeedsInfo)
        ),
        format!(
            "{} VMs ({}%) are Not Supported on the KVM hypervisor and will require OS upgrade, \
             re-platforming, or retention on VMware.",
            n(Tier::NotSupported),
            pct(Tier::NotSupported)
        ),
        String::new(),
        "This analysis was generated using the HPE VM Essentials compatibility matrix. \
         All classification results should be reviewed with the customer prior to migration planning."
            .to_owned(),
    ]
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
