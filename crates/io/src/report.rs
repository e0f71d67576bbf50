// Summary workbook export
//
// Two sheets, numbers written as numbers. Not meant to be read back by the
// tool; the only consumer is a person opening it in a spreadsheet app.

use std::path::Path;

use ctrsum_core::{BatchReport, CtrError};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

pub const DEFAULT_OUTPUT_NAME: &str = "CTR_Summary.xlsx";

pub const COMPANY_SHEET: &str = "Company Summary";
pub const MONTHLY_SHEET: &str = "Monthly Summary";

const COMPANY_HEADERS: [&str; 4] = ["Company", "Total Search Volume", "Total Traffic", "CTR"];
const MONTHLY_HEADERS: [&str; 4] = ["File Name", "Company", "Monthly Search Volume", "Monthly Traffic"];

fn report_err(e: XlsxError) -> CtrError {
    CtrError::Report(e.to_string())
}

/// Serialize the report to xlsx bytes.
pub fn report_to_buffer(report: &BatchReport) -> Result<Vec<u8>, CtrError> {
    let mut workbook = build_workbook(report).map_err(report_err)?;
    workbook.save_to_buffer().map_err(report_err)
}

/// Write the report to `path` (atomic: write .tmp then rename).
pub fn write_report(report: &BatchReport, path: &Path) -> Result<(), CtrError> {
    let bytes = report_to_buffer(report)?;

    let tmp_path = path.with_extension("xlsx.tmp");
    std::fs::write(&tmp_path, &bytes)
        .map_err(|e| CtrError::Io(format!("failed to write {}: {}", tmp_path.display(), e)))?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        CtrError::Io(format!("failed to rename tmp to {}: {}", path.display(), e))
    })
}

fn build_workbook(report: &BatchReport) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(COMPANY_SHEET)?;
    write_headers(sheet, &COMPANY_HEADERS, &bold)?;
    for (i, row) in report.company_summary.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, &row.company)?;
        sheet.write_number(r, 1, row.total_search_volume)?;
        sheet.write_number(r, 2, row.total_traffic)?;
        sheet.write_number(r, 3, row.ctr)?;
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name(MONTHLY_SHEET)?;
    write_headers(sheet, &MONTHLY_HEADERS, &bold)?;
    for (i, row) in report.monthly.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, &row.file_name)?;
        sheet.write_string(r, 1, &row.company)?;
        sheet.write_number(r, 2, row.monthly_search_volume)?;
        sheet.write_number(r, 3, row.monthly_traffic)?;
    }

    Ok(workbook)
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str], bold: &Format) -> Result<(), XlsxError> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, bold)?;
        // Roughly fit the header text
        sheet.set_column_width(col as u16, (header.len() + 4) as f64)?;
    }
    Ok(())
}
