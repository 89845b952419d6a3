// Excel decoding (first sheet) and styled report export

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::NaiveDate;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet};

use leavesync_recon::cell::{serial_epoch, serial_to_datetime};
use leavesync_recon::model::{CorrectionEntry, EditGroup, Mismatch, SupplementaryEntry};
use leavesync_recon::{CellValue, Grid, ReconReport};

pub const MISMATCH_SHEET: &str = "Mismatches";
pub const EDITS_SHEET: &str = "Edits";

const MISMATCH_HEADERS: [&str; 7] = [
    "Date",
    "Employee",
    "DRMIS Code",
    "DRMIS Hours",
    "Oracle Code",
    "Oracle Hours",
    "Reason",
];

const EDIT_HEADERS: [&str; 9] = [
    "Employee",
    "Date",
    "Work Order",
    "Act. Code",
    "A/A Type",
    "Hours",
    "Reason",
    "Original Code",
    "Original Hours",
];

// ============================================================================
// Import
// ============================================================================

/// Decode the first sheet of a workbook (xlsx, xlsm, xls, xlsb, ods).
///
/// Leading empty rows and columns are kept so grid positions match the sheet.
pub fn read_first_sheet(path: &Path) -> Result<Grid, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Err("Excel file contains no sheets".to_string());
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut grid: Grid = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; start_col as usize];
        cells.extend(row.iter().map(convert_cell));
        grid.push(cells);
    }

    log::debug!(
        "{}: sheet '{}', {} row(s)",
        path.display(),
        sheet_name,
        grid.len()
    );
    Ok(grid)
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Error cells (#N/A, #REF!) carry nothing usable
        Data::Error(_) => CellValue::Empty,
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            serial_to_datetime(serial)
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Number(serial))
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

// ============================================================================
// Export
// ============================================================================

/// Counts from a report export.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExportResult {
    pub mismatch_rows: usize,
    pub data_rows: usize,
    pub supplementary_rows: usize,
    pub total_rows: usize,
}

impl ExportResult {
    pub fn summary(&self) -> String {
        format!(
            "{} mismatch(es), {} edit(s), {} work-order row(s)",
            self.mismatch_rows, self.data_rows, self.supplementary_rows
        )
    }
}

struct Styles {
    header: Format,
    date: Format,
    hours: Format,
    supplementary: Format,
    supplementary_hours: Format,
    total: Format,
    total_hours: Format,
}

impl Styles {
    fn new() -> Self {
        let header = Format::new()
            .set_bold()
            .set_background_color(Color::RGB(0xD9E1F2))
            .set_border_bottom(FormatBorder::Thin);
        let supplementary = Format::new().set_font_color(Color::RGB(0x595959));
        let total = Format::new().set_bold().set_border_top(FormatBorder::Thin);
        Self {
            date: Format::new().set_num_format("yyyy-mm-dd"),
            hours: Format::new().set_num_format("0.00"),
            supplementary_hours: supplementary.clone().set_num_format("0.00"),
            total_hours: total.clone().set_num_format("0.00"),
            header,
            supplementary,
            total,
        }
    }
}

/// Spreadsheet serial for a calendar date (1900 date system).
pub fn date_to_serial(date: NaiveDate) -> f64 {
    (date - serial_epoch()).num_days() as f64
}

/// Write the report as a two-sheet workbook: mismatches and edit groups.
pub fn export_report(report: &ReconReport, path: &Path) -> Result<ExportResult, String> {
    let styles = Styles::new();
    let mut result = ExportResult::default();
    let mut workbook = Workbook::new();

    {
        let sheet = workbook
            .add_worksheet()
            .set_name(MISMATCH_SHEET)
            .map_err(|e| format!("Failed to create sheet '{}': {}", MISMATCH_SHEET, e))?;
        write_headers(sheet, &MISMATCH_HEADERS, &styles)?;
        for (idx, m) in report.mismatches.iter().enumerate() {
            write_mismatch(sheet, idx as u32 + 1, m, &styles)?;
            result.mismatch_rows += 1;
        }
    }

    {
        let sheet = workbook
            .add_worksheet()
            .set_name(EDITS_SHEET)
            .map_err(|e| format!("Failed to create sheet '{}': {}", EDITS_SHEET, e))?;
        write_headers(sheet, &EDIT_HEADERS, &styles)?;
        let mut row = 1u32;
        for group in &report.groups {
            row = write_group(sheet, row, group, &styles, &mut result)?;
        }
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;

    log::info!("wrote {}: {}", path.display(), result.summary());
    Ok(result)
}

fn xlsx_err(e: rust_xlsxwriter::XlsxError) -> String {
    format!("Failed to write cell: {}", e)
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str], styles: &Styles) -> Result<(), String> {
    for (col, title) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *title, &styles.header)
            .map_err(xlsx_err)?;
        let width = (title.len() as f64 + 4.0).max(12.0);
        sheet.set_column_width(col as u16, width).map_err(xlsx_err)?;
    }
    sheet
        .set_freeze_panes(1, 0)
        .map_err(|e| format!("Failed to set freeze panes: {}", e))?;
    Ok(())
}

fn write_mismatch(sheet: &mut Worksheet, row: u32, m: &Mismatch, styles: &Styles) -> Result<(), String> {
    let reason = leavesync_recon::edits::discrepancy_reason(m);
    sheet
        .write_number_with_format(row, 0, date_to_serial(m.date), &styles.date)
        .map_err(xlsx_err)?;
    sheet.write_string(row, 1, &m.employee_id).map_err(xlsx_err)?;
    sheet.write_string(row, 2, &m.drmis_code).map_err(xlsx_err)?;
    sheet
        .write_number_with_format(row, 3, m.drmis_hours, &styles.hours)
        .map_err(xlsx_err)?;
    sheet.write_string(row, 4, &m.oracle_code).map_err(xlsx_err)?;
    sheet
        .write_number_with_format(row, 5, m.oracle_hours, &styles.hours)
        .map_err(xlsx_err)?;
    sheet.write_string(row, 6, &reason).map_err(xlsx_err)?;
    Ok(())
}

fn write_data_row(sheet: &mut Worksheet, row: u32, e: &CorrectionEntry, styles: &Styles) -> Result<(), String> {
    sheet.write_string(row, 0, &e.employee_id).map_err(xlsx_err)?;
    sheet
        .write_number_with_format(row, 1, date_to_serial(e.date), &styles.date)
        .map_err(xlsx_err)?;
    sheet.write_string(row, 2, &e.work_order).map_err(xlsx_err)?;
    sheet.write_string(row, 3, &e.act_code).map_err(xlsx_err)?;
    sheet.write_string(row, 4, &e.target_code).map_err(xlsx_err)?;
    sheet
        .write_number_with_format(row, 5, e.hours, &styles.hours)
        .map_err(xlsx_err)?;
    sheet.write_string(row, 6, &e.discrepancy_reason).map_err(xlsx_err)?;
    sheet.write_string(row, 7, &e.original_drmis_code).map_err(xlsx_err)?;
    sheet
        .write_number_with_format(row, 8, e.original_drmis_hours, &styles.hours)
        .map_err(xlsx_err)?;
    Ok(())
}

fn write_supplementary(
    sheet: &mut Worksheet,
    row: u32,
    s: &SupplementaryEntry,
    styles: &Styles,
) -> Result<(), String> {
    let fmt = &styles.supplementary;
    sheet.write_string_with_format(row, 0, &s.employee_id, fmt).map_err(xlsx_err)?;
    sheet
        .write_number_with_format(row, 1, date_to_serial(s.date), &styles.date)
        .map_err(xlsx_err)?;
    sheet.write_string_with_format(row, 2, &s.work_order, fmt).map_err(xlsx_err)?;
    sheet.write_string_with_format(row, 3, &s.act_code, fmt).map_err(xlsx_err)?;
    sheet.write_string_with_format(row, 4, &s.code, fmt).map_err(xlsx_err)?;
    sheet
        .write_number_with_format(row, 5, s.hours, &styles.supplementary_hours)
        .map_err(xlsx_err)?;
    Ok(())
}

/// Data row, supplementary rows, bold total. Returns the next free row.
fn write_group(
    sheet: &mut Worksheet,
    start: u32,
    group: &EditGroup,
    styles: &Styles,
    result: &mut ExportResult,
) -> Result<u32, String> {
    let mut row = start;
    write_data_row(sheet, row, &group.data_row, styles)?;
    result.data_rows += 1;
    row += 1;

    for sup in &group.supplementary {
        write_supplementary(sheet, row, sup, styles)?;
        result.supplementary_rows += 1;
        row += 1;
    }

    sheet
        .write_string_with_format(row, 0, &group.total.label, &styles.total)
        .map_err(xlsx_err)?;
    sheet
        .write_number_with_format(row, 5, group.total_hours(), &styles.total_hours)
        .map_err(xlsx_err)?;
    sheet
        .write_string_with_format(row, 7, "Oracle", &styles.total)
        .map_err(xlsx_err)?;
    sheet
        .write_number_with_format(row, 8, group.total.seed_hours, &styles.total_hours)
        .map_err(xlsx_err)?;
    result.total_rows += 1;

    // Blank spacer row between groups
    Ok(row + 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use leavesync_recon::model::{ReconMeta, ReconSummary, TotalRow};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_report() -> ReconReport {
        let date = ymd(2025, 4, 28);
        let mismatch = Mismatch {
            id: 0,
            date,
            employee_id: "12345".into(),
            drmis_hours: 4.25,
            drmis_code: "1110".into(),
            oracle_hours: 0.0,
            oracle_code: String::new(),
            included: true,
        };
        let group = EditGroup {
            mismatch_id: 0,
            data_row: leavesync_recon::edits::correction_for(&mismatch),
            supplementary: vec![SupplementaryEntry {
                employee_id: "12345".into(),
                date,
                work_order: "WO-100".into(),
                act_code: "0010".into(),
                code: String::new(),
                hours: 4.25,
            }],
            total: TotalRow {
                label: "Total".into(),
                seed_hours: 0.0,
            },
        };
        ReconReport {
            meta: ReconMeta {
                config_name: "test".into(),
                employee_id: "12345".into(),
                engine_version: "0.0.0".into(),
                run_at: String::new(),
                allow_list_codes: None,
            },
            summary: ReconSummary::default(),
            mismatches: vec![mismatch],
            groups: vec![group],
        }
    }

    #[test]
    fn test_date_to_serial_known_values() {
        assert_eq!(date_to_serial(ymd(1899, 12, 31)), 1.0);
        assert_eq!(date_to_serial(ymd(2000, 1, 1)), 36526.0);
        assert_eq!(date_to_serial(ymd(2024, 1, 1)), 45292.0);
        assert_eq!(date_to_serial(ymd(2025, 4, 28)), 45775.0);
    }

    #[test]
    fn test_export_report_sheets() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("edits.xlsx");

        let result = export_report(&sample_report(), &path).unwrap();
        assert_eq!(result.mismatch_rows, 1);
        assert_eq!(result.data_rows, 1);
        assert_eq!(result.supplementary_rows, 1);
        assert_eq!(result.total_rows, 1);

        let mut workbook: Sheets<_> = open_workbook_auto(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec![MISMATCH_SHEET.to_string(), EDITS_SHEET.to_string()]);

        let edits = workbook.worksheet_range(EDITS_SHEET).unwrap();
        assert_eq!(edits.get_value((0, 0)), Some(&Data::String("Employee".into())));
        assert_eq!(edits.get_value((1, 4)), Some(&Data::String("1110".into())));
        assert_eq!(edits.get_value((2, 2)), Some(&Data::String("WO-100".into())));
        assert_eq!(edits.get_value((3, 0)), Some(&Data::String("Total".into())));
        assert_eq!(edits.get_value((3, 5)), Some(&Data::Float(4.25)));
    }

    #[test]
    fn test_read_first_sheet_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("drmis.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(2, 1, "Pers.No.").unwrap();
        sheet.write_string(2, 2, "Hours").unwrap();
        sheet.write_number(3, 1, 12345.0).unwrap();
        sheet.write_number(3, 2, 7.5).unwrap();
        sheet.write_boolean(4, 1, true).unwrap();
        workbook.save(&path).unwrap();

        let grid = read_first_sheet(&path).unwrap();
        assert_eq!(grid.len(), 5);
        assert!(grid[0].is_empty());
        assert_eq!(grid[2][0], CellValue::Empty);
        assert_eq!(grid[2][1], CellValue::Text("Pers.No.".into()));
        assert_eq!(grid[3][1], CellValue::Number(12345.0));
        assert_eq!(grid[3][2], CellValue::Number(7.5));
        assert_eq!(grid[4][1], CellValue::Bool(true));
    }

    #[test]
    fn test_missing_workbook_is_an_error() {
        let err = read_first_sheet(Path::new("/nonexistent/oracle.xlsx")).unwrap_err();
        assert!(err.starts_with("Failed to open Excel file"));
    }
}
