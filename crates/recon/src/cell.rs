// Scalar cell values and raw grids, as handed over by a spreadsheet decoder.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A single decoded spreadsheet cell. No type is implied across rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

/// Rows of cells, first sheet only. Rows may differ in length.
pub type Grid = Vec<Vec<CellValue>>;

impl CellValue {
    /// Empty cells and whitespace-only text count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed display text. Integral numbers render without decimals.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => format_number(*n),
            Self::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Self::DateTime(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    dt.date().format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
        }
    }

    /// Infer a cell from raw text: numbers become `Number`, blanks `Empty`.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() && !has_leading_zero(trimmed) => Self::Number(n),
            _ => Self::Text(raw.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

/// Codes such as "0110" must stay text so the leading zero survives.
fn has_leading_zero(s: &str) -> bool {
    let digits = s.trim_start_matches(['-', '+']);
    digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.")
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Spreadsheet serial epoch (1900 date system): serial 1 = 1899-12-31.
pub fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN)
}

/// Convert a spreadsheet serial (days + fractional day) to a date-time.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial.abs() > 2_958_465.0 {
        return None;
    }
    let days = serial.floor();
    let millis = ((serial - days) * 86_400_000.0).round() as i64;
    let base = serial_epoch().and_hms_opt(0, 0, 0)?;
    base.checked_add_signed(Duration::days(days as i64))?
        .checked_add_signed(Duration::milliseconds(millis))
}

/// Parse CSV text into a grid, inferring numeric cells.
pub fn grid_from_csv_str(content: &str, delimiter: u8) -> Result<Grid, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(CellValue::infer).collect());
    }
    Ok(grid)
}
