//! Leave-code and hours normalization.
//!
//! DRMIS uses 4-digit attendance/absence codes; Oracle reports the same leave
//! types with 3-digit codes. Oracle codes are bridged into the DRMIS space by
//! prefixing "1", which is what makes the two sides comparable at all.

use serde::Serialize;

use crate::cell::{format_number, CellValue};

/// Code used for "no leave code".
pub const NO_CODE: &str = "0";

fn is_dash(s: &str) -> bool {
    matches!(s, "-" | "--" | "\u{2013}" | "\u{2014}")
}

fn digits_of(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Raw text of a code cell. Numeric cells keep their integer form.
fn code_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Number(n) => format_number(*n),
        other => other.as_text(),
    }
}

/// DRMIS code: blank/dash -> "0"; else the digits; else the trimmed text.
pub fn normalize_drmis_code(cell: &CellValue) -> String {
    let text = code_text(cell);
    if text.is_empty() || is_dash(&text) {
        return NO_CODE.to_string();
    }
    let digits = digits_of(&text);
    if digits.is_empty() {
        text
    } else {
        digits
    }
}

/// Oracle code bridged into the DRMIS code space.
pub fn normalize_oracle_code(cell: &CellValue) -> String {
    let digits = digits_of(&code_text(cell));
    match digits.len() {
        0 => NO_CODE.to_string(),
        _ if digits == NO_CODE => digits,
        3 => format!("1{digits}"),
        _ => digits,
    }
}

/// Display form: all-digit codes lose leading zeros ("0" for empty).
pub fn display_code(code: &str) -> String {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return NO_CODE.to_string();
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        let stripped = trimmed.trim_start_matches('0');
        if stripped.is_empty() {
            NO_CODE.to_string()
        } else {
            stripped.to_string()
        }
    } else {
        trimmed.to_string()
    }
}

/// True for an absent code ("" or "0").
pub fn is_blank_code(code: &str) -> bool {
    let c = code.trim();
    c.is_empty() || c == NO_CODE
}

/// Digits-only form used by allow-list spreadsheets.
pub fn allow_list_code(cell: &CellValue) -> Option<String> {
    let digits = digits_of(&code_text(cell));
    if digits.is_empty() {
        None
    } else {
        Some(display_code(&digits))
    }
}

// ---------------------------------------------------------------------------
// Hours
// ---------------------------------------------------------------------------

/// Outcome of reading an hours cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Hours {
    Valid(f64),
    /// Empty cell or dash; legitimately zero.
    Blank,
    /// Content that is not a number; treated as zero.
    Malformed(String),
}

impl Hours {
    /// Numeric value, with blank and malformed input counting as zero.
    pub fn value(&self) -> f64 {
        match self {
            Self::Valid(h) => *h,
            Self::Blank | Self::Malformed(_) => 0.0,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}

pub fn parse_hours(cell: &CellValue) -> Hours {
    match cell {
        CellValue::Number(n) if n.is_finite() => Hours::Valid(*n),
        CellValue::Number(n) => Hours::Malformed(n.to_string()),
        CellValue::Empty => Hours::Blank,
        CellValue::Text(s) => {
            let t = s.trim();
            if t.is_empty() || is_dash(t) {
                return Hours::Blank;
            }
            // Decimal comma ("7,5") is common in European exports.
            let candidate = if t.contains(',') && !t.contains('.') {
                t.replace(',', ".")
            } else {
                t.replace(',', "")
            };
            match candidate.parse::<f64>() {
                Ok(h) if h.is_finite() => Hours::Valid(h),
                _ => Hours::Malformed(t.to_string()),
            }
        }
        CellValue::Bool(b) => Hours::Malformed(b.to_string()),
        CellValue::DateTime(dt) => Hours::Malformed(dt.to_string()),
    }
}

/// Round to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Floor to two decimals, tolerant of binary representation error.
pub fn floor2(value: f64) -> f64 {
    ((value * 100.0) + 1e-9).floor() / 100.0
}
