use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Drmis,
    Oracle,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drmis => write!(f, "DRMIS"),
            Self::Oracle => write!(f, "Oracle"),
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical records
// ---------------------------------------------------------------------------

/// One DRMIS row after normalization and filtering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrmisRecord {
    pub employee_id: String,
    pub date: NaiveDate,
    pub hours: f64,
    pub leave_code: String,
}

/// One Oracle leave day. Never carries an employee id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OracleRecord {
    pub date: NaiveDate,
    pub hours: f64,
    pub leave_code: String,
}

// ---------------------------------------------------------------------------
// Merge + diff
// ---------------------------------------------------------------------------

/// Both sides of one (date, employee) slot. A side with no record holds
/// zero hours and an empty code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRow {
    pub date: NaiveDate,
    pub employee_id: String,
    pub drmis_hours: f64,
    pub drmis_code: String,
    pub oracle_hours: f64,
    pub oracle_code: String,
}

impl MergedRow {
    pub fn code_differs(&self) -> bool {
        self.drmis_code != self.oracle_code
    }

    pub fn hours_differ(&self) -> bool {
        self.drmis_hours != self.oracle_hours
    }

    pub fn is_mismatch(&self) -> bool {
        self.code_differs() || self.hours_differ()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    pub id: usize,
    pub date: NaiveDate,
    pub employee_id: String,
    pub drmis_hours: f64,
    pub drmis_code: String,
    pub oracle_hours: f64,
    pub oracle_code: String,
    /// Whether the row takes part in edit generation (user may untick rows).
    pub included: bool,
}

impl Mismatch {
    pub fn code_differs(&self) -> bool {
        self.drmis_code != self.oracle_code
    }

    pub fn hours_differ(&self) -> bool {
        self.drmis_hours != self.oracle_hours
    }
}

// ---------------------------------------------------------------------------
// Correction entries
// ---------------------------------------------------------------------------

/// The edit a mismatch asks for in DRMIS.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionEntry {
    pub employee_id: String,
    pub date: NaiveDate,
    pub work_order: String,
    pub act_code: String,
    pub target_code: String,
    pub hours: f64,
    pub discrepancy_reason: String,
    pub original_drmis_code: String,
    pub original_drmis_hours: f64,
    /// Oracle's leave code stands in for a different DRMIS leave code.
    pub replaced: bool,
}

impl CorrectionEntry {
    pub fn display_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Work-order row synthesized next to a data row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplementaryEntry {
    pub employee_id: String,
    pub date: NaiveDate,
    pub work_order: String,
    pub act_code: String,
    pub code: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalRow {
    pub label: String,
    /// Oracle hours for the day; the running total starts here.
    pub seed_hours: f64,
}

/// A mismatch's data row, the rows added beneath it, and its total row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditGroup {
    pub mismatch_id: usize,
    pub data_row: CorrectionEntry,
    pub supplementary: Vec<SupplementaryEntry>,
    pub total: TotalRow,
}

impl EditGroup {
    /// Hours already placed in supplementary rows.
    pub fn consumed_hours(&self) -> f64 {
        self.supplementary.iter().map(|s| s.hours).sum()
    }

    /// Data row hours plus every supplementary row.
    pub fn total_hours(&self) -> f64 {
        self.data_row.hours + self.consumed_hours()
    }
}

// ---------------------------------------------------------------------------
// Detail lookup entries
// ---------------------------------------------------------------------------

/// One unfiltered DRMIS line, kept for hour reallocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailEntry {
    pub work_order: String,
    pub activity_code: String,
    pub code: String,
    pub hours: f64,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconSummary {
    pub drmis_rows_read: usize,
    pub drmis_records: usize,
    pub oracle_rows_read: usize,
    pub oracle_records: usize,
    pub oracle_expanded: usize,
    pub merged_rows: usize,
    pub mismatches: usize,
    pub code_mismatches: usize,
    pub hours_mismatches: usize,
    pub prefilled_groups: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub mismatches: Vec<Mismatch>,
    pub groups: Vec<EditGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub employee_id: String,
    pub engine_version: String,
    pub run_at: String,
    pub allow_list_codes: Option<usize>,
}
