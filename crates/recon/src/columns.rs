//! Column resolution: which header feeds which field.
//!
//! Each field carries an ordered list of matchers over the lowercased header
//! text. The first matcher that hits any header wins, so a precise pattern
//! ("from" + "date") is preferred over a fallback ("date").

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::grid::DetectedTable;
use crate::model::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    EmployeeId,
    Date,
    Hours,
    LeaveType,
    WorkOrder,
    Activity,
    FromDate,
    HoursRecorded,
    LeaveCode,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Self::EmployeeId => "employee_id",
            Self::Date => "date",
            Self::Hours => "hours",
            Self::LeaveType => "leave_type",
            Self::WorkOrder => "work_order",
            Self::Activity => "activity",
            Self::FromDate => "from_date",
            Self::HoursRecorded => "hours_recorded",
            Self::LeaveCode => "leave_code",
        }
    }

    /// Header text a mapped column is renamed to. Each label satisfies the
    /// field's first matcher.
    pub fn label(&self) -> &'static str {
        match self {
            Self::EmployeeId => "Pers.No.",
            Self::Date => "Date",
            Self::Hours => "Hours",
            Self::LeaveType => "A/AType",
            Self::WorkOrder => "Rec. Order",
            Self::Activity => "Activity",
            Self::FromDate => "From Date",
            Self::HoursRecorded => "Hours Recorded",
            Self::LeaveCode => "Leave Code",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        ALL_FIELDS.iter().copied().find(|f| f.name() == key)
    }
}

const ALL_FIELDS: [Field; 9] = [
    Field::EmployeeId,
    Field::Date,
    Field::Hours,
    Field::LeaveType,
    Field::WorkOrder,
    Field::Activity,
    Field::FromDate,
    Field::HoursRecorded,
    Field::LeaveCode,
];

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Matchers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Whole header equals the fragment.
    Exact(&'static str),
    /// Header contains every fragment.
    All(&'static [&'static str]),
    /// Header contains every fragment of `all` and none of `none`.
    AllExcept {
        all: &'static [&'static str],
        none: &'static [&'static str],
    },
}

impl Matcher {
    /// `header` must already be trimmed and lowercased.
    pub fn matches(&self, header: &str) -> bool {
        match self {
            Self::Exact(s) => header == *s,
            Self::All(frags) => frags.iter().all(|f| header.contains(f)),
            Self::AllExcept { all, none } => {
                all.iter().all(|f| header.contains(f)) && !none.iter().any(|f| header.contains(f))
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: Field,
    pub required: bool,
    pub matchers: &'static [Matcher],
}

const EMPLOYEE_ID: FieldSpec = FieldSpec {
    field: Field::EmployeeId,
    required: true,
    matchers: &[Matcher::All(&["pers", "no"])],
};

const DRMIS_DATE: FieldSpec = FieldSpec {
    field: Field::Date,
    required: true,
    matchers: &[Matcher::Exact("date")],
};

const DRMIS_HOURS: FieldSpec = FieldSpec {
    field: Field::Hours,
    required: true,
    matchers: &[Matcher::Exact("hours")],
};

const LEAVE_TYPE: FieldSpec = FieldSpec {
    field: Field::LeaveType,
    required: true,
    matchers: &[Matcher::AllExcept {
        all: &["a/a", "type"],
        none: &["text"],
    }],
};

const WORK_ORDER: FieldSpec = FieldSpec {
    field: Field::WorkOrder,
    required: false,
    matchers: &[
        Matcher::All(&["rec", "order"]),
        Matcher::AllExcept {
            all: &["order"],
            none: &["text", "desc"],
        },
        Matcher::All(&["network"]),
        Matcher::All(&["wbs"]),
    ],
};

const ACTIVITY: FieldSpec = FieldSpec {
    field: Field::Activity,
    required: false,
    matchers: &[
        Matcher::AllExcept {
            all: &["activity"],
            none: &["type", "text", "desc"],
        },
        Matcher::Exact("act."),
        Matcher::Exact("act"),
    ],
};

/// Fields the DRMIS extractor needs.
pub const DRMIS_FIELDS: &[FieldSpec] = &[EMPLOYEE_ID, DRMIS_DATE, DRMIS_HOURS, LEAVE_TYPE];

/// DRMIS fields plus the optional work-order detail used for reallocation.
pub const DETAIL_FIELDS: &[FieldSpec] =
    &[EMPLOYEE_ID, DRMIS_DATE, DRMIS_HOURS, LEAVE_TYPE, WORK_ORDER, ACTIVITY];

/// Fields the Oracle extractor needs.
pub const ORACLE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        field: Field::FromDate,
        required: true,
        matchers: &[Matcher::All(&["from", "date"]), Matcher::Exact("date")],
    },
    FieldSpec {
        field: Field::HoursRecorded,
        required: true,
        matchers: &[Matcher::All(&["hours", "recorded"]), Matcher::Exact("hours")],
    },
    FieldSpec {
        field: Field::LeaveCode,
        required: true,
        matchers: &[Matcher::All(&["leave", "code"])],
    },
];

/// Field specs for a source.
pub fn specs_for(source: Source) -> &'static [FieldSpec] {
    match source {
        Source::Drmis => DETAIL_FIELDS,
        Source::Oracle => ORACLE_FIELDS,
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Field -> header text, as found in a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnMap {
    columns: HashMap<Field, String>,
}

impl ColumnMap {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Header matched by a spec, trying matchers in priority order.
pub fn find_header<'a>(headers: &'a [String], spec: &FieldSpec) -> Option<&'a str> {
    let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    spec.matchers.iter().find_map(|m| {
        lowered
            .iter()
            .position(|h| m.matches(h))
            .map(|idx| headers[idx].as_str())
    })
}

/// Resolve every spec against the headers. Missing required fields fail with
/// `MissingColumns`; missing optional fields are left out of the map.
pub fn resolve_columns(
    headers: &[String],
    specs: &[FieldSpec],
    source: Source,
) -> Result<ColumnMap, ReconError> {
    let mut columns = HashMap::new();
    let mut missing = Vec::new();

    for spec in specs {
        match find_header(headers, spec) {
            Some(header) => {
                columns.insert(spec.field, header.to_string());
            }
            None if spec.required => missing.push(spec.field.name().to_string()),
            None => log::debug!("{source}: optional column '{}' not found", spec.field),
        }
    }

    if !missing.is_empty() {
        return Err(ReconError::MissingColumns {
            source,
            missing,
            available: headers.to_vec(),
        });
    }
    Ok(ColumnMap { columns })
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

/// Manual field -> source header mapping, used when detection fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnOverrides {
    mapping: BTreeMap<Field, String>,
}

impl ColumnOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, header: impl Into<String>) {
        self.mapping.insert(field, header.into());
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Field, &String)> {
        self.mapping.iter()
    }

    /// Parse `field=Header Text` pairs (CLI form).
    pub fn parse_pairs<S: AsRef<str>>(pairs: &[S], source: Source) -> Result<Self, ReconError> {
        let mut overrides = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (field, header) = pair.split_once('=').ok_or_else(|| ReconError::InvalidOverride {
                source,
                field: pair.to_string(),
                header: String::new(),
            })?;
            let parsed = Field::parse(field).ok_or_else(|| ReconError::InvalidOverride {
                source,
                field: field.trim().to_string(),
                header: header.trim().to_string(),
            })?;
            overrides.set(parsed, header.trim());
        }
        Ok(overrides)
    }

    /// Rename each mapped source header to its field's canonical label.
    pub fn apply(&self, table: &mut DetectedTable, source: Source) -> Result<(), ReconError> {
        let specs = specs_for(source);
        for (field, header) in &self.mapping {
            let known = specs.iter().any(|s| s.field == *field);
            if !known || !table.rename_header(header, field.label()) {
                return Err(ReconError::InvalidOverride {
                    source,
                    field: field.name().to_string(),
                    header: header.clone(),
                });
            }
            log::info!("{source}: mapped '{header}' to {field}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;
    use crate::grid::Record;

    fn headers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn drmis_headers_resolve() {
        let h = headers(&["Pers.No.", "Name", "Date", "Hours", "A/AType", "A/A Type Text"]);
        let map = resolve_columns(&h, DRMIS_FIELDS, Source::Drmis).unwrap();
        assert_eq!(map.get(Field::EmployeeId), Some("Pers.No."));
        assert_eq!(map.get(Field::LeaveType), Some("A/AType"));
        assert_eq!(map.get(Field::Date), Some("Date"));
    }

    #[test]
    fn leave_type_skips_text_column() {
        let h = headers(&["A/A Type Text", "Att./Absence Type", "A/A type"]);
        let spec = &DRMIS_FIELDS[3];
        assert_eq!(find_header(&h, spec), Some("A/A type"));
    }

    #[test]
    fn oracle_prefers_specific_over_fallback() {
        let h = headers(&["Date", "From Date", "Hours", "Hours Recorded", "Leave Code"]);
        let map = resolve_columns(&h, ORACLE_FIELDS, Source::Oracle).unwrap();
        assert_eq!(map.get(Field::FromDate), Some("From Date"));
        assert_eq!(map.get(Field::HoursRecorded), Some("Hours Recorded"));

        let h = headers(&["date", "HOURS", "Leave Code"]);
        let map = resolve_columns(&h, ORACLE_FIELDS, Source::Oracle).unwrap();
        assert_eq!(map.get(Field::FromDate), Some("date"));
        assert_eq!(map.get(Field::HoursRecorded), Some("HOURS"));
    }

    #[test]
    fn missing_columns_reports_fields_and_headers() {
        let h = headers(&["Employee", "Day", "Hours"]);
        let err = resolve_columns(&h, DRMIS_FIELDS, Source::Drmis).unwrap_err();
        match err {
            ReconError::MissingColumns { source, missing, available } => {
                assert_eq!(source, Source::Drmis);
                assert_eq!(missing, vec!["employee_id", "date", "leave_type"]);
                assert_eq!(available, h);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn optional_detail_fields_may_be_absent() {
        let h = headers(&["Pers.No.", "Date", "Hours", "A/AType", "Rec. Order", "Activity Type"]);
        let map = resolve_columns(&h, DETAIL_FIELDS, Source::Drmis).unwrap();
        assert_eq!(map.get(Field::WorkOrder), Some("Rec. Order"));
        assert_eq!(map.get(Field::Activity), None);
    }

    #[test]
    fn every_label_satisfies_its_own_spec() {
        for spec in DETAIL_FIELDS.iter().chain(ORACLE_FIELDS) {
            let h = headers(&[spec.field.label()]);
            assert!(find_header(&h, spec).is_some(), "{} label not matched", spec.field);
        }
    }

    #[test]
    fn overrides_rename_then_resolve() {
        let mut table = DetectedTable {
            headers: headers(&["Employee", "Day", "Hours", "Absence"]),
            rows: vec![Record::from([
                ("Employee".to_string(), CellValue::Number(1.0)),
                ("Day".to_string(), CellValue::from("28.04.2025")),
                ("Hours".to_string(), CellValue::Number(8.0)),
                ("Absence".to_string(), CellValue::from("1110")),
            ])],
            header_row: Some(0),
            columns: Some((0, 3)),
        };
        let overrides = ColumnOverrides::parse_pairs(
            &["employee_id=Employee", "date = Day", "leave-type=Absence"],
            Source::Drmis,
        )
        .unwrap();
        overrides.apply(&mut table, Source::Drmis).unwrap();

        let map = resolve_columns(&table.headers, DRMIS_FIELDS, Source::Drmis).unwrap();
        assert_eq!(map.get(Field::EmployeeId), Some("Pers.No."));
        assert_eq!(table.rows[0]["A/AType"], CellValue::from("1110"));
    }

    #[test]
    fn override_to_unknown_header_fails() {
        let mut table = DetectedTable {
            headers: headers(&["Date"]),
            ..Default::default()
        };
        let mut overrides = ColumnOverrides::new();
        overrides.set(Field::LeaveCode, "Code");
        let err = overrides.apply(&mut table, Source::Oracle).unwrap_err();
        assert!(err.to_string().contains("unknown header 'Code'"));
    }

    #[test]
    fn override_field_must_belong_to_source() {
        let mut table = DetectedTable {
            headers: headers(&["Code"]),
            ..Default::default()
        };
        let mut overrides = ColumnOverrides::new();
        overrides.set(Field::LeaveCode, "Code");
        assert!(overrides.apply(&mut table, Source::Drmis).is_err());
    }

    #[test]
    fn bad_pairs_are_rejected() {
        assert!(ColumnOverrides::parse_pairs(&["nonsense"], Source::Drmis).is_err());
        assert!(ColumnOverrides::parse_pairs(&["colour=Red"], Source::Drmis).is_err());
    }
}
