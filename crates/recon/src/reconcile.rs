//! Merge DRMIS and Oracle records by day and diff the two sides.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::allow_list::AllowList;
use crate::codes::display_code;
use crate::model::{DrmisRecord, MergedRow, Mismatch, OracleRecord};

/// First non-empty DRMIS employee id ("" when there is none).
///
/// Oracle exports carry no employee, so Oracle-only days are filed under this
/// id. The pipeline assumes one employee per run.
pub fn default_employee_id(drmis: &[DrmisRecord]) -> String {
    drmis
        .iter()
        .map(|r| r.employee_id.trim())
        .find(|id| !id.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Merge both sides into rows ordered by (date, employee).
///
/// The first DRMIS record for a (date, employee) slot wins. An Oracle record
/// lands on the first existing row for its date, whatever the employee, and
/// replaces that row's Oracle side; otherwise it opens a new row under the
/// default employee.
pub fn merge(drmis: &[DrmisRecord], oracle: &[OracleRecord]) -> Vec<MergedRow> {
    let fallback_id = default_employee_id(drmis);
    let mut rows: BTreeMap<(NaiveDate, String), MergedRow> = BTreeMap::new();

    for rec in drmis {
        rows.entry((rec.date, rec.employee_id.clone()))
            .or_insert_with(|| MergedRow {
                date: rec.date,
                employee_id: rec.employee_id.clone(),
                drmis_hours: rec.hours,
                drmis_code: rec.leave_code.clone(),
                oracle_hours: 0.0,
                oracle_code: String::new(),
            });
    }

    for rec in oracle {
        let existing = rows
            .range_mut((rec.date, String::new())..)
            .next()
            .filter(|((date, _), _)| *date == rec.date)
            .map(|(_, row)| row);
        match existing {
            Some(row) => {
                row.oracle_hours = rec.hours;
                row.oracle_code = rec.leave_code.clone();
            }
            None => {
                rows.insert(
                    (rec.date, fallback_id.clone()),
                    MergedRow {
                        date: rec.date,
                        employee_id: fallback_id.clone(),
                        drmis_hours: 0.0,
                        drmis_code: String::new(),
                        oracle_hours: rec.hours,
                        oracle_code: rec.leave_code.clone(),
                    },
                );
            }
        }
    }

    rows.into_values()
        .map(|mut row| {
            row.drmis_code = display_code(&row.drmis_code);
            row
        })
        .collect()
}

/// Keep rows whose DRMIS or Oracle code is allowed.
pub fn filter_allowed(rows: Vec<MergedRow>, allow: &AllowList) -> Vec<MergedRow> {
    rows.into_iter()
        .filter(|r| allow.contains(&r.drmis_code) || allow.contains(&r.oracle_code))
        .collect()
}

/// Differing rows, numbered in date order and all included.
pub fn find_mismatches(rows: &[MergedRow]) -> Vec<Mismatch> {
    rows.iter()
        .filter(|r| r.is_mismatch())
        .enumerate()
        .map(|(id, r)| Mismatch {
            id,
            date: r.date,
            employee_id: r.employee_id.clone(),
            drmis_hours: r.drmis_hours,
            drmis_code: r.drmis_code.clone(),
            oracle_hours: r.oracle_hours,
            oracle_code: r.oracle_code.clone(),
            included: true,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub merged: Vec<MergedRow>,
    pub mismatches: Vec<Mismatch>,
}

pub fn reconcile(
    drmis: &[DrmisRecord],
    oracle: &[OracleRecord],
    allow: Option<&AllowList>,
) -> Reconciliation {
    let mut merged = merge(drmis, oracle);
    if let Some(list) = allow {
        let before = merged.len();
        merged = filter_allowed(merged, list);
        log::debug!("allow-list kept {} of {before} merged row(s)", merged.len());
    }
    let mismatches = find_mismatches(&merged);
    log::info!("{} merged row(s), {} mismatch(es)", merged.len(), mismatches.len());
    Reconciliation { merged, mismatches }
}
