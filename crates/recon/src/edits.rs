//! Correction entries derived from mismatches.

use crate::codes::{display_code, is_blank_code};
use crate::model::{CorrectionEntry, EditGroup, Mismatch, TotalRow};

pub const CODE_MISMATCH: &str = "Code Mismatch";
pub const HOURS_MISMATCH: &str = "Hours Mismatch";
pub const TOTAL_LABEL: &str = "Total";

/// Comma-joined reason list for a mismatch.
pub fn discrepancy_reason(m: &Mismatch) -> String {
    let mut reasons = Vec::with_capacity(2);
    if m.code_differs() {
        reasons.push(CODE_MISMATCH);
    }
    if m.hours_differ() {
        reasons.push(HOURS_MISMATCH);
    }
    reasons.join(", ")
}

/// Display code, blank instead of "0".
fn shown(code: &str) -> String {
    if is_blank_code(code) {
        String::new()
    } else {
        display_code(code)
    }
}

/// The DRMIS edit a mismatch calls for.
///
/// When Oracle has nothing for the day the DRMIS code stays and its hours go
/// to zero. Otherwise Oracle's code and hours are the target, falling back to
/// the DRMIS code when Oracle has none.
pub fn correction_for(m: &Mismatch) -> CorrectionEntry {
    let oracle_empty = is_blank_code(&m.oracle_code) && m.oracle_hours == 0.0;
    let drmis_code = shown(&m.drmis_code);
    let oracle_code = shown(&m.oracle_code);

    let (target_code, hours) = if oracle_empty {
        (drmis_code.clone(), 0.0)
    } else if !oracle_code.is_empty() {
        (oracle_code.clone(), m.oracle_hours)
    } else {
        (drmis_code.clone(), m.oracle_hours)
    };

    let replaced = !drmis_code.is_empty() && !oracle_code.is_empty() && drmis_code != oracle_code;

    CorrectionEntry {
        employee_id: m.employee_id.clone(),
        date: m.date,
        work_order: String::new(),
        act_code: String::new(),
        target_code,
        hours,
        discrepancy_reason: discrepancy_reason(m),
        original_drmis_code: display_code(&m.drmis_code),
        original_drmis_hours: m.drmis_hours,
        replaced,
    }
}

/// One group per included mismatch, in mismatch order.
pub fn generate_edits(mismatches: &[Mismatch]) -> Vec<EditGroup> {
    mismatches
        .iter()
        .filter(|m| m.included)
        .map(|m| EditGroup {
            mismatch_id: m.id,
            data_row: correction_for(m),
            supplementary: Vec::new(),
            total: TotalRow {
                label: TOTAL_LABEL.to_string(),
                seed_hours: m.oracle_hours,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn mm(drmis_hours: f64, drmis_code: &str, oracle_hours: f64, oracle_code: &str) -> Mismatch {
        Mismatch {
            id: 0,
            date: NaiveDate::from_ymd_opt(2025, 4, 28).unwrap(),
            employee_id: "12345".into(),
            drmis_hours,
            drmis_code: drmis_code.into(),
            oracle_hours,
            oracle_code: oracle_code.into(),
            included: true,
        }
    }

    #[test]
    fn missing_oracle_zeroes_drmis_leave() {
        let entry = correction_for(&mm(4.25, "1110", 0.0, ""));
        assert_eq!(entry.target_code, "1110");
        assert_eq!(entry.hours, 0.0);
        assert_eq!(entry.discrepancy_reason, "Code Mismatch, Hours Mismatch");
        assert_eq!(entry.original_drmis_code, "1110");
        assert_eq!(entry.original_drmis_hours, 4.25);
        assert!(!entry.replaced);
        assert_eq!(entry.work_order, "");
        assert_eq!(entry.act_code, "");
    }

    #[test]
    fn oracle_code_and_hours_are_the_target() {
        let entry = correction_for(&mm(8.0, "1110", 4.0, "1120"));
        assert_eq!(entry.target_code, "1120");
        assert_eq!(entry.hours, 4.0);
        assert!(entry.replaced);
    }

    #[test]
    fn blank_oracle_code_falls_back_to_drmis() {
        let entry = correction_for(&mm(8.0, "1110", 4.0, "0"));
        assert_eq!(entry.target_code, "1110");
        assert_eq!(entry.hours, 4.0);
        assert_eq!(entry.discrepancy_reason, "Code Mismatch, Hours Mismatch");
        assert!(!entry.replaced);

        let neither = correction_for(&mm(7.5, "0", 4.0, "0"));
        assert_eq!(neither.target_code, "");
        assert_eq!(neither.discrepancy_reason, "Hours Mismatch");
    }

    #[test]
    fn leave_added_on_work_day() {
        let entry = correction_for(&mm(7.5, "0", 7.5, "1110"));
        assert_eq!(entry.target_code, "1110");
        assert_eq!(entry.hours, 7.5);
        assert_eq!(entry.original_drmis_code, "0");
        assert!(!entry.replaced);
        assert_eq!(entry.discrepancy_reason, "Code Mismatch");
    }

    #[test]
    fn groups_follow_included_mismatches() {
        let mut a = mm(4.25, "1110", 0.0, "");
        let mut b = mm(8.0, "1110", 4.0, "1120");
        let mut c = mm(8.0, "1110", 6.0, "1110");
        a.id = 0;
        b.id = 1;
        b.included = false;
        c.id = 2;
        let groups = generate_edits(&[a, b, c]);
        assert_eq!(groups.iter().map(|g| g.mismatch_id).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(groups[1].total.label, "Total");
        assert_eq!(groups[1].total.seed_hours, 6.0);
        assert!(groups[0].supplementary.is_empty());
    }
}
