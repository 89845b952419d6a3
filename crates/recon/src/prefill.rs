//! Prefill of supplementary work-order rows.
//!
//! When a leave correction frees or claims hours, the day's other DRMIS lines
//! (work orders) have to absorb the difference. The detail lookup holds every
//! DRMIS line per (date, employee); prefill picks the line that should take
//! the hours and proposes it under the data row.

use std::collections::HashMap;

use chrono::NaiveDate;
use crate::codes::{display_code, floor2, is_blank_code, normalize_drmis_code, parse_hours, round2};
use crate::columns::{resolve_columns, Field, DETAIL_FIELDS};
use crate::dates::normalize_date;
use crate::grid::{cell, DetectedTable, Record};
use crate::model::{DetailEntry, EditGroup, Source, SupplementaryEntry};

// ---------------------------------------------------------------------------
// Detail lookup
// ---------------------------------------------------------------------------

/// Unfiltered DRMIS lines keyed by (date, employee id), in sheet order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailLookup {
    entries: HashMap<(NaiveDate, String), Vec<DetailEntry>>,
}

impl DetailLookup {
    /// Build from the full DRMIS table. Missing work-order or activity columns
    /// leave those fields blank; missing required columns give an empty lookup.
    pub fn from_table(table: &DetectedTable) -> Self {
        let map = match resolve_columns(&table.headers, DETAIL_FIELDS, Source::Drmis) {
            Ok(map) => map,
            Err(e) => {
                log::warn!("detail lookup unavailable: {e}");
                return Self::default();
            }
        };
        let column = |field: Field| map.get(field).unwrap_or_default();
        let text = |row: &Record, field: Field| match map.get(field) {
            Some(header) => cell(row, header).as_text(),
            None => String::new(),
        };

        let mut lookup = Self::default();
        for row in &table.rows {
            let Some(date) = normalize_date(cell(row, column(Field::Date))) else {
                continue;
            };
            let employee = cell(row, column(Field::EmployeeId)).as_text();
            lookup.insert(
                date,
                employee,
                DetailEntry {
                    work_order: text(row, Field::WorkOrder),
                    activity_code: text(row, Field::Activity),
                    code: normalize_drmis_code(cell(row, column(Field::LeaveType))),
                    hours: parse_hours(cell(row, column(Field::Hours))).value(),
                },
            );
        }
        log::debug!("detail lookup: {} day(s)", lookup.entries.len());
        lookup
    }

    pub fn insert(&mut self, date: NaiveDate, employee_id: String, entry: DetailEntry) {
        self.entries.entry((date, employee_id)).or_default().push(entry);
    }

    pub fn get(&self, date: NaiveDate, employee_id: &str) -> Option<&[DetailEntry]> {
        self.entries
            .get(&(date, employee_id.to_string()))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Reallocation
// ---------------------------------------------------------------------------

/// Split `to_add` across candidates in proportion to their available hours.
///
/// Shares are floored to hundredths; the rounding remainder goes to the first
/// candidate so the shares sum to `to_add`. With nothing available the first
/// candidate takes everything.
pub fn proportional_shares(available: &[f64], to_add: f64) -> Vec<f64> {
    if available.is_empty() {
        return Vec::new();
    }
    let total: f64 = available.iter().sum();
    let mut shares = vec![0.0; available.len()];
    if total <= 0.0 {
        shares[0] = round2(to_add);
        return shares;
    }
    for (share, hours) in shares.iter_mut().zip(available) {
        *share = floor2(to_add * hours / total);
    }
    let remainder = round2(to_add - shares.iter().sum::<f64>());
    shares[0] = round2(shares[0] + remainder);
    shares
}

/// Take `amount` from candidates in list order, never below zero.
fn drain_in_order(available: &mut [f64], amount: f64) {
    let mut left = amount;
    for hours in available.iter_mut() {
        if left <= 0.0 {
            break;
        }
        let take = hours.min(left).max(0.0);
        *hours -= take;
        left -= take;
    }
}

/// Next supplementary row for a group, or `None` when nothing applies.
///
/// Never touches the group; callers append the result themselves.
pub fn prefill_next(group: &EditGroup, lookup: &DetailLookup) -> Option<SupplementaryEntry> {
    let row = &group.data_row;
    let entries = lookup.get(row.date, &row.employee_id)?;

    let leave_code = display_code(&row.target_code);
    let original_code = display_code(&row.original_drmis_code);
    let candidates: Vec<&DetailEntry> = entries
        .iter()
        .filter(|e| {
            let code = display_code(&e.code);
            let is_leave = !is_blank_code(&row.target_code) && code == leave_code;
            let is_original = row.replaced && code == original_code;
            !is_leave && !is_original
        })
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let consumed = group.consumed_hours();
    let mut available: Vec<f64> = candidates.iter().map(|c| c.hours).collect();
    drain_in_order(&mut available, consumed);

    let removal = !row.replaced && row.original_drmis_hours > 0.0 && row.hours == 0.0;
    if removal {
        // Freed leave hours flow back onto the remaining lines
        let shares = proportional_shares(&available, row.original_drmis_hours);
        for (hours, share) in available.iter_mut().zip(&shares) {
            *hours = round2(*hours + share);
        }
    } else {
        let to_subtract = if row.replaced {
            0.0
        } else {
            (row.hours - consumed).max(0.0)
        };
        drain_in_order(&mut available, to_subtract);
    }

    let (pick, hours) = candidates
        .iter()
        .zip(&available)
        .find(|(_, hours)| **hours > 0.0)?;

    Some(SupplementaryEntry {
        employee_id: row.employee_id.clone(),
        date: row.date,
        work_order: pick.work_order.clone(),
        act_code: pick.activity_code.clone(),
        code: if is_blank_code(&pick.code) {
            String::new()
        } else {
            display_code(&pick.code)
        },
        hours: round2(*hours),
    })
}

/// Prefill one row under every group that has a usable candidate.
/// Returns how many groups received a row.
pub fn prefill_groups(groups: &mut [EditGroup], lookup: &DetailLookup) -> usize {
    let mut filled = 0;
    for group in groups.iter_mut() {
        if let Some(entry) = prefill_next(group, lookup) {
            group.supplementary.push(entry);
            filled += 1;
        }
    }
    log::info!("prefilled {filled} of {} group(s)", groups.len());
    filled
}
