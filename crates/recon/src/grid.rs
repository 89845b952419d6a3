//! Header-row detection over noisy spreadsheet grids.
//!
//! Exports from both systems often carry title rows, filter summaries and
//! blank spacer columns above and around the real table. Detection scores the
//! first rows, picks the most header-like one, then trims sparsely populated
//! columns from both edges.

use std::collections::HashMap;

use serde::Serialize;

use crate::cell::{CellValue, Grid};

/// Default number of leading rows considered for the header.
pub const DEFAULT_SCAN_ROWS: usize = 30;

/// Score bonus for a row containing any header keyword.
const KEYWORD_BONUS: usize = 50;

/// Minimum non-blank cells a column needs below the header to be kept.
const MIN_COLUMN_FILL: usize = 3;

/// Fraction of data rows a column needs to be kept (when larger than the minimum).
const COLUMN_FILL_RATIO: f64 = 0.15;

/// Lowercase fragments that mark a header row.
const HEADER_KEYWORDS: &[&str] = &["pers", "date", "hours", "a/atype", "a/a type", "leave"];

static EMPTY_CELL: CellValue = CellValue::Empty;

/// One data row keyed by header text.
pub type Record = HashMap<String, CellValue>;

/// Cell under `header`, or an empty cell when the record lacks it.
pub fn cell<'a>(record: &'a Record, header: &str) -> &'a CellValue {
    record.get(header).unwrap_or(&EMPTY_CELL)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
    /// Index of the header row in the source grid (None for an empty grid).
    pub header_row: Option<usize>,
    /// Retained column span in the source grid, inclusive.
    pub columns: Option<(usize, usize)>,
}

impl DetectedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rename a header (and the matching key in every record).
    ///
    /// Any other header already carrying `to` is renamed out of the way so the
    /// mapped column is the only one answering to the new name.
    pub fn rename_header(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return self.headers.iter().any(|h| h == from);
        }
        let Some(idx) = self.headers.iter().position(|h| h == from) else {
            return false;
        };

        let displaced = format!("{to} (unmapped)");
        let clash = self
            .headers
            .iter()
            .enumerate()
            .find(|(i, h)| *i != idx && h.eq_ignore_ascii_case(to))
            .map(|(i, _)| i);
        if let Some(clash_idx) = clash {
            let old = std::mem::replace(&mut self.headers[clash_idx], displaced.clone());
            for row in &mut self.rows {
                if let Some(v) = row.remove(&old) {
                    row.insert(displaced.clone(), v);
                }
            }
        }

        self.headers[idx] = to.to_string();
        for row in &mut self.rows {
            if let Some(v) = row.remove(from) {
                row.insert(to.to_string(), v);
            }
        }
        true
    }
}

/// Detect the header row and data records in a raw grid.
///
/// Never fails: an empty grid yields an empty table.
pub fn detect_table(grid: &Grid, scan_rows: usize) -> DetectedTable {
    let Some(header_idx) = find_header_row(grid, scan_rows) else {
        return DetectedTable::default();
    };

    let body = &grid[header_idx + 1..];
    let width = grid[header_idx..]
        .iter()
        .map(|row| row.len())
        .max()
        .unwrap_or(0);

    if width == 0 {
        return DetectedTable {
            header_row: Some(header_idx),
            ..Default::default()
        };
    }

    let (first, last) = retained_span(body, width);

    let header_cells = &grid[header_idx];
    let headers: Vec<String> = (first..=last)
        .map(|c| header_cells.get(c).map(CellValue::as_text).unwrap_or_default())
        .collect();

    let mut rows = Vec::new();
    for row in body {
        let in_span = |c: usize| row.get(c).unwrap_or(&EMPTY_CELL);
        if (first..=last).all(|c| in_span(c).is_blank()) {
            continue;
        }
        let mut record = Record::with_capacity(headers.len());
        for (offset, header) in headers.iter().enumerate() {
            // Duplicate header text: first column wins.
            record
                .entry(header.clone())
                .or_insert_with(|| in_span(first + offset).clone());
        }
        rows.push(record);
    }

    log::debug!(
        "header row {header_idx}, columns {first}..={last}, {} record(s)",
        rows.len()
    );

    DetectedTable {
        headers,
        rows,
        header_row: Some(header_idx),
        columns: Some((first, last)),
    }
}

/// Highest-scoring row among the first `scan_rows`; ties keep the earliest.
pub fn find_header_row(grid: &Grid, scan_rows: usize) -> Option<usize> {
    let limit = scan_rows.min(grid.len());
    if limit == 0 {
        return None;
    }

    let mut best = 0;
    let mut best_score = 0;
    let mut keyword_seen = false;
    for (idx, row) in grid.iter().take(limit).enumerate() {
        let has_keyword = row_has_keyword(row);
        keyword_seen |= has_keyword;
        let score = header_score(row, has_keyword);
        if score > best_score {
            best = idx;
            best_score = score;
        }
    }

    if !keyword_seen {
        log::warn!("no header keyword in the first {limit} row(s); using densest row {best}");
    }
    Some(best)
}

fn header_score(row: &[CellValue], has_keyword: bool) -> usize {
    let filled = row.iter().filter(|c| !c.is_blank()).count();
    filled + if has_keyword { KEYWORD_BONUS } else { 0 }
}

fn row_has_keyword(row: &[CellValue]) -> bool {
    row.iter().any(|cell| match cell {
        CellValue::Text(s) => {
            let lower = s.to_lowercase();
            HEADER_KEYWORDS.iter().any(|k| lower.contains(k))
        }
        _ => false,
    })
}

/// Fill threshold for a body with `data_rows` non-blank rows.
pub fn fill_threshold(data_rows: usize) -> usize {
    let ratio = (data_rows as f64 * COLUMN_FILL_RATIO).ceil() as usize;
    MIN_COLUMN_FILL.max(ratio)
}

/// Trim sparse columns from both edges; keep everything if none qualify.
fn retained_span(body: &[Vec<CellValue>], width: usize) -> (usize, usize) {
    let mut counts = vec![0usize; width];
    let mut data_rows = 0;
    for row in body {
        if row.iter().all(CellValue::is_blank) {
            continue;
        }
        data_rows += 1;
        for (c, cell) in row.iter().enumerate().take(width) {
            if !cell.is_blank() {
                counts[c] += 1;
            }
        }
    }

    let threshold = fill_threshold(data_rows);
    let mut first = 0;
    while first < width && counts[first] < threshold {
        first += 1;
    }
    let mut last = width as isize - 1;
    while last >= first as isize && counts[last as usize] < threshold {
        last -= 1;
    }

    if first >= width || last < first as isize {
        (0, width - 1)
    } else {
        (first, last as usize)
    }
}
