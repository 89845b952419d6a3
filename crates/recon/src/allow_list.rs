//! Optional set of leave codes the run is restricted to.

use std::collections::BTreeSet;

use crate::cell::{CellValue, Grid};
use crate::codes::{allow_list_code, display_code, NO_CODE};
use crate::grid::DEFAULT_SCAN_ROWS;

/// Leave codes in display form (no leading zeros).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllowList {
    codes: BTreeSet<String>,
}

impl AllowList {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            codes: codes
                .into_iter()
                .map(|c| display_code(c.as_ref()))
                .filter(|c| c != NO_CODE)
                .collect(),
        }
    }

    /// Codes from the first column headed like "A/AType"; otherwise every
    /// digit-bearing cell of the first column.
    pub fn from_grid(grid: &Grid) -> Self {
        let (column, start) = find_code_column(grid).unwrap_or((0, 0));
        let codes: BTreeSet<String> = grid
            .iter()
            .skip(start)
            .filter_map(|row| row.get(column))
            .filter_map(allow_list_code)
            .filter(|c| c != NO_CODE)
            .collect();
        log::info!("allow-list: {} code(s) from column {column}", codes.len());
        Self { codes }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(&display_code(code))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }
}

/// (column, first data row) of an "A/AType" style header cell.
fn find_code_column(grid: &Grid) -> Option<(usize, usize)> {
    grid.iter().take(DEFAULT_SCAN_ROWS).enumerate().find_map(|(r, row)| {
        row.iter().position(is_code_header).map(|c| (c, r + 1))
    })
}

fn is_code_header(cell: &CellValue) -> bool {
    let CellValue::Text(s) = cell else {
        return false;
    };
    let squashed: String = s.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect();
    (squashed.contains("a/atype") || squashed.contains("att./abs.type")) && !squashed.contains("text")
}
