// File I/O operations

pub mod csv;
pub mod json;
pub mod text;
pub mod xlsx;

use std::path::Path;

use leavesync_recon::Grid;

/// Decode any supported export into a raw grid, by file extension.
pub fn read_grid(path: &Path) -> Result<Grid, String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" | "txt" => csv::read_grid(path),
        "tsv" => csv::read_tsv_grid(path),
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => xlsx::read_first_sheet(path),
        "" => Err(format!("{}: no file extension", path.display())),
        other => Err(format!("{}: unsupported file type '.{other}'", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_grid_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ORACLE.TSV");
        std::fs::write(&path, "From Date\tHours\n2025-04-28\t8\n").unwrap();
        let grid = read_grid(&path).unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0].len(), 2);
    }

    #[test]
    fn test_read_grid_rejects_unknown_extension() {
        let err = read_grid(Path::new("report.pdf")).unwrap_err();
        assert!(err.contains("unsupported file type '.pdf'"));
        assert!(read_grid(Path::new("README")).is_err());
    }
}
