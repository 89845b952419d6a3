// CSV/TSV decoding into raw grids

use std::io::Read;
use std::path::Path;

use leavesync_recon::cell::grid_from_csv_str;
use leavesync_recon::Grid;

/// Read a delimited file, sniffing the delimiter.
pub fn read_grid(path: &Path) -> Result<Grid, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    log::debug!(
        "{}: delimiter {:?}",
        path.display(),
        char::from(delimiter)
    );
    grid_from_string(&content, delimiter)
}

pub fn read_tsv_grid(path: &Path) -> Result<Grid, String> {
    let content = read_file_as_utf8(path)?;
    grid_from_string(&content, b'\t')
}

pub fn grid_from_string(content: &str, delimiter: u8) -> Result<Grid, String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    grid_from_csv_str(content, delimiter).map_err(|e| e.to_string())
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Exports often open with a one-cell title line, so judge by the widest line
        let target = counts.iter().copied().max().unwrap_or(0);
        if target <= 1 {
            continue;
        }

        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Excel on Windows saves CSV as Windows-1252
            log::debug!("{}: not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leavesync_recon::CellValue;
    use std::io::Write;

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Pers.No.;Date;Hours\n12345;28.04.2025;7,5\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3\n"), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        assert_eq!(sniff_delimiter("a\tb\tc\n1\t2\t3\n"), b'\t');
    }

    #[test]
    fn test_sniff_ignores_title_line() {
        let content = "Absence Details\nFrom Date;Hours Recorded;Leave Code\n2025-04-28;8;110\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_empty_defaults_to_comma() {
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_grid_infers_numbers_and_keeps_codes() {
        let grid = grid_from_string("\u{feff}Date,Hours,A/AType\n28.04.2025,7.5,0110\n", b',').unwrap();
        assert_eq!(grid[0][0], CellValue::Text("Date".into()));
        assert_eq!(grid[1][1], CellValue::Number(7.5));
        assert_eq!(grid[1][2], CellValue::Text("0110".into()));
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        // "Congé;8" with é as 0xE9
        file.write_all(b"Cong\xe9;8\n").unwrap();
        drop(file);

        let grid = read_grid(&path).unwrap();
        assert_eq!(grid[0][0], CellValue::Text("Congé".into()));
        assert_eq!(grid[0][1], CellValue::Number(8.0));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = read_grid(Path::new("/nonexistent/drmis.csv")).unwrap_err();
        assert!(err.contains("drmis.csv"));
    }
}
