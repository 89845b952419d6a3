// JSON export

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use leavesync_recon::ReconReport;

/// Write the full report (meta, summary, mismatches, edit groups) as pretty JSON.
pub fn export_report(report: &ReconReport, path: &Path) -> Result<(), String> {
    let file = File::create(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report).map_err(|e| e.to_string())?;
    Ok(())
}

pub fn report_to_string(report: &ReconReport) -> Result<String, String> {
    serde_json::to_string_pretty(report).map_err(|e| e.to_string())
}
