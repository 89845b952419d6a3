// Tab-separated rendering for clipboard and email bodies

use leavesync_recon::edits::discrepancy_reason;
use leavesync_recon::model::EditGroup;
use leavesync_recon::ReconReport;

fn hours(h: f64) -> String {
    format!("{:.2}", h)
}

/// Mismatch table, one line per mismatch, header first.
pub fn render_mismatches(report: &ReconReport) -> String {
    let mut out = String::from("Date\tEmployee\tDRMIS Code\tDRMIS Hours\tOracle Code\tOracle Hours\tReason\n");
    for m in &report.mismatches {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            m.date.format("%Y-%m-%d"),
            m.employee_id,
            m.drmis_code,
            hours(m.drmis_hours),
            m.oracle_code,
            hours(m.oracle_hours),
            discrepancy_reason(m),
        ));
    }
    out
}

/// Edit groups: data row, work-order rows, total line, blank separator.
pub fn render_edits(report: &ReconReport) -> String {
    let mut out = String::from("Employee\tDate\tWork Order\tAct. Code\tA/A Type\tHours\tReason\n");
    for group in &report.groups {
        render_group(&mut out, group);
    }
    out
}

fn render_group(out: &mut String, group: &EditGroup) {
    let d = &group.data_row;
    out.push_str(&format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
        d.employee_id,
        d.display_date(),
        d.work_order,
        d.act_code,
        d.target_code,
        hours(d.hours),
        d.discrepancy_reason,
    ));
    for s in &group.supplementary {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t\n",
            s.employee_id,
            s.date.format("%Y-%m-%d"),
            s.work_order,
            s.act_code,
            s.code,
            hours(s.hours),
        ));
    }
    out.push_str(&format!(
        "{}\t\t\t\t\t{}\t\n\n",
        group.total.label,
        hours(group.total_hours())
    ));
}
