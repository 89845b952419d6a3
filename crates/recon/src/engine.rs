use crate::allow_list::AllowList;
use crate::calendar::BusinessCalendar;
use crate::config::{ExtractionConfig, ReconConfig};
use crate::edits::generate_edits;
use crate::error::ReconError;
use crate::extract::{extract_drmis, extract_oracle};
use crate::grid::DetectedTable;
use crate::model::{ReconMeta, ReconReport, ReconSummary};
use crate::prefill::{prefill_groups, DetailLookup};
use crate::reconcile::{default_employee_id, reconcile};

/// Read-only state shared by every stage of a run.
///
/// Built once per load. The detail lookup comes from the unfiltered DRMIS
/// table, so it has to be rebuilt whenever that table's columns are remapped.
#[derive(Debug)]
pub struct ReconContext {
    pub config_name: String,
    pub settings: ExtractionConfig,
    pub calendar: BusinessCalendar,
    pub allow_list: Option<AllowList>,
    pub detail_lookup: DetailLookup,
    pub prefill: bool,
}

impl ReconContext {
    pub fn new(config: &ReconConfig, drmis: &DetectedTable) -> Self {
        Self {
            config_name: config.name.clone(),
            settings: config.extraction.clone(),
            calendar: config.calendar.build(),
            allow_list: None,
            detail_lookup: DetailLookup::from_table(drmis),
            prefill: config.prefill,
        }
    }

    pub fn with_allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = Some(allow_list);
        self
    }
}

/// Run the pipeline over two detected tables.
///
/// Only column resolution can fail; every other problem (bad dates, missing
/// detail) drops the affected row or prefill silently.
pub fn run(
    ctx: &ReconContext,
    drmis: &DetectedTable,
    oracle: &DetectedTable,
) -> Result<ReconReport, ReconError> {
    let allow = ctx.allow_list.as_ref();
    let drmis_out = extract_drmis(drmis, &ctx.settings, allow)?;
    let oracle_out = extract_oracle(oracle, &ctx.settings, allow, &ctx.calendar)?;

    let recon = reconcile(&drmis_out.records, &oracle_out.records, allow);
    let mut groups = generate_edits(&recon.mismatches);
    let prefilled = if ctx.prefill {
        prefill_groups(&mut groups, &ctx.detail_lookup)
    } else {
        0
    };

    let summary = ReconSummary {
        drmis_rows_read: drmis_out.stats.rows_read,
        drmis_records: drmis_out.stats.kept,
        oracle_rows_read: oracle_out.stats.rows_read,
        oracle_records: oracle_out.stats.kept,
        oracle_expanded: oracle_out.stats.emitted,
        merged_rows: recon.merged.len(),
        mismatches: recon.mismatches.len(),
        code_mismatches: recon.mismatches.iter().filter(|m| m.code_differs()).count(),
        hours_mismatches: recon.mismatches.iter().filter(|m| m.hours_differ()).count(),
        prefilled_groups: prefilled,
    };

    Ok(ReconReport {
        meta: ReconMeta {
            config_name: ctx.config_name.clone(),
            employee_id: default_employee_id(&drmis_out.records),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            allow_list_codes: ctx.allow_list.as_ref().map(AllowList::len),
        },
        summary,
        mismatches: recon.mismatches,
        groups,
    })
}
