//! A loaded pair of exports, ready to run and re-run.

use crate::allow_list::AllowList;
use crate::cell::Grid;
use crate::columns::ColumnOverrides;
use crate::config::ReconConfig;
use crate::engine::{self, ReconContext};
use crate::error::ReconError;
use crate::grid::{detect_table, DetectedTable};
use crate::model::{ReconReport, Source};
use crate::prefill::DetailLookup;

/// Detected tables plus the context built from them.
///
/// When extraction fails with missing columns, apply an override with
/// `remap_drmis` / `remap_oracle` and call `run` again.
#[derive(Debug)]
pub struct Session {
    drmis: DetectedTable,
    oracle: DetectedTable,
    context: ReconContext,
}

impl Session {
    /// Detect both tables and apply any column overrides from the config.
    pub fn load(config: &ReconConfig, drmis: &Grid, oracle: &Grid) -> Result<Self, ReconError> {
        let scan_rows = config.extraction.scan_rows;
        let mut drmis_table = detect_table(drmis, scan_rows);
        let mut oracle_table = detect_table(oracle, scan_rows);
        config.columns.drmis.apply(&mut drmis_table, Source::Drmis)?;
        config.columns.oracle.apply(&mut oracle_table, Source::Oracle)?;

        let context = ReconContext::new(config, &drmis_table);
        Ok(Self {
            drmis: drmis_table,
            oracle: oracle_table,
            context,
        })
    }

    pub fn set_allow_list(&mut self, allow_list: Option<AllowList>) {
        self.context.allow_list = allow_list;
    }

    pub fn set_prefill(&mut self, prefill: bool) {
        self.context.prefill = prefill;
    }

    /// Rename DRMIS headers per `overrides`. All-or-nothing: on error the
    /// table is left as it was.
    pub fn remap_drmis(&mut self, overrides: &ColumnOverrides) -> Result<(), ReconError> {
        let mut table = self.drmis.clone();
        overrides.apply(&mut table, Source::Drmis)?;
        self.context.detail_lookup = DetailLookup::from_table(&table);
        self.drmis = table;
        Ok(())
    }

    pub fn remap_oracle(&mut self, overrides: &ColumnOverrides) -> Result<(), ReconError> {
        let mut table = self.oracle.clone();
        overrides.apply(&mut table, Source::Oracle)?;
        self.oracle = table;
        Ok(())
    }

    pub fn table(&self, source: Source) -> &DetectedTable {
        match source {
            Source::Drmis => &self.drmis,
            Source::Oracle => &self.oracle,
        }
    }

    pub fn context(&self) -> &ReconContext {
        &self.context
    }

    pub fn run(&self) -> Result<ReconReport, ReconError> {
        engine::run(&self.context, &self.drmis, &self.oracle)
    }
}
