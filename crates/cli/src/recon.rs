//! `leavesync run | detect | validate`

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};

use leavesync_config::Settings;
use leavesync_recon::columns::{find_header, specs_for, ColumnOverrides};
use leavesync_recon::grid::DEFAULT_SCAN_ROWS;
use leavesync_recon::{detect_table, AllowList, ReconConfig, ReconError, ReconReport, Session, Source};

use crate::exit_codes::{recon_exit_code, EXIT_CONFIG, EXIT_IO, EXIT_MISMATCHES, EXIT_USAGE};
use crate::CliError;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// DRMIS leave export (csv, tsv, xlsx, xls, ods)
    #[arg(long, value_name = "FILE")]
    pub drmis: PathBuf,

    /// Oracle absence export (csv, tsv, xlsx, xls, ods)
    #[arg(long, value_name = "FILE")]
    pub oracle: PathBuf,

    /// Spreadsheet of leave codes to reconcile; other codes are ignored
    #[arg(long, value_name = "FILE", env = "LEAVESYNC_ALLOW_LIST")]
    pub allow_list: Option<PathBuf>,

    /// Recon config (.recon.toml); defaults to settings `recon.defaultConfig`
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Map a DRMIS field to a header, e.g. leave_type=Absence. Repeatable.
    #[arg(long, value_name = "FIELD=HEADER")]
    pub map_drmis: Vec<String>,

    /// Map an Oracle field to a header, e.g. from_date=Start. Repeatable.
    #[arg(long, value_name = "FIELD=HEADER")]
    pub map_oracle: Vec<String>,

    /// Skip work-order reallocation rows
    #[arg(long)]
    pub no_prefill: bool,

    /// Print the full report as JSON on stdout
    #[arg(long, conflicts_with = "tsv")]
    pub json: bool,

    /// Write the JSON report to a file
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write the styled correction workbook
    #[arg(long, value_name = "FILE")]
    pub xlsx: Option<PathBuf>,

    /// Print edit groups as tab-separated text (paste into DRMIS or email)
    #[arg(long)]
    pub tsv: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SourceArg {
    Drmis,
    Oracle,
}

impl From<SourceArg> for Source {
    fn from(s: SourceArg) -> Self {
        match s {
            SourceArg::Drmis => Source::Drmis,
            SourceArg::Oracle => Source::Oracle,
        }
    }
}

fn io_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_IO, message: msg.into(), hint: None }
}

/// Turn a pipeline error into a CLI error, with a recovery hint for mapping failures.
fn recon_err(err: ReconError) -> CliError {
    let code = recon_exit_code(&err);
    let hint = match &err {
        ReconError::MissingColumns { source, .. } => Some(map_hint(*source)),
        ReconError::InvalidOverride { .. } => {
            Some("run `leavesync detect FILE` to list the headers that were found".to_string())
        }
        _ => None,
    };
    CliError { code, message: err.to_string(), hint }
}

fn map_hint(source: Source) -> String {
    let flag = match source {
        Source::Drmis => "--map-drmis",
        Source::Oracle => "--map-oracle",
    };
    let fields: Vec<&str> = specs_for(source).iter().map(|s| s.field.name()).collect();
    format!("map columns with {flag} FIELD=HEADER (fields: {})", fields.join(", "))
}

fn read_grid(path: &Path) -> Result<leavesync_recon::Grid, CliError> {
    leavesync_io::read_grid(path).map_err(io_err)
}

// ============================================================================
// config resolution
// ============================================================================

/// A parsed config and the directory its relative paths resolve against.
struct LoadedConfig {
    config: ReconConfig,
    base_dir: Option<PathBuf>,
}

fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| io_err(format!("cannot read config {}: {e}", path.display())))?;
    ReconConfig::from_toml(&text).map_err(|e| CliError {
        code: EXIT_CONFIG,
        message: format!("{}: {e}", path.display()),
        hint: None,
    })
}

fn resolve_config(flag: Option<&Path>, settings: &Settings) -> Result<LoadedConfig, CliError> {
    let path = flag
        .map(Path::to_path_buf)
        .or_else(|| settings.default_config.as_ref().map(PathBuf::from));
    match path {
        Some(path) => {
            log::info!("config: {}", path.display());
            let config = load_config(&path)?;
            let base_dir = path.parent().map(Path::to_path_buf);
            Ok(LoadedConfig { config, base_dir })
        }
        None => Ok(LoadedConfig { config: ReconConfig::default(), base_dir: None }),
    }
}

impl LoadedConfig {
    fn resolve(&self, file: &str) -> PathBuf {
        match &self.base_dir {
            Some(dir) => dir.join(file),
            None => PathBuf::from(file),
        }
    }

    /// Flag, then config `[allow_list]`, then settings `recon.allowList`.
    fn allow_list_path(&self, flag: Option<&Path>, settings: &Settings) -> Option<PathBuf> {
        flag.map(Path::to_path_buf)
            .or_else(|| self.config.allow_list.as_ref().map(|a| self.resolve(&a.file)))
            .or_else(|| settings.allow_list.as_ref().map(PathBuf::from))
    }
}

fn load_allow_list(path: &Path) -> Result<AllowList, CliError> {
    let allow = AllowList::from_grid(&read_grid(path)?);
    if allow.is_empty() {
        return Err(CliError {
            code: EXIT_USAGE,
            message: format!("allow-list {} contains no leave codes", path.display()),
            hint: Some("expected an \"A/A Type\" column, or codes in the first column".to_string()),
        });
    }
    log::info!("allow-list: {} code(s) from {}", allow.len(), path.display());
    Ok(allow)
}

// ============================================================================
// run
// ============================================================================

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let settings = Settings::load();
    let loaded = resolve_config(args.config.as_deref(), &settings)?;

    let drmis = read_grid(&args.drmis)?;
    let oracle = read_grid(&args.oracle)?;
    let mut session = Session::load(&loaded.config, &drmis, &oracle).map_err(recon_err)?;

    let allow = match loaded.allow_list_path(args.allow_list.as_deref(), &settings) {
        Some(path) => Some(load_allow_list(&path)?),
        None => None,
    };
    session.set_allow_list(allow);
    session.set_prefill(!args.no_prefill && loaded.config.prefill && settings.prefill);

    if !args.map_drmis.is_empty() {
        let overrides = ColumnOverrides::parse_pairs(&args.map_drmis, Source::Drmis).map_err(recon_err)?;
        session.remap_drmis(&overrides).map_err(recon_err)?;
    }
    if !args.map_oracle.is_empty() {
        let overrides = ColumnOverrides::parse_pairs(&args.map_oracle, Source::Oracle).map_err(recon_err)?;
        session.remap_oracle(&overrides).map_err(recon_err)?;
    }

    let report = session.run().map_err(recon_err)?;
    write_outputs(&report, &args, &loaded, &settings)?;

    if args.json {
        let json = leavesync_io::json::report_to_string(&report).map_err(io_err)?;
        println!("{json}");
    } else if args.tsv {
        print!("{}", leavesync_io::text::render_edits(&report));
    } else {
        print!("{}", leavesync_io::text::render_mismatches(&report));
    }

    print_summary(&report);

    match report.summary.mismatches {
        0 => Ok(()),
        n => Err(CliError {
            code: EXIT_MISMATCHES,
            message: format!("{n} mismatch(es) found"),
            hint: None,
        }),
    }
}

/// Export destinations: flags resolve against `export.directory`,
/// config `[output]` entries against the config file.
fn write_outputs(
    report: &ReconReport,
    args: &RunArgs,
    loaded: &LoadedConfig,
    settings: &Settings,
) -> Result<(), CliError> {
    let json_path = args
        .output
        .as_deref()
        .map(|p| settings.export_path(p))
        .or_else(|| loaded.config.output.json.as_deref().map(|p| loaded.resolve(p)));
    if let Some(path) = json_path {
        leavesync_io::json::export_report(report, &path).map_err(io_err)?;
        eprintln!("wrote {}", path.display());
    }

    let xlsx_path = args
        .xlsx
        .as_deref()
        .map(|p| settings.export_path(p))
        .or_else(|| loaded.config.output.xlsx.as_deref().map(|p| loaded.resolve(p)));
    if let Some(path) = xlsx_path {
        let result = leavesync_io::xlsx::export_report(report, &path).map_err(io_err)?;
        eprintln!("wrote {} ({})", path.display(), result.summary());
    }
    Ok(())
}

fn print_summary(report: &ReconReport) {
    let s = &report.summary;
    eprintln!(
        "{} (employee {}): {} DRMIS record(s), {} Oracle record(s) over {} day(s), {} merged",
        report.meta.config_name,
        report.meta.employee_id,
        s.drmis_records,
        s.oracle_records,
        s.oracle_expanded,
        s.merged_rows,
    );
    eprintln!(
        "{} mismatch(es): {} code, {} hours; {} edit(s) prefilled",
        s.mismatches, s.code_mismatches, s.hours_mismatches, s.prefilled_groups,
    );
}

// ============================================================================
// detect
// ============================================================================

pub fn cmd_detect(file: PathBuf, source: Option<SourceArg>, scan_rows: Option<usize>) -> Result<(), CliError> {
    let grid = read_grid(&file)?;
    let table = detect_table(&grid, scan_rows.unwrap_or(DEFAULT_SCAN_ROWS));

    let Some(header_row) = table.header_row else {
        println!("{}: no data", file.display());
        return Ok(());
    };

    println!("file:       {}", file.display());
    println!("header row: {}", header_row + 1);
    if let Some((first, last)) = table.columns {
        println!("columns:    {}..{} (of {} read)", first + 1, last + 1, grid.iter().map(Vec::len).max().unwrap_or(0));
    }
    println!("data rows:  {}", table.rows.len());
    println!();
    println!("headers:");
    for (i, header) in table.headers.iter().enumerate() {
        println!("  {:>3}  {}", i + 1, header);
    }

    let sources: Vec<Source> = match source {
        Some(s) => vec![s.into()],
        None => vec![Source::Drmis, Source::Oracle],
    };
    for source in sources {
        println!();
        println!("{source} fields:");
        for spec in specs_for(source) {
            let found = find_header(&table.headers, spec);
            let status = match (found, spec.required) {
                (Some(h), _) => format!("-> {h}"),
                (None, true) => "MISSING".to_string(),
                (None, false) => "not found (optional)".to_string(),
            };
            println!("  {:<16} {}", spec.field.name(), status);
        }
    }
    Ok(())
}

// ============================================================================
// validate
// ============================================================================

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    let holidays = match &config.calendar.holidays {
        Some(list) => format!("{} listed holiday(s)", list.len()),
        None => format!("built-in {} holidays", config.calendar.year),
    };
    eprintln!("valid: '{}' ({holidays}, prefill {})", config.name, if config.prefill { "on" } else { "off" });

    if let Some(allow) = &config.allow_list {
        let path = config_path
            .parent()
            .map(|dir| dir.join(&allow.file))
            .unwrap_or_else(|| PathBuf::from(&allow.file));
        if !path.exists() {
            log::warn!("allow-list {} does not exist", path.display());
        }
    }
    Ok(())
}
