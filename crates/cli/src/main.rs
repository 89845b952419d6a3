// leavesync CLI - reconcile DRMIS leave against Oracle absences

mod exit_codes;
mod logging;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;
use recon::{RunArgs, SourceArg};

#[derive(Parser)]
#[command(name = "leavesync")]
#[command(about = "Reconcile DRMIS leave records against Oracle absence records")]
#[command(version)]
#[command(long_version = long_version())]
#[command(subcommand_required = false)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile one employee's DRMIS and Oracle exports
    #[command(after_help = "\
Examples:
  leavesync run --drmis drmis.xlsx --oracle oracle.xlsx
  leavesync run --drmis drmis.xlsx --oracle oracle.xlsx --allow-list codes.xlsx --xlsx edits.xlsx
  leavesync run --drmis drmis.csv --oracle oracle.csv --config april.recon.toml --json
  leavesync run --drmis drmis.csv --oracle oracle.csv --map-drmis leave_type=Absence --tsv

Exit codes:
  0  no mismatches    1  mismatches found     2  usage
  3  missing columns  4  file read/write      5  invalid config")]
    Run(RunArgs),

    /// Show the detected header row and how columns resolve to fields
    #[command(after_help = "\
Examples:
  leavesync detect drmis.xlsx
  leavesync detect oracle.csv --source oracle")]
    Detect {
        /// Export to inspect
        file: PathBuf,

        /// Only resolve fields for this source
        #[arg(long, value_enum)]
        source: Option<SourceArg>,

        /// Rows scanned for the header keyword
        #[arg(long, value_name = "N")]
        scan_rows: Option<usize>,
    },

    /// Validate a recon config without running
    #[command(after_help = "\
Examples:
  leavesync validate april.recon.toml")]
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        None => {
            eprintln!("Usage: leavesync <command> [options]");
            eprintln!("       leavesync --help for more information");
            Ok(())
        }
        Some(Commands::Run(args)) => recon::cmd_run(args),
        Some(Commands::Detect { file, source, scan_rows }) => recon::cmd_detect(file, source, scan_rows),
        Some(Commands::Validate { config }) => recon::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_collects_repeated_maps() {
        let cli = Cli::parse_from([
            "leavesync", "-vv", "run", "--drmis", "d.csv", "--oracle", "o.csv",
            "--map-drmis", "date=Day", "--map-drmis", "leave_type=Absence", "--no-prefill",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.map_drmis, vec!["date=Day", "leave_type=Absence"]);
                assert!(args.no_prefill);
                assert!(args.map_oracle.is_empty());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn json_and_tsv_conflict() {
        let parsed = Cli::try_parse_from([
            "leavesync", "run", "--drmis", "d.csv", "--oracle", "o.csv", "--json", "--tsv",
        ]);
        assert!(parsed.is_err());
    }
}
