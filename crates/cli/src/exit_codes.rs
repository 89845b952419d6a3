//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                               |
//! |------|-------------------------------------------------------|
//! | 0    | Success, exports agree                                |
//! | 1    | Reconciliation ran and found mismatches               |
//! | 2    | Usage error (bad args, bad `--map` pair)              |
//! | 3    | Required columns could not be resolved                |
//! | 4    | File could not be read, decoded or written            |
//! | 5    | Recon config failed to parse or validate              |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use leavesync_recon::ReconError;

/// Success - command completed, nothing to correct.
pub const EXIT_SUCCESS: u8 = 0;

/// Mismatches found. Like `diff(1)`, exit 1 means "sources differ."
pub const EXIT_MISMATCHES: u8 = 1;

/// Usage error - bad arguments, invalid column override.
pub const EXIT_USAGE: u8 = 2;

/// A source table lacks required columns; retry with `--map-drmis/--map-oracle`.
pub const EXIT_MISSING_COLUMNS: u8 = 3;

/// Read/decode/write failure.
pub const EXIT_IO: u8 = 4;

/// Recon config parse or validation failure.
pub const EXIT_CONFIG: u8 = 5;

/// Map a ReconError to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::MissingColumns { .. } => EXIT_MISSING_COLUMNS,
        ReconError::InvalidOverride { .. } => EXIT_USAGE,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG,
    }
}
