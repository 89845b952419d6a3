//! `leavesync-recon`: DRMIS/Oracle leave reconciliation pipeline.
//!
//! Pure pipeline crate: receives decoded cell grids, returns mismatches and
//! correction entries. No CLI or IO dependencies.

pub mod allow_list;
pub mod calendar;
pub mod cell;
pub mod codes;
pub mod columns;
pub mod config;
pub mod dates;
pub mod edits;
pub mod engine;
pub mod error;
pub mod expand;
pub mod extract;
pub mod grid;
pub mod model;
pub mod prefill;
pub mod reconcile;
pub mod session;

pub use allow_list::AllowList;
pub use calendar::{BusinessCalendar, FixedHolidays, HolidaySource};
pub use cell::{CellValue, Grid};
pub use columns::{ColumnOverrides, Field};
pub use config::ReconConfig;
pub use engine::{run, ReconContext};
pub use error::ReconError;
pub use grid::{detect_table, DetectedTable};
pub use model::{EditGroup, Mismatch, ReconReport, ReconSummary, Source};
pub use session::Session;
