//! Logging setup.
//!
//! The library crates log through the `log` facade. The subscriber installed
//! here bridges those records into `tracing` and writes them to stderr, so
//! stdout stays reserved for reports.
//!
//! - no flag: `warn`
//! - `-v`: `info` (stage summaries)
//! - `-vv`: `debug` (per-row drops, delimiter sniffing)
//! - `-vvv`: `trace`
//!
//! `RUST_LOG` overrides the verbosity flags entirely.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CRATES: &[&str] = &["leavesync_cli", "leavesync_recon", "leavesync_io", "leavesync_config"];

pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Default filter: our crates at `level`, everything else at `warn`.
pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(CRATES.iter().map(|krate| format!("{krate}={level}")));
    directives.join(",")
}

/// Install the global subscriber. Safe to call once; a second call is ignored.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level_for(verbosity))));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2)
        .without_time();

    // try_init also installs the log -> tracing bridge
    if let Err(e) = tracing_subscriber::registry().with(filter).with(layer).try_init() {
        eprintln!("warning: logging already initialised: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for(0), Level::WARN);
        assert_eq!(level_for(1), Level::INFO);
        assert_eq!(level_for(2), Level::DEBUG);
        assert_eq!(level_for(7), Level::TRACE);
    }

    #[test]
    fn directives_cover_workspace_crates() {
        let d = default_directives(Level::DEBUG);
        assert!(d.starts_with("warn,"));
        assert!(d.contains("leavesync_recon=debug"));
        assert!(d.contains("leavesync_io=debug"));
        assert!(EnvFilter::try_new(&d).is_ok());
    }
}
