//! Console output for the reactree CLI.
//!
//! Status lines go to stdout, warnings and errors to stderr. When an export is
//! written to stdout the command switches to quiet mode so the payload stays
//! clean for piping.

use crate::export::ExportReport;
use console::{Emoji, style};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Global quiet mode flag - when true, suppresses all output except errors.
static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Global verbosity level (0 = normal, 1+ = verbose).
static VERBOSITY: AtomicU8 = AtomicU8::new(0);

pub static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "OK ");
pub static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "!! ");
pub static ERROR: Emoji<'_, '_> = Emoji("❌ ", "ERR ");

/// Set quiet mode globally.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::SeqCst);
}

pub fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::SeqCst)
}

/// Set verbosity level globally.
pub fn set_verbosity(level: u8) {
    VERBOSITY.store(level, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSITY.load(Ordering::SeqCst) >= 1
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", SUCCESS, style(msg).green());
    }
}

/// Print a warning message (suppressed in quiet mode).
pub fn warning(msg: &str) {
    if !is_quiet() {
        eprintln!("{} {}", WARNING, style(msg).yellow());
    }
}

/// Print an error message (NEVER suppressed, even in quiet mode).
pub fn error(msg: &str) {
    eprintln!("{} {}", ERROR, style(msg).red().bold());
}

/// Print a verbose message (only shown when verbose and not quiet).
pub fn verbose(msg: &str) {
    if is_verbose() && !is_quiet() {
        println!("{}", style(msg).dim());
    }
}

/// One-line summary of a finished export.
pub fn export_summary(report: &ExportReport) -> String {
    match &report.destination {
        Some(destination) => format!(
            "Exported {} bytes to {} ({} nodes, {} back-references pruned, {} functions dropped)",
            report.bytes,
            destination,
            report.stats.recorded,
            report.stats.pruned,
            report.stats.dropped_functions
        ),
        None => "Nothing exported: the selected root is absent".to_string(),
    }
}
