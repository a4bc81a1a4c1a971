//! `log` backend that prints `[LEVEL] message` lines to stdout

use std::io::Write;

use colored::{ColoredString, Colorize};
use log::{Level, LevelFilter, Log, Metadata, Record};

struct StdoutLogger;

static LOGGER: StdoutLogger = StdoutLogger;

impl Log for StdoutLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("{} {}", tag(record.level()), record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}

fn tag(level: Level) -> ColoredString {
    match level {
        Level::Error => "[ERROR]".red().bold(),
        Level::Warn => "[WARN]".yellow().bold(),
        Level::Info => "[INFO]".normal(),
        Level::Debug => "[DEBUG]".dimmed(),
        Level::Trace => "[TRACE]".dimmed(),
    }
}

/// Install the stdout logger. Calling it again only changes the level.
pub fn init(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

/// `Debug` when verbose, `Warn` when quiet, `Info` otherwise
pub fn level_for(verbose: bool, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Warn
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}
