//! Logger setup for the `queuedeck` binary.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const LOG_FILE_NAME: &str = "queuedeck.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Appended to; the live dashboard owns the screen.
    File(PathBuf),
    Stderr,
}

impl LogDestination {
    pub fn for_command(live_dashboard: bool, log_dir: &Path) -> Self {
        if live_dashboard {
            LogDestination::File(log_dir.join(LOG_FILE_NAME))
        } else {
            LogDestination::Stderr
        }
    }
}

/// Only `queuedeck*` targets are logged; dependency chatter is dropped.
pub fn initialize(destination: &LogDestination, verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .add_filter_allow_str("queuedeck")
        .build();

    let logger: Box<dyn SharedLogger> = match destination {
        LogDestination::File(path) => WriteLogger::new(level, config, open_log_file(path)?),
        LogDestination::Stderr => {
            TermLogger::new(level, config, TerminalMode::Stderr, ColorChoice::Auto)
        }
    };
    CombinedLogger::init(vec![logger]).context("logger was already initialized")
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create log directory {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn only_the_live_dashboard_logs_to_a_file() {
        let dir = Path::new("task_logs");
        assert_eq!(
            LogDestination::for_command(true, dir),
            LogDestination::File(dir.join("queuedeck.log"))
        );
        assert_eq!(
            LogDestination::for_command(false, dir),
            LogDestination::Stderr
        );
    }

    #[test]
    fn log_file_is_created_under_missing_dirs_and_appended() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("nested").join("queuedeck.log");

        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
