//! Where the `docdesk` CLI sends its log records.
//!
//! Command results go to stdout, so terminal logging uses stderr only. The
//! log file is appended to, keeping a trail across separate invocations.

use std::fs::{File, OpenOptions};
use std::path::Path;

use clap::ValueEnum;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const LOG_PATH: &str = "./docdesk.log";

/// Chosen with `--log`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogDestination {
    /// Append to `docdesk.log` in the working directory.
    #[default]
    File,
    /// Stderr, next to the command output.
    Terminal,
    Both,
    Off,
}

impl LogDestination {
    fn wants_file(self) -> bool {
        matches!(self, Self::File | Self::Both)
    }

    fn wants_terminal(self) -> bool {
        matches!(self, Self::Terminal | Self::Both)
    }
}

pub fn initialize(destination: LogDestination) {
    let loggers = loggers_for(destination, Path::new(LOG_PATH));
    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
}

fn loggers_for(destination: LogDestination, log_path: &Path) -> Vec<Box<dyn SharedLogger>> {
    let level = LevelFilter::Info;
    let config = record_config();
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    if destination.wants_terminal() {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }
    if destination.wants_file() {
        match open_log_file(log_path) {
            Ok(file) => loggers.push(WriteLogger::new(level, config, file)),
            // The command still runs; only the trail is lost.
            Err(err) => eprintln!("docdesk: cannot open log file {}: {err}", log_path.display()),
        }
    }
    loggers
}

fn record_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
