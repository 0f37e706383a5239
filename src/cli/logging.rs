//! Logger setup for the binary
//!
//! Every record goes to stderr and, when possible, is appended to a log file
//! as `<timestamp> - <LEVEL> - <message>`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use env_logger::{Env, Target};

/// Where and how much to log
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Log file; `None` logs to stderr only
    pub file: Option<PathBuf>,

    /// Lower the default level from info to debug
    pub verbose: bool,
}

/// Duplicates every write to the console and an optional file
pub struct Tee<C: Write> {
    console: C,
    file: Option<File>,
}

impl<C: Write> Tee<C> {
    pub fn new(console: C, file: Option<File>) -> Self {
        Self { console, file }
    }
}

impl<C: Write> Write for Tee<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.console.write_all(buf)?;
        if let Some(file) = self.file.as_mut() {
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.console.flush()?;
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

/// Open `path` for appending, creating its parent directories
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Install the global logger. `RUST_LOG` still overrides the default level.
pub fn init(settings: &LogSettings) -> Result<()> {
    let file = match &settings.file {
        Some(path) => match open_log_file(path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("⚠️  {e:#}; logging to stderr only");
                None
            }
        },
        None => None,
    };

    let default_level = if settings.verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                buf.timestamp_millis(),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(Tee::new(io::stderr(), file))))
        .try_init()
        .context("failed to initialize logger")?;

    Ok(())
}
