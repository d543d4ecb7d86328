use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;
const KEEP_SIZE: u64 = 1024 * 1024;

/// Log level for the given number of `-v` flags
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Cut `log_path` down to roughly its last `keep` bytes once it grows past `max`.
///
/// The cut happens at a line boundary. Returns whether the file was trimmed.
fn trim_log(log_path: &Path, max: u64, keep: u64) -> io::Result<bool> {
    let mut file = match File::open(log_path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    let size = file.metadata()?.len();
    if size <= max {
        return Ok(false);
    }

    file.seek(SeekFrom::Start(size.saturating_sub(keep)))?;
    let mut tail = Vec::with_capacity(keep as usize);
    file.read_to_end(&mut tail)?;
    drop(file);

    let first_line = tail.iter().position(|&b| b == b'\n').map_or(0, |i| i + 1);
    let mut file = File::create(log_path)?;
    writeln!(file, "--- constsweep log trimmed to its last {keep} bytes ---")?;
    file.write_all(&tail[first_line..])?;
    Ok(true)
}

/// Initialize diagnostics logging.
///
/// Diagnostics go to stderr so they never interleave with the report on stdout,
/// or are appended to `log_file` if one is given. A log file larger than 5MB is
/// trimmed to its last 1MB before opening. The level follows the `-v` count
/// unless `RUST_LOG` is set.
pub fn init_logging(verbosity: u8, log_file: Option<&Path>) -> color_eyre::Result<()> {
    let level = level_for_verbosity(verbosity);
    let default_filter = format!("constsweep={level},constsweep_core={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_file {
        Some(log_path) => {
            let trimmed = trim_log(log_path, MAX_LOG_SIZE, KEEP_SIZE);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;

            registry
                .with(
                    fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(true),
                )
                .try_init()?;
            match trimmed {
                Ok(true) => tracing::info!(path = %log_path.display(), "trimmed log file"),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(path = %log_path.display(), "failed to trim log file: {e}")
                }
            }
        }
        None => {
            registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false),
                )
                .try_init()?;
        }
    }

    Ok(())
}
