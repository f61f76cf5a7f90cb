//! log4rs setup: `app.log` for everything, `audit.log` for the `recordlite::audit` target.

use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

type LogResult = Result<(), Box<dyn std::error::Error>>;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;
pub const DEFAULT_RETENTION: usize = 7;

/// Loads a log4rs YAML config file.
///
/// # Errors
/// Returns an error if the file is missing or malformed, or a logger is already installed.
pub fn init_file(path: &Path) -> LogResult {
    log4rs::init_file(path, log4rs::config::Deserializers::default())?;
    Ok(())
}

#[must_use]
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_ascii_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

fn rolling(base: &Path, name: &str, keep: u32) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    let roller = FixedWindowRoller::builder().build(&format!("{}", base.join(format!("{name}.{{}}.log")).display()), keep)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    Ok(RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(base.join(format!("{name}.log")), Box::new(policy))?)
}

/// Builds the rolling-file config without installing it.
///
/// # Errors
/// Directory creation or appender construction failures.
pub fn build_config(dir: Option<&Path>, level: Option<&str>, retention: Option<usize>) -> Result<Config, Box<dyn std::error::Error>> {
    let base = dir
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    std::fs::create_dir_all(&base)?;
    let keep = u32::try_from(retention.unwrap_or(DEFAULT_RETENTION)).unwrap_or(u32::MAX);
    let lvl = parse_level(level.unwrap_or("info"));
    let config = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling(&base, "app", keep)?)))
        .appender(Appender::builder().build("audit", Box::new(rolling(&base, "audit", keep)?)))
        .logger(Logger::builder().appender("audit").additive(false).build("recordlite::audit", LevelFilter::Info))
        .build(Root::builder().appender("app").build(lvl))?;
    Ok(config)
}

/// Installs rolling file logging for the process.
/// - dir: base directory for logs; current directory if `None`
/// - level: error|warn|info|debug|trace (default info)
/// - retention: rolled files kept per log (default 7)
///
/// # Errors
/// Fails if the config cannot be built or a logger is already installed.
pub fn configure_logging(dir: Option<&Path>, level: Option<&str>, retention: Option<usize>) -> LogResult {
    let config = build_config(dir, level, retention)?;
    log4rs::init_config(config)?;
    Ok(())
}

/// Configure logging from `RECORDLITE_LOG_DIR`, `RECORDLITE_LOG_LEVEL` and
/// `RECORDLITE_LOG_RETENTION`.
///
/// # Errors
/// Same as [`configure_logging`].
pub fn configure_from_env() -> LogResult {
    let dir = std::env::var("RECORDLITE_LOG_DIR").ok().map(PathBuf::from);
    let level = std::env::var("RECORDLITE_LOG_LEVEL").ok();
    let retention = std::env::var("RECORDLITE_LOG_RETENTION").ok().and_then(|s| s.parse::<usize>().ok());
    configure_logging(dir.as_deref(), level.as_deref(), retention)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names() {
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level("warn"), LevelFilter::Warn);
        assert_eq!(parse_level("nonsense"), LevelFilter::Info);
    }

    #[test]
    fn build_config_creates_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        build_config(Some(&logs), Some("debug"), Some(2)).unwrap();
        assert!(logs.is_dir());
    }
}
