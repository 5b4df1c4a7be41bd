//! Logging bootstrap
//!
//! The library only emits `tracing` events. Binaries and tests that want
//! to see them call [`init_logging`] once at startup.

use std::sync::OnceLock;
use tracing::Level;

static INITIALIZED: OnceLock<Level> = OnceLock::new();

/// Parse a level name such as `info` or `DEBUG`
pub fn parse_level(level: &str) -> Result<Level, String> {
    level
        .trim()
        .parse::<Level>()
        .map_err(|_| format!("unknown log level: {level}"))
}

/// Install a stderr fmt subscriber filtered at `level`.
///
/// Only the first successful call installs a subscriber; later calls return
/// `Ok(())` without changing it. If another subscriber is already set
/// globally, that one is kept.
pub fn init_logging(level: &str) -> Result<(), String> {
    let level = parse_level(level)?;
    if INITIALIZED.get().is_some() {
        return Ok(());
    }

    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();
    let _ = INITIALIZED.set(level);

    if installed {
        tracing::info!(%level, "logging initialized");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_accepts_any_case() {
        assert_eq!(parse_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_level(" WARN ").unwrap(), Level::WARN);
    }

    #[test]
    fn test_unknown_level_is_error() {
        let err = init_logging("loud").unwrap_err();
        assert!(err.contains("loud"));
    }

    #[test]
    fn test_init_is_idempotent() {
        init_logging("info").unwrap();
        init_logging("debug").unwrap();
    }
}
