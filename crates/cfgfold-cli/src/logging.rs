//! Subscriber setup for the `cfgfold` binary

use anyhow::{bail, Result};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable consulted before `--log-level`
pub(crate) const LOG_ENV: &str = "CFGFOLD_LOG";

/// Install the global subscriber
///
/// `CFGFOLD_LOG` takes precedence; otherwise `level` applies. Logs go to
/// stderr so merged output on stdout stays clean.
pub(crate) fn init_logging(level: &str, json: bool) -> Result<()> {
    let level = parse_log_level(level)?;
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let registry = Registry::default().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()?;
    }

    tracing::debug!(%level, "logging initialized");
    Ok(())
}

/// Parse a log level name
pub(crate) fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => bail!("invalid log level: {level}. Use trace, debug, info, warn, or error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_levels() {
        assert_eq!(parse_log_level("INFO").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("warning").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
    }

    #[test]
    fn rejects_unknown_level() {
        let err = parse_log_level("loud").unwrap_err();
        assert!(err.to_string().contains("loud"));
    }
}
