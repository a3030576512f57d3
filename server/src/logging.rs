//! Logging initialization.
//!
//! Uses tracing with environment-based filtering. `RUST_LOG` wins when set;
//! otherwise the filter is derived from the `-v`/`-q` flags.

use std::io::IsTerminal;
use std::sync::Once;

use anyhow::Result;
use clap::ValueEnum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output format of log lines on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(verbosity: u8, quiet: bool, format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(verbosity, quiet)))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Text => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(cfg!(debug_assertions))
                .with_line_number(cfg!(debug_assertions))
                .with_ansi(std::io::stderr().is_terminal());
            tracing::subscriber::set_global_default(registry.with(layer))?;
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .json();
            tracing::subscriber::set_global_default(registry.with(layer))?;
        }
    }

    Ok(())
}

fn default_filter(verbosity: u8, quiet: bool) -> String {
    if quiet {
        return "error".to_string();
    }

    match verbosity {
        0 => "todo_server=info,tower_http=info".to_string(),
        1 => "todo_server=debug,tower_http=debug".to_string(),
        2 => "todo_server=debug,tower_http=debug,rusqlite=debug".to_string(),
        _ => "todo_server=trace,tower_http=trace".to_string(),
    }
}

/// Initialize logging for tests with the test writer.
pub fn init_test_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("todo_server=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_overrides_verbosity() {
        assert_eq!(default_filter(3, true), "error");
    }

    #[test]
    fn verbosity_raises_level() {
        assert!(default_filter(0, false).contains("todo_server=info"));
        assert!(default_filter(1, false).contains("todo_server=debug"));
        assert!(default_filter(9, false).contains("todo_server=trace"));
    }

    #[test]
    fn default_filters_parse() {
        for v in 0..4 {
            assert!(EnvFilter::try_new(default_filter(v, false)).is_ok());
        }
    }
}
