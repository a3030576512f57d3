//! Command-line and environment configuration.
//!
//! Precedence (highest wins): flags, environment variables, defaults.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::logging::LogFormat;

#[derive(Debug, Clone, Parser)]
#[command(name = "todo-server", version, about = "REST API for a single-table todo list")]
pub struct Config {
    /// Address to bind.
    #[arg(long, env = "TODO_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// SQLite database file, created if missing.
    #[arg(long, env = "TODO_DB", default_value = "todos.db")]
    pub database: PathBuf,

    /// Keep todos in memory only; `--database` is ignored.
    #[arg(long)]
    pub in_memory: bool,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    pub quiet: bool,

    #[arg(long, env = "TODO_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Config {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flags_are_parsed() {
        let config = Config::try_parse_from([
            "todo-server",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--database",
            "/tmp/t.db",
            "-vv",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(config.socket_addr(), "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.database, PathBuf::from("/tmp/t.db"));
        assert_eq!(config.verbose, 2);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(!config.in_memory);
        assert!(!config.quiet);
    }

    #[test]
    fn in_memory_flag() {
        let config = Config::try_parse_from(["todo-server", "--in-memory", "-q"]).unwrap();
        assert!(config.in_memory);
        assert!(config.quiet);
    }

    #[test]
    fn bad_port_is_rejected() {
        assert!(Config::try_parse_from(["todo-server", "--port", "http"]).is_err());
    }
}
