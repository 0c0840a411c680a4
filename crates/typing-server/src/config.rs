use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Configuration for the typing server.
#[derive(Parser, Debug, Clone)]
#[command(name = "typing-server")]
#[command(about = "Personal notes REST API backed by the Google Drive app-data folder")]
#[command(disable_version_flag = true)]
pub struct Config {
    /// TCP host to bind to
    #[arg(long, default_value = "0.0.0.0", env = "TYPING_HOST")]
    pub host: String,

    /// TCP port to bind to (1024-65535). A free port is picked when unset.
    #[arg(long, env = "TYPING_PORT", value_parser = clap::value_parser!(u16).range(1024..))]
    pub port: Option<u16>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, value_enum, default_value_t = LogLevel::Debug, env = "TYPING_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Path of the Google OAuth client credential JSON
    #[arg(
        long,
        default_value = "/etc/typing/google_client_cred.json",
        env = "TYPING_CLIENT_CRED"
    )]
    pub client_cred: PathBuf,

    /// Seconds to wait for in-flight requests on shutdown
    #[arg(long, default_value = "5")]
    pub shutdown_grace_secs: u64,

    /// Print the version string and exit
    #[arg(short = 'v', long)]
    pub version: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
