//! Launcher configuration
//!
//! Parsed once from the command line (or environment) at startup and handed
//! to component constructors; nothing reads it again while serving.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(name = "todo-server")]
#[command(author, version, about = "todolist service launcher", long_about = None)]
pub struct Config {
    /// Set the listening port of the webserver
    #[arg(short, long, env = "TODO_PORT", default_value_t = 8020)]
    pub port: u16,

    /// Set the storage connection string (sqlite://todos.db, sqlite::memory:, memory://)
    #[arg(short, long, env = "TODO_DB", default_value = "sqlite://todos.db")]
    pub db: String,

    /// Set the output log level (debug, info, warning, error)
    #[arg(short = 'l', long = "logl", env = "TODO_LOG_LEVEL", default_value = "warning")]
    pub log_level: String,

    /// Set the log formatter
    #[arg(short = 'f', long = "logf", env = "TODO_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Set the statistics accumulation duration (ex : 1h, 2h30m, 30s, 300ms)
    #[arg(short = 's', long = "statd", env = "TODO_STATS_DURATION", default_value = "20s", value_parser = parse_duration)]
    pub stats_duration: Duration,

    /// Upper bound for a single storage operation
    #[arg(long, env = "TODO_STORAGE_TIMEOUT", default_value = "5s", value_parser = parse_duration)]
    pub storage_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human readable lines
    Text,
    /// One JSON object per line
    #[value(alias = "json")]
    Logstash,
}

impl Config {
    /// Startup banner listing the effective settings
    pub fn summary(&self) -> String {
        let rule = "* --------------------------------------------------- *";
        format!(
            "{rule}\n\
             |   port                    : {}\n\
             |   db                      : {}\n\
             |   logger level            : {}\n\
             |   logger format           : {:?}\n\
             |   statistic duration(s)   : {}\n\
             |   storage timeout(ms)     : {}\n\
             {rule}",
            self.port,
            self.db,
            self.log_level,
            self.log_format,
            self.stats_duration.as_secs_f64(),
            self.storage_timeout.as_millis(),
        )
    }

    /// Install the global tracing subscriber.
    ///
    /// Returns `false` when the level was not recognised and `debug` was used
    /// instead.
    pub fn init_logging(&self) -> Result<bool> {
        let (level, recognised) = match filter_level(&self.log_level) {
            Some(level) => (level, true),
            None => ("debug", false),
        };
        let filter = EnvFilter::new(level);

        match self.log_format {
            LogFormat::Text => {
                let subscriber = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_target(false)
                    .finish();
                tracing::subscriber::set_global_default(subscriber)?;
            }
            LogFormat::Logstash => {
                let subscriber = tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_current_span(false)
                    .finish();
                tracing::subscriber::set_global_default(subscriber)?;
            }
        }

        Ok(recognised)
    }
}

fn filter_level(level: &str) -> Option<&'static str> {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" | "fatal" | "panic" => Some("error"),
        _ => None,
    }
}

/// Parse a duration such as `300ms`, `30s`, `2h30m` or `1.5h`.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut nanos = 0f64;
    let mut rest = input;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| format!("missing unit in duration {:?}", input))?;
        if number_len == 0 {
            return Err(format!("invalid duration {:?}", input));
        }
        let value: f64 = rest[..number_len]
            .parse()
            .map_err(|_| format!("invalid number in duration {:?}", input))?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            unit => return Err(format!("unknown unit {:?} in duration {:?}", unit, input)),
        };
        rest = &rest[unit_len..];

        nanos += value * nanos_per_unit;
    }

    if !nanos.is_finite() || nanos >= u64::MAX as f64 {
        return Err(format!("duration {:?} is out of range", input));
    }
    let duration = Duration::from_nanos(nanos.round() as u64);
    if duration.is_zero() {
        return Err("duration must be greater than zero".to_string());
    }
    Ok(duration)
}
