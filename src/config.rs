use crate::error::StatsGenError;
use std::fmt;
use std::path::PathBuf;
use tracing::Level;

pub const DEFAULT_POSTGRES_PORT: u16 = 5432;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

const REQUIRED_VARS: [&str; 6] = [
    "POSTGRES_HOST",
    "POSTGRES_DATABASE",
    "POSTGRES_USER",
    "POSTGRES_PASSWORD",
    "REPOV1_PATH",
    "REPOV2_PATH",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub repo_v1_path: PathBuf,
    pub repo_v2_path: PathBuf,
    pub log: LogConfig,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
}

// Password stays out of every Debug rendering, including error logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: Level::DEBUG,
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// Accepts the level names used by the service's `NODE_LOG_LEVEL` (`silly` is the most verbose).
    pub fn parse_level(level: &str) -> Result<Level, StatsGenError> {
        match level {
            "error" => Ok(Level::ERROR),
            "warn" => Ok(Level::WARN),
            "info" => Ok(Level::INFO),
            "debug" => Ok(Level::DEBUG),
            "silly" => Ok(Level::TRACE),
            other => Err(StatsGenError::Config(format!(
                "Invalid log level: {other}. level can take: error, warn, info, debug, silly"
            ))),
        }
    }

    fn from_lookup<F>(lookup: &F) -> Result<Self, StatsGenError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let production = lookup("NODE_ENV").is_some_and(|env| env == "production");

        let level = match lookup("NODE_LOG_LEVEL").filter(|v| !v.is_empty()) {
            Some(level) => Self::parse_level(&level)?,
            None if production => Level::INFO,
            None => Level::DEBUG,
        };

        let format = if production {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        };

        Ok(LogConfig { level, format })
    }
}

impl Config {
    pub fn from_env() -> Result<Self, StatsGenError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Every required
    /// variable is checked up front so a single error lists all that are missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StatsGenError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| lookup(*key).is_none_or(|value| value.is_empty()))
            .collect();

        if !missing.is_empty() {
            return Err(StatsGenError::Config(format!(
                "One or more required environment variables are missing: {}",
                missing.join(", ")
            )));
        }

        let required = |key: &str| lookup(key).unwrap_or_default();

        let port = match lookup("POSTGRES_PORT").filter(|v| !v.is_empty()) {
            Some(port) => port.parse::<u16>().map_err(|_| {
                StatsGenError::Config(format!("Invalid POSTGRES_PORT: {port}"))
            })?,
            None => DEFAULT_POSTGRES_PORT,
        };

        Ok(Config {
            database: DatabaseConfig {
                host: required("POSTGRES_HOST"),
                port,
                database: required("POSTGRES_DATABASE"),
                user: required("POSTGRES_USER"),
                password: required("POSTGRES_PASSWORD"),
                max_connections: DEFAULT_MAX_CONNECTIONS,
            },
            repo_v1_path: PathBuf::from(required("REPOV1_PATH")),
            repo_v2_path: PathBuf::from(required("REPOV2_PATH")),
            log: LogConfig::from_lookup(&lookup)?,
        })
    }
}
