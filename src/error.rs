use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Sequential stages of one stats generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Count,
    Aggregate,
    Manifest,
    Publish,
    Close,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Count => "count",
            Stage::Aggregate => "aggregate",
            Stage::Manifest => "manifest",
            Stage::Publish => "publish",
            Stage::Close => "close",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StatsGenError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot connect to database {host}:{port}/{database}")]
    Connection {
        host: String,
        port: u16,
        database: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("database pool is not initialized")]
    NotInitialized,

    #[error("error while querying database")]
    Query(#[source] sqlx::Error),

    #[error("error while serializing {what}")]
    Serialization {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("error while storing {}", path.display())]
    Publish {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StatsGenError {
    /// The stage whose failure this error represents.
    pub fn stage(&self) -> Stage {
        match self {
            StatsGenError::Config(_) | StatsGenError::Connection { .. } => Stage::Init,
            StatsGenError::NotInitialized | StatsGenError::Query(_) => Stage::Count,
            StatsGenError::Serialization { .. } | StatsGenError::Publish { .. } => Stage::Publish,
        }
    }
}
